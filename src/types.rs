//! Types Module
//!
//! 文書ツリー（モジュール → グループ → Use-case）と
//! フラットなUse-caseレコードを定義するモジュール。

use serde::Serialize;

/// 暗黙のモジュールに付与される記号
pub const DEFAULT_MODULE_CODE: &str = "A";

/// 暗黙のモジュールに付与される名前
pub const DEFAULT_MODULE_NAME: &str = "PHÂN HỆ MẶC ĐỊNH";

/// 1件のUse-case
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UseCase {
    /// 番号（Level3の整数を文字列化したもの）
    pub code: String,
    pub name: String,
    pub actor: String,
    pub business_measure: String,
    pub complexity: String,
    /// イベントの流れ（入力順、空文字列は含まない）
    pub transactions: Vec<String>,
}

impl UseCase {
    /// トランザクション行を追加する（空白のみの行は無視）
    pub fn push_transaction(&mut self, line: &str) {
        let line = line.trim();
        if !line.is_empty() {
            self.transactions.push(line.to_string());
        }
    }
}

/// グループ（Level2ノード）
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Group {
    /// ローマ数字。暗黙のグループでは`None`
    pub code: Option<String>,
    pub name: String,
    pub use_cases: Vec<UseCase>,
}

impl Group {
    /// 名前も番号もない暗黙のグループ
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// 暗黙のグループかどうか
    pub fn is_anonymous(&self) -> bool {
        self.code.is_none()
    }
}

/// モジュール（Level1ノード）
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Module {
    pub code: String,
    pub name: String,
    pub groups: Vec<Group>,
}

impl Module {
    /// Level1行がないまま下位の行が現れたときに補う既定モジュール
    pub fn synthesized_default() -> Self {
        Self {
            code: DEFAULT_MODULE_CODE.to_string(),
            name: DEFAULT_MODULE_NAME.to_string(),
            groups: Vec::new(),
        }
    }

    /// モジュール配下のUse-case（出現順）
    pub fn use_cases(&self) -> impl Iterator<Item = &UseCase> {
        self.groups.iter().flat_map(|g| g.use_cases.iter())
    }
}

/// 文書ツリー全体のUse-case件数
pub fn count_use_cases(modules: &[Module]) -> usize {
    modules.iter().map(|m| m.use_cases().count()).sum()
}

/// フラットパイプラインの出力レコード
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FlatUseCaseRecord {
    /// 整数のSTT
    pub code: u64,
    pub name: String,
    pub actor: String,
    pub business_measure: String,
    pub complexity: String,
    /// 改行区切りのトランザクション（1行1文）
    pub transaction: String,
}

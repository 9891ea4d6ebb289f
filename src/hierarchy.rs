//! Hierarchy Builder Module
//!
//! 列解決・前方補完済みの行ストリームを1パスで畳み込み、
//! モジュール → グループ → Use-case → トランザクション行のツリーを構築するモジュール。
//!
//! 状態は「現在のモジュール」「現在のグループ」「現在のUse-case」の
//! 3つの独立したスロットで表現します。閉じる（flush）ときは
//! 常に葉から根の順（Use-case → グループ → モジュール）で親に接続します。

use tracing::trace;

use crate::columns::{CanonicalField, Row};
use crate::sequence::{classify_in, recover_from_name, ClassifyContext, SequenceCode};
use crate::types::{Group, Module, UseCase};

/// コメント行を示すSTTセルの接頭辞
const RESERVED_MARKER: char = '#';

/// 1行を処理した結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowOutcome {
    OpenedModule,
    OpenedGroup,
    OpenedUseCase,
    AppendedTransaction,
    Skipped(SkipReason),
}

/// 行を捨てた理由
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// STTが予約記号（`#`）で始まる
    ReservedMarker,
    /// STT・名前・トランザクションがすべて空の区切り行
    Blank,
    /// 継続行だが付け先のUse-caseがない、または本文がない
    NothingToAttach,
}

/// 階層構築の状態機械
#[derive(Debug, Default)]
pub struct HierarchyBuilder {
    modules: Vec<Module>,
    module: Option<Module>,
    group: Option<Group>,
    use_case: Option<UseCase>,
}

impl HierarchyBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// 1行を処理する
    pub fn push_row(&mut self, row: &Row) -> RowOutcome {
        let sequence = row.get(CanonicalField::Sequence).trim();
        let name = row.get(CanonicalField::Name).trim();
        let transaction = row.get(CanonicalField::Transaction).trim();

        if sequence.starts_with(RESERVED_MARKER) {
            return RowOutcome::Skipped(SkipReason::ReservedMarker);
        }
        if sequence.is_empty() && name.is_empty() && transaction.is_empty() {
            return RowOutcome::Skipped(SkipReason::Blank);
        }

        // モジュール・グループ名は補完値ではなく行自身の値を使う
        let own_name = if row.is_carried(CanonicalField::Name) {
            ""
        } else {
            name
        };

        match self.classify(row) {
            (SequenceCode::Level1(letter), _) => {
                self.flush_use_case();
                self.flush_group();
                self.flush_module();
                self.module = Some(Module {
                    code: letter.to_string(),
                    name: own_name.to_string(),
                    groups: Vec::new(),
                });
                RowOutcome::OpenedModule
            }
            (SequenceCode::Level2(numeral), _) => {
                self.flush_use_case();
                self.flush_group();
                self.ensure_module();
                self.group = Some(Group {
                    code: Some(numeral),
                    name: own_name.to_string(),
                    use_cases: Vec::new(),
                });
                RowOutcome::OpenedGroup
            }
            (SequenceCode::Level3(number), recovered_name) => {
                self.flush_use_case();
                self.ensure_module();
                self.ensure_group();
                let mut use_case = UseCase {
                    code: number.to_string(),
                    name: recovered_name.unwrap_or_else(|| name.to_string()),
                    actor: row.get(CanonicalField::Actor).trim().to_string(),
                    business_measure: row.get(CanonicalField::BusinessMeasure).trim().to_string(),
                    complexity: row.get(CanonicalField::Complexity).trim().to_string(),
                    transactions: Vec::new(),
                };
                use_case.push_transaction(transaction);
                self.use_case = Some(use_case);
                RowOutcome::OpenedUseCase
            }
            (SequenceCode::None, _) => match self.use_case.as_mut() {
                Some(use_case) if !transaction.is_empty() => {
                    use_case.push_transaction(transaction);
                    RowOutcome::AppendedTransaction
                }
                _ => RowOutcome::Skipped(SkipReason::NothingToAttach),
            },
        }
    }

    /// 残りのノードをすべて閉じ、ツリーを返す
    pub fn finish(mut self) -> Vec<Module> {
        self.flush_use_case();
        self.flush_group();
        self.flush_module();
        self.modules
    }

    /// STTを分類し、名前から番号を回収した場合はその残りの名前も返す
    fn classify(&self, row: &Row) -> (SequenceCode, Option<String>) {
        let sequence = row.get(CanonicalField::Sequence);
        let code = classify_in(sequence, &self.context());
        if code != SequenceCode::None || !sequence.trim().is_empty() {
            return (code, None);
        }
        if row.is_carried(CanonicalField::Name) {
            return (SequenceCode::None, None);
        }
        match recover_from_name(row.get(CanonicalField::Name)) {
            Some((number, rest)) => (SequenceCode::Level3(number), Some(rest)),
            None => (SequenceCode::None, None),
        }
    }

    fn context(&self) -> ClassifyContext {
        let open_group = self.group.as_ref().and_then(|g| g.code.clone());
        let attached_group = self.module.as_ref().and_then(|m| {
            m.groups.iter().rev().find_map(|g| g.code.clone())
        });
        ClassifyContext {
            last_group: open_group.or(attached_group),
        }
    }

    fn ensure_module(&mut self) {
        if self.module.is_none() {
            self.module = Some(Module::synthesized_default());
        }
    }

    fn ensure_group(&mut self) {
        if self.group.is_none() {
            self.group = Some(Group::anonymous());
        }
    }

    fn flush_use_case(&mut self) {
        if let Some(use_case) = self.use_case.take() {
            self.ensure_group();
            if let Some(group) = self.group.as_mut() {
                group.use_cases.push(use_case);
            }
        }
    }

    fn flush_group(&mut self) {
        if let Some(group) = self.group.take() {
            self.ensure_module();
            if let Some(module) = self.module.as_mut() {
                module.groups.push(group);
            }
        }
    }

    fn flush_module(&mut self) {
        if let Some(module) = self.module.take() {
            self.modules.push(module);
        }
    }
}

/// 行ストリーム全体から文書ツリーを構築する
pub fn build_hierarchy(rows: &[Row]) -> Vec<Module> {
    let mut builder = HierarchyBuilder::new();
    for (idx, row) in rows.iter().enumerate() {
        let outcome = builder.push_row(row);
        trace!(row = idx, ?outcome, "hierarchy row");
    }
    builder.finish()
}

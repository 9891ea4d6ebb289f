//! Column Resolver Module
//!
//! ヘッダーラベル（または列位置）を6つの正規フィールドへ対応付け、
//! データ行を[`Row`]へ変換するモジュール。
//! 結合セル復元のための前方補完（forward-fill）もここで行います。

use serde::Serialize;
use tracing::{debug, warn};

use crate::error::UcDocError;
use crate::normalize::{clean_header, normalize_text};

/// 正規フィールド
///
/// 列挙順がそのまま位置による割り当て（positional fallback）の列順になります。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum CanonicalField {
    /// STT（連番）
    Sequence,
    /// Use-case名
    Name,
    /// アクター
    Actor,
    /// トランザクション（イベント記述）
    Transaction,
    /// BMT
    BusinessMeasure,
    /// 複雑度
    Complexity,
}

impl CanonicalField {
    /// 正規順のすべてのフィールド
    pub const ALL: [CanonicalField; 6] = [
        CanonicalField::Sequence,
        CanonicalField::Name,
        CanonicalField::Actor,
        CanonicalField::Transaction,
        CanonicalField::BusinessMeasure,
        CanonicalField::Complexity,
    ];

    /// 表示用ラベル（出力文書の見出しにそのまま使用）
    pub fn label(self) -> &'static str {
        match self {
            CanonicalField::Sequence => "STT",
            CanonicalField::Name => "Tên Use-case",
            CanonicalField::Actor => "Tác nhân",
            CanonicalField::Transaction => "Giao dịch",
            CanonicalField::BusinessMeasure => "BMT",
            CanonicalField::Complexity => "Độ phức tạp",
        }
    }

    /// 正規化済みの同義語リスト
    pub fn synonyms(self) -> &'static [&'static str] {
        match self {
            CanonicalField::Sequence => &["stt", "s", "tt", "#"],
            CanonicalField::Name => &[
                "ten use-case",
                "ten usecase",
                "ten use case",
                "use-case",
                "use case",
                "usecase",
            ],
            CanonicalField::Actor => &["tac nhan", "ten tac nhan", "actor"],
            CanonicalField::Transaction => &["giao dich", "transaction"],
            CanonicalField::BusinessMeasure => &["bmt"],
            CanonicalField::Complexity => &["do phuc tap", "complexity"],
        }
    }

    pub(crate) fn index(self) -> usize {
        self as usize
    }
}

/// 1行分の入力レコード
///
/// 各フィールドの値と、その値が前方補完で埋められたかどうかを保持します。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Row {
    cells: [String; 6],
    carried: [bool; 6],
}

impl Row {
    /// 正規順の6フィールドから行を生成する
    pub fn new(
        sequence: &str,
        name: &str,
        actor: &str,
        transaction: &str,
        business_measure: &str,
        complexity: &str,
    ) -> Self {
        Self {
            cells: [
                sequence.to_string(),
                name.to_string(),
                actor.to_string(),
                transaction.to_string(),
                business_measure.to_string(),
                complexity.to_string(),
            ],
            carried: [false; 6],
        }
    }

    /// フィールドの値を取得
    pub fn get(&self, field: CanonicalField) -> &str {
        &self.cells[field.index()]
    }

    /// フィールドの値が前方補完によるものかどうか
    pub fn is_carried(&self, field: CanonicalField) -> bool {
        self.carried[field.index()]
    }

    pub(crate) fn set(&mut self, field: CanonicalField, value: String) {
        self.cells[field.index()] = value;
    }

    fn is_blank(&self, field: CanonicalField) -> bool {
        self.get(field).trim().is_empty()
    }
}

/// 列割り当ての方法
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BindingStrategy {
    /// ヘッダーラベルの照合（完全一致・部分一致）
    Header,
    /// 列位置による割り当て
    Positional,
}

/// 正規フィールド → ソース列インデックスの対応
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnBinding {
    columns: [Option<usize>; 6],
    /// 割り当てに使用した方法
    pub strategy: BindingStrategy,
    /// 位置割り当てで残った列（整形済みヘッダー名, 列インデックス）
    pub extras: Vec<(String, usize)>,
}

impl ColumnBinding {
    /// フィールドに対応するソース列
    pub fn column(&self, field: CanonicalField) -> Option<usize> {
        self.columns[field.index()]
    }

    fn bound_count(&self) -> usize {
        self.columns.iter().filter(|c| c.is_some()).count()
    }

    /// 生の行データから[`Row`]を組み立てる
    pub fn extract(&self, cells: &[String]) -> Row {
        let mut row = Row::default();
        for field in CanonicalField::ALL {
            if let Some(value) = self.column(field).and_then(|col| cells.get(col)) {
                row.set(field, value.trim().to_string());
            }
        }
        row
    }
}

/// ヘッダー行とデータ行から列割り当てを決定する
///
/// # 処理順序
///
/// 1. 各ヘッダーセルと各フィールドの同義語の完全一致（大文字小文字・アクセント無視）
/// 2. 未割り当てのフィールドごとに部分一致（3文字以上の同義語のみ）
/// 3. 6フィールドが揃わない、またはトランザクション列が全行空の場合は、
///    空でない列を正規順に位置で割り当て
///
/// # エラー
///
/// * `UcDocError::InsufficientColumns` - 位置割り当てにも列が足りず、
///   ヘッダー照合でも必須列が得られない場合
/// * `UcDocError::MissingColumn` - STTまたはUse-case名の列が割り当てられない場合
pub fn resolve_columns(
    header: &[String],
    data_rows: &[Vec<String>],
) -> Result<ColumnBinding, UcDocError> {
    let normalized: Vec<String> = header.iter().map(|h| normalize_text(h)).collect();
    let mut columns: [Option<usize>; 6] = [None; 6];

    // 1. 完全一致
    for field in CanonicalField::ALL {
        columns[field.index()] = find_unbound(&normalized, &columns, |h| {
            field.synonyms().iter().any(|s| *s == h)
        });
    }

    // 2. 部分一致（未割り当てのフィールドのみ）
    for field in CanonicalField::ALL {
        if columns[field.index()].is_some() {
            continue;
        }
        columns[field.index()] = find_unbound(&normalized, &columns, |h| {
            field
                .synonyms()
                .iter()
                .filter(|s| s.chars().count() >= 3)
                .any(|s| h.contains(s))
        });
    }

    let header_binding = ColumnBinding {
        columns,
        strategy: BindingStrategy::Header,
        extras: Vec::new(),
    };
    debug!(columns = ?header_binding.columns, "header label binding");

    // 3. 位置による割り当て
    let transaction_empty = header_binding
        .column(CanonicalField::Transaction)
        .map(|col| column_is_empty(data_rows, col))
        .unwrap_or(false);
    if header_binding.bound_count() == CanonicalField::ALL.len() && !transaction_empty {
        return Ok(header_binding);
    }

    if transaction_empty {
        warn!("transaction column matched but is empty in every row; trying positional mapping");
    }

    match positional_binding(header, data_rows) {
        Ok(binding) => {
            debug!(extras = binding.extras.len(), "using positional column binding");
            Ok(binding)
        }
        Err(err) => {
            if header_binding.bound_count() == 0 {
                return Err(err);
            }
            for field in [CanonicalField::Sequence, CanonicalField::Name] {
                if header_binding.column(field).is_none() {
                    return Err(UcDocError::MissingColumn(field));
                }
            }
            warn!(
                bound = header_binding.bound_count(),
                "positional mapping impossible; keeping partial header binding"
            );
            Ok(header_binding)
        }
    }
}

fn positional_binding(
    header: &[String],
    data_rows: &[Vec<String>],
) -> Result<ColumnBinding, UcDocError> {
    let width = data_rows
        .iter()
        .map(Vec::len)
        .chain(std::iter::once(header.len()))
        .max()
        .unwrap_or(0);
    let non_empty: Vec<usize> = (0..width)
        .filter(|&col| !column_is_empty(data_rows, col))
        .collect();

    let required = CanonicalField::ALL.len();
    if non_empty.len() < required {
        return Err(UcDocError::InsufficientColumns {
            found: non_empty.len(),
            required,
        });
    }

    let mut columns: [Option<usize>; 6] = [None; 6];
    for (field, &col) in CanonicalField::ALL.iter().zip(&non_empty) {
        columns[field.index()] = Some(col);
    }
    let extras = non_empty[required..]
        .iter()
        .map(|&col| {
            let name = header.get(col).map(|h| clean_header(h)).unwrap_or_default();
            (name, col)
        })
        .collect();

    Ok(ColumnBinding {
        columns,
        strategy: BindingStrategy::Positional,
        extras,
    })
}

fn column_is_empty(rows: &[Vec<String>], col: usize) -> bool {
    rows.iter()
        .all(|row| row.get(col).map_or(true, |v| v.trim().is_empty()))
}

/// 既に割り当て済みの列を除外して、条件に合う最初の列を探す
fn find_unbound<F>(normalized: &[String], bound: &[Option<usize>; 6], pred: F) -> Option<usize>
where
    F: Fn(&str) -> bool,
{
    normalized
        .iter()
        .enumerate()
        .find(|(idx, h)| !h.is_empty() && !bound.contains(&Some(*idx)) && pred(h))
        .map(|(idx, _)| idx)
}

/// 前方補完（結合セルの復元）
///
/// 指定フィールドについて、空セルに直前の空でない値を上から順に埋めます。
/// 埋められたセルは[`Row::is_carried`]で判別できます。
/// 既に全セルが埋まっている列には何も変更を加えません。
pub fn forward_fill(rows: &mut [Row], fields: &[CanonicalField]) {
    for &field in fields {
        let mut last: Option<String> = None;
        for row in rows.iter_mut() {
            if row.is_blank(field) {
                if let Some(value) = &last {
                    row.set(field, value.clone());
                    row.carried[field.index()] = true;
                }
            } else {
                last = Some(row.get(field).to_string());
            }
        }
    }
}

/// フラットパイプラインで補完するフィールド
pub const FLAT_FILL_FIELDS: [CanonicalField; 5] = [
    CanonicalField::Sequence,
    CanonicalField::Name,
    CanonicalField::Actor,
    CanonicalField::BusinessMeasure,
    CanonicalField::Complexity,
];

/// 階層パイプラインで補完するフィールド（STT列は補完しない）
pub const HIERARCHY_FILL_FIELDS: [CanonicalField; 4] = [
    CanonicalField::Name,
    CanonicalField::Actor,
    CanonicalField::BusinessMeasure,
    CanonicalField::Complexity,
];

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn strings(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|s| s.to_string()).collect()
    }

    fn full_header() -> Vec<String> {
        strings(&["STT", "Tên Use-case", "Tác nhân", "Giao dịch", "BMT", "Độ phức tạp"])
    }

    #[test]
    fn test_exact_header_match() {
        let data = vec![strings(&["1", "Login", "User", "Enter", "B", "Simple"])];
        let binding = resolve_columns(&full_header(), &data).unwrap();
        assert_eq!(binding.strategy, BindingStrategy::Header);
        for (idx, field) in CanonicalField::ALL.iter().enumerate() {
            assert_eq!(binding.column(*field), Some(idx));
        }
    }

    #[test]
    fn test_header_match_tolerates_reordering_and_synonyms() {
        let header = strings(&["Actor", "#", "Độ  phức tạp", "BMT", "Ten usecase", "Transaction"]);
        let data = vec![strings(&["User", "1", "Simple", "B", "Login", "Enter"])];
        let binding = resolve_columns(&header, &data).unwrap();
        assert_eq!(binding.column(CanonicalField::Sequence), Some(1));
        assert_eq!(binding.column(CanonicalField::Name), Some(4));
        assert_eq!(binding.column(CanonicalField::Actor), Some(0));
        assert_eq!(binding.column(CanonicalField::Transaction), Some(5));
        assert_eq!(binding.column(CanonicalField::Complexity), Some(2));
    }

    #[test]
    fn test_fuzzy_containment_for_required_fields() {
        let header = strings(&["STT", "Tên Use-case (chức năng)", "Tác nhân", "Giao dịch", "BMT", "Độ phức tạp"]);
        let data = vec![strings(&["1", "Login", "User", "Enter", "B", "Simple"])];
        let binding = resolve_columns(&header, &data).unwrap();
        assert_eq!(binding.strategy, BindingStrategy::Header);
        assert_eq!(binding.column(CanonicalField::Name), Some(1));
    }

    #[test]
    fn test_fuzzy_containment_for_optional_fields() {
        let header = strings(&["STT", "Tên Use-case", "Giao dịch", "Tác nhân chính", "BMT", "Độ phức tạp"]);
        let data = vec![strings(&["1", "Login", "Enter creds", "User", "B", "Simple"])];
        let binding = resolve_columns(&header, &data).unwrap();
        assert_eq!(binding.strategy, BindingStrategy::Header);
        assert_eq!(binding.column(CanonicalField::Actor), Some(3));
        assert_eq!(binding.column(CanonicalField::Transaction), Some(2));

        let row = binding.extract(&data[0]);
        assert_eq!(row.get(CanonicalField::Actor), "User");
        assert_eq!(row.get(CanonicalField::Transaction), "Enter creds");
    }

    #[test]
    fn test_positional_fallback_with_extra_columns() {
        let header = strings(&["a", "b", "", "c", "d", "e", "f", "Ghi  chú"]);
        let data = vec![strings(&["1", "Login", "", "User", "Enter", "B", "Simple", "note"])];
        let binding = resolve_columns(&header, &data).unwrap();
        assert_eq!(binding.strategy, BindingStrategy::Positional);
        assert_eq!(binding.column(CanonicalField::Sequence), Some(0));
        assert_eq!(binding.column(CanonicalField::Name), Some(1));
        // 空列（インデックス2）は飛ばされる
        assert_eq!(binding.column(CanonicalField::Actor), Some(3));
        assert_eq!(binding.column(CanonicalField::Complexity), Some(6));
        assert_eq!(binding.extras, vec![("Ghi chú".to_string(), 7)]);
    }

    #[test]
    fn test_empty_transaction_column_triggers_positional() {
        // ヘッダーが1列ずれているケース
        let header = strings(&["STT", "Tên Use-case", "Tác nhân", "BMT", "Giao dịch", "Độ phức tạp", ""]);
        let data = vec![
            strings(&["1", "Login", "User", "Enter", "", "B", "Simple"]),
            strings(&["", "", "", "Submit", "", "", ""]),
        ];
        let binding = resolve_columns(&header, &data).unwrap();
        assert_eq!(binding.strategy, BindingStrategy::Positional);
        assert_eq!(binding.column(CanonicalField::Transaction), Some(3));
        assert_eq!(binding.column(CanonicalField::BusinessMeasure), Some(5));
    }

    #[test]
    fn test_partial_header_binding_kept_when_positional_impossible() {
        let header = strings(&["STT", "Tên Use-case", "Giao dịch"]);
        let data = vec![strings(&["1", "Login", "Enter"])];
        let binding = resolve_columns(&header, &data).unwrap();
        assert_eq!(binding.strategy, BindingStrategy::Header);
        assert_eq!(binding.column(CanonicalField::Actor), None);
        let row = binding.extract(&data[0]);
        assert_eq!(row.get(CanonicalField::Actor), "");
        assert_eq!(row.get(CanonicalField::Transaction), "Enter");
    }

    #[test]
    fn test_insufficient_columns_error() {
        let header = strings(&["foo", "bar"]);
        let data = vec![strings(&["1", "Login"])];
        let result = resolve_columns(&header, &data);
        assert!(matches!(
            result,
            Err(UcDocError::InsufficientColumns { found: 2, required: 6 })
        ));
    }

    #[test]
    fn test_forward_fill_marks_carried_cells() {
        let mut rows = vec![
            Row::new("1", "Login", "User", "Enter", "B", "Simple"),
            Row::new("", "", "", "Submit", "", ""),
        ];
        forward_fill(&mut rows, &HIERARCHY_FILL_FIELDS);
        assert_eq!(rows[1].get(CanonicalField::Name), "Login");
        assert!(rows[1].is_carried(CanonicalField::Name));
        assert_eq!(rows[1].get(CanonicalField::Sequence), "");
        assert!(!rows[1].is_carried(CanonicalField::Sequence));
        assert_eq!(rows[1].get(CanonicalField::Transaction), "Submit");
    }

    #[test]
    fn test_forward_fill_leading_blanks_stay_blank() {
        let mut rows = vec![
            Row::new("", "", "", "orphan", "", ""),
            Row::new("1", "Login", "", "", "", ""),
        ];
        forward_fill(&mut rows, &FLAT_FILL_FIELDS);
        assert_eq!(rows[0].get(CanonicalField::Sequence), "");
        assert!(!rows[0].is_carried(CanonicalField::Name));
    }

    proptest! {
        #[test]
        fn prop_forward_fill_is_identity_on_full_columns(
            values in proptest::collection::vec("[A-Za-z0-9]{1,8}", 1..30)
        ) {
            let mut rows: Vec<Row> = values
                .iter()
                .map(|v| Row::new(v, v, v, v, v, v))
                .collect();
            let before = rows.clone();
            forward_fill(&mut rows, &FLAT_FILL_FIELDS);
            prop_assert_eq!(rows, before);
        }

        #[test]
        fn prop_forward_fill_is_idempotent(
            values in proptest::collection::vec(prop_oneof!["", "[a-z]{1,4}"], 1..30)
        ) {
            let mut rows: Vec<Row> = values
                .iter()
                .map(|v| Row::new(v, v, "", "", "", ""))
                .collect();
            forward_fill(&mut rows, &FLAT_FILL_FIELDS);
            let once = rows.clone();
            forward_fill(&mut rows, &FLAT_FILL_FIELDS);
            prop_assert_eq!(rows, once);
        }
    }
}

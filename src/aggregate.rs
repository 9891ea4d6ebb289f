//! Record Aggregator Module
//!
//! 階層を持たないフラットなパイプライン。
//! 前方補完済みの行を (整数STT, Use-case名) の組でまとめ、
//! Use-caseごとに1件のレコードへ縮約します。

use std::collections::HashMap;

use tracing::trace;

use crate::columns::{CanonicalField, Row};
use crate::sequence::parse_integer_code;
use crate::types::FlatUseCaseRecord;

/// 行をUse-caseレコードへ集約する
///
/// 前提として、STT・名前・アクター・BMT・複雑度は前方補完済みであること
/// （トランザクション列は補完しない）。
///
/// - グループの順序は各キーの初出順
/// - STTが整数として読めない行（英字、ローマ数字、空欄）は除外
/// - スカラー項目はグループ内で最初の空でない値
/// - トランザクションは空でないセルを行順に連結し、
///   セル内の改行も1行1文に平坦化して`\n`で結合
///
/// # 使用例
///
/// ```rust
/// use ucdoc::{aggregate, Row};
///
/// let rows = vec![
///     Row::new("1", "Login", "User", "Enter creds", "", ""),
///     Row::new("1", "Login", "User", "Click submit", "", ""),
/// ];
/// let records = aggregate(&rows);
/// assert_eq!(records.len(), 1);
/// assert_eq!(records[0].transaction, "Enter creds\nClick submit");
/// ```
pub fn aggregate(rows: &[Row]) -> Vec<FlatUseCaseRecord> {
    let mut records: Vec<FlatUseCaseRecord> = Vec::new();
    let mut lines: Vec<Vec<String>> = Vec::new();
    let mut index: HashMap<(u64, String), usize> = HashMap::new();

    for (row_idx, row) in rows.iter().enumerate() {
        let Some(code) = parse_integer_code(row.get(CanonicalField::Sequence)) else {
            trace!(row = row_idx, "skipping row without integer sequence");
            continue;
        };
        let name = row.get(CanonicalField::Name).to_string();

        let slot = *index.entry((code, name.clone())).or_insert_with(|| {
            records.push(FlatUseCaseRecord {
                code,
                name,
                ..FlatUseCaseRecord::default()
            });
            lines.push(Vec::new());
            records.len() - 1
        });

        let record = &mut records[slot];
        fill_first(&mut record.actor, row.get(CanonicalField::Actor));
        fill_first(
            &mut record.business_measure,
            row.get(CanonicalField::BusinessMeasure),
        );
        fill_first(&mut record.complexity, row.get(CanonicalField::Complexity));

        lines[slot].extend(
            row.get(CanonicalField::Transaction)
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .map(str::to_string),
        );
    }

    for (record, record_lines) in records.iter_mut().zip(lines) {
        record.transaction = record_lines.join("\n");
    }
    records
}

fn fill_first(target: &mut String, value: &str) {
    if target.is_empty() && !value.trim().is_empty() {
        *target = value.trim().to_string();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::columns::{forward_fill, FLAT_FILL_FIELDS};
    use proptest::prelude::*;

    fn prepared(mut rows: Vec<Row>) -> Vec<FlatUseCaseRecord> {
        forward_fill(&mut rows, &FLAT_FILL_FIELDS);
        aggregate(&rows)
    }

    #[test]
    fn test_continuation_row_is_merged() {
        let records = prepared(vec![
            Row::new("1", "Login", "User", "Enter creds", "", ""),
            Row::new("", "", "", "Click submit", "", ""),
        ]);
        assert_eq!(
            records,
            vec![FlatUseCaseRecord {
                code: 1,
                name: "Login".to_string(),
                actor: "User".to_string(),
                transaction: "Enter creds\nClick submit".to_string(),
                ..FlatUseCaseRecord::default()
            }]
        );
    }

    #[test]
    fn test_multiline_cells_are_flattened() {
        let records = prepared(vec![Row::new(
            "3",
            "Search",
            "Guest",
            "  Open page \r\n\n  Type keyword\nPress enter  ",
            "",
            "",
        )]);
        assert_eq!(records[0].transaction, "Open page\nType keyword\nPress enter");
    }

    #[test]
    fn test_non_integer_groups_are_excluded() {
        let records = prepared(vec![
            Row::new("A", "Module", "", "", "", ""),
            Row::new("I", "Group", "", "", "", ""),
            Row::new("1.5", "Odd", "", "x", "", ""),
            Row::new("2.0", "Real", "", "y", "", ""),
        ]);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].code, 2);
        assert_eq!(records[0].name, "Real");
    }

    #[test]
    fn test_first_non_empty_scalar_wins() {
        let records = aggregate(&[
            Row::new("1", "Login", "", "", "", "Simple"),
            Row::new("1", "Login", "User", "", "B", "Complex"),
        ]);
        assert_eq!(records[0].actor, "User");
        assert_eq!(records[0].business_measure, "B");
        assert_eq!(records[0].complexity, "Simple");
    }

    #[test]
    fn test_same_code_different_name_are_separate() {
        let records = aggregate(&[
            Row::new("1", "Login", "", "a", "", ""),
            Row::new("1", "Logout", "", "b", "", ""),
            Row::new("1", "Login", "", "c", "", ""),
        ]);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].transaction, "a\nc");
        assert_eq!(records[1].transaction, "b");
    }

    proptest! {
        #[test]
        fn prop_order_follows_first_appearance(
            codes in proptest::collection::vec(1u64..20, 1..15),
            gaps in proptest::collection::vec(0usize..3, 15),
        ) {
            let mut rows = Vec::new();
            let mut expected: Vec<u64> = Vec::new();
            for (code, gap) in codes.iter().zip(&gaps) {
                rows.push(Row::new(&code.to_string(), &format!("UC{code}"), "", "t", "", ""));
                for _ in 0..*gap {
                    rows.push(Row::new("", "", "", "more", "", ""));
                }
                if !expected.contains(code) {
                    expected.push(*code);
                }
            }
            let records = prepared(rows);
            let actual: Vec<u64> = records.iter().map(|r| r.code).collect();
            prop_assert_eq!(actual, expected);
        }
    }
}

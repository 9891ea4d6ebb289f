//! Header Locator Module
//!
//! シート先頭の数十行からヘッダー行（STTラベルとUse-case名ラベルを含む行）を探すモジュール。

use tracing::{debug, warn};

use crate::api::HeaderPolicy;
use crate::columns::CanonicalField;
use crate::error::UcDocError;
use crate::normalize::normalize_text;

/// ヘッダー検出で走査する既定の行数
pub const DEFAULT_HEADER_SCAN_LIMIT: usize = 30;

/// ヘッダー行の候補を探す
///
/// 先頭`max_scan`行について、各セルを正規化し、STTラベル
/// （`stt` / `s` / `tt` / `#`）とUse-case名ラベル（`use-case`等を含むセル）の
/// 両方を含む最初の行を返します。見つからなければ、名前ラベル
/// （`ten use-case` / `ten usecase`）だけを持つ最初の行を探します。
///
/// 全セルが空の行は読み飛ばします。
pub fn locate_header(rows: &[Vec<String>], max_scan: usize) -> Option<usize> {
    let scanned: Vec<(usize, Vec<String>)> = rows
        .iter()
        .take(max_scan)
        .enumerate()
        .map(|(idx, row)| (idx, row.iter().map(|c| normalize_text(c)).collect::<Vec<_>>()))
        .filter(|(_, cells)| cells.iter().any(|c| !c.is_empty()))
        .collect();

    let has_sequence = |cells: &[String]| {
        cells
            .iter()
            .any(|c| CanonicalField::Sequence.synonyms().contains(&c.as_str()))
    };
    let has_name = |cells: &[String]| {
        cells.iter().any(|c| {
            CanonicalField::Name
                .synonyms()
                .iter()
                .any(|s| c.contains(s))
        })
    };

    scanned
        .iter()
        .find(|(_, cells)| has_sequence(cells) && has_name(cells))
        .or_else(|| {
            scanned.iter().find(|(_, cells)| {
                cells
                    .iter()
                    .any(|c| c == "ten use-case" || c == "ten usecase")
            })
        })
        .map(|(idx, _)| *idx)
}

/// ヘッダー行のインデックスを決定する
///
/// # エラー
///
/// * `UcDocError::HeaderNotFound` - `HeaderPolicy::Strict`で候補が見つからない場合
pub fn header_row(
    rows: &[Vec<String>],
    max_scan: usize,
    policy: HeaderPolicy,
) -> Result<usize, UcDocError> {
    match locate_header(rows, max_scan) {
        Some(idx) => {
            debug!(row = idx, "header row located");
            Ok(idx)
        }
        None => match policy {
            HeaderPolicy::Strict => Err(UcDocError::HeaderNotFound {
                scanned: max_scan.min(rows.len()),
            }),
            HeaderPolicy::Permissive => {
                warn!(scanned = max_scan.min(rows.len()), "header row not found; using row 0");
                Ok(0)
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sheet(rows: &[&[&str]]) -> Vec<Vec<String>> {
        rows.iter()
            .map(|r| r.iter().map(|c| c.to_string()).collect())
            .collect()
    }

    #[test]
    fn test_header_after_title_rows() {
        let rows = sheet(&[
            &["DANH SÁCH USE-CASE", "", ""],
            &["", "", ""],
            &["STT", "Tên Use-case", "Tác nhân"],
            &["1", "Login", "User"],
        ]);
        assert_eq!(locate_header(&rows, 30), Some(2));
    }

    #[test]
    fn test_header_with_synonyms() {
        let rows = sheet(&[&["TT", "Use case", "Actor"], &["1", "x", "y"]]);
        assert_eq!(locate_header(&rows, 30), Some(0));
    }

    #[test]
    fn test_title_containing_use_case_is_not_header() {
        // 名前ラベルだけではSTTラベルのある行が優先される
        let rows = sheet(&[
            &["Đặc tả use case", ""],
            &["S", "Tên use-case"],
        ]);
        assert_eq!(locate_header(&rows, 30), Some(1));
    }

    #[test]
    fn test_name_only_fallback() {
        let rows = sheet(&[&["Số", "Tên Use-case"], &["1", "Login"]]);
        assert_eq!(locate_header(&rows, 30), Some(0));
    }

    #[test]
    fn test_scan_limit() {
        let rows = sheet(&[&["x"], &["y"], &["STT", "Use-case"]]);
        assert_eq!(locate_header(&rows, 2), None);
        assert_eq!(locate_header(&rows, 3), Some(2));
    }

    #[test]
    fn test_policy() {
        let rows = sheet(&[&["a", "b"], &["1", "2"]]);
        assert_eq!(header_row(&rows, 30, HeaderPolicy::Permissive).unwrap(), 0);
        assert!(matches!(
            header_row(&rows, 30, HeaderPolicy::Strict),
            Err(UcDocError::HeaderNotFound { scanned: 2 })
        ));
    }
}

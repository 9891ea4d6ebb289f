//! Error Types Module
//!
//! クレート全体で使用する構造化エラー型を定義するモジュール。
//! `thiserror`を使用して、エラーの自動変換とメッセージフォーマットを実現する。

use thiserror::Error;

use crate::columns::CanonicalField;

/// ucdocクレート全体で使用するエラー型
///
/// スプレッドシートの読み込み、ヘッダー検出、列解決、Word文書の生成中に
/// 発生するすべてのエラーを統一的に扱うために使用されます。
///
/// # エラーの分類
///
/// - 構造エラー（致命的）: `HeaderNotFound`, `InsufficientColumns`,
///   `MissingColumn`, `NoUseCaseData`
/// - 入出力エラー: `Io`, `Parse`, `Xml`, `Zip`, `Json`
/// - 設定エラー: `Config`, `SecurityViolation`
///
/// 重複・欠番などのデータ品質の指摘はエラーではなく、
/// [`SequenceReport`](crate::SequenceReport)として報告されます。
///
/// # 使用例
///
/// ```rust,no_run
/// use ucdoc::UcDocError;
/// use std::fs::File;
///
/// fn open_input(path: &str) -> Result<File, UcDocError> {
///     let file = File::open(path)?; // Ioエラーが自動的に変換される
///     Ok(file)
/// }
/// ```
#[derive(Error, Debug)]
pub enum UcDocError {
    /// I/O操作中に発生したエラー
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// スプレッドシートの解析中に発生したエラー（calamine由来）
    #[error("Failed to parse spreadsheet: {0}")]
    Parse(#[from] calamine::Error),

    /// Word文書のXML生成中に発生したエラー
    #[error("XML write error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// DOCXパッケージ（ZIPアーカイブ）の書き込みエラー
    #[error("ZIP archive error: {0}")]
    Zip(String),

    /// 変換レポートのJSONシリアライズエラー
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// 設定の検証に失敗したエラー
    ///
    /// `ConverterBuilder::build()`時、またはシート選択時に発生します。
    #[error("Configuration error: {0}")]
    Config(String),

    /// ヘッダー行が見つからない
    ///
    /// `HeaderPolicy::Strict`の場合のみ発生します。
    #[error("Header row not found in the first {scanned} rows: missing \"STT\" / \"Tên Use-case\" labels")]
    HeaderNotFound {
        /// 走査した行数
        scanned: usize,
    },

    /// 位置による列割り当てにも列数が足りない
    #[error("Not enough columns to map by position: found {found}, required {required}")]
    InsufficientColumns {
        /// 空でない列の数
        found: usize,
        /// 必要な列の数
        required: usize,
    },

    /// 列解決後も必須列が存在しない
    #[error("Required column '{}' is missing after column resolution", .0.label())]
    MissingColumn(CanonicalField),

    /// Use-caseが1件も見つからない
    #[error("No use-case data found")]
    NoUseCaseData,

    /// セキュリティ制限に違反したエラー
    ///
    /// 入力ファイルサイズや行数の上限を超えた場合に発生します。
    #[error("Security violation: {0}")]
    SecurityViolation(String),
}

impl From<zip::result::ZipError> for UcDocError {
    fn from(err: zip::result::ZipError) -> Self {
        UcDocError::Zip(err.to_string())
    }
}

impl UcDocError {
    /// 入力データの構造に起因するエラーかどうか
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            UcDocError::HeaderNotFound { .. }
                | UcDocError::InsufficientColumns { .. }
                | UcDocError::MissingColumn(_)
                | UcDocError::NoUseCaseData
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_io_error() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "File not found");
        let error: UcDocError = io_err.into();

        match error {
            UcDocError::Io(e) => {
                assert_eq!(e.kind(), io::ErrorKind::NotFound);
                assert_eq!(e.to_string(), "File not found");
            }
            _ => panic!("Expected Io error"),
        }
    }

    #[test]
    fn test_parse_error_display() {
        let parse_err = calamine::Error::Msg("Corrupted file");
        let error: UcDocError = parse_err.into();

        let error_msg = error.to_string();
        assert!(error_msg.contains("Failed to parse spreadsheet"));
        assert!(error_msg.contains("Corrupted file"));
    }

    #[test]
    fn test_zip_error_conversion() {
        let error: UcDocError = zip::result::ZipError::FileNotFound.into();
        assert!(matches!(error, UcDocError::Zip(_)));
        assert!(error.to_string().starts_with("ZIP archive error"));
    }

    #[test]
    fn test_missing_column_display_uses_label() {
        let error = UcDocError::MissingColumn(CanonicalField::Name);
        assert_eq!(
            error.to_string(),
            "Required column 'Tên Use-case' is missing after column resolution"
        );
    }

    #[test]
    fn test_insufficient_columns_display() {
        let error = UcDocError::InsufficientColumns {
            found: 4,
            required: 6,
        };
        assert!(error.to_string().contains("found 4, required 6"));
    }

    #[test]
    fn test_structural_classification() {
        assert!(UcDocError::NoUseCaseData.is_structural());
        assert!(UcDocError::HeaderNotFound { scanned: 30 }.is_structural());
        assert!(UcDocError::MissingColumn(CanonicalField::Sequence).is_structural());
        assert!(!UcDocError::Config("x".to_string()).is_structural());
        assert!(!UcDocError::Io(io::Error::other("x")).is_structural());
    }

    #[test]
    fn test_error_conversion_with_question_mark() {
        fn io_operation() -> Result<(), UcDocError> {
            let _file = std::fs::File::open("nonexistent_file.xlsx")?;
            Ok(())
        }

        match io_operation() {
            Err(UcDocError::Io(_)) => {}
            _ => panic!("Expected Io error from ? operator"),
        }
    }
}

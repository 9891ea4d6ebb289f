//! Security Module
//!
//! 入力スプレッドシートに対する資源制限を定義するモジュール。
//! 入力はすべてメモリ上で処理されるため、サイズと行数に上限を設けます。

use crate::error::UcDocError;

/// セキュリティ設定
#[derive(Debug, Clone)]
pub(crate) struct SecurityConfig {
    /// 入力ファイルの最大サイズ（バイト）
    /// デフォルト: 100MB (104_857_600 bytes)
    pub max_input_file_size: u64,
    /// 1シートの最大行数
    /// デフォルト: 1,048,576（Excelの上限）
    pub max_rows: usize,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            max_input_file_size: 104_857_600,
            max_rows: 1_048_576,
        }
    }
}

impl SecurityConfig {
    /// 入力サイズを検証する
    pub fn check_input_size(&self, bytes: u64) -> Result<(), UcDocError> {
        if bytes > self.max_input_file_size {
            return Err(UcDocError::SecurityViolation(format!(
                "Input file size exceeds maximum: {} bytes (max: {} bytes)",
                bytes, self.max_input_file_size
            )));
        }
        Ok(())
    }

    /// シートの行数を検証する
    pub fn check_row_count(&self, rows: usize) -> Result<(), UcDocError> {
        if rows > self.max_rows {
            return Err(UcDocError::SecurityViolation(format!(
                "Sheet has too many rows: {} (max: {})",
                rows, self.max_rows
            )));
        }
        Ok(())
    }
}

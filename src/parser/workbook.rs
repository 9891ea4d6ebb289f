//! Workbook Parser
//!
//! calamineのラッパーとして、シート選択とセル値の文字列化を提供します。

use calamine::{open_workbook_auto_from_rs, Data, Range, Reader, Sheets};
use std::io::{Cursor, Read, Seek};
use tracing::debug;

use crate::api::{DateFormat, SheetSelector};
use crate::error::UcDocError;
use crate::formatter::CellFormatter;
use crate::security::SecurityConfig;

/// ワークブックパーサー
///
/// 入力は一度メモリに読み込まれ、形式（xlsx / xlsm / xls / ods）は自動判別されます。
pub(crate) struct WorkbookParser {
    workbook: Sheets<Cursor<Vec<u8>>>,
    security: SecurityConfig,
}

impl WorkbookParser {
    /// ワークブックを開く
    ///
    /// # 戻り値
    ///
    /// * `Ok(WorkbookParser)` - 読み込みに成功した場合
    /// * `Err(UcDocError::SecurityViolation)` - 入力サイズが上限を超えた場合
    /// * `Err(UcDocError::Parse)` - スプレッドシートとして解析できない場合
    pub fn open<R: Read + Seek>(mut reader: R) -> Result<Self, UcDocError> {
        let security = SecurityConfig::default();

        let mut buffer = Vec::new();
        let bytes_read = reader.read_to_end(&mut buffer)?;
        security.check_input_size(bytes_read as u64)?;

        let workbook = open_workbook_auto_from_rs(Cursor::new(buffer))?;
        debug!(bytes = bytes_read, "workbook opened");

        Ok(Self { workbook, security })
    }

    /// すべてのシート名を取得
    pub fn sheet_names(&self) -> Vec<String> {
        self.workbook.sheet_names()
    }

    /// シート選択方式に基づいてシート名を解決する
    ///
    /// # エラー
    ///
    /// * `UcDocError::Config` - シートが見つからない、またはインデックスが範囲外の場合
    pub fn select_sheet(&self, selector: &SheetSelector) -> Result<String, UcDocError> {
        let names = self.sheet_names();
        match selector {
            SheetSelector::Index(index) => names.get(*index).cloned().ok_or_else(|| {
                UcDocError::Config(format!(
                    "Sheet index {} is out of range (total: {})",
                    index,
                    names.len()
                ))
            }),
            SheetSelector::Name(name) => {
                if names.contains(name) {
                    Ok(name.clone())
                } else {
                    Err(UcDocError::Config(format!("Sheet '{}' not found", name)))
                }
            }
        }
    }

    /// シートを読み込み、セル値を文字列化した行の配列を返す
    ///
    /// 行・列のインデックスはシート上の位置（0始まり）と一致します。
    /// calamineの使用範囲が`B3`から始まる場合でも、先頭の空行・空列を補います。
    pub fn read_rows(
        &mut self,
        selector: &SheetSelector,
        date_format: &DateFormat,
    ) -> Result<Vec<Vec<String>>, UcDocError> {
        let sheet_name = self.select_sheet(selector)?;
        let range = self.workbook.worksheet_range(&sheet_name)?;
        self.security.check_row_count(range.height())?;

        let rows = to_text_rows(&range, date_format);
        debug!(sheet = %sheet_name, rows = rows.len(), "sheet loaded");
        Ok(rows)
    }
}

/// calamineの範囲を文字列の2次元配列に変換する
fn to_text_rows(range: &Range<Data>, date_format: &DateFormat) -> Vec<Vec<String>> {
    let Some((start_row, start_col)) = range.start() else {
        return Vec::new();
    };
    let (start_row, start_col) = (start_row as usize, start_col as usize);
    let width = start_col + range.width();

    let formatter = CellFormatter::new();
    let mut rows = vec![vec![String::new(); width]; start_row];
    rows.reserve(range.height());

    for row in range.rows() {
        let mut cells = vec![String::new(); start_col];
        cells.reserve(row.len());
        for cell in row {
            cells.push(formatter.format_cell(cell, date_format));
        }
        rows.push(cells);
    }
    rows
}

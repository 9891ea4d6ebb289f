//! Formatter Module
//!
//! calamineのセル値を表示用の文字列へ変換するモジュール。
//! 整数値の浮動小数点（`1.0`）はこの段階で`"1"`に正規化されます。

use calamine::Data;
use chrono::{Duration, NaiveDate};

use crate::api::DateFormat;

/// `NaiveDate`が表せる範囲（約±26万年）に収まるシリアル日数の上限
const MAX_SERIAL_DAYS: f64 = 95_000_000.0;

/// セルフォーマッター
///
/// セル値のフォーマット処理のファサードとして機能します。
#[derive(Debug)]
pub(crate) struct CellFormatter {
    date_formatter: DateFormatter,
    number_formatter: NumberFormatter,
}

impl CellFormatter {
    pub fn new() -> Self {
        Self {
            date_formatter: DateFormatter,
            number_formatter: NumberFormatter,
        }
    }

    /// セル値をフォーマット
    ///
    /// # 引数
    ///
    /// * `cell` - calamineのセルデータ
    /// * `date_format` - 日付セルの出力形式
    ///
    /// 空セルは空文字列になります。日付として表せないシリアル値は数値として出力します。
    pub fn format_cell(&self, cell: &Data, date_format: &DateFormat) -> String {
        match cell {
            Data::Int(i) => i.to_string(),
            Data::Float(f) => self.number_formatter.format(*f),
            Data::String(s) => s.clone(),
            Data::Bool(b) => if *b { "TRUE" } else { "FALSE" }.to_string(),
            Data::DateTime(dt) => {
                if dt.is_duration() {
                    self.number_formatter.format(dt.as_f64())
                } else {
                    let serial = dt.as_f64();
                    self.date_formatter
                        .format(serial, date_format)
                        .unwrap_or_else(|| self.number_formatter.format(serial))
                }
            }
            Data::DateTimeIso(s) | Data::DurationIso(s) => s.clone(),
            Data::Error(e) => format!("{:?}", e),
            Data::Empty => String::new(),
        }
    }
}

/// 日付フォーマッター
///
/// Excelのシリアル日付値（1900年システム）を文字列に変換します。
#[derive(Debug)]
pub(crate) struct DateFormatter;

impl DateFormatter {
    /// シリアル値をフォーマット
    ///
    /// 1899年12月30日起算。シリアル値61以降（1900年3月1日以降）は
    /// Excelの1900年うるう年バグの影響を受けません。
    ///
    /// 日付として表せないシリアル値（範囲外・非有限）の場合は`None`を返します。
    pub fn format(&self, serial_value: f64, date_format: &DateFormat) -> Option<String> {
        if !serial_value.is_finite() {
            return None;
        }
        let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?;

        let days = serial_value.floor();
        if days.abs() > MAX_SERIAL_DAYS {
            return None;
        }
        let date = epoch.checked_add_signed(Duration::try_days(days as i64)?)?;

        let formatted = match date_format {
            DateFormat::Iso8601 => date.format("%Y-%m-%d").to_string(),
            DateFormat::Custom(format_str) => date.format(format_str).to_string(),
        };
        Some(formatted)
    }
}

/// 数値フォーマッター
#[derive(Debug)]
pub(crate) struct NumberFormatter;

impl NumberFormatter {
    /// 整数値は小数部なし、それ以外は最短表現で出力する
    pub fn format(&self, value: f64) -> String {
        if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e15 {
            format!("{}", value as i64)
        } else {
            value.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use calamine::{ExcelDateTime, ExcelDateTimeType};

    fn format(cell: Data) -> String {
        CellFormatter::new()
            .format_cell(&cell, &DateFormat::Iso8601)
    }

    #[test]
    fn test_integral_float_has_no_fraction() {
        assert_eq!(format(Data::Float(1.0)), "1");
        assert_eq!(format(Data::Float(-3.0)), "-3");
        assert_eq!(format(Data::Int(42)), "42");
    }

    #[test]
    fn test_fractional_float() {
        assert_eq!(format(Data::Float(1.5)), "1.5");
        assert_eq!(format(Data::Float(0.1)), "0.1");
    }

    #[test]
    fn test_string_is_verbatim() {
        assert_eq!(format(Data::String("  Đăng nhập ".to_string())), "  Đăng nhập ");
    }

    #[test]
    fn test_bool_and_empty() {
        assert_eq!(format(Data::Bool(true)), "TRUE");
        assert_eq!(format(Data::Bool(false)), "FALSE");
        assert_eq!(format(Data::Empty), "");
    }

    #[test]
    fn test_date_serial_iso() {
        let formatter = DateFormatter;
        // 45658 = 2025-01-01
        assert_eq!(
            formatter.format(45658.0, &DateFormat::Iso8601).unwrap(),
            "2025-01-01"
        );
        assert_eq!(
            formatter.format(45658.75, &DateFormat::Iso8601).unwrap(),
            "2025-01-01"
        );
    }

    #[test]
    fn test_date_serial_custom() {
        let formatter = DateFormatter;
        assert_eq!(
            formatter
                .format(45658.0, &DateFormat::Custom("%d/%m/%Y".to_string()))
                .unwrap(),
            "01/01/2025"
        );
    }

    #[test]
    fn test_date_serial_out_of_range() {
        let formatter = DateFormatter;
        assert_eq!(formatter.format(1e20, &DateFormat::Iso8601), None);
        assert_eq!(formatter.format(-1e20, &DateFormat::Iso8601), None);
        assert_eq!(formatter.format(f64::NAN, &DateFormat::Iso8601), None);
    }

    #[test]
    fn test_out_of_range_date_cell_falls_back_to_number() {
        let cell = Data::DateTime(ExcelDateTime::new(
            1e20,
            ExcelDateTimeType::DateTime,
            false,
        ));
        assert_eq!(format(cell), "100000000000000000000");

        let cell = Data::DateTime(ExcelDateTime::new(
            45658.0,
            ExcelDateTimeType::DateTime,
            false,
        ));
        assert_eq!(format(cell), "2025-01-01");
    }
}

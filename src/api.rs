//! Public API Types
//!
//! 公開APIで使用する列挙型を定義するモジュール。

use serde::Serialize;

/// 出力文書のレイアウト
///
/// レイアウトごとに上流のパイプラインが決まります。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[non_exhaustive]
pub enum OutputLayout {
    /// Use-caseごとに見出しと8行×2列の表を出力（デフォルト）
    ///
    /// フラットなレコード集約パイプラインを使用します。
    PerUseCase,

    /// モジュール・グループ・Use-caseを1つの6列の表にまとめて出力
    ///
    /// 階層構築パイプラインを使用します。
    /// モジュール行は薄緑、グループ行は薄青で塗りつぶされます。
    Consolidated,
}

/// ヘッダー行が見つからなかったときの扱い
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum HeaderPolicy {
    /// `UcDocError::HeaderNotFound`を返す
    Strict,

    /// 先頭行をヘッダーとみなす（デフォルト）
    ///
    /// 列はラベル照合に失敗した場合、位置によって割り当てられます。
    Permissive,
}

/// Use-case見出しに付ける番号
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum TitleNumbering {
    /// レコード自身のSTT（デフォルト）
    SequenceCode,

    /// 1始まりの通し番号
    RunningIndex,
}

/// 日付セルの出力形式
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum DateFormat {
    /// ISO 8601形式（YYYY-MM-DD）
    Iso8601,

    /// カスタム形式（chrono互換フォーマット文字列）
    ///
    /// ```rust,no_run
    /// use ucdoc::{ConverterBuilder, DateFormat};
    ///
    /// # fn main() -> Result<(), ucdoc::UcDocError> {
    /// let converter = ConverterBuilder::new()
    ///     .with_date_format(DateFormat::Custom("%d/%m/%Y".to_string()))
    ///     .build()?;
    /// # Ok(())
    /// # }
    /// ```
    Custom(String),
}

/// シート選択方式
///
/// 入力として使用するのは1シートのみです。
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SheetSelector {
    /// インデックス指定（0始まり、デフォルトは先頭シート）
    Index(usize),

    /// シート名指定
    Name(String),
}

/// 本文フォント
#[derive(Debug, Clone, PartialEq)]
pub struct FontSpec {
    /// フォント名
    pub name: String,
    /// サイズ（ポイント）
    pub size_pt: f32,
}

impl Default for FontSpec {
    fn default() -> Self {
        Self {
            name: "Times New Roman".to_string(),
            size_pt: 12.0,
        }
    }
}

impl FontSpec {
    /// WordprocessingMLのサイズ単位（半ポイント）
    pub(crate) fn half_points(&self) -> u32 {
        (self.size_pt * 2.0).round() as u32
    }
}

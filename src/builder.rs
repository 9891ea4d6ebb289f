//! Builder Module
//!
//! Fluent Builder APIを提供し、`Converter`インスタンスを段階的に構築する。
//! `Converter`は読み込みから文書の保存までのパイプライン全体のファサードです。

use chrono::format::{Item, StrftimeItems};
use serde::Serialize;
use std::fs::File;
use std::io::{BufReader, Read, Seek, Write};
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

use crate::aggregate::aggregate;
use crate::api::{DateFormat, FontSpec, HeaderPolicy, OutputLayout, SheetSelector, TitleNumbering};
use crate::columns::{
    forward_fill, resolve_columns, BindingStrategy, CanonicalField, Row, FLAT_FILL_FIELDS,
    HIERARCHY_FILL_FIELDS,
};
use crate::error::UcDocError;
use crate::header::{header_row, DEFAULT_HEADER_SCAN_LIMIT};
use crate::hierarchy::build_hierarchy;
use crate::output::{RenderOptions, Renderer};
use crate::parser::WorkbookParser;
use crate::sequence::SequenceReport;
use crate::types::{count_use_cases, FlatUseCaseRecord, Module};

/// 変換処理の設定を保持する内部構造体
#[derive(Debug, Clone)]
pub(crate) struct ConversionConfig {
    /// 出力レイアウト
    pub layout: OutputLayout,

    /// シート選択方式
    pub sheet_selector: SheetSelector,

    /// ヘッダー未検出時の扱い
    pub header_policy: HeaderPolicy,

    /// ヘッダー検出で走査する行数
    pub header_scan_limit: usize,

    /// 日付形式
    pub date_format: DateFormat,

    /// 本文フォント
    pub font: FontSpec,

    /// Use-case見出しの番号
    pub title_numbering: TitleNumbering,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            layout: OutputLayout::PerUseCase,
            sheet_selector: SheetSelector::Index(0),
            header_policy: HeaderPolicy::Permissive,
            header_scan_limit: DEFAULT_HEADER_SCAN_LIMIT,
            date_format: DateFormat::Iso8601,
            font: FontSpec::default(),
            title_numbering: TitleNumbering::SequenceCode,
        }
    }
}

/// Fluent Builder APIを提供する構造体
///
/// すべての設定項目にデフォルト値が設定されており、必要な設定のみをオーバーライドできます。
///
/// # 使用例
///
/// ```rust,no_run
/// use ucdoc::{ConverterBuilder, OutputLayout, SheetSelector};
///
/// # fn main() -> Result<(), ucdoc::UcDocError> {
/// let converter = ConverterBuilder::new()
///     .with_layout(OutputLayout::Consolidated)
///     .with_sheet_selector(SheetSelector::Name("Use-case".to_string()))
///     .build()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct ConverterBuilder {
    config: ConversionConfig,
}

impl Default for ConverterBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ConverterBuilder {
    /// デフォルト設定を持つビルダーインスタンスを生成する
    ///
    /// # デフォルト設定
    ///
    /// - レイアウト: Use-caseごとの表
    /// - シート: 先頭シート
    /// - ヘッダー未検出時: 先頭行をヘッダーとみなす
    /// - ヘッダー走査行数: 30
    /// - 日付形式: ISO 8601 (YYYY-MM-DD)
    /// - フォント: Times New Roman 12pt
    /// - 見出し番号: レコード自身のSTT
    pub fn new() -> Self {
        Self {
            config: ConversionConfig::default(),
        }
    }

    /// 出力レイアウトを指定する
    pub fn with_layout(mut self, layout: OutputLayout) -> Self {
        self.config.layout = layout;
        self
    }

    /// 入力シートを選択する
    ///
    /// ```rust,no_run
    /// use ucdoc::{ConverterBuilder, SheetSelector};
    ///
    /// let builder = ConverterBuilder::new()
    ///     .with_sheet_selector(SheetSelector::Index(1));
    /// ```
    pub fn with_sheet_selector(mut self, selector: SheetSelector) -> Self {
        self.config.sheet_selector = selector;
        self
    }

    /// ヘッダー行が見つからないときの扱いを指定する
    pub fn with_header_policy(mut self, policy: HeaderPolicy) -> Self {
        self.config.header_policy = policy;
        self
    }

    /// ヘッダー検出で走査する行数を指定する（1以上）
    pub fn with_header_scan_limit(mut self, rows: usize) -> Self {
        self.config.header_scan_limit = rows;
        self
    }

    /// 日付セルの出力形式を指定する
    pub fn with_date_format(mut self, format: DateFormat) -> Self {
        self.config.date_format = format;
        self
    }

    /// 本文フォントを指定する
    pub fn with_font(mut self, font: FontSpec) -> Self {
        self.config.font = font;
        self
    }

    /// Use-case見出しの番号の付け方を指定する
    pub fn with_title_numbering(mut self, numbering: TitleNumbering) -> Self {
        self.config.title_numbering = numbering;
        self
    }

    /// 設定を検証し、`Converter`インスタンスを生成する
    ///
    /// # 戻り値
    ///
    /// * `Ok(Converter)` - 設定が妥当な場合
    /// * `Err(UcDocError::Config)` - 以下のいずれかの場合
    ///   * ヘッダー走査行数が0
    ///   * カスタム日付形式が空、または不正な書式指定子を含む
    ///   * フォント名が空、またはサイズが1〜96ptの範囲外
    pub fn build(self) -> Result<Converter, UcDocError> {
        // 1. ヘッダー走査行数
        if self.config.header_scan_limit == 0 {
            return Err(UcDocError::Config(
                "Header scan limit must be at least 1".to_string(),
            ));
        }

        // 2. カスタム日付形式
        if let DateFormat::Custom(ref format_str) = self.config.date_format {
            let invalid = format_str.is_empty()
                || StrftimeItems::new(format_str).any(|item| matches!(item, Item::Error));
            if invalid {
                return Err(UcDocError::Config(format!(
                    "Invalid date format string: '{}'",
                    format_str
                )));
            }
        }

        // 3. フォント
        let font = &self.config.font;
        if font.name.trim().is_empty() {
            return Err(UcDocError::Config("Font name must not be empty".to_string()));
        }
        if !(1.0..=96.0).contains(&font.size_pt) {
            return Err(UcDocError::Config(format!(
                "Font size out of range: {}pt (expected 1-96)",
                font.size_pt
            )));
        }

        Ok(Converter::new(self.config))
    }
}

/// 変換結果のレポート
///
/// CLIでは標準出力に表示され、`--report-json`指定時はJSONとして出力されます。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConversionReport {
    /// 出力レイアウト
    pub layout: OutputLayout,
    /// 入力シート名
    pub sheet: String,
    /// ヘッダー行のインデックス（0始まり）
    pub header_row: usize,
    /// 列割り当ての方法
    pub binding: BindingStrategy,
    /// 位置割り当てで残った列の名前
    pub extra_columns: Vec<String>,
    /// モジュール数（階層レイアウトのみ）
    pub module_count: Option<usize>,
    /// 出力したUse-case数
    pub use_case_count: usize,
    /// STT列のデータ品質
    pub sequence: SequenceReport,
}

/// 読み込み・ヘッダー検出・列解決を終えたシート
#[derive(Debug)]
struct PreparedSheet {
    sheet: String,
    header_row: usize,
    binding: BindingStrategy,
    extra_columns: Vec<String>,
    rows: Vec<Row>,
    sequence: SequenceReport,
}

/// 変換処理のファサード
///
/// # 使用例
///
/// ```rust,no_run
/// use ucdoc::ConverterBuilder;
/// use std::path::Path;
///
/// # fn main() -> Result<(), ucdoc::UcDocError> {
/// let converter = ConverterBuilder::new().build()?;
/// let report = converter.convert_file(Path::new("usecases.xlsx"), Path::new("usecases.docx"))?;
/// println!("{} use-cases", report.use_case_count);
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Converter {
    config: ConversionConfig,
}

impl Converter {
    pub(crate) fn new(config: ConversionConfig) -> Self {
        Self { config }
    }

    /// 入力を階層ツリー（モジュール → グループ → Use-case）に変換する
    ///
    /// 出力レイアウトの設定に関係なく階層パイプラインを使用します。
    pub fn build_tree<R: Read + Seek>(&self, input: R) -> Result<Vec<Module>, UcDocError> {
        let prepared = self.prepare(input)?;
        Ok(hierarchy_pipeline(prepared.rows))
    }

    /// 入力をフラットなUse-caseレコードの列に変換する
    ///
    /// 出力レイアウトの設定に関係なく集約パイプラインを使用します。
    pub fn aggregate_records<R: Read + Seek>(
        &self,
        input: R,
    ) -> Result<Vec<FlatUseCaseRecord>, UcDocError> {
        let prepared = self.prepare(input)?;
        Ok(flat_pipeline(prepared.rows))
    }

    /// スプレッドシートをWord文書に変換する
    ///
    /// # 引数
    ///
    /// * `input` - スプレッドシートを読み込むためのリーダー（Read + Seekトレイトを実装）
    /// * `output` - `.docx`の出力先（Writeトレイトを実装）
    ///
    /// # 戻り値
    ///
    /// * `Ok(ConversionReport)` - 変換に成功した場合
    /// * `Err(UcDocError::NoUseCaseData)` - Use-caseが1件も得られなかった場合
    /// * `Err(UcDocError)` - その他の構造エラー・入出力エラー
    ///
    /// # 処理フロー
    ///
    /// 1. シートの読み込みとヘッダー検出
    /// 2. 列解決とSTT列の品質分析
    /// 3. 前方補完と階層構築（またはレコード集約）
    /// 4. 文書の描画と書き出し
    ///
    /// 文書はメモリ上で完成させてから書き出されるため、
    /// エラー時に`output`へ途中までの内容が書き込まれることはありません。
    pub fn convert<R: Read + Seek, W: Write>(
        &self,
        input: R,
        mut output: W,
    ) -> Result<ConversionReport, UcDocError> {
        let prepared = self.prepare(input)?;
        let options = RenderOptions {
            font: self.config.font.clone(),
            title_numbering: self.config.title_numbering,
        };

        let (document, module_count, use_case_count) = match self.config.layout {
            OutputLayout::Consolidated => {
                let modules = hierarchy_pipeline(prepared.rows);
                let use_cases = count_use_cases(&modules);
                info!(modules = modules.len(), use_cases, "hierarchy built");
                (
                    Renderer::Consolidated(&modules).render(&options),
                    Some(modules.len()),
                    use_cases,
                )
            }
            OutputLayout::PerUseCase => {
                let records = flat_pipeline(prepared.rows);
                info!(use_cases = records.len(), "records aggregated");
                (
                    Renderer::PerUseCase(&records).render(&options),
                    None,
                    records.len(),
                )
            }
        };

        if use_case_count == 0 {
            return Err(UcDocError::NoUseCaseData);
        }

        document.save(&mut output)?;
        debug!(tables = document.table_count(), "document written");

        Ok(ConversionReport {
            layout: self.config.layout,
            sheet: prepared.sheet,
            header_row: prepared.header_row,
            binding: prepared.binding,
            extra_columns: prepared.extra_columns,
            module_count,
            use_case_count,
            sequence: prepared.sequence,
        })
    }

    /// ファイルからファイルへ変換する
    ///
    /// 出力先と同じディレクトリに一時ファイルを作成して書き込み、
    /// 成功した場合のみ出力先へ置き換えます。失敗時に出力先が壊れることはありません。
    pub fn convert_file(&self, input: &Path, output: &Path) -> Result<ConversionReport, UcDocError> {
        let reader = BufReader::new(File::open(input)?);

        let parent = output
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        let mut temp = NamedTempFile::new_in(parent)?;

        let report = self.convert(reader, temp.as_file_mut())?;
        temp.persist(output).map_err(|e| UcDocError::Io(e.error))?;
        info!(path = %output.display(), "saved");
        Ok(report)
    }

    /// シートの読み込みから列解決までを行う
    fn prepare<R: Read + Seek>(&self, input: R) -> Result<PreparedSheet, UcDocError> {
        let mut parser = WorkbookParser::open(input)?;
        let sheet = parser.select_sheet(&self.config.sheet_selector)?;
        let cells = parser.read_rows(&self.config.sheet_selector, &self.config.date_format)?;

        let header_idx = header_row(
            &cells,
            self.config.header_scan_limit,
            self.config.header_policy,
        )?;
        let header = cells.get(header_idx).cloned().unwrap_or_default();
        let data = cells.get(header_idx + 1..).unwrap_or_default();

        let binding = resolve_columns(&header, data)?;
        let rows: Vec<Row> = data.iter().map(|cells| binding.extract(cells)).collect();

        let sequence =
            SequenceReport::analyze(rows.iter().map(|row| row.get(CanonicalField::Sequence)));
        if sequence.is_clean() {
            info!(total = sequence.total, "sequence numbers are consistent");
        } else {
            warn!(
                total = sequence.total,
                duplicates = ?sequence.duplicates,
                missing = ?sequence.missing,
                "sequence number anomalies"
            );
        }

        Ok(PreparedSheet {
            sheet,
            header_row: header_idx,
            binding: binding.strategy,
            extra_columns: binding.extras.into_iter().map(|(name, _)| name).collect(),
            rows,
            sequence,
        })
    }
}

fn hierarchy_pipeline(mut rows: Vec<Row>) -> Vec<Module> {
    forward_fill(&mut rows, &HIERARCHY_FILL_FIELDS);
    build_hierarchy(&rows)
}

fn flat_pipeline(mut rows: Vec<Row>) -> Vec<FlatUseCaseRecord> {
    forward_fill(&mut rows, &FLAT_FILL_FIELDS);
    aggregate(&rows)
}

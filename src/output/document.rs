//! Document Builder
//!
//! WordprocessingML（.docx）のインメモリモデルと、その書き出し処理。
//! 段落・ラン・表だけを扱う最小限のパッケージを生成します。

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use std::io::{Cursor, Seek, Write};
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::api::FontSpec;
use crate::error::UcDocError;

const NS_W: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";

/// 本文幅（Letter、左右余白1インチ、単位はtwip）
const TEXT_WIDTH_DXA: u32 = 9360;

const CONTENT_TYPES_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/><Override PartName="/word/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.styles+xml"/></Types>"#;

const PACKAGE_RELS_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/></Relationships>"#;

const DOCUMENT_RELS_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/></Relationships>"#;

/// 書式付きテキストの断片
///
/// テキスト中の改行（`\n`）は行区切り（`<w:br/>`）として出力されます。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Run {
    pub text: String,
    pub bold: bool,
    pub italic: bool,
    /// 蛍光ペンの色（`yellow`など、WordprocessingMLの色名）
    pub highlight: Option<&'static str>,
}

impl Run {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    pub fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    pub fn italic(mut self) -> Self {
        self.italic = true;
        self
    }

    pub fn highlight(mut self, color: &'static str) -> Self {
        self.highlight = Some(color);
        self
    }
}

/// 段落
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Paragraph {
    pub runs: Vec<Run>,
    pub centered: bool,
}

impl Paragraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_run(mut self, run: Run) -> Self {
        self.runs.push(run);
        self
    }

    pub fn centered(mut self) -> Self {
        self.centered = true;
        self
    }

    /// 段落内のテキストを連結して返す（改行は`\n`のまま）
    pub fn text(&self) -> String {
        self.runs.iter().map(|r| r.text.as_str()).collect()
    }
}

/// 表のセル
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableCell {
    pub paragraph: Paragraph,
    /// 横方向に結合する列数（1以上）
    pub span: usize,
    /// 背景色（`RRGGBB`）
    pub shading: Option<String>,
}

impl TableCell {
    pub fn new(paragraph: Paragraph) -> Self {
        Self {
            paragraph,
            span: 1,
            shading: None,
        }
    }

    pub fn empty() -> Self {
        Self::new(Paragraph::new())
    }

    pub fn span(mut self, span: usize) -> Self {
        self.span = span.max(1);
        self
    }

    pub fn shaded(mut self, fill: &str) -> Self {
        self.shading = Some(fill.to_string());
        self
    }
}

/// 罫線付きの表
///
/// 罫線はすべて黒の実線（1pt）です。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    columns: usize,
    rows: Vec<Vec<TableCell>>,
}

impl Table {
    pub fn new(columns: usize) -> Self {
        Self {
            columns: columns.max(1),
            rows: Vec::new(),
        }
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    pub fn rows(&self) -> &[Vec<TableCell>] {
        &self.rows
    }

    /// 行を追加する
    ///
    /// セル数（結合分を含む）が列数に満たない場合は空セルで補います。
    pub fn add_row(&mut self, mut cells: Vec<TableCell>) {
        let used: usize = cells.iter().map(|c| c.span).sum();
        for _ in used..self.columns {
            cells.push(TableCell::empty());
        }
        self.rows.push(cells);
    }

    /// 全列を結合した1セルの行を追加する
    pub fn add_merged_row(&mut self, paragraph: Paragraph) {
        let span = self.columns;
        self.rows.push(vec![TableCell::new(paragraph).span(span)]);
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Block {
    Paragraph(Paragraph),
    Table(Table),
}

/// Word文書ビルダー
///
/// 本文ブロックをメモリ上に蓄積し、`save`でパッケージ全体を書き出します。
///
/// # 使用例
///
/// ```rust
/// use ucdoc::{DocumentBuilder, FontSpec, Paragraph, Run};
///
/// # fn main() -> Result<(), ucdoc::UcDocError> {
/// let mut doc = DocumentBuilder::new(FontSpec::default());
/// doc.add_paragraph(Paragraph::new().with_run(Run::new("1. UC LOGIN").bold()));
/// let mut bytes = Vec::new();
/// doc.save(&mut bytes)?;
/// assert!(bytes.starts_with(b"PK"));
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct DocumentBuilder {
    font: FontSpec,
    blocks: Vec<Block>,
}

impl DocumentBuilder {
    pub fn new(font: FontSpec) -> Self {
        Self {
            font,
            blocks: Vec::new(),
        }
    }

    pub fn add_paragraph(&mut self, paragraph: Paragraph) {
        self.blocks.push(Block::Paragraph(paragraph));
    }

    pub fn add_empty_paragraph(&mut self) {
        self.add_paragraph(Paragraph::new());
    }

    pub fn add_table(&mut self, table: Table) {
        self.blocks.push(Block::Table(table));
    }

    /// 本文直下の段落（表の中の段落は含まない）
    pub fn paragraphs(&self) -> impl Iterator<Item = &Paragraph> {
        self.blocks.iter().filter_map(|b| match b {
            Block::Paragraph(p) => Some(p),
            Block::Table(_) => None,
        })
    }

    /// 本文中の表
    pub fn tables(&self) -> impl Iterator<Item = &Table> {
        self.blocks.iter().filter_map(|b| match b {
            Block::Table(t) => Some(t),
            Block::Paragraph(_) => None,
        })
    }

    /// 本文中の表の数
    pub fn table_count(&self) -> usize {
        self.tables().count()
    }

    /// `.docx`パッケージを書き出す
    ///
    /// パッケージはメモリ上で完成させてから`writer`へ一括で書き込まれます。
    pub fn save<W: Write>(&self, writer: &mut W) -> Result<(), UcDocError> {
        let bytes = self.to_bytes()?;
        writer.write_all(&bytes)?;
        writer.flush()?;
        Ok(())
    }

    /// `.docx`パッケージをバイト列として生成する
    pub fn to_bytes(&self) -> Result<Vec<u8>, UcDocError> {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        let options = FileOptions::default().compression_method(CompressionMethod::Deflated);

        write_part(&mut zip, "[Content_Types].xml", CONTENT_TYPES_XML.as_bytes(), options)?;
        write_part(&mut zip, "_rels/.rels", PACKAGE_RELS_XML.as_bytes(), options)?;
        write_part(&mut zip, "word/document.xml", &self.document_xml()?, options)?;
        write_part(&mut zip, "word/styles.xml", &self.styles_xml()?, options)?;
        write_part(
            &mut zip,
            "word/_rels/document.xml.rels",
            DOCUMENT_RELS_XML.as_bytes(),
            options,
        )?;

        let cursor = zip.finish()?;
        Ok(cursor.into_inner())
    }

    fn document_xml(&self) -> Result<Vec<u8>, UcDocError> {
        let mut w = Writer::new(Vec::new());
        w.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("yes"))))?;
        w.write_event(Event::Start(
            BytesStart::new("w:document").with_attributes([("xmlns:w", NS_W)]),
        ))?;
        w.write_event(Event::Start(BytesStart::new("w:body")))?;

        for block in &self.blocks {
            match block {
                Block::Paragraph(p) => write_paragraph(&mut w, p)?,
                Block::Table(t) => write_table(&mut w, t)?,
            }
        }

        // 本文は表で終われないため、末尾には常に段落を置く
        if !matches!(self.blocks.last(), Some(Block::Paragraph(_))) {
            write_paragraph(&mut w, &Paragraph::new())?;
        }

        w.write_event(Event::Start(BytesStart::new("w:sectPr")))?;
        empty(
            &mut w,
            "w:pgSz",
            &[("w:w", "12240"), ("w:h", "15840")],
        )?;
        empty(
            &mut w,
            "w:pgMar",
            &[
                ("w:top", "1440"),
                ("w:right", "1440"),
                ("w:bottom", "1440"),
                ("w:left", "1440"),
                ("w:header", "720"),
                ("w:footer", "720"),
                ("w:gutter", "0"),
            ],
        )?;
        end(&mut w, "w:sectPr")?;

        end(&mut w, "w:body")?;
        end(&mut w, "w:document")?;
        Ok(w.into_inner())
    }

    fn styles_xml(&self) -> Result<Vec<u8>, UcDocError> {
        let size = self.font.half_points().to_string();
        let name = self.font.name.as_str();
        let fonts = [
            ("w:ascii", name),
            ("w:hAnsi", name),
            ("w:eastAsia", name),
            ("w:cs", name),
        ];

        let mut w = Writer::new(Vec::new());
        w.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("yes"))))?;
        w.write_event(Event::Start(
            BytesStart::new("w:styles").with_attributes([("xmlns:w", NS_W)]),
        ))?;

        w.write_event(Event::Start(BytesStart::new("w:docDefaults")))?;
        w.write_event(Event::Start(BytesStart::new("w:rPrDefault")))?;
        w.write_event(Event::Start(BytesStart::new("w:rPr")))?;
        empty(&mut w, "w:rFonts", &fonts)?;
        empty(&mut w, "w:sz", &[("w:val", size.as_str())])?;
        empty(&mut w, "w:szCs", &[("w:val", size.as_str())])?;
        end(&mut w, "w:rPr")?;
        end(&mut w, "w:rPrDefault")?;
        end(&mut w, "w:docDefaults")?;

        w.write_event(Event::Start(BytesStart::new("w:style").with_attributes([
            ("w:type", "paragraph"),
            ("w:default", "1"),
            ("w:styleId", "Normal"),
        ])))?;
        empty(&mut w, "w:name", &[("w:val", "Normal")])?;
        empty(&mut w, "w:qFormat", &[])?;
        w.write_event(Event::Start(BytesStart::new("w:rPr")))?;
        empty(&mut w, "w:rFonts", &fonts)?;
        empty(&mut w, "w:sz", &[("w:val", size.as_str())])?;
        empty(&mut w, "w:szCs", &[("w:val", size.as_str())])?;
        end(&mut w, "w:rPr")?;
        end(&mut w, "w:style")?;

        end(&mut w, "w:styles")?;
        Ok(w.into_inner())
    }
}

fn write_part<W: Write + Seek>(
    zip: &mut ZipWriter<W>,
    name: &str,
    content: &[u8],
    options: FileOptions,
) -> Result<(), UcDocError> {
    zip.start_file(name, options)?;
    zip.write_all(content)?;
    Ok(())
}

fn empty<W: Write>(w: &mut Writer<W>, tag: &str, attrs: &[(&str, &str)]) -> Result<(), UcDocError> {
    w.write_event(Event::Empty(
        BytesStart::new(tag).with_attributes(attrs.iter().copied()),
    ))?;
    Ok(())
}

fn end<W: Write>(w: &mut Writer<W>, tag: &str) -> Result<(), UcDocError> {
    w.write_event(Event::End(BytesEnd::new(tag)))?;
    Ok(())
}

fn write_paragraph<W: Write>(w: &mut Writer<W>, paragraph: &Paragraph) -> Result<(), UcDocError> {
    w.write_event(Event::Start(BytesStart::new("w:p")))?;
    if paragraph.centered {
        w.write_event(Event::Start(BytesStart::new("w:pPr")))?;
        empty(w, "w:jc", &[("w:val", "center")])?;
        end(w, "w:pPr")?;
    }
    for run in &paragraph.runs {
        write_run(w, run)?;
    }
    end(w, "w:p")
}

fn write_run<W: Write>(w: &mut Writer<W>, run: &Run) -> Result<(), UcDocError> {
    w.write_event(Event::Start(BytesStart::new("w:r")))?;
    if run.bold || run.italic || run.highlight.is_some() {
        w.write_event(Event::Start(BytesStart::new("w:rPr")))?;
        if run.bold {
            empty(w, "w:b", &[])?;
        }
        if run.italic {
            empty(w, "w:i", &[])?;
        }
        if let Some(color) = run.highlight {
            empty(w, "w:highlight", &[("w:val", color)])?;
        }
        end(w, "w:rPr")?;
    }

    let text = sanitize(&run.text);
    for (idx, line) in text.split('\n').enumerate() {
        if idx > 0 {
            empty(w, "w:br", &[])?;
        }
        if line.is_empty() {
            continue;
        }
        w.write_event(Event::Start(
            BytesStart::new("w:t").with_attributes([("xml:space", "preserve")]),
        ))?;
        w.write_event(Event::Text(BytesText::new(line)))?;
        end(w, "w:t")?;
    }
    end(w, "w:r")
}

fn write_table<W: Write>(w: &mut Writer<W>, table: &Table) -> Result<(), UcDocError> {
    let col_width = TEXT_WIDTH_DXA / table.columns as u32;
    let border = [
        ("w:val", "single"),
        ("w:sz", "8"),
        ("w:space", "0"),
        ("w:color", "000000"),
    ];

    w.write_event(Event::Start(BytesStart::new("w:tbl")))?;
    w.write_event(Event::Start(BytesStart::new("w:tblPr")))?;
    empty(w, "w:tblW", &[("w:w", "0"), ("w:type", "auto")])?;
    w.write_event(Event::Start(BytesStart::new("w:tblBorders")))?;
    for side in ["w:top", "w:left", "w:bottom", "w:right", "w:insideH", "w:insideV"] {
        empty(w, side, &border)?;
    }
    end(w, "w:tblBorders")?;
    end(w, "w:tblPr")?;

    w.write_event(Event::Start(BytesStart::new("w:tblGrid")))?;
    let col_width_attr = col_width.to_string();
    for _ in 0..table.columns {
        empty(w, "w:gridCol", &[("w:w", col_width_attr.as_str())])?;
    }
    end(w, "w:tblGrid")?;

    for row in &table.rows {
        w.write_event(Event::Start(BytesStart::new("w:tr")))?;
        for cell in row {
            write_cell(w, cell, col_width)?;
        }
        end(w, "w:tr")?;
    }
    end(w, "w:tbl")
}

fn write_cell<W: Write>(w: &mut Writer<W>, cell: &TableCell, col_width: u32) -> Result<(), UcDocError> {
    let width = (col_width * cell.span as u32).to_string();
    let span = cell.span.to_string();

    w.write_event(Event::Start(BytesStart::new("w:tc")))?;
    w.write_event(Event::Start(BytesStart::new("w:tcPr")))?;
    empty(w, "w:tcW", &[("w:w", width.as_str()), ("w:type", "dxa")])?;
    if cell.span > 1 {
        empty(w, "w:gridSpan", &[("w:val", span.as_str())])?;
    }
    if let Some(fill) = &cell.shading {
        empty(
            w,
            "w:shd",
            &[("w:val", "clear"), ("w:color", "auto"), ("w:fill", fill.as_str())],
        )?;
    }
    end(w, "w:tcPr")?;
    // セルには段落が最低1つ必要
    write_paragraph(w, &cell.paragraph)?;
    end(w, "w:tc")
}

/// XML 1.0で使用できない制御文字を取り除く
fn sanitize(text: &str) -> String {
    text.replace("\r\n", "\n")
        .chars()
        .filter(|&c| c == '\n' || c == '\t' || c >= ' ')
        .collect()
}

//! ucdoc - Convert spreadsheet use-case specifications into Word documents
//!
//! This crate reads a use-case list from a spreadsheet (XLSX / XLS / ODS),
//! recognizes its module / group / use-case structure from the sequence
//! column, and renders it as a formatted `.docx` document.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use std::path::Path;
//! use ucdoc::ConverterBuilder;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // One titled 8x2 table per use-case
//!     let converter = ConverterBuilder::new().build()?;
//!     let report = converter.convert_file(Path::new("usecases.xlsx"), Path::new("usecases.docx"))?;
//!
//!     println!("{} use-cases written", report.use_case_count);
//!     println!("missing sequence numbers: {:?}", report.sequence.missing);
//!     Ok(())
//! }
//! ```
//!
//! # Consolidated Table
//!
//! ```rust,no_run
//! use std::fs::File;
//! use ucdoc::{ConverterBuilder, OutputLayout};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Modules, groups and use-cases in one 6-column table
//!     let converter = ConverterBuilder::new()
//!         .with_layout(OutputLayout::Consolidated)
//!         .build()?;
//!
//!     let input = File::open("usecases.xlsx")?;
//!     let output = File::create("usecases.docx")?;
//!     converter.convert(input, output)?;
//!     Ok(())
//! }
//! ```
//!
//! # Inspecting the Structure
//!
//! ```rust,no_run
//! use std::fs::File;
//! use ucdoc::ConverterBuilder;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let converter = ConverterBuilder::new().build()?;
//!     for module in converter.build_tree(File::open("usecases.xlsx")?)? {
//!         println!("{} {}", module.code, module.name);
//!     }
//!     Ok(())
//! }
//! ```

mod aggregate;
mod api;
mod builder;
mod columns;
mod error;
mod formatter;
mod header;
mod hierarchy;
mod normalize;
mod output;
mod parser;
mod security;
mod sequence;
mod types;

// 公開API
pub use aggregate::aggregate;
pub use api::{DateFormat, FontSpec, HeaderPolicy, OutputLayout, SheetSelector, TitleNumbering};
pub use builder::{ConversionReport, Converter, ConverterBuilder};
pub use columns::{
    forward_fill, resolve_columns, BindingStrategy, CanonicalField, ColumnBinding, Row,
    FLAT_FILL_FIELDS, HIERARCHY_FILL_FIELDS,
};
pub use error::UcDocError;
pub use header::{header_row, locate_header, DEFAULT_HEADER_SCAN_LIMIT};
pub use hierarchy::{build_hierarchy, HierarchyBuilder, RowOutcome, SkipReason};
pub use normalize::{clean_header, normalize_text};
pub use output::{DocumentBuilder, Paragraph, Run, Table, TableCell};
pub use sequence::{
    classify, classify_in, normalize_sequence_text, parse_integer_code, recover_from_name,
    ClassifyContext, SequenceCode, SequenceReport,
};
pub use types::{
    count_use_cases, FlatUseCaseRecord, Group, Module, UseCase, DEFAULT_MODULE_CODE,
    DEFAULT_MODULE_NAME,
};

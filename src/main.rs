//! ucdoc command-line tool
//!
//! Converts a spreadsheet use-case list into a Word document.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{ArgAction, Parser, ValueEnum};
use ucdoc::{
    ConversionReport, ConverterBuilder, HeaderPolicy, OutputLayout, SheetSelector,
    TitleNumbering, UcDocError,
};

const DEFAULT_OUTPUT_DIR: &str = "output";

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Layout {
    /// One titled table per use-case
    PerUseCase,
    /// One table holding modules, groups and use-cases
    Consolidated,
}

impl From<Layout> for OutputLayout {
    fn from(layout: Layout) -> Self {
        match layout {
            Layout::PerUseCase => OutputLayout::PerUseCase,
            Layout::Consolidated => OutputLayout::Consolidated,
        }
    }
}

#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    /// Input spreadsheet (.xlsx, .xlsm, .xls, .xlsb, .ods)
    input: PathBuf,

    /// Output document; defaults to <output-dir>/<input name>.docx
    output: Option<PathBuf>,

    /// Document layout
    #[arg(long, value_enum, default_value_t = Layout::PerUseCase)]
    layout: Layout,

    /// Directory for the output document
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Sheet index (0-based)
    #[arg(long, conflicts_with = "sheet_name")]
    sheet: Option<usize>,

    /// Sheet name
    #[arg(long)]
    sheet_name: Option<String>,

    /// Number of leading rows searched for the header
    #[arg(long, default_value_t = ucdoc::DEFAULT_HEADER_SCAN_LIMIT)]
    header_scan: usize,

    /// Fail instead of falling back to the first row when no header is found
    #[arg(long)]
    strict_header: bool,

    /// Number use-case titles 1, 2, 3... instead of using their sequence codes
    #[arg(long)]
    running_index: bool,

    /// Print the conversion report as JSON
    #[arg(long)]
    report_json: bool,

    /// Verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    if !cli.input.exists() {
        eprintln!("Error: input file not found: {}", cli.input.display());
        return ExitCode::FAILURE;
    }

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            handle_error(e);
            ExitCode::FAILURE
        }
    }
}

fn setup_logging(verbosity: u8) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let level = match verbosity {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        2 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };

    let filter = tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into());

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_line_number(false);

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .init();
}

fn run(cli: &Cli) -> Result<(), UcDocError> {
    let selector = match (&cli.sheet_name, cli.sheet) {
        (Some(name), _) => SheetSelector::Name(name.clone()),
        (None, index) => SheetSelector::Index(index.unwrap_or(0)),
    };

    let converter = ConverterBuilder::new()
        .with_layout(cli.layout.into())
        .with_sheet_selector(selector)
        .with_header_scan_limit(cli.header_scan)
        .with_header_policy(if cli.strict_header {
            HeaderPolicy::Strict
        } else {
            HeaderPolicy::Permissive
        })
        .with_title_numbering(if cli.running_index {
            TitleNumbering::RunningIndex
        } else {
            TitleNumbering::SequenceCode
        })
        .build()?;

    let output = resolve_output_path(&cli.input, cli.output.as_deref(), cli.output_dir.as_deref());
    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let report = converter.convert_file(&cli.input, &output)?;

    if cli.report_json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report, &output);
    }
    Ok(())
}

/// Decides where the document is written.
///
/// With an explicit directory only the file name of `output` is kept.
/// A `.docx` suffix is appended when missing.
fn resolve_output_path(input: &Path, output: Option<&Path>, dir: Option<&Path>) -> PathBuf {
    let mut path = match (output, dir) {
        (Some(output), None) => output.to_path_buf(),
        (Some(output), Some(dir)) => dir.join(output.file_name().unwrap_or(output.as_os_str())),
        (None, dir) => {
            let stem = input.file_stem().unwrap_or(input.as_os_str());
            dir.unwrap_or(Path::new(DEFAULT_OUTPUT_DIR)).join(stem)
        }
    };

    let has_docx = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("docx"));
    if output.is_none() || !has_docx {
        let mut name = path.clone().into_os_string();
        name.push(".docx");
        path = PathBuf::from(name);
    }
    path
}

fn print_report(report: &ConversionReport, output: &Path) {
    let join = |values: &[u64]| {
        if values.is_empty() {
            "None".to_string()
        } else {
            values
                .iter()
                .map(u64::to_string)
                .collect::<Vec<_>>()
                .join(", ")
        }
    };

    println!("STT analysis:");
    println!("Total Use Cases: {}", report.sequence.total);
    println!("Missing Sequence Numbers: {}", join(&report.sequence.missing));
    println!("Duplicate STTs: {}", join(&report.sequence.duplicates));
    if let Some(modules) = report.module_count {
        println!("Modules: {}", modules);
    }
    println!("Use-cases written: {}", report.use_case_count);
    println!("Created: {}", output.display());
}

fn handle_error(error: UcDocError) {
    match error {
        UcDocError::Io(io_err) => {
            eprintln!("I/O Error: {}", io_err);
            eprintln!("Please check that the file exists and you have permission to access it.");
        }
        UcDocError::Parse(parse_err) => {
            eprintln!("Parse Error: {}", parse_err);
            eprintln!("The file may not be a valid spreadsheet or may be corrupted.");
        }
        UcDocError::Config(msg) => {
            eprintln!("Configuration Error: {}", msg);
            eprintln!("Please check your sheet selection and options.");
        }
        UcDocError::NoUseCaseData => {
            eprintln!("No use-case data found.");
        }
        err @ (UcDocError::HeaderNotFound { .. }
        | UcDocError::InsufficientColumns { .. }
        | UcDocError::MissingColumn(_)) => {
            eprintln!("Structure Error: {}", err);
            eprintln!("Expected columns: STT, Tên Use-case, Tác nhân, Giao dịch, BMT, Độ phức tạp.");
        }
        other => {
            eprintln!("Error: {}", other);
        }
    }
}

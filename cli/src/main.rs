//! pdf2docx CLI - convert PDF documents to DOCX

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use pdf2docx::{
    CancelToken, ConvertOptions, LayoutOptions, PdfConverter, Source, TableDetectorConfig,
};

#[derive(Parser)]
#[command(name = "pdf2docx")]
#[command(version)]
#[command(about = "Convert PDF documents to DOCX, reconstructing layout", long_about = None)]
struct Cli {
    /// Input PDF file
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Output DOCX file (default: input name with .docx extension)
    #[arg(value_name = "OUTPUT")]
    output: Option<PathBuf>,

    /// Skip embedded images
    #[arg(long)]
    no_images: bool,

    /// Skip table detection
    #[arg(long)]
    no_tables: bool,

    /// Skip hyperlink annotations
    #[arg(long)]
    no_hyperlinks: bool,

    /// First page to convert (1-indexed)
    #[arg(long, value_name = "N", default_value = "1")]
    start_page: u32,

    /// Last page to convert (default: last page)
    #[arg(long, value_name = "N")]
    end_page: Option<u32>,

    /// Maximum number of pages to convert
    #[arg(long, value_name = "N")]
    max_pages: Option<u32>,

    /// Line grouping tolerance in points
    #[arg(long, value_name = "POINTS", default_value = "3.0")]
    line_tolerance: f32,

    /// Paragraph gap multiplier
    #[arg(long, value_name = "MULT", default_value = "1.3")]
    para_gap: f32,

    /// Minimum column gap in points
    #[arg(long, value_name = "POINTS", default_value = "20.0")]
    column_gap: f32,

    /// Line spacing multiplier
    #[arg(long, value_name = "MULT", default_value = "1.15")]
    line_spacing: f32,

    /// Spacing after paragraphs in points
    #[arg(long, value_name = "POINTS", default_value = "6.0")]
    para_spacing_after: f32,

    /// Print diagnostic output
    #[arg(long)]
    diagnostics: bool,

    /// Use an OCR text extractor for scanned documents
    #[arg(long)]
    ocr: bool,
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            // Help and version are not usage errors
            use clap::error::ErrorKind;
            if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) {
                let _ = e.print();
                return ExitCode::SUCCESS;
            }
            let _ = e.print();
            return ExitCode::from(1);
        }
    };

    let mut logger = env_logger::Builder::from_default_env();
    if cli.diagnostics {
        logger.filter_level(log::LevelFilter::Debug);
    }
    logger.init();

    if !cli.input.exists() {
        eprintln!(
            "{} input file not found: {}",
            "error:".red().bold(),
            cli.input.display()
        );
        return ExitCode::from(1);
    }

    let output = cli
        .output
        .clone()
        .unwrap_or_else(|| cli.input.with_extension("docx"));

    if cli.ocr {
        eprintln!(
            "{} no OCR back-end is compiled into this build; using the content-stream extractor",
            "warning:".yellow().bold()
        );
    }

    let options = ConvertOptions::new()
        .with_images(!cli.no_images)
        .with_tables(!cli.no_tables)
        .with_hyperlinks(!cli.no_hyperlinks)
        .with_page_range(cli.start_page, cli.end_page)
        .with_layout(LayoutOptions {
            line_tolerance: cli.line_tolerance,
            paragraph_gap_multiplier: cli.para_gap,
            min_column_gap: cli.column_gap,
            line_spacing: cli.line_spacing,
            paragraph_spacing_after: cli.para_spacing_after,
        })
        .with_detector(TableDetectorConfig::default());
    let options = match cli.max_pages {
        Some(max) => options.with_max_pages(max),
        None => options,
    };

    let bar = ProgressBar::new(100);
    bar.set_style(
        ProgressStyle::with_template("{spinner:.green} [{bar:30.cyan/blue}] {pos}% {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=>-"),
    );
    bar.set_message("converting");

    let converter = PdfConverter::new();
    let cancel = CancelToken::new();
    let mut on_progress = |value: u8| bar.set_position(value as u64);

    let result = converter.convert_with_progress(
        Source::Path(&cli.input),
        &options,
        Some(&cancel),
        Some(&mut on_progress),
    );

    match result {
        Ok(bytes) => {
            if let Err(e) = std::fs::write(&output, &bytes) {
                bar.abandon();
                let _ = std::fs::remove_file(&output);
                eprintln!("{} failed to write output: {e}", "error:".red().bold());
                return ExitCode::from(2);
            }
            bar.finish_with_message("done");
            println!(
                "{} {} {} {}",
                "converted".green().bold(),
                cli.input.display(),
                "->".dimmed(),
                output.display()
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            bar.abandon();
            eprintln!("{} {e}", "error:".red().bold());
            ExitCode::from(2)
        }
    }
}

//! gridclerk CLI - convert OCR Markdown of power-grid documents to JSON

use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use colored::Colorize;

use gridclerk::{ConvertOptions, DocumentType, JsonFormat};

#[derive(Parser)]
#[command(name = "gridclerk")]
#[command(version)]
#[command(about = "Convert OCR Markdown of power-grid documents to structured JSON", long_about = None)]
struct Cli {
    /// Input Markdown file
    #[arg(value_name = "FILE")]
    input: PathBuf,

    /// Output file (stdout if not specified)
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Explicit document type (skips auto-detection), e.g. settlementReport
    #[arg(short = 't', long, value_name = "TYPE")]
    doc_type: Option<String>,

    /// Emit compact JSON instead of pretty-printed
    #[arg(long)]
    compact: bool,

    /// Disable parallel table reconstruction
    #[arg(long)]
    sequential: bool,

    /// Header-signature fuzzy match threshold (0.0-1.0)
    #[arg(long, value_name = "FRACTION", default_value = "0.8")]
    fuzzy_threshold: f32,

    /// Suppress the summary line
    #[arg(short, long)]
    quiet: bool,
}

fn run(cli: &Cli) -> gridclerk::Result<()> {
    let markdown = fs::read_to_string(&cli.input)?;

    let mut options = ConvertOptions::new()
        .with_parallel(!cli.sequential)
        .with_fuzzy_threshold(cli.fuzzy_threshold);
    if let Some(name) = &cli.doc_type {
        options = options.with_document_type(name.parse::<DocumentType>()?);
    }

    let result = gridclerk::convert_markdown_with_options(&markdown, &options);
    let format = if cli.compact {
        JsonFormat::Compact
    } else {
        JsonFormat::Pretty
    };
    let json = gridclerk::to_json(&result, format)?;

    match &cli.output {
        Some(path) => {
            fs::write(path, &json)?;
            if !cli.quiet {
                eprintln!(
                    "{} {} -> {} ({})",
                    "converted".green().bold(),
                    cli.input.display(),
                    path.display(),
                    result.document_type.cyan()
                );
            }
        }
        None => {
            println!("{json}");
            if !cli.quiet {
                eprintln!(
                    "{} document type: {}",
                    "converted".green().bold(),
                    result.document_type.cyan()
                );
            }
        }
    }

    if result.is_unknown() && !cli.quiet {
        eprintln!("{} document type not recognized", "warning:".yellow().bold());
    }
    Ok(())
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{} {err}", "error:".red().bold());
            ExitCode::FAILURE
        }
    }
}

//! pdfoutline CLI - PDF heading outline extraction tool

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand, ValueEnum};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use pdfoutline::batch::{self, BatchOptions};
use pdfoutline::{
    render, JsonFormat, LevelOverflow, OutlineConfig, Outliner, PageSelection, ParseOptions,
};

#[derive(Parser)]
#[command(name = "pdfoutline")]
#[command(version)]
#[command(about = "Extract the title and heading outline of PDF documents", long_about = None)]
struct Cli {
    /// Input PDF file or directory of PDFs
    #[arg(value_name = "INPUT")]
    input: Option<PathBuf>,

    /// Output file (for a PDF) or directory (for a directory)
    #[arg(value_name = "OUTPUT")]
    output: Option<PathBuf>,

    #[command(flatten)]
    common: CommonArgs,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Outline a single PDF
    Outline {
        /// Input PDF file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Output format
        #[arg(long, value_enum, default_value = "json")]
        format: OutputFormat,

        /// Page range (e.g., "1-10", "1,3,5"); the first page is the cover
        #[arg(long)]
        pages: Option<String>,

        #[command(flatten)]
        common: CommonArgs,
    },

    /// Outline every PDF in a directory, writing <name>.json files
    Batch {
        /// Input directory
        #[arg(value_name = "DIR", env = "PDFOUTLINE_INPUT")]
        input: PathBuf,

        /// Output directory
        #[arg(value_name = "OUT", env = "PDFOUTLINE_OUTPUT", default_value = "output")]
        output: PathBuf,

        /// Process one document at a time
        #[arg(long)]
        sequential: bool,

        #[command(flatten)]
        common: CommonArgs,
    },

    /// Show version information
    Version,
}

#[derive(Args, Clone, Copy, Default)]
struct CommonArgs {
    /// Output compact JSON
    #[arg(long)]
    compact: bool,

    /// Skip pages that fail to decode
    #[arg(long)]
    lenient: bool,

    /// Give headings below the fourth size the deepest level instead of dropping them
    #[arg(long)]
    clamp_levels: bool,
}

impl CommonArgs {
    fn config(&self) -> OutlineConfig {
        let overflow = if self.clamp_levels {
            LevelOverflow::Clamp
        } else {
            LevelOverflow::Drop
        };
        OutlineConfig::new().with_level_overflow(overflow)
    }

    fn parse_options(&self) -> ParseOptions {
        if self.lenient {
            ParseOptions::new().lenient()
        } else {
            ParseOptions::new()
        }
    }

    fn json_format(&self) -> JsonFormat {
        if self.compact {
            JsonFormat::Compact
        } else {
            JsonFormat::Pretty
        }
    }
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// {"title", "outline"} JSON
    Json,
    /// Indented heading list
    Text,
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let result = match cli.command {
        Some(Commands::Outline {
            input,
            output,
            format,
            pages,
            common,
        }) => cmd_outline(&input, output.as_deref(), format, pages.as_deref(), common),
        Some(Commands::Batch {
            input,
            output,
            sequential,
            common,
        }) => cmd_batch(&input, &output, sequential, common),
        Some(Commands::Version) => {
            cmd_version();
            Ok(())
        }
        None => match cli.input {
            Some(input) if input.is_dir() => {
                let output = cli.output.unwrap_or_else(|| PathBuf::from("output"));
                cmd_batch(&input, &output, false, cli.common)
            }
            Some(input) => cmd_outline(
                &input,
                cli.output.as_deref(),
                OutputFormat::Json,
                None,
                cli.common,
            ),
            None => {
                println!("{}", "Usage: pdfoutline <INPUT> [OUTPUT]".yellow());
                println!("       pdfoutline --help for more information");
                Ok(())
            }
        },
    };

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn cmd_outline(
    input: &Path,
    output: Option<&Path>,
    format: OutputFormat,
    pages: Option<&str>,
    common: CommonArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let page_selection = match pages {
        Some(p) => PageSelection::parse(p)?,
        None => PageSelection::All,
    };

    let outline = Outliner::new()
        .with_config(common.config())
        .with_parse_options(common.parse_options().with_pages(page_selection))
        .file(input)?;

    let rendered = match format {
        OutputFormat::Json => render::to_json(&outline, common.json_format())?,
        OutputFormat::Text => render::to_text(&outline),
    };

    if let Some(path) = output {
        fs::write(path, &rendered)?;
        println!(
            "{} {} ({} headings)",
            "Saved to".green(),
            path.display(),
            outline.len()
        );
    } else {
        println!("{}", rendered);
    }

    Ok(())
}

fn cmd_batch(
    input: &Path,
    output: &Path,
    sequential: bool,
    common: CommonArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let inputs = batch::discover_pdfs(input)?;
    if inputs.is_empty() {
        println!("{} {}", "No PDF files found in".yellow(), input.display());
        return Ok(());
    }

    let mut options = BatchOptions::new()
        .with_config(common.config())
        .with_parse_options(common.parse_options())
        .with_format(common.json_format());
    if sequential {
        options = options.sequential();
    }

    let pb = ProgressBar::new(inputs.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("#>-"),
    );

    let report = batch::process_files(&inputs, output, &options, |path, result| {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        if result.is_err() {
            pb.println(format!("{} {}", "✗".red(), name));
        }
        pb.set_message(name);
        pb.inc(1);
    })?;

    pb.finish_with_message("Done!");

    println!(
        "\n{} {} of {} documents outlined into {}",
        "Done!".green().bold(),
        report.succeeded.len(),
        report.total(),
        output.display()
    );

    if !report.failed.is_empty() {
        println!("{}", "Failed:".red().bold());
        let last = report.failed.len() - 1;
        for (i, (path, error)) in report.failed.iter().enumerate() {
            let branch = if i == last { "└─" } else { "├─" };
            println!("  {} {}: {}", branch.dimmed(), path.display(), error);
        }
    }

    Ok(())
}

fn cmd_version() {
    println!("{} {}", "pdfoutline".cyan().bold(), env!("CARGO_PKG_VERSION"));
    println!("PDF heading outline extraction tool");
    println!();
    println!("License: MIT");
}

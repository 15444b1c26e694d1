//! Command-line interface for the harvester.

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};

use crate::assembler::{parse, parse_version};
use crate::config::{resolve_cache_dir, validate_ver_id};
use crate::error::{HarvesterError, Result};
use crate::export::{save, to_string, Format};
use crate::retrieval::fetch_raw_markup;
use crate::types::Parsed;

/// Legis Harvester - Convert consolidated Romanian legislation into a typed document model.
#[derive(Parser)]
#[command(name = "legis-harvester")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Fetch a document version from legislatie.just.ro and convert it.
    Convert {
        /// Document version identifier (e.g., 109884)
        ver_id: String,

        /// HTML cache directory (default: $LEGIS_CACHE_DIR or ~/.legis)
        #[arg(long)]
        cache_dir: Option<PathBuf>,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = Format::Json)]
        format: Format,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Parse a local HTML file.
    Parse {
        /// Path to the saved document page
        file: PathBuf,

        /// Version identifier (default: resolved from the markup)
        #[arg(long)]
        ver_id: Option<String>,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = Format::Json)]
        format: Format,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

/// Run the CLI.
pub fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Convert {
            ver_id,
            cache_dir,
            format,
            output,
        } => convert_command(&ver_id, cache_dir, format, output.as_deref()),
        Commands::Parse {
            file,
            ver_id,
            format,
            output,
        } => parse_command(&file, ver_id.as_deref(), format, output.as_deref()),
    }
}

fn spinner() -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    #[allow(clippy::expect_used)] // Static template string that is guaranteed to be valid
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .expect("valid template"),
    );
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}

/// Execute the convert command.
fn convert_command(
    ver_id: &str,
    cache_dir: Option<PathBuf>,
    format: Format,
    output: Option<&Path>,
) -> Result<()> {
    // Validate before touching the network or the cache
    validate_ver_id(ver_id)?;
    let cache_dir = resolve_cache_dir(cache_dir);

    eprintln!(
        "{} document {}",
        style("Converting").bold(),
        style(ver_id).cyan()
    );

    let pb = spinner();
    pb.set_message("Fetching document...");
    let markup = match fetch_raw_markup(ver_id, &cache_dir) {
        Ok(markup) => markup,
        Err(e) => {
            pb.finish_and_clear();
            return Err(e);
        }
    };

    pb.set_message("Parsing...");
    let parsed = parse_version(&markup, ver_id);
    pb.finish_and_clear();

    emit(&parsed?, format, output)
}

/// Execute the parse command.
fn parse_command(
    file: &Path,
    ver_id: Option<&str>,
    format: Format,
    output: Option<&Path>,
) -> Result<()> {
    if !file.is_file() {
        return Err(HarvesterError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("Input file does not exist: {}", file.display()),
        )));
    }

    eprintln!(
        "{} {}",
        style("Parsing").bold(),
        style(file.display()).cyan()
    );

    let markup = fs::read_to_string(file)?;
    let parsed = match ver_id {
        Some(ver_id) => parse_version(&markup, ver_id)?,
        None => parse(&markup)?,
    };

    emit(&parsed, format, output)
}

/// Print a summary to stderr and write the document.
fn emit(parsed: &Parsed, format: Format, output: Option<&Path>) -> Result<()> {
    let model = &parsed.model;
    if let Some(title) = &model.document.title {
        eprintln!("  Title: {}", style(title).green());
    }
    eprintln!("  Version: {}", model.document.ver_id);
    eprintln!("  Articles: {}", model.articles.len());
    if !model.annexes.is_empty() {
        eprintln!("  Annexes: {}", model.annexes.len());
    }
    if !parsed.warnings.is_empty() {
        eprintln!("  Warnings: {}", style(parsed.warnings.len()).yellow().bold());
        for warning in &parsed.warnings {
            eprintln!("    {} {warning}", style("-").yellow());
        }
    }

    match output {
        Some(path) => {
            save(parsed, format, path)?;
            eprintln!();
            eprintln!("{} {}", style("Saved to:").green().bold(), path.display());
        }
        None => print!("{}", to_string(parsed, format)?),
    }

    Ok(())
}

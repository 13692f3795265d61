use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono_tz::Tz;
use clap::{Args, Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "Convert Gymrun workout exports to Strong import CSVs", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Convert a source export into the destination import format
    Convert(ConvertArgs),
    /// List source rows whose exercise name has no mapping entry
    Unmapped(UnmappedArgs),
}

#[derive(Args, Debug)]
struct ConvertArgs {
    /// Source export CSV
    #[arg(long, default_value = "gymrun.csv")]
    source: PathBuf,
    /// Destination sample CSV; its header row defines the output columns
    #[arg(long, default_value = "strong.csv")]
    sample: PathBuf,
    /// Exercise name mapping table (TOML). Omit to pass names through as-is
    #[arg(long)]
    mapping: Option<PathBuf>,
    /// IANA timezone the source file's local times were recorded in
    #[arg(long, default_value = "Europe/Oslo")]
    timezone: String,
    /// Output CSV path
    #[arg(long, default_value = "converted.csv")]
    output: PathBuf,
}

#[derive(Args, Debug)]
struct UnmappedArgs {
    /// Source export CSV
    #[arg(long, default_value = "gymrun.csv")]
    source: PathBuf,
    /// Exercise name mapping table (TOML)
    #[arg(long)]
    mapping: PathBuf,
    /// IANA timezone the source file's local times were recorded in
    #[arg(long, default_value = "Europe/Oslo")]
    timezone: String,
    /// Output CSV path (source-shaped rows)
    #[arg(long, default_value = "unmapped.csv")]
    output: PathBuf,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Convert(args) => handle_convert(args),
        Command::Unmapped(args) => handle_unmapped(args),
    }
}

fn parse_timezone(name: &str) -> Result<Tz> {
    name.parse::<Tz>()
        .map_err(|err| anyhow::anyhow!("invalid timezone '{name}': {err}"))
}

fn handle_convert(args: ConvertArgs) -> Result<()> {
    let timezone = parse_timezone(&args.timezone)?;
    let summary = setport_core::run_convert(
        &args.source,
        &args.sample,
        args.mapping.as_deref(),
        timezone,
        &args.output,
    )
    .context("conversion failed")?;

    info!(
        rows = summary.rows_written,
        workouts = summary.session_count,
        output = %args.output.display(),
        "wrote destination file"
    );
    if !summary.unmapped_names.is_empty() {
        warn!(
            count = summary.unmapped_names.len(),
            names = ?summary.unmapped_names,
            "exercise names without a mapping entry passed through unchanged; \
             run the `unmapped` subcommand to review them"
        );
    }
    Ok(())
}

fn handle_unmapped(args: UnmappedArgs) -> Result<()> {
    let timezone = parse_timezone(&args.timezone)?;
    let summary = setport_core::run_unmapped(&args.source, &args.mapping, timezone, &args.output)
        .context("unmapped scan failed")?;

    if summary.rows_written == 0 {
        info!("every exercise name has a mapping entry");
    } else {
        info!(
            rows = summary.rows_written,
            unique_names = summary.unique_names,
            output = %args.output.display(),
            "wrote unmapped exercise report"
        );
    }
    Ok(())
}

//! cotkit - parse Cursor on Target messages and print the resulting events
//!
//! Each file argument holds one CoT message; with no files a single message
//! is read from stdin.

use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use cotkit_core::config::{AppConfig, LogFormat, LoggingConfig};
use cotkit_cot::{validate_event, CotParser, Event};
use std::fs;
use std::io::{self, Read, Write};
use std::path::PathBuf;
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

/// Parse CoT messages and print them as JSON or one-line summaries
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Files containing one CoT message each (stdin if none)
    files: Vec<PathBuf>,

    /// Path to configuration file
    #[arg(short, long, env = "COTKIT_CONFIG")]
    config: Option<PathBuf>,

    /// Output format
    #[arg(long, value_enum, default_value = "json")]
    output: OutputFormat,

    /// Validate events and fail if any message is rejected or invalid
    #[arg(long)]
    strict: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    /// Pretty-printed JSON per event
    Json,
    /// One line per event
    Summary,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => AppConfig::from_config_builder(path)
            .with_context(|| format!("Failed to load config file: {:?}", path))?,
        None => AppConfig::default(),
    };
    config.validate().context("Invalid configuration")?;

    init_logging(&config.logging)?;

    let parser = CotParser::new(config.parser.clone());
    let inputs = read_inputs(&args.files)?;
    let total = inputs.len();

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let mut failed = 0usize;

    for (source, raw) in inputs {
        let event = parser.parse_bytes(&raw);
        if !event.is_valid() {
            warn!(%source, "Skipping unusable message");
            failed += 1;
            continue;
        }

        if args.strict {
            if let Err(err) = validate_event(&event) {
                warn!(%source, uid = %event.uid, error = %err, "Event failed validation");
                failed += 1;
                continue;
            }
        }

        debug!(%source, uid = %event.uid, "Parsed event");
        write_event(&mut out, &event, args.output)?;
    }

    if args.strict && failed > 0 {
        bail!("{} of {} messages rejected", failed, total);
    }

    Ok(())
}

fn init_logging(config: &LoggingConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .context("Invalid log filter")?;

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr);

    match config.format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Text => builder.init(),
    }

    Ok(())
}

fn read_inputs(files: &[PathBuf]) -> Result<Vec<(String, Vec<u8>)>> {
    if files.is_empty() {
        let mut raw = Vec::new();
        io::stdin()
            .read_to_end(&mut raw)
            .context("Failed to read stdin")?;
        return Ok(vec![("<stdin>".to_string(), raw)]);
    }

    files
        .iter()
        .map(|path| {
            let raw = fs::read(path).with_context(|| format!("Failed to read {:?}", path))?;
            Ok((path.display().to_string(), raw))
        })
        .collect()
}

fn write_event(out: &mut impl Write, event: &Event, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut *out, event)?;
            writeln!(out)?;
        }
        OutputFormat::Summary => {
            let children = event.detail.as_ref().map_or(0, |d| d.children().len());
            writeln!(
                out,
                "{} {} {:.6},{:.6} hae={} detail={}",
                event.uid,
                event.event_type,
                event.point.lat,
                event.point.lon,
                event
                    .point
                    .altitude()
                    .map_or_else(|| "unknown".to_string(), |h| h.to_string()),
                children,
            )?;
        }
    }
    Ok(())
}

//! Block Detect - groups raw OCR fragments into translatable paragraphs
//!
//! Reads an OCR response (a bare record array or a response envelope) as JSON
//! and writes paragraph records back out in the same shape.

use anyhow::{Context, Result};
use clap::Parser;
use serde_json::Value;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use block_detect::config::{self, AppConfig};
use block_detect::{process_payload, storage, OcrPayload};

/// Block Detect - OCR fragment to paragraph grouping
#[derive(Parser, Debug)]
#[command(name = "block-detect")]
#[command(about = "Group raw OCR fragments into words, lines and paragraphs")]
struct Args {
    /// OCR JSON input file ("-" or omitted for stdin)
    input: Option<PathBuf>,

    /// Config file (defaults to the user config directory)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Source language code, overrides the payload's language
    #[arg(short, long)]
    lang: Option<String>,

    /// Join paragraph lines with line breaks
    #[arg(long)]
    keep_linefeeds: bool,

    /// Horizontal glue factor (x line height)
    #[arg(long)]
    horizontal_glue: Option<f32>,

    /// Vertical glue factor (x line height)
    #[arg(long)]
    vertical_glue: Option<f32>,

    /// Block detection scale applied to every distance threshold
    #[arg(long)]
    scale: Option<f32>,

    /// Minimum paragraph length in characters
    #[arg(long)]
    min_length: Option<usize>,

    /// Pretty-print the JSON output
    #[arg(long)]
    pretty: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,

    /// Write the default configuration to the config path and exit
    #[arg(long)]
    write_default_config: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Logs go to stderr, stdout carries JSON
    let default_level = if args.verbose { "debug" } else { "info" };
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config_path = match &args.config {
        Some(path) => Some(path.clone()),
        None => storage::default_config_path().ok(),
    };

    if args.write_default_config {
        let path = config_path.context("Could not determine config path")?;
        config::save_config(&AppConfig::default(), &path)?;
        info!("Wrote default configuration to {:?}", path);
        return Ok(());
    }

    let mut app_config = load_or_default_config(config_path.as_deref(), args.config.is_some())?;
    apply_overrides(&mut app_config, &args);

    let input = read_input(args.input.as_deref())?;
    let value: Value = serde_json::from_str(&input).context("Input is not valid JSON")?;

    let output = match OcrPayload::from_value(value.clone()) {
        Ok(mut payload) => {
            // --lang outranks the payload's own language
            if args.lang.is_some() {
                payload.language = args.lang.clone();
            }

            info!(
                "Processing {} OCR records (language: {})",
                payload.records.len(),
                payload
                    .language
                    .as_deref()
                    .unwrap_or(app_config.block_detection.source_language.as_str())
            );
            process_payload(payload, &app_config.block_detection)
        }
        Err(e) => {
            warn!("{}, passing input through unchanged", e);
            value
        }
    };

    write_output(&output, app_config.output.pretty)
}

/// Load configuration from file or fall back to defaults
///
/// A missing or broken file is only an error when the path was given explicitly.
fn load_or_default_config(path: Option<&Path>, explicit: bool) -> Result<AppConfig> {
    let Some(path) = path else {
        info!("Using default configuration");
        return Ok(AppConfig::default());
    };

    if !path.exists() {
        if explicit {
            anyhow::bail!("Config file not found: {:?}", path);
        }
        info!("Using default configuration");
        return Ok(AppConfig::default());
    }

    match config::load_config(path) {
        Ok(config) => {
            info!("Loaded configuration from {:?}", path);
            Ok(config)
        }
        Err(e) if !explicit => {
            warn!("Ignoring unreadable configuration: {:#}", e);
            Ok(AppConfig::default())
        }
        Err(e) => Err(e),
    }
}

/// Apply command-line overrides through the clamping setters
fn apply_overrides(config: &mut AppConfig, args: &Args) {
    let detection = &mut config.block_detection;

    if let Some(lang) = &args.lang {
        detection.set_source_language(lang.as_str());
    }
    if args.keep_linefeeds {
        detection.set_keep_linefeeds(true);
    }
    if let Some(value) = args.horizontal_glue {
        detection.set_horizontal_glue(value);
    }
    if let Some(value) = args.vertical_glue {
        detection.set_vertical_glue(value);
    }
    if let Some(value) = args.scale {
        detection.set_block_detection_scale(value);
    }
    if let Some(value) = args.min_length {
        detection.set_min_text_length(value);
    }
    if args.pretty {
        config.output.pretty = true;
    }
}

/// Read the whole input from a file or stdin
fn read_input(path: Option<&Path>) -> Result<String> {
    match path {
        Some(path) if path != Path::new("-") => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read input file: {:?}", path)),
        _ => {
            let mut buffer = String::new();
            std::io::stdin()
                .read_to_string(&mut buffer)
                .context("Failed to read stdin")?;
            Ok(buffer)
        }
    }
}

fn write_output(output: &Value, pretty: bool) -> Result<()> {
    let text = if pretty {
        serde_json::to_string_pretty(output)?
    } else {
        serde_json::to_string(output)?
    };

    let mut stdout = std::io::stdout().lock();
    writeln!(stdout, "{}", text)?;
    Ok(())
}

//! Process command - extract fields from a single card image.

use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use anyhow::Context;
use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info};

use cccd_core::{create_pipeline_from_config, ImageInput};

use super::{format_result, load_config, OutputFormat};

/// Arguments for the process command.
#[derive(Args)]
pub struct ProcessArgs {
    /// Input image
    #[arg(required = true)]
    input: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Model directory
    #[arg(short, long)]
    model_dir: Option<PathBuf>,

    /// Show region confidence and timing
    #[arg(long)]
    show_confidence: bool,
}

pub async fn run(args: ProcessArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = load_config(config_path, args.model_dir.as_deref())?;

    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    info!("Processing file: {}", args.input.display());

    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );

    pb.set_message("Loading models...");
    let pipeline = create_pipeline_from_config(&config).with_context(|| {
        format!(
            "Failed to load OCR models from {}",
            config.models.model_dir.display()
        )
    })?;

    pb.set_message("Running OCR...");
    let result = pipeline.process(ImageInput::Path(args.input.clone()));
    pb.finish_and_clear();

    if !result.success {
        eprintln!(
            "{} {}",
            style("✗").red(),
            result.message.as_deref().unwrap_or("processing failed")
        );
    } else if let Some(message) = &result.message {
        eprintln!("{} {}", style("⚠").yellow(), message);
    }

    let output = format_result(&result, args.format)?;

    if let Some(output_path) = &args.output {
        fs::write(output_path, &output)?;
        println!(
            "{} Output written to {}",
            style("✓").green(),
            output_path.display()
        );
    } else {
        println!("{}", output);
    }

    if args.show_confidence {
        println!();
        if let Some(detection) = &result.detection {
            println!(
                "{} Region confidence: {:.1}% ({})",
                style("ℹ").blue(),
                detection.confidence * 100.0,
                detection.class_name
            );
        }
        println!(
            "{} Processing time: {}ms",
            style("ℹ").blue(),
            result.processing_time_ms
        );
    }

    debug!("Total command time: {:?}", start.elapsed());

    if !result.success {
        std::process::exit(1);
    }

    Ok(())
}

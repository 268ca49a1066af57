//! Batch processing command for multiple card images.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::Context;
use clap::Args;
use console::style;
use glob::glob;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, error, warn};

use cccd_core::{create_pipeline_from_config, ImageInput, ProcessingResult};

use super::{format_result, load_config, record_cells, OutputFormat, RECORD_COLUMNS};

const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "webp", "tiff", "tif", "bmp"];

/// Arguments for the batch command.
#[derive(Args)]
pub struct BatchArgs {
    /// Glob pattern for input images
    #[arg(required = true)]
    input: String,

    /// Output directory for per-file results
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Output format for each file
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Also generate a summary CSV
    #[arg(long)]
    summary: bool,

    /// Continue when a file fails
    #[arg(long)]
    continue_on_error: bool,

    /// Model directory
    #[arg(short, long)]
    model_dir: Option<PathBuf>,
}

/// Outcome for one file.
struct FileResult {
    path: PathBuf,
    result: ProcessingResult,
}

/// Whether the path has a supported image extension.
fn is_image(path: &Path) -> bool {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();
    IMAGE_EXTENSIONS.contains(&ext.as_str())
}

pub async fn run(args: BatchArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = load_config(config_path, args.model_dir.as_deref())?;

    let mut files: Vec<PathBuf> = glob(&args.input)?
        .filter_map(|r| r.ok())
        .filter(|p| is_image(p))
        .collect();
    files.sort();

    if files.is_empty() {
        anyhow::bail!("No matching images found for pattern: {}", args.input);
    }

    println!(
        "{} Found {} files to process",
        style("ℹ").blue(),
        files.len()
    );

    if let Some(ref output_dir) = args.output_dir {
        fs::create_dir_all(output_dir)?;
    }

    let pipeline = create_pipeline_from_config(&config).with_context(|| {
        format!(
            "Failed to load OCR models from {}",
            config.models.model_dir.display()
        )
    })?;

    let pb = ProgressBar::new(files.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=>-"),
    );

    let mut results = Vec::with_capacity(files.len());
    for path in files {
        let result = pipeline.process(ImageInput::Path(path.clone()));

        if !result.success {
            let message = result.message.clone().unwrap_or_default();
            if args.continue_on_error {
                warn!("Failed to process {}: {}", path.display(), message);
            } else {
                error!("Failed to process {}: {}", path.display(), message);
                pb.abandon();
                anyhow::bail!("Processing failed for {}: {}", path.display(), message);
            }
        }

        if let Some(output_dir) = &args.output_dir {
            write_output(output_dir, &path, &result, args.format)?;
        }

        results.push(FileResult { path, result });
        pb.inc(1);
    }

    pb.finish_with_message("Complete");

    if args.summary {
        let summary_path = args
            .output_dir
            .as_ref()
            .map(|d| d.join("summary.csv"))
            .unwrap_or_else(|| PathBuf::from("summary.csv"));

        write_summary(&summary_path, &results)?;
        println!(
            "{} Summary written to {}",
            style("✓").green(),
            summary_path.display()
        );
    }

    let (successful, failed): (Vec<_>, Vec<_>) = results.iter().partition(|r| r.result.success);

    println!();
    println!(
        "{} Processed {} files in {:?}",
        style("✓").green(),
        results.len(),
        start.elapsed()
    );
    println!(
        "   {} successful, {} failed",
        style(successful.len()).green(),
        style(failed.len()).red()
    );

    if !failed.is_empty() {
        println!();
        println!("{}", style("Failed files:").red());
        for file in &failed {
            println!(
                "  - {}: {}",
                file.path.display(),
                file.result.message.as_deref().unwrap_or("unknown error")
            );
        }
    }

    Ok(())
}

fn write_output(
    output_dir: &Path,
    path: &Path,
    result: &ProcessingResult,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let output_name = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("card");
    let output_path = output_dir.join(format!("{}.{}", output_name, format.extension()));

    fs::write(&output_path, format_result(result, format)?)?;
    debug!("Wrote output to {}", output_path.display());
    Ok(())
}

fn write_summary(path: &Path, results: &[FileResult]) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;

    let mut header = vec!["file", "success", "message", "processing_time_ms"];
    header.extend(RECORD_COLUMNS);
    wtr.write_record(&header)?;

    for file in results {
        let mut row = vec![
            file.path.display().to_string(),
            file.result.success.to_string(),
            file.result.message.clone().unwrap_or_default(),
            file.result.processing_time_ms.to_string(),
        ];
        row.extend(record_cells(&file.result.record));
        wtr.write_record(&row)?;
    }

    wtr.flush()?;
    Ok(())
}

//! Detect command - crop every detected field region out of a card image.

use std::fs;
use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use console::style;
use tracing::{debug, info};

use cccd_core::{detect_and_crop, load_region_detector, ImageInput};

use super::load_config;

/// Arguments for the detect command.
#[derive(Args)]
pub struct DetectArgs {
    /// Input image
    #[arg(required = true)]
    input: PathBuf,

    /// Directory for the cropped regions
    #[arg(short, long, default_value = "crops")]
    output: PathBuf,

    /// Minimum detection confidence (default: from config)
    #[arg(short = 't', long)]
    threshold: Option<f32>,

    /// Model directory
    #[arg(short, long)]
    model_dir: Option<PathBuf>,
}

pub async fn run(args: DetectArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = load_config(config_path, args.model_dir.as_deref())?;

    let image = ImageInput::Path(args.input.clone())
        .load()
        .with_context(|| format!("Failed to load {}", args.input.display()))?;

    let detector = load_region_detector(&config).context("Region detector is required for detect")?;
    let threshold = args.threshold.unwrap_or(config.detector.confidence_threshold);

    let crops = detect_and_crop(&detector, &image, threshold)?;
    info!("Detected {} regions", crops.len());

    if crops.is_empty() {
        println!("{} No regions detected", style("⚠").yellow());
        return Ok(());
    }

    fs::create_dir_all(&args.output)?;
    for crop in &crops {
        let path = args.output.join(format!("{}.png", crop.name));
        crop.image
            .save(&path)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        let b = &crop.detection.bbox;
        debug!("Wrote {} ({}x{})", path.display(), b.width(), b.height());
        println!(
            "{} {:<16} {:>5.1}%  [{}, {}, {}, {}]",
            style("✓").green(),
            crop.name,
            crop.detection.confidence * 100.0,
            b.x1,
            b.y1,
            b.x2,
            b.y2
        );
    }

    println!(
        "{} Wrote {} crops to {}",
        style("ℹ").blue(),
        crops.len(),
        args.output.display()
    );

    Ok(())
}

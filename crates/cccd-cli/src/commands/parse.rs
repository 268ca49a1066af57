//! Parse command - run field extraction on recognized text.

use std::fs;
use std::io::Read;
use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use console::style;
use tracing::info;

use cccd_core::{ExtractionTables, FieldParser};

use super::{format_record_text, load_config, record_cells, OutputFormat, RECORD_COLUMNS};

/// Arguments for the parse command.
#[derive(Args)]
pub struct ParseArgs {
    /// Text file with one recognized line per row, or `-` for stdin
    #[arg(required = true)]
    input: PathBuf,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Year used for date range checks (default: current year)
    #[arg(long)]
    year: Option<i32>,
}

pub async fn run(args: ParseArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = load_config(config_path, None)?;

    let text = if args.input.as_os_str() == "-" {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        buf
    } else {
        fs::read_to_string(&args.input)
            .with_context(|| format!("Failed to read {}", args.input.display()))?
    };

    let mut parser = FieldParser::new(ExtractionTables::from(&config.extraction));
    if let Some(year) = args.year {
        parser = parser.with_reference_year(year);
    }

    let record = parser.parse_text(&text);
    info!("Found {} fields", record.populated_fields().len());

    let output = match args.format {
        OutputFormat::Json => serde_json::to_string_pretty(&record)?,
        OutputFormat::Csv => {
            let mut wtr = csv::Writer::from_writer(vec![]);
            wtr.write_record(RECORD_COLUMNS)?;
            wtr.write_record(record_cells(&record))?;
            String::from_utf8(wtr.into_inner()?)?
        }
        OutputFormat::Text => format_record_text(&record),
    };
    println!("{}", output);

    if record.is_empty() {
        eprintln!("{} No fields found", style("⚠").yellow());
    }

    Ok(())
}

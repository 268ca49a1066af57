//! Subcommand implementations and the helpers they share.

pub mod batch;
pub mod config;
pub mod detect;
pub mod parse;
pub mod process;
pub mod serve;

use std::path::Path;

use anyhow::Context;
use cccd_core::{CccdConfig, ExtractedRecord, ProcessingResult};
use tracing::debug;

/// Output format for extraction results.
#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// CSV output
    Csv,
    /// Plain text summary
    Text,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Csv => "csv",
            OutputFormat::Text => "txt",
        }
    }
}

/// Record columns in CSV output, in field order.
pub const RECORD_COLUMNS: [&str; 9] = [
    "card_type",
    "id_number",
    "full_name",
    "date_of_birth",
    "gender",
    "nationality",
    "place_of_origin",
    "place_of_residence",
    "expiry_date",
];

/// Load configuration from `--config`, the user config file, or defaults,
/// then apply a `--model-dir` override.
pub fn load_config(config_path: Option<&str>, model_dir: Option<&Path>) -> anyhow::Result<CccdConfig> {
    let mut config = match config_path {
        Some(path) => CccdConfig::from_file(Path::new(path))
            .with_context(|| format!("Failed to load config from {}", path))?,
        None => {
            let default_path = config::default_config_path();
            if default_path.exists() {
                debug!("Using config file {}", default_path.display());
                CccdConfig::from_file(&default_path)
                    .with_context(|| format!("Failed to load config from {}", default_path.display()))?
            } else {
                CccdConfig::default()
            }
        }
    };

    if let Some(dir) = model_dir {
        config.models.model_dir = dir.to_path_buf();
    }

    Ok(config)
}

/// Record values as CSV cells, matching [`RECORD_COLUMNS`].
pub fn record_cells(record: &ExtractedRecord) -> Vec<String> {
    let text = |value: &Option<String>| value.clone().unwrap_or_default();
    vec![
        serde_json::to_value(record.card_type)
            .ok()
            .and_then(|v| v.as_str().map(str::to_string))
            .unwrap_or_default(),
        text(&record.id_number),
        text(&record.full_name),
        text(&record.date_of_birth),
        record.gender.map(|g| g.to_string()).unwrap_or_default(),
        text(&record.nationality),
        text(&record.place_of_origin),
        text(&record.place_of_residence),
        text(&record.expiry_date),
    ]
}

pub fn format_result(result: &ProcessingResult, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(&result.to_wire())?),
        OutputFormat::Csv => format_csv(result),
        OutputFormat::Text => Ok(format_text(result)),
    }
}

fn format_csv(result: &ProcessingResult) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    let mut header = vec!["success", "message"];
    header.extend(RECORD_COLUMNS);
    wtr.write_record(&header)?;

    let mut row = vec![
        result.success.to_string(),
        result.message.clone().unwrap_or_default(),
    ];
    row.extend(record_cells(&result.record));
    wtr.write_record(&row)?;

    let data = String::from_utf8(wtr.into_inner()?)?;
    Ok(data)
}

/// Human-readable summary of a record.
pub fn format_record_text(record: &ExtractedRecord) -> String {
    let mut output = String::new();
    let missing = "-";

    output.push_str(&format!("Card type:          {}\n", record.card_type));
    let lines = [
        ("ID number", record.id_number.as_deref()),
        ("Full name", record.full_name.as_deref()),
        ("Date of birth", record.date_of_birth.as_deref()),
        ("Gender", record.gender.as_ref().map(|g| g.as_str())),
        ("Nationality", record.nationality.as_deref()),
        ("Place of origin", record.place_of_origin.as_deref()),
        ("Place of residence", record.place_of_residence.as_deref()),
        ("Expiry date", record.expiry_date.as_deref()),
    ];
    for (label, value) in lines {
        output.push_str(&format!("{:<20}{}\n", format!("{}:", label), value.unwrap_or(missing)));
    }

    output
}

fn format_text(result: &ProcessingResult) -> String {
    let mut output = String::new();

    output.push_str(&format!(
        "Status: {}\n",
        if result.success { "ok" } else { "failed" }
    ));
    if let Some(message) = &result.message {
        output.push_str(&format!("Message: {}\n", message));
    }
    if let Some(detection) = &result.detection {
        let b = &detection.bbox;
        output.push_str(&format!(
            "Region: {} ({:.2}) at [{}, {}, {}, {}]\n",
            detection.class_name, detection.confidence, b.x1, b.y1, b.x2, b.y2
        ));
    }
    output.push('\n');
    output.push_str(&format_record_text(&result.record));
    output.push_str(&format!(
        "\nFields found: {}\n",
        result.record.populated_fields().len()
    ));

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use cccd_core::{CardType, Gender};

    fn record() -> ExtractedRecord {
        ExtractedRecord {
            card_type: CardType::CitizenIdentity,
            id_number: Some("001099012345".to_string()),
            full_name: Some("NGUYỄN VĂN AN".to_string()),
            gender: Some(Gender::Male),
            place_of_residence: Some("12 Lê Lợi, Hà Nội".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_record_cells_follow_columns() {
        let cells = record_cells(&record());
        assert_eq!(cells.len(), RECORD_COLUMNS.len());
        assert_eq!(cells[0], "citizen_identity");
        assert_eq!(cells[4], "Nam");
        assert_eq!(cells[3], "");
    }

    #[test]
    fn test_csv_quotes_commas() {
        let result = ProcessingResult {
            success: true,
            record: record(),
            ..Default::default()
        };
        let csv = format_result(&result, OutputFormat::Csv).unwrap();
        let mut lines = csv.lines();
        assert!(lines.next().unwrap().starts_with("success,message,card_type"));
        assert!(lines.next().unwrap().contains("\"12 Lê Lợi, Hà Nội\""));
    }

    #[test]
    fn test_text_marks_missing_fields() {
        let text = format_record_text(&record());
        assert!(text.contains("Căn cước công dân"));
        assert!(text.contains("Date of birth:      -"));
    }
}

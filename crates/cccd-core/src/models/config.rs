//! Configuration structures for the document pipeline.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main configuration for the cccd pipeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CccdConfig {
    /// Region detector configuration.
    pub detector: DetectorConfig,

    /// Text recognizer configuration.
    pub recognizer: RecognizerConfig,

    /// Crop enhancement configuration.
    pub enhancement: EnhancementConfig,

    /// Field extraction tables and limits.
    pub extraction: ExtractionConfig,

    /// Model file locations.
    pub models: ModelConfig,

    /// HTTP server configuration.
    pub server: ServerConfig,
}

/// Region detector configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    /// Minimum detection confidence (0.0 - 1.0).
    pub confidence_threshold: f32,

    /// IoU above which same-class boxes are suppressed.
    pub iou_threshold: f32,

    /// Square model input side in pixels.
    pub input_size: u32,

    /// Class names in model index order.
    pub class_names: Vec<String>,

    /// Classes allowed to be the selected document region. Empty = any.
    pub allowed_classes: Vec<String>,

    /// Number of CPU threads for the detector session.
    pub num_threads: usize,
}

/// The 12 classes of the CCCD field detector, in training index order.
pub const CCCD_CLASSES: [&str; 12] = [
    "current_place",
    "dob",
    "expire_date",
    "features",
    "finger_print",
    "gender",
    "id",
    "issue_date",
    "name",
    "nationality",
    "origin_place",
    "qr",
];

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            confidence_threshold: 0.5,
            iou_threshold: 0.45,
            input_size: 640,
            class_names: CCCD_CLASSES.iter().map(|s| s.to_string()).collect(),
            allowed_classes: Vec::new(),
            num_threads: 4,
        }
    }
}

/// Text recognizer configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RecognizerConfig {
    /// Tokens below this confidence are discarded (0.0 keeps everything).
    pub min_confidence: f32,

    /// Keep `[UNK]` markers in recognized text instead of replacing them with
    /// spaces.
    pub keep_unk: bool,
}

impl Default for RecognizerConfig {
    fn default() -> Self {
        Self {
            // CTC confidences run low on diacritics; filtering is opt-in.
            min_confidence: 0.0,
            keep_unk: false,
        }
    }
}

/// Enhancement applied to the crop before recognition.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EnhancementConfig {
    pub equalize_histogram: bool,

    pub denoise: bool,

    /// Median filter radius; 1 gives a 3x3 window.
    pub denoise_radius: u32,
}

impl Default for EnhancementConfig {
    fn default() -> Self {
        Self {
            equalize_histogram: true,
            denoise: true,
            denoise_radius: 1,
        }
    }
}

/// Field extraction configuration.
///
/// Turned into immutable [`crate::extraction::ExtractionTables`] when the
/// parser is built.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Boilerplate vocabulary that disqualifies a name candidate. Matched
    /// case-insensitively as a substring of the candidate with spaces removed.
    pub blacklist: Vec<String>,

    /// Word-level OCR corrections applied to the chosen name.
    pub name_corrections: Vec<(String, String)>,

    /// Ordered substring replacements applied to nationality values.
    pub nationality_fixups: Vec<(String, String)>,

    /// Character cap for origin and residence before the `...` marker.
    pub max_place_length: usize,

    /// Expiry dates may lie at most this many years ahead.
    pub expiry_horizon_years: i32,

    /// Earliest accepted birth year.
    pub min_birth_year: i32,
}

const DEFAULT_BLACKLIST: &[&str] = &[
    "SOCIALIST", "REPUBLIC", "VIET", "NAM", "VIETNAM", "CITIZEN", "IDENTITY", "CARD",
    "INDEPENDENCE", "FREEDOM", "HAPPINESS", "CÔNG", "CONG", "HÓA", "HOA", "HÒA", "DÂN", "DAN",
    "CĂN", "CAN", "CƯỚC", "CUOC", "CHỦ", "CHU", "CHÙ", "NGHĨA", "NGHIA", "XÃ", "XA", "HỘI",
    "HOI", "VIỆT", "VET",
];

const DEFAULT_NAME_CORRECTIONS: &[(&str, &str)] = &[
    ("NGUYN", "NGUYỄN"),
    ("TRÂN", "TRẦN"),
    ("L", "LÊ"),
    ("LE", "LÊ"),
    ("PHM", "PHẠM"),
    ("PHAM", "PHẠM"),
    ("HUỲH", "HUỲNH"),
    ("HUYNH", "HUỲNH"),
    ("VO", "VÕ"),
    ("DUONG", "DƯƠNG"),
    ("BUI", "BÙI"),
    ("DAO", "ĐÀO"),
    ("DO", "ĐỖ"),
];

const DEFAULT_NATIONALITY_FIXUPS: &[(&str, &str)] =
    &[("Viêt", "Việt"), ("VIT", "Việt"), ("Viet", "Việt")];

fn owned_pairs(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
    pairs
        .iter()
        .map(|(from, to)| (from.to_string(), to.to_string()))
        .collect()
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            blacklist: DEFAULT_BLACKLIST.iter().map(|s| s.to_string()).collect(),
            name_corrections: owned_pairs(DEFAULT_NAME_CORRECTIONS),
            nationality_fixups: owned_pairs(DEFAULT_NATIONALITY_FIXUPS),
            max_place_length: 100,
            expiry_horizon_years: 30,
            min_birth_year: 1900,
        }
    }
}

/// Model file locations.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Directory containing model files.
    pub model_dir: PathBuf,

    /// YOLO region detector model file name.
    pub detector_model: String,

    /// Text line detection model (DB) file name.
    pub text_detection_model: String,

    /// Text recognition model (CRNN) file name.
    pub text_recognition_model: String,

    /// Character dictionary file name.
    pub dictionary: String,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            model_dir: PathBuf::from("models"),
            detector_model: "cccd_yolo.onnx".to_string(),
            text_detection_model: "det.onnx".to_string(),
            text_recognition_model: "rec.onnx".to_string(),
            dictionary: "dict.txt".to_string(),
        }
    }
}

/// HTTP server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,

    pub port: u16,

    /// Allowed CORS origins; `*` allows any.
    pub cors_origins: Vec<String>,

    /// Largest accepted upload in bytes.
    pub max_upload_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            cors_origins: vec!["*".to_string()],
            max_upload_bytes: 10 * 1024 * 1024,
        }
    }
}

impl CccdConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string()))
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> Result<(), std::io::Error> {
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string()))?;
        std::fs::write(path, content)
    }

    /// Get full path to a model file.
    pub fn model_path(&self, model_name: &str) -> PathBuf {
        self.models.model_dir.join(model_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: CccdConfig =
            serde_json::from_str(r#"{"detector": {"confidence_threshold": 0.7}}"#).unwrap();
        assert_eq!(config.detector.confidence_threshold, 0.7);
        assert_eq!(config.detector.class_names.len(), 12);
        assert_eq!(config.extraction.max_place_length, 100);
        assert_eq!(config.server.port, 8000);
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        let mut config = CccdConfig::default();
        config.models.model_dir = PathBuf::from("/opt/cccd");
        config.save(&path).unwrap();

        let loaded = CccdConfig::from_file(&path).unwrap();
        assert_eq!(loaded.models.model_dir, PathBuf::from("/opt/cccd"));
        assert_eq!(
            loaded.model_path("det.onnx"),
            PathBuf::from("/opt/cccd/det.onnx")
        );
    }
}

//! Text recognition backed by `pure-onnx-ocr` (DB text detection + CRNN
//! recognition, pure Rust).

use std::path::Path;
use std::sync::Mutex;

use image::{DynamicImage, GenericImageView};
use tracing::{debug, info};

use crate::error::RecognitionError;
use crate::models::config::RecognizerConfig;
use crate::models::RawToken;

use super::TextRecognizer;

const UNK_MARKER: &str = "[UNK]";

/// PaddleOCR-style recognizer over detection and recognition ONNX models.
pub struct PaddleTextRecognizer {
    engine: Mutex<pure_onnx_ocr::engine::OcrEngine>,
    keep_unk: bool,
}

impl PaddleTextRecognizer {
    /// Load the text detection model, recognition model and dictionary.
    pub fn from_paths(
        det_model: &Path,
        rec_model: &Path,
        dictionary: &Path,
        config: &RecognizerConfig,
    ) -> Result<Self, RecognitionError> {
        for path in [det_model, rec_model, dictionary] {
            if !path.exists() {
                return Err(RecognitionError::ModelLoad(format!(
                    "missing {}",
                    path.display()
                )));
            }
        }

        let engine = pure_onnx_ocr::engine::OcrEngineBuilder::new()
            .det_model_path(det_model)
            .rec_model_path(rec_model)
            .dictionary_path(dictionary)
            .build()
            .map_err(|e| RecognitionError::ModelLoad(format!("pure-onnx-ocr: {}", e)))?;

        info!("Loaded text recognizer from {}", rec_model.display());

        Ok(Self {
            engine: Mutex::new(engine),
            keep_unk: config.keep_unk,
        })
    }

    fn clean_text(&self, text: &str) -> String {
        clean_unk(text, self.keep_unk)
    }
}

impl TextRecognizer for PaddleTextRecognizer {
    fn recognize(&self, image: &DynamicImage) -> Result<Vec<RawToken>, RecognitionError> {
        let (width, height) = image.dimensions();
        if width == 0 || height == 0 {
            return Ok(Vec::new());
        }

        let engine = self
            .engine
            .lock()
            .map_err(|_| RecognitionError::Engine("recognizer lock poisoned".to_string()))?;
        let results = engine
            .run_from_image(image)
            .map_err(|e| RecognitionError::Engine(format!("pure-onnx-ocr: {}", e)))?;

        debug!("Recognizer returned {} text regions", results.len());

        Ok(results
            .iter()
            .map(|r| {
                RawToken::new(
                    polygon_points(&r.bounding_box),
                    self.clean_text(&r.text),
                    r.confidence,
                )
            })
            .collect())
    }
}

/// Exterior ring of a polygon as `[x, y]` points, without the closing point.
fn polygon_points(polygon: &pure_onnx_ocr::Polygon<f64>) -> Vec<[f32; 2]> {
    let mut points: Vec<[f32; 2]> = polygon
        .exterior()
        .coords()
        .map(|c| [c.x as f32, c.y as f32])
        .collect();
    if points.len() > 1 && points.first() == points.last() {
        points.pop();
    }
    points
}

/// Replace `[UNK]` markers with spaces unless they are kept.
pub(crate) fn clean_unk(text: &str, keep_unk: bool) -> String {
    if keep_unk {
        text.to_string()
    } else {
        text.replace(UNK_MARKER, " ")
    }
}

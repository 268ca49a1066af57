//! The orchestrator's output envelope and its wire form.

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use super::detection::{Detection, RawToken};
use super::record::ExtractedRecord;

/// Outcome of processing one image.
///
/// Built once per request and never mutated afterwards.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProcessingResult {
    pub success: bool,

    /// Failure explanation, or a soft warning on success.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    /// The region that was recognized, synthetic when the full frame was used.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detection: Option<Detection>,

    /// Newline-joined token text that was parsed.
    pub full_text: String,

    pub raw_tokens: Vec<RawToken>,

    pub record: ExtractedRecord,

    pub processing_time_ms: u64,
}

impl ProcessingResult {
    /// Unsuccessful result with an explanation and nothing else.
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
            ..Default::default()
        }
    }

    pub fn with_processing_time(mut self, ms: u64) -> Self {
        self.processing_time_ms = ms;
        self
    }

    /// Convert to a JSON value made only of wire-safe primitives.
    ///
    /// Bounding boxes become integer arrays, confidences become `f64`
    /// (non-finite values become `null`), polygons become lists of `[x, y]`.
    pub fn to_wire(&self) -> Value {
        let mut obj = Map::new();
        obj.insert("success".into(), Value::Bool(self.success));
        if let Some(message) = &self.message {
            obj.insert("message".into(), Value::String(message.clone()));
        }
        if let Some(det) = &self.detection {
            obj.insert(
                "detection".into(),
                json!({
                    "bbox": [det.bbox.x1, det.bbox.y1, det.bbox.x2, det.bbox.y2],
                    "confidence": wire_number(det.confidence),
                    "class_name": det.class_name,
                }),
            );
        }
        obj.insert("full_text".into(), Value::String(self.full_text.clone()));
        obj.insert(
            "raw_tokens".into(),
            Value::Array(self.raw_tokens.iter().map(token_to_wire).collect()),
        );
        obj.insert(
            "record".into(),
            serde_json::to_value(&self.record).unwrap_or(Value::Null),
        );
        obj.insert("processing_time_ms".into(), Value::from(self.processing_time_ms));
        Value::Object(obj)
    }
}

fn token_to_wire(token: &RawToken) -> Value {
    let polygon: Vec<Value> = token
        .polygon
        .iter()
        .map(|[x, y]| Value::Array(vec![wire_number(*x), wire_number(*y)]))
        .collect();
    json!({
        "polygon": polygon,
        "text": token.text,
        "confidence": wire_number(token.confidence),
    })
}

fn wire_number(value: f32) -> Value {
    serde_json::Number::from_f64(value as f64)
        .map(Value::Number)
        .unwrap_or(Value::Null)
}

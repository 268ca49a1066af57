//! Document region detection using a YOLOv8 ONNX model.

use std::collections::HashMap;

use image::{DynamicImage, GenericImageView};
use ndarray::ArrayD;
use tracing::debug;

use crate::error::DetectionError;
use crate::models::config::DetectorConfig;
use crate::models::{BoundingBox, Detection};
use cccd_inference::{InferenceBackend, InputTensor};

use super::preprocessing::{ImagePreprocessor, Letterbox};
use super::RegionDetector;

/// Region detector for a YOLOv8 export with output `[1, 4 + C, N]`.
pub struct YoloRegionDetector<B: InferenceBackend> {
    backend: B,
    preprocessor: ImagePreprocessor,
    class_names: Vec<String>,
    allowed_classes: Vec<String>,
    iou_threshold: f32,
}

impl<B: InferenceBackend> YoloRegionDetector<B> {
    /// Create a new detector with the given backend and default settings.
    pub fn new(backend: B) -> Self {
        Self::with_config(backend, &DetectorConfig::default())
    }

    pub fn with_config(backend: B, config: &DetectorConfig) -> Self {
        Self {
            backend,
            preprocessor: ImagePreprocessor::new().with_input_size(config.input_size),
            class_names: config.class_names.clone(),
            allowed_classes: config.allowed_classes.clone(),
            iou_threshold: config.iou_threshold,
        }
    }

    /// Set NMS IoU threshold.
    pub fn with_iou_threshold(mut self, threshold: f32) -> Self {
        self.iou_threshold = threshold;
        self
    }

    fn class_name(&self, index: usize) -> String {
        self.class_names
            .get(index)
            .cloned()
            .unwrap_or_else(|| format!("class_{}", index))
    }

    fn is_allowed(&self, class_name: &str) -> bool {
        self.allowed_classes.is_empty() || self.allowed_classes.iter().any(|c| c == class_name)
    }

    fn decode(
        &self,
        output: &ArrayD<f32>,
        letterbox: &Letterbox,
        image_size: (u32, u32),
        confidence_threshold: f32,
    ) -> Result<Vec<Detection>, DetectionError> {
        let shape = output.shape();
        if shape.len() != 3 || shape[0] != 1 {
            return Err(DetectionError::Output(format!(
                "expected [1, 4+C, N], got {:?}",
                shape
            )));
        }

        // Exports differ on whether anchors come last
        let expected_attrs = 4 + self.class_names.len();
        let transposed = if shape[1] == expected_attrs {
            false
        } else if shape[2] == expected_attrs {
            true
        } else {
            shape[1] > shape[2]
        };
        let (attrs, anchors) = if transposed {
            (shape[2], shape[1])
        } else {
            (shape[1], shape[2])
        };
        if attrs < 5 {
            return Err(DetectionError::Output(format!(
                "need at least one class column, got {:?}",
                shape
            )));
        }
        let value = |attr: usize, anchor: usize| {
            if transposed {
                output[[0, anchor, attr]]
            } else {
                output[[0, attr, anchor]]
            }
        };

        let mut detections = Vec::new();
        for anchor in 0..anchors {
            let (class_index, score) = (4..attrs)
                .map(|attr| (attr - 4, value(attr, anchor)))
                .fold((0, f32::NEG_INFINITY), |best, current| {
                    if current.1 > best.1 { current } else { best }
                });
            if score.is_nan() || score < confidence_threshold {
                continue;
            }

            let class_name = self.class_name(class_index);
            if !self.is_allowed(&class_name) {
                continue;
            }

            let (cx, cy, w, h) = (
                value(0, anchor),
                value(1, anchor),
                value(2, anchor),
                value(3, anchor),
            );
            let (x1, y1) = letterbox.to_source(cx - w / 2.0, cy - h / 2.0);
            let (x2, y2) = letterbox.to_source(cx + w / 2.0, cy + h / 2.0);
            let bbox = BoundingBox::new(
                x1.round() as i32,
                y1.round() as i32,
                x2.round() as i32,
                y2.round() as i32,
            );

            let Some(bbox) = bbox.clamp(image_size.0, image_size.1) else {
                continue;
            };
            detections.push(Detection::new(bbox, class_name, score));
        }

        Ok(non_max_suppression(detections, self.iou_threshold))
    }
}

impl<B: InferenceBackend> RegionDetector for YoloRegionDetector<B> {
    fn detect(
        &self,
        image: &DynamicImage,
        confidence_threshold: f32,
    ) -> Result<Vec<Detection>, DetectionError> {
        let (tensor, letterbox) = self.preprocessor.letterbox(image)?;

        let input_name = self.backend.primary_input().to_string();
        let input = InputTensor::Float32(tensor.into_dyn());
        debug!("Detection input shape: {:?}", input.shape());

        let outputs = self
            .backend
            .run(&[(input_name.as_str(), input)])
            .map_err(|e| DetectionError::Inference(e.to_string()))?;

        let (_, output) = outputs
            .into_iter()
            .next()
            .ok_or_else(|| DetectionError::Output("No output from model".to_string()))?;
        debug!("Detection output shape: {:?}", output.shape());

        let output = output
            .into_f32()
            .map_err(|e| DetectionError::Output(e.to_string()))?;

        let detections = self.decode(&output, &letterbox, image.dimensions(), confidence_threshold)?;

        debug!("Detected {} regions", detections.len());
        Ok(detections)
    }
}

/// Class-wise non-maximum suppression. Higher confidence boxes are kept
/// first; the result is ordered by descending confidence.
pub fn non_max_suppression(mut detections: Vec<Detection>, iou_threshold: f32) -> Vec<Detection> {
    // Stable sort keeps first-seen order among equal scores
    detections.sort_by(|a, b| {
        b.confidence
            .partial_cmp(&a.confidence)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let mut keep: Vec<Detection> = Vec::new();
    for detection in detections {
        let dominated = keep.iter().any(|kept| {
            kept.class_name == detection.class_name && detection.bbox.iou(&kept.bbox) > iou_threshold
        });
        if !dominated {
            keep.push(detection);
        }
    }
    keep
}

/// One cropped detection.
#[derive(Debug, Clone)]
pub struct RegionCrop {
    /// Unique name: the class, with `_2`, `_3`, ... for repeats.
    pub name: String,
    pub detection: Detection,
    pub image: DynamicImage,
}

/// Detect regions and crop each one out of the image.
pub fn detect_and_crop<D: RegionDetector + ?Sized>(
    detector: &D,
    image: &DynamicImage,
    confidence_threshold: f32,
) -> Result<Vec<RegionCrop>, DetectionError> {
    let preprocessor = ImagePreprocessor::new();
    let mut seen: HashMap<String, usize> = HashMap::new();
    let mut crops = Vec::new();

    for detection in detector.detect(image, confidence_threshold)? {
        let Some((cropped, clamped)) = preprocessor.crop(image, &detection.bbox) else {
            continue;
        };

        let count = seen.entry(detection.class_name.clone()).or_insert(0);
        *count += 1;
        let name = if *count == 1 {
            detection.class_name.clone()
        } else {
            format!("{}_{}", detection.class_name, count)
        };

        crops.push(RegionCrop {
            name,
            detection: Detection {
                bbox: clamped,
                ..detection
            },
            image: cropped,
        });
    }

    Ok(crops)
}

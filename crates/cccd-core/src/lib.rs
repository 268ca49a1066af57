//! Core library for Vietnamese identity card OCR.
//!
//! This crate provides:
//! - A document pipeline (region detection, crop enhancement, text
//!   recognition) with full-image fallback and uniform failure reporting
//! - Rule-based field extraction (ID number, name, dates, gender,
//!   nationality, places, card type)
//! - Data models and JSON configuration

pub mod error;
pub mod extraction;
pub mod models;
pub mod ocr;
pub mod pipeline;

pub use error::{CccdError, DetectionError, InputError, RecognitionError, Result, Stage, StageError};
pub use extraction::{ExtractionTables, FieldParser};
pub use models::{
    BoundingBox, CardType, CccdConfig, Detection, ExtractedRecord, Gender, ProcessingResult,
    RawToken,
};
pub use ocr::{detect_and_crop, ImagePreprocessor, RegionCrop, RegionDetector, TextRecognizer, YoloRegionDetector};
#[cfg(feature = "native")]
pub use ocr::PaddleTextRecognizer;
pub use pipeline::{BoxedPipeline, DocumentPipeline, DocumentPipelineBuilder, ImageInput};
#[cfg(feature = "native")]
pub use pipeline::{create_pipeline_from_config, load_region_detector};

/// Re-export inference types.
pub use cccd_inference::{InferenceBackend, InputTensor, OutputTensor};

#[cfg(feature = "native")]
pub use cccd_inference::OrtBackend;

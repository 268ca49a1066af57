//! Error types for the cccd-core library.

use std::fmt;

use thiserror::Error;

/// Main error type for the cccd library.
#[derive(Error, Debug)]
pub enum CccdError {
    /// The input image could not be loaded.
    #[error("input error: {0}")]
    Input(#[from] InputError),

    /// Region detection failed.
    #[error("detection error: {0}")]
    Detection(#[from] DetectionError),

    /// Text recognition failed.
    #[error("recognition error: {0}")]
    Recognition(#[from] RecognitionError),

    /// Inference error from the inference layer.
    #[error("inference error: {0}")]
    Inference(#[from] cccd_inference::InferenceError),

    /// Image processing error.
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// A collaborator panicked.
    #[error("panicked: {0}")]
    Panic(String),
}

/// The image handed to the pipeline is not a usable raster.
#[derive(Error, Debug)]
pub enum InputError {
    /// The path could not be read.
    #[error("cannot read {path}: {source}")]
    Unreadable {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The bytes are not a decodable image.
    #[error("cannot decode image: {0}")]
    Decode(#[from] image::ImageError),

    /// Decoding succeeded but one side is zero pixels.
    #[error("image has zero dimension ({width}x{height})")]
    ZeroDimension { width: u32, height: u32 },

    /// Empty byte buffer.
    #[error("empty image buffer")]
    Empty,
}

/// Errors raised by a region detector.
#[derive(Error, Debug)]
pub enum DetectionError {
    /// Failed to load the detection model.
    #[error("failed to load model: {0}")]
    ModelLoad(String),

    /// Preprocessing the frame for the model failed.
    #[error("preprocessing failed: {0}")]
    Preprocessing(String),

    /// Model inference failed.
    #[error("inference failed: {0}")]
    Inference(String),

    /// Model output did not have the expected layout.
    #[error("unexpected model output: {0}")]
    Output(String),
}

/// Errors raised by a text recognizer.
#[derive(Error, Debug)]
pub enum RecognitionError {
    /// Failed to load recognition models or dictionary.
    #[error("failed to load model: {0}")]
    ModelLoad(String),

    /// The OCR engine failed on this image.
    #[error("OCR failed: {0}")]
    Engine(String),
}

/// Pipeline stage names, used to prefix failure messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Load,
    Detect,
    Crop,
    Enhance,
    Recognize,
    Extract,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Load => "load",
            Stage::Detect => "detect",
            Stage::Crop => "crop",
            Stage::Enhance => "enhance",
            Stage::Recognize => "recognize",
            Stage::Extract => "extract",
        };
        f.write_str(name)
    }
}

/// An error tagged with the pipeline stage that produced it.
#[derive(Error, Debug)]
#[error("{stage} failed: {source}")]
pub struct StageError {
    pub stage: Stage,
    #[source]
    pub source: CccdError,
}

impl StageError {
    pub fn new(stage: Stage, source: impl Into<CccdError>) -> Self {
        Self {
            stage,
            source: source.into(),
        }
    }
}

/// Result type for the cccd library.
pub type Result<T> = std::result::Result<T, CccdError>;

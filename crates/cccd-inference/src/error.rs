//! Error types for the inference layer.

use thiserror::Error;

/// Errors that can occur while loading or running an ONNX model.
#[derive(Error, Debug)]
pub enum InferenceError {
    /// The model bytes could not be turned into a session.
    #[error("failed to load model: {0}")]
    ModelLoad(String),

    /// Session builder rejected an option.
    #[error("failed to create session: {0}")]
    SessionCreate(String),

    /// Input tensor does not match what the model expects.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("inference failed: {0}")]
    InferenceFailed(String),

    /// The model produced an output we cannot read back.
    #[error("failed to extract output: {0}")]
    OutputExtraction(String),

    /// Model file missing or unreadable.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

//! ONNX inference layer for the CCCD document pipeline.
//!
//! Model runners (currently the YOLO region detector) talk to an
//! [`InferenceBackend`] instead of a concrete runtime, so the detector can be
//! exercised in tests with a scripted backend.

mod backend;
mod error;
mod tensor;

pub use backend::{InferenceBackend, SessionOptions};
pub use error::InferenceError;
pub use tensor::{InputTensor, OutputTensor};

#[cfg(feature = "native")]
pub use backend::ort::OrtBackend;

/// Result type for inference operations.
pub type Result<T> = std::result::Result<T, InferenceError>;

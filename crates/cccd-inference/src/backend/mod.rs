//! Inference backend implementations.

#[cfg(feature = "native")]
pub mod ort;

use crate::{InputTensor, OutputTensor, Result};

/// Trait for ONNX inference backends.
///
/// Implementations must be shareable across request handlers, so the trait
/// requires `Send + Sync`; backends that wrap a non-reentrant session guard it
/// internally.
pub trait InferenceBackend: Send + Sync {
    /// Run the model with named inputs and return its named outputs in model
    /// order.
    fn run(&self, inputs: &[(&str, InputTensor)]) -> Result<Vec<(String, OutputTensor)>>;

    /// Input names expected by the model.
    fn input_names(&self) -> &[String];

    /// Output names produced by the model.
    fn output_names(&self) -> &[String];

    /// Name of the first model input, falling back to `images` (the YOLO
    /// export default) when the backend does not report one.
    fn primary_input(&self) -> &str {
        self.input_names()
            .first()
            .map(String::as_str)
            .unwrap_or("images")
    }
}

/// Session tuning knobs.
#[derive(Debug, Clone, Copy)]
pub struct SessionOptions {
    /// Intra-op thread count.
    pub intra_threads: usize,
    /// Register the XNNPACK execution provider.
    pub use_xnnpack: bool,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            intra_threads: 4,
            use_xnnpack: true,
        }
    }
}

//! ONNX Runtime (ort) backend for native platforms.

use std::path::Path;
use std::sync::Mutex;

use ndarray::{ArrayD, IxDyn};
use ort::ep::XNNPACK;
use ort::session::builder::GraphOptimizationLevel;
use ort::session::{Session, SessionInputValue};
use ort::value::Tensor;
use tracing::debug;

use super::SessionOptions;
use crate::error::InferenceError;
use crate::tensor::{InputTensor, OutputTensor};
use crate::{InferenceBackend, Result};

/// Backend using ONNX Runtime.
///
/// `Session::run` needs `&mut`, so the session sits behind a mutex; concurrent
/// requests serialize on the model call only.
pub struct OrtBackend {
    session: Mutex<Session>,
    input_names: Vec<String>,
    output_names: Vec<String>,
}

impl OrtBackend {
    /// Load a model from a file path with default session options.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::from_file_with_options(path, SessionOptions::default())
    }

    /// Load a model from a file path.
    pub fn from_file_with_options<P: AsRef<Path>>(path: P, options: SessionOptions) -> Result<Self> {
        let path = path.as_ref();
        debug!("Loading ONNX model from: {}", path.display());

        let bytes = std::fs::read(path)?;
        Self::from_bytes(&bytes, options)
    }

    /// Load a model from an in-memory buffer.
    pub fn from_bytes(bytes: &[u8], options: SessionOptions) -> Result<Self> {
        debug!(
            "Building ONNX session from {} bytes ({} threads, xnnpack={})",
            bytes.len(),
            options.intra_threads,
            options.use_xnnpack
        );

        let mut builder =
            Session::builder().map_err(|e| InferenceError::SessionCreate(e.to_string()))?;

        if options.use_xnnpack {
            builder = builder
                .with_execution_providers([XNNPACK::default().build()])
                .map_err(|e| InferenceError::SessionCreate(e.to_string()))?;
        }

        let session = builder
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(|e| InferenceError::SessionCreate(e.to_string()))?
            .with_intra_threads(options.intra_threads.max(1))
            .map_err(|e| InferenceError::SessionCreate(e.to_string()))?
            .commit_from_memory(bytes)
            .map_err(|e| InferenceError::ModelLoad(e.to_string()))?;

        let input_names: Vec<String> = session
            .inputs()
            .iter()
            .map(|i| i.name().to_string())
            .collect();

        let output_names: Vec<String> = session
            .outputs()
            .iter()
            .map(|o| o.name().to_string())
            .collect();

        debug!("Model inputs: {:?}, outputs: {:?}", input_names, output_names);

        Ok(Self {
            session: Mutex::new(session),
            input_names,
            output_names,
        })
    }

    fn convert_input(tensor: &InputTensor) -> Result<SessionInputValue<'static>> {
        match tensor {
            InputTensor::Float32(arr) => {
                let shape: Vec<i64> = arr.shape().iter().map(|&s| s as i64).collect();
                let data: Vec<f32> = arr.iter().copied().collect();
                Tensor::from_array((shape, data))
                    .map(Into::into)
                    .map_err(|e| InferenceError::InvalidInput(e.to_string()))
            }
            InputTensor::Int64(arr) => {
                let shape: Vec<i64> = arr.shape().iter().map(|&s| s as i64).collect();
                let data: Vec<i64> = arr.iter().copied().collect();
                Tensor::from_array((shape, data))
                    .map(Into::into)
                    .map_err(|e| InferenceError::InvalidInput(e.to_string()))
            }
        }
    }
}

fn to_array<T: Clone>(shape: Vec<usize>, data: &[T]) -> Result<ArrayD<T>> {
    ArrayD::from_shape_vec(IxDyn(&shape), data.to_vec())
        .map_err(|e| InferenceError::OutputExtraction(e.to_string()))
}

impl InferenceBackend for OrtBackend {
    fn run(&self, inputs: &[(&str, InputTensor)]) -> Result<Vec<(String, OutputTensor)>> {
        let ort_inputs: Vec<(&str, SessionInputValue<'static>)> = inputs
            .iter()
            .map(|(name, tensor)| Ok((*name, Self::convert_input(tensor)?)))
            .collect::<Result<Vec<_>>>()?;

        let mut session = self
            .session
            .lock()
            .map_err(|e| InferenceError::InferenceFailed(format!("session lock poisoned: {}", e)))?;

        let outputs = session
            .run(ort_inputs)
            .map_err(|e| InferenceError::InferenceFailed(e.to_string()))?;

        let mut results = Vec::with_capacity(outputs.len());

        for (name, value) in outputs.iter() {
            let tensor = if let Ok((shape, data)) = value.try_extract_tensor::<f32>() {
                let dims: Vec<usize> = shape.iter().map(|&s| s as usize).collect();
                OutputTensor::Float32(to_array(dims, data)?)
            } else if let Ok((shape, data)) = value.try_extract_tensor::<i64>() {
                let dims: Vec<usize> = shape.iter().map(|&s| s as usize).collect();
                OutputTensor::Int64(to_array(dims, data)?)
            } else {
                return Err(InferenceError::OutputExtraction(format!(
                    "unsupported output type for '{}'",
                    name
                )));
            };

            results.push((name.to_string(), tensor));
        }

        Ok(results)
    }

    fn input_names(&self) -> &[String] {
        &self.input_names
    }

    fn output_names(&self) -> &[String] {
        &self.output_names
    }
}

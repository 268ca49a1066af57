//! Tensor containers passed across the backend boundary.

use ndarray::ArrayD;

use crate::error::InferenceError;

/// Input tensor for inference.
#[derive(Debug, Clone)]
pub enum InputTensor {
    Float32(ArrayD<f32>),
    Int64(ArrayD<i64>),
}

impl InputTensor {
    /// Shape of the wrapped array.
    pub fn shape(&self) -> &[usize] {
        match self {
            InputTensor::Float32(arr) => arr.shape(),
            InputTensor::Int64(arr) => arr.shape(),
        }
    }
}

/// Output tensor from inference.
#[derive(Debug, Clone)]
pub enum OutputTensor {
    Float32(ArrayD<f32>),
    Int64(ArrayD<i64>),
}

impl OutputTensor {
    pub fn shape(&self) -> &[usize] {
        match self {
            OutputTensor::Float32(arr) => arr.shape(),
            OutputTensor::Int64(arr) => arr.shape(),
        }
    }

    /// Take the inner Float32 array or report the actual type.
    pub fn into_f32(self) -> Result<ArrayD<f32>, InferenceError> {
        match self {
            OutputTensor::Float32(arr) => Ok(arr),
            OutputTensor::Int64(_) => Err(InferenceError::OutputExtraction(
                "expected f32 output, got i64".to_string(),
            )),
        }
    }
}

//! Vision collaborators: region detection, crop enhancement and text
//! recognition.

mod detector;
mod preprocessing;
#[cfg(feature = "native")]
mod recognizer;

pub use detector::{detect_and_crop, non_max_suppression, RegionCrop, YoloRegionDetector};
pub use preprocessing::{equalize_histogram, median_filter, ImagePreprocessor, Letterbox};
#[cfg(feature = "native")]
pub use recognizer::PaddleTextRecognizer;

use std::sync::Arc;

use image::DynamicImage;

use crate::error::{DetectionError, RecognitionError};
use crate::models::{Detection, RawToken};

/// Locates documents or sub-regions in an image.
///
/// Results are not guaranteed to be sorted; an empty list is a normal
/// outcome.
pub trait RegionDetector: Send + Sync {
    fn detect(
        &self,
        image: &DynamicImage,
        confidence_threshold: f32,
    ) -> Result<Vec<Detection>, DetectionError>;
}

/// Reads text fragments from an image.
///
/// Returns tokens in engine order. Empty or unreadable images yield an empty
/// list rather than an error.
pub trait TextRecognizer: Send + Sync {
    fn recognize(&self, image: &DynamicImage) -> Result<Vec<RawToken>, RecognitionError>;
}

impl<T: RegionDetector + ?Sized> RegionDetector for Box<T> {
    fn detect(
        &self,
        image: &DynamicImage,
        confidence_threshold: f32,
    ) -> Result<Vec<Detection>, DetectionError> {
        (**self).detect(image, confidence_threshold)
    }
}

impl<T: TextRecognizer + ?Sized> TextRecognizer for Box<T> {
    fn recognize(&self, image: &DynamicImage) -> Result<Vec<RawToken>, RecognitionError> {
        (**self).recognize(image)
    }
}

impl<T: RegionDetector + ?Sized> RegionDetector for Arc<T> {
    fn detect(
        &self,
        image: &DynamicImage,
        confidence_threshold: f32,
    ) -> Result<Vec<Detection>, DetectionError> {
        (**self).detect(image, confidence_threshold)
    }
}

impl<T: TextRecognizer + ?Sized> TextRecognizer for Arc<T> {
    fn recognize(&self, image: &DynamicImage) -> Result<Vec<RawToken>, RecognitionError> {
        (**self).recognize(image)
    }
}

//! Document pipeline: detect, crop, enhance, recognize and extract.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::time::Instant;

use image::{DynamicImage, GenericImageView};
use tracing::{debug, info, warn};

use crate::error::{CccdError, Stage, StageError};
use crate::extraction::{rank_candidates, ExtractionTables, FieldParser};
use crate::models::{CccdConfig, Detection, ProcessingResult, RawToken};
use crate::ocr::{ImagePreprocessor, RegionDetector, TextRecognizer};

use super::input::ImageInput;

/// Message reported when recognition finds nothing to parse.
pub const NO_TEXT_MESSAGE: &str = "no text detected";

/// Soft warning when a detector was available but found no usable region.
pub const FALLBACK_MESSAGE: &str = "no document region detected, recognized full image";

/// Pipeline with boxed collaborators, as built from configuration.
pub type BoxedPipeline = DocumentPipeline<Box<dyn RegionDetector>, Box<dyn TextRecognizer>>;

/// Drives one image through the stages and always returns a result.
pub struct DocumentPipeline<D, R> {
    detector: Option<D>,
    recognizer: R,
    parser: FieldParser,
    preprocessor: ImagePreprocessor,
    confidence_threshold: f32,
    min_token_confidence: f32,
}

/// Builder for [`DocumentPipeline`].
pub struct DocumentPipelineBuilder<D, R> {
    detector: Option<D>,
    recognizer: Option<R>,
    parser: Option<FieldParser>,
    config: CccdConfig,
}

impl<D: RegionDetector, R: TextRecognizer> DocumentPipelineBuilder<D, R> {
    /// Create a new builder with default configuration.
    pub fn new() -> Self {
        Self {
            detector: None,
            recognizer: None,
            parser: None,
            config: CccdConfig::default(),
        }
    }

    /// Set the region detector. Without one every image takes the full-frame
    /// path.
    pub fn with_detector(mut self, detector: D) -> Self {
        self.detector = Some(detector);
        self
    }

    /// Set the text recognizer.
    pub fn with_recognizer(mut self, recognizer: R) -> Self {
        self.recognizer = Some(recognizer);
        self
    }

    /// Use a specific field parser instead of one built from the
    /// configuration's extraction tables.
    pub fn with_parser(mut self, parser: FieldParser) -> Self {
        self.parser = Some(parser);
        self
    }

    /// Set configuration.
    pub fn with_config(mut self, config: CccdConfig) -> Self {
        self.config = config;
        self
    }

    /// Build the pipeline. A recognizer is required.
    pub fn build(self) -> Result<DocumentPipeline<D, R>, CccdError> {
        let recognizer = self
            .recognizer
            .ok_or_else(|| CccdError::Config("a text recognizer is required".to_string()))?;
        let parser = self
            .parser
            .unwrap_or_else(|| FieldParser::new(ExtractionTables::from(&self.config.extraction)));

        Ok(DocumentPipeline {
            detector: self.detector,
            recognizer,
            parser,
            preprocessor: ImagePreprocessor::new()
                .with_input_size(self.config.detector.input_size)
                .with_enhancement(self.config.enhancement.clone()),
            confidence_threshold: self.config.detector.confidence_threshold,
            min_token_confidence: self.config.recognizer.min_confidence,
        })
    }
}

impl<D: RegionDetector, R: TextRecognizer> Default for DocumentPipelineBuilder<D, R> {
    fn default() -> Self {
        Self::new()
    }
}

/// Run a stage, converting both errors and panics into a stage-tagged error.
fn guarded<T, E, F>(stage: Stage, f: F) -> Result<T, StageError>
where
    E: Into<CccdError>,
    F: FnOnce() -> Result<T, E>,
{
    match catch_unwind(AssertUnwindSafe(f)) {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(e)) => Err(StageError::new(stage, e)),
        Err(payload) => {
            let message = payload
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic".to_string());
            Err(StageError::new(stage, CccdError::Panic(message)))
        }
    }
}

/// Index of the most confident detection; ties go to the earliest.
pub fn select_best(detections: &[Detection]) -> Option<usize> {
    let scored: Vec<(usize, f32)> = detections
        .iter()
        .enumerate()
        .map(|(i, d)| (i, d.confidence))
        .collect();
    rank_candidates(&scored).copied()
}

impl<D: RegionDetector, R: TextRecognizer> DocumentPipeline<D, R> {
    /// Create a new builder.
    pub fn builder() -> DocumentPipelineBuilder<D, R> {
        DocumentPipelineBuilder::new()
    }

    pub fn has_detector(&self) -> bool {
        self.detector.is_some()
    }

    pub fn parser(&self) -> &FieldParser {
        &self.parser
    }

    /// Process one image. Never fails; problems are reported on the result.
    pub fn process(&self, input: impl Into<ImageInput>) -> ProcessingResult {
        let start = Instant::now();

        let result = match self.run(input.into()) {
            Ok(result) => result,
            Err(e) => {
                warn!("Processing failed: {}", e);
                ProcessingResult::failure(e.to_string())
            }
        };
        let processing_time_ms = start.elapsed().as_millis() as u64;

        info!(
            "Processed image in {}ms (success: {}, fields: {})",
            processing_time_ms,
            result.success,
            result.record.populated_fields().len()
        );
        result.with_processing_time(processing_time_ms)
    }

    /// Process images one after another.
    pub fn process_batch<I>(&self, inputs: I) -> Vec<ProcessingResult>
    where
        I: IntoIterator,
        I::Item: Into<ImageInput>,
    {
        inputs.into_iter().map(|input| self.process(input)).collect()
    }

    fn run(&self, input: ImageInput) -> Result<ProcessingResult, StageError> {
        let image = guarded(Stage::Load, || input.load())?;
        let (width, height) = image.dimensions();
        debug!("Loaded image {}x{}", width, height);

        let detections = match &self.detector {
            Some(detector) => guarded(Stage::Detect, || {
                detector.detect(&image, self.confidence_threshold)
            })?,
            None => Vec::new(),
        };
        debug!("{} candidate regions", detections.len());

        let region = guarded(Stage::Crop, || Ok::<_, CccdError>(self.crop_best(&image, detections)))?;

        let (detection, tokens, warning) = match region {
            Some((detection, crop)) => {
                let enhanced = guarded(Stage::Enhance, || {
                    Ok::<_, CccdError>(self.preprocessor.enhance(&crop))
                })?;
                let tokens = guarded(Stage::Recognize, || self.recognizer.recognize(&enhanced))?;
                let (dx, dy) = (detection.bbox.x1 as f32, detection.bbox.y1 as f32);
                let tokens = tokens.into_iter().map(|t| t.translated(dx, dy)).collect::<Vec<_>>();
                (detection, tokens, None)
            }
            None => {
                debug!("No usable region, recognizing full image");
                let tokens = guarded(Stage::Recognize, || self.recognizer.recognize(&image))?;
                let warning = self.detector.is_some().then(|| FALLBACK_MESSAGE.to_string());
                (Detection::full_image(width, height), tokens, warning)
            }
        };

        let tokens = self.filter_tokens(tokens);
        if tokens.is_empty() {
            return Ok(ProcessingResult {
                success: false,
                message: Some(NO_TEXT_MESSAGE.to_string()),
                detection: Some(detection),
                ..Default::default()
            });
        }

        let full_text = tokens
            .iter()
            .map(|t| t.text.as_str())
            .collect::<Vec<_>>()
            .join("\n");
        let record = guarded(Stage::Extract, || {
            Ok::<_, CccdError>(self.parser.parse(&full_text, &tokens))
        })?;

        Ok(ProcessingResult {
            success: true,
            message: warning,
            detection: Some(detection),
            full_text,
            raw_tokens: tokens,
            record,
            processing_time_ms: 0,
        })
    }

    /// Clamp and crop the most confident usable detection.
    fn crop_best(
        &self,
        image: &DynamicImage,
        detections: Vec<Detection>,
    ) -> Option<(Detection, DynamicImage)> {
        let (width, height) = image.dimensions();
        let usable: Vec<Detection> = detections
            .into_iter()
            .filter_map(|d| {
                let bbox = d.bbox.clamp(width, height)?;
                Some(Detection { bbox, ..d })
            })
            .collect();

        let index = select_best(&usable)?;
        let best = usable.into_iter().nth(index)?;
        let (crop, _) = self.preprocessor.crop(image, &best.bbox)?;
        debug!(
            "Selected {} ({:.3}) at {:?}",
            best.class_name, best.confidence, best.bbox
        );
        Some((best, crop))
    }

    fn filter_tokens(&self, tokens: Vec<RawToken>) -> Vec<RawToken> {
        let min = self.min_token_confidence;
        tokens
            .into_iter()
            .filter(|t| t.has_text() && (min <= 0.0 || t.confidence >= min))
            .collect()
    }
}

/// Load the region detector model named in the configuration.
#[cfg(feature = "native")]
pub fn load_region_detector(
    config: &CccdConfig,
) -> Result<crate::ocr::YoloRegionDetector<cccd_inference::OrtBackend>, crate::error::DetectionError> {
    use cccd_inference::{OrtBackend, SessionOptions};

    use crate::error::DetectionError;
    use crate::ocr::YoloRegionDetector;

    let path = config.model_path(&config.models.detector_model);
    if !path.exists() {
        return Err(DetectionError::ModelLoad(format!("missing {}", path.display())));
    }

    let options = SessionOptions {
        intra_threads: config.detector.num_threads,
        ..Default::default()
    };
    let backend = OrtBackend::from_file_with_options(&path, options)
        .map_err(|e| DetectionError::ModelLoad(format!("{}: {}", path.display(), e)))?;
    info!("Loaded region detector from {}", path.display());

    Ok(YoloRegionDetector::with_config(backend, &config.detector))
}

/// Construct a pipeline from model files named in the configuration.
///
/// A missing detector model is tolerated (full-frame recognition); missing
/// recognition models are an error.
#[cfg(feature = "native")]
pub fn create_pipeline_from_config(config: &CccdConfig) -> Result<BoxedPipeline, CccdError> {
    use crate::ocr::PaddleTextRecognizer;

    let mut builder = BoxedPipeline::builder().with_config(config.clone());

    let detector_path = config.model_path(&config.models.detector_model);
    if detector_path.exists() {
        let detector = load_region_detector(config)?;
        builder = builder.with_detector(Box::new(detector) as Box<dyn RegionDetector>);
    } else {
        warn!(
            "Region detector model not found at {}, using full-image recognition",
            detector_path.display()
        );
    }

    let recognizer = PaddleTextRecognizer::from_paths(
        &config.model_path(&config.models.text_detection_model),
        &config.model_path(&config.models.text_recognition_model),
        &config.model_path(&config.models.dictionary),
        &config.recognizer,
    )?;

    builder
        .with_recognizer(Box::new(recognizer) as Box<dyn TextRecognizer>)
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::BoundingBox;

    #[test]
    fn test_select_best_first_on_tie() {
        let detections = vec![
            Detection::new(BoundingBox::new(0, 0, 1, 1), "a", 0.4),
            Detection::new(BoundingBox::new(0, 0, 1, 1), "b", 0.9),
            Detection::new(BoundingBox::new(0, 0, 1, 1), "c", 0.9),
        ];
        assert_eq!(select_best(&detections), Some(1));
        assert_eq!(select_best(&[]), None);
    }

    #[test]
    fn test_guarded_catches_panics() {
        let err = guarded::<(), CccdError, _>(Stage::Recognize, || panic!("engine exploded"))
            .unwrap_err();
        assert_eq!(err.stage, Stage::Recognize);
        assert_eq!(err.to_string(), "recognize failed: panicked: engine exploded");
    }

    #[test]
    fn test_guarded_tags_errors() {
        let err = guarded::<(), _, _>(Stage::Extract, || {
            Err(CccdError::Config("bad".to_string()))
        })
        .unwrap_err();
        assert_eq!(err.to_string(), "extract failed: configuration error: bad");
    }
}

//! Document processing orchestrator.

mod input;
mod orchestrator;

pub use input::ImageInput;
pub use orchestrator::{
    select_best, BoxedPipeline, DocumentPipeline, DocumentPipelineBuilder, FALLBACK_MESSAGE,
    NO_TEXT_MESSAGE,
};

#[cfg(feature = "native")]
pub use orchestrator::{create_pipeline_from_config, load_region_detector};

//! Data model and configuration.

pub mod config;
pub mod detection;
pub mod record;
pub mod result;

pub use config::CccdConfig;
pub use detection::{BoundingBox, Detection, RawToken};
pub use record::{CardType, ExtractedRecord, Gender};
pub use result::ProcessingResult;

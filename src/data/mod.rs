//! Data module - survey loading and record extraction

mod loader;
mod processor;

pub use loader::{LoaderError, SurveyLoader};
pub use processor::{ExtractionSummary, ProcessorError, ResponseProcessor, ResponseRecord};

//! Analysis Pipeline Module
//! Load → extract → aggregate, shared by the CLI and integration tests.

use crate::config::AnalysisConfig;
use crate::data::{
    ExtractionSummary, LoaderError, ProcessorError, ResponseProcessor, SurveyLoader,
};
use crate::stats::{AggregateError, CategorySeries, WeightedNetFavorabilityAggregator};
use std::path::Path;
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error(transparent)]
    Load(#[from] LoaderError),
    #[error(transparent)]
    Process(#[from] ProcessorError),
    #[error(transparent)]
    Aggregate(#[from] AggregateError),
}

/// Result of one analysis run.
#[derive(Debug, Clone)]
pub struct Analysis {
    pub series: Vec<CategorySeries>,
    pub summary: ExtractionSummary,
}

impl Analysis {
    /// Run the full aggregation for a survey file.
    pub fn from_file(path: &Path, config: &AnalysisConfig) -> Result<Self, PipelineError> {
        let mut loader = SurveyLoader::new();
        let df = loader.load_csv(path, &config.columns)?;

        let (records, summary) = ResponseProcessor::extract_records(df, config)?;

        let aggregator = WeightedNetFavorabilityAggregator::new(config);
        let series = aggregator.aggregate_all(&records)?;

        let points: usize = series.iter().map(|s| s.points.len()).sum();
        info!(categories = series.len(), points, "Aggregation complete");

        Ok(Self { series, summary })
    }
}

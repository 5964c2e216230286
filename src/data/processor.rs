//! Response Processor Module
//! Turns the loaded survey frame into typed response records.

use crate::config::AnalysisConfig;
use polars::prelude::*;
use serde::Serialize;
use std::collections::HashSet;
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Error, Debug)]
pub enum ProcessorError {
    #[error("Polars error: {0}")]
    PolarsError(#[from] PolarsError),
}

/// One respondent observation for a category and period.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResponseRecord {
    pub category: String,
    pub period: i32,
    pub weight: f64,
    /// Missing when the respondent gave no codable answer.
    pub opinion_code: Option<i64>,
}

impl ResponseRecord {
    pub fn new(category: &str, period: i32, weight: f64, opinion_code: Option<i64>) -> Self {
        Self {
            category: category.to_string(),
            period,
            weight,
            opinion_code,
        }
    }
}

/// Row accounting for one extraction pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExtractionSummary {
    pub total_rows: usize,
    pub kept: usize,
    pub other_category: usize,
    pub incomplete: usize,
    pub negative_weight: usize,
}

/// Handles row filtering and type conversion.
pub struct ResponseProcessor;

impl ResponseProcessor {
    /// Extract records for the configured categories.
    ///
    /// Rows with no category, period or weight are dropped. A missing or
    /// non-integer opinion code is kept as `None`.
    pub fn extract_records(
        df: &DataFrame,
        config: &AnalysisConfig,
    ) -> Result<(Vec<ResponseRecord>, ExtractionSummary), ProcessorError> {
        let columns = &config.columns;
        let wanted: HashSet<&str> = config.categories.iter().map(String::as_str).collect();

        let category_col = df.column(&columns.category)?.cast(&DataType::String)?;
        let period_col = df.column(&columns.period)?.cast(&DataType::Float64)?;
        let weight_col = df.column(&columns.weight)?.cast(&DataType::Float64)?;
        let opinion_col = df.column(&columns.opinion)?.cast(&DataType::Float64)?;

        let categories = category_col.str()?;
        let periods = period_col.f64()?;
        let weights = weight_col.f64()?;
        let opinions = opinion_col.f64()?;

        let mut summary = ExtractionSummary {
            total_rows: df.height(),
            ..ExtractionSummary::default()
        };
        let mut records = Vec::new();

        for i in 0..df.height() {
            let Some(category) = categories.get(i).map(str::trim) else {
                summary.incomplete += 1;
                continue;
            };
            if !wanted.contains(category) {
                summary.other_category += 1;
                continue;
            }

            let (Some(period), Some(weight)) = (periods.get(i), weights.get(i)) else {
                summary.incomplete += 1;
                continue;
            };
            if !period.is_finite() || !weight.is_finite() {
                summary.incomplete += 1;
                continue;
            }
            if weight < 0.0 {
                summary.negative_weight += 1;
                continue;
            }

            records.push(ResponseRecord {
                category: category.to_string(),
                period: period.round() as i32,
                weight,
                opinion_code: opinions.get(i).and_then(Self::to_code),
            });
        }

        summary.kept = records.len();
        if summary.negative_weight > 0 {
            warn!(
                rows = summary.negative_weight,
                "Dropped rows with negative survey weight"
            );
        }
        debug!(?summary, "Extraction summary");
        info!(records = summary.kept, "Extracted response records");

        Ok((records, summary))
    }

    /// Opinion codes are whole numbers; anything else counts as missing.
    fn to_code(value: f64) -> Option<i64> {
        (value.is_finite() && value.fract() == 0.0).then_some(value as i64)
    }

    /// Distinct periods in ascending order.
    pub fn periods(records: &[ResponseRecord]) -> Vec<i32> {
        let mut periods: Vec<i32> = records.iter().map(|r| r.period).collect();
        periods.sort_unstable();
        periods.dedup();
        periods
    }
}

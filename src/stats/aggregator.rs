//! Net Favorability Aggregator Module
//! Weighted favorable and unfavorable shares per category and period.

use crate::config::{AnalysisConfig, MissingCategoryPolicy, ZeroWeightPolicy};
use crate::data::ResponseRecord;
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AggregateError {
    #[error("Total weight is zero for {category} in {period}")]
    ZeroWeightGroup { category: String, period: i32 },
    #[error("No responses found for category '{0}'")]
    MissingCategory(String),
}

/// Net favorability for one (category, period) group.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregatePoint {
    pub category: String,
    pub period: i32,
    /// Percent of total weight with a favorable code.
    pub favorable_share: f64,
    /// Percent of total weight with an unfavorable code.
    pub unfavorable_share: f64,
    /// `favorable_share - unfavorable_share`, in [-100, 100].
    pub net_favorable: f64,
    pub total_weight: f64,
    pub respondents: usize,
}

/// Points for one category, ascending by period.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategorySeries {
    pub category: String,
    pub points: Vec<AggregatePoint>,
}

impl CategorySeries {
    pub fn empty(category: &str) -> Self {
        Self {
            category: category.to_string(),
            points: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// (period, net) pairs for plotting.
    pub fn net_values(&self) -> Vec<(i32, f64)> {
        self.points
            .iter()
            .map(|p| (p.period, p.net_favorable))
            .collect()
    }

    /// Smallest and largest period, if any.
    pub fn period_range(&self) -> Option<(i32, i32)> {
        Some((self.points.first()?.period, self.points.last()?.period))
    }
}

/// Computes weighted net favorability from response records.
pub struct WeightedNetFavorabilityAggregator {
    favorable: HashSet<i64>,
    unfavorable: HashSet<i64>,
    zero_weight_policy: ZeroWeightPolicy,
    missing_category_policy: MissingCategoryPolicy,
    categories: Vec<String>,
}

impl WeightedNetFavorabilityAggregator {
    pub fn new(config: &AnalysisConfig) -> Self {
        Self {
            favorable: config.favorable_codes.iter().copied().collect(),
            unfavorable: config.unfavorable_codes.iter().copied().collect(),
            zero_weight_policy: config.zero_weight_policy,
            missing_category_policy: config.missing_category_policy,
            categories: config.categories.clone(),
        }
    }

    /// Aggregate one group of records sharing a category and period.
    ///
    /// Records whose code is in neither set, or missing, still count
    /// towards the total weight.
    pub fn aggregate_group(
        &self,
        category: &str,
        period: i32,
        records: &[&ResponseRecord],
    ) -> Result<AggregatePoint, AggregateError> {
        let mut total = 0.0;
        let mut favorable = 0.0;
        let mut unfavorable = 0.0;

        for record in records {
            total += record.weight;
            match record.opinion_code {
                Some(code) if self.favorable.contains(&code) => favorable += record.weight,
                Some(code) if self.unfavorable.contains(&code) => unfavorable += record.weight,
                _ => {}
            }
        }

        if !(total > 0.0) || !total.is_finite() {
            return Err(AggregateError::ZeroWeightGroup {
                category: category.to_string(),
                period,
            });
        }

        let favorable_share = favorable / total * 100.0;
        let unfavorable_share = unfavorable / total * 100.0;

        Ok(AggregatePoint {
            category: category.to_string(),
            period,
            favorable_share,
            unfavorable_share,
            net_favorable: favorable_share - unfavorable_share,
            total_weight: total,
            respondents: records.len(),
        })
    }

    /// Aggregate every period present for a category.
    ///
    /// Periods are visited in ascending order; periods with no records are
    /// simply absent.
    pub fn aggregate_category(
        &self,
        category: &str,
        records: &[ResponseRecord],
    ) -> Result<CategorySeries, AggregateError> {
        let mut by_period: BTreeMap<i32, Vec<&ResponseRecord>> = BTreeMap::new();
        for record in records.iter().filter(|r| r.category == category) {
            by_period.entry(record.period).or_default().push(record);
        }

        if by_period.is_empty() {
            return Err(AggregateError::MissingCategory(category.to_string()));
        }

        let mut points = Vec::with_capacity(by_period.len());
        for (period, group) in &by_period {
            match self.aggregate_group(category, *period, group) {
                Ok(point) => {
                    debug!(
                        category,
                        period,
                        respondents = point.respondents,
                        net = point.net_favorable,
                        "Aggregated group"
                    );
                    points.push(point);
                }
                Err(err @ AggregateError::ZeroWeightGroup { .. }) => {
                    match self.zero_weight_policy {
                        ZeroWeightPolicy::Abort => return Err(err),
                        ZeroWeightPolicy::Skip => {
                            warn!(category, period, "Skipping group with zero total weight");
                        }
                        ZeroWeightPolicy::ZeroFill => {
                            warn!(category, period, "Zero-filling group with zero total weight");
                            points.push(AggregatePoint {
                                category: category.to_string(),
                                period: *period,
                                favorable_share: 0.0,
                                unfavorable_share: 0.0,
                                net_favorable: 0.0,
                                total_weight: 0.0,
                                respondents: group.len(),
                            });
                        }
                    }
                }
                Err(err) => return Err(err),
            }
        }

        Ok(CategorySeries {
            category: category.to_string(),
            points,
        })
    }

    /// One series per configured category, in configured order.
    pub fn aggregate_all(
        &self,
        records: &[ResponseRecord],
    ) -> Result<Vec<CategorySeries>, AggregateError> {
        let mut all = Vec::with_capacity(self.categories.len());

        for category in &self.categories {
            match self.aggregate_category(category, records) {
                Ok(series) => all.push(series),
                Err(err @ AggregateError::MissingCategory(_)) => {
                    match self.missing_category_policy {
                        MissingCategoryPolicy::Abort => return Err(err),
                        MissingCategoryPolicy::EmptyPanel => {
                            warn!(category = category.as_str(), "No responses, panel will be empty");
                            all.push(CategorySeries::empty(category));
                        }
                        MissingCategoryPolicy::Skip => {
                            warn!(category = category.as_str(), "No responses, category skipped");
                        }
                    }
                }
                Err(err) => return Err(err),
            }
        }

        Ok(all)
    }
}

//! Analysis Configuration Module
//! Categories, column mapping, response code sets, edge-case policies and
//! chart settings. `Default` reproduces the Pew "favorability of China" run.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("At least one category is required")]
    NoCategories,
    #[error("Duplicate category: {0}")]
    DuplicateCategory(String),
    #[error("Favorable and unfavorable code sets must both be non-empty")]
    EmptyCodeSet,
    #[error("Code {0} is both favorable and unfavorable")]
    OverlappingCode(i64),
    #[error("Chart '{chart}' has a {rows}x{cols} grid, too small for {categories} categories")]
    GridTooSmall {
        chart: String,
        rows: usize,
        cols: usize,
        categories: usize,
    },
    #[error("Chart '{0}' must have a positive figure size and dpi")]
    InvalidFigureSize(String),
}

/// Source column names in the survey file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnMap {
    pub category: String,
    pub period: String,
    pub weight: String,
    pub opinion: String,
}

impl Default for ColumnMap {
    fn default() -> Self {
        Self {
            category: "new_label".to_string(),
            period: "year".to_string(),
            weight: "weight".to_string(),
            opinion: "fav_china".to_string(),
        }
    }
}

impl ColumnMap {
    /// Required columns in a stable order.
    pub fn required(&self) -> [&str; 4] {
        [
            self.category.as_str(),
            self.period.as_str(),
            self.weight.as_str(),
            self.opinion.as_str(),
        ]
    }
}

/// What to do with a (category, period) group whose weights sum to zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ZeroWeightPolicy {
    /// Drop the period from the series.
    #[default]
    Skip,
    /// Keep the period with every share set to zero.
    ZeroFill,
    Abort,
}

/// What to do with a configured category that has no records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingCategoryPolicy {
    /// Keep an empty series so the chart shows a blank panel.
    #[default]
    EmptyPanel,
    /// Leave the category out of the output entirely.
    Skip,
    Abort,
}

/// Settings for one small-multiple figure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PanelChartConfig {
    /// Width and height in inches.
    pub figure_size: [f64; 2],
    pub dpi: u32,
    /// Rows and columns of panels.
    pub grid: [usize; 2],
    pub integer_x_ticks: bool,
    /// Figure title; `\n` starts a new line.
    pub suptitle: String,
    pub footnote: Option<String>,
    pub file_name: String,
}

impl Default for PanelChartConfig {
    fn default() -> Self {
        Self {
            figure_size: [15.0, 10.0],
            dpi: 100,
            grid: [2, 3],
            integer_x_ticks: false,
            suptitle: "Net Favorable Trends Towards China: Key Markets".to_string(),
            footnote: None,
            file_name: "net_favorable_trends.png".to_string(),
        }
    }
}

impl PanelChartConfig {
    /// The taller figure: whole-year ticks, two-line title and a source footnote.
    pub fn attitudes_towards_china() -> Self {
        Self {
            figure_size: [15.0, 12.0],
            integer_x_ticks: true,
            suptitle: "Attitudes towards China 2006-2023\n(Net favorable - unfavorable)"
                .to_string(),
            footnote: Some(
                "1. Source: Pew Research Global Attitudes Project Spring 2006-2023     \
                 2. Question: Please tell me if you have a very favorable, somewhat favorable, \
                 somewhat unfavorable, or very unfavorable opinion of China"
                    .to_string(),
            ),
            file_name: "attitudes_towards_china.png".to_string(),
            ..Self::default()
        }
    }

    /// Pixel dimensions of the rendered image.
    pub fn pixel_size(&self) -> (u32, u32) {
        let dpi = self.dpi as f64;
        (
            (self.figure_size[0] * dpi).round() as u32,
            (self.figure_size[1] * dpi).round() as u32,
        )
    }

    pub fn capacity(&self) -> usize {
        self.grid[0] * self.grid[1]
    }
}

/// Full configuration for one analysis run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Categories to analyse, in panel order.
    pub categories: Vec<String>,
    pub columns: ColumnMap,
    pub favorable_codes: Vec<i64>,
    pub unfavorable_codes: Vec<i64>,
    pub zero_weight_policy: ZeroWeightPolicy,
    pub missing_category_policy: MissingCategoryPolicy,
    pub output_dir: PathBuf,
    pub charts: Vec<PanelChartConfig>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            categories: [
                "United Kingdom",
                "United States",
                "Australia",
                "India",
                "Japan",
                "South Korea",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            columns: ColumnMap::default(),
            favorable_codes: vec![1, 2],
            unfavorable_codes: vec![3, 4],
            zero_weight_policy: ZeroWeightPolicy::default(),
            missing_category_policy: MissingCategoryPolicy::default(),
            output_dir: PathBuf::from("charts"),
            charts: vec![
                PanelChartConfig::default(),
                PanelChartConfig::attitudes_towards_china(),
            ],
        }
    }
}

impl AnalysisConfig {
    /// Load a (possibly partial) JSON config and validate it.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&text)
    }

    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.categories.is_empty() {
            return Err(ConfigError::NoCategories);
        }

        let mut seen = HashSet::new();
        for category in &self.categories {
            if !seen.insert(category.as_str()) {
                return Err(ConfigError::DuplicateCategory(category.clone()));
            }
        }

        if self.favorable_codes.is_empty() || self.unfavorable_codes.is_empty() {
            return Err(ConfigError::EmptyCodeSet);
        }
        if let Some(code) = self
            .favorable_codes
            .iter()
            .find(|c| self.unfavorable_codes.contains(c))
        {
            return Err(ConfigError::OverlappingCode(*code));
        }

        for chart in &self.charts {
            let [width, height] = chart.figure_size;
            if !(width > 0.0 && height > 0.0) || chart.dpi == 0 {
                return Err(ConfigError::InvalidFigureSize(chart.file_name.clone()));
            }
            if chart.capacity() < self.categories.len() {
                return Err(ConfigError::GridTooSmall {
                    chart: chart.file_name.clone(),
                    rows: chart.grid[0],
                    cols: chart.grid[1],
                    categories: self.categories.len(),
                });
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = AnalysisConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.categories.len(), 6);
        assert_eq!(config.charts.len(), 2);
        assert!(config.charts[1].integer_x_ticks);
    }

    #[test]
    fn test_pixel_size() {
        assert_eq!(PanelChartConfig::default().pixel_size(), (1500, 1000));
        assert_eq!(
            PanelChartConfig::attitudes_towards_china().pixel_size(),
            (1500, 1200)
        );
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = AnalysisConfig::from_json(
            r#"{"categories": ["X", "Y"], "columns": {"opinion": "fav_us"}}"#,
        )
        .unwrap();

        assert_eq!(config.categories, vec!["X", "Y"]);
        assert_eq!(config.columns.opinion, "fav_us");
        assert_eq!(config.columns.category, "new_label");
        assert_eq!(config.favorable_codes, vec![1, 2]);
        assert_eq!(config.charts.len(), 2);
    }

    #[test]
    fn test_policies_parse_snake_case() {
        let config = AnalysisConfig::from_json(
            r#"{"zero_weight_policy": "zero_fill", "missing_category_policy": "abort"}"#,
        )
        .unwrap();
        assert_eq!(config.zero_weight_policy, ZeroWeightPolicy::ZeroFill);
        assert_eq!(config.missing_category_policy, MissingCategoryPolicy::Abort);
    }

    #[test]
    fn test_overlapping_codes_rejected() {
        let config = AnalysisConfig {
            favorable_codes: vec![1, 2],
            unfavorable_codes: vec![2, 3],
            ..AnalysisConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::OverlappingCode(2))
        ));
    }

    #[test]
    fn test_grid_too_small_rejected() {
        let mut config = AnalysisConfig::default();
        config.charts[0].grid = [1, 3];
        assert!(matches!(
            config.validate(),
            Err(ConfigError::GridTooSmall { categories: 6, .. })
        ));
    }

    #[test]
    fn test_empty_and_duplicate_categories_rejected() {
        let empty = AnalysisConfig {
            categories: Vec::new(),
            ..AnalysisConfig::default()
        };
        assert!(matches!(empty.validate(), Err(ConfigError::NoCategories)));

        let duplicate = AnalysisConfig {
            categories: vec!["Japan".to_string(), "Japan".to_string()],
            ..AnalysisConfig::default()
        };
        assert!(matches!(
            duplicate.validate(),
            Err(ConfigError::DuplicateCategory(_))
        ));
    }

    #[test]
    fn test_invalid_json_is_an_error() {
        assert!(matches!(
            AnalysisConfig::from_json("{not json"),
            Err(ConfigError::Json(_))
        ));
    }
}

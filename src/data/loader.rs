//! Survey Data Loader Module
//! Handles survey file loading and column validation using Polars.

use crate::config::ColumnMap;
use polars::prelude::*;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("Failed to load survey file: {0}")]
    CsvError(#[from] PolarsError),
    #[error("Survey file not found: {0}")]
    NotFound(PathBuf),
    #[error("Required column '{0}' is missing from the survey file")]
    MissingColumn(String),
    #[error("No data loaded")]
    NoData,
}

/// Handles survey file loading with Polars.
pub struct SurveyLoader {
    df: Option<DataFrame>,
    file_path: Option<PathBuf>,
}

impl Default for SurveyLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl SurveyLoader {
    pub fn new() -> Self {
        Self {
            df: None,
            file_path: None,
        }
    }

    /// Load a CSV survey export and check that every mapped column exists.
    pub fn load_csv(
        &mut self,
        file_path: &Path,
        columns: &ColumnMap,
    ) -> Result<&DataFrame, LoaderError> {
        if !file_path.exists() {
            return Err(LoaderError::NotFound(file_path.to_path_buf()));
        }
        self.file_path = Some(file_path.to_path_buf());

        // Malformed cells become nulls rather than failing the whole read
        let df = LazyCsvReader::new(file_path)
            .with_infer_schema_length(Some(10000))
            .with_ignore_errors(true)
            .finish()?
            .collect()?;

        Self::check_columns(&df, columns)?;
        if df.height() == 0 {
            return Err(LoaderError::NoData);
        }

        info!(
            path = %file_path.display(),
            rows = df.height(),
            columns = df.width(),
            "Loaded survey file"
        );

        self.df = Some(df);
        self.df.as_ref().ok_or(LoaderError::NoData)
    }

    /// Fail with the first mapped column the frame lacks.
    pub fn check_columns(df: &DataFrame, columns: &ColumnMap) -> Result<(), LoaderError> {
        let present = Self::column_names(df);
        for required in columns.required() {
            if !present.iter().any(|name| name == required) {
                return Err(LoaderError::MissingColumn(required.to_string()));
            }
        }
        debug!(?present, "All required columns present");
        Ok(())
    }

    fn column_names(df: &DataFrame) -> Vec<String> {
        df.get_column_names()
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    /// Get list of column names from loaded DataFrame.
    pub fn get_columns(&self) -> Vec<String> {
        self.df.as_ref().map(Self::column_names).unwrap_or_default()
    }

    /// Get the number of rows in the DataFrame.
    pub fn get_row_count(&self) -> usize {
        self.df.as_ref().map(|df| df.height()).unwrap_or(0)
    }

    /// Get a reference to the loaded DataFrame.
    pub fn get_dataframe(&self) -> Option<&DataFrame> {
        self.df.as_ref()
    }

    pub fn get_file_path(&self) -> Option<&PathBuf> {
        self.file_path.as_ref()
    }
}

//! Report Output Module
//! Console printout of the aggregate series and JSON export.

use crate::stats::CategorySeries;
use serde::Serialize;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Format a percentage with a fixed number of decimals.
///
/// Ties round half to even on the binary value, e.g. 2.5 -> "2",
/// 0.125 -> "0.12".
pub fn format_percent(value: f64, decimals: usize) -> String {
    format!("{:.*}", decimals, value)
}

/// Write the per-category listing:
///
/// ```text
/// Net Favorable Scores Over Time (%):
///
/// Japan:
/// Year: 2020, Net Favorable: -12.5%
/// ```
pub fn write_summary<W: Write>(out: &mut W, series: &[CategorySeries]) -> io::Result<()> {
    writeln!(out)?;
    writeln!(out, "Net Favorable Scores Over Time (%):")?;
    for s in series {
        writeln!(out)?;
        writeln!(out, "{}:", s.category)?;
        for point in &s.points {
            writeln!(
                out,
                "Year: {}, Net Favorable: {}%",
                point.period,
                format_percent(point.net_favorable, 1)
            )?;
        }
    }
    Ok(())
}

/// Print the listing to stdout.
pub fn print_summary(series: &[CategorySeries]) -> Result<(), ReportError> {
    let stdout = io::stdout();
    let mut lock = stdout.lock();
    write_summary(&mut lock, series)?;
    lock.flush()?;
    Ok(())
}

#[derive(Serialize)]
struct Export<'a> {
    source: &'a str,
    series: &'a [CategorySeries],
}

/// Write the series, with shares and weights, as pretty JSON.
pub fn export_json(
    path: &Path,
    source: &Path,
    series: &[CategorySeries],
) -> Result<(), ReportError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    let source = source.to_string_lossy();
    let export = Export {
        source: &source,
        series,
    };

    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, &export)?;
    writer.flush()?;

    debug!(categories = series.len(), "Serialized series");
    info!(path = %path.display(), "Exported aggregate series");
    Ok(())
}

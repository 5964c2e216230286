//! netfav - Net Favorability Trends
//!
//! Computes weighted net favorability per country and year from a survey
//! export, prints the series and renders small-multiple line charts.

use anyhow::{Context, Result};
use clap::Parser;
use netfav::charts::PanelChartRenderer;
use netfav::config::AnalysisConfig;
use netfav::pipeline::Analysis;
use netfav::report;
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

#[derive(Parser)]
#[command(name = "netfav")]
#[command(about = "Net favorability trends from weighted survey data", long_about = None)]
struct Cli {
    /// Survey export (CSV) to analyse
    #[arg(value_name = "INPUT", default_value = "exported_file.csv")]
    input: PathBuf,

    /// JSON configuration; omitted fields keep their defaults
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory for rendered figures (overrides the config)
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Also write the aggregate series as JSON
    #[arg(long, value_name = "FILE")]
    export_json: Option<PathBuf>,

    /// Do not open rendered figures in the system viewer
    #[arg(long, default_value_t = false)]
    no_open: bool,
}

fn init_logging() {
    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .from_env_lossy(),
        );

    tracing_subscriber::registry().with(stderr_layer).init();
}

fn main() -> Result<()> {
    init_logging();
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => AnalysisConfig::from_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => AnalysisConfig::default(),
    };
    if let Some(dir) = cli.output_dir {
        config.output_dir = dir;
    }
    config.validate().context("Invalid configuration")?;

    let analysis = Analysis::from_file(&cli.input, &config)
        .with_context(|| format!("Failed to analyse {}", cli.input.display()))?;

    report::print_summary(&analysis.series)?;

    if let Some(path) = &cli.export_json {
        report::export_json(path, &cli.input, &analysis.series)
            .with_context(|| format!("Failed to export {}", path.display()))?;
    }

    for chart in &config.charts {
        let path = PanelChartRenderer::render(chart, &analysis.series, &config.output_dir)
            .with_context(|| format!("Failed to render {}", chart.file_name))?;

        if cli.no_open {
            continue;
        }
        if let Err(e) = open::that(&path) {
            warn!(path = %path.display(), error = %e, "Could not open figure");
        }
    }

    info!("Done");
    Ok(())
}

use netfav::charts::FigurePlan;
use netfav::config::{AnalysisConfig, MissingCategoryPolicy};
use netfav::pipeline::{Analysis, PipelineError};
use netfav::report::write_summary;
use netfav::stats::AggregateError;
use std::path::Path;

const FIXTURE: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/sample_survey.csv");

fn fixture_config() -> AnalysisConfig {
    AnalysisConfig::from_json(r#"{"categories": ["X", "Y", "Absent"]}"#)
        .expect("Failed to parse config")
}

#[test]
fn test_full_pipeline() {
    let analysis = Analysis::from_file(Path::new(FIXTURE), &fixture_config())
        .expect("Failed to analyse fixture");

    assert_eq!(analysis.summary.total_rows, 9);
    assert_eq!(analysis.summary.other_category, 1);
    assert_eq!(analysis.summary.incomplete, 1);
    assert_eq!(analysis.summary.kept, 7);

    let series = &analysis.series;
    assert_eq!(series.len(), 3);
    assert_eq!(series[0].net_values(), vec![(2020, 0.0)]);
    assert_eq!(series[1].net_values(), vec![(2021, 25.0), (2022, 50.0)]);
    assert!(series[2].is_empty());

    let y_2021 = &series[1].points[0];
    assert_eq!(y_2021.favorable_share, 50.0);
    assert_eq!(y_2021.unfavorable_share, 25.0);
    assert_eq!(y_2021.respondents, 3);
}

#[test]
fn test_console_output_for_fixture() {
    let analysis = Analysis::from_file(Path::new(FIXTURE), &fixture_config()).unwrap();

    let mut out = Vec::new();
    write_summary(&mut out, &analysis.series).unwrap();
    let text = String::from_utf8(out).unwrap();

    assert!(text.contains("\nX:\nYear: 2020, Net Favorable: 0.0%\n"));
    assert!(text.contains("Year: 2021, Net Favorable: 25.0%"));
    assert!(text.contains("Year: 2022, Net Favorable: 50.0%"));
    assert!(text.ends_with("\nAbsent:\n"));
}

#[test]
fn test_missing_category_abort() {
    let mut config = fixture_config();
    config.missing_category_policy = MissingCategoryPolicy::Abort;

    let err = Analysis::from_file(Path::new(FIXTURE), &config).unwrap_err();
    assert!(matches!(
        err,
        PipelineError::Aggregate(AggregateError::MissingCategory(ref c)) if c == "Absent"
    ));
}

#[test]
fn test_figure_plans_for_fixture() {
    let config = fixture_config();
    let analysis = Analysis::from_file(Path::new(FIXTURE), &config).unwrap();

    for chart in &config.charts {
        let plan = FigurePlan::new(chart, &analysis.series);
        assert_eq!(plan.panels.len(), 3);
        assert!(plan.panels[2].is_empty());
        assert_eq!(plan.panels[1].labels[0].text, "25%");
        assert_eq!(plan.panels[1].x_range, (2020.5, 2022.5));
    }
}

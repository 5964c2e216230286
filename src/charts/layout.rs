//! Figure Layout Module
//! Plans a small-multiple figure (sizes, ranges, labels) before any drawing.

use crate::config::PanelChartConfig;
use crate::report::format_percent;
use crate::stats::CategorySeries;

/// Fixed y-axis range, in percent.
pub const Y_RANGE: (f64, f64) = (-100.0, 100.0);

/// Range shown by a panel with no data.
pub const EMPTY_X_RANGE: (f64, f64) = (0.0, 1.0);

/// Font sizes in points.
pub const SUPTITLE_PT: f64 = 16.0;
pub const PANEL_TITLE_PT: f64 = 12.0;
pub const AXIS_LABEL_PT: f64 = 10.0;
pub const DATA_LABEL_PT: f64 = 8.0;
pub const FOOTNOTE_PT: f64 = 9.0;

/// Data labels sit this many points above their marker.
pub const DATA_LABEL_OFFSET_PT: f64 = 10.0;

/// Convert a typographic size to pixels at the given resolution.
pub fn points_to_px(points: f64, dpi: u32) -> u32 {
    (points * dpi as f64 / 72.0).round().max(1.0) as u32
}

/// Label for an x-axis tick. In integer mode only whole years get a label.
pub fn x_tick_label(value: f64, integer_ticks: bool) -> String {
    if integer_ticks {
        let rounded = value.round();
        if (value - rounded).abs() < 1e-6 {
            format!("{}", rounded as i64)
        } else {
            String::new()
        }
    } else {
        format!("{}", value)
    }
}

/// Greedy word wrap. Explicit line breaks are kept; runs of spaces collapse.
pub fn wrap_text(text: &str, max_chars: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);
    let mut lines = Vec::new();

    for paragraph in text.lines() {
        let mut current = String::new();
        for word in paragraph.split_whitespace() {
            let needed = current.chars().count() + 1 + word.chars().count();
            if !current.is_empty() && needed > max_chars {
                lines.push(std::mem::take(&mut current));
            }
            if !current.is_empty() {
                current.push(' ');
            }
            current.push_str(word);
        }
        if !current.is_empty() {
            lines.push(current);
        }
    }

    lines
}

/// Text placed above a data point.
#[derive(Debug, Clone, PartialEq)]
pub struct DataLabel {
    pub x: f64,
    pub y: f64,
    pub text: String,
}

/// Everything needed to draw one panel.
#[derive(Debug, Clone, PartialEq)]
pub struct PanelPlan {
    pub title: String,
    pub x_range: (f64, f64),
    pub points: Vec<(f64, f64)>,
    pub labels: Vec<DataLabel>,
    /// Approximate number of x ticks to request.
    pub x_tick_count: usize,
}

impl PanelPlan {
    pub fn from_series(series: &CategorySeries, integer_ticks: bool) -> Self {
        let points: Vec<(f64, f64)> = series
            .net_values()
            .into_iter()
            .map(|(period, net)| (period as f64, net))
            .collect();

        let labels = points
            .iter()
            .map(|&(x, y)| DataLabel {
                x,
                y,
                text: format!("{}%", format_percent(y, 0)),
            })
            .collect();

        let (x_range, x_tick_count) = match series.period_range() {
            Some((first, last)) => {
                let span = (last - first) as usize;
                let ticks = if integer_ticks { (span + 1).clamp(2, 10) } else { 6 };
                ((first as f64 - 0.5, last as f64 + 0.5), ticks)
            }
            None => (EMPTY_X_RANGE, 6),
        };

        Self {
            title: series.category.clone(),
            x_range,
            points,
            labels,
            x_tick_count,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Everything needed to draw one figure.
#[derive(Debug, Clone, PartialEq)]
pub struct FigurePlan {
    pub width: u32,
    pub height: u32,
    pub dpi: u32,
    pub rows: usize,
    pub cols: usize,
    pub integer_x_ticks: bool,
    pub title_lines: Vec<String>,
    pub title_height: u32,
    pub footnote_lines: Vec<String>,
    pub footnote_height: u32,
    pub panels: Vec<PanelPlan>,
}

impl FigurePlan {
    pub fn new(config: &PanelChartConfig, series: &[CategorySeries]) -> Self {
        let (width, height) = config.pixel_size();
        let dpi = config.dpi;

        let title_lines: Vec<String> = config
            .suptitle
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect();
        let line_px = points_to_px(SUPTITLE_PT * 1.4, dpi);
        let title_height = title_lines.len() as u32 * line_px + points_to_px(SUPTITLE_PT, dpi);

        // Footnote starts at 10% of the width; glyphs average ~0.55em
        let footnote_px = points_to_px(FOOTNOTE_PT, dpi) as f64;
        let max_chars = (width as f64 * 0.85 / (footnote_px * 0.55)) as usize;
        let footnote_lines = config
            .footnote
            .as_deref()
            .map(|text| wrap_text(text, max_chars))
            .unwrap_or_default();
        // At least the bottom 5% of the figure
        let footnote_height = if footnote_lines.is_empty() {
            0
        } else {
            let block = footnote_lines.len() as u32 * points_to_px(FOOTNOTE_PT * 1.4, dpi)
                + points_to_px(FOOTNOTE_PT, dpi);
            (height / 20).max(block)
        };

        let panels = series
            .iter()
            .take(config.capacity())
            .map(|s| PanelPlan::from_series(s, config.integer_x_ticks))
            .collect();

        Self {
            width,
            height,
            dpi,
            rows: config.grid[0],
            cols: config.grid[1],
            integer_x_ticks: config.integer_x_ticks,
            title_lines,
            title_height,
            footnote_lines,
            footnote_height,
            panels,
        }
    }

    /// Pixel size of a font given in points.
    pub fn px(&self, points: f64) -> u32 {
        points_to_px(points, self.dpi)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::AggregatePoint;

    fn series(category: &str, values: &[(i32, f64)]) -> CategorySeries {
        CategorySeries {
            category: category.to_string(),
            points: values
                .iter()
                .map(|&(period, net)| AggregatePoint {
                    category: category.to_string(),
                    period,
                    favorable_share: 0.0,
                    unfavorable_share: 0.0,
                    net_favorable: net,
                    total_weight: 1.0,
                    respondents: 1,
                })
                .collect(),
        }
    }

    #[test]
    fn test_points_to_px() {
        assert_eq!(points_to_px(72.0, 100), 100);
        assert_eq!(points_to_px(10.0, 72), 10);
        assert_eq!(points_to_px(0.0, 100), 1);
    }

    #[test]
    fn test_integer_tick_labels() {
        assert_eq!(x_tick_label(2008.0, true), "2008");
        assert_eq!(x_tick_label(2007.5, true), "");
        assert_eq!(x_tick_label(2007.5, false), "2007.5");
        assert_eq!(x_tick_label(2008.0, false), "2008");
    }

    #[test]
    fn test_wrap_text() {
        assert_eq!(
            wrap_text("one two three four", 9),
            vec!["one two", "three", "four"]
        );
        assert_eq!(wrap_text("a\nb   c", 80), vec!["a", "b c"]);
        assert_eq!(wrap_text("unbreakableword", 4), vec!["unbreakableword"]);
        assert!(wrap_text("   ", 10).is_empty());
    }

    #[test]
    fn test_panel_plan_from_series() {
        let plan = PanelPlan::from_series(
            &series("Japan", &[(2006, -12.4), (2007, 25.5), (2009, 0.3)]),
            true,
        );

        assert_eq!(plan.title, "Japan");
        assert_eq!(plan.x_range, (2005.5, 2009.5));
        assert_eq!(plan.x_tick_count, 4);
        let texts: Vec<&str> = plan.labels.iter().map(|l| l.text.as_str()).collect();
        assert_eq!(texts, vec!["-12%", "26%", "0%"]);
        assert_eq!(plan.labels[1].x, 2007.0);
        assert_eq!(plan.labels[1].y, 25.5);
    }

    #[test]
    fn test_empty_series_plans_blank_panel() {
        let plan = PanelPlan::from_series(&CategorySeries::empty("South Korea"), true);
        assert!(plan.is_empty());
        assert!(plan.labels.is_empty());
        assert_eq!(plan.x_range, EMPTY_X_RANGE);
        assert_eq!(plan.title, "South Korea");
    }

    #[test]
    fn test_figure_plan_defaults() {
        let all = vec![series("A", &[(2020, 10.0)]), CategorySeries::empty("B")];
        let plan = FigurePlan::new(&PanelChartConfig::default(), &all);

        assert_eq!((plan.width, plan.height), (1500, 1000));
        assert_eq!((plan.rows, plan.cols), (2, 3));
        assert_eq!(plan.title_lines.len(), 1);
        assert!(plan.footnote_lines.is_empty());
        assert_eq!(plan.footnote_height, 0);
        assert_eq!(plan.panels.len(), 2);
        assert_eq!(plan.panels[0].x_range, (2019.5, 2020.5));
    }

    #[test]
    fn test_figure_plan_multiline_title_and_footnote() {
        let config = PanelChartConfig::attitudes_towards_china();
        let plan = FigurePlan::new(&config, &[]);

        assert_eq!(
            plan.title_lines,
            vec![
                "Attitudes towards China 2006-2023",
                "(Net favorable - unfavorable)"
            ]
        );
        assert!(plan.footnote_lines.len() >= 2);
        assert!(plan.footnote_lines[0].starts_with("1. Source"));
        assert!(plan.footnote_height >= 60);
        assert!(plan.integer_x_ticks);
        assert!(plan.panels.is_empty());
    }
}

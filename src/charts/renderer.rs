//! Panel Chart Renderer
//! Draws a planned small-multiple figure to PNG with plotters.
//!
//! Layout:
//! 1. Title lines centered at the top
//! 2. Grid of panels, one per category, filled row by row
//!    - steel blue line with point markers, dashed zero line
//!    - y-axis fixed to [-100, 100], rounded percentage above every point
//! 3. Optional footnote block at the bottom, starting at 10% of the width

use crate::charts::layout::{
    x_tick_label, FigurePlan, PanelPlan, AXIS_LABEL_PT, DATA_LABEL_OFFSET_PT, DATA_LABEL_PT,
    FOOTNOTE_PT, PANEL_TITLE_PT, SUPTITLE_PT, Y_RANGE,
};
use crate::config::PanelChartConfig;
use crate::stats::CategorySeries;
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::series::DashedLineSeries;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

const FONT: &str = "sans-serif";
const STEEL_BLUE: RGBColor = RGBColor(70, 130, 180);

#[derive(Error, Debug)]
pub enum ChartError {
    #[error("Failed to prepare output directory: {0}")]
    Io(#[from] std::io::Error),
    #[error("Drawing failed: {0}")]
    Drawing(String),
}

fn drawing<E: std::fmt::Display>(err: E) -> ChartError {
    ChartError::Drawing(err.to_string())
}

/// Renders net favorability series as a grid of line charts.
pub struct PanelChartRenderer;

impl PanelChartRenderer {
    /// Render one figure into `output_dir` and return the written path.
    pub fn render(
        config: &PanelChartConfig,
        series: &[CategorySeries],
        output_dir: &Path,
    ) -> Result<PathBuf, ChartError> {
        std::fs::create_dir_all(output_dir)?;
        let path = output_dir.join(&config.file_name);

        let plan = FigurePlan::new(config, series);
        Self::render_plan(&plan, &path)?;

        info!(path = %path.display(), panels = plan.panels.len(), "Rendered figure");
        Ok(path)
    }

    /// Draw a plan to a PNG file.
    pub fn render_plan(plan: &FigurePlan, path: &Path) -> Result<(), ChartError> {
        let root = BitMapBackend::new(path, (plan.width, plan.height)).into_drawing_area();
        Self::draw_figure(&root, plan)?;
        root.present().map_err(drawing)?;
        Ok(())
    }

    /// Draw a plan onto any drawing area.
    pub fn draw_figure<DB: DrawingBackend>(
        root: &DrawingArea<DB, Shift>,
        plan: &FigurePlan,
    ) -> Result<(), ChartError> {
        root.fill(&WHITE).map_err(drawing)?;

        let body_height = plan
            .height
            .saturating_sub(plan.title_height)
            .saturating_sub(plan.footnote_height);
        let (title_area, rest) = root.split_vertically(plan.title_height);
        let (panel_area, footnote_area) = rest.split_vertically(body_height);

        Self::draw_title(&title_area, plan)?;

        // Cells past the last series stay blank
        let cells = panel_area.split_evenly((plan.rows, plan.cols));
        for (cell, panel) in cells.iter().zip(&plan.panels) {
            Self::draw_panel(cell, panel, plan)?;
        }

        if !plan.footnote_lines.is_empty() {
            Self::draw_footnote(&footnote_area, plan)?;
        }

        Ok(())
    }

    fn draw_title<DB: DrawingBackend>(
        area: &DrawingArea<DB, Shift>,
        plan: &FigurePlan,
    ) -> Result<(), ChartError> {
        let font_px = plan.px(SUPTITLE_PT);
        let line_px = plan.px(SUPTITLE_PT * 1.4) as i32;
        let style = (FONT, font_px as f64)
            .into_font()
            .color(&BLACK)
            .pos(Pos::new(HPos::Center, VPos::Top));

        let center = (plan.width / 2) as i32;
        let mut y = (font_px / 2) as i32;
        for line in &plan.title_lines {
            area.draw_text(line, &style, (center, y)).map_err(drawing)?;
            y += line_px;
        }
        Ok(())
    }

    fn draw_panel<DB: DrawingBackend>(
        area: &DrawingArea<DB, Shift>,
        panel: &PanelPlan,
        plan: &FigurePlan,
    ) -> Result<(), ChartError> {
        let (x_min, x_max) = panel.x_range;

        let mut chart = ChartBuilder::on(area)
            .caption(&panel.title, (FONT, plan.px(PANEL_TITLE_PT) as f64))
            .margin(plan.px(8.0))
            .x_label_area_size(plan.px(30.0))
            .y_label_area_size(plan.px(38.0))
            .build_cartesian_2d(x_min..x_max, Y_RANGE.0..Y_RANGE.1)
            .map_err(drawing)?;

        let integer_ticks = plan.integer_x_ticks;
        let tick_formatter = move |x: &f64| x_tick_label(*x, integer_ticks);

        chart
            .configure_mesh()
            .x_labels(panel.x_tick_count)
            .y_labels(9)
            .x_label_formatter(&tick_formatter)
            .y_label_formatter(&|y| format!("{:.0}", y))
            .x_desc("Year")
            .y_desc("Net Favorable %")
            .axis_desc_style((FONT, plan.px(AXIS_LABEL_PT) as f64))
            .label_style((FONT, plan.px(AXIS_LABEL_PT - 1.0) as f64))
            .bold_line_style(BLACK.mix(0.3))
            .light_line_style(WHITE.mix(0.0))
            .draw()
            .map_err(drawing)?;

        chart
            .draw_series(DashedLineSeries::new(
                vec![(x_min, 0.0), (x_max, 0.0)],
                plan.px(4.0),
                plan.px(3.0),
                BLACK.mix(0.3).stroke_width(1),
            ))
            .map_err(drawing)?;

        if panel.is_empty() {
            debug!(category = panel.title.as_str(), "Drawing empty panel");
            return Ok(());
        }

        chart
            .draw_series(
                LineSeries::new(
                    panel.points.iter().copied(),
                    STEEL_BLUE.stroke_width(plan.px(2.0)),
                )
                .point_size(plan.px(3.0)),
            )
            .map_err(drawing)?;

        let offset = plan.px(DATA_LABEL_OFFSET_PT) as i32;
        let label_style = (FONT, plan.px(DATA_LABEL_PT) as f64)
            .into_font()
            .color(&BLACK)
            .pos(Pos::new(HPos::Center, VPos::Bottom));

        chart
            .draw_series(panel.labels.iter().map(|label| {
                EmptyElement::at((label.x, label.y))
                    + Text::new(label.text.clone(), (0, -offset), label_style.clone())
            }))
            .map_err(drawing)?;

        Ok(())
    }

    fn draw_footnote<DB: DrawingBackend>(
        area: &DrawingArea<DB, Shift>,
        plan: &FigurePlan,
    ) -> Result<(), ChartError> {
        let style = (FONT, plan.px(FOOTNOTE_PT) as f64)
            .into_font()
            .color(&BLACK)
            .pos(Pos::new(HPos::Left, VPos::Top));
        let line_px = plan.px(FOOTNOTE_PT * 1.4) as i32;

        let x = (plan.width as f64 * 0.1) as i32;
        let mut y = (plan.px(FOOTNOTE_PT) / 2) as i32;
        for line in &plan.footnote_lines {
            area.draw_text(line, &style, (x, y)).map_err(drawing)?;
            y += line_px;
        }
        Ok(())
    }
}

//! Charts module - figure planning and rendering

pub mod layout;
mod renderer;

pub use layout::{FigurePlan, PanelPlan};
pub use renderer::{ChartError, PanelChartRenderer};

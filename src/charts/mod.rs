//! Charts module - Chart rendering

mod plotter;
mod renderer;

pub use plotter::{daily_points, month_points, ChartPlotter};
pub use renderer::{RenderError, StaticChartRenderer};

//! Charts module - static chart rendering

mod renderer;

pub use renderer::{ChartRenderer, ACCENT, PALETTE};

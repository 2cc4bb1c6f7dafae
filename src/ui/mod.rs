//! Terminal UI: the editor pane, the preview pane, and the bars below them.

mod overlays;
mod render;
mod status;

pub use render::{line_number_width, render, split_main_columns};

pub const EDITOR_WIDTH_PERCENT: u16 = 50;
pub const PREVIEW_WIDTH_PERCENT: u16 = 50;

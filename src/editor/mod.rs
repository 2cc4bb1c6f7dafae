//! Text buffer for the draft editor.
//!
//! A rope-backed buffer with a char-indexed cursor. Every mutation bumps a
//! revision counter so the preview can tell when it is stale.

mod buffer;

pub use buffer::{Cursor, Direction, DraftBuffer};

// Only allow lints that are either transitive-dependency noise or
// genuinely opinionated style choices that don't indicate real issues.
#![allow(
    // Transitive dependency version mismatches we can't control
    clippy::multiple_crate_versions,
    // module_name_repetitions is pure style preference (e.g. post::PostDraft)
    clippy::module_name_repetitions
)]

//! # draftpad
//!
//! A terminal drafting tool for blog posts with a live HTML preview.
//!
//! draftpad edits a Markdown draft and shows, beside it:
//! - The HTML produced by a small ordered regex rule chain
//! - Or the draft split into token-bounded chunks
//! - The post payload it would export, validated before it is written
//!
//! ## Architecture
//!
//! The editor uses The Elm Architecture (TEA) pattern:
//! - **Model**: Application state
//! - **Message**: Events and actions
//! - **Update**: Pure state transitions
//! - **View**: Render to terminal
//!
//! ## Modules
//!
//! - [`preview`]: Markdown to preview HTML
//! - [`post`]: Draft validation and payloads
//! - [`splitter`]: Heading and sentence chunking
//! - [`editor`]: Text buffer
//! - [`app`]: Main application loop and state
//! - [`ui`]: Terminal UI components
//! - [`highlight`]: Syntax highlighting
//! - [`watcher`]: File watching
//! - [`config`]: Saved default flags

pub mod app;
pub mod config;
pub mod editor;
pub mod highlight;
pub mod perf;
pub mod post;
pub mod preview;
pub mod splitter;
pub mod ui;
pub mod watcher;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::app::{App, Message, Model};
    pub use crate::editor::DraftBuffer;
    pub use crate::post::{DraftError, PostDraft, PostPayload, PostStatus};
    pub use crate::preview::{PreviewOptions, render_preview, render_preview_with};
    pub use crate::splitter::split_markdown;
}

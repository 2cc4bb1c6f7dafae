//! The interactive editor.
//!
//! This module implements The Elm Architecture (TEA):
//! - [`Model`]: The complete application state
//! - [`Message`]: All possible events and actions
//! - [`update`]: Pure function for state transitions
//! - [`App::run`]: Main event loop with rendering

mod effects;
mod event_loop;
mod input;
mod model;
mod update;

pub use model::{FOOTER_ROWS, Model, PreviewPane, PreviewView, ToastLevel, default_title};
pub use update::{Message, update};

use std::path::PathBuf;

use crate::post::PostStatus;
use crate::preview::PreviewOptions;
use crate::splitter::DEFAULT_MAX_TOKENS;

/// Main application struct that owns the terminal and runs the event loop.
pub struct App {
    file_path: PathBuf,
    title: Option<String>,
    status: PostStatus,
    post_id: Option<u64>,
    options: PreviewOptions,
    max_tokens: usize,
    watch_enabled: bool,
    config_global_path: Option<PathBuf>,
    config_local_path: Option<PathBuf>,
}

impl App {
    /// Create a new application for the given file.
    pub fn new(file_path: PathBuf) -> Self {
        Self {
            file_path,
            title: None,
            status: PostStatus::default(),
            post_id: None,
            options: PreviewOptions::default(),
            max_tokens: DEFAULT_MAX_TOKENS,
            watch_enabled: false,
            config_global_path: None,
            config_local_path: None,
        }
    }

    /// Post title; defaults to the file stem.
    #[must_use]
    pub fn with_title(mut self, title: Option<String>) -> Self {
        self.title = title;
        self
    }

    #[must_use]
    pub const fn with_status(mut self, status: PostStatus) -> Self {
        self.status = status;
        self
    }

    /// Server id of the post being edited, if it already exists.
    #[must_use]
    pub const fn with_post_id(mut self, id: Option<u64>) -> Self {
        self.post_id = id;
        self
    }

    #[must_use]
    pub const fn with_preview_options(mut self, options: PreviewOptions) -> Self {
        self.options = options;
        self
    }

    #[must_use]
    pub const fn with_max_tokens(mut self, max_tokens: usize) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Enable or disable file watching.
    #[must_use]
    pub const fn with_watch(mut self, enabled: bool) -> Self {
        self.watch_enabled = enabled;
        self
    }

    /// Set config paths to show in help.
    #[must_use]
    pub fn with_config_paths(
        mut self,
        global_path: Option<PathBuf>,
        local_path: Option<PathBuf>,
    ) -> Self {
        self.config_global_path = global_path;
        self.config_local_path = local_path;
        self
    }
}

#[cfg(test)]
mod tests;

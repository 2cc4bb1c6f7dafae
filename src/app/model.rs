use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use ratatui::text::Line;

use crate::editor::DraftBuffer;
use crate::post::{PostDraft, PostStatus};
use crate::preview::{self, PreviewOptions};
use crate::splitter;

/// Rows below the panes: the hint/toast line and the status bar.
pub const FOOTER_ROWS: u16 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastLevel {
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone)]
struct Toast {
    level: ToastLevel,
    message: String,
    expires_at: Instant,
}

/// What the right-hand pane shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PreviewView {
    /// The generated HTML, syntax highlighted.
    #[default]
    Html,
    /// The draft split into token-bounded chunks.
    Chunks,
}

impl PreviewView {
    #[must_use]
    pub const fn next(self) -> Self {
        match self {
            Self::Html => Self::Chunks,
            Self::Chunks => Self::Html,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Html => "Preview",
            Self::Chunks => "Chunks",
        }
    }
}

/// Cached output of the preview pane, keyed by buffer revision.
#[derive(Debug, Clone, Default)]
pub struct PreviewPane {
    html: String,
    html_revision: Option<u64>,
    highlighted: Vec<Line<'static>>,
    highlighted_revision: Option<u64>,
    chunks: Vec<String>,
    chunks_revision: Option<u64>,
    pub view: PreviewView,
    pub scroll: usize,
}

impl PreviewPane {
    pub fn html(&self) -> &str {
        &self.html
    }

    /// The HTML laid out one block per line and syntax highlighted.
    pub fn highlighted(&self) -> &[Line<'static>] {
        &self.highlighted
    }

    pub fn chunks(&self) -> &[String] {
        &self.chunks
    }

    pub const fn html_revision(&self) -> Option<u64> {
        self.html_revision
    }

    /// Bring the visible output up to date with the buffer revision.
    ///
    /// Returns true when anything was recomputed.
    pub fn sync(
        &mut self,
        buffer: &DraftBuffer,
        options: PreviewOptions,
        title: &str,
        max_tokens: usize,
    ) -> bool {
        let revision = buffer.revision();
        let mut changed = false;
        if self.html_revision != Some(revision) {
            let _scope = crate::perf::scope("preview.render");
            self.html = preview::render_preview_with(&buffer.text(), &options);
            self.html_revision = Some(revision);
            crate::perf::log_event(
                "preview.render",
                format!("revision={revision} bytes={}", self.html.len()),
            );
            changed = true;
        }
        if self.view == PreviewView::Html && self.highlighted_revision != Some(revision) {
            let _scope = crate::perf::scope("preview.highlight");
            let layout = crate::highlight::layout_html(&self.html);
            self.highlighted = crate::highlight::highlight_lines("html", &layout);
            self.highlighted_revision = Some(revision);
            changed = true;
        }
        if self.view == PreviewView::Chunks && self.chunks_revision != Some(revision) {
            let _scope = crate::perf::scope("preview.split");
            self.chunks = splitter::split_markdown(&buffer.text(), title, max_tokens);
            self.chunks_revision = Some(revision);
            changed = true;
        }
        changed
    }

    /// Lines the pane would show before wrapping.
    pub fn line_count(&self) -> usize {
        match self.view {
            PreviewView::Html => self.highlighted.len(),
            PreviewView::Chunks => self
                .chunks
                .iter()
                .map(|chunk| chunk.lines().count() + 2)
                .sum(),
        }
    }
}

/// The complete application state.
pub struct Model {
    /// The markdown being edited
    pub buffer: DraftBuffer,
    /// Path the draft is loaded from and saved to
    pub file_path: PathBuf,
    /// Post metadata; content always comes from the buffer
    pub title: String,
    pub status: PostStatus,
    pub post_id: Option<u64>,
    pub preview: PreviewPane,
    pub options: PreviewOptions,
    /// Token budget for the chunk view
    pub max_tokens: usize,
    /// First visible buffer line in the editor pane
    pub editor_scroll_offset: usize,
    pub width: u16,
    pub height: u16,
    pub watch_enabled: bool,
    /// Global config path shown in help
    pub config_global_path: Option<PathBuf>,
    /// Local override path shown in help
    pub config_local_path: Option<PathBuf>,
    pub help_visible: bool,
    toast: Option<Toast>,
    /// File content as last read or written by this model
    disk_text: Option<String>,
    /// The file changed on disk while the buffer had unsaved edits
    pub disk_conflict: bool,
    /// Set after a first quit attempt with unsaved edits
    pub quit_confirmed: bool,
    /// Set after a first reload attempt with unsaved edits
    pub reload_confirmed: bool,
    /// A confirmed reload waiting for the effects pass
    pub reload_requested: bool,
    pub should_quit: bool,
}

impl std::fmt::Debug for Model {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Model")
            .field("file_path", &self.file_path)
            .field("title", &self.title)
            .field("status", &self.status)
            .field("dirty", &self.buffer.is_dirty())
            .field("view", &self.preview.view)
            .finish_non_exhaustive()
    }
}

impl Default for Model {
    fn default() -> Self {
        Self::new(PathBuf::new(), DraftBuffer::empty(), (80, 24))
    }
}

impl Model {
    pub fn new(file_path: PathBuf, buffer: DraftBuffer, terminal_size: (u16, u16)) -> Self {
        let title = default_title(&file_path);
        let mut model = Self {
            buffer,
            file_path,
            title,
            status: PostStatus::default(),
            post_id: None,
            preview: PreviewPane::default(),
            options: PreviewOptions::default(),
            max_tokens: splitter::DEFAULT_MAX_TOKENS,
            editor_scroll_offset: 0,
            width: terminal_size.0,
            height: terminal_size.1,
            watch_enabled: false,
            config_global_path: None,
            config_local_path: None,
            help_visible: false,
            toast: None,
            disk_text: None,
            disk_conflict: false,
            quit_confirmed: false,
            reload_confirmed: false,
            reload_requested: false,
            should_quit: false,
        };
        model.sync_preview();
        model
    }

    /// Load `path` into a new model; a missing file starts an empty draft.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read.
    pub fn open(path: &Path, terminal_size: (u16, u16)) -> Result<Self> {
        let disk_text = if path.exists() {
            Some(
                std::fs::read_to_string(path)
                    .with_context(|| format!("Failed to read {}", path.display()))?,
            )
        } else {
            None
        };
        let buffer = disk_text
            .as_deref()
            .map_or_else(DraftBuffer::empty, DraftBuffer::from_text);
        let mut model = Self::new(path.to_path_buf(), buffer, terminal_size);
        model.disk_text = disk_text;
        Ok(model)
    }

    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self.reset_preview();
        self
    }

    #[must_use]
    pub fn with_options(mut self, options: PreviewOptions) -> Self {
        self.options = options;
        self.reset_preview();
        self
    }

    #[must_use]
    pub fn with_max_tokens(mut self, max_tokens: usize) -> Self {
        self.max_tokens = max_tokens;
        self.reset_preview();
        self
    }

    /// Drop cached output after a setting that affects it changed.
    fn reset_preview(&mut self) {
        self.preview = PreviewPane {
            view: self.preview.view,
            ..PreviewPane::default()
        };
        self.sync_preview();
    }

    /// Recompute the preview if the buffer changed since the last render.
    pub fn sync_preview(&mut self) -> bool {
        self.preview
            .sync(&self.buffer, self.options, &self.title, self.max_tokens)
    }

    /// The post as it would be exported right now.
    pub fn draft(&self) -> PostDraft {
        PostDraft::new(self.title.clone(), self.buffer.text())
            .with_id(self.post_id)
            .with_status(self.status)
    }

    /// Rows available for buffer text inside the editor pane border.
    pub const fn editor_rows(&self) -> usize {
        self.height.saturating_sub(FOOTER_ROWS + 2) as usize
    }

    /// Rows available inside the preview pane border.
    pub const fn preview_rows(&self) -> usize {
        self.editor_rows()
    }

    /// Scroll the editor so the cursor line is on screen.
    pub fn editor_ensure_cursor_visible(&mut self) {
        let rows = self.editor_rows().max(1);
        let line = self.buffer.cursor().line;
        if line < self.editor_scroll_offset {
            self.editor_scroll_offset = line;
        } else if line >= self.editor_scroll_offset + rows {
            self.editor_scroll_offset = line + 1 - rows;
        }
    }

    pub(super) fn clamp_preview_scroll(&mut self) {
        let max = self.preview.line_count().saturating_sub(1);
        self.preview.scroll = self.preview.scroll.min(max);
    }

    /// Where export writes: `<stem>.post.json` next to the draft.
    pub fn export_path(&self) -> PathBuf {
        let stem = self
            .file_path
            .file_stem()
            .map_or_else(|| "draft".into(), |s| s.to_string_lossy().into_owned());
        self.file_path.with_file_name(format!("{stem}.post.json"))
    }

    pub(super) fn show_toast(&mut self, level: ToastLevel, message: impl Into<String>) {
        self.toast = Some(Toast {
            level,
            message: message.into(),
            expires_at: Instant::now() + Duration::from_secs(4),
        });
    }

    pub(super) fn expire_toast(&mut self, now: Instant) -> bool {
        if self
            .toast
            .as_ref()
            .is_some_and(|toast| toast.expires_at <= now)
        {
            self.toast = None;
            return true;
        }
        false
    }

    pub fn active_toast(&self) -> Option<(&str, ToastLevel)> {
        self.toast
            .as_ref()
            .map(|toast| (toast.message.as_str(), toast.level))
    }

    pub(super) fn reload_from_disk(&mut self) -> Result<()> {
        let text = std::fs::read_to_string(&self.file_path)
            .with_context(|| format!("Failed to read {}", self.file_path.display()))?;
        self.buffer.reload(&text);
        self.disk_text = Some(text);
        self.disk_conflict = false;
        self.editor_ensure_cursor_visible();
        self.sync_preview();
        self.clamp_preview_scroll();
        Ok(())
    }

    pub(super) fn save_to_disk(&mut self) -> Result<()> {
        let text = self.buffer.text();
        std::fs::write(&self.file_path, &text)
            .with_context(|| format!("Failed to write {}", self.file_path.display()))?;
        self.buffer.mark_clean();
        self.disk_text = Some(text);
        self.disk_conflict = false;
        Ok(())
    }

    /// Whether the file now holds something other than what this model last
    /// read or wrote. An unreadable file counts as changed.
    pub(super) fn disk_differs(&self) -> bool {
        !std::fs::read_to_string(&self.file_path)
            .is_ok_and(|text| self.disk_text.as_deref() == Some(text.as_str()))
    }
}

/// Title used when none is given: the file stem, or "Untitled".
pub fn default_title(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "Untitled".to_string())
}

use crate::app::{Model, ToastLevel};
use crate::editor::Direction;

use super::model::PreviewView;

/// All possible events and actions in the application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    // Editing
    /// Insert a character at the cursor
    InsertChar(char),
    /// Insert text at the cursor (paste)
    InsertText(String),
    /// Delete character before cursor (Backspace)
    DeleteBack,
    /// Delete character at cursor (Delete)
    DeleteForward,
    /// Split line at cursor (Enter)
    SplitLine,
    MoveCursor(Direction),
    MoveHome,
    MoveEnd,
    MoveWordLeft,
    MoveWordRight,
    MoveToStart,
    MoveToEnd,
    /// Move the cursor up or down a page
    PageUp,
    PageDown,

    // Preview
    PreviewScrollUp(usize),
    PreviewScrollDown(usize),
    /// Switch between the HTML and chunk views
    CycleView,

    // Post
    /// Flip between published and draft
    ToggleStatus,
    /// Write the buffer back to its file
    Save,
    /// Validate and write the post payload as JSON
    Export,

    // File watching
    ToggleWatch,
    /// File changed externally
    FileChanged,
    /// Replace the buffer with the file on disk
    ForceReload,

    ToggleHelp,
    HideHelp,
    /// Terminal resized
    Resize(u16, u16),
    Quit,
}

impl Message {
    const fn edits_buffer(&self) -> bool {
        matches!(
            self,
            Self::InsertChar(_)
                | Self::InsertText(_)
                | Self::DeleteBack
                | Self::DeleteForward
                | Self::SplitLine
        )
    }
}

/// Pure state transition. I/O happens afterwards in the effects pass.
pub fn update(mut model: Model, msg: Message) -> Model {
    // Confirmations only hold for an immediately repeated key.
    if msg != Message::Quit {
        model.quit_confirmed = false;
    }
    if msg != Message::ForceReload {
        model.reload_confirmed = false;
    }
    let edits = msg.edits_buffer();

    match msg {
        Message::InsertChar(ch) => model.buffer.insert_char(ch),
        Message::InsertText(text) => model.buffer.insert_str(&text),
        Message::DeleteBack => {
            model.buffer.delete_back();
        }
        Message::DeleteForward => {
            model.buffer.delete_forward();
        }
        Message::SplitLine => model.buffer.split_line(),
        Message::MoveCursor(direction) => model.buffer.move_cursor(direction),
        Message::MoveHome => model.buffer.move_home(),
        Message::MoveEnd => model.buffer.move_end(),
        Message::MoveWordLeft => model.buffer.move_word_left(),
        Message::MoveWordRight => model.buffer.move_word_right(),
        Message::MoveToStart => model.buffer.move_to_start(),
        Message::MoveToEnd => model.buffer.move_to_end(),
        Message::PageUp => {
            let cursor = model.buffer.cursor();
            let rows = model.editor_rows().max(1);
            model
                .buffer
                .move_to(cursor.line.saturating_sub(rows), cursor.col);
        }
        Message::PageDown => {
            let cursor = model.buffer.cursor();
            let rows = model.editor_rows().max(1);
            model.buffer.move_to(cursor.line + rows, cursor.col);
        }

        Message::PreviewScrollUp(n) => {
            model.preview.scroll = model.preview.scroll.saturating_sub(n);
        }
        Message::PreviewScrollDown(n) => {
            model.preview.scroll = model.preview.scroll.saturating_add(n);
            model.clamp_preview_scroll();
        }
        Message::CycleView => {
            model.preview.view = model.preview.view.next();
            model.preview.scroll = 0;
            model.sync_preview();
            if model.preview.view == PreviewView::Chunks {
                let count = model.preview.chunks().len();
                model.show_toast(
                    ToastLevel::Info,
                    format!("{count} chunk(s) of up to {} tokens", model.max_tokens),
                );
            }
        }

        Message::ToggleStatus => {
            model.status = model.status.toggle();
            model.show_toast(ToastLevel::Info, format!("Status: {}", model.status));
        }

        Message::ToggleWatch => {
            model.watch_enabled = !model.watch_enabled;
        }
        Message::FileChanged => {
            if model.buffer.is_dirty() {
                model.disk_conflict = true;
                model.show_toast(
                    ToastLevel::Warning,
                    "File changed on disk. Ctrl+R discards your edits and reloads",
                );
            } else {
                model.reload_requested = true;
            }
        }
        Message::ForceReload => {
            if model.buffer.is_dirty() && !model.reload_confirmed {
                model.reload_confirmed = true;
                model.show_toast(
                    ToastLevel::Warning,
                    "Unsaved changes. Press Ctrl+R again to discard them",
                );
            } else {
                model.reload_confirmed = false;
                model.reload_requested = true;
            }
        }

        Message::ToggleHelp => model.help_visible = !model.help_visible,
        Message::HideHelp => model.help_visible = false,
        Message::Resize(width, height) => {
            model.width = width;
            model.height = height;
            model.clamp_preview_scroll();
        }
        Message::Quit => {
            if model.buffer.is_dirty() && !model.quit_confirmed {
                model.quit_confirmed = true;
                model.show_toast(
                    ToastLevel::Warning,
                    "Unsaved changes. Press Ctrl+Q again to quit, Ctrl+S to save",
                );
            } else {
                model.should_quit = true;
            }
        }

        // Handled in the effects pass.
        Message::Save | Message::Export => {}
    }

    if edits {
        model.sync_preview();
        model.clamp_preview_scroll();
    }
    model.editor_ensure_cursor_visible();
    model
}

use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseEvent, MouseEventKind};

use crate::app::{Message, Model};
use crate::editor::Direction;

/// Lines moved per mouse wheel notch in the preview pane.
const WHEEL_STEP: usize = 3;

/// Translate a terminal event into a message, if it means anything.
pub(super) fn handle_event(event: &Event, model: &Model) -> Option<Message> {
    match event {
        Event::Key(key) if key.kind != KeyEventKind::Release => handle_key(*key, model),
        Event::Mouse(mouse) => handle_mouse(*mouse, model),
        Event::Paste(text) => Some(Message::InsertText(text.replace("\r\n", "\n"))),
        Event::Resize(width, height) => Some(Message::Resize(*width, *height)),
        _ => None,
    }
}

pub(super) fn handle_key(key: KeyEvent, model: &Model) -> Option<Message> {
    if model.help_visible {
        return match key.code {
            KeyCode::Esc | KeyCode::F(1) | KeyCode::Char('q') => Some(Message::HideHelp),
            _ => None,
        };
    }

    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    let alt = key.modifiers.contains(KeyModifiers::ALT);

    if ctrl {
        return match key.code {
            KeyCode::Char('s') => Some(Message::Save),
            KeyCode::Char('e') => Some(Message::Export),
            KeyCode::Char('p') => Some(Message::ToggleStatus),
            KeyCode::Char('t') => Some(Message::CycleView),
            KeyCode::Char('r') => Some(Message::ForceReload),
            KeyCode::Char('w') => Some(Message::ToggleWatch),
            KeyCode::Char('q' | 'c') => Some(Message::Quit),
            KeyCode::Left => Some(Message::MoveWordLeft),
            KeyCode::Right => Some(Message::MoveWordRight),
            KeyCode::Home => Some(Message::MoveToStart),
            KeyCode::End => Some(Message::MoveToEnd),
            KeyCode::Up => Some(Message::PreviewScrollUp(1)),
            KeyCode::Down => Some(Message::PreviewScrollDown(1)),
            _ => None,
        };
    }

    if alt {
        let page = model.preview_rows().max(1);
        return match key.code {
            KeyCode::Up => Some(Message::PreviewScrollUp(1)),
            KeyCode::Down => Some(Message::PreviewScrollDown(1)),
            KeyCode::PageUp => Some(Message::PreviewScrollUp(page)),
            KeyCode::PageDown => Some(Message::PreviewScrollDown(page)),
            _ => None,
        };
    }

    match key.code {
        KeyCode::Char(ch) => Some(Message::InsertChar(ch)),
        KeyCode::Tab => Some(Message::InsertText("    ".to_string())),
        KeyCode::Enter => Some(Message::SplitLine),
        KeyCode::Backspace => Some(Message::DeleteBack),
        KeyCode::Delete => Some(Message::DeleteForward),
        KeyCode::Left => Some(Message::MoveCursor(Direction::Left)),
        KeyCode::Right => Some(Message::MoveCursor(Direction::Right)),
        KeyCode::Up => Some(Message::MoveCursor(Direction::Up)),
        KeyCode::Down => Some(Message::MoveCursor(Direction::Down)),
        KeyCode::Home => Some(Message::MoveHome),
        KeyCode::End => Some(Message::MoveEnd),
        KeyCode::PageUp => Some(Message::PageUp),
        KeyCode::PageDown => Some(Message::PageDown),
        KeyCode::F(1) => Some(Message::ToggleHelp),
        _ => None,
    }
}

fn handle_mouse(mouse: MouseEvent, model: &Model) -> Option<Message> {
    if model.help_visible {
        return None;
    }
    // Wheel over the right half scrolls the preview.
    let over_preview = mouse.column >= model.width / 2;
    match mouse.kind {
        MouseEventKind::ScrollUp if over_preview => Some(Message::PreviewScrollUp(WHEEL_STEP)),
        MouseEventKind::ScrollDown if over_preview => {
            Some(Message::PreviewScrollDown(WHEEL_STEP))
        }
        MouseEventKind::ScrollUp => Some(Message::MoveCursor(Direction::Up)),
        MouseEventKind::ScrollDown => Some(Message::MoveCursor(Direction::Down)),
        _ => None,
    }
}

use ratatui::prelude::*;
use ratatui::widgets::Paragraph;

use crate::app::{Model, ToastLevel};
use crate::post::PostStatus;

const HINTS: &str =
    " ^S save  ^E export  ^P status  ^T view  ^R reload  ^W watch  ^Q quit  F1 help";

pub fn render_status_bar(model: &Model, frame: &mut Frame, area: Rect) {
    let filename = model.file_path.file_name().map_or_else(
        || "untitled".to_string(),
        |s| s.to_string_lossy().to_string(),
    );
    let dirty_indicator = if model.buffer.is_dirty() {
        " [modified]"
    } else {
        ""
    };
    let conflict_indicator = if model.disk_conflict {
        " [changed on disk]"
    } else {
        ""
    };
    let watch_indicator = if model.watch_enabled {
        " [watching]"
    } else {
        ""
    };
    let post_label = model
        .post_id
        .map_or_else(|| "new".to_string(), |id| format!("#{id}"));
    let cursor = model.buffer.cursor();

    let status = format!(
        " {filename}{dirty_indicator}{conflict_indicator}  \"{}\" [{} {post_label}]  Ln {}, Col {}{watch_indicator}",
        model.title,
        model.status,
        cursor.line + 1,
        cursor.col + 1,
    );

    let bg = match model.status {
        PostStatus::Published => Color::Blue,
        PostStatus::Draft => Color::Magenta,
    };
    let status_bar = Paragraph::new(status).style(Style::default().bg(bg).fg(Color::White));
    frame.render_widget(status_bar, area);
}

pub fn render_hint_bar(frame: &mut Frame, area: Rect) {
    let bar = Paragraph::new(HINTS).style(Style::default().fg(Color::DarkGray));
    frame.render_widget(bar, area);
}

pub fn render_toast_bar(model: &Model, frame: &mut Frame, area: Rect) {
    let Some((message, level)) = model.active_toast() else {
        return;
    };
    let (prefix, style) = match level {
        ToastLevel::Info => (
            "[info]",
            Style::default().bg(Color::DarkGray).fg(Color::White),
        ),
        ToastLevel::Warning => (
            "[warn]",
            Style::default().bg(Color::Yellow).fg(Color::Black),
        ),
        ToastLevel::Error => ("[error]", Style::default().bg(Color::Red).fg(Color::White)),
    };
    let toast = Paragraph::new(format!("{prefix} {message}")).style(style);
    frame.render_widget(toast, area);
}

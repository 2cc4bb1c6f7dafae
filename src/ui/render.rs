use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use unicode_width::UnicodeWidthChar;

use crate::app::{Model, PreviewView};

use super::{EDITOR_WIDTH_PERCENT, PREVIEW_WIDTH_PERCENT, overlays, status};

pub fn split_main_columns(area: Rect) -> std::rc::Rc<[Rect]> {
    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(EDITOR_WIDTH_PERCENT),
            Constraint::Percentage(PREVIEW_WIDTH_PERCENT),
        ])
        .split(area)
}

/// Render the complete UI.
pub fn render(model: &Model, frame: &mut Frame) {
    let area = frame.area();
    let footer = crate::app::FOOTER_ROWS.min(area.height);
    let main_area = Rect {
        height: area.height - footer,
        ..area
    };
    let hint_area = Rect {
        y: area.y + area.height.saturating_sub(2),
        height: 1,
        ..area
    };
    let status_area = Rect {
        y: area.y + area.height.saturating_sub(1),
        height: 1,
        ..area
    };

    let columns = split_main_columns(main_area);
    render_editor(model, frame, columns[0]);
    render_preview(model, frame, columns[1]);

    if model.active_toast().is_some() {
        status::render_toast_bar(model, frame, hint_area);
    } else {
        status::render_hint_bar(frame, hint_area);
    }
    status::render_status_bar(model, frame, status_area);

    if model.help_visible {
        overlays::render_help_overlay(model, frame, area);
    }
}

fn render_editor(model: &Model, frame: &mut Frame, area: Rect) {
    let buf = &model.buffer;
    let title = if buf.is_dirty() {
        " Markdown [+] "
    } else {
        " Markdown "
    };
    let block = Block::default().title(title).borders(Borders::ALL);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let total_lines = buf.line_count();
    let gutter_width = line_number_width(total_lines);
    let text_width = usize::from(inner.width.saturating_sub(gutter_width + 1));

    let start = model.editor_scroll_offset;
    let end = (start + inner.height as usize).min(total_lines);
    let cursor = buf.cursor();

    // Shift every row left when the cursor would fall off the right edge.
    let cursor_line = buf.line_at(cursor.line).unwrap_or_default();
    let cursor_x = display_width(cursor_line.chars().take(cursor.col));
    let h_offset = (cursor_x + 1).saturating_sub(text_width);

    let mut content: Vec<Line> = Vec::new();
    for line_idx in start..end {
        let line_text = buf.line_at(line_idx).unwrap_or_default();
        let number_style = if line_idx == cursor.line {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        let line_num = format!("{:>width$} ", line_idx + 1, width = gutter_width as usize);
        let mut spans = vec![Span::styled(line_num, number_style)];

        let chars = skip_columns(&line_text, h_offset);
        if line_idx == cursor.line {
            let col = cursor
                .col
                .saturating_sub(line_text.chars().count() - chars.len())
                .min(chars.len());
            let before: String = chars[..col].iter().collect();
            let cursor_char = chars.get(col).map_or_else(|| " ".to_string(), char::to_string);
            let after: String = chars.get(col + 1..).unwrap_or_default().iter().collect();

            if !before.is_empty() {
                spans.push(Span::raw(before));
            }
            spans.push(Span::styled(
                cursor_char,
                Style::default().bg(Color::White).fg(Color::Black),
            ));
            if !after.is_empty() {
                spans.push(Span::raw(after));
            }
        } else {
            spans.push(Span::raw(chars.iter().collect::<String>()));
        }
        content.push(Line::from(spans));
    }

    frame.render_widget(Paragraph::new(content), inner);
}

fn render_preview(model: &Model, frame: &mut Frame, area: Rect) {
    let preview = &model.preview;
    let title = match preview.view {
        PreviewView::Html => format!(" {} ", preview.view.label()),
        PreviewView::Chunks => format!(
            " {} ({}, max {} tokens) ",
            preview.view.label(),
            preview.chunks().len(),
            model.max_tokens
        ),
    };
    let block = Block::default().title(title).borders(Borders::ALL);

    let lines = match preview.view {
        PreviewView::Html => preview.highlighted().to_vec(),
        PreviewView::Chunks => chunk_lines(preview.chunks()),
    };
    let scroll = u16::try_from(preview.scroll).unwrap_or(u16::MAX);
    let paragraph = Paragraph::new(lines)
        .block(block)
        .wrap(Wrap { trim: false })
        .scroll((scroll, 0));
    frame.render_widget(paragraph, area);
}

fn chunk_lines(chunks: &[String]) -> Vec<Line<'static>> {
    let header_style = Style::default()
        .fg(Color::Cyan)
        .add_modifier(Modifier::BOLD);
    let mut lines = Vec::new();
    if chunks.is_empty() {
        lines.push(Line::styled(
            "(nothing to split)",
            Style::default().fg(Color::DarkGray),
        ));
        return lines;
    }
    for (idx, chunk) in chunks.iter().enumerate() {
        lines.push(Line::styled(
            format!(
                "-- chunk {} of {} (~{} tokens) --",
                idx + 1,
                chunks.len(),
                crate::splitter::estimate_tokens(chunk)
            ),
            header_style,
        ));
        lines.extend(chunk.lines().map(|l| Line::raw(l.to_string())));
        lines.push(Line::raw(""));
    }
    lines
}

/// Calculate the width needed for line numbers.
pub const fn line_number_width(total_lines: usize) -> u16 {
    if total_lines < 10 {
        1
    } else if total_lines < 100 {
        2
    } else if total_lines < 1_000 {
        3
    } else if total_lines < 10_000 {
        4
    } else if total_lines < 100_000 {
        5
    } else {
        6
    }
}

fn display_width(chars: impl Iterator<Item = char>) -> usize {
    chars.map(|c| c.width().unwrap_or(1)).sum()
}

/// Chars of `line` left after dropping the first `columns` display columns.
fn skip_columns(line: &str, columns: usize) -> Vec<char> {
    let mut skipped = 0;
    line.chars()
        .skip_while(|c| {
            if skipped >= columns {
                return false;
            }
            skipped += c.width().unwrap_or(1);
            true
        })
        .collect()
}

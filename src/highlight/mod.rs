//! Syntax highlighting for the preview pane.
//!
//! Uses syntect with its bundled Sublime Text syntaxes to colorize the
//! generated HTML before it is drawn.

use std::sync::{Mutex, OnceLock};

use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use syntect::easy::HighlightLines;
use syntect::highlighting::{Theme, ThemeSet};
use syntect::parsing::SyntaxSet;

/// Tags after which the preview pane starts a new display line.
const BREAK_AFTER: &[&str] = &[
    "<br>", "</p>", "</h1>", "</h2>", "</h3>", "</pre>",
];

/// Break a single-line preview HTML string into display lines.
///
/// Purely cosmetic: joining the result yields the input again.
pub fn layout_html(html: &str) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut rest = html;
    while !rest.is_empty() {
        let next_break = BREAK_AFTER
            .iter()
            .filter_map(|tag| rest.find(tag).map(|pos| pos + tag.len()))
            .min();
        let Some(end) = next_break else {
            current.push_str(rest);
            break;
        };
        current.push_str(&rest[..end]);
        lines.push(std::mem::take(&mut current));
        rest = &rest[end..];
    }
    if !current.is_empty() || lines.is_empty() {
        lines.push(current);
    }
    lines
}

/// Highlight `lines` as `language` (a syntect token such as `"html"`).
///
/// Unknown languages come back as unstyled lines.
pub fn highlight_lines(language: &str, lines: &[String]) -> Vec<Line<'static>> {
    let syntax_set = syntax_set();
    let syntax = syntax_set
        .find_syntax_by_token(language)
        .or_else(|| syntax_set.find_syntax_by_name(language));

    let Some(syntax) = syntax else {
        return lines.iter().map(|l| Line::raw(l.clone())).collect();
    };

    let mode = background_mode();
    let mut highlighter = HighlightLines::new(syntax, theme());
    lines
        .iter()
        .map(|line| {
            let ranges = highlighter
                .highlight_line(line, syntax_set)
                .unwrap_or_default();
            if ranges.is_empty() {
                return Line::raw(line.clone());
            }
            let spans: Vec<Span<'static>> = ranges
                .into_iter()
                .map(|(style, text)| {
                    let fg = adjust_fg_for_background(
                        (style.foreground.r, style.foreground.g, style.foreground.b),
                        mode,
                    );
                    Span::styled(
                        text.to_string(),
                        Style::default().fg(Color::Rgb(fg.0, fg.1, fg.2)),
                    )
                })
                .collect();
            Line::from(spans)
        })
        .collect()
}

fn syntax_set() -> &'static SyntaxSet {
    static SYNTAX_SET: OnceLock<SyntaxSet> = OnceLock::new();
    SYNTAX_SET.get_or_init(|| {
        let _scope = crate::perf::scope("highlight.syntax_set.load_defaults");
        SyntaxSet::load_defaults_newlines()
    })
}

fn theme() -> &'static Theme {
    static THEME: OnceLock<Theme> = OnceLock::new();
    THEME.get_or_init(|| {
        let _scope = crate::perf::scope("highlight.theme.load_defaults");
        let theme_set = ThemeSet::load_defaults();
        let preferred = match background_mode() {
            BackgroundMode::Dark => ["base16-ocean.dark", "base16-eighties.dark"].as_slice(),
            BackgroundMode::Light => ["InspiredGitHub", "base16-ocean.light"].as_slice(),
        };

        preferred
            .iter()
            .find_map(|name| theme_set.themes.get(*name).cloned())
            .or_else(|| theme_set.themes.values().next().cloned())
            .unwrap_or_default()
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BackgroundMode {
    Dark,
    Light,
}

/// Terminal background assumed by the highlighter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HighlightBackground {
    Light,
    Dark,
}

static BACKGROUND_OVERRIDE: Mutex<Option<HighlightBackground>> = Mutex::new(None);

/// Force the background mode; `None` falls back to `COLORFGBG`.
pub fn set_background_mode(mode: Option<HighlightBackground>) {
    if let Ok(mut guard) = BACKGROUND_OVERRIDE.lock() {
        *guard = mode;
    }
}

fn background_mode() -> BackgroundMode {
    let forced = BACKGROUND_OVERRIDE.lock().ok().and_then(|guard| *guard);
    match forced {
        Some(HighlightBackground::Light) => BackgroundMode::Light,
        Some(HighlightBackground::Dark) => BackgroundMode::Dark,
        None => background_mode_from_colorfgbg(std::env::var("COLORFGBG").ok().as_deref()),
    }
}

fn background_mode_from_colorfgbg(colorfgbg: Option<&str>) -> BackgroundMode {
    let bg = colorfgbg
        .and_then(|value| value.rsplit(';').next())
        .and_then(|bg| bg.parse::<u8>().ok());
    match bg {
        Some(bg) if bg >= 7 => BackgroundMode::Light,
        _ => BackgroundMode::Dark,
    }
}

fn luma((r, g, b): (u8, u8, u8)) -> f32 {
    0.0722f32.mul_add(
        f32::from(b),
        0.2126f32.mul_add(f32::from(r), 0.7152 * f32::from(g)),
    )
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn adjust_fg_for_background(color: (u8, u8, u8), mode: BackgroundMode) -> (u8, u8, u8) {
    if mode == BackgroundMode::Dark || luma(color) < 155.0 {
        return color;
    }
    let darken = |c: u8| (f32::from(c) * 0.42).round() as u8;
    (darken(color.0), darken(color.1), darken(color.2))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_breaks_after_block_tags() {
        let lines = layout_html("<p><h1>T</h1><br>a<br>b</p><p>c</p>");
        assert_eq!(
            lines,
            ["<p><h1>T</h1>", "<br>", "a<br>", "b</p>", "<p>c</p>"]
        );
    }

    #[test]
    fn test_layout_is_lossless() {
        let html = "<p>x<br><pre><code>y<br></code></pre>z</p>";
        assert_eq!(layout_html(html).concat(), html);
    }

    #[test]
    fn test_layout_of_empty_html_is_one_empty_line() {
        assert_eq!(layout_html(""), [String::new()]);
    }

    #[test]
    fn test_highlight_html_produces_colored_spans() {
        let lines = highlight_lines("html", &["<p><strong>x</strong></p>".to_string()]);
        assert_eq!(lines.len(), 1);
        let colored = lines
            .iter()
            .flat_map(|l| l.spans.iter())
            .any(|span| span.style.fg.is_some());
        assert!(colored, "Expected at least one colored span for HTML");
    }

    #[test]
    fn test_unknown_language_is_plain() {
        let lines = highlight_lines("no-such-language", &["text".to_string()]);
        assert_eq!(lines.len(), 1);
        assert!(lines[0].spans.iter().all(|s| s.style.fg.is_none()));
    }

    #[test]
    fn test_colorfgbg_detection() {
        assert_eq!(background_mode_from_colorfgbg(Some("15;0")), BackgroundMode::Dark);
        assert_eq!(background_mode_from_colorfgbg(Some("0;15")), BackgroundMode::Light);
        assert_eq!(background_mode_from_colorfgbg(Some("junk")), BackgroundMode::Dark);
        assert_eq!(background_mode_from_colorfgbg(None), BackgroundMode::Dark);
    }

    #[test]
    fn test_background_override() {
        set_background_mode(Some(HighlightBackground::Light));
        assert_eq!(background_mode(), BackgroundMode::Light);
        set_background_mode(None);
    }

    #[test]
    fn test_light_mode_darkens_bright_fg() {
        let bright = (240, 230, 120);
        let adjusted = adjust_fg_for_background(bright, BackgroundMode::Light);
        assert!(luma(adjusted) < 120.0);
        assert_eq!(adjust_fg_for_background(bright, BackgroundMode::Dark), bright);
    }
}

//! Inline Markdown preview.
//!
//! Converts a raw Markdown buffer into preview HTML by running an ordered
//! chain of global regex substitutions. Each rule sees the output of the
//! rule before it, so the order in [`rules`] is part of the contract:
//! headings run before paragraph wrapping, and bold runs before italic so a
//! `**bold**` run is never read as two italic markers.
//!
//! This is deliberately not a Markdown grammar. Nested lists, tables,
//! blockquotes and escaped markers are not handled, and later rules still
//! rewrite text produced by earlier ones (`**` inside a fenced block becomes
//! `<strong>`). The transform is also not idempotent: feeding its own output
//! back in corrupts the emitted tags.
//!
//! Input is not escaped by default, so raw HTML in the buffer reaches the
//! output untouched. Anything that injects the result across a trust
//! boundary must sanitize it first, or render with
//! [`PreviewOptions::escape_html`] enabled.

use std::sync::LazyLock;

use regex::Regex;

/// A single substitution step of the preview chain.
#[derive(Debug)]
pub struct PreviewRule {
    name: &'static str,
    regex: Regex,
    replacement: &'static str,
}

impl PreviewRule {
    /// Short identifier of the step (e.g. `"bold"`).
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// The regex source of the step.
    pub fn pattern(&self) -> &str {
        self.regex.as_str()
    }

    /// The replacement template (`${n}` refers to capture groups).
    pub const fn replacement(&self) -> &'static str {
        self.replacement
    }

    /// Replace every match of this rule in `text`.
    pub fn apply(&self, text: &str) -> String {
        self.regex.replace_all(text, self.replacement).into_owned()
    }
}

// (name, pattern, replacement), applied top to bottom.
const RULE_TABLE: &[(&str, &str, &str)] = &[
    ("heading3", r"(?m)^### (.*)$", "<h3>${1}</h3>"),
    ("heading2", r"(?m)^## (.*)$", "<h2>${1}</h2>"),
    ("heading1", r"(?m)^# (.*)$", "<h1>${1}</h1>"),
    (
        "fenced_code",
        r"```[0-9A-Za-z_]*\n((?s:.)*?)```",
        "<pre><code>${1}</code></pre>",
    ),
    ("inline_code", r"`([^`]+)`", "<code>${1}</code>"),
    ("bold", r"\*\*(.+?)\*\*", "<strong>${1}</strong>"),
    ("italic", r"\*(.+?)\*", "<em>${1}</em>"),
    (
        "link",
        r"\[([^\]]+)\]\(([^)]+)\)",
        r#"<a href="${2}" target="_blank">${1}</a>"#,
    ),
    ("paragraph", r"\n\n", "</p><p>"),
    ("line_break", r"\n", "<br>"),
];

static RULES: LazyLock<Vec<PreviewRule>> = LazyLock::new(|| {
    RULE_TABLE
        .iter()
        .map(|&(name, pattern, replacement)| PreviewRule {
            name,
            regex: Regex::new(pattern).expect("preview rule patterns are valid"),
            replacement,
        })
        .collect()
});

/// The preview rules in application order.
pub fn rules() -> &'static [PreviewRule] {
    &RULES
}

/// Rendering switches for [`render_preview_with`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PreviewOptions {
    /// Escape HTML metacharacters in the buffer before the rule chain runs.
    pub escape_html: bool,
}

/// Render `buffer` to preview HTML with default options.
pub fn render_preview(buffer: &str) -> String {
    render_preview_with(buffer, &PreviewOptions::default())
}

/// Render `buffer` to preview HTML.
///
/// Never fails: syntax that no rule matches passes through as literal text.
/// CRLF line endings are treated as LF.
pub fn render_preview_with(buffer: &str, options: &PreviewOptions) -> String {
    let buffer = buffer.replace("\r\n", "\n");
    let mut html = if options.escape_html {
        escape_html(&buffer)
    } else {
        buffer
    };
    for rule in rules() {
        html = rule.apply(&html);
    }
    format!("<p>{html}</p>")
}

/// Replace `& < > " '` with their HTML entities.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Wrap preview HTML in a minimal standalone document.
pub fn render_page(title: &str, body_html: &str) -> String {
    let title = escape_html(title);
    format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>{title}</title>\n</head>\n<body>\n{body_html}\n</body>\n</html>\n"
    )
}

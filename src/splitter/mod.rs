//! Split a post into heading-scoped text chunks for indexing.
//!
//! Sections start at every `## ` heading. Each chunk carries the post title
//! (and its section heading) as context. Sections whose estimated token count
//! exceeds the limit are cut further at sentence boundaries.

/// Default chunk budget in estimated tokens.
pub const DEFAULT_MAX_TOKENS: usize = 512;

const SENTENCE_ENDINGS: &[char] = &['。', '！', '？', '.', '!', '?'];

/// Rough token estimate: two characters per token.
pub fn estimate_tokens(text: &str) -> usize {
    text.chars().count() / 2
}

/// Split `content` into context-carrying chunks of at most `max_tokens`
/// estimated tokens (single oversized sentences are kept whole).
pub fn split_markdown(content: &str, title: &str, max_tokens: usize) -> Vec<String> {
    let content = content.replace("\r\n", "\n");
    let mut chunks = Vec::new();

    for section in sections(&content) {
        if section.trim().is_empty() {
            continue;
        }
        let section = section.trim_start_matches('\n');

        let text = match section.split_once('\n') {
            Some((first, body)) if section.starts_with("##") => {
                let heading = first.replace("##", "");
                format!("# {title}\n## {}\n{body}", heading.trim())
            }
            _ => format!("# {title}\n{section}"),
        };
        push_text(&mut chunks, &text, max_tokens);
    }

    if chunks.is_empty() && !content.trim().is_empty() {
        push_text(&mut chunks, &format!("# {title}\n{content}"), max_tokens);
    }

    tracing::debug!(
        title,
        max_tokens,
        chunks = chunks.len(),
        "split markdown into chunks"
    );
    chunks
}

/// Greedily pack sentences into chunks of at most `max_tokens` estimated
/// tokens. Text after the last sentence terminator is kept as a final
/// sentence.
pub fn split_by_sentences(text: &str, max_tokens: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_len = 0usize;

    for sentence in text.split_inclusive(SENTENCE_ENDINGS) {
        if !ends_sentence(sentence) && sentence.trim().is_empty() {
            continue;
        }
        let len = sentence.chars().count();
        if (current_len + len) / 2 <= max_tokens {
            current.push_str(sentence);
            current_len += len;
        } else {
            if !current.is_empty() {
                chunks.push(current.trim().to_string());
            }
            current = sentence.to_string();
            current_len = len;
        }
    }

    if !current.is_empty() {
        chunks.push(current.trim().to_string());
    }
    chunks
}

fn push_text(chunks: &mut Vec<String>, text: &str, max_tokens: usize) {
    let text = text.trim();
    if estimate_tokens(text) <= max_tokens {
        chunks.push(text.to_string());
    } else {
        chunks.extend(split_by_sentences(text, max_tokens));
    }
}

fn ends_sentence(piece: &str) -> bool {
    piece.ends_with(SENTENCE_ENDINGS)
}

/// Cut `content` before every section heading. The newline that precedes a
/// heading belongs to neither side.
fn sections(content: &str) -> Vec<&str> {
    let mut starts = vec![0];
    let mut offset = 0;
    for line in content.split_inclusive('\n') {
        if offset > 0 && is_section_heading(line) {
            starts.push(offset);
        }
        offset += line.len();
    }

    let mut out = Vec::with_capacity(starts.len());
    for (i, &start) in starts.iter().enumerate() {
        let end = starts
            .get(i + 1)
            .map_or(content.len(), |&next| next.saturating_sub(1));
        out.push(&content[start..end.max(start)]);
    }
    out
}

fn is_section_heading(line: &str) -> bool {
    line.strip_prefix("## ")
        .and_then(|rest| rest.chars().next())
        .is_some_and(|c| c != '\n' && c != '#')
}

use ropey::Rope;

/// Cursor position in a [`DraftBuffer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cursor {
    /// Zero-based line index.
    pub line: usize,
    /// Zero-based column, in chars.
    pub col: usize,
    /// Column to return to when moving vertically across shorter lines.
    sticky_col: usize,
}

impl Cursor {
    pub const fn new() -> Self {
        Self::at(0, 0)
    }

    pub const fn at(line: usize, col: usize) -> Self {
        Self {
            line,
            col,
            sticky_col: col,
        }
    }

    const fn set_col(&mut self, col: usize) {
        self.col = col;
        self.sticky_col = col;
    }
}

impl Default for Cursor {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

/// The Markdown source being drafted.
///
/// Columns are char offsets within a line, never byte offsets, so the cursor
/// cannot land inside a multi-byte character.
pub struct DraftBuffer {
    rope: Rope,
    cursor: Cursor,
    dirty: bool,
    revision: u64,
}

impl DraftBuffer {
    pub fn from_text(text: &str) -> Self {
        Self {
            rope: Rope::from_str(text),
            cursor: Cursor::new(),
            dirty: false,
            revision: 0,
        }
    }

    pub fn empty() -> Self {
        Self::from_text("")
    }

    pub const fn cursor(&self) -> Cursor {
        self.cursor
    }

    /// Whether the buffer differs from what was last loaded or saved.
    pub const fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub const fn mark_clean(&mut self) {
        self.dirty = false;
    }

    /// Counter bumped by every change to the text.
    pub const fn revision(&self) -> u64 {
        self.revision
    }

    pub fn line_count(&self) -> usize {
        self.rope.len_lines()
    }

    /// Line content without its line terminator.
    pub fn line_at(&self, line_idx: usize) -> Option<String> {
        if line_idx >= self.rope.len_lines() {
            return None;
        }
        let len = self.line_len(line_idx);
        Some(self.rope.line(line_idx).chars().take(len).collect())
    }

    /// Line length in chars, excluding the line terminator.
    pub fn line_len(&self, line_idx: usize) -> usize {
        if line_idx >= self.rope.len_lines() {
            return 0;
        }
        let line = self.rope.line(line_idx);
        let mut len = line.len_chars();
        while len > 0 && matches!(line.char(len - 1), '\n' | '\r') {
            len -= 1;
        }
        len
    }

    pub fn text(&self) -> String {
        self.rope.to_string()
    }

    /// Replace the whole text with `text` as loaded from disk.
    ///
    /// The cursor is clamped into the new content and the buffer is clean.
    pub fn reload(&mut self, text: &str) {
        self.rope = Rope::from_str(text);
        let Cursor { line, col, .. } = self.cursor;
        self.move_to(line, col);
        self.dirty = false;
        self.revision += 1;
    }

    pub fn insert_char(&mut self, ch: char) {
        let idx = self.cursor_char_idx();
        self.rope.insert_char(idx, ch);
        if ch == '\n' {
            self.cursor.line += 1;
            self.cursor.set_col(0);
        } else {
            self.cursor.set_col(self.cursor.col + 1);
        }
        self.touch();
    }

    pub fn insert_str(&mut self, s: &str) {
        if s.is_empty() {
            return;
        }
        let idx = self.cursor_char_idx();
        self.rope.insert(idx, s);

        let newlines = s.matches('\n').count();
        if newlines > 0 {
            let tail = s.rsplit('\n').next().unwrap_or_default();
            self.cursor.line += newlines;
            self.cursor.set_col(tail.chars().count());
        } else {
            self.cursor.set_col(self.cursor.col + s.chars().count());
        }
        self.touch();
    }

    /// Break the current line at the cursor (Enter).
    pub fn split_line(&mut self) {
        self.insert_char('\n');
    }

    /// Delete the char before the cursor, joining lines at column 0.
    ///
    /// Returns `true` if anything was deleted.
    pub fn delete_back(&mut self) -> bool {
        let Cursor { line, col, .. } = self.cursor;
        if col == 0 && line == 0 {
            return false;
        }

        if col == 0 {
            let prev_len = self.line_len(line - 1);
            let prev_end = self.rope.line_to_char(line - 1) + prev_len;
            let line_start = self.rope.line_to_char(line);
            self.rope.remove(prev_end..line_start);
            self.cursor.line -= 1;
            self.cursor.set_col(prev_len);
        } else {
            let idx = self.cursor_char_idx();
            self.rope.remove(idx - 1..idx);
            self.cursor.set_col(col - 1);
        }
        self.touch();
        true
    }

    /// Delete the char at the cursor, joining with the next line at the end
    /// of a line.
    ///
    /// Returns `true` if anything was deleted.
    pub fn delete_forward(&mut self) -> bool {
        let Cursor { line, col, .. } = self.cursor;
        let idx = self.cursor_char_idx();

        if col >= self.line_len(line) {
            if line + 1 >= self.line_count() {
                return false;
            }
            let next_start = self.rope.line_to_char(line + 1);
            self.rope.remove(idx..next_start);
        } else {
            self.rope.remove(idx..=idx);
        }
        self.touch();
        true
    }

    pub fn move_cursor(&mut self, direction: Direction) {
        match direction {
            Direction::Left => self.move_left(),
            Direction::Right => self.move_right(),
            Direction::Up => self.move_vertical(-1),
            Direction::Down => self.move_vertical(1),
        }
    }

    pub const fn move_home(&mut self) {
        self.cursor.set_col(0);
    }

    pub fn move_end(&mut self) {
        self.cursor.set_col(self.line_len(self.cursor.line));
    }

    /// Jump to the start of the previous word, wrapping to the previous line.
    pub fn move_word_left(&mut self) {
        let Cursor { line, col, .. } = self.cursor;
        if col == 0 {
            if line > 0 {
                self.cursor.line -= 1;
                self.cursor.set_col(self.line_len(line - 1));
            }
            return;
        }

        let chars = self.line_chars(line);
        let mut pos = col.min(chars.len());
        while pos > 0 && !is_word_char(chars[pos - 1]) {
            pos -= 1;
        }
        while pos > 0 && is_word_char(chars[pos - 1]) {
            pos -= 1;
        }
        self.cursor.set_col(pos);
    }

    /// Jump to the start of the next word, wrapping to the next line.
    pub fn move_word_right(&mut self) {
        let Cursor { line, col, .. } = self.cursor;
        let chars = self.line_chars(line);
        if col >= chars.len() {
            if line + 1 < self.line_count() {
                self.cursor.line += 1;
                self.cursor.set_col(0);
            }
            return;
        }

        let mut pos = col;
        while pos < chars.len() && is_word_char(chars[pos]) {
            pos += 1;
        }
        while pos < chars.len() && !is_word_char(chars[pos]) {
            pos += 1;
        }
        self.cursor.set_col(pos);
    }

    /// Place the cursor, clamping both coordinates into the buffer.
    pub fn move_to(&mut self, line: usize, col: usize) {
        self.cursor.line = line.min(self.line_count().saturating_sub(1));
        self.cursor.set_col(col.min(self.line_len(self.cursor.line)));
    }

    pub const fn move_to_start(&mut self) {
        self.cursor = Cursor::new();
    }

    pub fn move_to_end(&mut self) {
        let last = self.line_count().saturating_sub(1);
        self.cursor.line = last;
        self.cursor.set_col(self.line_len(last));
    }

    fn touch(&mut self) {
        self.dirty = true;
        self.revision += 1;
    }

    fn cursor_char_idx(&self) -> usize {
        let line = self.cursor.line.min(self.line_count().saturating_sub(1));
        self.rope.line_to_char(line) + self.cursor.col.min(self.line_len(line))
    }

    fn line_chars(&self, line_idx: usize) -> Vec<char> {
        let len = self.line_len(line_idx);
        if line_idx >= self.rope.len_lines() {
            return Vec::new();
        }
        self.rope.line(line_idx).chars().take(len).collect()
    }

    fn move_left(&mut self) {
        if self.cursor.col > 0 {
            self.cursor.set_col(self.cursor.col - 1);
        } else if self.cursor.line > 0 {
            self.cursor.line -= 1;
            self.cursor.set_col(self.line_len(self.cursor.line));
        }
    }

    fn move_right(&mut self) {
        if self.cursor.col < self.line_len(self.cursor.line) {
            self.cursor.set_col(self.cursor.col + 1);
        } else if self.cursor.line + 1 < self.line_count() {
            self.cursor.line += 1;
            self.cursor.set_col(0);
        }
    }

    fn move_vertical(&mut self, delta: isize) {
        let Some(target) = self.cursor.line.checked_add_signed(delta) else {
            return;
        };
        if target >= self.line_count() {
            return;
        }
        self.cursor.line = target;
        self.cursor.col = self.cursor.sticky_col.min(self.line_len(target));
    }
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

impl std::fmt::Debug for DraftBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DraftBuffer")
            .field("lines", &self.rope.len_lines())
            .field("cursor", &self.cursor)
            .field("dirty", &self.dirty)
            .field("revision", &self.revision)
            .finish()
    }
}

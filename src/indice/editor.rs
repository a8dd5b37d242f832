//! Editor views.
//!
//! Interactive index building operates on whatever document the person is
//! looking at, through the [`EditorView`] trait. Editors address text by
//! line and column, the rewriter by byte offset; [`offset_to_pos`] and
//! [`pos_to_offset`] convert between the two. Columns count characters, not
//! bytes, so a position never points into the middle of a UTF-8 sequence.

/// A zero-based line / column position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct Position {
    pub line: usize,
    pub ch: usize,
}

impl Position {
    pub fn new(line: usize, ch: usize) -> Self {
        Self { line, ch }
    }
}

pub trait EditorView {
    fn text(&self) -> String;

    fn cursor(&self) -> Position;

    /// Replaces the text between `from` and `to` (exclusive) with `text`.
    fn replace_range(&mut self, text: &str, from: Position, to: Position);
}

/// Position of a byte offset. Offsets past the end map to the end.
pub fn offset_to_pos(text: &str, offset: usize) -> Position {
    let mut offset = offset.min(text.len());
    while !text.is_char_boundary(offset) {
        offset -= 1;
    }
    let before = &text[..offset];
    let line_start = before.rfind('\n').map_or(0, |nl| nl + 1);
    Position {
        line: before.matches('\n').count(),
        ch: before[line_start..].chars().count(),
    }
}

/// Byte offset of a position. Lines past the end map to the end of the text;
/// columns past the end of a line map to the end of that line.
pub fn pos_to_offset(text: &str, pos: Position) -> usize {
    let mut line_start = 0;
    for _ in 0..pos.line {
        match text[line_start..].find('\n') {
            Some(nl) => line_start += nl + 1,
            None => return text.len(),
        }
    }
    let line = match text[line_start..].find('\n') {
        Some(nl) => &text[line_start..line_start + nl],
        None => &text[line_start..],
    };
    let within = line
        .char_indices()
        .nth(pos.ch)
        .map_or(line.len(), |(i, _)| i);
    line_start + within
}

/// An in-memory editor holding a document's text and a cursor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextBuffer {
    text: String,
    cursor: Position,
}

impl TextBuffer {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            cursor: Position::default(),
        }
    }

    pub fn with_cursor(mut self, cursor: Position) -> Self {
        self.cursor = cursor;
        self
    }

    pub fn set_cursor(&mut self, cursor: Position) {
        self.cursor = cursor;
    }

    pub fn into_text(self) -> String {
        self.text
    }
}

impl EditorView for TextBuffer {
    fn text(&self) -> String {
        self.text.clone()
    }

    fn cursor(&self) -> Position {
        self.cursor
    }

    fn replace_range(&mut self, text: &str, from: Position, to: Position) {
        let start = pos_to_offset(&self.text, from);
        let end = pos_to_offset(&self.text, to).max(start);
        self.text.replace_range(start..end, text);
    }
}

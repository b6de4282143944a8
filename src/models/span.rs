use std::ops::Range;

/// Lexical class of a piece of a line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpanKind {
    /// `//` up to the end of the line
    LineComment,
    /// `/* ... */`, or the part of one that falls on this line
    BlockComment,
    /// `'...'`
    SingleQuotedString,
    /// `"..."`
    DoubleQuotedString,
    /// Anything else, including the line terminator
    Plain,
}

impl SpanKind {
    pub fn is_comment(self) -> bool {
        matches!(self, SpanKind::LineComment | SpanKind::BlockComment)
    }
}

/// A classified byte range of a line.
///
/// Spans produced for one line never overlap and, taken in order, cover the
/// whole line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexicalSpan {
    pub kind: SpanKind,
    pub range: Range<usize>,
}

impl LexicalSpan {
    pub fn new(kind: SpanKind, range: Range<usize>) -> Self {
        Self { kind, range }
    }

    /// The text this span covers in `line`
    pub fn text<'a>(&self, line: &'a str) -> &'a str {
        &line[self.range.clone()]
    }
}

/// Scanner state carried from one line to the next
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScanState {
    #[default]
    Normal,
    InBlockComment,
}

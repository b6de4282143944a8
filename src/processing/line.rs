use crate::models::options::BlockCommentMode;
use crate::models::span::{LexicalSpan, ScanState, SpanKind};

const LINE_COMMENT: &str = "//";
const BLOCK_START: &str = "/*";
const BLOCK_END: &str = "*/";

/// Length in bytes of the terminator (`\n` or `\r\n`) ending `line`
pub fn terminator_len(line: &str) -> usize {
    if line.ends_with("\r\n") {
        2
    } else if line.ends_with('\n') {
        1
    } else {
        0
    }
}

/// Offset just past the quote closing the string that opens at `start`.
///
/// A backslash always consumes the character after it, so `\'` and `\\` never
/// end the string. Returns `None` when the string runs off the end of `body`.
fn find_string_end(body: &str, start: usize, quote: u8) -> Option<usize> {
    let bytes = body.as_bytes();
    let mut i = start + 1;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b if b == quote => return Some(i + 1),
            _ => i += 1,
        }
    }
    None
}

/// Split a line into classified spans.
///
/// `state` is the state left behind by the previous line; the returned state
/// is the one to hand to the next line. In [`BlockCommentMode::LineLocal`]
/// the incoming state is ignored and an unclosed `/*` is plain text.
pub fn scan_line(
    line: &str,
    state: ScanState,
    mode: BlockCommentMode,
) -> (Vec<LexicalSpan>, ScanState) {
    let body_end = line.len() - terminator_len(line);
    let body = &line[..body_end];

    let mut spans = Vec::new();
    let mut state = match mode {
        BlockCommentMode::Carry => state,
        BlockCommentMode::LineLocal => ScanState::Normal,
    };
    let mut pos = 0;
    let mut plain_start = 0;

    if state == ScanState::InBlockComment {
        match body.find(BLOCK_END) {
            Some(end_pos) => {
                let end = end_pos + BLOCK_END.len();
                spans.push(LexicalSpan::new(SpanKind::BlockComment, 0..end));
                state = ScanState::Normal;
                pos = end;
                plain_start = end;
            }
            None => {
                if !body.is_empty() {
                    spans.push(LexicalSpan::new(SpanKind::BlockComment, 0..body_end));
                }
                if body_end < line.len() {
                    spans.push(LexicalSpan::new(SpanKind::Plain, body_end..line.len()));
                }
                return (spans, state);
            }
        }
    }

    while pos < body.len() {
        let rest = &body[pos..];

        let matched = if rest.starts_with(LINE_COMMENT) {
            Some((SpanKind::LineComment, body.len()))
        } else if rest.starts_with(BLOCK_START) {
            let search_from = pos + BLOCK_START.len();
            match body[search_from..].find(BLOCK_END) {
                Some(end_pos) => Some((
                    SpanKind::BlockComment,
                    search_from + end_pos + BLOCK_END.len(),
                )),
                None if mode == BlockCommentMode::Carry => {
                    state = ScanState::InBlockComment;
                    Some((SpanKind::BlockComment, body.len()))
                }
                None => None,
            }
        } else if rest.starts_with('\'') {
            let end = find_string_end(body, pos, b'\'').unwrap_or(body.len());
            Some((SpanKind::SingleQuotedString, end))
        } else if rest.starts_with('"') {
            let end = find_string_end(body, pos, b'"').unwrap_or(body.len());
            Some((SpanKind::DoubleQuotedString, end))
        } else {
            None
        };

        match matched {
            Some((kind, end)) => {
                if plain_start < pos {
                    spans.push(LexicalSpan::new(SpanKind::Plain, plain_start..pos));
                }
                spans.push(LexicalSpan::new(kind, pos..end));
                pos = end;
                plain_start = end;
            }
            None => pos += rest.chars().next().map_or(1, char::len_utf8),
        }
    }

    if plain_start < line.len() {
        spans.push(LexicalSpan::new(SpanKind::Plain, plain_start..line.len()));
    }

    (spans, state)
}

/// Rebuild `line` from its spans with every comment collapsed to one space.
///
/// The space is left out when the comment already touches whitespace on
/// either side, so substitution never widens an existing gap.
pub fn render_spans(line: &str, spans: &[LexicalSpan]) -> String {
    let mut output = String::with_capacity(line.len());

    for span in spans {
        if span.kind.is_comment() {
            let space_before = output.chars().next_back().is_some_and(char::is_whitespace);
            let space_after = line[span.range.end..]
                .chars()
                .next()
                .is_some_and(char::is_whitespace);
            if !space_before && !space_after {
                output.push(' ');
            }
        } else {
            output.push_str(span.text(line));
        }
    }

    output
}

/// Strip the comments from one line, threading the block comment state
pub fn strip_line(line: &str, state: ScanState, mode: BlockCommentMode) -> (String, ScanState) {
    let (spans, next_state) = scan_line(line, state, mode);
    (render_spans(line, &spans), next_state)
}

/// Strip a single line scanned on its own
pub fn strip(line: &str) -> String {
    strip_line(line, ScanState::Normal, BlockCommentMode::Carry).0
}

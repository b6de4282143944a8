use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::{read_text, Result};
use crate::models::options::BlockCommentMode;
use crate::models::span::ScanState;
use crate::processing::line::{render_spans, scan_line};

/// Split text into lines, each keeping its terminator
pub fn split_lines(text: &str) -> impl Iterator<Item = &str> {
    text.split_inclusive('\n')
}

/// A file's stripped rendering
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StrippedFile {
    pub path: PathBuf,
    pub lines: Vec<String>,
    pub comments_removed: usize,
}

/// Strips comments line by line, remembering open block comments between
/// lines.
#[derive(Debug, Clone)]
pub struct Stripper {
    mode: BlockCommentMode,
    state: ScanState,
    comments_removed: usize,
}

impl Default for Stripper {
    fn default() -> Self {
        Self::new(BlockCommentMode::default())
    }
}

impl Stripper {
    pub fn new(mode: BlockCommentMode) -> Self {
        Self {
            mode,
            state: ScanState::Normal,
            comments_removed: 0,
        }
    }

    pub fn state(&self) -> ScanState {
        self.state
    }

    /// Comments removed since the last reset
    pub fn comments_removed(&self) -> usize {
        self.comments_removed
    }

    /// Forget any open block comment and zero the counter
    pub fn reset(&mut self) {
        self.state = ScanState::Normal;
        self.comments_removed = 0;
    }

    pub fn strip_line(&mut self, line: &str) -> String {
        let continued = self.state == ScanState::InBlockComment
            && self.mode == BlockCommentMode::Carry;
        let (spans, next_state) = scan_line(line, self.state, self.mode);

        let mut opened = spans.iter().filter(|s| s.kind.is_comment()).count();
        if continued && spans.first().is_some_and(|s| s.kind.is_comment()) {
            opened -= 1;
        }
        self.comments_removed += opened;
        self.state = next_state;

        render_spans(line, &spans)
    }

    pub fn strip_lines<'a, I>(&mut self, lines: I) -> Vec<String>
    where
        I: IntoIterator<Item = &'a str>,
    {
        lines.into_iter().map(|line| self.strip_line(line)).collect()
    }

    pub fn strip_text(&mut self, text: &str) -> Vec<String> {
        self.strip_lines(split_lines(text))
    }

    /// Read `path` and strip it from a clean state
    pub fn strip_file(&mut self, path: &Path) -> Result<StrippedFile> {
        let content = read_text(path)?;

        self.reset();
        let lines = self.strip_text(&content);

        if self.state == ScanState::InBlockComment {
            warn!("{}: block comment is not closed before end of file", path.display());
        }
        debug!(
            "Stripped {} comment(s) from {}",
            self.comments_removed,
            path.display()
        );

        let stripped = StrippedFile {
            path: path.to_path_buf(),
            lines,
            comments_removed: self.comments_removed,
        };
        self.state = ScanState::Normal;
        Ok(stripped)
    }
}

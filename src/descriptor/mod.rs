//! Build descriptor loading and canonical JSON rendering.
//!
//! Descriptors such as `binding.gyp` are written as object literals rather
//! than strict JSON. They are read by a recursive-descent parser that only
//! understands literal values; anything that would have to be evaluated (a
//! name, a call, an operator) is rejected with a
//! [`ParseErrorKind::Security`] error.

pub mod lexer;
pub mod parser;

use std::path::Path;

use thiserror::Error;
use tracing::debug;

use crate::error::{read_text, Error, Result};
use crate::models::descriptor::DescriptorValue;

pub use parser::parse_descriptor;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseErrorKind {
    /// The text does not match the descriptor grammar
    Syntax,
    /// The text asks for something to be evaluated
    Security,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("line {line}, column {column}: {message}")]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub message: String,
    pub line: usize,
    pub column: usize,
}

impl ParseError {
    pub fn new(kind: ParseErrorKind, message: impl Into<String>, line: usize, column: usize) -> Self {
        Self {
            kind,
            message: message.into(),
            line,
            column,
        }
    }

    /// Attach the descriptor path, producing a run error
    pub fn into_error(self, path: &Path) -> Error {
        let path = path.to_path_buf();
        let ParseError {
            kind,
            message,
            line,
            column,
        } = self;
        match kind {
            ParseErrorKind::Syntax => Error::DescriptorSyntax {
                path,
                line,
                column,
                message,
            },
            ParseErrorKind::Security => Error::DescriptorSecurity {
                path,
                line,
                column,
                message,
            },
        }
    }
}

/// Read and parse the descriptor at `path`
pub fn load_descriptor(path: &Path) -> Result<DescriptorValue> {
    let text = read_text(path)?;
    let value = parse_descriptor(&text).map_err(|e| e.into_error(path))?;
    debug!("Loaded {} descriptor from {}", value.type_name(), path.display());
    Ok(value)
}

/// Render `value` as JSON with two-space indentation, keys in file order
pub fn render_json(value: &DescriptorValue) -> serde_json::Result<String> {
    serde_json::to_string_pretty(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs;
    use tempfile::tempdir;

    const BINDING: &str = "{'targets': [{'target_name': 'app', 'sources': ['a.c','b.c']}]}";

    #[test]
    fn test_round_trip_through_strict_json() {
        let value = parse_descriptor(BINDING).unwrap();
        let targets = value.get("targets").and_then(|t| t.as_sequence()).unwrap();
        assert_eq!(value.as_mapping().unwrap().len(), 1);
        assert_eq!(targets.len(), 1);

        let json = render_json(&value).unwrap();
        let reparsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(
            reparsed,
            serde_json::json!({
                "targets": [{"target_name": "app", "sources": ["a.c", "b.c"]}]
            })
        );
    }

    #[test]
    fn test_render_is_indented_and_ordered() {
        let value = parse_descriptor("{'z': 1, 'a': [true, None], 'm': {}}").unwrap();
        let json = render_json(&value).unwrap();
        assert_eq!(
            json,
            "{\n  \"z\": 1,\n  \"a\": [\n    true,\n    null\n  ],\n  \"m\": {}\n}"
        );
    }

    #[test]
    fn test_load_descriptor_attaches_path() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("binding.gyp");

        fs::write(&path, "{'targets': [\n  {'target_name': 'app',,}\n]}").unwrap();
        let err = load_descriptor(&path).unwrap_err();
        assert_eq!(err.kind(), "DescriptorSyntaxError");
        assert!(matches!(err, Error::DescriptorSyntax { line: 2, .. }));
        assert_eq!(err.path(), path.as_path());

        fs::write(&path, "{'targets': __import__('os')}").unwrap();
        let err = load_descriptor(&path).unwrap_err();
        assert_eq!(err.kind(), "DescriptorSecurityError");

        fs::write(&path, BINDING).unwrap();
        let value = load_descriptor(&path).unwrap();
        assert_eq!(value, parse_descriptor(BINDING).unwrap());
    }

    #[test]
    fn test_load_missing_descriptor() {
        let dir = tempdir().unwrap();
        let err = load_descriptor(&dir.path().join("binding.gyp")).unwrap_err();
        assert_eq!(err.kind(), "IOError");
    }
}

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// How block comments that do not close on their opening line are handled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BlockCommentMode {
    /// Remember an open `/*` and keep stripping on the following lines
    #[default]
    Carry,
    /// Scan every line on its own; an unclosed `/*` is left as plain text
    LineLocal,
}

/// Options for a full run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessOptions {
    /// Root of the source tree to strip
    pub source_root: PathBuf,
    /// Path to the build descriptor
    pub descriptor: PathBuf,
    /// Block comment handling across lines
    pub block_comments: BlockCommentMode,
    /// Skip files matched by the root's .gitignore
    pub respect_gitignore: bool,
    /// Print the descriptor before the source tree
    pub descriptor_first: bool,
}

impl Default for ProcessOptions {
    fn default() -> Self {
        Self {
            source_root: PathBuf::from("src"),
            descriptor: PathBuf::from("binding.gyp"),
            block_comments: BlockCommentMode::Carry,
            respect_gitignore: false,
            descriptor_first: false,
        }
    }
}

// uncomment-gyp - strip comments from a source tree and print a build descriptor as JSON
// Re-export public modules and types

pub mod cli;
pub mod config;
pub mod descriptor;
pub mod error;
pub mod models;
pub mod processing;
pub mod processor;
pub mod utils;

// Re-export main types for convenience
pub use descriptor::{load_descriptor, parse_descriptor, render_json};
pub use error::Error;
pub use models::descriptor::DescriptorValue;
pub use models::options::{BlockCommentMode, ProcessOptions};
pub use models::span::{LexicalSpan, ScanState, SpanKind};
pub use processing::file::{StrippedFile, Stripper};
pub use processing::line::{scan_line, strip, strip_line};
pub use processor::{Processor, RunSummary};
pub use utils::walk::walk_tree;

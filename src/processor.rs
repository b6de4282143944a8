use anyhow::{Context, Result};
use std::io::Write;
use tracing::{debug, info};

use crate::descriptor::{load_descriptor, render_json};
use crate::models::options::ProcessOptions;
use crate::processing::file::{StrippedFile, Stripper};
use crate::utils::walk::walk_tree;

/// Totals for one run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub files_processed: usize,
    pub comments_removed: usize,
}

/// Write a stripped file to `out`: a marker line, then its lines
pub fn write_stripped_file<W: Write>(out: &mut W, file: &StrippedFile) -> std::io::Result<()> {
    writeln!(out, "==> {} <==", file.path.display())?;
    for line in &file.lines {
        out.write_all(line.as_bytes())?;
    }
    // Keep the next marker on its own line
    if file.lines.last().is_some_and(|line| !line.ends_with('\n')) {
        writeln!(out)?;
    }
    out.flush()
}

/// Runs both pipelines against one output sink
pub struct Processor {
    options: ProcessOptions,
    stripper: Stripper,
}

impl Processor {
    pub fn new(options: ProcessOptions) -> Self {
        let stripper = Stripper::new(options.block_comments);
        Self { options, stripper }
    }

    /// Emit the stripped source tree and the descriptor, in the configured
    /// order
    pub fn run<W: Write>(&mut self, out: &mut W) -> Result<RunSummary> {
        let summary = if self.options.descriptor_first {
            self.print_descriptor(out)?;
            self.print_tree(out)?
        } else {
            let summary = self.print_tree(out)?;
            self.print_descriptor(out)?;
            summary
        };

        out.flush().context("Failed to write output")?;
        info!(
            "{} file(s) processed, {} comment(s) stripped",
            summary.files_processed, summary.comments_removed
        );
        Ok(summary)
    }

    /// Walk the source root and write every file's stripped rendering
    pub fn print_tree<W: Write>(&mut self, out: &mut W) -> Result<RunSummary> {
        let files = walk_tree(&self.options.source_root, self.options.respect_gitignore)?;
        let mut summary = RunSummary::default();

        for path in files {
            let stripped = self.stripper.strip_file(&path)?;
            write_stripped_file(out, &stripped).context("Failed to write output")?;

            summary.files_processed += 1;
            summary.comments_removed += stripped.comments_removed;
        }

        debug!(
            "Stripped {} file(s) under {}",
            summary.files_processed,
            self.options.source_root.display()
        );
        Ok(summary)
    }

    /// Load the descriptor and write it as canonical JSON
    pub fn print_descriptor<W: Write>(&self, out: &mut W) -> Result<()> {
        let value = load_descriptor(&self.options.descriptor)?;
        let json = render_json(&value).context("Failed to render descriptor as JSON")?;

        writeln!(out, "{json}").context("Failed to write output")?;
        out.flush().context("Failed to write output")?;
        Ok(())
    }
}

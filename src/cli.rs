use anyhow::Result;
use clap::{ArgAction, Parser};
use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::models::options::{BlockCommentMode, ProcessOptions};

/// Command-line interface for the uncomment-gyp tool
#[derive(Parser, Debug)]
#[command(
    name = "uncomment-gyp",
    version,
    about = "Print a source tree with comments stripped, then the build descriptor as JSON."
)]
pub struct Cli {
    /// Source tree to strip [default: src]
    #[arg(short, long, value_name = "DIR")]
    pub source_root: Option<PathBuf>,

    /// Build descriptor to print [default: binding.gyp]
    #[arg(short, long, value_name = "FILE")]
    pub descriptor: Option<PathBuf>,

    /// Scan each line on its own instead of tracking block comments across lines
    #[arg(long, default_value_t = false, overrides_with = "carry")]
    pub line_local: bool,

    /// Track block comments across lines (the default)
    #[arg(long, default_value_t = false, overrides_with = "line_local")]
    pub carry: bool,

    /// Skip files matched by the source root's .gitignore
    #[arg(long, default_value_t = false, overrides_with = "no_respect_gitignore")]
    pub respect_gitignore: bool,

    /// Visit every file, even those matched by .gitignore (the default)
    #[arg(long, default_value_t = false, overrides_with = "respect_gitignore")]
    pub no_respect_gitignore: bool,

    /// Print the descriptor before the source tree
    #[arg(long, default_value_t = false, overrides_with = "tree_first")]
    pub descriptor_first: bool,

    /// Print the source tree before the descriptor (the default)
    #[arg(long, default_value_t = false, overrides_with = "descriptor_first")]
    pub tree_first: bool,

    /// Configuration file (defaults to ./.uncomment-gyp.toml when present)
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

/// `Some` when either side of an on/off flag pair was given
fn switch(on: bool, off: bool) -> Option<bool> {
    match (on, off) {
        (true, _) => Some(true),
        (_, true) => Some(false),
        _ => None,
    }
}

impl Cli {
    /// Settings given on the command line, as a config layer
    pub fn overrides(&self) -> Config {
        Config {
            source_root: self.source_root.clone(),
            descriptor: self.descriptor.clone(),
            block_comments: switch(self.line_local, self.carry).map(|line_local| {
                if line_local {
                    BlockCommentMode::LineLocal
                } else {
                    BlockCommentMode::Carry
                }
            }),
            respect_gitignore: switch(self.respect_gitignore, self.no_respect_gitignore),
            descriptor_first: switch(self.descriptor_first, self.tree_first),
        }
    }

    /// Combine the config file found from `working_dir` with the flags
    pub fn resolve_options(&self, working_dir: &Path) -> Result<ProcessOptions> {
        let file_config = Config::discover(self.config.as_deref(), working_dir)?;
        let merged = file_config.merge_with(&self.overrides());
        merged.validate()?;
        Ok(merged.resolve())
    }
}

/// Parse CLI arguments and return configuration
pub fn parse_args() -> Cli {
    Cli::parse()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_cli_parsing() {
        let cli = Cli::parse_from(["uncomment-gyp", "--source-root", "lib", "--line-local", "-vv"]);
        assert_eq!(cli.source_root, Some(PathBuf::from("lib")));
        assert!(cli.line_local);
        assert!(!cli.respect_gitignore);
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.descriptor, None);
    }

    #[test]
    fn test_rejects_positional_arguments() {
        assert!(Cli::try_parse_from(["uncomment-gyp", "src/main.c"]).is_err());
    }

    #[test]
    fn test_flags_override_config_file() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join(".uncomment-gyp.toml"),
            "source_root = \"lib\"\ndescriptor = \"addon.gyp\"\nblock_comments = \"carry\"\n",
        )
        .unwrap();

        let cli = Cli::parse_from(["uncomment-gyp", "-d", "other.gyp", "--line-local"]);
        let options = cli.resolve_options(dir.path()).unwrap();
        assert_eq!(options.source_root, PathBuf::from("lib"));
        assert_eq!(options.descriptor, PathBuf::from("other.gyp"));
        assert_eq!(options.block_comments, BlockCommentMode::LineLocal);
        assert!(!options.descriptor_first);
    }

    #[test]
    fn test_negative_flags_undo_config_file() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join(".uncomment-gyp.toml"),
            "block_comments = \"line-local\"\nrespect_gitignore = true\ndescriptor_first = true\n",
        )
        .unwrap();

        let cli = Cli::parse_from(["uncomment-gyp"]);
        let options = cli.resolve_options(dir.path()).unwrap();
        assert_eq!(options.block_comments, BlockCommentMode::LineLocal);
        assert!(options.respect_gitignore);
        assert!(options.descriptor_first);

        let cli = Cli::parse_from([
            "uncomment-gyp",
            "--carry",
            "--no-respect-gitignore",
            "--tree-first",
        ]);
        let options = cli.resolve_options(dir.path()).unwrap();
        assert_eq!(options.block_comments, BlockCommentMode::Carry);
        assert!(!options.respect_gitignore);
        assert!(!options.descriptor_first);
    }

    #[test]
    fn test_last_of_a_flag_pair_wins() {
        let cli = Cli::parse_from(["uncomment-gyp", "--line-local", "--carry"]);
        assert_eq!(cli.overrides().block_comments, Some(BlockCommentMode::Carry));

        let cli = Cli::parse_from(["uncomment-gyp", "--tree-first", "--descriptor-first"]);
        assert_eq!(cli.overrides().descriptor_first, Some(true));

        assert_eq!(Cli::parse_from(["uncomment-gyp"]).overrides(), Config::default());
    }

    #[test]
    fn test_defaults_without_config() {
        let dir = tempdir().unwrap();
        let cli = Cli::parse_from(["uncomment-gyp", "--config", "/nonexistent/uncomment-gyp.toml"]);
        assert!(cli.resolve_options(dir.path()).is_err());

        let explicit = dir.path().join("empty.toml");
        fs::write(&explicit, "").unwrap();
        let cli = Cli::parse_from([
            "uncomment-gyp",
            "--config",
            explicit.to_str().unwrap(),
        ]);
        assert_eq!(cli.resolve_options(dir.path()).unwrap(), ProcessOptions::default());
    }
}

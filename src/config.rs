use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::models::options::{BlockCommentMode, ProcessOptions};

/// File name looked up in the working directory
pub const LOCAL_CONFIG_FILE: &str = ".uncomment-gyp.toml";

/// Settings read from a TOML configuration file.
///
/// Every field is optional; unset fields fall through to the next layer
/// (command-line flags override the file, the file overrides the defaults).
/// Relative paths are taken relative to the working directory.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Root of the source tree to strip
    pub source_root: Option<PathBuf>,

    /// Build descriptor to print as JSON
    pub descriptor: Option<PathBuf>,

    /// `"carry"` or `"line-local"`
    pub block_comments: Option<BlockCommentMode>,

    /// Skip files matched by the source root's .gitignore
    pub respect_gitignore: Option<bool>,

    /// Print the descriptor before the source tree
    pub descriptor_first: Option<bool>,
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        Self::from_toml(&content)
            .with_context(|| format!("Invalid configuration in: {}", path.as_ref().display()))
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content).context("Failed to parse TOML")?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self
            .source_root
            .as_ref()
            .is_some_and(|p| p.as_os_str().is_empty())
        {
            return Err(anyhow::anyhow!("source_root must not be empty"));
        }
        if self
            .descriptor
            .as_ref()
            .is_some_and(|p| p.as_os_str().is_empty())
        {
            return Err(anyhow::anyhow!("descriptor must not be empty"));
        }
        Ok(())
    }

    /// Layer `other` on top of `self`; fields set in `other` win
    pub fn merge_with(&self, other: &Config) -> Config {
        Config {
            source_root: other.source_root.clone().or_else(|| self.source_root.clone()),
            descriptor: other.descriptor.clone().or_else(|| self.descriptor.clone()),
            block_comments: other.block_comments.or(self.block_comments),
            respect_gitignore: other.respect_gitignore.or(self.respect_gitignore),
            descriptor_first: other.descriptor_first.or(self.descriptor_first),
        }
    }

    /// Fill unset fields from the defaults
    pub fn resolve(&self) -> ProcessOptions {
        let defaults = ProcessOptions::default();
        ProcessOptions {
            source_root: self.source_root.clone().unwrap_or(defaults.source_root),
            descriptor: self.descriptor.clone().unwrap_or(defaults.descriptor),
            block_comments: self.block_comments.unwrap_or(defaults.block_comments),
            respect_gitignore: self.respect_gitignore.unwrap_or(defaults.respect_gitignore),
            descriptor_first: self.descriptor_first.unwrap_or(defaults.descriptor_first),
        }
    }

    /// Get the global configuration file path
    pub fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("uncomment-gyp").join("config.toml"))
    }

    /// Find and load the configuration file for this run.
    ///
    /// An explicit path must exist. Otherwise `.uncomment-gyp.toml` in
    /// `working_dir` is used, then the global config; having neither is fine.
    pub fn discover(explicit: Option<&Path>, working_dir: &Path) -> Result<Config> {
        if let Some(path) = explicit {
            debug!("Using config file {}", path.display());
            return Self::from_file(path);
        }

        let local = working_dir.join(LOCAL_CONFIG_FILE);
        if local.is_file() {
            debug!("Using config file {}", local.display());
            return Self::from_file(&local);
        }

        if let Some(global) = Self::global_config_path() {
            if global.is_file() {
                debug!("Using global config file {}", global.display());
                return Self::from_file(&global);
            }
        }

        Ok(Config::default())
    }
}

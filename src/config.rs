//! Runtime configuration loaded from nukebuild.toml.

use crate::cleaner::CleanOptions;

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;

// Embed the default settings directly in the binary at compile time
const DEFAULT_CONFIG_TOML: &str = include_str!("../nukebuild.toml");

/// Effective settings for a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    pub verbose: bool,
    pub max_passes: u32,
}

/// A user config file; every key is optional
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigOverrides {
    verbose: Option<bool>,
    max_passes: Option<u32>,
}

impl Config {
    /// Settings from the embedded defaults
    pub fn defaults() -> Result<Self> {
        let config: Config = toml::from_str(DEFAULT_CONFIG_TOML)
            .context("Failed to parse embedded default configuration")?;
        config.validate()?;
        Ok(config)
    }

    /// Embedded defaults, overlaid with the file at `path` when given
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = Config::defaults()?;

        if let Some(path) = path {
            let content = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file {}", path.display()))?;
            config
                .apply_str(&content)
                .with_context(|| format!("Invalid config file {}", path.display()))?;
        }

        Ok(config)
    }

    fn apply_str(&mut self, content: &str) -> Result<()> {
        let overrides: ConfigOverrides = toml::from_str(content)?;
        if let Some(verbose) = overrides.verbose {
            self.verbose = verbose;
        }
        if let Some(max_passes) = overrides.max_passes {
            self.max_passes = max_passes;
        }
        self.validate()
    }

    /// Apply command-line flags on top of file settings
    pub fn with_flags(mut self, verbose: bool, max_passes: Option<u32>) -> Result<Self> {
        self.verbose |= verbose;
        if let Some(max_passes) = max_passes {
            self.max_passes = max_passes;
        }
        self.validate()?;
        Ok(self)
    }

    fn validate(&self) -> Result<()> {
        if self.max_passes == 0 {
            bail!("max_passes must be at least 1");
        }
        Ok(())
    }

    pub fn clean_options(&self) -> CleanOptions {
        CleanOptions {
            verbose: self.verbose,
            max_passes: self.max_passes,
        }
    }
}

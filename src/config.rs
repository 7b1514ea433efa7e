//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.userfeed.toml` files.

use crate::cli::{Args, Mode, OutputFormat};
use crate::models::UserId;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default configuration file name, looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = ".userfeed.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Simulated data source settings.
    #[serde(default)]
    pub source: SourceConfig,

    /// Output settings.
    #[serde(default)]
    pub output: OutputConfig,
}

/// General application settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// User to aggregate.
    #[serde(default = "default_user_id")]
    pub user_id: UserId,

    /// Enable verbose logging by default.
    #[serde(default)]
    pub verbose: bool,

    /// Aggregation mode.
    #[serde(default)]
    pub mode: Mode,

    /// Deadline for the whole run, in milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deadline_ms: Option<u64>,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            user_id: default_user_id(),
            verbose: false,
            mode: Mode::default(),
            deadline_ms: None,
        }
    }
}

fn default_user_id() -> UserId {
    1
}

/// Simulated latencies of the three providers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceConfig {
    #[serde(default = "default_profile_delay")]
    pub profile_delay_ms: u64,

    #[serde(default = "default_posts_delay")]
    pub posts_delay_ms: u64,

    #[serde(default = "default_comments_delay")]
    pub comments_delay_ms: u64,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            profile_delay_ms: default_profile_delay(),
            posts_delay_ms: default_posts_delay(),
            comments_delay_ms: default_comments_delay(),
        }
    }
}

fn default_profile_delay() -> u64 {
    1000
}

fn default_posts_delay() -> u64 {
    1500
}

fn default_comments_delay() -> u64 {
    2000
}

/// Output settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default)]
    pub format: OutputFormat,
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        Self::load_optional(Path::new(DEFAULT_CONFIG_FILE))
    }

    fn load_optional(path: &Path) -> Result<Option<Self>> {
        if path.exists() {
            Ok(Some(Self::load(path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence, but only when they were given.
    pub fn merge_with_args(&mut self, args: &Args) {
        if let Some(user_id) = args.user_id {
            self.general.user_id = user_id;
        }
        if let Some(mode) = args.mode {
            self.general.mode = mode;
        }
        if let Some(deadline) = args.deadline_ms {
            self.general.deadline_ms = Some(deadline);
        }
        if let Some(format) = args.format {
            self.output.format = format;
        }

        if args.verbose {
            self.general.verbose = true;
        }
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}

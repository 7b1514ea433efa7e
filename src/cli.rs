//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and failure-injection flags.

use crate::aggregate::Strategy;
use crate::models::{PostId, UserId};
use crate::source::FailurePlan;
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Userfeed - aggregate a user's profile, posts and comments
///
/// Fetches from three simulated providers either one call at a time or
/// concurrently, and reports how long each approach took.
///
/// Examples:
///   userfeed --mode compare
///   userfeed --mode parallel --fail-comments 2
///   userfeed --mode sequential --fail-profile --format json
///   userfeed --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// User whose content is aggregated (default: 1)
    #[arg(short, long, value_name = "ID", env = "USERFEED_USER_ID")]
    pub user_id: Option<UserId>,

    /// Aggregation mode (default: parallel)
    #[arg(short, long, value_name = "MODE")]
    pub mode: Option<Mode>,

    /// Make the profile fetch fail
    #[arg(long)]
    pub fail_profile: bool,

    /// Make the posts fetch fail
    #[arg(long)]
    pub fail_posts: bool,

    /// Make the comments fetch fail for these posts (comma-separated)
    ///
    /// Example: --fail-comments 2,3
    #[arg(long, value_name = "IDS", value_delimiter = ',')]
    pub fail_comments: Vec<PostId>,

    /// Make every comments fetch fail
    #[arg(long)]
    pub fail_all_comments: bool,

    /// Output format (text, json)
    #[arg(long, value_name = "FORMAT")]
    pub format: Option<OutputFormat>,

    /// Write the output to a file instead of stdout
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Give up if the run takes longer than this many milliseconds
    #[arg(long, value_name = "MS")]
    pub deadline_ms: Option<u64>,

    /// Path to configuration file
    ///
    /// If not specified, looks for .userfeed.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (errors only)
    #[arg(short, long)]
    pub quiet: bool,

    /// Generate a default .userfeed.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

/// What to run.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// One fetch at a time
    Sequential,
    /// Profile and posts together, then all comments at once (default)
    #[default]
    Parallel,
    /// Profile, then posts, then all comments at once
    Staged,
    /// Run sequential and parallel and compare their latency
    Compare,
}

impl Mode {
    /// The single strategy this mode runs, or `None` for `compare`.
    pub fn strategy(self) -> Option<Strategy> {
        match self {
            Mode::Sequential => Some(Strategy::Sequential),
            Mode::Parallel => Some(Strategy::Parallel),
            Mode::Staged => Some(Strategy::Staged),
            Mode::Compare => None,
        }
    }
}

/// Output format.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable text (default)
    #[default]
    Text,
    /// JSON
    Json,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        if self.init_config {
            return Ok(());
        }

        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        if self.deadline_ms == Some(0) {
            return Err("Deadline must be at least 1 millisecond".to_string());
        }

        if self.fail_all_comments && !self.fail_comments.is_empty() {
            return Err("Cannot use both --fail-comments and --fail-all-comments".to_string());
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self, config_verbose: bool) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose || config_verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }

    /// Failures to inject into the simulated source.
    pub fn failure_plan(&self) -> FailurePlan {
        let mut plan = FailurePlan::none();
        if self.fail_profile {
            plan = plan.fail_profile();
        }
        if self.fail_posts {
            plan = plan.fail_posts();
        }
        if self.fail_all_comments {
            plan = plan.fail_all_comments();
        }
        for post_id in &self.fail_comments {
            plan = plan.fail_comments_for(*post_id);
        }
        plan
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn make_args() -> Args {
        Args {
            user_id: None,
            mode: None,
            fail_profile: false,
            fail_posts: false,
            fail_comments: Vec::new(),
            fail_all_comments: false,
            format: None,
            output: None,
            deadline_ms: None,
            config: None,
            verbose: false,
            quiet: false,
            init_config: false,
        }
    }

    #[test]
    fn test_parse_flags() {
        let args = Args::try_parse_from([
            "userfeed",
            "--user-id",
            "3",
            "--mode",
            "compare",
            "--fail-comments",
            "2,3",
            "--format",
            "json",
        ])
        .unwrap();

        assert_eq!(args.user_id, Some(3));
        assert_eq!(args.mode, Some(Mode::Compare));
        assert_eq!(args.fail_comments, vec![2, 3]);
        assert_eq!(args.format, Some(OutputFormat::Json));
    }

    #[test]
    fn test_validation_conflicting_options() {
        let mut args = make_args();
        args.verbose = true;
        args.quiet = true;
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_zero_deadline() {
        let mut args = make_args();
        args.deadline_ms = Some(0);
        assert!(args.validate().is_err());

        args.deadline_ms = Some(1);
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_validation_comment_failure_flags() {
        let mut args = make_args();
        args.fail_all_comments = true;
        args.fail_comments = vec![1];
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_log_level() {
        let mut args = make_args();
        assert_eq!(args.log_level(false), tracing::Level::INFO);
        assert_eq!(args.log_level(true), tracing::Level::DEBUG);

        args.verbose = true;
        assert_eq!(args.log_level(false), tracing::Level::DEBUG);

        args.verbose = false;
        args.quiet = true;
        assert_eq!(args.log_level(true), tracing::Level::ERROR);
    }

    #[test]
    fn test_failure_plan() {
        let mut args = make_args();
        args.fail_posts = true;
        args.fail_comments = vec![2, 2, 3];

        let plan = args.failure_plan();
        assert!(!plan.profile);
        assert!(plan.posts);
        assert_eq!(plan.comment_posts.len(), 2);
        assert!(!plan.all_comments);
    }

    #[test]
    fn test_mode_strategy() {
        assert_eq!(Mode::Sequential.strategy(), Some(Strategy::Sequential));
        assert_eq!(Mode::Staged.strategy(), Some(Strategy::Staged));
        assert_eq!(Mode::Compare.strategy(), None);
    }
}

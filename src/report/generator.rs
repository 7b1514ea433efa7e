//! Text and JSON report generation.

use crate::aggregate::{AggregateRun, LatencyComparison, Strategy};
use crate::cli::Mode;
use crate::error::AggregateError;
use crate::models::{AggregateResult, Post, UserId};
use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Message shown whenever there is no user to display.
pub const UNAVAILABLE_MESSAGE: &str = "Unable to load user data";

/// Metadata about one aggregation run.
#[derive(Debug, Clone, Serialize)]
pub struct RunMetadata {
    pub mode: Mode,
    pub user_id: UserId,
    pub generated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub elapsed_ms: Option<u128>,
    pub posts_without_comments: usize,
}

/// A single run as emitted in JSON.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub metadata: RunMetadata,
    pub result: AggregateResult,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl RunReport {
    pub fn success(mode: Mode, user_id: UserId, run: &AggregateRun) -> Self {
        Self {
            metadata: RunMetadata {
                mode,
                user_id,
                generated_at: Utc::now(),
                elapsed_ms: Some(run.elapsed.as_millis()),
                posts_without_comments: run.recovered,
            },
            result: run.result.clone(),
            error: None,
        }
    }

    pub fn failure(mode: Mode, user_id: UserId, error: &AggregateError) -> Self {
        Self {
            metadata: RunMetadata {
                mode,
                user_id,
                generated_at: Utc::now(),
                elapsed_ms: None,
                posts_without_comments: 0,
            },
            result: AggregateResult::unavailable(),
            error: Some(error.to_string()),
        }
    }
}

/// A latency comparison as emitted in JSON.
#[derive(Debug, Clone, Serialize)]
pub struct ComparisonReport {
    pub user_id: UserId,
    pub generated_at: DateTime<Utc>,
    pub sequential_ms: u128,
    pub parallel_ms: u128,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speedup: Option<f64>,
    pub results_match: bool,
    pub result: AggregateResult,
}

impl From<&LatencyComparison> for ComparisonReport {
    fn from(comparison: &LatencyComparison) -> Self {
        Self {
            user_id: comparison.user_id,
            generated_at: Utc::now(),
            sequential_ms: comparison.sequential.elapsed.as_millis(),
            parallel_ms: comparison.parallel.elapsed.as_millis(),
            speedup: comparison.speedup(),
            results_match: comparison.results_match(),
            result: comparison.parallel.result.clone(),
        }
    }
}

/// Render a composite result the way it is shown to a reader.
pub fn generate_result_text(result: &AggregateResult) -> String {
    let Some(user) = &result.user else {
        return format!("{}\n", UNAVAILABLE_MESSAGE);
    };

    let mut output = String::new();

    output.push_str(&format!("{}\n", user.name));
    output.push_str(&format!("Username: {}\n", user.username));
    output.push_str(&format!("Email: {}\n", user.email));

    for post in &result.posts {
        output.push('\n');
        output.push_str(&generate_post_block(post));
    }

    output
}

fn generate_post_block(post: &Post) -> String {
    let mut block = String::new();

    block.push_str(&format!("## {}\n", post.title));
    block.push_str(&format!("{}\n", post.content));
    block.push_str("Comments:\n");

    if post.comments.is_empty() {
        block.push_str("  (none)\n");
    }
    for comment in &post.comments {
        block.push_str(&format!("  - {}: {}\n", comment.username, comment.comment));
    }

    block
}

/// Render a successful single-strategy run.
pub fn generate_run_text(strategy: Strategy, run: &AggregateRun) -> String {
    let mut output = generate_result_text(&run.result);

    output.push_str(&format!(
        "\n{} fetch took {}ms",
        capitalize(&strategy.to_string()),
        run.elapsed.as_millis()
    ));
    if run.recovered > 0 {
        output.push_str(&format!(
            " ({} post(s) shown without comments)",
            run.recovered
        ));
    }
    output.push('\n');

    output
}

/// Render the "unable to load" state for a fatal failure.
pub fn generate_failure_text(error: &AggregateError) -> String {
    format!("{}\n  Reason: {}\n", UNAVAILABLE_MESSAGE, error)
}

/// Render a latency comparison.
pub fn generate_comparison_text(comparison: &LatencyComparison) -> String {
    let mut output = generate_result_text(&comparison.parallel.result);

    output.push_str("\n## Latency\n\n");
    output.push_str("| Strategy   | Elapsed  |\n");
    output.push_str("|------------|----------|\n");
    output.push_str(&format!(
        "| Sequential | {:>6}ms |\n",
        comparison.sequential.elapsed.as_millis()
    ));
    output.push_str(&format!(
        "| Parallel   | {:>6}ms |\n",
        comparison.parallel.elapsed.as_millis()
    ));
    let summary = match comparison.speedup() {
        _ if comparison.parallel_was_slower() => format!(
            "Parallel was {}ms slower than sequential.",
            comparison.lost().as_millis()
        ),
        Some(speedup) => format!(
            "Parallel was {:.1}x faster, saving {}ms.",
            speedup,
            comparison.saved().as_millis()
        ),
        None => format!(
            "Parallel finished instantly, saving {}ms.",
            comparison.saved().as_millis()
        ),
    };
    output.push_str(&format!("\n{}\n", summary));
    if !comparison.results_match() {
        output.push_str("Warning: the two strategies returned different results.\n");
    }

    output
}

/// Serialize any report to pretty JSON.
pub fn generate_json_report<T: Serialize>(report: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(report)?)
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

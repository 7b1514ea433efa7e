//! Aggregation strategies.
//!
//! Every strategy fetches a profile, the user's posts and the comments of
//! each post, then hands the pieces to [`assemble`]. They differ only in how
//! the fetches are scheduled:
//!
//! - [`SequentialAggregator`]: one fetch at a time, in dependency order.
//! - [`ParallelAggregator`]: profile and posts together, then every
//!   comments fetch at once.
//! - [`StagedAggregator`]: profile then posts, then every comments fetch at
//!   once.
//!
//! A failed profile or posts fetch fails the run. A failed comments fetch
//! only empties that post's comments.

pub mod assembler;
pub mod compare;
pub mod parallel;
pub mod sequential;
pub mod staged;

pub use assembler::assemble;
pub use compare::{compare_latency, LatencyComparison};
pub use parallel::ParallelAggregator;
pub use sequential::SequentialAggregator;
pub use staged::StagedAggregator;

use crate::error::{AggregateError, FetchOutcome, RecoverableItemError};
use crate::models::{AggregateResult, Comment, PostId, UserId, UserProfile};
use crate::observer::{AggregationEvent, AggregationObserver};
use crate::source::{DataSource, Resource};
use async_trait::async_trait;
use serde::Serialize;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

/// How fetches are scheduled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    Sequential,
    Parallel,
    Staged,
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strategy::Sequential => write!(f, "sequential"),
            Strategy::Parallel => write!(f, "parallel"),
            Strategy::Staged => write!(f, "staged"),
        }
    }
}

/// A finished run together with its wall-clock cost.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregateRun {
    pub result: AggregateResult,
    pub elapsed: Duration,
    /// Posts whose comments fetch failed and were emptied.
    pub recovered: usize,
}

/// Builds an [`AggregateResult`] for a user.
#[async_trait]
pub trait Aggregator: Send + Sync {
    fn strategy(&self) -> Strategy;

    /// Run the aggregation and report how long it took.
    async fn run_timed(&self, user_id: UserId) -> Result<AggregateRun, AggregateError>;

    /// Run the aggregation.
    async fn run(&self, user_id: UserId) -> Result<AggregateResult, AggregateError> {
        Ok(self.run_timed(user_id).await?.result)
    }
}

/// Create the aggregator for `strategy`.
pub fn build(
    strategy: Strategy,
    source: Arc<dyn DataSource>,
    observer: Arc<dyn AggregationObserver>,
) -> Box<dyn Aggregator> {
    match strategy {
        Strategy::Sequential => Box::new(SequentialAggregator::new(source, observer)),
        Strategy::Parallel => Box::new(ParallelAggregator::new(source, observer)),
        Strategy::Staged => Box::new(StagedAggregator::new(source, observer)),
    }
}

/// Aggregated pieces plus the number of recovered comment failures.
pub(crate) struct Collected {
    pub result: AggregateResult,
    pub recovered: usize,
}

/// Wrap a strategy's collection step with run-level events and timing.
pub(crate) async fn timed<F>(
    strategy: Strategy,
    observer: &dyn AggregationObserver,
    user_id: UserId,
    collect: F,
) -> Result<AggregateRun, AggregateError>
where
    F: Future<Output = Result<Collected, AggregateError>>,
{
    observer.on_event(&AggregationEvent::RunStarted { strategy, user_id });
    let start = Instant::now();

    let collected = match collect.await {
        Ok(collected) => collected,
        Err(err) => {
            observer.on_event(&AggregationEvent::run_failed(strategy, &err));
            return Err(err);
        }
    };

    let elapsed = start.elapsed();
    observer.on_event(&AggregationEvent::BatchComplete {
        strategy,
        posts: collected.result.posts.len(),
        recovered: collected.recovered,
        elapsed,
    });

    Ok(AggregateRun {
        result: collected.result,
        elapsed,
        recovered: collected.recovered,
    })
}

/// Number of items a fetch produced, for progress events.
pub(crate) trait ItemCount {
    fn item_count(&self) -> usize;
}

impl ItemCount for UserProfile {
    fn item_count(&self) -> usize {
        1
    }
}

impl<T> ItemCount for Vec<T> {
    fn item_count(&self) -> usize {
        self.len()
    }
}

/// Await one fetch, reporting start, success or failure to the observer.
pub(crate) async fn observe<T, F>(
    observer: &dyn AggregationObserver,
    resource: Resource,
    fetch: F,
) -> FetchOutcome<T>
where
    T: ItemCount,
    F: Future<Output = FetchOutcome<T>>,
{
    observer.on_event(&AggregationEvent::FetchStarted { resource });

    let outcome = fetch.await;
    match &outcome {
        Ok(value) => observer.on_event(&AggregationEvent::FetchSucceeded {
            resource,
            items: value.item_count(),
        }),
        Err(error) => observer.on_event(&AggregationEvent::FetchFailed {
            error: error.clone(),
        }),
    }

    outcome
}

/// Fetch one post's comments, converting a failure into a reported
/// [`RecoverableItemError`].
pub(crate) async fn fetch_comments_isolated(
    source: &dyn DataSource,
    observer: &dyn AggregationObserver,
    post_id: PostId,
) -> Result<Vec<Comment>, RecoverableItemError> {
    let resource = Resource::Comments(post_id);

    observe(observer, resource, source.fetch_comments(post_id))
        .await
        .map_err(|err| {
            let error = RecoverableItemError::new(post_id, err);
            observer.on_event(&AggregationEvent::ItemRecovered {
                error: error.clone(),
            });
            error
        })
}

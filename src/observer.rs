//! Lifecycle hooks for aggregation runs.
//!
//! Aggregators never log directly. They emit [`AggregationEvent`]s to an
//! injected [`AggregationObserver`]; [`TracingObserver`] forwards them to
//! `tracing`, [`NoopObserver`] drops them.

use crate::aggregate::Strategy;
use crate::error::{AggregateError, FetchError, RecoverableItemError};
use crate::models::UserId;
use crate::source::Resource;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Something that happened during an aggregation run.
#[derive(Debug, Clone, PartialEq)]
pub enum AggregationEvent {
    RunStarted {
        strategy: Strategy,
        user_id: UserId,
    },
    FetchStarted {
        resource: Resource,
    },
    FetchSucceeded {
        resource: Resource,
        /// Number of items returned (1 for a profile).
        items: usize,
    },
    FetchFailed {
        error: FetchError,
    },
    ItemRecovered {
        error: RecoverableItemError,
    },
    RunFailed {
        strategy: Strategy,
        resource: Resource,
        message: String,
    },
    BatchComplete {
        strategy: Strategy,
        posts: usize,
        recovered: usize,
        elapsed: Duration,
    },
}

impl AggregationEvent {
    pub(crate) fn run_failed(strategy: Strategy, err: &AggregateError) -> Self {
        AggregationEvent::RunFailed {
            strategy,
            resource: err.resource(),
            message: err.to_string(),
        }
    }
}

/// Receives lifecycle events from an aggregator.
///
/// Implementations must be `Send + Sync`: events may arrive from spawned
/// fetch tasks.
pub trait AggregationObserver: Send + Sync {
    fn on_event(&self, event: &AggregationEvent);
}

/// Discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl AggregationObserver for NoopObserver {
    #[inline]
    fn on_event(&self, _event: &AggregationEvent) {}
}

/// Forwards events to the `tracing` ecosystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl AggregationObserver for TracingObserver {
    fn on_event(&self, event: &AggregationEvent) {
        match event {
            AggregationEvent::RunStarted { strategy, user_id } => {
                info!("Starting {} fetch for user {}", strategy, user_id)
            }
            AggregationEvent::FetchStarted { resource } => debug!("Fetching {}", resource),
            AggregationEvent::FetchSucceeded {
                resource: resource @ Resource::Comments(_),
                items,
            } => debug!("Retrieved {} ({} items)", resource, items),
            AggregationEvent::FetchSucceeded { resource, items } => {
                info!("Retrieved {} ({} items)", resource, items)
            }
            // Comment failures are reported once, as a recovery.
            AggregationEvent::FetchFailed {
                error: FetchError::Comments { .. },
            } => {}
            AggregationEvent::FetchFailed { error } => error!("{}", error),
            AggregationEvent::ItemRecovered { error } => warn!("{}", error),
            AggregationEvent::RunFailed {
                strategy, message, ..
            } => error!("Error in {} fetch: {}", strategy, message),
            AggregationEvent::BatchComplete {
                strategy,
                posts,
                recovered,
                elapsed,
            } => info!(
                "{} fetch took {}ms ({} posts, {} without comments)",
                strategy,
                elapsed.as_millis(),
                posts,
                recovered
            ),
        }
    }
}

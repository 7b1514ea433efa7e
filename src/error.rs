//! Error taxonomy for aggregation runs.
//!
//! A failed profile or posts fetch is fatal and surfaces as
//! [`AggregateError`]. A failed comments fetch is recoverable: it becomes a
//! [`RecoverableItemError`] that is reported to the observer and absorbed.

use crate::models::{PostId, UserId};
use crate::source::Resource;
use thiserror::Error;

/// The outcome of a single data-source call.
pub type FetchOutcome<T> = Result<T, FetchError>;

/// A single data-source call failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("Unable to load user profile for user {user_id}: {reason}")]
    Profile { user_id: UserId, reason: String },

    #[error("Unable to load posts for user {user_id}: {reason}")]
    Posts { user_id: UserId, reason: String },

    #[error("Could not load comments for post {post_id}: {reason}")]
    Comments { post_id: PostId, reason: String },
}

impl FetchError {
    /// The resource this failure belongs to.
    pub fn resource(&self) -> Resource {
        match self {
            FetchError::Profile { user_id, .. } => Resource::Profile(*user_id),
            FetchError::Posts { user_id, .. } => Resource::Posts(*user_id),
            FetchError::Comments { post_id, .. } => Resource::Comments(*post_id),
        }
    }
}

/// The aggregation could not produce a result at all.
#[derive(Debug, Error)]
pub enum AggregateError {
    /// The profile or posts fetch failed.
    #[error("fatal dependency failure: {0}")]
    FatalDependency(#[from] FetchError),

    /// A spawned fetch task ended without producing an outcome.
    #[error("fetch task for {resource} did not complete: {reason}")]
    TaskAborted { resource: Resource, reason: String },
}

impl AggregateError {
    /// The resource whose failure stopped the aggregation.
    pub fn resource(&self) -> Resource {
        match self {
            AggregateError::FatalDependency(err) => err.resource(),
            AggregateError::TaskAborted { resource, .. } => *resource,
        }
    }
}

/// A comments fetch failed and the post was degraded to zero comments.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("comments for post {post_id} replaced with an empty list: {source}")]
pub struct RecoverableItemError {
    pub post_id: PostId,
    #[source]
    pub source: FetchError,
}

impl RecoverableItemError {
    pub fn new(post_id: PostId, source: FetchError) -> Self {
        Self { post_id, source }
    }
}

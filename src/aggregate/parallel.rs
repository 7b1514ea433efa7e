//! Concurrent aggregation.
//!
//! Profile and posts are fetched on spawned tasks and joined fail-fast: the
//! first failure ends the run, and the sibling task is detached rather than
//! cancelled, so it still runs to completion. Comments for every post are
//! then fetched at once and each failure is absorbed on its own.

use crate::aggregate::{
    assemble, fetch_comments_isolated, observe, timed, AggregateRun, Aggregator, Collected,
    Strategy,
};
use crate::error::{AggregateError, FetchOutcome};
use crate::models::{Comment, Post, PostId, UserId};
use crate::observer::AggregationObserver;
use crate::source::{DataSource, Resource};
use async_trait::async_trait;
use futures::future::join_all;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::task::JoinHandle;

pub struct ParallelAggregator {
    source: Arc<dyn DataSource>,
    observer: Arc<dyn AggregationObserver>,
}

impl ParallelAggregator {
    pub fn new(source: Arc<dyn DataSource>, observer: Arc<dyn AggregationObserver>) -> Self {
        Self { source, observer }
    }

    async fn collect(&self, user_id: UserId) -> Result<Collected, AggregateError> {
        let profile_task = {
            let source = Arc::clone(&self.source);
            let observer = Arc::clone(&self.observer);
            tokio::spawn(async move {
                observe(
                    observer.as_ref(),
                    Resource::Profile(user_id),
                    source.fetch_profile(user_id),
                )
                .await
            })
        };

        let posts_task = {
            let source = Arc::clone(&self.source);
            let observer = Arc::clone(&self.observer);
            tokio::spawn(async move {
                observe(
                    observer.as_ref(),
                    Resource::Posts(user_id),
                    source.fetch_posts(user_id),
                )
                .await
            })
        };

        let (user, posts) = tokio::try_join!(
            settle(profile_task, Resource::Profile(user_id)),
            settle(posts_task, Resource::Posts(user_id))
        )?;

        let (comments_by_post, recovered) =
            fan_out_comments(self.source.as_ref(), self.observer.as_ref(), &posts).await;

        Ok(Collected {
            result: assemble(user, posts, comments_by_post),
            recovered,
        })
    }
}

/// Await a spawned fetch. Dropping the returned future detaches the task.
async fn settle<T>(
    task: JoinHandle<FetchOutcome<T>>,
    resource: Resource,
) -> Result<T, AggregateError> {
    match task.await {
        Ok(outcome) => outcome.map_err(AggregateError::from),
        Err(err) => Err(AggregateError::TaskAborted {
            resource,
            reason: err.to_string(),
        }),
    }
}

/// Fetch comments for every post at once and key the outcomes by post id.
///
/// Outcomes are matched to posts by position, never by completion order.
/// Returns the comments map and the number of posts that were emptied.
pub(crate) async fn fan_out_comments(
    source: &dyn DataSource,
    observer: &dyn AggregationObserver,
    posts: &[Post],
) -> (HashMap<PostId, Vec<Comment>>, usize) {
    let fetches = posts
        .iter()
        .map(|post| fetch_comments_isolated(source, observer, post.post_id));
    let outcomes = join_all(fetches).await;

    let mut recovered = 0;
    let comments_by_post = posts
        .iter()
        .zip(outcomes)
        .map(|(post, outcome)| {
            let comments = outcome.unwrap_or_else(|_| {
                recovered += 1;
                Vec::new()
            });
            (post.post_id, comments)
        })
        .collect();

    (comments_by_post, recovered)
}

#[async_trait]
impl Aggregator for ParallelAggregator {
    fn strategy(&self) -> Strategy {
        Strategy::Parallel
    }

    async fn run_timed(&self, user_id: UserId) -> Result<AggregateRun, AggregateError> {
        timed(
            self.strategy(),
            self.observer.as_ref(),
            user_id,
            self.collect(user_id),
        )
        .await
    }
}

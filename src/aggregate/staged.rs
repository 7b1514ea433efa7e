//! Profile, then posts, then all comments at once.
//!
//! Unlike [`ParallelAggregator`](crate::aggregate::ParallelAggregator), the
//! posts fetch is only issued after the profile arrived, so a missing
//! profile never costs a posts call.

use crate::aggregate::parallel::fan_out_comments;
use crate::aggregate::{assemble, observe, timed, AggregateRun, Aggregator, Collected, Strategy};
use crate::error::AggregateError;
use crate::models::UserId;
use crate::observer::AggregationObserver;
use crate::source::{DataSource, Resource};
use async_trait::async_trait;
use std::sync::Arc;

pub struct StagedAggregator {
    source: Arc<dyn DataSource>,
    observer: Arc<dyn AggregationObserver>,
}

impl StagedAggregator {
    pub fn new(source: Arc<dyn DataSource>, observer: Arc<dyn AggregationObserver>) -> Self {
        Self { source, observer }
    }

    async fn collect(&self, user_id: UserId) -> Result<Collected, AggregateError> {
        let source = self.source.as_ref();
        let observer = self.observer.as_ref();

        let user = observe(
            observer,
            Resource::Profile(user_id),
            source.fetch_profile(user_id),
        )
        .await?;
        let posts = observe(observer, Resource::Posts(user_id), source.fetch_posts(user_id)).await?;

        let (comments_by_post, recovered) = fan_out_comments(source, observer, &posts).await;

        Ok(Collected {
            result: assemble(user, posts, comments_by_post),
            recovered,
        })
    }
}

#[async_trait]
impl Aggregator for StagedAggregator {
    fn strategy(&self) -> Strategy {
        Strategy::Staged
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

//! One fetch at a time: profile, posts, then each post's comments in order.

use crate::aggregate::{
    assemble, fetch_comments_isolated, observe, timed, AggregateRun, Aggregator, Collected,
    Strategy,
};
use crate::error::AggregateError;
use crate::models::UserId;
use crate::observer::AggregationObserver;
use crate::source::{DataSource, Resource};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;

pub struct SequentialAggregator {
    source: Arc<dyn DataSource>,
    observer: Arc<dyn AggregationObserver>,
}

impl SequentialAggregator {
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

        // The next comments fetch starts only once the previous one settled.
        let mut comments_by_post = HashMap::with_capacity(posts.len());
        let mut recovered = 0;
        for post in &posts {
            let comments = match fetch_comments_isolated(source, observer, post.post_id).await {
                Ok(comments) => comments,
                Err(_) => {
                    recovered += 1;
                    Vec::new()
                }
            };
            comments_by_post.insert(post.post_id, comments);
        }

        Ok(Collected {
            result: assemble(user, posts, comments_by_post),
            recovered,
        })
    }
}

#[async_trait]
impl Aggregator for SequentialAggregator {
    fn strategy(&self) -> Strategy {
        Strategy::Sequential
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observer::NoopObserver;
    use crate::source::{CountingSource, FailurePlan};
    use crate::testing::{fixture_source, RecordingObserver, ScriptedSource};
    use std::time::Duration;
    use tokio_test::{assert_err, assert_ok};

    fn aggregator(
        plan: FailurePlan,
    ) -> (
        SequentialAggregator,
        Arc<CountingSource<crate::source::SimulatedSource>>,
        Arc<RecordingObserver>,
    ) {
        let source = Arc::new(CountingSource::new(fixture_source(plan)));
        let observer = Arc::new(RecordingObserver::default());
        let aggregator = SequentialAggregator::new(source.clone(), observer.clone());
        (aggregator, source, observer)
    }

    #[tokio::test(start_paused = true)]
    async fn test_full_result() {
        let (aggregator, source, _) = aggregator(FailurePlan::none());

        let result = assert_ok!(aggregator.run(1).await);

        let user = result.user.as_ref().map(|u| u.name.as_str());
        assert_eq!(user, Some("Misha Azaranka"));
        assert_eq!(result.posts.len(), 3);
        assert!(result.posts.iter().all(|p| p.comments.len() == 3));
        assert_eq!(source.stats().comments_calls, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_elapsed_is_sum_of_latencies() {
        let (aggregator, _, _) = aggregator(FailurePlan::none());

        let run = assert_ok!(aggregator.run_timed(1).await);

        // 1000 + 1500 + 3 * 2000
        assert!(run.elapsed >= Duration::from_millis(8500));
        assert!(run.elapsed < Duration::from_millis(8600));
        assert_eq!(run.recovered, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_comment_fetches_never_overlap() {
        let (aggregator, source, _) = aggregator(FailurePlan::none());

        assert_ok!(aggregator.run(1).await);

        assert_eq!(source.stats().peak_comments_in_flight, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_profile_failure_stops_everything() {
        let (aggregator, source, observer) = aggregator(FailurePlan::none().fail_profile());

        let err = assert_err!(aggregator.run(1).await);

        assert!(matches!(err, AggregateError::FatalDependency(_)));
        assert_eq!(err.resource(), Resource::Profile(1));
        let stats = source.stats();
        assert_eq!(stats.profile_calls, 1);
        assert_eq!(stats.posts_calls, 0);
        assert_eq!(stats.comments_calls, 0);
        assert!(observer.saw_run_failed());
    }

    #[tokio::test(start_paused = true)]
    async fn test_posts_failure_stops_before_comments() {
        let (aggregator, source, _) = aggregator(FailurePlan::none().fail_posts());

        let err = assert_err!(aggregator.run(1).await);

        assert_eq!(err.resource(), Resource::Posts(1));
        assert_eq!(source.stats().posts_calls, 1);
        assert_eq!(source.stats().comments_calls, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_comments_degrade_to_empty() {
        let (aggregator, source, observer) =
            aggregator(FailurePlan::none().fail_comments_for(2));

        let run = assert_ok!(aggregator.run_timed(1).await);
        let result = run.result;

        assert_eq!(result.posts.len(), 3);
        assert_eq!(result.posts[0].comments.len(), 3);
        assert_eq!(result.posts[1].comments.len(), 0);
        assert_eq!(result.posts[2].comments.len(), 3);
        assert_eq!(run.recovered, 1);
        assert_eq!(source.stats().comments_calls, 3);
        assert_eq!(observer.recovered_posts(), vec![2]);
        assert!(observer.saw_batch_complete());
    }

    #[tokio::test(start_paused = true)]
    async fn test_all_comments_failing_keeps_posts() {
        let (aggregator, _, _) = aggregator(FailurePlan::none().fail_all_comments());

        let result = assert_ok!(aggregator.run(1).await);

        assert_eq!(result.posts.len(), 3);
        assert!(result.posts.iter().all(|p| p.comments.is_empty()));
    }

    #[tokio::test(start_paused = true)]
    async fn test_comments_fetched_in_post_order() {
        let source = Arc::new(ScriptedSource::new(&[(5, 300), (9, 10), (7, 100)]));
        let observer = Arc::new(RecordingObserver::default());
        let aggregator = SequentialAggregator::new(source.clone(), observer.clone());

        let result = assert_ok!(aggregator.run(1).await);

        let ids: Vec<_> = result.posts.iter().map(|p| p.post_id).collect();
        assert_eq!(ids, vec![5, 9, 7]);
        assert_eq!(observer.comment_fetch_order(), vec![5, 9, 7]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_noop_observer() {
        let aggregator =
            SequentialAggregator::new(Arc::new(fixture_source(FailurePlan::none())), Arc::new(NoopObserver));
        assert_ok!(aggregator.run(1).await);
    }
}

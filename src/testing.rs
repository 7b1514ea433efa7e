//! Shared fixtures for unit tests.

use crate::error::{FetchError, FetchOutcome};
use crate::models::{Comment, Post, PostId, UserId, UserProfile};
use crate::observer::{AggregationEvent, AggregationObserver};
use crate::source::{DataSource, FailurePlan, Resource, SimulatedSource, SourceLatency};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

/// The simulated source with its default latencies and the given failures.
pub fn fixture_source(plan: FailurePlan) -> SimulatedSource {
    SimulatedSource::new(SourceLatency::default(), plan)
}

/// Keeps every event it receives.
#[derive(Debug, Default)]
pub struct RecordingObserver {
    events: Mutex<Vec<AggregationEvent>>,
}

impl RecordingObserver {
    pub fn events(&self) -> Vec<AggregationEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn recovered_posts(&self) -> Vec<PostId> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                AggregationEvent::ItemRecovered { error } => Some(error.post_id),
                _ => None,
            })
            .collect()
    }

    /// Post ids in the order their comments fetch started.
    pub fn comment_fetch_order(&self) -> Vec<PostId> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                AggregationEvent::FetchStarted {
                    resource: Resource::Comments(id),
                } => Some(id),
                _ => None,
            })
            .collect()
    }

    /// Post ids in the order their comments fetch settled.
    pub fn comment_completion_order(&self) -> Vec<PostId> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                AggregationEvent::FetchSucceeded {
                    resource: Resource::Comments(id),
                    ..
                } => Some(id),
                AggregationEvent::FetchFailed {
                    error: FetchError::Comments { post_id, .. },
                } => Some(post_id),
                _ => None,
            })
            .collect()
    }

    pub fn saw_fetch_succeeded(&self, resource: Resource) -> bool {
        self.events().iter().any(|event| {
            matches!(event, AggregationEvent::FetchSucceeded { resource: r, .. } if *r == resource)
        })
    }

    pub fn saw_run_failed(&self) -> bool {
        self.events()
            .iter()
            .any(|event| matches!(event, AggregationEvent::RunFailed { .. }))
    }

    pub fn saw_batch_complete(&self) -> bool {
        self.events()
            .iter()
            .any(|event| matches!(event, AggregationEvent::BatchComplete { .. }))
    }
}

impl AggregationObserver for RecordingObserver {
    fn on_event(&self, event: &AggregationEvent) {
        self.events.lock().unwrap().push(event.clone());
    }
}

/// A source whose posts and per-post comment delays are given up front.
#[derive(Debug)]
pub struct ScriptedSource {
    posts: Vec<PostId>,
    comment_delays: HashMap<PostId, Duration>,
}

impl ScriptedSource {
    /// `posts` lists `(post_id, comments delay in ms)` in display order.
    pub fn new(posts: &[(PostId, u64)]) -> Self {
        Self {
            posts: posts.iter().map(|(id, _)| *id).collect(),
            comment_delays: posts
                .iter()
                .map(|(id, ms)| (*id, Duration::from_millis(*ms)))
                .collect(),
        }
    }
}

#[async_trait]
impl DataSource for ScriptedSource {
    async fn fetch_profile(&self, user_id: UserId) -> FetchOutcome<UserProfile> {
        tokio::time::sleep(Duration::from_millis(10)).await;
        Ok(UserProfile {
            id: user_id,
            name: "Scripted".to_string(),
            email: "scripted@example.com".to_string(),
            username: "scripted".to_string(),
        })
    }

    async fn fetch_posts(&self, user_id: UserId) -> FetchOutcome<Vec<Post>> {
        tokio::time::sleep(Duration::from_millis(10)).await;
        Ok(self
            .posts
            .iter()
            .map(|id| Post::new(*id, user_id, format!("Post {}", id), "body"))
            .collect())
    }

    async fn fetch_comments(&self, post_id: PostId) -> FetchOutcome<Vec<Comment>> {
        let delay = self
            .comment_delays
            .get(&post_id)
            .copied()
            .unwrap_or_default();
        tokio::time::sleep(delay).await;

        Ok(vec![Comment {
            comment_id: 1,
            post_id,
            username: "scripted".to_string(),
            comment: format!("comment on {}", post_id),
        }])
    }
}

/// A source whose profile fetch panics. Posts and comments succeed.
#[derive(Debug, Default)]
pub struct PanickingSource;

#[async_trait]
impl DataSource for PanickingSource {
    async fn fetch_profile(&self, user_id: UserId) -> FetchOutcome<UserProfile> {
        panic!("profile provider crashed for user {}", user_id);
    }

    async fn fetch_posts(&self, user_id: UserId) -> FetchOutcome<Vec<Post>> {
        tokio::time::sleep(Duration::from_millis(10)).await;
        Ok(vec![Post::new(1, user_id, "Post 1", "body")])
    }

    async fn fetch_comments(&self, _post_id: PostId) -> FetchOutcome<Vec<Comment>> {
        Ok(Vec::new())
    }
}

//! Simulated data source.
//!
//! Serves a fixed profile, three posts and three comments per post after a
//! configurable delay. Any resource can be told to fail.

use crate::config::SourceConfig;
use crate::error::{FetchError, FetchOutcome};
use crate::models::{Comment, Post, PostId, UserId, UserProfile};
use crate::source::DataSource;
use async_trait::async_trait;
use std::collections::HashSet;
use std::time::Duration;
use tracing::debug;

/// Per-resource response delay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceLatency {
    pub profile: Duration,
    pub posts: Duration,
    pub comments: Duration,
}

impl Default for SourceLatency {
    fn default() -> Self {
        Self {
            profile: Duration::from_millis(1000),
            posts: Duration::from_millis(1500),
            comments: Duration::from_millis(2000),
        }
    }
}

impl From<&SourceConfig> for SourceLatency {
    fn from(config: &SourceConfig) -> Self {
        Self {
            profile: Duration::from_millis(config.profile_delay_ms),
            posts: Duration::from_millis(config.posts_delay_ms),
            comments: Duration::from_millis(config.comments_delay_ms),
        }
    }
}

/// Which calls should fail.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FailurePlan {
    pub profile: bool,
    pub posts: bool,
    /// Posts whose comments fetch fails.
    pub comment_posts: HashSet<PostId>,
    /// Fail every comments fetch.
    pub all_comments: bool,
}

impl FailurePlan {
    /// A plan where nothing fails.
    pub fn none() -> Self {
        Self::default()
    }

    pub fn fail_profile(mut self) -> Self {
        self.profile = true;
        self
    }

    pub fn fail_posts(mut self) -> Self {
        self.posts = true;
        self
    }

    pub fn fail_comments_for(mut self, post_id: PostId) -> Self {
        self.comment_posts.insert(post_id);
        self
    }

    pub fn fail_all_comments(mut self) -> Self {
        self.all_comments = true;
        self
    }

    fn comments_fail(&self, post_id: PostId) -> bool {
        self.all_comments || self.comment_posts.contains(&post_id)
    }
}

/// A data source with canned content and simulated latency.
#[derive(Debug, Clone, Default)]
pub struct SimulatedSource {
    latency: SourceLatency,
    failures: FailurePlan,
}

impl SimulatedSource {
    pub fn new(latency: SourceLatency, failures: FailurePlan) -> Self {
        Self { latency, failures }
    }

    pub fn latency(&self) -> SourceLatency {
        self.latency
    }
}

#[async_trait]
impl DataSource for SimulatedSource {
    async fn fetch_profile(&self, user_id: UserId) -> FetchOutcome<UserProfile> {
        tokio::time::sleep(self.latency.profile).await;

        if self.failures.profile {
            debug!("Injected failure for profile of user {}", user_id);
            return Err(FetchError::Profile {
                user_id,
                reason: "injected failure".to_string(),
            });
        }

        Ok(UserProfile {
            id: user_id,
            name: "Misha Azaranka".to_string(),
            email: "misha.azaranka@gmail.com".to_string(),
            username: "mazaranka".to_string(),
        })
    }

    async fn fetch_posts(&self, user_id: UserId) -> FetchOutcome<Vec<Post>> {
        tokio::time::sleep(self.latency.posts).await;

        if self.failures.posts {
            debug!("Injected failure for posts of user {}", user_id);
            return Err(FetchError::Posts {
                user_id,
                reason: "injected failure".to_string(),
            });
        }

        Ok(vec![
            Post::new(1, user_id, "1st Post", "Basic Programming"),
            Post::new(2, user_id, "2nd Post", "Unity vs Unreal"),
            Post::new(
                3,
                user_id,
                "3rd Post",
                "Does Pineapple belong on a pizza? (Serious Question)",
            ),
        ])
    }

    async fn fetch_comments(&self, post_id: PostId) -> FetchOutcome<Vec<Comment>> {
        tokio::time::sleep(self.latency.comments).await;

        if self.failures.comments_fail(post_id) {
            debug!("Injected failure for comments of post {}", post_id);
            return Err(FetchError::Comments {
                post_id,
                reason: "injected failure".to_string(),
            });
        }

        let comment = |comment_id, username: &str, text: &str| Comment {
            comment_id,
            post_id,
            username: username.to_string(),
            comment: text.to_string(),
        };

        Ok(vec![
            comment(1, "Mike123", "Awesome post"),
            comment(2, "KiP", "meh"),
            comment(3, "metro2033", "Nah"),
        ])
    }
}

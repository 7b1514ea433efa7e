//! Data source contract.
//!
//! The aggregators only ever talk to the three independent providers
//! through [`DataSource`]. Each call is a single attempt; retries are not
//! the source's business.

pub mod counting;
pub mod simulated;

pub use counting::CountingSource;
pub use simulated::{FailurePlan, SimulatedSource, SourceLatency};

use crate::error::FetchOutcome;
use crate::models::{Comment, Post, PostId, UserId, UserProfile};
use async_trait::async_trait;
use std::fmt;

/// Which data-source resource a call or failure refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resource {
    Profile(UserId),
    Posts(UserId),
    Comments(PostId),
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Resource::Profile(id) => write!(f, "profile of user {}", id),
            Resource::Posts(id) => write!(f, "posts of user {}", id),
            Resource::Comments(id) => write!(f, "comments of post {}", id),
        }
    }
}

/// Three independent asynchronous providers.
#[async_trait]
pub trait DataSource: Send + Sync {
    /// Fetch the profile of a user.
    async fn fetch_profile(&self, user_id: UserId) -> FetchOutcome<UserProfile>;

    /// Fetch a user's posts, in display order, with empty `comments`.
    async fn fetch_posts(&self, user_id: UserId) -> FetchOutcome<Vec<Post>>;

    /// Fetch the comments of one post.
    async fn fetch_comments(&self, post_id: PostId) -> FetchOutcome<Vec<Comment>>;
}

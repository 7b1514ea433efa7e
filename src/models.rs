//! Data models for the aggregation.
//!
//! Field names serialize in camelCase so JSON output matches the shape the
//! data sources speak (`postId`, `commentId`, ...).

use serde::{Deserialize, Serialize};

/// Identifier of a user.
pub type UserId = u64;
/// Identifier of a post.
pub type PostId = u64;
/// Identifier of a comment.
pub type CommentId = u64;

/// A user's profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub username: String,
}

/// A single comment on a post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub comment_id: CommentId,
    pub post_id: PostId,
    pub username: String,
    pub comment: String,
}

/// A post written by a user.
///
/// `comments` is empty when the post comes out of a data source and is
/// filled in during assembly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub post_id: PostId,
    pub user_id: UserId,
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub comments: Vec<Comment>,
}

impl Post {
    /// Creates a post with no comments attached yet.
    pub fn new(
        post_id: PostId,
        user_id: UserId,
        title: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            post_id,
            user_id,
            title: title.into(),
            content: content.into(),
            comments: Vec::new(),
        }
    }
}

/// The composite result of one aggregation run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregateResult {
    /// The profile; absent only in the "unable to load" placeholder.
    pub user: Option<UserProfile>,
    /// Posts in the order the posts source returned them.
    pub posts: Vec<Post>,
}

impl AggregateResult {
    /// Placeholder handed to presenters when the aggregation failed fatally.
    pub fn unavailable() -> Self {
        Self::default()
    }

    /// Total number of comments across all posts.
    pub fn comment_count(&self) -> usize {
        self.posts.iter().map(|p| p.comments.len()).sum()
    }
}

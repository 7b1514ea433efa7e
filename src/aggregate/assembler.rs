//! Merges fetched pieces into an [`AggregateResult`].

use crate::models::{AggregateResult, Comment, Post, PostId, UserProfile};
use std::collections::HashMap;

/// Attach each post's comments and wrap everything up with the user.
///
/// Post order is kept as given. A post with no entry in `comments_by_post`
/// gets an empty comment list.
pub fn assemble(
    user: UserProfile,
    posts: Vec<Post>,
    comments_by_post: HashMap<PostId, Vec<Comment>>,
) -> AggregateResult {
    let posts = posts
        .into_iter()
        .map(|mut post| {
            post.comments = comments_by_post
                .get(&post.post_id)
                .cloned()
                .unwrap_or_default();
            post
        })
        .collect();

    AggregateResult {
        user: Some(user),
        posts,
    }
}

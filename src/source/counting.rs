//! Call-counting decorator for any [`DataSource`].

use crate::error::FetchOutcome;
use crate::models::{Comment, Post, PostId, UserId, UserProfile};
use crate::source::DataSource;
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Snapshot of the calls a [`CountingSource`] has seen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CallStats {
    pub profile_calls: usize,
    pub posts_calls: usize,
    pub comments_calls: usize,
    /// Highest number of comments fetches in flight at the same time.
    pub peak_comments_in_flight: usize,
}

impl CallStats {
    pub fn total_calls(&self) -> usize {
        self.profile_calls + self.posts_calls + self.comments_calls
    }
}

/// Wraps a data source and records every call made through it.
#[derive(Debug)]
pub struct CountingSource<S> {
    inner: S,
    profile_calls: AtomicUsize,
    posts_calls: AtomicUsize,
    comments_calls: AtomicUsize,
    comments_in_flight: AtomicUsize,
    peak_comments_in_flight: AtomicUsize,
}

impl<S: DataSource> CountingSource<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            profile_calls: AtomicUsize::new(0),
            posts_calls: AtomicUsize::new(0),
            comments_calls: AtomicUsize::new(0),
            comments_in_flight: AtomicUsize::new(0),
            peak_comments_in_flight: AtomicUsize::new(0),
        }
    }

    pub fn stats(&self) -> CallStats {
        CallStats {
            profile_calls: self.profile_calls.load(Ordering::SeqCst),
            posts_calls: self.posts_calls.load(Ordering::SeqCst),
            comments_calls: self.comments_calls.load(Ordering::SeqCst),
            peak_comments_in_flight: self.peak_comments_in_flight.load(Ordering::SeqCst),
        }
    }
}

/// Decrements the in-flight counter even if the fetch future is dropped.
struct InFlight<'a>(&'a AtomicUsize);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl<S: DataSource> DataSource for CountingSource<S> {
    async fn fetch_profile(&self, user_id: UserId) -> FetchOutcome<UserProfile> {
        self.profile_calls.fetch_add(1, Ordering::SeqCst);
        self.inner.fetch_profile(user_id).await
    }

    async fn fetch_posts(&self, user_id: UserId) -> FetchOutcome<Vec<Post>> {
        self.posts_calls.fetch_add(1, Ordering::SeqCst);
        self.inner.fetch_posts(user_id).await
    }

    async fn fetch_comments(&self, post_id: PostId) -> FetchOutcome<Vec<Comment>> {
        self.comments_calls.fetch_add(1, Ordering::SeqCst);

        let now = self.comments_in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_comments_in_flight.fetch_max(now, Ordering::SeqCst);
        let _guard = InFlight(&self.comments_in_flight);

        self.inner.fetch_comments(post_id).await
    }
}

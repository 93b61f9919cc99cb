//! Post drafts, scheduling, and publishing

mod types;

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::error::Error;
use crate::http::Http;

pub use types::*;

/// Client for the post endpoints
pub struct PostsClient {
    http: Arc<Http>,
}

impl PostsClient {
    pub(crate) fn new(http: Arc<Http>) -> Self {
        Self { http }
    }

    /// List posts, optionally filtered by lifecycle state
    pub async fn list(&self, status: Option<PostStatus>) -> Result<Vec<Post>, Error> {
        let mut request = self.http.get("/posts");
        if let Some(status) = status {
            request = request.query("status", status.as_str());
        }
        request.execute().await
    }

    /// Fetch a single post
    pub async fn get(&self, id: &str) -> Result<Post, Error> {
        self.http.get(&format!("/posts/{}", id)).execute().await
    }

    /// Create a draft
    pub async fn create(&self, post: &NewPost) -> Result<Post, Error> {
        self.http.post("/posts").json(post)?.execute().await
    }

    /// Update a draft's content or attachments
    pub async fn update(&self, id: &str, update: &PostUpdate) -> Result<Post, Error> {
        self.http
            .put(&format!("/posts/{}", id))
            .json(update)?
            .execute()
            .await
    }

    /// Delete a post
    pub async fn delete(&self, id: &str) -> Result<(), Error> {
        self.http
            .delete(&format!("/posts/{}", id))
            .execute_empty()
            .await
    }

    /// Put a post on the calendar at the given time
    pub async fn schedule(&self, id: &str, at: DateTime<Utc>) -> Result<Post, Error> {
        let body = serde_json::json!({ "scheduled_at": at.to_rfc3339() });
        self.http
            .post(&format!("/posts/{}/schedule", id))
            .json(&body)?
            .execute()
            .await
    }

    /// Take a post off the calendar, returning it to draft
    pub async fn unschedule(&self, id: &str) -> Result<Post, Error> {
        self.http
            .post(&format!("/posts/{}/unschedule", id))
            .execute()
            .await
    }

    /// Publish a post immediately through the connected account
    pub async fn publish(&self, id: &str) -> Result<Post, Error> {
        self.http
            .post(&format!("/posts/{}/publish", id))
            .execute()
            .await
    }
}

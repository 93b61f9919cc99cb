//! The idea bank: rough topics kept for later drafting

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::http::Http;
use crate::posts::Post;

/// A saved idea
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Idea {
    /// The idea ID
    pub id: String,

    /// Short title
    pub title: String,

    /// Free-form notes
    pub notes: Option<String>,

    /// Tags used to group ideas
    #[serde(default)]
    pub tags: Vec<String>,

    /// The creation time
    pub created_at: DateTime<Utc>,

    /// The update time
    pub updated_at: DateTime<Utc>,
}

/// Payload for saving a new idea
#[derive(Debug, Clone, Serialize)]
pub struct NewIdea {
    /// Short title
    pub title: String,

    /// Free-form notes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,

    /// Tags used to group ideas
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

impl NewIdea {
    /// An idea with just a title
    pub fn new(title: &str) -> Self {
        Self {
            title: title.to_string(),
            notes: None,
            tags: Vec::new(),
        }
    }
}

/// Idea attributes that can be updated
#[derive(Debug, Clone, Default, Serialize)]
pub struct IdeaUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
}

/// Client for the idea bank endpoints
pub struct IdeasClient {
    http: Arc<Http>,
}

impl IdeasClient {
    pub(crate) fn new(http: Arc<Http>) -> Self {
        Self { http }
    }

    /// List all saved ideas
    pub async fn list(&self) -> Result<Vec<Idea>, Error> {
        self.http.get("/ideas").execute().await
    }

    /// Save a new idea
    pub async fn create(&self, idea: &NewIdea) -> Result<Idea, Error> {
        self.http.post("/ideas").json(idea)?.execute().await
    }

    /// Update a saved idea
    pub async fn update(&self, id: &str, update: &IdeaUpdate) -> Result<Idea, Error> {
        self.http
            .put(&format!("/ideas/{}", id))
            .json(update)?
            .execute()
            .await
    }

    /// Remove an idea from the bank
    pub async fn delete(&self, id: &str) -> Result<(), Error> {
        self.http
            .delete(&format!("/ideas/{}", id))
            .execute_empty()
            .await
    }

    /// Turn an idea into a post draft. The idea stays in the bank; the new
    /// draft records it as its source.
    pub async fn promote(&self, id: &str) -> Result<Post, Error> {
        self.http
            .post(&format!("/ideas/{}/promote", id))
            .execute()
            .await
    }
}

//! Wire types for posts

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle state of a post
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostStatus {
    /// Editable, not yet on the calendar
    Draft,
    /// On the calendar, awaiting its publish time
    Scheduled,
    /// Delivered to the connected social account
    Published,
    /// The backend attempted to publish and gave up
    Failed,
}

impl PostStatus {
    pub(crate) fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Scheduled => "scheduled",
            Self::Published => "published",
            Self::Failed => "failed",
        }
    }
}

/// A post draft, scheduled post, or published post
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    /// The post ID
    pub id: String,

    /// The post body
    pub content: String,

    /// Lifecycle state
    pub status: PostStatus,

    /// Publish time, set while the post is scheduled
    pub scheduled_at: Option<DateTime<Utc>>,

    /// Actual publish time, set once published
    pub published_at: Option<DateTime<Utc>>,

    /// Attached media asset IDs
    #[serde(default)]
    pub media_ids: Vec<String>,

    /// The idea this post was promoted from, if any
    pub source_idea_id: Option<String>,

    /// The creation time
    pub created_at: DateTime<Utc>,

    /// The update time
    pub updated_at: DateTime<Utc>,
}

/// Payload for creating a draft
#[derive(Debug, Clone, Serialize)]
pub struct NewPost {
    /// The post body
    pub content: String,

    /// Attached media asset IDs
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub media_ids: Vec<String>,

    /// The idea this draft came from, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_idea_id: Option<String>,
}

impl NewPost {
    /// A draft with just a body
    pub fn new(content: &str) -> Self {
        Self {
            content: content.to_string(),
            media_ids: Vec::new(),
            source_idea_id: None,
        }
    }
}

/// Post attributes that can be updated
#[derive(Debug, Clone, Default, Serialize)]
pub struct PostUpdate {
    /// The post body
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,

    /// Attached media asset IDs
    #[serde(skip_serializing_if = "Option::is_none")]
    pub media_ids: Option<Vec<String>>,
}

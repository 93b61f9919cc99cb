//! Media assets attached to posts

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::http::Http;

/// An uploaded media asset
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaAsset {
    /// The asset ID, referenced from posts
    pub id: String,

    /// Original file name
    pub file_name: String,

    /// MIME type
    pub content_type: String,

    /// URL the asset is served from
    pub url: String,

    /// Size in bytes
    pub size_bytes: Option<u64>,

    /// The upload time
    pub created_at: DateTime<Utc>,
}

/// Client for the media endpoints
pub struct MediaClient {
    http: Arc<Http>,
}

impl MediaClient {
    pub(crate) fn new(http: Arc<Http>) -> Self {
        Self { http }
    }

    /// Upload a file as a multipart form. Unlike the JSON endpoints, the
    /// request carries the multipart boundary content type.
    pub async fn upload(
        &self,
        file_name: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<MediaAsset, Error> {
        self.http
            .post("/media")
            .file("file", file_name, content_type, bytes)
            .execute()
            .await
    }

    /// Delete an uploaded asset
    pub async fn delete(&self, id: &str) -> Result<(), Error> {
        self.http
            .delete(&format!("/media/{}", id))
            .execute_empty()
            .await
    }
}

//! Connected social accounts

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::http::Http;

/// A connected social account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SocialConnection {
    /// Provider identifier, e.g. `linkedin`
    pub provider: String,

    /// Display name of the connected account
    pub account_name: String,

    /// When the account was connected
    pub connected_at: DateTime<Utc>,

    /// When the provider-side grant expires, if the provider reports one
    pub expires_at: Option<DateTime<Utc>>,
}

/// Client for the social connection endpoints
pub struct SocialClient {
    http: Arc<Http>,
}

impl SocialClient {
    pub(crate) fn new(http: Arc<Http>) -> Self {
        Self { http }
    }

    /// The LinkedIn connection, or `None` when no account is connected.
    /// Not being connected yet is an expected empty state, not an error.
    pub async fn linkedin(&self) -> Result<Option<SocialConnection>, Error> {
        match self
            .http
            .get("/social/linkedin")
            .execute::<SocialConnection>()
            .await
        {
            Ok(connection) => Ok(Some(connection)),
            Err(Error::Api { status: 404, .. }) => Ok(None),
            Err(err) => Err(err),
        }
    }

    /// Build the URL that starts the LinkedIn connection flow
    pub fn linkedin_connect_url(&self, redirect_to: Option<&str>) -> String {
        let mut url = self.http.api_url("/social/linkedin/connect");
        if let Some(redirect) = redirect_to {
            url.push_str(&format!("?redirect_to={}", urlencoding::encode(redirect)));
        }
        url
    }

    /// Disconnect the LinkedIn account
    pub async fn disconnect_linkedin(&self) -> Result<(), Error> {
        self.http.delete("/social/linkedin").execute_empty().await
    }
}

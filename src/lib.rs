//! Postline Rust Client Library
//!
//! A Rust client for the Postline content-scheduling API: authentication
//! with automatic single-flight token refresh, post drafting and
//! scheduling, the idea bank, media uploads, social account connections,
//! and the AI brainstorm assistant.

pub mod assistant;
pub mod auth;
pub mod config;
pub mod error;
pub mod ideas;
pub mod media;
pub mod posts;
pub mod schedule;
pub mod social;

mod http;

use std::sync::Arc;

use reqwest::Client;

use crate::assistant::AssistantClient;
use crate::auth::{Auth, TokenStore};
use crate::config::ClientOptions;
use crate::http::Http;
use crate::ideas::IdeasClient;
use crate::media::MediaClient;
use crate::posts::PostsClient;
use crate::schedule::ScheduleClient;
use crate::social::SocialClient;

/// The main entry point for the Postline client
///
/// Owns one HTTP connection pool and one token store; every sub-client
/// handed out shares both, so a token refreshed for one request is used by
/// all of them.
pub struct Postline {
    /// Shared request core
    http: Arc<Http>,

    /// Auth client for session and account operations
    auth: Auth,

    /// Client options
    options: ClientOptions,
}

impl Postline {
    /// Create a new client against the given base URL
    ///
    /// # Example
    ///
    /// ```
    /// use postline_client::Postline;
    ///
    /// let postline = Postline::new("https://api.postline.app");
    /// ```
    pub fn new(base_url: &str) -> Self {
        Self::new_with_options(base_url, ClientOptions::default())
    }

    /// Create a new client from the `POSTLINE_API_URL` environment
    /// variable, falling back to `http://localhost:8000`
    pub fn from_env() -> Self {
        Self::new(&config::base_url_from_env())
    }

    /// Create a new client with custom options
    ///
    /// # Example
    ///
    /// ```
    /// use postline_client::{config::ClientOptions, Postline};
    ///
    /// let options = ClientOptions::default().with_auto_refresh_token(false);
    /// let postline = Postline::new_with_options("https://api.postline.app", options);
    /// ```
    pub fn new_with_options(base_url: &str, options: ClientOptions) -> Self {
        let mut builder = Client::builder();
        if let Some(timeout) = options.request_timeout {
            builder = builder.timeout(timeout);
        }
        let http_client = builder.build().expect("failed to build HTTP client");

        let tokens = Arc::new(TokenStore::new());
        let http = Arc::new(Http::new(
            http_client,
            base_url,
            tokens.clone(),
            options.clone(),
        ));
        let auth = Auth::new(http.clone(), tokens, options.clone());

        Self {
            http,
            auth,
            options,
        }
    }

    /// The auth client for session and account operations
    pub fn auth(&self) -> &Auth {
        &self.auth
    }

    /// Client for post drafts, scheduling, and publishing
    pub fn posts(&self) -> PostsClient {
        PostsClient::new(self.http.clone())
    }

    /// Client for the idea bank
    pub fn ideas(&self) -> IdeasClient {
        IdeasClient::new(self.http.clone())
    }

    /// Client for the calendar view of scheduled posts
    pub fn schedule(&self) -> ScheduleClient {
        ScheduleClient::new(self.http.clone())
    }

    /// Client for media uploads
    pub fn media(&self) -> MediaClient {
        MediaClient::new(self.http.clone())
    }

    /// Client for connected social accounts
    pub fn social(&self) -> SocialClient {
        SocialClient::new(self.http.clone())
    }

    /// Client for the AI brainstorm assistant
    pub fn assistant(&self) -> AssistantClient {
        AssistantClient::new(self.http.clone())
    }

    /// The options this client was built with
    pub fn options(&self) -> &ClientOptions {
        &self.options
    }
}

/// A convenience module for common imports
pub mod prelude {
    pub use crate::auth::{AuthResponse, Session, User};
    pub use crate::config::ClientOptions;
    pub use crate::error::Error;
    pub use crate::posts::{NewPost, Post, PostStatus};
    pub use crate::Postline;
}

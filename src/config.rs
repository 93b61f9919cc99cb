//! Configuration options for the Postline client

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Environment variable consulted for the API base URL
pub const API_URL_ENV: &str = "POSTLINE_API_URL";

/// Base URL used when neither an explicit URL nor the environment provides one
pub const DEFAULT_API_URL: &str = "http://localhost:8000";

/// Hook invoked when session recovery fails and the stored tokens have been
/// cleared. Postline's web app redirects to the login page here; embedders
/// decide what recovery means for them.
pub type SessionExpiredHook = Arc<dyn Fn() + Send + Sync>;

/// Configuration options for the Postline client
#[derive(Clone)]
pub struct ClientOptions {
    /// Whether to automatically refresh an expired access token
    pub auto_refresh_token: bool,

    /// Whether sign-in operations keep the returned session in the client
    pub persist_session: bool,

    /// The request timeout applied to the underlying HTTP client
    pub request_timeout: Option<Duration>,

    /// Invoked once per unrecoverable session failure
    pub(crate) on_session_expired: Option<SessionExpiredHook>,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            auto_refresh_token: true,
            persist_session: true,
            request_timeout: Some(Duration::from_secs(30)),
            on_session_expired: None,
        }
    }
}

impl ClientOptions {
    /// Set whether to automatically refresh the token
    pub fn with_auto_refresh_token(mut self, value: bool) -> Self {
        self.auto_refresh_token = value;
        self
    }

    /// Set whether to persist the session
    pub fn with_persist_session(mut self, value: bool) -> Self {
        self.persist_session = value;
        self
    }

    /// Set the request timeout
    pub fn with_request_timeout(mut self, value: Option<Duration>) -> Self {
        self.request_timeout = value;
        self
    }

    /// Set the hook invoked when the session cannot be recovered
    pub fn with_session_expired_hook<F>(mut self, hook: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.on_session_expired = Some(Arc::new(hook));
        self
    }
}

impl fmt::Debug for ClientOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientOptions")
            .field("auto_refresh_token", &self.auto_refresh_token)
            .field("persist_session", &self.persist_session)
            .field("request_timeout", &self.request_timeout)
            .field("on_session_expired", &self.on_session_expired.is_some())
            .finish()
    }
}

/// Resolve the API base URL from the environment, falling back to localhost.
pub fn base_url_from_env() -> String {
    std::env::var(API_URL_ENV).unwrap_or_else(|_| DEFAULT_API_URL.to_string())
}

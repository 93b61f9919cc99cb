//! Session token storage and expiry tracking

use std::sync::Mutex;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

/// Tokens within this many seconds of expiry are treated as already expired.
pub const EXPIRY_SKEW_SECS: i64 = 60;

/// A snapshot of the stored session tokens
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    /// Short-lived bearer credential attached to API requests
    pub access_token: String,

    /// Longer-lived credential exchanged for a new access token
    pub refresh_token: String,

    /// Absolute expiry of the access token, seconds since the Unix epoch
    pub expires_at: i64,
}

impl Session {
    /// Build a session from a token response, computing the absolute expiry
    /// from the server-reported lifetime.
    pub fn new(access_token: String, refresh_token: String, expires_in: i64) -> Self {
        Self {
            access_token,
            refresh_token,
            expires_at: unix_now() + expires_in,
        }
    }

    /// Whether the access token is expired, skew included
    pub fn is_expired(&self) -> bool {
        unix_now() >= self.expires_at - EXPIRY_SKEW_SECS
    }
}

/// Single source of truth for the token triple.
///
/// Holds no business logic: writes happen on sign-in, sign-up, refresh, and
/// OAuth exchange; the store is cleared on sign-out and on unrecoverable
/// refresh failure. All operations are synchronous; callers never hold the
/// lock across an await point.
#[derive(Debug, Default)]
pub(crate) struct TokenStore {
    inner: Mutex<Option<Session>>,
}

impl TokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// The stored access token, if any
    pub fn access_token(&self) -> Option<String> {
        let inner = self.inner.lock().unwrap();
        inner.as_ref().map(|s| s.access_token.clone())
    }

    /// The stored refresh token, if any
    pub fn refresh_token(&self) -> Option<String> {
        let inner = self.inner.lock().unwrap();
        inner.as_ref().map(|s| s.refresh_token.clone())
    }

    /// Store a fresh token pair, computing the absolute expiry
    pub fn set_tokens(&self, access_token: &str, refresh_token: &str, expires_in: i64) {
        let session = Session::new(access_token.to_string(), refresh_token.to_string(), expires_in);
        let mut inner = self.inner.lock().unwrap();
        *inner = Some(session);
    }

    /// Replace the stored session wholesale (used to seed persisted sessions)
    pub fn set_session(&self, session: Session) {
        let mut inner = self.inner.lock().unwrap();
        *inner = Some(session);
    }

    /// A snapshot of the current session, if any
    pub fn session(&self) -> Option<Session> {
        let inner = self.inner.lock().unwrap();
        inner.clone()
    }

    /// Remove all stored tokens
    pub fn clear(&self) {
        let mut inner = self.inner.lock().unwrap();
        *inner = None;
    }

    /// Whether the stored access token is expired, skew included.
    /// Returns false when nothing is stored; there is no token to refresh.
    pub fn is_expired(&self) -> bool {
        let inner = self.inner.lock().unwrap();
        inner.as_ref().map(|s| s.is_expired()).unwrap_or(false)
    }
}

fn unix_now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or(Duration::from_secs(0))
        .as_secs() as i64
}

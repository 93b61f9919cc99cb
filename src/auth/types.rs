//! Wire types for authentication and account management

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Response from the token refresh and OAuth exchange endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    /// The access token
    pub access_token: String,

    /// The refresh token
    pub refresh_token: String,

    /// The token type, always `bearer`
    pub token_type: String,

    /// Access token lifetime in seconds
    pub expires_in: i64,
}

/// Response from the sign-up and sign-in endpoints.
///
/// Tokens are absent when the account still awaits email verification;
/// the server then sets `pending_verification`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    /// The signed-in or newly created account
    pub user: User,

    /// The access token, when the account is verified
    pub access_token: Option<String>,

    /// The refresh token, when the account is verified
    pub refresh_token: Option<String>,

    /// The token type
    pub token_type: Option<String>,

    /// Access token lifetime in seconds
    pub expires_in: Option<i64>,

    /// Set when the account must verify its email before signing in
    #[serde(default)]
    pub pending_verification: bool,
}

/// A Postline account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// The account ID
    pub id: String,

    /// The account email address
    pub email: String,

    /// Display name
    pub full_name: Option<String>,

    /// Professional headline shown on generated posts
    pub headline: Option<String>,

    /// IANA timezone used for scheduling defaults
    pub timezone: Option<String>,

    /// Whether the email address has been verified
    #[serde(default)]
    pub email_verified: bool,

    /// The creation time
    pub created_at: DateTime<Utc>,

    /// The update time
    pub updated_at: DateTime<Utc>,
}

/// Account attributes that can be updated
#[derive(Debug, Default, Serialize)]
pub struct UserUpdate {
    /// Display name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,

    /// Professional headline
    #[serde(skip_serializing_if = "Option::is_none")]
    pub headline: Option<String>,

    /// IANA timezone
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,

    /// New password
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

/// OAuth providers supported for sign-in and account connection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OAuthProvider {
    Google,
    Linkedin,
}

impl OAuthProvider {
    pub(crate) fn as_str(&self) -> &'static str {
        match self {
            Self::Google => "google",
            Self::Linkedin => "linkedin",
        }
    }
}

//! Error handling for the Postline client

use std::fmt;

use serde_json::Value;
use thiserror::Error;

/// Unified error type for the Postline client
///
/// Responses are classified exactly once, at the HTTP boundary; callers
/// match on the variant instead of re-inspecting status codes or body
/// shapes.
#[derive(Error, Debug)]
pub enum Error {
    /// The request never completed; no HTTP status is available
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// JSON serialization or deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Authentication failures: 401/403 responses, failed token refresh,
    /// or operations that require a session when none is stored
    #[error("Authentication error: {0}")]
    Auth(String),

    /// 4xx responses carrying a structured `details` list
    #[error("Validation error: {0}")]
    Validation(String),

    /// Any other non-2xx response
    #[error("API error ({status}): {message}")]
    Api {
        /// HTTP status code
        status: u16,
        /// Message taken from the response body, or an `HTTP <status>` fallback
        message: String,
    },

    /// URL parsing errors
    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),
}

impl Error {
    /// Create a new authentication error
    pub fn auth<T: fmt::Display>(msg: T) -> Self {
        Error::Auth(msg.to_string())
    }

    /// Create a new validation error
    pub fn validation<T: fmt::Display>(msg: T) -> Self {
        Error::Validation(msg.to_string())
    }

    /// Create a new API error for the given status
    pub fn api<T: fmt::Display>(status: u16, msg: T) -> Self {
        Error::Api {
            status,
            message: msg.to_string(),
        }
    }

    /// The HTTP status associated with this error, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Api { status, .. } => Some(*status),
            Error::Network(err) => err.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Whether this error means the session is unusable
    pub fn is_auth(&self) -> bool {
        matches!(self, Error::Auth(_))
    }

    /// Classify a non-2xx response into an error variant.
    ///
    /// 401/403 become [`Error::Auth`]. Other statuses become
    /// [`Error::Validation`] when the body carries a `details` array, with
    /// the message assembled from the most readable field of each entry
    /// (`ctx.error`, then `msg`, then `type`) joined in source order.
    /// Everything else becomes [`Error::Api`] with the body's top-level
    /// `detail`/`error` string or an `HTTP <status>` fallback.
    pub(crate) fn from_response(status: u16, body: &str) -> Self {
        let parsed = serde_json::from_str::<Value>(body).ok();

        if status == 401 || status == 403 {
            let message =
                top_level_message(parsed.as_ref()).unwrap_or_else(|| format!("HTTP {}", status));
            return Error::Auth(message);
        }

        if let Some(details) = parsed
            .as_ref()
            .and_then(|v| v.get("details"))
            .and_then(Value::as_array)
        {
            let parts: Vec<String> = details.iter().filter_map(detail_message).collect();
            if !parts.is_empty() {
                return Error::Validation(parts.join("; "));
            }
        }

        let message =
            top_level_message(parsed.as_ref()).unwrap_or_else(|| format!("HTTP {}", status));
        Error::Api { status, message }
    }
}

/// Pick the most readable field of one validation detail entry.
fn detail_message(item: &Value) -> Option<String> {
    item.get("ctx")
        .and_then(|ctx| ctx.get("error"))
        .and_then(Value::as_str)
        .or_else(|| item.get("msg").and_then(Value::as_str))
        .or_else(|| item.get("type").and_then(Value::as_str))
        .map(str::to_string)
}

fn top_level_message(value: Option<&Value>) -> Option<String> {
    let value = value?;
    value
        .get("detail")
        .and_then(Value::as_str)
        .or_else(|| value.get("error").and_then(Value::as_str))
        .map(str::to_string)
}

//! Authentication and account management for Postline

mod refresh;
mod session;
mod types;

pub use session::{Session, EXPIRY_SKEW_SECS};
pub use types::*;

pub(crate) use refresh::RefreshCoordinator;
pub(crate) use session::TokenStore;

use std::sync::Arc;

use log::warn;
use serde_json::Value;

use crate::config::ClientOptions;
use crate::error::Error;
use crate::http::Http;

/// Client for authentication and the account endpoints
pub struct Auth {
    /// Shared request core
    http: Arc<Http>,

    /// The current session tokens
    tokens: Arc<TokenStore>,

    /// Client options
    options: ClientOptions,
}

impl Auth {
    pub(crate) fn new(http: Arc<Http>, tokens: Arc<TokenStore>, options: ClientOptions) -> Self {
        Self {
            http,
            tokens,
            options,
        }
    }

    /// Create a new account with email and password.
    ///
    /// When the server requires email verification the response carries no
    /// tokens and `pending_verification` is set; nothing is stored.
    pub async fn sign_up(
        &self,
        email: &str,
        password: &str,
        full_name: Option<&str>,
    ) -> Result<AuthResponse, Error> {
        let mut body = serde_json::json!({
            "email": email,
            "password": password,
        });
        if let Some(name) = full_name {
            body["full_name"] = Value::String(name.to_string());
        }

        let response: AuthResponse = self
            .http
            .post("/auth/signup")
            .unauthenticated()
            .json(&body)?
            .execute()
            .await?;

        self.store_tokens(&response);
        Ok(response)
    }

    /// Sign in with email and password
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<AuthResponse, Error> {
        let body = serde_json::json!({
            "email": email,
            "password": password,
        });

        let response: AuthResponse = self
            .http
            .post("/auth/signin")
            .unauthenticated()
            .json(&body)?
            .execute()
            .await?;

        self.store_tokens(&response);
        Ok(response)
    }

    /// Exchange a Google OAuth authorization code for a session
    pub async fn sign_in_with_google(
        &self,
        code: &str,
        redirect_uri: &str,
    ) -> Result<AuthResponse, Error> {
        self.oauth_exchange("/auth/signin/google", code, redirect_uri)
            .await
    }

    /// Exchange a LinkedIn OAuth authorization code for a session
    pub async fn sign_in_with_linkedin(
        &self,
        code: &str,
        redirect_uri: &str,
    ) -> Result<AuthResponse, Error> {
        self.oauth_exchange("/auth/signin/linkedin", code, redirect_uri)
            .await
    }

    async fn oauth_exchange(
        &self,
        path: &str,
        code: &str,
        redirect_uri: &str,
    ) -> Result<AuthResponse, Error> {
        let body = serde_json::json!({
            "code": code,
            "redirect_uri": redirect_uri,
        });

        let response: AuthResponse = self
            .http
            .post(path)
            .unauthenticated()
            .json(&body)?
            .execute()
            .await?;

        self.store_tokens(&response);
        Ok(response)
    }

    /// Build the URL that starts a provider's OAuth sign-in flow
    pub fn authorize_url(&self, provider: OAuthProvider, redirect_to: Option<&str>) -> String {
        let mut url = format!(
            "{}?provider={}",
            self.http.api_url("/auth/authorize"),
            provider.as_str()
        );
        if let Some(redirect) = redirect_to {
            url.push_str(&format!("&redirect_to={}", urlencoding::encode(redirect)));
        }
        url
    }

    /// Sign out.
    ///
    /// Local tokens always clear; server-side revocation is best effort and
    /// a revocation failure is logged, not surfaced. Signing out while
    /// already signed out is a no-op.
    pub async fn sign_out(&self) -> Result<(), Error> {
        if self.tokens.session().is_none() {
            self.tokens.clear();
            return Ok(());
        }

        let result = self.http.post("/auth/signout").execute_empty().await;
        self.tokens.clear();
        if let Err(err) = result {
            warn!("sign-out revocation failed: {}", err);
        }
        Ok(())
    }

    /// Exchange the stored refresh token for a new session.
    ///
    /// Shares the single-flight coordinator with automatic refresh, so an
    /// explicit call while a refresh is already pending waits for that
    /// outcome instead of issuing another one.
    pub async fn refresh_session(&self) -> Result<Session, Error> {
        self.http.refresh().await?;
        self.tokens
            .session()
            .ok_or_else(|| Error::auth("no session after refresh"))
    }

    /// Fetch the signed-in account
    pub async fn me(&self) -> Result<User, Error> {
        self.http.get("/auth/me").execute().await
    }

    /// Update the signed-in account
    pub async fn update_me(&self, update: &UserUpdate) -> Result<User, Error> {
        self.http.put("/auth/me").json(update)?.execute().await
    }

    /// Delete the signed-in account and drop the session
    pub async fn delete_account(&self) -> Result<(), Error> {
        self.http.delete("/auth/me").execute_empty().await?;
        self.tokens.clear();
        Ok(())
    }

    /// Request a password reset email. Always resolves without revealing
    /// whether the address exists.
    pub async fn request_password_reset(&self, email: &str) -> Result<(), Error> {
        let body = serde_json::json!({ "email": email });
        self.http
            .post("/auth/password/reset")
            .unauthenticated()
            .json(&body)?
            .execute_empty()
            .await
    }

    /// Resend the verification email for an unverified account
    pub async fn resend_verification(&self, email: &str) -> Result<(), Error> {
        let body = serde_json::json!({ "email": email });
        self.http
            .post("/auth/resend-verification")
            .unauthenticated()
            .json(&body)?
            .execute_empty()
            .await
    }

    /// A snapshot of the current session, if any
    pub fn session(&self) -> Option<Session> {
        self.tokens.session()
    }

    /// Seed a session persisted outside the client
    pub fn set_session(&self, session: Session) {
        self.tokens.set_session(session);
    }

    fn store_tokens(&self, response: &AuthResponse) {
        if !self.options.persist_session {
            return;
        }
        if let (Some(access), Some(refresh), Some(expires_in)) = (
            &response.access_token,
            &response.refresh_token,
            response.expires_in,
        ) {
            self.tokens.set_tokens(access, refresh, expires_in);
        }
    }
}

//! Authenticated HTTP core shared by every sub-client
//!
//! This is the only place that interprets status codes: responses are
//! normalized into [`Error`](crate::error::Error) variants here, and higher
//! layers treat every failure as an opaque error.

use std::sync::Arc;

use log::{debug, warn};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{multipart, Client, Method, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use url::Url;

use crate::auth::{RefreshCoordinator, TokenResponse, TokenStore};
use crate::config::ClientOptions;
use crate::error::Error;

/// Shared request core: base URL, token store, and refresh coordination.
pub(crate) struct Http {
    client: Client,
    base_url: String,
    tokens: Arc<TokenStore>,
    refresher: RefreshCoordinator,
    options: ClientOptions,
}

impl Http {
    pub fn new(
        client: Client,
        base_url: &str,
        tokens: Arc<TokenStore>,
        options: ClientOptions,
    ) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            tokens,
            refresher: RefreshCoordinator::new(),
            options,
        }
    }

    /// Absolute URL for an API path
    pub(crate) fn api_url(&self, path: &str) -> String {
        format!("{}/api/v1{}", self.base_url, path)
    }

    pub fn get(&self, path: &str) -> RequestBuilder<'_> {
        RequestBuilder::new(self, Method::GET, path)
    }

    pub fn post(&self, path: &str) -> RequestBuilder<'_> {
        RequestBuilder::new(self, Method::POST, path)
    }

    pub fn put(&self, path: &str) -> RequestBuilder<'_> {
        RequestBuilder::new(self, Method::PUT, path)
    }

    pub fn delete(&self, path: &str) -> RequestBuilder<'_> {
        RequestBuilder::new(self, Method::DELETE, path)
    }

    /// Refresh the access token, single-flight.
    ///
    /// The refresh call itself bypasses the authenticated request path, so a
    /// 401 from the refresh endpoint can never trigger another refresh. On
    /// failure the session is dropped and the session-expired hook fires.
    pub async fn refresh(&self) -> Result<String, Error> {
        self.refresher
            .run(|| async {
                let refresh_token = self
                    .tokens
                    .refresh_token()
                    .ok_or_else(|| Error::auth("no refresh token available"))?;

                let result = self
                    .refresh_call(&refresh_token)
                    .await;

                match result {
                    Ok(tokens) => {
                        self.tokens.set_tokens(
                            &tokens.access_token,
                            &tokens.refresh_token,
                            tokens.expires_in,
                        );
                        debug!("token refresh succeeded");
                        Ok(tokens.access_token)
                    }
                    Err(err) => {
                        warn!("token refresh failed: {}", err);
                        self.tokens.clear();
                        self.session_expired();
                        Err(Error::auth(format!("token refresh failed: {}", err)))
                    }
                }
            })
            .await
    }

    async fn refresh_call(&self, refresh_token: &str) -> Result<TokenResponse, Error> {
        let body = serde_json::json!({ "refresh_token": refresh_token });
        let response = self
            .client
            .post(self.api_url("/auth/refresh"))
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let text = response.text().await.unwrap_or_default();
            return Err(Error::from_response(status, &text));
        }

        Ok(response.json::<TokenResponse>().await?)
    }

    fn session_expired(&self) {
        if let Some(hook) = &self.options.on_session_expired {
            hook();
        }
    }
}

struct FilePart {
    field: String,
    file_name: String,
    content_type: String,
    bytes: Vec<u8>,
}

/// Builder for one logical request against the API.
///
/// The body is held as bytes so the exact request can be re-sent after a
/// token refresh: same method, same body, only the Authorization header
/// replaced.
pub(crate) struct RequestBuilder<'a> {
    http: &'a Http,
    method: Method,
    path: String,
    headers: HeaderMap,
    query: Vec<(String, String)>,
    body: Option<Vec<u8>>,
    file: Option<FilePart>,
    authenticate: bool,
}

impl<'a> RequestBuilder<'a> {
    fn new(http: &'a Http, method: Method, path: &str) -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        Self {
            http,
            method,
            path: path.to_string(),
            headers,
            query: Vec::new(),
            body: None,
            file: None,
            authenticate: true,
        }
    }

    /// Skip bearer attachment and 401 recovery. Used by the auth endpoints
    /// themselves (sign-in, sign-up), which must never recurse into refresh.
    pub fn unauthenticated(mut self) -> Self {
        self.authenticate = false;
        self
    }

    /// Add a query parameter
    pub fn query(mut self, key: &str, value: &str) -> Self {
        self.query.push((key.to_string(), value.to_string()));
        self
    }

    /// Serialize a JSON body
    pub fn json<T: Serialize>(mut self, body: &T) -> Result<Self, Error> {
        self.body = Some(serde_json::to_vec(body)?);
        Ok(self)
    }

    /// Attach a file as a multipart form upload
    pub fn file(mut self, field: &str, file_name: &str, content_type: &str, bytes: Vec<u8>) -> Self {
        // Multipart requests carry their own boundary content type.
        self.headers.remove(CONTENT_TYPE);
        self.file = Some(FilePart {
            field: field.to_string(),
            file_name: file_name.to_string(),
            content_type: content_type.to_string(),
            bytes,
        });
        self
    }

    /// Execute and parse the response as JSON. A 204/205 resolves to an
    /// empty value without touching the body.
    pub async fn execute<T: DeserializeOwned>(&self) -> Result<T, Error> {
        let response = self.dispatch().await?;
        match response.status() {
            StatusCode::NO_CONTENT | StatusCode::RESET_CONTENT => {
                serde_json::from_value(Value::Null).map_err(Error::from)
            }
            _ => {
                let text = response.text().await?;
                serde_json::from_str(&text).map_err(Error::from)
            }
        }
    }

    /// Execute and discard any response body
    pub async fn execute_empty(&self) -> Result<(), Error> {
        self.dispatch().await?;
        Ok(())
    }

    /// Execute and return the raw success response. Used for streaming
    /// bodies and non-JSON content types, which pass through unparsed.
    pub async fn execute_response(&self) -> Result<Response, Error> {
        self.dispatch().await
    }

    /// Perform the request with authentication and recovery: proactive
    /// refresh of an expired token, one refresh-and-redrive on 401, and
    /// session teardown when recovery is impossible. At most one redrive is
    /// ever attempted, and a redriven non-GET request is re-sent as-is with
    /// no idempotency key.
    async fn dispatch(&self) -> Result<Response, Error> {
        let http = self.http;

        if self.authenticate
            && http.options.auto_refresh_token
            && http.tokens.is_expired()
            && http.tokens.refresh_token().is_some()
        {
            debug!(
                "access token expired before {} {}, refreshing",
                self.method, self.path
            );
            http.refresh().await?;
        }

        let token = if self.authenticate {
            http.tokens.access_token()
        } else {
            None
        };
        let response = self.send_once(token.as_deref()).await?;

        if response.status() == StatusCode::UNAUTHORIZED && self.authenticate {
            if http.options.auto_refresh_token && http.tokens.refresh_token().is_some() {
                debug!(
                    "401 for {} {}, refreshing and redriving once",
                    self.method, self.path
                );
                let fresh = http.refresh().await?;
                let redriven = self.send_once(Some(&fresh)).await?;
                if redriven.status() == StatusCode::UNAUTHORIZED {
                    warn!("redriven request still unauthorized, dropping session");
                    http.tokens.clear();
                    http.session_expired();
                }
                return check_status(redriven).await;
            }

            // No refresh token to recover with: drop the session.
            http.tokens.clear();
            http.session_expired();
        }

        check_status(response).await
    }

    async fn send_once(&self, token: Option<&str>) -> Result<Response, Error> {
        let mut headers = self.headers.clone();
        if let Some(token) = token {
            let value = HeaderValue::from_str(&format!("Bearer {}", token))
                .map_err(|_| Error::auth("access token contains invalid characters"))?;
            headers.insert(AUTHORIZATION, value);
        }

        let url = Url::parse(&self.http.api_url(&self.path))?;
        let mut request = self
            .http
            .client
            .request(self.method.clone(), url)
            .headers(headers);

        if !self.query.is_empty() {
            request = request.query(&self.query);
        }

        if let Some(file) = &self.file {
            let part = multipart::Part::bytes(file.bytes.clone())
                .file_name(file.file_name.clone())
                .mime_str(&file.content_type)?;
            request = request.multipart(multipart::Form::new().part(file.field.clone(), part));
        } else if let Some(body) = &self.body {
            request = request.body(body.clone());
        }

        Ok(request.send().await?)
    }
}

async fn check_status(response: Response) -> Result<Response, Error> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(Error::from_response(status.as_u16(), &body))
}

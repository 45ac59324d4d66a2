//! Authenticated HTTP transport for the Denshikawa API.
//!
//! All outbound traffic goes through [`ApiTransport`]: it attaches the
//! bearer token from the session, enforces the fixed request timeout, and
//! transparently recovers from an expired access token with exactly one
//! refresh-and-retry cycle per original request.

use crate::config::ApiSettings;
use crate::endpoints;
use crate::error::ApiError;
use crate::models::auth::{RefreshTokenRequest, TokenPair};
use crate::session::Session;
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::broadcast;

pub use reqwest::Method;

/// Capacity of the auth event channel. Events are advisory; a lagging
/// receiver only misses duplicate expiry notices.
const AUTH_EVENT_CAPACITY: usize = 16;

/// A prepared outbound request.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: Method,
    pub url: String,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
    pub bearer: Option<String>,
}

/// A raw response: status plus unparsed body bytes. Decoding happens in
/// the domain API wrappers, not here.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl HttpResponse {
    fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Request execution seam. Production uses [`ReqwestSender`]; tests
/// substitute a scripted sender.
#[async_trait]
pub trait HttpSend: Send + Sync {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ApiError>;
}

/// `reqwest`-backed sender with the configured timeout and user agent.
pub struct ReqwestSender {
    client: reqwest::Client,
}

impl ReqwestSender {
    /// Builds the HTTP client. The timeout applies to every request;
    /// there is no per-call override.
    pub fn new(settings: &ApiSettings) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .user_agent(settings.user_agent.clone())
            .timeout(settings.timeout())
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl HttpSend for ReqwestSender {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        let mut builder = self.client.request(request.method, &request.url);
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(bearer) = &request.bearer {
            builder = builder.bearer_auth(bearer);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let body = response.bytes().await?.to_vec();
        Ok(HttpResponse { status, body })
    }
}

/// Emitted when the session is forcibly cleared so the consumer can
/// return to a login surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthEvent {
    /// The refresh token was rejected (or missing) while recovering from
    /// a 401. The session has already been logged out.
    SessionExpired,
}

/// Single point of outbound HTTP communication.
pub struct ApiTransport {
    sender: Arc<dyn HttpSend>,
    session: Arc<Session>,
    base_url: String,
    auth_events: broadcast::Sender<AuthEvent>,
}

impl ApiTransport {
    /// Creates a transport over `sender` for the given base URL.
    pub fn new(sender: Arc<dyn HttpSend>, session: Arc<Session>, base_url: &str) -> Self {
        let (auth_events, _) = broadcast::channel(AUTH_EVENT_CAPACITY);
        Self {
            sender,
            session,
            base_url: base_url.trim_end_matches('/').to_string(),
            auth_events,
        }
    }

    /// Subscribes to session-expiry notifications.
    pub fn subscribe_auth_events(&self) -> broadcast::Receiver<AuthEvent> {
        self.auth_events.subscribe()
    }

    /// Session this transport reads credentials from.
    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    /// Base URL this transport targets (no trailing slash).
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Sends one request, recovering from a single 401 via token refresh.
    ///
    /// Per-request state machine: the `retried` flag is carried here, not
    /// on any shared object, so at most one refresh-and-retry happens per
    /// original request. A 401 on an already-retried request clears the
    /// session and fails with [`ApiError::Auth`].
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        body: Option<Value>,
    ) -> Result<Vec<u8>, ApiError> {
        let url = format!("{}{path}", self.base_url);
        let query: Vec<(String, String)> = query
            .iter()
            .map(|(k, v)| ((*k).to_string(), v.clone()))
            .collect();

        let mut retried = false;
        loop {
            // The bearer is re-read each attempt so a retry after refresh
            // carries the replacement token.
            let request = HttpRequest {
                method: method.clone(),
                url: url.clone(),
                query: query.clone(),
                body: body.clone(),
                bearer: self.session.access_token(),
            };

            let response = self.sender.execute(request).await?;

            if response.is_success() {
                return Ok(response.body);
            }

            if response.status == 401 {
                if retried {
                    self.expire_session();
                    return Err(ApiError::Auth);
                }
                retried = true;
                match self.refresh_tokens().await {
                    Ok(()) => continue,
                    Err(_) => {
                        self.expire_session();
                        return Err(ApiError::Auth);
                    }
                }
            }

            return Err(ApiError::Http {
                status: response.status,
                message: extract_message(&response.body),
            });
        }
    }

    /// GET helper returning the raw response body.
    pub async fn get(&self, path: &str, query: &[(&str, String)]) -> Result<Vec<u8>, ApiError> {
        self.request(Method::GET, path, query, None).await
    }

    /// POST helper with an optional JSON body.
    pub async fn post(&self, path: &str, body: Option<Value>) -> Result<Vec<u8>, ApiError> {
        self.request(Method::POST, path, &[], body).await
    }

    /// PUT helper with a JSON body.
    pub async fn put(&self, path: &str, body: Value) -> Result<Vec<u8>, ApiError> {
        self.request(Method::PUT, path, &[], Some(body)).await
    }

    /// DELETE helper.
    pub async fn delete(&self, path: &str) -> Result<Vec<u8>, ApiError> {
        self.request(Method::DELETE, path, &[], None).await
    }

    /// Exchanges the refresh token for a new token pair and installs it
    /// in the session. The refresh call itself carries no bearer and is
    /// never retried.
    async fn refresh_tokens(&self) -> Result<(), ApiError> {
        let refresh_token = self.session.refresh_token().ok_or(ApiError::Auth)?;
        let payload = RefreshTokenRequest { refresh_token };

        let request = HttpRequest {
            method: Method::POST,
            url: format!("{}{}", self.base_url, endpoints::AUTH_REFRESH),
            query: Vec::new(),
            body: Some(
                serde_json::to_value(&payload)
                    .map_err(|e| ApiError::bad_response(e.to_string()))?,
            ),
            bearer: None,
        };

        let response = self.sender.execute(request).await?;
        if !response.is_success() {
            return Err(ApiError::Http {
                status: response.status,
                message: extract_message(&response.body),
            });
        }

        let tokens: TokenPair = serde_json::from_slice(&response.body)
            .map_err(|e| ApiError::bad_response(format!("invalid refresh response: {e}")))?;

        // Both tokens are replaced together; the old pair is gone.
        self.session.set_tokens(tokens.access_token, tokens.refresh_token);
        Ok(())
    }

    fn expire_session(&self) {
        self.session.logout();
        // No receivers is fine; the CLI may not be listening.
        let _ = self.auth_events.send(AuthEvent::SessionExpired);
    }
}

/// Pulls a human-readable message out of an error body, preferring the
/// server's JSON `{ "message": ... }` convention.
fn extract_message(body: &[u8]) -> String {
    if let Ok(value) = serde_json::from_slice::<Value>(body) {
        if let Some(message) = value.get("message").and_then(Value::as_str) {
            return message.to_string();
        }
        if let Some(error) = value.get("error").and_then(Value::as_str) {
            return error.to_string();
        }
    }
    "request failed".to_string()
}

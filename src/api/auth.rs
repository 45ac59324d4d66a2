//! Authentication operations.

use super::{decode, encode};
use crate::endpoints;
use crate::error::ApiError;
use crate::models::auth::{AuthResponse, GoogleAuthRequest, LoginRequest, RegisterRequest};
use crate::transport::ApiTransport;
use std::sync::Arc;
use validator::Validate;

/// Wrapper for the `/auth` resource.
pub struct AuthApi {
    transport: Arc<ApiTransport>,
}

impl AuthApi {
    pub fn new(transport: Arc<ApiTransport>) -> Self {
        Self { transport }
    }

    /// Exchanges credentials for a session and token pair.
    pub async fn login(&self, credentials: &LoginRequest) -> Result<AuthResponse, ApiError> {
        credentials.validate()?;
        let body = self
            .transport
            .post(endpoints::AUTH_LOGIN, Some(encode(credentials)?))
            .await?;
        decode(&body)
    }

    /// Creates an account; returns the same shape as login.
    pub async fn register(&self, payload: &RegisterRequest) -> Result<AuthResponse, ApiError> {
        payload.validate()?;
        let body = self
            .transport
            .post(endpoints::AUTH_REGISTER, Some(encode(payload)?))
            .await?;
        decode(&body)
    }

    /// Exchanges a Google identity token for a session and token pair.
    pub async fn login_with_google(&self, id_token: &str) -> Result<AuthResponse, ApiError> {
        let payload = GoogleAuthRequest {
            id_token: id_token.to_string(),
        };
        payload.validate()?;
        let body = self
            .transport
            .post(endpoints::AUTH_GOOGLE, Some(encode(&payload)?))
            .await?;
        decode(&body)
    }

    /// Invalidates the server-side session. Local state is the caller's
    /// responsibility (the service clears it regardless of the outcome).
    pub async fn logout(&self) -> Result<(), ApiError> {
        self.transport.post(endpoints::AUTH_LOGOUT, None).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::Session;
    use crate::transport::testing::{FakeSender, ok};

    fn auth_api(responses: Vec<Result<crate::transport::HttpResponse, ApiError>>) -> (AuthApi, Arc<FakeSender>) {
        let sender = Arc::new(FakeSender::new(responses));
        let transport = Arc::new(ApiTransport::new(
            sender.clone(),
            Arc::new(Session::in_memory()),
            "http://localhost:4000",
        ));
        (AuthApi::new(transport), sender)
    }

    const LOGIN_OK: &str = r#"{
        "user": {"id":"u1","email":"a@b.com","username":"reader","role":"user","created_at":"2024-01-01T00:00:00Z"},
        "tokens": {"access_token":"A1","refresh_token":"R1","expires_in":3600}
    }"#;

    #[tokio::test]
    async fn test_login_round_trip() {
        let (api, sender) = auth_api(vec![ok(LOGIN_OK)]);

        let response = api
            .login(&LoginRequest {
                email: "a@b.com".to_string(),
                password: "password1".to_string(),
            })
            .await
            .unwrap();

        assert_eq!(response.tokens.access_token, "A1");
        assert_eq!(response.user.id, "u1");
        let requests = sender.requests();
        assert_eq!(requests[0].url, "http://localhost:4000/auth/login");
        assert_eq!(requests[0].body.as_ref().unwrap()["email"], "a@b.com");
    }

    #[tokio::test]
    async fn test_invalid_payload_never_reaches_network() {
        let (api, sender) = auth_api(vec![ok(LOGIN_OK)]);

        let err = api
            .login(&LoginRequest {
                email: "nope".to_string(),
                password: "password1".to_string(),
            })
            .await
            .unwrap_err();

        assert!(matches!(err, ApiError::Validation { field: Some(f), .. } if f == "email"));
        assert!(sender.requests().is_empty());
    }

    #[tokio::test]
    async fn test_malformed_login_response_is_validation_error() {
        let (api, _) = auth_api(vec![ok(r#"{"user": null}"#)]);

        let err = api
            .login(&LoginRequest {
                email: "a@b.com".to_string(),
                password: "password1".to_string(),
            })
            .await
            .unwrap_err();

        assert!(matches!(err, ApiError::Validation { .. }));
    }

    #[tokio::test]
    async fn test_google_login_requires_token() {
        let (api, sender) = auth_api(vec![]);
        let err = api.login_with_google("").await.unwrap_err();
        assert!(matches!(err, ApiError::Validation { .. }));
        assert!(sender.requests().is_empty());
    }
}

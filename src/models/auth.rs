//! Authentication request and response payloads.
//!
//! Request rules mirror the server's registration policy: they are checked
//! client-side so malformed payloads fail fast and never reach the network.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use validator::{Validate, ValidationError};

/// Usernames are 3-30 characters of letters, digits, and underscores.
static USERNAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9_]+$").expect("valid username regex"));

/// Credentials for `POST /auth/login`.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
}

/// Payload for `POST /auth/register`.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(
        length(min = 3, max = 30, message = "Username must be 3 to 30 characters"),
        regex(
            path = *USERNAME_RE,
            message = "Username can only contain letters, numbers, and underscores"
        )
    )]
    pub username: String,

    #[validate(
        length(min = 8, message = "Password must be at least 8 characters"),
        custom(function = password_strength)
    )]
    pub password: String,
}

/// Passwords need at least one uppercase letter, one lowercase letter,
/// and one digit.
fn password_strength(password: &str) -> Result<(), ValidationError> {
    if !password.chars().any(|c| c.is_ascii_uppercase()) {
        return Err(ValidationError::new("password_uppercase")
            .with_message("Password must contain at least one uppercase letter".into()));
    }
    if !password.chars().any(|c| c.is_ascii_lowercase()) {
        return Err(ValidationError::new("password_lowercase")
            .with_message("Password must contain at least one lowercase letter".into()));
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        return Err(ValidationError::new("password_digit")
            .with_message("Password must contain at least one number".into()));
    }
    Ok(())
}

/// Payload for `POST /auth/refresh`.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RefreshTokenRequest {
    #[validate(length(min = 1, message = "Refresh token is required"))]
    pub refresh_token: String,
}

/// Payload for `POST /auth/google`.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct GoogleAuthRequest {
    #[validate(length(min = 1, message = "Identity token is required"))]
    pub id_token: String,
}

/// Access/refresh token pair returned by login, register, and refresh.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    /// Access token lifetime in seconds.
    pub expires_in: u64,
}

/// Account profile as returned by the server.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
    pub id: String,
    pub email: String,
    pub username: String,
    pub role: String,
    pub created_at: String,
}

/// Response to login, register, and google sign-in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    pub user: User,
    pub tokens: TokenPair,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn register_request(email: &str, username: &str, password: &str) -> RegisterRequest {
        RegisterRequest {
            email: email.to_string(),
            username: username.to_string(),
            password: password.to_string(),
        }
    }

    #[test]
    fn test_login_rejects_bad_email() {
        let req = LoginRequest {
            email: "not-an-email".to_string(),
            password: "password1".to_string(),
        };
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_login_rejects_short_password() {
        let req = LoginRequest {
            email: "a@b.com".to_string(),
            password: "short".to_string(),
        };
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_login_accepts_valid_credentials() {
        let req = LoginRequest {
            email: "a@b.com".to_string(),
            password: "password1".to_string(),
        };
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_register_username_rules() {
        assert!(register_request("a@b.com", "ok_name1", "Passw0rd").validate().is_ok());
        // Too short
        assert!(register_request("a@b.com", "ab", "Passw0rd").validate().is_err());
        // Illegal characters
        assert!(register_request("a@b.com", "bad name!", "Passw0rd").validate().is_err());
    }

    #[test]
    fn test_register_password_strength() {
        // Missing uppercase
        assert!(register_request("a@b.com", "reader", "passw0rd").validate().is_err());
        // Missing digit
        assert!(register_request("a@b.com", "reader", "Password").validate().is_err());
        // Missing lowercase
        assert!(register_request("a@b.com", "reader", "PASSW0RD").validate().is_err());
        assert!(register_request("a@b.com", "reader", "Passw0rd").validate().is_ok());
    }

    #[test]
    fn test_token_pair_decodes() {
        let json = r#"{"access_token":"A1","refresh_token":"R1","expires_in":3600}"#;
        let tokens: TokenPair = serde_json::from_str(json).unwrap();
        assert_eq!(tokens.access_token, "A1");
        assert_eq!(tokens.refresh_token, "R1");
        assert_eq!(tokens.expires_in, 3600);
    }

    #[test]
    fn test_auth_response_decodes() {
        let json = r#"{
            "user": {"id":"u1","email":"a@b.com","username":"reader","role":"user","created_at":"2024-01-01T00:00:00Z"},
            "tokens": {"access_token":"A1","refresh_token":"R1","expires_in":3600}
        }"#;
        let resp: AuthResponse = serde_json::from_str(json).unwrap();
        assert_eq!(resp.user.username, "reader");
        assert_eq!(resp.tokens.access_token, "A1");
    }

    #[test]
    fn test_auth_response_rejects_missing_tokens() {
        let json = r#"{"user": {"id":"u1","email":"a@b.com","username":"reader","role":"user","created_at":"x"}}"#;
        assert!(serde_json::from_str::<AuthResponse>(json).is_err());
    }
}

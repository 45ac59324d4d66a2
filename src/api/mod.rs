//! Typed wrappers over the raw transport, one per API resource.
//!
//! Wrappers are pure mapping: validate the request payload, delegate
//! delivery to [`ApiTransport`](crate::transport::ApiTransport), and
//! decode the response. No retries, no caching.

mod auth;
mod chapters;
mod manga;
mod user;

pub use auth::AuthApi;
pub use chapters::ChaptersApi;
pub use manga::MangaApi;
pub use user::UserApi;

use crate::error::ApiError;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Decodes a response body, turning any shape mismatch into a
/// [`ApiError::Validation`] distinct from transport failures.
pub(crate) fn decode<T: DeserializeOwned>(body: &[u8]) -> Result<T, ApiError> {
    serde_json::from_slice(body).map_err(|e| ApiError::bad_response(e.to_string()))
}

/// Serializes a validated request payload to a JSON body.
pub(crate) fn encode<T: Serialize>(payload: &T) -> Result<Value, ApiError> {
    serde_json::to_value(payload).map_err(|e| ApiError::Validation {
        field: None,
        message: e.to_string(),
    })
}

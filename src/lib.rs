//! Denshikawa - client library for the Denshikawa manga-reading service.
//!
//! This library provides:
//! - An authenticated HTTP transport with transparent token refresh
//! - Typed, validated wrappers for every API resource
//! - A query cache with request de-duplication and offset pagination
//! - Durable session state that survives restarts

pub mod api;
pub mod config;
pub mod console;
pub mod endpoints;
pub mod error;
pub mod keys;
pub mod models;
pub mod query;
pub mod service;
pub mod session;
pub mod transport;

// Re-export commonly used types
pub use config::Config;
pub use console::Console;
pub use error::{ApiError, ConfigError, StoreError};
pub use keys::QueryKey;
pub use models::Paginated;
pub use query::{InfinitePages, QueryClient, QueryStatus};
pub use service::Denshikawa;
pub use session::{Session, SessionStore};
pub use transport::{ApiTransport, AuthEvent, HttpSend, ReqwestSender};

//! Durable authentication session state.
//!
//! [`Session`] owns the current user and token pair. It is the single
//! writer: only `login`, `logout`, and `set_tokens` mutate the state, and
//! everything else gets read-only accessors. Every mutation is mirrored to
//! a JSON file so the session survives process restarts; store failures
//! degrade to in-memory operation instead of crashing.

use crate::error::StoreError;
use crate::models::auth::User;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::RwLock;

/// In-memory session state.
///
/// `is_authenticated` is true iff both tokens are present and a successful
/// login or refresh has happened since the last logout.
#[derive(Debug, Clone, Default)]
struct SessionState {
    user: Option<User>,
    access_token: Option<String>,
    refresh_token: Option<String>,
    is_authenticated: bool,
}

/// The on-disk session record. The authenticated flag is not persisted;
/// it is recomputed from token presence on rehydration.
#[derive(Debug, Serialize, Deserialize)]
struct PersistedSession {
    access_token: Option<String>,
    refresh_token: Option<String>,
    user: Option<User>,
}

/// JSON-file key-value store holding the session record.
#[derive(Debug)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    /// Creates a store backed by the given file path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Returns the backing file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<Option<PersistedSession>, StoreError> {
        if !self.path.exists() {
            return Ok(None);
        }
        let content = std::fs::read_to_string(&self.path)?;
        Ok(Some(serde_json::from_str(&content)?))
    }

    fn save(&self, record: &PersistedSession) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(record)?;
        std::fs::write(&self.path, content)?;
        Ok(())
    }

    fn remove(&self) -> Result<(), StoreError> {
        if self.path.exists() {
            std::fs::remove_file(&self.path)?;
        }
        Ok(())
    }
}

/// Process-wide session singleton with single-writer discipline.
#[derive(Debug)]
pub struct Session {
    state: RwLock<SessionState>,
    store: Option<SessionStore>,
}

impl Session {
    /// Creates a purely in-memory session (no persistence).
    pub fn in_memory() -> Self {
        Self {
            state: RwLock::new(SessionState::default()),
            store: None,
        }
    }

    /// Creates a session backed by `store`, rehydrating any persisted
    /// record. An unreadable or corrupt store file yields an empty
    /// session; the store is kept so later mutations can still persist.
    pub fn with_store(store: SessionStore) -> Self {
        let state = match store.load() {
            Ok(Some(record)) => {
                let is_authenticated =
                    record.access_token.is_some() && record.refresh_token.is_some();
                SessionState {
                    user: record.user,
                    access_token: record.access_token,
                    refresh_token: record.refresh_token,
                    is_authenticated,
                }
            }
            Ok(None) | Err(_) => SessionState::default(),
        };

        Self {
            state: RwLock::new(state),
            store: Some(store),
        }
    }

    /// Establishes a new session: sets user and both tokens atomically.
    pub fn login(&self, user: User, access_token: String, refresh_token: String) {
        let snapshot = {
            let mut state = self.write();
            state.user = Some(user);
            state.access_token = Some(access_token);
            state.refresh_token = Some(refresh_token);
            state.is_authenticated = true;
            state.clone()
        };
        self.persist(&snapshot);
    }

    /// Clears all session fields.
    pub fn logout(&self) {
        {
            let mut state = self.write();
            *state = SessionState::default();
        }
        if let Some(store) = &self.store {
            // Best effort; a leftover file is re-cleared on next mutation.
            let _ = store.remove();
        }
    }

    /// Replaces both tokens, leaving the user untouched. Used by the
    /// refresh cycle.
    pub fn set_tokens(&self, access_token: String, refresh_token: String) {
        let snapshot = {
            let mut state = self.write();
            state.access_token = Some(access_token);
            state.refresh_token = Some(refresh_token);
            state.clone()
        };
        self.persist(&snapshot);
    }

    /// Current access token, if any.
    pub fn access_token(&self) -> Option<String> {
        self.read().access_token.clone()
    }

    /// Current refresh token, if any.
    pub fn refresh_token(&self) -> Option<String> {
        self.read().refresh_token.clone()
    }

    /// Current user profile, if any.
    pub fn user(&self) -> Option<User> {
        self.read().user.clone()
    }

    /// Whether a login or refresh has succeeded since the last logout.
    pub fn is_authenticated(&self) -> bool {
        self.read().is_authenticated
    }

    fn persist(&self, state: &SessionState) {
        if let Some(store) = &self.store {
            let record = PersistedSession {
                access_token: state.access_token.clone(),
                refresh_token: state.refresh_token.clone(),
                user: state.user.clone(),
            };
            // A write failure degrades to in-memory-only for this session.
            let _ = store.save(&record);
        }
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, SessionState> {
        self.state.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, SessionState> {
        self.state.write().unwrap_or_else(|e| e.into_inner())
    }
}

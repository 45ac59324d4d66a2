//! User-scoped payloads: bookmarks, reading progress, history, library.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// A bookmarked manga.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Bookmark {
    pub manga_id: String,
    pub mangadex_id: String,
    pub title: String,
    pub cover_url: String,
    pub added_at: String,
}

/// Reading progress within one manga.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Progress {
    pub manga_id: String,
    pub mangadex_id: String,
    pub current_chapter_id: Option<String>,
    pub current_page: Option<u32>,
    pub updated_at: String,
}

/// Payload for `PUT /users/me/progress/{mangaId}`.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UpdateProgressRequest {
    #[validate(length(min = 1, message = "Chapter id is required"))]
    pub chapter_id: String,

    /// Zero-based page index within the chapter.
    pub page: u32,
}

/// One entry in the reading history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryItem {
    pub chapter_id: String,
    pub mangadex_id: String,
    pub manga_mangadex_id: String,
    pub chapter_number: Option<String>,
    pub title: Option<String>,
    pub read_at: String,
}

/// One entry in the user's library (bookmark joined with progress).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LibraryItem {
    pub manga_id: String,
    pub mangadex_id: String,
    pub title: String,
    pub cover_url: String,
    pub status: String,
    pub current_chapter_id: Option<String>,
    pub current_page: Option<u32>,
    pub last_read_at: Option<String>,
    pub added_at: String,
}

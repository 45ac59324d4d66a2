//! Manga listing and detail payloads.

use serde::{Deserialize, Serialize};

/// Compact manga record used in search and listing results.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MangaSummary {
    pub id: String,
    pub mangadex_id: String,
    pub title: String,
    pub cover_url: String,
    /// One of `ongoing`, `completed`, `cancelled`, `hiatus`.
    pub status: String,
}

/// A descriptive tag attached to a manga.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Tag {
    pub id: String,
    pub name: String,
    pub group: String,
}

/// Full manga record for a detail view.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MangaDetails {
    pub mangadex_id: String,
    pub title: String,
    pub alt_titles: Vec<String>,
    pub description: String,
    pub cover_url: String,
    pub status: String,
    pub year: Option<i32>,
    pub content_rating: String,
    pub tags: Vec<Tag>,
    pub author_names: Vec<String>,
    pub artist_names: Vec<String>,
}

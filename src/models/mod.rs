//! Data transfer objects for the Denshikawa API.
//!
//! Request payloads carry `validator` rules checked before transmission;
//! response bodies are validated by strict serde decoding at receipt.
//! Everything here is a value object mirroring server-defined shapes.

pub mod auth;
pub mod chapter;
pub mod manga;
pub mod user;

pub use auth::{
    AuthResponse, GoogleAuthRequest, LoginRequest, RefreshTokenRequest, RegisterRequest,
    TokenPair, User,
};
pub use chapter::{Chapter, ChapterNavigation, ChapterPage, ChapterPages, ChapterRef};
pub use manga::{MangaDetails, MangaSummary, Tag};
pub use user::{Bookmark, HistoryItem, LibraryItem, Progress, UpdateProgressRequest};

use serde::{Deserialize, Serialize};

/// One page of an offset-paginated listing.
///
/// Consumers advance by requesting `offset + limit` until `next_offset`
/// returns `None`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Paginated<T> {
    /// Items for this page.
    pub data: Vec<T>,

    /// Total number of items across all pages.
    pub total: u64,

    /// Page size the server applied.
    pub limit: u64,

    /// Offset of the first item in `data`.
    pub offset: u64,
}

impl<T> Paginated<T> {
    /// Offset of the next page, or `None` when this page exhausts the
    /// listing (`offset + limit >= total`).
    pub fn next_offset(&self) -> Option<u64> {
        let next = self.offset + self.limit;
        if next < self.total { Some(next) } else { None }
    }

    /// An empty result for queries that are disabled (e.g. a blank
    /// search string) and must not reach the network.
    pub fn empty() -> Self {
        Self {
            data: Vec::new(),
            total: 0,
            limit: 0,
            offset: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(offset: u64, len: usize, limit: u64, total: u64) -> Paginated<u32> {
        Paginated {
            data: vec![0; len],
            total,
            limit,
            offset,
        }
    }

    #[test]
    fn test_next_offset_advances_by_limit() {
        assert_eq!(page(0, 20, 20, 45).next_offset(), Some(20));
        assert_eq!(page(20, 20, 20, 45).next_offset(), Some(40));
    }

    #[test]
    fn test_next_offset_stops_at_total() {
        // 40 + 20 >= 45, no fourth page
        assert_eq!(page(40, 5, 20, 45).next_offset(), None);
        // Exact multiple
        assert_eq!(page(20, 20, 20, 40).next_offset(), None);
    }

    #[test]
    fn test_empty_page_has_no_next() {
        let page = Paginated::<u32>::empty();
        assert!(page.data.is_empty());
        assert_eq!(page.next_offset(), None);
    }
}

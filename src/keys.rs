//! Semantic cache keys for the query layer.
//!
//! A key is an ordered tuple of segments. Prefix relationships drive bulk
//! invalidation: clearing `user` drops `user:me`, `user:bookmarks`, and so
//! on. The builders below are the only key shapes the client uses.

use std::fmt;

/// Ordered identifier for one cached query result.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryKey(Vec<String>);

impl QueryKey {
    /// Builds a key from ordered segments.
    pub fn new<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(segments.into_iter().map(Into::into).collect())
    }

    /// The key's segments in order.
    pub fn segments(&self) -> &[String] {
        &self.0
    }

    /// True when `prefix` matches this key's leading segments.
    pub fn starts_with(&self, prefix: &QueryKey) -> bool {
        self.0.len() >= prefix.0.len() && self.0[..prefix.0.len()] == prefix.0[..]
    }

    /// Returns this key extended with one more identifying segment
    /// (e.g. a page offset under a listing key).
    pub fn with(&self, segment: impl Into<String>) -> QueryKey {
        let mut segments = self.0.clone();
        segments.push(segment.into());
        QueryKey(segments)
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.join(":"))
    }
}

// Manga keys

pub fn manga_all() -> QueryKey {
    QueryKey::new(["manga"])
}

pub fn manga_popular() -> QueryKey {
    QueryKey::new(["manga", "popular"])
}

pub fn manga_latest() -> QueryKey {
    QueryKey::new(["manga", "latest"])
}

pub fn manga_search(query: &str) -> QueryKey {
    QueryKey::new(["manga", "search", query])
}

pub fn manga_detail(id: &str) -> QueryKey {
    QueryKey::new(["manga", id])
}

pub fn manga_chapters(id: &str, lang: &str) -> QueryKey {
    QueryKey::new(["manga", id, "chapters", lang])
}

// Chapter keys

pub fn chapter_pages(id: &str) -> QueryKey {
    QueryKey::new(["chapters", id, "pages"])
}

pub fn chapter_navigation(id: &str) -> QueryKey {
    QueryKey::new(["chapters", id, "navigation"])
}

// User keys

pub fn user_all() -> QueryKey {
    QueryKey::new(["user"])
}

pub fn user_me() -> QueryKey {
    QueryKey::new(["user", "me"])
}

pub fn user_library() -> QueryKey {
    QueryKey::new(["user", "library"])
}

pub fn user_bookmarks() -> QueryKey {
    QueryKey::new(["user", "bookmarks"])
}

pub fn user_progress() -> QueryKey {
    QueryKey::new(["user", "progress"])
}

pub fn user_manga_progress(manga_id: &str) -> QueryKey {
    QueryKey::new(["user", "progress", manga_id])
}

pub fn user_history() -> QueryKey {
    QueryKey::new(["user", "history"])
}

//! Chapter, page, and reader-navigation payloads.

use serde::{Deserialize, Serialize};

/// One chapter entry in a manga's chapter list.
///
/// Chapter numbers are strings on the wire ("10.5", "Extra") and may be
/// absent for oneshots.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chapter {
    pub mangadex_id: String,
    pub manga_mangadex_id: String,
    pub chapter_number: Option<String>,
    pub volume: Option<String>,
    pub title: Option<String>,
    pub language: String,
    pub scanlation_group_name: Option<String>,
    pub page_count: Option<u32>,
    pub published_at: Option<String>,
}

/// A single page image descriptor.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChapterPage {
    pub url: String,
    pub width: u32,
    pub height: u32,
    pub page_number: u32,
}

/// Ordered page list for one chapter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChapterPages {
    pub pages: Vec<ChapterPage>,
}

/// Pointer to an adjacent chapter.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChapterRef {
    pub mangadex_id: String,
    pub chapter_number: Option<String>,
}

/// Previous/next pointers for reader navigation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChapterNavigation {
    pub previous: Option<ChapterRef>,
    pub next: Option<ChapterRef>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chapter_decodes_with_nulls() {
        let json = r#"{
            "mangadex_id":"c1","manga_mangadex_id":"dx1","chapter_number":null,
            "volume":null,"title":"Oneshot","language":"en",
            "scanlation_group_name":null,"page_count":24,"published_at":null
        }"#;
        let chapter: Chapter = serde_json::from_str(json).unwrap();
        assert_eq!(chapter.chapter_number, None);
        assert_eq!(chapter.page_count, Some(24));
    }

    #[test]
    fn test_navigation_at_series_start() {
        let json = r#"{"previous":null,"next":{"mangadex_id":"c2","chapter_number":"2"}}"#;
        let nav: ChapterNavigation = serde_json::from_str(json).unwrap();
        assert!(nav.previous.is_none());
        assert_eq!(nav.next.unwrap().mangadex_id, "c2");
    }

    #[test]
    fn test_pages_preserve_order() {
        let json = r#"{"pages":[
            {"url":"u1","width":800,"height":1200,"page_number":1},
            {"url":"u2","width":800,"height":1200,"page_number":2}
        ]}"#;
        let pages: ChapterPages = serde_json::from_str(json).unwrap();
        assert_eq!(pages.pages[0].page_number, 1);
        assert_eq!(pages.pages[1].page_number, 2);
    }
}

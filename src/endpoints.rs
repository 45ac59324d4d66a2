//! REST endpoint paths for the Denshikawa API.

// Auth
pub const AUTH_LOGIN: &str = "/auth/login";
pub const AUTH_REGISTER: &str = "/auth/register";
pub const AUTH_REFRESH: &str = "/auth/refresh";
pub const AUTH_LOGOUT: &str = "/auth/logout";
pub const AUTH_GOOGLE: &str = "/auth/google";

// Manga
pub const MANGA_SEARCH: &str = "/manga/search";
pub const MANGA_POPULAR: &str = "/manga/popular";
pub const MANGA_LATEST: &str = "/manga/latest";

pub fn manga_details(id: &str) -> String {
    format!("/manga/{id}")
}

pub fn manga_chapters(id: &str) -> String {
    format!("/manga/{id}/chapters")
}

// Chapters
pub fn chapter_pages(id: &str) -> String {
    format!("/chapters/{id}/pages")
}

pub fn chapter_navigation(id: &str) -> String {
    format!("/chapters/{id}/navigation")
}

// User
pub const USER_ME: &str = "/users/me";
pub const USER_LIBRARY: &str = "/users/me/library";
pub const USER_BOOKMARKS: &str = "/users/me/bookmarks";
pub const USER_PROGRESS: &str = "/users/me/progress";
pub const USER_HISTORY: &str = "/users/me/history";

pub fn user_bookmark(manga_id: &str) -> String {
    format!("/users/me/bookmarks/{manga_id}")
}

pub fn user_manga_progress(manga_id: &str) -> String {
    format!("/users/me/progress/{manga_id}")
}

pub fn user_history_entry(chapter_id: &str) -> String {
    format!("/users/me/history/{chapter_id}")
}

/// Builds a proxied image URL for covers and pages, so image hosts that
/// reject hotlinking are fetched through the API server.
pub fn proxy_image_url(base_url: &str, image_url: &str) -> String {
    format!(
        "{}/proxy/image?url={}",
        base_url.trim_end_matches('/'),
        urlencode(image_url)
    )
}

fn urlencode(value: &str) -> String {
    url::form_urlencoded::byte_serialize(value.as_bytes()).collect()
}

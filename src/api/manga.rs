//! Manga browsing and search operations.

use super::decode;
use crate::endpoints;
use crate::error::ApiError;
use crate::models::chapter::Chapter;
use crate::models::manga::{MangaDetails, MangaSummary};
use crate::models::Paginated;
use crate::transport::ApiTransport;
use std::sync::Arc;

/// Wrapper for the `/manga` resource.
pub struct MangaApi {
    transport: Arc<ApiTransport>,
}

impl MangaApi {
    pub fn new(transport: Arc<ApiTransport>) -> Self {
        Self { transport }
    }

    /// Paginated title search.
    pub async fn search(
        &self,
        query: &str,
        limit: u64,
        offset: u64,
    ) -> Result<Paginated<MangaSummary>, ApiError> {
        let body = self
            .transport
            .get(
                endpoints::MANGA_SEARCH,
                &[
                    ("q", query.to_string()),
                    ("limit", limit.to_string()),
                    ("offset", offset.to_string()),
                ],
            )
            .await?;
        decode(&body)
    }

    /// Paginated popularity listing.
    pub async fn popular(
        &self,
        limit: u64,
        offset: u64,
    ) -> Result<Paginated<MangaSummary>, ApiError> {
        let body = self
            .transport
            .get(
                endpoints::MANGA_POPULAR,
                &[("limit", limit.to_string()), ("offset", offset.to_string())],
            )
            .await?;
        decode(&body)
    }

    /// Paginated recency listing.
    pub async fn latest(
        &self,
        limit: u64,
        offset: u64,
    ) -> Result<Paginated<MangaSummary>, ApiError> {
        let body = self
            .transport
            .get(
                endpoints::MANGA_LATEST,
                &[("limit", limit.to_string()), ("offset", offset.to_string())],
            )
            .await?;
        decode(&body)
    }

    /// Full record for one manga.
    pub async fn details(&self, id: &str) -> Result<MangaDetails, ApiError> {
        let body = self.transport.get(&endpoints::manga_details(id), &[]).await?;
        decode(&body)
    }

    /// Chapter list for one manga in one language.
    pub async fn chapters(&self, id: &str, lang: &str) -> Result<Vec<Chapter>, ApiError> {
        let body = self
            .transport
            .get(
                &endpoints::manga_chapters(id),
                &[("lang", lang.to_string())],
            )
            .await?;
        decode(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::Session;
    use crate::transport::testing::{FakeSender, ok};

    fn manga_api(
        responses: Vec<Result<crate::transport::HttpResponse, ApiError>>,
    ) -> (MangaApi, Arc<FakeSender>) {
        let sender = Arc::new(FakeSender::new(responses));
        let transport = Arc::new(ApiTransport::new(
            sender.clone(),
            Arc::new(Session::in_memory()),
            "http://localhost:4000",
        ));
        (MangaApi::new(transport), sender)
    }

    const PAGE_OK: &str = r#"{
        "data": [{"id":"m1","mangadex_id":"dx1","title":"T","cover_url":"u","status":"ongoing"}],
        "total": 45, "limit": 20, "offset": 0
    }"#;

    #[tokio::test]
    async fn test_search_sends_pagination_params() {
        let (api, sender) = manga_api(vec![ok(PAGE_OK)]);

        let page = api.search("yotsuba", 20, 0).await.unwrap();
        assert_eq!(page.total, 45);
        assert_eq!(page.next_offset(), Some(20));

        let request = &sender.requests()[0];
        assert_eq!(request.url, "http://localhost:4000/manga/search");
        assert!(request.query.contains(&("q".to_string(), "yotsuba".to_string())));
        assert!(request.query.contains(&("offset".to_string(), "0".to_string())));
    }

    #[tokio::test]
    async fn test_malformed_listing_is_validation_error() {
        let (api, _) = manga_api(vec![ok(r#"{"data": "oops"}"#)]);
        let err = api.popular(20, 0).await.unwrap_err();
        assert!(matches!(err, ApiError::Validation { .. }));
    }

    #[tokio::test]
    async fn test_chapters_passes_language() {
        let (api, sender) = manga_api(vec![ok("[]")]);

        let chapters = api.chapters("dx1", "en").await.unwrap();
        assert!(chapters.is_empty());

        let request = &sender.requests()[0];
        assert_eq!(request.url, "http://localhost:4000/manga/dx1/chapters");
        assert_eq!(request.query[0], ("lang".to_string(), "en".to_string()));
    }
}

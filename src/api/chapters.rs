//! Chapter content operations.

use super::decode;
use crate::endpoints;
use crate::error::ApiError;
use crate::models::chapter::{ChapterNavigation, ChapterPages};
use crate::transport::ApiTransport;
use std::sync::Arc;

/// Wrapper for the `/chapters` resource.
pub struct ChaptersApi {
    transport: Arc<ApiTransport>,
}

impl ChaptersApi {
    pub fn new(transport: Arc<ApiTransport>) -> Self {
        Self { transport }
    }

    /// Ordered page-image descriptors for one chapter.
    pub async fn pages(&self, id: &str) -> Result<ChapterPages, ApiError> {
        let body = self.transport.get(&endpoints::chapter_pages(id), &[]).await?;
        decode(&body)
    }

    /// Previous/next chapter pointers for reader navigation.
    pub async fn navigation(&self, id: &str) -> Result<ChapterNavigation, ApiError> {
        let body = self
            .transport
            .get(&endpoints::chapter_navigation(id), &[])
            .await?;
        decode(&body)
    }
}

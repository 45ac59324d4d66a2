//! User profile, bookmark, progress, and history operations.

use super::{decode, encode};
use crate::endpoints;
use crate::error::ApiError;
use crate::models::auth::User;
use crate::models::user::{Bookmark, HistoryItem, LibraryItem, Progress, UpdateProgressRequest};
use crate::transport::ApiTransport;
use std::sync::Arc;
use validator::Validate;

/// Wrapper for the `/users/me` resource.
pub struct UserApi {
    transport: Arc<ApiTransport>,
}

impl UserApi {
    pub fn new(transport: Arc<ApiTransport>) -> Self {
        Self { transport }
    }

    /// Current user profile.
    pub async fn me(&self) -> Result<User, ApiError> {
        let body = self.transport.get(endpoints::USER_ME, &[]).await?;
        decode(&body)
    }

    /// Library listing (bookmarks joined with progress).
    pub async fn library(&self) -> Result<Vec<LibraryItem>, ApiError> {
        let body = self.transport.get(endpoints::USER_LIBRARY, &[]).await?;
        decode(&body)
    }

    /// Bookmark listing.
    pub async fn bookmarks(&self) -> Result<Vec<Bookmark>, ApiError> {
        let body = self.transport.get(endpoints::USER_BOOKMARKS, &[]).await?;
        decode(&body)
    }

    /// Adds a bookmark for one manga.
    pub async fn add_bookmark(&self, manga_id: &str) -> Result<(), ApiError> {
        self.transport
            .post(&endpoints::user_bookmark(manga_id), None)
            .await?;
        Ok(())
    }

    /// Removes a bookmark.
    pub async fn remove_bookmark(&self, manga_id: &str) -> Result<(), ApiError> {
        self.transport
            .delete(&endpoints::user_bookmark(manga_id))
            .await?;
        Ok(())
    }

    /// Reading progress across all manga.
    pub async fn all_progress(&self) -> Result<Vec<Progress>, ApiError> {
        let body = self.transport.get(endpoints::USER_PROGRESS, &[]).await?;
        decode(&body)
    }

    /// Reading progress for one manga.
    pub async fn manga_progress(&self, manga_id: &str) -> Result<Progress, ApiError> {
        let body = self
            .transport
            .get(&endpoints::user_manga_progress(manga_id), &[])
            .await?;
        decode(&body)
    }

    /// Upserts reading progress for one manga.
    pub async fn update_progress(
        &self,
        manga_id: &str,
        progress: &UpdateProgressRequest,
    ) -> Result<(), ApiError> {
        progress.validate()?;
        self.transport
            .put(&endpoints::user_manga_progress(manga_id), encode(progress)?)
            .await?;
        Ok(())
    }

    /// Reading history, most recent first.
    pub async fn history(&self) -> Result<Vec<HistoryItem>, ApiError> {
        let body = self.transport.get(endpoints::USER_HISTORY, &[]).await?;
        decode(&body)
    }

    /// Marks a chapter as read.
    pub async fn mark_chapter_read(&self, chapter_id: &str) -> Result<(), ApiError> {
        self.transport
            .post(&endpoints::user_history_entry(chapter_id), None)
            .await?;
        Ok(())
    }

    /// Removes one history entry.
    pub async fn remove_from_history(&self, chapter_id: &str) -> Result<(), ApiError> {
        self.transport
            .delete(&endpoints::user_history_entry(chapter_id))
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::Session;
    use crate::transport::testing::{FakeSender, ok};
    use crate::transport::Method;

    fn user_api(
        responses: Vec<Result<crate::transport::HttpResponse, ApiError>>,
    ) -> (UserApi, Arc<FakeSender>) {
        let sender = Arc::new(FakeSender::new(responses));
        let transport = Arc::new(ApiTransport::new(
            sender.clone(),
            Arc::new(Session::in_memory()),
            "http://localhost:4000",
        ));
        (UserApi::new(transport), sender)
    }

    #[tokio::test]
    async fn test_me_decodes_profile() {
        let (api, _) = user_api(vec![ok(
            r#"{"id":"u1","email":"a@b.com","username":"reader","role":"user","created_at":"2024-01-01T00:00:00Z"}"#,
        )]);

        let user = api.me().await.unwrap();
        assert_eq!(user.username, "reader");
    }

    #[tokio::test]
    async fn test_bookmark_add_and_remove_verbs() {
        let (api, sender) = user_api(vec![ok("{}"), ok("{}")]);

        api.add_bookmark("m1").await.unwrap();
        api.remove_bookmark("m1").await.unwrap();

        let requests = sender.requests();
        assert_eq!(requests[0].method, Method::POST);
        assert_eq!(requests[0].url, "http://localhost:4000/users/me/bookmarks/m1");
        assert_eq!(requests[1].method, Method::DELETE);
    }

    #[tokio::test]
    async fn test_update_progress_validates_first() {
        let (api, sender) = user_api(vec![]);

        let err = api
            .update_progress(
                "m1",
                &UpdateProgressRequest {
                    chapter_id: String::new(),
                    page: 3,
                },
            )
            .await
            .unwrap_err();

        assert!(matches!(err, ApiError::Validation { .. }));
        assert!(sender.requests().is_empty());
    }

    #[tokio::test]
    async fn test_update_progress_puts_payload() {
        let (api, sender) = user_api(vec![ok("{}")]);

        api.update_progress(
            "m1",
            &UpdateProgressRequest {
                chapter_id: "c1".to_string(),
                page: 7,
            },
        )
        .await
        .unwrap();

        let request = &sender.requests()[0];
        assert_eq!(request.method, Method::PUT);
        assert_eq!(request.url, "http://localhost:4000/users/me/progress/m1");
        assert_eq!(request.body.as_ref().unwrap()["page"], 7);
    }

    #[tokio::test]
    async fn test_history_entry_paths() {
        let (api, sender) = user_api(vec![ok("{}"), ok("{}")]);

        api.mark_chapter_read("c9").await.unwrap();
        api.remove_from_history("c9").await.unwrap();

        let requests = sender.requests();
        assert_eq!(requests[0].url, "http://localhost:4000/users/me/history/c9");
        assert_eq!(requests[1].method, Method::DELETE);
    }
}

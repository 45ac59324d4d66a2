//! High-level client facade.
//!
//! [`Denshikawa`] owns the session, transport, and query cache, and exposes
//! the operations a UI layer consumes. Reads go through the cache; mutations
//! update or invalidate the affected entries so a later read never returns
//! data the mutation made stale.

use crate::api::{AuthApi, ChaptersApi, MangaApi, UserApi};
use crate::config::Config;
use crate::error::ApiError;
use crate::keys;
use crate::models::auth::{LoginRequest, RegisterRequest, User};
use crate::models::chapter::{Chapter, ChapterNavigation, ChapterPages};
use crate::models::manga::{MangaDetails, MangaSummary};
use crate::models::user::{Bookmark, HistoryItem, LibraryItem, Progress, UpdateProgressRequest};
use crate::models::Paginated;
use crate::query::QueryClient;
use crate::session::{Session, SessionStore};
use crate::transport::{ApiTransport, AuthEvent, HttpSend, ReqwestSender};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;

/// How long listing pages stay fresh.
const LISTING_STALE: Duration = Duration::from_secs(60);

/// How long detail records and chapter data stay fresh.
const DETAIL_STALE: Duration = Duration::from_secs(300);

/// How long user-scoped data stays fresh.
const USER_STALE: Duration = Duration::from_secs(30);

/// Client for the Denshikawa manga service.
pub struct Denshikawa {
    transport: Arc<ApiTransport>,
    session: Arc<Session>,
    queries: QueryClient,
    page_size: u64,
    language: String,
}

impl Denshikawa {
    /// Builds a client from configuration: persisted session, reqwest
    /// sender, fixed timeout.
    pub fn connect(config: &Config) -> anyhow::Result<Self> {
        config.validate()?;
        let session = Arc::new(Session::with_store(SessionStore::new(
            config.session_path()?,
        )));
        let sender: Arc<dyn HttpSend> = Arc::new(ReqwestSender::new(&config.api)?);
        Ok(Self::with_parts(sender, session, config))
    }

    /// Builds a client from explicit parts. Used by tests and by callers
    /// that manage their own session persistence.
    pub fn with_parts(
        sender: Arc<dyn HttpSend>,
        session: Arc<Session>,
        config: &Config,
    ) -> Self {
        let transport = Arc::new(ApiTransport::new(
            sender,
            session.clone(),
            &config.api.base_url,
        ));
        Self {
            transport,
            session,
            queries: QueryClient::new(),
            page_size: config.paging.page_size,
            language: config.language.clone(),
        }
    }

    /// Session state (read-only for callers; mutations happen through
    /// the auth operations below).
    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    /// The query cache, for status inspection.
    pub fn queries(&self) -> &QueryClient {
        &self.queries
    }

    /// Page size used for listings and searches.
    pub fn page_size(&self) -> u64 {
        self.page_size
    }

    /// Notifies when the session expires mid-request so the consumer can
    /// return to a login surface.
    pub fn subscribe_auth_events(&self) -> broadcast::Receiver<AuthEvent> {
        self.transport.subscribe_auth_events()
    }

    // Auth mutations

    /// Logs in, establishes the session, and primes the profile cache.
    pub async fn login(&self, email: &str, password: &str) -> Result<User, ApiError> {
        let response = AuthApi::new(self.transport.clone())
            .login(&LoginRequest {
                email: email.to_string(),
                password: password.to_string(),
            })
            .await?;
        self.install_session(response.user, response.tokens)
    }

    /// Registers a new account; same session handling as login.
    pub async fn register(
        &self,
        email: &str,
        username: &str,
        password: &str,
    ) -> Result<User, ApiError> {
        let response = AuthApi::new(self.transport.clone())
            .register(&RegisterRequest {
                email: email.to_string(),
                username: username.to_string(),
                password: password.to_string(),
            })
            .await?;
        self.install_session(response.user, response.tokens)
    }

    /// Signs in with a Google identity token.
    pub async fn login_with_google(&self, id_token: &str) -> Result<User, ApiError> {
        let response = AuthApi::new(self.transport.clone())
            .login_with_google(id_token)
            .await?;
        self.install_session(response.user, response.tokens)
    }

    fn install_session(
        &self,
        user: User,
        tokens: crate::models::auth::TokenPair,
    ) -> Result<User, ApiError> {
        self.session
            .login(user.clone(), tokens.access_token, tokens.refresh_token);
        self.queries.set(keys::user_me(), &user);
        Ok(user)
    }

    /// Logs out. The server call is best effort; local session and cache
    /// are always cleared so the client ends in a clean logged-out state.
    pub async fn logout(&self) {
        let _ = AuthApi::new(self.transport.clone()).logout().await;
        self.session.logout();
        self.queries.clear();
    }

    // Manga queries

    /// One page of the popularity listing.
    pub async fn popular(&self, offset: u64) -> Result<Paginated<MangaSummary>, ApiError> {
        let api = MangaApi::new(self.transport.clone());
        let limit = self.page_size;
        self.queries
            .fetch(
                keys::manga_popular().with(offset.to_string()),
                LISTING_STALE,
                move || async move { api.popular(limit, offset).await },
            )
            .await
    }

    /// One page of the recency listing.
    pub async fn latest(&self, offset: u64) -> Result<Paginated<MangaSummary>, ApiError> {
        let api = MangaApi::new(self.transport.clone());
        let limit = self.page_size;
        self.queries
            .fetch(
                keys::manga_latest().with(offset.to_string()),
                LISTING_STALE,
                move || async move { api.latest(limit, offset).await },
            )
            .await
    }

    /// One page of title search results. A blank query is disabled and
    /// resolves empty without touching the network.
    pub async fn search(
        &self,
        query: &str,
        offset: u64,
    ) -> Result<Paginated<MangaSummary>, ApiError> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Paginated::empty());
        }
        let api = MangaApi::new(self.transport.clone());
        let limit = self.page_size;
        let owned = query.to_string();
        self.queries
            .fetch(
                keys::manga_search(query).with(offset.to_string()),
                LISTING_STALE,
                move || async move { api.search(&owned, limit, offset).await },
            )
            .await
    }

    /// Manga detail record. Requires a non-empty identifier.
    pub async fn manga_details(&self, id: &str) -> Result<MangaDetails, ApiError> {
        require_id(id, "id")?;
        let api = MangaApi::new(self.transport.clone());
        let owned = id.to_string();
        self.queries
            .fetch(keys::manga_detail(id), DETAIL_STALE, move || async move {
                api.details(&owned).await
            })
            .await
    }

    /// Chapter list in the configured language.
    pub async fn manga_chapters(&self, id: &str) -> Result<Vec<Chapter>, ApiError> {
        require_id(id, "id")?;
        let api = MangaApi::new(self.transport.clone());
        let owned = id.to_string();
        let lang = self.language.clone();
        self.queries
            .fetch(
                keys::manga_chapters(id, &self.language),
                DETAIL_STALE,
                move || async move { api.chapters(&owned, &lang).await },
            )
            .await
    }

    // Chapter queries

    /// Ordered page descriptors for one chapter.
    pub async fn chapter_pages(&self, id: &str) -> Result<ChapterPages, ApiError> {
        require_id(id, "id")?;
        let api = ChaptersApi::new(self.transport.clone());
        let owned = id.to_string();
        self.queries
            .fetch(keys::chapter_pages(id), DETAIL_STALE, move || async move {
                api.pages(&owned).await
            })
            .await
    }

    /// Previous/next pointers for one chapter.
    pub async fn chapter_navigation(&self, id: &str) -> Result<ChapterNavigation, ApiError> {
        require_id(id, "id")?;
        let api = ChaptersApi::new(self.transport.clone());
        let owned = id.to_string();
        self.queries
            .fetch(
                keys::chapter_navigation(id),
                DETAIL_STALE,
                move || async move { api.navigation(&owned).await },
            )
            .await
    }

    // User queries

    /// Current profile. Disabled while logged out.
    pub async fn me(&self) -> Result<User, ApiError> {
        self.require_auth()?;
        let api = UserApi::new(self.transport.clone());
        self.queries
            .fetch(keys::user_me(), USER_STALE, move || async move {
                api.me().await
            })
            .await
    }

    /// Library listing. Disabled while logged out.
    pub async fn library(&self) -> Result<Vec<LibraryItem>, ApiError> {
        self.require_auth()?;
        let api = UserApi::new(self.transport.clone());
        self.queries
            .fetch(keys::user_library(), USER_STALE, move || async move {
                api.library().await
            })
            .await
    }

    /// Bookmark listing. Disabled while logged out.
    pub async fn bookmarks(&self) -> Result<Vec<Bookmark>, ApiError> {
        self.require_auth()?;
        let api = UserApi::new(self.transport.clone());
        self.queries
            .fetch(keys::user_bookmarks(), USER_STALE, move || async move {
                api.bookmarks().await
            })
            .await
    }

    /// Reading progress across all manga. Disabled while logged out.
    pub async fn all_progress(&self) -> Result<Vec<Progress>, ApiError> {
        self.require_auth()?;
        let api = UserApi::new(self.transport.clone());
        self.queries
            .fetch(keys::user_progress(), USER_STALE, move || async move {
                api.all_progress().await
            })
            .await
    }

    /// Reading progress for one manga. Disabled while logged out.
    pub async fn manga_progress(&self, manga_id: &str) -> Result<Progress, ApiError> {
        self.require_auth()?;
        require_id(manga_id, "manga_id")?;
        let api = UserApi::new(self.transport.clone());
        let owned = manga_id.to_string();
        self.queries
            .fetch(
                keys::user_manga_progress(manga_id),
                USER_STALE,
                move || async move { api.manga_progress(&owned).await },
            )
            .await
    }

    /// Reading history. Disabled while logged out.
    pub async fn history(&self) -> Result<Vec<HistoryItem>, ApiError> {
        self.require_auth()?;
        let api = UserApi::new(self.transport.clone());
        self.queries
            .fetch(keys::user_history(), USER_STALE, move || async move {
                api.history().await
            })
            .await
    }

    // User mutations

    /// Bookmarks a manga and invalidates the listings it appears in.
    pub async fn add_bookmark(&self, manga_id: &str) -> Result<(), ApiError> {
        require_id(manga_id, "manga_id")?;
        UserApi::new(self.transport.clone())
            .add_bookmark(manga_id)
            .await?;
        self.queries.invalidate(&keys::user_bookmarks());
        self.queries.invalidate(&keys::user_library());
        Ok(())
    }

    /// Removes a bookmark and invalidates the listings it appears in.
    pub async fn remove_bookmark(&self, manga_id: &str) -> Result<(), ApiError> {
        require_id(manga_id, "manga_id")?;
        UserApi::new(self.transport.clone())
            .remove_bookmark(manga_id)
            .await?;
        self.queries.invalidate(&keys::user_bookmarks());
        self.queries.invalidate(&keys::user_library());
        Ok(())
    }

    /// Upserts reading progress and invalidates progress-derived entries.
    pub async fn update_progress(
        &self,
        manga_id: &str,
        chapter_id: &str,
        page: u32,
    ) -> Result<(), ApiError> {
        require_id(manga_id, "manga_id")?;
        UserApi::new(self.transport.clone())
            .update_progress(
                manga_id,
                &UpdateProgressRequest {
                    chapter_id: chapter_id.to_string(),
                    page,
                },
            )
            .await?;
        self.queries.invalidate_prefix(&keys::user_progress());
        self.queries.invalidate(&keys::user_library());
        Ok(())
    }

    /// Marks a chapter read and invalidates the history listing.
    pub async fn mark_chapter_read(&self, chapter_id: &str) -> Result<(), ApiError> {
        require_id(chapter_id, "chapter_id")?;
        UserApi::new(self.transport.clone())
            .mark_chapter_read(chapter_id)
            .await?;
        self.queries.invalidate(&keys::user_history());
        Ok(())
    }

    /// Removes a history entry and invalidates the history listing.
    pub async fn remove_from_history(&self, chapter_id: &str) -> Result<(), ApiError> {
        require_id(chapter_id, "chapter_id")?;
        UserApi::new(self.transport.clone())
            .remove_from_history(chapter_id)
            .await?;
        self.queries.invalidate(&keys::user_history());
        Ok(())
    }

    fn require_auth(&self) -> Result<(), ApiError> {
        if self.session.is_authenticated() {
            Ok(())
        } else {
            Err(ApiError::Auth)
        }
    }
}

fn require_id(value: &str, field: &str) -> Result<(), ApiError> {
    if value.trim().is_empty() {
        Err(ApiError::Validation {
            field: Some(field.to_string()),
            message: format!("{field} is required"),
        })
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::QueryStatus;
    use crate::transport::testing::{FakeSender, ok, status};
    use crate::transport::HttpResponse;

    const LOGIN_OK: &str = r#"{
        "user": {"id":"u1","email":"a@b.com","username":"reader","role":"user","created_at":"2024-01-01T00:00:00Z"},
        "tokens": {"access_token":"A1","refresh_token":"R1","expires_in":3600}
    }"#;

    fn client(
        responses: Vec<Result<HttpResponse, ApiError>>,
    ) -> (Denshikawa, Arc<FakeSender>) {
        let sender = Arc::new(FakeSender::new(responses));
        let service = Denshikawa::with_parts(
            sender.clone(),
            Arc::new(Session::in_memory()),
            &Config::default(),
        );
        (service, sender)
    }

    #[tokio::test]
    async fn test_login_establishes_session_and_primes_cache() {
        let (service, _) = client(vec![ok(LOGIN_OK)]);

        let user = service.login("a@b.com", "password1").await.unwrap();
        assert_eq!(user.id, "u1");

        let session = service.session();
        assert!(session.is_authenticated());
        assert_eq!(session.access_token().as_deref(), Some("A1"));
        assert_eq!(session.refresh_token().as_deref(), Some("R1"));

        // user.me is populated without a second request.
        let cached: User = service.queries().get(&keys::user_me()).unwrap();
        assert_eq!(cached.username, "reader");
    }

    #[tokio::test]
    async fn test_failed_login_touches_nothing() {
        let (service, _) = client(vec![status(401, r#"{"message":"bad credentials"}"#)]);

        // A 401 on login itself has no refresh token to fall back on.
        let err = service.login("a@b.com", "password1").await.unwrap_err();
        assert_eq!(err, ApiError::Auth);
        assert!(!service.session().is_authenticated());
        assert_eq!(service.queries().status(&keys::user_me()), QueryStatus::Idle);
    }

    #[tokio::test]
    async fn test_logout_clears_session_and_cache() {
        let (service, sender) = client(vec![ok(LOGIN_OK), ok("{}")]);

        service.login("a@b.com", "password1").await.unwrap();
        service.logout().await;

        assert!(!service.session().is_authenticated());
        assert_eq!(service.queries().status(&keys::user_me()), QueryStatus::Idle);
        // A later profile read must refetch, not serve stale data.
        assert!(service.queries().get::<User>(&keys::user_me()).is_none());
        assert_eq!(sender.requests().len(), 2);
    }

    #[tokio::test]
    async fn test_logout_clears_even_when_server_rejects() {
        let (service, _) = client(vec![ok(LOGIN_OK), status(500, "{}")]);

        service.login("a@b.com", "password1").await.unwrap();
        service.logout().await;

        assert!(!service.session().is_authenticated());
    }

    #[tokio::test]
    async fn test_blank_search_is_disabled() {
        let (service, sender) = client(vec![]);

        let page = service.search("   ", 0).await.unwrap();
        assert!(page.data.is_empty());
        assert!(sender.requests().is_empty());
    }

    #[tokio::test]
    async fn test_user_queries_disabled_when_logged_out() {
        let (service, sender) = client(vec![]);

        assert_eq!(service.me().await.unwrap_err(), ApiError::Auth);
        assert_eq!(service.bookmarks().await.unwrap_err(), ApiError::Auth);
        assert!(sender.requests().is_empty());
    }

    #[tokio::test]
    async fn test_empty_detail_id_is_rejected_locally() {
        let (service, sender) = client(vec![]);

        let err = service.manga_details("").await.unwrap_err();
        assert!(matches!(err, ApiError::Validation { field: Some(f), .. } if f == "id"));
        assert!(sender.requests().is_empty());
    }

    #[tokio::test]
    async fn test_listing_pages_are_cached_per_offset() {
        const PAGE: &str = r#"{"data":[],"total":45,"limit":20,"offset":0}"#;
        let (service, sender) = client(vec![ok(PAGE)]);

        let first = service.popular(0).await.unwrap();
        let second = service.popular(0).await.unwrap();
        assert_eq!(first.total, second.total);
        // Second read came from cache.
        assert_eq!(sender.requests().len(), 1);
    }

    #[tokio::test]
    async fn test_add_bookmark_invalidates_user_listings() {
        let (service, sender) = client(vec![
            ok(LOGIN_OK),
            ok("[]"), // bookmarks listing
            ok("{}"), // add bookmark
        ]);

        service.login("a@b.com", "password1").await.unwrap();
        service.bookmarks().await.unwrap();
        assert_eq!(
            service.queries().status(&keys::user_bookmarks()),
            QueryStatus::Success
        );

        service.add_bookmark("m1").await.unwrap();
        assert_eq!(
            service.queries().status(&keys::user_bookmarks()),
            QueryStatus::Idle
        );
        assert_eq!(sender.requests().len(), 3);
    }

    #[tokio::test]
    async fn test_update_progress_invalidates_progress_entries() {
        let (service, _) = client(vec![ok(LOGIN_OK), ok("{}")]);

        service.login("a@b.com", "password1").await.unwrap();
        service
            .queries()
            .set(keys::user_progress(), &Vec::<Progress>::new());

        service.update_progress("m1", "c1", 7).await.unwrap();
        assert_eq!(
            service.queries().status(&keys::user_progress()),
            QueryStatus::Idle
        );
    }
}

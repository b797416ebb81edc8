//! Application state store.
//!
//! `AppStore` owns one slice per domain (auth, movies, favorites, theme)
//! together with the API client and persistence handles. Every async
//! operation runs the same lifecycle: the slice's pending handler, the
//! request, then the fulfilled or rejected handler. Errors end up as a
//! message on the slice and are also returned to the caller.
//!
//! In-flight requests are never cancelled. A slow response applied after a
//! newer one overwrites it.

pub mod auth;
pub mod favorites;
pub mod movies;
pub mod theme;

use std::sync::Arc;

use anyhow::Context;
use tracing::{debug, info, warn};

use crate::api::{ApiClient, ApiError};
use crate::auth::registry::LOCAL_TOKEN_PREFIX;
use crate::auth::{AccountRegistry, AuthError, SessionStore};
use crate::config::Config;
use crate::models::{AuthSession, Movie, MovieCategory, MoviePage, RegisterData, ThemeMode};
use crate::storage::{
    keys, FileBackend, KeyringBackend, MemoryBackend, SecureStorage, Storage,
};

pub use auth::AuthState;
pub use favorites::FavoritesState;
pub use movies::{ListingState, MoviesState, SearchState};
pub use theme::ThemeState;

/// Outcome of a store operation. The error message is the same one stored
/// on the slice.
pub type ActionResult = Result<(), String>;

/// Page requested when none is given
pub const FIRST_PAGE: u32 = 1;

pub struct AppStore {
    pub auth: AuthState,
    pub movies: MoviesState,
    pub favorites: FavoritesState,
    pub theme: ThemeState,

    api: ApiClient,
    storage: Storage,
    sessions: SessionStore,
    accounts: AccountRegistry,
}

impl AppStore {
    pub fn new(api: ApiClient, secure: SecureStorage, storage: Storage) -> Self {
        Self {
            auth: AuthState::default(),
            movies: MoviesState::default(),
            favorites: FavoritesState::default(),
            theme: ThemeState::default(),
            sessions: SessionStore::new(secure, storage.clone()),
            accounts: AccountRegistry::new(storage.clone()),
            api,
            storage,
        }
    }

    /// Store backed by files in the data directory and the OS keychain.
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let api = ApiClient::new(config).context("Failed to build HTTP client")?;
        let data_dir = config.data_dir()?;
        debug!(?data_dir, "Data directory configured");
        let files = FileBackend::new(data_dir).context("Failed to open data directory")?;
        Ok(Self::new(
            api,
            SecureStorage::new(Arc::new(KeyringBackend::default())),
            Storage::new(Arc::new(files)),
        ))
    }

    /// Store that keeps everything in memory for the life of the process.
    pub fn in_memory(config: &Config) -> Result<Self, ApiError> {
        Ok(Self::new(
            ApiClient::new(config)?,
            SecureStorage::new(Arc::new(MemoryBackend::new())),
            Storage::new(Arc::new(MemoryBackend::new())),
        ))
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    /// Restore persisted state at startup: theme, stored session, favorites.
    pub fn initialize(&mut self) {
        // Each loader records its own failure on its slice
        let _ = self.load_theme();
        let _ = self.load_stored_auth();
        let _ = self.load_favorites();
        info!(
            authenticated = self.auth.is_authenticated,
            favorites = self.favorites.count(),
            theme = self.theme.theme.as_str(),
            "Store initialized"
        );
    }

    // =========================================================================
    // Auth
    // =========================================================================

    fn finish_sign_in(&mut self, result: Result<AuthSession, AuthError>) -> ActionResult {
        match result {
            Ok(session) => {
                if !self.sessions.save(&session) {
                    warn!(user_id = session.user.id, "Signed in but session was not fully persisted");
                }
                info!(user_id = session.user.id, "Signed in");
                self.auth.sign_in_fulfilled(session);
                Ok(())
            }
            Err(e) => {
                let message = e.to_string();
                self.auth.sign_in_rejected(message.clone());
                Err(message)
            }
        }
    }

    /// Log in, checking locally registered accounts before the remote service.
    pub async fn login(&mut self, username: &str, password: &str) -> ActionResult {
        self.auth.sign_in_pending();
        let result = match self.accounts.authenticate(username, password) {
            Ok(Some(session)) => Ok(session),
            Ok(None) => self.api.login(username, password).await,
            Err(e) => Err(e),
        };
        self.finish_sign_in(result)
    }

    pub async fn register(&mut self, data: &RegisterData) -> ActionResult {
        self.auth.sign_in_pending();
        let result = self.accounts.register(data);
        self.finish_sign_in(result)
    }

    /// Restore the session saved by a previous login. A missing or
    /// half-written session leaves the store signed out.
    pub fn load_stored_auth(&mut self) -> ActionResult {
        self.auth.load_stored_pending();
        match self.sessions.load() {
            Some(session) => {
                self.auth.load_stored_fulfilled(session);
                Ok(())
            }
            None => {
                self.auth.load_stored_rejected();
                Err(AuthError::NoStoredSession.to_string())
            }
        }
    }

    /// Re-fetch the profile for a token issued by the remote service.
    pub async fn refresh_profile(&mut self) -> ActionResult {
        let Some(token) = self.auth.token.clone() else {
            return Err(AuthError::NoStoredSession.to_string());
        };
        if token.starts_with(LOCAL_TOKEN_PREFIX) {
            debug!("Local session, nothing to refresh");
            return Ok(());
        }

        self.auth.profile_pending();
        match self.api.profile(&token).await {
            Ok(user) => {
                self.storage.save(keys::USER_DATA, &user);
                self.auth.profile_fulfilled(user);
                Ok(())
            }
            Err(e) => {
                let message = e.to_string();
                self.auth.profile_rejected(message.clone());
                Err(message)
            }
        }
    }

    pub fn logout(&mut self) -> ActionResult {
        if self.sessions.clear() {
            info!("Signed out");
            self.auth.logout_fulfilled();
            Ok(())
        } else {
            let message = "Failed to clear stored session".to_string();
            self.auth.logout_rejected(message.clone());
            Err(message)
        }
    }

    // =========================================================================
    // Movies
    // =========================================================================

    fn apply_listing(
        listing: &mut ListingState,
        result: Result<MoviePage, ApiError>,
    ) -> ActionResult {
        match result {
            Ok(page) => {
                listing.fulfilled(page);
                Ok(())
            }
            Err(e) => {
                let message = e.to_string();
                listing.rejected(message.clone());
                Err(message)
            }
        }
    }

    pub async fn fetch_trending(&mut self, page: u32) -> ActionResult {
        self.movies.trending.pending();
        let result = self.api.trending_movies(page).await;
        Self::apply_listing(&mut self.movies.trending, result)
    }

    pub async fn fetch_popular(&mut self, page: u32) -> ActionResult {
        self.movies.popular.pending();
        let result = self.api.popular_movies(page).await;
        Self::apply_listing(&mut self.movies.popular, result)
    }

    /// Fetch trending and popular together, as the home screen does.
    pub async fn load_home(&mut self) -> ActionResult {
        self.movies.trending.pending();
        self.movies.popular.pending();
        let (trending, popular) = futures::join!(
            self.api.trending_movies(FIRST_PAGE),
            self.api.popular_movies(FIRST_PAGE)
        );
        let trending = Self::apply_listing(&mut self.movies.trending, trending);
        let popular = Self::apply_listing(&mut self.movies.popular, popular);
        trending.and(popular)
    }

    pub async fn fetch_category(&mut self, category: MovieCategory, page: u32) -> ActionResult {
        self.movies.category_pending(category);
        match self.api.movies_by_category(category, page).await {
            Ok(listing) => {
                self.movies.category_fulfilled(category, listing);
                Ok(())
            }
            Err(e) => {
                let message = e.to_string();
                self.movies.category_rejected(category, message.clone());
                Err(message)
            }
        }
    }

    pub async fn fetch_movie_details(&mut self, movie_id: i64) -> ActionResult {
        self.movies.details_pending();
        match self.api.movie_details(movie_id).await {
            Ok(details) => {
                self.movies.details_fulfilled(details);
                Ok(())
            }
            Err(e) => {
                let message = e.to_string();
                self.movies.details_rejected(message.clone());
                Err(message)
            }
        }
    }

    /// Search the catalog. A blank query resets the search slot instead.
    pub async fn search(&mut self, query: &str, page: u32) -> ActionResult {
        let query = query.trim();
        if query.is_empty() {
            self.movies.clear_search_results();
            return Ok(());
        }

        self.movies.search_results.pending();
        match self.api.search_movies(query, page).await {
            Ok(results) => {
                self.movies.search_results.fulfilled(query.to_string(), results);
                Ok(())
            }
            Err(e) => {
                let message = e.to_string();
                self.movies.search_results.rejected(message.clone());
                Err(message)
            }
        }
    }

    pub fn clear_search_results(&mut self) {
        self.movies.clear_search_results();
    }

    pub fn clear_selected_movie(&mut self) {
        self.movies.clear_selected_movie();
    }

    // =========================================================================
    // Favorites
    // =========================================================================

    pub fn load_favorites(&mut self) -> ActionResult {
        self.favorites.pending();
        match self.storage.try_get::<Vec<Movie>>(keys::FAVORITES) {
            Ok(stored) => {
                self.favorites.load_fulfilled(stored.unwrap_or_default());
                Ok(())
            }
            Err(e) => {
                let message = e.to_string();
                self.favorites.rejected(message.clone());
                Err(message)
            }
        }
    }

    /// Persist a recomputed list, then apply it.
    fn commit_favorites(&mut self, updated: Vec<Movie>) -> ActionResult {
        match self.storage.try_save(keys::FAVORITES, &updated) {
            Ok(()) => {
                debug!(count = updated.len(), "Favorites saved");
                self.favorites.mutation_fulfilled(updated);
                Ok(())
            }
            Err(e) => {
                let message = e.to_string();
                self.favorites.rejected(message.clone());
                Err(message)
            }
        }
    }

    /// Add a movie. Adding an id that is already a favorite changes nothing.
    pub fn add_favorite(&mut self, movie: Movie) -> ActionResult {
        self.favorites.pending();
        let updated = self.favorites.with_added(movie);
        self.commit_favorites(updated)
    }

    /// Remove a movie by id. Removing an absent id changes nothing.
    pub fn remove_favorite(&mut self, movie_id: i64) -> ActionResult {
        self.favorites.pending();
        let updated = self.favorites.with_removed(movie_id);
        self.commit_favorites(updated)
    }

    pub fn toggle_favorite(&mut self, movie: Movie) -> ActionResult {
        if self.favorites.is_favorite(movie.id) {
            self.remove_favorite(movie.id)
        } else {
            self.add_favorite(movie)
        }
    }

    /// Drop every favorite. The in-memory list is only emptied once the
    /// stored list is gone.
    pub fn clear_favorites(&mut self) -> ActionResult {
        self.favorites.pending();
        match self.storage.try_remove(keys::FAVORITES) {
            Ok(()) => {
                self.favorites.cleared();
                Ok(())
            }
            Err(e) => {
                let message = e.to_string();
                self.favorites.rejected(message.clone());
                Err(message)
            }
        }
    }

    // =========================================================================
    // Theme
    // =========================================================================

    pub fn load_theme(&mut self) -> ActionResult {
        self.theme.load_pending();
        match self.storage.try_get::<ThemeMode>(keys::THEME) {
            Ok(stored) => {
                self.theme.load_fulfilled(stored.unwrap_or_default());
                Ok(())
            }
            Err(e) => {
                let message = e.to_string();
                self.theme.load_rejected(message.clone());
                Err(message)
            }
        }
    }

    pub fn set_theme(&mut self, theme: ThemeMode) -> ActionResult {
        match self.storage.try_save(keys::THEME, &theme) {
            Ok(()) => {
                self.theme.theme_changed(theme);
                Ok(())
            }
            Err(e) => {
                let message = e.to_string();
                self.theme.change_rejected(message.clone());
                Err(message)
            }
        }
    }

    pub fn toggle_theme(&mut self) -> ActionResult {
        let next = self.theme.theme.toggled();
        self.set_theme(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{KeyValueBackend, StorageError};

    /// Serves reads from its seed data and refuses every change.
    struct ReadOnlyBackend(MemoryBackend);

    impl ReadOnlyBackend {
        fn seeded(entries: &[(&str, &str)]) -> Arc<Self> {
            let inner = MemoryBackend::new();
            for (key, value) in entries {
                inner.write(key, value).unwrap();
            }
            Arc::new(Self(inner))
        }

        fn refused(key: &str) -> StorageError {
            StorageError::io(key, std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only"))
        }
    }

    impl KeyValueBackend for ReadOnlyBackend {
        fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
            self.0.read(key)
        }

        fn write(&self, key: &str, _value: &str) -> Result<(), StorageError> {
            Err(Self::refused(key))
        }

        fn delete(&self, key: &str) -> Result<(), StorageError> {
            Err(Self::refused(key))
        }

        fn clear(&self) -> Result<(), StorageError> {
            Err(Self::refused("*"))
        }
    }

    /// Config whose remote endpoints refuse connections immediately.
    fn offline_config() -> Config {
        Config {
            tmdb_base_url: "http://127.0.0.1:9/3".to_string(),
            auth_base_url: "http://127.0.0.1:9".to_string(),
            request_timeout_secs: 5,
            ..Config::default()
        }
    }

    fn store_on(plain: Arc<MemoryBackend>, secure: Arc<MemoryBackend>) -> AppStore {
        AppStore::new(
            ApiClient::new(&offline_config()).unwrap(),
            SecureStorage::new(secure),
            Storage::new(plain),
        )
    }

    fn read_only_store(plain: Arc<ReadOnlyBackend>) -> AppStore {
        AppStore::new(
            ApiClient::new(&offline_config()).unwrap(),
            SecureStorage::new(Arc::new(MemoryBackend::new())),
            Storage::new(plain),
        )
    }

    fn movie(id: i64) -> Movie {
        serde_json::from_value(serde_json::json!({"id": id, "title": format!("Movie {}", id)})).unwrap()
    }

    fn register_form() -> RegisterData {
        RegisterData {
            username: "cinephile".to_string(),
            email: "cine@example.com".to_string(),
            password: "Popcorn1".to_string(),
            confirm_password: "Popcorn1".to_string(),
            first_name: "Agnes".to_string(),
            last_name: "Varda".to_string(),
        }
    }

    #[test]
    fn test_initialize_with_nothing_stored_is_signed_out() {
        let mut store = AppStore::in_memory(&offline_config()).unwrap();
        store.initialize();
        assert!(store.auth.is_initialized);
        assert!(!store.auth.is_authenticated);
        assert!(store.auth.user.is_none());
        assert!(store.auth.error.is_none());
        assert_eq!(store.theme.theme, ThemeMode::Light);
        assert!(store.favorites.is_empty());
    }

    #[tokio::test]
    async fn test_rejected_login_sets_error() {
        let mut store = AppStore::in_memory(&offline_config()).unwrap();
        let result = store.login("emilys", "emilyspass").await;
        assert_eq!(result, Err("Invalid username or password".to_string()));
        assert!(!store.auth.is_authenticated);
        assert!(!store.auth.is_loading);
        assert_eq!(store.auth.error.as_deref(), Some("Invalid username or password"));
    }

    #[tokio::test]
    async fn test_register_login_and_restore_session() {
        let plain = Arc::new(MemoryBackend::new());
        let secure = Arc::new(MemoryBackend::new());

        let mut store = store_on(plain.clone(), secure.clone());
        store.register(&register_form()).await.unwrap();
        assert!(store.auth.is_authenticated);
        store.logout().unwrap();
        assert!(!store.auth.is_authenticated);

        store.login("cinephile", "Popcorn1").await.unwrap();
        let user = store.auth.user.clone().unwrap();

        // A fresh store on the same storage picks the session back up
        let mut restarted = store_on(plain, secure);
        restarted.initialize();
        assert!(restarted.auth.is_authenticated);
        assert_eq!(restarted.auth.user, Some(user));
        // Local sessions have no remote profile to refresh
        assert_eq!(restarted.refresh_profile().await, Ok(()));
    }

    #[tokio::test]
    async fn test_local_wrong_password_is_rejected() {
        let mut store = AppStore::in_memory(&offline_config()).unwrap();
        store.register(&register_form()).await.unwrap();
        store.logout().unwrap();

        assert!(store.login("cinephile", "Popcorn2").await.is_err());
        assert!(!store.auth.is_authenticated);
        assert!(store.auth.error.is_some());
    }

    #[test]
    fn test_half_written_session_is_not_restored() {
        let plain = Arc::new(MemoryBackend::new());
        let secure = Arc::new(MemoryBackend::new());
        secure.write(keys::AUTH_TOKEN, "tok").unwrap();

        let mut store = store_on(plain, secure);
        store.initialize();
        assert!(!store.auth.is_authenticated);
        assert!(store.auth.token.is_none());
    }

    #[test]
    fn test_favorites_are_unique_and_persisted() {
        let plain = Arc::new(MemoryBackend::new());
        let mut store = store_on(plain.clone(), Arc::new(MemoryBackend::new()));

        store.add_favorite(movie(1)).unwrap();
        store.add_favorite(movie(2)).unwrap();
        store.add_favorite(movie(1)).unwrap();
        assert_eq!(store.favorites.count(), 2);

        store.remove_favorite(42).unwrap();
        assert_eq!(store.favorites.count(), 2);

        store.toggle_favorite(movie(2)).unwrap();
        assert!(!store.favorites.is_favorite(2));
        store.toggle_favorite(movie(3)).unwrap();

        let mut reloaded = store_on(plain, Arc::new(MemoryBackend::new()));
        reloaded.load_favorites().unwrap();
        let ids: Vec<i64> = reloaded.favorites.favorites.iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![1, 3]);
    }

    #[test]
    fn test_clear_favorites() {
        let plain = Arc::new(MemoryBackend::new());
        let mut store = store_on(plain.clone(), Arc::new(MemoryBackend::new()));
        store.add_favorite(movie(1)).unwrap();
        store.clear_favorites().unwrap();
        assert!(store.favorites.is_empty());
        assert_eq!(plain.read(keys::FAVORITES).unwrap(), None);
    }

    #[test]
    fn test_corrupt_favorites_reject_without_clobbering() {
        let plain = Arc::new(MemoryBackend::new());
        plain.write(keys::FAVORITES, "{broken").unwrap();
        let mut store = store_on(plain, Arc::new(MemoryBackend::new()));
        assert!(store.load_favorites().is_err());
        assert!(store.favorites.is_empty());
        assert!(store.favorites.error.is_some());
        assert!(!store.favorites.is_loading);
    }

    #[test]
    fn test_refused_add_favorite_keeps_list() {
        let stored = serde_json::to_string(&vec![movie(1)]).unwrap();
        let mut store = read_only_store(ReadOnlyBackend::seeded(&[(keys::FAVORITES, stored.as_str())]));
        store.load_favorites().unwrap();

        assert!(store.add_favorite(movie(2)).is_err());
        assert_eq!(store.favorites.count(), 1);
        assert!(!store.favorites.is_favorite(2));
        assert!(store.favorites.error.is_some());
        assert!(!store.favorites.is_loading);
    }

    #[test]
    fn test_refused_clear_favorites_keeps_list() {
        let stored = serde_json::to_string(&vec![movie(1)]).unwrap();
        let plain = ReadOnlyBackend::seeded(&[(keys::FAVORITES, stored.as_str())]);
        let mut store = read_only_store(plain.clone());
        store.load_favorites().unwrap();

        assert!(store.clear_favorites().is_err());
        assert_eq!(store.favorites.count(), 1);
        assert!(store.favorites.error.is_some());
        assert!(!store.favorites.is_loading);

        // Memory and storage still agree
        let mut reloaded = read_only_store(plain);
        reloaded.load_favorites().unwrap();
        assert_eq!(reloaded.favorites.favorites, store.favorites.favorites);
    }

    #[tokio::test]
    async fn test_refused_register_stays_signed_out() {
        let mut store = read_only_store(ReadOnlyBackend::seeded(&[]));

        assert!(store.register(&register_form()).await.is_err());
        assert!(!store.auth.is_authenticated);
        assert!(store.auth.user.is_none());
        assert!(store.auth.error.is_some());
        assert!(!store.auth.is_loading);
    }

    #[tokio::test]
    async fn test_register_keeps_unreadable_accounts() {
        let plain = Arc::new(MemoryBackend::new());
        let stored = r#"[{"id":1,"username":"alice","email":"alice@example.com","passwordHash":"x","firstName":"Alice","lastName":"A","image":"","createdAt":"not a date"}]"#;
        plain.write(keys::REGISTERED_USERS, stored).unwrap();
        let mut store = store_on(plain.clone(), Arc::new(MemoryBackend::new()));

        assert!(store.register(&register_form()).await.is_err());
        assert!(!store.auth.is_authenticated);
        assert_eq!(plain.read(keys::REGISTERED_USERS).unwrap().as_deref(), Some(stored));
    }

    #[test]
    fn test_toggle_theme_twice_restores_and_persists() {
        let plain = Arc::new(MemoryBackend::new());
        let mut store = store_on(plain.clone(), Arc::new(MemoryBackend::new()));
        let original = store.theme.theme;

        store.toggle_theme().unwrap();
        assert_eq!(store.theme.theme, ThemeMode::Dark);
        assert_eq!(plain.read(keys::THEME).unwrap().as_deref(), Some("\"dark\""));

        store.toggle_theme().unwrap();
        assert_eq!(store.theme.theme, original);

        store.set_theme(ThemeMode::Dark).unwrap();
        let mut reloaded = store_on(plain, Arc::new(MemoryBackend::new()));
        reloaded.load_theme().unwrap();
        assert!(reloaded.theme.is_dark());
    }

    #[tokio::test]
    async fn test_failed_fetch_keeps_previous_results() {
        let mut store = AppStore::in_memory(&offline_config()).unwrap();
        store.movies.trending.results = vec![movie(11)];

        assert!(store.fetch_trending(FIRST_PAGE).await.is_err());
        assert!(!store.movies.trending.is_loading);
        assert!(store.movies.trending.error.is_some());
        assert_eq!(store.movies.trending.results, vec![movie(11)]);

        assert!(store.fetch_category(MovieCategory::Upcoming, FIRST_PAGE).await.is_err());
        let upcoming = store.movies.category(MovieCategory::Upcoming).unwrap();
        assert!(upcoming.error.is_some());

        assert!(store.load_home().await.is_err());
        assert!(store.movies.popular.error.is_some());
    }

    #[tokio::test]
    async fn test_blank_search_clears_results() {
        let mut store = AppStore::in_memory(&offline_config()).unwrap();
        store.movies.search_results.query = "old".to_string();
        store.movies.search_results.listing.results = vec![movie(1)];

        assert_eq!(store.search("   ", FIRST_PAGE).await, Ok(()));
        assert_eq!(store.movies.search_results, SearchState::default());
    }

    #[tokio::test]
    async fn test_failed_details_sets_error() {
        let mut store = AppStore::in_memory(&offline_config()).unwrap();
        assert!(store.fetch_movie_details(27205).await.is_err());
        assert!(store.movies.selected_movie.is_none());
        assert!(store.movies.error.is_some());
        assert!(!store.movies.is_loading);
    }
}

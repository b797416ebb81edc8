//! API client for the TMDB catalog and the DummyJSON auth service.

use std::time::Duration;

use reqwest::{Client, RequestBuilder};
use serde::{de::DeserializeOwned, Deserialize};
use tracing::{debug, warn};

use crate::auth::AuthError;
use crate::config::Config;
use crate::models::{AuthSession, MovieCategory, MovieDetails, MoviePage, User};

use super::{image_url, ApiError, ImageSize};

// ============================================================================
// Constants
// ============================================================================

const SEARCH_PATH: &str = "/search/movie";
const MOVIE_DETAILS_PATH: &str = "/movie";
const AUTH_LOGIN_PATH: &str = "/auth/login";
const AUTH_PROFILE_PATH: &str = "/auth/me";

/// Extra responses bundled into the movie details call
const DETAILS_APPEND: &str = "credits,videos,similar";

/// Lifetime requested for DummyJSON tokens
const TOKEN_EXPIRY_MINS: u32 = 60;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LoginResponse {
    id: i64,
    username: String,
    #[serde(default)]
    email: String,
    #[serde(default)]
    first_name: String,
    #[serde(default)]
    last_name: String,
    #[serde(default)]
    image: Option<String>,
    #[serde(default)]
    gender: Option<String>,
    // Older DummyJSON deployments answer with `token`, newer with `accessToken`
    #[serde(default)]
    token: Option<String>,
    #[serde(default)]
    access_token: Option<String>,
}

impl LoginResponse {
    fn into_session(self) -> Result<AuthSession, ApiError> {
        let token = self
            .token
            .or(self.access_token)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| ApiError::InvalidResponse("login response carried no token".to_string()))?;
        Ok(AuthSession {
            token,
            user: User {
                id: self.id,
                username: self.username,
                email: self.email,
                first_name: self.first_name,
                last_name: self.last_name,
                image: self.image,
                gender: self.gender,
            },
        })
    }
}

/// Client for both remote services.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    api_key: String,
    tmdb_base_url: String,
    image_base_url: String,
    auth_base_url: String,
}

impl ApiClient {
    pub fn new(config: &Config) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        Ok(Self {
            client,
            api_key: config.tmdb_api_key.clone(),
            tmdb_base_url: config.tmdb_base_url.trim_end_matches('/').to_string(),
            image_base_url: config.image_base_url.clone(),
            auth_base_url: config.auth_base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Full URL for a poster or backdrop path.
    pub fn image_url(&self, path: Option<&str>, size: ImageSize) -> Option<String> {
        image_url(&self.image_base_url, path, size)
    }

    fn tmdb_request(&self, path: &str, params: &[(&str, String)]) -> RequestBuilder {
        let url = format!("{}{}", self.tmdb_base_url, path);
        self.client
            .get(url)
            .query(&[("api_key", self.api_key.as_str())])
            .query(params)
    }

    /// Check if response is successful, returning an error with body if not.
    async fn check_response(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            debug!(%status, body = %ApiError::truncate_body(&body), "Request rejected");
            Err(ApiError::from_status(status, &body))
        }
    }

    async fn send_json<T: DeserializeOwned>(request: RequestBuilder, what: &str) -> Result<T, ApiError> {
        let response = request.send().await.map_err(|e| {
            // reqwest errors embed the URL, which carries the API key
            let e = e.without_url();
            warn!(request = what, error = %e, "Request failed");
            e
        })?;
        let response = Self::check_response(response).await?;
        let text = response.text().await.map_err(|e| e.without_url())?;
        serde_json::from_str(&text).map_err(|e| {
            warn!(request = what, error = %e, "Failed to parse response");
            ApiError::InvalidResponse(format!("{}: {}", what, e))
        })
    }

    // ===== Catalog =====

    pub async fn movies_by_category(&self, category: MovieCategory, page: u32) -> Result<MoviePage, ApiError> {
        debug!(category = category.as_str(), page, "Fetching movie listing");
        let request = self.tmdb_request(category.endpoint(), &[("page", page.to_string())]);
        Self::send_json(request, category.as_str()).await
    }

    pub async fn trending_movies(&self, page: u32) -> Result<MoviePage, ApiError> {
        self.movies_by_category(MovieCategory::Trending, page).await
    }

    pub async fn popular_movies(&self, page: u32) -> Result<MoviePage, ApiError> {
        self.movies_by_category(MovieCategory::Popular, page).await
    }

    pub async fn top_rated_movies(&self, page: u32) -> Result<MoviePage, ApiError> {
        self.movies_by_category(MovieCategory::TopRated, page).await
    }

    pub async fn now_playing_movies(&self, page: u32) -> Result<MoviePage, ApiError> {
        self.movies_by_category(MovieCategory::NowPlaying, page).await
    }

    pub async fn upcoming_movies(&self, page: u32) -> Result<MoviePage, ApiError> {
        self.movies_by_category(MovieCategory::Upcoming, page).await
    }

    /// Fetch one movie with credits, videos and similar titles appended.
    pub async fn movie_details(&self, movie_id: i64) -> Result<MovieDetails, ApiError> {
        debug!(movie_id, "Fetching movie details");
        let path = format!("{}/{}", MOVIE_DETAILS_PATH, movie_id);
        let request = self.tmdb_request(&path, &[("append_to_response", DETAILS_APPEND.to_string())]);
        Self::send_json(request, "movie details").await
    }

    pub async fn search_movies(&self, query: &str, page: u32) -> Result<MoviePage, ApiError> {
        debug!(query, page, "Searching movies");
        let request = self.tmdb_request(
            SEARCH_PATH,
            &[("query", query.to_string()), ("page", page.to_string())],
        );
        Self::send_json(request, "search").await
    }

    // ===== Auth =====

    fn login_request(&self, username: &str, password: &str) -> RequestBuilder {
        let url = format!("{}{}", self.auth_base_url, AUTH_LOGIN_PATH);
        self.client.post(url).json(&serde_json::json!({
            "username": username,
            "password": password,
            "expiresInMins": TOKEN_EXPIRY_MINS,
        }))
    }

    /// Log in against the remote auth service.
    ///
    /// Every failure, including transport errors, is reported as invalid
    /// credentials. The underlying cause is only logged.
    pub async fn login(&self, username: &str, password: &str) -> Result<AuthSession, AuthError> {
        let result: Result<LoginResponse, ApiError> =
            Self::send_json(self.login_request(username, password), "login").await;
        match result.and_then(LoginResponse::into_session) {
            Ok(session) => {
                debug!(user_id = session.user.id, "Remote login succeeded");
                Ok(session)
            }
            Err(e) => {
                debug!(username, error = %e, "Remote login failed");
                Err(AuthError::InvalidCredentials)
            }
        }
    }

    /// Fetch the profile belonging to a bearer token.
    pub async fn profile(&self, token: &str) -> Result<User, AuthError> {
        let url = format!("{}{}", self.auth_base_url, AUTH_PROFILE_PATH);
        let request = self.client.get(url).bearer_auth(token);
        Self::send_json(request, "profile").await.map_err(|e| {
            debug!(error = %e, "Profile fetch failed");
            AuthError::ProfileUnavailable
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_client() -> ApiClient {
        let config = Config {
            tmdb_api_key: "test-key".to_string(),
            tmdb_base_url: "https://api.example.org/3/".to_string(),
            auth_base_url: "https://auth.example.org".to_string(),
            ..Config::default()
        };
        ApiClient::new(&config).unwrap()
    }

    #[test]
    fn test_tmdb_request_carries_api_key_and_params() {
        let client = test_client();
        let request = client
            .tmdb_request(MovieCategory::TopRated.endpoint(), &[("page", "3".to_string())])
            .build()
            .unwrap();
        assert_eq!(
            request.url().as_str(),
            "https://api.example.org/3/movie/top_rated?api_key=test-key&page=3"
        );
    }

    #[test]
    fn test_search_query_is_url_encoded() {
        let client = test_client();
        let request = client
            .tmdb_request(SEARCH_PATH, &[("query", "star wars & co".to_string())])
            .build()
            .unwrap();
        let pairs: Vec<(String, String)> = request
            .url()
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        assert!(pairs.contains(&("query".to_string(), "star wars & co".to_string())));
        assert!(!request.url().as_str().contains("star wars & co"));
    }

    #[test]
    fn test_login_request_body() {
        let client = test_client();
        let request = client.login_request("emilys", "emilyspass").build().unwrap();
        assert_eq!(request.method(), reqwest::Method::POST);
        assert_eq!(request.url().as_str(), "https://auth.example.org/auth/login");

        let body = request.body().and_then(|b| b.as_bytes()).unwrap();
        let json: serde_json::Value = serde_json::from_slice(body).unwrap();
        assert_eq!(json["username"], "emilys");
        assert_eq!(json["expiresInMins"], 60);
    }

    #[test]
    fn test_parse_login_response_variants() {
        let legacy = r#"{"id":1,"username":"emilys","email":"e@x.com","firstName":"Emily","lastName":"Johnson","gender":"female","image":"https://dummyjson.com/icon/emilys/128","token":"abc"}"#;
        let session = serde_json::from_str::<LoginResponse>(legacy)
            .unwrap()
            .into_session()
            .unwrap();
        assert_eq!(session.token, "abc");
        assert_eq!(session.user.first_name, "Emily");

        let current = r#"{"id":1,"username":"emilys","accessToken":"xyz","refreshToken":"r"}"#;
        let session = serde_json::from_str::<LoginResponse>(current)
            .unwrap()
            .into_session()
            .unwrap();
        assert_eq!(session.token, "xyz");

        let tokenless = r#"{"id":1,"username":"emilys"}"#;
        assert!(serde_json::from_str::<LoginResponse>(tokenless)
            .unwrap()
            .into_session()
            .is_err());
    }

    #[tokio::test]
    async fn test_login_transport_failure_is_masked() {
        // Nothing listens on the discard port, so the connection is refused
        let config = Config {
            auth_base_url: "http://127.0.0.1:9".to_string(),
            request_timeout_secs: 5,
            ..Config::default()
        };
        let client = ApiClient::new(&config).unwrap();
        let err = client.login("nobody", "secret").await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidCredentials));
        assert_eq!(err.to_string(), "Invalid username or password");
    }
}

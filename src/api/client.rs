use super::types::*;
use crate::session::Session;
use crate::util::{validate_base_url, UrlValidationError};
use futures::StreamExt;
use reqwest::redirect::Policy;
use reqwest::{Method, RequestBuilder, StatusCode};
use secrecy::ExposeSecret;
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Largest response body the client will buffer (5 MB).
const MAX_RESPONSE_SIZE: usize = 5 * 1024 * 1024;

/// Largest avatar file accepted for upload (5 MB).
const MAX_AVATAR_SIZE: u64 = 5 * 1024 * 1024;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    /// Non-2xx response. `message` is the server's `{message}` field, if any.
    #[error("HTTP error: status {status}")]
    HttpStatus { status: u16, message: Option<String> },
    /// 401 from the server: missing, invalid or expired credentials.
    #[error("Unauthorized")]
    Unauthorized { message: Option<String> },
    #[error("Invalid response body: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("Response too large (exceeds {0} bytes)")]
    ResponseTooLarge(usize),
    #[error("Invalid API base URL: {0}")]
    InvalidBaseUrl(#[from] UrlValidationError),
    /// Login or register succeeded without issuing a token.
    #[error("No access token received")]
    MissingToken,
    #[error("Failed to read upload: {0}")]
    Upload(#[from] std::io::Error),
}

impl ApiError {
    /// Text suitable for an inline form error.
    ///
    /// Prefers the server's own message, which is what the web client shows.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::HttpStatus {
                message: Some(m), ..
            }
            | ApiError::Unauthorized { message: Some(m) } => m.clone(),
            ApiError::HttpStatus { status, .. } => format!("Request failed (HTTP {})", status),
            ApiError::Unauthorized { message: None } => "Please log in again.".to_string(),
            ApiError::Network(e) if e.is_timeout() => "Request timed out".to_string(),
            ApiError::Network(_) => "Could not reach the server".to_string(),
            ApiError::Decode(_) | ApiError::ResponseTooLarge(_) => {
                "Unexpected response from the server".to_string()
            }
            ApiError::InvalidBaseUrl(e) => e.to_string(),
            ApiError::MissingToken => "No access token received".to_string(),
            ApiError::Upload(e) => format!("Could not read image: {}", e),
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Unauthorized { .. })
    }
}

/// Fields submitted by the profile editor.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProfileUpdate {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub username: String,
    pub bio: String,
    pub avatar: Option<PathBuf>,
}

/// Typed client for the DevHub REST backend.
///
/// Cheap to clone: the inner `reqwest::Client` is reference counted, so each
/// background task takes its own copy.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base: Url,
}

fn create_redirect_policy() -> Policy {
    Policy::custom(|attempt| {
        if attempt.previous().len() >= 3 {
            return attempt.error("Too many redirects (max 3)");
        }
        let url = attempt.url();
        if attempt.previous().iter().any(|prev| prev.as_str() == url.as_str()) {
            return attempt.error("Redirect loop detected");
        }
        tracing::debug!(
            to = %url,
            hop = attempt.previous().len() + 1,
            "Following redirect"
        );
        attempt.follow()
    })
}

impl ApiClient {
    /// Build a client for `base_url`.
    ///
    /// `timeout` of `None` leaves requests unbounded, matching the web client.
    pub fn new(base_url: &str, timeout: Option<Duration>) -> Result<Self, ApiError> {
        let base = validate_base_url(base_url)?;

        let mut builder = reqwest::Client::builder()
            .redirect(create_redirect_policy())
            .pool_max_idle_per_host(4)
            .pool_idle_timeout(Duration::from_secs(30))
            .tcp_keepalive(Duration::from_secs(60))
            .user_agent(concat!("devhub/", env!("CARGO_PKG_VERSION")));
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            http: builder.build()?,
            base,
        })
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| ApiError::InvalidBaseUrl(UrlValidationError::MissingHost))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn request(&self, method: Method, url: Url, session: &Session) -> RequestBuilder {
        tracing::debug!(method = %method, path = %url.path(), "API request");
        let request = self.http.request(method, url);
        match session.token() {
            Some(token) => request.bearer_auth(token.expose_secret()),
            None => request,
        }
    }

    async fn execute<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ApiError> {
        let body = self.send(request).await?;
        Ok(serde_json::from_slice(&body)?)
    }

    /// For endpoints whose success body is just `{message}`; an empty or odd
    /// body is still a success.
    async fn execute_message(&self, request: RequestBuilder) -> Result<Option<String>, ApiError> {
        let body = self.send(request).await?;
        Ok(serde_json::from_slice::<MessageBody>(&body)
            .unwrap_or_default()
            .message)
    }

    async fn send(&self, request: RequestBuilder) -> Result<Vec<u8>, ApiError> {
        let response = request.send().await?;
        let status = response.status();
        let body = read_limited_bytes(response, MAX_RESPONSE_SIZE).await?;

        if status.is_success() {
            return Ok(body);
        }

        let message = serde_json::from_slice::<MessageBody>(&body)
            .ok()
            .and_then(|b| b.message);
        tracing::debug!(status = status.as_u16(), message = ?message, "API error response");
        if status == StatusCode::UNAUTHORIZED {
            return Err(ApiError::Unauthorized { message });
        }
        Err(ApiError::HttpStatus {
            status: status.as_u16(),
            message,
        })
    }

    // ------------------------------------------------------------------------
    // Feed
    // ------------------------------------------------------------------------

    /// `GET /get_posts?page=&tag=`. An empty `tag` means no filter.
    pub async fn posts(&self, session: &Session, page: u32, tag: &str) -> Result<PostPage, ApiError> {
        let mut url = self.endpoint(&["get_posts"])?;
        url.query_pairs_mut()
            .append_pair("page", &page.to_string())
            .append_pair("tag", tag);
        self.execute(self.request(Method::GET, url, session)).await
    }

    pub async fn trending(&self, session: &Session) -> Result<Vec<TrendingStory>, ApiError> {
        let url = self.endpoint(&["trending_stories"])?;
        self.execute(self.request(Method::GET, url, session)).await
    }

    pub async fn tags(&self, session: &Session) -> Result<Vec<TagCount>, ApiError> {
        let url = self.endpoint(&["get_tags"])?;
        self.execute(self.request(Method::GET, url, session)).await
    }

    pub async fn recent_activities(&self, session: &Session) -> Result<Vec<Activity>, ApiError> {
        let url = self.endpoint(&["recent_activities"])?;
        self.execute(self.request(Method::GET, url, session)).await
    }

    pub async fn bookmarks(&self, session: &Session) -> Result<Vec<BookmarkedPost>, ApiError> {
        let url = self.endpoint(&["bookmarks"])?;
        self.execute(self.request(Method::GET, url, session)).await
    }

    // ------------------------------------------------------------------------
    // Post detail and interactions
    // ------------------------------------------------------------------------

    pub async fn post(&self, session: &Session, post_id: i64) -> Result<Post, ApiError> {
        let url = self.endpoint(&["get_post", &post_id.to_string()])?;
        self.execute(self.request(Method::GET, url, session)).await
    }

    pub async fn is_liked(&self, session: &Session, post_id: i64) -> Result<bool, ApiError> {
        let url = self.endpoint(&["is_liked", &post_id.to_string()])?;
        let flag: LikedFlag = self.execute(self.request(Method::GET, url, session)).await?;
        Ok(flag.is_liked)
    }

    pub async fn is_bookmarked(&self, session: &Session, post_id: i64) -> Result<bool, ApiError> {
        let url = self.endpoint(&["is_bookmarked", &post_id.to_string()])?;
        let flag: BookmarkedFlag = self.execute(self.request(Method::GET, url, session)).await?;
        Ok(flag.is_bookmarked)
    }

    pub async fn like_post(&self, session: &Session, post_id: i64) -> Result<LikeState, ApiError> {
        let url = self.endpoint(&["like_post", &post_id.to_string()])?;
        self.execute(self.request(Method::POST, url, session)).await
    }

    pub async fn bookmark_post(
        &self,
        session: &Session,
        post_id: i64,
    ) -> Result<BookmarkState, ApiError> {
        let url = self.endpoint(&["bookmark_post", &post_id.to_string()])?;
        self.execute(self.request(Method::POST, url, session)).await
    }

    pub async fn add_comment(
        &self,
        session: &Session,
        post_id: i64,
        content: &str,
    ) -> Result<Comment, ApiError> {
        let url = self.endpoint(&["add_comment", &post_id.to_string()])?;
        let request = self
            .request(Method::POST, url, session)
            .json(&NewComment { content });
        self.execute(request).await
    }

    pub async fn like_comment(
        &self,
        session: &Session,
        comment_id: i64,
    ) -> Result<LikeState, ApiError> {
        let url = self.endpoint(&["like_comment", &comment_id.to_string()])?;
        self.execute(self.request(Method::POST, url, session)).await
    }

    pub async fn delete_comment(&self, session: &Session, comment_id: i64) -> Result<(), ApiError> {
        let url = self.endpoint(&["delete_comment", &comment_id.to_string()])?;
        self.execute_message(self.request(Method::DELETE, url, session))
            .await
            .map(|_| ())
    }

    pub async fn delete_post(&self, session: &Session, post_id: i64) -> Result<(), ApiError> {
        let url = self.endpoint(&["delete_post", &post_id.to_string()])?;
        self.execute_message(self.request(Method::DELETE, url, session))
            .await
            .map(|_| ())
    }

    // ------------------------------------------------------------------------
    // Authoring
    // ------------------------------------------------------------------------

    pub async fn create_post(
        &self,
        session: &Session,
        post: &NewPost<'_>,
    ) -> Result<Option<String>, ApiError> {
        let url = self.endpoint(&["create_post"])?;
        self.execute_message(self.request(Method::POST, url, session).json(post))
            .await
    }

    pub async fn edit_post(
        &self,
        session: &Session,
        post_id: i64,
        edit: &PostEdit<'_>,
    ) -> Result<Option<String>, ApiError> {
        let url = self.endpoint(&["edit_post", &post_id.to_string()])?;
        self.execute_message(self.request(Method::PUT, url, session).json(edit))
            .await
    }

    // ------------------------------------------------------------------------
    // Accounts
    // ------------------------------------------------------------------------

    /// `POST /login`. Returns the issued token; the caller adopts it.
    pub async fn login(&self, credentials: &Credentials<'_>) -> Result<String, ApiError> {
        let url = self.endpoint(&["login"])?;
        let request = self
            .request(Method::POST, url, &Session::anonymous())
            .json(credentials);
        let response: TokenResponse = self.execute(request).await?;
        response
            .access_token
            .filter(|t| !t.is_empty())
            .ok_or(ApiError::MissingToken)
    }

    pub async fn register(&self, registration: &Registration<'_>) -> Result<String, ApiError> {
        let url = self.endpoint(&["register"])?;
        let request = self
            .request(Method::POST, url, &Session::anonymous())
            .json(registration);
        let response: TokenResponse = self.execute(request).await?;
        response
            .access_token
            .filter(|t| !t.is_empty())
            .ok_or(ApiError::MissingToken)
    }

    pub async fn logout(&self, session: &Session) -> Result<(), ApiError> {
        let url = self.endpoint(&["logout"])?;
        self.execute_message(self.request(Method::POST, url, session))
            .await
            .map(|_| ())
    }

    pub async fn current_user(&self, session: &Session) -> Result<UserProfile, ApiError> {
        let url = self.endpoint(&["current_user"])?;
        self.execute(self.request(Method::GET, url, session)).await
    }

    /// `PUT /edit_profile` as multipart; returns the updated profile.
    pub async fn edit_profile(
        &self,
        session: &Session,
        update: &ProfileUpdate,
    ) -> Result<UserProfile, ApiError> {
        let url = self.endpoint(&["edit_profile"])?;
        let mut form = reqwest::multipart::Form::new()
            .text("firstName", update.first_name.clone())
            .text("lastName", update.last_name.clone())
            .text("email", update.email.clone())
            .text("username", update.username.clone())
            .text("bio", update.bio.clone());

        if let Some(path) = &update.avatar {
            form = form.part("profile_pic", avatar_part(path).await?);
        }

        let request = self.request(Method::PUT, url, session).multipart(form);
        let envelope: ProfileEnvelope = self.execute(request).await?;
        Ok(envelope.user)
    }

    // ------------------------------------------------------------------------
    // Search
    // ------------------------------------------------------------------------

    /// `GET /search?q=`. Both result lists come back from one call.
    pub async fn search(&self, session: &Session, query: &str) -> Result<SearchResults, ApiError> {
        let mut url = self.endpoint(&["search"])?;
        url.query_pairs_mut().append_pair("q", query);
        let envelope: SearchEnvelope = self.execute(self.request(Method::GET, url, session)).await?;
        Ok(envelope.results)
    }
}

async fn avatar_part(path: &Path) -> Result<reqwest::multipart::Part, ApiError> {
    let meta = tokio::fs::metadata(path).await?;
    if meta.len() > MAX_AVATAR_SIZE {
        return Err(ApiError::Upload(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            format!("image is {} bytes (max {})", meta.len(), MAX_AVATAR_SIZE),
        )));
    }
    let bytes = tokio::fs::read(path).await?;
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "avatar".to_string());
    let mime = match path
        .extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
        .as_deref()
    {
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        _ => "image/jpeg",
    };
    Ok(reqwest::multipart::Part::bytes(bytes)
        .file_name(file_name)
        .mime_str(mime)?)
}

async fn read_limited_bytes(
    response: reqwest::Response,
    limit: usize,
) -> Result<Vec<u8>, ApiError> {
    if let Some(len) = response.content_length() {
        if len as usize > limit {
            return Err(ApiError::ResponseTooLarge(limit));
        }
    }

    let mut bytes = Vec::new();
    let mut stream = response.bytes_stream();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        if bytes.len().saturating_add(chunk.len()) > limit {
            return Err(ApiError::ResponseTooLarge(limit));
        }
        bytes.extend_from_slice(&chunk);
    }

    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> ApiClient {
        ApiClient::new(&server.uri(), None).unwrap()
    }

    #[tokio::test]
    async fn test_posts_query_parameters() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/get_posts"))
            .and(query_param("page", "2"))
            .and(query_param("tag", "rust"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "posts": [], "total": 0, "pages": 3, "current_page": 2
            })))
            .expect(1)
            .mount(&server)
            .await;

        let page = client_for(&server)
            .posts(&Session::anonymous(), 2, "rust")
            .await
            .unwrap();
        assert_eq!(page.pages, 3);
    }

    #[tokio::test]
    async fn test_bearer_header_sent_when_signed_in() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/like_post/7"))
            .and(header("authorization", "Bearer tok"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "message": "Post liked successfully", "isLiked": true, "likes": 5
            })))
            .expect(1)
            .mount(&server)
            .await;

        let state = client_for(&server)
            .like_post(&Session::with_token("tok"), 7)
            .await
            .unwrap();
        assert_eq!(state, LikeState { is_liked: true, likes: 5 });
    }

    #[tokio::test]
    async fn test_server_message_surfaces() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/register"))
            .respond_with(
                ResponseTemplate::new(400)
                    .set_body_json(serde_json::json!({"message": "Username already exists"})),
            )
            .mount(&server)
            .await;

        let err = client_for(&server)
            .register(&Registration {
                username: "alice",
                email: "a@example.com",
                password: "pw",
                first_name: "Alice",
                last_name: "",
            })
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::HttpStatus { status: 400, .. }));
        assert_eq!(err.user_message(), "Username already exists");
    }

    #[tokio::test]
    async fn test_401_maps_to_unauthorized() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/login"))
            .respond_with(
                ResponseTemplate::new(401)
                    .set_body_json(serde_json::json!({"message": "Invalid username or password"})),
            )
            .mount(&server)
            .await;

        let err = client_for(&server)
            .login(&Credentials {
                username: "alice",
                password: "wrong",
            })
            .await
            .unwrap_err();
        assert!(err.is_unauthorized());
        assert_eq!(err.user_message(), "Invalid username or password");
    }

    #[tokio::test]
    async fn test_login_without_token() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/login"))
            .and(body_json(serde_json::json!({"username": "alice", "password": "pw"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .login(&Credentials {
                username: "alice",
                password: "pw",
            })
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::MissingToken));
        assert_eq!(err.user_message(), "No access token received");
    }

    #[tokio::test]
    async fn test_oversized_response_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/get_tags"))
            .respond_with(ResponseTemplate::new(200).set_body_string("x".repeat(MAX_RESPONSE_SIZE + 1)))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .tags(&Session::anonymous())
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::ResponseTooLarge(_)));
    }

    #[tokio::test]
    async fn test_delete_accepts_empty_body() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/delete_comment/4"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        client_for(&server)
            .delete_comment(&Session::with_token("tok"), 4)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_base_path_prefix_is_kept() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/trending_stories"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                {"id": 1, "title": "Hot", "likes": 9, "host_username": "alice"}
            ])))
            .mount(&server)
            .await;

        let client = ApiClient::new(&format!("{}/api/", server.uri()), None).unwrap();
        let stories = client.trending(&Session::anonymous()).await.unwrap();
        assert_eq!(stories[0].title, "Hot");
    }

    #[tokio::test]
    async fn test_search_encodes_query() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search"))
            .and(query_param("q", "c++ & rust"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "results": {"posts": [], "users": [
                    {"id": 1, "username": "ferris", "full_name": "Ferris C", "profile_pic": null}
                ]}
            })))
            .mount(&server)
            .await;

        let results = client_for(&server)
            .search(&Session::anonymous(), "c++ & rust")
            .await
            .unwrap();
        assert_eq!(results.users[0].username, "ferris");
    }

    #[tokio::test]
    async fn test_edit_profile_returns_user() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/edit_profile"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "message": "Profile updated successfully",
                "user": {"id": 1, "username": "alice", "email": "a@example.com",
                         "firstName": "Alice", "lastName": "L", "bio": "hi", "profile_pic": null}
            })))
            .mount(&server)
            .await;

        let update = ProfileUpdate {
            first_name: "Alice".into(),
            username: "alice".into(),
            ..ProfileUpdate::default()
        };
        let user = client_for(&server)
            .edit_profile(&Session::with_token("tok"), &update)
            .await
            .unwrap();
        assert_eq!(user.first_name.as_deref(), Some("Alice"));
    }

    #[test]
    fn test_invalid_base_url() {
        assert!(matches!(
            ApiClient::new("ftp://example.com", None),
            Err(ApiError::InvalidBaseUrl(_))
        ));
    }
}

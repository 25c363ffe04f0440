//! Wire types for the DevHub REST backend.
//!
//! Field names follow the backend's JSON (a mix of snake_case and camelCase).
//! Optional fields default so partially populated payloads still decode.

use chrono::{DateTime, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize};

/// Deserialize an ISO-8601 timestamp, tolerating offsets and garbage.
///
/// The backend emits naive `isoformat()` strings; anything unparseable maps
/// to `None` rather than failing the whole payload.
fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<NaiveDateTime>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.and_then(|s| parse_timestamp(&s)))
}

pub(crate) fn parse_timestamp(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    if let Ok(dt) = s.parse::<NaiveDateTime>() {
        return Some(dt);
    }
    match DateTime::parse_from_rfc3339(s) {
        Ok(dt) => Some(dt.naive_utc()),
        Err(_) => {
            tracing::debug!(value = %s, "Unparseable timestamp from server");
            None
        }
    }
}

/// `null` → default, for list fields the backend sometimes omits or nulls.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

// ============================================================================
// Posts and comments
// ============================================================================

/// A post as returned by `get_posts` and `get_post`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Post {
    pub id: i64,
    pub title: String,
    /// Rich-text body (HTML). Treated as opaque except for previews.
    #[serde(default)]
    pub body: String,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub created: Option<NaiveDateTime>,
    pub host_id: i64,
    #[serde(default)]
    pub host_username: Option<String>,
    #[serde(default)]
    pub host_avatar: Option<String>,
    #[serde(default)]
    pub likes: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub tags: Vec<String>,
    /// Viewer like flag, when the payload carries one.
    #[serde(default, rename = "isLiked")]
    pub is_liked: Option<bool>,
    /// Present on the detail endpoint only.
    #[serde(default, deserialize_with = "null_as_default")]
    pub comments: Vec<Comment>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Author {
    pub id: i64,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub avatar: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Comment {
    pub id: i64,
    pub author: Author,
    pub content: String,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub created: Option<NaiveDateTime>,
    #[serde(default)]
    pub likes: u64,
    #[serde(default, rename = "isLiked")]
    pub is_liked: bool,
}

/// One page of the post list.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct PostPage {
    #[serde(default, deserialize_with = "null_as_default")]
    pub posts: Vec<Post>,
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub pages: u32,
    #[serde(default)]
    pub current_page: u32,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TrendingStory {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub likes: u64,
    #[serde(default)]
    pub host_username: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TagCount {
    pub name: String,
    #[serde(default)]
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ActivityPost {
    pub id: i64,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Activity {
    pub user: Author,
    pub post: ActivityPost,
    #[serde(default)]
    pub action: String,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub timestamp: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BookmarkedPost {
    pub id: i64,
    pub title: String,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub created: Option<NaiveDateTime>,
    #[serde(default)]
    pub host_username: Option<String>,
}

// ============================================================================
// Toggle responses
// ============================================================================

/// Response of `like_post` and `like_comment`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct LikeState {
    #[serde(rename = "isLiked")]
    pub is_liked: bool,
    pub likes: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct BookmarkState {
    #[serde(rename = "isBookmarked")]
    pub is_bookmarked: bool,
    #[serde(default)]
    pub bookmarks: Option<u64>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub(crate) struct LikedFlag {
    #[serde(rename = "isLiked")]
    pub is_liked: bool,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub(crate) struct BookmarkedFlag {
    #[serde(rename = "isBookmarked")]
    pub is_bookmarked: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct MessageBody {
    // JWT rejections use `msg` instead of `message`
    #[serde(default, alias = "msg")]
    pub message: Option<String>,
}

// ============================================================================
// Search
// ============================================================================

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SearchPost {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub host_username: Option<String>,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub created: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SearchUser {
    pub id: i64,
    pub username: String,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub profile_pic: Option<String>,
}

/// Both result lists from one query.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SearchResults {
    #[serde(default, deserialize_with = "null_as_default")]
    pub posts: Vec<SearchPost>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub users: Vec<SearchUser>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SearchEnvelope {
    #[serde(default)]
    pub results: SearchResults,
}

// ============================================================================
// Accounts
// ============================================================================

#[derive(Debug, Serialize)]
pub struct Credentials<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Serialize)]
pub struct Registration<'a> {
    pub username: &'a str,
    pub email: &'a str,
    pub password: &'a str,
    #[serde(rename = "firstName")]
    pub first_name: &'a str,
    #[serde(rename = "lastName")]
    pub last_name: &'a str,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TokenResponse {
    #[serde(default)]
    pub access_token: Option<String>,
}

/// The signed-in user's profile.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct UserProfile {
    pub id: i64,
    pub username: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default, rename = "firstName")]
    pub first_name: Option<String>,
    #[serde(default, rename = "lastName")]
    pub last_name: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub profile_pic: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ProfileEnvelope {
    pub user: UserProfile,
}

// ============================================================================
// Authoring
// ============================================================================

#[derive(Debug, Serialize)]
pub struct NewPost<'a> {
    pub title: &'a str,
    pub body: &'a str,
    pub tags: &'a [String],
}

#[derive(Debug, Serialize)]
pub struct PostEdit<'a> {
    pub title: &'a str,
    pub body: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct NewComment<'a> {
    pub content: &'a str,
}

//! Typed client for the DevHub REST backend.
//!
//! Every call takes the [`Session`](crate::session::Session) explicitly and
//! attaches its bearer token when one is present. Bodies are read with a size
//! cap before decoding.

mod client;
pub mod types;

pub use client::{ApiClient, ApiError, ProfileUpdate};
pub use types::{
    Activity, ActivityPost, Author, BookmarkState, BookmarkedPost, Comment, Credentials,
    LikeState, NewPost, Post, PostEdit, PostPage, Registration, SearchPost, SearchResults,
    SearchUser, TagCount, TrendingStory, UserProfile,
};

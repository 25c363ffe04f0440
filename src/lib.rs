//! DevHub terminal client.
//!
//! A ratatui front end for the DevHub developer blogging platform: browse the
//! tagged post feed, search posts and users, read and discuss posts, and
//! publish stories. The backend REST API is external; see [`api`].

pub mod api;
pub mod app;
pub mod auth;
pub mod config;
pub mod editor;
pub mod feed;
pub mod interaction;
pub mod overlay;
pub mod profile;
pub mod search;
pub mod session;
pub mod theme;
pub mod ui;
pub mod util;

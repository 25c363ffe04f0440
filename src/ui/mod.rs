//! Terminal User Interface module.
//!
//! - `loop_runner` - Main event loop and terminal management
//! - `input` - Keyboard input handling
//! - `events` - Background task event processing
//! - `render` - View rendering dispatch
//! - `helpers` - Background request spawning and view transitions
//! - `feed`, `post`, `compose`, `forms`, `bookmarks` - View widgets
//! - `search` - Search results panel
//! - `status` - Status bar widget

mod bookmarks;
mod compose;
mod events;
mod feed;
mod forms;
mod help;
mod helpers;
mod input;
mod loop_runner;
mod post;
mod render;
mod search;
mod status;

pub use loop_runner::{run, Action};

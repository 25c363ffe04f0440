//! Search overlay: submit-only combined post and user search.
//!
//! The query runs only on explicit submit. While a request is in flight the
//! overlay is busy and refuses another submit. Clearing the text drops the
//! results, hides the panel and invalidates any response still in flight.

use crate::api::{ApiError, SearchPost, SearchResults};
use crate::overlay::{Visibility, VisibilityEvent};
use crate::util::{strip_control_chars, strip_markup, truncate_chars, MAX_SEARCH_QUERY_LENGTH};
use thiserror::Error;

/// Default preview budget for post bodies, in characters.
pub const DEFAULT_PREVIEW_CHARS: usize = 150;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SearchRejected {
    #[error("Nothing to search for")]
    Empty,
    #[error("A search is already running")]
    Busy,
    #[error("Search query too long (max {0} chars)")]
    TooLong(usize),
}

/// A search the caller should run, tagged for stale-result detection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    pub generation: u64,
    pub query: String,
}

#[derive(Debug, Clone)]
pub struct SearchOverlay {
    query: String,
    results: Option<SearchResults>,
    busy: bool,
    panel: Visibility,
    generation: u64,
    preview_chars: usize,
}

impl Default for SearchOverlay {
    fn default() -> Self {
        Self::new(DEFAULT_PREVIEW_CHARS)
    }
}

impl SearchOverlay {
    pub fn new(preview_chars: usize) -> Self {
        Self {
            query: String::new(),
            results: None,
            busy: false,
            panel: Visibility::Closed,
            generation: 0,
            preview_chars,
        }
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    /// Replace the query text. Blank text clears results and hides the panel.
    pub fn set_query(&mut self, text: impl Into<String>) {
        self.query = text.into();
        if self.query.trim().is_empty() {
            self.drop_results();
        }
    }

    pub fn push_char(&mut self, c: char) {
        let mut text = std::mem::take(&mut self.query);
        text.push(c);
        self.set_query(text);
    }

    pub fn pop_char(&mut self) {
        let mut text = std::mem::take(&mut self.query);
        text.pop();
        self.set_query(text);
    }

    /// The clear button: empty text, no results, panel hidden.
    pub fn clear(&mut self) {
        self.set_query(String::new());
    }

    fn drop_results(&mut self) {
        self.results = None;
        self.panel = self.panel.next(VisibilityEvent::Close);
        if self.busy {
            tracing::debug!(generation = self.generation, "Search cleared while in flight");
        }
        self.busy = false;
        // Anything still in flight now belongs to a dead generation
        self.generation = self.generation.wrapping_add(1);
    }

    /// Start a search for the current text.
    pub fn submit(&mut self) -> Result<SearchRequest, SearchRejected> {
        if self.query.trim().is_empty() {
            return Err(SearchRejected::Empty);
        }
        if self.busy {
            return Err(SearchRejected::Busy);
        }
        if self.query.chars().count() > MAX_SEARCH_QUERY_LENGTH {
            return Err(SearchRejected::TooLong(MAX_SEARCH_QUERY_LENGTH));
        }
        self.busy = true;
        self.generation = self.generation.wrapping_add(1);
        Ok(SearchRequest {
            generation: self.generation,
            query: self.query.clone(),
        })
    }

    /// Apply a finished search. Returns `false` for a stale generation.
    ///
    /// Errors are logged; the panel keeps whatever state it had.
    pub fn resolve(
        &mut self,
        generation: u64,
        result: Result<SearchResults, ApiError>,
    ) -> bool {
        if generation != self.generation {
            tracing::debug!(generation, current = self.generation, "Discarding stale search results");
            return false;
        }
        self.busy = false;
        match result {
            Ok(results) => {
                tracing::debug!(
                    posts = results.posts.len(),
                    users = results.users.len(),
                    "Search completed"
                );
                self.results = Some(results);
                self.panel = self.panel.next(VisibilityEvent::Open);
            }
            Err(e) => {
                tracing::warn!(error = %e, "Search failed");
            }
        }
        true
    }

    /// Focus moved outside the search region: hide, keep the text.
    pub fn outside_click(&mut self) {
        self.panel = self.panel.next(VisibilityEvent::OutsideClick);
    }

    pub fn is_panel_open(&self) -> bool {
        self.panel.is_open() && self.results.is_some()
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }

    pub fn results(&self) -> Option<&SearchResults> {
        self.results.as_ref()
    }

    /// Display-safe body preview for a result post.
    pub fn preview(&self, post: &SearchPost) -> String {
        preview_text(&post.body, self.preview_chars)
    }
}

/// Strip markup, cut to `max_chars` (appending "..."), then remove anything
/// that could act as a terminal control sequence.
pub fn preview_text(body: &str, max_chars: usize) -> String {
    let plain = strip_markup(body);
    strip_control_chars(&truncate_chars(&plain, max_chars)).into_owned()
}

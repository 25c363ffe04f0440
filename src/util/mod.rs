//! Utility functions for common operations.
//!
//! - **URL validation**: base URL checks for the API and browser-open targets
//! - **Text processing**: Unicode-aware width, truncation, markup stripping
//!   and terminal sanitization for server-supplied text
//!
//! # Examples
//!
//! ```
//! use devhub::util::{strip_markup, truncate_chars, validate_base_url};
//!
//! let api = validate_base_url("http://127.0.0.1:5000").unwrap();
//! let preview = truncate_chars(&strip_markup("<p>Hello</p>"), 150);
//! ```

mod text;
mod url_validator;

pub use text::{
    display_width, shorten_label, strip_control_chars, strip_markup, truncate_chars,
    truncate_to_width,
};
pub use url_validator::{validate_base_url, validate_url_for_open, UrlValidationError};

/// Maximum allowed search query length, checked before any request is made
pub const MAX_SEARCH_QUERY_LENGTH: usize = 256;

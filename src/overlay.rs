//! Overlay visibility and the confirmation dialog.
//!
//! Every transient surface (the confirmation modal, the search results
//! panel) drives its visibility through the same [`Visibility`] machine.
//! There are no per-widget listeners; input handlers translate keys and
//! focus changes into [`VisibilityEvent`]s.

use std::time::Duration;
use tokio::time::Instant;

/// Default delay between closing an overlay and removing it.
pub const DEFAULT_UNMOUNT_DELAY: Duration = Duration::from_millis(300);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Visibility {
    #[default]
    Closed,
    Open,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisibilityEvent {
    Open,
    Close,
    Toggle,
    /// Interaction landed outside the overlay's region.
    OutsideClick,
}

impl Visibility {
    /// The transition table.
    pub fn next(self, event: VisibilityEvent) -> Self {
        use Visibility::*;
        use VisibilityEvent as E;
        match (self, event) {
            (_, E::Open) => Open,
            (_, E::Close) => Closed,
            (_, E::OutsideClick) => Closed,
            (Open, E::Toggle) => Closed,
            (Closed, E::Toggle) => Open,
        }
    }

    pub fn is_open(self) -> bool {
        self == Visibility::Open
    }
}

// ============================================================================
// Confirmation dialog
// ============================================================================

/// What confirming the dialog does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmKind {
    DeletePost { post_id: i64 },
    DeleteComment { comment_id: i64 },
    /// Confirm navigates to the sign-in view.
    LoginRequired,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmDialog {
    pub kind: ConfirmKind,
    pub title: String,
    pub message: String,
    pub confirm_text: String,
    pub cancel_text: String,
    /// Presentation only: confirm is drawn as a destructive action.
    pub destructive: bool,
}

impl ConfirmDialog {
    pub fn delete_post(post_id: i64) -> Self {
        Self {
            kind: ConfirmKind::DeletePost { post_id },
            title: "Delete Post".to_string(),
            message: "Are you sure you want to delete this post? This action cannot be undone."
                .to_string(),
            confirm_text: "Delete".to_string(),
            cancel_text: "Cancel".to_string(),
            destructive: true,
        }
    }

    pub fn delete_comment(comment_id: i64) -> Self {
        Self {
            kind: ConfirmKind::DeleteComment { comment_id },
            title: "Delete Comment".to_string(),
            message: "Are you sure you want to delete this comment? This action cannot be undone."
                .to_string(),
            confirm_text: "Delete".to_string(),
            cancel_text: "Cancel".to_string(),
            destructive: true,
        }
    }

    pub fn login_required(message: impl Into<String>) -> Self {
        Self {
            kind: ConfirmKind::LoginRequired,
            title: "Login Required".to_string(),
            message: message.into(),
            confirm_text: "Log In".to_string(),
            cancel_text: "Cancel".to_string(),
            destructive: false,
        }
    }
}

// ============================================================================
// Presence with unmount delay
// ============================================================================

/// An overlay slot with a delayed unmount.
///
/// Opening mounts content immediately. Closing flips visibility at once but
/// keeps the content mounted for `delay`, so an exit transition can draw.
/// Reopening during the delay cancels the pending unmount.
#[derive(Debug, Clone)]
pub struct Overlay<T> {
    content: Option<T>,
    visibility: Visibility,
    closed_at: Option<Instant>,
    delay: Duration,
}

impl<T> Default for Overlay<T> {
    fn default() -> Self {
        Self::new(DEFAULT_UNMOUNT_DELAY)
    }
}

impl<T> Overlay<T> {
    pub fn new(delay: Duration) -> Self {
        Self {
            content: None,
            visibility: Visibility::Closed,
            closed_at: None,
            delay,
        }
    }

    pub fn open(&mut self, content: T) {
        self.content = Some(content);
        self.apply(VisibilityEvent::Open);
    }

    pub fn close(&mut self) {
        self.apply(VisibilityEvent::Close);
    }

    /// Feed an event through the visibility table.
    pub fn apply(&mut self, event: VisibilityEvent) {
        let before = self.visibility;
        let after = before.next(event);
        if self.content.is_none() && after.is_open() {
            // Nothing to show
            return;
        }
        self.visibility = after;
        match (before, after) {
            (Visibility::Open, Visibility::Closed) => self.closed_at = Some(Instant::now()),
            (_, Visibility::Open) => self.closed_at = None,
            _ => {}
        }
    }

    pub fn visibility(&self) -> Visibility {
        self.visibility
    }

    pub fn is_open(&self) -> bool {
        self.visibility.is_open()
    }

    /// Content while mounted (open, or closing within the delay).
    pub fn content(&self) -> Option<&T> {
        self.content.as_ref()
    }

    /// Content only while open; what input handlers act on.
    pub fn active(&self) -> Option<&T> {
        self.content.as_ref().filter(|_| self.is_open())
    }

    pub fn is_mounted(&self) -> bool {
        self.content.is_some()
    }

    /// Remove closed content once the delay has passed. Returns `true` when
    /// something was unmounted, so the caller knows to redraw.
    pub fn tick(&mut self) -> bool {
        match self.closed_at {
            Some(at) if at.elapsed() >= self.delay => {
                self.closed_at = None;
                self.content = None;
                true
            }
            _ => false,
        }
    }
}

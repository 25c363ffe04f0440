//! Post detail view and its interactions.
//!
//! [`PostView`] holds the state of one open post. Each user action goes
//! through two phases:
//!
//! 1. A gate method (`like`, `bookmark`, `submit_comment`, ...) checks the
//!    session and local preconditions and either returns an [`Interaction`]
//!    to issue or opens the confirmation overlay instead.
//! 2. [`perform`] runs the request; [`PostView::apply`] folds the server's
//!    answer back in.
//!
//! Like and bookmark state only ever comes from a server response; nothing
//! is updated optimistically. Failures are logged and leave state untouched.

use crate::api::{ApiClient, ApiError, BookmarkState, Comment, LikeState, Post};
use crate::overlay::{ConfirmDialog, ConfirmKind, Overlay};
use crate::session::Session;
use crate::util::validate_url_for_open;
use std::time::Duration;
use url::Url;

pub const LIKE_LOGIN_MESSAGE: &str = "Please log in to like this post.";
pub const BOOKMARK_LOGIN_MESSAGE: &str = "Please log in to bookmark this post.";

/// A request the view wants issued.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Interaction {
    LikePost { post_id: i64 },
    BookmarkPost { post_id: i64 },
    AddComment { post_id: i64, content: String },
    LikeComment { comment_id: i64 },
    DeleteComment { comment_id: i64 },
    DeletePost { post_id: i64 },
}

impl Interaction {
    pub fn name(&self) -> &'static str {
        match self {
            Interaction::LikePost { .. } => "like_post",
            Interaction::BookmarkPost { .. } => "bookmark_post",
            Interaction::AddComment { .. } => "add_comment",
            Interaction::LikeComment { .. } => "like_comment",
            Interaction::DeleteComment { .. } => "delete_comment",
            Interaction::DeletePost { .. } => "delete_post",
        }
    }
}

/// Server answer to an [`Interaction`].
#[derive(Debug, Clone, PartialEq)]
pub enum InteractionResult {
    Liked(LikeState),
    Bookmarked(BookmarkState),
    CommentAdded(Comment),
    CommentLiked { comment_id: i64, state: LikeState },
    CommentDeleted { comment_id: i64 },
    PostDeleted,
}

/// Effect of applying a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Updated,
    /// The post is gone; the caller should leave the detail view.
    LeftView,
    Unchanged,
}

/// What confirming the open dialog asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Confirmed {
    Issue(Interaction),
    GoToLogin,
}

/// Issue one interaction against the backend.
pub async fn perform(
    client: &ApiClient,
    session: &Session,
    interaction: &Interaction,
) -> Result<InteractionResult, ApiError> {
    match interaction {
        Interaction::LikePost { post_id } => {
            client.like_post(session, *post_id).await.map(InteractionResult::Liked)
        }
        Interaction::BookmarkPost { post_id } => client
            .bookmark_post(session, *post_id)
            .await
            .map(InteractionResult::Bookmarked),
        Interaction::AddComment { post_id, content } => client
            .add_comment(session, *post_id, content)
            .await
            .map(InteractionResult::CommentAdded),
        Interaction::LikeComment { comment_id } => client
            .like_comment(session, *comment_id)
            .await
            .map(|state| InteractionResult::CommentLiked {
                comment_id: *comment_id,
                state,
            }),
        Interaction::DeleteComment { comment_id } => client
            .delete_comment(session, *comment_id)
            .await
            .map(|_| InteractionResult::CommentDeleted {
                comment_id: *comment_id,
            }),
        Interaction::DeletePost { post_id } => client
            .delete_post(session, *post_id)
            .await
            .map(|_| InteractionResult::PostDeleted),
    }
}

/// Load a post for the detail view.
///
/// The post itself must load. The like and bookmark flags are only asked for
/// when signed in, and a failure there is logged and falls back to the
/// detail payload (or false).
pub async fn load_post(
    client: &ApiClient,
    session: &Session,
    post_id: i64,
    overlay_delay: Duration,
) -> Result<PostView, ApiError> {
    let post = client.post(session, post_id).await?;

    let (liked, bookmarked) = if session.is_authenticated() {
        let (liked, bookmarked) = tokio::join!(
            client.is_liked(session, post_id),
            client.is_bookmarked(session, post_id),
        );
        let liked = liked.unwrap_or_else(|e| {
            tracing::warn!(post_id, error = %e, "Failed to fetch like status");
            post.is_liked.unwrap_or(false)
        });
        let bookmarked = bookmarked.unwrap_or_else(|e| {
            tracing::warn!(post_id, error = %e, "Failed to fetch bookmark status");
            false
        });
        (liked, bookmarked)
    } else {
        (post.is_liked.unwrap_or(false), false)
    };

    let mut view = PostView::new(post, session, overlay_delay);
    view.liked = liked;
    view.bookmarked = bookmarked;
    Ok(view)
}

/// Web link for a post, for sharing.
pub fn share_url(web_base: &str, post_id: i64) -> Option<Url> {
    let base = web_base.trim_end_matches('/');
    match validate_url_for_open(&format!("{}/post/{}", base, post_id)) {
        Ok(url) => Some(url),
        Err(e) => {
            tracing::warn!(error = %e, "Cannot build share link");
            None
        }
    }
}

// ============================================================================
// Post view state
// ============================================================================

#[derive(Debug, Clone)]
pub struct PostView {
    post: Post,
    liked: bool,
    likes: u64,
    bookmarked: bool,
    comments: Vec<Comment>,
    draft: String,
    staged_comment_delete: Option<i64>,
    viewer_id: Option<i64>,
    is_owner: bool,
    confirm: Overlay<ConfirmDialog>,
}

impl PostView {
    /// Build the view from a detail payload. Ownership compares the viewer's
    /// token subject with the post's author id.
    pub fn new(mut post: Post, session: &Session, overlay_delay: Duration) -> Self {
        let comments = std::mem::take(&mut post.comments);
        let viewer_id = session.viewer_id();
        let is_owner = viewer_id == Some(post.host_id);
        Self {
            liked: post.is_liked.unwrap_or(false),
            likes: post.likes,
            bookmarked: false,
            comments,
            draft: String::new(),
            staged_comment_delete: None,
            viewer_id,
            is_owner,
            confirm: Overlay::new(overlay_delay),
            post,
        }
    }

    pub fn post(&self) -> &Post {
        &self.post
    }

    pub fn post_id(&self) -> i64 {
        self.post.id
    }

    pub fn is_liked(&self) -> bool {
        self.liked
    }

    pub fn likes(&self) -> u64 {
        self.likes
    }

    pub fn is_bookmarked(&self) -> bool {
        self.bookmarked
    }

    pub fn comments(&self) -> &[Comment] {
        &self.comments
    }

    pub fn is_owner(&self) -> bool {
        self.is_owner
    }

    /// Whether the viewer wrote this comment and may delete it.
    pub fn can_delete_comment(&self, comment_id: i64) -> bool {
        self.viewer_id.is_some_and(|viewer| {
            self.comments
                .iter()
                .any(|c| c.id == comment_id && c.author.id == viewer)
        })
    }

    pub fn draft(&self) -> &str {
        &self.draft
    }

    pub fn draft_mut(&mut self) -> &mut String {
        &mut self.draft
    }

    pub fn staged_comment_delete(&self) -> Option<i64> {
        self.staged_comment_delete
    }

    pub fn confirm(&self) -> &Overlay<ConfirmDialog> {
        &self.confirm
    }

    pub fn confirm_mut(&mut self) -> &mut Overlay<ConfirmDialog> {
        &mut self.confirm
    }

    // ------------------------------------------------------------------------
    // Gates
    // ------------------------------------------------------------------------

    fn require_login(&mut self, session: &Session, message: &str) -> bool {
        if session.is_authenticated() {
            return true;
        }
        tracing::debug!(post_id = self.post.id, "Interaction needs login");
        self.confirm.open(ConfirmDialog::login_required(message));
        false
    }

    pub fn like(&mut self, session: &Session) -> Option<Interaction> {
        self.require_login(session, LIKE_LOGIN_MESSAGE)
            .then_some(Interaction::LikePost {
                post_id: self.post.id,
            })
    }

    pub fn bookmark(&mut self, session: &Session) -> Option<Interaction> {
        self.require_login(session, BOOKMARK_LOGIN_MESSAGE)
            .then_some(Interaction::BookmarkPost {
                post_id: self.post.id,
            })
    }

    /// Submit the comment draft. Blank drafts and signed-out viewers are a
    /// no-op; the draft is only cleared once the server accepts it.
    pub fn submit_comment(&self, session: &Session) -> Option<Interaction> {
        let content = self.draft.trim();
        if content.is_empty() || !session.is_authenticated() {
            return None;
        }
        Some(Interaction::AddComment {
            post_id: self.post.id,
            content: self.draft.clone(),
        })
    }

    pub fn like_comment(&self, comment_id: i64) -> Option<Interaction> {
        self.comments
            .iter()
            .any(|c| c.id == comment_id)
            .then_some(Interaction::LikeComment { comment_id })
    }

    /// Stage a comment for deletion and ask for confirmation. Only the
    /// comment's author may do this.
    pub fn request_comment_delete(&mut self, comment_id: i64) {
        if !self.can_delete_comment(comment_id) {
            return;
        }
        self.staged_comment_delete = Some(comment_id);
        self.confirm.open(ConfirmDialog::delete_comment(comment_id));
    }

    /// Ask for confirmation before deleting the post. Owner only.
    pub fn request_post_delete(&mut self) {
        if !self.is_owner {
            tracing::debug!(post_id = self.post.id, "Delete requested by non-owner, ignoring");
            return;
        }
        self.confirm.open(ConfirmDialog::delete_post(self.post.id));
    }

    /// Confirm the open dialog. The dialog closes either way.
    pub fn confirm_dialog(&mut self) -> Option<Confirmed> {
        let kind = self.confirm.active()?.kind;
        self.confirm.close();
        match kind {
            ConfirmKind::LoginRequired => Some(Confirmed::GoToLogin),
            ConfirmKind::DeletePost { post_id } => {
                Some(Confirmed::Issue(Interaction::DeletePost { post_id }))
            }
            ConfirmKind::DeleteComment { .. } => self
                .staged_comment_delete
                .map(|comment_id| Confirmed::Issue(Interaction::DeleteComment { comment_id })),
        }
    }

    /// Cancel the open dialog. A staged comment delete is dropped without
    /// any request.
    pub fn cancel_dialog(&mut self) {
        if self.confirm.active().is_none() {
            return;
        }
        self.confirm.close();
        self.staged_comment_delete = None;
    }

    // ------------------------------------------------------------------------
    // Apply
    // ------------------------------------------------------------------------

    /// Fold a finished interaction into the view.
    pub fn apply(
        &mut self,
        interaction: &Interaction,
        result: Result<InteractionResult, ApiError>,
    ) -> Outcome {
        let result = match result {
            Ok(result) => result,
            Err(e) => {
                tracing::warn!(
                    post_id = self.post.id,
                    action = interaction.name(),
                    error = %e,
                    "Interaction failed"
                );
                if let Interaction::DeleteComment { comment_id } = interaction {
                    if self.staged_comment_delete == Some(*comment_id) {
                        self.staged_comment_delete = None;
                    }
                }
                return Outcome::Unchanged;
            }
        };

        match result {
            InteractionResult::Liked(state) => {
                self.liked = state.is_liked;
                self.likes = state.likes;
            }
            InteractionResult::Bookmarked(state) => {
                self.bookmarked = state.is_bookmarked;
            }
            InteractionResult::CommentAdded(comment) => {
                self.comments.push(comment);
                self.draft.clear();
            }
            InteractionResult::CommentLiked { comment_id, state } => {
                match self.comments.iter_mut().find(|c| c.id == comment_id) {
                    Some(comment) => {
                        comment.is_liked = state.is_liked;
                        comment.likes = state.likes;
                    }
                    None => return Outcome::Unchanged,
                }
            }
            InteractionResult::CommentDeleted { comment_id } => {
                self.comments.retain(|c| c.id != comment_id);
                if self.staged_comment_delete == Some(comment_id) {
                    self.staged_comment_delete = None;
                }
            }
            InteractionResult::PostDeleted => {
                tracing::info!(post_id = self.post.id, "Post deleted");
                return Outcome::LeftView;
            }
        }
        Outcome::Updated
    }
}

//! Application event handling.
//!
//! Applies the results of background requests (feed loads, post loads,
//! interactions, searches, account calls) to application state.

use crate::app::{App, AppEvent, View};
use crate::auth::apply_logout;
use crate::editor::DraftMode;
use crate::interaction::{Interaction, Outcome};
use tokio::sync::mpsc;

use super::helpers::{open_post, reload_feed, spawn_current_user};

/// Handle application events from background tasks.
pub(super) fn handle_app_event(app: &mut App, event: AppEvent, event_tx: &mpsc::Sender<AppEvent>) {
    match event {
        AppEvent::FeedLoaded {
            generation,
            snapshot,
        } => {
            if app.feed.apply(generation, snapshot) {
                app.clamp_selections();
            }
        }
        AppEvent::PostLoaded { post_id, result } => {
            if app.view != View::Post || app.post_loading != Some(post_id) {
                tracing::debug!(post_id, "Ignoring post load for a view that has closed");
                return;
            }
            app.post_loading = None;
            match result {
                Ok(view) => {
                    app.post_view = Some(view);
                    app.clamp_selections();
                }
                Err(e) => {
                    tracing::error!(post_id, error = %e, "Failed to load post");
                    app.close_post();
                    app.set_status(format!("Could not load post: {}", e.user_message()));
                }
            }
        }
        AppEvent::InteractionDone {
            post_id,
            interaction,
            result,
        } => handle_interaction_done(app, post_id, interaction, result, event_tx),
        AppEvent::SearchCompleted { generation, result } => {
            if app.search.resolve(generation, result) {
                app.search_cursor = None;
            }
        }
        AppEvent::AuthCompleted { request, result } => {
            if app.auth.resolve(&request, result, &mut app.session) {
                app.view = View::Feed;
                app.set_status("Signed in");
                spawn_current_user(app, event_tx);
                reload_feed(app, event_tx);
            }
        }
        AppEvent::LoggedOut(result) => {
            if apply_logout(&mut app.session, result) {
                app.current_user = None;
                if matches!(app.view, View::Compose | View::Settings | View::Bookmarks) {
                    app.view = View::Feed;
                }
                app.set_status("Logged out");
                reload_feed(app, event_tx);
            } else {
                app.set_status("Logout failed");
            }
        }
        AppEvent::CurrentUserLoaded(result) => match result {
            Ok(user) => {
                tracing::debug!(user_id = user.id, "Current user loaded");
                if app.view == View::Settings && !app.profile.is_busy() {
                    app.profile.fill(&user);
                }
                app.current_user = Some(user);
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to load current user");
                if e.is_unauthorized() {
                    app.set_status("Session expired, please log in again");
                }
            }
        },
        AppEvent::DraftSaved(result) => {
            let Some(draft) = app.draft.as_mut() else {
                return;
            };
            let mode = draft.mode();
            if !draft.resolve(result) {
                return;
            }
            app.draft = None;
            match mode {
                DraftMode::Create => {
                    app.set_status("Post published");
                    app.view = View::Feed;
                    reload_feed(app, event_tx);
                }
                DraftMode::Edit { post_id } => {
                    app.set_status("Post updated");
                    open_post(app, post_id, event_tx);
                }
            }
        }
        AppEvent::ComposeTagsLoaded(result) => match result {
            Ok(tags) => {
                if let Some(draft) = app.draft.as_mut() {
                    draft.set_available(&tags);
                }
            }
            Err(e) => tracing::warn!(error = %e, "Failed to load tags for composer"),
        },
        AppEvent::ProfileSaved(result) => {
            let user = result.as_ref().ok().cloned();
            if app.profile.resolve(result) {
                app.current_user = user;
                app.set_status("Profile updated");
            }
        }
        AppEvent::BookmarksLoaded(result) => {
            app.bookmarks_loading = false;
            match result {
                Ok(bookmarks) => {
                    app.bookmarks = bookmarks;
                    app.clamp_selections();
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Failed to load bookmarks");
                    app.set_status(format!("Could not load bookmarks: {}", e.user_message()));
                }
            }
        }
        AppEvent::TaskPanicked { task, error } => {
            tracing::error!(task, error, "Background task panicked");
            app.set_status(format!("Internal error in {} task", task));
        }
    }
}

fn handle_interaction_done(
    app: &mut App,
    post_id: i64,
    interaction: Interaction,
    result: Result<crate::interaction::InteractionResult, crate::api::ApiError>,
    event_tx: &mpsc::Sender<AppEvent>,
) {
    let Some(view) = app.post_view.as_mut().filter(|v| v.post_id() == post_id) else {
        tracing::debug!(post_id, action = interaction.name(), "Result for a post no longer shown");
        return;
    };

    // Failures are logged by `apply` and leave the view as it was
    let outcome = view.apply(&interaction, result);
    match outcome {
        Outcome::LeftView => {
            app.feed.remove_post(post_id);
            app.close_post();
            app.set_status("Post deleted");
            reload_feed(app, event_tx);
        }
        Outcome::Updated => {
            if matches!(interaction, Interaction::AddComment { .. }) {
                app.comment_input = false;
            }
            app.clamp_selections();
        }
        Outcome::Unchanged => {}
    }
}

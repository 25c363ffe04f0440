//! Helper functions for UI operations.
//!
//! Background request spawning, view transitions and URL opening shared by
//! the input and event handlers.

use crate::app::{App, AppEvent, View};
use crate::auth::{authenticate, AuthRequest};
use crate::editor::{submit_draft, DraftSubmit, PostDraft};
use crate::feed::{fetch_feed, FeedLoad};
use crate::interaction::{load_post, perform, share_url, Interaction};
use crate::search::SearchRequest;
use futures::FutureExt;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use tokio::sync::mpsc;

/// Wraps a future to catch panics and convert them to errors.
///
/// Panics in spawned tasks become `Err(String)` holding the panic message,
/// so they can be reported instead of silently disappearing.
pub(super) async fn catch_task_panic<F, T>(future: F) -> Result<T, String>
where
    F: Future<Output = T>,
{
    AssertUnwindSafe(future)
        .catch_unwind()
        .await
        .map_err(|panic| {
            if let Some(s) = panic.downcast_ref::<&'static str>() {
                s.to_string()
            } else if let Some(s) = panic.downcast_ref::<String>() {
                s.clone()
            } else if let Some(e) = panic.downcast_ref::<Box<dyn std::error::Error + Send>>() {
                e.to_string()
            } else {
                format!("Unknown panic: {:?}", (*panic).type_id())
            }
        })
}

/// Run `future` in the background and deliver its event to the loop.
///
/// A panic inside the task is reported as `AppEvent::TaskPanicked`.
pub(super) fn spawn_task<F>(task: &'static str, tx: &mpsc::Sender<AppEvent>, future: F)
where
    F: Future<Output = AppEvent> + Send + 'static,
{
    let tx = tx.clone();
    tokio::spawn(async move {
        let event = match catch_task_panic(future).await {
            Ok(event) => event,
            Err(panic_msg) => {
                tracing::error!(task, error = %panic_msg, "Background task panicked");
                AppEvent::TaskPanicked {
                    task,
                    error: panic_msg,
                }
            }
        };
        if let Err(e) = tx.send(event).await {
            tracing::warn!(task, error = %e, "Channel send failed (receiver dropped)");
        }
    });
}

pub(super) fn spawn_feed_load(app: &App, load: FeedLoad, tx: &mpsc::Sender<AppEvent>) {
    let client = app.client.clone();
    let session = app.session.clone();
    spawn_task("feed_load", tx, async move {
        let snapshot = fetch_feed(&client, &session, &load.query).await;
        AppEvent::FeedLoaded {
            generation: load.generation,
            snapshot,
        }
    });
}

/// Start a fresh load of the current feed query.
pub(super) fn reload_feed(app: &mut App, tx: &mpsc::Sender<AppEvent>) {
    let load = app.feed.begin_load();
    spawn_feed_load(app, load, tx);
}

/// Open the detail view for `post_id` and start loading it.
pub(super) fn open_post(app: &mut App, post_id: i64, tx: &mpsc::Sender<AppEvent>) {
    if app.view != View::Post {
        app.return_view = app.view;
    }
    app.view = View::Post;
    app.post_view = None;
    app.post_loading = Some(post_id);
    app.selected_comment = 0;
    app.post_scroll = 0;
    app.comment_input = false;

    let client = app.client.clone();
    let session = app.session.clone();
    let delay = app.config.overlay_delay();
    tracing::debug!(post_id, "Opening post");
    spawn_task("post_load", tx, async move {
        let result = load_post(&client, &session, post_id, delay).await;
        AppEvent::PostLoaded { post_id, result }
    });
}

pub(super) fn spawn_interaction(
    app: &App,
    post_id: i64,
    interaction: Interaction,
    tx: &mpsc::Sender<AppEvent>,
) {
    let client = app.client.clone();
    let session = app.session.clone();
    tracing::debug!(post_id, action = interaction.name(), "Spawning interaction");
    spawn_task("interaction", tx, async move {
        let result = perform(&client, &session, &interaction).await;
        AppEvent::InteractionDone {
            post_id,
            interaction,
            result,
        }
    });
}

pub(super) fn spawn_search(app: &App, request: SearchRequest, tx: &mpsc::Sender<AppEvent>) {
    let client = app.client.clone();
    let session = app.session.clone();
    tracing::debug!(generation = request.generation, "Spawning search");
    spawn_task("search", tx, async move {
        let result = client.search(&session, &request.query).await;
        AppEvent::SearchCompleted {
            generation: request.generation,
            result,
        }
    });
}

pub(super) fn spawn_auth(app: &App, request: AuthRequest, tx: &mpsc::Sender<AppEvent>) {
    let client = app.client.clone();
    spawn_task("auth", tx, async move {
        let result = authenticate(&client, &request).await;
        AppEvent::AuthCompleted { request, result }
    });
}

pub(super) fn spawn_logout(app: &App, tx: &mpsc::Sender<AppEvent>) {
    let client = app.client.clone();
    let session = app.session.clone();
    spawn_task("logout", tx, async move {
        AppEvent::LoggedOut(client.logout(&session).await)
    });
}

pub(super) fn spawn_current_user(app: &App, tx: &mpsc::Sender<AppEvent>) {
    if !app.session.is_authenticated() {
        return;
    }
    let client = app.client.clone();
    let session = app.session.clone();
    spawn_task("current_user", tx, async move {
        AppEvent::CurrentUserLoaded(client.current_user(&session).await)
    });
}

pub(super) fn spawn_draft_save(app: &App, submit: DraftSubmit, tx: &mpsc::Sender<AppEvent>) {
    let client = app.client.clone();
    let session = app.session.clone();
    spawn_task("draft_save", tx, async move {
        AppEvent::DraftSaved(submit_draft(&client, &session, &submit).await)
    });
}

pub(super) fn spawn_profile_save(
    app: &App,
    update: crate::api::ProfileUpdate,
    tx: &mpsc::Sender<AppEvent>,
) {
    let client = app.client.clone();
    let session = app.session.clone();
    spawn_task("profile_save", tx, async move {
        AppEvent::ProfileSaved(client.edit_profile(&session, &update).await)
    });
}

/// Open the composer with `draft` and fetch the tags it can pick from.
pub(super) fn open_composer(app: &mut App, draft: PostDraft, tx: &mpsc::Sender<AppEvent>) {
    app.draft = Some(draft);
    app.compose_field = crate::app::ComposeField::Title;
    app.compose_tag_selected = 0;
    app.compose_scroll = 0;
    app.view = View::Compose;

    let client = app.client.clone();
    let session = app.session.clone();
    spawn_task("compose_tags", tx, async move {
        AppEvent::ComposeTagsLoaded(client.tags(&session).await)
    });
}

pub(super) fn open_bookmarks(app: &mut App, tx: &mpsc::Sender<AppEvent>) {
    app.view = View::Bookmarks;
    app.bookmarks_loading = true;
    let client = app.client.clone();
    let session = app.session.clone();
    spawn_task("bookmarks", tx, async move {
        AppEvent::BookmarksLoaded(client.bookmarks(&session).await)
    });
}

/// Open the settings view and refresh the profile from the server.
pub(super) fn open_settings(app: &mut App, tx: &mpsc::Sender<AppEvent>) {
    if let Some(user) = &app.current_user {
        app.profile.fill(user);
    }
    app.view = View::Settings;
    spawn_current_user(app, tx);
}

/// Open the share link for the post in the detail view.
pub(super) fn share_post(app: &mut App) {
    let Some(post_id) = app.post_view.as_ref().map(|v| v.post_id()) else {
        return;
    };
    let Some(url) = share_url(app.config.share_base(), post_id) else {
        app.set_status("Cannot build a link for this post");
        return;
    };
    match open::that(url.as_str()) {
        Ok(()) => app.set_status(format!("Opened {}", url)),
        Err(e) => {
            tracing::warn!(error = %e, url = %url, "Failed to open browser");
            app.set_status(format!("Could not open browser: {}", url));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_catch_task_panic_ok() {
        assert_eq!(catch_task_panic(async { 7 }).await, Ok(7));
    }

    #[tokio::test]
    async fn test_catch_task_panic_message() {
        let result = catch_task_panic(async {
            panic!("boom");
        })
        .await;
        assert_eq!(result, Err::<(), _>("boom".to_string()));
    }

    #[tokio::test]
    async fn test_spawn_task_reports_panic() {
        let (tx, mut rx) = mpsc::channel(1);
        let explode = true;
        spawn_task("explode", &tx, async move {
            if explode {
                panic!("kaboom");
            }
            AppEvent::LoggedOut(Ok(()))
        });
        match rx.recv().await {
            Some(AppEvent::TaskPanicked { task, error }) => {
                assert_eq!(task, "explode");
                assert_eq!(error, "kaboom");
            }
            _ => panic!("expected TaskPanicked"),
        }
    }
}

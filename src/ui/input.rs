//! Input handling for the TUI.
//!
//! Keys are routed by priority: help overlay, confirmation dialog, search
//! bar, then the handler for the current view.

use crate::app::{App, AppEvent, ComposeField, Focus, TagEntry, View};
use crate::editor::{DraftMode, PostDraft};
use crate::feed::Tag;
use crate::interaction::Confirmed;
use crate::search::SearchRejected;
use crossterm::event::{KeyCode, KeyModifiers};
use tokio::sync::mpsc;

use super::compose::editor_top_offset;
use super::helpers::{
    open_bookmarks, open_composer, open_post, open_settings, reload_feed, share_post, spawn_auth,
    spawn_draft_save, spawn_feed_load, spawn_interaction, spawn_logout, spawn_profile_save,
    spawn_search,
};
use super::Action;

/// Lines moved by PageUp/PageDown.
const PAGE_LINES: usize = 10;

/// Main input dispatch function.
pub(super) fn handle_input(
    app: &mut App,
    code: KeyCode,
    modifiers: KeyModifiers,
    event_tx: &mpsc::Sender<AppEvent>,
) -> Action {
    if modifiers.contains(KeyModifiers::CONTROL) && code == KeyCode::Char('c') {
        return Action::Quit;
    }

    if app.show_help {
        handle_help_input(app, code);
        return Action::Continue;
    }

    // The confirmation dialog captures all keys while open
    if app.confirm_active() {
        handle_confirm_input(app, code, event_tx);
        return Action::Continue;
    }

    if app.search_focused {
        handle_search_input(app, code, modifiers, event_tx);
        return Action::Continue;
    }

    match app.view {
        View::Feed => handle_feed_input(app, code, event_tx),
        View::Post => {
            handle_post_input(app, code, event_tx);
            Action::Continue
        }
        View::Compose => {
            handle_compose_input(app, code, modifiers, event_tx);
            Action::Continue
        }
        View::Auth => {
            handle_auth_input(app, code, modifiers, event_tx);
            Action::Continue
        }
        View::Settings => {
            handle_settings_input(app, code, event_tx);
            Action::Continue
        }
        View::Bookmarks => {
            handle_bookmarks_input(app, code, event_tx);
            Action::Continue
        }
    }
}

fn handle_help_input(app: &mut App, code: KeyCode) {
    if matches!(code, KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('?')) {
        app.show_help = false;
    }
}

/// Keys shared by the non-typing views. Returns true when consumed.
fn handle_global_key(app: &mut App, code: KeyCode) -> bool {
    match code {
        KeyCode::Char('/') => {
            app.search_focused = true;
            app.search_cursor = None;
        }
        KeyCode::Char('?') => app.show_help = true,
        KeyCode::Char('t') => {
            let name = app.cycle_theme();
            app.set_status(format!("Theme: {}", name));
        }
        _ => return false,
    }
    true
}

/// Gate for views that need a signed-in user.
fn require_login(app: &mut App, what: &str) -> bool {
    if app.session.is_authenticated() {
        return true;
    }
    app.set_status(format!("Log in to {} (press L)", what));
    false
}

// ============================================================================
// Confirmation dialog
// ============================================================================

fn handle_confirm_input(app: &mut App, code: KeyCode, event_tx: &mpsc::Sender<AppEvent>) {
    let Some(view) = app.post_view.as_mut() else {
        return;
    };
    match code {
        KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
            let post_id = view.post_id();
            match view.confirm_dialog() {
                Some(Confirmed::Issue(interaction)) => {
                    spawn_interaction(app, post_id, interaction, event_tx);
                }
                Some(Confirmed::GoToLogin) => {
                    app.close_post();
                    app.view = View::Auth;
                }
                None => {}
            }
        }
        KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
            view.cancel_dialog();
        }
        _ => {}
    }
}

// ============================================================================
// Search
// ============================================================================

fn handle_search_input(
    app: &mut App,
    code: KeyCode,
    modifiers: KeyModifiers,
    event_tx: &mpsc::Sender<AppEvent>,
) {
    match code {
        // Leaving the search region hides the panel but keeps the text
        KeyCode::Esc | KeyCode::Tab => {
            app.search.outside_click();
            app.search_focused = false;
            app.search_cursor = None;
        }
        KeyCode::Char('u') if modifiers.contains(KeyModifiers::CONTROL) => {
            app.search.clear();
            app.search_cursor = None;
        }
        KeyCode::Down => {
            let len = app.search_result_len();
            if app.search.is_panel_open() && len > 0 {
                app.search_cursor = Some(app.search_cursor.map_or(0, |i| (i + 1).min(len - 1)));
            }
        }
        KeyCode::Up => {
            app.search_cursor = match app.search_cursor {
                Some(0) | None => None,
                Some(i) => Some(i - 1),
            };
        }
        KeyCode::Enter => match app.search_cursor {
            Some(index) if app.search.is_panel_open() => open_search_result(app, index, event_tx),
            _ => submit_search(app, event_tx),
        },
        KeyCode::Backspace => {
            app.search.pop_char();
            app.search_cursor = None;
        }
        KeyCode::Char(c) => {
            app.search.push_char(c);
            app.search_cursor = None;
        }
        _ => {}
    }
}

fn submit_search(app: &mut App, event_tx: &mpsc::Sender<AppEvent>) {
    match app.search.submit() {
        Ok(request) => {
            app.set_status("Searching...");
            spawn_search(app, request, event_tx);
        }
        Err(SearchRejected::Empty) => {}
        Err(e) => app.set_status(e.to_string()),
    }
}

fn open_search_result(app: &mut App, index: usize, event_tx: &mpsc::Sender<AppEvent>) {
    let Some(results) = app.search.results() else {
        return;
    };
    if let Some(post) = results.posts.get(index) {
        let post_id = post.id;
        app.search.outside_click();
        app.search_focused = false;
        app.search_cursor = None;
        open_post(app, post_id, event_tx);
    } else if let Some(user) = results.users.get(index - results.posts.len()) {
        let msg = match &user.full_name {
            Some(name) => format!("@{} ({})", user.username, name),
            None => format!("@{}", user.username),
        };
        app.set_status(msg);
    }
}

// ============================================================================
// Feed
// ============================================================================

fn handle_feed_input(app: &mut App, code: KeyCode, event_tx: &mpsc::Sender<AppEvent>) -> Action {
    if handle_global_key(app, code) {
        return Action::Continue;
    }
    match code {
        KeyCode::Char('q') => return Action::Quit,
        KeyCode::Tab => app.focus = app.focus.next(),
        KeyCode::Char('j') | KeyCode::Down => app.nav_down(),
        KeyCode::Char('k') | KeyCode::Up => app.nav_up(),
        KeyCode::Enter => handle_feed_enter(app, event_tx),
        KeyCode::Char('n') | KeyCode::Right => {
            if let Some(load) = app.feed.next_page() {
                app.selected_post = 0;
                spawn_feed_load(app, load, event_tx);
            }
        }
        KeyCode::Char('p') | KeyCode::Left => {
            if let Some(load) = app.feed.prev_page() {
                app.selected_post = 0;
                spawn_feed_load(app, load, event_tx);
            }
        }
        KeyCode::Char(c @ ('1' | '2')) if app.focus == Focus::Posts => {
            // Pick one of the selected card's tags as the filter
            let slot = if c == '1' { 0 } else { 1 };
            let tag = app
                .feed
                .posts()
                .get(app.selected_post)
                .and_then(|p| p.tags.get(slot))
                .map(|name| Tag::from_name(name));
            if let Some(tag) = tag {
                select_tag(app, tag, event_tx);
            }
        }
        KeyCode::Char('m') => {
            if app.feed.filter().has_toggle() {
                app.feed.filter_mut().toggle_show_all();
                app.clamp_selections();
            }
        }
        KeyCode::Char('a') => select_tag(app, Tag::ExploreAll, event_tx),
        KeyCode::Char('r') => reload_feed(app, event_tx),
        KeyCode::Char('c') => {
            if require_login(app, "write a story") {
                open_composer(app, PostDraft::create(), event_tx);
            }
        }
        KeyCode::Char('b') => {
            if require_login(app, "see bookmarks") {
                app.selected_bookmark = 0;
                open_bookmarks(app, event_tx);
            }
        }
        KeyCode::Char('s') => {
            if require_login(app, "edit your profile") {
                open_settings(app, event_tx);
            }
        }
        KeyCode::Char('L') => {
            if app.session.is_authenticated() {
                app.set_status("Logging out...");
                spawn_logout(app, event_tx);
            } else {
                app.view = View::Auth;
            }
        }
        _ => {}
    }
    Action::Continue
}

fn select_tag(app: &mut App, tag: Tag, event_tx: &mpsc::Sender<AppEvent>) {
    if let Some(load) = app.feed.select_tag(tag) {
        app.selected_post = 0;
        spawn_feed_load(app, load, event_tx);
    }
}

fn handle_feed_enter(app: &mut App, event_tx: &mpsc::Sender<AppEvent>) {
    let target = match app.focus {
        Focus::Posts => app.feed.posts().get(app.selected_post).map(|p| p.id),
        Focus::Trending => app.feed.trending().get(app.selected_trending).map(|s| s.id),
        Focus::Activity => app
            .feed
            .activities()
            .get(app.selected_activity)
            .map(|a| a.post.id),
        Focus::Tags => {
            match app.tag_entries().into_iter().nth(app.selected_tag) {
                Some(TagEntry::Tag(tag)) => select_tag(app, tag, event_tx),
                Some(TagEntry::Toggle) => {
                    app.feed.filter_mut().toggle_show_all();
                    app.clamp_selections();
                }
                None => {}
            }
            None
        }
    };
    if let Some(post_id) = target {
        open_post(app, post_id, event_tx);
    }
}

// ============================================================================
// Post detail
// ============================================================================

fn handle_post_input(app: &mut App, code: KeyCode, event_tx: &mpsc::Sender<AppEvent>) {
    if app.comment_input {
        handle_comment_input(app, code, event_tx);
        return;
    }
    if handle_global_key(app, code) {
        return;
    }
    if matches!(code, KeyCode::Esc | KeyCode::Backspace | KeyCode::Char('q')) {
        app.close_post();
        return;
    }
    let selected_comment = app.selected_comment_id();
    let authenticated = app.session.is_authenticated();
    let Some(view) = app.post_view.as_mut() else {
        // Still loading
        return;
    };
    let post_id = view.post_id();

    match code {
        KeyCode::Char('j') | KeyCode::Down => {
            if app.selected_comment + 1 < view.comments().len() {
                app.selected_comment += 1;
            }
        }
        KeyCode::Char('k') | KeyCode::Up => {
            app.selected_comment = app.selected_comment.saturating_sub(1);
        }
        KeyCode::PageDown => app.post_scroll = app.post_scroll.saturating_add(PAGE_LINES),
        KeyCode::PageUp => app.post_scroll = app.post_scroll.saturating_sub(PAGE_LINES),
        KeyCode::Char('l') => {
            if let Some(interaction) = view.like(&app.session) {
                spawn_interaction(app, post_id, interaction, event_tx);
            }
        }
        KeyCode::Char('b') => {
            if let Some(interaction) = view.bookmark(&app.session) {
                spawn_interaction(app, post_id, interaction, event_tx);
            }
        }
        KeyCode::Char('c') => {
            if authenticated {
                app.comment_input = true;
            } else {
                app.set_status("Log in to comment (press L on the feed)");
            }
        }
        KeyCode::Char('f') => {
            if !authenticated {
                app.set_status("Log in to like comments");
            } else if let Some(interaction) = selected_comment.and_then(|id| view.like_comment(id)) {
                spawn_interaction(app, post_id, interaction, event_tx);
            }
        }
        KeyCode::Char('x') => {
            if let Some(comment_id) = selected_comment {
                view.request_comment_delete(comment_id);
            }
        }
        KeyCode::Char('D') => view.request_post_delete(),
        KeyCode::Char('e') if view.is_owner() => {
            let draft = PostDraft::edit(view.post());
            open_composer(app, draft, event_tx);
        }
        KeyCode::Char('o') => share_post(app),
        _ => {}
    }
}

fn handle_comment_input(app: &mut App, code: KeyCode, event_tx: &mpsc::Sender<AppEvent>) {
    let Some(view) = app.post_view.as_mut() else {
        app.comment_input = false;
        return;
    };
    match code {
        KeyCode::Esc => app.comment_input = false,
        KeyCode::Enter => {
            let post_id = view.post_id();
            if let Some(interaction) = view.submit_comment(&app.session) {
                spawn_interaction(app, post_id, interaction, event_tx);
            }
        }
        KeyCode::Backspace => {
            view.draft_mut().pop();
        }
        KeyCode::Char(c) => view.draft_mut().push(c),
        _ => {}
    }
}

// ============================================================================
// Composer
// ============================================================================

fn handle_compose_input(
    app: &mut App,
    code: KeyCode,
    modifiers: KeyModifiers,
    event_tx: &mpsc::Sender<AppEvent>,
) {
    let ctrl = modifiers.contains(KeyModifiers::CONTROL);
    let field = app.compose_field;
    let Some(draft) = app.draft.as_mut() else {
        app.view = View::Feed;
        return;
    };

    match code {
        KeyCode::Esc => {
            let back_to_post = matches!(draft.mode(), DraftMode::Edit { .. }) && app.post_view.is_some();
            app.draft = None;
            app.view = if back_to_post { View::Post } else { View::Feed };
        }
        KeyCode::Char('s') if ctrl => {
            if let Some(submit) = draft.submit() {
                app.set_status("Saving...");
                spawn_draft_save(app, submit, event_tx);
            }
        }
        KeyCode::Char('f') if ctrl => draft.layout_mut().toggle_fullscreen(),
        KeyCode::Tab => app.compose_field = field.next(),
        KeyCode::PageDown | KeyCode::PageUp => {
            app.compose_scroll = if code == KeyCode::PageDown {
                app.compose_scroll.saturating_add(PAGE_LINES as u16)
            } else {
                app.compose_scroll.saturating_sub(PAGE_LINES as u16)
            };
            draft.layout_mut().on_scroll(editor_top_offset(app.compose_scroll));
        }
        _ => match field {
            ComposeField::Title => edit_line(&mut draft.title, code),
            ComposeField::Body => match code {
                KeyCode::Enter => draft.body.push('\n'),
                other => edit_line(&mut draft.body, other),
            },
            ComposeField::NewTag => match code {
                KeyCode::Enter => {
                    let attempted = !draft.new_tag.trim().is_empty();
                    if !draft.add_new_tag() && attempted {
                        app.set_status("Tag already exists, pick it from the list");
                    }
                }
                other => edit_line(&mut draft.new_tag, other),
            },
            ComposeField::Tags => {
                let len = draft.available().len();
                match code {
                    KeyCode::Left => {
                        app.compose_tag_selected = app.compose_tag_selected.saturating_sub(1)
                    }
                    KeyCode::Right if app.compose_tag_selected + 1 < len => {
                        app.compose_tag_selected += 1
                    }
                    KeyCode::Enter => {
                        if let Some(tag) = draft.available().get(app.compose_tag_selected).cloned() {
                            draft.add_tag(&tag);
                        }
                    }
                    KeyCode::Backspace | KeyCode::Delete => {
                        if let Some(tag) = draft.tags().last().cloned() {
                            draft.remove_tag(&tag);
                        }
                    }
                    _ => {}
                }
            }
        },
    }
}

/// Single-line text editing: printable chars and backspace.
fn edit_line(target: &mut String, code: KeyCode) {
    match code {
        KeyCode::Backspace => {
            target.pop();
        }
        KeyCode::Char(c) => target.push(c),
        _ => {}
    }
}

// ============================================================================
// Auth and settings
// ============================================================================

fn handle_auth_input(
    app: &mut App,
    code: KeyCode,
    modifiers: KeyModifiers,
    event_tx: &mpsc::Sender<AppEvent>,
) {
    let ctrl = modifiers.contains(KeyModifiers::CONTROL);
    match code {
        KeyCode::Esc => app.view = View::Feed,
        KeyCode::Char('t') if ctrl => app.auth.toggle_tab(),
        KeyCode::Char('r') if ctrl => app.auth.toggle_show_password(),
        KeyCode::Tab | KeyCode::Down => app.auth.focus_next(),
        KeyCode::BackTab | KeyCode::Up => app.auth.focus_prev(),
        KeyCode::Enter => {
            if let Some(request) = app.auth.submit() {
                spawn_auth(app, request, event_tx);
            }
        }
        KeyCode::Backspace => app.auth.pop_char(),
        KeyCode::Char(c) => app.auth.push_char(c),
        _ => {}
    }
}

fn handle_settings_input(app: &mut App, code: KeyCode, event_tx: &mpsc::Sender<AppEvent>) {
    match code {
        KeyCode::Esc => app.view = View::Feed,
        KeyCode::Tab | KeyCode::Down => app.profile.focus_next(),
        KeyCode::BackTab | KeyCode::Up => app.profile.focus_prev(),
        KeyCode::Enter => {
            if let Some(update) = app.profile.submit() {
                app.set_status("Saving profile...");
                spawn_profile_save(app, update, event_tx);
            }
        }
        KeyCode::Backspace => app.profile.pop_char(),
        KeyCode::Char(c) => app.profile.push_char(c),
        _ => {}
    }
}

// ============================================================================
// Bookmarks
// ============================================================================

fn handle_bookmarks_input(app: &mut App, code: KeyCode, event_tx: &mpsc::Sender<AppEvent>) {
    if handle_global_key(app, code) {
        return;
    }
    match code {
        KeyCode::Esc | KeyCode::Char('q') => app.view = View::Feed,
        KeyCode::Char('j') | KeyCode::Down => {
            if app.selected_bookmark + 1 < app.bookmarks.len() {
                app.selected_bookmark += 1;
            }
        }
        KeyCode::Char('k') | KeyCode::Up => {
            app.selected_bookmark = app.selected_bookmark.saturating_sub(1);
        }
        KeyCode::Char('r') => open_bookmarks(app, event_tx),
        KeyCode::Enter => {
            if let Some(post_id) = app.bookmarks.get(app.selected_bookmark).map(|b| b.id) {
                open_post(app, post_id, event_tx);
            }
        }
        _ => {}
    }
}

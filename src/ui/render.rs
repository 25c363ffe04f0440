//! Render functions for the TUI.
//!
//! This module handles all rendering logic, dispatching to the appropriate
//! view based on application state.

use crate::app::{App, View};
use crate::overlay::ConfirmDialog;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use super::{bookmarks, compose, feed, forms, help, post, search, status};

/// Minimum terminal dimensions required for normal operation.
pub(super) const MIN_WIDTH: u16 = 60;
pub(super) const MIN_HEIGHT: u16 = 10;

/// Height of the header row (bordered search bar).
const HEADER_HEIGHT: u16 = 3;

/// Main render dispatch function.
///
/// Routes to the appropriate view renderer based on current application state.
/// Handles terminal size validation before rendering.
pub(super) fn render(f: &mut Frame, app: &App) {
    let area = f.area();

    if area.width < 1 || area.height < 1 {
        return;
    }

    if area.width < MIN_WIDTH || area.height < MIN_HEIGHT {
        let msg = if area.height < 3 || area.width < 20 {
            Paragraph::new("Too small")
        } else {
            Paragraph::new(format!(
                "Terminal too small\n\nMinimum: {}x{}\nCurrent: {}x{}",
                MIN_WIDTH, MIN_HEIGHT, area.width, area.height
            ))
            .alignment(Alignment::Center)
        };
        f.render_widget(msg, area);
        return;
    }

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(HEADER_HEIGHT),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(area);

    render_header(f, app, chunks[0]);

    match app.view {
        View::Feed => feed::render(f, app, chunks[1]),
        View::Post => post::render(f, app, chunks[1]),
        View::Compose => compose::render(f, app, chunks[1]),
        View::Auth => forms::render_auth(f, app, chunks[1]),
        View::Settings => forms::render_settings(f, app, chunks[1]),
        View::Bookmarks => bookmarks::render(f, app, chunks[1]),
    }

    status::render(f, app, chunks[2]);

    // The results panel hangs below the search bar over the current view
    if app.search.is_panel_open() {
        search::render_panel(f, app, chunks[0], chunks[1]);
    }

    if app.show_help {
        help::render(f, app);
    }

    // Still drawn while the exit delay runs after closing
    if let Some(dialog) = app.post_view.as_ref().and_then(|v| v.confirm().content()) {
        let open = app.confirm_active();
        render_confirm_overlay(f, app, dialog, open);
    }
}

/// Header: app name, search bar and the signed-in user.
fn render_header(f: &mut Frame, app: &App, area: Rect) {
    let user = match (&app.current_user, app.session.is_authenticated()) {
        (Some(user), _) => format!(" @{} ", user.username),
        (None, true) => " signed in ".to_string(),
        (None, false) => " [L] Log in ".to_string(),
    };

    let border_style = if app.search_focused {
        app.style("panel_border_focused")
    } else {
        app.style("panel_border")
    };

    let query = app.search.query();
    let mut spans = vec![Span::styled(" DevHub ", app.style("header"))];
    if app.search_focused {
        spans.push(Span::raw(format!(" {}_", query)));
    } else if query.is_empty() {
        spans.push(Span::styled(" Press / to search", app.style("post_meta")));
    } else {
        spans.push(Span::raw(format!(" {}", query)));
    }
    if app.search.is_busy() {
        spans.push(Span::styled(" searching...", app.style("post_meta")));
    }

    let paragraph = Paragraph::new(Line::from(spans)).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(border_style)
            .title(" Search ")
            .title(Line::from(user).alignment(Alignment::Right)),
    );
    f.render_widget(paragraph, area);
}

/// Render a confirmation dialog overlay centered on screen.
fn render_confirm_overlay(f: &mut Frame, app: &App, dialog: &ConfirmDialog, open: bool) {
    let area = f.area();

    let confirm_style = if dialog.destructive {
        app.style("confirm_destructive")
    } else {
        app.style("header")
    };

    let text = vec![
        Line::from(dialog.message.as_str()),
        Line::from(""),
        Line::from(vec![
            Span::styled(format!("(y) {}", dialog.confirm_text), confirm_style),
            Span::raw("  "),
            Span::raw(format!("(n/Esc) {}", dialog.cancel_text)),
        ]),
    ];

    let width = 50u16.min(area.width.saturating_sub(4));
    let height = 8u16.min(area.height.saturating_sub(4));
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    let overlay = Rect::new(x, y, width, height);

    if overlay.width < 10 || overlay.height < 5 {
        return;
    }

    f.render_widget(Clear, overlay);

    let mut body_style = app.style("post_body");
    if !open {
        body_style = body_style.add_modifier(Modifier::DIM);
    }

    let paragraph = Paragraph::new(text)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(app.style("panel_border_focused"))
                .title(format!(" {} ", dialog.title)),
        )
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .style(body_style);

    f.render_widget(paragraph, overlay);
}

/// Create a centered rectangle with the given percentage of the parent area.
pub(super) fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let width = area.width * percent_x / 100;
    let height = area.height * percent_y / 100;
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width, height)
}

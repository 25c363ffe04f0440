//! Composer view for creating and editing posts.

use crate::app::{App, ComposeField};
use crate::editor::{DraftMode, PostDraft};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use super::feed::spinner;

/// Rows above the body editor: title input plus the tag picker.
const FORM_ROWS: u16 = 8;

/// Layout units per terminal row when measuring the editor's top offset.
const ROW_UNITS: u16 = 16;

/// Top offset of the body editor after scrolling the form by `scroll` rows.
pub(super) fn editor_top_offset(scroll: u16) -> u16 {
    FORM_ROWS.saturating_sub(scroll).saturating_mul(ROW_UNITS)
}

/// Render the composer view
pub fn render(f: &mut Frame, app: &App, area: Rect) {
    let Some(draft) = app.draft.as_ref() else {
        return;
    };

    if draft.layout().is_fullscreen() {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(1), Constraint::Min(0)])
            .split(area);
        render_toolbar(f, app, draft, chunks[0]);
        render_body(f, app, draft, chunks[1], app.compose_scroll);
        return;
    }

    let form_height = FORM_ROWS.saturating_sub(app.compose_scroll);
    let body_scroll = app.compose_scroll.saturating_sub(FORM_ROWS);

    // A sticky toolbar pins to the top of the view instead of riding above the editor
    let chunks = if draft.layout().is_sticky() {
        let c = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Length(form_height),
                Constraint::Min(0),
                Constraint::Length(1),
            ])
            .split(area);
        render_toolbar(f, app, draft, c[0]);
        [c[1], c[2], c[3]]
    } else {
        let c = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(form_height),
                Constraint::Length(1),
                Constraint::Min(0),
                Constraint::Length(1),
            ])
            .split(area);
        render_toolbar(f, app, draft, c[1]);
        [c[0], c[2], c[3]]
    };
    let [form, body, footer] = chunks;

    if form.height > 0 {
        let parts = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3), Constraint::Length(5)])
            .split(form);
        render_title(f, app, draft, parts[0]);
        render_tags(f, app, draft, parts[1]);
    }
    render_body(f, app, draft, body, body_scroll);
    render_footer(f, app, draft, footer);
}

fn field_border(app: &App, field: ComposeField) -> ratatui::style::Style {
    if app.compose_field == field {
        app.style("input_focused")
    } else {
        app.style("panel_border")
    }
}

fn render_toolbar(f: &mut Frame, app: &App, draft: &PostDraft, area: Rect) {
    let action = match draft.mode() {
        DraftMode::Create => "Publish",
        DraftMode::Edit { .. } => "Update",
    };
    let fullscreen = if draft.layout().is_fullscreen() {
        "Exit fullscreen"
    } else {
        "Fullscreen"
    };
    let line = Line::from(vec![
        Span::styled(format!(" [Ctrl+S] {} ", action), app.style("header")),
        Span::raw(format!(" [Ctrl+F] {} ", fullscreen)),
        Span::raw(" [Tab] Next field  [Esc] Discard "),
    ]);
    f.render_widget(Paragraph::new(line).style(app.style("status_bar")), area);
}

fn render_title(f: &mut Frame, app: &App, draft: &PostDraft, area: Rect) {
    let cursor = if app.compose_field == ComposeField::Title { "_" } else { "" };
    let title = match draft.mode() {
        DraftMode::Create => " Title ",
        DraftMode::Edit { .. } => " Title (editing) ",
    };
    let paragraph = Paragraph::new(format!("{}{}", draft.title, cursor)).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(field_border(app, ComposeField::Title))
            .title(title),
    );
    f.render_widget(paragraph, area);
}

fn render_tags(f: &mut Frame, app: &App, draft: &PostDraft, area: Rect) {
    let mut selected: Vec<Span> = vec![Span::styled("Selected: ", app.style("post_meta"))];
    if draft.tags().is_empty() {
        selected.push(Span::styled("none", app.style("post_meta_dim")));
    }
    for tag in draft.tags() {
        selected.push(Span::styled(format!(" #{} ", tag), app.style("tag_badge_selected")));
        selected.push(Span::raw(" "));
    }

    let picking = app.compose_field == ComposeField::Tags;
    let mut available: Vec<Span> = vec![Span::styled("Available: ", app.style("post_meta"))];
    for (i, tag) in draft.available().iter().enumerate() {
        let style = if picking && i == app.compose_tag_selected {
            app.style("list_selected")
        } else {
            app.style("tag_badge")
        };
        available.push(Span::styled(format!(" #{} ", tag), style));
    }

    let new_cursor = if app.compose_field == ComposeField::NewTag { "_" } else { "" };
    let new_tag_style = if app.compose_field == ComposeField::NewTag {
        app.style("input_focused")
    } else {
        app.style("list_normal")
    };

    let lines = vec![
        Line::from(selected),
        Line::from(available),
        Line::from(Span::styled(
            format!("New tag: {}{}", draft.new_tag, new_cursor),
            new_tag_style,
        )),
    ];
    let paragraph = Paragraph::new(lines).wrap(Wrap { trim: true }).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(field_border(app, ComposeField::Tags))
            .title(" Tags (←/→ pick, Enter add, Backspace remove) "),
    );
    f.render_widget(paragraph, area);
}

fn render_body(f: &mut Frame, app: &App, draft: &PostDraft, area: Rect, scroll: u16) {
    let cursor = if app.compose_field == ComposeField::Body { "_" } else { "" };
    let paragraph = Paragraph::new(format!("{}{}", draft.body, cursor))
        .wrap(Wrap { trim: false })
        .scroll((scroll, 0))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(field_border(app, ComposeField::Body))
                .title(" Story "),
        );
    f.render_widget(paragraph, area);
}

fn render_footer(f: &mut Frame, app: &App, draft: &PostDraft, area: Rect) {
    let line = if draft.is_busy() {
        Line::from(format!("{} Saving...", spinner(app)))
    } else if let Some(err) = draft.error() {
        Line::from(Span::styled(err.to_string(), app.style("form_error")))
    } else {
        Line::from("")
    };
    f.render_widget(Paragraph::new(line), area);
}

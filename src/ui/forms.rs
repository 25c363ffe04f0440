//! Account forms: sign-in/registration and profile settings.

use crate::app::App;
use crate::auth::AuthTab;
use crate::profile::ProfileField;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use super::feed::spinner;
use super::render::centered_rect;

/// One bordered single-line input.
fn render_input(f: &mut Frame, app: &App, area: Rect, label: &str, value: &str, focused: bool) {
    let border = if focused {
        app.style("input_focused")
    } else {
        app.style("panel_border")
    };
    let cursor = if focused { "_" } else { "" };
    let paragraph = Paragraph::new(format!("{}{}", value, cursor)).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(border)
            .title(format!(" {} ", label)),
    );
    f.render_widget(paragraph, area);
}

fn message_line<'a>(app: &App, busy: bool, error: Option<&'a str>, hint: &'a str) -> Line<'a> {
    if busy {
        Line::from(format!("{} Please wait...", spinner(app)))
    } else if let Some(err) = error {
        Line::from(Span::styled(err, app.style("form_error")))
    } else {
        Line::from(Span::styled(hint, app.style("post_meta")))
    }
}

/// Render the sign-in / registration view
pub fn render_auth(f: &mut Frame, app: &App, area: Rect) {
    let form = &app.auth;
    let fields = form.fields();
    let panel = centered_rect(60, 100, area);

    let mut constraints = vec![Constraint::Length(1), Constraint::Length(1)];
    constraints.extend(fields.iter().map(|_| Constraint::Length(3)));
    constraints.push(Constraint::Length(1));
    constraints.push(Constraint::Min(0));
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(panel);

    let tab_style = |tab: AuthTab| {
        if form.tab() == tab {
            app.style("tag_badge_selected")
        } else {
            app.style("tag_badge")
        }
    };
    let tabs = Line::from(vec![
        Span::styled(" Login ", tab_style(AuthTab::Login)),
        Span::raw("  "),
        Span::styled(" Register ", tab_style(AuthTab::Register)),
    ])
    .alignment(Alignment::Center);
    f.render_widget(Paragraph::new(tabs), rows[0]);

    for (i, field) in fields.iter().enumerate() {
        let label = if field.is_required() {
            format!("{} *", field.label())
        } else {
            field.label().to_string()
        };
        render_input(
            f,
            app,
            rows[i + 2],
            &label,
            &form.display_value(*field),
            form.focused() == *field,
        );
    }

    let hint = "Enter submit  Tab next field  Ctrl+T switch tab  Ctrl+R show password  Esc back";
    let message = message_line(app, form.is_busy(), form.error(), hint);
    f.render_widget(Paragraph::new(message), rows[fields.len() + 2]);
}

/// Render the profile settings view
pub fn render_settings(f: &mut Frame, app: &App, area: Rect) {
    let form = &app.profile;
    let panel = centered_rect(70, 100, area);

    if !form.is_loaded() {
        let msg = Paragraph::new(format!("{} Loading profile...", spinner(app)))
            .block(Block::default().borders(Borders::ALL).title(" Settings "));
        f.render_widget(msg, panel);
        return;
    }

    let mut constraints = vec![Constraint::Length(1)];
    constraints.extend(ProfileField::ALL.iter().map(|_| Constraint::Length(3)));
    constraints.push(Constraint::Length(1));
    constraints.push(Constraint::Min(0));
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(panel);

    let avatar = form.profile_pic().unwrap_or("no avatar");
    f.render_widget(
        Paragraph::new(Line::from(vec![
            Span::styled("Profile settings  ", app.style("header")),
            Span::styled(format!("current avatar: {}", avatar), app.style("post_meta")),
        ])),
        rows[0],
    );

    for (i, field) in ProfileField::ALL.iter().enumerate() {
        render_input(
            f,
            app,
            rows[i + 1],
            field.label(),
            form.value(*field),
            form.focused() == *field,
        );
    }

    let hint = "Enter save  Tab next field  Esc back  (avatar: png, jpg, jpeg or gif)";
    let message = message_line(app, form.is_busy(), form.error(), hint);
    f.render_widget(Paragraph::new(message), rows[ProfileField::ALL.len() + 1]);
}

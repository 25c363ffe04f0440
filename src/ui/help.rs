//! Help overlay: keybinding table grouped by view.

use crate::app::App;
use ratatui::{
    layout::Constraint,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Row, Table},
    Frame,
};

use super::render::centered_rect;

/// Keybindings per section, in display order.
const SECTIONS: &[(&str, &[(&str, &str)])] = &[
    (
        "General",
        &[
            ("/", "Focus the search bar"),
            ("t", "Switch light/dark theme"),
            ("?", "Toggle this help"),
            ("Ctrl+C", "Quit"),
        ],
    ),
    (
        "Feed",
        &[
            ("j/k", "Move selection"),
            ("Tab", "Next panel"),
            ("Enter", "Open post / select tag"),
            ("n/p", "Next / previous page"),
            ("1/2", "Filter by the post's first / second tag"),
            ("a", "Explore all"),
            ("m", "More / fewer tags"),
            ("c", "Write a story"),
            ("b", "Bookmarks"),
            ("s", "Profile settings"),
            ("L", "Log in / log out"),
            ("r", "Reload"),
            ("q", "Quit"),
        ],
    ),
    (
        "Post",
        &[
            ("l", "Like"),
            ("b", "Bookmark"),
            ("c", "Write a comment"),
            ("j/k", "Select comment"),
            ("f", "Like selected comment"),
            ("x", "Delete selected comment"),
            ("e / D", "Edit / delete (author)"),
            ("o", "Open in browser"),
            ("PgUp/PgDn", "Scroll story"),
            ("Esc", "Back"),
        ],
    ),
    (
        "Composer",
        &[
            ("Ctrl+S", "Publish / update"),
            ("Ctrl+F", "Toggle fullscreen"),
            ("Tab", "Next field"),
            ("Esc", "Discard"),
        ],
    ),
];

/// Render the help overlay on top of the current view.
pub fn render(f: &mut Frame, app: &App) {
    let overlay = centered_rect(70, 80, f.area());
    if overlay.width < 20 || overlay.height < 6 {
        return;
    }

    f.render_widget(Clear, overlay);

    let mut rows: Vec<Row> = Vec::new();
    for (label, bindings) in SECTIONS {
        if !rows.is_empty() {
            rows.push(Row::new(vec![String::new(), String::new()]));
        }
        rows.push(
            Row::new(vec![
                Line::from(Span::styled(
                    format!("-- {} --", label),
                    Style::default().add_modifier(Modifier::BOLD),
                )),
                Line::from(""),
            ])
            .style(app.style("header")),
        );
        for (key, description) in *bindings {
            rows.push(Row::new(vec![format!("  {}", key), description.to_string()]));
        }
    }

    let widths = [Constraint::Length(14), Constraint::Min(20)];
    let table = Table::new(rows, widths)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(app.style("panel_border_focused"))
                .title(" Help (? to close) "),
        )
        .style(app.style("post_body"));

    f.render_widget(table, overlay);
}

use crate::app::App;
use crate::util::strip_control_chars;
use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem},
    Frame,
};

use super::feed::{format_relative_time, spinner};

/// Render the bookmarks list
pub fn render(f: &mut Frame, app: &App, area: Rect) {
    let items: Vec<ListItem> = if app.bookmarks_loading {
        vec![ListItem::new(format!("{} Loading bookmarks...", spinner(app)))]
    } else if app.bookmarks.is_empty() {
        vec![ListItem::new(Span::styled(
            "No bookmarks yet. Press b on a post to save it.",
            app.style("post_meta"),
        ))]
    } else {
        app.bookmarks
            .iter()
            .enumerate()
            .map(|(i, post)| {
                let style = if i == app.selected_bookmark {
                    app.style("list_selected")
                } else {
                    app.style("post_title")
                };
                ListItem::new(vec![
                    Line::from(Span::styled(
                        strip_control_chars(&post.title).into_owned(),
                        style,
                    )),
                    Line::from(Span::styled(
                        format!(
                            "  @{}  {}",
                            post.host_username.as_deref().unwrap_or("unknown"),
                            format_relative_time(post.created)
                        ),
                        app.style("post_meta"),
                    )),
                ])
            })
            .collect()
    };

    let list = List::new(items).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(app.style("panel_border_focused"))
            .title(format!("Bookmarks ({})", app.bookmarks.len())),
    );
    f.render_widget(list, area);
}

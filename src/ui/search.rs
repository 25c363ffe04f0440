//! Search results panel.

use crate::app::App;
use crate::util::{strip_control_chars, truncate_to_width};
use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem},
    Frame,
};

/// Maximum rows the panel takes below the search bar.
const PANEL_MAX_HEIGHT: u16 = 20;

/// Render the results panel under the search bar, over `body`.
pub fn render_panel(f: &mut Frame, app: &App, header: Rect, body: Rect) {
    let Some(results) = app.search.results() else {
        return;
    };

    let width = header.width.saturating_sub(4).min(80);
    let area = Rect::new(
        header.x + 2,
        body.y,
        width,
        body.height.min(PANEL_MAX_HEIGHT),
    );
    if area.width < 20 || area.height < 4 {
        return;
    }
    let text_width = area.width.saturating_sub(4) as usize;

    let selected_style = |index: usize| {
        if app.search_cursor == Some(index) {
            app.style("list_selected")
        } else {
            app.style("list_normal")
        }
    };

    let mut items: Vec<ListItem> = vec![ListItem::new(Span::styled("Posts", app.style("header")))];
    if results.posts.is_empty() {
        items.push(ListItem::new(Span::styled("  No posts found", app.style("post_meta"))));
    }
    for (i, post) in results.posts.iter().enumerate() {
        let title = strip_control_chars(&post.title);
        items.push(ListItem::new(vec![
            Line::from(Span::styled(
                format!("  {}", truncate_to_width(&title, text_width)),
                selected_style(i),
            )),
            Line::from(Span::styled(
                format!(
                    "    {}",
                    truncate_to_width(&app.search.preview(post).replace('\n', " "), text_width)
                ),
                app.style("post_meta"),
            )),
        ]));
    }

    items.push(ListItem::new(Span::styled("Users", app.style("header"))));
    if results.users.is_empty() {
        items.push(ListItem::new(Span::styled("  No users found", app.style("post_meta"))));
    }
    for (i, user) in results.users.iter().enumerate() {
        let name = match &user.full_name {
            Some(full) => format!("  @{} ({})", user.username, full),
            None => format!("  @{}", user.username),
        };
        items.push(ListItem::new(Span::styled(
            strip_control_chars(&name).into_owned(),
            selected_style(results.posts.len() + i),
        )));
    }

    f.render_widget(Clear, area);
    let list = List::new(items).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(app.style("panel_border_focused"))
            .title(" Results (↑/↓ select, Enter open, Esc close) "),
    );
    f.render_widget(list, area);
}

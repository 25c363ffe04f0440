//! Feed view: tag sidebar, post cards, trending and recent activity.

use crate::app::{App, Focus, TagEntry};
use crate::api::Post;
use crate::feed::{FeedDisplay, Tag};
use crate::search::preview_text;
use crate::util::{shorten_label, strip_control_chars, truncate_to_width};
use chrono::{NaiveDateTime, Utc};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph, Wrap},
    Frame,
};

use super::loop_runner::SPINNER_FRAMES;

/// Characters kept from an activity's post title, ellipsis included.
const ACTIVITY_TITLE_CHARS: usize = 30;

const SPINNER: [&str; SPINNER_FRAMES] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

pub(super) fn spinner(app: &App) -> &'static str {
    SPINNER[app.spinner_frame % SPINNER_FRAMES]
}

/// Format a server timestamp as relative time.
pub(super) fn format_relative_time(timestamp: Option<NaiveDateTime>) -> String {
    let Some(ts) = timestamp else {
        return String::new();
    };

    let diff = (Utc::now().naive_utc() - ts).num_seconds();

    // Clock skew between client and server
    if diff < 0 {
        return "now".to_string();
    }
    if diff < 3600 {
        return format!("{}m", diff / 60);
    }
    if diff < 86400 {
        return format!("{}h", diff / 3600);
    }
    if diff < 604800 {
        return format!("{}d", diff / 86400);
    }
    ts.format("%b %d, %Y").to_string()
}

/// The one renderer for tag badges, sentinel and named alike.
pub(super) fn tag_badge(app: &App, tag: &Tag, selected: bool) -> Span<'static> {
    let style = if selected {
        app.style("tag_badge_selected")
    } else {
        app.style("tag_badge")
    };
    match tag {
        Tag::ExploreAll => Span::styled(format!(" {} ", tag.label()), style),
        Tag::Named(name) => Span::styled(format!(" #{} ", strip_control_chars(name)), style),
    }
}

fn border_style(app: &App, focus: Focus) -> Style {
    if app.focus == focus {
        app.style("panel_border_focused")
    } else {
        app.style("panel_border")
    }
}

/// Render the feed view
pub fn render(f: &mut Frame, app: &App, area: Rect) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(20),
            Constraint::Percentage(55),
            Constraint::Percentage(25),
        ])
        .split(area);

    render_tags(f, app, columns[0]);
    render_posts(f, app, columns[1]);

    let sidebar = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(columns[2]);
    render_trending(f, app, sidebar[0]);
    render_activity(f, app, sidebar[1]);
}

fn render_tags(f: &mut Frame, app: &App, area: Rect) {
    let filter = app.feed.filter();
    let focused = app.focus == Focus::Tags;

    let items: Vec<ListItem> = app
        .tag_entries()
        .into_iter()
        .enumerate()
        .map(|(i, entry)| {
            let cursor = if focused && i == app.selected_tag { "> " } else { "  " };
            let line = match entry {
                TagEntry::Tag(tag) => {
                    let selected = *filter.selected() == tag;
                    let count = match &tag {
                        Tag::Named(name) => filter
                            .available()
                            .iter()
                            .find(|t| &t.name == name)
                            .map(|t| format!(" {}", t.count))
                            .unwrap_or_default(),
                        Tag::ExploreAll => String::new(),
                    };
                    Line::from(vec![
                        Span::raw(cursor),
                        tag_badge(app, &tag, selected),
                        Span::styled(count, app.style("post_meta")),
                    ])
                }
                TagEntry::Toggle => Line::from(vec![
                    Span::raw(cursor),
                    Span::styled(filter.toggle_label(), app.style("tag_toggle")),
                ]),
            };
            ListItem::new(line)
        })
        .collect();

    let list = List::new(items).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(border_style(app, Focus::Tags))
            .title("Tags"),
    );
    f.render_widget(list, area);
}

fn render_posts(f: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style(app, Focus::Posts))
        .title(format!("Posts - {}", app.feed.filter().selected()))
        .title_bottom(
            Line::from(format!(" Page {} of {} ", app.feed.page(), app.feed.pages().max(1)))
                .alignment(Alignment::Right),
        );

    match app.feed.display() {
        FeedDisplay::Loading => {
            let msg = Paragraph::new(format!("{} Loading posts...", spinner(app))).block(block);
            f.render_widget(msg, area);
        }
        FeedDisplay::Welcome => {
            let text = vec![
                Line::from(Span::styled("Welcome to DevHub", app.style("post_title"))),
                Line::from(""),
                Line::from("No stories have been published yet."),
                Line::from("Press c to write the first one."),
            ];
            let msg = Paragraph::new(text)
                .alignment(Alignment::Center)
                .wrap(Wrap { trim: true })
                .block(block);
            f.render_widget(msg, area);
        }
        FeedDisplay::NothingTagged(tag) => {
            let msg = Paragraph::new(format!("Nothing to show for {} yet.", tag))
                .style(app.style("post_meta"))
                .block(block);
            f.render_widget(msg, area);
        }
        FeedDisplay::Posts(posts) => {
            let width = area.width.saturating_sub(4) as usize;
            let focused = app.focus == Focus::Posts;
            let items: Vec<ListItem> = posts
                .iter()
                .enumerate()
                .map(|(i, post)| post_card(app, post, focused && i == app.selected_post, width))
                .collect();
            f.render_widget(List::new(items).block(block), area);
        }
    }
}

/// A post card: title, byline, up to two tag badges and a body preview.
fn post_card(app: &App, post: &Post, selected: bool, width: usize) -> ListItem<'static> {
    let title_style = if selected {
        app.style("list_selected")
    } else {
        app.style("post_title")
    };
    let title = strip_control_chars(&post.title).into_owned();

    let author = post.host_username.as_deref().unwrap_or("unknown");
    let byline = format!(
        "@{}  {}  ♥ {}",
        strip_control_chars(author),
        format_relative_time(post.created),
        post.likes
    );

    let mut badges: Vec<Span> = Vec::new();
    for (slot, name) in post.tags.iter().take(2).enumerate() {
        badges.push(Span::styled(format!("{}", slot + 1), app.style("post_meta_dim")));
        badges.push(tag_badge(app, &Tag::from_name(name), false));
        badges.push(Span::raw(" "));
    }

    let preview = preview_text(&post.body, app.config.preview_chars).replace('\n', " ");

    ListItem::new(vec![
        Line::from(Span::styled(
            truncate_to_width(&title, width).into_owned(),
            title_style,
        )),
        Line::from(Span::styled(byline, app.style("post_meta"))),
        Line::from(badges),
        Line::from(Span::styled(
            truncate_to_width(&preview, width).into_owned(),
            app.style("post_body"),
        )),
        Line::from(""),
    ])
}

fn render_trending(f: &mut Frame, app: &App, area: Rect) {
    let focused = app.focus == Focus::Trending;
    let items: Vec<ListItem> = if app.feed.trending().is_empty() {
        vec![ListItem::new(Span::styled("No trending stories", app.style("post_meta")))]
    } else {
        app.feed
            .trending()
            .iter()
            .enumerate()
            .map(|(i, story)| {
                let style = if focused && i == app.selected_trending {
                    app.style("list_selected")
                } else {
                    app.style("list_normal")
                };
                ListItem::new(vec![
                    Line::from(Span::styled(
                        format!("{}. {}", i + 1, strip_control_chars(&story.title)),
                        style,
                    )),
                    Line::from(Span::styled(
                        format!(
                            "   @{}  ♥ {}",
                            story.host_username.as_deref().unwrap_or("unknown"),
                            story.likes
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
            .border_style(border_style(app, Focus::Trending))
            .title("Trending"),
    );
    f.render_widget(list, area);
}

fn render_activity(f: &mut Frame, app: &App, area: Rect) {
    let focused = app.focus == Focus::Activity;
    let items: Vec<ListItem> = if app.feed.activities().is_empty() {
        vec![ListItem::new(Span::styled("No recent activity", app.style("post_meta")))]
    } else {
        app.feed
            .activities()
            .iter()
            .enumerate()
            .map(|(i, activity)| {
                let style = if focused && i == app.selected_activity {
                    app.style("list_selected")
                } else {
                    app.style("list_normal")
                };
                let who = activity.user.name.as_deref().unwrap_or("Someone");
                let title = strip_control_chars(&activity.post.title);
                ListItem::new(vec![
                    Line::from(vec![
                        Span::styled(strip_control_chars(who).into_owned(), app.style("comment_author")),
                        Span::raw(format!(" {}", activity.action)),
                    ]),
                    Line::from(Span::styled(
                        format!("  {}", shorten_label(&title, ACTIVITY_TITLE_CHARS)),
                        style,
                    )),
                    Line::from(Span::styled(
                        format!("  {}", format_relative_time(activity.timestamp)),
                        app.style("post_meta_dim"),
                    )),
                ])
            })
            .collect()
    };

    let list = List::new(items).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(border_style(app, Focus::Activity))
            .title("Recent Activity"),
    );
    f.render_widget(list, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_relative_time() {
        let now = Utc::now().naive_utc();
        assert_eq!(format_relative_time(None), "");
        assert_eq!(format_relative_time(Some(now + Duration::minutes(5))), "now");
        assert_eq!(format_relative_time(Some(now - Duration::minutes(90))), "1h");
        assert_eq!(format_relative_time(Some(now - Duration::days(3))), "3d");
    }

    #[test]
    fn test_old_dates_shown_in_full() {
        let ts = NaiveDateTime::parse_from_str("2023-03-14 09:00:00", "%Y-%m-%d %H:%M:%S").unwrap();
        assert_eq!(format_relative_time(Some(ts)), "Mar 14, 2023");
    }
}

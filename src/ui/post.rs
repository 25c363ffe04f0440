//! Post detail view: body, like/bookmark state and comments.

use crate::app::App;
use crate::feed::Tag;
use crate::interaction::PostView;
use crate::util::{strip_control_chars, strip_markup};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span, Text},
    widgets::{Block, Borders, List, ListItem, Paragraph, Wrap},
    Frame,
};

use super::feed::{format_relative_time, spinner, tag_badge};

/// Render the post detail view
pub fn render(f: &mut Frame, app: &App, area: Rect) {
    if area.width < 3 || area.height < 3 {
        return;
    }

    let Some(view) = app.post_view.as_ref() else {
        let paragraph = Paragraph::new(format!("{} Loading post...", spinner(app)))
            .block(Block::default().borders(Borders::ALL).title("Post"));
        f.render_widget(paragraph, area);
        return;
    };

    let mut constraints = vec![
        Constraint::Length(5),
        Constraint::Min(3),
        Constraint::Percentage(35),
    ];
    if app.comment_input {
        constraints.push(Constraint::Length(3));
    }
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(area);

    render_summary(f, app, view, chunks[0]);
    render_body(f, app, view, chunks[1]);
    render_comments(f, app, view, chunks[2]);
    if app.comment_input {
        render_comment_input(f, app, view, chunks[3]);
    }
}

fn render_summary(f: &mut Frame, app: &App, view: &PostView, area: Rect) {
    let post = view.post();

    let like = if view.is_liked() {
        Span::styled(format!("♥ {}", view.likes()), app.style("like_active"))
    } else {
        Span::styled(format!("♡ {}", view.likes()), app.style("post_meta"))
    };
    let bookmark = if view.is_bookmarked() {
        Span::styled("★ saved", app.style("bookmark_active"))
    } else {
        Span::styled("☆ save", app.style("post_meta"))
    };

    let mut tags: Vec<Span> = Vec::new();
    for name in &post.tags {
        tags.push(tag_badge(app, &Tag::from_name(name), false));
        tags.push(Span::raw(" "));
    }

    let actions = if view.is_owner() {
        "[e]dit  [D]elete  [o] share  [c]omment"
    } else {
        "[l]ike  [b]ookmark  [o] share  [c]omment"
    };

    let lines = vec![
        Line::from(Span::styled(
            strip_control_chars(&post.title).into_owned(),
            app.style("post_title"),
        )),
        Line::from(vec![
            Span::styled(
                format!(
                    "@{}  {}  ",
                    strip_control_chars(post.host_username.as_deref().unwrap_or("unknown")),
                    format_relative_time(post.created)
                ),
                app.style("post_meta"),
            ),
            like,
            Span::raw("  "),
            bookmark,
        ]),
        Line::from(tags),
    ];

    let paragraph = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(app.style("panel_border"))
            .title_bottom(Span::styled(actions, app.style("post_meta_dim"))),
    );
    f.render_widget(paragraph, area);
}

fn render_body(f: &mut Frame, app: &App, view: &PostView, area: Rect) {
    let body = strip_markup(&view.post().body);
    let text = Text::from_iter(
        body.lines()
            .map(|l| Line::from(strip_control_chars(l).into_owned())),
    );

    const MAX_SCROLL: usize = u16::MAX as usize;
    let paragraph = Paragraph::new(text)
        .style(app.style("post_body"))
        .block(Block::default().borders(Borders::ALL).title("Story"))
        .wrap(Wrap { trim: false })
        .scroll((app.post_scroll.min(MAX_SCROLL) as u16, 0));
    f.render_widget(paragraph, area);
}

fn render_comments(f: &mut Frame, app: &App, view: &PostView, area: Rect) {
    let staged = view.staged_comment_delete();
    let items: Vec<ListItem> = if view.comments().is_empty() {
        vec![ListItem::new(Span::styled(
            "No comments yet",
            app.style("post_meta"),
        ))]
    } else {
        view.comments()
            .iter()
            .enumerate()
            .map(|(i, comment)| {
                let selected = i == app.selected_comment && !app.comment_input;
                let content_style = if selected {
                    app.style("list_selected")
                } else if staged == Some(comment.id) {
                    app.style("confirm_destructive")
                } else {
                    app.style("list_normal")
                };
                let like = if comment.is_liked {
                    Span::styled(format!("♥ {}", comment.likes), app.style("like_active"))
                } else {
                    Span::styled(format!("♡ {}", comment.likes), app.style("post_meta"))
                };
                let mut header = vec![
                    Span::styled(
                        strip_control_chars(comment.author.name.as_deref().unwrap_or("anonymous"))
                            .into_owned(),
                        app.style("comment_author"),
                    ),
                    Span::styled(
                        format!("  {}  ", format_relative_time(comment.created)),
                        app.style("post_meta"),
                    ),
                    like,
                ];
                if view.can_delete_comment(comment.id) {
                    header.push(Span::styled("  [x] delete", app.style("post_meta_dim")));
                }
                ListItem::new(vec![
                    Line::from(header),
                    Line::from(Span::styled(
                        strip_control_chars(&strip_markup(&comment.content)).into_owned(),
                        content_style,
                    )),
                ])
            })
            .collect()
    };

    let title = format!("Comments ({})", view.comments().len());
    let list = List::new(items).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(app.style("panel_border"))
            .title(title),
    );
    f.render_widget(list, area);
}

fn render_comment_input(f: &mut Frame, app: &App, view: &PostView, area: Rect) {
    let paragraph = Paragraph::new(format!("{}_", view.draft())).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(app.style("input_focused"))
            .title(" Add a comment (Enter send, Esc cancel) "),
    );
    f.render_widget(paragraph, area);
}

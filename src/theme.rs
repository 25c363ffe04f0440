//! Theme system for the TUI.
//!
//! Semantic color roles map to ratatui `Style` values. `ThemeVariant`
//! selects the Dark or Light palette and `StyleMap` resolves role names.

use ratatui::style::{Color, Modifier, Style};
use std::collections::HashMap;

// ============================================================================
// Theme Variant
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ThemeVariant {
    #[default]
    Dark,
    Light,
}

impl ThemeVariant {
    /// Parse a variant name (case-insensitive).
    pub fn from_str_name(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "dark" => Some(Self::Dark),
            "light" => Some(Self::Light),
            _ => None,
        }
    }

    pub fn palette(self) -> ColorPalette {
        match self {
            Self::Dark => ColorPalette::dark(),
            Self::Light => ColorPalette::light(),
        }
    }

    /// Dark → Light → Dark.
    pub fn next(self) -> Self {
        match self {
            Self::Dark => Self::Light,
            Self::Light => Self::Dark,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Dark => "Dark",
            Self::Light => "Light",
        }
    }
}

// ============================================================================
// Color Palette
// ============================================================================

#[derive(Debug, Clone)]
pub struct ColorPalette {
    // -- Lists --
    pub list_normal: Style,
    pub list_selected: Style,
    pub post_title: Style,
    pub post_meta: Style,

    // -- Tags --
    pub tag_badge: Style,
    pub tag_badge_selected: Style,
    pub tag_toggle: Style,

    // -- Post detail --
    pub post_body: Style,
    pub like_active: Style,
    pub bookmark_active: Style,
    pub comment_author: Style,

    // -- Forms --
    pub input_focused: Style,
    pub form_error: Style,

    // -- Chrome --
    pub header: Style,
    pub status_bar: Style,
    pub panel_border: Style,
    pub panel_border_focused: Style,
    pub confirm_destructive: Style,
}

impl ColorPalette {
    fn dark() -> Self {
        Self {
            list_normal: Style::default(),
            list_selected: Style::default().bg(Color::DarkGray).fg(Color::White),
            post_title: Style::default().add_modifier(Modifier::BOLD),
            post_meta: Style::default().fg(Color::DarkGray),

            tag_badge: Style::default().fg(Color::Cyan),
            tag_badge_selected: Style::default()
                .bg(Color::Cyan)
                .fg(Color::Black)
                .add_modifier(Modifier::BOLD),
            tag_toggle: Style::default()
                .fg(Color::Blue)
                .add_modifier(Modifier::UNDERLINED),

            post_body: Style::default(),
            like_active: Style::default().fg(Color::Red),
            bookmark_active: Style::default().fg(Color::Yellow),
            comment_author: Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),

            input_focused: Style::default().fg(Color::Yellow),
            form_error: Style::default().fg(Color::Red),

            header: Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
            status_bar: Style::default().bg(Color::DarkGray).fg(Color::White),
            panel_border: Style::default(),
            panel_border_focused: Style::default().fg(Color::Cyan),
            confirm_destructive: Style::default()
                .fg(Color::Red)
                .add_modifier(Modifier::BOLD),
        }
    }

    fn light() -> Self {
        Self {
            list_normal: Style::default().fg(Color::Black),
            list_selected: Style::default().bg(Color::Blue).fg(Color::White),
            post_title: Style::default()
                .fg(Color::Black)
                .add_modifier(Modifier::BOLD),
            post_meta: Style::default().fg(Color::DarkGray),

            tag_badge: Style::default().fg(Color::Blue),
            tag_badge_selected: Style::default()
                .bg(Color::Blue)
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
            tag_toggle: Style::default()
                .fg(Color::Magenta)
                .add_modifier(Modifier::UNDERLINED),

            post_body: Style::default().fg(Color::Black),
            like_active: Style::default().fg(Color::Red),
            bookmark_active: Style::default().fg(Color::Magenta),
            comment_author: Style::default()
                .fg(Color::Blue)
                .add_modifier(Modifier::BOLD),

            input_focused: Style::default().fg(Color::Blue),
            form_error: Style::default().fg(Color::Red),

            header: Style::default()
                .fg(Color::Blue)
                .add_modifier(Modifier::BOLD),
            status_bar: Style::default().bg(Color::White).fg(Color::Black),
            panel_border: Style::default().fg(Color::DarkGray),
            panel_border_focused: Style::default().fg(Color::Blue),
            confirm_destructive: Style::default()
                .fg(Color::Red)
                .add_modifier(Modifier::BOLD),
        }
    }
}

// ============================================================================
// Style Map
// ============================================================================

/// String-keyed style lookup.
#[derive(Debug, Clone)]
pub struct StyleMap {
    map: HashMap<&'static str, Style>,
}

/// All semantic role names, in declaration order.
const ROLE_NAMES: [&str; 19] = [
    "list_normal",
    "list_selected",
    "post_title",
    "post_meta",
    "tag_badge",
    "tag_badge_selected",
    "tag_toggle",
    "post_body",
    "like_active",
    "bookmark_active",
    "comment_author",
    "input_focused",
    "form_error",
    "header",
    "status_bar",
    "panel_border",
    "panel_border_focused",
    "confirm_destructive",
    "post_meta_dim",
];

impl StyleMap {
    pub fn from_palette(p: &ColorPalette) -> Self {
        let styles: [Style; 19] = [
            p.list_normal,
            p.list_selected,
            p.post_title,
            p.post_meta,
            p.tag_badge,
            p.tag_badge_selected,
            p.tag_toggle,
            p.post_body,
            p.like_active,
            p.bookmark_active,
            p.comment_author,
            p.input_focused,
            p.form_error,
            p.header,
            p.status_bar,
            p.panel_border,
            p.panel_border_focused,
            p.confirm_destructive,
            p.post_meta.add_modifier(Modifier::DIM),
        ];

        let map = ROLE_NAMES
            .iter()
            .zip(styles.iter())
            .map(|(name, style)| (*name, *style))
            .collect();
        Self { map }
    }

    /// Resolve a role name. Unknown roles get `Style::default()`.
    pub fn resolve(&self, role: &str) -> Style {
        self.map.get(role).copied().unwrap_or_default()
    }
}

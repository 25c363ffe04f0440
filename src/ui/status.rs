use crate::app::{App, View};
use ratatui::{layout::Rect, widgets::Paragraph, Frame};
use std::borrow::Cow;

/// Render the status bar
pub fn render(f: &mut Frame, app: &App, area: Rect) {
    if area.width < 1 || area.height < 1 {
        return;
    }

    // Borrow the status message or a static hint; no allocation per frame
    let text: Cow<'_, str> = if let Some((msg, _)) = &app.status_message {
        Cow::Borrowed(&**msg)
    } else if app.search_focused {
        Cow::Borrowed("Type to search | ENTER search/open | ↑↓ results | Ctrl+U clear | ESC close")
    } else {
        match app.view {
            View::Feed => Cow::Borrowed(
                "[Enter]open [Tab]panel [n/p]page [1/2]tag [m]ore [/]search [c]ompose [b]ookmarks [L]ogin [?]help [q]uit",
            ),
            View::Post if app.comment_input => {
                Cow::Borrowed("Type your comment | ENTER send | ESC cancel")
            }
            View::Post => Cow::Borrowed(
                "[Esc]back [l]ike [b]ookmark [c]omment [j/k]comments [f]like comment [x]delete comment [o]pen",
            ),
            View::Compose => Cow::Borrowed("[Ctrl+S]save [Ctrl+F]fullscreen [Tab]field [PgUp/PgDn]scroll [Esc]discard"),
            View::Auth => Cow::Borrowed("[Enter]submit [Tab]field [Ctrl+T]login/register [Esc]back"),
            View::Settings => Cow::Borrowed("[Enter]save [Tab]field [Esc]back"),
            View::Bookmarks => Cow::Borrowed("[Enter]open [j/k]move [r]eload [Esc]back"),
        }
    };

    let paragraph = Paragraph::new(text).style(app.style("status_bar"));
    f.render_widget(paragraph, area);
}

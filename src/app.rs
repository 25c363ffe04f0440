use crate::api::{ApiClient, ApiError, BookmarkedPost, SearchResults, TagCount, UserProfile};
use crate::auth::{AuthForm, AuthRequest};
use crate::config::Config;
use crate::editor::PostDraft;
use crate::feed::{Feed, FeedSnapshot, Tag};
use crate::interaction::{Interaction, InteractionResult, PostView};
use crate::profile::ProfileForm;
use crate::search::SearchOverlay;
use crate::session::Session;
use crate::theme::{StyleMap, ThemeVariant};
use ratatui::style::Style;
use secrecy::SecretString;
use std::borrow::Cow;
use std::time::Duration;
use tokio::time::Instant;

/// How long a status message stays visible.
const STATUS_TTL: Duration = Duration::from_secs(3);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Feed,
    Post,
    Compose,
    Auth,
    Settings,
    Bookmarks,
}

/// Which feed panel has keyboard focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Posts,
    Tags,
    Trending,
    Activity,
}

impl Focus {
    pub fn next(self) -> Self {
        match self {
            Focus::Posts => Focus::Tags,
            Focus::Tags => Focus::Trending,
            Focus::Trending => Focus::Activity,
            Focus::Activity => Focus::Posts,
        }
    }
}

/// Input field focus in the composer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComposeField {
    Title,
    Body,
    NewTag,
    Tags,
}

impl ComposeField {
    pub fn next(self) -> Self {
        match self {
            ComposeField::Title => ComposeField::Body,
            ComposeField::Body => ComposeField::NewTag,
            ComposeField::NewTag => ComposeField::Tags,
            ComposeField::Tags => ComposeField::Title,
        }
    }
}

/// One entry in the tag sidebar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagEntry {
    Tag(Tag),
    /// The "More..."/"Less" control.
    Toggle,
}

/// Events from background tasks
pub enum AppEvent {
    FeedLoaded {
        generation: u64,
        snapshot: FeedSnapshot,
    },
    PostLoaded {
        post_id: i64,
        result: Result<PostView, ApiError>,
    },
    /// A like, bookmark, comment or delete finished for `post_id`.
    InteractionDone {
        post_id: i64,
        interaction: Interaction,
        result: Result<InteractionResult, ApiError>,
    },
    SearchCompleted {
        generation: u64,
        result: Result<SearchResults, ApiError>,
    },
    AuthCompleted {
        request: AuthRequest,
        result: Result<SecretString, ApiError>,
    },
    LoggedOut(Result<(), ApiError>),
    CurrentUserLoaded(Result<UserProfile, ApiError>),
    DraftSaved(Result<Option<String>, ApiError>),
    ComposeTagsLoaded(Result<Vec<TagCount>, ApiError>),
    ProfileSaved(Result<UserProfile, ApiError>),
    BookmarksLoaded(Result<Vec<BookmarkedPost>, ApiError>),
    /// A background task panicked.
    TaskPanicked {
        task: &'static str,
        error: String,
    },
}

pub struct App {
    pub client: ApiClient,
    pub session: Session,
    pub config: Config,

    // Theme
    pub theme_variant: ThemeVariant,
    pub theme: StyleMap,

    // Feed
    pub view: View,
    pub focus: Focus,
    pub feed: Feed,
    pub selected_post: usize,
    pub selected_tag: usize,
    pub selected_trending: usize,
    pub selected_activity: usize,

    // Post detail
    pub post_view: Option<PostView>,
    /// Post id currently being loaded for the detail view.
    pub post_loading: Option<i64>,
    pub selected_comment: usize,
    pub post_scroll: usize,
    /// Typing into the comment box.
    pub comment_input: bool,
    /// View to return to when the detail view closes.
    pub return_view: View,

    // Search
    pub search: SearchOverlay,
    pub search_focused: bool,
    pub search_cursor: Option<usize>,

    // Composer
    pub draft: Option<PostDraft>,
    pub compose_field: ComposeField,
    pub compose_tag_selected: usize,
    pub compose_scroll: u16,

    // Account
    pub auth: AuthForm,
    pub profile: ProfileForm,
    pub current_user: Option<UserProfile>,

    // Bookmarks
    pub bookmarks: Vec<BookmarkedPost>,
    pub bookmarks_loading: bool,
    pub selected_bookmark: usize,

    // Chrome
    pub status_message: Option<(Cow<'static, str>, Instant)>,
    pub needs_redraw: bool,
    pub show_help: bool,
    pub spinner_frame: usize,
}

impl App {
    pub fn new(client: ApiClient, session: Session, config: Config) -> Self {
        let theme_variant = ThemeVariant::from_str_name(&config.theme).unwrap_or_else(|| {
            tracing::warn!(theme = %config.theme, "Unknown theme, using dark");
            ThemeVariant::Dark
        });
        Self {
            client,
            session,
            theme_variant,
            theme: StyleMap::from_palette(&theme_variant.palette()),
            view: View::Feed,
            focus: Focus::Posts,
            feed: Feed::new(config.tag_display_cap),
            selected_post: 0,
            selected_tag: 0,
            selected_trending: 0,
            selected_activity: 0,
            post_view: None,
            post_loading: None,
            selected_comment: 0,
            post_scroll: 0,
            comment_input: false,
            return_view: View::Feed,
            search: SearchOverlay::new(config.preview_chars),
            search_focused: false,
            search_cursor: None,
            draft: None,
            compose_field: ComposeField::Title,
            compose_tag_selected: 0,
            compose_scroll: 0,
            auth: AuthForm::new(),
            profile: ProfileForm::new(),
            current_user: None,
            bookmarks: Vec::new(),
            bookmarks_loading: false,
            selected_bookmark: 0,
            status_message: None,
            needs_redraw: true,
            show_help: false,
            spinner_frame: 0,
            config,
        }
    }

    /// Resolve a semantic role name to its `Style`.
    pub fn style(&self, role: &str) -> Style {
        self.theme.resolve(role)
    }

    /// Switch to the next theme variant. Returns its name for display.
    pub fn cycle_theme(&mut self) -> &'static str {
        self.theme_variant = self.theme_variant.next();
        self.theme = StyleMap::from_palette(&self.theme_variant.palette());
        self.needs_redraw = true;
        self.theme_variant.name()
    }

    /// Set status message (will auto-expire after 3 seconds)
    pub fn set_status(&mut self, msg: impl Into<Cow<'static, str>>) {
        self.status_message = Some((msg.into(), Instant::now()));
    }

    /// Clear status message if expired. Returns true if one was cleared.
    pub fn clear_expired_status(&mut self) -> bool {
        if let Some((_, time)) = &self.status_message {
            if time.elapsed() >= STATUS_TTL {
                self.status_message = None;
                return true;
            }
        }
        false
    }

    /// Advance overlay unmount timers. Returns true when a redraw is needed.
    pub fn tick_overlays(&mut self) -> bool {
        self.post_view
            .as_mut()
            .is_some_and(|view| view.confirm_mut().tick())
    }

    /// Whether any confirmation dialog is accepting input.
    pub fn confirm_active(&self) -> bool {
        self.post_view
            .as_ref()
            .is_some_and(|view| view.confirm().active().is_some())
    }

    // ------------------------------------------------------------------------
    // Tag sidebar
    // ------------------------------------------------------------------------

    pub fn tag_entries(&self) -> Vec<TagEntry> {
        let filter = self.feed.filter();
        let mut entries: Vec<TagEntry> = filter.visible().into_iter().map(TagEntry::Tag).collect();
        if filter.has_toggle() {
            entries.push(TagEntry::Toggle);
        }
        entries
    }

    // ------------------------------------------------------------------------
    // Navigation
    // ------------------------------------------------------------------------

    fn focus_len(&self) -> usize {
        match self.focus {
            Focus::Posts => self.feed.posts().len(),
            Focus::Tags => self.tag_entries().len(),
            Focus::Trending => self.feed.trending().len(),
            Focus::Activity => self.feed.activities().len(),
        }
    }

    fn focus_index_mut(&mut self) -> &mut usize {
        match self.focus {
            Focus::Posts => &mut self.selected_post,
            Focus::Tags => &mut self.selected_tag,
            Focus::Trending => &mut self.selected_trending,
            Focus::Activity => &mut self.selected_activity,
        }
    }

    pub fn nav_up(&mut self) {
        let idx = self.focus_index_mut();
        *idx = idx.saturating_sub(1);
    }

    pub fn nav_down(&mut self) {
        let len = self.focus_len();
        let idx = self.focus_index_mut();
        if *idx + 1 < len {
            *idx += 1;
        }
    }

    /// Keep selection indices inside their lists after data changes.
    pub fn clamp_selections(&mut self) {
        fn clamp(idx: &mut usize, len: usize) {
            *idx = (*idx).min(len.saturating_sub(1));
        }
        let tags = self.tag_entries().len();
        clamp(&mut self.selected_post, self.feed.posts().len());
        clamp(&mut self.selected_tag, tags);
        clamp(&mut self.selected_trending, self.feed.trending().len());
        clamp(&mut self.selected_activity, self.feed.activities().len());
        clamp(&mut self.selected_bookmark, self.bookmarks.len());
        if let Some(view) = &self.post_view {
            clamp(&mut self.selected_comment, view.comments().len());
        }
    }

    /// Id of the selected comment in the detail view.
    pub fn selected_comment_id(&self) -> Option<i64> {
        self.post_view
            .as_ref()?
            .comments()
            .get(self.selected_comment)
            .map(|c| c.id)
    }

    /// Number of entries in the search results panel (posts, then users).
    pub fn search_result_len(&self) -> usize {
        self.search
            .results()
            .map_or(0, |r| r.posts.len() + r.users.len())
    }

    /// Leave the detail view.
    pub fn close_post(&mut self) {
        self.post_view = None;
        self.post_loading = None;
        self.comment_input = false;
        self.selected_comment = 0;
        self.post_scroll = 0;
        self.view = self.return_view;
    }
}

//! Feed model: paginated post list, tag filter and sidebar sections.
//!
//! # Module Structure
//!
//! - `fetcher` - Four-way parallel fetch with fail-open slices
//! - `tags` - Tag filter value, visibility cap and show-all toggle
//!
//! [`Feed`] owns view state only. Operations that change what should be
//! shown return a [`FeedLoad`] for the caller to run, and results are applied
//! back with [`Feed::apply`], which drops anything from a superseded load.

mod fetcher;
mod tags;

pub use fetcher::{fetch_feed, FeedSnapshot};
pub use tags::{Tag, TagFilter, DEFAULT_TAG_CAP, EXPLORE_ALL};

use crate::api::{Activity, Post, TrendingStory};

/// The (page, tag) pair a posts request is issued for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedQuery {
    pub page: u32,
    pub tag: Tag,
}

impl Default for FeedQuery {
    fn default() -> Self {
        Self {
            page: 1,
            tag: Tag::ExploreAll,
        }
    }
}

/// A load the caller should start, tagged for stale-result detection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedLoad {
    pub generation: u64,
    pub query: FeedQuery,
}

/// What the post list area should show. These states are kept distinct:
/// an empty unfiltered feed is a welcome screen, an empty filtered feed is
/// a message inside the normal layout.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FeedDisplay<'a> {
    Loading,
    Welcome,
    NothingTagged(&'a Tag),
    Posts(&'a [Post]),
}

#[derive(Debug, Clone)]
pub struct Feed {
    filter: TagFilter,
    page: u32,
    pages: u32,
    posts: Vec<Post>,
    trending: Vec<TrendingStory>,
    activities: Vec<Activity>,
    loading: bool,
    generation: u64,
}

impl Default for Feed {
    fn default() -> Self {
        Self::new(DEFAULT_TAG_CAP)
    }
}

impl Feed {
    pub fn new(tag_cap: usize) -> Self {
        Self {
            filter: TagFilter::new(tag_cap),
            page: 1,
            pages: 1,
            posts: Vec::new(),
            trending: Vec::new(),
            activities: Vec::new(),
            loading: true,
            generation: 0,
        }
    }

    pub fn query(&self) -> FeedQuery {
        FeedQuery {
            page: self.page,
            tag: self.filter.selected().clone(),
        }
    }

    /// Start a load for the current query. Marks the feed as loading.
    pub fn begin_load(&mut self) -> FeedLoad {
        self.generation = self.generation.wrapping_add(1);
        self.loading = true;
        FeedLoad {
            generation: self.generation,
            query: self.query(),
        }
    }

    /// Select a tag (sentinel or named). The page always resets to 1.
    ///
    /// Returns `None` when neither the tag nor the page changed.
    pub fn select_tag(&mut self, tag: Tag) -> Option<FeedLoad> {
        let unchanged = *self.filter.selected() == tag && self.page == 1;
        self.filter.set_selected(tag);
        self.page = 1;
        if unchanged {
            return None;
        }
        Some(self.begin_load())
    }

    /// Set the tag before the first load without starting one.
    pub fn preselect_tag(&mut self, tag: Tag) {
        self.filter.set_selected(tag);
        self.page = 1;
    }

    pub fn next_page(&mut self) -> Option<FeedLoad> {
        if self.page >= self.pages {
            return None;
        }
        self.page += 1;
        Some(self.begin_load())
    }

    pub fn prev_page(&mut self) -> Option<FeedLoad> {
        if self.page <= 1 {
            return None;
        }
        self.page -= 1;
        Some(self.begin_load())
    }

    /// Apply a finished load. Returns `false` (and changes nothing) when the
    /// snapshot belongs to a load that has since been superseded.
    pub fn apply(&mut self, generation: u64, snapshot: FeedSnapshot) -> bool {
        if generation != self.generation {
            tracing::debug!(
                generation,
                current = self.generation,
                "Discarding stale feed snapshot"
            );
            return false;
        }
        self.posts = snapshot.page.posts;
        self.pages = snapshot.page.pages.max(1);
        self.trending = snapshot.trending;
        self.activities = snapshot.activities;
        self.filter.set_available(snapshot.tags);
        self.loading = false;
        true
    }

    /// Drop a post that was deleted elsewhere.
    pub fn remove_post(&mut self, post_id: i64) {
        self.posts.retain(|p| p.id != post_id);
    }

    pub fn display(&self) -> FeedDisplay<'_> {
        if self.loading {
            return FeedDisplay::Loading;
        }
        match self.filter.selected() {
            _ if !self.posts.is_empty() => FeedDisplay::Posts(&self.posts),
            Tag::ExploreAll => FeedDisplay::Welcome,
            tag => FeedDisplay::NothingTagged(tag),
        }
    }

    pub fn filter(&self) -> &TagFilter {
        &self.filter
    }

    pub fn filter_mut(&mut self) -> &mut TagFilter {
        &mut self.filter
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn pages(&self) -> u32 {
        self.pages
    }

    pub fn posts(&self) -> &[Post] {
        &self.posts
    }

    pub fn trending(&self) -> &[TrendingStory] {
        &self.trending
    }

    pub fn activities(&self) -> &[Activity] {
        &self.activities
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::PostPage;
    use pretty_assertions::assert_eq;

    fn post(id: i64) -> Post {
        Post {
            id,
            title: format!("Post {}", id),
            body: String::new(),
            created: None,
            host_id: 1,
            host_username: None,
            host_avatar: None,
            likes: 0,
            tags: Vec::new(),
            is_liked: None,
            comments: Vec::new(),
        }
    }

    fn snapshot(posts: Vec<Post>, pages: u32) -> FeedSnapshot {
        FeedSnapshot {
            page: PostPage {
                posts,
                total: 0,
                pages,
                current_page: 1,
            },
            ..FeedSnapshot::default()
        }
    }

    fn loaded(pages: u32) -> Feed {
        let mut feed = Feed::default();
        let load = feed.begin_load();
        feed.apply(load.generation, snapshot(vec![post(1)], pages));
        feed
    }

    #[test]
    fn test_tag_change_resets_page() {
        let mut feed = loaded(3);
        feed.next_page().unwrap();
        assert_eq!(feed.page(), 2);

        let load = feed.select_tag(Tag::Named("rust".into())).unwrap();
        assert_eq!(
            load.query,
            FeedQuery {
                page: 1,
                tag: Tag::Named("rust".into())
            }
        );
    }

    #[test]
    fn test_preselected_tag_used_by_first_load() {
        let mut feed = Feed::default();
        feed.preselect_tag(Tag::Named("rust".into()));
        assert_eq!(feed.filter().selected(), &Tag::Named("rust".into()));

        let load = feed.begin_load();
        assert_eq!(load.generation, 1);
        assert_eq!(
            load.query,
            FeedQuery {
                page: 1,
                tag: Tag::Named("rust".into())
            }
        );
    }

    #[test]
    fn test_reselecting_same_tag_on_page_one_is_noop() {
        let mut feed = loaded(3);
        assert!(feed.select_tag(Tag::ExploreAll).is_none());
        feed.next_page().unwrap();
        // Same tag, but page changes back to 1
        assert!(feed.select_tag(Tag::ExploreAll).is_some());
    }

    #[test]
    fn test_pagination_bounded_by_pages() {
        let mut feed = loaded(2);
        assert!(feed.prev_page().is_none());
        assert_eq!(feed.next_page().map(|l| l.query.page), Some(2));
        assert!(feed.next_page().is_none());
        assert_eq!(feed.prev_page().map(|l| l.query.page), Some(1));
    }

    #[test]
    fn test_zero_pages_treated_as_one() {
        let mut feed = loaded(0);
        assert_eq!(feed.pages(), 1);
        assert!(feed.next_page().is_none());
    }

    #[test]
    fn test_stale_snapshot_dropped() {
        let mut feed = Feed::default();
        let first = feed.begin_load();
        let second = feed.select_tag(Tag::Named("go".into())).unwrap();

        assert!(!feed.apply(first.generation, snapshot(vec![post(1)], 1)));
        assert!(feed.is_loading());
        assert!(feed.apply(second.generation, snapshot(vec![], 1)));
        assert_eq!(feed.display(), FeedDisplay::NothingTagged(&Tag::Named("go".into())));
    }

    #[test]
    fn test_display_states_are_distinct() {
        let mut feed = Feed::default();
        assert_eq!(feed.display(), FeedDisplay::Loading);

        let load = feed.begin_load();
        feed.apply(load.generation, snapshot(vec![], 1));
        assert_eq!(feed.display(), FeedDisplay::Welcome);

        let load = feed.select_tag(Tag::Named("rust".into())).unwrap();
        feed.apply(load.generation, snapshot(vec![], 1));
        assert!(matches!(feed.display(), FeedDisplay::NothingTagged(_)));

        let load = feed.begin_load();
        feed.apply(load.generation, snapshot(vec![post(4)], 1));
        assert!(matches!(feed.display(), FeedDisplay::Posts(p) if p.len() == 1));
    }

    #[test]
    fn test_remove_post() {
        let mut feed = loaded(1);
        feed.remove_post(1);
        assert!(feed.posts().is_empty());
    }
}

//! Tag filter: the one selected tag plus the capped list of visible tags.

use crate::api::TagCount;
use std::fmt;

/// Label of the "no filter" tag.
pub const EXPLORE_ALL: &str = "Explore All";

/// Named tags shown before the "More..." toggle appears.
pub const DEFAULT_TAG_CAP: usize = 8;

/// A tag filter value.
///
/// `ExploreAll` means "no filter" and is never sent to the server as a tag
/// name; it maps to an empty `tag` parameter.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum Tag {
    #[default]
    ExploreAll,
    Named(String),
}

impl Tag {
    /// Build a tag from user or server text.
    ///
    /// Blank text and the sentinel label both mean `ExploreAll`.
    pub fn from_name(name: &str) -> Self {
        let name = name.trim();
        if name.is_empty() || name == EXPLORE_ALL {
            Tag::ExploreAll
        } else {
            Tag::Named(name.to_string())
        }
    }

    /// Value of the `tag` query parameter for this filter.
    pub fn query_value(&self) -> &str {
        match self {
            Tag::ExploreAll => "",
            Tag::Named(name) => name,
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Tag::ExploreAll => EXPLORE_ALL,
            Tag::Named(name) => name,
        }
    }

    pub fn is_explore_all(&self) -> bool {
        matches!(self, Tag::ExploreAll)
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Selected tag, available tags, and the show-all toggle.
///
/// Pagination lives in [`Feed`](super::Feed); selecting through the feed
/// resets the page.
#[derive(Debug, Clone)]
pub struct TagFilter {
    selected: Tag,
    available: Vec<TagCount>,
    show_all: bool,
    cap: usize,
}

impl Default for TagFilter {
    fn default() -> Self {
        Self::new(DEFAULT_TAG_CAP)
    }
}

impl TagFilter {
    pub fn new(cap: usize) -> Self {
        Self {
            selected: Tag::ExploreAll,
            available: Vec::new(),
            show_all: false,
            cap,
        }
    }

    pub fn selected(&self) -> &Tag {
        &self.selected
    }

    pub(super) fn set_selected(&mut self, tag: Tag) {
        self.selected = tag;
    }

    pub fn set_available(&mut self, tags: Vec<TagCount>) {
        self.available = tags;
    }

    pub fn available(&self) -> &[TagCount] {
        &self.available
    }

    pub fn show_all(&self) -> bool {
        self.show_all
    }

    /// Whether the "More..."/"Less" toggle is offered.
    pub fn has_toggle(&self) -> bool {
        self.available.len() > self.cap
    }

    pub fn toggle_show_all(&mut self) {
        self.show_all = !self.show_all;
    }

    /// Label for the toggle in its current state.
    pub fn toggle_label(&self) -> &'static str {
        if self.show_all {
            "Less"
        } else {
            "More..."
        }
    }

    /// Visible named tags: the first `cap` unless show-all is set.
    pub fn visible_named(&self) -> &[TagCount] {
        if self.show_all {
            &self.available
        } else {
            &self.available[..self.available.len().min(self.cap)]
        }
    }

    /// All visible tags in display order. The sentinel always comes first
    /// and does not count against the cap.
    pub fn visible(&self) -> Vec<Tag> {
        std::iter::once(Tag::ExploreAll)
            .chain(self.visible_named().iter().map(|t| Tag::Named(t.name.clone())))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn counts(n: usize) -> Vec<TagCount> {
        (0..n)
            .map(|i| TagCount {
                name: format!("tag{}", i),
                count: 1,
            })
            .collect()
    }

    #[test]
    fn test_sentinel_maps_to_empty_param() {
        assert_eq!(Tag::ExploreAll.query_value(), "");
        assert_eq!(Tag::Named("rust".into()).query_value(), "rust");
        assert_eq!(Tag::from_name("Explore All"), Tag::ExploreAll);
        assert_eq!(Tag::from_name("  "), Tag::ExploreAll);
    }

    #[test]
    fn test_default_is_explore_all() {
        let filter = TagFilter::default();
        assert!(filter.selected().is_explore_all());
        assert!(!filter.show_all());
    }

    #[test]
    fn test_toggle_only_beyond_cap() {
        let mut filter = TagFilter::default();
        filter.set_available(counts(8));
        assert!(!filter.has_toggle());
        filter.set_available(counts(9));
        assert!(filter.has_toggle());
        assert_eq!(filter.toggle_label(), "More...");
        filter.toggle_show_all();
        assert_eq!(filter.toggle_label(), "Less");
    }

    #[test]
    fn test_sentinel_first_and_outside_cap() {
        let mut filter = TagFilter::default();
        filter.set_available(counts(12));
        let visible = filter.visible();
        assert_eq!(visible.len(), 9);
        assert_eq!(visible[0], Tag::ExploreAll);
        assert_eq!(visible[1], Tag::Named("tag0".into()));
    }

    #[test]
    fn test_server_tags_never_collapse_into_sentinel() {
        let mut filter = TagFilter::default();
        let mut tags = counts(6);
        tags.insert(
            0,
            TagCount {
                name: "Explore All".into(),
                count: 3,
            },
        );
        tags.push(TagCount {
            name: " ".into(),
            count: 1,
        });
        filter.set_available(tags);

        let visible = filter.visible();
        assert_eq!(visible.len(), 9);
        assert_eq!(visible[0], Tag::ExploreAll);
        assert_eq!(visible[1], Tag::Named("Explore All".into()));
        assert_eq!(visible[8], Tag::Named(" ".into()));
    }

    proptest! {
        #[test]
        fn visible_named_respects_cap(len in 0usize..40, show_all: bool) {
            let mut filter = TagFilter::default();
            filter.set_available(counts(len));
            if show_all {
                filter.toggle_show_all();
            }
            let expected = if show_all { len } else { len.min(DEFAULT_TAG_CAP) };
            prop_assert_eq!(filter.visible_named().len(), expected);
            prop_assert_eq!(filter.visible().len(), expected + 1);
        }
    }
}

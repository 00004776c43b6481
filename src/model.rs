//! The assembled site: every content list plus the structures derived
//! across them.
//!
//! A `SiteModel` is rebuilt from scratch on every run by the stages in
//! [`crate::pipeline`]; nothing in it is persisted. Emission only ever
//! borrows it immutably.

use crate::category::CategoryIndex;
use crate::ordering;
use crate::types::{GalleryItem, GameEntry, HobbyProject, JobEntry, LongPost, MicroPost};

#[derive(Debug, Clone, Default)]
pub struct SiteModel {
    /// Long posts and folded micro posts, newest first once ordered.
    pub feed: Vec<LongPost>,
    /// Micro posts as loaded, newest first.
    pub micro: Vec<MicroPost>,
    pub categories: CategoryIndex,
    /// Gallery items in gallery order.
    pub gallery: Vec<GalleryItem>,
    pub jobs: Vec<JobEntry>,
    pub games: Vec<GameEntry>,
    /// Platforms across all games, de-duplicated and sorted.
    pub platforms: Vec<String>,
    pub hobbies: Vec<HobbyProject>,
}

impl SiteModel {
    /// The newest `n` posts, for the home page.
    pub fn short_feed(&self, n: usize) -> &[LongPost] {
        ordering::short_list(&self.feed, n)
    }

    /// Posts that came from the micro directory, in feed order.
    pub fn micro_feed(&self) -> impl Iterator<Item = &LongPost> {
        self.feed.iter().filter(|p| p.is_micro)
    }

    /// Posts shown on the category page `slug`, in feed order.
    ///
    /// Categories whose slugs collide share a page, so membership is by
    /// slug rather than by category name.
    pub fn posts_with_slug(&self, slug: &str) -> Vec<&LongPost> {
        self.feed
            .iter()
            .filter(|p| p.categories.iter().any(|c| c.slug() == slug))
            .collect()
    }

    pub fn find_post(&self, key: &str) -> Option<&LongPost> {
        self.feed.iter().find(|p| p.key == key)
    }
}

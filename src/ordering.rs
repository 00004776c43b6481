//! Total orders for every listed content kind, and short-list slicing.
//!
//! | Kind | Order |
//! |------|-------|
//! | Long posts | publish date descending, then key |
//! | Gallery items | directory ascending, date descending, then path |
//! | Jobs | start date descending, undated last, then company |
//! | Games | date descending, undated last, then title |
//!
//! Every comparator ends in a unique field so sorting is deterministic no
//! matter what order the sources were read in.

use std::cmp::Ordering;

use crate::dates::PubDate;
use crate::types::{GalleryItem, GameEntry, JobEntry, LongPost};

pub fn compare_posts(a: &LongPost, b: &LongPost) -> Ordering {
    b.published
        .cmp(&a.published)
        .then_with(|| a.key.cmp(&b.key))
}

pub fn sort_feed(posts: &mut [LongPost]) {
    posts.sort_by(compare_posts);
}

/// Same directory: newest first. Different directories: by path,
/// whatever the dates.
pub fn compare_gallery(a: &GalleryItem, b: &GalleryItem) -> Ordering {
    a.dir()
        .cmp(b.dir())
        .then_with(|| b.published.cmp(&a.published))
        .then_with(|| a.file.cmp(&b.file))
}

pub fn sort_gallery(items: &mut [GalleryItem]) {
    items.sort_by(compare_gallery);
}

/// Newest first with undated entries after every dated one.
fn newest_first(a: Option<&PubDate>, b: Option<&PubDate>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => b.cmp(a),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

pub fn sort_jobs(jobs: &mut [JobEntry]) {
    jobs.sort_by(|a, b| {
        newest_first(a.date.as_ref(), b.date.as_ref()).then_with(|| a.company.cmp(&b.company))
    });
}

pub fn sort_games(games: &mut [GameEntry]) {
    games.sort_by(|a, b| {
        newest_first(a.date.as_ref(), b.date.as_ref()).then_with(|| a.title.cmp(&b.title))
    });
}

/// The first `n` items, or all of them when there are fewer.
pub fn short_list<T>(items: &[T], n: usize) -> &[T] {
    &items[..n.min(items.len())]
}

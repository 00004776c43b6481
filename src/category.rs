//! Category index with a minimum-membership filter.
//!
//! Authors tag posts freely; a tag used on a single post would produce a
//! category page listing one post, so categories with fewer than
//! [`MIN_CATEGORY_MEMBERS`] posts are hidden. Each post keeps its authored
//! (`raw_categories`) list untouched and gets a rebuilt `categories` list
//! holding only the surviving tags.
//!
//! The index is a pure function of the raw lists: rebuilding it is stable,
//! and indexing the visible lists as if they were raw drops nothing further.

use std::collections::{BTreeMap, BTreeSet};

use crate::types::{Category, LongPost};

pub const MIN_CATEGORY_MEMBERS: usize = 2;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryIndex {
    /// Surviving category → member post keys, in feed order.
    members: BTreeMap<Category, Vec<String>>,
    /// Categories dropped for having too few members, sorted.
    dropped: Vec<Category>,
}

/// One category page: its URL slug and the category shown as its title.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryPage {
    pub slug: String,
    pub category: Category,
}

impl CategoryIndex {
    /// Count memberships over `posts`' raw lists. A post tagged twice with
    /// the same category counts once.
    pub fn build(posts: &[LongPost]) -> Self {
        let mut all: BTreeMap<Category, Vec<String>> = BTreeMap::new();
        for post in posts {
            let mut seen = BTreeSet::new();
            for category in &post.raw_categories {
                if seen.insert(category) {
                    all.entry(category.clone()).or_default().push(post.key.clone());
                }
            }
        }

        let (members, dropped): (BTreeMap<_, _>, BTreeMap<_, _>) = all
            .into_iter()
            .partition(|(_, keys)| keys.len() >= MIN_CATEGORY_MEMBERS);

        Self {
            members,
            dropped: dropped.into_keys().collect(),
        }
    }

    /// Rewrite every post's visible list from its raw list.
    pub fn apply(&self, posts: &mut [LongPost]) {
        for post in posts.iter_mut() {
            let mut seen = BTreeSet::new();
            post.categories = post
                .raw_categories
                .iter()
                .filter(|c| self.members.contains_key(*c) && seen.insert(*c))
                .cloned()
                .collect();
        }
    }

    /// Build the index over `posts` and rewrite their visible categories.
    pub fn index(posts: &mut [LongPost]) -> Self {
        let index = Self::build(posts);
        index.apply(posts);
        for category in &index.dropped {
            spdlog::debug!("-cat {}", category);
        }
        spdlog::info!(
            "Categories: {} kept, {} dropped below {} posts",
            index.members.len(),
            index.dropped.len(),
            MIN_CATEGORY_MEMBERS
        );
        index
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn contains(&self, category: &Category) -> bool {
        self.members.contains_key(category)
    }

    pub fn categories(&self) -> impl Iterator<Item = &Category> {
        self.members.keys()
    }

    /// Member post keys of `category`, in feed order.
    pub fn members(&self, category: &Category) -> &[String] {
        self.members.get(category).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn dropped(&self) -> &[Category] {
        &self.dropped
    }

    /// One page per distinct slug. Categories whose slugs collide share the
    /// page of the first one; categories with an empty slug get none.
    pub fn pages(&self) -> Vec<CategoryPage> {
        let mut by_slug: BTreeMap<String, Category> = BTreeMap::new();
        for category in self.members.keys() {
            let slug = category.slug();
            if slug.is_empty() {
                spdlog::warn!("Category '{}' has no usable slug, no page generated", category);
                continue;
            }
            match by_slug.get(&slug) {
                Some(first) => spdlog::warn!(
                    "Categories '{}' and '{}' share the slug '{}', merging their pages",
                    first,
                    category,
                    slug
                ),
                None => {
                    by_slug.insert(slug, category.clone());
                }
            }
        }
        by_slug
            .into_iter()
            .map(|(slug, category)| CategoryPage { slug, category })
            .collect()
    }
}

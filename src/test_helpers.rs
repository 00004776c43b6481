//! Shared test utilities for the folio test suite.
//!
//! Provides item constructors, a source-tree fixture builder and lookup
//! helpers that panic with a useful message on a miss.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let site = SiteFixture::new()
//!     .post(long_post("hello", "2023-03-01", &["gamedev"]), "<p>Hello there</p>")
//!     .micro("note.md", "# Quick\n\nthought");
//! let probe = MockProbe::new();
//! let mut ctx = BuildContext::new(site.config(), site.root(), &probe, &RegexScanner).unwrap();
//! let model = pipeline::assemble(&mut ctx).unwrap();
//!
//! let post = find_post(&model.feed, "hello");
//! assert_eq!(post.link, "/blog/2023/03/hello/");
//! ```

use std::fs;
use std::path::Path;
use tempfile::TempDir;

use chrono::{NaiveDate, TimeZone, Utc};

use crate::config::SiteConfig;
use crate::dates::PubDate;
use crate::gallery;
use crate::loader;
use crate::types::{Category, GalleryItem, LongPost, PostType};

// =========================================================================
// Item constructors
// =========================================================================

/// Midnight UTC of a `YYYY-MM-DD` date.
pub fn pub_date(ymd: &str) -> PubDate {
    let date = NaiveDate::parse_from_str(ymd, "%Y-%m-%d")
        .unwrap_or_else(|e| panic!("bad test date '{ymd}': {e}"));
    Utc.from_utc_datetime(&date.and_time(chrono::NaiveTime::MIN))
        .fixed_offset()
}

/// A long post with derived link and date string, and an empty body.
pub fn long_post(key: &str, ymd: &str, categories: &[&str]) -> LongPost {
    let published = pub_date(ymd);
    let mut post = LongPost {
        key: key.to_string(),
        title: format!("Post {key}"),
        published,
        small_image: None,
        banner_image: None,
        short_desc: None,
        raw_categories: categories.iter().map(|c| Category::new(*c)).collect(),
        categories: Vec::new(),
        link: String::new(),
        date_str: String::new(),
        body: String::new(),
        summary: String::new(),
        is_micro: false,
        card: None,
    };
    post.set_published(published);
    post
}

/// An image item at gallery-relative path `file`.
pub fn gallery_item(file: &str, ymd: &str) -> GalleryItem {
    let published = pub_date(ymd);
    GalleryItem {
        file: file.to_string(),
        link: gallery::page_link(file),
        post_type: PostType::Image,
        date_str: crate::dates::date_string(&published),
        published,
        body: String::new(),
        brief: String::new(),
        includes: vec![file.to_string()],
    }
}

// =========================================================================
// Source tree fixture
// =========================================================================

/// A throwaway source tree laid out like a real site directory.
///
/// Builder methods write files immediately; the tree lives as long as the
/// fixture.
pub struct SiteFixture {
    dir: TempDir,
    posts: Vec<LongPost>,
}

impl SiteFixture {
    pub fn new() -> Self {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("data")).unwrap();
        let fixture = Self {
            dir,
            posts: Vec::new(),
        };
        fixture.write_posts();
        fixture
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    fn write_posts(&self) {
        loader::save_json_list(&self.root().join("data/posts.json"), &self.posts).unwrap();
    }

    /// Add a post to `posts.json` and write its body.
    pub fn post(mut self, post: LongPost, body: &str) -> Self {
        let mut with_body = post.clone();
        with_body.body = body.to_string();
        loader::save_post_body(&self.root().join("data"), &with_body).unwrap();
        self.posts.push(post);
        self.write_posts();
        self
    }

    /// Write any file relative to the source root.
    pub fn file(self, rel: &str, contents: &str) -> Self {
        let path = self.root().join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
        self
    }

    pub fn micro(self, name: &str, contents: &str) -> Self {
        self.file(&format!("micro/{name}"), contents)
    }

    pub fn gallery(self, rel: &str, contents: &str) -> Self {
        self.file(&format!("gallery/{rel}"), contents)
    }

    /// Stock config with the fixture's content paths.
    pub fn config(&self) -> SiteConfig {
        SiteConfig::default()
    }
}

// =========================================================================
// Lookups: panic with a clear message on a miss
// =========================================================================

/// Find a post by key. Panics if not found.
pub fn find_post<'a>(feed: &'a [LongPost], key: &str) -> &'a LongPost {
    feed.iter().find(|p| p.key == key).unwrap_or_else(|| {
        let keys = post_keys(feed);
        panic!("post '{key}' not found. Available: {keys:?}")
    })
}

/// Find a gallery item by its source path. Panics if not found.
pub fn find_item<'a>(items: &'a [GalleryItem], file: &str) -> &'a GalleryItem {
    items.iter().find(|i| i.file == file).unwrap_or_else(|| {
        let files: Vec<&str> = items.iter().map(|i| i.file.as_str()).collect();
        panic!("gallery item '{file}' not found. Available: {files:?}")
    })
}

/// All post keys in feed order.
pub fn post_keys(feed: &[LongPost]) -> Vec<&str> {
    feed.iter().map(|p| p.key.as_str()).collect()
}

/// Visible categories of a post.
pub fn visible(post: &LongPost) -> Vec<&str> {
    post.categories.iter().map(Category::as_str).collect()
}

//! Content item types shared across the pipeline.
//!
//! Each type mirrors one storage format: `LongPost`, `JobEntry`, `GameEntry`
//! and `HobbyProject` are read from JSON metadata arrays, `GalleryItem` and
//! the micro sidecar are written next to their source files. Fields marked
//! `#[serde(skip)]` are derived during a build and never persisted.

use crate::dates::{self, PubDate};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A category tag as authored on a post.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Category(pub String);

impl Category {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// URL component: ASCII letters kept, everything else dropped.
    ///
    /// ```text
    /// "Game Dev"  → "GameDev"
    /// "C++ & Rust" → "CRust"
    /// ```
    pub fn slug(&self) -> String {
        self.0.chars().filter(|c| c.is_ascii_alphabetic()).collect()
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Link-preview card flavour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CardKind {
    Summary,
    SummaryLargeImage,
}

impl CardKind {
    pub fn as_str(self) -> &'static str {
        match self {
            CardKind::Summary => "summary",
            CardKind::SummaryLargeImage => "summary_large_image",
        }
    }
}

/// Title, description and image used for link previews.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SocialCard {
    pub kind: CardKind,
    pub site: String,
    pub title: String,
    pub description: String,
    /// Absolute image URL.
    pub image: String,
    pub image_width: u32,
    pub image_height: u32,
}

/// A long-form blog post. Metadata comes from `posts.json`, the body from
/// `post/<year>/<key>.html`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LongPost {
    pub key: String,
    pub title: String,
    #[serde(rename = "pubDate", with = "dates::rfc2822")]
    pub published: PubDate,
    #[serde(rename = "smlImage", default, skip_serializing_if = "Option::is_none")]
    pub small_image: Option<String>,
    #[serde(rename = "bannerImage", default, skip_serializing_if = "Option::is_none")]
    pub banner_image: Option<String>,
    #[serde(rename = "desc", default, skip_serializing_if = "Option::is_none")]
    pub short_desc: Option<String>,
    #[serde(rename = "category", default)]
    pub raw_categories: Vec<Category>,

    /// Categories that survived the minimum-membership filter.
    #[serde(skip)]
    pub categories: Vec<Category>,
    #[serde(skip)]
    pub link: String,
    #[serde(skip)]
    pub date_str: String,
    #[serde(skip)]
    pub body: String,
    /// Plain-text summary used by cards, lists and the feed.
    #[serde(skip)]
    pub summary: String,
    /// Synthesized from a micro post rather than read from metadata.
    #[serde(skip)]
    pub is_micro: bool,
    #[serde(skip)]
    pub card: Option<SocialCard>,
}

impl LongPost {
    /// Set the publish instant and every field derived from it.
    pub fn set_published(&mut self, published: PubDate) {
        self.published = published;
        self.link = crate::presentation::post_link(&self.key, &published);
        self.date_str = dates::date_string(&published);
    }
}

/// Sidecar record of a micro post: only what can't be read from the file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MicroMeta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(rename = "pubDate")]
    pub published: PubDate,
}

/// A short post loaded from the micro directory.
#[derive(Debug, Clone)]
pub struct MicroPost {
    /// File stem of the source, the basis of the synthesized post key.
    pub stem: String,
    pub title: Option<String>,
    pub published: PubDate,
    pub date_str: String,
    /// Rendered HTML.
    pub body: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostType {
    Image,
    Movie,
    Txt,
    #[default]
    Post,
}

/// A file from the gallery tree, with the assets its page depends on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GalleryItem {
    /// Source path relative to the gallery root, `/`-separated.
    pub file: String,
    /// Page path relative to the gallery section, e.g. `2021/sketch.html`.
    pub link: String,
    #[serde(rename = "posttype", default)]
    pub post_type: PostType,
    #[serde(rename = "pubDate")]
    pub published: PubDate,
    #[serde(rename = "datestr")]
    pub date_str: String,
    pub body: String,
    #[serde(default)]
    pub brief: String,
    /// Gallery-relative files copied next to the generated page.
    #[serde(rename = "include", default)]
    pub includes: Vec<String>,
}

impl GalleryItem {
    /// Directory part of `file`, empty for items at the gallery root.
    pub fn dir(&self) -> &str {
        self.file.rsplit_once('/').map(|(dir, _)| dir).unwrap_or("")
    }
}

/// A named external link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebLink {
    pub name: String,
    pub url: String,
}

/// A position held at a company. Games are joined in by `GameEntry::job`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobEntry {
    pub company: String,
    pub role: String,
    /// `"2015 March"`.
    pub start: String,
    #[serde(default)]
    pub end: String,
    #[serde(default)]
    pub body: String,

    #[serde(skip)]
    pub date: Option<PubDate>,
    #[serde(skip)]
    pub games: Vec<GameEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameEntry {
    pub title: String,
    #[serde(default)]
    pub developer: String,
    /// Company of the job this game was made at.
    #[serde(default)]
    pub job: String,
    #[serde(default)]
    pub publisher: String,
    /// `"07 June 2019"`, empty while unreleased.
    #[serde(default)]
    pub released: String,
    #[serde(default)]
    pub position: String,
    #[serde(default)]
    pub website: String,
    #[serde(default)]
    pub youtube: String,
    #[serde(rename = "platform", default)]
    pub platforms: Vec<String>,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub body: Vec<String>,

    #[serde(skip)]
    pub date: Option<PubDate>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HobbyProject {
    pub title: String,
    #[serde(default)]
    pub tooltip: String,
    #[serde(default)]
    pub tools: String,
    #[serde(rename = "link", default)]
    pub links: Vec<WebLink>,
    #[serde(rename = "desc", default)]
    pub description: Vec<String>,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl HobbyProject {
    fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t.eq_ignore_ascii_case(tag))
    }

    pub fn is_active(&self) -> bool {
        self.has_tag("active")
    }

    pub fn is_recent(&self) -> bool {
        self.has_tag("recent")
    }
}

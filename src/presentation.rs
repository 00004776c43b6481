//! Per-post presentation: canonical links, summaries and social cards.
//!
//! ```text
//! /blog/2023/03/hello/      post page
//! /blog/cat/GameDev/       category page
//! ```
//!
//! Social card selection:
//!
//! | Post has | Card | Image | Size |
//! |----------|------|-------|------|
//! | banner | `summary_large_image` | banner | probed |
//! | small image only | `summary` | small image | 120×120 |
//! | neither | `summary` | configured default | 120×120 |

use std::path::Path;

use chrono::Datelike;

use crate::config::SiteConfig;
use crate::dates::PubDate;
use crate::imaging::{ImageProbe, ProbeError};
use crate::scanner::MarkupScanner;
use crate::text;
use crate::types::{CardKind, LongPost, SocialCard};

pub const BLOG_SECTION: &str = "blog";

/// Longest derived summary, in bytes.
pub const SUMMARY_LIMIT: usize = 200;

/// Authored descriptions shorter than this are treated as missing.
const MIN_DESC_LEN: usize = 4;

/// Image references no longer than this are treated as missing.
const MIN_IMAGE_REF_LEN: usize = 4;

pub const COMPACT_CARD_SIZE: u32 = 120;

/// `/blog/<YYYY>/<MM>/<key>/`
pub fn post_link(key: &str, published: &PubDate) -> String {
    format!(
        "/{BLOG_SECTION}/{:04}/{:02}/{key}/",
        published.year(),
        published.month()
    )
}

/// `/blog/cat/<slug>/`
pub fn category_link(slug: &str) -> String {
    format!("/{BLOG_SECTION}/cat/{slug}/")
}

/// Join a site-rooted path onto `origin`. Absolute URLs pass through.
pub fn absolutize(origin: &str, path: &str) -> String {
    if path.contains("://") {
        return path.to_string();
    }
    format!(
        "{}/{}",
        origin.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

/// The authored description, or a plain-text excerpt of the body.
pub fn summary(post: &LongPost, scanner: &dyn MarkupScanner) -> String {
    if let Some(desc) = post.short_desc.as_deref()
        && desc.chars().count() >= MIN_DESC_LEN
    {
        return desc.to_string();
    }
    let plain = text::collapse_whitespace(&scanner.strip_tags(&post.body, " "));
    let decoded = text::unescape_entities(&plain);
    text::truncate_at_word(&decoded, SUMMARY_LIMIT).to_string()
}

fn usable_image(reference: Option<&str>) -> Option<&str> {
    reference
        .map(str::trim)
        .filter(|r| r.len() >= MIN_IMAGE_REF_LEN)
}

/// Build the link-preview card of `post`. `summary` must already be set.
///
/// Banners are probed under `static_root`; a banner that cannot be probed
/// fails the build.
pub fn social_card(
    post: &LongPost,
    config: &SiteConfig,
    static_root: &Path,
    probe: &dyn ImageProbe,
) -> Result<SocialCard, ProbeError> {
    let origin = config.origin();
    let (kind, image, width, height) = if let Some(banner) = usable_image(post.banner_image.as_deref()) {
        let dims = probe.probe(&static_root.join(banner.trim_start_matches('/')))?;
        (CardKind::SummaryLargeImage, banner, dims.width, dims.height)
    } else {
        let image = usable_image(post.small_image.as_deref())
            .unwrap_or(config.site.default_card_image.as_str());
        (CardKind::Summary, image, COMPACT_CARD_SIZE, COMPACT_CARD_SIZE)
    };

    Ok(SocialCard {
        kind,
        site: config.site.twitter.clone(),
        title: post.title.clone(),
        description: post.summary.clone(),
        image: absolutize(origin, image),
        image_width: width,
        image_height: height,
    })
}

/// Fill in summary and card of every post in the feed.
pub fn present_feed(
    posts: &mut [LongPost],
    config: &SiteConfig,
    static_root: &Path,
    probe: &dyn ImageProbe,
    scanner: &dyn MarkupScanner,
) -> Result<(), ProbeError> {
    for post in posts.iter_mut() {
        post.summary = summary(post, scanner);
        post.card = Some(social_card(post, config, static_root, probe)?);
    }
    spdlog::debug!("Presented {} posts", posts.len());
    Ok(())
}

//! RSS 2.0 feed and sitemap XML.
//!
//! ```xml
//! <rss version="2.0" xmlns:atom="http://www.w3.org/2005/Atom">
//!   <channel>
//!     <title>…</title>
//!     <image><url>…</url><link>…</link><title>…</title></image>
//!     <link>https://example.com/</link>
//!     <description>…</description>
//!     <language>en-gb</language>
//!     <atom:link href="https://example.com/rss.xml" rel="self" type="application/rss+xml"/>
//!     <item>
//!       <title>…</title>
//!       <link>https://example.com/blog/2023/03/hello/</link>
//!       <guid>https://example.com/blog/2023/03/hello/</guid>
//!       <pubDate>Wed, 01 Mar 2023 10:30:00 +0000</pubDate>
//!       <description>…</description>
//!       <enclosure url="…" type="image/png" length="5120"/>
//!     </item>
//!   </channel>
//! </rss>
//! ```
//!
//! The feed carries the newest [`FEED_ITEM_LIMIT`] posts. Every location in
//! both documents is absolute.

use std::io::Write;
use std::path::Path;

use chrono::SecondsFormat;
use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use thiserror::Error;

use crate::config::SiteConfig;
use crate::dates::{self, PubDate};
use crate::gallery::GALLERY_SECTION;
use crate::presentation::{BLOG_SECTION, absolutize};
use crate::types::{GalleryItem, LongPost};

pub const FEED_ITEM_LIMIT: usize = 30;

pub const RSS_FILE: &str = "rss.xml";
pub const SITEMAP_FILE: &str = "sitemap.xml";

const ATOM_NS: &str = "http://www.w3.org/2005/Atom";
const SITEMAP_NS: &str = "http://www.sitemaps.org/schemas/sitemap/0.9";

#[derive(Error, Debug)]
pub enum FeedError {
    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// MIME type of an enclosure, by extension.
pub fn enclosure_mime(url: &str) -> &'static str {
    let ext = Path::new(url)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "mp4" => "video/mp4",
        "webm" => "video/webm",
        _ => "application/octet-stream",
    }
}

/// Size of a site-rooted asset under `static_root`, `0` if it can't be read.
pub fn enclosure_length(static_root: &Path, url: &str) -> u64 {
    let path = static_root.join(url.trim_start_matches('/'));
    match std::fs::metadata(&path) {
        Ok(meta) => meta.len(),
        Err(e) => {
            spdlog::warn!("Error fetching file size of {}: {}", path.display(), e);
            0
        }
    }
}

fn new_document() -> Result<Writer<Vec<u8>>, FeedError> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
    Ok(writer)
}

fn push_text<W: Write>(writer: &mut Writer<W>, tag: &str, text: &str) -> Result<(), FeedError> {
    writer.write_event(Event::Start(BytesStart::new(tag)))?;
    writer.write_event(Event::Text(BytesText::new(text)))?;
    writer.write_event(Event::End(BytesEnd::new(tag)))?;
    Ok(())
}

fn push_item<W: Write>(
    writer: &mut Writer<W>,
    post: &LongPost,
    origin: &str,
    static_root: &Path,
) -> Result<(), FeedError> {
    writer.write_event(Event::Start(BytesStart::new("item")))?;

    let link = absolutize(origin, &post.link);
    push_text(writer, "title", &post.title)?;
    push_text(writer, "link", &link)?;
    push_text(writer, "guid", &link)?;
    push_text(writer, "pubDate", &dates::format_pub_date(&post.published))?;
    push_text(writer, "description", &post.summary)?;

    if let Some(banner) = post.banner_image.as_deref().filter(|b| !b.trim().is_empty()) {
        let length = enclosure_length(static_root, banner).to_string();
        let mut enclosure = BytesStart::new("enclosure");
        enclosure.push_attribute(("url", absolutize(origin, banner).as_str()));
        enclosure.push_attribute(("type", enclosure_mime(banner)));
        enclosure.push_attribute(("length", length.as_str()));
        writer.write_event(Event::Empty(enclosure))?;
    }

    writer.write_event(Event::End(BytesEnd::new("item")))?;
    Ok(())
}

/// Render `rss.xml` from the ordered feed.
pub fn render_rss(
    config: &SiteConfig,
    feed: &[LongPost],
    static_root: &Path,
) -> Result<Vec<u8>, FeedError> {
    let origin = config.origin();
    let home = format!("{origin}/");
    let mut writer = new_document()?;

    let mut rss = BytesStart::new("rss");
    rss.push_attribute(("version", "2.0"));
    rss.push_attribute(("xmlns:atom", ATOM_NS));
    writer.write_event(Event::Start(rss))?;
    writer.write_event(Event::Start(BytesStart::new("channel")))?;

    push_text(&mut writer, "title", &config.site.title)?;

    writer.write_event(Event::Start(BytesStart::new("image")))?;
    push_text(&mut writer, "url", &absolutize(origin, &config.site.feed_image))?;
    push_text(&mut writer, "link", &home)?;
    push_text(&mut writer, "title", &config.site.title)?;
    writer.write_event(Event::End(BytesEnd::new("image")))?;

    push_text(&mut writer, "link", &home)?;
    push_text(&mut writer, "description", &config.site.description)?;
    push_text(&mut writer, "language", &config.site.language)?;

    let self_link = absolutize(origin, RSS_FILE);
    let mut atom = BytesStart::new("atom:link");
    atom.push_attribute(("href", self_link.as_str()));
    atom.push_attribute(("rel", "self"));
    atom.push_attribute(("type", "application/rss+xml"));
    writer.write_event(Event::Empty(atom))?;

    for post in feed.iter().take(FEED_ITEM_LIMIT) {
        push_item(&mut writer, post, origin, static_root)?;
    }

    writer.write_event(Event::End(BytesEnd::new("channel")))?;
    writer.write_event(Event::End(BytesEnd::new("rss")))?;
    Ok(writer.into_inner())
}

/// One `<url>` entry of the sitemap.
#[derive(Debug, Clone, PartialEq)]
pub struct SitemapEntry {
    pub loc: String,
    pub last_modified: PubDate,
    pub change_freq: &'static str,
    pub priority: &'static str,
}

/// Site root and blog index first, then every post and gallery page.
pub fn sitemap_entries(
    origin: &str,
    feed: &[LongPost],
    gallery: &[GalleryItem],
    build_time: PubDate,
) -> Vec<SitemapEntry> {
    let section = |loc: String| SitemapEntry {
        loc,
        last_modified: build_time,
        change_freq: "daily",
        priority: "1.0",
    };
    let page = |loc: String, last_modified: PubDate| SitemapEntry {
        loc,
        last_modified,
        change_freq: "monthly",
        priority: "0.5",
    };

    let mut entries = vec![
        section(absolutize(origin, "/")),
        section(absolutize(origin, &format!("/{BLOG_SECTION}/"))),
    ];
    entries.extend(
        feed.iter()
            .map(|post| page(absolutize(origin, &post.link), post.published)),
    );
    entries.extend(gallery.iter().map(|item| {
        page(
            absolutize(origin, &format!("/{GALLERY_SECTION}/{}", item.link)),
            item.published,
        )
    }));
    entries
}

/// Render `sitemap.xml`.
pub fn render_sitemap(entries: &[SitemapEntry]) -> Result<Vec<u8>, FeedError> {
    let mut writer = new_document()?;

    let mut urlset = BytesStart::new("urlset");
    urlset.push_attribute(("xmlns", SITEMAP_NS));
    writer.write_event(Event::Start(urlset))?;

    for entry in entries {
        writer.write_event(Event::Start(BytesStart::new("url")))?;
        push_text(&mut writer, "loc", &entry.loc)?;
        push_text(
            &mut writer,
            "lastmod",
            &entry.last_modified.to_rfc3339_opts(SecondsFormat::Secs, true),
        )?;
        push_text(&mut writer, "changefreq", entry.change_freq)?;
        push_text(&mut writer, "priority", entry.priority)?;
        writer.write_event(Event::End(BytesEnd::new("url")))?;
    }

    writer.write_event(Event::End(BytesEnd::new("urlset")))?;
    Ok(writer.into_inner())
}

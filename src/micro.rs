//! Micro posts: short notes folded into the long-form feed.
//!
//! The micro directory holds Markdown or HTML files with optional
//! `<file>.json` sidecars:
//!
//! ```json
//! { "title": "Optional title", "pubDate": "2023-04-02T18:20:00+01:00" }
//! ```
//!
//! A file without a sidecar is dated by its modification time and gets a
//! sidecar written so the date survives later checkouts. Each micro post is
//! then turned into a [`LongPost`] tagged `micro`, with a title taken from
//! its first heading when none was authored and a plain-text summary of at
//! most [`MICRO_SUMMARY_LIMIT`] bytes.

use std::collections::HashSet;
use std::path::Path;

use walkdir::WalkDir;

use crate::dates::{self, PubDate};
use crate::loader::{self, LoadError, SourceKind};
use crate::scanner::MarkupScanner;
use crate::sidecar::SidecarCache;
use crate::text;
use crate::types::{Category, LongPost, MicroMeta, MicroPost};

/// Reserved category carried by every folded micro post.
pub const MICRO_CATEGORY: &str = "micro";

pub const MICRO_SUMMARY_LIMIT: usize = 400;

/// Load every micro post under `dir`, newest first.
///
/// A missing directory means no micro posts. Unsupported files are logged
/// and skipped; an unreadable source is fatal.
pub fn load_micro_posts(dir: &Path, sidecars: &mut SidecarCache) -> Result<Vec<MicroPost>, LoadError> {
    if !dir.is_dir() {
        spdlog::info!("No micro directory at {}", dir.display());
        return Ok(Vec::new());
    }

    let mut posts = Vec::new();
    let walker = WalkDir::new(dir)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !loader::is_hidden_name(&e.file_name().to_string_lossy()));

    for entry in walker {
        let entry = entry.map_err(|source| LoadError::Walk {
            path: dir.to_path_buf(),
            source,
        })?;
        if entry.file_type().is_dir() {
            continue;
        }
        let path = entry.path();
        let body = match loader::classify(path) {
            SourceKind::Markdown => loader::render_markdown(&loader::read_text(path)?),
            SourceKind::Html => loader::read_text(path)?,
            SourceKind::Sidecar => continue,
            _ => {
                spdlog::warn!("Didn't parse micro source {}", path.display());
                continue;
            }
        };

        let meta: MicroMeta = sidecars.fetch_or_derive_pinned(path, || -> Result<_, LoadError> {
            Ok(MicroMeta {
                title: None,
                published: modified_time(path)?,
            })
        })?;

        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        posts.push(MicroPost {
            stem,
            title: meta.title.filter(|t| !t.trim().is_empty()),
            date_str: dates::date_string(&meta.published),
            published: meta.published,
            body,
        });
    }

    posts.sort_by(|a, b| b.published.cmp(&a.published).then_with(|| a.stem.cmp(&b.stem)));
    spdlog::info!("Loaded {} micro posts from {}", posts.len(), dir.display());
    Ok(posts)
}

fn modified_time(path: &Path) -> Result<PubDate, LoadError> {
    std::fs::metadata(path)
        .and_then(|m| m.modified())
        .map(dates::from_system_time)
        .map_err(|source| LoadError::Read {
            path: path.to_path_buf(),
            source,
        })
}

/// Plain-text summary: tags stripped, newlines dropped, entities decoded,
/// glued sentences spaced, then cut at a word boundary within the limit.
pub fn summarize(body: &str, scanner: &dyn MarkupScanner) -> String {
    let plain = scanner.strip_tags(body, "").replace(['\r', '\n'], "");
    let decoded = text::unescape_entities(&plain);
    let spaced = text::space_after_sentences(decoded.trim());
    text::truncate_at_word(&spaced, MICRO_SUMMARY_LIMIT).to_string()
}

/// Lowercase `[a-z0-9]` of the file stem; `micro` when nothing survives.
fn micro_key(stem: &str) -> String {
    let key: String = stem
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
        .collect();
    if key.is_empty() { MICRO_CATEGORY.to_string() } else { key }
}

/// Trim whitespace and periods, then upper-case the first character.
fn tidy_title(raw: &str) -> String {
    let trimmed = raw.trim_matches(|c: char| c.is_whitespace() || c == '.');
    let mut chars = trimmed.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Synthesize the feed entry for one micro post.
///
/// Without an authored title, the first heading becomes the title and is
/// removed from the body; without either, the file stem is used.
pub fn to_long_post(micro: &MicroPost, key: String, scanner: &dyn MarkupScanner) -> LongPost {
    let mut body = micro.body.clone();
    let mut title = micro.title.as_deref().map(tidy_title).unwrap_or_default();

    if title.is_empty()
        && let Some(heading) = scanner.first_heading(&body, 6)
    {
        title = tidy_title(&heading.text);
        body.replace_range(heading.range, "");
    }
    if title.is_empty() {
        title = tidy_title(&micro.stem);
    }

    let summary = summarize(&body, scanner);
    let categories = vec![Category::new(MICRO_CATEGORY)];
    let mut post = LongPost {
        key,
        title,
        published: micro.published,
        small_image: None,
        banner_image: None,
        short_desc: (!summary.is_empty()).then_some(summary),
        raw_categories: categories.clone(),
        categories,
        link: String::new(),
        date_str: String::new(),
        body,
        summary: String::new(),
        is_micro: true,
        card: None,
    };
    post.set_published(micro.published);
    post
}

/// Append every micro post to `feed` with a key unique within the feed.
pub fn fold_into_feed(micro: &[MicroPost], feed: &mut Vec<LongPost>, scanner: &dyn MarkupScanner) {
    let mut taken: HashSet<String> = feed.iter().map(|p| p.key.clone()).collect();
    for item in micro {
        let base = micro_key(&item.stem);
        let mut key = base.clone();
        let mut n = 2;
        while taken.contains(&key) {
            key = format!("{base}-{n}");
            n += 1;
        }
        taken.insert(key.clone());
        feed.push(to_long_post(item, key, scanner));
    }
    spdlog::info!("Folded {} micro posts into the feed", micro.len());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scanner::RegexScanner;
    use crate::sidecar::sidecar_path;
    use crate::test_helpers::{long_post, pub_date};
    use std::fs;
    use tempfile::TempDir;

    fn micro(stem: &str, title: Option<&str>, body: &str) -> MicroPost {
        let published = pub_date("2023-04-02");
        MicroPost {
            stem: stem.to_string(),
            title: title.map(String::from),
            date_str: dates::date_string(&published),
            published,
            body: body.to_string(),
        }
    }

    // =========================================================================
    // summarize
    // =========================================================================

    #[test]
    fn summary_strips_markup_and_spaces_sentences() {
        let body = "<p>First thought.</p>\n<p>Second &amp; last.</p>";
        assert_eq!(summarize(body, &RegexScanner), "First thought. Second & last.");
    }

    #[test]
    fn summary_never_exceeds_limit_or_splits_words() {
        let body = format!("<p>{}</p>", "wordy ".repeat(120));
        let summary = summarize(&body, &RegexScanner);
        assert!(summary.len() <= MICRO_SUMMARY_LIMIT);
        assert!(summary.ends_with("wordy"));
        assert!(summary.split(' ').all(|w| w == "wordy"));
    }

    #[test]
    fn summary_of_multibyte_text_is_valid_and_bounded() {
        let body = "<p>naïve café ".repeat(60);
        let summary = summarize(&body, &RegexScanner);
        assert!(summary.len() <= MICRO_SUMMARY_LIMIT);
        assert!(summary.ends_with("naïve") || summary.ends_with("café"));
    }

    // =========================================================================
    // to_long_post
    // =========================================================================

    #[test]
    fn heading_becomes_title_and_leaves_body() {
        let item = micro("note", None, "<h2>shipping day.</h2>\n<p>It went out.</p>");
        let post = to_long_post(&item, "note".into(), &RegexScanner);
        assert_eq!(post.title, "Shipping day");
        assert!(!post.body.contains("<h2>"));
        assert_eq!(post.short_desc.as_deref(), Some("It went out."));
    }

    #[test]
    fn authored_title_keeps_heading_in_body() {
        let item = micro("note", Some("my title"), "<h2>Heading</h2><p>Text</p>");
        let post = to_long_post(&item, "note".into(), &RegexScanner);
        assert_eq!(post.title, "My title");
        assert!(post.body.contains("<h2>Heading</h2>"));
    }

    #[test]
    fn stem_is_last_resort_title() {
        let item = micro("quick-thought", None, "<p>No heading here</p>");
        let post = to_long_post(&item, "k".into(), &RegexScanner);
        assert_eq!(post.title, "Quick-thought");
    }

    #[test]
    fn folded_post_is_tagged_micro() {
        let item = micro("note", None, "<p>x</p>");
        let post = to_long_post(&item, "note".into(), &RegexScanner);
        assert!(post.is_micro);
        assert_eq!(post.raw_categories, vec![Category::new(MICRO_CATEGORY)]);
        assert_eq!(post.categories, post.raw_categories);
        assert_eq!(post.link, "/blog/2023/04/note/");
        assert_eq!(post.date_str, "2 April 2023");
    }

    // =========================================================================
    // fold_into_feed
    // =========================================================================

    #[test]
    fn fold_appends_with_unique_keys() {
        let mut feed = vec![long_post("idea", "2023-01-01", &["gamedev"])];
        let items = vec![micro("Idea!", None, "<p>a</p>"), micro("idea", None, "<p>b</p>")];
        fold_into_feed(&items, &mut feed, &RegexScanner);

        let keys: Vec<&str> = feed.iter().map(|p| p.key.as_str()).collect();
        assert_eq!(keys, vec!["idea", "idea-2", "idea-3"]);
    }

    #[test]
    fn micro_key_is_lowercase_alphanumeric() {
        assert_eq!(micro_key("Hello World 2"), "helloworld2");
        assert_eq!(micro_key("!!!"), "micro");
    }

    // =========================================================================
    // load_micro_posts
    // =========================================================================

    #[test]
    fn load_reads_sources_and_writes_sidecars() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("micro");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("first.md"), "# Hello\n\nfrom markdown").unwrap();
        fs::write(dir.join("second.html"), "<p>raw html</p>").unwrap();
        fs::write(dir.join("image.png"), "not really").unwrap();
        fs::write(dir.join("_draft.md"), "skip me").unwrap();

        let mut sidecars = SidecarCache::enabled();
        let posts = load_micro_posts(&dir, &mut sidecars).unwrap();

        let mut stems: Vec<&str> = posts.iter().map(|p| p.stem.as_str()).collect();
        stems.sort();
        assert_eq!(stems, vec!["first", "second"]);
        assert!(sidecar_path(&dir.join("first.md")).exists());
        assert!(sidecar_path(&dir.join("second.html")).exists());
        assert!(!sidecar_path(&dir.join("image.png")).exists());

        let first = posts.iter().find(|p| p.stem == "first").unwrap();
        assert!(first.body.contains("<h1>Hello</h1>"));
    }

    #[test]
    fn load_uses_sidecar_date_and_title() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("micro");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("old.md"), "old").unwrap();
        fs::write(dir.join("new.md"), "new").unwrap();
        fs::write(
            sidecar_path(&dir.join("old.md")),
            r#"{"title": "Vintage", "pubDate": "2020-01-05T10:00:00+00:00"}"#,
        )
        .unwrap();
        fs::write(
            sidecar_path(&dir.join("new.md")),
            r#"{"pubDate": "2024-07-01T10:00:00+00:00"}"#,
        )
        .unwrap();

        let posts = load_micro_posts(&dir, &mut SidecarCache::enabled()).unwrap();
        assert_eq!(posts[0].stem, "new");
        assert_eq!(posts[0].title, None);
        assert_eq!(posts[1].stem, "old");
        assert_eq!(posts[1].title.as_deref(), Some("Vintage"));
        assert_eq!(posts[1].date_str, "5 January 2020");
    }

    #[test]
    fn no_cache_keeps_authored_title_and_date() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("micro");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("old.md"), "old").unwrap();
        let sidecar = sidecar_path(&dir.join("old.md"));
        fs::write(
            &sidecar,
            r#"{"title": "Authored", "pubDate": "2020-01-05T10:00:00+00:00"}"#,
        )
        .unwrap();

        let posts = load_micro_posts(&dir, &mut SidecarCache::disabled()).unwrap();
        assert_eq!(posts[0].title.as_deref(), Some("Authored"));
        assert_eq!(posts[0].date_str, "5 January 2020");
        assert!(fs::read_to_string(&sidecar).unwrap().contains("Authored"));
    }

    #[test]
    fn missing_directory_is_empty() {
        let tmp = TempDir::new().unwrap();
        let posts = load_micro_posts(&tmp.path().join("nope"), &mut SidecarCache::enabled()).unwrap();
        assert!(posts.is_empty());
    }
}

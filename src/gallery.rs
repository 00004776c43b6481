//! Gallery walker.
//!
//! Every eligible file under the gallery root becomes one [`GalleryItem`]
//! with its own page at `/gallery/<path>.html`:
//!
//! | Source | Post type | Body |
//! |--------|-----------|------|
//! | `.gif`, `.bmp` | `image` | `<img class="pixel">` |
//! | `.png`, `.jpg`, `.jpeg` | `image` | `<img>` |
//! | `.mp4`, `.avi`, `.mov` | `movie` | `<video>` |
//! | `.txt` | `txt` | escaped `<pre>` block |
//! | `.md` | `post` | rendered Markdown |
//! | `.html` | `post` | the file as is |
//!
//! Media items include their own file. Markdown and HTML items include every
//! relative `src` they reference, and those references are rewritten to
//! site-rooted URLs so the page works wherever it is served from. Included
//! files are copied into the output next to the pages.
//!
//! Items are ordered by directory, then newest first, and each page links to
//! its neighbours in that order.

use std::path::{Component, Path};

use maud::html;
use walkdir::WalkDir;

use crate::dates;
use crate::loader::{self, LoadError, SourceKind};
use crate::ordering;
use crate::scanner::MarkupScanner;
use crate::sidecar::SidecarCache;
use crate::text;
use crate::types::{GalleryItem, PostType};

/// Output section and URL prefix of gallery pages.
pub const GALLERY_SECTION: &str = "gallery";

const TEXT_BRIEF_LIMIT: usize = 128;

/// Site-rooted URL of a gallery-relative path.
pub fn asset_url(rel: &str) -> String {
    format!("/{GALLERY_SECTION}/{rel}")
}

/// `2021/sketch.md` → `2021/sketch.html`
pub fn page_link(rel: &str) -> String {
    let name_start = rel.rfind('/').map(|i| i + 1).unwrap_or(0);
    match rel[name_start..].rfind('.') {
        Some(dot) if dot > 0 => format!("{}.html", &rel[..name_start + dot]),
        _ => format!("{rel}.html"),
    }
}

/// How a `src` value found in a gallery page relates to the gallery tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reference {
    /// Absolute URL, site-rooted path, data URI or fragment: left alone.
    External,
    /// Gallery-relative asset path, normalized.
    Asset(String),
    /// Relative path climbing out of the gallery root.
    Escapes,
}

/// Resolve `src` as written in a page located in gallery directory `dir`.
pub fn resolve_reference(dir: &str, src: &str) -> Reference {
    let src = src.trim();
    if src.is_empty()
        || src.starts_with('/')
        || src.starts_with('#')
        || src.contains("://")
        || src.starts_with("data:")
        || src.starts_with("mailto:")
    {
        return Reference::External;
    }

    let mut parts: Vec<&str> = dir.split('/').filter(|p| !p.is_empty()).collect();
    let src_path = src.split(['?', '#']).next().unwrap_or(src);
    for part in src_path.split('/') {
        match part {
            "" | "." => {}
            ".." => {
                if parts.pop().is_none() {
                    return Reference::Escapes;
                }
            }
            other => parts.push(other),
        }
    }
    if parts.is_empty() {
        return Reference::Escapes;
    }
    Reference::Asset(parts.join("/"))
}

/// Rewrite relative `src` attributes of a page in `dir` and collect the
/// assets they point at.
fn rewrite_and_collect(
    html: &str,
    dir: &str,
    source: &Path,
    scanner: &dyn MarkupScanner,
) -> (String, Vec<String>) {
    let mut includes: Vec<String> = Vec::new();
    let body = scanner.rewrite_sources(html, &mut |src| match resolve_reference(dir, src) {
        Reference::External => None,
        Reference::Asset(rel) => {
            let url = asset_url(&rel);
            if !includes.contains(&rel) {
                includes.push(rel);
            }
            Some(url)
        }
        Reference::Escapes => {
            spdlog::warn!(
                "{}: reference '{}' leaves the gallery, skipped",
                source.display(),
                src
            );
            None
        }
    });
    (body, includes)
}

fn relative_path(root: &Path, path: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// Build the item for one gallery file. `rel` is its gallery-relative path.
pub fn derive_item(
    path: &Path,
    rel: &str,
    kind: SourceKind,
    scanner: &dyn MarkupScanner,
) -> Result<GalleryItem, LoadError> {
    let modified = std::fs::metadata(path)
        .and_then(|m| m.modified())
        .map_err(|source| LoadError::Read {
            path: path.to_path_buf(),
            source,
        })?;
    let published = dates::from_system_time(modified);
    let dir = rel.rsplit_once('/').map(|(d, _)| d).unwrap_or("");
    let url = asset_url(rel);

    let mut brief = String::new();
    let mut includes = Vec::new();
    let (post_type, body) = match kind {
        SourceKind::Image { pixel } => {
            includes.push(rel.to_string());
            let markup = if pixel {
                html! { img.pixel src=(url); }
            } else {
                html! { img src=(url); }
            };
            (PostType::Image, markup.into_string())
        }
        SourceKind::Video => {
            includes.push(rel.to_string());
            let markup = html! {
                video controls { source src=(url) type="video/mp4"; }
            };
            (PostType::Movie, markup.into_string())
        }
        SourceKind::Text => {
            let content = loader::read_text(path)?;
            brief = text::prefix_bytes(&content, TEXT_BRIEF_LIMIT).to_string();
            (PostType::Txt, html! { pre { (content) } }.into_string())
        }
        SourceKind::Markdown => {
            let rendered = loader::render_markdown(&loader::read_text(path)?);
            let (body, found) = rewrite_and_collect(&rendered, dir, path, scanner);
            includes = found;
            if let Some(heading) = scanner.first_heading(&body, 3) {
                brief = heading.element;
            }
            (PostType::Post, body)
        }
        SourceKind::Html => {
            let raw = loader::read_text(path)?;
            let (body, found) = rewrite_and_collect(&raw, dir, path, scanner);
            includes = found;
            (PostType::Post, body)
        }
        SourceKind::Sidecar | SourceKind::Unsupported => {
            return Err(LoadError::Unsupported {
                path: path.to_path_buf(),
            });
        }
    };

    Ok(GalleryItem {
        file: rel.to_string(),
        link: page_link(rel),
        post_type,
        date_str: dates::date_string(&published),
        published,
        body,
        brief,
        includes,
    })
}

/// Walk the gallery root and return its items in gallery order.
pub fn load_gallery(
    root: &Path,
    sidecars: &mut SidecarCache,
    scanner: &dyn MarkupScanner,
) -> Result<Vec<GalleryItem>, LoadError> {
    if !root.is_dir() {
        spdlog::info!("No gallery directory at {}", root.display());
        return Ok(Vec::new());
    }

    let mut items = Vec::new();
    let walker = WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !loader::is_hidden_name(&e.file_name().to_string_lossy()));

    for entry in walker {
        let entry = entry.map_err(|source| LoadError::Walk {
            path: root.to_path_buf(),
            source,
        })?;
        if entry.file_type().is_dir() {
            continue;
        }
        let path = entry.path();
        let kind = loader::classify(path);
        match kind {
            SourceKind::Sidecar => continue,
            SourceKind::Unsupported => {
                spdlog::warn!("Didn't parse gallery file {}", path.display());
                continue;
            }
            _ => {}
        }

        let rel = relative_path(root, path);
        let mut item = sidecars.fetch_or_derive(path, || derive_item(path, &rel, kind, scanner))?;
        item.link = page_link(&rel);
        item.file = rel;
        items.push(item);
    }

    ordering::sort_gallery(&mut items);
    spdlog::info!("Loaded {} gallery items from {}", items.len(), root.display());
    Ok(items)
}

/// Previous and next page URLs of a gallery item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GalleryNav {
    pub prev: String,
    pub next: String,
}

/// Neighbour links of `items[index]` in gallery order; the gallery index
/// page stands in at both ends.
pub fn neighbors(items: &[GalleryItem], index: usize) -> GalleryNav {
    let section_root = format!("/{GALLERY_SECTION}/");
    let link = |i: usize| format!("{section_root}{}", items[i].link);
    GalleryNav {
        prev: index
            .checked_sub(1)
            .map(link)
            .unwrap_or_else(|| section_root.clone()),
        next: (index + 1 < items.len())
            .then(|| link(index + 1))
            .unwrap_or_else(|| section_root.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scanner::RegexScanner;
    use crate::sidecar::sidecar_path;
    use crate::test_helpers::gallery_item;
    use std::fs;
    use tempfile::TempDir;

    // =========================================================================
    // Paths and references
    // =========================================================================

    #[test]
    fn page_link_replaces_extension() {
        assert_eq!(page_link("2021/sketch.md"), "2021/sketch.html");
        assert_eq!(page_link("cat.png"), "cat.html");
        assert_eq!(page_link("v1.2/README"), "v1.2/README.html");
    }

    #[test]
    fn resolve_relative_reference() {
        assert_eq!(
            resolve_reference("2021/comics", "panel1.png"),
            Reference::Asset("2021/comics/panel1.png".into())
        );
        assert_eq!(
            resolve_reference("2021/comics", "../shared/./logo.png"),
            Reference::Asset("2021/shared/logo.png".into())
        );
        assert_eq!(resolve_reference("", "a.png?v=2"), Reference::Asset("a.png".into()));
    }

    #[test]
    fn resolve_leaves_external_references() {
        for src in ["https://x.org/a.png", "/images/a.png", "data:image/png;base64,AA", "#top", ""] {
            assert_eq!(resolve_reference("2021", src), Reference::External, "{src}");
        }
    }

    #[test]
    fn resolve_rejects_escaping_reference() {
        assert_eq!(resolve_reference("2021", "../../secret.png"), Reference::Escapes);
        assert_eq!(resolve_reference("", "../x.png"), Reference::Escapes);
    }

    // =========================================================================
    // derive_item
    // =========================================================================

    fn gallery_tree() -> TempDir {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path();
        fs::create_dir_all(root.join("2021/comics")).unwrap();
        fs::write(root.join("2021/comics/panel1.png"), "png").unwrap();
        fs::write(
            root.join("2021/comics/strip.md"),
            "## Strip one\n\n![p](panel1.png)\n\n![ext](https://x.org/e.png)\n\n![bad](../../../etc/passwd)",
        )
        .unwrap();
        fs::write(root.join("2021/notes.txt"), "a <b>plain</b> note").unwrap();
        fs::write(root.join("sprite.gif"), "gif").unwrap();
        fs::write(root.join("clip.mp4"), "mp4").unwrap();
        fs::write(root.join("_wip.png"), "hidden").unwrap();
        fs::write(root.join("archive.zip"), "zip").unwrap();
        tmp
    }

    #[test]
    fn markdown_item_rewrites_sources_and_collects_includes() {
        let tmp = gallery_tree();
        let path = tmp.path().join("2021/comics/strip.md");
        let item = derive_item(&path, "2021/comics/strip.md", SourceKind::Markdown, &RegexScanner)
            .unwrap();

        assert_eq!(item.post_type, PostType::Post);
        assert_eq!(item.link, "2021/comics/strip.html");
        assert!(item.body.contains(r#"src="/gallery/2021/comics/panel1.png""#));
        assert!(item.body.contains(r#"src="https://x.org/e.png""#));
        assert!(item.body.contains(r#"src="../../../etc/passwd""#));
        assert_eq!(item.includes, vec!["2021/comics/panel1.png"]);
        assert_eq!(item.brief, "<h2>Strip one</h2>");
    }

    #[test]
    fn media_items_include_themselves() {
        let tmp = gallery_tree();
        let gif = derive_item(
            &tmp.path().join("sprite.gif"),
            "sprite.gif",
            SourceKind::Image { pixel: true },
            &RegexScanner,
        )
        .unwrap();
        assert_eq!(gif.post_type, PostType::Image);
        assert_eq!(gif.body, r#"<img class="pixel" src="/gallery/sprite.gif">"#);
        assert_eq!(gif.includes, vec!["sprite.gif"]);

        let clip = derive_item(&tmp.path().join("clip.mp4"), "clip.mp4", SourceKind::Video, &RegexScanner)
            .unwrap();
        assert_eq!(clip.post_type, PostType::Movie);
        assert!(clip.body.starts_with("<video controls>"));
        assert!(clip.body.contains(r#"<source src="/gallery/clip.mp4" type="video/mp4">"#));
    }

    #[test]
    fn text_item_is_escaped_with_brief() {
        let tmp = gallery_tree();
        let item = derive_item(
            &tmp.path().join("2021/notes.txt"),
            "2021/notes.txt",
            SourceKind::Text,
            &RegexScanner,
        )
        .unwrap();
        assert_eq!(item.post_type, PostType::Txt);
        assert_eq!(item.body, "<pre>a &lt;b&gt;plain&lt;/b&gt; note</pre>");
        assert_eq!(item.brief, "a <b>plain</b> note");
        assert!(item.includes.is_empty());
    }

    // =========================================================================
    // load_gallery
    // =========================================================================

    #[test]
    fn load_skips_hidden_unsupported_and_sidecars() {
        let tmp = gallery_tree();
        let mut sidecars = SidecarCache::enabled();
        let items = load_gallery(tmp.path(), &mut sidecars, &RegexScanner).unwrap();

        let mut files: Vec<&str> = items.iter().map(|i| i.file.as_str()).collect();
        files.sort();
        assert_eq!(
            files,
            vec![
                "2021/comics/panel1.png",
                "2021/comics/strip.md",
                "2021/notes.txt",
                "clip.mp4",
                "sprite.gif"
            ]
        );
        assert!(sidecar_path(&tmp.path().join("sprite.gif")).exists());

        // A second walk sees the sidecars but does not turn them into items.
        let mut again = SidecarCache::enabled();
        let reloaded = load_gallery(tmp.path(), &mut again, &RegexScanner).unwrap();
        assert_eq!(reloaded.len(), 5);
        assert_eq!(again.stats().hits, 5);
    }

    #[test]
    fn sidecar_overrides_derived_values() {
        let tmp = gallery_tree();
        fs::write(
            sidecar_path(&tmp.path().join("sprite.gif")),
            r#"{
  "file": "old/place/sprite.gif",
  "link": "old/place/sprite.html",
  "posttype": "image",
  "pubDate": "2019-08-01T12:00:00+00:00",
  "datestr": "1 August 2019",
  "body": "<img src=\"/custom.gif\">",
  "brief": "hand edited",
  "include": ["sprite.gif"]
}"#,
        )
        .unwrap();

        let items = load_gallery(tmp.path(), &mut SidecarCache::enabled(), &RegexScanner).unwrap();
        let sprite = items.iter().find(|i| i.file == "sprite.gif").unwrap();
        assert_eq!(sprite.brief, "hand edited");
        assert_eq!(sprite.date_str, "1 August 2019");
        assert_eq!(sprite.link, "sprite.html");
    }

    #[test]
    fn items_come_back_in_gallery_order() {
        let tmp = gallery_tree();
        let items = load_gallery(tmp.path(), &mut SidecarCache::enabled(), &RegexScanner).unwrap();
        let dirs: Vec<&str> = items.iter().map(|i| i.dir()).collect();
        let mut sorted = dirs.clone();
        sorted.sort();
        assert_eq!(dirs, sorted);
    }

    // =========================================================================
    // neighbors
    // =========================================================================

    #[test]
    fn neighbors_fall_back_to_section_root() {
        let items = vec![
            gallery_item("a/one.png", "2021-01-03"),
            gallery_item("a/two.png", "2021-01-02"),
            gallery_item("b/three.png", "2021-01-01"),
        ];

        let first = neighbors(&items, 0);
        assert_eq!(first.prev, "/gallery/");
        assert_eq!(first.next, "/gallery/a/two.html");

        let middle = neighbors(&items, 1);
        assert_eq!(middle.prev, "/gallery/a/one.html");
        assert_eq!(middle.next, "/gallery/b/three.html");

        let last = neighbors(&items, 2);
        assert_eq!(last.prev, "/gallery/a/two.html");
        assert_eq!(last.next, "/gallery/");
    }

    #[test]
    fn single_item_links_home_both_ways() {
        let items = vec![gallery_item("solo.png", "2021-01-01")];
        let nav = neighbors(&items, 0);
        assert_eq!(nav.prev, "/gallery/");
        assert_eq!(nav.next, "/gallery/");
    }
}

//! Content loading: metadata arrays, post bodies, and file classification.
//!
//! Long posts, jobs, games and hobbies are authored as JSON arrays in the
//! data directory. Post bodies live beside them as pre-rendered HTML:
//!
//! ```text
//! data/
//! ├── posts.json
//! ├── jobs.json
//! ├── games.json
//! ├── hobbies.json
//! └── post/
//!     └── 2023/
//!         └── hello-world.html
//! ```
//!
//! Micro posts and gallery items are discovered by walking a directory
//! instead; [`classify`] decides what each file found there is.
//!
//! Every failure here is fatal for the run and carries the offending path.

use crate::types::LongPost;
use chrono::Datelike;
use pulldown_cmark::{Event, Options, Parser, html as md_html};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Shortest body accepted by [`save_post_body`].
pub const MIN_BODY_LEN: usize = 8;

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("Failed to walk {path}: {source}")]
    Walk {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },
    #[error("Not a content file: {path}")]
    Unsupported { path: PathBuf },
    #[error("Body for '{key}' is too short to save ({len} bytes)")]
    BodyTooShort { key: String, len: usize },
}

/// What a file found during a directory walk is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    /// Raster image; `pixel` marks formats rendered without smoothing.
    Image { pixel: bool },
    Video,
    Text,
    Markdown,
    Html,
    /// A `.json` sidecar, never a content source itself.
    Sidecar,
    Unsupported,
}

/// Classify a file by extension, case-insensitively.
pub fn classify(path: &Path) -> SourceKind {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "gif" | "bmp" => SourceKind::Image { pixel: true },
        "png" | "jpg" | "jpeg" => SourceKind::Image { pixel: false },
        "mp4" | "avi" | "mov" => SourceKind::Video,
        "txt" => SourceKind::Text,
        "md" => SourceKind::Markdown,
        "html" | "htm" => SourceKind::Html,
        "json" => SourceKind::Sidecar,
        _ => SourceKind::Unsupported,
    }
}

/// Files starting with `.` or `_` are drafts, editor files or partials.
pub fn is_hidden_name(name: &str) -> bool {
    name.starts_with('.') || name.starts_with('_')
}

/// Render Markdown to HTML. Single newlines become `<br />`.
pub fn render_markdown(source: &str) -> String {
    let options = Options::ENABLE_TABLES
        | Options::ENABLE_STRIKETHROUGH
        | Options::ENABLE_FOOTNOTES
        | Options::ENABLE_HEADING_ATTRIBUTES;
    let parser = Parser::new_ext(source, options).map(|event| match event {
        Event::SoftBreak => Event::HardBreak,
        other => other,
    });
    let mut html = String::new();
    md_html::push_html(&mut html, parser);
    html
}

pub fn read_text(path: &Path) -> Result<String, LoadError> {
    fs::read_to_string(path).map_err(|source| LoadError::Read {
        path: path.to_path_buf(),
        source,
    })
}

fn write_text(path: &Path, contents: &str) -> Result<(), LoadError> {
    let write_err = |source| LoadError::Write {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(write_err)?;
    }
    fs::write(path, contents).map_err(write_err)
}

/// Serialize as pretty JSON with two-space indentation.
pub fn to_pretty_json<T: Serialize + ?Sized>(value: &T) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(value)
}

/// Load an ordered array of items from a JSON metadata file.
pub fn load_json_list<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, LoadError> {
    let content = read_text(path)?;
    serde_json::from_str(&content).map_err(|source| LoadError::Json {
        path: path.to_path_buf(),
        source,
    })
}

/// Like [`load_json_list`], but a missing file means an empty list.
pub fn load_optional_json_list<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, LoadError> {
    if !path.exists() {
        spdlog::info!("{} not found, no items loaded", path.display());
        return Ok(Vec::new());
    }
    load_json_list(path)
}

/// Write an ordered array of items back to its metadata file.
pub fn save_json_list<T: Serialize>(path: &Path, items: &[T]) -> Result<(), LoadError> {
    let json = to_pretty_json(items).map_err(|source| LoadError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    write_text(path, &json)
}

/// `<data>/post/<year>/<key>.html`
pub fn post_body_path(data_dir: &Path, post: &LongPost) -> PathBuf {
    data_dir
        .join("post")
        .join(format!("{:04}", post.published.year()))
        .join(format!("{}.html", post.key))
}

pub fn load_post_body(data_dir: &Path, post: &LongPost) -> Result<String, LoadError> {
    read_text(&post_body_path(data_dir, post))
}

/// Store `post.body`, refusing bodies that are clearly a mistake.
pub fn save_post_body(data_dir: &Path, post: &LongPost) -> Result<PathBuf, LoadError> {
    if post.body.len() < MIN_BODY_LEN {
        return Err(LoadError::BodyTooShort {
            key: post.key.clone(),
            len: post.body.len(),
        });
    }
    let path = post_body_path(data_dir, post);
    write_text(&path, &post.body)?;
    Ok(path)
}

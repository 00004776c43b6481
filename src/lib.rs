//! # Folio
//!
//! Content pipeline for a personal site: a blog with categories and micro
//! posts, a gallery of images and sketches, a games career page and a list
//! of hobby projects, published as static HTML with an RSS feed and a
//! sitemap.
//!
//! # Architecture: Assemble, Then Emit
//!
//! ```text
//! site/
//! ├── config.toml
//! ├── data/     posts.json, post/<year>/<key>.html, jobs.json, games.json, hobbies.json
//! ├── micro/    *.md, *.html
//! └── gallery/  images, movies, sketches, notes
//!
//! 1. Assemble   site/      →  SiteModel      (ordered stages, see pipeline)
//! 2. Emit       SiteModel  →  public_html/   (pages on a worker pool, then rss.xml + sitemap.xml)
//! ```
//!
//! The model is rebuilt from the sources on every run. Derived values that
//! are expensive to recompute for files that rarely change (micro post dates,
//! gallery item bodies) are kept in JSON sidecars next to their source; see
//! [`sidecar`].
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`config`] | `config.toml` loading: stock defaults, merge, validation |
//! | [`logger`] | Console and rotating-file logging through `spdlog` |
//! | [`types`] | Content records shared by every stage |
//! | [`dates`] | Publish dates: RFC 2822 in metadata, display and career formats |
//! | [`text`] | Entity unescaping, whitespace and word-boundary truncation |
//! | [`scanner`] | Markup scanning behind a trait: headings, `src` references, tags |
//! | [`loader`] | File classification, JSON lists, post bodies, Markdown |
//! | [`sidecar`] | Per-file JSON cache of derived values, with hit/miss stats |
//! | [`micro`] | Micro posts: load, summarize, fold into the blog feed |
//! | [`category`] | Category membership filter and slugged category pages |
//! | [`ordering`] | Sort orders for the feed, gallery, jobs and games |
//! | [`gallery`] | Gallery walker, reference rewriting, neighbour links |
//! | [`career`] | Jobs joined with games, platform set |
//! | [`projects`] | Hobby projects grouped by tag |
//! | [`imaging`] | Image dimension probing for social cards |
//! | [`presentation`] | Links, summaries and social cards |
//! | [`model`] | The assembled [`model::SiteModel`] |
//! | [`pipeline`] | Stage declarations and model assembly |
//! | [`render`] | The [`render::Renderer`] trait and a plain Maud implementation |
//! | [`feed`] | RSS 2.0 and sitemap documents |
//! | [`emit`] | Output planning and parallel emission |
//! | [`output`] | CLI inventory and build summaries |
//!
//! # Design Decisions
//!
//! ## Stages Declare Their Data
//!
//! Every assembly stage names the model fields it reads and produces. The
//! order in [`pipeline::STAGES`] is checked against those declarations in
//! tests, so reordering stages cannot silently read a field before it exists.
//!
//! ## Rendering Is Replaceable
//!
//! Emission only depends on [`render::Renderer`]. The bundled
//! [`render::BasicRenderer`] writes unstyled semantic HTML with Maud;
//! interpolation is escaped and only stored bodies are inserted raw.
//!
//! ## Warnings Versus Errors
//!
//! Content that is merely imperfect (an unparseable job start date, a missing
//! enclosure file, a category nobody else uses) is logged and the build goes
//! on. Content that would produce a broken site (unreadable metadata, a
//! missing post body, an unprobeable banner, two outputs at one path) stops
//! the build with an error naming the file.

pub mod career;
pub mod category;
pub mod config;
pub mod dates;
pub mod emit;
pub mod feed;
pub mod gallery;
pub mod imaging;
pub mod loader;
pub mod logger;
pub mod micro;
pub mod model;
pub mod ordering;
pub mod output;
pub mod pipeline;
pub mod presentation;
pub mod projects;
pub mod render;
pub mod scanner;
pub mod sidecar;
pub mod text;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;

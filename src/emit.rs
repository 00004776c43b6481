//! Site emission: plan every output file, then write them on the pool.
//!
//! ```text
//! public_html/
//! ├── index.html
//! ├── blog/
//! │   ├── index.html
//! │   ├── 2023/03/hello/index.html
//! │   └── cat/GameDev/index.html
//! ├── gallery/
//! │   ├── index.html
//! │   ├── 2021/sketch.html
//! │   └── 2021/sketch.png          ← copied include
//! ├── micro/index.html
//! ├── job/index.html
//! ├── projects/index.html
//! ├── rss.xml
//! └── sitemap.xml
//! ```
//!
//! The plan is built and checked before any worker starts: two outputs
//! mapping to the same path is an error. Jobs then run on the bounded pool
//! over a shared borrow of the model, and the pool's return is the barrier
//! after which the feed and sitemap are written. Failures are reported in
//! plan order.

use std::collections::{BTreeSet, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use rayon::ThreadPool;
use rayon::prelude::*;
use thiserror::Error;

use crate::config::SiteConfig;
use crate::dates::PubDate;
use crate::feed::{self, FeedError};
use crate::gallery::GALLERY_SECTION;
use crate::model::SiteModel;
use crate::presentation::BLOG_SECTION;
use crate::render::{Page, RenderError, Renderer};

const INDEX_FILE: &str = "index.html";

#[derive(Error, Debug)]
pub enum EmitError {
    #[error("Failed to create directory {path}: {source}")]
    CreateDir {
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
    #[error("Failed to copy {from} to {to}: {source}")]
    Copy {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("More than one output maps to {0}")]
    DuplicateOutput(PathBuf),
    #[error(transparent)]
    Render(#[from] RenderError),
    #[error("Feed generation failed: {0}")]
    Feed(#[from] FeedError),
}

/// One unit of emission work. Output paths are relative to the output root.
#[derive(Debug, Clone)]
pub enum Job<'m> {
    Page { output: PathBuf, page: Page<'m> },
    Copy { source: PathBuf, output: PathBuf },
}

impl Job<'_> {
    pub fn output(&self) -> &Path {
        match self {
            Job::Page { output, .. } | Job::Copy { output, .. } => output,
        }
    }
}

/// `/blog/2023/03/hello/` → `blog/2023/03/hello/index.html`
fn index_path(link: &str) -> PathBuf {
    Path::new(link.trim_matches('/')).join(INDEX_FILE)
}

/// Every page and asset copy of the site, in a fixed order.
pub fn plan<'m>(model: &'m SiteModel, gallery_dir: &Path) -> Result<Vec<Job<'m>>, EmitError> {
    let page = |link: String, page: Page<'m>| Job::Page {
        output: index_path(&link),
        page,
    };

    let mut jobs = vec![
        page("/".to_string(), Page::Home),
        page(format!("/{BLOG_SECTION}/"), Page::Blog),
    ];
    jobs.extend(model.feed.iter().map(|post| page(post.link.clone(), Page::Post(post))));
    jobs.extend(model.categories.pages().into_iter().map(|cat| {
        page(
            crate::presentation::category_link(&cat.slug),
            Page::Category {
                slug: cat.slug,
                title: cat.category.as_str().to_string(),
            },
        )
    }));

    jobs.push(page(format!("/{GALLERY_SECTION}/"), Page::GalleryIndex));
    let gallery_root = Path::new(GALLERY_SECTION);
    jobs.extend(model.gallery.iter().enumerate().map(|(index, item)| Job::Page {
        output: gallery_root.join(&item.link),
        page: Page::GalleryItem(index),
    }));
    let includes: BTreeSet<&str> = model
        .gallery
        .iter()
        .flat_map(|item| item.includes.iter().map(String::as_str))
        .collect();
    jobs.extend(includes.into_iter().map(|rel| Job::Copy {
        source: gallery_dir.join(rel),
        output: gallery_root.join(rel),
    }));

    jobs.push(page("/micro/".to_string(), Page::Micro));
    jobs.push(page("/job/".to_string(), Page::Jobs));
    jobs.push(page("/projects/".to_string(), Page::Projects));

    let mut seen = HashSet::new();
    for job in &jobs {
        if !seen.insert(job.output()) {
            return Err(EmitError::DuplicateOutput(job.output().to_path_buf()));
        }
    }
    Ok(jobs)
}

fn create_parent(path: &Path) -> Result<(), EmitError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|source| EmitError::CreateDir {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    Ok(())
}

fn write_file(path: &Path, contents: &[u8]) -> Result<(), EmitError> {
    create_parent(path)?;
    fs::write(path, contents).map_err(|source| EmitError::Write {
        path: path.to_path_buf(),
        source,
    })
}

fn execute(
    job: &Job<'_>,
    model: &SiteModel,
    output_root: &Path,
    renderer: &dyn Renderer,
) -> Result<(), EmitError> {
    let target = output_root.join(job.output());
    match job {
        Job::Page { page, .. } => {
            let html = renderer.render(page, model)?;
            write_file(&target, html.as_bytes())
        }
        Job::Copy { source, .. } => {
            create_parent(&target)?;
            fs::copy(source, &target)
                .map(|_| ())
                .map_err(|e| EmitError::Copy {
                    from: source.clone(),
                    to: target.clone(),
                    source: e,
                })
        }
    }
}

/// What a finished emission wrote.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EmitSummary {
    pub pages: usize,
    pub copies: usize,
    pub feed_items: usize,
    pub sitemap_urls: usize,
}

/// Run every planned job on `pool`. Returns after all of them finished;
/// the first failure in plan order wins.
pub fn run_jobs(
    jobs: &[Job<'_>],
    model: &SiteModel,
    output_root: &Path,
    renderer: &dyn Renderer,
    pool: &ThreadPool,
) -> Result<(), EmitError> {
    let results: Vec<Result<(), EmitError>> = pool.install(|| {
        jobs.par_iter()
            .map(|job| execute(job, model, output_root, renderer))
            .collect()
    });
    results.into_iter().collect()
}

/// Write `rss.xml` and `sitemap.xml`. Returns item and URL counts.
pub fn write_feeds(
    model: &SiteModel,
    config: &SiteConfig,
    output_root: &Path,
    static_root: &Path,
    build_time: PubDate,
) -> Result<(usize, usize), EmitError> {
    let rss = feed::render_rss(config, &model.feed, static_root)?;
    write_file(&output_root.join(feed::RSS_FILE), &rss)?;

    let entries = feed::sitemap_entries(config.origin(), &model.feed, &model.gallery, build_time);
    let sitemap = feed::render_sitemap(&entries)?;
    write_file(&output_root.join(feed::SITEMAP_FILE), &sitemap)?;

    Ok((model.feed.len().min(feed::FEED_ITEM_LIMIT), entries.len()))
}

/// Everything emission needs from the build besides the model.
pub struct EmitOptions<'a> {
    pub config: &'a SiteConfig,
    pub output_root: &'a Path,
    pub gallery_dir: &'a Path,
    pub static_root: &'a Path,
    pub build_time: PubDate,
}

/// Plan, run the pool, then write feed and sitemap.
pub fn emit_site(
    model: &SiteModel,
    options: &EmitOptions<'_>,
    renderer: &dyn Renderer,
    pool: &ThreadPool,
) -> Result<EmitSummary, EmitError> {
    let jobs = plan(model, options.gallery_dir)?;
    fs::create_dir_all(options.output_root).map_err(|source| EmitError::CreateDir {
        path: options.output_root.to_path_buf(),
        source,
    })?;

    run_jobs(&jobs, model, options.output_root, renderer, pool)?;

    let (feed_items, sitemap_urls) = write_feeds(
        model,
        options.config,
        options.output_root,
        options.static_root,
        options.build_time,
    )?;

    let copies = jobs.iter().filter(|j| matches!(j, Job::Copy { .. })).count();
    let summary = EmitSummary {
        pages: jobs.len() - copies,
        copies,
        feed_items,
        sitemap_urls,
    };
    spdlog::info!(
        "Wrote {} pages and {} assets to {}",
        summary.pages,
        summary.copies,
        options.output_root.display()
    );
    Ok(summary)
}

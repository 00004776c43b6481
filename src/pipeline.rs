//! Model assembly as an ordered list of stages.
//!
//! ```text
//! LoadPosts → LoadBodies → LoadMicro → FoldMicro → OrderFeed
//!     → IndexCategories → LoadGallery → LoadCareer → LoadProjects → Present
//! ```
//!
//! Each [`Stage`] declares the [`Field`]s of the model it reads and the ones
//! it produces. Every field has exactly one producer, and no stage reads a
//! field before it is produced; the tests below check both over [`STAGES`].
//!
//! Post bodies load on the worker pool. Everything else runs in sequence on
//! the calling thread, and the first error aborts the build.

use std::path::{Path, PathBuf};

use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuildError, ThreadPoolBuilder};
use thiserror::Error;

use crate::career;
use crate::category::CategoryIndex;
use crate::config::{self, SiteConfig};
use crate::dates::PubDate;
use crate::gallery;
use crate::imaging::{ImageProbe, ProbeError};
use crate::loader::{self, LoadError};
use crate::micro;
use crate::model::SiteModel;
use crate::ordering;
use crate::presentation;
use crate::projects;
use crate::scanner::MarkupScanner;
use crate::sidecar::SidecarCache;
use crate::types::LongPost;

pub const POSTS_FILE: &str = "posts.json";

#[derive(Error, Debug)]
pub enum BuildError {
    #[error(transparent)]
    Load(#[from] LoadError),
    #[error("Social card image: {0}")]
    Probe(#[from] ProbeError),
    #[error("Failed to start worker pool: {0}")]
    Pool(#[from] ThreadPoolBuildError),
}

/// Everything a build needs besides the model itself.
pub struct BuildContext<'a> {
    pub config: SiteConfig,
    pub source_root: PathBuf,
    pub sidecars: SidecarCache,
    pub probe: &'a dyn ImageProbe,
    pub scanner: &'a dyn MarkupScanner,
    /// The single "now" of the run: sitemap dates, unreleased games.
    pub build_time: PubDate,
    pool: ThreadPool,
}

impl<'a> BuildContext<'a> {
    pub fn new(
        config: SiteConfig,
        source_root: &Path,
        probe: &'a dyn ImageProbe,
        scanner: &'a dyn MarkupScanner,
    ) -> Result<Self, BuildError> {
        let threads = config::effective_threads(&config.processing);
        let pool = ThreadPoolBuilder::new().num_threads(threads).build()?;
        Ok(Self {
            config,
            source_root: source_root.to_path_buf(),
            sidecars: SidecarCache::enabled(),
            probe,
            scanner,
            build_time: chrono::Local::now().fixed_offset(),
            pool,
        })
    }

    pub fn with_sidecars(mut self, sidecars: SidecarCache) -> Self {
        self.sidecars = sidecars;
        self
    }

    pub fn with_build_time(mut self, build_time: PubDate) -> Self {
        self.build_time = build_time;
        self
    }

    /// Bounded worker pool shared by body loading and emission.
    pub fn pool(&self) -> &ThreadPool {
        &self.pool
    }

    pub fn data_dir(&self) -> PathBuf {
        self.source_root.join(&self.config.paths.data_dir)
    }

    pub fn micro_dir(&self) -> PathBuf {
        self.source_root.join(&self.config.paths.micro_dir)
    }

    pub fn gallery_dir(&self) -> PathBuf {
        self.source_root.join(&self.config.paths.gallery_dir)
    }

    /// Root that site-rooted asset URLs (`/images/...`) resolve against.
    pub fn static_root(&self) -> PathBuf {
        self.source_root.join(&self.config.paths.static_dir)
    }
}

/// A piece of the model a stage can read or produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Field {
    /// Long posts from `posts.json`.
    Posts,
    /// Bodies of those posts.
    Bodies,
    MicroPosts,
    /// Long posts plus folded micro posts.
    Feed,
    FeedOrder,
    Categories,
    Gallery,
    Jobs,
    Games,
    Platforms,
    Hobbies,
    /// Summaries and social cards.
    Presentation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    LoadPosts,
    LoadBodies,
    LoadMicro,
    FoldMicro,
    OrderFeed,
    IndexCategories,
    LoadGallery,
    LoadCareer,
    LoadProjects,
    Present,
}

/// Stages in execution order.
pub const STAGES: &[Stage] = &[
    Stage::LoadPosts,
    Stage::LoadBodies,
    Stage::LoadMicro,
    Stage::FoldMicro,
    Stage::OrderFeed,
    Stage::IndexCategories,
    Stage::LoadGallery,
    Stage::LoadCareer,
    Stage::LoadProjects,
    Stage::Present,
];

impl Stage {
    pub fn name(self) -> &'static str {
        match self {
            Stage::LoadPosts => "load posts",
            Stage::LoadBodies => "load bodies",
            Stage::LoadMicro => "load micro",
            Stage::FoldMicro => "fold micro",
            Stage::OrderFeed => "order feed",
            Stage::IndexCategories => "index categories",
            Stage::LoadGallery => "load gallery",
            Stage::LoadCareer => "load career",
            Stage::LoadProjects => "load projects",
            Stage::Present => "present",
        }
    }

    pub fn reads(self) -> &'static [Field] {
        use Field::*;
        match self {
            Stage::LoadPosts | Stage::LoadMicro | Stage::LoadGallery => &[],
            Stage::LoadCareer | Stage::LoadProjects => &[],
            Stage::LoadBodies => &[Posts],
            Stage::FoldMicro => &[Posts, Bodies, MicroPosts],
            Stage::OrderFeed => &[Feed],
            Stage::IndexCategories => &[Feed, FeedOrder],
            Stage::Present => &[Feed, FeedOrder, Categories],
        }
    }

    pub fn produces(self) -> &'static [Field] {
        use Field::*;
        match self {
            Stage::LoadPosts => &[Posts],
            Stage::LoadBodies => &[Bodies],
            Stage::LoadMicro => &[MicroPosts],
            Stage::FoldMicro => &[Feed],
            Stage::OrderFeed => &[FeedOrder],
            Stage::IndexCategories => &[Categories],
            Stage::LoadGallery => &[Gallery],
            Stage::LoadCareer => &[Jobs, Games, Platforms],
            Stage::LoadProjects => &[Hobbies],
            Stage::Present => &[Presentation],
        }
    }

    pub fn run(self, model: &mut SiteModel, ctx: &mut BuildContext<'_>) -> Result<(), BuildError> {
        match self {
            Stage::LoadPosts => {
                let path = ctx.data_dir().join(POSTS_FILE);
                model.feed = loader::load_json_list(&path)?;
                for post in model.feed.iter_mut() {
                    post.set_published(post.published);
                }
                spdlog::info!("Loaded {} posts from {}", model.feed.len(), path.display());
            }
            Stage::LoadBodies => {
                let data_dir = ctx.data_dir();
                load_bodies(&mut model.feed, &data_dir, ctx.pool())?;
            }
            Stage::LoadMicro => {
                let dir = ctx.micro_dir();
                model.micro = micro::load_micro_posts(&dir, &mut ctx.sidecars)?;
            }
            Stage::FoldMicro => {
                micro::fold_into_feed(&model.micro, &mut model.feed, ctx.scanner);
            }
            Stage::OrderFeed => {
                ordering::sort_feed(&mut model.feed);
            }
            Stage::IndexCategories => {
                model.categories = CategoryIndex::index(&mut model.feed);
            }
            Stage::LoadGallery => {
                let dir = ctx.gallery_dir();
                model.gallery = gallery::load_gallery(&dir, &mut ctx.sidecars, ctx.scanner)?;
            }
            Stage::LoadCareer => {
                let career = career::load_career(&ctx.data_dir(), ctx.build_time)?;
                model.jobs = career.jobs;
                model.games = career.games;
                model.platforms = career.platforms;
            }
            Stage::LoadProjects => {
                model.hobbies = projects::load_projects(&ctx.data_dir())?;
            }
            Stage::Present => {
                let static_root = ctx.static_root();
                presentation::present_feed(
                    &mut model.feed,
                    &ctx.config,
                    &static_root,
                    ctx.probe,
                    ctx.scanner,
                )?;
            }
        }
        Ok(())
    }
}

/// Load every post body on the pool. Each worker owns one post; the first
/// failure in feed order is returned.
fn load_bodies(posts: &mut [LongPost], data_dir: &Path, pool: &ThreadPool) -> Result<(), LoadError> {
    let results: Vec<Result<(), LoadError>> = pool.install(|| {
        posts
            .par_iter_mut()
            .map(|post| {
                post.body = loader::load_post_body(data_dir, post)?;
                Ok(())
            })
            .collect()
    });
    results.into_iter().collect::<Result<(), _>>()?;
    spdlog::debug!("Loaded {} post bodies", posts.len());
    Ok(())
}

/// Run every stage in order over a fresh model.
pub fn assemble(ctx: &mut BuildContext<'_>) -> Result<SiteModel, BuildError> {
    let mut model = SiteModel::default();
    for stage in STAGES {
        spdlog::debug!("Stage: {}", stage.name());
        stage.run(&mut model, ctx)?;
    }
    spdlog::info!("Sidecars: {}", ctx.sidecars.stats());
    Ok(model)
}

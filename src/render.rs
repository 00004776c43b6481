//! Page rendering.
//!
//! Emission only knows the [`Renderer`] trait: it hands over a [`Page`] and a
//! read-only [`SiteModel`] and gets markup back. [`BasicRenderer`] is the
//! built-in implementation, plain semantic HTML built with Maud and no
//! styling; a themed renderer can replace it without touching the pipeline.

use maud::{DOCTYPE, Markup, PreEscaped, html};
use thiserror::Error;

use crate::config::SiteConfig;
use crate::gallery::{self, GALLERY_SECTION};
use crate::model::SiteModel;
use crate::presentation::{self, BLOG_SECTION};
use crate::projects;
use crate::types::{GalleryItem, LongPost, PostType, SocialCard};

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Cannot render {page}: {message}")]
    Failed { page: String, message: String },
}

/// One page of the output site.
#[derive(Debug, Clone)]
pub enum Page<'m> {
    Home,
    Blog,
    Post(&'m LongPost),
    Category { slug: String, title: String },
    GalleryIndex,
    /// Index into the model's gallery list.
    GalleryItem(usize),
    Micro,
    Jobs,
    Projects,
}

impl Page<'_> {
    /// Human-readable name for logs and errors.
    pub fn describe(&self) -> String {
        match self {
            Page::Home => "home".to_string(),
            Page::Blog => "blog index".to_string(),
            Page::Post(post) => format!("post '{}'", post.key),
            Page::Category { slug, .. } => format!("category '{slug}'"),
            Page::GalleryIndex => "gallery index".to_string(),
            Page::GalleryItem(index) => format!("gallery item #{index}"),
            Page::Micro => "micro index".to_string(),
            Page::Jobs => "job page".to_string(),
            Page::Projects => "projects page".to_string(),
        }
    }
}

pub trait Renderer: Sync {
    fn render(&self, page: &Page<'_>, model: &SiteModel) -> Result<String, RenderError>;
}

/// Minimal Maud renderer.
#[derive(Debug, Clone)]
pub struct BasicRenderer {
    site_title: String,
    language: String,
    origin: String,
    short_list: usize,
}

impl BasicRenderer {
    pub fn new(config: &SiteConfig) -> Self {
        Self {
            site_title: config.site.title.clone(),
            language: config.site.language.clone(),
            origin: config.origin().to_string(),
            short_list: config.feed.short_list,
        }
    }

    fn base_document(&self, title: &str, head: Markup, content: Markup) -> Markup {
        html! {
            (DOCTYPE)
            html lang=(self.language) {
                head {
                    meta charset="UTF-8";
                    meta name="viewport" content="width=device-width, initial-scale=1.0";
                    title { (title) " | " (self.site_title) }
                    link rel="alternate" type="application/rss+xml" href="/rss.xml";
                    (head)
                }
                body {
                    (site_header(&self.site_title))
                    main { (content) }
                }
            }
        }
    }

    fn render_post(&self, post: &LongPost) -> Markup {
        let head = html! {
            link rel="canonical" href=(presentation::absolutize(&self.origin, &post.link));
            @if let Some(card) = &post.card {
                (card_meta(card))
            }
        };
        let content = html! {
            article.post {
                h1 { (post.title) }
                p.date { (post.date_str) }
                @if !post.categories.is_empty() {
                    ul.categories {
                        @for category in &post.categories {
                            li { a href=(presentation::category_link(&category.slug())) { (category.as_str()) } }
                        }
                    }
                }
                (PreEscaped(&post.body))
            }
        };
        self.base_document(&post.title, head, content)
    }

    fn render_gallery_item(&self, model: &SiteModel, index: usize) -> Result<Markup, RenderError> {
        let item = model.gallery.get(index).ok_or_else(|| RenderError::Failed {
            page: format!("gallery item #{index}"),
            message: format!("only {} items in the gallery", model.gallery.len()),
        })?;
        let nav = gallery::neighbors(&model.gallery, index);
        let content = html! {
            article.gallery-item {
                h1 { (item.file) }
                p.date { (item.date_str) }
                (PreEscaped(&item.body))
                nav.gallery-nav {
                    a rel="prev" href=(nav.prev) { "Previous" }
                    " "
                    a rel="next" href=(nav.next) { "Next" }
                }
            }
        };
        Ok(self.base_document(&item.file, html! {}, content))
    }

    fn render_jobs(&self, model: &SiteModel) -> Markup {
        let content = html! {
            h1 { "Games Career" }
            @if !model.platforms.is_empty() {
                p.platforms { (model.platforms.join(", ")) }
            }
            @for job in &model.jobs {
                section.job {
                    h2 { (job.company) }
                    p { (job.role) " · " (job.start) " – " (job.end) }
                    (PreEscaped(&job.body))
                    @if !job.games.is_empty() {
                        ul.games {
                            @for game in &job.games {
                                li {
                                    strong { (game.title) }
                                    @if !game.released.is_empty() { " (" (game.released) ")" }
                                    @if !game.platforms.is_empty() { " " (game.platforms.join(", ")) }
                                }
                            }
                        }
                    }
                }
            }
        };
        self.base_document("Games Career", html! {}, content)
    }

    fn render_projects(&self, model: &SiteModel) -> Markup {
        let content = html! {
            h1 { "Projects" }
            @for project in projects::grouped(&model.hobbies) {
                section.project.active[project.is_active()] {
                    h2 title=(project.tooltip) { (project.title) }
                    @if !project.tools.is_empty() { p.tools { (project.tools) } }
                    @for paragraph in &project.description { p { (paragraph) } }
                    @if !project.links.is_empty() {
                        ul.links {
                            @for link in &project.links { li { a href=(link.url) { (link.name) } } }
                        }
                    }
                }
            }
        };
        self.base_document("Projects", html! {}, content)
    }
}

impl Renderer for BasicRenderer {
    fn render(&self, page: &Page<'_>, model: &SiteModel) -> Result<String, RenderError> {
        let markup = match page {
            Page::Home => self.base_document(
                "Home",
                html! {},
                post_list("Latest", model.short_feed(self.short_list).iter()),
            ),
            Page::Blog => {
                let content = html! {
                    (post_list("Blog", model.feed.iter()))
                    h2 { "Categories" }
                    ul.categories {
                        @for page in model.categories.pages() {
                            li { a href=(presentation::category_link(&page.slug)) { (page.category.as_str()) } }
                        }
                    }
                };
                self.base_document("Blog", html! {}, content)
            }
            Page::Post(post) => self.render_post(post),
            Page::Category { slug, title } => self.base_document(
                title,
                html! {},
                post_list(title, model.posts_with_slug(slug).into_iter()),
            ),
            Page::GalleryIndex => self.base_document("Gallery", html! {}, gallery_list(&model.gallery)),
            Page::GalleryItem(index) => self.render_gallery_item(model, *index)?,
            Page::Micro => {
                let content = html! {
                    h1 { "Micro" }
                    @for post in model.micro_feed() {
                        article.micro {
                            h2 { a href=(post.link) { (post.title) } }
                            p.date { (post.date_str) }
                            (PreEscaped(&post.body))
                        }
                    }
                };
                self.base_document("Micro", html! {}, content)
            }
            Page::Jobs => self.render_jobs(model),
            Page::Projects => self.render_projects(model),
        };
        Ok(markup.into_string())
    }
}

fn site_header(site_title: &str) -> Markup {
    html! {
        header.site-header {
            a.site-title href="/" { (site_title) }
            nav.site-nav {
                a href={ "/" (BLOG_SECTION) "/" } { "Blog" }
                a href={ "/" (GALLERY_SECTION) "/" } { "Gallery" }
                a href="/micro/" { "Micro" }
                a href="/job/" { "Career" }
                a href="/projects/" { "Projects" }
            }
        }
    }
}

fn card_meta(card: &SocialCard) -> Markup {
    html! {
        meta name="twitter:card" content=(card.kind.as_str());
        meta name="twitter:site" content=(card.site);
        meta name="twitter:title" content=(card.title);
        meta name="twitter:description" content=(card.description);
        meta name="twitter:image" content=(card.image);
        meta property="og:image" content=(card.image);
        meta property="og:image:width" content=(card.image_width);
        meta property="og:image:height" content=(card.image_height);
    }
}

fn post_list<'a>(heading: &str, posts: impl Iterator<Item = &'a LongPost>) -> Markup {
    html! {
        h1 { (heading) }
        ul.post-list {
            @for post in posts {
                li {
                    a href=(post.link) { (post.title) }
                    " "
                    span.date { (post.date_str) }
                    @if !post.summary.is_empty() { p.summary { (post.summary) } }
                }
            }
        }
    }
}

fn gallery_list(items: &[GalleryItem]) -> Markup {
    html! {
        h1 { "Gallery" }
        ul.gallery-list {
            @for item in items {
                li {
                    a href={ "/" (GALLERY_SECTION) "/" (item.link) } { (item.file) }
                    " "
                    span.date { (item.date_str) }
                    @match item.post_type {
                        PostType::Post => { (PreEscaped(&item.brief)) }
                        PostType::Txt => { pre.brief { (item.brief) } }
                        PostType::Image | PostType::Movie => {}
                    }
                }
            }
        }
    }
}

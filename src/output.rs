//! CLI output formatting for `check` and `build`.
//!
//! Output is a content inventory rather than a file list: each section
//! leads with a count, each entry with its positional index and title, and
//! the URL it will be served at is shown as an indented context line.
//!
//! ## Check
//!
//! ```text
//! Blog (3 posts)
//! 001 Third post
//!     Link: /blog/2023/03/three/
//!     Categories: gamedev
//! 002 Quick thought [micro]
//!     Link: /blog/2023/02/quick/
//!
//! Categories
//!     gamedev (2 posts) → /blog/cat/gamedev/
//!     Dropped: solo
//!
//! Gallery (2 items)
//! 001 2021/sketch.png
//!     Page: /gallery/2021/sketch.html
//!
//! Career: 4 jobs, 12 games, 5 platforms
//! Projects: 6
//! ```
//!
//! ## Build
//!
//! ```text
//! Generated 14 pages, 3 assets
//! Feed: 12 items → rss.xml
//! Sitemap: 17 URLs → sitemap.xml
//! ```
//!
//! Each `format_*` function returns lines for testability; the `print_*`
//! wrappers write them to stdout.

use std::path::Path;

use crate::emit::EmitSummary;
use crate::feed::{RSS_FILE, SITEMAP_FILE};
use crate::gallery;
use crate::model::SiteModel;
use crate::presentation;

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

fn plural(n: usize, one: &str, many: &str) -> String {
    format!("{} {}", n, if n == 1 { one } else { many })
}

// ============================================================================
// Check
// ============================================================================

/// Inventory of an assembled model.
pub fn format_check_output(model: &SiteModel) -> Vec<String> {
    let mut lines = Vec::new();

    lines.push(format!("Blog ({})", plural(model.feed.len(), "post", "posts")));
    for (i, post) in model.feed.iter().enumerate() {
        let marker = if post.is_micro { " [micro]" } else { "" };
        lines.push(format!("{} {}{}", format_index(i + 1), post.title, marker));
        lines.push(format!("{}Link: {}", indent(1), post.link));
        if !post.categories.is_empty() {
            let names: Vec<&str> = post.categories.iter().map(|c| c.as_str()).collect();
            lines.push(format!("{}Categories: {}", indent(1), names.join(", ")));
        }
    }

    let pages = model.categories.pages();
    if !pages.is_empty() || !model.categories.dropped().is_empty() {
        lines.push(String::new());
        lines.push("Categories".to_string());
        for page in &pages {
            let count = model.posts_with_slug(&page.slug).len();
            lines.push(format!(
                "{}{} ({}) → {}",
                indent(1),
                page.category,
                plural(count, "post", "posts"),
                presentation::category_link(&page.slug)
            ));
        }
        if !model.categories.dropped().is_empty() {
            let names: Vec<&str> = model.categories.dropped().iter().map(|c| c.as_str()).collect();
            lines.push(format!("{}Dropped: {}", indent(1), names.join(", ")));
        }
    }

    lines.push(String::new());
    lines.push(format!("Gallery ({})", plural(model.gallery.len(), "item", "items")));
    for (i, item) in model.gallery.iter().enumerate() {
        lines.push(format!("{} {}", format_index(i + 1), item.file));
        lines.push(format!("{}Page: {}", indent(1), gallery::asset_url(&item.link)));
    }

    lines.push(String::new());
    lines.push(format!(
        "Career: {}, {}, {}",
        plural(model.jobs.len(), "job", "jobs"),
        plural(model.games.len(), "game", "games"),
        plural(model.platforms.len(), "platform", "platforms"),
    ));
    lines.push(format!("Projects: {}", model.hobbies.len()));

    lines
}

pub fn print_check_output(model: &SiteModel) {
    for line in format_check_output(model) {
        println!("{}", line);
    }
}

// ============================================================================
// Build
// ============================================================================

/// Summary of what emission wrote under `output_root`.
pub fn format_build_output(summary: &EmitSummary, output_root: &Path) -> Vec<String> {
    vec![
        format!(
            "Generated {}, {} in {}",
            plural(summary.pages, "page", "pages"),
            plural(summary.copies, "asset", "assets"),
            output_root.display()
        ),
        format!(
            "Feed: {} → {}",
            plural(summary.feed_items, "item", "items"),
            RSS_FILE
        ),
        format!(
            "Sitemap: {} → {}",
            plural(summary.sitemap_urls, "URL", "URLs"),
            SITEMAP_FILE
        ),
    ]
}

pub fn print_build_output(summary: &EmitSummary, output_root: &Path) {
    for line in format_build_output(summary, output_root) {
        println!("{}", line);
    }
}

// ============================================================================
// Tests
// ============================================================================

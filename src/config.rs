//! Site configuration module.
//!
//! Handles loading, validating, and merging the `config.toml` file found in
//! the source root. Stock defaults are serialized to a TOML table and the
//! user's file is merged over it key by key, so a config file only needs the
//! values it wants to change.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [site]
//! host = "https://www.example.com"   # Absolute origin for feeds, sitemap, cards
//! title = "Personal Site"
//! description = "Writing, games and pictures"
//! language = "en-gb"
//! twitter = "@example"               # twitter:site handle on social cards
//! default_card_image = "/images/card_default.png"
//! feed_image = "/images/feed.png"
//!
//! [paths]
//! data_dir = "data"          # posts.json, jobs.json, games.json, hobbies.json, post/
//! micro_dir = "micro"
//! gallery_dir = "gallery"
//! static_dir = "."           # Root that site-rooted asset paths resolve against
//!
//! [feed]
//! short_list = 10            # Posts listed on the home page
//!
//! [processing]
//! max_processes = 4          # Max parallel workers (omit for auto = CPU cores)
//!
//! [log]
//! level = "info"             # critical | error | warn | info | debug | trace
//! # file = "logs/folio.log"  # Optional daily rotating log file
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Site configuration loaded from `config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    /// Site identity: host, titles, social handle, fallback images.
    pub site: SiteIdentity,
    /// Content locations relative to the source root.
    pub paths: PathsConfig,
    /// Feed and list sizing.
    pub feed: FeedConfig,
    /// Parallel processing settings.
    pub processing: ProcessingConfig,
    /// Logging level and optional log file.
    pub log: LogConfig,
}

impl SiteConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let host = self.site.host.as_str();
        if !(host.starts_with("http://") || host.starts_with("https://")) {
            return Err(ConfigError::Validation(
                "site.host must start with http:// or https://".into(),
            ));
        }
        if self.feed.short_list == 0 {
            return Err(ConfigError::Validation(
                "feed.short_list must be greater than zero".into(),
            ));
        }
        if self.processing.max_processes == Some(0) {
            return Err(ConfigError::Validation(
                "processing.max_processes must be greater than zero".into(),
            ));
        }
        Ok(())
    }

    /// The host without a trailing slash, ready for joining site-rooted paths.
    pub fn origin(&self) -> &str {
        self.site.host.trim_end_matches('/')
    }
}

/// Site identity used by the feed, sitemap and social cards.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteIdentity {
    pub host: String,
    pub title: String,
    pub description: String,
    pub language: String,
    /// Handle placed in the `twitter:site` slot of every card.
    pub twitter: String,
    /// Card image used when a post has neither a banner nor a small image.
    pub default_card_image: String,
    /// Channel image of the RSS feed.
    pub feed_image: String,
}

impl Default for SiteIdentity {
    fn default() -> Self {
        Self {
            host: "https://www.example.com".to_string(),
            title: "Personal Site".to_string(),
            description: "Writing, games and pictures".to_string(),
            language: "en-gb".to_string(),
            twitter: "@example".to_string(),
            default_card_image: "/images/card_default.png".to_string(),
            feed_image: "/images/feed.png".to_string(),
        }
    }
}

/// Content locations, relative to the source root.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PathsConfig {
    pub data_dir: PathBuf,
    pub micro_dir: PathBuf,
    pub gallery_dir: PathBuf,
    pub static_dir: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            micro_dir: PathBuf::from("micro"),
            gallery_dir: PathBuf::from("gallery"),
            static_dir: PathBuf::from("."),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FeedConfig {
    /// Number of newest posts shown on the home page.
    pub short_list: usize,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self { short_list: 10 }
    }
}

/// Parallel processing settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Maximum number of parallel workers for body loading and page emission.
    /// When absent or null, defaults to the number of CPU cores.
    /// Values larger than the core count are clamped down.
    pub max_processes: Option<usize>,
}

/// Resolve the effective thread count from config.
///
/// - `None` → use all available cores
/// - `Some(n)` → use `min(n, cores)` (user can constrain down, not up)
pub fn effective_threads(config: &ProcessingConfig) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    config.max_processes.map(|n| n.min(cores)).unwrap_or(cores)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Critical,
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LogConfig {
    pub level: LogLevel,
    /// Base path of a daily rotating log file. Console output is kept either way.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
///
/// This is the base layer user overrides are merged onto.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(SiteConfig::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load `config.toml` from a directory as a raw TOML value.
///
/// Returns `Ok(None)` if no `config.toml` exists in the directory.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let config_path = path.join("config.toml");
    if !config_path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(&config_path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<SiteConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: SiteConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from `config.toml` in the source root.
pub fn load_config(root: &Path) -> Result<SiteConfig, ConfigError> {
    let base = stock_defaults_value();
    let overlay = load_raw_config(root)?;
    resolve_config(base, overlay)
}

/// Returns a fully-commented stock `config.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# Folio Configuration
# ===================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
# Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Site identity
# ---------------------------------------------------------------------------
[site]
# Absolute origin used for feed links, sitemap locations and card images.
host = "https://www.example.com"
title = "Personal Site"
description = "Writing, games and pictures"
language = "en-gb"

# Handle shown as twitter:site on every social card.
twitter = "@example"

# Card image for posts with neither a banner nor a small image.
default_card_image = "/images/card_default.png"

# Image block of the RSS channel.
feed_image = "/images/feed.png"

# ---------------------------------------------------------------------------
# Content locations (relative to the source directory)
# ---------------------------------------------------------------------------
[paths]
# posts.json, jobs.json, games.json, hobbies.json and post/<year>/<key>.html
data_dir = "data"
micro_dir = "micro"
gallery_dir = "gallery"

# Site-rooted asset paths such as /images/banner.jpg resolve against this.
static_dir = "."

# ---------------------------------------------------------------------------
# Feed
# ---------------------------------------------------------------------------
[feed]
# Number of newest posts listed on the home page.
short_list = 10

# ---------------------------------------------------------------------------
# Processing
# ---------------------------------------------------------------------------
[processing]
# Maximum parallel workers for body loading and page emission.
# Omit or comment out to auto-detect (= number of CPU cores).
# max_processes = 4

# ---------------------------------------------------------------------------
# Logging
# ---------------------------------------------------------------------------
[log]
# critical | error | warn | info | debug | trace
level = "info"

# Daily rotating log file, in addition to console output.
# file = "logs/folio.log"
"##
}

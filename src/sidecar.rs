//! Sidecar memoization for directory-discovered content.
//!
//! Gallery items and micro posts carry a derived representation that is
//! stored next to the source as `<source>.json`:
//!
//! ```text
//! gallery/2021/
//! ├── sketch.md
//! ├── sketch.md.json     ← derived GalleryItem
//! └── cat.png
//! ```
//!
//! On the next build the sidecar is loaded instead of re-deriving, which also
//! pins values that would otherwise drift (a file's modification time changes
//! on checkout; the stored publish date does not). A sidecar is also a place
//! to hand-edit those values.
//!
//! Validity is existence only: there is no content hash and no mtime check,
//! so a stale sidecar wins over an edited source. Delete the sidecar or pass
//! `--no-cache` to re-derive. An unreadable or unparseable sidecar is treated
//! as absent, and a failed write is logged; neither aborts the build.
//!
//! Some sidecars hold values that cannot be derived again (a micro post's
//! authored title and first-seen date). Those go through
//! [`SidecarCache::fetch_or_derive_pinned`], which reads the sidecar even
//! when the cache is disabled and only writes one that does not exist yet.
//! A cache built [`without_writes`](SidecarCache::without_writes) never
//! touches the source tree.

use serde::Serialize;
use serde::de::DeserializeOwned;
use std::ffi::OsString;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::loader::to_pretty_json;

/// `<source>.json`, keeping the source's own extension.
pub fn sidecar_path(source: &Path) -> PathBuf {
    let mut name: OsString = source.as_os_str().to_owned();
    name.push(".json");
    PathBuf::from(name)
}

#[derive(Debug)]
pub struct SidecarCache {
    enabled: bool,
    writes: bool,
    stats: CacheStats,
}

impl Default for SidecarCache {
    fn default() -> Self {
        Self::enabled()
    }
}

impl SidecarCache {
    pub fn enabled() -> Self {
        Self {
            enabled: true,
            writes: true,
            stats: CacheStats::default(),
        }
    }

    /// Ignore existing derived sidecars; those items are re-derived and
    /// rewritten. Pinned sidecars are still honoured.
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            writes: true,
            stats: CacheStats::default(),
        }
    }

    /// Never write a sidecar, for runs that must leave the sources alone.
    pub fn without_writes(mut self) -> Self {
        self.writes = false;
        self
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn writes(&self) -> bool {
        self.writes
    }

    pub fn stats(&self) -> &CacheStats {
        &self.stats
    }

    /// Read the sidecar of `source`, if there is a usable one.
    pub fn load<T: DeserializeOwned>(&self, source: &Path) -> Option<T> {
        if !self.enabled {
            return None;
        }
        read_sidecar(source)
    }

    /// Write the sidecar of `source`. Failures are logged, not returned.
    pub fn store<T: Serialize>(&self, source: &Path, value: &T) {
        if !self.writes {
            return;
        }
        let path = sidecar_path(source);
        let result = to_pretty_json(value)
            .map_err(|e| e.to_string())
            .and_then(|json| std::fs::write(&path, json).map_err(|e| e.to_string()));
        if let Err(e) = result {
            spdlog::warn!("Could not write sidecar {}: {}", path.display(), e);
        }
    }

    /// Return the cached value for `source`, or derive, store and return it.
    pub fn fetch_or_derive<T, E, F>(&mut self, source: &Path, derive: F) -> Result<T, E>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Result<T, E>,
    {
        if let Some(value) = self.load(source) {
            self.stats.hit();
            return Ok(value);
        }
        let value = derive()?;
        self.store(source, &value);
        self.stats.miss();
        Ok(value)
    }

    /// Like [`fetch_or_derive`](Self::fetch_or_derive) for sidecars holding
    /// authored values: read whether or not the cache is enabled, and never
    /// overwrite an existing file, even an unparseable one.
    pub fn fetch_or_derive_pinned<T, E, F>(&mut self, source: &Path, derive: F) -> Result<T, E>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Result<T, E>,
    {
        if let Some(value) = read_sidecar(source) {
            self.stats.hit();
            return Ok(value);
        }
        let value = derive()?;
        if !sidecar_path(source).exists() {
            self.store(source, &value);
        }
        self.stats.miss();
        Ok(value)
    }
}

fn read_sidecar<T: DeserializeOwned>(source: &Path) -> Option<T> {
    let path = sidecar_path(source);
    let content = std::fs::read_to_string(&path).ok()?;
    match serde_json::from_str(&content) {
        Ok(value) => Some(value),
        Err(e) => {
            spdlog::warn!("Ignoring unreadable sidecar {}: {}", path.display(), e);
            None
        }
    }
}

/// Summary of sidecar use for a build run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u32,
    pub misses: u32,
}

impl CacheStats {
    pub fn hit(&mut self) {
        self.hits += 1;
    }

    pub fn miss(&mut self) {
        self.misses += 1;
    }

    pub fn total(&self) -> u32 {
        self.hits + self.misses
    }
}

impl fmt::Display for CacheStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.hits > 0 {
            write!(
                f,
                "{} cached, {} derived ({} total)",
                self.hits,
                self.misses,
                self.total()
            )
        } else {
            write!(f, "{} derived", self.misses)
        }
    }
}

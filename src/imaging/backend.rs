//! Image probe trait and shared types.
//!
//! Only banner images are probed: their real size goes into the large
//! social card. A banner that cannot be probed is a missing or broken asset
//! and fails the build.

use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProbeError {
    #[error("Failed to open image {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to read dimensions of {path}: {message}")]
    Decode { path: PathBuf, message: String },
}

/// Pixel size of an image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

/// Anything that can tell the pixel size of an image file.
///
/// `Sync` so a single probe can be shared with rayon workers.
pub trait ImageProbe: Sync {
    fn probe(&self, path: &Path) -> Result<Dimensions, ProbeError>;
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// Mock probe answering from a fixed table and recording every call.
    /// Uses Mutex (not RefCell) so it is Sync.
    #[derive(Default)]
    pub struct MockProbe {
        pub sizes: HashMap<PathBuf, Dimensions>,
        pub probed: Mutex<Vec<PathBuf>>,
    }

    impl MockProbe {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_size(mut self, path: impl Into<PathBuf>, width: u32, height: u32) -> Self {
            self.sizes.insert(path.into(), Dimensions { width, height });
            self
        }

        pub fn get_probed(&self) -> Vec<PathBuf> {
            self.probed.lock().unwrap().clone()
        }
    }

    impl ImageProbe for MockProbe {
        fn probe(&self, path: &Path) -> Result<Dimensions, ProbeError> {
            self.probed.lock().unwrap().push(path.to_path_buf());
            self.sizes.get(path).copied().ok_or_else(|| ProbeError::Decode {
                path: path.to_path_buf(),
                message: "no mock size".to_string(),
            })
        }
    }

    #[test]
    fn mock_probe_records_calls() {
        let probe = MockProbe::new().with_size("/a.png", 800, 400);
        assert_eq!(
            probe.probe(Path::new("/a.png")).unwrap(),
            Dimensions { width: 800, height: 400 }
        );
        assert!(probe.probe(Path::new("/b.png")).is_err());
        assert_eq!(probe.get_probed().len(), 2);
    }
}

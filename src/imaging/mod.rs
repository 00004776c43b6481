//! Image dimension probing for social cards.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Probe** | `image::image_dimensions` (header only, no full decode) |
//!
//! The module is split into:
//! - **Backend**: the [`ImageProbe`] trait the presentation stage depends on
//! - **Rust backend**: [`ImageCrateProbe`], the production implementation

pub mod backend;
pub mod rust_backend;

pub use backend::{Dimensions, ImageProbe, ProbeError};
pub use rust_backend::ImageCrateProbe;

//! Shared test utilities for the resize-cache test suite.
//!
//! Provides synthetic image encoders and a temp-directory layout that
//! mirrors a real deployment (`images/` for originals, `resized/` for the
//! cache), without either directory existing up front.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let dirs = TestDirs::new();
//! dirs.write_source("cat.jpg", &create_test_jpeg(640, 480));
//! let resizer = Resizer::with_rust_backend(dirs.service_config());
//! ```

use image::{ImageFormat, Rgb, RgbImage, Rgba, RgbaImage};
use std::io::Cursor;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use crate::service::ServiceConfig;

// =========================================================================
// Synthetic images
// =========================================================================

/// Encode a gradient JPEG of the given size.
pub fn create_test_jpeg(width: u32, height: u32) -> Vec<u8> {
    let img = RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8])
    });
    let mut buf = Cursor::new(Vec::new());
    img.write_to(&mut buf, ImageFormat::Jpeg).unwrap();
    buf.into_inner()
}

/// Encode a PNG with a varying alpha channel.
pub fn create_test_png_rgba(width: u32, height: u32) -> Vec<u8> {
    let img = RgbaImage::from_fn(width, height, |x, y| {
        Rgba([200, (x % 256) as u8, (y % 256) as u8, ((x * 3) % 256) as u8])
    });
    let mut buf = Cursor::new(Vec::new());
    img.write_to(&mut buf, ImageFormat::Png).unwrap();
    buf.into_inner()
}

// =========================================================================
// Directory layout
// =========================================================================

/// Source and cache directories under a fresh temp root.
///
/// Neither directory is created; that is the service's job.
pub struct TestDirs {
    tmp: TempDir,
    pub source_dir: PathBuf,
    pub cache_dir: PathBuf,
}

impl TestDirs {
    pub fn new() -> Self {
        let tmp = TempDir::new().unwrap();
        let source_dir = tmp.path().join("images");
        let cache_dir = tmp.path().join("resized");
        Self {
            tmp,
            source_dir,
            cache_dir,
        }
    }

    pub fn root(&self) -> &Path {
        self.tmp.path()
    }

    /// Write an original image, creating the source directory if needed.
    pub fn write_source(&self, name: &str, bytes: &[u8]) {
        std::fs::create_dir_all(&self.source_dir).unwrap();
        std::fs::write(self.source_dir.join(name), bytes).unwrap();
    }

    pub fn service_config(&self) -> ServiceConfig {
        ServiceConfig::new(&self.source_dir, &self.cache_dir)
    }
}

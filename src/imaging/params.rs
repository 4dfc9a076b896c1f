//! Parameter types for image operations.
//!
//! These structs describe *what* to do, not *how* to do it. They are the
//! interface between the request path (which decides what variant to build)
//! and the [`backend`](super::backend) (which does the pixel work). This
//! separation allows swapping backends (e.g. for testing with a mock) without
//! changing request logic.
//!
//! ## Types
//!
//! - [`Quality`] — Lossy encoding quality (1–100, default 80). Clamped on construction.
//! - [`Fit`] — How the source is mapped onto the exact target rectangle.
//! - [`ResizeParams`] — Full specification for a resize: dimensions, format, quality, fit.

use super::format::OutputFormat;
use serde::{Deserialize, Serialize};

/// Quality setting for lossy image encoding (1-100).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quality(pub u32);

impl Quality {
    pub fn new(value: u32) -> Self {
        Self(value.clamp(1, 100))
    }

    pub fn value(self) -> u32 {
        self.0
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(80)
    }
}

/// How the source is mapped onto the target width × height.
///
/// Both modes produce exactly the requested dimensions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Fit {
    /// Scale to cover the target, then center-crop the overflow.
    #[default]
    Cover,
    /// Stretch to the target, ignoring the source aspect ratio.
    Fill,
}

/// Parameters for a resize operation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResizeParams {
    pub width: u32,
    pub height: u32,
    pub format: OutputFormat,
    pub quality: Quality,
    pub fit: Fit,
}

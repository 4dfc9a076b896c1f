//! Image processing — pure Rust, statically linked.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Decode** | `image::load_from_memory` |
//! | **Resize** | `resize_to_fill` / `resize_exact`, Lanczos3 |
//! | **Encode** | `image` codecs, JPEG at quality 80 |
//!
//! The module is split into:
//! - **Format**: [`OutputFormat`] extension table
//! - **Parameters**: Data structures describing a resize
//! - **Backend**: [`ImageBackend`] trait + [`RustBackend`]

pub mod backend;
mod format;
mod params;
pub mod rust_backend;

pub use backend::{BackendError, ImageBackend};
pub use format::{OutputFormat, supported_extensions};
pub use params::{Fit, Quality, ResizeParams};
pub use rust_backend::RustBackend;

//! Image processing backend trait and shared types.
//!
//! The [`ImageBackend`] trait is the single operation the resize path needs:
//! bytes in, resized and re-encoded bytes out.
//!
//! The production implementation is
//! [`RustBackend`](super::rust_backend::RustBackend), built on the `image`
//! crate. Tests substitute a recording mock to count invocations.

use super::params::ResizeParams;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("Unsupported output format: {0}")]
    UnsupportedFormat(String),
    #[error("Failed to decode image: {0}")]
    Decode(String),
    #[error("Failed to encode image: {0}")]
    Encode(String),
    #[error("Image worker failed: {0}")]
    Worker(String),
}

/// Trait for image processing backends.
///
/// Implementations are called from blocking worker threads, so they must be
/// `Send + Sync` and may do arbitrary CPU work.
pub trait ImageBackend: Send + Sync {
    /// Decode `source`, resize it to exactly `params.width × params.height`,
    /// and encode it as `params.format`.
    fn resize(&self, source: &[u8], params: &ResizeParams) -> Result<Vec<u8>, BackendError>;
}

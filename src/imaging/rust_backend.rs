//! Pure Rust image processing backend.
//!
//! Everything is statically linked into the binary.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Decode (JPEG, PNG, GIF, WebP) | `image::load_from_memory` (format sniffed from bytes) |
//! | Resize, cover | `image::DynamicImage::resize_to_fill` with `Lanczos3` |
//! | Resize, fill | `image::DynamicImage::resize_exact` with `Lanczos3` |
//! | Encode → JPEG | `image::codecs::jpeg::JpegEncoder` at the requested quality |
//! | Encode → PNG / WebP / GIF | `DynamicImage::write_to` |

use super::backend::{BackendError, ImageBackend};
use super::format::OutputFormat;
use super::params::{Fit, ResizeParams};
use image::imageops::FilterType;
use image::DynamicImage;
use std::io::Cursor;

/// Pure Rust backend using the `image` crate ecosystem.
///
/// See the [module docs](self) for the crate-to-operation mapping.
pub struct RustBackend;

impl RustBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RustBackend {
    fn default() -> Self {
        Self::new()
    }
}

/// Decode an image from memory, sniffing the format from its magic bytes.
fn load_image(source: &[u8]) -> Result<DynamicImage, BackendError> {
    image::load_from_memory(source).map_err(|e| BackendError::Decode(e.to_string()))
}

/// Convert to a pixel layout the target encoder accepts.
///
/// JPEG has no alpha channel; the lossless WebP and GIF encoders only take
/// 8-bit RGB(A).
fn prepare_for(img: DynamicImage, format: OutputFormat) -> DynamicImage {
    match format {
        OutputFormat::Jpeg => match img {
            DynamicImage::ImageRgb8(_) | DynamicImage::ImageLuma8(_) => img,
            other => DynamicImage::ImageRgb8(other.to_rgb8()),
        },
        OutputFormat::WebP | OutputFormat::Gif => match img {
            DynamicImage::ImageRgb8(_) | DynamicImage::ImageRgba8(_) => img,
            other => DynamicImage::ImageRgba8(other.to_rgba8()),
        },
        OutputFormat::Png => match img {
            DynamicImage::ImageRgb32F(_) | DynamicImage::ImageRgba32F(_) => {
                DynamicImage::ImageRgba16(img.to_rgba16())
            }
            other => other,
        },
    }
}

/// Encode a DynamicImage into an in-memory buffer.
fn encode_image(
    img: &DynamicImage,
    format: OutputFormat,
    quality: u32,
) -> Result<Vec<u8>, BackendError> {
    // Rough capacity guess: a quarter of the raw RGB size
    let estimated = (img.width() as usize * img.height() as usize * 3) / 4;
    let mut buf = Cursor::new(Vec::with_capacity(estimated));
    // JPEG is the only lossy encoder; the rest take no quality knob
    let result = if format.is_lossy() {
        let encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(&mut buf, quality as u8);
        img.write_with_encoder(encoder)
    } else {
        img.write_to(&mut buf, format.image_format())
    };
    result.map_err(|e| BackendError::Encode(format!("{format:?}: {e}")))?;
    Ok(buf.into_inner())
}

impl ImageBackend for RustBackend {
    fn resize(&self, source: &[u8], params: &ResizeParams) -> Result<Vec<u8>, BackendError> {
        let img = load_image(source)?;
        let resized = match params.fit {
            Fit::Cover => img.resize_to_fill(params.width, params.height, FilterType::Lanczos3),
            Fit::Fill => img.resize_exact(params.width, params.height, FilterType::Lanczos3),
        };
        let prepared = prepare_for(resized, params.format);
        encode_image(&prepared, params.format, params.quality.value())
    }
}

//! Extension → output codec table.
//!
//! The requested format comes from the filename extension, but the raw string
//! never reaches the codec. It is looked up here first, and anything not in
//! the table is rejected before the source is even decoded.
//!
//! | Extension | Codec | Quality applies |
//! |---|---|---|
//! | `jpg`, `jpeg` | JPEG | yes |
//! | `png` | PNG | no (lossless) |
//! | `webp` | WebP | no (the `image` crate only encodes lossless WebP) |
//! | `gif` | GIF | no |

use image::ImageFormat;

/// Encodable output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutputFormat {
    Jpeg,
    Png,
    WebP,
    Gif,
}

const FORMAT_TABLE: &[(&str, OutputFormat)] = &[
    ("jpg", OutputFormat::Jpeg),
    ("jpeg", OutputFormat::Jpeg),
    ("png", OutputFormat::Png),
    ("webp", OutputFormat::WebP),
    ("gif", OutputFormat::Gif),
];

impl OutputFormat {
    /// Look up a format by extension (without the dot), ignoring case.
    pub fn from_extension(ext: &str) -> Option<Self> {
        FORMAT_TABLE
            .iter()
            .find(|(known, _)| ext.eq_ignore_ascii_case(known))
            .map(|(_, format)| *format)
    }

    pub fn image_format(self) -> ImageFormat {
        match self {
            OutputFormat::Jpeg => ImageFormat::Jpeg,
            OutputFormat::Png => ImageFormat::Png,
            OutputFormat::WebP => ImageFormat::WebP,
            OutputFormat::Gif => ImageFormat::Gif,
        }
    }

    /// Whether the encoder honors a [`Quality`](super::Quality) setting.
    pub fn is_lossy(self) -> bool {
        matches!(self, OutputFormat::Jpeg)
    }
}

/// All extensions with an encoder compiled in.
pub fn supported_extensions() -> impl Iterator<Item = &'static str> {
    FORMAT_TABLE.iter().map(|(ext, _)| *ext)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_extensions_map() {
        assert_eq!(OutputFormat::from_extension("jpg"), Some(OutputFormat::Jpeg));
        assert_eq!(OutputFormat::from_extension("jpeg"), Some(OutputFormat::Jpeg));
        assert_eq!(OutputFormat::from_extension("png"), Some(OutputFormat::Png));
        assert_eq!(OutputFormat::from_extension("webp"), Some(OutputFormat::WebP));
        assert_eq!(OutputFormat::from_extension("gif"), Some(OutputFormat::Gif));
    }

    #[test]
    fn lookup_ignores_case() {
        assert_eq!(OutputFormat::from_extension("JPG"), Some(OutputFormat::Jpeg));
        assert_eq!(OutputFormat::from_extension("WebP"), Some(OutputFormat::WebP));
    }

    #[test]
    fn unknown_extensions_rejected() {
        for ext in ["tiff", "bmp", "txt", "", "jpg ", "avif"] {
            assert_eq!(OutputFormat::from_extension(ext), None, "{ext:?}");
        }
    }

    #[test]
    fn every_table_format_can_be_written() {
        for ext in supported_extensions() {
            let format = OutputFormat::from_extension(ext).unwrap();
            assert!(
                format.image_format().writing_enabled(),
                "no encoder compiled in for {ext}"
            );
        }
    }

    #[test]
    fn only_jpeg_is_lossy() {
        assert!(OutputFormat::Jpeg.is_lossy());
        assert!(!OutputFormat::Png.is_lossy());
        assert!(!OutputFormat::WebP.is_lossy());
        assert!(!OutputFormat::Gif.is_lossy());
    }
}

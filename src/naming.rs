//! Centralized filename handling for the source and cache directories.
//!
//! Every filename that reaches the filesystem passes through this module.
//! Two conventions live here:
//!
//! ## Sanitized filenames
//!
//! User input is reduced to its final path segment before it is joined with a
//! store directory. Both `/` and `\` count as separators, and a final `.` or
//! `..` segment collapses to the empty string:
//! - `"../../etc/passwd"` → `"passwd"`
//! - `"/abs/photo.jpg"` → `"photo.jpg"`
//! - `"..\\..\\boot.ini"` → `"boot.ini"`
//! - `".."` → `""`
//!
//! ## Cache keys
//!
//! A resized variant is stored as `{base}_{width}x{height}.{ext}`:
//! - `photo.png` at 150×150 → `photo_150x150.png`
//! - `noext` at 10×10 → `noext_10x10.jpg` (extension defaults to `jpg`)
//!
//! Because the key depends only on the name and the requested size, a source
//! replaced under the same filename keeps serving its old variants.

use crate::dimensions::TargetSize;
use std::fmt;

/// Extension assumed when a filename has none.
pub const DEFAULT_EXTENSION: &str = "jpg";

/// Reduce arbitrary user input to a single, traversal-free path segment.
pub fn sanitize_filename(input: &str) -> String {
    let last = input
        .rsplit(|c: char| c == '/' || c == '\\')
        .find(|segment| !segment.is_empty())
        .unwrap_or("");
    match last {
        "." | ".." => String::new(),
        other => other.to_string(),
    }
}

/// Sanitize an uploaded file's name for storage.
///
/// Every character outside `[A-Za-z0-9._-]` becomes `_` (so separators can't
/// survive), then the result goes through [`sanitize_filename`] to drop the
/// `.`/`..` names the charset still allows.
pub fn sanitize_upload_name(input: &str) -> String {
    let replaced: String = input
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect();
    sanitize_filename(&replaced)
}

/// A sanitized filename split into base name and extension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitName {
    /// Everything before the last `.`; the full name when there is no extension.
    pub base: String,
    /// Extension without the dot, defaulted to [`DEFAULT_EXTENSION`].
    pub extension: String,
}

/// Split a filename at its last `.`.
///
/// - `"photo.png"` → base="photo", extension="png"
/// - `"archive.tar.gz"` → base="archive.tar", extension="gz"
/// - `"noext"` → base="noext", extension="jpg"
/// - `".hidden"` → base=".hidden", extension="jpg" (a leading dot is not a separator)
/// - `"trailing."` → base="trailing.", extension="jpg"
pub fn split_name(filename: &str) -> SplitName {
    match filename.rfind('.') {
        Some(pos) if pos > 0 && pos + 1 < filename.len() => SplitName {
            base: filename[..pos].to_string(),
            extension: filename[pos + 1..].to_string(),
        },
        _ => SplitName {
            base: filename.to_string(),
            extension: DEFAULT_EXTENSION.to_string(),
        },
    }
}

/// Filename of a resized variant inside the cache directory.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    base: String,
    extension: String,
    size: TargetSize,
}

impl CacheKey {
    /// Derive the key for a sanitized filename at a validated size.
    pub fn derive(filename: &str, size: TargetSize) -> Self {
        let SplitName { base, extension } = split_name(filename);
        Self {
            base,
            extension,
            size,
        }
    }

    /// Extension of the variant (and of its source), never empty.
    pub fn extension(&self) -> &str {
        &self.extension
    }

    pub fn size(&self) -> TargetSize {
        self.size
    }

    /// `Content-Type` header value: `image/{extension}`.
    pub fn content_type(&self) -> String {
        format!("image/{}", self.extension)
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}_{}x{}.{}",
            self.base, self.size.width, self.size.height, self.extension
        )
    }
}

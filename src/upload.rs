//! Upload acceptance rules.
//!
//! Uploads are JPEG-only and capped at [`MAX_UPLOAD_BYTES`]. The stored name
//! is derived from the client's filename with
//! [`sanitize_upload_name`](crate::naming::sanitize_upload_name).

use crate::naming::sanitize_upload_name;
use thiserror::Error;

/// Largest accepted upload, in bytes (5 MiB).
pub const MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;

/// MIME types accepted for upload, compared case-insensitively.
pub const ALLOWED_CONTENT_TYPES: &[&str] = &["image/jpeg", "image/jpg"];

/// Multipart field that carries the file.
pub const UPLOAD_FIELD: &str = "image";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UploadError {
    #[error("No image file provided")]
    MissingFile,
    #[error("Invalid file type. Only JPG images are allowed.")]
    InvalidType,
    #[error("File size exceeds limit of {}MB", MAX_UPLOAD_BYTES / (1024 * 1024))]
    TooLarge,
    #[error("Filename is required")]
    MissingFilename,
}

/// A file that passed every check and is ready to be written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcceptedUpload {
    pub filename: String,
    pub bytes: Vec<u8>,
}

/// Check a received file against the upload rules.
///
/// Rules are applied in order: content type, size, then filename.
pub fn accept_upload(
    client_filename: Option<&str>,
    content_type: Option<&str>,
    bytes: Vec<u8>,
) -> Result<AcceptedUpload, UploadError> {
    let content_type = content_type.unwrap_or("").trim();
    if !ALLOWED_CONTENT_TYPES
        .iter()
        .any(|allowed| content_type.eq_ignore_ascii_case(allowed))
    {
        return Err(UploadError::InvalidType);
    }
    if bytes.len() > MAX_UPLOAD_BYTES {
        return Err(UploadError::TooLarge);
    }
    let filename = sanitize_upload_name(client_filename.unwrap_or(""));
    if filename.is_empty() || filename.chars().all(|c| c == '.') {
        return Err(UploadError::MissingFilename);
    }
    Ok(AcceptedUpload { filename, bytes })
}

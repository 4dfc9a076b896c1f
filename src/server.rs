//! HTTP surface.
//!
//! | Route | Handler |
//! |---|---|
//! | `GET /image/{filename}?width=&height=` | [`Resizer::resize`] |
//! | `GET /images` | [`SourceStore::list_images`](crate::store::SourceStore::list_images) |
//! | `POST /upload` | [`accept_upload`] then `SourceStore::save` |
//!
//! Successful resizes return raw image bytes. Every other response is JSON:
//! `{"message": ...}`, plus an `"error"` detail on server-side failures.

use crate::dimensions::ValidationError;
use crate::service::{CacheOutcome, Resizer, ServiceError};
use crate::upload::{MAX_UPLOAD_BYTES, UPLOAD_FIELD, UploadError, accept_upload};
use axum::extract::multipart::{MultipartError, MultipartRejection};
use axum::extract::rejection::{PathRejection, QueryRejection};
use axum::extract::{DefaultBodyLimit, Multipart, Path, Query, State};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

/// Request body ceiling. Leaves room for multipart framing around a file of
/// exactly [`MAX_UPLOAD_BYTES`], so oversize files are reported by the
/// upload rules rather than cut off by the framework.
pub const BODY_LIMIT_BYTES: usize = MAX_UPLOAD_BYTES + 1024 * 1024;

#[derive(Clone)]
pub struct AppState {
    pub resizer: Resizer,
}

impl AppState {
    pub fn new(resizer: Resizer) -> Self {
        Self { resizer }
    }
}

/// Build the application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/image/{filename}", get(get_resized))
        .route("/images", get(list_images))
        .route("/upload", post(upload_image))
        .layer(DefaultBodyLimit::max(BODY_LIMIT_BYTES))
        .with_state(state)
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorBody {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ErrorBody {
    fn message(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            error: None,
        }
    }

    fn with_error(message: impl Into<String>, error: impl ToString) -> Self {
        Self {
            message: message.into(),
            error: Some(error.to_string()),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct UploadResponse {
    pub message: String,
    pub filename: String,
}

fn json_error(status: StatusCode, body: ErrorBody) -> Response {
    (status, Json(body)).into_response()
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = match &self {
            ServiceError::Validation(e) => ErrorBody::message(e.to_string()),
            ServiceError::NotFound(_) => ErrorBody::message(self.to_string()),
            ServiceError::Imaging(_) | ServiceError::Storage(_) => {
                error!(error = %self, "resize failed");
                ErrorBody::with_error("Error processing image", &self)
            }
        };
        json_error(status, body)
    }
}

impl IntoResponse for UploadError {
    fn into_response(self) -> Response {
        json_error(StatusCode::BAD_REQUEST, ErrorBody::message(self.to_string()))
    }
}

#[derive(Debug, Deserialize)]
struct ResizeQuery {
    width: Option<String>,
    height: Option<String>,
}

/// Undecodable path segments (invalid UTF-8) and query strings that don't
/// fit [`ResizeQuery`] (repeated keys) are validation failures like any other.
async fn get_resized(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
    query: Result<Query<ResizeQuery>, QueryRejection>,
) -> Result<Response, ServiceError> {
    let Path(filename) = path.map_err(|rejection| {
        debug!(error = %rejection.body_text(), "bad filename segment");
        ValidationError::InvalidFilename
    })?;
    let Query(query) = query.map_err(|rejection| {
        debug!(error = %rejection.body_text(), "bad resize query");
        ValidationError::InvalidDimensions
    })?;
    let image = state
        .resizer
        .resize(&filename, query.width.as_deref(), query.height.as_deref())
        .await?;
    debug!(
        filename = %filename,
        width = query.width.as_deref().unwrap_or_default(),
        height = query.height.as_deref().unwrap_or_default(),
        cached = image.cache == CacheOutcome::Hit,
        "served variant"
    );
    Ok((
        StatusCode::OK,
        [(header::CONTENT_TYPE, image.content_type)],
        image.bytes,
    )
        .into_response())
}

async fn list_images(State(state): State<AppState>) -> Response {
    match state.resizer.sources().list_images().await {
        Ok(names) => Json(names).into_response(),
        Err(e) => {
            error!(error = %e, "listing failed");
            json_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorBody::with_error("Error listing images", e),
            )
        }
    }
}

/// The `image` field as received: client filename, declared type, and at
/// most `MAX_UPLOAD_BYTES + 1` bytes of content.
struct ReceivedFile {
    filename: Option<String>,
    content_type: Option<String>,
    bytes: Vec<u8>,
}

/// Find the upload field and read it.
///
/// Reading stops one byte past the limit; that is enough for the size rule
/// to reject it without buffering the whole body.
async fn read_upload_field(
    multipart: &mut Multipart,
) -> Result<Option<ReceivedFile>, MultipartError> {
    while let Some(mut field) = multipart.next_field().await? {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }
        let filename = field.file_name().map(str::to_owned);
        let content_type = field.content_type().map(str::to_owned);
        let mut bytes = Vec::new();
        while let Some(chunk) = field.chunk().await? {
            bytes.extend_from_slice(&chunk);
            if bytes.len() > MAX_UPLOAD_BYTES {
                break;
            }
        }
        return Ok(Some(ReceivedFile {
            filename,
            content_type,
            bytes,
        }));
    }
    Ok(None)
}

async fn upload_image(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Response {
    let Ok(mut multipart) = multipart else {
        return UploadError::MissingFile.into_response();
    };
    let received = match read_upload_field(&mut multipart).await {
        Ok(Some(file)) => file,
        Ok(None) => return UploadError::MissingFile.into_response(),
        // The body limit sits above MAX_UPLOAD_BYTES, so hitting it means the file is too big
        Err(e) if e.status() == StatusCode::PAYLOAD_TOO_LARGE => {
            warn!(error = %e, "upload over body limit");
            return UploadError::TooLarge.into_response();
        }
        Err(e) => {
            warn!(error = %e, "malformed upload body");
            return json_error(
                e.status(),
                ErrorBody::with_error("Error uploading image", e.body_text()),
            );
        }
    };

    let accepted = match accept_upload(
        received.filename.as_deref(),
        received.content_type.as_deref(),
        received.bytes,
    ) {
        Ok(accepted) => accepted,
        Err(e) => {
            warn!(error = %e, "upload rejected");
            return e.into_response();
        }
    };

    match state
        .resizer
        .sources()
        .save(&accepted.filename, &accepted.bytes)
        .await
    {
        Ok(()) => {
            info!(
                filename = %accepted.filename,
                bytes = accepted.bytes.len(),
                "stored upload"
            );
            Json(UploadResponse {
                message: "Image uploaded successfully".to_string(),
                filename: accepted.filename,
            })
            .into_response()
        }
        Err(e) => {
            error!(filename = %accepted.filename, error = %e, "upload write failed");
            json_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorBody::with_error("Error uploading image", e),
            )
        }
    }
}

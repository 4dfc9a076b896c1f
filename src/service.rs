//! The resize-and-cache request path.
//!
//! [`Resizer::resize`] runs one request through a fixed sequence of steps.
//! Each step either moves on or ends the request with a [`ServiceError`]:
//!
//! ```text
//! 1. Validate   filename + width/height            → 400 on failure
//! 2. Bootstrap  create source/cache dirs if absent  → 500 on failure
//! 3. Cache      derive key, probe cache dir         → 200 (cached bytes) on hit
//! 4. Source     read original                       → 404 if missing
//! 5. Transform  decode → resize → encode            → 500 on failure
//! 6. Persist    write variant to cache dir          → 500 on failure
//! 7. Respond    200 with the fresh bytes
//! ```
//!
//! Validation happens before any filesystem access, so a malformed request
//! never creates directories or reads files.
//!
//! ## Concurrency
//!
//! Requests are independent. Step 5 runs on tokio's blocking pool, gated by
//! a semaphore with `processing.max_concurrent` permits, so CPU-heavy work
//! never stalls the async workers. Two concurrent misses for the same key
//! both transform and both write (see [`cache`](crate::cache)).
//!
//! ## Persist failures
//!
//! If the variant can't be written to the cache, the request fails even
//! though the resized bytes are in hand. Serving uncached bytes would hide a
//! broken cache directory behind full-cost resizes on every request.

use crate::cache::CacheStore;
use crate::config::{AppConfig, effective_concurrency};
use crate::dimensions::{ValidationError, parse_dimensions};
use crate::imaging::{
    BackendError, Fit, ImageBackend, OutputFormat, Quality, ResizeParams, RustBackend,
};
use crate::naming::{CacheKey, sanitize_filename};
use crate::store::{SourceStore, StoreError};
use axum::http::StatusCode;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;
use tokio::sync::Semaphore;
use tracing::{debug, info, warn};

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("Original image not found")]
    NotFound(String),
    #[error(transparent)]
    Imaging(#[from] BackendError),
    #[error(transparent)]
    Storage(StoreError),
}

impl From<StoreError> for ServiceError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(name) => ServiceError::NotFound(name),
            other => ServiceError::Storage(other),
        }
    }
}

impl ServiceError {
    /// HTTP status the error maps to.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ServiceError::Validation(_) => StatusCode::BAD_REQUEST,
            ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
            ServiceError::Imaging(_) | ServiceError::Storage(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

/// Configuration for the resize path.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub source_dir: PathBuf,
    pub cache_dir: PathBuf,
    pub fit: Fit,
    /// Resize permits; always at least 1.
    pub max_concurrent: usize,
}

impl ServiceConfig {
    /// Config with default processing settings for the given directories.
    pub fn new(source_dir: impl Into<PathBuf>, cache_dir: impl Into<PathBuf>) -> Self {
        Self {
            source_dir: source_dir.into(),
            cache_dir: cache_dir.into(),
            fit: Fit::default(),
            max_concurrent: 1,
        }
    }

    /// Build a ServiceConfig from AppConfig values.
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            source_dir: config.storage.source_dir.clone(),
            cache_dir: config.storage.cache_dir.clone(),
            fit: config.processing.fit,
            max_concurrent: effective_concurrency(&config.processing).max(1),
        }
    }
}

/// Whether a response came from the cache or was generated for this request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheOutcome {
    Hit,
    Miss,
}

/// A successfully served variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResizedImage {
    pub bytes: Vec<u8>,
    pub content_type: String,
    pub cache: CacheOutcome,
}

/// Serves resized variants from the cache, generating them on a miss.
///
/// Cheap to clone; clones share the stores, backend and semaphore.
#[derive(Clone)]
pub struct Resizer {
    sources: SourceStore,
    cache: CacheStore,
    backend: Arc<dyn ImageBackend>,
    permits: Arc<Semaphore>,
    fit: Fit,
}

impl Resizer {
    pub fn new(config: ServiceConfig, backend: Arc<dyn ImageBackend>) -> Self {
        Self {
            sources: SourceStore::new(config.source_dir),
            cache: CacheStore::new(config.cache_dir),
            backend,
            permits: Arc::new(Semaphore::new(config.max_concurrent.max(1))),
            fit: config.fit,
        }
    }

    /// Resizer backed by [`RustBackend`].
    pub fn with_rust_backend(config: ServiceConfig) -> Self {
        Self::new(config, Arc::new(RustBackend::new()))
    }

    pub fn sources(&self) -> &SourceStore {
        &self.sources
    }

    pub fn cache(&self) -> &CacheStore {
        &self.cache
    }

    /// Create both store directories if they are missing.
    pub async fn bootstrap(&self) -> Result<(), StoreError> {
        self.sources.ensure_exists().await?;
        self.cache.ensure_exists().await
    }

    /// Serve `filename` resized to the raw `width` × `height` query values.
    pub async fn resize(
        &self,
        filename: &str,
        width: Option<&str>,
        height: Option<&str>,
    ) -> Result<ResizedImage, ServiceError> {
        let sanitized = sanitize_filename(filename);
        if sanitized.is_empty() {
            return Err(ValidationError::MissingFilename.into());
        }
        let size = parse_dimensions(width, height)?;

        self.bootstrap().await?;

        let key = CacheKey::derive(&sanitized, size);
        let content_type = key.content_type();
        if let Some(bytes) = self.cache.lookup(&key).await? {
            debug!(key = %key, bytes = bytes.len(), "cache hit");
            return Ok(ResizedImage {
                bytes,
                content_type,
                cache: CacheOutcome::Hit,
            });
        }

        let source = match self.sources.get(&sanitized).await {
            Ok(bytes) => bytes,
            Err(StoreError::NotFound(name)) => {
                warn!(filename = %name, "source image not found");
                return Err(ServiceError::NotFound(name));
            }
            Err(e) => return Err(e.into()),
        };

        let format = OutputFormat::from_extension(key.extension())
            .ok_or_else(|| BackendError::UnsupportedFormat(key.extension().to_string()))?;
        let params = ResizeParams {
            width: size.width,
            height: size.height,
            format,
            quality: Quality::default(),
            fit: self.fit,
        };

        let started = Instant::now();
        let bytes = self.transform(source, params).await?;
        self.cache.put(&key, &bytes).await?;

        info!(
            key = %key,
            bytes = bytes.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "generated variant"
        );
        Ok(ResizedImage {
            bytes,
            content_type,
            cache: CacheOutcome::Miss,
        })
    }

    /// Run the backend on the blocking pool, holding a processing permit.
    async fn transform(
        &self,
        source: Vec<u8>,
        params: ResizeParams,
    ) -> Result<Vec<u8>, BackendError> {
        let _permit = self
            .permits
            .acquire()
            .await
            .map_err(|e| BackendError::Worker(e.to_string()))?;
        let backend = Arc::clone(&self.backend);
        tokio::task::spawn_blocking(move || backend.resize(&source, &params))
            .await
            .map_err(|e| BackendError::Worker(e.to_string()))?
    }
}

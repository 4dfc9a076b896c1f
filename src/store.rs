//! Directory-backed image stores.
//!
//! Both stores are flat directories addressed by filename. There is no
//! database and no sidecar metadata; the filename is the whole key.
//!
//! | Store | Directory | Written by |
//! |---|---|---|
//! | [`SourceStore`] | `storage.source_dir` | the upload endpoint |
//! | [`CacheStore`](crate::cache::CacheStore) | `storage.cache_dir` | the resize path |
//!
//! Missing files are reported as [`StoreError::NotFound`], every other
//! filesystem failure as [`StoreError::Storage`]. The split is decided here
//! from the [`io::ErrorKind`] so callers never have to inspect raw I/O errors.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use thiserror::Error;
use tokio::fs;

/// Distinguishes temp files of concurrent writes to the same name.
static WRITE_SEQ: AtomicU64 = AtomicU64::new(0);

/// Extensions listed by [`SourceStore::list_images`].
pub const LISTED_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp"];

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("{0} not found")]
    NotFound(String),
    #[error("Storage error on {path}: {source}")]
    Storage {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Errors that mean "no file can exist under this name".
///
/// A client-supplied name with a NUL byte or longer than the filesystem allows
/// can never match a stored file, so it is reported like any other miss.
fn is_absent(err: &io::Error) -> bool {
    matches!(
        err.kind(),
        io::ErrorKind::NotFound | io::ErrorKind::InvalidInput | io::ErrorKind::InvalidFilename
    )
}

impl StoreError {
    fn from_io(name: &str, path: &Path, err: io::Error) -> Self {
        if is_absent(&err) {
            StoreError::NotFound(name.to_string())
        } else {
            StoreError::Storage {
                path: path.to_path_buf(),
                source: err,
            }
        }
    }

    fn storage(path: &Path, err: io::Error) -> Self {
        StoreError::Storage {
            path: path.to_path_buf(),
            source: err,
        }
    }
}

/// A flat directory of files keyed by name.
///
/// Names must already be sanitized (single path segment); the store only
/// joins them onto its root.
#[derive(Debug, Clone)]
pub struct DirStore {
    root: PathBuf,
}

impl DirStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path_for(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    /// Create the directory if it doesn't exist yet.
    ///
    /// Succeeds when the directory already exists. Fails if the path exists
    /// but is not a directory, or on any other I/O error.
    pub async fn ensure_exists(&self) -> Result<(), StoreError> {
        match fs::metadata(&self.root).await {
            Ok(meta) if meta.is_dir() => Ok(()),
            Ok(_) => Err(StoreError::storage(
                &self.root,
                io::Error::new(io::ErrorKind::AlreadyExists, "not a directory"),
            )),
            Err(e) if e.kind() == io::ErrorKind::NotFound => fs::create_dir_all(&self.root)
                .await
                .map_err(|e| StoreError::storage(&self.root, e)),
            Err(e) => Err(StoreError::storage(&self.root, e)),
        }
    }

    /// Whether a regular file exists under `name`.
    pub async fn exists(&self, name: &str) -> Result<bool, StoreError> {
        let path = self.path_for(name);
        match fs::metadata(&path).await {
            Ok(meta) => Ok(meta.is_file()),
            Err(e) if is_absent(&e) => Ok(false),
            Err(e) => Err(StoreError::storage(&path, e)),
        }
    }

    pub async fn read(&self, name: &str) -> Result<Vec<u8>, StoreError> {
        let path = self.path_for(name);
        fs::read(&path)
            .await
            .map_err(|e| StoreError::from_io(name, &path, e))
    }

    /// Write `bytes` under `name`, replacing any existing file.
    ///
    /// The data lands in a hidden `.part` sibling first and is renamed into
    /// place, so readers see either the old file or the complete new one.
    /// Concurrent writers each get their own temp file; the last rename wins.
    /// The temp name doesn't embed `name`, so any name the filesystem accepts
    /// can be written.
    pub async fn write(&self, name: &str, bytes: &[u8]) -> Result<(), StoreError> {
        let path = self.path_for(name);
        let seq = WRITE_SEQ.fetch_add(1, Ordering::Relaxed);
        let tmp = self.path_for(&format!(".{}-{seq}.part", std::process::id()));
        if let Err(e) = fs::write(&tmp, bytes).await {
            return Err(StoreError::storage(&tmp, e));
        }
        if let Err(e) = fs::rename(&tmp, &path).await {
            let _ = fs::remove_file(&tmp).await;
            return Err(StoreError::storage(&path, e));
        }
        Ok(())
    }

    /// Names of the regular files in the directory.
    pub async fn file_names(&self) -> Result<Vec<String>, StoreError> {
        let mut entries = fs::read_dir(&self.root)
            .await
            .map_err(|e| StoreError::storage(&self.root, e))?;
        let mut names = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| StoreError::storage(&self.root, e))?
        {
            let is_file = entry
                .file_type()
                .await
                .map_err(|e| StoreError::storage(&entry.path(), e))?
                .is_file();
            if !is_file {
                continue;
            }
            if let Some(name) = entry.file_name().to_str() {
                names.push(name.to_string());
            }
        }
        Ok(names)
    }
}

/// Original uploaded images.
///
/// The resize path only reads from it; [`save`](Self::save) exists for the
/// upload endpoint.
#[derive(Debug, Clone)]
pub struct SourceStore {
    dir: DirStore,
}

impl SourceStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            dir: DirStore::new(root),
        }
    }

    pub fn root(&self) -> &Path {
        self.dir.root()
    }

    pub async fn ensure_exists(&self) -> Result<(), StoreError> {
        self.dir.ensure_exists().await
    }

    /// Read a source image. Missing files are [`StoreError::NotFound`].
    pub async fn get(&self, filename: &str) -> Result<Vec<u8>, StoreError> {
        self.dir.read(filename).await
    }

    /// Store an uploaded image, overwriting any file with the same name.
    pub async fn save(&self, filename: &str, bytes: &[u8]) -> Result<(), StoreError> {
        self.dir.ensure_exists().await?;
        self.dir.write(filename, bytes).await
    }

    /// Sorted names of the images in the store.
    ///
    /// Only files with an extension from [`LISTED_EXTENSIONS`] are returned,
    /// compared case-insensitively.
    pub async fn list_images(&self) -> Result<Vec<String>, StoreError> {
        self.dir.ensure_exists().await?;
        let mut names: Vec<String> = self
            .dir
            .file_names()
            .await?
            .into_iter()
            .filter(|name| has_listed_extension(name))
            .collect();
        names.sort();
        Ok(names)
    }
}

fn has_listed_extension(name: &str) -> bool {
    Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| {
            LISTED_EXTENSIONS
                .iter()
                .any(|listed| ext.eq_ignore_ascii_case(listed))
        })
}

//! Resized-variant cache.
//!
//! Decoding, resizing and re-encoding is the expensive part of a request.
//! This module lets the resize path skip it when the same (filename, width,
//! height) has been served before.
//!
//! # Design
//!
//! ## Cache keys
//!
//! The cache is **name-addressed**: an entry lives at
//! `<cache_dir>/{base}_{width}x{height}.{ext}` (see
//! [`CacheKey`](crate::naming::CacheKey)). The key says nothing about the
//! source's content or modification time, so replacing a source image under
//! the same name keeps serving the old variants. Delete the cache directory
//! to force regeneration.
//!
//! A cache hit requires only that the entry file exists. There is no
//! manifest: the directory listing is the index.
//!
//! ## Concurrency
//!
//! There is no locking between the existence probe and the write. Two
//! requests that miss on the same key at the same time both resize and both
//! write; the second rename replaces the first. Since the output is a
//! deterministic function of the source and the key, both writes carry the
//! same bytes and the race costs only duplicate work.
//!
//! ## Eviction
//!
//! None. Entries are never deleted by the service.

use crate::naming::CacheKey;
use crate::store::{DirStore, StoreError};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Directory of resized variants keyed by [`CacheKey`].
#[derive(Debug, Clone)]
pub struct CacheStore {
    dir: DirStore,
    stats: Arc<CacheStats>,
}

impl CacheStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            dir: DirStore::new(root),
            stats: Arc::new(CacheStats::default()),
        }
    }

    pub fn root(&self) -> &Path {
        self.dir.root()
    }

    pub fn stats(&self) -> &CacheStats {
        &self.stats
    }

    /// Create the cache directory if absent. Idempotent.
    pub async fn ensure_exists(&self) -> Result<(), StoreError> {
        self.dir.ensure_exists().await
    }

    /// Whether an entry for `key` is present.
    pub async fn exists(&self, key: &CacheKey) -> Result<bool, StoreError> {
        self.dir.exists(&key.to_string()).await
    }

    /// Read a cached entry. Missing entries are [`StoreError::NotFound`].
    pub async fn get(&self, key: &CacheKey) -> Result<Vec<u8>, StoreError> {
        self.dir.read(&key.to_string()).await
    }

    /// Store an entry, replacing whatever was there.
    pub async fn put(&self, key: &CacheKey, bytes: &[u8]) -> Result<(), StoreError> {
        self.dir.write(&key.to_string(), bytes).await
    }

    /// Look up `key`, counting the outcome in [`stats`](Self::stats).
    ///
    /// An entry that disappears between the probe and the read counts as a
    /// miss rather than an error.
    pub async fn lookup(&self, key: &CacheKey) -> Result<Option<Vec<u8>>, StoreError> {
        if !self.exists(key).await? {
            self.stats.miss();
            return Ok(None);
        }
        match self.get(key).await {
            Ok(bytes) => {
                self.stats.hit();
                Ok(Some(bytes))
            }
            Err(StoreError::NotFound(_)) => {
                self.stats.miss();
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }
}

/// Running totals of cache lookups since startup.
#[derive(Debug, Default)]
pub struct CacheStats {
    hits: AtomicU64,
    misses: AtomicU64,
}

impl CacheStats {
    pub fn hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    pub fn misses(&self) -> u64 {
        self.misses.load(Ordering::Relaxed)
    }

    pub fn total(&self) -> u64 {
        self.hits() + self.misses()
    }
}

impl fmt::Display for CacheStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (hits, misses) = (self.hits(), self.misses());
        if hits > 0 {
            write!(
                f,
                "{} cached, {} missed ({} total)",
                hits,
                misses,
                hits + misses
            )
        } else {
            write!(f, "{} missed", misses)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dimensions::TargetSize;
    use std::fs;
    use tempfile::TempDir;

    fn key(name: &str, width: u32, height: u32) -> CacheKey {
        CacheKey::derive(name, TargetSize { width, height })
    }

    // =========================================================================
    // CacheStore
    // =========================================================================

    #[tokio::test]
    async fn put_writes_file_named_by_key() {
        let tmp = TempDir::new().unwrap();
        let cache = CacheStore::new(tmp.path());
        cache.put(&key("photo.png", 150, 150), b"png").await.unwrap();
        assert_eq!(fs::read(tmp.path().join("photo_150x150.png")).unwrap(), b"png");
    }

    #[tokio::test]
    async fn exists_after_put() {
        let tmp = TempDir::new().unwrap();
        let cache = CacheStore::new(tmp.path());
        let k = key("cat.jpg", 300, 200);
        assert!(!cache.exists(&k).await.unwrap());
        cache.put(&k, b"data").await.unwrap();
        assert!(cache.exists(&k).await.unwrap());
    }

    #[tokio::test]
    async fn get_missing_is_not_found() {
        let tmp = TempDir::new().unwrap();
        let cache = CacheStore::new(tmp.path());
        assert!(matches!(
            cache.get(&key("cat.jpg", 1, 1)).await,
            Err(StoreError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn put_same_key_twice_is_idempotent() {
        let tmp = TempDir::new().unwrap();
        let cache = CacheStore::new(tmp.path());
        let k = key("cat.jpg", 10, 10);
        cache.put(&k, b"same").await.unwrap();
        cache.put(&k, b"same").await.unwrap();
        assert_eq!(cache.get(&k).await.unwrap(), b"same");
        assert_eq!(fs::read_dir(tmp.path()).unwrap().count(), 1);
    }

    #[tokio::test]
    async fn ensure_exists_creates_cache_dir() {
        let tmp = TempDir::new().unwrap();
        let cache = CacheStore::new(tmp.path().join("resized"));
        cache.ensure_exists().await.unwrap();
        cache.ensure_exists().await.unwrap();
        assert!(tmp.path().join("resized").is_dir());
    }

    #[tokio::test]
    async fn lookup_counts_hits_and_misses() {
        let tmp = TempDir::new().unwrap();
        let cache = CacheStore::new(tmp.path());
        let k = key("cat.jpg", 10, 10);

        assert_eq!(cache.lookup(&k).await.unwrap(), None);
        cache.put(&k, b"v").await.unwrap();
        assert_eq!(cache.lookup(&k).await.unwrap(), Some(b"v".to_vec()));

        assert_eq!(cache.stats().hits(), 1);
        assert_eq!(cache.stats().misses(), 1);
    }

    #[tokio::test]
    async fn clones_share_stats() {
        let tmp = TempDir::new().unwrap();
        let cache = CacheStore::new(tmp.path());
        let clone = cache.clone();
        clone.lookup(&key("a.jpg", 1, 1)).await.unwrap();
        assert_eq!(cache.stats().misses(), 1);
    }

    // =========================================================================
    // CacheStats
    // =========================================================================

    #[test]
    fn cache_stats_display_with_hits() {
        let s = CacheStats::default();
        for _ in 0..5 {
            s.hit();
        }
        s.miss();
        s.miss();
        assert_eq!(format!("{}", s), "5 cached, 2 missed (7 total)");
    }

    #[test]
    fn cache_stats_display_no_hits() {
        let s = CacheStats::default();
        for _ in 0..3 {
            s.miss();
        }
        assert_eq!(format!("{}", s), "3 missed");
        assert_eq!(s.total(), 3);
    }
}

//! # Resize Cache
//!
//! An HTTP service that serves resized variants of stored images. The first
//! request for a given filename and size decodes the original, resizes it and
//! writes the result to a cache directory; every later request for the same
//! variant is a plain file read.
//!
//! # Request Path
//!
//! ```text
//! GET /image/cat.jpg?width=300&height=200
//!   validate  → "cat.jpg", 300×200
//!   key       → cat_300x200.jpg
//!   cache     → public/resized-images/cat_300x200.jpg exists?  yes → serve it
//!   source    → public/images/cat.jpg                          no  → 404
//!   transform → decode, resize to exactly 300×200, encode JPEG q80
//!   persist   → write cat_300x200.jpg, then serve it
//! ```
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`service`] | The request path above: [`service::Resizer`] and its error taxonomy |
//! | [`server`] | axum router: resize, listing and upload endpoints, JSON error bodies |
//! | [`naming`] | Filename sanitizer and cache-key derivation (`{base}_{w}x{h}.{ext}`) |
//! | [`dimensions`] | Width/height query validation (integers in 1..=4000) |
//! | [`store`] | Flat-directory stores; the source store of originals |
//! | [`cache`] | The cache store of resized variants and its hit/miss counters |
//! | [`imaging`] | Pure-Rust decode, resize and encode behind the `ImageBackend` trait |
//! | [`upload`] | Upload acceptance rules (JPEG only, 5 MiB cap, sanitized names) |
//! | [`config`] | `resize-cache.toml` loading, merging over stock defaults, validation |
//!
//! # Design Decisions
//!
//! ## The Filename Is the Cache
//!
//! Cache entries are addressed purely by name. There is no index, no content
//! hash and no metadata sidecar: whether a variant exists is answered by the
//! filesystem. This keeps the cache inspectable with `ls` and disposable with
//! `rm -r`. The cost is that replacing a source image under the same name
//! keeps serving the old variants until the cache directory is cleared.
//!
//! ## Untrusted Names Never Leave Their Directory
//!
//! Every filename from a request is reduced to its final path segment by
//! [`naming::sanitize_filename`] before it is joined onto a store root.
//! `../../etc/passwd` becomes `passwd`, looked up inside the source store.
//!
//! ## CPU Work Off the Async Workers
//!
//! Decoding and resizing run on tokio's blocking pool behind a semaphore
//! sized by `processing.max_concurrent`. A burst of cache misses queues for
//! permits instead of starving the request-dispatch threads.
//!
//! ## Pure-Rust Imaging
//!
//! The [`imaging`] module uses the `image` crate (Lanczos3 resampling) for
//! every format it serves. No system libraries are linked, so the binary
//! runs anywhere it can be copied.

pub mod cache;
pub mod config;
pub mod dimensions;
pub mod imaging;
pub mod naming;
pub mod server;
pub mod service;
pub mod store;
pub mod upload;

#[cfg(test)]
pub(crate) mod test_helpers;

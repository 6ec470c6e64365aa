//! TTL response cache for the QC portal.
//!
//! This crate provides [`ResponseCache`], a process-wide key/value store that
//! maps a caller-chosen string key to a value plus an absolute expiry instant.
//! Reads within the TTL window are served from memory; expired or missing
//! entries are recomputed through a caller-supplied async loader.
//!
//! The cache is an explicitly constructed value, not a hidden singleton:
//! consumers receive it through shared state (typically an `Arc`), and tests
//! create isolated instances.
//!
//! # Example
//!
//! ```ignore
//! use qcportal_cache::ResponseCache;
//!
//! let cache: ResponseCache<String> = ResponseCache::new();
//!
//! // First call invokes the loader; the second is served from memory.
//! let value = cache
//!     .get("master/customers", || async { fetch_customers().await })
//!     .await?;
//! ```

mod store;

pub use store::{CacheStats, DEFAULT_TTL, ResponseCache};

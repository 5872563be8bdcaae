//! Open Graph metadata for external article cards.
//!
//! Resolution runs in three layers:
//!
//! | Layer | Role |
//! |-------|------|
//! | [`fetch`] | Outbound HTTP behind the [`PageFetcher`] trait |
//! | [`parse`] | `og:*` meta extraction with title/description fallbacks |
//! | [`cache`] | TTL-bounded in-memory store keyed by normalized URL |
//!
//! Callers go through [`OgpCache::resolve`]; a failed refresh never erases
//! a previously fetched snapshot.

pub mod cache;
pub mod fetch;
pub mod parse;

pub use cache::{normalize_url, OgpCache, DEFAULT_CAPACITY, DEFAULT_TTL_HOURS};
pub use fetch::{
    FetchError, FetchOptions, FetchedPage, HttpFetcher, PageFetcher, DEFAULT_MAX_BODY_KIB,
    DEFAULT_TIMEOUT_SECS, DEFAULT_USER_AGENT,
};
pub use parse::{parse_document, OgpRecord};

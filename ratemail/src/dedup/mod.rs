//! Deduplication cache
//!
//! Tracks which message fingerprints were sent recently so that repeat sends
//! inside the expiry window can be suppressed:
//! - **Store**: fingerprint → first-seen instant behind one lock
//! - **Sweeper**: background task removing expired entries, periodically or
//!   once, cancelled on shutdown or drop
//!
//! Per fingerprint the cache only ever moves `Unseen → Cached` (after a
//! successful send) and `Cached → Unseen` (once the window has elapsed).
//! Failed sends leave the fingerprint unseen.

mod cache;
mod cancellation;
mod store;
mod sweeper;

pub use cache::DedupCache;
pub use store::DedupStats;

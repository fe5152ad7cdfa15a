//! Fingerprint store shared between the cache and its sweeper

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use parking_lot::Mutex;
use serde::Serialize;
use tokio::time::Instant;
use tracing::{debug, info};

use crate::fingerprint::Fingerprint;

/// Snapshot of cache activity
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DedupStats {
    /// Entries currently held (live or awaiting a sweep)
    pub entries: usize,

    /// Sends suppressed as duplicates
    pub suppressed: u64,

    /// Fingerprints committed after a successful send
    pub recorded: u64,

    /// Entries removed by sweeps
    pub swept: u64,
}

/// Fingerprint → first-seen map guarded by a single lock
///
/// The lock is never held across an `.await`.
#[derive(Debug)]
pub(crate) struct EntryStore {
    entries: Mutex<HashMap<Fingerprint, Instant>>,
    expiry: Duration,
    suppressed: AtomicU64,
    recorded: AtomicU64,
    swept: AtomicU64,
}

impl EntryStore {
    pub(crate) fn new(expiry: Duration) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            expiry,
            suppressed: AtomicU64::new(0),
            recorded: AtomicU64::new(0),
            swept: AtomicU64::new(0),
        }
    }

    fn is_live(&self, first_seen: Instant, now: Instant) -> bool {
        now.saturating_duration_since(first_seen) < self.expiry
    }

    pub(crate) fn should_send_at(&self, fingerprint: &Fingerprint, now: Instant) -> bool {
        !self
            .entries
            .lock()
            .get(fingerprint)
            .is_some_and(|&first_seen| self.is_live(first_seen, now))
    }

    pub(crate) fn note_suppressed(&self) {
        self.suppressed.fetch_add(1, Ordering::Relaxed);
    }

    /// Insert unless a live entry exists; an expired entry is replaced
    pub(crate) fn record_at(&self, fingerprint: Fingerprint, now: Instant) -> bool {
        let mut entries = self.entries.lock();

        if let Some(&first_seen) = entries.get(&fingerprint) {
            if self.is_live(first_seen, now) {
                return false;
            }
        }

        debug!(fingerprint = %fingerprint, "Recording fingerprint");
        entries.insert(fingerprint, now);
        drop(entries);

        self.recorded.fetch_add(1, Ordering::Relaxed);
        true
    }

    pub(crate) fn sweep_at(&self, now: Instant) -> usize {
        let mut entries = self.entries.lock();
        let before = entries.len();
        entries.retain(|_, first_seen| self.is_live(*first_seen, now));
        let removed = before - entries.len();
        let remaining = entries.len();
        drop(entries);

        self.swept.fetch_add(removed as u64, Ordering::Relaxed);

        if removed > 0 {
            info!(removed, remaining, "Swept expired fingerprints");
        } else {
            debug!(remaining, "Sweep found nothing to remove");
        }

        removed
    }

    pub(crate) fn first_seen(&self, fingerprint: &Fingerprint) -> Option<Instant> {
        self.entries.lock().get(fingerprint).copied()
    }

    pub(crate) fn clear(&self) -> usize {
        let mut entries = self.entries.lock();
        let cleared = entries.len();
        entries.clear();
        cleared
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub(crate) fn stats(&self) -> DedupStats {
        DedupStats {
            entries: self.len(),
            suppressed: self.suppressed.load(Ordering::Relaxed),
            recorded: self.recorded.load(Ordering::Relaxed),
            swept: self.swept.load(Ordering::Relaxed),
        }
    }
}

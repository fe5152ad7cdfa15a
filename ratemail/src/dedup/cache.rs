//! Shared dedup cache

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::{Mutex as AsyncMutex, MutexGuard as AsyncMutexGuard};
use tokio::time::Instant;
use tracing::{debug, info};

use super::store::{DedupStats, EntryStore};
use super::sweeper::Sweeper;
use crate::config::{DedupConfig, LockScope};
use crate::error::MailerError;
use crate::fingerprint::Fingerprint;

/// Time-bounded store of fingerprints that have already been sent
///
/// One cache is shared (via `Arc`) by every [`Mailer`] that should dedup
/// against the others. A fingerprint suppresses sends for the configured
/// expiry window after its first successful send; repeat attempts inside the
/// window never extend it.
///
/// # Examples
///
/// ```rust
/// use ratemail::dedup::DedupCache;
/// use ratemail::config::DedupConfig;
/// use ratemail::fingerprint::Fingerprint;
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), ratemail::error::MailerError> {
/// let cache = DedupCache::start(DedupConfig::default())?;
/// let key = Fingerprint::new(&["ops@example.com"], "Disk full", "at 10:15:32");
///
/// assert!(cache.should_send(&key));
/// cache.record(key.clone());
/// assert!(!cache.should_send(&key));
///
/// cache.shutdown().await;
/// # Ok(())
/// # }
/// ```
///
/// [`Mailer`]: crate::mailer::Mailer
#[derive(Debug)]
pub struct DedupCache {
    store: Arc<EntryStore>,
    config: DedupConfig,
    send_gate: AsyncMutex<()>,
    sweeper: Mutex<Option<Sweeper>>,
}

impl DedupCache {
    /// Create a cache and start its background sweeper
    ///
    /// # Errors
    ///
    /// Returns `MailerError::Config` if the configuration fails
    /// [`DedupConfig::validate`].
    ///
    /// # Panics
    ///
    /// Panics if called outside a Tokio runtime.
    pub fn start(config: DedupConfig) -> Result<Arc<Self>, MailerError> {
        config.validate()?;

        let store = Arc::new(EntryStore::new(config.expiry()));
        let sweeper = Sweeper::spawn(store.clone(), config.sweep_interval(), config.sweep_mode);

        Ok(Arc::new(Self {
            store,
            config,
            send_gate: AsyncMutex::new(()),
            sweeper: Mutex::new(Some(sweeper)),
        }))
    }

    /// Create a cache without a background sweeper
    ///
    /// Expired entries still stop suppressing sends, but are only removed by
    /// explicit [`DedupCache::sweep`] calls.
    ///
    /// # Errors
    ///
    /// Returns `MailerError::Config` if the configuration fails
    /// [`DedupConfig::validate`].
    pub fn manual(config: DedupConfig) -> Result<Arc<Self>, MailerError> {
        config.validate()?;

        Ok(Arc::new(Self {
            store: Arc::new(EntryStore::new(config.expiry())),
            config,
            send_gate: AsyncMutex::new(()),
            sweeper: Mutex::new(None),
        }))
    }

    /// Configuration this cache was built with
    #[must_use]
    pub const fn config(&self) -> &DedupConfig {
        &self.config
    }

    /// Fingerprint a message using this cache's normalization mode
    #[must_use]
    pub fn fingerprint<S: AsRef<str>>(
        &self,
        recipients: &[S],
        subject: &str,
        body: &str,
    ) -> Fingerprint {
        Fingerprint::build(self.config.normalization, recipients, subject, body)
    }

    /// Whether a message with this fingerprint should go out now
    ///
    /// Returns `false` while a live (unexpired) entry exists. This is a
    /// read-only query and does not count towards [`DedupStats::suppressed`].
    #[must_use]
    pub fn should_send(&self, fingerprint: &Fingerprint) -> bool {
        self.should_send_at(fingerprint, Instant::now())
    }

    /// [`DedupCache::should_send`] evaluated at an explicit instant
    #[must_use]
    pub fn should_send_at(&self, fingerprint: &Fingerprint, now: Instant) -> bool {
        self.store.should_send_at(fingerprint, now)
    }

    /// Commit a fingerprint as sent
    ///
    /// No-op (returns `false`) if a live entry already exists; the first-seen
    /// time is never refreshed.
    pub fn record(&self, fingerprint: Fingerprint) -> bool {
        self.record_at(fingerprint, Instant::now())
    }

    /// [`DedupCache::record`] at an explicit instant
    pub fn record_at(&self, fingerprint: Fingerprint, now: Instant) -> bool {
        self.store.record_at(fingerprint, now)
    }

    /// Count a send skipped because of a live entry
    pub(crate) fn note_suppressed(&self) {
        self.store.note_suppressed();
    }

    /// Remove every entry whose age has reached the expiry window
    ///
    /// Returns the number of entries removed.
    pub fn sweep(&self) -> usize {
        self.sweep_at(Instant::now())
    }

    /// [`DedupCache::sweep`] at an explicit instant
    pub fn sweep_at(&self, now: Instant) -> usize {
        self.store.sweep_at(now)
    }

    /// Drop every entry
    pub fn clear(&self) {
        let cleared = self.store.clear();
        info!(cleared, "Dedup cache cleared");
    }

    /// When a fingerprint was first committed, if it is still held
    #[must_use]
    pub fn first_seen(&self, fingerprint: &Fingerprint) -> Option<Instant> {
        self.store.first_seen(fingerprint)
    }

    /// Number of entries held, including expired ones awaiting a sweep
    #[must_use]
    pub fn len(&self) -> usize {
        self.store.len()
    }

    /// Whether the cache holds no entries
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Activity counters
    #[must_use]
    pub fn stats(&self) -> DedupStats {
        self.store.stats()
    }

    /// Whether the background sweeper is running
    #[must_use]
    pub fn is_sweeping(&self) -> bool {
        self.sweeper.lock().as_ref().is_some_and(Sweeper::is_running)
    }

    /// Acquire the send gate when configured for [`LockScope::WholeSend`]
    ///
    /// Returns `None` under [`LockScope::CacheOnly`].
    pub(crate) async fn send_gate(&self) -> Option<AsyncMutexGuard<'_, ()>> {
        match self.config.lock_scope {
            LockScope::WholeSend => Some(self.send_gate.lock().await),
            LockScope::CacheOnly => None,
        }
    }

    /// Stop the background sweeper and wait for it to exit
    ///
    /// Entries are kept; lookups keep honouring the expiry window.
    pub async fn shutdown(&self) {
        let sweeper = self.sweeper.lock().take();
        if let Some(sweeper) = sweeper {
            sweeper.shutdown().await;
            debug!("Dedup cache sweeper shut down");
        }
    }
}

impl Drop for DedupCache {
    fn drop(&mut self) {
        if let Some(sweeper) = self.sweeper.get_mut().as_ref() {
            sweeper.cancel();
        }
    }
}

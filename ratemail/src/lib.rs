//! ratemail: deduplicating email dispatch
//!
//! Wraps a mail transport and suppresses repeat sends of substantially
//! identical messages within an expiry window (24 hours by default).
//!
//! - **Fingerprints**: recipients, subject and body concatenated with
//!   wall-clock timestamps (`HH:MM:SS`) masked out
//! - **Dedup cache**: shared fingerprint store with a background sweeper
//! - **Mailer**: `send` (always dispatches) and `send_rate` (deduplicated)
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use ratemail::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     ratemail::observability::init()?;
//!
//!     // One cache shared by every mailer that should dedup together
//!     let cache = DedupCache::start(DedupConfig::default())?;
//!
//!     let mailer = Mailer::new(
//!         "smtp.example.com",
//!         587,
//!         "user",
//!         "secret",
//!         "alerts@example.com",
//!         cache.clone(),
//!     )?;
//!
//!     mailer.check_connectivity().await?;
//!
//!     let to = ["ops@example.com"];
//!     mailer
//!         .send_rate(&to, "Disk full", "text/plain", "Alert raised at 10:15:32")
//!         .await?;
//!
//!     // Suppressed: identical once the timestamp is masked
//!     let outcome = mailer
//!         .send_rate(&to, "Disk full", "text/plain", "Alert raised at 10:16:02")
//!         .await?;
//!     assert!(outcome.is_suppressed());
//!
//!     cache.shutdown().await;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod dedup;
pub mod error;
pub mod fingerprint;
pub mod mailer;
pub mod observability;
pub mod transport;

#[cfg(test)]
pub mod testing;

pub mod prelude {
    //! Convenience re-exports for common types and traits

    pub use crate::config::{DedupConfig, LockScope, RatemailConfig, SmtpConfig, SweepMode};
    pub use crate::dedup::{DedupCache, DedupStats};
    pub use crate::error::MailerError;
    pub use crate::fingerprint::{Fingerprint, Normalization};
    pub use crate::mailer::{Mailer, SendOutcome};
    pub use crate::transport::{
        ConsoleTransport, Message, SmtpTransport, Transport, TransportError,
    };
}

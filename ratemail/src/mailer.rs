//! Mailer facade
//!
//! [`Mailer::send`] always dispatches. [`Mailer::send_rate`] fingerprints the
//! message first and skips it when the shared [`DedupCache`] has seen the
//! same fingerprint inside the expiry window.
//!
//! A `send_rate` call either suppresses, succeeds (and records the
//! fingerprint), or fails with no effect on the cache. Failed sends are
//! always retryable.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::config::SmtpConfig;
use crate::dedup::DedupCache;
use crate::error::MailerError;
use crate::transport::{Message, SmtpTransport, Transport};

/// Result of a deduplicated send
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    /// The message was delivered and its fingerprint recorded
    Sent,

    /// An identical message went out inside the expiry window; nothing was sent
    Suppressed,
}

impl SendOutcome {
    /// Whether the transport was used
    #[must_use]
    pub const fn is_sent(self) -> bool {
        matches!(self, Self::Sent)
    }

    /// Whether the message was skipped as a duplicate
    #[must_use]
    pub const fn is_suppressed(self) -> bool {
        matches!(self, Self::Suppressed)
    }
}

/// Sends mail through a transport, optionally deduplicating
///
/// Several mailers may share one [`DedupCache`]; messages from different
/// mailers with the same fingerprint then suppress each other.
#[derive(Debug, Clone)]
pub struct Mailer<T = SmtpTransport> {
    transport: T,
    from: String,
    cache: Arc<DedupCache>,
}

impl Mailer<SmtpTransport> {
    /// Create an SMTP mailer
    ///
    /// Uses STARTTLS and a 60 second operation timeout. Does not connect;
    /// use [`Mailer::check_connectivity`] to validate the server up front.
    /// Must be called from within a Tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns `MailerError::Setup` if the SMTP relay cannot be configured.
    pub fn new(
        host: &str,
        port: u16,
        user: &str,
        pass: &str,
        from: &str,
        cache: Arc<DedupCache>,
    ) -> Result<Self, MailerError> {
        Self::from_config(&SmtpConfig::new(host, port, user, pass, from), cache)
    }

    /// Create an SMTP mailer from configuration
    ///
    /// # Errors
    ///
    /// Returns `MailerError::Setup` if the SMTP relay cannot be configured.
    pub fn from_config(config: &SmtpConfig, cache: Arc<DedupCache>) -> Result<Self, MailerError> {
        let transport = SmtpTransport::new(config).map_err(MailerError::Setup)?;
        Ok(Self::with_transport(transport, &config.from, cache))
    }
}

impl<T: Transport> Mailer<T> {
    /// Create a mailer over any transport
    #[must_use]
    pub fn with_transport(transport: T, from: &str, cache: Arc<DedupCache>) -> Self {
        Self {
            transport,
            from: from.to_string(),
            cache,
        }
    }

    /// Sender address used as the From header
    #[must_use]
    pub fn from_address(&self) -> &str {
        &self.from
    }

    /// The dedup cache this mailer consults
    #[must_use]
    pub const fn cache(&self) -> &Arc<DedupCache> {
        &self.cache
    }

    /// The underlying transport
    #[must_use]
    pub const fn transport(&self) -> &T {
        &self.transport
    }

    /// Open and immediately close a connection to the server
    ///
    /// # Errors
    ///
    /// Returns `MailerError::Connectivity` (labelled `Check`) if the dial fails.
    pub async fn check_connectivity(&self) -> Result<(), MailerError> {
        self.transport.dial().await.map_err(|e| {
            warn!(error = %e, "Connectivity check failed");
            MailerError::connectivity(e)
        })
    }

    /// Send a message unconditionally
    ///
    /// # Errors
    ///
    /// Returns `MailerError::Send` if the transport fails to dial or deliver.
    pub async fn send<S: AsRef<str>>(
        &self,
        to: &[S],
        subject: &str,
        body_type: &str,
        body: &str,
    ) -> Result<(), MailerError> {
        let message = Message::new(&self.from)
            .to_all(to)
            .subject(subject)
            .body(body_type, body);

        self.transport.send(message).await.map_err(|e| {
            warn!(error = %e, subject = %subject, "Send failed");
            MailerError::Send(e)
        })
    }

    /// Send a message unless an identical one went out recently
    ///
    /// The fingerprint is only recorded after the transport reports success,
    /// so a failed send can be retried immediately.
    ///
    /// # Errors
    ///
    /// Returns `MailerError::Send` if the transport fails to dial or deliver.
    /// Suppressed duplicates are not errors.
    pub async fn send_rate<S: AsRef<str>>(
        &self,
        to: &[S],
        subject: &str,
        body_type: &str,
        body: &str,
    ) -> Result<SendOutcome, MailerError> {
        let fingerprint = self.cache.fingerprint(to, subject, body);

        // Held until return under LockScope::WholeSend
        let _gate = self.cache.send_gate().await;

        if !self.cache.should_send(&fingerprint) {
            self.cache.note_suppressed();
            debug!(subject = %subject, "Suppressed duplicate message");
            return Ok(SendOutcome::Suppressed);
        }

        self.send(to, subject, body_type, body).await?;

        self.cache.record(fingerprint);
        info!(subject = %subject, recipients = to.len(), "Sent rate-limited message");

        Ok(SendOutcome::Sent)
    }
}

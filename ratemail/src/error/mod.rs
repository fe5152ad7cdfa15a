//! Error types and error handling

use thiserror::Error;

use crate::transport::TransportError;

/// Stage label attached to connectivity check failures
pub const CHECK_STAGE: &str = "Check";

/// Mailer error type
///
/// Suppressed duplicates are never errors; only transport and configuration
/// failures surface here. Nothing is retried internally.
#[derive(Debug, Error)]
pub enum MailerError {
    /// Dial failed during a connectivity check
    #[error("{stage}: {source}")]
    Connectivity {
        /// Operation that was running when the dial failed
        stage: &'static str,

        /// Underlying transport failure
        #[source]
        source: TransportError,
    },

    /// Dial or delivery failed while sending a message
    #[error(transparent)]
    Send(TransportError),

    /// Transport could not be set up
    #[error("transport setup failed: {0}")]
    Setup(#[source] TransportError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl MailerError {
    /// Wrap a dial failure from a connectivity check
    #[must_use]
    pub const fn connectivity(source: TransportError) -> Self {
        Self::Connectivity {
            stage: CHECK_STAGE,
            source,
        }
    }

    /// Create a configuration error from a string message
    #[must_use]
    pub fn config<T: Into<String>>(msg: T) -> Self {
        Self::Config(msg.into())
    }

    /// Whether this error came from a send attempt
    #[must_use]
    pub const fn is_send(&self) -> bool {
        matches!(self, Self::Send(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_connectivity_error_carries_stage_label() {
        let err = MailerError::connectivity(TransportError::dial("connection refused"));
        assert_eq!(err.to_string(), "Check: dial failed: connection refused");
        assert!(err.source().is_some());
    }

    #[test]
    fn test_send_error_is_verbatim() {
        let err = MailerError::Send(TransportError::send("550 mailbox unavailable"));
        assert_eq!(err.to_string(), "send failed: 550 mailbox unavailable");
        assert!(err.is_send());
    }

    #[test]
    fn test_config_error() {
        let err = MailerError::config("SMTP_HOST environment variable not set");
        assert!(err.to_string().contains("SMTP_HOST"));
        assert!(!err.is_send());
    }
}

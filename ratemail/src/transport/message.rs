//! Outgoing message
//!
//! A single-part message: sender, recipients, subject and one body with an
//! explicit content type. Built by the mailer and handed to a [`Transport`].
//!
//! [`Transport`]: super::Transport

use serde::{Deserialize, Serialize};

use super::TransportError;

/// An outgoing email
///
/// ```rust
/// use ratemail::transport::Message;
///
/// let message = Message::new("alerts@example.com")
///     .to("ops@example.com")
///     .subject("Disk full")
///     .body("text/plain", "Alert raised at 10:15:32");
///
/// assert!(message.validate().is_ok());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Sender (From)
    pub from: String,

    /// Recipients (To)
    pub to: Vec<String>,

    /// Subject line
    pub subject: String,

    /// MIME content type of the body, e.g. `text/plain` or `text/html`
    pub body_type: String,

    /// Body content
    pub body: String,
}

impl Message {
    /// Start a message from the given sender
    #[must_use]
    pub fn new(from: &str) -> Self {
        Self {
            from: from.to_string(),
            ..Self::default()
        }
    }

    /// Add a recipient
    #[must_use]
    pub fn to(mut self, address: &str) -> Self {
        self.to.push(address.to_string());
        self
    }

    /// Add several recipients, keeping their order
    #[must_use]
    pub fn to_all<S: AsRef<str>>(mut self, addresses: &[S]) -> Self {
        self.to
            .extend(addresses.iter().map(|address| address.as_ref().to_string()));
        self
    }

    /// Set the subject
    #[must_use]
    pub fn subject(mut self, subject: &str) -> Self {
        self.subject = subject.to_string();
        self
    }

    /// Set the body and its content type
    #[must_use]
    pub fn body(mut self, body_type: &str, body: &str) -> Self {
        self.body_type = body_type.to_string();
        self.body = body.to_string();
        self
    }

    /// Check that the message can be handed to a transport
    ///
    /// # Errors
    ///
    /// Returns `TransportError::InvalidMessage` if the sender, recipients or
    /// body type are missing.
    pub fn validate(&self) -> Result<(), TransportError> {
        if self.from.is_empty() {
            return Err(TransportError::InvalidMessage(
                "message must have a from address".to_string(),
            ));
        }

        if self.to.is_empty() {
            return Err(TransportError::InvalidMessage(
                "message must have at least one recipient".to_string(),
            ));
        }

        if self.body_type.is_empty() {
            return Err(TransportError::InvalidMessage(
                "message must have a body content type".to_string(),
            ));
        }

        Ok(())
    }
}

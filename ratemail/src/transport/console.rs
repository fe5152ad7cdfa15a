//! Console transport for development
//!
//! Logs messages instead of sending them.

use async_trait::async_trait;
use tracing::{debug, info};

use super::{Message, Transport, TransportError};

/// Console transport for development
///
/// Logs messages through `tracing` instead of delivering them. Useful when
/// no SMTP server is available.
///
/// # Examples
///
/// ```rust
/// use ratemail::transport::{ConsoleTransport, Message, Transport};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let transport = ConsoleTransport::new();
///
/// let message = Message::new("alerts@example.com")
///     .to("ops@example.com")
///     .subject("Hello!")
///     .body("text/plain", "Hello, World!");
///
/// transport.send(message).await?; // Logged, not sent
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct ConsoleTransport {
    /// Whether to log the message body
    verbose: bool,
}

impl ConsoleTransport {
    /// Create a new console transport
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a console transport that also logs message bodies
    #[must_use]
    pub const fn verbose() -> Self {
        Self { verbose: true }
    }
}

#[async_trait]
impl Transport for ConsoleTransport {
    async fn dial(&self) -> Result<(), TransportError> {
        debug!("Console transport is always reachable");
        Ok(())
    }

    async fn send(&self, message: Message) -> Result<(), TransportError> {
        message.validate()?;

        info!(
            from = %message.from,
            to = ?message.to,
            subject = %message.subject,
            body_type = %message.body_type,
            "Console email sent"
        );

        if self.verbose {
            debug!(body = %message.body, "Email body");
        }

        Ok(())
    }
}

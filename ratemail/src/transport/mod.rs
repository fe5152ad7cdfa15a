//! Mail transports
//!
//! The transport is the collaborator that actually talks to a mail server.
//! Everything protocol related (dialing, authentication, SMTP) lives behind
//! the [`Transport`] trait:
//! - **SMTP**: `lettre`-backed transport for production
//! - **Console**: logs messages instead of sending them (development)

mod console;
mod error;
mod message;
mod smtp;

pub use console::ConsoleTransport;
pub use error::TransportError;
pub use message::Message;
pub use smtp::SmtpTransport;

use async_trait::async_trait;

/// Trait for delivering messages to a mail server
///
/// Implemented by all transports (SMTP, console, test doubles).
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Transport: Send + Sync {
    /// Open a connection and close it again
    ///
    /// Validates reachability and credentials without sending anything.
    ///
    /// # Errors
    ///
    /// Returns `TransportError::Dial` if the server cannot be reached or
    /// rejects the credentials.
    async fn dial(&self) -> Result<(), TransportError>;

    /// Dial and deliver a single message
    ///
    /// # Errors
    ///
    /// Returns `TransportError` if the message is invalid, the server cannot
    /// be reached, or delivery is rejected.
    async fn send(&self, message: Message) -> Result<(), TransportError>;
}

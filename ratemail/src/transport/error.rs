//! Transport error types

use thiserror::Error;

/// Errors raised by a mail transport
#[derive(Debug, Error)]
pub enum TransportError {
    /// Could not open (or authenticate) a connection to the server
    #[error("dial failed: {0}")]
    Dial(String),

    /// The server rejected the message or the connection dropped mid-send
    #[error("send failed: {0}")]
    Send(String),

    /// Address could not be parsed as a mailbox
    #[error("invalid email address: {0}")]
    InvalidAddress(String),

    /// Message could not be assembled (bad content type, no recipients, ...)
    #[error("invalid message: {0}")]
    InvalidMessage(String),

    /// Transport configuration is unusable
    #[error("transport configuration error: {0}")]
    Config(String),
}

impl TransportError {
    /// Create a dial error from a string message
    #[must_use]
    pub fn dial<T: Into<String>>(msg: T) -> Self {
        Self::Dial(msg.into())
    }

    /// Create a send error from a string message
    #[must_use]
    pub fn send<T: Into<String>>(msg: T) -> Self {
        Self::Send(msg.into())
    }

    /// Create a configuration error from a string message
    #[must_use]
    pub fn config<T: Into<String>>(msg: T) -> Self {
        Self::Config(msg.into())
    }
}

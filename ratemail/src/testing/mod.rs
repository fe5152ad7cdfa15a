//! Testing utilities
//!
//! Provides a recording transport for exercising the mailer without a server.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::transport::{Message, Transport, TransportError};

/// Recording transport for testing
///
/// Captures delivered messages in memory. Failures can be queued so that the
/// next sends (or dials) fail, and an artificial delivery delay can be set to
/// make sends overlap.
#[derive(Debug, Clone, Default)]
pub struct RecordingTransport {
    sent: Arc<Mutex<Vec<Message>>>,
    attempts: Arc<Mutex<usize>>,
    send_failures: Arc<Mutex<VecDeque<TransportError>>>,
    dial_failures: Arc<Mutex<VecDeque<TransportError>>>,
    delay: Option<Duration>,
}

impl RecordingTransport {
    /// Create a new recording transport
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Delay every delivery by `delay`
    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Make the next send fail with `error`
    pub fn fail_next_send(&self, error: TransportError) {
        self.send_failures.lock().push_back(error);
    }

    /// Make the next dial fail with `error`
    pub fn fail_next_dial(&self, error: TransportError) {
        self.dial_failures.lock().push_back(error);
    }

    /// Number of send attempts, successful or not
    #[must_use]
    pub fn attempts(&self) -> usize {
        *self.attempts.lock()
    }

    /// Number of messages delivered
    #[must_use]
    pub fn sent_count(&self) -> usize {
        self.sent.lock().len()
    }

    /// All delivered messages
    #[must_use]
    pub fn sent_messages(&self) -> Vec<Message> {
        self.sent.lock().clone()
    }

    /// The last delivered message
    #[must_use]
    pub fn last_sent(&self) -> Option<Message> {
        self.sent.lock().last().cloned()
    }
}

#[async_trait]
impl Transport for RecordingTransport {
    async fn dial(&self) -> Result<(), TransportError> {
        self.dial_failures.lock().pop_front().map_or(Ok(()), Err)
    }

    async fn send(&self, message: Message) -> Result<(), TransportError> {
        *self.attempts.lock() += 1;

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let failure = self.send_failures.lock().pop_front();
        if let Some(error) = failure {
            return Err(error);
        }

        message.validate()?;
        self.sent.lock().push(message);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(subject: &str) -> Message {
        Message::new("alerts@example.com")
            .to("ops@example.com")
            .subject(subject)
            .body("text/plain", "Hello")
    }

    #[tokio::test]
    async fn test_recording_transport_records() {
        let transport = RecordingTransport::new();

        transport.send(message("First")).await.unwrap();
        transport.send(message("Second")).await.unwrap();

        assert_eq!(transport.sent_count(), 2);
        assert_eq!(transport.attempts(), 2);
        assert_eq!(transport.last_sent().unwrap().subject, "Second");
    }

    #[tokio::test]
    async fn test_recording_transport_queued_failure() {
        let transport = RecordingTransport::new();
        transport.fail_next_send(TransportError::send("boom"));

        assert!(transport.send(message("First")).await.is_err());
        assert!(transport.send(message("Second")).await.is_ok());
        assert_eq!(transport.attempts(), 2);
        assert_eq!(transport.sent_count(), 1);
    }

    #[tokio::test]
    async fn test_recording_transport_dial_failure() {
        let transport = RecordingTransport::new();
        transport.fail_next_dial(TransportError::dial("refused"));

        assert!(transport.dial().await.is_err());
        assert!(transport.dial().await.is_ok());
    }
}

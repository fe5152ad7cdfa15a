//! SMTP transport
//!
//! Uses the `lettre` crate to dial SMTP servers and deliver messages.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use lettre::{
    message::{header::ContentType, Mailbox},
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message as LettreMessage, Tokio1Executor,
};
use tracing::debug;

use super::{Message, Transport, TransportError};
use crate::config::SmtpConfig;

/// SMTP transport
///
/// Building the transport never connects. Each [`Transport::send`] dials,
/// authenticates and delivers, bounded by the configured operation timeout
/// (60 seconds by default).
///
/// Must be created from within a Tokio runtime.
///
/// # Examples
///
/// ```rust,no_run
/// use ratemail::config::SmtpConfig;
/// use ratemail::transport::{Message, SmtpTransport, Transport};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let transport = SmtpTransport::new(&SmtpConfig::from_env()?)?;
///
/// let message = Message::new("alerts@example.com")
///     .to("ops@example.com")
///     .subject("Hello!")
///     .body("text/plain", "Hello, World!");
///
/// transport.send(message).await?;
/// # Ok(())
/// # }
/// ```
pub struct SmtpTransport {
    inner: AsyncSmtpTransport<Tokio1Executor>,
    host: String,
    port: u16,
    timeout: Duration,
}

impl SmtpTransport {
    /// Create an SMTP transport from configuration
    ///
    /// # Errors
    ///
    /// Returns `TransportError::Config` if the relay cannot be configured
    /// (for example, TLS parameters for the host are invalid).
    pub fn new(config: &SmtpConfig) -> Result<Self, TransportError> {
        let credentials = Credentials::new(config.username.clone(), config.password.clone());
        let timeout = config.timeout();

        let builder = if config.use_tls {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)
                .map_err(|e| TransportError::config(e.to_string()))?
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&config.host)
        };

        let inner = builder
            .port(config.port)
            .credentials(credentials)
            .timeout(Some(timeout))
            .build();

        Ok(Self {
            inner,
            host: config.host.clone(),
            port: config.port,
            timeout,
        })
    }

    /// Operation timeout applied to dial and send
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Build a lettre message
    fn build_message(message: &Message) -> Result<LettreMessage, TransportError> {
        message.validate()?;

        let from: Mailbox = message
            .from
            .parse()
            .map_err(|_| TransportError::InvalidAddress(message.from.clone()))?;

        let mut builder = LettreMessage::builder().from(from);

        for to_addr in &message.to {
            let to: Mailbox = to_addr
                .parse()
                .map_err(|_| TransportError::InvalidAddress(to_addr.clone()))?;
            builder = builder.to(to);
        }

        let content_type = ContentType::parse(&message.body_type).map_err(|_| {
            TransportError::InvalidMessage(format!("invalid content type: {}", message.body_type))
        })?;

        builder
            .subject(message.subject.clone())
            .header(content_type)
            .body(message.body.clone())
            .map_err(|e| TransportError::InvalidMessage(e.to_string()))
    }
}

impl fmt::Debug for SmtpTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SmtpTransport")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl Transport for SmtpTransport {
    async fn dial(&self) -> Result<(), TransportError> {
        debug!(host = %self.host, port = self.port, "Dialing SMTP server");

        let accepted = self
            .inner
            .test_connection()
            .await
            .map_err(|e| TransportError::dial(e.to_string()))?;

        if accepted {
            Ok(())
        } else {
            Err(TransportError::dial(format!(
                "{}:{} did not accept the connection",
                self.host, self.port
            )))
        }
    }

    async fn send(&self, message: Message) -> Result<(), TransportError> {
        let email = Self::build_message(&message)?;

        debug!(
            host = %self.host,
            port = self.port,
            to = ?message.to,
            "Sending message over SMTP"
        );

        self.inner
            .send(email)
            .await
            .map_err(|e| TransportError::send(e.to_string()))?;

        Ok(())
    }
}

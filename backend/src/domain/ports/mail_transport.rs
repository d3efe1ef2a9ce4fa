//! Driven port for outbound email delivery.

use async_trait::async_trait;

use crate::domain::OutboundEmail;

use super::define_port_error;

define_port_error! {
    /// Errors raised by mail transport adapters.
    pub enum MailTransportError {
        /// The relay could not be reached.
        Unavailable { message: String } => "mail relay unavailable: {message}",
        /// The relay refused the message.
        Rejected { status: u16, message: String } => "mail relay rejected message ({status}): {message}",
    }
}

/// Sends one email.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MailTransport: Send + Sync {
    /// Deliver `email`, resolving once the relay has accepted or refused it.
    async fn send(&self, email: &OutboundEmail) -> Result<(), MailTransportError>;
}

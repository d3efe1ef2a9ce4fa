//! Test doubles shared by unit and integration tests.
//!
//! Compiled for `cfg(test)` and for the `test-support` feature, which the
//! integration suites under `tests/` enable through the dev-dependency on
//! this crate.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Local, Utc};
use mockable::Clock;
use tokio::sync::Mutex;

use crate::domain::ports::{MailTransport, MailTransportError};
use crate::domain::{EmailAddress, OutboundEmail};

/// Clock frozen at one instant.
#[derive(Debug, Clone, Copy)]
pub struct FixtureClock {
    pub utc_now: DateTime<Utc>,
}

impl FixtureClock {
    pub fn at(utc_now: DateTime<Utc>) -> Self {
        Self { utc_now }
    }
}

impl Clock for FixtureClock {
    fn local(&self) -> DateTime<Local> {
        self.utc_now.with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        self.utc_now
    }
}

/// Transport that keeps every email it is asked to send.
///
/// Recipients listed with [`RecordingMailTransport::failing_for`] are
/// rejected instead of recorded.
#[derive(Debug, Default, Clone)]
pub struct RecordingMailTransport {
    sent: Arc<Mutex<Vec<OutboundEmail>>>,
    failing: Arc<HashSet<String>>,
}

impl RecordingMailTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject sends addressed to any of `recipients`.
    pub fn failing_for<I, S>(recipients: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            sent: Arc::default(),
            failing: Arc::new(recipients.into_iter().map(Into::into).collect()),
        }
    }

    /// Snapshot of the emails accepted so far.
    pub async fn sent(&self) -> Vec<OutboundEmail> {
        self.sent.lock().await.clone()
    }

    /// Emails accepted for `recipient`.
    pub async fn sent_to(&self, recipient: &EmailAddress) -> Vec<OutboundEmail> {
        self.sent
            .lock()
            .await
            .iter()
            .filter(|email| &email.to == recipient)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl MailTransport for RecordingMailTransport {
    async fn send(&self, email: &OutboundEmail) -> Result<(), MailTransportError> {
        if self.failing.contains(email.to.as_str()) {
            return Err(MailTransportError::unavailable(format!(
                "refusing to deliver to {}",
                email.to
            )));
        }
        self.sent.lock().await.push(email.clone());
        Ok(())
    }
}

/// Transport that fails every send.
#[derive(Debug, Default, Clone, Copy)]
pub struct FailingMailTransport;

#[async_trait]
impl MailTransport for FailingMailTransport {
    async fn send(&self, _email: &OutboundEmail) -> Result<(), MailTransportError> {
        Err(MailTransportError::unavailable("mail relay is down"))
    }
}

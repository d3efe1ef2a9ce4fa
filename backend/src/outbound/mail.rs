//! Mail transport adapters.
//!
//! [`HttpMailRelay`] posts each message as JSON to an HTTP relay (any
//! provider exposing a "send one email" endpoint). [`LogMailTransport`]
//! writes the message to the log and is wired when no relay is configured.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use serde::Serialize;
use tracing::info;
use zeroize::Zeroizing;

use crate::domain::ports::{MailTransport, MailTransportError};
use crate::domain::{EmailAddress, OutboundEmail};

/// Transport that only logs messages.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogMailTransport;

#[async_trait]
impl MailTransport for LogMailTransport {
    async fn send(&self, email: &OutboundEmail) -> Result<(), MailTransportError> {
        info!(
            to = %email.to,
            subject = %email.subject,
            body = %email.body,
            "mail relay not configured; logging email"
        );
        Ok(())
    }
}

#[derive(Debug, Serialize)]
struct RelayMessage<'a> {
    from: &'a str,
    to: &'a str,
    subject: &'a str,
    text: &'a str,
}

/// Transport posting `{from, to, subject, text}` to a relay endpoint.
pub struct HttpMailRelay {
    client: Client,
    endpoint: Url,
    from: EmailAddress,
    api_key: Option<Zeroizing<String>>,
}

impl HttpMailRelay {
    /// Build a relay client with an explicit request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(
        endpoint: Url,
        from: EmailAddress,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint,
            from,
            api_key: api_key.map(Zeroizing::new),
        })
    }
}

#[async_trait]
impl MailTransport for HttpMailRelay {
    async fn send(&self, email: &OutboundEmail) -> Result<(), MailTransportError> {
        let message = RelayMessage {
            from: self.from.as_str(),
            to: email.to.as_str(),
            subject: &email.subject,
            text: &email.body,
        };
        let mut request = self.client.post(self.endpoint.clone()).json(&message);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key.as_str());
        }

        let response = request
            .send()
            .await
            .map_err(|err| MailTransportError::unavailable(err.to_string()))?;
        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        let body = response.text().await.unwrap_or_default();
        Err(map_status_error(status, &body))
    }
}

fn map_status_error(status: StatusCode, body: &str) -> MailTransportError {
    const PREVIEW_CHAR_LIMIT: usize = 160;
    let preview: String = body.trim().chars().take(PREVIEW_CHAR_LIMIT).collect();
    let message = if preview.is_empty() {
        status
            .canonical_reason()
            .unwrap_or("relay returned an error")
            .to_owned()
    } else {
        preview
    };
    MailTransportError::rejected(status.as_u16(), message)
}

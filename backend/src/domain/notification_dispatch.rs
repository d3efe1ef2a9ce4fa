//! Notification dispatchers.
//!
//! [`MailNotificationDispatcher`] sends one email per recipient concurrently,
//! bounding each send with a timeout. [`BackgroundDispatcher`] hands any
//! dispatcher off to a spawned task so callers never wait on mail delivery.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures_util::future::join_all;
use tokio::time::timeout;
use tracing::{debug, warn};

use crate::domain::ports::{MailTransport, NotificationDispatcher};
use crate::domain::{DispatchReport, NotificationEvent, TraceId};

/// Dispatcher delivering events through a [`MailTransport`].
pub struct MailNotificationDispatcher<M: ?Sized> {
    transport: Arc<M>,
    send_timeout: Duration,
}

impl<M: ?Sized> MailNotificationDispatcher<M> {
    /// Create a dispatcher bounding each send by `send_timeout`.
    pub fn new(transport: Arc<M>, send_timeout: Duration) -> Self {
        Self {
            transport,
            send_timeout,
        }
    }
}

#[async_trait]
impl<M> NotificationDispatcher for MailNotificationDispatcher<M>
where
    M: MailTransport + ?Sized + 'static,
{
    async fn dispatch(&self, event: NotificationEvent) -> DispatchReport {
        let kind = event.kind();
        let sends = event.emails().into_iter().map(|email| async move {
            let outcome = timeout(self.send_timeout, self.transport.send(&email)).await;
            (email.to, outcome)
        });

        let mut report = DispatchReport::default();
        for (recipient, outcome) in join_all(sends).await {
            match outcome {
                Ok(Ok(())) => {
                    debug!(event = kind, %recipient, "notification delivered");
                    report.record_delivered(recipient);
                }
                Ok(Err(err)) => {
                    warn!(event = kind, %recipient, error = %err, "notification delivery failed");
                    report.record_failed(recipient);
                }
                Err(_) => {
                    warn!(
                        event = kind,
                        %recipient,
                        timeout_ms = self.send_timeout.as_millis(),
                        "notification delivery timed out"
                    );
                    report.record_failed(recipient);
                }
            }
        }
        report
    }
}

/// Dispatcher that runs another dispatcher on a spawned task.
///
/// The current [`TraceId`] is carried into the task so delivery logs stay
/// correlated with the request that caused them.
pub struct BackgroundDispatcher<D: ?Sized> {
    inner: Arc<D>,
}

impl<D: ?Sized> BackgroundDispatcher<D> {
    /// Wrap `inner`.
    pub fn new(inner: Arc<D>) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl<D> NotificationDispatcher for BackgroundDispatcher<D>
where
    D: NotificationDispatcher + ?Sized + 'static,
{
    async fn dispatch(&self, event: NotificationEvent) -> DispatchReport {
        let inner = Arc::clone(&self.inner);
        TraceId::spawn(async move {
            inner.dispatch(event).await;
        });
        DispatchReport::deferred()
    }
}

#[cfg(test)]
#[path = "notification_dispatch_tests.rs"]
mod tests;

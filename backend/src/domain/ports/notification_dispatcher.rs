//! Port for announcing domain events by email.
//!
//! Dispatchers never fail: per-recipient problems are logged and reported in
//! the returned [`DispatchReport`].

use async_trait::async_trait;

use crate::domain::{DispatchReport, NotificationEvent};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NotificationDispatcher: Send + Sync {
    /// Attempt delivery of `event` to each of its recipients.
    async fn dispatch(&self, event: NotificationEvent) -> DispatchReport;
}

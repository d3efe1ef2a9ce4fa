//! Approval request lifecycle service.
//!
//! Implements [`RequestLifecycle`] on top of a [`RequestRepository`]. Each
//! write is fully persisted before its notification is dispatched, and the
//! dispatch outcome never changes the result returned to the caller.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use serde_json::json;
use tracing::{error, info, warn};

use crate::domain::ports::{
    NotificationDispatcher, RequestLifecycle, RequestRepository, RequestRepositoryError,
};
use crate::domain::{
    ApprovalRequest, Error, NewApprovalRequest, NotificationEvent, RequestFilter, RequestId,
    StatusDecision,
};

/// Request lifecycle service implementing the driving port.
#[derive(Clone)]
pub struct RequestLifecycleService<R> {
    requests: Arc<R>,
    dispatcher: Arc<dyn NotificationDispatcher>,
    clock: Arc<dyn Clock>,
}

impl<R> RequestLifecycleService<R> {
    /// Create a new service.
    ///
    /// ```rust,no_run
    /// # use std::sync::Arc;
    /// # use approvals::domain::RequestLifecycleService;
    /// # use approvals::outbound::memory::InMemoryRequestRepository;
    /// # use approvals::outbound::mail::LogMailTransport;
    /// # use approvals::domain::MailNotificationDispatcher;
    /// # use mockable::DefaultClock;
    /// # use std::time::Duration;
    /// let dispatcher = MailNotificationDispatcher::new(
    ///     Arc::new(LogMailTransport),
    ///     Duration::from_secs(3),
    /// );
    /// let service = RequestLifecycleService::new(
    ///     Arc::new(InMemoryRequestRepository::default()),
    ///     Arc::new(dispatcher),
    ///     Arc::new(DefaultClock),
    /// );
    /// # let _ = service;
    /// ```
    pub fn new(
        requests: Arc<R>,
        dispatcher: Arc<dyn NotificationDispatcher>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            requests,
            dispatcher,
            clock,
        }
    }
}

impl<R> RequestLifecycleService<R>
where
    R: RequestRepository,
{
    fn map_repository_error(err: RequestRepositoryError) -> Error {
        match err {
            RequestRepositoryError::Connection { message } => {
                error!(%message, "request store unreachable");
                Error::service_unavailable("request store is unavailable")
            }
            RequestRepositoryError::Query { message } => {
                error!(%message, "request store query failed");
                Error::internal(format!("request repository error: {message}"))
            }
            RequestRepositoryError::NotFound { id } => {
                Error::not_found(format!("request {id} not found"))
            }
            RequestRepositoryError::AlreadyDecided { status } => Error::conflict(format!(
                "request has already been {}",
                status.as_str().to_ascii_lowercase()
            ))
            .with_details(json!({ "code": "already_decided", "status": status })),
        }
    }

    async fn announce(&self, event: NotificationEvent) {
        let kind = event.kind();
        let report = self.dispatcher.dispatch(event).await;
        if !report.failed().is_empty() {
            warn!(
                event = kind,
                failed = report.failed().len(),
                "notification delivery incomplete"
            );
        }
    }
}

#[async_trait]
impl<R> RequestLifecycle for RequestLifecycleService<R>
where
    R: RequestRepository,
{
    async fn create(&self, input: NewApprovalRequest) -> Result<ApprovalRequest, Error> {
        let request = ApprovalRequest::open(input, RequestId::random(), self.clock.utc());
        self.requests
            .insert(&request)
            .await
            .map_err(Self::map_repository_error)?;
        info!(request_id = %request.id(), "request created");

        self.announce(NotificationEvent::request_created(&request)).await;
        Ok(request)
    }

    async fn fetch_for_user(&self, filter: RequestFilter) -> Result<Vec<ApprovalRequest>, Error> {
        self.requests
            .list(&filter)
            .await
            .map_err(Self::map_repository_error)
    }

    async fn update_status(
        &self,
        id: RequestId,
        decision: StatusDecision,
    ) -> Result<ApprovalRequest, Error> {
        let request = self
            .requests
            .decide(&id, decision, self.clock.utc())
            .await
            .map_err(Self::map_repository_error)?;
        info!(request_id = %id, status = %request.status(), "request decided");

        self.announce(NotificationEvent::status_changed(&request)).await;
        Ok(request)
    }
}

#[cfg(test)]
#[path = "request_lifecycle_service_tests.rs"]
mod tests;

//! Driving port for the approval request lifecycle.
//!
//! Inbound adapters call this port to create, list and decide requests
//! without knowing how requests are stored or how notifications are sent.

use async_trait::async_trait;

use crate::domain::{
    ApprovalRequest, Error, NewApprovalRequest, RequestFilter, RequestId, StatusDecision,
};

/// Domain use-case port for approval requests.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RequestLifecycle: Send + Sync {
    /// Persist a new pending request and announce it to both parties.
    async fn create(&self, input: NewApprovalRequest) -> Result<ApprovalRequest, Error>;

    /// List the requests visible through `filter`.
    async fn fetch_for_user(&self, filter: RequestFilter) -> Result<Vec<ApprovalRequest>, Error>;

    /// Decide a pending request and announce the outcome to both parties.
    async fn update_status(
        &self,
        id: RequestId,
        decision: StatusDecision,
    ) -> Result<ApprovalRequest, Error>;
}

//! Port abstraction for approval request persistence adapters.
//!
//! Status changes go through [`RequestRepository::decide`], which adapters
//! must implement as a single conditional write so that two concurrent
//! decisions cannot both succeed.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{ApprovalRequest, RequestFilter, RequestId, RequestStatus, StatusDecision};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by request repository adapters.
    pub enum RequestRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "request repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "request repository query failed: {message}",
        /// No request exists with the identifier.
        NotFound { id: RequestId } => "request {id} not found",
        /// The request has already left the pending state.
        AlreadyDecided { status: RequestStatus } => "request has already been {status}",
    }
}

/// Storage for approval requests.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RequestRepository: Send + Sync {
    /// Persist a new request. Either the whole record is stored or nothing is.
    async fn insert(&self, request: &ApprovalRequest) -> Result<(), RequestRepositoryError>;

    /// List requests matching `filter`, newest first with ties broken by id.
    async fn list(
        &self,
        filter: &RequestFilter,
    ) -> Result<Vec<ApprovalRequest>, RequestRepositoryError>;

    /// Move a pending request to the decision's target status.
    ///
    /// Returns [`RequestRepositoryError::NotFound`] for unknown identifiers and
    /// [`RequestRepositoryError::AlreadyDecided`] when the request is no longer
    /// pending; neither case modifies the stored record.
    async fn decide(
        &self,
        id: &RequestId,
        decision: StatusDecision,
        decided_at: DateTime<Utc>,
    ) -> Result<ApprovalRequest, RequestRepositoryError>;
}

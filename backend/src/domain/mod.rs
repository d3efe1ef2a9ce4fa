//! Domain primitives, aggregates and services.
//!
//! Purpose: Define strongly typed domain entities used by the API and
//! persistence layers, the ports adapters plug into, and the services that
//! implement the driving ports. Keep types immutable and document invariants
//! and serialisation contracts (serde) in each type's Rustdoc.
//!
//! Public surface:
//! - Error (alias to `error::Error`): API error response payload.
//! - ApprovalRequest and its vocabulary (`RequestType`, `Urgency`,
//!   `RequestStatus`, `StatusDecision`, `RequestFilter`).
//! - User, EmailAddress and AccessToken: identity keyed by email.
//! - NotificationEvent and DispatchReport: email announcements.
//! - RequestLifecycleService, IdentityService and the notification
//!   dispatchers implementing the ports in [`ports`].

pub mod approval_request;
pub mod error;
pub mod identity;
pub mod identity_service;
pub mod notification;
pub mod notification_dispatch;
pub mod ports;
pub mod request_lifecycle_service;
pub mod trace_id;
pub mod user;

pub use self::approval_request::{
    AlreadyDecided, ApprovalRequest, ApprovalRequestDraft, ApprovalRequestParts,
    NewApprovalRequest, RequestFilter, RequestId, RequestStatus, RequestType,
    RequestValidationError, Role, StatusDecision, Urgency,
};
pub use self::error::{Error, ErrorCode, ErrorValidationError, TRACE_ID_HEADER};
pub use self::identity::{ExternalAssertion, LoginOutcome};
pub use self::identity_service::{IdentityService, IdentitySettings};
pub use self::notification::{DispatchReport, NotificationEvent, OutboundEmail};
pub use self::notification_dispatch::{BackgroundDispatcher, MailNotificationDispatcher};
pub use self::request_lifecycle_service::RequestLifecycleService;
pub use self::trace_id::TraceId;
pub use self::user::{AccessToken, EmailAddress, User, UserValidationError};


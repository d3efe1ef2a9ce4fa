//! Approval request backend.
//!
//! Employees file requests (leave, equipment, overtime) that a named approver
//! accepts or rejects; both parties are told by email. Users sign in through
//! Google, and the first login of the configured admin email is granted
//! approver rights.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
pub use domain::TraceId;
pub use middleware::{RateLimit, RateLimitRule, Trace};

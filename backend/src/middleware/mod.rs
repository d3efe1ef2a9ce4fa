//! Request middleware.
//!
//! [`Trace`] gives every request a trace id that handlers, error envelopes
//! and background notification tasks share. [`RateLimit`] throttles clients
//! per IP address.

pub mod rate_limit;
pub mod trace;

pub use rate_limit::{RateLimit, RateLimitRule};
pub use trace::Trace;

//! Driving port for login resolution and user lookup.

use async_trait::async_trait;

use crate::domain::{EmailAddress, Error, ExternalAssertion, LoginOutcome, User};

/// Domain use-case port for user identity.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait IdentityResolver: Send + Sync {
    /// Create or refresh the user named by `assertion` and issue a new token.
    async fn resolve_login(&self, assertion: ExternalAssertion) -> Result<LoginOutcome, Error>;

    /// Fetch a user by email, failing with `not_found` when absent.
    async fn lookup_by_email(&self, email: &EmailAddress) -> Result<User, Error>;

    /// Announce that `email` logged out.
    async fn logout(&self, email: &EmailAddress) -> Result<(), Error>;
}

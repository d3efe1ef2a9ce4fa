//! Values exchanged while resolving a login.

use super::user::User;

/// Identity asserted by the external provider after a successful handshake.
///
/// The email is optional because providers may omit it; resolution rejects
/// assertions without one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalAssertion {
    email: Option<String>,
}

impl ExternalAssertion {
    /// Wrap the provider's claim.
    pub fn new(email: Option<String>) -> Self {
        Self { email }
    }

    /// Asserted email, if any was supplied and it is not blank.
    pub fn email(&self) -> Option<&str> {
        self.email
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty())
    }
}

/// Result of resolving a login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginOutcome {
    /// The stored user, carrying the freshly issued token.
    pub user: User,
    /// Whether this login created the user.
    pub created: bool,
}

//! Port abstraction for user persistence adapters and their errors.
use async_trait::async_trait;

use crate::domain::{EmailAddress, User};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by user repository adapters.
    pub enum UserPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "user repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "user repository query failed: {message}",
        /// A user with this email already exists.
        Duplicate { email: String } => "user {email} already exists",
        /// No user exists with this email.
        NotFound { email: String } => "user {email} not found",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Fetch a user by email address.
    async fn find_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<User>, UserPersistenceError>;

    /// Insert a user created at first login.
    ///
    /// Fails with [`UserPersistenceError::Duplicate`] if the email is taken.
    async fn insert(&self, user: &User) -> Result<(), UserPersistenceError>;

    /// Store the user's new token and `updated_at`. Never touches `is_manager`.
    async fn update_token(&self, user: &User) -> Result<(), UserPersistenceError>;
}

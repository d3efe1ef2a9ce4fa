//! User identity model.
//!
//! Users are keyed by email address. They are created on their first
//! successful login, have their access token replaced on every later login,
//! and are never deleted.

use std::fmt;

use chrono::{DateTime, Utc};
use rand::RngCore;
use rand::rngs::OsRng;
use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

/// Number of random bytes backing an [`AccessToken`].
pub const ACCESS_TOKEN_BYTES: usize = 32;

/// Validation errors returned by the user constructors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UserValidationError {
    /// The email address was missing or blank.
    #[error("email must not be empty")]
    EmptyEmail,
    /// The access token was blank.
    #[error("access token must not be empty")]
    EmptyToken,
}

/// Email address used as the user key and as a notification recipient.
///
/// Any non-blank string is accepted. It is stored once surrounding
/// whitespace is trimmed, and comparisons are case-sensitive.
///
/// # Examples
/// ```
/// use approvals::domain::EmailAddress;
///
/// let email = EmailAddress::new(" ada@example.com ").unwrap();
/// assert_eq!(email.as_str(), "ada@example.com");
/// assert_eq!(EmailAddress::new("alice").unwrap().as_str(), "alice");
/// assert!(EmailAddress::new("   ").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Validate and construct an [`EmailAddress`].
    pub fn new(raw: impl AsRef<str>) -> Result<Self, UserValidationError> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            return Err(UserValidationError::EmptyEmail);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Address as stored.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl AsRef<str> for EmailAddress {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<EmailAddress> for String {
    fn from(value: EmailAddress) -> Self {
        value.0
    }
}

impl TryFrom<String> for EmailAddress {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Opaque bearer credential issued at login.
///
/// The secret is zeroized on drop and never printed by `Debug`.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(Zeroizing<String>);

impl AccessToken {
    /// Issue a fresh random token.
    pub fn issue() -> Self {
        let mut bytes = Zeroizing::new([0_u8; ACCESS_TOKEN_BYTES]);
        OsRng.fill_bytes(&mut *bytes);
        Self(Zeroizing::new(hex::encode(bytes.as_slice())))
    }

    /// Wrap a token read back from storage.
    pub fn from_stored(raw: impl Into<String>) -> Result<Self, UserValidationError> {
        let raw = raw.into();
        if raw.trim().is_empty() {
            return Err(UserValidationError::EmptyToken);
        }
        Ok(Self(Zeroizing::new(raw)))
    }

    /// Expose the secret for persistence or hand-off to the front end.
    pub fn expose(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken(<redacted>)")
    }
}

/// Application user.
///
/// ## Invariants
/// - `is_manager` is decided once, when the user is first created, and is
///   never recomputed afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    email: EmailAddress,
    token: AccessToken,
    is_manager: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl User {
    /// Build a user signing in for the first time.
    pub fn first_login(
        email: EmailAddress,
        token: AccessToken,
        is_manager: bool,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            email,
            token,
            is_manager,
            created_at: now,
            updated_at: now,
        }
    }

    /// Rebuild a user from stored fields.
    pub fn from_parts(
        email: EmailAddress,
        token: AccessToken,
        is_manager: bool,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            email,
            token,
            is_manager,
            created_at,
            updated_at,
        }
    }

    /// Replace the access token after a repeat login. `is_manager` is kept.
    #[must_use]
    pub fn with_refreshed_token(mut self, token: AccessToken, now: DateTime<Utc>) -> Self {
        self.token = token;
        self.updated_at = now;
        self
    }

    /// Email address keying this user.
    pub fn email(&self) -> &EmailAddress {
        &self.email
    }

    /// Current access token.
    pub fn token(&self) -> &AccessToken {
        &self.token
    }

    /// Whether the user holds approver privileges.
    pub fn is_manager(&self) -> bool {
        self.is_manager
    }

    /// When the user first logged in.
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// When the user record last changed.
    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}

//! Identity resolution service.
//!
//! Implements [`IdentityResolver`]: the first login for an email creates the
//! user and decides `is_manager`; later logins only replace the token.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::{error, info};

use crate::domain::ports::{
    IdentityResolver, NotificationDispatcher, UserPersistenceError, UserRepository,
};
use crate::domain::{
    AccessToken, EmailAddress, Error, ExternalAssertion, LoginOutcome, NotificationEvent, User,
};

/// Settings consumed by [`IdentityService`].
#[derive(Debug, Clone, Default)]
pub struct IdentitySettings {
    /// Email granted approver privileges when it first logs in.
    pub admin_email: Option<EmailAddress>,
}

/// Identity service implementing the driving port.
#[derive(Clone)]
pub struct IdentityService<U> {
    users: Arc<U>,
    dispatcher: Arc<dyn NotificationDispatcher>,
    clock: Arc<dyn Clock>,
    settings: IdentitySettings,
}

impl<U> IdentityService<U> {
    /// Create a new service.
    pub fn new(
        users: Arc<U>,
        dispatcher: Arc<dyn NotificationDispatcher>,
        clock: Arc<dyn Clock>,
        settings: IdentitySettings,
    ) -> Self {
        Self {
            users,
            dispatcher,
            clock,
            settings,
        }
    }
}

impl<U> IdentityService<U>
where
    U: UserRepository,
{
    fn map_user_error(err: UserPersistenceError) -> Error {
        match err {
            UserPersistenceError::Connection { message } => {
                error!(%message, "user store unreachable");
                Error::service_unavailable("user store is unavailable")
            }
            UserPersistenceError::Query { message } => {
                error!(%message, "user store query failed");
                Error::internal(format!("user repository error: {message}"))
            }
            UserPersistenceError::Duplicate { email } => {
                Error::internal(format!("user {email} was created concurrently"))
            }
            UserPersistenceError::NotFound { .. } => Error::not_found("User not found"),
        }
    }

    fn is_admin(&self, email: &EmailAddress) -> bool {
        self.settings.admin_email.as_ref() == Some(email)
    }

    async fn refresh(&self, existing: User, token: AccessToken) -> Result<User, Error> {
        let refreshed = existing.with_refreshed_token(token, self.clock.utc());
        self.users
            .update_token(&refreshed)
            .await
            .map_err(Self::map_user_error)?;
        Ok(refreshed)
    }

    async fn create_or_refresh(
        &self,
        email: EmailAddress,
        token: AccessToken,
    ) -> Result<LoginOutcome, Error> {
        if let Some(existing) = self
            .users
            .find_by_email(&email)
            .await
            .map_err(Self::map_user_error)?
        {
            let user = self.refresh(existing, token).await?;
            return Ok(LoginOutcome {
                user,
                created: false,
            });
        }

        let is_manager = self.is_admin(&email);
        let user = User::first_login(email, token.clone(), is_manager, self.clock.utc());
        match self.users.insert(&user).await {
            Ok(()) => Ok(LoginOutcome {
                user,
                created: true,
            }),
            Err(UserPersistenceError::Duplicate { .. }) => {
                // A concurrent first login won the insert; refresh its record instead.
                let existing = self
                    .users
                    .find_by_email(user.email())
                    .await
                    .map_err(Self::map_user_error)?
                    .ok_or_else(|| Error::internal("user vanished after duplicate insert"))?;
                let user = self.refresh(existing, token).await?;
                Ok(LoginOutcome {
                    user,
                    created: false,
                })
            }
            Err(err) => Err(Self::map_user_error(err)),
        }
    }
}

#[async_trait]
impl<U> IdentityResolver for IdentityService<U>
where
    U: UserRepository,
{
    async fn resolve_login(&self, assertion: ExternalAssertion) -> Result<LoginOutcome, Error> {
        let raw = assertion
            .email()
            .ok_or_else(|| Error::unauthorized("identity provider did not supply an email"))?;
        let email = EmailAddress::new(raw).map_err(|err| {
            Error::unauthorized(format!("identity provider supplied an invalid email: {err}"))
        })?;

        let outcome = self.create_or_refresh(email, AccessToken::issue()).await?;
        info!(
            email = %outcome.user.email(),
            created = outcome.created,
            is_manager = outcome.user.is_manager(),
            "login resolved"
        );

        self.dispatcher
            .dispatch(NotificationEvent::Login {
                email: outcome.user.email().clone(),
            })
            .await;
        Ok(outcome)
    }

    async fn lookup_by_email(&self, email: &EmailAddress) -> Result<User, Error> {
        self.users
            .find_by_email(email)
            .await
            .map_err(Self::map_user_error)?
            .ok_or_else(|| Error::not_found("User not found"))
    }

    async fn logout(&self, email: &EmailAddress) -> Result<(), Error> {
        info!(%email, "logout");
        self.dispatcher
            .dispatch(NotificationEvent::Logout {
                email: email.clone(),
            })
            .await;
        Ok(())
    }
}

#[cfg(test)]
#[path = "identity_service_tests.rs"]
mod tests;

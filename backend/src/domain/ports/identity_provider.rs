//! Driven port for the third-party identity provider handshake.
//!
//! The provider turns an authorisation code into an [`ExternalAssertion`].
//! Everything after that (user records, tokens, notifications) is handled by
//! the [`IdentityResolver`](super::IdentityResolver).

use async_trait::async_trait;
use url::Url;

use crate::domain::ExternalAssertion;

use super::define_port_error;

define_port_error! {
    /// Errors raised by identity provider adapters.
    pub enum IdentityProviderError {
        /// The provider refused the code or the user denied consent.
        Denied { message: String } => "identity provider denied the login: {message}",
        /// The provider could not be reached.
        Unavailable { message: String } => "identity provider unavailable: {message}",
        /// The provider answered with something we could not read.
        InvalidResponse { message: String } => "identity provider returned an invalid response: {message}",
        /// Local provider settings are unusable.
        Misconfigured { message: String } => "identity provider is misconfigured: {message}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// URL the browser is sent to in order to start the login.
    fn authorization_url(&self) -> Result<Url, IdentityProviderError>;

    /// Exchange an authorisation code for the caller's asserted identity.
    async fn exchange(&self, code: &str) -> Result<ExternalAssertion, IdentityProviderError>;
}

/// Development identity provider that trusts the code as an email address.
///
/// `authorization_url` points straight back at the callback, so a browser
/// can complete a login with `.../auth/google/callback?code=ada@example.com`.
#[derive(Debug, Clone)]
pub struct FixtureIdentityProvider {
    callback_url: Url,
}

impl FixtureIdentityProvider {
    /// Build a fixture provider redirecting to `callback_url`.
    pub fn new(callback_url: Url) -> Self {
        Self { callback_url }
    }
}

#[async_trait]
impl IdentityProvider for FixtureIdentityProvider {
    fn authorization_url(&self) -> Result<Url, IdentityProviderError> {
        Ok(self.callback_url.clone())
    }

    async fn exchange(&self, code: &str) -> Result<ExternalAssertion, IdentityProviderError> {
        let code = code.trim();
        if code.is_empty() {
            return Err(IdentityProviderError::denied("empty authorisation code"));
        }
        Ok(ExternalAssertion::new(Some(code.to_owned())))
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;

    fn provider() -> FixtureIdentityProvider {
        let url = Url::parse("http://localhost:8080/auth/google/callback").expect("fixture url");
        FixtureIdentityProvider::new(url)
    }

    #[rstest]
    #[tokio::test]
    async fn fixture_provider_asserts_code_as_email() {
        let assertion = provider()
            .exchange(" ada@example.com ")
            .await
            .expect("assertion");
        assert_eq!(assertion.email(), Some("ada@example.com"));
    }

    #[rstest]
    #[tokio::test]
    async fn fixture_provider_denies_blank_code() {
        let err = provider().exchange("  ").await.expect_err("denied");
        assert!(matches!(err, IdentityProviderError::Denied { .. }));
    }

    #[rstest]
    fn fixture_provider_redirects_to_callback() {
        let url = provider().authorization_url().expect("url");
        assert_eq!(url.path(), "/auth/google/callback");
    }
}

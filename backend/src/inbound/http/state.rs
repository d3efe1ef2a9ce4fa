//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports (use-cases) and remain testable without I/O.

use std::sync::Arc;

use url::Url;

use crate::domain::ports::{
    IdentityProvider, IdentityResolver, NotificationDispatcher, RequestLifecycle,
};

/// Parameter object bundling all port implementations for HTTP handlers.
#[derive(Clone)]
pub struct HttpStatePorts {
    pub requests: Arc<dyn RequestLifecycle>,
    pub identity: Arc<dyn IdentityResolver>,
    pub identity_provider: Arc<dyn IdentityProvider>,
    /// Awaited dispatcher used by the `/notification` endpoints.
    pub notifications: Arc<dyn NotificationDispatcher>,
}

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub requests: Arc<dyn RequestLifecycle>,
    pub identity: Arc<dyn IdentityResolver>,
    pub identity_provider: Arc<dyn IdentityProvider>,
    pub notifications: Arc<dyn NotificationDispatcher>,
    /// Front-end origin users are redirected to after login.
    pub frontend_url: Url,
}

impl HttpState {
    /// Construct state from a ports bundle and the front-end origin.
    ///
    /// # Examples
    /// ```no_run
    /// use std::sync::Arc;
    /// use std::time::Duration;
    ///
    /// use approvals::domain::ports::FixtureIdentityProvider;
    /// use approvals::domain::{
    ///     IdentityService, IdentitySettings, MailNotificationDispatcher, RequestLifecycleService,
    /// };
    /// use approvals::inbound::http::state::{HttpState, HttpStatePorts};
    /// use approvals::outbound::mail::LogMailTransport;
    /// use approvals::outbound::memory::{InMemoryRequestRepository, InMemoryUserRepository};
    /// use mockable::DefaultClock;
    /// use url::Url;
    ///
    /// let dispatcher = Arc::new(MailNotificationDispatcher::new(
    ///     Arc::new(LogMailTransport),
    ///     Duration::from_secs(3),
    /// ));
    /// let ports = HttpStatePorts {
    ///     requests: Arc::new(RequestLifecycleService::new(
    ///         Arc::new(InMemoryRequestRepository::default()),
    ///         dispatcher.clone(),
    ///         Arc::new(DefaultClock),
    ///     )),
    ///     identity: Arc::new(IdentityService::new(
    ///         Arc::new(InMemoryUserRepository::default()),
    ///         dispatcher.clone(),
    ///         Arc::new(DefaultClock),
    ///         IdentitySettings::default(),
    ///     )),
    ///     identity_provider: Arc::new(FixtureIdentityProvider::new(
    ///         Url::parse("http://localhost:8080/auth/google/callback").unwrap(),
    ///     )),
    ///     notifications: dispatcher,
    /// };
    /// let state = HttpState::new(ports, Url::parse("http://localhost:3000").unwrap());
    /// let _requests = state.requests.clone();
    /// ```
    pub fn new(ports: HttpStatePorts, frontend_url: Url) -> Self {
        let HttpStatePorts {
            requests,
            identity,
            identity_provider,
            notifications,
        } = ports;
        Self {
            requests,
            identity,
            identity_provider,
            notifications,
            frontend_url,
        }
    }
}

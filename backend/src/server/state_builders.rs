//! Builders turning a [`ServerConfig`] into handler state.
//!
//! Each port picks its adapter here: Diesel or in-memory stores, relay or
//! log-only mail, Google or the fixture identity provider.

use std::sync::Arc;
use std::time::Duration;

use mockable::{Clock, DefaultClock};
use tracing::{info, warn};
use zeroize::Zeroizing;

use approvals::domain::ports::{
    FixtureIdentityProvider, IdentityProvider, IdentityResolver, MailTransport,
    NotificationDispatcher, RequestLifecycle,
};
use approvals::domain::{
    BackgroundDispatcher, IdentityService, IdentitySettings, MailNotificationDispatcher,
    RequestLifecycleService,
};
use approvals::inbound::http::state::{HttpState, HttpStatePorts};
use approvals::outbound::identity::{GoogleCredentials, GoogleEndpoints, GoogleIdentityProvider};
use approvals::outbound::mail::{HttpMailRelay, LogMailTransport};
use approvals::outbound::memory::{InMemoryRequestRepository, InMemoryUserRepository};
use approvals::outbound::persistence::{DieselRequestRepository, DieselUserRepository};

use super::config::{MailDelivery, ServerConfig};

const IDENTITY_PROVIDER_TIMEOUT: Duration = Duration::from_secs(10);

fn build_mail_transport(config: &ServerConfig) -> std::io::Result<Arc<dyn MailTransport>> {
    match &config.mail {
        MailDelivery::Relay {
            endpoint,
            from,
            api_key,
        } => {
            info!(%endpoint, "sending notifications through mail relay");
            let relay = HttpMailRelay::new(
                endpoint.clone(),
                from.clone(),
                api_key.clone(),
                config.notification_timeout,
            )
            .map_err(|err| std::io::Error::other(format!("mail relay client: {err}")))?;
            Ok(Arc::new(relay))
        }
        MailDelivery::Log => {
            info!("no mail relay configured; notifications are logged only");
            Ok(Arc::new(LogMailTransport))
        }
    }
}

fn build_identity_provider(config: &ServerConfig) -> std::io::Result<Arc<dyn IdentityProvider>> {
    let Some(google) = &config.google else {
        if !config.fixture_login {
            return Err(std::io::Error::other(
                "google credentials are required when fixture login is disabled",
            ));
        }
        warn!("google credentials absent; using fixture identity provider (dev only)");
        return Ok(Arc::new(FixtureIdentityProvider::new(
            config.callback_url.clone(),
        )));
    };
    let endpoints = GoogleEndpoints::google()
        .map_err(|err| std::io::Error::other(format!("google endpoints: {err}")))?;
    let provider = GoogleIdentityProvider::new(
        endpoints,
        GoogleCredentials {
            client_id: google.client_id.clone(),
            client_secret: Zeroizing::new(google.client_secret.clone()),
            redirect_url: config.callback_url.clone(),
        },
        IDENTITY_PROVIDER_TIMEOUT,
    )
    .map_err(|err| std::io::Error::other(format!("google client: {err}")))?;
    Ok(Arc::new(provider))
}

fn build_services(
    config: &ServerConfig,
    background: Arc<dyn NotificationDispatcher>,
    clock: Arc<dyn Clock>,
) -> (Arc<dyn RequestLifecycle>, Arc<dyn IdentityResolver>) {
    let settings = IdentitySettings {
        admin_email: config.admin_email.clone(),
    };
    match &config.db_pool {
        Some(pool) => (
            Arc::new(RequestLifecycleService::new(
                Arc::new(DieselRequestRepository::new(pool.clone())),
                background.clone(),
                clock.clone(),
            )),
            Arc::new(IdentityService::new(
                Arc::new(DieselUserRepository::new(pool.clone())),
                background,
                clock,
                settings,
            )),
        ),
        None => (
            Arc::new(RequestLifecycleService::new(
                Arc::new(InMemoryRequestRepository::new()),
                background.clone(),
                clock.clone(),
            )),
            Arc::new(IdentityService::new(
                Arc::new(InMemoryUserRepository::new()),
                background,
                clock,
                settings,
            )),
        ),
    }
}

/// Build handler state for `config`.
///
/// Lifecycle and login flows notify through a background dispatcher; the
/// `/notification` endpoints await the same mail dispatcher directly.
///
/// # Errors
///
/// Returns [`std::io::Error`] when an outbound HTTP client cannot be built,
/// or when Google is not configured and fixture login is disabled.
pub(super) fn build_http_state(config: &ServerConfig) -> std::io::Result<HttpState> {
    let transport = build_mail_transport(config)?;
    let direct: Arc<MailNotificationDispatcher<dyn MailTransport>> = Arc::new(
        MailNotificationDispatcher::new(transport, config.notification_timeout),
    );
    let background: Arc<dyn NotificationDispatcher> =
        Arc::new(BackgroundDispatcher::new(direct.clone()));
    let clock: Arc<dyn Clock> = Arc::new(DefaultClock);

    let (requests, identity) = build_services(config, background, clock);
    let identity_provider = build_identity_provider(config)?;

    Ok(HttpState::new(
        HttpStatePorts {
            requests,
            identity,
            identity_provider,
            notifications: direct,
        },
        config.frontend_url.clone(),
    ))
}

//! Shared harness for the HTTP integration suites.
//!
//! Builds the full route table over in-memory stores and a recording mail
//! transport. Notifications are awaited so tests can assert on sent mail as
//! soon as a response arrives.

#![allow(dead_code, reason = "each suite uses a different subset")]

use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};

use actix_web::dev::{ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, web};
use chrono::{DateTime, Duration, Local, TimeZone, Utc};
use mockable::Clock;
use url::Url;

use approvals::{RateLimit, Trace};
use approvals::domain::ports::{FixtureIdentityProvider, MailTransport};
use approvals::domain::{
    EmailAddress, IdentityService, IdentitySettings, MailNotificationDispatcher,
    RequestLifecycleService,
};
use approvals::inbound::http::configure;
use approvals::inbound::http::state::{HttpState, HttpStatePorts};
use approvals::outbound::memory::{InMemoryRequestRepository, InMemoryUserRepository};
use approvals::test_support::RecordingMailTransport;

pub const FRONTEND_URL: &str = "http://localhost:3000";
pub const CALLBACK_URL: &str = "http://localhost:8080/auth/google/callback";
pub const ADMIN_EMAIL: &str = "boss@example.com";

/// Clock advancing one second per reading, so creation order is observable.
pub struct SteppingClock {
    start: DateTime<Utc>,
    ticks: AtomicI64,
}

impl Default for SteppingClock {
    fn default() -> Self {
        Self {
            start: Utc
                .with_ymd_and_hms(2026, 4, 1, 9, 0, 0)
                .single()
                .expect("valid start"),
            ticks: AtomicI64::new(0),
        }
    }
}

impl Clock for SteppingClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        let tick = self.ticks.fetch_add(1, Ordering::SeqCst);
        self.start + Duration::seconds(tick)
    }
}

/// In-memory deployment of the API.
pub struct Harness {
    pub requests: Arc<InMemoryRequestRepository>,
    pub users: Arc<InMemoryUserRepository>,
    state: HttpState,
}

impl Harness {
    /// Harness whose mail goes to `transport`.
    pub fn with_transport<M>(transport: Arc<M>) -> Self
    where
        M: MailTransport + 'static,
    {
        let requests = Arc::new(InMemoryRequestRepository::new());
        let users = Arc::new(InMemoryUserRepository::new());
        let dispatcher = Arc::new(MailNotificationDispatcher::new(
            transport,
            std::time::Duration::from_millis(500),
        ));
        let clock = Arc::new(SteppingClock::default());
        let settings = IdentitySettings {
            admin_email: Some(EmailAddress::new(ADMIN_EMAIL).expect("admin email")),
        };
        let ports = HttpStatePorts {
            requests: Arc::new(RequestLifecycleService::new(
                requests.clone(),
                dispatcher.clone(),
                clock.clone(),
            )),
            identity: Arc::new(IdentityService::new(
                users.clone(),
                dispatcher.clone(),
                clock,
                settings,
            )),
            identity_provider: Arc::new(FixtureIdentityProvider::new(
                Url::parse(CALLBACK_URL).expect("callback url"),
            )),
            notifications: dispatcher,
        };
        let state = HttpState::new(ports, Url::parse(FRONTEND_URL).expect("frontend url"));
        Self {
            requests,
            users,
            state,
        }
    }

    /// Harness recording mail in `mail`.
    pub fn recording(mail: &RecordingMailTransport) -> Self {
        Self::with_transport(Arc::new(mail.clone()))
    }

    pub fn app(
        &self,
    ) -> App<
        impl ServiceFactory<
            ServiceRequest,
            Config = (),
            Response = ServiceResponse,
            Error = actix_web::Error,
            InitError = (),
        > + use<>,
    > {
        App::new()
            .app_data(web::Data::new(self.state.clone()))
            .wrap(Trace)
            .configure(configure)
    }

    /// Same routes as [`Harness::app`], throttled by `limits`.
    pub fn limited_app(
        &self,
        limits: RateLimit,
    ) -> App<
        impl ServiceFactory<
            ServiceRequest,
            Config = (),
            Response = ServiceResponse,
            Error = actix_web::Error,
            InitError = (),
        > + use<>,
    > {
        App::new()
            .app_data(web::Data::new(self.state.clone()))
            .wrap(limits)
            .wrap(Trace)
            .configure(configure)
    }
}

pub fn email(raw: &str) -> EmailAddress {
    EmailAddress::new(raw).expect("fixture email")
}

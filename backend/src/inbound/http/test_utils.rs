//! Test helpers for inbound HTTP components.

use std::sync::Arc;

use actix_web::dev::{ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, web};
use url::Url;

use crate::Trace;
use crate::domain::ports::{
    MockIdentityProvider, MockIdentityResolver, MockNotificationDispatcher, MockRequestLifecycle,
};
use crate::inbound::http::configure;
use crate::inbound::http::state::{HttpState, HttpStatePorts};

/// Front-end origin used by handler tests.
pub const FRONTEND_URL: &str = "http://localhost:3000";

/// Mocked ports; configure expectations before calling [`test_app`].
#[derive(Default)]
pub struct TestPorts {
    pub requests: MockRequestLifecycle,
    pub identity: MockIdentityResolver,
    pub identity_provider: MockIdentityProvider,
    pub notifications: MockNotificationDispatcher,
}

/// Build the full route table over mocked ports.
pub fn test_app(
    ports: TestPorts,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let frontend_url = Url::parse(FRONTEND_URL).expect("fixture front-end URL");
    let state = HttpState::new(
        HttpStatePorts {
            requests: Arc::new(ports.requests),
            identity: Arc::new(ports.identity),
            identity_provider: Arc::new(ports.identity_provider),
            notifications: Arc::new(ports.notifications),
        },
        frontend_url,
    );
    App::new()
        .app_data(web::Data::new(state))
        .wrap(Trace)
        .configure(configure)
}

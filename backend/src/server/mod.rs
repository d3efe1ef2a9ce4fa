//! Server construction and middleware wiring.

mod config;
mod settings;
mod state_builders;

pub use config::{MailDelivery, ServerConfig};
pub use settings::{AppSettings, GoogleClient};

use state_builders::build_http_state;

use actix_cors::Cors;
use actix_web::body::{BoxBody, EitherBody};
use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::http::header;
use actix_web::{App, HttpServer, web};
use url::Url;

use approvals::{RateLimit, Trace};
use approvals::domain::TRACE_ID_HEADER;
#[cfg(debug_assertions)]
use approvals::doc::ApiDoc;
use approvals::inbound::http::configure;
use approvals::inbound::http::health::{HealthState, live, ready};
use approvals::inbound::http::state::HttpState;
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

fn cors_for(frontend_url: &Url) -> Cors {
    Cors::default()
        .allowed_origin(&frontend_url.origin().ascii_serialization())
        .allowed_methods(["GET", "POST", "PUT", "OPTIONS"])
        .allowed_headers([header::CONTENT_TYPE, header::AUTHORIZATION, header::ACCEPT])
        .expose_headers([TRACE_ID_HEADER])
        .supports_credentials()
        .max_age(3600)
}

fn build_app(
    health_state: web::Data<HealthState>,
    http_state: web::Data<HttpState>,
    limits: RateLimit,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse<EitherBody<BoxBody>>,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let cors = cors_for(&http_state.frontend_url);
    let app = App::new()
        .app_data(health_state)
        .app_data(http_state)
        .wrap(limits)
        .wrap(Trace)
        .wrap(cors)
        .configure(configure)
        .service(ready)
        .service(live);

    #[cfg(debug_assertions)]
    let app = app.service(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()));

    app
}

/// Construct an Actix HTTP server for `config`.
///
/// The health state is marked ready once the listener is bound. Rate limit
/// counters are shared by every worker.
///
/// # Errors
///
/// Propagates [`std::io::Error`] when an outbound client cannot be built or
/// the socket cannot be bound.
pub fn create_server(
    health_state: web::Data<HealthState>,
    config: ServerConfig,
) -> std::io::Result<Server> {
    let http_state = web::Data::new(build_http_state(&config)?);
    let server_health_state = health_state.clone();
    let limits = RateLimit::request_routes();

    let server = HttpServer::new(move || {
        build_app(
            server_health_state.clone(),
            http_state.clone(),
            limits.clone(),
        )
    })
    .bind(config.bind_addr)?
    .run();

    health_state.mark_ready();
    Ok(server)
}

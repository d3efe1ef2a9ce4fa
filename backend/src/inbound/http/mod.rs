//! HTTP inbound adapter exposing REST endpoints.
//!
//! Routes are grouped under the `/auth`, `/user`, `/request` and
//! `/notification` prefixes the front end calls.

pub mod auth;
pub mod error;
pub mod health;
pub mod notifications;
pub mod requests;
pub mod schemas;
pub mod state;
#[cfg(test)]
pub mod test_utils;
pub mod users;
pub mod validation;

use actix_web::web;

pub use error::ApiResult;

/// Register extractor error handlers and every API scope.
///
/// Health probes and Swagger UI are mounted by the server alongside this.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(error::json_config())
        .app_data(error::query_config())
        .app_data(error::path_config())
        .service(
            web::scope("/request")
                .service(requests::create_request)
                .service(requests::fetch_requests)
                .service(requests::update_status),
        )
        .service(web::scope("/user").service(users::get_user))
        .service(
            web::scope("/auth")
                .service(auth::google_login)
                .service(auth::google_callback)
                .service(auth::logout_by_query)
                .service(auth::logout_by_body),
        )
        .service(
            web::scope("/notification")
                .service(notifications::send_request_notification)
                .service(notifications::send_status_update_notification)
                .service(notifications::send_approval_notification)
                .service(notifications::send_login_notification)
                .service(notifications::send_logout_notification),
        );
}

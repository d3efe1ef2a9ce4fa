//! Authentication handlers for the identity provider handshake.
//!
//! ```text
//! GET  /auth/google                  -> 302 to the provider
//! GET  /auth/google/callback?code=…  -> 302 to {frontend}/dashboard?email=…&token=…
//! GET  /auth/logout?email=…
//! POST /auth/logout {"email":"…"}
//! ```
//!
//! The provider specifics live behind [`IdentityProvider`]; these handlers
//! only map the handshake onto HTTP redirects.
//!
//! [`IdentityProvider`]: crate::domain::ports::IdentityProvider

use actix_web::http::header;
use actix_web::{HttpResponse, get, post, web};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::warn;
use url::Url;
use utoipa::{IntoParams, ToSchema};

use crate::domain::ports::IdentityProviderError;
use crate::domain::{Error, User};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::MessageResponse;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, missing_fields_error, parse_email, required};

/// Query string the provider appends when redirecting back.
#[derive(Debug, Default, Deserialize, Serialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct CallbackQuery {
    /// Authorisation code to exchange.
    pub code: Option<String>,
    /// Error reported by the provider, for example `access_denied`.
    pub error: Option<String>,
}

/// Email carried by a logout request.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct LogoutRequest {
    #[schema(example = "ada@example.com")]
    pub email: Option<String>,
}

pub(crate) fn map_provider_error(err: IdentityProviderError) -> Error {
    match err {
        IdentityProviderError::Denied { message } => Error::unauthorized(message),
        IdentityProviderError::Unavailable { message }
        | IdentityProviderError::InvalidResponse { message } => {
            warn!(%message, "identity provider handshake failed");
            Error::service_unavailable("identity provider is unavailable")
        }
        IdentityProviderError::Misconfigured { message } => {
            Error::internal(format!("identity provider misconfigured: {message}"))
        }
    }
}

fn redirect(location: &Url) -> HttpResponse {
    HttpResponse::Found()
        .insert_header((header::LOCATION, location.as_str()))
        .finish()
}

fn dashboard_url(frontend: &Url, user: &User) -> Result<Url, Error> {
    let mut url = frontend
        .join("/dashboard")
        .map_err(|err| Error::internal(format!("invalid front-end URL: {err}")))?;
    url.query_pairs_mut()
        .append_pair("email", user.email().as_str())
        .append_pair("token", user.token().expose());
    Ok(url)
}

/// Start a login by redirecting to the identity provider.
#[utoipa::path(
    get,
    path = "/auth/google",
    responses(
        (status = 302, description = "Redirect to the identity provider"),
        (status = 500, description = "Provider misconfigured", body = Error)
    ),
    tags = ["auth"],
    operation_id = "startLogin"
)]
#[get("/google")]
pub async fn google_login(state: web::Data<HttpState>) -> ApiResult<HttpResponse> {
    let url = state
        .identity_provider
        .authorization_url()
        .map_err(map_provider_error)?;
    Ok(redirect(&url))
}

/// Complete a login and hand the issued token to the front end.
#[utoipa::path(
    get,
    path = "/auth/google/callback",
    params(CallbackQuery),
    responses(
        (status = 302, description = "Redirect to the front-end dashboard"),
        (status = 400, description = "Missing authorisation code", body = Error),
        (status = 401, description = "Login refused", body = Error),
        (status = 503, description = "Identity provider or user store unavailable", body = Error)
    ),
    tags = ["auth"],
    operation_id = "completeLogin"
)]
#[get("/google/callback")]
pub async fn google_callback(
    state: web::Data<HttpState>,
    query: web::Query<CallbackQuery>,
) -> ApiResult<HttpResponse> {
    let CallbackQuery { code, error } = query.into_inner();
    if let Some(reason) = required(error.as_deref()) {
        return Err(Error::unauthorized("login was refused by the identity provider")
            .with_details(json!({ "code": "provider_denied", "reason": reason })));
    }
    let Some(code) = required(code.as_deref()) else {
        return Err(missing_fields_error("Authorisation code is required", &["code"]));
    };

    let assertion = state
        .identity_provider
        .exchange(code)
        .await
        .map_err(map_provider_error)?;
    let outcome = state.identity.resolve_login(assertion).await?;
    let location = dashboard_url(&state.frontend_url, &outcome.user)?;
    Ok(redirect(&location))
}

async fn logout(state: &HttpState, email: Option<&str>) -> ApiResult<HttpResponse> {
    const EMAIL: FieldName = FieldName::new("email");
    let Some(raw) = required(email) else {
        return Err(missing_fields_error("Email is required for logout", &["email"]));
    };
    let email = parse_email(EMAIL, raw)?;
    state.identity.logout(&email).await?;
    Ok(HttpResponse::Ok().json(MessageResponse::new("Logged out successfully")))
}

/// Log out, taking the email from the query string.
#[utoipa::path(
    get,
    path = "/auth/logout",
    params(LogoutRequest),
    responses(
        (status = 200, description = "Logged out", body = MessageResponse),
        (status = 400, description = "Missing or invalid email", body = Error)
    ),
    tags = ["auth"],
    operation_id = "logoutByQuery"
)]
#[get("/logout")]
pub async fn logout_by_query(
    state: web::Data<HttpState>,
    query: web::Query<LogoutRequest>,
) -> ApiResult<HttpResponse> {
    logout(&state, query.email.as_deref()).await
}

/// Log out, taking the email from the JSON body.
#[utoipa::path(
    post,
    path = "/auth/logout",
    request_body = LogoutRequest,
    responses(
        (status = 200, description = "Logged out", body = MessageResponse),
        (status = 400, description = "Missing or invalid email", body = Error)
    ),
    tags = ["auth"],
    operation_id = "logoutByBody"
)]
#[post("/logout")]
pub async fn logout_by_body(
    state: web::Data<HttpState>,
    payload: web::Json<LogoutRequest>,
) -> ApiResult<HttpResponse> {
    logout(&state, payload.email.as_deref()).await
}

#[cfg(test)]
#[path = "auth_tests.rs"]
mod tests;

//! OpenAPI documentation.
//!
//! [`ApiDoc`] registers every HTTP endpoint from the inbound layer together
//! with the DTOs and domain types they exchange. Swagger UI serves it under
//! `/docs` in debug builds.

use utoipa::OpenApi;

use crate::domain::{ApprovalRequest, Error, ErrorCode, RequestStatus, RequestType, Urgency};
use crate::inbound::http::auth::LogoutRequest;
use crate::inbound::http::notifications::{RequestNotificationBody, UserNotificationBody};
use crate::inbound::http::requests::{
    CreateRequestBody, CreateRequestResponse, UpdateStatusBody, UpdateStatusResponse,
};
use crate::inbound::http::schemas::MessageResponse;
use crate::inbound::http::users::UserView;

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Approvals API",
        description = "Create, list and decide approval requests; sign in with Google; send notification emails."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    paths(
        crate::inbound::http::requests::create_request,
        crate::inbound::http::requests::fetch_requests,
        crate::inbound::http::requests::update_status,
        crate::inbound::http::users::get_user,
        crate::inbound::http::auth::google_login,
        crate::inbound::http::auth::google_callback,
        crate::inbound::http::auth::logout_by_query,
        crate::inbound::http::auth::logout_by_body,
        crate::inbound::http::notifications::send_request_notification,
        crate::inbound::http::notifications::send_status_update_notification,
        crate::inbound::http::notifications::send_approval_notification,
        crate::inbound::http::notifications::send_login_notification,
        crate::inbound::http::notifications::send_logout_notification,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        ApprovalRequest,
        RequestType,
        Urgency,
        RequestStatus,
        CreateRequestBody,
        CreateRequestResponse,
        UpdateStatusBody,
        UpdateStatusResponse,
        UserView,
        LogoutRequest,
        RequestNotificationBody,
        UserNotificationBody,
        MessageResponse,
        Error,
        ErrorCode,
    )),
    tags(
        (name = "requests", description = "Approval request lifecycle"),
        (name = "users", description = "User lookup"),
        (name = "auth", description = "Google sign-in and logout"),
        (name = "notifications", description = "Direct notification emails"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;

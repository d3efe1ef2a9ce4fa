//! Notification API handlers.
//!
//! These endpoints send mail synchronously and report failure to the caller,
//! unlike the lifecycle and login flows which never wait on delivery.
//!
//! ```text
//! POST /notification/send-request-notification       {requesterEmail, approverEmail, requestTitle}
//! POST /notification/send-status-update-notification {requesterEmail, approverEmail, requestTitle, status}
//! POST /notification/send-approval-notification      {requesterEmail, approverEmail, requestTitle}
//! POST /notification/send-login-notification         {email}
//! POST /notification/send-logout-notification        {email}
//! ```

use actix_web::{HttpResponse, post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{Error, NotificationEvent, StatusDecision};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::MessageResponse;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    FieldName, absent_fields, map_request_validation_error, missing_fields_error, parse_email,
    required,
};

const EMAIL: FieldName = FieldName::new("email");
const REQUESTER: FieldName = FieldName::new("requesterEmail");
const APPROVER: FieldName = FieldName::new("approverEmail");
const TITLE: FieldName = FieldName::new("requestTitle");
const STATUS: FieldName = FieldName::new("status");

/// Body for request-scoped notifications.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RequestNotificationBody {
    #[schema(example = "ada@example.com")]
    pub requester_email: Option<String>,
    #[schema(example = "grace@example.com")]
    pub approver_email: Option<String>,
    #[schema(example = "Annual leave")]
    pub request_title: Option<String>,
    /// Only used by the status update endpoint: `approved` or `rejected`,
    /// in any case.
    #[schema(example = "Approved")]
    pub status: Option<String>,
}

/// Body for user-scoped notifications.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
pub struct UserNotificationBody {
    #[schema(example = "ada@example.com")]
    pub email: Option<String>,
}

async fn deliver(
    state: &HttpState,
    event: NotificationEvent,
    success: &str,
) -> ApiResult<HttpResponse> {
    let report = state.notifications.dispatch(event).await;
    if report.all_delivered() || report.is_deferred() {
        Ok(HttpResponse::Ok().json(MessageResponse::new(success)))
    } else {
        Err(Error::internal(format!(
            "failed to deliver notification to {} recipient(s)",
            report.failed().len()
        )))
    }
}

/// Which request notification a body is turned into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RequestNotice {
    Created,
    StatusUpdate,
    Approval,
}

fn request_event(
    body: &RequestNotificationBody,
    notice: RequestNotice,
) -> Result<NotificationEvent, Error> {
    let with_status = notice == RequestNotice::StatusUpdate;
    let mut fields = vec![
        (REQUESTER, body.requester_email.as_deref()),
        (APPROVER, body.approver_email.as_deref()),
        (TITLE, body.request_title.as_deref()),
    ];
    if with_status {
        fields.push((STATUS, body.status.as_deref()));
    }
    let missing = absent_fields(&fields);
    if !missing.is_empty() {
        return Err(missing_fields_error("All fields are required", &missing));
    }

    let requester = parse_email(REQUESTER, body.requester_email.as_deref().unwrap_or_default())?;
    let approver = parse_email(APPROVER, body.approver_email.as_deref().unwrap_or_default())?;
    let title = required(body.request_title.as_deref())
        .unwrap_or_default()
        .to_owned();

    match notice {
        RequestNotice::Created => Ok(NotificationEvent::RequestCreated {
            requester,
            approver,
            title,
        }),
        RequestNotice::Approval => Ok(NotificationEvent::Approved {
            requester,
            approver,
            title,
        }),
        RequestNotice::StatusUpdate => {
            let raw_status = required(body.status.as_deref()).unwrap_or_default();
            let decision =
                StatusDecision::parse(raw_status).map_err(map_request_validation_error)?;
            Ok(NotificationEvent::StatusChanged {
                requester,
                approver,
                title,
                status: decision.target_status(),
            })
        }
    }
}

fn user_email(body: &UserNotificationBody) -> Result<crate::domain::EmailAddress, Error> {
    let Some(raw) = required(body.email.as_deref()) else {
        return Err(missing_fields_error("Email is required", &["email"]));
    };
    parse_email(EMAIL, raw)
}

/// Tell both parties that a request was created.
#[utoipa::path(
    post,
    path = "/notification/send-request-notification",
    request_body = RequestNotificationBody,
    responses(
        (status = 200, description = "Notification sent", body = MessageResponse),
        (status = 400, description = "Missing or invalid fields", body = Error),
        (status = 500, description = "Delivery failed", body = Error)
    ),
    tags = ["notifications"],
    operation_id = "sendRequestNotification"
)]
#[post("/send-request-notification")]
pub async fn send_request_notification(
    state: web::Data<HttpState>,
    payload: web::Json<RequestNotificationBody>,
) -> ApiResult<HttpResponse> {
    let event = request_event(&payload, RequestNotice::Created)?;
    deliver(&state, event, "Request creation notification sent").await
}

/// Tell both parties that a request was decided.
#[utoipa::path(
    post,
    path = "/notification/send-status-update-notification",
    request_body = RequestNotificationBody,
    responses(
        (status = 200, description = "Notification sent", body = MessageResponse),
        (status = 400, description = "Missing or invalid fields", body = Error),
        (status = 500, description = "Delivery failed", body = Error)
    ),
    tags = ["notifications"],
    operation_id = "sendStatusUpdateNotification"
)]
#[post("/send-status-update-notification")]
pub async fn send_status_update_notification(
    state: web::Data<HttpState>,
    payload: web::Json<RequestNotificationBody>,
) -> ApiResult<HttpResponse> {
    let event = request_event(&payload, RequestNotice::StatusUpdate)?;
    deliver(&state, event, "Status update notification sent").await
}

/// Tell both parties that a request was approved.
#[utoipa::path(
    post,
    path = "/notification/send-approval-notification",
    request_body = RequestNotificationBody,
    responses(
        (status = 200, description = "Notification sent", body = MessageResponse),
        (status = 400, description = "Missing fields", body = Error),
        (status = 500, description = "Delivery failed", body = Error)
    ),
    tags = ["notifications"],
    operation_id = "sendApprovalNotification"
)]
#[post("/send-approval-notification")]
pub async fn send_approval_notification(
    state: web::Data<HttpState>,
    payload: web::Json<RequestNotificationBody>,
) -> ApiResult<HttpResponse> {
    let event = request_event(&payload, RequestNotice::Approval)?;
    deliver(&state, event, "Approval notification sent").await
}

/// Tell a user they logged in.
#[utoipa::path(
    post,
    path = "/notification/send-login-notification",
    request_body = UserNotificationBody,
    responses(
        (status = 200, description = "Notification sent", body = MessageResponse),
        (status = 400, description = "Missing or invalid email", body = Error),
        (status = 500, description = "Delivery failed", body = Error)
    ),
    tags = ["notifications"],
    operation_id = "sendLoginNotification"
)]
#[post("/send-login-notification")]
pub async fn send_login_notification(
    state: web::Data<HttpState>,
    payload: web::Json<UserNotificationBody>,
) -> ApiResult<HttpResponse> {
    let email = user_email(&payload)?;
    deliver(&state, NotificationEvent::Login { email }, "Login notification sent").await
}

/// Tell a user they logged out.
#[utoipa::path(
    post,
    path = "/notification/send-logout-notification",
    request_body = UserNotificationBody,
    responses(
        (status = 200, description = "Notification sent", body = MessageResponse),
        (status = 400, description = "Missing or invalid email", body = Error),
        (status = 500, description = "Delivery failed", body = Error)
    ),
    tags = ["notifications"],
    operation_id = "sendLogoutNotification"
)]
#[post("/send-logout-notification")]
pub async fn send_logout_notification(
    state: web::Data<HttpState>,
    payload: web::Json<UserNotificationBody>,
) -> ApiResult<HttpResponse> {
    let email = user_email(&payload)?;
    deliver(&state, NotificationEvent::Logout { email }, "Logout notification sent").await
}

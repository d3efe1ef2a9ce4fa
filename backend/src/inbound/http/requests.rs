//! Approval request API handlers.
//!
//! ```text
//! POST /request/create {"title":"…","description":"…","type":"Leave",…}
//! GET  /request/fetch?email=ada@example.com&role=approver&includeAll=true
//! PUT  /request/update-status/{id} {"status":"approved"}
//! ```

use actix_web::{HttpResponse, get, post, put, web};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::{
    ApprovalRequest, ApprovalRequestDraft, Error, NewApprovalRequest, RequestFilter, RequestId,
    Role, StatusDecision,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    FieldName, absent_fields, map_request_validation_error, missing_fields_error, parse_email,
    required,
};

/// Request body for `POST /request/create`.
///
/// Every field is optional at the boundary so that all missing fields can be
/// reported together.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateRequestBody {
    #[schema(example = "Annual leave")]
    pub title: Option<String>,
    pub description: Option<String>,
    #[serde(rename = "type")]
    #[schema(example = "Leave")]
    pub request_type: Option<String>,
    #[schema(example = "Medium")]
    pub urgency: Option<String>,
    #[schema(example = "ada@example.com")]
    pub requester_email: Option<String>,
    #[schema(example = "grace@example.com")]
    pub approver_email: Option<String>,
}

impl From<CreateRequestBody> for ApprovalRequestDraft {
    fn from(value: CreateRequestBody) -> Self {
        Self {
            title: value.title,
            description: value.description,
            request_type: value.request_type,
            urgency: value.urgency,
            requester_email: value.requester_email,
            approver_email: value.approver_email,
        }
    }
}

/// Response body for `POST /request/create`.
#[derive(Debug, Serialize, ToSchema)]
pub struct CreateRequestResponse {
    pub request: ApprovalRequest,
}

/// Query string for `GET /request/fetch`.
#[derive(Debug, Default, Deserialize, Serialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct FetchRequestsQuery {
    /// Email of the user whose requests are listed.
    pub email: Option<String>,
    /// `requester` or `approver`.
    pub role: Option<String>,
    /// `true` to include decided requests for approvers.
    pub include_all: Option<String>,
}

/// Request body for `PUT /request/update-status/{id}`.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
pub struct UpdateStatusBody {
    /// `approved` or `rejected`, case-insensitive.
    #[schema(example = "approved")]
    pub status: Option<String>,
}

/// Response body for `PUT /request/update-status/{id}`.
#[derive(Debug, Serialize, ToSchema)]
pub struct UpdateStatusResponse {
    pub message: String,
    pub request: ApprovalRequest,
}

/// Create a pending approval request and notify both parties.
#[utoipa::path(
    post,
    path = "/request/create",
    request_body = CreateRequestBody,
    responses(
        (status = 201, description = "Request created", body = CreateRequestResponse),
        (status = 400, description = "Missing or invalid fields", body = Error),
        (status = 500, description = "Internal server error", body = Error),
        (status = 503, description = "Request store unavailable", body = Error)
    ),
    tags = ["requests"],
    operation_id = "createRequest"
)]
#[post("/create")]
pub async fn create_request(
    state: web::Data<HttpState>,
    payload: web::Json<CreateRequestBody>,
) -> ApiResult<HttpResponse> {
    let draft = ApprovalRequestDraft::from(payload.into_inner());
    let input = NewApprovalRequest::try_from_draft(draft).map_err(map_request_validation_error)?;
    let request = state.requests.create(input).await?;
    Ok(HttpResponse::Created().json(CreateRequestResponse { request }))
}

fn parse_filter(query: FetchRequestsQuery) -> Result<RequestFilter, Error> {
    const EMAIL: FieldName = FieldName::new("email");
    const ROLE: FieldName = FieldName::new("role");

    let missing = absent_fields(&[
        (EMAIL, query.email.as_deref()),
        (ROLE, query.role.as_deref()),
    ]);
    let email = required(query.email.as_deref());
    let role = required(query.role.as_deref());
    let (Some(email), Some(role)) = (email, role) else {
        return Err(missing_fields_error("Email and role are required", &missing));
    };

    let email = parse_email(EMAIL, email)?;
    let role = role.parse::<Role>().map_err(map_request_validation_error)?;
    let include_all = query.include_all.as_deref() == Some("true");
    Ok(RequestFilter::for_role(email, role, include_all))
}

/// List requests for a requester, or pending requests for an approver.
///
/// Results are ordered newest first.
#[utoipa::path(
    get,
    path = "/request/fetch",
    params(FetchRequestsQuery),
    responses(
        (status = 200, description = "Matching requests", body = [ApprovalRequest]),
        (status = 400, description = "Missing or invalid query parameters", body = Error),
        (status = 500, description = "Internal server error", body = Error),
        (status = 503, description = "Request store unavailable", body = Error)
    ),
    tags = ["requests"],
    operation_id = "fetchRequests"
)]
#[get("/fetch")]
pub async fn fetch_requests(
    state: web::Data<HttpState>,
    query: web::Query<FetchRequestsQuery>,
) -> ApiResult<web::Json<Vec<ApprovalRequest>>> {
    let filter = parse_filter(query.into_inner())?;
    let requests = state.requests.fetch_for_user(filter).await?;
    Ok(web::Json(requests))
}

/// Approve or reject a pending request.
#[utoipa::path(
    put,
    path = "/request/update-status/{id}",
    params(("id" = String, Path, description = "Request identifier (UUID)")),
    request_body = UpdateStatusBody,
    responses(
        (status = 200, description = "Request decided", body = UpdateStatusResponse),
        (status = 400, description = "Invalid status or identifier", body = Error),
        (status = 404, description = "Request not found", body = Error),
        (status = 409, description = "Request already decided", body = Error),
        (status = 500, description = "Internal server error", body = Error),
        (status = 503, description = "Request store unavailable", body = Error)
    ),
    tags = ["requests"],
    operation_id = "updateRequestStatus"
)]
#[put("/update-status/{id}")]
pub async fn update_status(
    state: web::Data<HttpState>,
    path: web::Path<String>,
    payload: web::Json<UpdateStatusBody>,
) -> ApiResult<HttpResponse> {
    let status = payload.into_inner().status.unwrap_or_default();
    let decision = StatusDecision::parse(&status).map_err(map_request_validation_error)?;
    let id = RequestId::parse(&path.into_inner()).map_err(map_request_validation_error)?;

    let request = state.requests.update_status(id, decision).await?;
    Ok(HttpResponse::Ok().json(UpdateStatusResponse {
        message: "Request status updated successfully".to_owned(),
        request,
    }))
}

#[cfg(test)]
#[path = "requests_tests.rs"]
mod tests;

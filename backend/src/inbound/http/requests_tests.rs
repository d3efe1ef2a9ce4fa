//! Tests for the approval request handlers.

use actix_web::http::StatusCode;
use actix_web::test as actix_test;
use chrono::{TimeZone, Utc};
use rstest::{fixture, rstest};
use serde_json::{Value, json};

use super::*;
use crate::domain::{ErrorCode, RequestStatus};
use crate::inbound::http::test_utils::{TestPorts, test_app};

#[fixture]
fn sample() -> ApprovalRequest {
    let input = NewApprovalRequest::try_from_draft(ApprovalRequestDraft {
        title: Some("Overtime March".into()),
        description: Some("Release weekend".into()),
        request_type: Some("Overtime".into()),
        urgency: Some("High".into()),
        requester_email: Some("ada@example.com".into()),
        approver_email: Some("grace@example.com".into()),
    })
    .expect("valid draft");
    let at = Utc
        .with_ymd_and_hms(2026, 3, 2, 10, 0, 0)
        .single()
        .expect("valid timestamp");
    ApprovalRequest::open(input, RequestId::random(), at)
}

async fn send(ports: TestPorts, request: actix_test::TestRequest) -> (StatusCode, Value) {
    let app = actix_test::init_service(test_app(ports)).await;
    let response = actix_test::call_service(&app, request.to_request()).await;
    let status = response.status();
    let body = actix_test::read_body(response).await;
    let value = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).expect("JSON body")
    };
    (status, value)
}

#[rstest]
#[actix_web::test]
async fn create_returns_201_with_request(sample: ApprovalRequest) {
    let mut ports = TestPorts::default();
    let created = sample.clone();
    ports
        .requests
        .expect_create()
        .withf(|input| input.title() == "Overtime March")
        .times(1)
        .return_once(move |_| Ok(created));

    let (status, body) = send(
        ports,
        actix_test::TestRequest::post()
            .uri("/request/create")
            .set_json(json!({
                "title": "Overtime March",
                "description": "Release weekend",
                "type": "Overtime",
                "urgency": "High",
                "requesterEmail": "ada@example.com",
                "approverEmail": "grace@example.com",
            })),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["request"]["status"], "Pending");
    assert_eq!(body["request"]["id"], json!(sample.id().to_string()));
}

#[rstest]
#[actix_web::test]
async fn create_reports_all_missing_fields() {
    let mut ports = TestPorts::default();
    ports.requests.expect_create().never();

    let (status, body) = send(
        ports,
        actix_test::TestRequest::post()
            .uri("/request/create")
            .set_json(json!({ "title": "Only a title", "type": "Leave" })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "invalid_request");
    assert_eq!(body["details"]["code"], "missing_field");
    assert_eq!(
        body["details"]["fields"],
        json!(["description", "urgency", "requesterEmail", "approverEmail"])
    );
}

#[rstest]
#[actix_web::test]
async fn create_rejects_unknown_type() {
    let mut ports = TestPorts::default();
    ports.requests.expect_create().never();

    let (status, body) = send(
        ports,
        actix_test::TestRequest::post()
            .uri("/request/create")
            .set_json(json!({
                "title": "t",
                "description": "d",
                "type": "Holiday",
                "urgency": "Low",
                "requesterEmail": "ada@example.com",
                "approverEmail": "grace@example.com",
            })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"]["field"], "type");
    assert_eq!(body["details"]["code"], "invalid_enum");
}

#[rstest]
#[case("/request/fetch?email=grace@example.com&role=approver", Role::Approver, false)]
#[case(
    "/request/fetch?email=grace@example.com&role=approver&includeAll=true",
    Role::Approver,
    true
)]
#[case("/request/fetch?email=grace@example.com&role=requester", Role::Requester, false)]
#[actix_web::test]
async fn fetch_builds_filter_from_query(
    sample: ApprovalRequest,
    #[case] uri: &str,
    #[case] role: Role,
    #[case] include_all: bool,
) {
    let email = crate::domain::EmailAddress::new("grace@example.com").expect("email");
    let expected = RequestFilter::for_role(email, role, include_all);
    let mut ports = TestPorts::default();
    ports
        .requests
        .expect_fetch_for_user()
        .withf(move |filter| *filter == expected)
        .times(1)
        .return_once(move |_| Ok(vec![sample]));

    let (status, body) = send(ports, actix_test::TestRequest::get().uri(uri)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().map(Vec::len), Some(1));
}

#[rstest]
#[case("/request/fetch?role=approver", "missing_field")]
#[case("/request/fetch?email=grace@example.com", "missing_field")]
#[case("/request/fetch?email=grace@example.com&role=manager", "invalid_enum")]
#[case("/request/fetch?email=%20&role=approver", "missing_field")]
#[actix_web::test]
async fn fetch_rejects_bad_queries(#[case] uri: &str, #[case] detail_code: &str) {
    let mut ports = TestPorts::default();
    ports.requests.expect_fetch_for_user().never();

    let (status, body) = send(ports, actix_test::TestRequest::get().uri(uri)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"]["code"], detail_code);
}

#[rstest]
#[actix_web::test]
async fn update_status_parses_decision_case_insensitively(sample: ApprovalRequest) {
    let id = sample.id();
    let decided = sample
        .decide(StatusDecision::Approved, Utc::now())
        .expect("pending request");
    let mut ports = TestPorts::default();
    ports
        .requests
        .expect_update_status()
        .withf(move |candidate, decision| {
            *candidate == id && *decision == StatusDecision::Approved
        })
        .times(1)
        .return_once(move |_, _| Ok(decided));

    let (status, body) = send(
        ports,
        actix_test::TestRequest::put()
            .uri(&format!("/request/update-status/{id}"))
            .set_json(json!({ "status": "APPROVED" })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Request status updated successfully");
    assert_eq!(body["request"]["status"], RequestStatus::Approved.as_str());
}

#[rstest]
#[case("not-a-uuid", json!({ "status": "approved" }), "id")]
#[case("3fa85f64-5717-4562-b3fc-2c963f66afa6", json!({ "status": "pending" }), "status")]
#[case("3fa85f64-5717-4562-b3fc-2c963f66afa6", json!({}), "status")]
#[actix_web::test]
async fn update_status_rejects_invalid_input(
    #[case] id: &str,
    #[case] payload: Value,
    #[case] field: &str,
) {
    let mut ports = TestPorts::default();
    ports.requests.expect_update_status().never();

    let (status, body) = send(
        ports,
        actix_test::TestRequest::put()
            .uri(&format!("/request/update-status/{id}"))
            .set_json(payload),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"]["field"], field);
}

#[rstest]
#[case(Error::not_found("request missing"), StatusCode::NOT_FOUND)]
#[case(Error::conflict("already decided"), StatusCode::CONFLICT)]
#[actix_web::test]
async fn update_status_surfaces_domain_failures(
    #[case] failure: Error,
    #[case] expected: StatusCode,
) {
    let mut ports = TestPorts::default();
    ports
        .requests
        .expect_update_status()
        .times(1)
        .return_once(move |_, _| Err(failure));

    let (status, body) = send(
        ports,
        actix_test::TestRequest::put()
            .uri("/request/update-status/3fa85f64-5717-4562-b3fc-2c963f66afa6")
            .set_json(json!({ "status": "rejected" })),
    )
    .await;
    assert_eq!(status, expected);
    assert_ne!(body["code"], json!(ErrorCode::InternalError));
}

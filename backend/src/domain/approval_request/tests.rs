//! Tests for approval request validation and transitions.

use super::*;
use chrono::TimeZone;
use rstest::{fixture, rstest};
use serde_json::json;

fn email(raw: &str) -> EmailAddress {
    EmailAddress::new(raw).expect("fixture email")
}

#[fixture]
fn draft() -> ApprovalRequestDraft {
    ApprovalRequestDraft {
        title: Some("Annual leave".into()),
        description: Some("Two weeks in August".into()),
        request_type: Some("Leave".into()),
        urgency: Some("Medium".into()),
        requester_email: Some("ada@example.com".into()),
        approver_email: Some("grace@example.com".into()),
    }
}

#[fixture]
fn created_at() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 1, 9, 30, 0)
        .single()
        .expect("valid timestamp")
}

#[fixture]
fn pending(draft: ApprovalRequestDraft, created_at: DateTime<Utc>) -> ApprovalRequest {
    let input = NewApprovalRequest::try_from_draft(draft).expect("valid draft");
    ApprovalRequest::open(input, RequestId::random(), created_at)
}

#[rstest]
fn valid_draft_is_accepted(draft: ApprovalRequestDraft) {
    let input = NewApprovalRequest::try_from_draft(draft).expect("valid draft");
    assert_eq!(input.title(), "Annual leave");
    assert_eq!(input.requester_email(), &email("ada@example.com"));
    assert_eq!(input.approver_email(), &email("grace@example.com"));
}

#[rstest]
fn every_missing_field_is_reported(draft: ApprovalRequestDraft) {
    let incomplete = ApprovalRequestDraft {
        title: Some("   ".into()),
        urgency: None,
        approver_email: None,
        ..draft
    };
    let err = NewApprovalRequest::try_from_draft(incomplete).expect_err("missing fields");
    assert_eq!(
        err,
        RequestValidationError::MissingFields {
            fields: vec!["title", "urgency", "approverEmail"],
        }
    );
}

#[rstest]
fn missing_fields_win_over_invalid_values(draft: ApprovalRequestDraft) {
    let incomplete = ApprovalRequestDraft {
        request_type: Some("Holiday".into()),
        description: None,
        ..draft
    };
    let err = NewApprovalRequest::try_from_draft(incomplete).expect_err("missing field");
    assert!(matches!(err, RequestValidationError::MissingFields { .. }));
}

#[rstest]
#[case(Some("leave"), Some("Medium"))]
#[case(Some("Holiday"), Some("Medium"))]
#[case(Some("Leave"), Some("urgent"))]
#[case(Some("Leave"), Some("HIGH"))]
fn enum_spellings_are_exact(
    draft: ApprovalRequestDraft,
    #[case] request_type: Option<&str>,
    #[case] urgency: Option<&str>,
) {
    let candidate = ApprovalRequestDraft {
        request_type: request_type.map(str::to_owned),
        urgency: urgency.map(str::to_owned),
        ..draft
    };
    let err = NewApprovalRequest::try_from_draft(candidate).expect_err("invalid enum");
    assert!(matches!(
        err,
        RequestValidationError::InvalidType { .. } | RequestValidationError::InvalidUrgency { .. }
    ));
}

#[rstest]
fn emails_are_kept_as_plain_strings(draft: ApprovalRequestDraft) {
    let candidate = ApprovalRequestDraft {
        requester_email: Some("alice".into()),
        approver_email: Some(" grace ".into()),
        ..draft
    };
    let request = NewApprovalRequest::try_from_draft(candidate).expect("plain handles");
    assert_eq!(request.requester_email().as_str(), "alice");
    assert_eq!(request.approver_email().as_str(), "grace");
}

#[rstest]
#[case("approved", StatusDecision::Approved)]
#[case("Approved", StatusDecision::Approved)]
#[case(" REJECTED ", StatusDecision::Rejected)]
fn decisions_parse_ignoring_case(#[case] raw: &str, #[case] expected: StatusDecision) {
    assert_eq!(StatusDecision::parse(raw).expect("valid decision"), expected);
}

#[rstest]
#[case("pending")]
#[case("")]
#[case("approve")]
fn unknown_decisions_are_rejected(#[case] raw: &str) {
    assert!(matches!(
        StatusDecision::parse(raw),
        Err(RequestValidationError::InvalidDecision { .. })
    ));
}

#[rstest]
#[case("requester", Some(Role::Requester))]
#[case("approver", Some(Role::Approver))]
#[case("Approver", None)]
#[case("admin", None)]
fn roles_parse_exactly(#[case] raw: &str, #[case] expected: Option<Role>) {
    assert_eq!(raw.parse::<Role>().ok(), expected);
}

#[rstest]
fn open_request_starts_pending(pending: ApprovalRequest, created_at: DateTime<Utc>) {
    assert_eq!(pending.status(), RequestStatus::Pending);
    assert_eq!(pending.created_at(), created_at);
    assert_eq!(pending.updated_at(), created_at);
}

#[rstest]
#[case(StatusDecision::Approved, RequestStatus::Approved)]
#[case(StatusDecision::Rejected, RequestStatus::Rejected)]
fn pending_request_accepts_one_decision(
    pending: ApprovalRequest,
    created_at: DateTime<Utc>,
    #[case] decision: StatusDecision,
    #[case] expected: RequestStatus,
) {
    let later = created_at + chrono::Duration::hours(1);
    let decided = pending.decide(decision, later).expect("pending request");
    assert_eq!(decided.status(), expected);
    assert_eq!(decided.created_at(), created_at);
    assert_eq!(decided.updated_at(), later);

    let err = decided
        .decide(StatusDecision::Approved, later)
        .expect_err("terminal request");
    assert_eq!(err.current, expected);
}

#[rstest]
fn approver_filter_hides_decided_requests_unless_asked(
    pending: ApprovalRequest,
    created_at: DateTime<Utc>,
) {
    let approver = email("grace@example.com");
    let decided = pending
        .clone()
        .decide(StatusDecision::Rejected, created_at)
        .expect("pending request");

    let pending_only = RequestFilter::for_role(approver.clone(), Role::Approver, false);
    let everything = RequestFilter::for_role(approver, Role::Approver, true);

    assert!(pending_only.matches(&pending));
    assert!(!pending_only.matches(&decided));
    assert!(everything.matches(&decided));
}

#[rstest]
fn requester_filter_ignores_status(pending: ApprovalRequest, created_at: DateTime<Utc>) {
    let decided = pending
        .decide(StatusDecision::Approved, created_at)
        .expect("pending request");
    let mine = RequestFilter::for_role(email("ada@example.com"), Role::Requester, false);
    let theirs = RequestFilter::for_role(email("grace@example.com"), Role::Requester, false);
    assert!(mine.matches(&decided));
    assert!(!theirs.matches(&decided));
}

#[rstest]
fn serialises_with_wire_field_names(pending: ApprovalRequest) {
    let value = serde_json::to_value(&pending).expect("serialise");
    assert_eq!(value["type"], json!("Leave"));
    assert_eq!(value["urgency"], json!("Medium"));
    assert_eq!(value["status"], json!("Pending"));
    assert_eq!(value["requesterEmail"], json!("ada@example.com"));
    assert_eq!(value["approverEmail"], json!("grace@example.com"));
    assert_eq!(value["id"], json!(pending.id().to_string()));
    assert!(value.get("createdAt").is_some());
}

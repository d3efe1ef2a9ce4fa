//! PostgreSQL-backed `RequestRepository`.
//!
//! Status decisions use a conditional `UPDATE ... WHERE status = 'Pending'`,
//! so two concurrent approvers cannot both win.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use tracing::warn;

use crate::domain::ports::{RequestRepository, RequestRepositoryError};
use crate::domain::{
    ApprovalRequest, ApprovalRequestParts, EmailAddress, RequestFilter, RequestId, RequestStatus,
    RequestType, StatusDecision, Urgency,
};

use super::error_mapping::{DieselFailure, classify_diesel_error, pool_error_message};
use super::models::{NewRequestRow, RequestRow, RequestStatusUpdate};
use super::pool::DbPool;
use super::schema::requests;

/// Diesel implementation of [`RequestRepository`].
#[derive(Clone)]
pub struct DieselRequestRepository {
    pool: DbPool,
}

impl DieselRequestRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_diesel_error(error: diesel::result::Error, operation: &'static str) -> RequestRepositoryError {
    match classify_diesel_error(error, operation) {
        DieselFailure::Connection(message) => RequestRepositoryError::connection(message),
        DieselFailure::UniqueViolation(message) | DieselFailure::Query(message) => {
            RequestRepositoryError::query(message)
        }
    }
}

fn corrupt(id: uuid::Uuid, column: &str, value: &str) -> RequestRepositoryError {
    warn!(%id, column, value, "stored request row failed validation");
    RequestRepositoryError::query(format!("stored request {id} has invalid {column}"))
}

fn row_to_request(row: RequestRow) -> Result<ApprovalRequest, RequestRepositoryError> {
    let id = row.id;
    let request_type: RequestType = row
        .request_type
        .parse()
        .map_err(|_| corrupt(id, "request_type", &row.request_type))?;
    let urgency: Urgency = row
        .urgency
        .parse()
        .map_err(|_| corrupt(id, "urgency", &row.urgency))?;
    let status = RequestStatus::from_stored(&row.status)
        .ok_or_else(|| corrupt(id, "status", &row.status))?;
    let requester_email = EmailAddress::new(&row.requester_email)
        .map_err(|_| corrupt(id, "requester_email", &row.requester_email))?;
    let approver_email = EmailAddress::new(&row.approver_email)
        .map_err(|_| corrupt(id, "approver_email", &row.approver_email))?;

    Ok(ApprovalRequest::from_parts(ApprovalRequestParts {
        id: RequestId::from_uuid(id),
        title: row.title,
        description: row.description,
        request_type,
        urgency,
        requester_email,
        approver_email,
        status,
        created_at: row.created_at,
        updated_at: row.updated_at,
    }))
}

#[async_trait]
impl RequestRepository for DieselRequestRepository {
    async fn insert(&self, request: &ApprovalRequest) -> Result<(), RequestRepositoryError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| RequestRepositoryError::connection(pool_error_message(err)))?;
        let row = NewRequestRow {
            id: *request.id().as_uuid(),
            title: request.title(),
            description: request.description(),
            request_type: request.request_type().as_str(),
            urgency: request.urgency().as_str(),
            requester_email: request.requester_email().as_str(),
            approver_email: request.approver_email().as_str(),
            status: request.status().as_str(),
            created_at: request.created_at(),
            updated_at: request.updated_at(),
        };
        diesel::insert_into(requests::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(|err| map_diesel_error(err, "insert request"))
    }

    async fn list(
        &self,
        filter: &RequestFilter,
    ) -> Result<Vec<ApprovalRequest>, RequestRepositoryError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| RequestRepositoryError::connection(pool_error_message(err)))?;

        let mut query = requests::table.into_boxed();
        match filter {
            RequestFilter::Requester { email } => {
                query = query.filter(requests::requester_email.eq(email.as_str().to_owned()));
            }
            RequestFilter::Approver { email, include_all } => {
                query = query.filter(requests::approver_email.eq(email.as_str().to_owned()));
                if !include_all {
                    query = query.filter(requests::status.eq(RequestStatus::Pending.as_str()));
                }
            }
        }

        let rows: Vec<RequestRow> = query
            .order((requests::created_at.desc(), requests::id.asc()))
            .select(RequestRow::as_select())
            .load(&mut conn)
            .await
            .map_err(|err| map_diesel_error(err, "list requests"))?;
        rows.into_iter().map(row_to_request).collect()
    }

    async fn decide(
        &self,
        id: &RequestId,
        decision: StatusDecision,
        decided_at: DateTime<Utc>,
    ) -> Result<ApprovalRequest, RequestRepositoryError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| RequestRepositoryError::connection(pool_error_message(err)))?;

        let update = RequestStatusUpdate {
            status: decision.target_status().as_str(),
            updated_at: decided_at,
        };
        let updated: Option<RequestRow> = diesel::update(
            requests::table
                .filter(requests::id.eq(id.as_uuid()))
                .filter(requests::status.eq(RequestStatus::Pending.as_str())),
        )
        .set(&update)
        .returning(RequestRow::as_returning())
        .get_result(&mut conn)
        .await
        .optional()
        .map_err(|err| map_diesel_error(err, "decide request"))?;

        if let Some(row) = updated {
            return row_to_request(row);
        }

        // Nothing matched: either the id is unknown or the request is settled.
        let current: Option<RequestRow> = requests::table
            .filter(requests::id.eq(id.as_uuid()))
            .select(RequestRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(|err| map_diesel_error(err, "reload request"))?;
        match current {
            None => Err(RequestRepositoryError::not_found(*id)),
            Some(row) => {
                let request = row_to_request(row)?;
                Err(RequestRepositoryError::already_decided(request.status()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rstest::{fixture, rstest};
    use uuid::Uuid;

    #[fixture]
    fn row() -> RequestRow {
        let at = Utc
            .with_ymd_and_hms(2026, 3, 1, 12, 0, 0)
            .single()
            .expect("fixture time");
        RequestRow {
            id: Uuid::from_u128(1),
            title: "Laptop".into(),
            description: "Replacement".into(),
            request_type: "Equipment".into(),
            urgency: "High".into(),
            requester_email: "ada@example.com".into(),
            approver_email: "grace@example.com".into(),
            status: "Approved".into(),
            created_at: at,
            updated_at: at,
        }
    }

    #[rstest]
    fn converts_valid_rows(row: RequestRow) {
        let request = row_to_request(row).expect("valid row");
        assert_eq!(request.request_type(), RequestType::Equipment);
        assert_eq!(request.urgency(), Urgency::High);
        assert_eq!(request.status(), RequestStatus::Approved);
        assert_eq!(request.approver_email().as_str(), "grace@example.com");
    }

    #[rstest]
    #[case::status(|r: &mut RequestRow| r.status = "Archived".into())]
    #[case::request_type(|r: &mut RequestRow| r.request_type = "leave".into())]
    #[case::urgency(|r: &mut RequestRow| r.urgency = "Urgent".into())]
    #[case::email(|r: &mut RequestRow| r.requester_email = " ".into())]
    fn rejects_corrupt_rows(mut row: RequestRow, #[case] corrupt_row: fn(&mut RequestRow)) {
        corrupt_row(&mut row);
        assert!(matches!(
            row_to_request(row),
            Err(RequestRepositoryError::Query { .. })
        ));
    }
}

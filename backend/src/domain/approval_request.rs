//! Approval request aggregate and its lifecycle vocabulary.
//!
//! A request is created `Pending` and is decided exactly once, moving to
//! `Approved` or `Rejected`. Everything except the status is immutable after
//! creation.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::user::EmailAddress;

/// Validation errors raised while building or parsing request values.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RequestValidationError {
    /// One or more required fields were absent or blank.
    #[error("all fields are required")]
    MissingFields {
        /// Wire names of the missing fields, in declaration order.
        fields: Vec<&'static str>,
    },
    /// `type` was not one of the supported request types.
    #[error("type must be one of Leave, Equipment, Overtime")]
    InvalidType { value: String },
    /// `urgency` was not one of the supported urgency levels.
    #[error("urgency must be one of Low, Medium, High")]
    InvalidUrgency { value: String },
    /// The identifier was not a UUID.
    #[error("invalid request id")]
    InvalidId { value: String },
    /// The requested decision was neither `approved` nor `rejected`.
    #[error("invalid status value; must be either \"approved\" or \"rejected\"")]
    InvalidDecision { value: String },
    /// The listing role was neither `requester` nor `approver`.
    #[error("invalid role; must be either \"requester\" or \"approver\"")]
    InvalidRole { value: String },
}

/// Stable request identifier stored as a UUID.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(Uuid);

impl RequestId {
    /// Parse an identifier from untrusted input.
    ///
    /// # Examples
    /// ```
    /// use approvals::domain::RequestId;
    ///
    /// assert!(RequestId::parse("3fa85f64-5717-4562-b3fc-2c963f66afa6").is_ok());
    /// assert!(RequestId::parse("42").is_err());
    /// ```
    pub fn parse(raw: &str) -> Result<Self, RequestValidationError> {
        let trimmed = raw.trim();
        Uuid::parse_str(trimmed)
            .map(Self)
            .map_err(|_| RequestValidationError::InvalidId {
                value: raw.to_owned(),
            })
    }

    /// Generate a fresh identifier.
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wrap an identifier read from storage.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Access the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

macro_rules! wire_enum {
    (
        $(#[$meta:meta])*
        $name:ident, $error:ident { $($variant:ident => $wire:literal),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
        pub enum $name {
            $(
                #[serde(rename = $wire)]
                $variant,
            )+
        }

        impl $name {
            /// Canonical wire and storage spelling.
            pub fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $wire,)+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = RequestValidationError;

            fn from_str(value: &str) -> Result<Self, Self::Err> {
                match value {
                    $($wire => Ok(Self::$variant),)+
                    other => Err(RequestValidationError::$error {
                        value: other.to_owned(),
                    }),
                }
            }
        }
    };
}

wire_enum! {
    /// Category of an approval request.
    RequestType, InvalidType {
        Leave => "Leave",
        Equipment => "Equipment",
        Overtime => "Overtime",
    }
}

wire_enum! {
    /// How quickly the requester needs a decision.
    Urgency, InvalidUrgency {
        Low => "Low",
        Medium => "Medium",
        High => "High",
    }
}

/// Lifecycle state of a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum RequestStatus {
    /// Awaiting a decision.
    Pending,
    /// Accepted by the approver.
    Approved,
    /// Declined by the approver.
    Rejected,
}

impl RequestStatus {
    /// Canonical wire and storage spelling.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Approved => "Approved",
            Self::Rejected => "Rejected",
        }
    }

    /// Parse the storage spelling.
    pub fn from_stored(value: &str) -> Option<Self> {
        match value {
            "Pending" => Some(Self::Pending),
            "Approved" => Some(Self::Approved),
            "Rejected" => Some(Self::Rejected),
            _ => None,
        }
    }

    /// Whether no further transition is defined out of this state.
    pub fn is_terminal(self) -> bool {
        !matches!(self, Self::Pending)
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Decision an approver can take on a pending request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusDecision {
    /// Move the request to [`RequestStatus::Approved`].
    Approved,
    /// Move the request to [`RequestStatus::Rejected`].
    Rejected,
}

impl StatusDecision {
    /// Parse `approved`/`rejected`, ignoring case and surrounding whitespace.
    ///
    /// # Examples
    /// ```
    /// use approvals::domain::StatusDecision;
    ///
    /// assert_eq!(StatusDecision::parse("APPROVED").unwrap(), StatusDecision::Approved);
    /// assert!(StatusDecision::parse("pending").is_err());
    /// ```
    pub fn parse(raw: &str) -> Result<Self, RequestValidationError> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "approved" => Ok(Self::Approved),
            "rejected" => Ok(Self::Rejected),
            _ => Err(RequestValidationError::InvalidDecision {
                value: raw.to_owned(),
            }),
        }
    }

    /// Status the request holds once this decision is applied.
    pub fn target_status(self) -> RequestStatus {
        match self {
            Self::Approved => RequestStatus::Approved,
            Self::Rejected => RequestStatus::Rejected,
        }
    }
}

/// Perspective from which a user lists requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    /// The user created the requests.
    Requester,
    /// The user is named as the approver.
    Approver,
}

impl FromStr for Role {
    type Err = RequestValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "requester" => Ok(Self::Requester),
            "approver" => Ok(Self::Approver),
            other => Err(RequestValidationError::InvalidRole {
                value: other.to_owned(),
            }),
        }
    }
}

/// Selection applied when listing requests for a user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestFilter {
    /// Every request created by `email`.
    Requester { email: EmailAddress },
    /// Requests naming `email` as approver; pending only unless `include_all`.
    Approver {
        email: EmailAddress,
        include_all: bool,
    },
}

impl RequestFilter {
    /// Build the filter for a role.
    pub fn for_role(email: EmailAddress, role: Role, include_all: bool) -> Self {
        match role {
            Role::Requester => Self::Requester { email },
            Role::Approver => Self::Approver { email, include_all },
        }
    }

    /// Whether `request` belongs in this selection.
    pub fn matches(&self, request: &ApprovalRequest) -> bool {
        match self {
            Self::Requester { email } => request.requester_email() == email,
            Self::Approver { email, include_all } => {
                request.approver_email() == email
                    && (*include_all || request.status() == RequestStatus::Pending)
            }
        }
    }
}

/// Raw, possibly incomplete request fields as received at the boundary.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApprovalRequestDraft {
    /// Short summary, wire name `title`.
    pub title: Option<String>,
    /// Free-form justification, wire name `description`.
    pub description: Option<String>,
    /// Raw `type`, checked against [`RequestType`].
    pub request_type: Option<String>,
    /// Raw `urgency`, checked against [`Urgency`].
    pub urgency: Option<String>,
    /// Wire name `requesterEmail`.
    pub requester_email: Option<String>,
    /// Wire name `approverEmail`.
    pub approver_email: Option<String>,
}

/// Validated input for creating a request.
///
/// ## Invariants
/// - `title` and `description` are non-empty once trimmed.
/// - Both email addresses are non-blank.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewApprovalRequest {
    title: String,
    description: String,
    request_type: RequestType,
    urgency: Urgency,
    requester_email: EmailAddress,
    approver_email: EmailAddress,
}

fn present(value: Option<&String>) -> Option<&str> {
    value.map(String::as_str).filter(|v| !v.trim().is_empty())
}

fn draft_email(field: &'static str, raw: &str) -> Result<EmailAddress, RequestValidationError> {
    EmailAddress::new(raw).map_err(|_| RequestValidationError::MissingFields {
        fields: vec![field],
    })
}

impl NewApprovalRequest {
    /// Validate a draft, reporting every missing field before any other error.
    ///
    /// # Examples
    /// ```
    /// use approvals::domain::{ApprovalRequestDraft, NewApprovalRequest};
    ///
    /// let draft = ApprovalRequestDraft {
    ///     title: Some("Leave".into()),
    ///     description: Some("d".into()),
    ///     request_type: Some("Leave".into()),
    ///     urgency: Some("Medium".into()),
    ///     requester_email: Some("a@x.com".into()),
    ///     approver_email: Some("b@x.com".into()),
    /// };
    /// assert!(NewApprovalRequest::try_from_draft(draft).is_ok());
    /// ```
    pub fn try_from_draft(draft: ApprovalRequestDraft) -> Result<Self, RequestValidationError> {
        let fields = [
            ("title", present(draft.title.as_ref())),
            ("description", present(draft.description.as_ref())),
            ("type", present(draft.request_type.as_ref())),
            ("urgency", present(draft.urgency.as_ref())),
            ("requesterEmail", present(draft.requester_email.as_ref())),
            ("approverEmail", present(draft.approver_email.as_ref())),
        ];
        let missing: Vec<&'static str> = fields
            .iter()
            .filter(|(_, value)| value.is_none())
            .map(|(name, _)| *name)
            .collect();
        let [
            (_, Some(title)),
            (_, Some(description)),
            (_, Some(request_type)),
            (_, Some(urgency)),
            (_, Some(requester_email)),
            (_, Some(approver_email)),
        ] = fields
        else {
            return Err(RequestValidationError::MissingFields { fields: missing });
        };

        let request_type = request_type.parse::<RequestType>()?;
        let urgency = urgency.parse::<Urgency>()?;
        let requester_email = draft_email("requesterEmail", requester_email)?;
        let approver_email = draft_email("approverEmail", approver_email)?;

        Ok(Self {
            title: title.trim().to_owned(),
            description: description.trim().to_owned(),
            request_type,
            urgency,
            requester_email,
            approver_email,
        })
    }

    /// Short title shown to both parties.
    pub fn title(&self) -> &str {
        self.title.as_str()
    }

    /// Address of the person asking.
    pub fn requester_email(&self) -> &EmailAddress {
        &self.requester_email
    }

    /// Address of the person deciding.
    pub fn approver_email(&self) -> &EmailAddress {
        &self.approver_email
    }
}

/// Stored fields used to rebuild an [`ApprovalRequest`].
#[derive(Debug, Clone)]
pub struct ApprovalRequestParts {
    /// Stored identifier.
    pub id: RequestId,
    pub title: String,
    pub description: String,
    pub request_type: RequestType,
    pub urgency: Urgency,
    /// Address of the person who asked.
    pub requester_email: EmailAddress,
    /// Address of the person deciding.
    pub approver_email: EmailAddress,
    /// Current lifecycle state.
    pub status: RequestStatus,
    /// Creation instant, never changed afterwards.
    pub created_at: DateTime<Utc>,
    /// Instant of the last status change, or `created_at`.
    pub updated_at: DateTime<Utc>,
}

/// Error returned when a decision is applied to an already decided request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("request has already been {current}")]
pub struct AlreadyDecided {
    /// Status the request currently holds.
    pub current: RequestStatus,
}

/// Approval request.
///
/// Serialised in camelCase for HTTP responses, with the request category
/// exposed as `type`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApprovalRequest {
    #[schema(value_type = String, example = "3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    id: RequestId,
    #[schema(example = "Annual leave")]
    title: String,
    description: String,
    #[serde(rename = "type")]
    request_type: RequestType,
    urgency: Urgency,
    #[schema(value_type = String, example = "ada@example.com")]
    requester_email: EmailAddress,
    #[schema(value_type = String, example = "grace@example.com")]
    approver_email: EmailAddress,
    status: RequestStatus,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl ApprovalRequest {
    /// Open a new pending request.
    pub fn open(input: NewApprovalRequest, id: RequestId, now: DateTime<Utc>) -> Self {
        let NewApprovalRequest {
            title,
            description,
            request_type,
            urgency,
            requester_email,
            approver_email,
        } = input;
        Self {
            id,
            title,
            description,
            request_type,
            urgency,
            requester_email,
            approver_email,
            status: RequestStatus::Pending,
            created_at: now,
            updated_at: now,
        }
    }

    /// Rebuild a request from stored fields.
    pub fn from_parts(parts: ApprovalRequestParts) -> Self {
        let ApprovalRequestParts {
            id,
            title,
            description,
            request_type,
            urgency,
            requester_email,
            approver_email,
            status,
            created_at,
            updated_at,
        } = parts;
        Self {
            id,
            title,
            description,
            request_type,
            urgency,
            requester_email,
            approver_email,
            status,
            created_at,
            updated_at,
        }
    }

    /// Apply a decision to a pending request.
    pub fn decide(
        mut self,
        decision: StatusDecision,
        now: DateTime<Utc>,
    ) -> Result<Self, AlreadyDecided> {
        if self.status.is_terminal() {
            return Err(AlreadyDecided {
                current: self.status,
            });
        }
        self.status = decision.target_status();
        self.updated_at = now;
        Ok(self)
    }

    /// Stable request identifier.
    pub fn id(&self) -> RequestId {
        self.id
    }

    /// Short summary shown in listings.
    pub fn title(&self) -> &str {
        self.title.as_str()
    }

    /// Free-form justification.
    pub fn description(&self) -> &str {
        self.description.as_str()
    }

    /// Request category.
    pub fn request_type(&self) -> RequestType {
        self.request_type
    }

    /// Urgency chosen by the requester.
    pub fn urgency(&self) -> Urgency {
        self.urgency
    }

    /// Address of the person who asked.
    pub fn requester_email(&self) -> &EmailAddress {
        &self.requester_email
    }

    /// Address of the person deciding.
    pub fn approver_email(&self) -> &EmailAddress {
        &self.approver_email
    }

    /// Current lifecycle state.
    pub fn status(&self) -> RequestStatus {
        self.status
    }

    /// Creation instant.
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Instant of the last status change.
    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}

#[cfg(test)]
mod tests;

//! Notification events and delivery outcomes.
//!
//! Events know their subject, body and recipients. Delivery is handled by a
//! [`NotificationDispatcher`](super::ports::NotificationDispatcher).

use super::approval_request::{ApprovalRequest, RequestStatus};
use super::user::EmailAddress;

/// Subject used when a request is created.
pub const REQUEST_CREATED_SUBJECT: &str = "New Request Created";
/// Subject used when a request is approved or rejected.
pub const STATUS_CHANGED_SUBJECT: &str = "Request Status Update";
/// Subject used by the standalone approval announcement.
pub const APPROVED_SUBJECT: &str = "Request Approval Notification";
/// Subject used after a successful login.
pub const LOGIN_SUBJECT: &str = "Successful Login Notification";
/// Subject used after a logout.
pub const LOGOUT_SUBJECT: &str = "Logout Notification";

/// Something that happened and should be announced by email.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotificationEvent {
    /// A request was created; both parties are told.
    RequestCreated {
        requester: EmailAddress,
        approver: EmailAddress,
        title: String,
    },
    /// A request was decided; both parties are told.
    StatusChanged {
        requester: EmailAddress,
        approver: EmailAddress,
        title: String,
        status: RequestStatus,
    },
    /// A request was approved, announced without a status field.
    Approved {
        requester: EmailAddress,
        approver: EmailAddress,
        title: String,
    },
    /// A user logged in.
    Login { email: EmailAddress },
    /// A user logged out.
    Logout { email: EmailAddress },
}

impl NotificationEvent {
    /// Announce a freshly created request.
    pub fn request_created(request: &ApprovalRequest) -> Self {
        Self::RequestCreated {
            requester: request.requester_email().clone(),
            approver: request.approver_email().clone(),
            title: request.title().to_owned(),
        }
    }

    /// Announce the decision taken on a request.
    pub fn status_changed(request: &ApprovalRequest) -> Self {
        Self::StatusChanged {
            requester: request.requester_email().clone(),
            approver: request.approver_email().clone(),
            title: request.title().to_owned(),
            status: request.status(),
        }
    }

    /// Short label used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::RequestCreated { .. } => "request_created",
            Self::StatusChanged { .. } => "status_changed",
            Self::Approved { .. } => "approved",
            Self::Login { .. } => "login",
            Self::Logout { .. } => "logout",
        }
    }

    /// Email subject line.
    pub fn subject(&self) -> &'static str {
        match self {
            Self::RequestCreated { .. } => REQUEST_CREATED_SUBJECT,
            Self::StatusChanged { .. } => STATUS_CHANGED_SUBJECT,
            Self::Approved { .. } => APPROVED_SUBJECT,
            Self::Login { .. } => LOGIN_SUBJECT,
            Self::Logout { .. } => LOGOUT_SUBJECT,
        }
    }

    /// Plain-text email body.
    pub fn body(&self) -> String {
        match self {
            Self::RequestCreated { title, .. } => format!(
                "A new request titled \"{title}\" has been created and requires your approval."
            ),
            Self::StatusChanged { title, status, .. } => format!(
                "The request titled \"{title}\" has been {} by the approver.",
                status.as_str().to_ascii_lowercase()
            ),
            Self::Approved { title, .. } => {
                format!("The request titled \"{title}\" has been approved by the approver.")
            }
            Self::Login { email } => {
                format!("Hello {email},\n\nYou have successfully logged into the application.")
            }
            Self::Logout { email } => {
                format!("Hello {email},\n\nYou have been logged out of the application.")
            }
        }
    }

    /// Distinct recipients in announcement order.
    pub fn recipients(&self) -> Vec<&EmailAddress> {
        match self {
            Self::RequestCreated {
                requester,
                approver,
                ..
            }
            | Self::StatusChanged {
                requester,
                approver,
                ..
            }
            | Self::Approved {
                requester,
                approver,
                ..
            } => {
                if requester == approver {
                    vec![requester]
                } else {
                    vec![requester, approver]
                }
            }
            Self::Login { email } | Self::Logout { email } => vec![email],
        }
    }

    /// Render one email per recipient.
    pub fn emails(&self) -> Vec<OutboundEmail> {
        let subject = self.subject();
        let body = self.body();
        self.recipients()
            .into_iter()
            .map(|to| OutboundEmail {
                to: to.clone(),
                subject: subject.to_owned(),
                body: body.clone(),
            })
            .collect()
    }
}

/// Single email handed to a mail transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundEmail {
    /// Recipient address.
    pub to: EmailAddress,
    /// Subject line.
    pub subject: String,
    /// Plain-text body.
    pub body: String,
}

/// Per-recipient outcome of a dispatch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DispatchReport {
    delivered: Vec<EmailAddress>,
    failed: Vec<EmailAddress>,
    deferred: bool,
}

impl DispatchReport {
    /// Report for a dispatch handed off to a background task.
    pub fn deferred() -> Self {
        Self {
            deferred: true,
            ..Self::default()
        }
    }

    /// Record a successful delivery.
    pub fn record_delivered(&mut self, to: EmailAddress) {
        self.delivered.push(to);
    }

    /// Record a failed or timed-out delivery.
    pub fn record_failed(&mut self, to: EmailAddress) {
        self.failed.push(to);
    }

    /// Recipients the transport accepted.
    pub fn delivered(&self) -> &[EmailAddress] {
        &self.delivered
    }

    /// Recipients whose delivery failed or timed out.
    pub fn failed(&self) -> &[EmailAddress] {
        &self.failed
    }

    /// Whether the outcome is still unknown to the caller.
    pub fn is_deferred(&self) -> bool {
        self.deferred
    }

    /// Whether every recipient was reached.
    pub fn all_delivered(&self) -> bool {
        !self.deferred && self.failed.is_empty()
    }
}

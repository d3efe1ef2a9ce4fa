//! Shared validation helpers for inbound HTTP adapters.

use serde_json::json;

use crate::domain::{EmailAddress, Error, RequestValidationError};

/// Validation error codes reported in `details.code`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ErrorCode {
    MissingField,
    InvalidEnum,
    InvalidUuid,
}

impl ErrorCode {
    fn as_str(self) -> &'static str {
        match self {
            ErrorCode::MissingField => "missing_field",
            ErrorCode::InvalidEnum => "invalid_enum",
            ErrorCode::InvalidUuid => "invalid_uuid",
        }
    }
}

/// Newtype wrapper for HTTP field names to provide type safety.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FieldName(&'static str);

impl FieldName {
    pub(crate) const fn new(name: &'static str) -> Self {
        Self(name)
    }

    fn as_str(&self) -> &'static str {
        self.0
    }
}

fn invalid_value(field: &str, value: &str, code: ErrorCode, message: String) -> Error {
    Error::invalid_request(message).with_details(json!({
        "field": field,
        "value": value,
        "code": code.as_str(),
    }))
}

/// Report every missing field at once.
pub(crate) fn missing_fields_error(message: &str, fields: &[&str]) -> Error {
    Error::invalid_request(message).with_details(json!({
        "fields": fields,
        "code": ErrorCode::MissingField.as_str(),
    }))
}

/// Return `value` when present and not blank.
pub(crate) fn required(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Collect the names of absent fields, preserving order.
pub(crate) fn absent_fields(fields: &[(FieldName, Option<&str>)]) -> Vec<&'static str> {
    fields
        .iter()
        .filter(|(_, value)| required(*value).is_none())
        .map(|(name, _)| name.as_str())
        .collect()
}

/// Parse an email supplied in a path, query or body field.
///
/// Any non-blank value is accepted; a blank one is reported as missing.
pub(crate) fn parse_email(field: FieldName, value: &str) -> Result<EmailAddress, Error> {
    EmailAddress::new(value).map_err(|_| {
        missing_fields_error(&format!("{} is required", field.as_str()), &[field.as_str()])
    })
}

/// Map request validation failures onto the error envelope.
pub(crate) fn map_request_validation_error(err: RequestValidationError) -> Error {
    let message = err.to_string();
    match err {
        RequestValidationError::MissingFields { fields } => {
            missing_fields_error("All fields are required", &fields)
        }
        RequestValidationError::InvalidType { value } => {
            invalid_value("type", &value, ErrorCode::InvalidEnum, message)
        }
        RequestValidationError::InvalidUrgency { value } => {
            invalid_value("urgency", &value, ErrorCode::InvalidEnum, message)
        }
        RequestValidationError::InvalidId { value } => {
            invalid_value("id", &value, ErrorCode::InvalidUuid, message)
        }
        RequestValidationError::InvalidDecision { value } => {
            invalid_value("status", &value, ErrorCode::InvalidEnum, message)
        }
        RequestValidationError::InvalidRole { value } => {
            invalid_value("role", &value, ErrorCode::InvalidEnum, message)
        }
    }
}

// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Request payload validation.
//!
//! Pure functions that classify and normalize the loosely-typed JSON an
//! operator submits. Each failure names exactly one field so the UI can point
//! at it; composite validators check fields in a fixed order and stop at the
//! first failure.

use serde_json::Value;

use crate::{
    duration::CallDuration,
    models::{
        ApplicationId, ApplicationType, BlacklistEntry, ReviewStatus, UpstreamReview,
    },
};

/// A single rejected field. The `Display` text is shown to operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Geçersiz JSON body.")]
    InvalidJson,
    #[error("Geçersiz başvuru tipi.")]
    ApplicationType,
    #[error("Geçersiz application_id.")]
    ApplicationId,
    #[error("Geçersiz status.")]
    Status,
    #[error("Geçersiz görüşme süresi formatı.")]
    CallDuration,
    #[error("Geçersiz email.")]
    Email,
    #[error("Geçersiz phone.")]
    Phone,
    #[error("Geçersiz name.")]
    Name,
    #[error("Geçersiz reason.")]
    Reason,
    #[error("email veya phone parametresi zorunludur.")]
    ContactRequired,
}

impl ValidationError {
    /// Name of the offending field, for logs.
    pub fn field(&self) -> &'static str {
        match self {
            ValidationError::InvalidJson => "body",
            ValidationError::ApplicationType => "application_type",
            ValidationError::ApplicationId => "application_id",
            ValidationError::Status => "status",
            ValidationError::CallDuration => "call_duration",
            ValidationError::Email => "email",
            ValidationError::Phone => "phone",
            ValidationError::Name => "name",
            ValidationError::Reason => "reason",
            ValidationError::ContactRequired => "email|phone",
        }
    }
}

/// Parses a raw request body as JSON.
pub fn parse_body(bytes: &[u8]) -> Result<Value, ValidationError> {
    serde_json::from_slice(bytes).map_err(|_| ValidationError::InvalidJson)
}

pub fn is_application_type(value: &Value) -> bool {
    value.as_str().and_then(ApplicationType::parse).is_some()
}

pub fn is_review_status(value: &Value) -> bool {
    value.as_str().and_then(ReviewStatus::parse).is_some()
}

/// Non-blank string, or any number. Numeric ids are not range-checked.
pub fn is_valid_application_id(value: &Value) -> bool {
    match value {
        Value::String(s) => !s.trim().is_empty(),
        Value::Number(_) => true,
        _ => false,
    }
}

pub fn application_type(value: &Value) -> Result<ApplicationType, ValidationError> {
    value
        .as_str()
        .and_then(ApplicationType::parse)
        .ok_or(ValidationError::ApplicationType)
}

pub fn review_status(value: &Value) -> Result<ReviewStatus, ValidationError> {
    value
        .as_str()
        .and_then(ReviewStatus::parse)
        .ok_or(ValidationError::Status)
}

/// Validates an id and coerces it to its string form. Strings are kept as sent.
pub fn application_id(value: &Value) -> Result<ApplicationId, ValidationError> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Ok(ApplicationId(s.clone())),
        Value::Number(n) => Ok(ApplicationId(n.to_string())),
        _ => Err(ValidationError::ApplicationId),
    }
}

/// A mandatory identity field: must be a string that is not blank after trimming.
/// The original (untrimmed) value is returned.
pub fn required_text(value: &Value, error: ValidationError) -> Result<String, ValidationError> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Ok(s.clone()),
        _ => Err(error),
    }
}

/// Review notes are optional context: absent or null becomes an empty string,
/// other scalars are stringified.
pub fn review_notes(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

pub fn call_duration(value: &Value) -> Result<CallDuration, ValidationError> {
    CallDuration::from_json(value).map_err(|_| ValidationError::CallDuration)
}

/// Validates a review submission in the order type, id, status, duration.
pub fn validate_review(body: &Value) -> Result<UpstreamReview, ValidationError> {
    let application_type = application_type(field(body, "application_type"))?;
    let application_id = application_id(field(body, "application_id"))?;
    let status = review_status(field(body, "status"))?;
    let duration = call_duration(field(body, "call_duration"))?;

    Ok(UpstreamReview {
        application_type,
        application_id,
        status,
        review_notes: review_notes(field(body, "review_notes")),
        call_duration: duration.seconds(),
    })
}

/// Validates a blacklist enrollment in the order type, id, email, phone, name, reason.
pub fn validate_blacklist(body: &Value) -> Result<BlacklistEntry, ValidationError> {
    let application_type = application_type(field(body, "application_type"))?;
    let application_id = application_id(field(body, "application_id"))?;
    let email = required_text(field(body, "email"), ValidationError::Email)?;
    let phone = required_text(field(body, "phone"), ValidationError::Phone)?;
    let name = required_text(field(body, "name"), ValidationError::Name)?;
    let reason = required_text(field(body, "reason"), ValidationError::Reason)?;

    Ok(BlacklistEntry {
        application_type,
        application_id,
        email,
        phone,
        name,
        reason,
    })
}

/// Contact lookup for the blacklist check: trimmed, blank values dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactLookup {
    pub email: Option<String>,
    pub phone: Option<String>,
}

pub fn validate_contact_lookup(
    email: Option<&str>,
    phone: Option<&str>,
) -> Result<ContactLookup, ValidationError> {
    let email = non_blank(email);
    let phone = non_blank(phone);
    if email.is_none() && phone.is_none() {
        return Err(ValidationError::ContactRequired);
    }
    Ok(ContactLookup { email, phone })
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn field<'a>(body: &'a Value, name: &str) -> &'a Value {
    body.get(name).unwrap_or(&Value::Null)
}

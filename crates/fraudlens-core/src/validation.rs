//! Field validation and submit-time normalisation of the assessment form

use chrono::{DateTime, Local, SecondsFormat, TimeZone, Utc};
use fraudlens_client::ScoringRequest;
use fraudlens_utils::parse_naive_datetime;
use serde::Serialize;
use std::collections::BTreeMap;

use crate::error::AssessmentError;
use crate::models::{FormField, FormState};

/// Why a field was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldError {
    InvalidAmount,
    Required,
    InvalidUpiId,
}

impl FieldError {
    /// Inline message shown next to the field
    pub fn message(&self, field: FormField) -> String {
        match (self, field) {
            (FieldError::InvalidAmount, _) => "Please enter a valid amount".to_string(),
            (FieldError::InvalidUpiId, _) => "Enter a valid UPI ID (e.g., name@bank)".to_string(),
            (FieldError::Required, FormField::Sender) => "Sender UPI ID is required".to_string(),
            (FieldError::Required, FormField::Receiver) => "Receiver UPI ID is required".to_string(),
            (FieldError::Required, FormField::Timestamp) => "Transaction time is required".to_string(),
            (FieldError::Required, other) => format!("{} is required", other),
        }
    }
}

/// Per-field validation errors, ordered by field
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ValidationErrors(BTreeMap<FormField, FieldError>);

impl ValidationErrors {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn get(&self, field: FormField) -> Option<FieldError> {
        self.0.get(&field).copied()
    }

    pub fn message(&self, field: FormField) -> Option<String> {
        self.get(field).map(|e| e.message(field))
    }

    pub fn fields(&self) -> Vec<FormField> {
        self.0.keys().copied().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (FormField, FieldError)> + '_ {
        self.0.iter().map(|(f, e)| (*f, *e))
    }

    /// The same errors in the shared error taxonomy
    pub fn to_errors(&self) -> Vec<AssessmentError> {
        self.iter()
            .map(|(field, error)| AssessmentError::Validation {
                field: field.to_string(),
                message: error.message(field),
            })
            .collect()
    }

    pub(crate) fn insert(&mut self, field: FormField, error: FieldError) {
        self.0.insert(field, error);
    }

    pub(crate) fn remove(&mut self, field: FormField) {
        self.0.remove(&field);
    }

    pub(crate) fn clear(&mut self) {
        self.0.clear();
    }
}

/// Parse the amount text. Whitespace is ignored; non-finite values are rejected.
pub fn parse_amount(raw: &str) -> Option<f64> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    raw.parse::<f64>().ok().filter(|v| v.is_finite())
}

fn check_upi_id(errors: &mut ValidationErrors, field: FormField, value: &str) {
    if value.trim().is_empty() {
        errors.insert(field, FieldError::Required);
    } else if !value.contains('@') {
        errors.insert(field, FieldError::InvalidUpiId);
    }
}

/// Validate a draft. An empty result means the draft may be submitted.
pub fn validate(draft: &FormState) -> ValidationErrors {
    let mut errors = ValidationErrors::default();

    if !parse_amount(&draft.amount).map_or(false, |amount| amount > 0.0) {
        errors.insert(FormField::Amount, FieldError::InvalidAmount);
    }

    check_upi_id(&mut errors, FormField::Sender, &draft.sender);
    check_upi_id(&mut errors, FormField::Receiver, &draft.receiver);

    if draft.timestamp.trim().is_empty() {
        errors.insert(FormField::Timestamp, FieldError::Required);
    }

    errors
}

/// Normalise a form timestamp to an ISO-8601 UTC instant with millisecond
/// precision (`2024-06-01T10:00:00.000Z`).
///
/// Input carrying an offset is converted as-is; input without one is read in
/// the local time zone, the way a `datetime-local` control is interpreted.
pub fn normalize_timestamp(raw: &str) -> Option<String> {
    let raw = raw.trim();
    let instant = match DateTime::parse_from_rfc3339(raw) {
        Ok(dt) => dt.with_timezone(&Utc),
        Err(_) => {
            let naive = parse_naive_datetime(raw)?;
            Local
                .from_local_datetime(&naive)
                .earliest()?
                .with_timezone(&Utc)
        }
    };
    Some(instant.to_rfc3339_opts(SecondsFormat::Millis, true))
}

/// Build the scoring request from a validated draft
///
/// Fails with the message of the first field that cannot be normalised.
pub fn build_request(draft: &FormState) -> Result<ScoringRequest, String> {
    let amount = parse_amount(&draft.amount).ok_or_else(|| "Invalid amount".to_string())?;
    let timestamp = normalize_timestamp(&draft.timestamp)
        .ok_or_else(|| "Invalid time value".to_string())?;

    Ok(ScoringRequest {
        amount,
        sender: draft.sender.clone(),
        receiver: draft.receiver.clone(),
        timestamp,
        description: draft.description.clone().filter(|d| !d.trim().is_empty()),
        category: Some(draft.category),
    })
}

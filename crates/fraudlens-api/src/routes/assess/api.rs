//! Assessment API endpoints - JSON API and HTMX partial responses
//!
//! Endpoints:
//! - api_assessment: Current state, draft and field errors (JSON)
//! - htmx_assess_field: Update draft fields (error slot fragment)
//! - htmx_assess_submit: Apply the posted form and submit (panel fragment)
//! - htmx_assess_reset: Start a new check (panel fragment)
//! - htmx_assess_dismiss: Clear the submission notice (panel fragment)

use super::page::{render_assessment_panel, render_field_error};
use crate::{parse_form_body, ApiError, AppState};
use axum::response::Html;
use fraudlens_core::{
    AssessedTransaction, ErrorDetails, FormField, FormState, RiskAssessmentViewModel, ValidationErrors,
};
use serde::Serialize;
use std::collections::HashMap;

#[derive(Serialize)]
struct AssessmentResponse<'a> {
    state: &'static str,
    result: Option<&'a AssessedTransaction>,
    form: &'a FormState,
    field_errors: &'a ValidationErrors,
    submission_error: Option<ErrorDetails>,
}

/// Current assessment state (JSON API)
pub async fn api_assessment(state: axum::extract::State<AppState>) -> String {
    let vm = state.assessment.read().await;
    let response = AssessmentResponse {
        state: vm.state().as_str(),
        result: vm.result(),
        form: vm.form(),
        field_errors: vm.field_errors(),
        submission_error: vm.submission_error().map(|error| error.to_details()),
    };
    serde_json::to_string(&response).unwrap_or_default()
}

/// Copy posted `field=value` pairs onto the draft, in field order
fn apply_fields(
    vm: &mut RiskAssessmentViewModel,
    params: &HashMap<String, String>,
) -> Result<Vec<FormField>, ApiError> {
    let mut fields = Vec::new();
    for (name, value) in params {
        let field = name
            .parse::<FormField>()
            .map_err(|message| ApiError::BadRequest { message })?;
        fields.push((field, value));
    }
    fields.sort_by_key(|(field, _)| *field);

    let mut updated = Vec::with_capacity(fields.len());
    for (field, value) in fields {
        vm.update_field(field, value.as_str())?;
        updated.push(field);
    }
    Ok(updated)
}

/// HTMX: Update one or more draft fields
///
/// Returns the inline error slot of the (first) updated field, which is now
/// empty.
pub async fn htmx_assess_field(
    state: axum::extract::State<AppState>,
    body: String,
) -> Result<Html<String>, ApiError> {
    let params = parse_form_body(&body);
    let mut vm = state.assessment.write().await;
    let updated = apply_fields(&mut vm, &params)?;

    Ok(Html(match updated.first() {
        Some(field) => render_field_error(&vm, *field),
        None => String::new(),
    }))
}

/// HTMX: Submit the posted form for scoring
pub async fn htmx_assess_submit(
    state: axum::extract::State<AppState>,
    body: String,
) -> Result<Html<String>, ApiError> {
    let params = parse_form_body(&body);
    {
        let mut vm = state.assessment.write().await;
        apply_fields(&mut vm, &params)?;
    }

    let outcome = RiskAssessmentViewModel::submit_shared(&state.assessment).await?;
    log::debug!("Submission finished: {:?}", outcome);

    let vm = state.assessment.read().await;
    Ok(Html(render_assessment_panel(&vm, &state.config)))
}

/// HTMX: New check
pub async fn htmx_assess_reset(state: axum::extract::State<AppState>) -> Html<String> {
    let mut vm = state.assessment.write().await;
    vm.reset();
    Html(render_assessment_panel(&vm, &state.config))
}

/// HTMX: Dismiss the submission notice
pub async fn htmx_assess_dismiss(state: axum::extract::State<AppState>) -> Html<String> {
    let mut vm = state.assessment.write().await;
    vm.dismiss_error();
    Html(render_assessment_panel(&vm, &state.config))
}

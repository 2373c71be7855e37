//! Assessment page rendering
//!
//! Endpoints:
//! - page_assess: Transaction check page
//!
//! Helper functions:
//! - render_assessment_panel: Form or verdict, whichever the state calls for
//! - render_field_error: Inline error slot of one field

use crate::AppState;
use fraudlens_client::Category;
use fraudlens_config::Config;
use fraudlens_core::{AssessedTransaction, AssessmentState, FormField, RiskAssessmentViewModel, SuggestedAction};
use fraudlens_utils::{escape_html, format_currency, format_timestamp};

pub async fn page_assess(
    state: axum::extract::State<AppState>,
    headers: axum::http::HeaderMap,
) -> axum::response::Html<String> {
    let vm = state.assessment.read().await;
    let inner_content = format!(
        "<h2>Check Transaction</h2><div id='assessment-panel'>{}</div>",
        render_assessment_panel(&vm, &state.config)
    );
    axum::response::Html(crate::page_response(&headers, "Check Transaction", "/assess", &inner_content))
}

pub fn render_assessment_panel(vm: &RiskAssessmentViewModel, config: &Config) -> String {
    match vm.state() {
        AssessmentState::Result(assessed) => render_result(assessed, config),
        AssessmentState::Editing | AssessmentState::Submitting => render_form(vm),
    }
}

pub fn render_field_error(vm: &RiskAssessmentViewModel, field: FormField) -> String {
    match vm.field_errors().message(field) {
        Some(message) => format!("<span class='field-error'>{}</span>", escape_html(&message)),
        None => String::new(),
    }
}

fn render_form(vm: &RiskAssessmentViewModel) -> String {
    let form = vm.form();
    let mut html = String::new();

    if let Some(error) = vm.submission_error() {
        html.push_str(&format!(
            r#"<div class='notice notice-error' role='alert'>{}
    <button hx-post='/assess/dismiss' hx-target='#assessment-panel'>Dismiss</button>
</div>"#,
            escape_html(&error.user_message())
        ));
    }

    html.push_str("<form hx-post='/assess/submit' hx-target='#assessment-panel'>");
    html.push_str(&text_input(vm, FormField::Amount, "Amount (₹)", "number", &form.amount, "0.00"));
    html.push_str(&text_input(vm, FormField::Sender, "Sender UPI ID", "text", &form.sender, "name@bank"));
    html.push_str(&text_input(vm, FormField::Receiver, "Receiver UPI ID", "text", &form.receiver, "name@bank"));
    html.push_str(&text_input(
        vm,
        FormField::Timestamp,
        "Transaction Time",
        "datetime-local",
        &form.timestamp,
        "",
    ));

    html.push_str("<label>Category <select name='category' hx-post='/assess/field' hx-trigger='change' hx-target='#error-category'>");
    for category in Category::ALL {
        let selected = if category == form.category { " selected" } else { "" };
        html.push_str(&format!(
            "<option value='{}'{}>{}</option>",
            category.as_str(),
            selected,
            category.label()
        ));
    }
    html.push_str("</select></label><span id='error-category'></span>");

    html.push_str(&format!(
        "<label>Description <textarea name='description' hx-post='/assess/field' hx-trigger='change' hx-target='#error-description'>{}</textarea></label><span id='error-description'></span>",
        escape_html(form.description.as_deref().unwrap_or(""))
    ));

    if vm.is_submitting() {
        html.push_str("<button type='submit' disabled>Analyzing...</button>");
    } else {
        html.push_str("<button type='submit'>Check for Fraud</button>");
    }
    html.push_str("<button type='button' hx-post='/assess/reset' hx-target='#assessment-panel'>Reset</button>");
    html.push_str("</form>");
    html
}

fn text_input(
    vm: &RiskAssessmentViewModel,
    field: FormField,
    label: &str,
    input_type: &str,
    value: &str,
    placeholder: &str,
) -> String {
    format!(
        r#"<label>{label} <input type='{input_type}' name='{name}' value='{value}' placeholder='{placeholder}'
    hx-post='/assess/field' hx-trigger='change' hx-target='#error-{name}'></label>
<span id='error-{name}'>{error}</span>"#,
        label = label,
        input_type = input_type,
        name = field,
        value = escape_html(value),
        placeholder = placeholder,
        error = render_field_error(vm, field)
    )
}

fn render_result(assessed: &AssessedTransaction, config: &Config) -> String {
    let verdict = &assessed.verdict;
    let request = &assessed.request;
    let status_class = if verdict.is_fraud { "fraud" } else { "legit" };

    let mut html = format!(
        r#"<section class='result {status_class}'>
<h3>{headline}</h3>
<div class='risk-meter'>
    <div class='risk-fill' style='width: {percent:.0}%; background: {color}'></div>
</div>
<p>Risk level: <strong style='color: {color}'>{tier}</strong> ({percent:.1}%)</p>"#,
        status_class = status_class,
        headline = assessed.headline(),
        percent = assessed.risk_percent(),
        color = assessed.risk.color_hint,
        tier = assessed.tier()
    );

    if !verdict.risk_factors().is_empty() {
        html.push_str("<h4>Risk Factors</h4><ul class='risk-factors'>");
        for factor in verdict.risk_factors() {
            html.push_str(&format!("<li>{}</li>", escape_html(factor)));
        }
        html.push_str("</ul>");
    }
    if let Some(recommendation) = &verdict.recommendation {
        html.push_str(&format!(
            "<h4>Recommendation</h4><p class='recommendation'>{}</p>",
            escape_html(recommendation)
        ));
    }

    html.push_str(&format!(
        r#"<h4>Transaction Details</h4>
<dl>
    <dt>Amount</dt><dd>{}</dd>
    <dt>From</dt><dd>{}</dd>
    <dt>To</dt><dd>{}</dd>
    <dt>Time</dt><dd>{}</dd>
    <dt>Category</dt><dd>{}</dd>"#,
        format_currency(request.amount, &config.currency),
        escape_html(&request.sender),
        escape_html(&request.receiver),
        escape_html(&format_timestamp(&request.timestamp)),
        request.category.unwrap_or_default().label()
    ));
    if let Some(description) = &request.description {
        html.push_str(&format!("<dt>Description</dt><dd>{}</dd>", escape_html(description)));
    }
    html.push_str("</dl><div class='result-actions'>");

    for action in assessed.suggested_actions() {
        match action {
            SuggestedAction::NewCheck => html.push_str(&format!(
                "<button hx-post='/assess/reset' hx-target='#assessment-panel'>{}</button>",
                action.label()
            )),
            _ => html.push_str(&format!("<button type='button'>{}</button>", action.label())),
        }
    }
    html.push_str("</div></section>");
    html
}

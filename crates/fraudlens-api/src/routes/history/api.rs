//! History API endpoints - JSON API and HTMX partial responses
//!
//! Endpoints:
//! - api_history: Current page and summary (JSON)
//! - htmx_history_list: Apply search/sort/page and re-render (HTML fragment)
//! - htmx_history_reload: Fetch the record set again (HTML fragment)
//! - htmx_history_dismiss: Clear the load failure notice (HTML fragment)

use super::page::render_history_list;
use crate::{ApiError, AppState};
use axum::extract::Query;
use axum::response::Html;
use fraudlens_client::TransactionRecord;
use fraudlens_core::{
    ErrorDetails, HistorySummary, LoadStatus, SortDirection, SortKey, TransactionHistoryViewModel,
};
use serde::Serialize;
use std::collections::HashMap;

#[derive(Serialize)]
struct HistoryResponse<'a> {
    status: &'a LoadStatus,
    last_error: Option<ErrorDetails>,
    search_term: &'a str,
    sort_key: SortKey,
    sort_direction: SortDirection,
    page: usize,
    total_pages: usize,
    summary: HistorySummary,
    items: Vec<&'a TransactionRecord>,
}

/// Current view of the history (JSON API)
pub async fn api_history(state: axum::extract::State<AppState>) -> String {
    let vm = state.history.read().await;
    let response = HistoryResponse {
        status: vm.status(),
        last_error: vm.last_error().map(|error| error.to_details()),
        search_term: vm.search_term(),
        sort_key: vm.sort_key(),
        sort_direction: vm.sort_direction(),
        page: vm.page(),
        total_pages: vm.total_pages(),
        summary: vm.summary(),
        items: vm.current_page_items(),
    };
    serde_json::to_string(&response).unwrap_or_default()
}

/// HTMX: History list - Partial page update
///
/// Query parameters, applied in order:
/// - q: search term (resets to page 1)
/// - sort: column key; the current column toggles direction
/// - page: 1-based page, clamped
pub async fn htmx_history_list(
    state: axum::extract::State<AppState>,
    params: Query<HashMap<String, String>>,
) -> Result<Html<String>, ApiError> {
    let mut vm = state.history.write().await;

    if let Some(term) = params.get("q") {
        if term != vm.search_term() {
            vm.set_search_term(term.as_str());
        }
    }
    if let Some(sort) = params.get("sort") {
        let key = sort
            .parse::<SortKey>()
            .map_err(|message| ApiError::BadRequest { message })?;
        vm.set_sort(key);
    }
    if let Some(page) = params.get("page") {
        let page = page.parse::<usize>().map_err(|_| ApiError::BadRequest {
            message: format!("Invalid page: {}", page),
        })?;
        vm.set_page(page);
    }

    Ok(Html(render_history_list(&vm, &state.config)))
}

/// HTMX: Reload the record set
pub async fn htmx_history_reload(state: axum::extract::State<AppState>) -> Html<String> {
    TransactionHistoryViewModel::load_shared(&state.history).await;
    let vm = state.history.read().await;
    Html(render_history_list(&vm, &state.config))
}

/// HTMX: Dismiss the failure notice
pub async fn htmx_history_dismiss(state: axum::extract::State<AppState>) -> Html<String> {
    let mut vm = state.history.write().await;
    vm.dismiss_error();
    Html(render_history_list(&vm, &state.config))
}

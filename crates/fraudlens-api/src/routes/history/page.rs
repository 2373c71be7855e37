//! History page rendering
//!
//! Endpoints:
//! - page_history: Main history page with search box and reload button
//!
//! Helper functions:
//! - render_history_list: Notice, summary, table and pager (the swap target)

use crate::AppState;
use fraudlens_config::Config;
use fraudlens_core::{LoadStatus, SortDirection, SortKey, TransactionHistoryViewModel};
use fraudlens_utils::{escape_html, format_currency, format_number, format_timestamp};

/// History page. The first visit triggers the initial load.
pub async fn page_history(
    state: axum::extract::State<AppState>,
    headers: axum::http::HeaderMap,
) -> axum::response::Html<String> {
    let needs_load = *state.history.read().await.status() == LoadStatus::Idle;
    if needs_load {
        TransactionHistoryViewModel::load_shared(&state.history).await;
    }

    let vm = state.history.read().await;
    let inner_content = format!(
        r#"<h2>Transaction History</h2>
<div class='toolbar'>
    <input type='search' name='q' value='{}' placeholder='Search by UPI ID or amount...'
        hx-get='/history/list' hx-target='#history-content' hx-trigger='keyup changed delay:300ms, search'>
    <button hx-post='/history/reload' hx-target='#history-content'>Reload</button>
    <span class='htmx-indicator'>Loading...</span>
</div>
<div id='history-content'>{}</div>"#,
        escape_html(vm.search_term()),
        render_history_list(&vm, &state.config)
    );

    axum::response::Html(crate::page_response(&headers, "History", "/history", &inner_content))
}

/// Everything below the toolbar
pub fn render_history_list(vm: &TransactionHistoryViewModel, config: &Config) -> String {
    let mut html = String::new();

    match vm.status() {
        LoadStatus::Loading => html.push_str("<p class='loading'>Loading transactions...</p>"),
        LoadStatus::Error(message) => html.push_str(&format!(
            r#"<div class='notice notice-error' role='alert'>{}
    <button hx-post='/history/reload' hx-target='#history-content'>Retry</button>
    <button hx-post='/history/dismiss' hx-target='#history-content'>Dismiss</button>
</div>"#,
            escape_html(message)
        )),
        LoadStatus::Idle | LoadStatus::Success => {}
    }

    let summary = vm.summary();
    html.push_str(&format!(
        r#"<div class='summary'>
    <div><p>Total</p><p class='total-count'>{}</p></div>
    <div><p>Fraud</p><p class='fraud-count'>{}</p></div>
    <div><p>Legit</p><p class='legit-count'>{}</p></div>
</div>"#,
        format_number(summary.total_count),
        format_number(summary.fraud_count),
        format_number(summary.legit_count)
    ));

    let items = vm.current_page_items();
    if items.is_empty() {
        html.push_str("<p class='empty'>No transactions found</p>");
        return html;
    }

    html.push_str("<table><thead><tr>");
    for (key, label) in [
        (SortKey::Amount, "Amount"),
        (SortKey::Sender, "Sender"),
        (SortKey::Receiver, "Receiver"),
        (SortKey::Timestamp, "Time"),
        (SortKey::IsFraud, "Status"),
    ] {
        html.push_str(&sort_header(vm, key, label));
    }
    html.push_str("</tr></thead><tbody>");

    for record in items {
        let row_class = if record.is_fraud { "fraud" } else { "legit" };
        html.push_str(&format!(
            "<tr class='{}'><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
            row_class,
            format_currency(record.amount, &config.currency),
            escape_html(&record.sender),
            escape_html(&record.receiver),
            escape_html(&format_timestamp(&record.timestamp)),
            record.status_label()
        ));
    }
    html.push_str("</tbody></table>");
    html.push_str(&render_pager(vm));
    html
}

fn sort_header(vm: &TransactionHistoryViewModel, key: SortKey, label: &str) -> String {
    let marker = if vm.sort_key() == key {
        match vm.sort_direction() {
            SortDirection::Ascending => " ▲",
            SortDirection::Descending => " ▼",
        }
    } else {
        ""
    };
    format!(
        "<th><a hx-get='/history/list?sort={}' hx-target='#history-content'>{}{}</a></th>",
        key, label, marker
    )
}

fn render_pager(vm: &TransactionHistoryViewModel) -> String {
    let pages = vm.total_pages();
    if pages <= 1 {
        return String::new();
    }
    let page = vm.page();

    let mut html = String::from("<nav class='pager'>");
    if page > 1 {
        html.push_str(&format!(
            "<a hx-get='/history/list?page={}' hx-target='#history-content'>Previous</a>",
            page - 1
        ));
    }
    for n in 1..=pages {
        if n == page {
            html.push_str(&format!("<span aria-current='page'>{}</span>", n));
        } else {
            html.push_str(&format!(
                "<a hx-get='/history/list?page={}' hx-target='#history-content'>{}</a>",
                n, n
            ));
        }
    }
    if page < pages {
        html.push_str(&format!(
            "<a hx-get='/history/list?page={}' hx-target='#history-content'>Next</a>",
            page + 1
        ));
    }
    html.push_str(&format!("<span class='page-info'>Page {} of {}</span></nav>", page, pages));
    html
}

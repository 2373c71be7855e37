//! HTTP host with HTMX support
//!
//! Routes are organized into modules:
//! - routes::history: Transaction history list, search, sort, pagination
//! - routes::assess: Risk assessment form and verdict

pub mod error;
pub mod routes;

use axum::{
    routing::{get, post},
    Router,
};
use fraudlens_client::{HistoryClientRef, ScoringClientRef};
use fraudlens_config::Config;
use fraudlens_core::{RiskAssessmentViewModel, TransactionHistoryViewModel};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::RwLock;

pub use error::ApiError;

/// Application state
#[derive(Clone)]
pub struct AppState {
    pub history: Arc<RwLock<TransactionHistoryViewModel>>,
    pub assessment: Arc<RwLock<RiskAssessmentViewModel>>,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(config: Config, history_client: HistoryClientRef, scoring_client: ScoringClientRef) -> Self {
        let history = TransactionHistoryViewModel::from_config(history_client, &config);
        let assessment = RiskAssessmentViewModel::from_config(scoring_client, &config);
        Self {
            history: Arc::new(RwLock::new(history)),
            assessment: Arc::new(RwLock::new(assessment)),
            config: Arc::new(config),
        }
    }
}

/// Create the application router
pub fn create_router(state: AppState) -> Router {
    use routes::assess::{
        api_assessment, htmx_assess_dismiss, htmx_assess_field, htmx_assess_reset, htmx_assess_submit,
        page_assess,
    };
    use routes::history::{
        api_history, htmx_history_dismiss, htmx_history_list, htmx_history_reload, page_history,
    };

    Router::new()
        .route("/api/health", get(health_check))
        .route("/api/history", get(api_history))
        .route("/api/assessment", get(api_assessment))
        .route("/", get(index_page))
        .route("/history", get(page_history))
        .route("/history/list", get(htmx_history_list))
        .route("/history/reload", post(htmx_history_reload))
        .route("/history/dismiss", post(htmx_history_dismiss))
        .route("/assess", get(page_assess))
        .route("/assess/field", post(htmx_assess_field))
        .route("/assess/submit", post(htmx_assess_submit))
        .route("/assess/reset", post(htmx_assess_reset))
        .route("/assess/dismiss", post(htmx_assess_dismiss))
        .fallback(not_found)
        .with_state(state)
}

async fn health_check() -> &'static str {
    "OK"
}

async fn not_found(uri: axum::http::Uri) -> ApiError {
    ApiError::NotFound { resource: uri.path().to_string() }
}

async fn index_page(headers: axum::http::HeaderMap) -> axum::response::Html<String> {
    let inner_content = r#"<h2>FraudLens</h2>
<ul>
    <li><a href='/assess'>Check a transaction</a></li>
    <li><a href='/history'>Transaction history</a></li>
</ul>"#;
    axum::response::Html(page_response(&headers, "Home", "/", inner_content))
}

pub fn base_html(title: &str, content: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{} - FraudLens</title>
    <script src="https://unpkg.com/htmx.org@1.9.10"></script>
    <style>
        .htmx-indicator {{ opacity: 0; }}
        .htmx-request .htmx-indicator {{ opacity: 1; }}
        .htmx-request.htmx-indicator {{ opacity: 1; }}
    </style>
</head>
<body>
    {}
</body>
</html>"#,
        title, content
    )
}

pub fn nav_bar(current_path: &str) -> String {
    let links = [("/assess", "Check Transaction"), ("/history", "History")];

    let mut nav = String::from("<nav><strong>FraudLens</strong><ul>");
    for (path, label) in &links {
        let current = if current_path.starts_with(path) { " aria-current='page'" } else { "" };
        nav.push_str(&format!("<li><a href='{}'{}>{}</a></li>", path, current, label));
    }
    nav.push_str("</ul></nav>");
    nav
}

fn is_htmx_request(headers: &axum::http::HeaderMap) -> bool {
    headers.get("hx-request").is_some()
}

/// Wrap content for full page or HTMX partial
pub fn page_response(headers: &axum::http::HeaderMap, title: &str, current_path: &str, inner_content: &str) -> String {
    if is_htmx_request(headers) {
        format!("<main>{}</main>", inner_content)
    } else {
        base_html(title, &format!("{}<main>{}</main>", nav_bar(current_path), inner_content))
    }
}

/// Decode an `application/x-www-form-urlencoded` body
///
/// Later duplicates of a key win.
pub fn parse_form_body(body: &str) -> HashMap<String, String> {
    let mut params = HashMap::new();
    for pair in body.split('&').filter(|p| !p.is_empty()) {
        let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
        let key = urlencoding::decode(&key.replace('+', " ")).map(|s| s.into_owned());
        let value = urlencoding::decode(&value.replace('+', " ")).map(|s| s.into_owned());
        if let (Ok(key), Ok(value)) = (key, value) {
            params.insert(key, value);
        }
    }
    params
}

/// Bind and serve until Ctrl-C
pub async fn start_server(state: AppState) -> Result<(), ApiError> {
    let addr = state.config.bind_addr();
    let router = create_router(state);

    let listener = TcpListener::bind(&addr).await.map_err(|e| ApiError::Bind {
        addr: addr.clone(),
        message: e.to_string(),
    })?;
    log::info!("Starting FraudLens on http://{}", addr);
    log::info!("Available routes:");
    log::info!("  - /assess (Check a transaction)");
    log::info!("  - /history (Transaction history)");
    log::info!("  - /api/* (JSON endpoints)");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| ApiError::Server { message: e.to_string() })?;

    log::info!("Server stopped gracefully");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use async_trait::async_trait;
    use fraudlens_client::{
        ClientResult, HistoryClient, RiskAssessmentResult, ScoringClient, ScoringRequest, TransactionRecord,
    };

    pub struct StaticHistory(pub ClientResult<Vec<TransactionRecord>>);

    #[async_trait]
    impl HistoryClient for StaticHistory {
        async fn fetch_history(&self) -> ClientResult<Vec<TransactionRecord>> {
            self.0.clone()
        }
    }

    pub struct StaticScoring(pub ClientResult<RiskAssessmentResult>);

    #[async_trait]
    impl ScoringClient for StaticScoring {
        async fn score(&self, _request: &ScoringRequest) -> ClientResult<RiskAssessmentResult> {
            self.0.clone()
        }
    }

    pub fn record(amount: f64, sender: &str, is_fraud: bool) -> TransactionRecord {
        TransactionRecord {
            amount,
            sender: sender.to_string(),
            receiver: "merchant@upi".to_string(),
            timestamp: "2024-06-01T10:00:00Z".to_string(),
            is_fraud,
            description: None,
            category: None,
        }
    }

    pub fn state(
        history: ClientResult<Vec<TransactionRecord>>,
        scoring: ClientResult<RiskAssessmentResult>,
    ) -> AppState {
        AppState::new(
            Config::default(),
            Arc::new(StaticHistory(history)),
            Arc::new(StaticScoring(scoring)),
        )
    }

    pub async fn body_text(response: axum::response::Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }
}

//! HTTP implementations of the collaborator traits

use async_trait::async_trait;
use fraudlens_config::Config;
use log::{debug, warn};
use reqwest::Client as HttpClient;
use serde::de::DeserializeOwned;
use std::time::Duration;

use crate::error::{ClientError, ClientResult};
use crate::models::{RiskAssessmentResult, ScoringRequest, TransactionRecord};
use crate::{HistoryClient, ScoringClient};

fn build_http_client(timeout: Duration) -> ClientResult<HttpClient> {
    HttpClient::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| ClientError::Request { message: format!("Failed to build HTTP client: {}", e) })
}

/// Turn a non-success response into a `ClientError::Server`
///
/// The message is the collaborator's `message` (or `error`) field when the
/// body is JSON, else the status reason phrase.
async fn handle_error_response(response: reqwest::Response) -> ClientError {
    let status = response.status();
    let body_text = response.text().await.unwrap_or_default();

    let body_message = serde_json::from_str::<serde_json::Value>(&body_text)
        .ok()
        .and_then(|json| {
            json.get("message")
                .or_else(|| json.get("error"))
                .and_then(|v| v.as_str())
                .map(str::to_string)
        })
        .filter(|m| !m.is_empty());

    let message = body_message.or_else(|| status.canonical_reason().map(str::to_string));
    warn!("Server error {}: {}", status.as_u16(), body_text);

    ClientError::Server { status: status.as_u16(), message }
}

async fn parse_response<T: DeserializeOwned>(response: reqwest::Response) -> ClientResult<T> {
    if !response.status().is_success() {
        return Err(handle_error_response(response).await);
    }

    let body = response.text().await?;
    serde_json::from_str::<T>(&body)
        .map_err(|e| ClientError::Decode { message: e.to_string() })
}

/// History collaborator over HTTP (`GET <history_url>`)
#[derive(Debug, Clone)]
pub struct HttpHistoryClient {
    http_client: HttpClient,
    url: String,
}

impl HttpHistoryClient {
    pub fn new(url: impl Into<String>, timeout: Duration) -> ClientResult<Self> {
        Ok(Self {
            http_client: build_http_client(timeout)?,
            url: url.into(),
        })
    }

    pub fn from_config(config: &Config) -> ClientResult<Self> {
        Self::new(config.endpoints.history_url.clone(), config.timeouts.history())
    }
}

#[async_trait]
impl HistoryClient for HttpHistoryClient {
    async fn fetch_history(&self) -> ClientResult<Vec<TransactionRecord>> {
        debug!("GET {}", self.url);
        let response = self.http_client.get(&self.url).send().await?;
        let records: Vec<TransactionRecord> = parse_response(response).await?;
        debug!("Fetched {} history records", records.len());
        Ok(records)
    }
}

/// Scoring collaborator over HTTP (`POST <scoring_url>`)
#[derive(Debug, Clone)]
pub struct HttpScoringClient {
    http_client: HttpClient,
    url: String,
}

impl HttpScoringClient {
    pub fn new(url: impl Into<String>, timeout: Duration) -> ClientResult<Self> {
        Ok(Self {
            http_client: build_http_client(timeout)?,
            url: url.into(),
        })
    }

    pub fn from_config(config: &Config) -> ClientResult<Self> {
        Self::new(config.endpoints.scoring_url.clone(), config.timeouts.scoring())
    }
}

#[async_trait]
impl ScoringClient for HttpScoringClient {
    async fn score(&self, request: &ScoringRequest) -> ClientResult<RiskAssessmentResult> {
        debug!("POST {} (amount={})", self.url, request.amount);
        let response = self.http_client.post(&self.url).json(request).send().await?;
        let verdict: RiskAssessmentResult = parse_response(response).await?;
        verdict
            .validate()
            .map_err(|message| ClientError::InvalidResponse { message })?;
        Ok(verdict)
    }
}

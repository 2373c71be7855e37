//! Remote collaborators of the fraud review client
//!
//! The history collaborator serves the transaction record set; the scoring
//! collaborator returns a verdict for a candidate transaction. Both are
//! traits so the view-models can be driven by fakes in tests.

use async_trait::async_trait;
use std::sync::Arc;

pub mod error;
pub mod http;
pub mod models;

pub use error::{ClientError, ClientErrorCode, ClientResult};
pub use http::{HttpHistoryClient, HttpScoringClient};
pub use models::{Category, RiskAssessmentResult, ScoringRequest, TransactionRecord};

/// History client reference type
pub type HistoryClientRef = Arc<dyn HistoryClient>;

/// Scoring client reference type
pub type ScoringClientRef = Arc<dyn ScoringClient>;

/// Source of the transaction record set
#[async_trait]
pub trait HistoryClient: Send + Sync {
    /// Fetch every record, in server order
    async fn fetch_history(&self) -> ClientResult<Vec<TransactionRecord>>;
}

/// Fraud scoring collaborator
#[async_trait]
pub trait ScoringClient: Send + Sync {
    /// Submit a candidate transaction and return the verdict
    async fn score(&self, request: &ScoringRequest) -> ClientResult<RiskAssessmentResult>;
}

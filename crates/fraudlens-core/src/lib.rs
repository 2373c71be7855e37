//! View-models and business rules for transaction fraud review
//!
//! `TransactionHistoryViewModel` explores the fetched record set;
//! `RiskAssessmentViewModel` drives a candidate transaction through
//! validation and scoring. The two share no state.

pub mod assessment;
pub mod error;
pub mod history;
pub mod inflight;
pub mod models;
pub mod query;
pub mod risk;
pub mod validation;

pub use assessment::{AssessmentState, PreparedSubmission, RiskAssessmentViewModel, SubmitOutcome};
pub use error::{
    AssessmentError, CoreError, CoreResult, DefaultErrorLogger, ErrorCode, ErrorContext, ErrorDetails,
    ErrorLogger,
};
pub use history::{LoadOutcome, TransactionHistoryViewModel};
pub use inflight::{RequestTicket, RequestTracker};
pub use models::{FormField, FormState, HistorySummary, LoadStatus, SortDirection, SortKey};
pub use risk::{classify_risk, AssessedTransaction, RiskLevel, RiskTier, SuggestedAction};
pub use validation::{FieldError, ValidationErrors};

//! Error types for fraudlens-core
//!
//! Two families live here. `CoreError` is returned when a view-model
//! operation is misused (wrong state, bad field value). `AssessmentError`
//! classifies everything that can go wrong with a submission or a load; it
//! is never returned as an `Err`. Field errors stay inline on the form and
//! the remote kinds are stored on the view-model as a dismissible notice.

use fraudlens_client::ClientError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error codes for programmatic error handling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Operation not allowed in the current state
    InvalidState,
    /// Field value rejected
    InvalidField,
    /// Remote request exceeded its bound
    NetworkTimeout,
    /// Remote collaborator could not be reached
    NetworkUnreachable,
    /// Remote collaborator answered with a failure status
    ServerError,
    /// Request could not be built, or the answer could not be used
    UnknownClientError,
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorCode::InvalidState => write!(f, "INVALID_STATE"),
            ErrorCode::InvalidField => write!(f, "INVALID_FIELD"),
            ErrorCode::NetworkTimeout => write!(f, "NETWORK_TIMEOUT"),
            ErrorCode::NetworkUnreachable => write!(f, "NETWORK_UNREACHABLE"),
            ErrorCode::ServerError => write!(f, "SERVER_ERROR"),
            ErrorCode::UnknownClientError => write!(f, "UNKNOWN_CLIENT_ERROR"),
        }
    }
}

/// Detailed error information for display
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorDetails {
    pub code: ErrorCode,
    pub message: String,
    /// Whether the user can simply try again
    pub retryable: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub suggestions: Vec<String>,
}

impl ErrorDetails {
    pub fn new(code: ErrorCode, message: String) -> Self {
        Self {
            code,
            message,
            retryable: false,
            suggestions: vec![],
        }
    }

    pub fn retryable(mut self, retryable: bool) -> Self {
        self.retryable = retryable;
        self
    }

    /// Add a suggestion
    pub fn with_suggestion(mut self, suggestion: String) -> Self {
        self.suggestions.push(suggestion);
        self
    }
}

impl std::fmt::Display for ErrorDetails {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)?;
        if !self.suggestions.is_empty() {
            write!(f, "\nSuggestions:")?;
            for suggestion in &self.suggestions {
                write!(f, "\n  - {}", suggestion)?;
            }
        }
        Ok(())
    }
}

/// Misuse of a view-model operation
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    #[error("Cannot {operation} while {state}")]
    InvalidState { operation: String, state: String },

    #[error("Invalid value for {field}: {message}")]
    InvalidField { field: String, message: String },
}

impl CoreError {
    /// Get the error code
    pub fn code(&self) -> ErrorCode {
        match self {
            CoreError::InvalidState { .. } => ErrorCode::InvalidState,
            CoreError::InvalidField { .. } => ErrorCode::InvalidField,
        }
    }

    /// Convert to detailed error info
    pub fn to_details(&self) -> ErrorDetails {
        let details = ErrorDetails::new(self.code(), self.to_string());
        match self {
            CoreError::InvalidState { .. } => details.with_suggestion(
                "Start a new check to discard the current verdict.".to_string(),
            ),
            CoreError::InvalidField { .. } => details,
        }
    }
}

/// Result type with CoreError
pub type CoreResult<T> = Result<T, CoreError>;

/// Classified failure of a submission or a remote round trip
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AssessmentError {
    /// A form field was rejected locally; nothing was sent
    Validation { field: String, message: String },
    /// The request exceeded its time bound
    NetworkTimeout,
    /// No response was received
    NetworkUnreachable,
    /// The collaborator answered with a failure status
    ServerError { status: u16, message: Option<String> },
    /// The request could not be issued or its answer could not be used
    UnknownClientError { message: String },
}

impl AssessmentError {
    /// Classify a transport error
    pub fn classify(error: &ClientError) -> Self {
        match error {
            ClientError::Timeout => AssessmentError::NetworkTimeout,
            ClientError::Unreachable { .. } => AssessmentError::NetworkUnreachable,
            ClientError::Server { status, message } => AssessmentError::ServerError {
                status: *status,
                message: message.clone(),
            },
            ClientError::Request { message }
            | ClientError::Decode { message }
            | ClientError::InvalidResponse { message } => {
                AssessmentError::UnknownClientError { message: message.clone() }
            }
        }
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            AssessmentError::Validation { .. } => ErrorCode::InvalidField,
            AssessmentError::NetworkTimeout => ErrorCode::NetworkTimeout,
            AssessmentError::NetworkUnreachable => ErrorCode::NetworkUnreachable,
            AssessmentError::ServerError { .. } => ErrorCode::ServerError,
            AssessmentError::UnknownClientError { .. } => ErrorCode::UnknownClientError,
        }
    }

    pub fn is_retryable(&self) -> bool {
        match self {
            AssessmentError::NetworkTimeout | AssessmentError::NetworkUnreachable => true,
            AssessmentError::ServerError { status, .. } => *status >= 500,
            AssessmentError::Validation { .. } | AssessmentError::UnknownClientError { .. } => false,
        }
    }

    /// Banner text shown to the user
    pub fn user_message(&self) -> String {
        match self {
            AssessmentError::Validation { message, .. } => message.clone(),
            AssessmentError::NetworkTimeout => {
                "The server took too long to respond. Please try again.".to_string()
            }
            AssessmentError::NetworkUnreachable => {
                "No response from server. Please check your connection and try again.".to_string()
            }
            AssessmentError::ServerError { status, message } => match message {
                Some(message) => format!("Server error: {}", message),
                None => format!("Server error: request failed with status {}", status),
            },
            AssessmentError::UnknownClientError { message } => format!("Request error: {}", message),
        }
    }

    pub fn to_details(&self) -> ErrorDetails {
        let details = ErrorDetails::new(self.code(), self.user_message())
            .retryable(self.is_retryable());
        match self {
            AssessmentError::NetworkTimeout | AssessmentError::NetworkUnreachable => details
                .with_suggestion("Check that the fraud service is running.".to_string()),
            _ => details,
        }
    }
}

/// Error context for reporting
#[derive(Debug, Clone, Default)]
pub struct ErrorContext {
    /// Operation being performed
    pub operation: String,
    /// Request generation the failure belongs to
    pub request: Option<u64>,
}

impl ErrorContext {
    pub fn new(operation: &str) -> Self {
        Self {
            operation: operation.to_string(),
            request: None,
        }
    }

    pub fn with_request(mut self, generation: u64) -> Self {
        self.request = Some(generation);
        self
    }
}

/// Error logger trait
pub trait ErrorLogger {
    /// Log a failed remote round trip
    fn log_failure(&self, failure: &AssessmentError, context: &ErrorContext);
    /// Log a warning
    fn log_warning(&self, message: &str, context: &ErrorContext);
}

/// Default error logger using log crate
#[derive(Default)]
pub struct DefaultErrorLogger;

impl ErrorLogger for DefaultErrorLogger {
    fn log_failure(&self, failure: &AssessmentError, context: &ErrorContext) {
        log::error!(
            target: "fraudlens::error",
            "ERROR [{}] {} - Operation: {} - Request: {:?}",
            failure.code(),
            failure.user_message(),
            context.operation,
            context.request
        );
    }

    fn log_warning(&self, message: &str, context: &ErrorContext) {
        log::warn!(
            target: "fraudlens::error",
            "WARNING: {} - Operation: {} - Request: {:?}",
            message,
            context.operation,
            context.request
        );
    }
}

//! Error types for fraudlens-api

use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use fraudlens_core::CoreError;
use fraudlens_utils::escape_html;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Not found: {resource}")]
    NotFound { resource: String },

    #[error("Bad request: {message}")]
    BadRequest { message: String },

    #[error("Conflict: {message}")]
    Conflict { message: String },

    #[error("Failed to bind {addr}: {message}")]
    Bind { addr: String, message: String },

    #[error("Server error: {message}")]
    Server { message: String },
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::NotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            ApiError::Conflict { .. } => StatusCode::CONFLICT,
            ApiError::Bind { .. } | ApiError::Server { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<CoreError> for ApiError {
    fn from(error: CoreError) -> Self {
        let message = error.to_details().to_string();
        match error {
            CoreError::InvalidState { .. } => ApiError::Conflict { message },
            CoreError::InvalidField { .. } => ApiError::BadRequest { message },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        log::warn!(target: "fraudlens::api", "{}", self);
        let body = format!(
            "<div class='notice notice-error' role='alert'>{}</div>",
            escape_html(&self.to_string()).replace('\n', "<br>")
        );
        (self.status_code(), Html(body)).into_response()
    }
}

//! Error taxonomy for a solve request and its mapping onto HTTP responses.
//!
//! Caller mistakes are 400s and never reach the model. Everything else (transport,
//! refusal, unparseable or non-conforming output) is an upstream integration failure
//! and surfaces as a 500 with the cause in `detail`.

use axum::{
  http::StatusCode,
  response::{IntoResponse, Response},
  Json,
};
use tracing::{error, warn};

use crate::protocol::{ErrorOut, Subject};
use crate::schema::SchemaValidationError;

#[derive(Debug, thiserror::Error)]
pub enum SolveError {
  #[error("{0}")]
  InvalidInput(String),

  #[error("model is not configured: {0}")]
  Unconfigured(String),

  #[error("model call failed: {0}")]
  Transport(String),

  #[error("model refused to answer: {0}")]
  Refusal(String),

  #[error("model output is not valid JSON: {0}")]
  Parse(#[from] serde_json::Error),

  #[error("model output does not match the solution schema: {0}")]
  Schema(#[from] SchemaValidationError),
}

impl SolveError {
  pub fn status(&self) -> StatusCode {
    match self {
      SolveError::InvalidInput(_) => StatusCode::BAD_REQUEST,
      _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
  }

  /// Short label used in logs.
  pub fn kind(&self) -> &'static str {
    match self {
      SolveError::InvalidInput(_) => "invalid_input",
      SolveError::Unconfigured(_) => "unconfigured",
      SolveError::Transport(_) => "transport",
      SolveError::Refusal(_) => "refusal",
      SolveError::Parse(_) => "parse",
      SolveError::Schema(_) => "schema",
    }
  }
}

/// A `SolveError` bound to the subject it happened on, ready to be rendered.
#[derive(Debug)]
pub struct ApiError {
  pub subject: Subject,
  pub error: SolveError,
}

impl ApiError {
  pub fn new(subject: Subject, error: SolveError) -> Self {
    Self { subject, error }
  }

  pub fn detail(&self) -> String {
    match &self.error {
      SolveError::InvalidInput(reason) => reason.clone(),
      other => format!("Error solving {} problem: {}", self.subject.label(), other),
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let status = self.error.status();
    let detail = self.detail();
    if status.is_server_error() {
      error!(target: "solver", subject = %self.subject.label(), kind = self.error.kind(), %detail, "Solve request failed");
    } else {
      warn!(target: "solver", subject = %self.subject.label(), kind = self.error.kind(), %detail, "Solve request rejected");
    }
    (status, Json(ErrorOut { detail })).into_response()
  }
}

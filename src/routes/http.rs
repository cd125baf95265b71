//! HTTP endpoint handlers. These are thin wrappers that forward to core logic.
//! Each solve request gets a `request_id` on its span; errors render as `{"detail": ...}`.

use std::sync::Arc;
use axum::{extract::{rejection::JsonRejection, State}, Json};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::config::DeployVariant;
use crate::error::{ApiError, SolveError};
use crate::logic::{solve_english_request, solve_math_request};
use crate::protocol::*;
use crate::schema::{SATEnglishSolutionOutput, SATMathSolutionOutput};
use crate::state::AppState;

const LOCAL_BANNER: &str = "SAT Math & English Solver API (local)";
const SERVERLESS_BANNER: &str = "SAT Math Solver API";

#[instrument(level = "info", skip(state))]
pub async fn http_root(State(state): State<Arc<AppState>>) -> Json<RootOut> {
  let message = match state.config.variant {
    DeployVariant::Local => LOCAL_BANNER,
    DeployVariant::Serverless => SERVERLESS_BANNER,
  };
  Json(RootOut { message, status: "running" })
}

#[instrument(level = "info", skip(state))]
pub async fn http_health(State(state): State<Arc<AppState>>) -> Json<HealthOut> {
  let message = match state.config.variant {
    DeployVariant::Local => None,
    DeployVariant::Serverless => Some(SERVERLESS_BANNER),
  };
  Json(HealthOut { status: "healthy", message })
}

#[instrument(level = "info", skip(state, body), fields(request_id = %Uuid::new_v4()))]
pub async fn http_solve(
  State(state): State<Arc<AppState>>,
  body: Result<Json<SolveIn>, JsonRejection>,
) -> Result<Json<SATMathSolutionOutput>, ApiError> {
  let Json(body) = body.map_err(|e| rejected(Subject::Math, e))?;
  let solution = solve_math_request(&state, body).await.map_err(|e| ApiError::new(Subject::Math, e))?;
  info!(target: "solver", paths = solution.solution_paths.len(), "HTTP SAT Math solution served");
  Ok(Json(solution))
}

#[instrument(level = "info", skip(state, body), fields(request_id = %Uuid::new_v4()))]
pub async fn http_solve_english(
  State(state): State<Arc<AppState>>,
  body: Result<Json<EnglishSolveIn>, JsonRejection>,
) -> Result<Json<SATEnglishSolutionOutput>, ApiError> {
  let Json(body) = body.map_err(|e| rejected(Subject::English, e))?;
  let solution = solve_english_request(&state, body).await.map_err(|e| ApiError::new(Subject::English, e))?;
  info!(target: "solver", "HTTP SAT English solution served");
  Ok(Json(solution))
}

/// Unreadable bodies (bad JSON, wrong content type, over the size limit) are caller errors.
fn rejected(subject: Subject, rejection: JsonRejection) -> ApiError {
  ApiError::new(subject, SolveError::InvalidInput(rejection.body_text()))
}

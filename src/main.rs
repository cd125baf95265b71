//! SAT Math & English Solver Backend
//!
//! - Axum HTTP API: `POST /solve` (math, text and/or image), `POST /solve-english`
//! - Serverless variant: math only at `POST /`
//! - Answers are produced by an OpenAI-compatible model under a JSON schema contract
//!   and validated before they are returned
//!
//! Important env variables:
//!   PORT                    : u16 (default 3000)
//!   SOLVER_VARIANT          : "local" (default) or "serverless"
//!   CORS_ORIGINS            : comma-separated allow-list for the local variant
//!   MAX_BODY_BYTES          : request body limit (default 10 MiB)
//!   OPENAI_API_KEY          : required for solving; health probes work without it
//!   OPENAI_BASE_URL         : default "https://api.openai.com/v1"
//!   OPENAI_MODEL            : default "gpt-5.2"
//!   OPENAI_REASONING_EFFORT : default "medium"; empty to omit
//!   OPENAI_TIMEOUT_SECS     : default 180
//!   SOLVER_CONFIG_PATH      : TOML file (prompt overrides, strict_schema)
//!   STRICT_SCHEMA           : reject unknown fields in model output
//!   LOG_LEVEL               : tracing filter, e.g. "debug" or full directives
//!   LOG_FORMAT              : "pretty" (default) or "json"

mod config;
mod error;
mod logic;
mod openai;
mod prompt;
mod protocol;
mod routes;
mod schema;
mod solver;
mod state;
mod telemetry;
mod util;

use std::{net::SocketAddr, sync::Arc};
use tokio::net::TcpListener;
use tracing::info;

use crate::config::AppConfig;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
  telemetry::init_tracing();

  let config = AppConfig::from_env()?;
  let addr = SocketAddr::from(([0, 0, 0, 0], config.port));

  // Shared, immutable application state (config, solver, optional OpenAI client).
  let state = Arc::new(AppState::new(config));

  // Routes for the configured variant, with CORS, body limit and tracing layers.
  let app = build_router(state);

  let listener = TcpListener::bind(addr).await?;
  info!(target: "sat_solver_backend", %addr, "HTTP server listening");
  axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()).await?;
  info!(target: "sat_solver_backend", "HTTP server stopped");
  Ok(())
}

/// Resolves on Ctrl-C, or SIGTERM on unix.
async fn shutdown_signal() {
  let ctrl_c = async {
    if let Err(e) = tokio::signal::ctrl_c().await {
      tracing::error!(target: "sat_solver_backend", error = %e, "Failed to listen for Ctrl-C");
      std::future::pending::<()>().await;
    }
  };

  #[cfg(unix)]
  let terminate = async {
    match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
      Ok(mut sig) => {
        sig.recv().await;
      }
      Err(e) => {
        tracing::error!(target: "sat_solver_backend", error = %e, "Failed to listen for SIGTERM");
        std::future::pending::<()>().await;
      }
    }
  };

  #[cfg(not(unix))]
  let terminate = std::future::pending::<()>();

  tokio::select! {
    _ = ctrl_c => {},
    _ = terminate => {},
  }
  info!(target: "sat_solver_backend", "Shutdown signal received");
}

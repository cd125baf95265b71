//! Router assembly: HTTP endpoints, CORS, body limit, and HTTP tracing.

use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    http::HeaderValue,
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::{warn, Level};

use crate::config::{AppConfig, DeployVariant};
use crate::state::AppState;

pub mod http;

/// Build the application router for the configured variant:
/// - local: `GET /`, `GET /health`, `POST /solve`, `POST /solve-english`,
///   CORS limited to the configured origins
/// - serverless: `GET|POST /` (math only) and `GET /health`, CORS open to all
///
/// Both get a request body limit (images are large) and the HTTP trace layer
/// (per-request spans w/ method, path, status, latency).
pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = cors_layer(&state.config);
    let body_limit = state.config.max_body_bytes;

    let routes = match state.config.variant {
        DeployVariant::Local => Router::new()
            .route("/", get(http::http_root))
            .route("/health", get(http::http_health))
            .route("/solve", post(http::http_solve))
            .route("/solve-english", post(http::http_solve_english)),
        DeployVariant::Serverless => Router::new()
            .route("/", get(http::http_root).post(http::http_solve))
            .route("/health", get(http::http_health)),
    };

    routes
        // State + body limit + CORS + HTTP tracing
        .with_state(state)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
}

fn cors_layer(config: &AppConfig) -> CorsLayer {
    let base = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    match config.variant {
        DeployVariant::Serverless => base.allow_origin(Any),
        DeployVariant::Local => {
            let origins: Vec<HeaderValue> = config
                .cors_origins
                .iter()
                .filter_map(|origin| match HeaderValue::from_str(origin) {
                    Ok(v) => Some(v),
                    Err(_) => {
                        warn!(target: "sat_solver_backend", %origin, "Ignoring invalid CORS origin");
                        None
                    }
                })
                .collect();
            base.allow_origin(AllowOrigin::list(origins))
        }
    }
}

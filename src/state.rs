//! Application state: configuration and the solver it wires together.
//!
//! The solver owns the prompts, the schema mode and the optional OpenAI client.
//! If no API key is configured the server still starts; solve requests then fail
//! with an "unconfigured" error while health probes keep answering.

use std::sync::Arc;

use tracing::{info, instrument, warn};

use crate::config::AppConfig;
use crate::openai::OpenAI;
use crate::solver::{ChatModel, Solver};

pub struct AppState {
    pub config: AppConfig,
    pub solver: Solver,
}

impl AppState {
    /// Build state from config: init OpenAI (if a key is present) and the solver.
    #[instrument(level = "info", skip_all)]
    pub fn new(config: AppConfig) -> Self {
        let model: Option<Arc<dyn ChatModel>> = match OpenAI::from_config(&config.model) {
            Some(oa) => {
                info!(
                    target: "sat_solver_backend",
                    base_url = %oa.base_url,
                    model = %oa.model,
                    reasoning_effort = ?oa.reasoning_effort,
                    timeout = ?config.model.timeout,
                    "OpenAI enabled."
                );
                Some(Arc::new(oa))
            }
            None => {
                warn!(target: "sat_solver_backend", "OpenAI disabled (no OPENAI_API_KEY). Solve requests will fail.");
                None
            }
        };
        Self::with_model(config, model)
    }

    /// Same as `new` but with an explicit model; tests inject scripted ones here.
    pub fn with_model(config: AppConfig, model: Option<Arc<dyn ChatModel>>) -> Self {
        let solver = Solver::new(model, config.prompts.clone(), config.schema_mode);
        info!(
            target: "sat_solver_backend",
            variant = ?config.variant,
            schema_mode = ?config.schema_mode,
            model = ?solver.model_name(),
            max_body_bytes = config.max_body_bytes,
            "Solver configured"
        );
        Self { config, solver }
    }
}

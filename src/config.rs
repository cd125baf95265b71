//! Process configuration, read once at startup and passed down explicitly.
//!
//! Environment variables cover deployment and the model connection; an optional TOML
//! file (SOLVER_CONFIG_PATH) can override prompts and the schema mode:
//!
//! ```toml
//! strict_schema = true
//!
//! [prompts]
//! english_system = "..."
//! ```

use std::{fmt, str::FromStr, time::Duration};

use serde::Deserialize;
use tracing::{error, info};

use crate::prompt::{ENGLISH_SYSTEM, ENGLISH_USER_TEMPLATE, MATH_IMAGE_ONLY, MATH_SYSTEM, MATH_TEXT_TEMPLATE};
use crate::schema::SchemaMode;

const DEFAULT_PORT: u16 = 3000;
const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_MODEL: &str = "gpt-5.2";
const DEFAULT_REASONING_EFFORT: &str = "medium";
const DEFAULT_TIMEOUT_SECS: u64 = 180;
const DEFAULT_MAX_BODY_BYTES: usize = 10 * 1024 * 1024;
const DEFAULT_CORS_ORIGINS: &[&str] = &["http://localhost:3000", "http://localhost:3001"];

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
  #[error("invalid value for {var}: `{value}` ({reason})")]
  Invalid { var: &'static str, value: String, reason: String },
}

/// Which HTTP surface to expose.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DeployVariant {
  /// `/solve` + `/solve-english`, CORS limited to an origin allow-list.
  Local,
  /// Math only at `POST /`, CORS open to every origin.
  Serverless,
}

impl FromStr for DeployVariant {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.trim().to_ascii_lowercase().as_str() {
      "local" => Ok(DeployVariant::Local),
      "serverless" => Ok(DeployVariant::Serverless),
      other => Err(format!("expected `local` or `serverless`, got `{}`", other)),
    }
  }
}

/// Connection settings for the OpenAI-compatible endpoint.
#[derive(Clone)]
pub struct ModelConfig {
  /// None disables solving; the server still answers health probes.
  pub api_key: Option<String>,
  pub base_url: String,
  pub model: String,
  pub reasoning_effort: Option<String>,
  pub timeout: Duration,
}

// Hand-written so the API key never ends up in logs.
impl fmt::Debug for ModelConfig {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("ModelConfig")
      .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
      .field("base_url", &self.base_url)
      .field("model", &self.model)
      .field("reasoning_effort", &self.reasoning_effort)
      .field("timeout", &self.timeout)
      .finish()
  }
}

/// Prompts used by the solver. Defaults live in `crate::prompt`;
/// any subset can be overridden from the TOML file.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Prompts {
  pub math_system: String,
  /// `{problem}` is replaced with the problem text.
  pub math_text_template: String,
  /// Instruction used when only an image was submitted.
  pub math_image_only: String,
  pub english_system: String,
  /// `{problem}` is replaced with the question (passage included).
  pub english_user_template: String,
}

impl Default for Prompts {
  fn default() -> Self {
    Self {
      math_system: MATH_SYSTEM.into(),
      math_text_template: MATH_TEXT_TEMPLATE.into(),
      math_image_only: MATH_IMAGE_ONLY.into(),
      english_system: ENGLISH_SYSTEM.into(),
      english_user_template: ENGLISH_USER_TEMPLATE.into(),
    }
  }
}

/// Optional TOML file contents.
#[derive(Clone, Debug, Deserialize, Default)]
pub struct FileConfig {
  #[serde(default)]
  pub prompts: Prompts,
  #[serde(default)]
  pub strict_schema: Option<bool>,
}

#[derive(Clone, Debug)]
pub struct AppConfig {
  pub port: u16,
  pub variant: DeployVariant,
  pub cors_origins: Vec<String>,
  pub max_body_bytes: usize,
  pub model: ModelConfig,
  pub schema_mode: SchemaMode,
  pub prompts: Prompts,
}

impl AppConfig {
  /// Read the process environment (and the TOML file it may point to).
  pub fn from_env() -> Result<Self, ConfigError> {
    Self::from_lookup(|key| std::env::var(key).ok())
  }

  /// Build from any key lookup; tests pass a map instead of the real environment.
  pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
    let file = lookup("SOLVER_CONFIG_PATH")
      .and_then(|path| load_file_config(&path))
      .unwrap_or_default();

    let port = parse_var(&lookup, "PORT")?.unwrap_or(DEFAULT_PORT);
    let variant = parse_var(&lookup, "SOLVER_VARIANT")?.unwrap_or(DeployVariant::Local);
    let max_body_bytes = parse_var(&lookup, "MAX_BODY_BYTES")?.unwrap_or(DEFAULT_MAX_BODY_BYTES);
    let timeout_secs = parse_var(&lookup, "OPENAI_TIMEOUT_SECS")?.unwrap_or(DEFAULT_TIMEOUT_SECS);

    let cors_origins = match lookup("CORS_ORIGINS") {
      Some(list) => split_list(&list),
      None => DEFAULT_CORS_ORIGINS.iter().map(|s| s.to_string()).collect(),
    };

    let strict = match parse_var::<bool>(&lookup, "STRICT_SCHEMA")? {
      Some(flag) => flag,
      None => file.strict_schema.unwrap_or(false),
    };

    // An explicitly empty OPENAI_REASONING_EFFORT turns the parameter off.
    let reasoning_effort = match lookup("OPENAI_REASONING_EFFORT") {
      Some(v) if v.trim().is_empty() => None,
      Some(v) => Some(v.trim().to_string()),
      None => Some(DEFAULT_REASONING_EFFORT.to_string()),
    };

    let model = ModelConfig {
      api_key: lookup("OPENAI_API_KEY").filter(|k| !k.trim().is_empty()),
      base_url: lookup("OPENAI_BASE_URL")
        .map(|u| u.trim_end_matches('/').to_string())
        .unwrap_or_else(|| DEFAULT_BASE_URL.into()),
      model: lookup("OPENAI_MODEL").unwrap_or_else(|| DEFAULT_MODEL.into()),
      reasoning_effort,
      timeout: Duration::from_secs(timeout_secs),
    };

    Ok(Self {
      port,
      variant,
      cors_origins,
      max_body_bytes,
      model,
      schema_mode: if strict { SchemaMode::Strict } else { SchemaMode::Lenient },
      prompts: file.prompts,
    })
  }
}

fn parse_var<T>(lookup: &impl Fn(&str) -> Option<String>, var: &'static str) -> Result<Option<T>, ConfigError>
where
  T: FromStr,
  T::Err: fmt::Display,
{
  match lookup(var) {
    None => Ok(None),
    Some(value) => match value.trim().parse::<T>() {
      Ok(v) => Ok(Some(v)),
      Err(e) => Err(ConfigError::Invalid { var, reason: e.to_string(), value }),
    },
  }
}

fn split_list(list: &str) -> Vec<String> {
  list.split(',').map(str::trim).filter(|s| !s.is_empty()).map(str::to_string).collect()
}

/// Attempt to load `FileConfig` from a TOML path. On any parsing/IO error, returns None.
pub fn load_file_config(path: &str) -> Option<FileConfig> {
  match std::fs::read_to_string(path) {
    Ok(s) => match toml::from_str::<FileConfig>(&s) {
      Ok(cfg) => {
        info!(target: "sat_solver_backend", %path, "Loaded solver config (TOML)");
        Some(cfg)
      }
      Err(e) => {
        error!(target: "sat_solver_backend", %path, error = %e, "Failed to parse TOML config; using defaults");
        None
      }
    },
    Err(e) => {
      error!(target: "sat_solver_backend", %path, error = %e, "Failed to read TOML config file; using defaults");
      None
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::collections::HashMap;

  fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
    move |k| map.get(k).cloned()
  }

  #[test]
  fn defaults_without_environment() {
    let cfg = AppConfig::from_lookup(lookup(&[])).unwrap();
    assert_eq!(cfg.port, 3000);
    assert_eq!(cfg.variant, DeployVariant::Local);
    assert_eq!(cfg.cors_origins, vec!["http://localhost:3000", "http://localhost:3001"]);
    assert_eq!(cfg.schema_mode, SchemaMode::Lenient);
    assert_eq!(cfg.model.api_key, None);
    assert_eq!(cfg.model.model, "gpt-5.2");
    assert_eq!(cfg.model.reasoning_effort.as_deref(), Some("medium"));
    assert_eq!(cfg.model.timeout, Duration::from_secs(180));
    assert!(cfg.prompts.math_system.contains("Vietnamese"));
  }

  #[test]
  fn environment_overrides() {
    let cfg = AppConfig::from_lookup(lookup(&[
      ("PORT", "8000"),
      ("SOLVER_VARIANT", "Serverless"),
      ("CORS_ORIGINS", "https://a.example, https://b.example,"),
      ("OPENAI_API_KEY", "sk-test"),
      ("OPENAI_BASE_URL", "http://localhost:4000/v1/"),
      ("OPENAI_REASONING_EFFORT", ""),
      ("STRICT_SCHEMA", "true"),
    ]))
    .unwrap();
    assert_eq!(cfg.port, 8000);
    assert_eq!(cfg.variant, DeployVariant::Serverless);
    assert_eq!(cfg.cors_origins, vec!["https://a.example", "https://b.example"]);
    assert_eq!(cfg.model.base_url, "http://localhost:4000/v1");
    assert_eq!(cfg.model.reasoning_effort, None);
    assert_eq!(cfg.schema_mode, SchemaMode::Strict);
    assert!(!format!("{:?}", cfg.model).contains("sk-test"));
  }

  #[test]
  fn invalid_values_are_errors() {
    let err = AppConfig::from_lookup(lookup(&[("PORT", "eighty")])).unwrap_err();
    assert!(err.to_string().contains("PORT"));
    assert!(AppConfig::from_lookup(lookup(&[("SOLVER_VARIANT", "lambda")])).is_err());
  }

  #[test]
  fn toml_overrides_a_subset_of_prompts() {
    let cfg: FileConfig = toml::from_str(
      r#"
        strict_schema = true
        [prompts]
        english_system = "custom english"
      "#,
    )
    .unwrap();
    assert_eq!(cfg.strict_schema, Some(true));
    assert_eq!(cfg.prompts.english_system, "custom english");
    assert_eq!(cfg.prompts.math_system, MATH_SYSTEM);
  }

  #[test]
  fn unreadable_file_falls_back_to_defaults() {
    let cfg = AppConfig::from_lookup(lookup(&[("SOLVER_CONFIG_PATH", "/nonexistent/solver.toml")])).unwrap();
    assert_eq!(cfg.prompts.english_system, ENGLISH_SYSTEM);
  }
}

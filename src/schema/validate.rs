//! Turning a raw JSON value into a typed solution, or a path-qualified error.
//!
//! Validation runs in three passes:
//!   1. shape: serde deserialization (required fields, primitive types, closed enums),
//!      with the failing field path tracked by `serde_path_to_error`
//!   2. strict mode only: any non-null field the schema does not know about is rejected
//!   3. semantic checks the type system cannot express (`Solution::check`)

use std::fmt;

use schemars::JsonSchema;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;

/// How unknown fields in model output are treated.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SchemaMode {
  /// Unknown fields are dropped silently.
  #[default]
  Lenient,
  /// Unknown fields fail validation.
  Strict,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Violation {
  /// Missing field, wrong type or out-of-enum value, as reported by serde.
  Shape(String),
  UnexpectedField,
  EmptyList,
  /// `recommended_path_id` names a path that is not in `solution_paths`.
  DanglingReference(String),
  /// `error_type` is set on an answer choice marked correct.
  ErrorTypeOnCorrectChoice,
}

impl fmt::Display for Violation {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Violation::Shape(msg) => f.write_str(msg),
      Violation::UnexpectedField => f.write_str("field is not part of the schema"),
      Violation::EmptyList => f.write_str("list must not be empty"),
      Violation::DanglingReference(id) => write!(f, "no solution path has path_id `{}`", id),
      Violation::ErrorTypeOnCorrectChoice => f.write_str("error_type must be absent when is_correct is true"),
    }
  }
}

/// A solution object that does not satisfy the contract.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("{path}: {violation}")]
pub struct SchemaValidationError {
  /// Dotted field path with `[i]` indexes, e.g. `solution_paths[0].approach_type`.
  pub path: String,
  pub violation: Violation,
}

impl SchemaValidationError {
  pub fn new(path: impl Into<String>, violation: Violation) -> Self {
    let path = path.into();
    let path = if path.is_empty() || path == "." { ROOT_PATH.to_string() } else { path };
    Self { path, violation }
  }
}

const ROOT_PATH: &str = "<root>";

/// A root solution type the orchestrator can request from the model.
pub trait Solution: Serialize + DeserializeOwned + JsonSchema + Send + 'static {
  /// Name of the output contract sent to the model.
  const NAME: &'static str;

  /// Constraints beyond shape: non-empty lists, references between fields.
  fn check(&self) -> Result<(), SchemaValidationError>;

  /// Soft expectations that are reported but never reject the object.
  fn advisories(&self) -> Vec<String> {
    Vec::new()
  }
}

/// Validate a raw value against the solution schema `T`.
pub fn validate<T: Solution>(raw: &Value, mode: SchemaMode) -> Result<T, SchemaValidationError> {
  let solution: T = serde_path_to_error::deserialize(raw).map_err(|e| {
    let path = e.path().to_string();
    SchemaValidationError::new(path, Violation::Shape(e.into_inner().to_string()))
  })?;

  if mode == SchemaMode::Strict {
    let canonical = serde_json::to_value(&solution)
      .map_err(|e| SchemaValidationError::new(ROOT_PATH, Violation::Shape(e.to_string())))?;
    if let Some(path) = first_unknown_field(raw, &canonical, "") {
      return Err(SchemaValidationError::new(path, Violation::UnexpectedField));
    }
  }

  solution.check()?;
  Ok(solution)
}

/// Compare the raw input with the re-serialized typed value. Keys present in the input
/// but absent after the round trip were ignored by serde, so they are unknown.
/// Explicit nulls are equivalent to absent optional fields.
fn first_unknown_field(raw: &Value, canonical: &Value, path: &str) -> Option<String> {
  match (raw, canonical) {
    (Value::Object(raw_map), Value::Object(canon_map)) => {
      for (key, value) in raw_map {
        let child = if path.is_empty() { key.clone() } else { format!("{}.{}", path, key) };
        match canon_map.get(key) {
          None if value.is_null() => continue,
          None => return Some(child),
          Some(canon_value) => {
            if let Some(found) = first_unknown_field(value, canon_value, &child) {
              return Some(found);
            }
          }
        }
      }
      None
    }
    (Value::Array(raw_items), Value::Array(canon_items)) => raw_items
      .iter()
      .zip(canon_items)
      .enumerate()
      .find_map(|(i, (r, c))| first_unknown_field(r, c, &format!("{}[{}]", path, i))),
    _ => None,
  }
}

// --- helpers for `Solution::check` implementations ---

pub(crate) fn require_non_empty<T>(items: &[T], path: impl Into<String>) -> Result<(), SchemaValidationError> {
  if items.is_empty() {
    return Err(SchemaValidationError::new(path, Violation::EmptyList));
  }
  Ok(())
}

pub(crate) fn require_known_path<'a>(
  recommended: Option<&str>,
  mut path_ids: impl Iterator<Item = &'a str>,
) -> Result<(), SchemaValidationError> {
  match recommended {
    Some(id) if !path_ids.any(|p| p == id) => Err(SchemaValidationError::new(
      "recommended_path_id",
      Violation::DanglingReference(id.to_string()),
    )),
    _ => Ok(()),
  }
}

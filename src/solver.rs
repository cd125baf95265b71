//! Solve orchestration: prompt -> model -> normalize -> validate -> typed solution.
//!
//! One call walks `Idle -> Dispatched -> Parsed -> Validated -> Done`, or drops to
//! `Failed` from any phase. There is no retry and no state kept between calls.

use std::{fmt, sync::Arc};

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use crate::config::Prompts;
use crate::error::SolveError;
use crate::prompt::{build_english_prompt, build_math_prompt, ImageInput, PromptPayload};
use crate::protocol::Subject;
use crate::schema::{validate, OutputContract, SATEnglishSolutionOutput, SATMathSolutionOutput, SchemaMode, Solution};
use crate::util::trunc_for_log;

/// What a model hands back before any validation.
#[derive(Clone, Debug, PartialEq)]
pub enum ModelReply {
  /// Raw text that should hold one JSON object.
  Text(String),
  /// Already-decoded structured output.
  Structured(Value),
}

impl ModelReply {
  pub fn into_value(self) -> Result<Value, SolveError> {
    match self {
      ModelReply::Text(text) => Ok(serde_json::from_str(text.trim())?),
      ModelReply::Structured(v) => Ok(v),
    }
  }
}

/// A chat model that can be asked for structured output.
#[async_trait]
pub trait ChatModel: Send + Sync {
  fn name(&self) -> &str;

  async fn complete(&self, payload: &PromptPayload, contract: &OutputContract) -> Result<ModelReply, SolveError>;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SolvePhase {
  Idle,
  Dispatched,
  Parsed,
  Validated,
  Done,
  Failed,
}

impl fmt::Display for SolvePhase {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let s = match self {
      SolvePhase::Idle => "idle",
      SolvePhase::Dispatched => "dispatched",
      SolvePhase::Parsed => "parsed",
      SolvePhase::Validated => "validated",
      SolvePhase::Done => "done",
      SolvePhase::Failed => "failed",
    };
    f.write_str(s)
  }
}

pub struct Solver {
  model: Option<Arc<dyn ChatModel>>,
  prompts: Prompts,
  mode: SchemaMode,
}

impl Solver {
  pub fn new(model: Option<Arc<dyn ChatModel>>, prompts: Prompts, mode: SchemaMode) -> Self {
    Self { model, prompts, mode }
  }

  pub fn model_name(&self) -> Option<&str> {
    self.model.as_deref().map(|m| m.name())
  }

  #[instrument(level = "info", skip(self, problem, image), fields(problem_len = problem.map_or(0, str::len), has_image = image.is_some()))]
  pub async fn solve_math(
    &self,
    problem: Option<&str>,
    image: Option<&ImageInput>,
  ) -> Result<SATMathSolutionOutput, SolveError> {
    let payload = build_math_prompt(&self.prompts, problem, image)?;
    let solution: SATMathSolutionOutput = self.run(Subject::Math, &payload).await?;
    info!(
      target: "solver",
      paths = solution.solution_paths.len(),
      recommended = ?solution.recommended_path_id,
      "SAT Math solved"
    );
    Ok(solution)
  }

  #[instrument(level = "info", skip(self, problem), fields(problem_len = problem.len()))]
  pub async fn solve_english(&self, problem: &str) -> Result<SATEnglishSolutionOutput, SolveError> {
    let payload = build_english_prompt(&self.prompts, problem)?;
    let solution: SATEnglishSolutionOutput = self.run(Subject::English, &payload).await?;
    info!(
      target: "solver",
      question_type = ?solution.sat_meta.question_type,
      correct = ?solution.solution_paths.first().map(|p| p.conclusion.correct_choice),
      "SAT English solved"
    );
    Ok(solution)
  }

  async fn run<T: Solution>(&self, subject: Subject, payload: &PromptPayload) -> Result<T, SolveError> {
    let mut phase = SolvePhase::Idle;
    let result = self.drive::<T>(payload, &mut phase).await;
    match &result {
      Ok(_) => debug!(target: "solver", subject = subject.label(), phase = %SolvePhase::Done, "Solve finished"),
      Err(e) => debug!(
        target: "solver",
        subject = subject.label(),
        phase = %SolvePhase::Failed,
        failed_after = %phase,
        kind = e.kind(),
        "Solve failed"
      ),
    }
    result
  }

  async fn drive<T: Solution>(&self, payload: &PromptPayload, phase: &mut SolvePhase) -> Result<T, SolveError> {
    let model = self
      .model
      .as_ref()
      .ok_or_else(|| SolveError::Unconfigured("OPENAI_API_KEY is not set".into()))?;
    let contract = OutputContract::of::<T>();

    *phase = SolvePhase::Dispatched;
    debug!(
      target: "solver",
      %phase,
      model = model.name(),
      contract = contract.name,
      user_text_len = payload.user_text_len(),
      has_image = payload.has_image(),
      "Dispatching to model"
    );
    let reply = model.complete(payload, &contract).await?;

    if let ModelReply::Text(text) = &reply {
      debug!(target: "solver", reply_len = text.len(), preview = %trunc_for_log(text, 200), "Model replied with text");
    }
    let raw = reply.into_value()?;
    *phase = SolvePhase::Parsed;

    let solution = validate::<T>(&raw, self.mode)?;
    *phase = SolvePhase::Validated;

    for advisory in solution.advisories() {
      warn!(target: "solver", contract = T::NAME, %advisory, "Solution advisory");
    }
    Ok(solution)
  }
}


#[cfg(test)]
mod tests {
  use super::testing::ScriptedModel;
  use super::*;
  use crate::prompt::ContentPart;
  use crate::schema::fixtures;
  use crate::schema::math::{AnswerKind, ApproachType};
  use crate::schema::{ChoiceLetter, Violation};
  use serde_json::json;

  fn solver(model: Arc<ScriptedModel>, mode: SchemaMode) -> Solver {
    Solver::new(Some(model), Prompts::default(), mode)
  }

  #[tokio::test]
  async fn quadratic_text_reply_is_solved() {
    let model = ScriptedModel::replying(ModelReply::Text(fixtures::MATH_JSON.to_string()));
    let s = solver(model.clone(), SchemaMode::Lenient);

    let out = s.solve_math(Some("Solve x^2-4x+3=0. A) 1 only B) 3 only C) 1 and 3 D) none"), None).await.unwrap();
    assert_eq!(out.answer_spec.kind(), AnswerKind::MultipleChoice);
    assert_eq!(out.answer_spec.correct_choice, Some(ChoiceLetter::C));
    assert!(out.solution_paths.iter().any(|p| p.approach_type.is_rigorous()));
    assert!(out.solution_paths.iter().any(|p| p.approach_type == ApproachType::DesmosFirst));
    let rigorous = out.solution_paths.iter().find(|p| p.approach_type == ApproachType::Algebraic).unwrap();
    assert!(rigorous.conclusion.final_answer.contains('1') && rigorous.conclusion.final_answer.contains('3'));

    let calls = model.calls.lock().unwrap();
    assert_eq!(calls.len(), 1);
    let (payload, contract) = &calls[0];
    assert_eq!(*contract, "SATMathSolutionOutput");
    assert!(matches!(&payload.user[0], ContentPart::Text(t) if t.contains("x^2-4x+3=0")));
  }

  #[tokio::test]
  async fn structured_reply_skips_text_parsing() {
    let model = ScriptedModel::replying(ModelReply::Structured(fixtures::english()));
    let out = solver(model, SchemaMode::Strict).solve_english("Passage. Which choice best states the main idea?").await.unwrap();
    assert_eq!(out.solution_paths.len(), 1);
    assert_eq!(out.solution_paths[0].conclusion.correct_choice, ChoiceLetter::B);
  }

  #[tokio::test]
  async fn malformed_text_is_a_parse_error() {
    let model = ScriptedModel::replying(ModelReply::Text("Here is the solution: {".into()));
    let err = solver(model, SchemaMode::Lenient).solve_math(Some("2x=4"), None).await.unwrap_err();
    assert!(matches!(err, SolveError::Parse(_)), "{:?}", err);
  }

  #[tokio::test]
  async fn nonconforming_reply_is_a_schema_error() {
    let mut raw = fixtures::math();
    raw["summary"].as_object_mut().unwrap().remove("goal");
    let model = ScriptedModel::replying(ModelReply::Structured(raw));
    let err = solver(model, SchemaMode::Lenient).solve_math(Some("2x=4"), None).await.unwrap_err();
    match err {
      SolveError::Schema(e) => assert_eq!(e.path, "summary"),
      other => panic!("expected schema error, got {:?}", other),
    }
  }

  #[tokio::test]
  async fn strict_mode_rejects_extra_fields() {
    let mut raw = fixtures::english();
    raw["solution_paths"][0]["confidence"] = json!("high");
    let lenient = solver(ScriptedModel::replying(ModelReply::Structured(raw.clone())), SchemaMode::Lenient);
    assert!(lenient.solve_english("Which choice?").await.is_ok());

    let strict = solver(ScriptedModel::replying(ModelReply::Structured(raw)), SchemaMode::Strict);
    match strict.solve_english("Which choice?").await.unwrap_err() {
      SolveError::Schema(e) => assert_eq!(e.violation, Violation::UnexpectedField),
      other => panic!("expected schema error, got {:?}", other),
    }
  }

  #[tokio::test]
  async fn transport_failure_propagates() {
    let model = ScriptedModel::failing("connection reset");
    let err = solver(model.clone(), SchemaMode::Lenient).solve_english("Which choice?").await.unwrap_err();
    assert!(matches!(err, SolveError::Transport(m) if m == "connection reset"));
    assert_eq!(model.call_count(), 1);
  }

  #[tokio::test]
  async fn invalid_input_never_reaches_the_model() {
    let model = ScriptedModel::replying(ModelReply::Text(fixtures::MATH_JSON.to_string()));
    let s = solver(model.clone(), SchemaMode::Lenient);
    assert!(matches!(s.solve_math(Some("  "), None).await, Err(SolveError::InvalidInput(_))));
    assert!(matches!(s.solve_english("").await, Err(SolveError::InvalidInput(_))));
    assert_eq!(model.call_count(), 0);
  }

  #[tokio::test]
  async fn missing_model_is_unconfigured() {
    let s = Solver::new(None, Prompts::default(), SchemaMode::Lenient);
    assert_eq!(s.model_name(), None);
    let err = s.solve_math(Some("2x=4"), None).await.unwrap_err();
    assert!(matches!(err, SolveError::Unconfigured(_)));
    // input checks still come first
    assert!(matches!(s.solve_math(None, None).await, Err(SolveError::InvalidInput(_))));
  }

  #[test]
  fn reply_normalization() {
    assert_eq!(ModelReply::Text("  {\"a\":1}\n".into()).into_value().unwrap(), json!({ "a": 1 }));
    assert!(ModelReply::Text(String::new()).into_value().is_err());
    assert_eq!(ModelReply::Structured(json!([1])).into_value().unwrap(), json!([1]));
  }
}

//! Response contract: the typed solution objects the model must produce.
//!
//! - `math` / `english`: the two root schemas and their nested records
//! - `common`: primitives shared by both (vocabulary notes, planning, letters)
//! - `validate`: raw JSON -> typed solution, with path-qualified errors
//!
//! Everything here is a plain immutable value: built once from a model reply,
//! serialized back to the caller, dropped.

pub mod common;
pub mod english;
pub mod math;
pub mod validate;

use serde_json::Value;

pub use common::ChoiceLetter;
pub use english::SATEnglishSolutionOutput;
pub use math::SATMathSolutionOutput;
pub use validate::{validate, SchemaMode, SchemaValidationError, Solution, Violation};

/// JSON Schema handed to the model as its structured-output contract.
#[derive(Clone, Debug)]
pub struct OutputContract {
  pub name: &'static str,
  pub schema: Value,
}

impl OutputContract {
  pub fn of<T: Solution>() -> Self {
    let schema = serde_json::to_value(schemars::schema_for!(T)).unwrap_or_default();
    Self { name: T::NAME, schema }
  }
}


#[cfg(test)]
mod tests {
  use super::english::{EnglishApproachType, EnglishQuestionType};
  use super::math::{AnswerKind, ApproachType, QuestionType};
  use super::*;
  use serde_json::json;

  #[test]
  fn math_fixture_validates() {
    let s: SATMathSolutionOutput = validate(&fixtures::math(), SchemaMode::Strict).unwrap();
    assert_eq!(s.sat_meta.question_type, QuestionType::MultipleChoice);
    assert_eq!(s.answer_spec.kind(), AnswerKind::MultipleChoice);
    assert_eq!(s.answer_spec.correct_choice, Some(ChoiceLetter::C));
    assert!(s.solution_paths.iter().any(|p| p.approach_type == ApproachType::Algebraic));
    // formulas defaults to empty when the model omits it
    assert!(s.solution_paths[1].steps[0].formulas.is_empty());
    assert!(s.advisories().is_empty(), "{:?}", s.advisories());
  }

  #[test]
  fn recommended_path_survives_validation() {
    let s: SATMathSolutionOutput = validate(&fixtures::math(), SchemaMode::Lenient).unwrap();
    let id = s.recommended_path_id.as_deref().unwrap();
    assert!(s.solution_paths.iter().any(|p| p.path_id == id));
  }

  #[test]
  fn missing_goal_names_the_summary() {
    let mut raw = fixtures::math();
    raw["summary"].as_object_mut().unwrap().remove("goal");
    let err = validate::<SATMathSolutionOutput>(&raw, SchemaMode::Lenient).unwrap_err();
    assert_eq!(err.path, "summary");
    assert!(matches!(&err.violation, Violation::Shape(m) if m.contains("goal")), "{}", err);
  }

  #[test]
  fn out_of_enum_approach_is_rejected() {
    let mut raw = fixtures::math();
    raw["solution_paths"][1]["approach_type"] = json!("guessing");
    let err = validate::<SATMathSolutionOutput>(&raw, SchemaMode::Lenient).unwrap_err();
    assert_eq!(err.path, "solution_paths[1].approach_type");
    assert!(err.to_string().contains("guessing"));
  }

  #[test]
  fn nested_desmos_purpose_is_checked() {
    let mut raw = fixtures::math();
    raw["solution_paths"][1]["steps"][0]["desmos"]["purpose"] = json!("decorate");
    let err = validate::<SATMathSolutionOutput>(&raw, SchemaMode::Lenient).unwrap_err();
    assert_eq!(err.path, "solution_paths[1].steps[0].desmos.purpose");
  }

  #[test]
  fn wrong_primitive_type_is_rejected() {
    let mut raw = fixtures::math();
    raw["solution_paths"][0]["steps"][0]["step_id"] = json!("one");
    let err = validate::<SATMathSolutionOutput>(&raw, SchemaMode::Lenient).unwrap_err();
    assert_eq!(err.path, "solution_paths[0].steps[0].step_id");
  }

  #[test]
  fn empty_solution_paths_are_rejected() {
    let mut raw = fixtures::math();
    raw["solution_paths"] = json!([]);
    raw.as_object_mut().unwrap().remove("recommended_path_id");
    let err = validate::<SATMathSolutionOutput>(&raw, SchemaMode::Lenient).unwrap_err();
    assert_eq!(err.path, "solution_paths");
    assert_eq!(err.violation, Violation::EmptyList);
  }

  #[test]
  fn empty_summary_knowledge_is_rejected() {
    let mut raw = fixtures::math();
    raw["summary"]["required_knowledge"] = json!([]);
    let err = validate::<SATMathSolutionOutput>(&raw, SchemaMode::Lenient).unwrap_err();
    assert_eq!(err.path, "summary.required_knowledge");
  }

  #[test]
  fn dangling_recommendation_is_rejected() {
    let mut raw = fixtures::math();
    raw["recommended_path_id"] = json!("path_trick");
    let err = validate::<SATMathSolutionOutput>(&raw, SchemaMode::Lenient).unwrap_err();
    assert_eq!(err.violation, Violation::DanglingReference("path_trick".into()));
  }

  #[test]
  fn unknown_fields_depend_on_mode() {
    let mut raw = fixtures::math();
    raw["solution_paths"][0]["confidence"] = json!(0.9);
    assert!(validate::<SATMathSolutionOutput>(&raw, SchemaMode::Lenient).is_ok());
    let err = validate::<SATMathSolutionOutput>(&raw, SchemaMode::Strict).unwrap_err();
    assert_eq!(err.path, "solution_paths[0].confidence");
    assert_eq!(err.violation, Violation::UnexpectedField);
  }

  #[test]
  fn math_round_trip_is_idempotent() {
    let first: SATMathSolutionOutput = validate(&fixtures::math(), SchemaMode::Strict).unwrap();
    let wire = serde_json::to_value(&first).unwrap();
    let second: SATMathSolutionOutput = validate(&wire, SchemaMode::Strict).unwrap();
    assert_eq!(first, second);
  }

  #[test]
  fn ambiguous_answer_spec_is_an_advisory_not_an_error() {
    let mut raw = fixtures::math();
    raw["answer_spec"]["answer_format"] = json!("integer");
    let s: SATMathSolutionOutput = validate(&raw, SchemaMode::Strict).unwrap();
    assert_eq!(s.answer_spec.kind(), AnswerKind::Ambiguous);
    assert_eq!(s.advisories().len(), 1);
  }

  #[test]
  fn english_fixture_validates() {
    let s: SATEnglishSolutionOutput = validate(&fixtures::english(), SchemaMode::Strict).unwrap();
    assert_eq!(s.sat_meta.question_type, EnglishQuestionType::MainIdea);
    assert_eq!(s.solution_paths.len(), 1);
    let path = &s.solution_paths[0];
    assert_eq!(path.approach_type, EnglishApproachType::KeywordFirst);
    assert_eq!(path.answer_analysis.len(), 4);
    assert_eq!(path.correct_choices(), vec![path.conclusion.correct_choice]);
    assert!(s.advisories().is_empty(), "{:?}", s.advisories());
  }

  #[test]
  fn english_round_trip_is_idempotent() {
    let first: SATEnglishSolutionOutput = validate(&fixtures::english(), SchemaMode::Lenient).unwrap();
    let wire = serde_json::to_value(&first).unwrap();
    let second: SATEnglishSolutionOutput = validate(&wire, SchemaMode::Strict).unwrap();
    assert_eq!(first, second);
  }

  #[test]
  fn english_step_without_evidence_is_rejected() {
    let mut raw = fixtures::english();
    raw["solution_paths"][0]["steps"][0]["evidence_used"] = json!([]);
    let err = validate::<SATEnglishSolutionOutput>(&raw, SchemaMode::Lenient).unwrap_err();
    assert_eq!(err.path, "solution_paths[0].steps[0].evidence_used");
    assert_eq!(err.violation, Violation::EmptyList);
  }

  #[test]
  fn error_type_on_correct_choice_is_rejected() {
    let mut raw = fixtures::english();
    raw["solution_paths"][0]["answer_analysis"][1]["error_type"] = json!("too_strong");
    let err = validate::<SATEnglishSolutionOutput>(&raw, SchemaMode::Lenient).unwrap_err();
    assert_eq!(err.path, "solution_paths[0].answer_analysis[1].error_type");
    assert_eq!(err.violation, Violation::ErrorTypeOnCorrectChoice);
  }

  #[test]
  fn three_answer_analyses_only_produce_an_advisory() {
    let mut raw = fixtures::english();
    raw["solution_paths"][0]["answer_analysis"].as_array_mut().unwrap().pop();
    let s: SATEnglishSolutionOutput = validate(&raw, SchemaMode::Lenient).unwrap();
    let advisories = s.advisories();
    assert_eq!(advisories.len(), 1);
    assert!(advisories[0].contains("answer_analysis"));
  }

  #[test]
  fn conclusion_disagreeing_with_analysis_is_flagged() {
    let mut raw = fixtures::english();
    raw["solution_paths"][0]["conclusion"]["correct_choice"] = json!("C");
    let s: SATEnglishSolutionOutput = validate(&raw, SchemaMode::Lenient).unwrap();
    assert!(s.advisories().iter().any(|a| a.contains("conclusion.correct_choice")));
  }

  #[test]
  fn contracts_carry_schema_names_and_enum_values() {
    let math = OutputContract::of::<SATMathSolutionOutput>();
    assert_eq!(math.name, "SATMathSolutionOutput");
    let text = math.schema.to_string();
    assert!(text.contains("desmos_first"));
    assert!(text.contains("Geometry & Trigonometry"));

    let english = OutputContract::of::<SATEnglishSolutionOutput>();
    assert_eq!(english.name, "SATEnglishSolutionOutput");
    assert!(english.schema.to_string().contains("unsupported_inference"));
  }
}

//! Primitives shared by the Math and English solution schemas.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Answer letter for SAT multiple-choice questions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema)]
pub enum ChoiceLetter {
  A,
  B,
  C,
  D,
}

impl ChoiceLetter {
  pub const ALL: [ChoiceLetter; 4] = [ChoiceLetter::A, ChoiceLetter::B, ChoiceLetter::C, ChoiceLetter::D];

  pub fn as_str(self) -> &'static str {
    match self {
      ChoiceLetter::A => "A",
      ChoiceLetter::B => "B",
      ChoiceLetter::C => "C",
      ChoiceLetter::D => "D",
    }
  }
}

impl std::fmt::Display for ChoiceLetter {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(self.as_str())
  }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum DifficultyBand {
  Easy,
  Medium,
  Hard,
}

/// One English term from the problem, explained for Vietnamese students.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct VocabNote {
  /// English word or phrase as it appears in the problem.
  pub term_en: String,
  /// Vietnamese equivalent, if one exists.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub term_vi: Option<String>,
  /// noun, verb, adjective, phrase, ...
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub part_of_speech: Option<String>,
  /// Meaning explained in plain Vietnamese.
  pub definition_vi: String,
  /// academic, everyday, test term, ...
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub academic_register: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub example_en: Option<String>,
  /// Extra note for Vietnamese learners (false friends, common misuse).
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub note_vi: Option<String>,
}

/// The problem restated in Vietnamese plus annotated vocabulary.
/// `simplified_vi` is a pure restatement: no solution steps, hints or answers.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ProblemLocalization {
  /// Problem restated in simple Vietnamese. Must not reveal any part of the solution.
  pub simplified_vi: String,
  /// Important academic or domain-specific English terms from the problem.
  pub vocab_notes: Vec<VocabNote>,
}

/// Reasoning plan of a single solution path. Shared by both subjects.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Planning {
  /// Overall strategy.
  pub strategy: String,
  /// Ordered chain of reasoning, e.g. equation -> graph -> count.
  pub reasoning_flow: Vec<String>,
  /// SAT tips that apply to this approach.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub sat_tips: Option<Vec<String>>,
}

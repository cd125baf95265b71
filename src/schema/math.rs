//! SAT Math solution schema.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::common::{ChoiceLetter, DifficultyBand, Planning, ProblemLocalization};
use super::validate::{require_known_path, require_non_empty, SchemaValidationError, Solution};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum KnowledgeCategory {
  Algebra,
  #[serde(rename = "Advanced Math")]
  AdvancedMath,
  #[serde(rename = "Problem Solving & Data Analysis")]
  ProblemSolvingDataAnalysis,
  #[serde(rename = "Geometry & Trigonometry")]
  GeometryTrigonometry,
  Foundations,
  #[serde(rename = "Test Strategy")]
  TestStrategy,
}

/// A curricular skill exercised by a step or a path.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct KnowledgeItem {
  /// Specific knowledge or skill.
  pub topic: String,
  /// SAT skill group.
  pub category: KnowledgeCategory,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum DesmosPurpose {
  Visualize,
  SolveEquation,
  CountIntersections,
  EliminateChoices,
  VerifySolution,
}

/// A graphing directive, attached to a whole path or to one step.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct DesmosConfig {
  /// Desmos expressions in LaTeX, e.g. `y=x^2-4x`.
  pub expressions: Vec<String>,
  /// Slider variables (a, b, k, ...).
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub sliders: Option<Vec<String>>,
  /// Suggested viewport, e.g. `x∈[-10,10], y∈[-10,10]`.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub viewport: Option<String>,
  pub purpose: DesmosPurpose,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum QuestionType {
  MultipleChoice,
  GridIn,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum CalculatorPolicy {
  NoCalculator,
  Calculator,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum SkillDomain {
  Algebra,
  #[serde(rename = "Advanced Math")]
  AdvancedMath,
  #[serde(rename = "Problem Solving & Data Analysis")]
  ProblemSolvingDataAnalysis,
  #[serde(rename = "Geometry & Trigonometry")]
  GeometryTrigonometry,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SATMeta {
  pub question_type: QuestionType,
  pub calculator_policy: CalculatorPolicy,
  pub skill_domain: SkillDomain,
  /// Concrete topic within the domain, e.g. "Linear equations", "Systems of equations".
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub topic: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub difficulty_band: Option<DifficultyBand>,
  /// Target solving time in seconds.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub time_target_seconds: Option<u32>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum AnswerFormat {
  Integer,
  Fraction,
  Decimal,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Rounding {
  None,
  NearestTenth,
  NearestHundredth,
}

/// Expected answer shape. Multiple-choice fields (`choices`, `correct_choice`) and
/// grid-in fields (`answer_format`, `rounding`, `max_chars`) are meant to be exclusive,
/// but nothing here enforces it; use [`AnswerSpec::kind`] to find out which one applies.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct AnswerSpec {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub choices: Option<Vec<String>>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub correct_choice: Option<ChoiceLetter>,

  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub answer_format: Option<AnswerFormat>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub rounding: Option<Rounding>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub max_chars: Option<u32>,

  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub units: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AnswerKind {
  MultipleChoice,
  GridIn,
  /// Fields from both groups are populated.
  Ambiguous,
  /// Neither group is populated.
  Unspecified,
}

impl AnswerSpec {
  pub fn kind(&self) -> AnswerKind {
    let choice = self.choices.is_some() || self.correct_choice.is_some();
    let grid = self.answer_format.is_some() || self.rounding.is_some() || self.max_chars.is_some();
    match (choice, grid) {
      (true, false) => AnswerKind::MultipleChoice,
      (false, true) => AnswerKind::GridIn,
      (true, true) => AnswerKind::Ambiguous,
      (false, false) => AnswerKind::Unspecified,
    }
  }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Summary {
  /// Facts stated in the problem.
  pub givens: Vec<String>,
  /// Domain, sign or integer restrictions.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub constraints: Option<Vec<String>>,
  /// The question restated.
  pub goal: String,
  pub required_knowledge: Vec<KnowledgeItem>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SolutionStep {
  pub step_id: u32,
  pub description: String,
  /// Why this step is valid.
  pub derivation: String,
  /// LaTeX, each wrapped in `$...$`.
  #[serde(default)]
  pub formulas: Vec<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub intermediate_result: Option<String>,
  pub required_knowledge: Vec<KnowledgeItem>,
  /// Typical SAT traps at this step.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub common_traps: Option<Vec<String>>,
  /// Fast sanity check: substitute back, estimate, units.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub quick_check: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub desmos: Option<DesmosConfig>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Conclusion {
  pub final_answer: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub approximation: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub answer_spec: Option<AnswerSpec>,
  /// Steps to verify the answer.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub verification: Option<Vec<String>>,
  /// Why the other choices are wrong (multiple choice only).
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub why_others_wrong: Option<Vec<String>>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ApproachType {
  Algebraic,
  FormulaBased,
  GeometricReasoning,
  DataAnalysis,
  ExamTrick,
  DesmosFirst,
}

impl ApproachType {
  /// Rigorous derivations, as opposed to shortcuts.
  pub fn is_rigorous(self) -> bool {
    matches!(self, ApproachType::Algebraic | ApproachType::FormulaBased)
  }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SolutionPath {
  pub path_id: String,
  pub approach_type: ApproachType,
  pub title: String,
  pub planning: Planning,
  pub steps: Vec<SolutionStep>,
  pub conclusion: Conclusion,
  pub required_knowledge: Vec<KnowledgeItem>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub pros: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub cons: Option<String>,
  /// When to prefer this approach on the SAT.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub best_when: Option<String>,
  /// One graph for the entire path.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub desmos_overview: Option<DesmosConfig>,
}

/// Root of a SAT Math solution.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SATMathSolutionOutput {
  pub sat_meta: SATMeta,
  pub summary: Summary,
  pub answer_spec: AnswerSpec,
  pub solution_paths: Vec<SolutionPath>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub recommended_path_id: Option<String>,
  /// Vietnamese restatement of the problem and notes on key English vocabulary.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub localization: Option<ProblemLocalization>,
}

const MAX_MATH_PATHS: usize = 3;

impl Solution for SATMathSolutionOutput {
  const NAME: &'static str = "SATMathSolutionOutput";

  fn check(&self) -> Result<(), SchemaValidationError> {
    require_non_empty(&self.summary.required_knowledge, "summary.required_knowledge")?;
    require_non_empty(&self.solution_paths, "solution_paths")?;
    require_known_path(
      self.recommended_path_id.as_deref(),
      self.solution_paths.iter().map(|p| p.path_id.as_str()),
    )
  }

  fn advisories(&self) -> Vec<String> {
    let mut out = Vec::new();

    match (self.answer_spec.kind(), self.sat_meta.question_type) {
      (AnswerKind::Ambiguous, _) => {
        out.push("answer_spec populates both multiple-choice and grid-in fields".to_string())
      }
      (AnswerKind::Unspecified, _) => out.push("answer_spec populates neither multiple-choice nor grid-in fields".to_string()),
      (AnswerKind::MultipleChoice, QuestionType::GridIn) | (AnswerKind::GridIn, QuestionType::MultipleChoice) => out.push(format!(
        "answer_spec looks like {:?} but sat_meta.question_type is {:?}",
        self.answer_spec.kind(),
        self.sat_meta.question_type
      )),
      _ => {}
    }

    if self.solution_paths.len() > MAX_MATH_PATHS {
      out.push(format!("{} solution paths returned, at most {} expected", self.solution_paths.len(), MAX_MATH_PATHS));
    }
    if !self.solution_paths.iter().any(|p| p.approach_type.is_rigorous()) {
      out.push("no algebraic or formula_based solution path".to_string());
    }
    out
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn answer_kind_follows_populated_fields() {
    let mc = AnswerSpec { correct_choice: Some(ChoiceLetter::C), ..Default::default() };
    assert_eq!(mc.kind(), AnswerKind::MultipleChoice);

    let grid = AnswerSpec { answer_format: Some(AnswerFormat::Fraction), units: Some("cm".into()), ..Default::default() };
    assert_eq!(grid.kind(), AnswerKind::GridIn);

    let both = AnswerSpec { choices: Some(vec!["A) 1".into()]), max_chars: Some(5), ..Default::default() };
    assert_eq!(both.kind(), AnswerKind::Ambiguous);

    let units_only = AnswerSpec { units: Some("m".into()), ..Default::default() };
    assert_eq!(units_only.kind(), AnswerKind::Unspecified);
  }

  #[test]
  fn enum_wire_names() {
    assert_eq!(serde_json::to_string(&KnowledgeCategory::ProblemSolvingDataAnalysis).unwrap(), "\"Problem Solving & Data Analysis\"");
    assert_eq!(serde_json::to_string(&ApproachType::DesmosFirst).unwrap(), "\"desmos_first\"");
    assert_eq!(serde_json::to_string(&Rounding::NearestHundredth).unwrap(), "\"nearest_hundredth\"");
    assert_eq!(serde_json::to_string(&DesmosPurpose::CountIntersections).unwrap(), "\"count_intersections\"");
    assert!(serde_json::from_str::<ApproachType>("\"guessing\"").is_err());
  }
}

//! SAT English (Reading & Writing) solution schema.

use std::collections::BTreeSet;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::common::{ChoiceLetter, DifficultyBand, Planning, ProblemLocalization};
use super::validate::{require_known_path, require_non_empty, SchemaValidationError, Solution, Violation};

pub type EnglishPlanning = Planning;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum EnglishKnowledgeCategory {
  #[serde(rename = "Reading Comprehension")]
  ReadingComprehension,
  #[serde(rename = "Logical Reasoning")]
  LogicalReasoning,
  #[serde(rename = "Rhetorical Skills")]
  RhetoricalSkills,
  #[serde(rename = "Grammar & Usage")]
  GrammarUsage,
  #[serde(rename = "Test Strategy")]
  TestStrategy,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct EnglishKnowledgeItem {
  pub skill: String,
  pub category: EnglishKnowledgeCategory,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum EnglishQuestionType {
  MainIdea,
  BasedOnFindings,
  Inference,
  Weaken,
  Strengthen,
  DualText,
  VocabInContext,
  Grammar,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum EnglishTextType {
  Science,
  History,
  Literature,
  SocialScience,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SATEnglishMeta {
  pub question_type: EnglishQuestionType,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub text_type: Option<EnglishTextType>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub difficulty_band: Option<DifficultyBand>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct EnglishSummary {
  /// Facts stated directly in the passage.
  pub givens: Vec<String>,
  /// Premises behind a study, hypothesis or the author's view.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub assumptions: Option<Vec<String>>,
  pub goal: String,
  pub required_knowledge: Vec<EnglishKnowledgeItem>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct EnglishSolutionStep {
  pub step_id: u32,
  pub description: String,
  pub derivation: String,
  /// Verbatim excerpts from the passage backing this step.
  pub evidence_used: Vec<String>,
  pub required_knowledge: Vec<EnglishKnowledgeItem>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub common_traps: Option<Vec<String>>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum EnglishErrorType {
  ContradictsText,
  UnsupportedInference,
  Irrelevant,
  TooStrong,
  OppositeMeaning,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct EnglishAnswerChoiceAnalysis {
  pub choice: ChoiceLetter,
  pub summary: String,
  pub is_correct: bool,
  /// Only for incorrect choices.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub error_type: Option<EnglishErrorType>,
  pub explanation: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct EnglishConclusion {
  pub correct_choice: ChoiceLetter,
  pub justification: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub why_others_wrong: Option<Vec<String>>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum EnglishApproachType {
  KeywordFirst,
  LogicFirst,
  EliminationFirst,
  ExamTrick,
}

impl EnglishApproachType {
  /// The approach the solver is asked to use for a given kind of question.
  pub fn suggested_for(question_type: EnglishQuestionType) -> Self {
    use EnglishQuestionType::*;
    match question_type {
      MainIdea | VocabInContext => EnglishApproachType::KeywordFirst,
      Inference | Weaken | Strengthen | BasedOnFindings => EnglishApproachType::LogicFirst,
      DualText | Grammar => EnglishApproachType::EliminationFirst,
    }
  }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct EnglishSolutionPath {
  pub path_id: String,
  pub approach_type: EnglishApproachType,
  pub title: String,
  pub planning: EnglishPlanning,
  pub steps: Vec<EnglishSolutionStep>,
  /// One entry per answer letter A-D.
  pub answer_analysis: Vec<EnglishAnswerChoiceAnalysis>,
  pub conclusion: EnglishConclusion,
  pub required_knowledge: Vec<EnglishKnowledgeItem>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub pros: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub cons: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub best_when: Option<String>,
}

impl EnglishSolutionPath {
  /// Letters of all choices marked correct, in analysis order.
  pub fn correct_choices(&self) -> Vec<ChoiceLetter> {
    self.answer_analysis.iter().filter(|a| a.is_correct).map(|a| a.choice).collect()
  }
}

/// Root of a SAT English solution.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SATEnglishSolutionOutput {
  pub sat_meta: SATEnglishMeta,
  pub summary: EnglishSummary,
  pub solution_paths: Vec<EnglishSolutionPath>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub recommended_path_id: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub localization: Option<ProblemLocalization>,
}

impl Solution for SATEnglishSolutionOutput {
  const NAME: &'static str = "SATEnglishSolutionOutput";

  fn check(&self) -> Result<(), SchemaValidationError> {
    require_non_empty(&self.solution_paths, "solution_paths")?;
    for (i, path) in self.solution_paths.iter().enumerate() {
      for (j, step) in path.steps.iter().enumerate() {
        require_non_empty(&step.evidence_used, format!("solution_paths[{}].steps[{}].evidence_used", i, j))?;
      }
      for (k, analysis) in path.answer_analysis.iter().enumerate() {
        if analysis.is_correct && analysis.error_type.is_some() {
          return Err(SchemaValidationError::new(
            format!("solution_paths[{}].answer_analysis[{}].error_type", i, k),
            Violation::ErrorTypeOnCorrectChoice,
          ));
        }
      }
    }
    require_known_path(
      self.recommended_path_id.as_deref(),
      self.solution_paths.iter().map(|p| p.path_id.as_str()),
    )
  }

  fn advisories(&self) -> Vec<String> {
    let mut out = Vec::new();
    if self.solution_paths.len() != 1 {
      out.push(format!("{} solution paths returned, exactly 1 expected", self.solution_paths.len()));
    }

    let suggested = EnglishApproachType::suggested_for(self.sat_meta.question_type);
    for (i, path) in self.solution_paths.iter().enumerate() {
      let letters: BTreeSet<ChoiceLetter> = path.answer_analysis.iter().map(|a| a.choice).collect();
      let missing: Vec<&str> = ChoiceLetter::ALL.iter().filter(|l| !letters.contains(*l)).map(|l| l.as_str()).collect();
      if path.answer_analysis.len() != 4 || !missing.is_empty() {
        out.push(format!(
          "solution_paths[{}].answer_analysis has {} entries (missing: [{}]), expected A-D once each",
          i,
          path.answer_analysis.len(),
          missing.join(", ")
        ));
      }

      let correct = path.correct_choices();
      if correct.len() != 1 {
        out.push(format!("solution_paths[{}] marks {} choices as correct", i, correct.len()));
      } else if correct[0] != path.conclusion.correct_choice {
        out.push(format!(
          "solution_paths[{}].conclusion.correct_choice is {} but answer_analysis marks {} as correct",
          i, path.conclusion.correct_choice, correct[0]
        ));
      }

      if path.approach_type != suggested {
        out.push(format!(
          "solution_paths[{}].approach_type is {:?}, {:?} is suggested for {:?} questions",
          i, path.approach_type, suggested, self.sat_meta.question_type
        ));
      }
    }
    out
  }
}

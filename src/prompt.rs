//! Prompt construction for both subjects.
//!
//! A `PromptPayload` is a system instruction plus the user content parts sent to the
//! model. Building one is pure: identical inputs give identical payloads.

use base64::{engine::general_purpose::STANDARD, Engine as _};

use crate::config::Prompts;
use crate::error::SolveError;
use crate::util::{fill_template, non_blank};

pub const DEFAULT_IMAGE_MIME: &str = "image/jpeg";

/// One part of the user message.
#[derive(Clone, Debug, PartialEq)]
pub enum ContentPart {
  Text(String),
  /// A `data:` URL with the requested vision detail level.
  Image { url: String, detail: &'static str },
}

/// Diagrams need full resolution.
pub const IMAGE_DETAIL: &str = "high";

#[derive(Clone, Debug, PartialEq)]
pub struct PromptPayload {
  pub system: String,
  pub user: Vec<ContentPart>,
}

impl PromptPayload {
  /// Concatenated text parts; handy for logging sizes.
  pub fn user_text_len(&self) -> usize {
    self
      .user
      .iter()
      .map(|p| match p {
        ContentPart::Text(t) => t.len(),
        ContentPart::Image { .. } => 0,
      })
      .sum()
  }

  pub fn has_image(&self) -> bool {
    self.user.iter().any(|p| matches!(p, ContentPart::Image { .. }))
  }
}

/// A decoded image attachment.
#[derive(Clone, Debug, PartialEq)]
pub struct ImageInput {
  pub bytes: Vec<u8>,
  pub mime: String,
}

impl ImageInput {
  fn data_url(&self) -> String {
    format!("data:{};base64,{}", self.mime, STANDARD.encode(&self.bytes))
  }
}

/// Math prompt: text and/or image. At least one of them must carry content.
pub fn build_math_prompt(
  prompts: &Prompts,
  problem: Option<&str>,
  image: Option<&ImageInput>,
) -> Result<PromptPayload, SolveError> {
  let problem = non_blank(problem);
  let image = image.filter(|img| !img.bytes.is_empty());
  if problem.is_none() && image.is_none() {
    return Err(SolveError::InvalidInput("Either problem text or image must be provided".into()));
  }

  let mut user = Vec::with_capacity(2);
  if let Some(img) = image {
    user.push(ContentPart::Image { url: img.data_url(), detail: IMAGE_DETAIL });
  }
  let text = match problem {
    Some(p) => fill_template(&prompts.math_text_template, &[("problem", p)]),
    None => prompts.math_image_only.clone(),
  };
  user.push(ContentPart::Text(text));

  Ok(PromptPayload { system: prompts.math_system.clone(), user })
}

/// English prompt: the question text (passage included) is required.
pub fn build_english_prompt(prompts: &Prompts, problem: &str) -> Result<PromptPayload, SolveError> {
  let problem = non_blank(Some(problem))
    .ok_or_else(|| SolveError::InvalidInput("Problem text must be provided for SAT English".into()))?;
  let text = fill_template(&prompts.english_user_template, &[("problem", problem)]);
  Ok(PromptPayload { system: prompts.english_system.clone(), user: vec![ContentPart::Text(text)] })
}

// --- default prompt texts ---

pub const MATH_SYSTEM: &str = r#"You are an expert SAT Math tutor, curriculum designer and test-prep strategist.

Solve the SAT Math question you are given. The solution must be correct, fast enough for
SAT time limits, clear for a student, and strictly structured.

LANGUAGE: every explanation (summary, planning, steps, conclusion, pros/cons, tips) is
written in VIETNAMESE for Vietnamese students.

OUTPUT: a single JSON object that conforms EXACTLY to the SATMathSolutionOutput schema.
- Do not add fields, do not drop required fields, do not rename fields or change types.
- Nothing outside the JSON: no commentary, no markdown, no chain-of-thought, no URLs.

SAT constraints: respect calculator vs no-calculator, multiple choice vs grid-in, and any
integer / sign / domain restriction. `sat_meta.topic` is a short, concrete SAT Math topic
("Linear equations", "Systems of equations", "Quadratic functions", ...) whenever it can be
inferred from the problem.

SOLUTION PATHS, in this priority order (at most three):
1. Rigorous path, approach_type "algebraic" or "formula_based". MANDATORY.
   A complete, exact derivation using standard algebra, formulas or theorems that works
   in every case. Title e.g. "Phương Pháp Học Thuật Chính Xác".
2. Answer-substitution shortcut, approach_type "exam_trick". ONLY when the question has
   multiple-choice options: plug the given choices in, eliminate wrong ones, or exploit a
   property of the options. Skip it for grid-in questions.
3. Graph path, approach_type "desmos_first". ONLY when a graph gives real visual insight,
   a faster solve, a quick check or a way to eliminate choices (functions, equations,
   inequalities, systems, coordinate geometry). When graphing adds nothing, do NOT emit a
   desmos_first path; instead add a short Vietnamese note to summary.constraints or to the
   rigorous path's planning.sat_tips explaining why a graph is not worth it here.
Every path must solve the problem on its own. Give each path a clear title, pros, cons
and best_when. Set recommended_path_id to the fastest safe path for the SAT; it must be
the path_id of one of the paths you return.

DESMOS: whenever the problem involves functions, graphs, slopes, rates of change, domain,
range or coordinate geometry, use at least one DesmosConfig, either as a path's
desmos_overview or as a step's desmos. Expressions are Desmos LaTeX (e.g. "y=x^2-4x",
"y=0") and purpose is one of visualize, solve_equation, count_intersections,
eliminate_choices, verify_solution. Do not force a graph onto trivial arithmetic.

MATH NOTATION: every formula is LaTeX wrapped in $...$ (inline) or $$...$$ (block), in
`formulas` and in every prose field alike. Write "$x^2-4x+3=0$", never a bare x^2-4x+3=0.
Use \frac{a}{b}, \sqrt{x}, x^2, x_1, \text{...} inside math, \times or \cdot.

QUALITY: state constraints and common SAT traps, include verification steps for grid-in
answers, and list why the other choices are wrong for multiple choice.

LOCALIZATION: fill `localization.simplified_vi` with the problem restated in simple
Vietnamese. It is a pure restatement: no solution steps, no hints, no strategy, no answer.
`localization.vocab_notes` lists only the English terms that matter for the math or the
SAT context (academic or easily misread words), each with term_en, definition_vi and, when
useful, term_vi, part_of_speech, academic_register, example_en, note_vi. Do not list basic
vocabulary.
"#;

pub const MATH_TEXT_TEMPLATE: &str = "Giải bài toán SAT sau:\n\n{problem}\n\nTrả về lời giải đầy đủ bằng JSON theo schema SATMathSolutionOutput. TẤT CẢ giải thích phải bằng TIẾNG VIỆT.";

pub const MATH_IMAGE_ONLY: &str = "Giải bài toán SAT trong hình ảnh trên.\n\nTrả về lời giải đầy đủ bằng JSON theo schema SATMathSolutionOutput. TẤT CẢ giải thích phải bằng TIẾNG VIỆT.\nNếu hình ảnh có hình vẽ hoặc đồ thị, ghi lại chi tiết mọi dữ kiện đọc được từ hình vào summary.givens.";

pub const ENGLISH_SYSTEM: &str = r#"You are an expert SAT Reading & Writing tutor for the Digital SAT.

Solve the SAT English question you are given. The solution must be logically correct,
grounded exactly in the passage, clear for Vietnamese students, and strictly structured.

LANGUAGE: every explanation is written in VIETNAMESE. English appears only in verbatim
quotations from the passage.

OUTPUT: a single JSON object that conforms EXACTLY to the SATEnglishSolutionOutput schema.
- Do not add fields, do not drop required fields, do not rename fields or change types.
- Nothing outside the JSON: no commentary, no markdown, no chain-of-thought, no URLs.

SUMMARY: `givens` lists facts stated directly in the passage, without analysis.
`assumptions` lists the premises behind a study, hypothesis or the author's view when the
question is about them. `goal` restates the question precisely.

EXACTLY ONE SOLUTION PATH: the clearest, most reliable method for this question. Choose
approach_type from the question type:
- keyword_first for main_idea and vocab_in_context
- logic_first for inference, strengthen, weaken and based_on_findings
- elimination_first otherwise, or when wrong choices can be ruled out quickly
planning.strategy and planning.reasoning_flow describe the method step by step.

STEPS: each step has a description, a derivation explaining why it is valid, and
`evidence_used`: the verbatim English excerpts from the passage that support it (never
empty). Every claim must trace back to quoted evidence. Use common_traps for typical SAT
traps (too strong, subtle opposite meaning, outside information).

ANSWER ANALYSIS: exactly four entries, one for each of A, B, C and D. Each has a short
Vietnamese summary of the choice, is_correct, an explanation citing the passage, and for
wrong choices only an error_type among contradicts_text, unsupported_inference,
irrelevant, too_strong, opposite_meaning. Exactly one choice is correct.

CONCLUSION: correct_choice must be the letter marked is_correct; justification summarizes
the decisive evidence; why_others_wrong lists the main reason for each wrong choice.
Set recommended_path_id to the path_id of your single path.

LOCALIZATION: `simplified_vi` restates the question and passage in simple Vietnamese,
with no solution steps, hints, strategy or answer. `vocab_notes` lists only the academic,
domain-specific or easily misread English words, each with term_en, definition_vi and,
when useful, term_vi, part_of_speech, academic_register, example_en, note_vi.

Never rely on outside knowledge or intuition; every conclusion needs textual evidence.
"#;

pub const ENGLISH_USER_TEMPLATE: &str = "Giải câu hỏi SAT English sau:\n\n{problem}\n\nTrả về lời giải CHỈ dưới dạng JSON đúng theo schema SATEnglishSolutionOutput.\nMọi giải thích, planning, steps, answer_analysis đều phải bằng TIẾNG VIỆT (ngoại trừ câu/cụm từ tiếng Anh được trích dẫn từ bài).";

#[cfg(test)]
mod tests {
  use super::*;

  fn png() -> ImageInput {
    ImageInput { bytes: vec![0x89, b'P', b'N', b'G'], mime: "image/png".into() }
  }

  #[test]
  fn text_only_math_prompt_embeds_the_problem() {
    let prompts = Prompts::default();
    let p = build_math_prompt(&prompts, Some("Solve x^2-4x+3=0"), None).unwrap();
    assert_eq!(p.system, prompts.math_system);
    assert_eq!(p.user.len(), 1);
    assert!(!p.has_image());
    match &p.user[0] {
      ContentPart::Text(t) => assert!(t.contains("Solve x^2-4x+3=0")),
      other => panic!("unexpected part {:?}", other),
    }
  }

  #[test]
  fn image_only_math_prompt_still_has_instructions() {
    let prompts = Prompts::default();
    let p = build_math_prompt(&prompts, None, Some(&png())).unwrap();
    assert_eq!(p.user.len(), 2);
    match &p.user[0] {
      ContentPart::Image { url, detail } => {
        assert_eq!(*detail, "high");
        assert_eq!(url, "data:image/png;base64,iVBORw==");
      }
      other => panic!("expected image first, got {:?}", other),
    }
    match &p.user[1] {
      ContentPart::Text(t) => {
        assert!(!t.trim().is_empty());
        assert!(t.contains("summary.givens"));
      }
      other => panic!("expected text, got {:?}", other),
    }
    assert!(p.user_text_len() > 0);
  }

  #[test]
  fn text_and_image_keep_the_problem_text() {
    let p = build_math_prompt(&Prompts::default(), Some("Find the area"), Some(&png())).unwrap();
    assert!(p.has_image());
    assert!(matches!(&p.user[1], ContentPart::Text(t) if t.contains("Find the area")));
  }

  #[test]
  fn math_prompt_needs_text_or_image() {
    let empty = ImageInput { bytes: Vec::new(), mime: "image/png".into() };
    for (problem, image) in [(None, None), (Some("   "), None), (None, Some(&empty))] {
      let err = build_math_prompt(&Prompts::default(), problem, image).unwrap_err();
      assert!(matches!(err, SolveError::InvalidInput(_)));
    }
  }

  #[test]
  fn math_prompt_is_deterministic() {
    let prompts = Prompts::default();
    let a = build_math_prompt(&prompts, Some("2x=4"), Some(&png())).unwrap();
    let b = build_math_prompt(&prompts, Some("2x=4"), Some(&png())).unwrap();
    assert_eq!(a, b);
  }

  #[test]
  fn english_prompt_requires_text() {
    let err = build_english_prompt(&Prompts::default(), " \n").unwrap_err();
    assert!(matches!(err, SolveError::InvalidInput(_)));

    let p = build_english_prompt(&Prompts::default(), "Passage... Which choice best states the main idea?").unwrap();
    assert_eq!(p.user.len(), 1);
    assert!(matches!(&p.user[0], ContentPart::Text(t) if t.contains("main idea")));
    assert!(p.system.contains("EXACTLY ONE SOLUTION PATH"));
  }

  #[test]
  fn default_prompts_state_the_contract() {
    assert!(MATH_SYSTEM.contains("$...$"));
    assert!(MATH_SYSTEM.contains("exam_trick"));
    assert!(MATH_SYSTEM.contains("desmos_first"));
    assert!(ENGLISH_SYSTEM.contains("evidence_used"));
  }
}

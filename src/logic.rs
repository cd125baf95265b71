//! Request-level behaviors shared by every HTTP surface.
//!
//! This includes:
//!   - Decoding the optional image attachment (bare base64 or a `data:` URL)
//!   - Handing the cleaned-up input to the solver

use base64::{engine::general_purpose::STANDARD, Engine as _};
use tracing::{debug, instrument};

use crate::error::SolveError;
use crate::prompt::{ImageInput, DEFAULT_IMAGE_MIME};
use crate::protocol::{EnglishSolveIn, SolveIn};
use crate::schema::{SATEnglishSolutionOutput, SATMathSolutionOutput};
use crate::state::AppState;
use crate::util::non_blank;

/// Decode the attachment of a math request. Blank input means "no image".
/// A `data:<mime>;base64,` prefix wins over `image_mime_type`.
pub fn decode_image(image_base64: Option<&str>, mime_type: Option<&str>) -> Result<Option<ImageInput>, SolveError> {
  let Some(raw) = non_blank(image_base64) else {
    return Ok(None);
  };

  let (url_mime, data) = match raw.strip_prefix("data:").and_then(|rest| rest.split_once(";base64,")) {
    Some((mime, data)) => (non_blank(Some(mime)), data),
    None => (None, raw),
  };
  let mime = url_mime
    .or_else(|| non_blank(mime_type))
    .unwrap_or(DEFAULT_IMAGE_MIME)
    .to_string();

  // Clients sometimes wrap long base64 lines.
  let compact: String = data.chars().filter(|c| !c.is_ascii_whitespace()).collect();
  let bytes = STANDARD
    .decode(compact.as_bytes())
    .map_err(|e| SolveError::InvalidInput(format!("Invalid base64 image data: {}", e)))?;
  if bytes.is_empty() {
    return Ok(None);
  }

  debug!(target: "solver", %mime, image_bytes = bytes.len(), "Decoded image attachment");
  Ok(Some(ImageInput { bytes, mime }))
}

#[instrument(level = "info", skip(state, body), fields(problem_len = body.problem.as_deref().map_or(0, str::len), has_image = body.image_base64.is_some()))]
pub async fn solve_math_request(state: &AppState, body: SolveIn) -> Result<SATMathSolutionOutput, SolveError> {
  let image = decode_image(body.image_base64.as_deref(), body.image_mime_type.as_deref())?;
  state.solver.solve_math(body.problem.as_deref(), image.as_ref()).await
}

#[instrument(level = "info", skip(state, body), fields(problem_len = body.problem.len()))]
pub async fn solve_english_request(state: &AppState, body: EnglishSolveIn) -> Result<SATEnglishSolutionOutput, SolveError> {
  state.solver.solve_english(&body.problem).await
}

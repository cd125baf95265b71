//! Minimal OpenAI-compatible client for the solver.
//!
//! We only call chat.completions, always with a `json_schema` response format built
//! from the solution types. Calls are instrumented and log the model name, latency,
//! token usage and reply size (never the API key, never full contents).

use std::time::Instant;

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, USER_AGENT};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, instrument, warn};

use crate::config::ModelConfig;
use crate::error::SolveError;
use crate::prompt::{ContentPart, PromptPayload};
use crate::schema::OutputContract;
use crate::solver::{ChatModel, ModelReply};

const CLIENT_UA: &str = concat!("sat-solver-backend/", env!("CARGO_PKG_VERSION"));

#[derive(Clone)]
pub struct OpenAI {
  pub client: reqwest::Client,
  api_key: String,
  pub base_url: String,
  pub model: String,
  pub reasoning_effort: Option<String>,
}

impl OpenAI {
  /// Construct the client if an API key is configured; otherwise return None.
  pub fn from_config(cfg: &ModelConfig) -> Option<Self> {
    let api_key = cfg.api_key.clone()?;
    let client = match reqwest::Client::builder().timeout(cfg.timeout).build() {
      Ok(c) => c,
      Err(e) => {
        warn!(target: "sat_solver_backend", error = %e, "Failed to build HTTP client for OpenAI");
        return None;
      }
    };
    Some(Self {
      client,
      api_key,
      base_url: cfg.base_url.clone(),
      model: cfg.model.clone(),
      reasoning_effort: cfg.reasoning_effort.clone(),
    })
  }

  fn build_request(&self, payload: &PromptPayload, contract: &OutputContract) -> ChatCompletionRequest {
    let parts = payload
      .user
      .iter()
      .map(|part| match part {
        ContentPart::Text(text) => PartReq::Text { text: text.clone() },
        ContentPart::Image { url, detail } => PartReq::ImageUrl {
          image_url: ImageUrlReq { url: url.clone(), detail },
        },
      })
      .collect();

    ChatCompletionRequest {
      model: self.model.clone(),
      messages: vec![
        ChatMessageReq { role: "developer", content: MessageContent::Text(payload.system.clone()) },
        ChatMessageReq { role: "user", content: MessageContent::Parts(parts) },
      ],
      response_format: ResponseFormat {
        r#type: "json_schema",
        json_schema: JsonSchemaFormat { name: contract.name, schema: contract.schema.clone(), strict: false },
      },
      reasoning_effort: self.reasoning_effort.clone(),
    }
  }
}

#[async_trait]
impl ChatModel for OpenAI {
  fn name(&self) -> &str {
    &self.model
  }

  #[instrument(level = "info", skip(self, payload, contract), fields(model = %self.model, contract = contract.name, has_image = payload.has_image()))]
  async fn complete(&self, payload: &PromptPayload, contract: &OutputContract) -> Result<ModelReply, SolveError> {
    let url = format!("{}/chat/completions", self.base_url);
    let req = self.build_request(payload, contract);
    let start = Instant::now();

    let res = self.client.post(&url)
      .header(USER_AGENT, CLIENT_UA)
      .header(CONTENT_TYPE, "application/json")
      .header(AUTHORIZATION, format!("Bearer {}", self.api_key))
      .json(&req).send().await.map_err(|e| SolveError::Transport(e.to_string()))?;

    if !res.status().is_success() {
      let status = res.status();
      let body = res.text().await.unwrap_or_default();
      let msg = extract_openai_error(&body).unwrap_or(body);
      return Err(SolveError::Transport(format!("OpenAI HTTP {}: {}", status, msg)));
    }

    let body: ChatCompletionResponse = res.json().await.map_err(|e| SolveError::Transport(format!("malformed completion envelope: {}", e)))?;
    let elapsed = start.elapsed();
    if let Some(usage) = &body.usage {
      info!(?elapsed, prompt_tokens = ?usage.prompt_tokens, completion_tokens = ?usage.completion_tokens, total_tokens = ?usage.total_tokens, "OpenAI usage");
    } else {
      info!(?elapsed, "OpenAI response received");
    }

    let choice = body.choices.into_iter().next()
      .ok_or_else(|| SolveError::Transport("completion returned no choices".into()))?;
    if choice.finish_reason.as_deref() == Some("length") {
      warn!("Completion hit the token limit; output is likely truncated");
    }
    reply_from_message(choice.message)
  }
}

/// Collapse the shapes a completion message can take into one `ModelReply`.
fn reply_from_message(msg: ChatMessageResp) -> Result<ModelReply, SolveError> {
  if let Some(refusal) = msg.refusal.filter(|r| !r.trim().is_empty()) {
    return Err(SolveError::Refusal(refusal));
  }
  if let Some(parsed) = msg.parsed.filter(|v| !v.is_null()) {
    return Ok(ModelReply::Structured(parsed));
  }
  match msg.content {
    Some(Value::String(text)) => Ok(ModelReply::Text(text)),
    Some(Value::Null) | None => Ok(ModelReply::Text(String::new())),
    Some(structured) => Ok(ModelReply::Structured(structured)),
  }
}

// --- Chat DTOs ---

#[derive(Serialize)]
struct ChatCompletionRequest {
  model: String,
  messages: Vec<ChatMessageReq>,
  response_format: ResponseFormat,
  #[serde(skip_serializing_if = "Option::is_none")]
  reasoning_effort: Option<String>,
}
#[derive(Serialize)]
struct ChatMessageReq { role: &'static str, content: MessageContent }
#[derive(Serialize)]
#[serde(untagged)]
enum MessageContent { Text(String), Parts(Vec<PartReq>) }
#[derive(Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum PartReq {
  Text { text: String },
  ImageUrl { image_url: ImageUrlReq },
}
#[derive(Serialize)]
struct ImageUrlReq { url: String, detail: &'static str }
#[derive(Serialize)]
struct ResponseFormat { #[serde(rename = "type")] r#type: &'static str, json_schema: JsonSchemaFormat }
#[derive(Serialize)]
struct JsonSchemaFormat { name: &'static str, schema: Value, strict: bool }

#[derive(Deserialize)]
struct ChatCompletionResponse {
  choices: Vec<ChatChoice>,
  #[serde(default)] usage: Option<Usage>,
}
#[derive(Deserialize)]
struct ChatChoice {
  message: ChatMessageResp,
  #[serde(default)] finish_reason: Option<String>,
}
#[derive(Deserialize)]
struct ChatMessageResp {
  // Usually a string; some compatible gateways hand back the object itself.
  #[serde(default)] content: Option<Value>,
  #[serde(default)] parsed: Option<Value>,
  #[serde(default)] refusal: Option<String>,
}
#[derive(Deserialize)]
struct Usage {
  #[serde(default)] prompt_tokens: Option<u32>,
  #[serde(default)] completion_tokens: Option<u32>,
  #[serde(default)] total_tokens: Option<u32>,
}

/// Try to extract a clean error message from OpenAI error body.
fn extract_openai_error(body: &str) -> Option<String> {
  #[derive(Deserialize)]
  struct EWrap { error: EObj }
  #[derive(Deserialize)]
  struct EObj { message: String }
  match serde_json::from_str::<EWrap>(body) {
    Ok(w) => Some(w.error.message),
    Err(_) => None,
  }
}

//! Public request/response DTOs for the HTTP endpoints (serde ready).
//! Solution bodies are the schema types themselves; see `crate::schema`.

use serde::{Deserialize, Serialize};

/// Which SAT section a request is about.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Subject {
    Math,
    English,
}

impl Subject {
    pub fn label(self) -> &'static str {
        match self {
            Subject::Math => "SAT Math",
            Subject::English => "SAT English",
        }
    }
}

/// Body of `POST /solve` (and `POST /` in the serverless variant).
/// At least one of `problem` or `image_base64` must be non-empty.
#[derive(Debug, Default, Deserialize)]
pub struct SolveIn {
    #[serde(default)]
    pub problem: Option<String>,
    /// Bare base64 or a full `data:<mime>;base64,...` URL.
    #[serde(default)]
    pub image_base64: Option<String>,
    #[serde(default)]
    pub image_mime_type: Option<String>,
}

/// Body of `POST /solve-english`.
#[derive(Debug, Default, Deserialize)]
pub struct EnglishSolveIn {
    #[serde(default)]
    pub problem: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorOut {
    pub detail: String,
}

#[derive(Debug, Serialize)]
pub struct RootOut {
    pub message: &'static str,
    pub status: &'static str,
}

#[derive(Debug, Serialize)]
pub struct HealthOut {
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<&'static str>,
}

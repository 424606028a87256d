//! Wire shapes for backend requests and responses.
//!
//! Every response shares a `status` discriminant. `"success"` carries the
//! payload fields alongside it; anything else carries a human-readable
//! `message`.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::error::TransportError;
use crate::session::{Candidate, CandidateType, Illustration, Params, ParamsPatch, PlotPoint, Scales};

const SUCCESS: &str = "success";

/// Outcome of a call that reached the backend and parsed.
#[derive(Debug, Clone, PartialEq)]
pub enum RemoteResult<T> {
    Success(T),
    Failure { message: String },
}

impl<T: DeserializeOwned> RemoteResult<T> {
    /// Split a response envelope on its `status` field.
    pub fn from_value(value: Value) -> Result<Self, TransportError> {
        let status = value
            .get("status")
            .and_then(Value::as_str)
            .ok_or_else(|| TransportError::Decode("response has no status field".to_string()))?;

        if status == SUCCESS {
            let payload = serde_json::from_value(value)?;
            return Ok(RemoteResult::Success(payload));
        }

        let message = value
            .get("message")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| format!("Backend returned status '{}'", status));
        Ok(RemoteResult::Failure { message })
    }
}

impl<T> RemoteResult<T> {
    pub fn is_success(&self) -> bool {
        matches!(self, RemoteResult::Success(_))
    }

    pub fn into_result(self) -> Result<T, String> {
        match self {
            RemoteResult::Success(v) => Ok(v),
            RemoteResult::Failure { message } => Err(message),
        }
    }
}

// -- Requests --

#[derive(Debug, Clone, Serialize)]
pub struct GenerateCandidatesRequest {
    pub gemini_key: String,
    pub topic_main: String,
    pub topic_sub1: String,
    pub topic_sub2: String,
    pub params: Params,
    pub target_type: CandidateType,
    pub append: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct AdoptionRequest {
    pub id: u64,
    pub adopted: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct OptimizeRequest {
    #[serde(rename = "amplify_token")]
    pub token: String,
    pub params: Params,
}

/// Body of the draft and final calls. An empty key lets the backend fall
/// back to its own.
#[derive(Debug, Clone, Default, Serialize)]
pub struct KeyOverride {
    pub gemini_key: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct DraftEditRequest {
    pub article: String,
    pub instruction: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct IllustrationOptionsRequest {
    pub gemini_key: String,
    pub final_text: String,
}

/// `scene`, `style`, `custom` and `style_choice` are retained for backend
/// compatibility and always sent empty.
#[derive(Debug, Clone, Serialize)]
pub struct IllustrationRequest {
    pub gemini_key: String,
    pub scene: String,
    pub style: String,
    pub custom: String,
    pub final_text: String,
    pub style_choice: String,
}

impl IllustrationRequest {
    pub fn new(gemini_key: String, final_text: String) -> Self {
        Self {
            gemini_key,
            scene: String::new(),
            style: String::new(),
            custom: String::new(),
            final_text,
            style_choice: String::new(),
        }
    }
}

// -- Responses --

/// Success payload carrying nothing beyond the status.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Ack {}

/// Keep every candidate that decodes; blocks of an unknown type or shape are
/// skipped so the rest of the response survives.
fn known_candidates<'de, D>(deserializer: D) -> Result<Vec<Candidate>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Vec::<Value>::deserialize(deserializer)?;
    let total = raw.len();
    let candidates: Vec<Candidate> = raw
        .into_iter()
        .filter_map(|value| {
            let id = value.get("id").cloned().unwrap_or(Value::Null);
            match serde_json::from_value::<Candidate>(value) {
                Ok(candidate) => Some(candidate),
                Err(e) => {
                    warn!("Skipping candidate {}: {}", id, e);
                    None
                }
            }
        })
        .collect();
    if candidates.len() != total {
        warn!("Kept {} of {} candidates from response", candidates.len(), total);
    }
    Ok(candidates)
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CandidatesPayload {
    #[serde(deserialize_with = "known_candidates")]
    pub candidates: Vec<Candidate>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct OptimizationResult {
    #[serde(deserialize_with = "known_candidates")]
    pub candidates: Vec<Candidate>,
    #[serde(default)]
    pub scales: Option<Scales>,
    #[serde(default)]
    pub plot_data: Vec<PlotPoint>,
    #[serde(default)]
    pub history_count: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DraftPayload {
    pub summary: String,
    pub article: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FinalPayload {
    pub final_text: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct IllustrationOptions {
    #[serde(default)]
    pub scenes: Vec<String>,
    #[serde(default)]
    pub styles: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct IllustrationsPayload {
    pub images: Vec<Illustration>,
}

/// Settings restored from an uploaded settings file. Absent fields are left alone.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct SettingsPayload {
    pub topic_main: Option<String>,
    pub topic_sub1: Option<String>,
    pub topic_sub2: Option<String>,
    pub params: Option<ParamsPatch>,
    pub gemini_key: Option<String>,
    pub amplify_token: Option<String>,
    pub replicate_token: Option<String>,
}

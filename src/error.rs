use thiserror::Error;

use crate::stage::Stage;

/// Failures below the business layer: the request never produced a
/// well-formed `{status, ...}` envelope.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("Request failed: {0}")]
    Request(String),

    #[error("HTTP {code}: {body}")]
    Status { code: u16, body: String },

    #[error("Failed to parse response: {0}")]
    Decode(String),

    #[error("Invalid URL: {0}")]
    Url(String),
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            TransportError::Decode(err.to_string())
        } else {
            TransportError::Request(err.to_string())
        }
    }
}

impl From<serde_json::Error> for TransportError {
    fn from(err: serde_json::Error) -> Self {
        TransportError::Decode(err.to_string())
    }
}

#[derive(Debug, Error)]
pub enum SceneError {
    /// The stage gate denied the action; nothing was sent.
    #[error("{stage} rejected: {reason}")]
    Rejected { stage: Stage, reason: String },

    /// Another stage action is in flight.
    #[error("{requested} ignored while {running} is in progress")]
    Busy { requested: Stage, running: Stage },

    #[error("Communication error: {0}")]
    Transport(#[from] TransportError),

    /// The backend answered with a non-success status.
    #[error("{stage} failed: {message}")]
    Remote { stage: Stage, message: String },

    /// The local adoption flag was written but the backend did not confirm it.
    /// `source` is set when the request itself failed.
    #[error("Adoption for candidate {id} was not saved remotely: {message}")]
    AdoptionUnacknowledged {
        id: u64,
        message: String,
        #[source]
        source: Option<TransportError>,
    },

    #[error("Config error: {0}")]
    Config(String),

    #[error("Keychain error: {0}")]
    Keychain(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

const COMMUNICATION_ERROR: &str = "A communication error occurred. Please try again.";

impl SceneError {
    /// Text suitable for showing to the user.
    pub fn user_message(&self) -> String {
        match self {
            SceneError::Rejected { reason, .. } => reason.clone(),
            SceneError::Busy { running, .. } => format!("Please wait: {}", running.label()),
            SceneError::Transport(_) => COMMUNICATION_ERROR.to_string(),
            SceneError::Remote { message, .. } => message.clone(),
            SceneError::AdoptionUnacknowledged { source: Some(_), .. } => COMMUNICATION_ERROR.to_string(),
            SceneError::AdoptionUnacknowledged { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }

    /// True when the error was raised before any request left the process.
    pub fn is_local_rejection(&self) -> bool {
        matches!(self, SceneError::Rejected { .. } | SceneError::Busy { .. })
    }
}

impl From<SceneError> for String {
    fn from(err: SceneError) -> Self {
        err.to_string()
    }
}

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::session::CandidateType;

/// Which solver objective set an optimization run uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OptimizeMode {
    /// Relevance and parameter fit only.
    Legacy,
    /// Additionally honours user adoption flags.
    Custom,
}

/// A user-initiated action that talks to the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "stage", rename_all = "snake_case")]
pub enum Stage {
    GenerateCandidates { kind: CandidateType },
    UpdateAdoption { id: u64 },
    Optimize { mode: OptimizeMode },
    GenerateDraft,
    GenerateFinal,
    IllustrationOptions,
    GenerateIllustrations,
    UploadSettings,
}

impl Stage {
    /// Progress text shown while the stage is in flight.
    pub fn label(&self) -> String {
        match self {
            Stage::GenerateCandidates { kind } => format!("Generating candidates ({})...", kind),
            Stage::UpdateAdoption { id } => format!("Saving adoption for block {}...", id),
            Stage::Optimize {
                mode: OptimizeMode::Custom,
            } => "Running multi-objective optimization...".to_string(),
            Stage::Optimize {
                mode: OptimizeMode::Legacy,
            } => "Running parameter optimization...".to_string(),
            Stage::GenerateDraft => "Generating draft...".to_string(),
            Stage::GenerateFinal => "Polishing final text...".to_string(),
            Stage::IllustrationOptions => "Suggesting illustration scenes...".to_string(),
            Stage::GenerateIllustrations => "Generating 6 illustrations...".to_string(),
            Stage::UploadSettings => "Uploading settings...".to_string(),
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::GenerateCandidates { kind } => write!(f, "generate-candidates[{}]", kind),
            Stage::UpdateAdoption { id } => write!(f, "update-adoption[{}]", id),
            Stage::Optimize { mode } => match mode {
                OptimizeMode::Legacy => f.write_str("optimize"),
                OptimizeMode::Custom => f.write_str("custom-optimize"),
            },
            Stage::GenerateDraft => f.write_str("generate-draft"),
            Stage::GenerateFinal => f.write_str("generate-final"),
            Stage::IllustrationOptions => f.write_str("illustration-options"),
            Stage::GenerateIllustrations => f.write_str("generate-illustrations"),
            Stage::UploadSettings => f.write_str("upload-settings"),
        }
    }
}

use async_trait::async_trait;
use serde_json::Value;

use crate::error::TransportError;

/// Backend capabilities, one per route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    GenerateCandidates,
    UpdateAdoption,
    Optimize,
    CustomOptimize,
    GenerateDraft,
    SaveDraftEdit,
    GenerateFinal,
    IllustrationOptions,
    IllustrationGenerate,
    SettingsUpload,
}

impl Endpoint {
    /// Route relative to the API base.
    pub fn path(&self) -> &'static str {
        match self {
            Endpoint::GenerateCandidates => "generate_candidates",
            Endpoint::UpdateAdoption => "update_adoption",
            Endpoint::Optimize => "optimize",
            Endpoint::CustomOptimize => "custom_optimize",
            Endpoint::GenerateDraft => "generate_draft",
            Endpoint::SaveDraftEdit => "save_draft_edit",
            Endpoint::GenerateFinal => "generate_final",
            Endpoint::IllustrationOptions => "illustration/options",
            Endpoint::IllustrationGenerate => "illustration/generate",
            Endpoint::SettingsUpload => "settings/upload",
        }
    }
}

/// Moves one request to the backend and returns its decoded JSON body.
///
/// Implementations must not retry and must not interpret the `status`
/// discriminant; a business failure is still a successful transport.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn post_json(&self, endpoint: Endpoint, body: Value) -> Result<Value, TransportError>;

    /// Multipart upload with the file in a part named `file`.
    async fn post_file(
        &self,
        endpoint: Endpoint,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> Result<Value, TransportError>;
}

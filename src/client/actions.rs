use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use super::transport::{Endpoint, Transport};
use super::types::*;
use crate::error::TransportError;
use crate::stage::OptimizeMode;

/// Outcome of one backend call: `Ok` when the envelope parsed (success or
/// business failure), `Err` for transport-level faults.
pub type ActionResult<T> = Result<RemoteResult<T>, TransportError>;

/// Typed request/response calls, one per backend capability.
///
/// Stateless and retry-free: every method issues exactly one request.
#[derive(Clone)]
pub struct RemoteClient {
    transport: Arc<dyn Transport>,
}

impl RemoteClient {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    async fn call<B, T>(&self, endpoint: Endpoint, body: &B) -> ActionResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let body = serde_json::to_value(body)?;
        let value = self.transport.post_json(endpoint, body).await?;
        let result = RemoteResult::from_value(value)?;
        debug!(
            "{} -> {}",
            endpoint.path(),
            if result.is_success() { "success" } else { "failure" }
        );
        Ok(result)
    }

    pub async fn generate_candidates(
        &self,
        request: &GenerateCandidatesRequest,
    ) -> ActionResult<CandidatesPayload> {
        self.call(Endpoint::GenerateCandidates, request).await
    }

    pub async fn set_candidate_adoption(&self, id: u64, adopted: bool) -> ActionResult<Ack> {
        self.call(Endpoint::UpdateAdoption, &AdoptionRequest { id, adopted })
            .await
    }

    pub async fn run_legacy_optimize(&self, request: &OptimizeRequest) -> ActionResult<OptimizationResult> {
        self.call(Endpoint::Optimize, request).await
    }

    pub async fn run_custom_optimize(&self, request: &OptimizeRequest) -> ActionResult<OptimizationResult> {
        self.call(Endpoint::CustomOptimize, request).await
    }

    pub async fn optimize(
        &self,
        mode: OptimizeMode,
        request: &OptimizeRequest,
    ) -> ActionResult<OptimizationResult> {
        match mode {
            OptimizeMode::Legacy => self.run_legacy_optimize(request).await,
            OptimizeMode::Custom => self.run_custom_optimize(request).await,
        }
    }

    pub async fn generate_draft(&self, gemini_key: Option<String>) -> ActionResult<DraftPayload> {
        self.call(
            Endpoint::GenerateDraft,
            &KeyOverride {
                gemini_key: gemini_key.unwrap_or_default(),
            },
        )
        .await
    }

    pub async fn persist_draft_edit(&self, article: &str, instruction: &str) -> ActionResult<Ack> {
        let request = DraftEditRequest {
            article: article.to_string(),
            instruction: instruction.to_string(),
        };
        self.call(Endpoint::SaveDraftEdit, &request).await
    }

    pub async fn generate_final(&self, gemini_key: Option<String>) -> ActionResult<FinalPayload> {
        self.call(
            Endpoint::GenerateFinal,
            &KeyOverride {
                gemini_key: gemini_key.unwrap_or_default(),
            },
        )
        .await
    }

    pub async fn generate_illustration_options(
        &self,
        request: &IllustrationOptionsRequest,
    ) -> ActionResult<IllustrationOptions> {
        self.call(Endpoint::IllustrationOptions, request).await
    }

    pub async fn generate_illustrations(
        &self,
        request: &IllustrationRequest,
    ) -> ActionResult<IllustrationsPayload> {
        self.call(Endpoint::IllustrationGenerate, request).await
    }

    pub async fn upload_settings(&self, file_name: &str, bytes: Vec<u8>) -> ActionResult<SettingsPayload> {
        let value = self
            .transport
            .post_file(Endpoint::SettingsUpload, file_name, bytes)
            .await?;
        RemoteResult::from_value(value)
    }
}

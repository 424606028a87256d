//! Pipeline coordinator: sequences stage actions against the session.
//!
//! # Flow
//!
//! 1. The stage gate checks the current snapshot; a denial returns
//!    [`SceneError::Rejected`] without touching the busy flag.
//! 2. The coordinator moves Idle -> Busy(stage). If another action is in
//!    flight the request is refused with [`SceneError::Busy`], never queued.
//! 3. Exactly one remote action runs (the final stage runs two, in a fixed
//!    order: persist the draft edit, then generate).
//! 4. Candidate lists are routed through [`crate::reconcile`]; everything
//!    else patches the store directly.
//! 5. Busy -> Idle when the [`BusyGuard`] drops, on success and failure alike.

use std::path::Path;
use std::sync::Arc;

use tokio::sync::watch;
use tracing::{error, info, warn};

use crate::client::types::{
    GenerateCandidatesRequest, IllustrationOptionsRequest, IllustrationRequest, OptimizeRequest,
    SettingsPayload,
};
use crate::client::{ActionResult, HttpTransport, RemoteClient, RemoteResult};
use crate::config::ClientConfig;
use crate::error::SceneError;
use crate::gate::{self, Verdict};
use crate::illustration::ILLUSTRATION_BATCH;
use crate::reconcile;
use crate::session::{
    CandidateType, Credentials, IllustrationState, ParamsPatch, SessionPatch, SessionState, SessionStore,
    Topic,
};
use crate::stage::{OptimizeMode, Stage};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStatus {
    Idle,
    Busy(Stage),
}

impl PipelineStatus {
    /// Progress text while busy.
    pub fn label(&self) -> Option<String> {
        match self {
            PipelineStatus::Idle => None,
            PipelineStatus::Busy(stage) => Some(stage.label()),
        }
    }
}

/// Result of a completed stage action. The payload itself lands in the store.
#[derive(Debug, Clone, PartialEq)]
pub struct StageReport {
    pub stage: Stage,
    /// Gate warnings and soft anomalies in the response.
    pub warnings: Vec<String>,
}

/// Holds the single-flight slot; releases it on drop.
struct BusyGuard<'a> {
    status: &'a watch::Sender<PipelineStatus>,
    stage: Stage,
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.status.send_replace(PipelineStatus::Idle);
        info!("{} finished", self.stage);
    }
}

/// An accepted action: the busy slot plus the snapshot taken after acquiring it.
struct Admitted<'a> {
    _guard: BusyGuard<'a>,
    state: Arc<SessionState>,
    warnings: Vec<String>,
}

pub struct Coordinator {
    store: SessionStore,
    client: RemoteClient,
    status: watch::Sender<PipelineStatus>,
}

impl Coordinator {
    pub fn new(client: RemoteClient) -> Self {
        Self::with_store(client, SessionStore::new())
    }

    pub fn with_store(client: RemoteClient, store: SessionStore) -> Self {
        let (status, _rx) = watch::channel(PipelineStatus::Idle);
        Self { store, client, status }
    }

    /// Coordinator talking HTTP to the backend described by `config`.
    pub fn from_config(config: &ClientConfig) -> Result<Self, SceneError> {
        let transport = HttpTransport::new(config).map_err(|e| SceneError::Config(e.to_string()))?;
        Ok(Self::new(RemoteClient::new(Arc::new(transport))))
    }

    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    pub fn snapshot(&self) -> Arc<SessionState> {
        self.store.get()
    }

    pub fn status(&self) -> PipelineStatus {
        *self.status.borrow()
    }

    pub fn subscribe_status(&self) -> watch::Receiver<PipelineStatus> {
        self.status.subscribe()
    }

    pub fn is_busy(&self) -> bool {
        matches!(self.status(), PipelineStatus::Busy(_))
    }

    // -- Local edits (no gate, no busy slot) --

    pub fn set_topic(&self, topic: Topic) {
        self.store.patch(SessionPatch {
            topic: Some(topic),
            ..Default::default()
        });
    }

    pub fn set_credentials(&self, credentials: Credentials) {
        self.store.patch(SessionPatch {
            credentials: Some(credentials),
            ..Default::default()
        });
    }

    pub fn update_params(&self, patch: ParamsPatch) {
        self.store.patch_params(patch);
    }

    pub fn set_draft_article(&self, article: impl Into<String>) {
        self.store.patch(SessionPatch {
            draft_article: Some(article.into()),
            ..Default::default()
        });
    }

    pub fn set_instruction(&self, instruction: impl Into<String>) {
        self.store.patch(SessionPatch {
            additional_instruction: Some(instruction.into()),
            ..Default::default()
        });
    }

    // -- Admission --

    fn acquire(&self, stage: Stage) -> Result<BusyGuard<'_>, SceneError> {
        let mut running = None;
        let acquired = self.status.send_if_modified(|status| match *status {
            PipelineStatus::Idle => {
                *status = PipelineStatus::Busy(stage);
                true
            }
            PipelineStatus::Busy(other) => {
                running = Some(other);
                false
            }
        });

        if !acquired {
            let running = running.unwrap_or(stage);
            warn!("Ignoring {} while {} is in progress", stage, running);
            return Err(SceneError::Busy {
                requested: stage,
                running,
            });
        }

        info!("{} started", stage);
        Ok(BusyGuard {
            status: &self.status,
            stage,
        })
    }

    fn admit(&self, stage: Stage) -> Result<Admitted<'_>, SceneError> {
        let mut warnings = Vec::new();
        match gate::check(&stage, &self.store.get()) {
            Verdict::Allow => {}
            Verdict::Warn(reason) => {
                warn!("{}: {}", stage, reason);
                warnings.push(reason);
            }
            Verdict::Deny(reason) => {
                warn!("{} rejected: {}", stage, reason);
                return Err(SceneError::Rejected { stage, reason });
            }
        }

        let guard = self.acquire(stage)?;
        Ok(Admitted {
            _guard: guard,
            state: self.store.get(),
            warnings,
        })
    }

    fn settle<T>(stage: Stage, result: ActionResult<T>) -> Result<T, SceneError> {
        match result {
            Ok(RemoteResult::Success(payload)) => Ok(payload),
            Ok(RemoteResult::Failure { message }) => {
                warn!("{} failed: {}", stage, message);
                Err(SceneError::Remote { stage, message })
            }
            Err(e) => {
                error!("{} transport failure: {}", stage, e);
                Err(SceneError::Transport(e))
            }
        }
    }

    /// Explicit override first, then the session key. Empty strings count as absent.
    fn resolve_key(override_key: Option<String>, credentials: &Credentials) -> Option<String> {
        override_key
            .filter(|k| !k.is_empty())
            .or_else(|| Some(credentials.gemini_key.clone()).filter(|k| !k.is_empty()))
    }

    // -- Stage actions --

    /// Generate blocks of `kind`. With `append`, only the `kind` group is replaced.
    pub async fn generate_candidates(&self, kind: CandidateType, append: bool) -> Result<StageReport, SceneError> {
        let stage = Stage::GenerateCandidates { kind };
        let admitted = self.admit(stage)?;
        let state = &admitted.state;

        let request = GenerateCandidatesRequest {
            gemini_key: state.credentials.gemini_key.clone(),
            topic_main: state.topic.main.clone(),
            topic_sub1: state.topic.sub1.clone(),
            topic_sub2: state.topic.sub2.clone(),
            params: *state.params,
            target_type: kind,
            append,
        };
        let payload = Self::settle(stage, self.client.generate_candidates(&request).await)?;

        let merged = reconcile::merge_generated(&self.store.get().candidates, payload.candidates, kind, append);
        info!("Pool now holds {} candidates", merged.len());
        self.store.patch(SessionPatch {
            candidates: Some(merged),
            ..Default::default()
        });

        Ok(StageReport {
            stage,
            warnings: admitted.warnings,
        })
    }

    /// Flag a candidate as adopted (or not). The local pool changes before the
    /// backend is told; a failed remote write is reported but not rolled back.
    pub async fn set_adoption(&self, id: u64, adopted: bool) -> Result<StageReport, SceneError> {
        let stage = Stage::UpdateAdoption { id };
        let admitted = self.admit(stage)?;

        let patched = reconcile::apply_adoption(&admitted.state.candidates, id, adopted).ok_or_else(|| {
            SceneError::Rejected {
                stage,
                reason: format!("Candidate {} is not in the current pool.", id),
            }
        })?;
        self.store.patch(SessionPatch {
            candidates: Some(patched),
            ..Default::default()
        });

        let (message, source) = match self.client.set_candidate_adoption(id, adopted).await {
            Ok(RemoteResult::Success(_)) => {
                return Ok(StageReport {
                    stage,
                    warnings: admitted.warnings,
                })
            }
            Ok(RemoteResult::Failure { message }) => (message, None),
            Err(e) => (e.to_string(), Some(e)),
        };
        warn!("Adoption for candidate {} kept locally but not saved: {}", id, message);
        Err(SceneError::AdoptionUnacknowledged { id, message, source })
    }

    pub async fn optimize(&self, mode: OptimizeMode) -> Result<StageReport, SceneError> {
        let stage = Stage::Optimize { mode };
        let admitted = self.admit(stage)?;
        let state = &admitted.state;

        let request = OptimizeRequest {
            token: state.credentials.amplify_token.clone(),
            params: *state.params,
        };
        let result = Self::settle(stage, self.client.optimize(mode, &request).await)?;

        let current = self.store.get();
        let merged = reconcile::merge_optimized(&current.candidates, result.candidates);
        let selected = merged.iter().filter(|c| c.selected).count();
        info!("Optimization selected {} of {} candidates", selected, merged.len());

        self.store.patch(SessionPatch {
            candidates: Some(merged),
            scales: Some(result.scales),
            plot_data: Some(result.plot_data),
            optimization_runs: Some(current.optimization_runs.saturating_add(1)),
            ..Default::default()
        });

        Ok(StageReport {
            stage,
            warnings: admitted.warnings,
        })
    }

    pub async fn generate_draft(&self, override_key: Option<String>) -> Result<StageReport, SceneError> {
        let stage = Stage::GenerateDraft;
        let admitted = self.admit(stage)?;

        let key = Self::resolve_key(override_key, &admitted.state.credentials);
        let draft = Self::settle(stage, self.client.generate_draft(key).await)?;

        self.store.patch(SessionPatch {
            draft_summary: Some(draft.summary),
            draft_article: Some(draft.article),
            ..Default::default()
        });

        Ok(StageReport {
            stage,
            warnings: admitted.warnings,
        })
    }

    /// Persist the edited draft and instruction, then request the final text.
    /// If persisting fails, generation is not requested.
    pub async fn generate_final(&self, override_key: Option<String>) -> Result<StageReport, SceneError> {
        let stage = Stage::GenerateFinal;
        let admitted = self.admit(stage)?;
        let state = &admitted.state;

        Self::settle(
            stage,
            self.client
                .persist_draft_edit(&state.draft_article, &state.additional_instruction)
                .await,
        )?;

        let key = Self::resolve_key(override_key, &state.credentials);
        let polished = Self::settle(stage, self.client.generate_final(key).await)?;

        self.store.patch(SessionPatch {
            final_text: Some(polished.final_text),
            ..Default::default()
        });

        Ok(StageReport {
            stage,
            warnings: admitted.warnings,
        })
    }

    /// Ask for suggested illustration scenes and styles for the final text.
    pub async fn generate_illustration_options(&self) -> Result<StageReport, SceneError> {
        let stage = Stage::IllustrationOptions;
        let admitted = self.admit(stage)?;
        let state = &admitted.state;

        let request = IllustrationOptionsRequest {
            gemini_key: state.credentials.gemini_key.clone(),
            final_text: state.final_text.clone(),
        };
        let options = Self::settle(stage, self.client.generate_illustration_options(&request).await)?;

        let current = self.store.get();
        self.store.patch(SessionPatch {
            illustration: Some(IllustrationState {
                scenes: options.scenes,
                styles: options.styles,
                images: current.illustration.images.clone(),
            }),
            ..Default::default()
        });

        Ok(StageReport {
            stage,
            warnings: admitted.warnings,
        })
    }

    /// Generate a batch of illustrations for the final text.
    pub async fn generate_illustrations(&self) -> Result<StageReport, SceneError> {
        let stage = Stage::GenerateIllustrations;
        let mut admitted = self.admit(stage)?;
        let state = Arc::clone(&admitted.state);

        let request = IllustrationRequest::new(state.credentials.gemini_key.clone(), state.final_text.clone());
        let payload = Self::settle(stage, self.client.generate_illustrations(&request).await)?;

        if payload.images.len() != ILLUSTRATION_BATCH {
            let note = format!(
                "Expected {} illustrations, received {}.",
                ILLUSTRATION_BATCH,
                payload.images.len()
            );
            warn!("{}", note);
            admitted.warnings.push(note);
        }

        let current = self.store.get();
        self.store.patch(SessionPatch {
            illustration: Some(IllustrationState {
                scenes: current.illustration.scenes.clone(),
                styles: current.illustration.styles.clone(),
                images: payload.images,
            }),
            ..Default::default()
        });

        Ok(StageReport {
            stage,
            warnings: admitted.warnings,
        })
    }

    /// Upload a settings file and apply whatever it restores.
    pub async fn upload_settings(&self, file_name: &str, bytes: Vec<u8>) -> Result<StageReport, SceneError> {
        let stage = Stage::UploadSettings;
        let admitted = self.admit(stage)?;

        let settings = Self::settle(stage, self.client.upload_settings(file_name, bytes).await)?;
        self.apply_settings(settings);

        Ok(StageReport {
            stage,
            warnings: admitted.warnings,
        })
    }

    pub async fn upload_settings_file(&self, path: &Path) -> Result<StageReport, SceneError> {
        let bytes = std::fs::read(path)?;
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("settings.json")
            .to_string();
        self.upload_settings(&file_name, bytes).await
    }

    fn apply_settings(&self, settings: SettingsPayload) {
        let current = self.store.get();

        let topic = Topic {
            main: settings.topic_main.unwrap_or_else(|| current.topic.main.clone()),
            sub1: settings.topic_sub1.unwrap_or_else(|| current.topic.sub1.clone()),
            sub2: settings.topic_sub2.unwrap_or_else(|| current.topic.sub2.clone()),
        };
        let credentials = Credentials {
            gemini_key: settings
                .gemini_key
                .unwrap_or_else(|| current.credentials.gemini_key.clone()),
            amplify_token: settings
                .amplify_token
                .unwrap_or_else(|| current.credentials.amplify_token.clone()),
            replicate_token: settings
                .replicate_token
                .unwrap_or_else(|| current.credentials.replicate_token.clone()),
        };

        let mut patch = SessionPatch::default();
        if topic != *current.topic {
            patch.topic = Some(topic);
        }
        if credentials != *current.credentials {
            patch.credentials = Some(credentials);
        }
        self.store.patch(patch);

        if let Some(params) = settings.params {
            self.store.patch_params(params);
        }
        info!("Applied uploaded settings");
    }
}

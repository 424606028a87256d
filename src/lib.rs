//! Stage-pipeline coordinator for a staged scene-writing assistant.
//!
//! A session moves through five stages: topic and parameter setup,
//! candidate-block optimization, draft composition, final polishing and
//! illustration. The generation, solver and image engines live behind a
//! remote backend; this crate owns the session state, gates each stage,
//! talks to the backend one action at a time and folds results back in.
//!
//! ```ignore
//! use scenewright::{ClientConfig, Coordinator, CandidateType, OptimizeMode};
//!
//! let coordinator = Coordinator::from_config(&ClientConfig::discover()?.with_env_overrides())?;
//! coordinator.generate_candidates(CandidateType::SceneCraft, false).await?;
//! coordinator.optimize(OptimizeMode::Custom).await?;
//! coordinator.generate_draft(None).await?;
//! coordinator.generate_final(None).await?;
//! coordinator.generate_illustrations().await?;
//! ```

pub mod client;
pub mod config;
pub mod credentials;
mod error;
pub mod gate;
pub mod illustration;
pub mod pipeline;
pub mod reconcile;
pub mod session;
pub mod stage;

pub use client::{Endpoint, HttpTransport, RemoteClient, RemoteResult, Transport};
pub use config::ClientConfig;
pub use error::{SceneError, TransportError};
pub use pipeline::{Coordinator, PipelineStatus, StageReport};
pub use session::{
    Candidate, CandidateType, Credentials, Params, ParamsPatch, SessionPatch, SessionState, SessionStore, Topic,
};
pub use stage::{OptimizeMode, Stage};

/// Install the global `tracing` subscriber, filtered by `RUST_LOG` (default `info`).
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();
}

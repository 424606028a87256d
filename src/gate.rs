//! Stage gate: pure predicates deciding whether a stage may run.
//!
//! Every check takes a session snapshot and returns a [`Verdict`]. A denial
//! means the action is rejected locally and no request is sent. A warning
//! lets the action proceed while surfacing that its inputs look thin.

use crate::session::SessionState;
use crate::stage::Stage;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Allow,
    Warn(String),
    Deny(String),
}

impl Verdict {
    pub fn is_allowed(&self) -> bool {
        !matches!(self, Verdict::Deny(_))
    }

    pub fn reason(&self) -> Option<&str> {
        match self {
            Verdict::Allow => None,
            Verdict::Warn(r) | Verdict::Deny(r) => Some(r),
        }
    }
}

/// Generation bootstraps or appends to the pool, so it is always allowed.
pub fn candidate_generation(_state: &SessionState) -> Verdict {
    Verdict::Allow
}

pub fn adoption(state: &SessionState, id: u64) -> Verdict {
    if state.candidate(id).is_none() {
        return Verdict::Deny(format!("Candidate {} is not in the current pool.", id));
    }
    Verdict::Allow
}

/// Both optimization variants need something to optimize.
pub fn optimization(state: &SessionState) -> Verdict {
    if state.candidates.is_empty() {
        return Verdict::Deny("There are no candidates to optimize. Generate candidates first.".to_string());
    }
    Verdict::Allow
}

/// Permissive: the draft may be composed straight from raw candidates.
pub fn draft(state: &SessionState) -> Verdict {
    if state.candidates.is_empty() {
        return Verdict::Warn("No candidates exist; the draft will have no source material.".to_string());
    }
    if state.optimization_runs == 0 {
        return Verdict::Warn(
            "No optimization has run yet; the draft will use unoptimized candidates.".to_string(),
        );
    }
    Verdict::Allow
}

pub fn final_generation(state: &SessionState) -> Verdict {
    if state.draft_article.trim().is_empty() {
        return Verdict::Warn("The draft article is empty.".to_string());
    }
    Verdict::Allow
}

/// Illustration calls need finished prose to illustrate.
pub fn illustration(state: &SessionState) -> Verdict {
    if state.final_text.is_empty() {
        return Verdict::Deny(
            "Generate the final text in the polishing stage before creating illustrations.".to_string(),
        );
    }
    Verdict::Allow
}

/// Dispatch to the check for `stage`.
pub fn check(stage: &Stage, state: &SessionState) -> Verdict {
    match stage {
        Stage::GenerateCandidates { .. } => candidate_generation(state),
        Stage::UpdateAdoption { id } => adoption(state, *id),
        Stage::Optimize { .. } => optimization(state),
        Stage::GenerateDraft => draft(state),
        Stage::GenerateFinal => final_generation(state),
        Stage::IllustrationOptions | Stage::GenerateIllustrations => illustration(state),
        Stage::UploadSettings => Verdict::Allow,
    }
}

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// Tunable generation knobs. Every field in `[0.0, 1.0]` except `length`,
/// which is the target character count of the assembled scene.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Params {
    // === Scene craft ===
    pub p_desc_style: f64,
    pub p_perspective: f64,
    pub p_sensory: f64,
    pub p_thought: f64,
    pub p_tension: f64,
    pub p_reality: f64,

    // === Character dynamics ===
    pub p_char_count: f64,
    pub p_char_mental: f64,
    pub p_char_belief: f64,
    pub p_char_trauma: f64,
    pub p_char_voice: f64,

    pub length: u32,
}

impl Default for Params {
    fn default() -> Self {
        Self {
            p_desc_style: 0.5,
            p_perspective: 0.5,
            p_sensory: 0.5,
            p_thought: 0.5,
            p_tension: 0.5,
            p_reality: 0.5,
            p_char_count: 0.2,
            p_char_mental: 0.5,
            p_char_belief: 0.5,
            p_char_trauma: 0.0,
            p_char_voice: 0.5,
            length: 500,
        }
    }
}

impl Params {
    /// Return a copy with every field present in `patch` replaced.
    pub fn merged(&self, patch: &ParamsPatch) -> Self {
        Self {
            p_desc_style: patch.p_desc_style.unwrap_or(self.p_desc_style),
            p_perspective: patch.p_perspective.unwrap_or(self.p_perspective),
            p_sensory: patch.p_sensory.unwrap_or(self.p_sensory),
            p_thought: patch.p_thought.unwrap_or(self.p_thought),
            p_tension: patch.p_tension.unwrap_or(self.p_tension),
            p_reality: patch.p_reality.unwrap_or(self.p_reality),
            p_char_count: patch.p_char_count.unwrap_or(self.p_char_count),
            p_char_mental: patch.p_char_mental.unwrap_or(self.p_char_mental),
            p_char_belief: patch.p_char_belief.unwrap_or(self.p_char_belief),
            p_char_trauma: patch.p_char_trauma.unwrap_or(self.p_char_trauma),
            p_char_voice: patch.p_char_voice.unwrap_or(self.p_char_voice),
            length: patch.length.unwrap_or(self.length),
        }
    }
}

/// Partial update for [`Params`]. Absent fields keep their current value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParamsPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub p_desc_style: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub p_perspective: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub p_sensory: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub p_thought: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub p_tension: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub p_reality: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub p_char_count: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub p_char_mental: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub p_char_belief: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub p_char_trauma: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub p_char_voice: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub length: Option<u32>,
}

impl ParamsPatch {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Which family a candidate block belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CandidateType {
    #[serde(rename = "Scene Craft")]
    SceneCraft,
    #[serde(rename = "Character Dynamics")]
    CharacterDynamics,
}

impl CandidateType {
    /// Fixed rendering order of candidate groups.
    pub const ALL: [CandidateType; 2] = [CandidateType::SceneCraft, CandidateType::CharacterDynamics];

    pub fn as_str(&self) -> &'static str {
        match self {
            CandidateType::SceneCraft => "Scene Craft",
            CandidateType::CharacterDynamics => "Character Dynamics",
        }
    }
}

impl fmt::Display for CandidateType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A generated text block competing for inclusion in the scene.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    /// Server-assigned, unique within a session.
    pub id: u64,
    pub text: String,
    #[serde(rename = "type")]
    pub kind: CandidateType,
    #[serde(default)]
    pub relevance: f64,
    /// Open set of named scores; keys differ per candidate type.
    #[serde(default)]
    pub attributes: BTreeMap<String, f64>,
    /// Chosen by the most recent solver run.
    #[serde(default)]
    pub selected: bool,
    #[serde(default)]
    pub user_rating: f64,
    /// User lock-in across optimization runs. Never echoed reliably by the server.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_adopted: Option<bool>,
}

impl Candidate {
    pub fn is_adopted(&self) -> bool {
        self.user_adopted.unwrap_or(false)
    }

    /// Length in characters, the unit the solver's length constraint uses.
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }
}

/// Solver objective weights actually achieved by a run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Scales {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pref: Option<f64>,
    #[serde(default)]
    pub diff: f64,
    #[serde(default)]
    pub constraint: f64,
    /// Per-objective scales the solver reports beyond the three named ones.
    #[serde(flatten)]
    pub extra: BTreeMap<String, f64>,
}

/// One sample of the solver's objective over time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlotPoint {
    pub time: f64,
    pub value: f64,
}

/// A generated illustration: base64 image payload plus its style label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Illustration {
    pub image: String,
    pub style: String,
}

/// Opaque backend credentials. Never validated or logged locally.
#[derive(Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Credentials {
    pub gemini_key: String,
    pub amplify_token: String,
    pub replicate_token: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn mask(s: &str) -> &'static str {
            if s.is_empty() {
                "<unset>"
            } else {
                "<redacted>"
            }
        }
        f.debug_struct("Credentials")
            .field("gemini_key", &mask(&self.gemini_key))
            .field("amplify_token", &mask(&self.amplify_token))
            .field("replicate_token", &mask(&self.replicate_token))
            .finish()
    }
}

/// Main topic plus two sub-topics, free text.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Topic {
    pub main: String,
    pub sub1: String,
    pub sub2: String,
}

/// Illustration stage outputs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IllustrationState {
    /// Suggested scenes from the options call.
    pub scenes: Vec<String>,
    /// Suggested styles from the options call.
    pub styles: Vec<String>,
    pub images: Vec<Illustration>,
}

/// The single source of truth for one authoring session.
///
/// Sub-trees sit behind `Arc` so an untouched sub-tree keeps its identity
/// across patches and observers can compare with [`Arc::ptr_eq`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionState {
    pub credentials: Arc<Credentials>,
    pub topic: Arc<Topic>,
    pub params: Arc<Params>,
    pub candidates: Arc<Vec<Candidate>>,
    /// Successful optimization runs so far.
    pub optimization_runs: u32,
    pub scales: Option<Scales>,
    pub plot_data: Arc<Vec<PlotPoint>>,
    pub draft_summary: String,
    /// User-editable.
    pub draft_article: String,
    /// Carried from the draft stage into the final stage.
    pub additional_instruction: String,
    pub final_text: String,
    pub illustration: Arc<IllustrationState>,
}

impl SessionState {
    pub fn candidate(&self, id: u64) -> Option<&Candidate> {
        self.candidates.iter().find(|c| c.id == id)
    }
}

/// Shallow top-level update. `None` leaves a field untouched.
#[derive(Debug, Clone, Default)]
pub struct SessionPatch {
    pub credentials: Option<Credentials>,
    pub topic: Option<Topic>,
    pub params: Option<Params>,
    pub candidates: Option<Vec<Candidate>>,
    pub optimization_runs: Option<u32>,
    pub scales: Option<Option<Scales>>,
    pub plot_data: Option<Vec<PlotPoint>>,
    pub draft_summary: Option<String>,
    pub draft_article: Option<String>,
    pub additional_instruction: Option<String>,
    pub final_text: Option<String>,
    pub illustration: Option<IllustrationState>,
}

impl SessionPatch {
    pub(crate) fn apply_to(self, state: &mut SessionState) {
        if let Some(v) = self.credentials {
            state.credentials = Arc::new(v);
        }
        if let Some(v) = self.topic {
            state.topic = Arc::new(v);
        }
        if let Some(v) = self.params {
            state.params = Arc::new(v);
        }
        if let Some(v) = self.candidates {
            state.candidates = Arc::new(v);
        }
        if let Some(v) = self.optimization_runs {
            state.optimization_runs = v;
        }
        if let Some(v) = self.scales {
            state.scales = v;
        }
        if let Some(v) = self.plot_data {
            state.plot_data = Arc::new(v);
        }
        if let Some(v) = self.draft_summary {
            state.draft_summary = v;
        }
        if let Some(v) = self.draft_article {
            state.draft_article = v;
        }
        if let Some(v) = self.additional_instruction {
            state.additional_instruction = v;
        }
        if let Some(v) = self.final_text {
            state.final_text = v;
        }
        if let Some(v) = self.illustration {
            state.illustration = Arc::new(v);
        }
    }
}

//! Read-only projections over a session snapshot, used for rendering.

use super::types::{Candidate, CandidateType, SessionState};

/// Selected text length against the configured target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LengthSummary {
    pub selected_chars: usize,
    pub target: u32,
    pub diff: i64,
    pub within_tolerance: bool,
}

/// A selection this close to the target counts as on-target.
pub const LENGTH_TOLERANCE: i64 = 10;

/// Candidates grouped by type in fixed order, each group in insertion order.
/// Empty groups are omitted.
pub fn grouped(pool: &[Candidate]) -> Vec<(CandidateType, Vec<&Candidate>)> {
    CandidateType::ALL
        .iter()
        .filter_map(|kind| {
            let group: Vec<&Candidate> = pool.iter().filter(|c| c.kind == *kind).collect();
            if group.is_empty() {
                None
            } else {
                Some((*kind, group))
            }
        })
        .collect()
}

pub fn length_summary(state: &SessionState) -> LengthSummary {
    let selected_chars: usize = state
        .candidates
        .iter()
        .filter(|c| c.selected)
        .map(Candidate::char_len)
        .sum();
    let target = state.params.length;
    let diff = selected_chars as i64 - i64::from(target);
    LengthSummary {
        selected_chars,
        target,
        diff,
        within_tolerance: diff.abs() < LENGTH_TOLERANCE,
    }
}

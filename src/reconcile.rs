//! Candidate reconciliation: folding server-returned candidate lists into the
//! local pool while keeping the fields only the client owns.
//!
//! - Generation with `append`: the target type's group is replaced by the
//!   fresh blocks and every other group survives untouched.
//! - Generation without `append`: the response becomes the whole pool.
//! - Optimization: the response is the whole pool; each surviving id keeps
//!   its local `user_adopted` flag, flags of vanished ids are dropped.
//! - Adoption toggle: a local patch of one id, applied before the remote ack.

use std::collections::{HashMap, HashSet};

use tracing::{debug, warn};

use crate::session::{Candidate, CandidateType};

/// New pool after a generation response for `target`.
pub fn merge_generated(
    pool: &[Candidate],
    generated: Vec<Candidate>,
    target: CandidateType,
    append: bool,
) -> Vec<Candidate> {
    if !append {
        debug!("Replacing pool with {} generated candidates", generated.len());
        return generated;
    }

    let received = generated.len();
    let fresh: Vec<Candidate> = generated.into_iter().filter(|c| c.kind == target).collect();
    if fresh.len() != received {
        warn!(
            "Dropped {} generated candidates that are not {}",
            received - fresh.len(),
            target
        );
    }
    let fresh_ids: HashSet<u64> = fresh.iter().map(|c| c.id).collect();

    let kept: Vec<Candidate> = pool
        .iter()
        .filter(|c| c.kind != target)
        .filter(|c| {
            let clash = fresh_ids.contains(&c.id);
            if clash {
                warn!("Generated candidate id {} collides with an existing {} block", c.id, c.kind);
            }
            !clash
        })
        .cloned()
        .collect();

    debug!(
        "Appending {} {} candidates to {} kept from other groups",
        fresh.len(),
        target,
        kept.len()
    );
    fresh.into_iter().chain(kept).collect()
}

/// New pool after an optimization response.
pub fn merge_optimized(pool: &[Candidate], optimized: Vec<Candidate>) -> Vec<Candidate> {
    let adopted: HashMap<u64, Option<bool>> = pool.iter().map(|c| (c.id, c.user_adopted)).collect();

    let merged: Vec<Candidate> = optimized
        .into_iter()
        .map(|mut c| {
            if let Some(prior) = adopted.get(&c.id) {
                c.user_adopted = *prior;
            }
            c
        })
        .collect();

    let survivors = merged.iter().filter(|c| adopted.contains_key(&c.id)).count();
    debug!(
        "Optimization pool: {} candidates, {} carried over, {} dropped",
        merged.len(),
        survivors,
        pool.len().saturating_sub(survivors)
    );
    merged
}

/// Pool with candidate `id` flagged `adopted`, or `None` if `id` is unknown.
pub fn apply_adoption(pool: &[Candidate], id: u64, adopted: bool) -> Option<Vec<Candidate>> {
    if !pool.iter().any(|c| c.id == id) {
        return None;
    }
    Some(
        pool.iter()
            .map(|c| {
                if c.id == id {
                    Candidate {
                        user_adopted: Some(adopted),
                        ..c.clone()
                    }
                } else {
                    c.clone()
                }
            })
            .collect(),
    )
}

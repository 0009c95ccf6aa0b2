//! Sound arbitration: which perceived sound is worth investigating
//!
//! `score = (100 - suspicion) + initial_distance + age * 10`
//!
//! Lower is more urgent: trusted categories, nearby sources and fresh sounds
//! win. Weights are fixed so the suspicion term dominates at equal distance.

use crate::core::types::SimTime;
use crate::perception::buffer::PerceivedSound;
use crate::perception::suspicion::{SuspicionModel, CERTAIN};

/// Score penalty per second of age
pub const AGE_WEIGHT: f32 = 10.0;

pub fn score(sound: &PerceivedSound, suspicion: &SuspicionModel, now: SimTime) -> f32 {
    (CERTAIN - suspicion.lookup(sound.tag)) + sound.initial_distance + sound.age(now) * AGE_WEIGHT
}

/// Most urgent candidate, reduced left to right
///
/// A later candidate only replaces the current best when its score is
/// strictly lower, so ties keep the earlier one.
pub fn pick_best<'a>(
    candidates: &'a [PerceivedSound],
    suspicion: &SuspicionModel,
    now: SimTime,
) -> Option<&'a PerceivedSound> {
    let (first, rest) = candidates.split_first()?;
    if rest.is_empty() {
        return Some(first);
    }

    let mut best = first;
    let mut best_score = score(first, suspicion, now);
    for candidate in rest {
        let candidate_score = score(candidate, suspicion, now);
        if candidate_score < best_score {
            best = candidate;
            best_score = candidate_score;
        }
    }
    Some(best)
}

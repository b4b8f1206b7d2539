//! Load suggestions for the next attempt

use super::{DELOAD_AFTER_FAILS, DELOAD_FACTOR, WEIGHT_INCREMENT, round_half};
use crate::db::{LoadRecord, SessionRecord};
use crate::exercises::{Category, ExerciseSpec};

/// Suggested working weight. Bodyweight, lower-body and timed work get 0.
///
/// A fail streak surfaces as a deload suggestion here; the record itself
/// only changes in progression.
pub fn suggest_load(exercise: &ExerciseSpec, record: &LoadRecord, history: &[SessionRecord]) -> f64 {
    if exercise.category != Category::Upper || exercise.kind.target_reps() == 0 {
        return 0.0;
    }

    let weight = record.current_weight;
    if record.consecutive_fail_count >= DELOAD_AFTER_FAILS {
        return round_half(weight * DELOAD_FACTOR);
    }

    match last_session_success(&exercise.name, history) {
        Some(true) => round_half(weight + WEIGHT_INCREMENT),
        _ => weight,
    }
}

/// Outcome of the most recent session containing `exercise`:
/// `Some(true)` when every set hit its target without a fail flag
pub fn last_session_success(exercise: &str, history: &[SessionRecord]) -> Option<bool> {
    let session = history
        .iter()
        .filter(|s| s.contains(exercise))
        .max_by_key(|s| (s.date, s.finished_at))?;

    Some(
        session
            .items
            .iter()
            .filter(|i| i.exercise == exercise)
            .all(|i| i.actual_reps >= i.target_reps && !i.failed),
    )
}

//! Post-session progression: increase, hold or deload each upper-body lift

use std::collections::BTreeMap;

use tracing::info;

use super::{DELOAD_AFTER_FAILS, DELOAD_FACTOR, WEIGHT_INCREMENT, round_half};
use crate::db::{LoadBook, LoadRecord, SessionRecord};
use crate::exercises::{Category, ExerciseSpec, resolve_exercise};

/// Stored record, or the exercise's starting weight with a clean streak
pub fn load_record_for(loads: &LoadBook, exercise: &ExerciseSpec) -> LoadRecord {
    loads
        .get(&exercise.name)
        .cloned()
        .unwrap_or_else(|| LoadRecord::starting(exercise.starting_weight))
}

/// Apply one finished session to the load records.
///
/// Must run exactly once per session: applying it again counts the same
/// progress twice.
pub fn apply_progression(session: &SessionRecord, loads: &LoadBook) -> LoadBook {
    // exercise -> all sets succeeded
    let mut outcomes: BTreeMap<&str, bool> = BTreeMap::new();
    for item in &session.items {
        let ok = item.actual_reps >= item.target_reps && !item.failed;
        outcomes
            .entry(item.exercise.as_str())
            .and_modify(|all| *all &= ok)
            .or_insert(ok);
    }

    let mut updated = loads.clone();
    for (name, success) in outcomes {
        let spec = resolve_exercise(name);
        if spec.category != Category::Upper {
            continue;
        }

        let before = load_record_for(loads, &spec);
        let after = progress_record(&before, success);
        if after.current_weight != before.current_weight {
            info!(
                "{}: {} -> {} (fails: {})",
                name, before.current_weight, after.current_weight, after.consecutive_fail_count
            );
        }
        updated.insert(name.to_string(), after);
    }

    updated
}

/// Success or failure rule for a single record
pub fn progress_record(record: &LoadRecord, success: bool) -> LoadRecord {
    let weight = record.current_weight;

    if success {
        return LoadRecord {
            current_weight: weight.max(round_half(weight + WEIGHT_INCREMENT)),
            consecutive_fail_count: 0,
        };
    }

    let fails = record.consecutive_fail_count + 1;
    if fails >= DELOAD_AFTER_FAILS {
        LoadRecord {
            current_weight: round_half((weight * DELOAD_FACTOR).max(0.0)),
            consecutive_fail_count: 0,
        }
    } else {
        LoadRecord {
            current_weight: weight,
            consecutive_fail_count: fails,
        }
    }
}

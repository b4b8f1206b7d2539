//! Engine module - planning and progressive overload
//!
//! Features:
//! - Unlock gating by body weight and hang time
//! - Weekday schedule with bridge makeup days and deload weeks
//! - Load suggestions and post-session progression
//! - Live session recording with a rest timer
//!
//! Everything except the rest timer is a pure function over plain data:
//! callers load state, pass it in, and persist what comes back.

pub mod planner;
pub mod progression;
pub mod session;
pub mod suggest;
pub mod timer;
pub mod unlocks;

pub use planner::{DayPlan, Mode, PlanInputs, PlannedExercise, plan_day, preview_week};
pub use progression::{apply_progression, load_record_for};
pub use session::{FinishedSession, SessionError, SessionRecorder, SessionState, SetOutcome};
pub use suggest::suggest_load;
pub use timer::RestTimer;
pub use unlocks::{Unlocks, evaluate_unlocks};

/// Weight added after a fully successful session
pub const WEIGHT_INCREMENT: f64 = 2.5;

/// Multiplier applied on deload (5% reduction)
pub const DELOAD_FACTOR: f64 = 0.95;

/// Consecutive failed sessions that trigger a deload
pub const DELOAD_AFTER_FAILS: u32 = 2;

/// Round to the nearest 0.5, halves rounding up (weights are never negative)
pub fn round_half(value: f64) -> f64 {
    (value * 2.0).round() / 2.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_half_examples() {
        assert_eq!(round_half(13.24), 13.0);
        assert_eq!(round_half(13.26), 13.5);
    }

    #[test]
    fn test_round_half_ties_go_up() {
        assert_eq!(round_half(13.25), 13.5);
        assert_eq!(round_half(13.75), 14.0);
    }

    #[test]
    fn test_round_half_keeps_multiples() {
        for w in [0.0, 0.5, 2.5, 17.5, 100.0] {
            assert_eq!(round_half(w), w);
        }
    }

    #[test]
    fn test_round_half_deload_values() {
        assert_eq!(round_half(20.0 * DELOAD_FACTOR), 19.0);
        assert_eq!(round_half(17.5 * DELOAD_FACTOR), 16.5); // 16.625
    }
}

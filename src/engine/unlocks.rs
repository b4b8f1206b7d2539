//! Unlock gating for advanced exercises

/// Body weight (lbs) at or below which the bar hang opens up
pub const HANG_MAX_BODY_WEIGHT: f64 = 200.0;

/// Best hang (seconds) needed before assisted chin-ups
pub const CHIN_MIN_HANG_SECS: u32 = 30;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Unlocks {
    pub hang_unlocked: bool,
    pub chin_unlocked: bool,
}

/// Which gated exercises are available. A missing weight unlocks nothing.
pub fn evaluate_unlocks(current_body_weight: Option<f64>, best_hang_secs: u32) -> Unlocks {
    let hang_unlocked = current_body_weight.is_some_and(|w| w <= HANG_MAX_BODY_WEIGHT);
    Unlocks {
        hang_unlocked,
        chin_unlocked: hang_unlocked && best_hang_secs >= CHIN_MIN_HANG_SECS,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_heavy_unlocks_nothing() {
        for weight in [200.5, 215.0, 340.0] {
            for hang in [0, 30, 120] {
                assert_eq!(evaluate_unlocks(Some(weight), hang), Unlocks::default());
            }
        }
    }

    #[test]
    fn test_light_with_hang_unlocks_chin() {
        for weight in [120.0, 180.0, 200.0] {
            let unlocks = evaluate_unlocks(Some(weight), 30);
            assert!(unlocks.hang_unlocked);
            assert!(unlocks.chin_unlocked);
        }
    }

    #[test]
    fn test_hang_only() {
        let unlocks = evaluate_unlocks(Some(199.0), 29);
        assert!(unlocks.hang_unlocked);
        assert!(!unlocks.chin_unlocked);
    }

    #[test]
    fn test_missing_weight() {
        assert_eq!(evaluate_unlocks(None, 60), Unlocks::default());
    }
}

//! Experience and leveling math.
//!
//! Pure functions shared by the optimistic UI path and the merge step, so
//! a locally-predicted level-up always matches what the store eventually
//! reports.

/// Levels stop accruing here; any further XP is discarded.
pub const LEVEL_CAP: i32 = 10;

/// XP needed to advance *from* the given level.
pub fn xp_required(level: i32) -> i32 {
    level * 100
}

/// Apply an XP reward, carrying leftover XP across level-ups.
///
/// Returns the new `(level, experience)` pair. At the cap the experience
/// counter pins to zero.
pub fn apply_reward(level: i32, experience: i32, reward: i32) -> (i32, i32) {
    if level >= LEVEL_CAP {
        return (LEVEL_CAP, 0);
    }

    let mut level = level;
    let mut xp = experience + reward.max(0);
    while level < LEVEL_CAP && xp >= xp_required(level) {
        xp -= xp_required(level);
        level += 1;
    }
    if level >= LEVEL_CAP {
        (LEVEL_CAP, 0)
    } else {
        (level, xp)
    }
}

/// Progress toward the next level in `[0, 1]`, for the XP bar.
pub fn level_progress(level: i32, experience: i32) -> f32 {
    if level >= LEVEL_CAP {
        return 1.0;
    }
    (experience as f32 / xp_required(level) as f32).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_requirement_advances_with_zero_leftover() {
        for level in 1..LEVEL_CAP {
            let (new_level, xp) = apply_reward(level, 0, xp_required(level));
            assert_eq!(new_level, level + 1, "level {} should advance", level);
            assert_eq!(xp, 0);
        }
    }

    #[test]
    fn one_below_requirement_does_not_advance() {
        for level in 1..LEVEL_CAP {
            let (new_level, xp) = apply_reward(level, 0, xp_required(level) - 1);
            assert_eq!(new_level, level);
            assert_eq!(xp, xp_required(level) - 1);
        }
    }

    #[test]
    fn leftover_carries_across_multiple_levels() {
        // 100 + 200 + 50 from level 1
        let (level, xp) = apply_reward(1, 0, 350);
        assert_eq!(level, 3);
        assert_eq!(xp, 50);
    }

    #[test]
    fn cap_pins_experience_to_zero() {
        assert_eq!(apply_reward(LEVEL_CAP, 0, 1), (LEVEL_CAP, 0));
        assert_eq!(apply_reward(LEVEL_CAP, 0, 1_000_000), (LEVEL_CAP, 0));

        // Blowing past the cap from below also lands on (10, 0)
        let (level, xp) = apply_reward(9, 850, 10_000);
        assert_eq!((level, xp), (LEVEL_CAP, 0));
    }

    #[test]
    fn progress_is_clamped() {
        assert_eq!(level_progress(1, 0), 0.0);
        assert_eq!(level_progress(1, 50), 0.5);
        assert_eq!(level_progress(LEVEL_CAP, 0), 1.0);
    }
}

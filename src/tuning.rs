//! Runtime-tunable simulation constants
//!
//! Every number the evaluation loop consults at runtime lives here under a
//! name, validated once at setup. Fixed sprite geometry is in [`crate::consts`].

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A tuning violation rejected before any generation runs.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SetupError {
    #[error("obstacle gap must be positive, got {gap}")]
    NonPositiveGap { gap: f32 },
    #[error("gap draw range [{lo}, {hi}) is empty")]
    EmptyGapRange { lo: i32, hi: i32 },
    #[error("obstacle velocity must be positive, got {speed}")]
    NonPositiveSpeed { speed: f32 },
    #[error("a generation needs at least one controller")]
    EmptyCohort,
}

/// Simulation tunables, defaulting to the values the agents were bred on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tuning {
    /// Downward acceleration; displacement per tick is vel*t + 0.5*gravity*t^2
    pub gravity: f32,
    /// Vertical velocity set by a jump (negative is up)
    pub jump_impulse: f32,
    /// Per-tick displacement is clamped to this when falling
    pub max_fall: f32,
    /// Vertical opening between the pipe columns
    pub gap: f32,
    /// Obstacle scroll speed per tick
    pub obstacle_speed: f32,
    /// Floor scroll speed per tick (cosmetic)
    pub floor_speed: f32,
    /// Gap top edge is drawn uniformly from [gap_lo, gap_hi)
    pub gap_lo: i32,
    pub gap_hi: i32,
    /// Fitness added to every living agent each tick
    pub survival_reward: f32,
    /// Fitness added to every living agent when the cohort clears an obstacle
    pub pass_reward: f32,
    /// Fitness added to an agent on collision (negative)
    pub collision_penalty: f32,
    /// An agent jumps when its controller's signal exceeds this
    pub jump_threshold: f32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            gravity: 3.0,
            jump_impulse: -10.5,
            max_fall: 16.0,
            gap: 200.0,
            obstacle_speed: 5.0,
            floor_speed: 5.0,
            gap_lo: 50,
            gap_hi: 450,
            survival_reward: 0.1,
            pass_reward: 5.0,
            collision_penalty: -1.0,
            jump_threshold: 0.5,
        }
    }
}

impl Tuning {
    /// Reject values the loop cannot run with.
    pub fn validate(&self) -> Result<(), SetupError> {
        if self.gap <= 0.0 {
            return Err(SetupError::NonPositiveGap { gap: self.gap });
        }
        if self.gap_lo >= self.gap_hi {
            return Err(SetupError::EmptyGapRange {
                lo: self.gap_lo,
                hi: self.gap_hi,
            });
        }
        if self.obstacle_speed <= 0.0 {
            return Err(SetupError::NonPositiveSpeed {
                speed: self.obstacle_speed,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_tuning_is_valid() {
        assert_eq!(Tuning::default().validate(), Ok(()));
    }

    #[test]
    fn test_non_positive_gap_rejected() {
        let tuning = Tuning {
            gap: 0.0,
            ..Default::default()
        };
        assert_eq!(
            tuning.validate(),
            Err(SetupError::NonPositiveGap { gap: 0.0 })
        );
    }

    #[test]
    fn test_empty_gap_range_rejected() {
        let tuning = Tuning {
            gap_lo: 450,
            gap_hi: 450,
            ..Default::default()
        };
        assert!(matches!(
            tuning.validate(),
            Err(SetupError::EmptyGapRange { .. })
        ));
    }

    #[test]
    fn test_stalled_obstacles_rejected() {
        let tuning = Tuning {
            obstacle_speed: -5.0,
            ..Default::default()
        };
        assert!(matches!(
            tuning.validate(),
            Err(SetupError::NonPositiveSpeed { .. })
        ));
    }

    #[test]
    fn test_errors_are_descriptive() {
        let err = SetupError::NonPositiveGap { gap: -1.0 };
        assert_eq!(err.to_string(), "obstacle gap must be positive, got -1");
    }
}

//! Deterministic evaluation loop
//!
//! All simulation logic lives here. This module must be pure and deterministic:
//! - Discrete ticks only, no wall-clock time
//! - Seeded RNG only (gap draws)
//! - Stable cohort order (slots keep their setup index until removed)
//! - No rendering or platform dependencies
//!
//! One tick runs: agent physics, controller decisions, collision and pass
//! checks, spawn/retire, boundary deaths, lockstep prune, floor scroll.

pub mod collision;
pub mod state;
pub mod tick;

pub use collision::{Rect, agent_hits_obstacle, ellipse_rect_overlap};
pub use state::{
    Agent, AgentView, Floor, FrameSnapshot, Obstacle, ObstacleView, Phase, Slot, World,
};
pub use tick::tick;

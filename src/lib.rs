//! Flapsim - a deterministic obstacle-run simulation for evaluating controllers
//!
//! A cohort of bird agents flies through scrolling pipe gaps in lockstep while
//! an external evolutionary engine supplies one black-box controller per agent
//! and reads back a scalar fitness per generation.
//!
//! Core modules:
//! - `sim`: Deterministic simulation (physics, collisions, evaluation loop)
//! - `controller`: The decide-per-tick interface the engine implements
//! - `tuning`: Runtime-tunable simulation constants, validated at setup
//! - `settings`: Driver preferences persisted as JSON

pub mod controller;
pub mod settings;
pub mod sim;
pub mod tuning;

pub use controller::{Controller, ControllerError, GapFollower, Observation};
pub use settings::Settings;
pub use tuning::{SetupError, Tuning};

/// Fixed world geometry and cosmetic constants
///
/// Everything here is pinned by the 2x-scaled sprite sheet the renderer draws
/// with; runtime-tunable values live in [`tuning`] instead.
pub mod consts {
    /// Screen dimensions the sprite layout assumes
    pub const SCREEN_WIDTH: f32 = 500.0;
    pub const SCREEN_HEIGHT: f32 = 800.0;

    /// Agent sprite box and fixed spawn point
    pub const AGENT_WIDTH: f32 = 68.0;
    pub const AGENT_HEIGHT: f32 = 48.0;
    pub const AGENT_SPAWN_X: f32 = 230.0;
    pub const AGENT_SPAWN_Y: f32 = 350.0;

    /// Extra upward displacement applied while rising (sharper jump arc)
    pub const RISE_BOOST: f32 = 2.0;

    /// Visual tilt: nose-up snap value, per-tick decay, and the dive floor
    pub const MAX_TILT: f32 = 25.0;
    pub const TILT_DECAY: f32 = 20.0;
    pub const MIN_TILT: f32 = -90.0;
    /// Band above the last jump height within which the nose stays up
    pub const NOSE_UP_WINDOW: f32 = 50.0;
    /// Tilt at or below which the wings freeze mid-flap
    pub const WING_FREEZE_TILT: f32 = -80.0;
    /// Ticks each wing frame is held; the flap cycle is four frames long
    pub const WING_FRAME_TICKS: u32 = 5;

    /// Obstacle sprite box (one pipe column) and spawn offset
    pub const OBSTACLE_WIDTH: f32 = 104.0;
    pub const OBSTACLE_COLUMN_HEIGHT: f32 = 640.0;
    pub const OBSTACLE_SPAWN_X: f32 = 650.0;

    /// Floor line (lower death boundary) and tiling segment width
    pub const FLOOR_Y: f32 = 730.0;
    pub const FLOOR_SEGMENT_WIDTH: f32 = 672.0;
}

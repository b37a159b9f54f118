//! The decide-per-tick interface between the simulation and whatever is
//! steering each agent.
//!
//! The loop knows nothing about the decision-making technique behind a
//! controller: it hands over one bounded observation per tick and reads back
//! one signal. Anything above the jump threshold flaps.

use thiserror::Error;

/// What one agent senses on one tick.
///
/// Distances are measured from the agent's y to the reference obstacle's gap
/// edges, so a controller sees where it sits relative to the opening without
/// knowing the obstacle's x.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Observation {
    /// Agent's vertical position (screen coordinates, y grows downward)
    pub y: f32,
    /// |y - gap top edge|
    pub dist_to_gap_top: f32,
    /// |y - gap bottom edge|
    pub dist_to_gap_bottom: f32,
}

impl Observation {
    /// Measure an observation against a gap spanning [gap_top, gap_bottom].
    pub fn measure(y: f32, gap_top: f32, gap_bottom: f32) -> Self {
        Self {
            y,
            dist_to_gap_top: (y - gap_top).abs(),
            dist_to_gap_bottom: (y - gap_bottom).abs(),
        }
    }
}

/// A controller failing to decide. Fatal for that agent only: the loop marks
/// it dead on the spot and carries the rest of the cohort on.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("controller fault: {0}")]
pub struct ControllerError(pub String);

impl ControllerError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// One black-box pilot per agent.
pub trait Controller {
    /// Map an observation to a jump signal. Values above the configured
    /// threshold (0.5 by default) trigger a jump this tick.
    fn decide(&mut self, obs: Observation) -> Result<f32, ControllerError>;
}

/// Hand-written reference controller: flaps whenever the agent hangs below
/// its hover setpoint, the gap centerline raised by half of `bias`.
///
/// Useful as a driver demo and as a sanity baseline for evolved controllers;
/// with a well-chosen bias it threads gaps indefinitely.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GapFollower {
    /// Vertical offset added to the centerline test; positive biases flap
    /// earlier and hover nearer the gap top
    pub bias: f32,
}

impl GapFollower {
    pub fn new(bias: f32) -> Self {
        Self { bias }
    }
}

impl Controller for GapFollower {
    fn decide(&mut self, obs: Observation) -> Result<f32, ControllerError> {
        // Further from the gap top than from the gap bottom means the agent
        // hangs in the lower half of the opening.
        let below_center = obs.dist_to_gap_top + self.bias > obs.dist_to_gap_bottom;
        Ok(if below_center { 1.0 } else { 0.0 })
    }
}

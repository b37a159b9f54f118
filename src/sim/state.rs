//! Evaluation state and core simulation types
//!
//! Everything a generation owns lives here: the agents, the obstacle course,
//! the cosmetic floor, and the cohort bookkeeping that keeps each agent glued
//! to its controller and fitness accumulator.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::collision::Rect;
use crate::consts::*;
use crate::controller::Controller;
use crate::tuning::{SetupError, Tuning};

/// Current phase of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    /// Constructed, no cohort installed yet
    Setup,
    /// A generation is being evaluated
    Running,
    /// The cohort is exhausted; results are final
    GenerationOver,
}

/// A bird agent. Moves only vertically; x is fixed for the whole run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Agent {
    pub pos: Vec2,
    /// Vertical velocity set by the last jump impulse
    pub vel: f32,
    /// Ticks since the last jump; drives the displacement curve
    pub ticks_since_jump: u32,
    /// y at the last jump, reference height for the nose-up window
    pub jump_y: f32,
    /// Visual tilt in degrees, in [-90, 25]; never consulted by physics
    pub tilt: f32,
    /// Flap-cycle counter; cosmetic, see [`Agent::wing_frame`]
    pub wing_ticks: u32,
    /// Cleared when death is detected; the slot is pruned the same tick
    pub alive: bool,
}

impl Agent {
    pub fn new(x: f32, y: f32) -> Self {
        Self {
            pos: Vec2::new(x, y),
            vel: 0.0,
            ticks_since_jump: 0,
            jump_y: y,
            tilt: 0.0,
            wing_ticks: 0,
            alive: true,
        }
    }

    /// Apply the jump impulse and restart the displacement curve.
    pub fn jump(&mut self, tuning: &Tuning) {
        self.vel = tuning.jump_impulse;
        self.ticks_since_jump = 0;
        self.jump_y = self.pos.y;
    }

    /// Advance one tick of vertical physics plus the cosmetic tilt/wing state.
    pub fn step(&mut self, tuning: &Tuning) {
        self.ticks_since_jump += 1;
        let t = self.ticks_since_jump as f32;

        let mut displacement = self.vel * t + 0.5 * tuning.gravity * t * t;
        if displacement >= tuning.max_fall {
            displacement = tuning.max_fall;
        }
        if displacement < 0.0 {
            displacement -= RISE_BOOST;
        }
        self.pos.y += displacement;

        // Nose up while rising or still inside the window above the last jump
        // height; otherwise tip forward toward the dive floor.
        if displacement < 0.0 || self.pos.y < self.jump_y + NOSE_UP_WINDOW {
            if self.tilt < MAX_TILT {
                self.tilt = MAX_TILT;
            }
        } else {
            self.tilt = (self.tilt - TILT_DECAY).max(MIN_TILT);
        }

        self.advance_wings();
    }

    fn advance_wings(&mut self) {
        self.wing_ticks += 1;
        if self.wing_ticks >= WING_FRAME_TICKS * 4 {
            self.wing_ticks = 0;
        }
        // A nose dive pins the flap mid-cycle until the next jump recovers it.
        if self.tilt <= WING_FREEZE_TILT {
            self.wing_ticks = WING_FRAME_TICKS * 2;
        }
    }

    /// Current wing sprite frame (0 low, 1 mid, 2 high), cycling 0-1-2-1.
    pub fn wing_frame(&self) -> u8 {
        if self.tilt <= WING_FREEZE_TILT {
            return 1;
        }
        match self.wing_ticks / WING_FRAME_TICKS {
            0 => 0,
            1 => 1,
            2 => 2,
            _ => 1,
        }
    }
}

/// A pipe pair: two solid columns with a vertical gap between them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Obstacle {
    /// Left edge; scrolls toward negative x
    pub x: f32,
    /// Gap top edge (the top column's bottom edge)
    pub gap_y: f32,
    /// y where the top column sprite begins (gap_y minus the column height)
    pub top: f32,
    /// Gap bottom edge (the bottom column's top edge)
    pub bottom: f32,
    /// Set the first tick the cohort clears this obstacle; never unset
    pub passed: bool,
}

impl Obstacle {
    pub fn new(x: f32, tuning: &Tuning, rng: &mut Pcg32) -> Self {
        let mut obstacle = Self {
            x,
            gap_y: 0.0,
            top: 0.0,
            bottom: 0.0,
            passed: false,
        };
        obstacle.set_gap(tuning, rng);
        obstacle
    }

    /// Draw the gap placement and derive both column extents. Called once,
    /// from the constructor; the extents stay fixed for the lifetime.
    pub fn set_gap(&mut self, tuning: &Tuning, rng: &mut Pcg32) {
        self.gap_y = rng.random_range(tuning.gap_lo..tuning.gap_hi) as f32;
        self.top = self.gap_y - OBSTACLE_COLUMN_HEIGHT;
        self.bottom = self.gap_y + tuning.gap;
    }

    pub fn advance(&mut self, speed: f32) {
        self.x -= speed;
    }

    /// Fully past the left edge of the screen.
    pub fn off_screen(&self) -> bool {
        self.x + OBSTACLE_WIDTH < 0.0
    }

    /// Solid box of the top column.
    pub fn top_rect(&self) -> Rect {
        Rect::new(
            Vec2::new(self.x, self.top),
            Vec2::new(self.x + OBSTACLE_WIDTH, self.gap_y),
        )
    }

    /// Solid box of the bottom column.
    pub fn bottom_rect(&self) -> Rect {
        Rect::new(
            Vec2::new(self.x, self.bottom),
            Vec2::new(self.x + OBSTACLE_WIDTH, self.bottom + OBSTACLE_COLUMN_HEIGHT),
        )
    }
}

/// Two tiling floor segments scrolling left forever.
///
/// Purely cosmetic: deaths use the fixed floor line, not these offsets.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Floor {
    pub x1: f32,
    pub x2: f32,
}

impl Floor {
    pub fn new() -> Self {
        Self {
            x1: 0.0,
            x2: FLOOR_SEGMENT_WIDTH,
        }
    }

    /// Scroll left, cycling whichever segment is fully off-screen to the
    /// other segment's right edge.
    pub fn advance(&mut self, speed: f32) {
        self.x1 -= speed;
        self.x2 -= speed;

        if self.x1 + FLOOR_SEGMENT_WIDTH < 0.0 {
            self.x1 = self.x2 + FLOOR_SEGMENT_WIDTH;
        }
        if self.x2 + FLOOR_SEGMENT_WIDTH < 0.0 {
            self.x2 = self.x1 + FLOOR_SEGMENT_WIDTH;
        }
    }
}

impl Default for Floor {
    fn default() -> Self {
        Self::new()
    }
}

/// One cohort entry: an agent, the controller steering it, and its fitness
/// accumulator. A single record, so no removal can ever split the pairing.
pub struct Slot {
    /// Position in the batch handed to `begin_generation`; results land there
    pub genome: usize,
    pub agent: Agent,
    pub controller: Box<dyn Controller>,
    pub fitness: f32,
}

/// Complete evaluation state for one run.
pub struct World {
    /// Tunables validated at construction
    pub tuning: Tuning,
    /// Run seed for reproducibility
    pub seed: u64,
    /// Gap-draw RNG; the only randomness in the simulation
    pub(crate) rng: Pcg32,
    /// Current phase
    pub phase: Phase,
    /// Generation counter; the first setup makes it 1
    pub generation: u32,
    /// Ticks advanced in the current generation
    pub ticks: u64,
    /// Obstacles cleared by the cohort this generation
    pub score: u32,
    /// Cosmetic scrolling floor
    pub floor: Floor,
    /// Active obstacles, oldest first
    pub obstacles: Vec<Obstacle>,
    /// Living entrants in stable setup order
    pub cohort: Vec<Slot>,
    /// Fitness per genome index, committed as slots retire
    pub(crate) results: Vec<f32>,
}

impl World {
    /// Validate the tuning and build an empty world in `Phase::Setup`.
    pub fn new(tuning: Tuning, seed: u64) -> Result<Self, SetupError> {
        tuning.validate()?;
        Ok(Self {
            tuning,
            seed,
            rng: Pcg32::seed_from_u64(seed),
            phase: Phase::Setup,
            generation: 0,
            ticks: 0,
            score: 0,
            floor: Floor::new(),
            obstacles: Vec::new(),
            cohort: Vec::new(),
            results: Vec::new(),
        })
    }

    /// Install one agent per controller and reset the course for a fresh
    /// generation: score 0, one obstacle at the spawn offset, fitness 0.
    pub fn begin_generation(
        &mut self,
        controllers: Vec<Box<dyn Controller>>,
    ) -> Result<(), SetupError> {
        if controllers.is_empty() {
            return Err(SetupError::EmptyCohort);
        }

        self.generation += 1;
        self.ticks = 0;
        self.score = 0;
        self.floor = Floor::new();
        self.results = vec![0.0; controllers.len()];
        self.cohort = controllers
            .into_iter()
            .enumerate()
            .map(|(genome, controller)| Slot {
                genome,
                agent: Agent::new(AGENT_SPAWN_X, AGENT_SPAWN_Y),
                controller,
                fitness: 0.0,
            })
            .collect();
        self.obstacles = vec![Obstacle::new(OBSTACLE_SPAWN_X, &self.tuning, &mut self.rng)];
        self.phase = Phase::Running;

        log::info!(
            "generation {}: evaluating {} agents",
            self.generation,
            self.cohort.len()
        );
        Ok(())
    }

    /// Stop the current generation from outside, crediting survivors with
    /// the fitness accumulated so far. Idempotent.
    pub fn end_generation(&mut self) {
        for slot in self.cohort.drain(..) {
            self.results[slot.genome] = slot.fitness;
        }
        if self.phase == Phase::Running {
            log::info!(
                "generation {} cut off at tick {}, score {}",
                self.generation,
                self.ticks,
                self.score
            );
        }
        self.phase = Phase::GenerationOver;
    }

    /// Fitness per controller in setup order. Entries for living agents are
    /// committed on death or at [`World::end_generation`].
    pub fn results(&self) -> &[f32] {
        &self.results
    }

    /// Render-ready copy of the frame. Carries no references into the world.
    pub fn snapshot(&self) -> FrameSnapshot {
        FrameSnapshot {
            generation: self.generation,
            tick: self.ticks,
            score: self.score,
            phase: self.phase,
            agents: self
                .cohort
                .iter()
                .map(|slot| AgentView {
                    pos: slot.agent.pos,
                    tilt: slot.agent.tilt,
                    wing_frame: slot.agent.wing_frame(),
                })
                .collect(),
            obstacles: self
                .obstacles
                .iter()
                .map(|o| ObstacleView {
                    x: o.x,
                    gap_y: o.gap_y,
                    top: o.top,
                    bottom: o.bottom,
                    passed: o.passed,
                })
                .collect(),
            floor_x1: self.floor.x1,
            floor_x2: self.floor.x2,
        }
    }
}

/// Agent visual state for one frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AgentView {
    pub pos: Vec2,
    pub tilt: f32,
    pub wing_frame: u8,
}

/// Obstacle visual state for one frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ObstacleView {
    pub x: f32,
    pub gap_y: f32,
    pub top: f32,
    pub bottom: f32,
    pub passed: bool,
}

/// Read-only per-tick snapshot for a renderer or recorder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameSnapshot {
    pub generation: u32,
    pub tick: u64,
    pub score: u32,
    pub phase: Phase,
    pub agents: Vec<AgentView>,
    pub obstacles: Vec<ObstacleView>,
    pub floor_x1: f32,
    pub floor_x2: f32,
}

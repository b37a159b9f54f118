//! Fixed timestep evaluation tick
//!
//! Core loop that advances one generation deterministically. Every phase of a
//! tick runs in a fixed order over stable cohort order, so identical seeds
//! and controllers replay identically.

use super::collision::agent_hits_obstacle;
use super::state::{Obstacle, Phase, World};
use crate::consts::*;
use crate::controller::Observation;

/// Advance the world by one tick.
///
/// Does nothing unless a generation is running. The order inside a tick is
/// load-bearing: agents move and decide first, then obstacles resolve
/// collisions and passes before they scroll, then deaths are pruned.
pub fn tick(world: &mut World) {
    if world.phase != Phase::Running {
        return;
    }

    // Pick the obstacle the cohort reads this tick: the oldest one, unless
    // the agents have already cleared its trailing edge and a newer one is
    // on screen. Running implies a non-empty cohort and at least one
    // obstacle; the phase flips the same tick the cohort empties.
    let mut active = 0;
    if world.obstacles.len() > 1
        && world.cohort[0].agent.pos.x > world.obstacles[0].x + OBSTACLE_WIDTH
    {
        active = 1;
    }
    let gap_top = world.obstacles[active].gap_y;
    let gap_bottom = world.obstacles[active].bottom;

    // Move every agent, pay the survival reward, and ask its controller
    // whether to jump. A faulting controller forfeits its agent.
    for slot in &mut world.cohort {
        slot.agent.step(&world.tuning);
        slot.fitness += world.tuning.survival_reward;

        let obs = Observation::measure(slot.agent.pos.y, gap_top, gap_bottom);
        match slot.controller.decide(obs) {
            Ok(signal) if signal > world.tuning.jump_threshold => {
                slot.agent.jump(&world.tuning);
            }
            Ok(_) => {}
            Err(err) => {
                log::warn!("genome {}: {err}; removing agent", slot.genome);
                slot.agent.alive = false;
            }
        }
    }

    // Resolve each obstacle oldest-first: collisions, then the pass check,
    // then retirement, and only then scroll it left. Checking before moving
    // keeps the frame the agents just saw authoritative.
    let mut spawn_due = false;
    let mut retired: Vec<usize> = Vec::new();
    for (idx, obstacle) in world.obstacles.iter_mut().enumerate() {
        for slot in &mut world.cohort {
            if slot.agent.alive && agent_hits_obstacle(&slot.agent, obstacle) {
                slot.fitness += world.tuning.collision_penalty;
                slot.agent.alive = false;
                log::debug!(
                    "genome {} collided at obstacle x {:.1}",
                    slot.genome,
                    obstacle.x
                );
            }
        }

        // Passed the first tick its left edge falls behind a living agent.
        let lead_x = world
            .cohort
            .iter()
            .find(|slot| slot.agent.alive)
            .map(|slot| slot.agent.pos.x);
        if let Some(lead_x) = lead_x {
            if !obstacle.passed && obstacle.x < lead_x {
                obstacle.passed = true;
                spawn_due = true;
            }
        }

        if obstacle.off_screen() {
            retired.push(idx);
        }

        obstacle.advance(world.tuning.obstacle_speed);
    }

    // A cleared obstacle scores once, pays every agent still alive, and its
    // replacement enters at the spawn offset.
    if spawn_due {
        world.score += 1;
        for slot in &mut world.cohort {
            if slot.agent.alive {
                slot.fitness += world.tuning.pass_reward;
            }
        }
        let next = Obstacle::new(OBSTACLE_SPAWN_X, &world.tuning, &mut world.rng);
        log::debug!("score {}: next obstacle at gap y {:.0}", world.score, next.gap_y);
        world.obstacles.push(next);
    }

    // Drop retired obstacles back-to-front so indices stay valid.
    for idx in retired.into_iter().rev() {
        world.obstacles.remove(idx);
    }

    // Field bounds: the floor line and the ceiling kill without penalty.
    for slot in &mut world.cohort {
        let y = slot.agent.pos.y;
        if slot.agent.alive && (y + AGENT_HEIGHT >= FLOOR_Y || y < 0.0) {
            slot.agent.alive = false;
            log::debug!("genome {} left the field at y {:.1}", slot.genome, y);
        }
    }

    // Prune dead slots back-to-front, committing their fitness.
    let dead: Vec<usize> = world
        .cohort
        .iter()
        .enumerate()
        .filter(|(_, slot)| !slot.agent.alive)
        .map(|(idx, _)| idx)
        .collect();
    for idx in dead.into_iter().rev() {
        let slot = world.cohort.remove(idx);
        world.results[slot.genome] = slot.fitness;
    }

    world.floor.advance(world.tuning.floor_speed);

    world.ticks += 1;
    if world.cohort.is_empty() {
        world.phase = Phase::GenerationOver;
        log::info!(
            "generation {} over at tick {}, score {}",
            world.generation,
            world.ticks,
            world.score
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::{Controller, ControllerError};
    use crate::tuning::Tuning;
    use std::cell::RefCell;
    use std::rc::Rc;

    struct NeverJump;

    impl Controller for NeverJump {
        fn decide(&mut self, _obs: Observation) -> Result<f32, ControllerError> {
            Ok(0.0)
        }
    }

    struct AlwaysJump;

    impl Controller for AlwaysJump {
        fn decide(&mut self, _obs: Observation) -> Result<f32, ControllerError> {
            Ok(1.0)
        }
    }

    /// Flaps on every n-th decision.
    struct Flapper {
        period: u64,
        calls: u64,
    }

    impl Controller for Flapper {
        fn decide(&mut self, _obs: Observation) -> Result<f32, ControllerError> {
            self.calls += 1;
            Ok(if self.calls % self.period == 0 { 1.0 } else { 0.0 })
        }
    }

    /// Errors out on the n-th decision.
    struct FailsOnNth {
        calls: u32,
        n: u32,
    }

    impl Controller for FailsOnNth {
        fn decide(&mut self, _obs: Observation) -> Result<f32, ControllerError> {
            self.calls += 1;
            if self.calls >= self.n {
                Err(ControllerError::new("wires crossed"))
            } else {
                Ok(0.0)
            }
        }
    }

    /// Stores every observation it is handed.
    struct Recorder {
        seen: Rc<RefCell<Vec<Observation>>>,
    }

    impl Controller for Recorder {
        fn decide(&mut self, obs: Observation) -> Result<f32, ControllerError> {
            self.seen.borrow_mut().push(obs);
            Ok(0.0)
        }
    }

    fn running_world(controllers: Vec<Box<dyn Controller>>) -> World {
        let mut world = World::new(Tuning::default(), 1).unwrap();
        world.begin_generation(controllers).unwrap();
        world
    }

    fn forced_obstacle(x: f32, gap_y: f32, passed: bool) -> Obstacle {
        Obstacle {
            x,
            gap_y,
            top: gap_y - OBSTACLE_COLUMN_HEIGHT,
            bottom: gap_y + Tuning::default().gap,
            passed,
        }
    }

    fn assert_close(actual: f32, expected: f32) {
        assert!(
            (actual - expected).abs() < 1e-4,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn test_tick_is_noop_outside_running() {
        let mut world = World::new(Tuning::default(), 1).unwrap();
        tick(&mut world);
        assert_eq!(world.phase, Phase::Setup);
        assert_eq!(world.ticks, 0);

        world.begin_generation(vec![Box::new(NeverJump)]).unwrap();
        world.end_generation();
        tick(&mut world);
        assert_eq!(world.phase, Phase::GenerationOver);
        assert_eq!(world.ticks, 0);
    }

    #[test]
    fn test_generation_runs_until_all_dead() {
        let mut world = running_world(vec![Box::new(NeverJump), Box::new(NeverJump)]);

        while world.phase == Phase::Running {
            tick(&mut world);
            assert!(world.ticks < 100, "cohort never died");
        }

        // Falling from the spawn height reaches the floor line on tick 23.
        assert_eq!(world.ticks, 23);
        assert_eq!(world.score, 0);
        assert!(world.cohort.is_empty());
        assert_close(world.results()[0], 2.3);
        assert_close(world.results()[1], 2.3);
    }

    #[test]
    fn test_ceiling_death_has_no_penalty() {
        let mut world = running_world(vec![Box::new(AlwaysJump)]);

        while world.phase == Phase::Running {
            tick(&mut world);
            assert!(world.ticks < 100, "agent never hit the ceiling");
        }

        // Climbing 11 per tick from 351.5 crosses y 0 on tick 33.
        assert_eq!(world.ticks, 33);
        assert_eq!(world.score, 0);
        assert_close(world.results()[0], 3.3);
    }

    #[test]
    fn test_pass_scores_once_and_rewards_survivors() {
        let mut world = running_world(vec![Box::new(NeverJump), Box::new(NeverJump)]);
        // Park the obstacle just ahead of the agents, with a gap they are
        // about to fall out of.
        world.obstacles = vec![forced_obstacle(240.0, 250.0, false)];

        for _ in 0..4 {
            tick(&mut world);
        }
        assert_eq!(world.score, 1);
        assert_eq!(world.obstacles.len(), 2);
        assert!(world.obstacles[0].passed);
        assert_close(world.cohort[0].fitness, 5.4);
        assert_close(world.cohort[1].fitness, 5.4);

        // One more tick of falling clips the bottom column.
        tick(&mut world);
        assert_eq!(world.phase, Phase::GenerationOver);
        assert_eq!(world.ticks, 5);
        assert_eq!(world.score, 1);
        assert_close(world.results()[0], 4.5);
        assert_close(world.results()[1], 4.5);
    }

    #[test]
    fn test_controller_fault_forfeits_agent() {
        let mut world = running_world(vec![
            Box::new(FailsOnNth { calls: 0, n: 3 }),
            Box::new(NeverJump),
        ]);

        while world.phase == Phase::Running {
            tick(&mut world);
        }

        // The faulting genome keeps what it earned before the fault.
        assert_close(world.results()[0], 0.3);
        assert_close(world.results()[1], 2.3);
        assert_eq!(world.ticks, 23);
    }

    #[test]
    fn test_off_screen_obstacle_retires_after_its_checks() {
        let mut world = running_world(vec![Box::new(NeverJump)]);
        world.obstacles = vec![
            forced_obstacle(-100.0, 250.0, true),
            forced_obstacle(650.0, 250.0, false),
        ];

        // Still on screen by a few pixels: kept, and no second score for an
        // obstacle already passed.
        tick(&mut world);
        assert_eq!(world.obstacles.len(), 2);
        assert_eq!(world.score, 0);

        tick(&mut world);
        assert_eq!(world.obstacles.len(), 1);
        assert_eq!(world.obstacles[0].x, 640.0);
    }

    #[test]
    fn test_observation_tracks_first_uncleared_obstacle() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut world = running_world(vec![Box::new(Recorder {
            seen: Rc::clone(&seen),
        })]);
        world.obstacles = vec![
            forced_obstacle(100.0, 100.0, true),
            forced_obstacle(650.0, 300.0, false),
        ];

        tick(&mut world);

        // The cleared obstacle behind the cohort is ignored; distances are
        // measured against the newer gap at y 300 after the move to y 351.5.
        let obs = seen.borrow()[0];
        assert_eq!(obs.y, 351.5);
        assert_eq!(obs.dist_to_gap_top, 51.5);
        assert_eq!(obs.dist_to_gap_bottom, 148.5);

        // An uncleared obstacle still ahead stays the reference even with a
        // newer one on screen.
        let seen_ahead = Rc::new(RefCell::new(Vec::new()));
        let mut world = running_world(vec![Box::new(Recorder {
            seen: Rc::clone(&seen_ahead),
        })]);
        world.obstacles = vec![
            forced_obstacle(200.0, 100.0, false),
            forced_obstacle(650.0, 300.0, false),
        ];

        tick(&mut world);
        let obs = seen_ahead.borrow()[0];
        assert_eq!(obs.dist_to_gap_top, 251.5);
    }

    #[test]
    fn test_same_seed_replays_identically() {
        let cohort = || -> Vec<Box<dyn Controller>> {
            vec![
                Box::new(Flapper { period: 12, calls: 0 }),
                Box::new(Flapper { period: 20, calls: 0 }),
                Box::new(NeverJump),
            ]
        };

        let run = |seed: u64| {
            let mut world = World::new(Tuning::default(), seed).unwrap();
            for _ in 0..2 {
                world.begin_generation(cohort()).unwrap();
                while world.phase == Phase::Running && world.ticks < 5_000 {
                    tick(&mut world);
                }
                world.end_generation();
            }
            (world.ticks, world.score, world.results().to_vec())
        };

        assert_eq!(run(99), run(99));
    }

    #[test]
    fn test_tick_limit_credits_survivors() {
        let mut world = running_world(vec![Box::new(NeverJump), Box::new(NeverJump)]);

        while world.phase == Phase::Running && world.ticks < 10 {
            tick(&mut world);
        }
        assert_eq!(world.phase, Phase::Running);
        world.end_generation();

        assert_eq!(world.phase, Phase::GenerationOver);
        assert_close(world.results()[0], 1.0);
        assert_close(world.results()[1], 1.0);
    }
}

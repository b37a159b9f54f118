//! Flapsim entry point
//!
//! Runs a hill-climbing demonstration: each generation evaluates a population
//! of gap-following controllers with jittered biases, and the champion's bias
//! seeds the next population.

use std::env;
use std::path::Path;

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use flapsim::sim::{Phase, World, tick};
use flapsim::{Controller, GapFollower, Settings, SetupError};

fn main() {
    env_logger::init();

    let settings = match env::args().nth(1) {
        Some(path) => Settings::load(Path::new(&path)),
        None => Settings::default(),
    };
    log::info!(
        "flapsim starting: seed {}, {} generations of {} agents",
        settings.seed,
        settings.generations,
        settings.population
    );

    if let Err(err) = run(&settings) {
        log::error!("{err}");
        std::process::exit(1);
    }
}

fn run(settings: &Settings) -> Result<(), SetupError> {
    if settings.population == 0 {
        return Err(SetupError::EmptyCohort);
    }

    let mut world = World::new(settings.tuning.clone(), settings.seed)?;

    // Bias jitter draws from its own stream so course randomness and search
    // randomness never interleave.
    let mut search_rng = Pcg32::seed_from_u64(settings.seed.wrapping_mul(2654435761));

    let mut best_bias = 0.0_f32;
    let mut best_fitness = f32::NEG_INFINITY;

    for _ in 0..settings.generations {
        // The first slot re-runs the incumbent; the rest explore around it.
        let mut biases = Vec::with_capacity(settings.population);
        biases.push(best_bias);
        while biases.len() < settings.population {
            biases.push(best_bias + search_rng.random_range(-60.0_f32..60.0));
        }
        let controllers: Vec<Box<dyn Controller>> = biases
            .iter()
            .map(|&bias| Box::new(GapFollower::new(bias)) as Box<dyn Controller>)
            .collect();

        world.begin_generation(controllers)?;
        while world.phase == Phase::Running {
            tick(&mut world);
            if settings.tick_limit > 0 && world.ticks >= settings.tick_limit {
                log::info!("generation {} reached the tick limit", world.generation);
                break;
            }
        }
        world.end_generation();

        let champion = world
            .results()
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.partial_cmp(b.1).unwrap_or(std::cmp::Ordering::Equal));
        if let Some((idx, &fitness)) = champion {
            if fitness > best_fitness {
                best_fitness = fitness;
                best_bias = biases[idx];
            }
            log::info!(
                "generation {}: score {}, champion fitness {:.1} at bias {:+.1}, incumbent {:+.1}",
                world.generation,
                world.score,
                fitness,
                biases[idx],
                best_bias
            );
        }
    }

    log::info!(
        "search finished: bias {:+.1} with fitness {:.1} after {} generations",
        best_bias,
        best_fitness,
        settings.generations
    );
    Ok(())
}

//! Driver settings and preferences
//!
//! Persisted as a JSON file next to the binary; every field falls back to a
//! default so a missing or stale file never stops a run.

use std::fs;
use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::tuning::Tuning;

/// Everything the demo driver needs for a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Run seed; fixes gap draws and controller jitter
    pub seed: u64,
    /// Upper bound on generations per run
    pub generations: u32,
    /// Controllers per generation
    pub population: usize,
    /// Per-generation tick cap, 0 for unbounded
    pub tick_limit: u64,
    /// Simulation tunables handed to the world
    pub tuning: Tuning,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            seed: 42,
            generations: 50,
            population: 50,
            tick_limit: 10_000,
            tuning: Tuning::default(),
        }
    }
}

impl Settings {
    /// Load settings from a JSON file, falling back to defaults.
    pub fn load(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(json) => match serde_json::from_str(&json) {
                Ok(settings) => {
                    log::info!("Loaded settings from {}", path.display());
                    return settings;
                }
                Err(err) => {
                    log::warn!("Ignoring malformed settings {}: {err}", path.display());
                }
            },
            Err(err) if err.kind() == io::ErrorKind::NotFound => {}
            Err(err) => {
                log::warn!("Could not read settings {}: {err}", path.display());
            }
        }

        log::info!("Using default settings");
        Self::default()
    }

    /// Write settings back out as pretty JSON.
    pub fn save(&self, path: &Path) -> io::Result<()> {
        let json = serde_json::to_string_pretty(self).map_err(io::Error::other)?;
        fs::write(path, json)?;
        log::info!("Settings saved to {}", path.display());
        Ok(())
    }
}

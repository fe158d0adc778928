// src/config.rs
//
// Central configuration for the decision core. Everything is a code default;
// there is no config file. `deterministic()` pins the pieces that would
// otherwise consume randomness, for tests and reproducible harness runs.

use crate::types::MotionState;

/// Replay buffer parameters.
#[derive(Debug, Clone)]
pub struct ReplayConfig {
    /// Bounded capacity C; oldest transitions are evicted FIFO past this.
    pub capacity: usize,
    /// Sampling skew exponent: probability ∝ priority^alpha. 0 = uniform.
    pub alpha: f64,
    /// Update reshaping exponent: stored priority becomes p^beta on update.
    pub beta: f64,
}

impl Default for ReplayConfig {
    fn default() -> Self {
        Self {
            capacity: 1000,
            alpha: 0.6,
            beta: 0.4,
        }
    }
}

/// Top-level configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub replay: ReplayConfig,
    /// Number of independent policy queries in a suggest-plan call.
    pub plan_horizon: usize,
    /// Safety guard for the episode harness: stop stepping after this many
    /// steps even if the day-end signal never fires.
    pub max_steps_per_episode: usize,
    /// Fallback place when `location_for_state` has no mapping.
    pub default_location: String,
    /// Fallback initial motion state.
    pub initial_state: MotionState,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            replay: ReplayConfig::default(),
            plan_horizon: 10,
            max_steps_per_episode: 64,
            default_location: "Akhenaten Museum".to_string(),
            initial_state: MotionState::Still,
        }
    }
}

impl Config {
    /// Config suitable for deterministic tests: uniform replay sampling and
    /// no priority reshaping.
    pub fn deterministic() -> Self {
        Self {
            replay: ReplayConfig {
                capacity: 1000,
                alpha: 0.0,
                beta: 1.0,
            },
            ..Self::default()
        }
    }
}

// src/policy.rs
//
// Action-selection seam. The actual learner (the original used an external
// PPO model) lives behind this trait; the core only needs "observation in,
// action index out". Policies may return indices outside the current action
// space; the decision loop reduces them modulo the activity count before use.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::env::Observation;

pub const UNIFORM_POLICY_VERSION: &str = "uniform-v1";
pub const FIXED_POLICY_VERSION: &str = "fixed-v1";

/// Interface for all action selectors.
pub trait Policy {
    /// Stable version string for this policy implementation.
    fn version(&self) -> &str;

    /// Select one action index for the given observation.
    ///
    /// `action_space` is the number of activities at the observation's
    /// location. Implementations need not stay within it.
    fn select(&mut self, obs: &Observation, action_space: usize) -> usize;

    /// Reset internal state for a new episode; the seed makes selection
    /// sequences reproducible.
    fn reset_episode(&mut self, seed: u64);
}

/// Uniform random selector over the current action space (seeded).
pub struct UniformPolicy {
    rng: ChaCha8Rng,
}

impl UniformPolicy {
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }
}

impl Policy for UniformPolicy {
    fn version(&self) -> &str {
        UNIFORM_POLICY_VERSION
    }

    fn select(&mut self, _obs: &Observation, action_space: usize) -> usize {
        if action_space == 0 {
            return 0;
        }
        self.rng.gen_range(0..action_space)
    }

    fn reset_episode(&mut self, seed: u64) {
        self.rng = ChaCha8Rng::seed_from_u64(seed);
    }
}

/// Always selects the same raw index. Useful for tests and as a degenerate
/// baseline; the index is deliberately not clamped to the action space.
pub struct FixedPolicy {
    index: usize,
}

impl FixedPolicy {
    pub fn new(index: usize) -> Self {
        Self { index }
    }
}

impl Policy for FixedPolicy {
    fn version(&self) -> &str {
        FIXED_POLICY_VERSION
    }

    fn select(&mut self, _obs: &Observation, _action_space: usize) -> usize {
        self.index
    }

    fn reset_episode(&mut self, _seed: u64) {}
}

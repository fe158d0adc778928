// src/env/mod.rs
//
// Environment machinery for the decision core:
// - Observation: versioned (state, location) encoding over fixed vocabularies
// - ExperienceReplayBuffer: bounded, priority-weighted transition memory
// - ActivityEnv: reset/anchor/step episode simulation

pub mod activity_env;
pub mod observation;
pub mod replay;

pub use activity_env::{calculate_reward, ActivityEnv, StepInfo, StepResult};
pub use observation::{Observation, ObservationEncoder, Vocab, OBS_VERSION};
pub use replay::{ExperienceReplayBuffer, Sampled, INITIAL_PRIORITY};

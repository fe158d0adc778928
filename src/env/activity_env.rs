// src/env/activity_env.rs
//
// Gym-style activity environment: one user-facing decision episode as a
// finite-step interaction.
//
// - reset() -> observation (re-derived from the store, idempotent)
// - anchor(state, location) -> observation (explicit orchestrator override)
// - step(action) -> (observation, reward, done, info)
//
// The environment holds no episode history and no terminal latch: `done` is
// advisory, and a step after done=true runs like any other. The action space
// is location-relative and is rebuilt from the store on every location
// change; an index that was valid at the previous location means nothing at
// the current one.

use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::error::{CoreError, CoreResult};
use crate::store::StoreGateway;
use crate::types::{ActivityId, ActivityRef, FeedbackRecord, Location, MotionState, Transition};

use super::observation::{Observation, ObservationEncoder, Vocab};
use super::replay::{ExperienceReplayBuffer, INITIAL_PRIORITY};

/// Binary reward from raw user feedback: +1 for acceptance, −1 otherwise.
/// A pure function of the feedback value alone; the chosen action plays no
/// part in it.
pub fn calculate_reward(feedback: &str) -> f64 {
    if feedback == "Yes" {
        1.0
    } else {
        -1.0
    }
}

/// Result of a single environment step.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepResult {
    /// The observation after taking the action.
    pub observation: Observation,
    /// The reward for this step.
    pub reward: f64,
    /// Advisory episode-termination signal from the store.
    pub done: bool,
    /// Side-channel diagnostics about the step.
    pub info: StepInfo,
}

/// Diagnostics returned from a step.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepInfo {
    /// The activity the action index resolved to.
    pub activity_id: ActivityId,
    pub activity_name: String,
    /// Motion state after the transition.
    pub state: MotionState,
    /// Location after the transition.
    pub location: Location,
    /// Size of the action space at the new location.
    pub action_space: usize,
}

/// Stateful simulation of "what happens when an action is taken".
pub struct ActivityEnv<S: StoreGateway> {
    store: S,
    buffer: ExperienceReplayBuffer,
    encoder: ObservationEncoder,
    current_state: MotionState,
    current_location: Location,
    current_observation: Observation,
    /// Ordered activities at `current_location`; defines the action space.
    action_space: Vec<ActivityRef>,
}

impl<S: StoreGateway> ActivityEnv<S> {
    /// Construct the environment, snapshotting the location vocabulary from
    /// the store. The vocabulary stays fixed for this instance's lifetime;
    /// locations added to the store later are unknown to the encoder.
    pub fn new(store: S, cfg: &Config) -> CoreResult<Self> {
        Self::with_seed(store, cfg, 0)
    }

    pub fn with_seed(store: S, cfg: &Config, seed: u64) -> CoreResult<Self> {
        let locations = store.known_locations()?;
        let encoder = ObservationEncoder::new(Vocab::new(locations));
        let buffer = ExperienceReplayBuffer::with_seed(&cfg.replay, seed);

        let mut env = Self {
            store,
            buffer,
            encoder,
            current_state: cfg.initial_state,
            current_location: String::new(),
            current_observation: Observation {
                obs_version: super::observation::OBS_VERSION,
                state_code: 0,
                location_code: 0,
            },
            action_space: Vec::new(),
        };
        env.reset()?;
        Ok(env)
    }

    /// Reset to the store's designated initial (state, location).
    ///
    /// Idempotent: fully re-derives state from the store, accumulating no
    /// episode history.
    pub fn reset(&mut self) -> CoreResult<Observation> {
        let state = self.store.initial_state();
        let location = self.store.initial_location()?;
        self.rebind(state, location)
    }

    /// Explicitly re-anchor to a caller-supplied (state, location) pair,
    /// bypassing the store-derived defaults. Used by the decision loop for
    /// recommend/suggest requests.
    pub fn anchor(&mut self, state: MotionState, location: &str) -> CoreResult<Observation> {
        self.rebind(state, location.to_string())
    }

    fn rebind(&mut self, state: MotionState, location: Location) -> CoreResult<Observation> {
        let observation = self.encoder.encode(state, &location)?;
        self.current_state = state;
        self.current_location = location;
        self.current_observation = observation;
        self.recompute_action_space()?;
        Ok(observation)
    }

    /// Rebuild the action space from the store for the current location.
    /// Mandatory on every location change.
    fn recompute_action_space(&mut self) -> CoreResult<()> {
        self.action_space = self.store.activities_at(&self.current_location)?;
        Ok(())
    }

    /// Take one step with an action index valid for the current location.
    ///
    /// Out-of-range indices are rejected, not wrapped; callers that receive
    /// raw policy output must reduce it modulo `action_space_len` first.
    pub fn step(&mut self, action: usize) -> CoreResult<StepResult> {
        if self.action_space.is_empty() {
            return Err(CoreError::EmptyActionSpace {
                location: self.current_location.clone(),
            });
        }
        if action >= self.action_space.len() {
            return Err(CoreError::invalid_argument(
                "action",
                &format!(
                    "{} out of range for '{}' ({} activities)",
                    action,
                    self.current_location,
                    self.action_space.len()
                ),
            ));
        }

        // Feedback is keyed by the resolved activity, not the raw index.
        let activity = self.action_space[action].clone();
        let feedback = self
            .store
            .feedback_for(activity.id)?
            .ok_or_else(|| CoreError::not_found(format!("feedback for activity {}", activity.id)))?;

        let reward = calculate_reward(&feedback);
        let next_state = self.store.next_state(&feedback, self.current_state);
        let done = self.store.day_ends();

        self.buffer.add(Transition {
            state: self.current_state,
            action,
            reward,
            next_state,
            done,
            priority: INITIAL_PRIORITY,
        });

        // Advance: the new location is derived from the new state, and the
        // action space must be rebuilt before any further action is accepted.
        self.current_state = next_state;
        self.current_location = self.store.location_for_state(next_state)?;
        self.recompute_action_space()?;
        self.current_observation = self
            .encoder
            .encode(self.current_state, &self.current_location)?;

        let snapshot = serde_json::to_string(&[
            self.current_observation.state_code,
            self.current_observation.location_code,
        ])
        .unwrap_or_default();
        self.store.record_feedback(&FeedbackRecord {
            state: self.current_state,
            activity_id: activity.id,
            feedback: feedback.clone(),
            reward: Some(reward),
            observation: Some(snapshot),
        })?;

        Ok(StepResult {
            observation: self.current_observation,
            reward,
            done,
            info: StepInfo {
                activity_id: activity.id,
                activity_name: activity.name,
                state: self.current_state,
                location: self.current_location.clone(),
                action_space: self.action_space.len(),
            },
        })
    }

    pub fn current_state(&self) -> MotionState {
        self.current_state
    }

    pub fn current_location(&self) -> &str {
        &self.current_location
    }

    pub fn observation(&self) -> Observation {
        self.current_observation
    }

    /// Ordered activities defining the current action space.
    pub fn activities(&self) -> &[ActivityRef] {
        &self.action_space
    }

    pub fn action_space_len(&self) -> usize {
        self.action_space.len()
    }

    pub fn encoder(&self) -> &ObservationEncoder {
        &self.encoder
    }

    pub fn buffer(&self) -> &ExperienceReplayBuffer {
        &self.buffer
    }

    pub fn buffer_mut(&mut self) -> &mut ExperienceReplayBuffer {
        &mut self.buffer
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reward_is_pure_in_feedback() {
        assert_eq!(calculate_reward("Yes"), 1.0);
        assert_eq!(calculate_reward("No"), -1.0);
        assert_eq!(calculate_reward("maybe"), -1.0);
        assert_eq!(calculate_reward(""), -1.0);
    }
}

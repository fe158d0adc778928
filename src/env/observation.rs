// src/env/observation.rs
//
// Versioned observation schema and the fixed label vocabularies behind it.
//
// Design requirements:
// - Versioned (obs_version field) for schema evolution
// - Serializable (serde) for feedback snapshots and telemetry
// - Deterministic code assignment: codes are indices into the canonical
//   sorted label list, fixed at environment construction. The same vocabulary
//   is shared with the retraining step so training-time and inference-time
//   location codes can never drift apart.
// - Closed: encoding a label outside the vocabulary fails, it never mints a
//   new code mid-episode.

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::types::MotionState;

/// Current observation schema version.
/// Increment when adding/removing/changing fields.
pub const OBS_VERSION: u32 = 1;

/// Immutable, canonically sorted label vocabulary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vocab {
    labels: Vec<String>,
}

impl Vocab {
    /// Build a vocabulary from arbitrary labels: sorted, deduplicated.
    /// Code assignment is the index into the sorted list.
    pub fn new(labels: impl IntoIterator<Item = String>) -> Self {
        let mut labels: Vec<String> = labels.into_iter().collect();
        labels.sort();
        labels.dedup();
        Self { labels }
    }

    /// The fixed motion-state vocabulary (all six labels).
    pub fn motion_states() -> Self {
        Self::new(MotionState::ALL.iter().map(|s| s.as_str().to_string()))
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Code for a label, if it belongs to the vocabulary.
    pub fn code(&self, label: &str) -> Option<u32> {
        self.labels
            .binary_search_by(|l| l.as_str().cmp(label))
            .ok()
            .map(|i| i as u32)
    }

    /// Label for a code, if in range.
    pub fn label(&self, code: u32) -> Option<&str> {
        self.labels.get(code as usize).map(|s| s.as_str())
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }
}

/// The 2-component encoded (state, location) vector fed to the policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Observation {
    pub obs_version: u32,
    pub state_code: u32,
    pub location_code: u32,
}

/// Encoder over the two fixed vocabularies bound at environment construction.
#[derive(Debug, Clone)]
pub struct ObservationEncoder {
    states: Vocab,
    locations: Vocab,
}

impl ObservationEncoder {
    pub fn new(locations: Vocab) -> Self {
        Self {
            states: Vocab::motion_states(),
            locations,
        }
    }

    pub fn locations(&self) -> &Vocab {
        &self.locations
    }

    /// Encode a (state, location) pair.
    ///
    /// Fails with an encoding error if the location is outside the fixed
    /// vocabulary. The state vocabulary covers every `MotionState` variant,
    /// so the state lookup cannot miss, but it goes through the same closed
    /// path rather than assuming so.
    pub fn encode(&self, state: MotionState, location: &str) -> CoreResult<Observation> {
        let state_code = self
            .states
            .code(state.as_str())
            .ok_or_else(|| CoreError::Encoding {
                kind: "state",
                label: state.as_str().to_string(),
            })?;
        let location_code = self
            .locations
            .code(location)
            .ok_or_else(|| CoreError::Encoding {
                kind: "location",
                label: location.to_string(),
            })?;
        Ok(Observation {
            obs_version: OBS_VERSION,
            state_code,
            location_code,
        })
    }

    /// Decode an observation back to its labels via the same mappings.
    pub fn decode(&self, obs: &Observation) -> CoreResult<(MotionState, String)> {
        let state_label = self
            .states
            .label(obs.state_code)
            .ok_or_else(|| CoreError::Encoding {
                kind: "state",
                label: format!("code {}", obs.state_code),
            })?;
        let location = self
            .locations
            .label(obs.location_code)
            .ok_or_else(|| CoreError::Encoding {
                kind: "location",
                label: format!("code {}", obs.location_code),
            })?;
        Ok((MotionState::parse_or_still(state_label), location.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encoder() -> ObservationEncoder {
        ObservationEncoder::new(Vocab::new(
            ["Park", "Gym", "Akhenaten Museum"]
                .into_iter()
                .map(String::from),
        ))
    }

    #[test]
    fn vocab_codes_are_sorted_indices() {
        let v = Vocab::new(["b", "a", "c", "a"].into_iter().map(String::from));
        assert_eq!(v.len(), 3);
        assert_eq!(v.code("a"), Some(0));
        assert_eq!(v.code("b"), Some(1));
        assert_eq!(v.code("c"), Some(2));
        assert_eq!(v.code("d"), None);
        assert_eq!(v.label(1), Some("b"));
    }

    #[test]
    fn encode_decode_round_trip() {
        let enc = encoder();
        for state in MotionState::ALL {
            for loc in enc.locations().labels().to_vec() {
                let obs = enc.encode(state, &loc).unwrap();
                assert_eq!(obs.obs_version, OBS_VERSION);
                let (s, l) = enc.decode(&obs).unwrap();
                assert_eq!(s, state);
                assert_eq!(l, loc);
            }
        }
    }

    #[test]
    fn unknown_location_is_an_error_not_a_new_code() {
        let enc = encoder();
        let err = enc.encode(MotionState::Still, "Mars Base").unwrap_err();
        assert!(matches!(err, CoreError::Encoding { kind: "location", .. }));
        // The vocabulary is unchanged afterwards.
        assert_eq!(enc.locations().len(), 3);
    }

    #[test]
    fn codes_stable_regardless_of_insertion_order() {
        let a = Vocab::new(["Park", "Gym"].into_iter().map(String::from));
        let b = Vocab::new(["Gym", "Park"].into_iter().map(String::from));
        assert_eq!(a, b);
    }
}

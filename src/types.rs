// src/types.rs
//
// Common shared types for the routina decision core.

use serde::{Deserialize, Serialize};

/// Identifier of a persisted activity row.
pub type ActivityId = i64;

/// Place identifier. Locations are plain display names; the canonical
/// set is whatever the store reports at environment construction time.
pub type Location = String;

/// User motion state as reported by the device activity-recognition layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MotionState {
    InVehicle,
    OnBicycle,
    Running,
    Still,
    Walking,
    Unknown,
}

impl MotionState {
    /// All six states, in declaration order.
    pub const ALL: [MotionState; 6] = [
        MotionState::InVehicle,
        MotionState::OnBicycle,
        MotionState::Running,
        MotionState::Still,
        MotionState::Walking,
        MotionState::Unknown,
    ];

    /// Wire/storage label for this state.
    pub fn as_str(&self) -> &'static str {
        match self {
            MotionState::InVehicle => "IN_VEHICLE",
            MotionState::OnBicycle => "ON_BICYCLE",
            MotionState::Running => "RUNNING",
            MotionState::Still => "STILL",
            MotionState::Walking => "WALKING",
            MotionState::Unknown => "UNKNOWN",
        }
    }

    /// Parse a wire label. Unrecognized input maps to `Still`, which is the
    /// documented fallback for malformed device reports.
    pub fn parse_or_still(s: &str) -> MotionState {
        match s.trim() {
            "IN_VEHICLE" => MotionState::InVehicle,
            "ON_BICYCLE" => MotionState::OnBicycle,
            "RUNNING" => MotionState::Running,
            "STILL" => MotionState::Still,
            "WALKING" => MotionState::Walking,
            "UNKNOWN" => MotionState::Unknown,
            _ => MotionState::Still,
        }
    }

    /// Default successor in the fixed daily cycle:
    /// IN_VEHICLE → ON_BICYCLE → RUNNING → STILL → WALKING → UNKNOWN → IN_VEHICLE.
    ///
    /// Store implementations may override this via `StoreGateway::next_state`;
    /// the environment never assumes the returned state came from this cycle.
    pub fn successor(&self) -> MotionState {
        match self {
            MotionState::InVehicle => MotionState::OnBicycle,
            MotionState::OnBicycle => MotionState::Running,
            MotionState::Running => MotionState::Still,
            MotionState::Still => MotionState::Walking,
            MotionState::Walking => MotionState::Unknown,
            MotionState::Unknown => MotionState::InVehicle,
        }
    }
}

/// One activity as exposed by the store for action selection:
/// identity plus display name, in the store's query order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityRef {
    pub id: ActivityId,
    pub name: String,
}

/// Full persisted activity row (owned by the store; immutable from the core).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityRow {
    pub id: ActivityId,
    pub name: String,
    pub place_name: String,
    pub duration_min: f64,
    pub latitude: f64,
    pub longitude: f64,
    pub date: String,
}

/// One recorded environment transition.
///
/// Immutable after insertion into the replay buffer, except for `priority`,
/// which `update_priorities` may rewrite.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transition {
    pub state: MotionState,
    pub action: usize,
    pub reward: f64,
    pub next_state: MotionState,
    pub done: bool,
    /// Replay sampling weight. Fresh transitions enter at 1.0.
    pub priority: f64,
}

/// Append-only feedback record as persisted through the store gateway.
///
/// The environment's own step path fills `reward` and `observation`; the raw
/// ingestion path (`DecisionLoop::record_feedback`) persists the caller's
/// values verbatim and leaves both empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackRecord {
    pub state: MotionState,
    pub activity_id: ActivityId,
    pub feedback: String,
    pub reward: Option<f64>,
    pub observation: Option<String>,
}

/// One row of the feedback × activities × actions join used for retraining.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingRow {
    pub place_name: String,
    pub feedback: String,
    pub reward: Option<f64>,
    pub action: usize,
}

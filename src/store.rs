// src/store.rs
//
// Store gateway seam: the capability surface the decision core consumes.
//
// The core never talks to a database directly. Everything it needs from
// persistence is behind the `StoreGateway` trait, with `MemoryStore` as the
// in-process implementation (tests, demo harness). A journal can be attached
// to persist the append-only feedback/action log (see journal.rs).

use crate::error::{CoreError, CoreResult};
use crate::journal::{JournalRecord, JournalWriter};
use crate::types::{
    ActivityId, ActivityRef, ActivityRow, FeedbackRecord, Location, MotionState, TrainingRow,
};

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Pluggable episode-termination predicate.
///
/// The original "day ends" signal was an unconditional coin flip; keeping it
/// behind a trait lets tests pin termination deterministically.
pub trait DayEndPolicy: Send {
    fn day_ends(&mut self) -> bool;
}

/// The day never ends (termination driven by the caller's step budget).
pub struct NeverEnds;

impl DayEndPolicy for NeverEnds {
    fn day_ends(&mut self) -> bool {
        false
    }
}

/// Every step ends the day (single-step episodes).
pub struct AlwaysEnds;

impl DayEndPolicy for AlwaysEnds {
    fn day_ends(&mut self) -> bool {
        true
    }
}

/// The day ends on every n-th query.
pub struct EveryNSteps {
    n: usize,
    count: usize,
}

impl EveryNSteps {
    pub fn new(n: usize) -> Self {
        Self { n: n.max(1), count: 0 }
    }
}

impl DayEndPolicy for EveryNSteps {
    fn day_ends(&mut self) -> bool {
        self.count += 1;
        self.count % self.n == 0
    }
}

/// Seeded fair coin, reproducing the original stochastic signal while
/// staying reproducible under a fixed seed.
pub struct CoinFlip {
    rng: ChaCha8Rng,
}

impl CoinFlip {
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }
}

impl DayEndPolicy for CoinFlip {
    fn day_ends(&mut self) -> bool {
        self.rng.gen()
    }
}

/// Capability interface over persisted activities, feedback and actions.
///
/// Failures propagate as `CoreError::Store`; the core neither retries nor
/// masks them.
pub trait StoreGateway {
    /// Designated initial motion state for a fresh episode.
    fn initial_state(&self) -> MotionState;

    /// Designated initial location for a fresh episode.
    fn initial_location(&self) -> CoreResult<Location>;

    /// Distinct locations known at this point in time. The environment snapshots
    /// these into its fixed vocabulary at construction.
    fn known_locations(&self) -> CoreResult<Vec<Location>>;

    /// Ordered activities available at a location. Order defines the action
    /// index space for that location.
    fn activities_at(&self, location: &str) -> CoreResult<Vec<ActivityRef>>;

    /// Most recent raw feedback value recorded for an activity, if any.
    fn feedback_for(&self, activity_id: ActivityId) -> CoreResult<Option<String>>;

    /// Next motion state given feedback and the current state.
    ///
    /// The default is the fixed daily cycle; implementations may return any
    /// state, feedback-conditioned or not.
    fn next_state(&self, feedback: &str, current: MotionState) -> MotionState {
        let _ = feedback;
        current.successor()
    }

    /// Advisory episode-termination signal.
    fn day_ends(&mut self) -> bool;

    /// Location associated with a motion state, falling back to the store's
    /// configured default when unmapped.
    fn location_for_state(&self, state: MotionState) -> CoreResult<Location>;

    /// Append one feedback record. Append-only; never mutated afterwards.
    fn record_feedback(&mut self, record: &FeedbackRecord) -> CoreResult<()>;

    /// Append one chosen-action record.
    fn record_action(&mut self, action: usize, activity_id: ActivityId) -> CoreResult<()>;

    /// Display name for an activity, if it exists.
    fn activity_name(&self, activity_id: ActivityId) -> CoreResult<Option<String>>;

    /// Full feedback × activities × actions join for the retraining step.
    fn training_rows(&self) -> CoreResult<Vec<TrainingRow>>;
}

/// In-memory store implementation.
///
/// Tables mirror the persistent schema: an activities table plus append-only
/// feedback and action logs. Optionally journals appended rows to disk.
pub struct MemoryStore {
    activities: Vec<ActivityRow>,
    feedback: Vec<FeedbackRecord>,
    actions: Vec<(usize, ActivityId)>,
    day_end: Box<dyn DayEndPolicy>,
    default_location: String,
    initial_state: MotionState,
    journal: Option<JournalWriter>,
}

impl MemoryStore {
    pub fn new(activities: Vec<ActivityRow>) -> Self {
        Self {
            activities,
            feedback: Vec::new(),
            actions: Vec::new(),
            day_end: Box::new(CoinFlip::seeded(0)),
            default_location: "Akhenaten Museum".to_string(),
            initial_state: MotionState::Still,
            journal: None,
        }
    }

    /// Replace the termination policy (builder style).
    pub fn with_day_end(mut self, policy: Box<dyn DayEndPolicy>) -> Self {
        self.day_end = policy;
        self
    }

    pub fn with_default_location(mut self, location: &str) -> Self {
        self.default_location = location.to_string();
        self
    }

    /// Attach a journal; every appended feedback/action row is also written
    /// through to it.
    pub fn with_journal(mut self, journal: JournalWriter) -> Self {
        self.journal = Some(journal);
        self
    }

    /// Pre-load feedback rows (demo/bootstrap data).
    pub fn seed_feedback(&mut self, rows: Vec<FeedbackRecord>) {
        self.feedback.extend(rows);
    }

    /// Persisted feedback rows, oldest first.
    pub fn feedback_rows(&self) -> &[FeedbackRecord] {
        &self.feedback
    }

    /// Persisted (action, activity_id) rows, oldest first.
    pub fn action_rows(&self) -> &[(usize, ActivityId)] {
        &self.actions
    }

    /// Apply one journal record to the in-memory tables (journal replay).
    pub fn apply(&mut self, record: JournalRecord) {
        match record {
            JournalRecord::Feedback(rec) => self.feedback.push(rec),
            JournalRecord::Action { action, activity_id } => {
                self.actions.push((action, activity_id))
            }
        }
    }

    /// Demo dataset: a handful of activities across three places, with
    /// bootstrap feedback so retraining has rows to fit on.
    pub fn with_sample_data() -> Self {
        let activities = vec![
            ActivityRow {
                id: 1,
                name: "Morning jog".into(),
                place_name: "Park".into(),
                duration_min: 30.0,
                latitude: 27.18,
                longitude: 31.19,
                date: "2024-05-01".into(),
            },
            ActivityRow {
                id: 2,
                name: "Picnic".into(),
                place_name: "Park".into(),
                duration_min: 90.0,
                latitude: 27.18,
                longitude: 31.19,
                date: "2024-05-02".into(),
            },
            ActivityRow {
                id: 3,
                name: "Bird watching".into(),
                place_name: "Park".into(),
                duration_min: 45.0,
                latitude: 27.18,
                longitude: 31.19,
                date: "2024-05-03".into(),
            },
            ActivityRow {
                id: 4,
                name: "Guided tour".into(),
                place_name: "Akhenaten Museum".into(),
                duration_min: 60.0,
                latitude: 27.19,
                longitude: 31.18,
                date: "2024-05-01".into(),
            },
            ActivityRow {
                id: 5,
                name: "Sketching session".into(),
                place_name: "Akhenaten Museum".into(),
                duration_min: 40.0,
                latitude: 27.19,
                longitude: 31.18,
                date: "2024-05-04".into(),
            },
            ActivityRow {
                id: 6,
                name: "Evening walk".into(),
                place_name: "Corniche".into(),
                duration_min: 25.0,
                latitude: 27.17,
                longitude: 31.20,
                date: "2024-05-02".into(),
            },
        ];
        let mut store = Self::new(activities);
        store.seed_feedback(vec![
            FeedbackRecord {
                state: MotionState::InVehicle,
                activity_id: 1,
                feedback: "Yes".into(),
                reward: Some(1.0),
                observation: None,
            },
            FeedbackRecord {
                state: MotionState::OnBicycle,
                activity_id: 2,
                feedback: "No".into(),
                reward: Some(-1.0),
                observation: None,
            },
            FeedbackRecord {
                state: MotionState::Running,
                activity_id: 3,
                feedback: "Yes".into(),
                reward: Some(1.0),
                observation: None,
            },
            FeedbackRecord {
                state: MotionState::Still,
                activity_id: 4,
                feedback: "No".into(),
                reward: Some(-1.0),
                observation: None,
            },
            FeedbackRecord {
                state: MotionState::Walking,
                activity_id: 5,
                feedback: "Yes".into(),
                reward: Some(1.0),
                observation: None,
            },
        ]);
        store.actions.push((0, 5));
        store
    }
}

impl StoreGateway for MemoryStore {
    fn initial_state(&self) -> MotionState {
        self.initial_state
    }

    fn initial_location(&self) -> CoreResult<Location> {
        self.activities
            .first()
            .map(|a| a.place_name.clone())
            .ok_or_else(|| CoreError::store("initial_location", "activities table is empty"))
    }

    fn known_locations(&self) -> CoreResult<Vec<Location>> {
        let mut locations: Vec<Location> = self
            .activities
            .iter()
            .map(|a| a.place_name.clone())
            .collect();
        locations.sort();
        locations.dedup();
        Ok(locations)
    }

    fn activities_at(&self, location: &str) -> CoreResult<Vec<ActivityRef>> {
        Ok(self
            .activities
            .iter()
            .filter(|a| a.place_name == location)
            .map(|a| ActivityRef {
                id: a.id,
                name: a.name.clone(),
            })
            .collect())
    }

    fn feedback_for(&self, activity_id: ActivityId) -> CoreResult<Option<String>> {
        Ok(self
            .feedback
            .iter()
            .rev()
            .find(|f| f.activity_id == activity_id)
            .map(|f| f.feedback.clone()))
    }

    fn day_ends(&mut self) -> bool {
        self.day_end.day_ends()
    }

    fn location_for_state(&self, state: MotionState) -> CoreResult<Location> {
        for f in &self.feedback {
            if f.state == state {
                if let Some(a) = self.activities.iter().find(|a| a.id == f.activity_id) {
                    return Ok(a.place_name.clone());
                }
            }
        }
        Ok(self.default_location.clone())
    }

    fn record_feedback(&mut self, record: &FeedbackRecord) -> CoreResult<()> {
        self.feedback.push(record.clone());
        if let Some(journal) = &mut self.journal {
            journal
                .append(&JournalRecord::Feedback(record.clone()))
                .map_err(|e| CoreError::store("record_feedback", e.to_string()))?;
        }
        Ok(())
    }

    fn record_action(&mut self, action: usize, activity_id: ActivityId) -> CoreResult<()> {
        self.actions.push((action, activity_id));
        if let Some(journal) = &mut self.journal {
            journal
                .append(&JournalRecord::Action {
                    action,
                    activity_id,
                })
                .map_err(|e| CoreError::store("record_action", e.to_string()))?;
        }
        Ok(())
    }

    fn activity_name(&self, activity_id: ActivityId) -> CoreResult<Option<String>> {
        Ok(self
            .activities
            .iter()
            .find(|a| a.id == activity_id)
            .map(|a| a.name.clone()))
    }

    fn training_rows(&self) -> CoreResult<Vec<TrainingRow>> {
        let mut rows = Vec::new();
        for f in &self.feedback {
            let Some(activity) = self.activities.iter().find(|a| a.id == f.activity_id) else {
                continue;
            };
            for &(action, activity_id) in &self.actions {
                if activity_id == f.activity_id {
                    rows.push(TrainingRow {
                        place_name: activity.place_name.clone(),
                        feedback: f.feedback.clone(),
                        reward: f.reward,
                        action,
                    });
                }
            }
        }
        Ok(rows)
    }
}

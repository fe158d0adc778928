//! Routina core library.
//!
//! This crate implements the sequential decision loop behind a daily-activity
//! recommender: the environment that turns a (motion state, location) pair
//! into an observation, the action/feedback/reward cycle, and the prioritized
//! experience buffer that stores transitions for learning. The binary
//! (`src/main.rs`) is a thin research harness around these components.
//!
//! # Architecture
//!
//! - **Store Gateway** (`store`): capability trait over persisted activities,
//!   feedback and actions. The core consumes it, never implements storage
//!   policy of its own; `MemoryStore` is the in-process implementation.
//!
//! - **Environment** (`env`): `ActivityEnv` with Gym-style reset/step,
//!   closed-vocabulary observation encoding, and the prioritized FIFO
//!   `ExperienceReplayBuffer`.
//!
//! - **Policy** (`policy`): trait seam for the external action selector.
//!
//! - **Decision Loop** (`decision`): binds one caller request
//!   (recommend-one, record-feedback, suggest-plan) to one environment
//!   interaction. Session-scoped; owns no persistent state.
//!
//! - **Retraining** (`scorer`): rebuilds a feedback-class scorer from the
//!   store's joined history, sharing the canonical location encoding with
//!   the observation encoder.
//!
//! Concurrency model: single-threaded, synchronous, one request at a time
//! per environment instance. Sharing an environment across threads requires
//! external serialization.

pub mod config;
pub mod decision;
pub mod env;
pub mod error;
pub mod journal;
pub mod policy;
pub mod scorer;
pub mod store;
pub mod telemetry;
pub mod types;

pub use config::{Config, ReplayConfig};
pub use decision::{DecisionLoop, FeedbackAck, Recommendation};
pub use env::{
    calculate_reward, ActivityEnv, ExperienceReplayBuffer, Observation, ObservationEncoder,
    Sampled, StepInfo, StepResult, Vocab, INITIAL_PRIORITY, OBS_VERSION,
};
pub use error::{CoreError, CoreResult};
pub use journal::{read_journal, JournalRecord, JournalWriter};
pub use policy::{FixedPolicy, Policy, UniformPolicy};
pub use scorer::FeedbackModel;
pub use store::{
    AlwaysEnds, CoinFlip, DayEndPolicy, EveryNSteps, MemoryStore, NeverEnds, StoreGateway,
};
pub use telemetry::{FileSink, NoopSink, StepSink};

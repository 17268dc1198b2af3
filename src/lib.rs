//! Mindspan - On-device assessment engine for adaptive cognitive batteries
//!
//! Mindspan administers a short battery of cognitive micro-tests to one
//! participant and turns raw timed responses into a classified result
//! record through a deterministic pipeline: stimulus presentation →
//! response scoring → feature aggregation → classification.
//!
//! ## Modules
//!
//! - **Battery**: the visual recognition, adaptive digit span, and
//!   sustained-attention state machines
//! - **Session**: the orchestrator that sequences the battery, owns the
//!   timers, and hands off the finalized record
//! - **Classifier**: the weighted-vote and domain-average strategies
//!
//! The engine renders nothing and reads no clock: the surrounding
//! application presents stimuli, captures input, and feeds monotonic
//! milliseconds into [`AssessmentSession`].

pub mod battery;
pub mod classifier;
pub mod cohort;
pub mod dataset;
pub mod error;
pub mod features;
pub mod record;
pub mod scheduler;
pub mod scoring;
pub mod session;
pub mod stimulus;
pub mod types;

pub use classifier::{Classifier, DomainAverageClassifier, WeightedVoteClassifier};
pub use error::AssessError;
pub use record::ResultRecordBuilder;
pub use session::{
    AssessmentSession, ClassifierStrategy, SessionConfig, SessionPhase, SessionView,
};
pub use types::{
    DomainScore, EducationLevel, FeatureVector, MemoryCategory, ParticipantProfile,
    PredictionResult, ResultRecord, TrialEvent,
};

/// Engine version embedded in produced records and CLI output
pub const ENGINE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Producer name for provenance
pub const PRODUCER_NAME: &str = "mindspan";

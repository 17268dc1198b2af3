//! Core types for the Mindspan assessment engine
//!
//! This module defines the data structures that flow through a session:
//! participant profiles, trial-level events, per-domain scores, the
//! classifier feature vector, and the finalized result record handed to
//! the persistence collaborator.

use crate::error::AssessError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Minimum participant age accepted at intake
pub const MIN_AGE: u8 = 18;

/// Maximum participant age accepted at intake
pub const MAX_AGE: u8 = 85;

/// Highest completed education level of a participant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EducationLevel {
    Basic,
    Medium,
    Superior,
}

impl EducationLevel {
    /// Numeric form used by the classifiers (1-3)
    pub fn as_numeric(&self) -> f64 {
        match self {
            EducationLevel::Basic => 1.0,
            EducationLevel::Medium => 2.0,
            EducationLevel::Superior => 3.0,
        }
    }
}

/// Participant identity and demographics, captured once at intake.
///
/// Immutable after construction; demographic fields feed the classifier
/// feature vector.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParticipantProfile {
    /// Participant identifier (initials, code, or generated id)
    pub participant_id: String,
    /// Age in years, within [18, 85]
    pub age: u8,
    /// Highest completed education level
    pub education: EducationLevel,
}

impl ParticipantProfile {
    /// Create a validated profile. Age outside [18, 85] is rejected.
    pub fn new(
        participant_id: impl Into<String>,
        age: u8,
        education: EducationLevel,
    ) -> Result<Self, AssessError> {
        if !(MIN_AGE..=MAX_AGE).contains(&age) {
            return Err(AssessError::InvalidProfile(format!(
                "age {} outside accepted range [{}, {}]",
                age, MIN_AGE, MAX_AGE
            )));
        }
        Ok(Self {
            participant_id: participant_id.into(),
            age,
            education,
        })
    }
}

/// Cognitive domain measured by the battery
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Domain {
    ImmediateMemory,
    WorkingMemory,
    VisualMemory,
    SustainedAttention,
}

impl Domain {
    pub fn as_str(&self) -> &'static str {
        match self {
            Domain::ImmediateMemory => "immediate_memory",
            Domain::WorkingMemory => "working_memory",
            Domain::VisualMemory => "visual_memory",
            Domain::SustainedAttention => "sustained_attention",
        }
    }
}

/// Normalized 0-10 measure of one cognitive domain.
///
/// Derived once per domain when its sub-test reaches a terminal state,
/// never mutated afterward.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DomainScore {
    pub domain: Domain,
    /// Score value, clamped to [0, 10]
    pub value: f64,
}

impl DomainScore {
    pub fn new(domain: Domain, value: f64) -> Self {
        Self {
            domain,
            value: value.clamp(0.0, 10.0),
        }
    }
}

/// Phase of a visual recognition trial
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VisualPhase {
    Study,
    Recognition,
}

/// A trial-level event emitted by one of the sub-test state machines
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TrialEvent {
    /// One symbol exposure or recognition judgment in the visual test
    Visual {
        symbol: char,
        phase: VisualPhase,
        /// Monotonic session time at which the stimulus appeared
        presented_at_ms: u64,
        /// Whether the symbol belongs to the study set
        in_study_set: bool,
        /// Participant judgment, present only for recognition trials
        #[serde(skip_serializing_if = "Option::is_none")]
        says_old: Option<bool>,
    },
    /// One digit-span trial (scored, practice, or voided)
    WorkingMemory {
        sequence: Vec<u8>,
        sequence_length: usize,
        user_input: Vec<u8>,
        reaction_time_ms: u64,
        correct: bool,
        /// Input length mismatched the sequence; trial was regenerated
        voided: bool,
        /// Practice trials never enter scoring or the staircase history
        practice: bool,
    },
    /// One tick of the continuous-performance attention run
    Attention {
        index: u8,
        is_target: bool,
        responded: bool,
        #[serde(skip_serializing_if = "Option::is_none")]
        response_latency_ms: Option<u64>,
    },
}

/// Fixed-order feature summary of a completed session.
///
/// Exactly nine named features, consumed only by the classifiers. Field
/// order here is the canonical feature order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    /// Age in years
    pub age: f64,
    /// Education level in numeric form (1-3)
    pub education_level: f64,
    /// Immediate memory domain score (0-10)
    pub immediate_memory: f64,
    /// Working memory domain score (0-10)
    pub working_memory: f64,
    /// Visual memory domain score (0-10)
    pub visual_memory: f64,
    /// Mean working-memory reaction time (ms)
    pub reaction_time_ms: f64,
    /// Response accuracy (0-100)
    pub accuracy_pct: f64,
    /// Sustained attention domain score (0-10)
    pub attention: f64,
    /// Cognitive fatigue level (1-5)
    pub fatigue_level: f64,
}

/// Canonical feature names, in feature-vector order
pub const FEATURE_NAMES: [&str; 9] = [
    "age",
    "education_level",
    "immediate_memory",
    "working_memory",
    "visual_memory",
    "reaction_time_ms",
    "accuracy_pct",
    "attention",
    "fatigue_level",
];

impl FeatureVector {
    /// Features as (name, value) pairs in canonical order
    pub fn as_ordered(&self) -> [(&'static str, f64); 9] {
        [
            ("age", self.age),
            ("education_level", self.education_level),
            ("immediate_memory", self.immediate_memory),
            ("working_memory", self.working_memory),
            ("visual_memory", self.visual_memory),
            ("reaction_time_ms", self.reaction_time_ms),
            ("accuracy_pct", self.accuracy_pct),
            ("attention", self.attention),
            ("fatigue_level", self.fatigue_level),
        ]
    }

    /// Replace non-finite values with 0 so scoring stays total.
    ///
    /// Classification must never panic on a reachable feature vector;
    /// missing measurements are treated as zero contribution.
    pub fn sanitized(mut self) -> Self {
        for v in [
            &mut self.age,
            &mut self.education_level,
            &mut self.immediate_memory,
            &mut self.working_memory,
            &mut self.visual_memory,
            &mut self.reaction_time_ms,
            &mut self.accuracy_pct,
            &mut self.attention,
            &mut self.fatigue_level,
        ] {
            if !v.is_finite() {
                *v = 0.0;
            }
        }
        self
    }
}

/// Coarse memory-capacity category produced by classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MemoryCategory {
    Low,
    Medium,
    High,
}

impl MemoryCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            MemoryCategory::Low => "low",
            MemoryCategory::Medium => "medium",
            MemoryCategory::High => "high",
        }
    }

    /// Participant-facing guidance for a predicted category
    pub fn interpretation(&self) -> &'static str {
        match self {
            MemoryCategory::High => {
                "Memory capacity above average; optimal cognitive functioning \
                 in the assessed areas."
            }
            MemoryCategory::Medium => {
                "Memory capacity within the normal range; healthy habits are \
                 recommended to preserve cognitive functioning."
            }
            MemoryCategory::Low => {
                "Scores suggest memory strategies could help; a detailed \
                 professional evaluation is recommended."
            }
        }
    }
}

/// Classification outcome for one feature vector.
///
/// Computed once, immutable, attached to the result record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictionResult {
    pub category: MemoryCategory,
    /// Model confidence (0-1)
    pub confidence: f64,
    /// Human-readable factors that drove the prediction
    pub contributing_factors: Vec<String>,
}

/// Finalized session record handed to the persistence collaborator.
///
/// The serialized field names are a stable contract: classifier feature
/// extraction reads records back by these names.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultRecord {
    /// Record identifier (UUID v4)
    pub record_id: String,
    pub participant_id: String,
    pub age: u8,
    pub education: EducationLevel,
    pub immediate_memory: f64,
    pub working_memory: f64,
    pub visual_memory: f64,
    pub attention: f64,
    pub reaction_time_ms: u64,
    pub accuracy_pct: f64,
    pub fatigue_level: u8,
    /// Wall-clock time the record was finalized
    pub recorded_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prediction: Option<PredictionResult>,
}

//! Feature aggregation
//!
//! Builds the fixed-order nine-feature vector a completed session hands
//! to the classifiers, and provides the normalization helpers the
//! weighted classifier applies to its inputs.

use crate::types::{Domain, DomainScore, FeatureVector, ParticipantProfile};

/// Feature aggregator for completed sessions
pub struct FeatureAggregator;

impl FeatureAggregator {
    /// Assemble the feature vector from session outputs.
    ///
    /// Domain scores are looked up by domain; a missing domain
    /// contributes 0. The result is sanitized, so downstream scoring is
    /// total even over degenerate inputs.
    pub fn aggregate(
        profile: &ParticipantProfile,
        domain_scores: &[DomainScore],
        reaction_time_ms: u64,
        accuracy_pct: f64,
        fatigue_level: u8,
    ) -> FeatureVector {
        let domain = |d: Domain| {
            domain_scores
                .iter()
                .find(|s| s.domain == d)
                .map(|s| s.value)
                .unwrap_or(0.0)
        };

        FeatureVector {
            age: profile.age as f64,
            education_level: profile.education.as_numeric(),
            immediate_memory: domain(Domain::ImmediateMemory),
            working_memory: domain(Domain::WorkingMemory),
            visual_memory: domain(Domain::VisualMemory),
            reaction_time_ms: reaction_time_ms as f64,
            accuracy_pct,
            attention: domain(Domain::SustainedAttention),
            fatigue_level: fatigue_level as f64,
        }
        .sanitized()
    }
}

/// Reaction time normalized against a 1-second reference.
///
/// Formula: `(1000 − reaction_ms) / 1000`. Deliberately unclamped:
/// reactions slower than one second contribute negatively, exactly as
/// the weighted model expects.
pub fn normalize_reaction(reaction_ms: f64) -> f64 {
    (1000.0 - reaction_ms) / 1000.0
}

/// Accuracy percentage normalized to 0-1
pub fn normalize_accuracy(accuracy_pct: f64) -> f64 {
    accuracy_pct / 100.0
}

/// Age normalized against an 80-year reference (younger scores higher).
///
/// Formula: `(80 − age) / 80`
pub fn normalize_age(age: f64) -> f64 {
    (80.0 - age) / 80.0
}

/// Fatigue level normalized so low fatigue scores higher.
///
/// Formula: `(6 − fatigue) / 5`
pub fn normalize_fatigue(fatigue_level: f64) -> f64 {
    (6.0 - fatigue_level) / 5.0
}

//! Memory-capacity classification
//!
//! Two deterministic strategies behind one interface. They are exercised
//! by different callers and are not required to agree:
//!
//! - [`WeightedVoteClassifier`] scores the full feature vector with fixed
//!   linear weights and votes over identical ensemble members.
//! - [`DomainAverageClassifier`] buckets the plain mean of the four
//!   domain scores and estimates confidence from demographic and
//!   performance heuristics.

use crate::error::AssessError;
use crate::features::{normalize_accuracy, normalize_age, normalize_fatigue, normalize_reaction};
use crate::types::{FeatureVector, MemoryCategory, PredictionResult};

/// Member evaluators in the weighted-vote ensemble
pub const ENSEMBLE_MEMBERS: usize = 10;

/// Weighted-path category thresholds
const WEIGHTED_HIGH: f64 = 7.5;
const WEIGHTED_MEDIUM: f64 = 5.5;

/// Average-path category thresholds
const AVERAGE_LOW: f64 = 4.5;
const AVERAGE_MEDIUM: f64 = 7.0;

/// Average-path confidence heuristic
const BASE_CONFIDENCE: f64 = 0.75;
const MAX_CONFIDENCE: f64 = 0.95;

/// Classification strategy over a session feature vector
pub trait Classifier {
    fn classify(&self, features: &FeatureVector) -> Result<PredictionResult, AssessError>;
}

/// Fixed linear weighting of the normalized feature vector.
///
/// Weights: immediate 0.25, working 0.22, visual 0.18, reaction 0.12,
/// accuracy 0.10, attention 0.08, age 0.03, fatigue 0.02. Domain scores
/// enter on their native 0-10 scale; the remaining features are
/// normalized first. Increasing any normalized input never decreases the
/// score.
pub fn weighted_score(features: &FeatureVector) -> f64 {
    features.immediate_memory * 0.25
        + features.working_memory * 0.22
        + features.visual_memory * 0.18
        + normalize_reaction(features.reaction_time_ms) * 0.12
        + normalize_accuracy(features.accuracy_pct) * 0.10
        + features.attention * 0.08
        + normalize_age(features.age) * 0.03
        + normalize_fatigue(features.fatigue_level) * 0.02
}

fn weighted_category(score: f64) -> MemoryCategory {
    if score >= WEIGHTED_HIGH {
        MemoryCategory::High
    } else if score >= WEIGHTED_MEDIUM {
        MemoryCategory::Medium
    } else {
        MemoryCategory::Low
    }
}

/// Bucket a domain-score average at the average-path thresholds:
/// `< 4.5 → Low`, `≤ 7.0 → Medium`, `> 7.0 → High`.
pub fn average_category(average: f64) -> MemoryCategory {
    if average < AVERAGE_LOW {
        MemoryCategory::Low
    } else if average <= AVERAGE_MEDIUM {
        MemoryCategory::Medium
    } else {
        MemoryCategory::High
    }
}

/// Feature-driven factors reported alongside a prediction, with a
/// category-dependent fallback when nothing stands out.
pub fn contributing_factors(features: &FeatureVector, category: MemoryCategory) -> Vec<String> {
    let mut factors = Vec::new();
    if features.visual_memory > 7.0 {
        factors.push("Strong visual memory".to_string());
    }
    if features.working_memory > 7.0 {
        factors.push("Efficient working memory".to_string());
    }
    if features.reaction_time_ms < 800.0 {
        factors.push("Fast processing speed".to_string());
    }
    if features.accuracy_pct > 85.0 {
        factors.push("High response accuracy".to_string());
    }
    if features.attention > 7.0 {
        factors.push("Outstanding sustained attention".to_string());
    }

    if factors.is_empty() {
        factors.push(match category {
            MemoryCategory::Low => "Memory reinforcement recommended".to_string(),
            _ => "Stable average performance".to_string(),
        });
    }
    factors
}

/// Ensemble of identical weighted evaluators with a majority vote.
///
/// Every member evaluates the same deterministic [`weighted_score`], so
/// the vote is always unanimous and confidence is always 1.0. The vote
/// loop is collapsed to a single evaluation; the unanimous-vote
/// confidence is kept as the observable contract.
#[derive(Debug, Clone)]
pub struct WeightedVoteClassifier {
    members: usize,
}

impl WeightedVoteClassifier {
    pub fn new() -> Self {
        Self {
            members: ENSEMBLE_MEMBERS,
        }
    }

    pub fn with_members(members: usize) -> Self {
        Self {
            members: members.max(1),
        }
    }
}

impl Default for WeightedVoteClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl Classifier for WeightedVoteClassifier {
    fn classify(&self, features: &FeatureVector) -> Result<PredictionResult, AssessError> {
        let features = features.clone().sanitized();
        let category = weighted_category(weighted_score(&features));

        // Identical members cannot dissent: all votes land on `category`.
        let agreeing = self.members;
        let confidence = agreeing as f64 / self.members as f64;

        Ok(PredictionResult {
            category,
            confidence,
            contributing_factors: contributing_factors(&features, category),
        })
    }
}

/// Plain mean of the four domain scores, bucketed at fixed thresholds,
/// with a heuristic confidence estimate.
///
/// Confidence starts at 0.75 and earns additive bonuses: +0.05 for age
/// within [20, 65], +0.05 for education at Medium or above, +0.10 for
/// accuracy ≥ 70%, +0.05 for reaction ≤ 1200 ms; capped at 0.95.
#[derive(Debug, Clone, Default)]
pub struct DomainAverageClassifier;

impl DomainAverageClassifier {
    pub fn new() -> Self {
        Self
    }
}

impl Classifier for DomainAverageClassifier {
    fn classify(&self, features: &FeatureVector) -> Result<PredictionResult, AssessError> {
        let features = features.clone().sanitized();
        let average = (features.immediate_memory
            + features.working_memory
            + features.visual_memory
            + features.attention)
            / 4.0;

        let category = average_category(average);

        let mut confidence = BASE_CONFIDENCE;
        if (20.0..=65.0).contains(&features.age) {
            confidence += 0.05;
        }
        if features.education_level >= 2.0 {
            confidence += 0.05;
        }
        if features.accuracy_pct >= 70.0 {
            confidence += 0.10;
        }
        if features.reaction_time_ms <= 1200.0 {
            confidence += 0.05;
        }

        Ok(PredictionResult {
            category,
            confidence: confidence.min(MAX_CONFIDENCE),
            contributing_factors: contributing_factors(&features, category),
        })
    }
}

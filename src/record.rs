//! Result record assembly
//!
//! Builds the finalized, append-only record a completed session hands to
//! the persistence collaborator. Serialized field names are a stable
//! contract; classifier feature extraction reads records back by name.

use crate::types::{Domain, DomainScore, ParticipantProfile, PredictionResult, ResultRecord};
use chrono::Utc;
use uuid::Uuid;

/// Builder for [`ResultRecord`]
#[derive(Debug, Clone)]
pub struct ResultRecordBuilder {
    profile: ParticipantProfile,
    immediate_memory: f64,
    working_memory: f64,
    visual_memory: f64,
    attention: f64,
    reaction_time_ms: u64,
    accuracy_pct: f64,
    fatigue_level: u8,
    prediction: Option<PredictionResult>,
}

impl ResultRecordBuilder {
    pub fn new(profile: ParticipantProfile) -> Self {
        Self {
            profile,
            immediate_memory: 0.0,
            working_memory: 0.0,
            visual_memory: 0.0,
            attention: 0.0,
            reaction_time_ms: 0,
            accuracy_pct: 0.0,
            fatigue_level: 1,
            prediction: None,
        }
    }

    /// Copy the four domain scores in; missing domains stay 0.
    pub fn domain_scores(mut self, scores: &[DomainScore]) -> Self {
        for score in scores {
            match score.domain {
                Domain::ImmediateMemory => self.immediate_memory = score.value,
                Domain::WorkingMemory => self.working_memory = score.value,
                Domain::VisualMemory => self.visual_memory = score.value,
                Domain::SustainedAttention => self.attention = score.value,
            }
        }
        self
    }

    pub fn reaction_time_ms(mut self, reaction_time_ms: u64) -> Self {
        self.reaction_time_ms = reaction_time_ms;
        self
    }

    pub fn accuracy_pct(mut self, accuracy_pct: f64) -> Self {
        self.accuracy_pct = accuracy_pct.clamp(0.0, 100.0);
        self
    }

    pub fn fatigue_level(mut self, fatigue_level: u8) -> Self {
        self.fatigue_level = fatigue_level.clamp(1, 5);
        self
    }

    pub fn prediction(mut self, prediction: Option<PredictionResult>) -> Self {
        self.prediction = prediction;
        self
    }

    /// Stamp the record with a fresh id and the current wall-clock time.
    pub fn build(self) -> ResultRecord {
        ResultRecord {
            record_id: Uuid::new_v4().to_string(),
            participant_id: self.profile.participant_id,
            age: self.profile.age,
            education: self.profile.education,
            immediate_memory: self.immediate_memory,
            working_memory: self.working_memory,
            visual_memory: self.visual_memory,
            attention: self.attention,
            reaction_time_ms: self.reaction_time_ms,
            accuracy_pct: self.accuracy_pct,
            fatigue_level: self.fatigue_level,
            recorded_at: Utc::now(),
            prediction: self.prediction,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{EducationLevel, MemoryCategory};

    fn profile() -> ParticipantProfile {
        ParticipantProfile::new("p-042", 41, EducationLevel::Medium).unwrap()
    }

    #[test]
    fn test_builder_assembles_record() {
        let scores = vec![
            DomainScore::new(Domain::ImmediateMemory, 8.0),
            DomainScore::new(Domain::WorkingMemory, 7.0),
            DomainScore::new(Domain::VisualMemory, 8.0),
            DomainScore::new(Domain::SustainedAttention, 6.5),
        ];
        let record = ResultRecordBuilder::new(profile())
            .domain_scores(&scores)
            .reaction_time_ms(950)
            .accuracy_pct(82.5)
            .fatigue_level(2)
            .build();

        assert_eq!(record.participant_id, "p-042");
        assert_eq!(record.age, 41);
        assert_eq!(record.working_memory, 7.0);
        assert_eq!(record.attention, 6.5);
        assert_eq!(record.reaction_time_ms, 950);
        assert!(record.prediction.is_none());
        assert!(!record.record_id.is_empty());
    }

    #[test]
    fn test_fatigue_and_accuracy_clamped() {
        let record = ResultRecordBuilder::new(profile())
            .accuracy_pct(140.0)
            .fatigue_level(9)
            .build();
        assert_eq!(record.accuracy_pct, 100.0);
        assert_eq!(record.fatigue_level, 5);
    }

    #[test]
    fn test_serialized_field_names_are_stable() {
        let record = ResultRecordBuilder::new(profile())
            .prediction(Some(crate::types::PredictionResult {
                category: MemoryCategory::Medium,
                confidence: 0.85,
                contributing_factors: vec!["Efficient working memory".to_string()],
            }))
            .build();

        let json = serde_json::to_value(&record).unwrap();
        for field in [
            "record_id",
            "participant_id",
            "age",
            "education",
            "immediate_memory",
            "working_memory",
            "visual_memory",
            "attention",
            "reaction_time_ms",
            "accuracy_pct",
            "fatigue_level",
            "recorded_at",
            "prediction",
        ] {
            assert!(json.get(field).is_some(), "missing field {}", field);
        }
        assert_eq!(json["prediction"]["category"], "medium");
    }

    #[test]
    fn test_round_trips_through_json() {
        let record = ResultRecordBuilder::new(profile()).build();
        let json = serde_json::to_string(&record).unwrap();
        let parsed: ResultRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.record_id, record.record_id);
        assert_eq!(parsed.recorded_at, record.recorded_at);
    }
}

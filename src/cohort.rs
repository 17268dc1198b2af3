//! Cohort analysis over persisted result records
//!
//! Re-classifies a batch of result records with the average-based path
//! and summarizes the category distribution. Used by dashboards that
//! read records back from the external store.

use crate::classifier::average_category;
use crate::error::AssessError;
use crate::types::{MemoryCategory, ResultRecord};
use serde::{Deserialize, Serialize};

/// Category counts and percentages for a set of records
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryDistribution {
    pub total: usize,
    pub low: usize,
    pub medium: usize,
    pub high: usize,
    pub low_pct: f64,
    pub medium_pct: f64,
    pub high_pct: f64,
}

/// Mean of a record's valid domain scores.
///
/// A score is valid when it is finite and greater than 0; records with
/// no valid score average to 0 rather than failing.
pub fn memory_average(record: &ResultRecord) -> f64 {
    let scores = [
        record.immediate_memory,
        record.working_memory,
        record.visual_memory,
        record.attention,
    ];
    let valid: Vec<f64> = scores
        .iter()
        .copied()
        .filter(|s| s.is_finite() && *s > 0.0)
        .collect();
    if valid.is_empty() {
        return 0.0;
    }
    valid.iter().sum::<f64>() / valid.len() as f64
}

/// Category a record falls into under the average-based path
pub fn classify_record(record: &ResultRecord) -> MemoryCategory {
    average_category(memory_average(record))
}

/// Summarize the category distribution of a record set.
///
/// An empty set is a caller-visible insufficient-data condition, not a
/// crash.
pub fn summarize(records: &[ResultRecord]) -> Result<CategoryDistribution, AssessError> {
    if records.is_empty() {
        return Err(AssessError::InsufficientData(
            "no result records to summarize".into(),
        ));
    }

    let mut low = 0;
    let mut medium = 0;
    let mut high = 0;
    for record in records {
        match classify_record(record) {
            MemoryCategory::Low => low += 1,
            MemoryCategory::Medium => medium += 1,
            MemoryCategory::High => high += 1,
        }
    }

    let total = records.len();
    let pct = |n: usize| 100.0 * n as f64 / total as f64;
    Ok(CategoryDistribution {
        total,
        low,
        medium,
        high,
        low_pct: pct(low),
        medium_pct: pct(medium),
        high_pct: pct(high),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::ResultRecordBuilder;
    use crate::types::{Domain, DomainScore, EducationLevel, ParticipantProfile};

    fn record(scores: [f64; 4]) -> ResultRecord {
        let profile = ParticipantProfile::new("c", 35, EducationLevel::Medium).unwrap();
        let domain_scores = vec![
            DomainScore::new(Domain::ImmediateMemory, scores[0]),
            DomainScore::new(Domain::WorkingMemory, scores[1]),
            DomainScore::new(Domain::VisualMemory, scores[2]),
            DomainScore::new(Domain::SustainedAttention, scores[3]),
        ];
        ResultRecordBuilder::new(profile)
            .domain_scores(&domain_scores)
            .build()
    }

    #[test]
    fn test_memory_average_skips_missing_scores() {
        // A record with only two measured domains averages over those two.
        let r = record([8.0, 0.0, 6.0, 0.0]);
        assert!((memory_average(&r) - 7.0).abs() < 1e-9);

        let empty = record([0.0, 0.0, 0.0, 0.0]);
        assert_eq!(memory_average(&empty), 0.0);
        assert_eq!(classify_record(&empty), MemoryCategory::Low);
    }

    #[test]
    fn test_summarize_distribution() {
        let records = vec![
            record([8.0, 8.0, 8.0, 8.0]),
            record([6.0, 6.0, 6.0, 6.0]),
            record([6.5, 6.5, 6.5, 6.5]),
            record([2.0, 2.0, 2.0, 2.0]),
        ];
        let dist = summarize(&records).unwrap();

        assert_eq!(dist.total, 4);
        assert_eq!(dist.high, 1);
        assert_eq!(dist.medium, 2);
        assert_eq!(dist.low, 1);
        assert!((dist.high_pct - 25.0).abs() < 1e-9);
        assert!((dist.low_pct + dist.medium_pct + dist.high_pct - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_empty_set_is_insufficient_data() {
        let result = summarize(&[]);
        assert!(matches!(result, Err(AssessError::InsufficientData(_))));
    }
}

//! Response scoring and signal detection
//!
//! Converts trial outcomes into per-domain numeric scores. All functions
//! are total over reachable inputs: degenerate denominators yield 0
//! instead of panicking, and every score is clamped to its documented
//! range.

use serde::{Deserialize, Serialize};

/// Divisor mapping missed attention items onto the 1-5 fatigue scale
const FATIGUE_BAND_WIDTH: f64 = 4.0;

/// Proportion-correct score on the 0-10 scale.
///
/// Formula: `10 × correct / total`, 0 when `total` is 0.
pub fn proportion_score(correct: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    (10.0 * correct as f64 / total as f64).clamp(0.0, 10.0)
}

/// Decile-banded span score, an equivalent formulation of the linear
/// mapping used by the full battery.
///
/// Each 10-point accuracy band maps onto one score point with linear
/// interpolation inside the band; accuracy 0% → 0 and 100% → 10, and the
/// mapping is monotone throughout.
pub fn banded_span_score(accuracy_pct: f64) -> f64 {
    let acc = accuracy_pct.clamp(0.0, 100.0);
    let score = if acc >= 90.0 {
        9.0 + (acc - 90.0) / 10.0
    } else if acc >= 80.0 {
        8.0 + (acc - 80.0) / 10.0
    } else if acc >= 70.0 {
        7.0 + (acc - 70.0) / 10.0
    } else if acc >= 60.0 {
        6.0 + (acc - 60.0) / 10.0
    } else if acc >= 50.0 {
        5.0 + (acc - 50.0) / 10.0
    } else {
        acc / 10.0
    };
    score.clamp(0.0, 10.0)
}

/// Signal-detection tally for a continuous-performance run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignalCounts {
    /// Target shown, response given
    pub hits: u32,
    /// Target shown, no response
    pub misses: u32,
    /// Non-target shown, response given
    pub false_alarms: u32,
    /// Non-target shown, no response
    pub correct_rejections: u32,
}

impl SignalCounts {
    /// Tally a run against its ground-truth mask. A missing response is
    /// an implicit non-target judgment.
    pub fn from_run(mask: &[bool], responded: &[bool]) -> Self {
        let mut counts = SignalCounts::default();
        for (i, is_target) in mask.iter().enumerate() {
            let responded = responded.get(i).copied().unwrap_or(false);
            match (is_target, responded) {
                (true, true) => counts.hits += 1,
                (true, false) => counts.misses += 1,
                (false, true) => counts.false_alarms += 1,
                (false, false) => counts.correct_rejections += 1,
            }
        }
        counts
    }

    /// Correct classifications: hits plus correct rejections
    pub fn correct_total(&self) -> u32 {
        self.hits + self.correct_rejections
    }

    /// Total items tallied
    pub fn total(&self) -> u32 {
        self.hits + self.misses + self.false_alarms + self.correct_rejections
    }

    /// Fraction of items classified correctly (0-1)
    pub fn accuracy(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            return 0.0;
        }
        self.correct_total() as f64 / total as f64
    }
}

/// Cognitive fatigue on the 1-5 scale.
///
/// Formula: `clamp(1, 5, ceil((run_len - correct_total) / 4))`; every
/// four missed items raise the level by one.
pub fn fatigue_level(counts: &SignalCounts) -> u8 {
    let missed = counts.total().saturating_sub(counts.correct_total()) as f64;
    let level = (missed / FATIGUE_BAND_WIDTH).ceil();
    level.clamp(1.0, 5.0) as u8
}

/// Session-level accuracy: the better of the working-memory and
/// attention accuracies, as a percentage.
pub fn session_accuracy_pct(span_accuracy_pct: f64, attention_accuracy_pct: f64) -> f64 {
    span_accuracy_pct.max(attention_accuracy_pct).clamp(0.0, 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_proportion_score() {
        assert_eq!(proportion_score(8, 8), 10.0);
        assert_eq!(proportion_score(0, 8), 0.0);
        assert!((proportion_score(6, 8) - 7.5).abs() < 1e-9);
        // Empty denominator is a score of zero, not a panic.
        assert_eq!(proportion_score(3, 0), 0.0);
    }

    #[test]
    fn test_banded_span_score_endpoints() {
        assert_eq!(banded_span_score(0.0), 0.0);
        assert_eq!(banded_span_score(100.0), 10.0);
    }

    #[test]
    fn test_banded_span_score_monotone() {
        let mut prev = -1.0;
        for step in 0..=1000 {
            let acc = step as f64 / 10.0;
            let score = banded_span_score(acc);
            assert!(score >= prev, "regression at accuracy {}", acc);
            prev = score;
        }
    }

    #[test]
    fn test_banded_agrees_with_linear_at_deciles() {
        for decile in [50.0, 60.0, 70.0, 80.0, 90.0, 100.0] {
            let linear = decile / 10.0;
            assert!((banded_span_score(decile) - linear).abs() < 1e-9);
        }
    }

    #[test]
    fn test_hits_and_correct_rejections() {
        // mask=[true,false,true], responses={0:true,1:false,2:false}
        let counts = SignalCounts::from_run(&[true, false, true], &[true, false, false]);
        assert_eq!(counts.hits, 1);
        assert_eq!(counts.correct_rejections, 1);
        assert_eq!(counts.misses, 1);
        assert_eq!(counts.correct_total(), 2);
        assert!((counts.accuracy() - 2.0 / 3.0).abs() < 1e-9);

        let score = 10.0 * counts.accuracy();
        assert!((score - 6.67).abs() < 0.01);
    }

    #[test]
    fn test_missing_responses_are_implicit_non_target() {
        // Response slice shorter than the mask: trailing items unanswered.
        let counts = SignalCounts::from_run(&[false, false, true], &[false]);
        assert_eq!(counts.correct_rejections, 2);
        assert_eq!(counts.misses, 1);
    }

    #[test]
    fn test_fatigue_levels() {
        let perfect = SignalCounts {
            hits: 6,
            correct_rejections: 14,
            ..Default::default()
        };
        assert_eq!(fatigue_level(&perfect), 1);

        // 10 missed out of 20 -> ceil(10/4) = 3
        let half = SignalCounts {
            hits: 5,
            misses: 5,
            false_alarms: 5,
            correct_rejections: 5,
        };
        assert_eq!(fatigue_level(&half), 3);

        let worst = SignalCounts {
            misses: 6,
            false_alarms: 14,
            ..Default::default()
        };
        assert_eq!(fatigue_level(&worst), 5);
    }

    #[test]
    fn test_session_accuracy_takes_max() {
        assert_eq!(session_accuracy_pct(80.0, 95.0), 95.0);
        assert_eq!(session_accuracy_pct(80.0, 40.0), 80.0);
    }
}

//! Sustained-attention continuous performance state machine
//!
//! A letter appears every 1.5 seconds for 20 presentations; roughly 30%
//! are the target 'X'. The participant presses a single "target seen"
//! control; not responding is an implicit non-target judgment. The run is
//! strictly time-driven and never pauses to wait for a response.

use crate::scoring::{fatigue_level, SignalCounts};
use crate::stimulus::{draw_filler_letter, draw_target_mask, TARGET_LETTER};
use crate::types::TrialEvent;
use rand::Rng;

/// Presentations per run
pub const RUN_LENGTH: usize = 20;

/// Scheduler tick between presentations
pub const TICK_MS: u64 = 1_500;

/// State of the attention machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttentionState {
    Idle,
    /// Presenting stimulus `index` (0-19)
    Running { index: usize },
    Done,
}

/// Terminal outcome of the run
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AttentionOutcome {
    pub counts: SignalCounts,
    /// Percentage of presentations classified correctly
    pub accuracy_pct: f64,
    /// `10 × correct_total / 20`
    pub attention_score: f64,
    /// Derived cognitive fatigue (1-5)
    pub fatigue_level: u8,
}

/// Continuous-performance target detection test
#[derive(Debug)]
pub struct AttentionTest {
    /// Ground-truth target mask, drawn once and immutable during the run
    mask: Vec<bool>,
    responded: Vec<bool>,
    latencies_ms: Vec<Option<u64>>,
    /// Letter currently on display
    display: char,
    shown_at_ms: u64,
    state: AttentionState,
    outcome: Option<AttentionOutcome>,
}

impl AttentionTest {
    pub fn new() -> Self {
        Self {
            mask: Vec::new(),
            responded: Vec::new(),
            latencies_ms: Vec::new(),
            display: TARGET_LETTER,
            shown_at_ms: 0,
            state: AttentionState::Idle,
            outcome: None,
        }
    }

    pub fn state(&self) -> AttentionState {
        self.state
    }

    pub fn outcome(&self) -> Option<&AttentionOutcome> {
        self.outcome.as_ref()
    }

    /// Letter on display while the run is live
    pub fn current_letter(&self) -> Option<char> {
        match self.state {
            AttentionState::Running { .. } => Some(self.display),
            _ => None,
        }
    }

    /// Draw the target mask and present index 0. The caller schedules
    /// the tick interval for [`TICK_MS`].
    pub fn start<R: Rng>(&mut self, rng: &mut R, now_ms: u64) {
        if self.state != AttentionState::Idle {
            return;
        }
        self.mask = draw_target_mask(rng, RUN_LENGTH);
        self.responded = vec![false; RUN_LENGTH];
        self.latencies_ms = vec![None; RUN_LENGTH];
        self.state = AttentionState::Running { index: 0 };
        self.shown_at_ms = now_ms;
        self.display = self.draw_display(rng, 0);
    }

    /// Register a "target seen" response for the index on display.
    ///
    /// Responses arriving after the next tick naturally attribute to the
    /// newer index; duplicates within one window are ignored. Returns
    /// whether the response was registered.
    pub fn respond(&mut self, now_ms: u64) -> bool {
        let AttentionState::Running { index } = self.state else {
            return false;
        };
        if self.responded[index] {
            return false;
        }
        self.responded[index] = true;
        self.latencies_ms[index] = Some(now_ms.saturating_sub(self.shown_at_ms));
        true
    }

    /// Advance to the next presentation on a scheduler tick, closing the
    /// window for the current index and logging its trial. The 20th tick
    /// ends the run. No-op once the run is over.
    pub fn on_tick<R: Rng>(&mut self, rng: &mut R, now_ms: u64, log: &mut Vec<TrialEvent>) {
        let AttentionState::Running { index } = self.state else {
            return;
        };

        log.push(TrialEvent::Attention {
            index: index as u8,
            is_target: self.mask[index],
            responded: self.responded[index],
            response_latency_ms: self.latencies_ms[index],
        });

        let next = index + 1;
        if next < RUN_LENGTH {
            self.state = AttentionState::Running { index: next };
            self.shown_at_ms = now_ms;
            self.display = self.draw_display(rng, next);
        } else {
            self.finish();
        }
    }

    /// The target letter for targets, a freshly drawn filler otherwise.
    /// Fillers are redrawn on every presentation, not fixed per index.
    fn draw_display<R: Rng>(&self, rng: &mut R, index: usize) -> char {
        if self.mask[index] {
            TARGET_LETTER
        } else {
            draw_filler_letter(rng)
        }
    }

    /// Idempotent terminal transition.
    fn finish(&mut self) {
        if self.outcome.is_some() {
            return;
        }
        self.state = AttentionState::Done;
        let counts = SignalCounts::from_run(&self.mask, &self.responded);
        let accuracy = counts.accuracy();
        self.outcome = Some(AttentionOutcome {
            counts,
            accuracy_pct: accuracy * 100.0,
            attention_score: (accuracy * 10.0).clamp(0.0, 10.0),
            fatigue_level: fatigue_level(&counts),
        });
    }

    #[cfg(test)]
    pub(crate) fn mask(&self) -> &[bool] {
        &self.mask
    }
}

impl Default for AttentionTest {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    /// Run the full 20-presentation schedule, responding exactly at the
    /// indices for which `respond_at` returns true.
    fn run_schedule(
        test: &mut AttentionTest,
        rng: &mut SmallRng,
        log: &mut Vec<TrialEvent>,
        respond_at: impl Fn(usize, bool) -> bool,
    ) {
        test.start(rng, 0);
        let mut now = 0;
        for index in 0..RUN_LENGTH {
            let is_target = test.mask()[index];
            if respond_at(index, is_target) {
                test.respond(now + 400);
            }
            now += TICK_MS;
            test.on_tick(rng, now, log);
        }
    }

    #[test]
    fn test_mask_is_drawn_once_and_fixed() {
        let mut rng = SmallRng::seed_from_u64(1);
        let mut test = AttentionTest::new();
        test.start(&mut rng, 0);

        let mask = test.mask().to_vec();
        assert_eq!(mask.len(), RUN_LENGTH);

        let mut log = Vec::new();
        for tick in 1..=5 {
            test.on_tick(&mut rng, tick * TICK_MS, &mut log);
        }
        assert_eq!(test.mask(), mask.as_slice());
    }

    #[test]
    fn test_perfect_run_scores_ten_and_fatigue_one() {
        let mut rng = SmallRng::seed_from_u64(2);
        let mut log = Vec::new();
        let mut test = AttentionTest::new();

        run_schedule(&mut test, &mut rng, &mut log, |_, is_target| is_target);

        let outcome = test.outcome().unwrap();
        assert_eq!(outcome.counts.correct_total(), RUN_LENGTH as u32);
        assert_eq!(outcome.attention_score, 10.0);
        assert_eq!(outcome.accuracy_pct, 100.0);
        assert_eq!(outcome.fatigue_level, 1);
    }

    #[test]
    fn test_silent_run_scores_correct_rejections_only() {
        let mut rng = SmallRng::seed_from_u64(3);
        let mut log = Vec::new();
        let mut test = AttentionTest::new();

        run_schedule(&mut test, &mut rng, &mut log, |_, _| false);

        let outcome = test.outcome().unwrap();
        let targets = test.mask().iter().filter(|t| **t).count() as u32;
        assert_eq!(outcome.counts.misses, targets);
        assert_eq!(outcome.counts.hits, 0);
        assert_eq!(
            outcome.counts.correct_rejections,
            RUN_LENGTH as u32 - targets
        );
    }

    #[test]
    fn test_response_attributes_to_current_index_only() {
        let mut rng = SmallRng::seed_from_u64(4);
        let mut log = Vec::new();
        let mut test = AttentionTest::new();
        test.start(&mut rng, 0);

        // Respond during index 0's window.
        assert!(test.respond(700));
        // Duplicate within the same window is dropped.
        assert!(!test.respond(900));

        test.on_tick(&mut rng, TICK_MS, &mut log);

        // The logged trial for index 0 carries the response and latency.
        assert!(matches!(
            log[0],
            TrialEvent::Attention {
                index: 0,
                responded: true,
                response_latency_ms: Some(700),
                ..
            }
        ));

        // A late response lands on index 1, not index 0.
        assert!(test.respond(TICK_MS + 100));
        test.on_tick(&mut rng, 2 * TICK_MS, &mut log);
        assert!(matches!(
            log[1],
            TrialEvent::Attention { index: 1, responded: true, .. }
        ));
    }

    #[test]
    fn test_display_is_target_letter_exactly_on_mask() {
        let mut rng = SmallRng::seed_from_u64(5);
        let mut log = Vec::new();
        let mut test = AttentionTest::new();
        test.start(&mut rng, 0);

        let mut now = 0;
        for index in 0..RUN_LENGTH {
            let letter = test.current_letter().unwrap();
            if test.mask()[index] {
                assert_eq!(letter, TARGET_LETTER);
            } else {
                assert_ne!(letter, TARGET_LETTER);
            }
            now += TICK_MS;
            test.on_tick(&mut rng, now, &mut log);
        }
        assert_eq!(test.state(), AttentionState::Done);
    }

    #[test]
    fn test_run_is_time_driven_not_response_driven() {
        let mut rng = SmallRng::seed_from_u64(6);
        let mut log = Vec::new();
        let mut test = AttentionTest::new();
        test.start(&mut rng, 0);

        // Twenty ticks with no responses at all still complete the run.
        for tick in 1..=RUN_LENGTH as u64 {
            test.on_tick(&mut rng, tick * TICK_MS, &mut log);
        }
        assert_eq!(test.state(), AttentionState::Done);
        assert_eq!(log.len(), RUN_LENGTH);
    }

    #[test]
    fn test_terminal_state_is_idempotent() {
        let mut rng = SmallRng::seed_from_u64(7);
        let mut log = Vec::new();
        let mut test = AttentionTest::new();
        run_schedule(&mut test, &mut rng, &mut log, |_, is_target| is_target);

        let outcome_before = *test.outcome().unwrap();
        let events_before = log.len();

        // Stale interval fire after the run ended.
        test.on_tick(&mut rng, 60_000, &mut log);
        assert!(!test.respond(60_100));

        assert_eq!(*test.outcome().unwrap(), outcome_before);
        assert_eq!(log.len(), events_before);
    }
}

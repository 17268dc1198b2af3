//! Adaptive reverse digit span state machine
//!
//! A digit sequence is presented for `max(2, L)` seconds, then the
//! participant types it back in exact reverse order. Difficulty follows a
//! staircase: the sequence grows by one digit after every two consecutive
//! correct trials, capped at 8, and never shrinks within a session.

use crate::error::AssessError;
use crate::scoring::proportion_score;
use crate::stimulus::draw_digits;
use crate::types::TrialEvent;
use rand::Rng;

/// Scored trials per session
pub const SCORED_TRIALS: usize = 15;

/// Practice trials before the scored block
pub const PRACTICE_TRIALS: usize = 3;

/// Sequence lengths used during practice
const PRACTICE_LENGTHS: [usize; PRACTICE_TRIALS] = [3, 3, 4];

/// Starting sequence length
pub const START_LENGTH: usize = 3;

/// Staircase cap
pub const MAX_LENGTH: usize = 8;

/// Floor on the presentation window, in seconds
pub const MIN_PRESENTATION_SECS: u64 = 2;

/// Consecutive correct trials required before the staircase steps up
const STAIRCASE_RUN: usize = 2;

/// State of the digit span machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpanState {
    Idle,
    /// Sequence on display; input is not yet meaningful
    Presenting,
    /// Presentation window elapsed; awaiting the reversed sequence
    Collecting,
    Done,
}

/// What happened to a submitted answer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpanFeedback {
    /// Input length mismatched the sequence; the trial was regenerated
    /// at the same length and was not scored
    Void,
    /// A practice answer; never scored
    Practice { correct: bool },
    /// A scored answer
    Scored { correct: bool },
}

/// Terminal outcome of the scored block
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpanOutcome {
    pub correct_count: usize,
    /// Percentage of scored trials answered correctly
    pub accuracy_pct: f64,
    /// `10 × correct / 15`
    pub span_score: f64,
    /// Mean response latency over scored trials (ms)
    pub mean_reaction_ms: u64,
    /// Longest sequence length reached by the staircase
    pub max_length_reached: usize,
}

/// Adaptive reverse digit span test
#[derive(Debug)]
pub struct DigitSpanTest {
    length: usize,
    sequence: Vec<u8>,
    state: SpanState,
    /// Practice trials still to run before scoring starts
    practice_remaining: usize,
    scored_results: Vec<bool>,
    reaction_times_ms: Vec<u64>,
    max_length_reached: usize,
    collect_started_ms: u64,
    outcome: Option<SpanOutcome>,
}

impl DigitSpanTest {
    pub fn new(include_practice: bool) -> Self {
        Self {
            length: START_LENGTH,
            sequence: Vec::new(),
            state: SpanState::Idle,
            practice_remaining: if include_practice { PRACTICE_TRIALS } else { 0 },
            scored_results: Vec::new(),
            reaction_times_ms: Vec::new(),
            max_length_reached: START_LENGTH,
            collect_started_ms: 0,
            outcome: None,
        }
    }

    pub fn state(&self) -> SpanState {
        self.state
    }

    pub fn outcome(&self) -> Option<&SpanOutcome> {
        self.outcome.as_ref()
    }

    /// Sequence currently presented (or just presented)
    pub fn sequence(&self) -> &[u8] {
        &self.sequence
    }

    pub fn sequence_length(&self) -> usize {
        self.length
    }

    pub fn in_practice(&self) -> bool {
        self.practice_remaining > 0
    }

    /// Scored trials completed so far
    pub fn scored_count(&self) -> usize {
        self.scored_results.len()
    }

    /// Presentation window for the current sequence, in milliseconds.
    ///
    /// `max(2, L)` seconds: short sequences still get a floor of two
    /// seconds on screen.
    pub fn presentation_ms(&self) -> u64 {
        (self.length as u64).max(MIN_PRESENTATION_SECS) * 1_000
    }

    /// Draw the first sequence. The caller schedules the presentation
    /// timer for [`Self::presentation_ms`].
    pub fn start<R: Rng>(&mut self, rng: &mut R) {
        if self.state != SpanState::Idle {
            return;
        }
        if self.practice_remaining > 0 {
            self.length = PRACTICE_LENGTHS[0];
        }
        self.draw_trial(rng);
    }

    /// Close the presentation window and start the response-latency
    /// clock. No-op unless a sequence is on display.
    pub fn on_presentation_elapsed(&mut self, now_ms: u64) {
        if self.state != SpanState::Presenting {
            return;
        }
        self.state = SpanState::Collecting;
        self.collect_started_ms = now_ms;
    }

    /// Score a submitted answer against the reversed sequence.
    ///
    /// Input of the wrong length voids the trial: it is logged, a fresh
    /// sequence of the same length is drawn, and nothing is scored. Any
    /// other input is scored, and is correct only if it is exactly
    /// `reverse(sequence)`.
    pub fn submit<R: Rng>(
        &mut self,
        rng: &mut R,
        input: &[u8],
        now_ms: u64,
        log: &mut Vec<TrialEvent>,
    ) -> Result<SpanFeedback, AssessError> {
        match self.state {
            SpanState::Collecting => {}
            SpanState::Presenting => {
                return Err(AssessError::ResponseOutsideWindow(
                    "answer submitted while sequence still on display".into(),
                ))
            }
            _ => {
                return Err(AssessError::SessionState(
                    "digit span test is not collecting answers".into(),
                ))
            }
        }

        let practice = self.practice_remaining > 0;
        let reaction_ms = now_ms.saturating_sub(self.collect_started_ms);

        if input.len() != self.sequence.len() {
            log.push(self.trial_event(input, reaction_ms, false, true, practice));
            // Regenerate at the same length; a void never reaches the
            // staircase or the score.
            self.draw_trial(rng);
            return Ok(SpanFeedback::Void);
        }

        let mut expected = self.sequence.clone();
        expected.reverse();
        let correct = input == expected.as_slice();
        log.push(self.trial_event(input, reaction_ms, correct, false, practice));

        if practice {
            self.practice_remaining -= 1;
            if self.practice_remaining > 0 {
                self.length = PRACTICE_LENGTHS[PRACTICE_TRIALS - self.practice_remaining];
            } else {
                // Scored block starts over at the base length.
                self.length = START_LENGTH;
            }
            self.draw_trial(rng);
            return Ok(SpanFeedback::Practice { correct });
        }

        self.scored_results.push(correct);
        self.reaction_times_ms.push(reaction_ms);
        self.apply_staircase();

        if self.scored_results.len() >= SCORED_TRIALS {
            self.finish();
        } else {
            self.draw_trial(rng);
        }
        Ok(SpanFeedback::Scored { correct })
    }

    /// Step the staircase: the two most recent scored trials both correct
    /// raises the length by one, up to the cap. The window slides, so a
    /// third consecutive correct raises it again. There is no decrease
    /// rule anywhere.
    fn apply_staircase(&mut self) {
        if self.length >= MAX_LENGTH {
            return;
        }
        let n = self.scored_results.len();
        if n >= STAIRCASE_RUN && self.scored_results[n - STAIRCASE_RUN..].iter().all(|c| *c) {
            self.length += 1;
            self.max_length_reached = self.max_length_reached.max(self.length);
        }
    }

    fn draw_trial<R: Rng>(&mut self, rng: &mut R) {
        self.sequence = draw_digits(rng, self.length);
        self.state = SpanState::Presenting;
    }

    /// Idempotent terminal transition.
    fn finish(&mut self) {
        if self.outcome.is_some() {
            return;
        }
        self.state = SpanState::Done;
        let correct_count = self.scored_results.iter().filter(|c| **c).count();
        let total = self.scored_results.len();
        let accuracy_pct = if total == 0 {
            0.0
        } else {
            100.0 * correct_count as f64 / total as f64
        };
        let mean_reaction_ms = if self.reaction_times_ms.is_empty() {
            0
        } else {
            self.reaction_times_ms.iter().sum::<u64>() / self.reaction_times_ms.len() as u64
        };
        self.outcome = Some(SpanOutcome {
            correct_count,
            accuracy_pct,
            span_score: proportion_score(correct_count, total),
            mean_reaction_ms,
            max_length_reached: self.max_length_reached,
        });
    }

    fn trial_event(
        &self,
        input: &[u8],
        reaction_ms: u64,
        correct: bool,
        voided: bool,
        practice: bool,
    ) -> TrialEvent {
        TrialEvent::WorkingMemory {
            sequence: self.sequence.clone(),
            sequence_length: self.sequence.len(),
            user_input: input.to_vec(),
            reaction_time_ms: reaction_ms,
            correct,
            voided,
            practice,
        }
    }
}

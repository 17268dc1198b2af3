//! Visual recognition state machine
//!
//! Two phases: a timed study pass over 8 symbols (3 seconds each), then a
//! self-paced recognition pass over 8 symbols of which exactly half were
//! studied. The participant judges each recognition symbol as old or new.

use crate::error::AssessError;
use crate::scoring::proportion_score;
use crate::stimulus::{
    build_recognition_set, draw_study_set, validate_palette, STUDY_SET_SIZE,
};
use crate::types::{TrialEvent, VisualPhase};
use rand::Rng;

/// Exposure window per studied symbol
pub const STUDY_EXPOSURE_MS: u64 = 3_000;

/// State of the visual recognition machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisualState {
    Idle,
    /// Studying symbol `index` (0-7)
    Studying { index: usize },
    /// Awaiting an old/new judgment for recognition symbol `index` (0-7)
    Recognizing { index: usize },
    Done,
}

/// Terminal outcome of the recognition pass
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VisualOutcome {
    pub correct_count: usize,
    pub total: usize,
    /// `10 × correct / total`
    pub visual_score: f64,
}

/// Study-then-recognize symbol memory test
#[derive(Debug)]
pub struct VisualRecognitionTest {
    palette: Vec<char>,
    study: Vec<char>,
    recognition: Vec<char>,
    correct_count: usize,
    state: VisualState,
    /// When the symbol currently on display appeared
    shown_at_ms: u64,
    outcome: Option<VisualOutcome>,
}

impl VisualRecognitionTest {
    /// Create a machine over the given palette. Palette size is a
    /// startup precondition, not a per-trial check.
    pub fn new(palette: &[char]) -> Result<Self, AssessError> {
        validate_palette(palette)?;
        Ok(Self {
            palette: palette.to_vec(),
            study: Vec::new(),
            recognition: Vec::new(),
            correct_count: 0,
            state: VisualState::Idle,
            shown_at_ms: 0,
            outcome: None,
        })
    }

    pub fn state(&self) -> VisualState {
        self.state
    }

    pub fn outcome(&self) -> Option<&VisualOutcome> {
        self.outcome.as_ref()
    }

    /// Symbol currently on display, during study or recognition
    pub fn current_symbol(&self) -> Option<char> {
        match self.state {
            VisualState::Studying { index } => self.study.get(index).copied(),
            VisualState::Recognizing { index } => self.recognition.get(index).copied(),
            _ => None,
        }
    }

    /// Draw study and recognition sets and show the first study symbol.
    /// The caller schedules the exposure timer.
    pub fn start<R: Rng>(&mut self, rng: &mut R, now_ms: u64, log: &mut Vec<TrialEvent>) {
        if self.state != VisualState::Idle {
            return;
        }
        self.study = draw_study_set(rng, &self.palette);
        self.recognition = build_recognition_set(rng, &self.study, &self.palette);
        self.state = VisualState::Studying { index: 0 };
        self.shown_at_ms = now_ms;
        self.log_exposure(0, log);
    }

    /// Advance past an elapsed study exposure. After the 8th symbol the
    /// machine enters recognition. No-op outside the study phase.
    pub fn on_exposure_elapsed(&mut self, now_ms: u64, log: &mut Vec<TrialEvent>) {
        let VisualState::Studying { index } = self.state else {
            return;
        };
        let next = index + 1;
        self.shown_at_ms = now_ms;
        if next < STUDY_SET_SIZE {
            self.state = VisualState::Studying { index: next };
            self.log_exposure(next, log);
        } else {
            self.state = VisualState::Recognizing { index: 0 };
        }
    }

    /// Record an old/new judgment for the recognition symbol on display.
    ///
    /// Correctness is `judgment == (symbol ∈ study set)`. Judgments during
    /// the study phase are outside their response window and rejected.
    pub fn respond(
        &mut self,
        says_old: bool,
        now_ms: u64,
        log: &mut Vec<TrialEvent>,
    ) -> Result<bool, AssessError> {
        let index = match self.state {
            VisualState::Recognizing { index } => index,
            VisualState::Studying { .. } => {
                return Err(AssessError::ResponseOutsideWindow(
                    "recognition judgment during study phase".into(),
                ))
            }
            _ => {
                return Err(AssessError::SessionState(
                    "visual test is not awaiting judgments".into(),
                ))
            }
        };

        let symbol = self.recognition[index];
        let in_study_set = self.study.contains(&symbol);
        let correct = says_old == in_study_set;
        if correct {
            self.correct_count += 1;
        }

        log.push(TrialEvent::Visual {
            symbol,
            phase: VisualPhase::Recognition,
            presented_at_ms: self.shown_at_ms,
            in_study_set,
            says_old: Some(says_old),
        });

        let next = index + 1;
        if next < self.recognition.len() {
            self.state = VisualState::Recognizing { index: next };
            self.shown_at_ms = now_ms;
        } else {
            self.finish();
        }
        Ok(correct)
    }

    /// Idempotent terminal transition: a second invocation on a finished
    /// machine changes nothing.
    fn finish(&mut self) {
        if self.outcome.is_some() {
            return;
        }
        self.state = VisualState::Done;
        self.outcome = Some(VisualOutcome {
            correct_count: self.correct_count,
            total: self.recognition.len(),
            visual_score: proportion_score(self.correct_count, self.recognition.len()),
        });
    }

    fn log_exposure(&self, index: usize, log: &mut Vec<TrialEvent>) {
        log.push(TrialEvent::Visual {
            symbol: self.study[index],
            phase: VisualPhase::Study,
            presented_at_ms: self.shown_at_ms,
            in_study_set: true,
            says_old: None,
        });
    }
}

//! Session orchestration
//!
//! One `AssessmentSession` exclusively owns the trial log, the timer
//! queue, the RNG, and the domain scores from intake to handoff. The
//! three sub-tests run strictly in sequence (visual → working memory →
//! attention); the next machine starts only once the previous one is
//! terminal. All public operations take host-supplied monotonic
//! milliseconds; the engine never reads a clock of its own.

use crate::battery::{
    attention::{AttentionState, AttentionTest, TICK_MS},
    digit_span::{DigitSpanTest, SpanFeedback, SpanState},
    visual::{VisualRecognitionTest, VisualState, STUDY_EXPOSURE_MS},
};
use crate::classifier::{Classifier, DomainAverageClassifier, WeightedVoteClassifier};
use crate::error::AssessError;
use crate::features::FeatureAggregator;
use crate::record::ResultRecordBuilder;
use crate::scheduler::{TimerId, TimerQueue, TimerTag};
use crate::scoring::session_accuracy_pct;
use crate::stimulus::SYMBOL_PALETTE;
use crate::types::{Domain, DomainScore, ParticipantProfile, ResultRecord, TrialEvent};
use rand::rngs::SmallRng;
use rand::SeedableRng;

/// Which classification strategy the session runs on completion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ClassifierStrategy {
    /// Weighted linear score with the unanimous ensemble vote
    #[default]
    WeightedVote,
    /// Plain domain average with heuristic confidence
    DomainAverage,
}

/// Session construction options
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Run the untimed 3-trial digit-span practice block first
    pub include_practice: bool,
    /// Seed for the session RNG; `None` draws from entropy
    pub seed: Option<u64>,
    pub strategy: ClassifierStrategy,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            include_practice: false,
            seed: None,
            strategy: ClassifierStrategy::default(),
        }
    }
}

/// Top-level phase of the battery
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Intake,
    Visual,
    WorkingMemory,
    Attention,
    Complete,
    Abandoned,
}

/// What the host should render right now
#[derive(Debug, Clone, PartialEq)]
pub enum SessionView {
    Intake,
    /// A study symbol with its position in the pass
    StudySymbol { symbol: char, index: usize },
    /// A recognition symbol awaiting an old/new judgment
    RecognitionPrompt { symbol: char, index: usize },
    /// A digit sequence currently on display
    SpanSequence { digits: Vec<u8> },
    /// The response field for the reversed sequence
    SpanInputPrompt { expected_len: usize },
    /// The letter currently shown in the attention run
    AttentionLetter { letter: char, index: usize },
    Complete,
    Abandoned,
}

/// A single participant's battery run
pub struct AssessmentSession {
    profile: ParticipantProfile,
    config: SessionConfig,
    rng: SmallRng,
    timers: TimerQueue,
    phase: SessionPhase,
    visual: VisualRecognitionTest,
    span: DigitSpanTest,
    attention: AttentionTest,
    attention_timer: Option<TimerId>,
    log: Vec<TrialEvent>,
    domain_scores: Vec<DomainScore>,
    record: Option<ResultRecord>,
}

impl AssessmentSession {
    /// Create a session for one participant. The symbol palette is
    /// validated here, once, before any trial runs.
    pub fn new(profile: ParticipantProfile, config: SessionConfig) -> Result<Self, AssessError> {
        let rng = match config.seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_entropy(),
        };
        let visual = VisualRecognitionTest::new(&SYMBOL_PALETTE)?;
        let span = DigitSpanTest::new(config.include_practice);
        Ok(Self {
            profile,
            config,
            rng,
            timers: TimerQueue::new(),
            phase: SessionPhase::Intake,
            visual,
            span,
            attention: AttentionTest::new(),
            attention_timer: None,
            log: Vec::new(),
            domain_scores: Vec::new(),
            record: None,
        })
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn profile(&self) -> &ParticipantProfile {
        &self.profile
    }

    /// Trial events accumulated so far, in emission order
    pub fn trial_log(&self) -> &[TrialEvent] {
        &self.log
    }

    /// Domain scores; populated only once the session completes
    pub fn domain_scores(&self) -> &[DomainScore] {
        &self.domain_scores
    }

    /// Finalized record; present only after completion
    pub fn record(&self) -> Option<&ResultRecord> {
        self.record.as_ref()
    }

    /// Earliest pending timer deadline, so the host can sleep precisely
    pub fn next_deadline(&self) -> Option<u64> {
        self.timers.next_deadline()
    }

    /// Begin the battery: intake closes and the visual study pass starts.
    pub fn start(&mut self, now_ms: u64) -> Result<(), AssessError> {
        if self.phase != SessionPhase::Intake {
            return Err(AssessError::SessionState(
                "session already started".into(),
            ));
        }
        self.phase = SessionPhase::Visual;
        self.visual.start(&mut self.rng, now_ms, &mut self.log);
        self.timers
            .schedule_once(TimerTag::StudyExposure, now_ms, STUDY_EXPOSURE_MS);
        Ok(())
    }

    /// Fire every timer due at or before `now_ms` and run the resulting
    /// transitions. Safe to call at any time; a completed or abandoned
    /// session has nothing pending.
    pub fn poll(&mut self, now_ms: u64) {
        // Newly armed timers may already be due after a large jump, so
        // drain until quiescent.
        loop {
            let fires = self.timers.poll(now_ms);
            if fires.is_empty() {
                return;
            }
            for fire in fires {
                match fire.tag {
                    TimerTag::StudyExposure => self.on_study_exposure(fire.due_at_ms),
                    TimerTag::SpanPresentation => self.span.on_presentation_elapsed(fire.due_at_ms),
                    TimerTag::AttentionTick => self.on_attention_tick(fire.due_at_ms),
                }
            }
        }
    }

    /// Judge the recognition symbol on display as old (`true`) or new.
    /// Returns whether the judgment was correct.
    pub fn respond_recognition(&mut self, says_old: bool, now_ms: u64) -> Result<bool, AssessError> {
        if self.phase != SessionPhase::Visual {
            return Err(AssessError::SessionState(
                "no recognition trial in progress".into(),
            ));
        }
        let correct = self.visual.respond(says_old, now_ms, &mut self.log)?;
        if self.visual.state() == VisualState::Done {
            self.start_working_memory(now_ms);
        }
        Ok(correct)
    }

    /// Submit the reversed digit sequence for the current span trial.
    pub fn submit_span(&mut self, input: &[u8], now_ms: u64) -> Result<SpanFeedback, AssessError> {
        if self.phase != SessionPhase::WorkingMemory {
            return Err(AssessError::SessionState(
                "no digit-span trial in progress".into(),
            ));
        }
        let feedback = self.span.submit(&mut self.rng, input, now_ms, &mut self.log)?;
        match self.span.state() {
            SpanState::Presenting => self.schedule_span_presentation(now_ms),
            SpanState::Done => self.start_attention(now_ms),
            _ => {}
        }
        Ok(feedback)
    }

    /// Press the "target seen" control. Returns whether the response was
    /// registered for the presentation currently on display.
    pub fn respond_target(&mut self, now_ms: u64) -> Result<bool, AssessError> {
        if self.phase != SessionPhase::Attention {
            return Err(AssessError::SessionState(
                "attention run is not active".into(),
            ));
        }
        Ok(self.attention.respond(now_ms))
    }

    /// Abandon the session mid-test: every outstanding timer is released
    /// and no partial result is classified or persisted.
    pub fn abandon(&mut self) {
        self.timers.clear();
        self.attention_timer = None;
        if self.phase != SessionPhase::Complete {
            self.phase = SessionPhase::Abandoned;
        }
    }

    /// What the host should render for the current state
    pub fn view(&self) -> SessionView {
        match self.phase {
            SessionPhase::Intake => SessionView::Intake,
            SessionPhase::Abandoned => SessionView::Abandoned,
            SessionPhase::Complete => SessionView::Complete,
            SessionPhase::Visual => match self.visual.state() {
                VisualState::Studying { index } => SessionView::StudySymbol {
                    symbol: self.visual.current_symbol().unwrap_or(' '),
                    index,
                },
                VisualState::Recognizing { index } => SessionView::RecognitionPrompt {
                    symbol: self.visual.current_symbol().unwrap_or(' '),
                    index,
                },
                _ => SessionView::Intake,
            },
            SessionPhase::WorkingMemory => match self.span.state() {
                SpanState::Collecting => SessionView::SpanInputPrompt {
                    expected_len: self.span.sequence_length(),
                },
                _ => SessionView::SpanSequence {
                    digits: self.span.sequence().to_vec(),
                },
            },
            SessionPhase::Attention => match self.attention.state() {
                AttentionState::Running { index } => SessionView::AttentionLetter {
                    letter: self.attention.current_letter().unwrap_or(' '),
                    index,
                },
                _ => SessionView::Complete,
            },
        }
    }

    fn on_study_exposure(&mut self, due_at_ms: u64) {
        self.visual.on_exposure_elapsed(due_at_ms, &mut self.log);
        if matches!(self.visual.state(), VisualState::Studying { .. }) {
            self.timers
                .schedule_once(TimerTag::StudyExposure, due_at_ms, STUDY_EXPOSURE_MS);
        }
    }

    fn start_working_memory(&mut self, now_ms: u64) {
        self.phase = SessionPhase::WorkingMemory;
        self.span.start(&mut self.rng);
        self.schedule_span_presentation(now_ms);
    }

    fn schedule_span_presentation(&mut self, now_ms: u64) {
        self.timers
            .schedule_once(TimerTag::SpanPresentation, now_ms, self.span.presentation_ms());
    }

    fn start_attention(&mut self, now_ms: u64) {
        self.phase = SessionPhase::Attention;
        self.attention.start(&mut self.rng, now_ms);
        self.attention_timer =
            Some(self.timers.schedule_interval(TimerTag::AttentionTick, now_ms, TICK_MS));
    }

    fn on_attention_tick(&mut self, due_at_ms: u64) {
        self.attention.on_tick(&mut self.rng, due_at_ms, &mut self.log);
        if self.attention.state() == AttentionState::Done {
            if let Some(id) = self.attention_timer.take() {
                self.timers.cancel(id);
            }
            self.complete();
        }
    }

    /// Terminal transition for the whole session: compute domain scores,
    /// classify, and build the result record. A re-trigger on an
    /// already-complete session changes nothing.
    fn complete(&mut self) {
        if self.record.is_some() {
            return;
        }
        let (Some(visual), Some(span), Some(attention)) = (
            self.visual.outcome().copied(),
            self.span.outcome().copied(),
            self.attention.outcome().copied(),
        ) else {
            return;
        };

        self.phase = SessionPhase::Complete;

        // Immediate memory mirrors the recognition score: the same
        // exposure feeds both domains.
        self.domain_scores = vec![
            DomainScore::new(Domain::ImmediateMemory, visual.visual_score),
            DomainScore::new(Domain::WorkingMemory, span.span_score),
            DomainScore::new(Domain::VisualMemory, visual.visual_score),
            DomainScore::new(Domain::SustainedAttention, attention.attention_score),
        ];

        let accuracy_pct = session_accuracy_pct(span.accuracy_pct, attention.accuracy_pct);
        let features = FeatureAggregator::aggregate(
            &self.profile,
            &self.domain_scores,
            span.mean_reaction_ms,
            accuracy_pct,
            attention.fatigue_level,
        );

        let prediction = match self.config.strategy {
            ClassifierStrategy::WeightedVote => WeightedVoteClassifier::new().classify(&features),
            ClassifierStrategy::DomainAverage => DomainAverageClassifier::new().classify(&features),
        }
        .ok();

        self.record = Some(
            ResultRecordBuilder::new(self.profile.clone())
                .domain_scores(&self.domain_scores)
                .reaction_time_ms(span.mean_reaction_ms)
                .accuracy_pct(accuracy_pct)
                .fatigue_level(attention.fatigue_level)
                .prediction(prediction)
                .build(),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stimulus::TARGET_LETTER;
    use crate::types::{EducationLevel, MemoryCategory, VisualPhase};

    fn profile() -> ParticipantProfile {
        ParticipantProfile::new("e2e", 30, EducationLevel::Superior).unwrap()
    }

    fn seeded(strategy: ClassifierStrategy) -> AssessmentSession {
        AssessmentSession::new(
            profile(),
            SessionConfig {
                include_practice: false,
                seed: Some(42),
                strategy,
            },
        )
        .unwrap()
    }

    /// Symbols seen during the study pass, recovered from the trial log
    /// exactly as an external driver would.
    fn studied_symbols(session: &AssessmentSession) -> Vec<char> {
        session
            .trial_log()
            .iter()
            .filter_map(|e| match e {
                TrialEvent::Visual {
                    phase: VisualPhase::Study,
                    symbol,
                    ..
                } => Some(*symbol),
                _ => None,
            })
            .collect()
    }

    /// Drive a session to completion using only the public surface,
    /// answering every trial perfectly.
    fn run_perfect(session: &mut AssessmentSession) {
        let mut now = 0u64;
        session.start(now).unwrap();

        let mut pending_sequence: Vec<u8> = Vec::new();
        for _ in 0..10_000 {
            match session.view() {
                SessionView::StudySymbol { .. } => {
                    now = session.next_deadline().unwrap();
                    session.poll(now);
                }
                SessionView::RecognitionPrompt { symbol, .. } => {
                    let old = studied_symbols(session).contains(&symbol);
                    now += 500;
                    session.respond_recognition(old, now).unwrap();
                }
                SessionView::SpanSequence { digits } => {
                    pending_sequence = digits;
                    now = session.next_deadline().unwrap();
                    session.poll(now);
                }
                SessionView::SpanInputPrompt { .. } => {
                    let mut answer = pending_sequence.clone();
                    answer.reverse();
                    now += 350;
                    session.submit_span(&answer, now).unwrap();
                }
                SessionView::AttentionLetter { letter, .. } => {
                    if letter == TARGET_LETTER {
                        session.respond_target(now + 300).unwrap();
                    }
                    now = session.next_deadline().unwrap();
                    session.poll(now);
                }
                SessionView::Complete => return,
                SessionView::Intake | SessionView::Abandoned => {
                    panic!("unexpected view while driving session")
                }
            }
        }
        panic!("session did not complete");
    }

    #[test]
    fn test_perfect_session_end_to_end_weighted() {
        let mut session = seeded(ClassifierStrategy::WeightedVote);
        run_perfect(&mut session);

        assert_eq!(session.phase(), SessionPhase::Complete);
        for score in session.domain_scores() {
            assert_eq!(score.value, 10.0, "{:?}", score.domain);
        }

        let record = session.record().unwrap();
        assert_eq!(record.accuracy_pct, 100.0);
        assert_eq!(record.fatigue_level, 1);
        assert_eq!(record.reaction_time_ms, 350);

        let prediction = record.prediction.as_ref().unwrap();
        assert_eq!(prediction.category, MemoryCategory::High);
        // Identical ensemble members vote unanimously.
        assert_eq!(prediction.confidence, 1.0);
    }

    #[test]
    fn test_perfect_session_end_to_end_domain_average() {
        let mut session = seeded(ClassifierStrategy::DomainAverage);
        run_perfect(&mut session);

        let prediction = session.record().unwrap().prediction.as_ref().unwrap();
        assert_eq!(prediction.category, MemoryCategory::High);
        // Every confidence bonus fires; the heuristic caps at 0.95.
        assert_eq!(prediction.confidence, 0.95);
    }

    #[test]
    fn test_sub_tests_run_strictly_in_sequence() {
        let mut session = seeded(ClassifierStrategy::WeightedVote);
        session.start(0).unwrap();

        // Working-memory and attention inputs are rejected during the
        // visual phase.
        assert!(session.submit_span(&[1, 2, 3], 100).is_err());
        assert!(session.respond_target(100).is_err());
        assert_eq!(session.phase(), SessionPhase::Visual);
    }

    #[test]
    fn test_seeded_sessions_reproduce_stimuli() {
        let mut a = seeded(ClassifierStrategy::WeightedVote);
        let mut b = seeded(ClassifierStrategy::WeightedVote);
        a.start(0).unwrap();
        b.start(0).unwrap();
        for now in [3_000, 6_000, 9_000] {
            a.poll(now);
            b.poll(now);
        }
        assert_eq!(studied_symbols(&a), studied_symbols(&b));
    }

    #[test]
    fn test_abandon_releases_timers_and_blocks_classification() {
        let mut session = seeded(ClassifierStrategy::WeightedVote);
        session.start(0).unwrap();
        session.poll(3_000);
        assert!(session.next_deadline().is_some());

        session.abandon();
        assert_eq!(session.phase(), SessionPhase::Abandoned);
        assert_eq!(session.next_deadline(), None);
        assert!(session.record().is_none());

        // A stale host loop polling far in the future mutates nothing.
        let events_before = session.trial_log().len();
        session.poll(1_000_000);
        assert_eq!(session.trial_log().len(), events_before);
        assert!(session.respond_recognition(true, 1_000_000).is_err());
    }

    #[test]
    fn test_double_start_rejected() {
        let mut session = seeded(ClassifierStrategy::WeightedVote);
        session.start(0).unwrap();
        assert!(session.start(0).is_err());
    }

    #[test]
    fn test_completion_is_idempotent() {
        let mut session = seeded(ClassifierStrategy::WeightedVote);
        run_perfect(&mut session);

        let record_id = session.record().unwrap().record_id.clone();
        let scores = session.domain_scores().to_vec();

        // Poll long after completion: nothing pending, nothing changes.
        session.poll(10_000_000);
        assert_eq!(session.record().unwrap().record_id, record_id);
        assert_eq!(session.domain_scores(), scores.as_slice());
    }

    #[test]
    fn test_trial_log_covers_all_three_tests() {
        let mut session = seeded(ClassifierStrategy::WeightedVote);
        run_perfect(&mut session);

        let log = session.trial_log();
        let visual = log
            .iter()
            .filter(|e| matches!(e, TrialEvent::Visual { .. }))
            .count();
        let span = log
            .iter()
            .filter(|e| matches!(e, TrialEvent::WorkingMemory { .. }))
            .count();
        let attention = log
            .iter()
            .filter(|e| matches!(e, TrialEvent::Attention { .. }))
            .count();

        // 8 study exposures + 8 recognition judgments.
        assert_eq!(visual, 16);
        assert_eq!(span, 15);
        assert_eq!(attention, 20);
    }
}

//! Sub-test state machines
//!
//! Each sub-test is an explicit tagged-state value advanced only through
//! its transition functions. The session orchestrator owns the timers;
//! machines own their stimuli, responses, and terminal outcomes.
//!
//! - **visual**: study/recognition symbol memory
//! - **digit_span**: adaptive reverse digit span
//! - **attention**: continuous-performance target detection

pub mod attention;
pub mod digit_span;
pub mod visual;

pub use attention::{AttentionOutcome, AttentionState, AttentionTest};
pub use digit_span::{DigitSpanTest, SpanFeedback, SpanOutcome, SpanState};
pub use visual::{VisualOutcome, VisualRecognitionTest, VisualState};

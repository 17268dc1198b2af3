//! Cooperative timer scheduling
//!
//! Stimulus exposure and the attention tick are countdown/interval timers
//! owned by the active session. The queue is polled with host-supplied
//! monotonic milliseconds; nothing fires between polls, so a single
//! logical writer drives all transitions. Cancelling on session teardown
//! is mandatory: a timer from a superseded session must never fire.

use serde::{Deserialize, Serialize};

/// What a fired timer means to the session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimerTag {
    /// Per-item exposure in the visual study phase
    StudyExposure,
    /// Digit sequence presentation window
    SpanPresentation,
    /// Continuous-performance tick advancing the attention index
    AttentionTick,
}

/// Handle for cancelling a scheduled timer
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct TimerId(u64);

/// A timer that came due during a poll
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerFire {
    pub id: TimerId,
    pub tag: TimerTag,
    /// Deadline the timer was armed for (not the poll instant)
    pub due_at_ms: u64,
}

#[derive(Debug, Clone)]
struct Entry {
    id: TimerId,
    tag: TimerTag,
    due_at_ms: u64,
    /// Re-arm period for interval timers
    period_ms: Option<u64>,
}

/// Single-threaded cooperative timer queue.
///
/// Deterministic: timers fire in (deadline, id) order, and an interval
/// that fell multiple periods behind fires once per elapsed period.
#[derive(Debug, Default)]
pub struct TimerQueue {
    entries: Vec<Entry>,
    next_id: u64,
}

impl TimerQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm a one-shot timer due at `now_ms + delay_ms`
    pub fn schedule_once(&mut self, tag: TimerTag, now_ms: u64, delay_ms: u64) -> TimerId {
        self.push(tag, now_ms + delay_ms, None)
    }

    /// Arm a repeating timer first due at `now_ms + period_ms`
    pub fn schedule_interval(&mut self, tag: TimerTag, now_ms: u64, period_ms: u64) -> TimerId {
        // A zero period would fire forever within one poll.
        let period_ms = period_ms.max(1);
        self.push(tag, now_ms + period_ms, Some(period_ms))
    }

    fn push(&mut self, tag: TimerTag, due_at_ms: u64, period_ms: Option<u64>) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        self.entries.push(Entry {
            id,
            tag,
            due_at_ms,
            period_ms,
        });
        id
    }

    /// Cancel one timer. Returns whether it was still pending.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.id != id);
        self.entries.len() != before
    }

    /// Cancel every pending timer. Called on session reset or abandonment.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Earliest pending deadline, if any. Lets the host sleep precisely.
    pub fn next_deadline(&self) -> Option<u64> {
        self.entries.iter().map(|e| e.due_at_ms).min()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Collect every timer due at or before `now_ms`, in (deadline, id)
    /// order. One-shots are removed; intervals re-arm, firing once per
    /// elapsed period.
    pub fn poll(&mut self, now_ms: u64) -> Vec<TimerFire> {
        let mut fires = Vec::new();
        let mut i = 0;
        while i < self.entries.len() {
            if self.entries[i].due_at_ms > now_ms {
                i += 1;
                continue;
            }
            let entry = &mut self.entries[i];
            match entry.period_ms {
                None => {
                    fires.push(TimerFire {
                        id: entry.id,
                        tag: entry.tag,
                        due_at_ms: entry.due_at_ms,
                    });
                    self.entries.remove(i);
                }
                Some(period) => {
                    while entry.due_at_ms <= now_ms {
                        fires.push(TimerFire {
                            id: entry.id,
                            tag: entry.tag,
                            due_at_ms: entry.due_at_ms,
                        });
                        entry.due_at_ms += period;
                    }
                    i += 1;
                }
            }
        }
        fires.sort_by_key(|f| (f.due_at_ms, f.id));
        fires
    }
}

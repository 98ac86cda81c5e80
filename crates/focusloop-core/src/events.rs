use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::timer::Phase;

/// Every observable engine transition as a value.
///
/// The engine itself talks to observers through callbacks; this is the
/// form those callbacks take once they leave the engine (event streams,
/// JSON output).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    TimerStarted {
        phase: Phase,
        at: DateTime<Utc>,
    },
    TimerPaused {
        phase: Phase,
        at: DateTime<Utc>,
    },
    TimerReset {
        phase: Phase,
        at: DateTime<Utc>,
    },
    /// Emitted before the engine moves on, so `phase` is the one that
    /// just finished.
    TimerCompleted {
        phase: Phase,
        duration_secs: u32,
        at: DateTime<Utc>,
    },
    TimerTick {
        remaining_secs: u32,
        total_secs: u32,
        at: DateTime<Utc>,
    },
    StateSnapshot {
        phase: Phase,
        running: bool,
        remaining_secs: u32,
        total_secs: u32,
        completed_focus_cycles: u32,
        progress: f64,
        at: DateTime<Utc>,
    },
}

impl Event {
    pub fn is_tick(&self) -> bool {
        matches!(self, Event::TimerTick { .. })
    }
}

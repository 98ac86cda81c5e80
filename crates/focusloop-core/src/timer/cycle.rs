//! Short/long break policy.
//!
//! Kept apart from the engine so the modulus rule lives in one place and
//! can be tested without driving a countdown.

use super::Phase;

/// Decides which break follows a completed focus phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CycleController;

impl CycleController {
    /// Break kind after `completed_focus_cycles` focus phases (counted
    /// after the increment for the phase that just finished).
    ///
    /// An interval of 0 is treated as 1; the engine never stores one.
    pub fn next_break(completed_focus_cycles: u32, long_break_interval: u32) -> Phase {
        let interval = long_break_interval.max(1);
        if completed_focus_cycles % interval == 0 {
            Phase::LongBreak
        } else {
            Phase::ShortBreak
        }
    }

    /// Focus phases still to complete before the next long break.
    pub fn cycles_until_long_break(completed_focus_cycles: u32, long_break_interval: u32) -> u32 {
        let interval = long_break_interval.max(1);
        interval - (completed_focus_cycles % interval)
    }
}

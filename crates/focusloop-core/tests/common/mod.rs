//! Shared helpers for engine integration tests.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use focusloop_core::{Observer, ObserverError, ObserverResult, Phase};

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Start(Phase),
    Pause(Phase),
    Reset(Phase),
    Complete(Phase, u32),
    Tick(u32, u32),
}

/// Records every callback; optionally fails on ticks or completions.
#[derive(Default)]
pub struct Recorder {
    pub calls: Mutex<Vec<Call>>,
    pub fail_on_tick: bool,
    pub fail_on_complete: bool,
}

impl Recorder {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn failing_on_tick() -> Arc<Self> {
        Arc::new(Self {
            fail_on_tick: true,
            ..Self::default()
        })
    }

    pub fn failing_on_complete() -> Arc<Self> {
        Arc::new(Self {
            fail_on_complete: true,
            ..Self::default()
        })
    }

    pub fn ticks(&self) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|c| matches!(c, Call::Tick(..)))
            .collect()
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    /// Calls other than ticks.
    pub fn lifecycle(&self) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|c| !matches!(c, Call::Tick(..)))
            .collect()
    }

    pub fn completions(&self) -> Vec<(Phase, u32)> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Complete(phase, secs) => Some((phase, secs)),
                _ => None,
            })
            .collect()
    }

    fn push(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

impl Observer for Recorder {
    fn on_start(&self, phase: Phase) -> ObserverResult {
        self.push(Call::Start(phase));
        Ok(())
    }

    fn on_pause(&self, phase: Phase) -> ObserverResult {
        self.push(Call::Pause(phase));
        Ok(())
    }

    fn on_reset(&self, phase: Phase) -> ObserverResult {
        self.push(Call::Reset(phase));
        Ok(())
    }

    fn on_complete(&self, phase: Phase, duration_secs: u32) -> ObserverResult {
        self.push(Call::Complete(phase, duration_secs));
        if self.fail_on_complete {
            return Err(ObserverError::new("completion listener crashed"));
        }
        Ok(())
    }

    fn on_tick(&self, remaining_secs: u32, total_secs: u32) -> ObserverResult {
        self.push(Call::Tick(remaining_secs, total_secs));
        if self.fail_on_tick {
            return Err(ObserverError::new("tick listener crashed"));
        }
        Ok(())
    }
}

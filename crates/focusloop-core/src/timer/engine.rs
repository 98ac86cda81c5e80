//! Timer engine implementation.
//!
//! The timer engine is a tick-driven state machine. It does not use
//! internal threads or read the clock: it arms a [`TickSource`] on
//! `start()` and expects the owner of that source to call `tick()` once
//! per elapsed second while it is armed.
//!
//! ## Phase Transitions
//!
//! ```text
//! Focus -> ShortBreak -> Focus -> ... -> Focus -> LongBreak -> Focus
//!                        (every Nth completed focus phase)
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! let gate = TickGate::new();
//! let mut engine = TimerEngine::new(TimerConfig::default(), gate.clone())?;
//! engine.add_observer(Arc::new(my_observer));
//! engine.start()?;
//! // Once per second while gate.is_armed():
//! engine.tick()?;
//! ```

use std::fmt;
use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info};

use super::config::TimerConfig;
use super::cycle::CycleController;
use super::phase::Phase;
use super::tick::TickSource;
use crate::error::{ConfigError, CoreError};
use crate::events::Event;
use crate::observer::{Observer, ObserverHub, ObserverResult};

/// Core timer engine.
///
/// Sole owner and mutator of the countdown. Commands take `&mut self`;
/// share it across threads through [`TimerService`](crate::service::TimerService).
pub struct TimerEngine {
    config: TimerConfig,
    phase: Phase,
    remaining_secs: u32,
    total_secs: u32,
    running: bool,
    completed_focus_cycles: u32,
    ticker: Box<dyn TickSource>,
    observers: ObserverHub,
}

impl TimerEngine {
    /// Create a new engine in the `Focus` phase, not running.
    pub fn new<T>(config: TimerConfig, ticker: T) -> Result<Self, ConfigError>
    where
        T: TickSource + 'static,
    {
        config.validate()?;
        let focus = config.focus_secs;
        Ok(Self {
            config,
            phase: Phase::Focus,
            remaining_secs: focus,
            total_secs: focus,
            running: false,
            completed_focus_cycles: 0,
            ticker: Box::new(ticker),
            observers: ObserverHub::new(),
        })
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn current_phase(&self) -> Phase {
        self.phase
    }

    /// Remaining time split into `(minutes, seconds)`.
    pub fn remaining(&self) -> (u32, u32) {
        (self.remaining_secs / 60, self.remaining_secs % 60)
    }

    pub fn remaining_secs(&self) -> u32 {
        self.remaining_secs
    }

    pub fn total_secs(&self) -> u32 {
        self.total_secs
    }

    pub fn completed_focus_cycles(&self) -> u32 {
        self.completed_focus_cycles
    }

    pub fn config(&self) -> &TimerConfig {
        &self.config
    }

    /// 0.0 .. 1.0 progress within the current phase.
    pub fn progress_fraction(&self) -> f64 {
        if self.total_secs == 0 {
            return 0.0;
        }
        let fraction = 1.0 - (self.remaining_secs as f64 / self.total_secs as f64);
        fraction.clamp(0.0, 1.0)
    }

    /// Build a full state snapshot event.
    pub fn snapshot(&self) -> Event {
        Event::StateSnapshot {
            phase: self.phase,
            running: self.running,
            remaining_secs: self.remaining_secs,
            total_secs: self.total_secs,
            completed_focus_cycles: self.completed_focus_cycles,
            progress: self.progress_fraction(),
            at: Utc::now(),
        }
    }

    // ── Observers ────────────────────────────────────────────────────

    /// Register an observer. Returns `false` if it was already registered.
    pub fn add_observer(&mut self, observer: Arc<dyn Observer>) -> bool {
        self.observers.add(observer)
    }

    /// Deregister an observer. Unknown handles are ignored.
    pub fn remove_observer<O: Observer + ?Sized>(&mut self, observer: &Arc<O>) -> bool {
        self.observers.remove(observer)
    }

    // ── Commands ─────────────────────────────────────────────────────

    pub fn start(&mut self) -> ObserverResult {
        if self.running {
            return Ok(()); // Already running.
        }
        self.running = true;
        self.ticker.start();
        debug!(phase = %self.phase, remaining = self.remaining_secs, "timer started");
        self.observers.started(self.phase)
    }

    pub fn pause(&mut self) -> ObserverResult {
        if !self.running {
            return Ok(());
        }
        self.ticker.stop();
        self.running = false;
        debug!(phase = %self.phase, remaining = self.remaining_secs, "timer paused");
        self.observers.paused(self.phase)
    }

    /// Abandon the current countdown and go back to a fresh focus phase.
    ///
    /// The completed cycle count is kept.
    pub fn reset(&mut self) -> ObserverResult {
        self.ticker.stop();
        self.running = false;
        self.phase = Phase::Focus;
        self.total_secs = self.config.focus_secs;
        self.remaining_secs = self.total_secs;
        debug!(cycles = self.completed_focus_cycles, "timer reset");
        self.observers.reset(Phase::Focus)
    }

    /// Finish the current phase now, exactly as if it had counted down.
    ///
    /// A running timer is stopped first (without a pause event), so the
    /// engine is idle afterwards.
    pub fn skip(&mut self) -> ObserverResult {
        if self.running {
            self.ticker.stop();
            self.running = false;
        }
        debug!(phase = %self.phase, remaining = self.remaining_secs, "phase skipped");
        self.complete()
    }

    /// Replace the configuration while idle. Resets the countdown.
    pub fn set_config(&mut self, config: TimerConfig) -> Result<(), CoreError> {
        if self.running {
            return Err(ConfigError::EngineRunning.into());
        }
        config.validate()?;
        self.config = config;
        self.reset()?;
        Ok(())
    }

    /// Advance the countdown by one second. Ignored while not running.
    ///
    /// The decrement happens before observers are told, so a failing tick
    /// observer still leaves the countdown where the user expects it. A
    /// running engine already at zero has a completion pending (an observer
    /// failed last time); that tick only retries the completion, without
    /// announcing zero again.
    pub fn tick(&mut self) -> ObserverResult {
        if !self.running {
            return Ok(());
        }
        if self.remaining_secs > 0 {
            self.remaining_secs -= 1;
            self.observers.tick(self.remaining_secs, self.total_secs)?;
        }
        if self.remaining_secs == 0 {
            self.complete()?;
        }
        Ok(())
    }

    // ── Internal ─────────────────────────────────────────────────────

    /// Observers hear about the finished phase before anything moves; if
    /// one fails, the engine stays on that phase.
    fn complete(&mut self) -> ObserverResult {
        let finished = self.phase;
        self.observers.completed(finished, self.total_secs)?;

        let next = match finished {
            Phase::Focus => {
                self.completed_focus_cycles = self.completed_focus_cycles.saturating_add(1);
                CycleController::next_break(
                    self.completed_focus_cycles,
                    self.config.long_break_interval,
                )
            }
            Phase::ShortBreak | Phase::LongBreak => Phase::Focus,
        };

        self.phase = next;
        self.total_secs = self.config.duration_secs(next);
        self.remaining_secs = self.total_secs;

        if self.running && !self.config.auto_continue {
            self.ticker.stop();
            self.running = false;
        }

        info!(
            finished = %finished,
            next = %next,
            cycles = self.completed_focus_cycles,
            running = self.running,
            "phase completed"
        );
        Ok(())
    }
}

impl fmt::Debug for TimerEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TimerEngine")
            .field("config", &self.config)
            .field("phase", &self.phase)
            .field("remaining_secs", &self.remaining_secs)
            .field("total_secs", &self.total_secs)
            .field("running", &self.running)
            .field("completed_focus_cycles", &self.completed_focus_cycles)
            .field("ticker_active", &self.ticker.is_active())
            .field("observers", &self.observers)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timer::TickGate;

    fn engine() -> (TimerEngine, TickGate) {
        let gate = TickGate::new();
        let config = TimerConfig::new(10, 3, 6, 2).unwrap();
        let engine = TimerEngine::new(config, gate.clone()).unwrap();
        (engine, gate)
    }

    #[test]
    fn start_pause_start() {
        let (mut engine, gate) = engine();
        assert!(!engine.is_running());

        engine.start().unwrap();
        assert!(engine.is_running());
        assert!(gate.is_armed());

        engine.pause().unwrap();
        assert!(!engine.is_running());
        assert!(!gate.is_armed());

        engine.start().unwrap();
        assert!(engine.is_running());
    }

    #[test]
    fn ticks_ignored_while_idle() {
        let (mut engine, _gate) = engine();
        engine.tick().unwrap();
        assert_eq!(engine.remaining_secs(), 10);
    }

    #[test]
    fn skip_advances_phase() {
        let (mut engine, _gate) = engine();
        engine.skip().unwrap();
        assert_eq!(engine.current_phase(), Phase::ShortBreak);
        assert_eq!(engine.remaining_secs(), 3);
        assert_eq!(engine.completed_focus_cycles(), 1);
        engine.skip().unwrap();
        assert_eq!(engine.current_phase(), Phase::Focus);
        engine.skip().unwrap();
        assert_eq!(engine.current_phase(), Phase::LongBreak);
        assert_eq!(engine.total_secs(), 6);
    }

    #[test]
    fn skip_while_running_leaves_engine_idle() {
        let (mut engine, gate) = engine();
        engine.start().unwrap();
        engine.skip().unwrap();
        assert!(!engine.is_running());
        assert!(!gate.is_armed());
    }

    #[test]
    fn reset_goes_to_focus_and_keeps_cycles() {
        let (mut engine, _gate) = engine();
        engine.skip().unwrap();
        engine.skip().unwrap();
        engine.skip().unwrap();
        assert_eq!(engine.current_phase(), Phase::LongBreak);
        engine.reset().unwrap();
        assert_eq!(engine.current_phase(), Phase::Focus);
        assert_eq!(engine.remaining_secs(), 10);
        assert_eq!(engine.completed_focus_cycles(), 2);
        assert!(!engine.is_running());
    }

    #[test]
    fn remaining_splits_minutes() {
        let gate = TickGate::new();
        let engine = TimerEngine::new(TimerConfig::new(125, 60, 60, 4).unwrap(), gate).unwrap();
        assert_eq!(engine.remaining(), (2, 5));
    }

    #[test]
    fn manual_start_stops_after_completion() {
        let gate = TickGate::new();
        let config = TimerConfig::new(2, 1, 1, 4).unwrap().with_auto_continue(false);
        let mut engine = TimerEngine::new(config, gate.clone()).unwrap();
        engine.start().unwrap();
        engine.tick().unwrap();
        engine.tick().unwrap();
        assert_eq!(engine.current_phase(), Phase::ShortBreak);
        assert!(!engine.is_running());
        assert!(!gate.is_armed());
    }

    #[test]
    fn set_config_refused_while_running() {
        let (mut engine, _gate) = engine();
        engine.start().unwrap();
        let err = engine.set_config(TimerConfig::default()).unwrap_err();
        assert!(matches!(err, CoreError::Config(ConfigError::EngineRunning)));
    }

    #[test]
    fn set_config_applies_and_resets() {
        let (mut engine, _gate) = engine();
        engine.skip().unwrap();
        engine.set_config(TimerConfig::new(20, 5, 8, 3).unwrap()).unwrap();
        assert_eq!(engine.current_phase(), Phase::Focus);
        assert_eq!(engine.remaining_secs(), 20);
        assert_eq!(engine.config().long_break_interval, 3);
    }

    #[test]
    fn snapshot_returns_valid_event() {
        let (engine, _gate) = engine();
        match engine.snapshot() {
            Event::StateSnapshot {
                phase,
                running,
                remaining_secs,
                progress,
                ..
            } => {
                assert_eq!(phase, Phase::Focus);
                assert!(!running);
                assert_eq!(remaining_secs, 10);
                assert_eq!(progress, 0.0);
            }
            _ => panic!("Expected StateSnapshot"),
        }
    }
}

//! Tick source abstraction.
//!
//! The engine never owns a clock. It arms and disarms a [`TickSource`];
//! whoever owns the clock delivers [`TimerEngine::tick`] once per second
//! while the source is active.
//!
//! [`TimerEngine::tick`]: super::TimerEngine::tick

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// A recurring one-second timer the engine can switch on and off.
///
/// `start` on an already active source must not cause a second stream of
/// ticks, and `stop` on an inactive source is a no-op.
pub trait TickSource: Send {
    fn start(&mut self);
    fn stop(&mut self);
    fn is_active(&self) -> bool;
}

/// Cloneable on/off switch shared between the engine and the clock owner.
///
/// The engine holds one clone as its [`TickSource`]; the driver (the tokio
/// service, a GUI event loop, a test) keeps another and checks
/// [`is_armed`](Self::is_armed) before delivering ticks.
#[derive(Debug, Clone, Default)]
pub struct TickGate {
    armed: Arc<AtomicBool>,
}

impl TickGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_armed(&self) -> bool {
        self.armed.load(Ordering::Acquire)
    }
}

impl TickSource for TickGate {
    fn start(&mut self) {
        self.armed.store(true, Ordering::Release);
    }

    fn stop(&mut self) {
        self.armed.store(false, Ordering::Release);
    }

    fn is_active(&self) -> bool {
        self.is_armed()
    }
}

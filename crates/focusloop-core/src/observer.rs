//! Observer contract and the ordered registry the engine notifies.
//!
//! Notification is synchronous and runs on the thread that called the
//! engine. The first observer that returns `Err` ends the fan-out for that
//! event and its error is handed back to the engine's caller.

use std::fmt;
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::mpsc;

use crate::error::ObserverError;
use crate::events::Event;
use crate::timer::Phase;

pub type ObserverResult = Result<(), ObserverError>;

/// Listener for engine lifecycle and progress.
///
/// Every callback defaults to doing nothing. Implementations must not
/// block: they run inside the tick that drives the countdown.
pub trait Observer: Send + Sync {
    fn on_start(&self, _phase: Phase) -> ObserverResult {
        Ok(())
    }

    fn on_pause(&self, _phase: Phase) -> ObserverResult {
        Ok(())
    }

    fn on_reset(&self, _phase: Phase) -> ObserverResult {
        Ok(())
    }

    fn on_complete(&self, _phase: Phase, _duration_secs: u32) -> ObserverResult {
        Ok(())
    }

    fn on_tick(&self, _remaining_secs: u32, _total_secs: u32) -> ObserverResult {
        Ok(())
    }
}

/// Registered observers in registration order.
///
/// Identity is the `Arc` allocation: adding a handle twice keeps one
/// entry, removing an unknown handle does nothing.
#[derive(Default, Clone)]
pub struct ObserverHub {
    observers: Vec<Arc<dyn Observer>>,
}

impl ObserverHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `false` if the handle was already registered.
    pub fn add(&mut self, observer: Arc<dyn Observer>) -> bool {
        if self.position(&observer).is_some() {
            return false;
        }
        self.observers.push(observer);
        true
    }

    /// Returns `false` if the handle was not registered.
    pub fn remove<O: Observer + ?Sized>(&mut self, observer: &Arc<O>) -> bool {
        match self.position(observer) {
            Some(idx) => {
                self.observers.remove(idx);
                true
            }
            None => false,
        }
    }

    pub fn contains<O: Observer + ?Sized>(&self, observer: &Arc<O>) -> bool {
        self.position(observer).is_some()
    }

    pub fn len(&self) -> usize {
        self.observers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }

    pub fn started(&self, phase: Phase) -> ObserverResult {
        self.each(|o| o.on_start(phase))
    }

    pub fn paused(&self, phase: Phase) -> ObserverResult {
        self.each(|o| o.on_pause(phase))
    }

    pub fn reset(&self, phase: Phase) -> ObserverResult {
        self.each(|o| o.on_reset(phase))
    }

    pub fn completed(&self, phase: Phase, duration_secs: u32) -> ObserverResult {
        self.each(|o| o.on_complete(phase, duration_secs))
    }

    pub fn tick(&self, remaining_secs: u32, total_secs: u32) -> ObserverResult {
        self.each(|o| o.on_tick(remaining_secs, total_secs))
    }

    fn each<F>(&self, mut notify: F) -> ObserverResult
    where
        F: FnMut(&dyn Observer) -> ObserverResult,
    {
        for observer in &self.observers {
            notify(observer.as_ref())?;
        }
        Ok(())
    }

    fn position<O: Observer + ?Sized>(&self, observer: &Arc<O>) -> Option<usize> {
        let target = Arc::as_ptr(observer).cast::<()>();
        self.observers
            .iter()
            .position(|o| Arc::as_ptr(o).cast::<()>() == target)
    }
}

impl fmt::Debug for ObserverHub {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObserverHub")
            .field("observers", &self.observers.len())
            .finish()
    }
}

/// Forwards every callback as an [`Event`] into an unbounded channel.
///
/// Sending never blocks, so it is safe inside the tick path. A dropped
/// receiver is reported as an observer error.
#[derive(Debug, Clone)]
pub struct ChannelObserver {
    tx: mpsc::UnboundedSender<Event>,
    include_ticks: bool,
}

impl ChannelObserver {
    pub fn new(tx: mpsc::UnboundedSender<Event>) -> Self {
        Self {
            tx,
            include_ticks: true,
        }
    }

    pub fn channel() -> (Self, mpsc::UnboundedReceiver<Event>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self::new(tx), rx)
    }

    /// Drop `TimerTick` events and forward lifecycle events only.
    pub fn without_ticks(mut self) -> Self {
        self.include_ticks = false;
        self
    }

    fn send(&self, event: Event) -> ObserverResult {
        self.tx
            .send(event)
            .map_err(|_| ObserverError::new("event receiver dropped"))
    }
}

impl Observer for ChannelObserver {
    fn on_start(&self, phase: Phase) -> ObserverResult {
        self.send(Event::TimerStarted {
            phase,
            at: Utc::now(),
        })
    }

    fn on_pause(&self, phase: Phase) -> ObserverResult {
        self.send(Event::TimerPaused {
            phase,
            at: Utc::now(),
        })
    }

    fn on_reset(&self, phase: Phase) -> ObserverResult {
        self.send(Event::TimerReset {
            phase,
            at: Utc::now(),
        })
    }

    fn on_complete(&self, phase: Phase, duration_secs: u32) -> ObserverResult {
        self.send(Event::TimerCompleted {
            phase,
            duration_secs,
            at: Utc::now(),
        })
    }

    fn on_tick(&self, remaining_secs: u32, total_secs: u32) -> ObserverResult {
        if !self.include_ticks {
            return Ok(());
        }
        self.send(Event::TimerTick {
            remaining_secs,
            total_secs,
            at: Utc::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Log {
        name: &'static str,
        sink: Arc<Mutex<Vec<String>>>,
        fail: bool,
    }

    fn log(name: &'static str, sink: &Arc<Mutex<Vec<String>>>, fail: bool) -> Arc<Log> {
        Arc::new(Log {
            name,
            sink: sink.clone(),
            fail,
        })
    }

    impl Observer for Log {
        fn on_start(&self, phase: Phase) -> ObserverResult {
            self.sink.lock().unwrap().push(format!("{}:{phase}", self.name));
            if self.fail {
                return Err(ObserverError::new(format!("{} failed", self.name)));
            }
            Ok(())
        }
    }

    #[test]
    fn notifies_in_registration_order() {
        let sink = Arc::new(Mutex::new(Vec::new()));
        let mut hub = ObserverHub::new();
        hub.add(log("a", &sink, false));
        hub.add(log("b", &sink, false));
        hub.started(Phase::Focus).unwrap();
        assert_eq!(*sink.lock().unwrap(), vec!["a:Focus", "b:Focus"]);
    }

    #[test]
    fn add_is_idempotent() {
        let mut hub = ObserverHub::new();
        let obs: Arc<dyn Observer> = Arc::new(Log::default());
        assert!(hub.add(obs.clone()));
        assert!(!hub.add(obs.clone()));
        assert_eq!(hub.len(), 1);
    }

    #[test]
    fn remove_unknown_is_noop() {
        let mut hub = ObserverHub::new();
        hub.add(Arc::new(Log::default()));
        let stranger = Arc::new(Log::default());
        assert!(!hub.remove(&stranger));
        assert_eq!(hub.len(), 1);
    }

    #[test]
    fn remove_by_concrete_handle() {
        let mut hub = ObserverHub::new();
        let obs = Arc::new(Log::default());
        hub.add(obs.clone());
        assert!(hub.contains(&obs));
        assert!(hub.remove(&obs));
        assert!(hub.is_empty());
    }

    #[test]
    fn failure_stops_fan_out() {
        let sink = Arc::new(Mutex::new(Vec::new()));
        let mut hub = ObserverHub::new();
        hub.add(log("a", &sink, true));
        hub.add(log("b", &sink, false));
        let err = hub.started(Phase::Focus).unwrap_err();
        assert_eq!(err.to_string(), "a failed");
        assert_eq!(*sink.lock().unwrap(), vec!["a:Focus"]);
    }

    #[test]
    fn channel_observer_can_skip_ticks() {
        let (obs, mut rx) = ChannelObserver::channel();
        let obs = obs.without_ticks();
        obs.on_tick(10, 20).unwrap();
        obs.on_pause(Phase::Focus).unwrap();
        let event = rx.try_recv().unwrap();
        assert!(matches!(
            event,
            Event::TimerPaused {
                phase: Phase::Focus,
                ..
            }
        ));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn channel_observer_reports_dropped_receiver() {
        let (obs, rx) = ChannelObserver::channel();
        drop(rx);
        assert!(obs.on_start(Phase::Focus).is_err());
    }
}

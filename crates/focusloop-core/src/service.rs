//! Tokio host for a [`TimerEngine`].
//!
//! The engine is confined to a single task that owns both the engine and
//! the one-second interval. Callers talk to it through a cloneable
//! [`TimerHandle`]; every command is applied in arrival order and its
//! result is sent back on a oneshot channel.
//!
//! ```ignore
//! let (mut service, handle) = TimerService::with_config(TimerConfig::default())?;
//! service.engine_mut().add_observer(Arc::new(observer));
//! tokio::spawn(service.run());
//! handle.start().await?;
//! ```

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tokio::time::{self, Instant, Interval, MissedTickBehavior};
use tracing::{debug, warn};

use crate::error::{ConfigError, CoreError, ObserverError};
use crate::events::Event;
use crate::observer::{Observer, ObserverResult};
use crate::timer::{TickGate, TimerConfig, TimerEngine};

/// Cadence of engine ticks.
pub const TICK_PERIOD: Duration = Duration::from_secs(1);

const COMMAND_BUFFER: usize = 32;

enum Command {
    Start(oneshot::Sender<ObserverResult>),
    Pause(oneshot::Sender<ObserverResult>),
    Reset(oneshot::Sender<ObserverResult>),
    Skip(oneshot::Sender<ObserverResult>),
    Snapshot(oneshot::Sender<Event>),
    SetConfig(TimerConfig, oneshot::Sender<Result<(), CoreError>>),
    AddObserver(Arc<dyn Observer>, oneshot::Sender<bool>),
    RemoveObserver(Arc<dyn Observer>, oneshot::Sender<bool>),
    Shutdown,
}

/// Owns the engine and its clock. Consume with [`run`](Self::run).
pub struct TimerService {
    engine: TimerEngine,
    gate: TickGate,
    commands: mpsc::Receiver<Command>,
    tick_errors_tx: mpsc::UnboundedSender<ObserverError>,
    tick_errors_rx: Option<mpsc::UnboundedReceiver<ObserverError>>,
}

impl TimerService {
    /// Wrap an engine that was built with a clone of `gate`.
    pub fn new(engine: TimerEngine, gate: TickGate) -> (Self, TimerHandle) {
        let (tx, commands) = mpsc::channel(COMMAND_BUFFER);
        let (tick_errors_tx, tick_errors_rx) = mpsc::unbounded_channel();
        let service = Self {
            engine,
            gate,
            commands,
            tick_errors_tx,
            tick_errors_rx: Some(tick_errors_rx),
        };
        (service, TimerHandle { tx })
    }

    pub fn with_config(config: TimerConfig) -> Result<(Self, TimerHandle), ConfigError> {
        let gate = TickGate::new();
        let engine = TimerEngine::new(config, gate.clone())?;
        Ok(Self::new(engine, gate))
    }

    /// Access the engine before the service starts, e.g. to add observers.
    pub fn engine_mut(&mut self) -> &mut TimerEngine {
        &mut self.engine
    }

    /// Observer failures raised by ticks, which have no caller to return to.
    ///
    /// Take it before calling [`run`](Self::run); untaken failures are only
    /// logged. Returns `None` after the first call.
    pub fn take_tick_errors(&mut self) -> Option<mpsc::UnboundedReceiver<ObserverError>> {
        self.tick_errors_rx.take()
    }

    /// Process commands and ticks until shutdown or until every handle is dropped.
    pub async fn run(self) {
        let TimerService {
            mut engine,
            gate,
            mut commands,
            tick_errors_tx,
            tick_errors_rx,
        } = self;
        // Nobody took the receiver: close the channel so failures are not queued.
        drop(tick_errors_rx);
        let mut interval: Option<Interval> = None;

        loop {
            sync_interval(&gate, &mut interval);

            tokio::select! {
                _ = next_tick(&mut interval) => {
                    if let Err(err) = engine.tick() {
                        warn!(error = %err, "observer failed during tick");
                        let _ = tick_errors_tx.send(err);
                    }
                }
                command = commands.recv() => match command {
                    Some(Command::Shutdown) | None => break,
                    Some(command) => apply(&mut engine, command),
                },
            }
        }

        debug!("timer service stopped");
    }
}

fn apply(engine: &mut TimerEngine, command: Command) {
    // A dropped reply receiver means the caller stopped waiting.
    match command {
        Command::Start(reply) => {
            let _ = reply.send(engine.start());
        }
        Command::Pause(reply) => {
            let _ = reply.send(engine.pause());
        }
        Command::Reset(reply) => {
            let _ = reply.send(engine.reset());
        }
        Command::Skip(reply) => {
            let _ = reply.send(engine.skip());
        }
        Command::Snapshot(reply) => {
            let _ = reply.send(engine.snapshot());
        }
        Command::SetConfig(config, reply) => {
            let _ = reply.send(engine.set_config(config));
        }
        Command::AddObserver(observer, reply) => {
            let _ = reply.send(engine.add_observer(observer));
        }
        Command::RemoveObserver(observer, reply) => {
            let _ = reply.send(engine.remove_observer(&observer));
        }
        Command::Shutdown => {}
    }
}

/// Create or drop the interval so it exists exactly while the gate is armed.
///
/// A fresh interval fires one full period after arming, so pause/start
/// never produces an immediate tick.
fn sync_interval(gate: &TickGate, interval: &mut Option<Interval>) {
    match (gate.is_armed(), interval.is_some()) {
        (true, false) => {
            let mut fresh = time::interval_at(Instant::now() + TICK_PERIOD, TICK_PERIOD);
            fresh.set_missed_tick_behavior(MissedTickBehavior::Delay);
            *interval = Some(fresh);
            debug!("tick interval armed");
        }
        (false, true) => {
            *interval = None;
            debug!("tick interval disarmed");
        }
        _ => {}
    }
}

async fn next_tick(interval: &mut Option<Interval>) {
    match interval {
        Some(interval) => {
            interval.tick().await;
        }
        None => std::future::pending::<()>().await,
    }
}

/// Cloneable client for a running [`TimerService`].
#[derive(Clone)]
pub struct TimerHandle {
    tx: mpsc::Sender<Command>,
}

impl std::fmt::Debug for TimerHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TimerHandle")
            .field("closed", &self.tx.is_closed())
            .finish()
    }
}

impl TimerHandle {
    pub async fn start(&self) -> Result<(), CoreError> {
        Ok(self.request(Command::Start).await??)
    }

    pub async fn pause(&self) -> Result<(), CoreError> {
        Ok(self.request(Command::Pause).await??)
    }

    pub async fn reset(&self) -> Result<(), CoreError> {
        Ok(self.request(Command::Reset).await??)
    }

    pub async fn skip(&self) -> Result<(), CoreError> {
        Ok(self.request(Command::Skip).await??)
    }

    pub async fn snapshot(&self) -> Result<Event, CoreError> {
        self.request(Command::Snapshot).await
    }

    pub async fn set_config(&self, config: TimerConfig) -> Result<(), CoreError> {
        self.request(|reply| Command::SetConfig(config, reply)).await?
    }

    pub async fn add_observer(&self, observer: Arc<dyn Observer>) -> Result<bool, CoreError> {
        self.request(|reply| Command::AddObserver(observer, reply)).await
    }

    /// Returns `false` if the observer was not registered.
    pub async fn remove_observer(&self, observer: Arc<dyn Observer>) -> Result<bool, CoreError> {
        self.request(|reply| Command::RemoveObserver(observer, reply)).await
    }

    /// Ask the service to stop. Pending commands queued before this one
    /// are still applied.
    pub async fn shutdown(&self) -> Result<(), CoreError> {
        self.tx
            .send(Command::Shutdown)
            .await
            .map_err(|_| CoreError::ServiceClosed)
    }

    async fn request<T, F>(&self, make: F) -> Result<T, CoreError>
    where
        F: FnOnce(oneshot::Sender<T>) -> Command,
    {
        let (reply, response) = oneshot::channel();
        self.tx
            .send(make(reply))
            .await
            .map_err(|_| CoreError::ServiceClosed)?;
        response.await.map_err(|_| CoreError::ServiceClosed)
    }
}

//! # focusloop Core Library
//!
//! This library provides the session timer behind focusloop: alternating
//! focus and break intervals with cycle counting and event fan-out. Front
//! ends (the `focusloop` CLI, a GUI) drive it and subscribe to it; they
//! never reach into its state.
//!
//! ## Architecture
//!
//! - **Timer Engine**: A tick-driven state machine. It arms a tick source
//!   on `start()` and the clock owner calls `tick()` once per second
//! - **Cycle Controller**: The short/long break rule
//! - **Observers**: Ordered, synchronous listeners for lifecycle and ticks
//! - **Service**: Tokio task that owns an engine and its one-second clock
//! - **Storage**: TOML-based user settings
//!
//! ## Key Components
//!
//! - [`TimerEngine`]: Core timer state machine
//! - [`CycleController`]: Break selection policy
//! - [`Observer`] / [`ObserverHub`]: Event contract and registry
//! - [`TimerService`] / [`TimerHandle`]: Async host and client
//! - [`Settings`]: Settings file management

pub mod error;
pub mod events;
pub mod observer;
pub mod service;
pub mod storage;
pub mod timer;

pub use error::{ConfigError, CoreError, ObserverError};
pub use events::Event;
pub use observer::{ChannelObserver, Observer, ObserverHub, ObserverResult};
pub use service::{TimerHandle, TimerService, TICK_PERIOD};
pub use storage::Settings;
pub use timer::{CycleController, Phase, TickGate, TickSource, TimerConfig, TimerEngine};

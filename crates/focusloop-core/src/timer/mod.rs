mod config;
mod cycle;
mod engine;
mod phase;
mod tick;

pub use config::TimerConfig;
pub use cycle::CycleController;
pub use engine::TimerEngine;
pub use phase::Phase;
pub use tick::{TickGate, TickSource};

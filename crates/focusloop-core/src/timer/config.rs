use serde::{Deserialize, Serialize};

use super::Phase;
use crate::error::ConfigError;

/// Durations and cadence for one timer session.
///
/// Construct through [`TimerConfig::new`] or the builder-style setters and
/// call [`validate`](Self::validate); the engine refuses invalid values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerConfig {
    pub focus_secs: u32,
    pub short_break_secs: u32,
    pub long_break_secs: u32,
    /// Every Nth completed focus phase is followed by a long break.
    pub long_break_interval: u32,
    /// Keep running into the next phase after a completion.
    #[serde(default = "default_true")]
    pub auto_continue: bool,
}

fn default_true() -> bool {
    true
}

impl TimerConfig {
    /// Build a validated configuration with `auto_continue` enabled.
    pub fn new(
        focus_secs: u32,
        short_break_secs: u32,
        long_break_secs: u32,
        long_break_interval: u32,
    ) -> Result<Self, ConfigError> {
        let config = Self {
            focus_secs,
            short_break_secs,
            long_break_secs,
            long_break_interval,
            auto_continue: true,
        };
        config.validate()?;
        Ok(config)
    }

    /// Same as [`new`](Self::new) with durations given in minutes.
    pub fn from_minutes(
        focus_min: u32,
        short_break_min: u32,
        long_break_min: u32,
        long_break_interval: u32,
    ) -> Result<Self, ConfigError> {
        Self::new(
            focus_min.saturating_mul(60),
            short_break_min.saturating_mul(60),
            long_break_min.saturating_mul(60),
            long_break_interval,
        )
    }

    pub fn with_auto_continue(mut self, auto_continue: bool) -> Self {
        self.auto_continue = auto_continue;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let durations = [
            ("focus_secs", self.focus_secs),
            ("short_break_secs", self.short_break_secs),
            ("long_break_secs", self.long_break_secs),
        ];
        for (field, secs) in durations {
            if secs == 0 {
                return Err(ConfigError::InvalidDuration { field });
            }
        }
        if self.long_break_interval < 1 {
            return Err(ConfigError::InvalidInterval);
        }
        Ok(())
    }

    /// Configured length of `phase` in seconds.
    pub fn duration_secs(&self, phase: Phase) -> u32 {
        match phase {
            Phase::Focus => self.focus_secs,
            Phase::ShortBreak => self.short_break_secs,
            Phase::LongBreak => self.long_break_secs,
        }
    }
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            focus_secs: 25 * 60,
            short_break_secs: 5 * 60,
            long_break_secs: 15 * 60,
            long_break_interval: 4,
            auto_continue: true,
        }
    }
}

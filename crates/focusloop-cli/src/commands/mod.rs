pub mod config;
pub mod plan;
pub mod run;

use clap::Args;
use focusloop_core::{Settings, TimerConfig};

/// Per-invocation overrides on top of the settings file.
#[derive(Args, Debug, Clone, Default)]
pub struct TimerOverrides {
    /// Focus length in seconds
    #[arg(long)]
    pub focus_secs: Option<u32>,
    /// Short break length in seconds
    #[arg(long)]
    pub short_secs: Option<u32>,
    /// Long break length in seconds
    #[arg(long)]
    pub long_secs: Option<u32>,
    /// Long break after every N focus phases
    #[arg(long)]
    pub interval: Option<u32>,
    /// Wait for `s` after each phase instead of continuing
    #[arg(long)]
    pub manual: bool,
}

impl TimerOverrides {
    /// Settings-file config with these overrides applied, validated.
    pub fn resolve(&self, settings: &Settings) -> Result<TimerConfig, Box<dyn std::error::Error>> {
        let mut config = settings.timer_config()?;
        if let Some(secs) = self.focus_secs {
            config.focus_secs = secs;
        }
        if let Some(secs) = self.short_secs {
            config.short_break_secs = secs;
        }
        if let Some(secs) = self.long_secs {
            config.long_break_secs = secs;
        }
        if let Some(n) = self.interval {
            config.long_break_interval = n;
        }
        if self.manual {
            config.auto_continue = false;
        }
        config.validate()?;
        Ok(config)
    }
}

/// Format seconds as "MM:SS" (minutes keep growing past 59).
pub fn format_clock(secs: u32) -> String {
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

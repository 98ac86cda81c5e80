use std::io::Write;
use std::sync::Arc;

use clap::Args;
use focusloop_core::{
    ChannelObserver, Event, Phase, Settings, TimerConfig, TimerHandle, TimerService,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::debug;

use super::{format_clock, TimerOverrides};

#[derive(Args, Debug)]
pub struct RunArgs {
    #[command(flatten)]
    pub overrides: TimerOverrides,
    /// Print every event as a JSON line
    #[arg(long)]
    pub json: bool,
    /// Exit after this many focus phases complete
    #[arg(long)]
    pub cycles: Option<u32>,
    /// Do not print per-second status
    #[arg(long)]
    pub quiet: bool,
    /// Wait for `s` before the first countdown
    #[arg(long)]
    pub paused: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Input {
    Start,
    Pause,
    Reset,
    Skip,
    Status,
    Quit,
}

fn parse_input(line: &str) -> Option<Input> {
    match line.trim() {
        "s" | "start" => Some(Input::Start),
        "p" | "pause" => Some(Input::Pause),
        "r" | "reset" => Some(Input::Reset),
        "n" | "skip" | "next" => Some(Input::Skip),
        "?" | "status" => Some(Input::Status),
        "q" | "quit" | "exit" => Some(Input::Quit),
        _ => None,
    }
}

const HELP: &str = "commands: s=start p=pause r=reset n=skip ?=status q=quit";

pub fn run(args: RunArgs) -> Result<(), Box<dyn std::error::Error>> {
    let settings = Settings::load_or_default();
    let config = args.overrides.resolve(&settings)?;
    let printer = Printer {
        json: args.json,
        show_ticks: settings.display.show_ticks && !args.quiet,
    };

    let rt = tokio::runtime::Runtime::new()?;
    let result = rt.block_on(session(config, printer, args.cycles, !args.paused));
    // Stdin reads block a worker thread; don't wait for them.
    rt.shutdown_background();
    result
}

async fn session(
    config: TimerConfig,
    printer: Printer,
    cycles: Option<u32>,
    autostart: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let (mut service, handle) = TimerService::with_config(config)?;
    let (observer, mut events) = ChannelObserver::channel();
    service.engine_mut().add_observer(Arc::new(observer));
    let mut tick_errors = service
        .take_tick_errors()
        .ok_or("tick error channel already taken")?;
    let task = tokio::spawn(service.run());

    if !printer.json {
        eprintln!("{HELP}");
    }
    if autostart {
        handle.start().await?;
    } else {
        printer.snapshot(&handle.snapshot().await?)?;
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;
    let mut focus_done: u32 = 0;

    let outcome: Result<(), Box<dyn std::error::Error>> = loop {
        tokio::select! {
            Some(event) = events.recv() => {
                printer.event(&event)?;
                if let Event::TimerCompleted {
                    phase: Phase::Focus,
                    ..
                } = event
                {
                    focus_done += 1;
                    if cycles == Some(focus_done) {
                        break Ok(());
                    }
                }
                if matches!(event, Event::TimerCompleted { .. }) && !printer.json {
                    printer.snapshot(&handle.snapshot().await?)?;
                }
            }
            Some(err) = tick_errors.recv() => break Err(err.into()),
            line = lines.next_line(), if stdin_open => match line? {
                None => {
                    debug!("stdin closed, no further commands");
                    stdin_open = false;
                }
                Some(line) if line.trim().is_empty() => {}
                Some(line) => match parse_input(&line) {
                    Some(Input::Quit) => break Ok(()),
                    Some(input) => apply(&handle, &printer, input).await?,
                    None => eprintln!("unknown command '{}'. {HELP}", line.trim()),
                },
            },
            _ = tokio::signal::ctrl_c() => break Ok(()),
        }
    };

    printer.finish()?;
    handle.shutdown().await?;
    task.await?;
    outcome
}

async fn apply(
    handle: &TimerHandle,
    printer: &Printer,
    input: Input,
) -> Result<(), Box<dyn std::error::Error>> {
    match input {
        Input::Start => handle.start().await?,
        Input::Pause => handle.pause().await?,
        Input::Reset => handle.reset().await?,
        Input::Skip => handle.skip().await?,
        Input::Status => printer.snapshot(&handle.snapshot().await?)?,
        Input::Quit => {}
    }
    Ok(())
}

#[derive(Debug, Clone, Copy)]
struct Printer {
    json: bool,
    show_ticks: bool,
}

impl Printer {
    fn event(&self, event: &Event) -> std::io::Result<()> {
        let mut out = std::io::stdout().lock();
        if self.json {
            if event.is_tick() && !self.show_ticks {
                return Ok(());
            }
            let line = serde_json::to_string(event)?;
            return writeln!(out, "{line}");
        }

        match event {
            Event::TimerTick {
                remaining_secs,
                total_secs,
                ..
            } => {
                if self.show_ticks {
                    write!(
                        out,
                        "\r  {}  {}",
                        format_clock(*remaining_secs),
                        bar(*remaining_secs, *total_secs)
                    )?;
                    out.flush()?;
                }
                Ok(())
            }
            Event::TimerStarted { phase, .. } => writeln!(out, "\r▶ {phase} started"),
            Event::TimerPaused { phase, .. } => writeln!(out, "\r⏸ {phase} paused"),
            Event::TimerReset { .. } => writeln!(out, "\r↺ reset to Focus"),
            Event::TimerCompleted {
                phase,
                duration_secs,
                ..
            } => writeln!(
                out,
                "\r✔ {phase} complete ({})",
                format_clock(*duration_secs)
            ),
            Event::StateSnapshot { .. } => self.snapshot(event),
        }
    }

    fn snapshot(&self, event: &Event) -> std::io::Result<()> {
        let mut out = std::io::stdout().lock();
        if self.json {
            let line = serde_json::to_string(event)?;
            return writeln!(out, "{line}");
        }
        if let Event::StateSnapshot {
            phase,
            running,
            remaining_secs,
            completed_focus_cycles,
            ..
        } = event
        {
            let state = if *running { "running" } else { "waiting" };
            writeln!(
                out,
                "\r  {phase}: {} left, {state}, {completed_focus_cycles} focus cycle(s) done",
                format_clock(*remaining_secs)
            )?;
        }
        Ok(())
    }

    fn finish(&self) -> std::io::Result<()> {
        if !self.json && self.show_ticks {
            writeln!(std::io::stdout())?;
        }
        Ok(())
    }
}

fn bar(remaining: u32, total: u32) -> String {
    const WIDTH: u32 = 20;
    if total == 0 {
        return format!("[{}] 100%", "#".repeat(WIDTH as usize));
    }
    let elapsed = u64::from(total - remaining.min(total));
    let done = (elapsed * u64::from(WIDTH) / u64::from(total)) as u32;
    let pct = elapsed * 100 / u64::from(total);
    format!(
        "[{}{}] {:>3}%",
        "#".repeat(done as usize),
        "-".repeat((WIDTH - done) as usize),
        pct
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_short_and_long_commands() {
        assert_eq!(parse_input("s"), Some(Input::Start));
        assert_eq!(parse_input(" pause \n"), Some(Input::Pause));
        assert_eq!(parse_input("next"), Some(Input::Skip));
        assert_eq!(parse_input("q"), Some(Input::Quit));
        assert_eq!(parse_input("x"), None);
    }

    #[test]
    fn progress_bar_fills() {
        assert_eq!(bar(10, 10), format!("[{}]   0%", "-".repeat(20)));
        assert_eq!(bar(5, 10), format!("[{}{}]  50%", "#".repeat(10), "-".repeat(10)));
        assert_eq!(bar(0, 10), format!("[{}] 100%", "#".repeat(20)));
    }
}

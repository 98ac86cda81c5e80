use clap::Args;
use focusloop_core::{CycleController, Phase, Settings, TickGate, TimerConfig, TimerEngine};
use serde::Serialize;

use super::{format_clock, TimerOverrides};

#[derive(Args, Debug)]
pub struct PlanArgs {
    /// Number of focus cycles to preview
    #[arg(long, default_value = "4")]
    pub cycles: u32,
    /// Print as JSON
    #[arg(long)]
    pub json: bool,
    #[command(flatten)]
    pub overrides: TimerOverrides,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct PlanRow {
    pub index: usize,
    pub phase: Phase,
    pub duration_secs: u32,
    /// Offset from session start.
    pub starts_at_secs: u64,
}

/// Walk a headless engine through `cycles` focus phases and their breaks.
pub fn build_plan(
    config: TimerConfig,
    cycles: u32,
) -> Result<Vec<PlanRow>, Box<dyn std::error::Error>> {
    let mut engine = TimerEngine::new(config, TickGate::new())?;
    let mut rows = Vec::new();
    let mut offset: u64 = 0;

    while engine.completed_focus_cycles() < cycles || engine.current_phase().is_break() {
        rows.push(PlanRow {
            index: rows.len() + 1,
            phase: engine.current_phase(),
            duration_secs: engine.total_secs(),
            starts_at_secs: offset,
        });
        offset += u64::from(engine.total_secs());
        engine.skip()?;
    }

    Ok(rows)
}

pub fn run(args: PlanArgs) -> Result<(), Box<dyn std::error::Error>> {
    let settings = Settings::load_or_default();
    let config = args.overrides.resolve(&settings)?;
    let rows = build_plan(config.clone(), args.cycles)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    println!("{:>3}  {:<12} {:>8}  {:>8}", "#", "PHASE", "LENGTH", "AT");
    for row in &rows {
        let at = u32::try_from(row.starts_at_secs).unwrap_or(u32::MAX);
        println!(
            "{:>3}  {:<12} {:>8}  {:>8}",
            row.index,
            row.phase.label(),
            format_clock(row.duration_secs),
            format_clock(at),
        );
    }
    let total: u64 = rows.iter().map(|r| u64::from(r.duration_secs)).sum();
    println!(
        "total {} min, {} until the next long break afterwards",
        total / 60,
        CycleController::cycles_until_long_break(args.cycles, config.long_break_interval)
    );
    Ok(())
}

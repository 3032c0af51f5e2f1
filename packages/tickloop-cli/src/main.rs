mod scenarios;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand, ValueEnum};
use scenarios::Scenario;
use std::path::{Path, PathBuf};
use tickloop_core::{NestedTimerPolicy, SimulatorConfig, SimulatorState, StateOptions};
use tickloop_devtools::{StateView, explain};
use tickloop_scheduler::{Rule, RunLimits, Step, run_with};
use tracing::Level;

#[derive(Parser)]
#[command(name = "tickloop")]
#[command(about = "Step through a deterministic event-loop model", long_about = None)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a built-in scenario and print the trace
    Run {
        #[arg(long, value_enum, default_value = "basics")]
        scenario: Scenario,

        /// Stop after this many ticks even if work remains
        #[arg(long, default_value_t = 1_000)]
        max_ticks: u64,

        /// Logical time between frames
        #[arg(long)]
        frame_interval: Option<u64>,

        /// Placement of timer-like tasks spawned by effects
        #[arg(long, value_enum)]
        nested_timers: Option<NestedTimers>,

        /// JSON file with a simulator config; flags override it
        #[arg(long)]
        config: Option<PathBuf>,

        #[arg(long, value_enum, default_value = "text")]
        format: Format,
    },
    /// List the scheduling rules in evaluation order
    Rules,
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Text,
    Json,
}

#[derive(Clone, Copy, ValueEnum)]
enum NestedTimers {
    Deferred,
    Immediate,
}

impl From<NestedTimers> for NestedTimerPolicy {
    fn from(value: NestedTimers) -> Self {
        match value {
            NestedTimers::Deferred => NestedTimerPolicy::Deferred,
            NestedTimers::Immediate => NestedTimerPolicy::Immediate,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Run {
            scenario,
            max_ticks,
            frame_interval,
            nested_timers,
            config,
            format,
        } => {
            let mut sim_config = match config {
                Some(path) => load_config(&path)?,
                None => SimulatorConfig::default(),
            };
            if let Some(policy) = nested_timers {
                sim_config.nested_timers = policy.into();
            }
            let options = StateOptions {
                frame_interval,
                ..Default::default()
            };
            let state = scenario.build(SimulatorState::with_config(options, sim_config));
            run_scenario(&state, max_ticks, format)?;
        }
        Commands::Rules => {
            for rule in Rule::ORDER {
                println!("{}. {:<20} {}", rule.priority(), rule, rule.describe());
            }
        }
    }

    Ok(())
}

fn load_config(path: &Path) -> Result<SimulatorConfig> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("Invalid config in {}", path.display()))
}

fn run_scenario(state: &SimulatorState, max_ticks: u64, format: Format) -> Result<()> {
    let mut records = Vec::new();
    let outcome = run_with(state, RunLimits { max_ticks }, |step: &Step| match format {
        Format::Text => println!("{}", explain(step)),
        Format::Json => records.push(serde_json::json!({
            "step": step.state.step,
            "rule": step.rule,
            "now": step.state.now,
            "entries": step.entries(),
            "view": StateView::from(&step.state),
        })),
    })?;

    if let Format::Json = format {
        println!("{}", serde_json::to_string_pretty(&records)?);
    }

    if !outcome.completed {
        bail!(
            "Scenario still had work after {} ticks (t={})",
            max_ticks,
            outcome.state.now
        );
    }
    tracing::info!(
        "finished at t={} after {} ticks, {} frame(s) rendered",
        outcome.state.now,
        outcome.rules.len(),
        outcome.state.frame.frames_rendered
    );
    Ok(())
}

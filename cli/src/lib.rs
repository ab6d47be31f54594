//! `dmwda-sim` command-line front end.
//!
//! Argument parsing and command execution live here so they can be driven
//! from tests; `main.rs` only wires stdout and logging.

use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde::Serialize;

use dmwda_retarget::{AdjustmentPath, DifficultyEngine, StepOutcome};
use dmwda_sim::{simulate, Scenario, SimConfig};
use dmwda_utils::{format_duration, LogFormat};

#[derive(Debug, Parser)]
#[command(
    name = "dmwda-sim",
    version,
    about = "Multi-window difficulty retargeting simulator"
)]
pub struct Cli {
    /// Path to a TOML configuration file. File settings are the base;
    /// CLI flags and env vars override them.
    #[arg(long, global = true, env = "DMWDA_CONFIG")]
    pub config: Option<PathBuf>,

    /// Base seed for scenario generation.
    #[arg(long, global = true, env = "DMWDA_SEED")]
    pub seed: Option<u64>,

    /// Directory for the JSON and Markdown reports.
    #[arg(long, global = true, env = "DMWDA_OUTPUT_DIR")]
    pub output_dir: Option<PathBuf>,

    /// Log level: "trace", "debug", "info", "warn", "error".
    #[arg(long, global = true, env = "DMWDA_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Log format: "human" or "json".
    #[arg(long, global = true, env = "DMWDA_LOG_FORMAT")]
    pub log_format: Option<LogFormat>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Simulate scenarios, print a summary and write reports.
    Run {
        /// Scenario to run (repeatable). Defaults to the configured list.
        #[arg(long = "scenario", value_name = "NAME")]
        scenarios: Vec<Scenario>,
    },
    /// Replay recorded solve times through the engine.
    Replay {
        /// Solve times in seconds, whitespace separated; `#` starts a
        /// comment. Use "-" for stdin.
        #[arg(long)]
        input: PathBuf,

        /// Print JSON instead of a table.
        #[arg(long)]
        json: bool,
    },
    /// Print the effective configuration as TOML.
    Config,
}

/// Machine-readable result of `replay --json`.
#[derive(Debug, Serialize)]
pub struct ReplayOutput {
    pub initial_difficulty: u64,
    pub final_difficulty: u64,
    pub blocks: usize,
    pub outcomes: Vec<StepOutcome>,
}

/// Load the config file (if any) and apply flag and env overrides on top.
pub fn effective_config(cli: &Cli) -> anyhow::Result<SimConfig> {
    let mut config = match &cli.config {
        Some(path) => SimConfig::from_toml_file(path)?,
        None => SimConfig::default(),
    };

    if let Some(seed) = cli.seed {
        config.seed = seed;
    }
    if let Some(dir) = &cli.output_dir {
        config.output_dir = dir.clone();
    }
    if let Some(level) = &cli.log_level {
        config.log_level = level.clone();
    }
    if let Some(format) = cli.log_format {
        config.log_format = format;
    }
    if let Command::Run { scenarios } = &cli.command {
        if !scenarios.is_empty() {
            config.scenarios = scenarios.clone();
        }
    }
    Ok(config)
}

pub fn execute(cli: &Cli, config: &SimConfig, out: &mut dyn Write) -> anyhow::Result<()> {
    match &cli.command {
        Command::Run { .. } => run(config, out),
        Command::Replay { input, json } => replay(config, input, *json, out),
        Command::Config => {
            write!(out, "{}", config.to_toml_string()?)?;
            Ok(())
        }
    }
}

fn run(config: &SimConfig, out: &mut dyn Write) -> anyhow::Result<()> {
    tracing::info!(
        scenarios = config.scenarios.len(),
        seed = config.seed,
        "starting simulation"
    );
    let (_, report) = simulate(config)?;

    writeln!(
        out,
        "{:<18} {:>6} {:>10} {:>9} {:>9} {:>11} {:>8}",
        "scenario", "blocks", "avg_block", "stability", "response", "emergencies", "stealing"
    )?;
    for r in &report.results {
        writeln!(
            out,
            "{:<18} {:>6} {:>10} {:>9.2} {:>9.2} {:>11} {:>8}",
            r.scenario.name(),
            r.blocks,
            format_duration(r.avg_block_time),
            r.stability_score,
            r.response_time,
            r.emergency_activations,
            r.stealing_suspicions,
        )?;
        if let Some(slot) = r.overflow_at {
            writeln!(out, "  halted: difficulty overflowed at block {slot}")?;
        }
    }
    let o = &report.overall;
    writeln!(
        out,
        "overall: stability {:.2}/10, response {:.2} blocks, {} emergencies, {} stealing suspicions",
        o.average_stability_score,
        o.average_response_time,
        o.total_emergency_activations,
        o.total_stealing_suspicions,
    )?;

    for path in report
        .write_reports(&config.output_dir)
        .with_context(|| format!("writing reports to {}", config.output_dir.display()))?
    {
        writeln!(out, "wrote {}", path.display())?;
    }
    Ok(())
}

fn replay(config: &SimConfig, input: &Path, json: bool, out: &mut dyn Write) -> anyhow::Result<()> {
    let text = read_input(input)?;
    let solve_times = parse_solve_times(&text)?;
    tracing::info!(blocks = solve_times.len(), input = %input.display(), "replaying solve times");

    let (state, outcomes) =
        DifficultyEngine::replay(config.params.clone(), config.initial_difficulty, &solve_times)?;

    if json {
        let output = ReplayOutput {
            initial_difficulty: state.initial_difficulty(),
            final_difficulty: state.current_difficulty(),
            blocks: outcomes.len(),
            outcomes,
        };
        serde_json::to_writer_pretty(&mut *out, &output)?;
        writeln!(out)?;
        return Ok(());
    }

    writeln!(out, "{:>6} {:>12} {:>20}  path", "block", "solve_time", "difficulty")?;
    for o in &outcomes {
        writeln!(
            out,
            "{:>6} {:>12.2} {:>20}  {}",
            o.index,
            o.solve_time,
            o.difficulty,
            path_label(&o.path)
        )?;
    }
    Ok(())
}

fn read_input(input: &Path) -> anyhow::Result<String> {
    if input == Path::new("-") {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .context("reading solve times from stdin")?;
        return Ok(text);
    }
    std::fs::read_to_string(input).with_context(|| format!("reading {}", input.display()))
}

/// Parse whitespace- or newline-separated solve times. Text after `#` on a
/// line is ignored.
pub fn parse_solve_times(text: &str) -> anyhow::Result<Vec<f64>> {
    let mut times = Vec::new();
    for (line_no, line) in text.lines().enumerate() {
        let content = line.split('#').next().unwrap_or_default();
        for token in content.split_whitespace() {
            let value = token
                .parse::<f64>()
                .with_context(|| format!("line {}: {token:?} is not a number", line_no + 1))?;
            times.push(value);
        }
    }
    Ok(times)
}

pub fn path_label(path: &AdjustmentPath) -> &'static str {
    match path {
        AdjustmentPath::EarlyProtection => "early_protection",
        AdjustmentPath::Emergency { .. } => "emergency",
        AdjustmentPath::Normal { .. } => "normal",
    }
}

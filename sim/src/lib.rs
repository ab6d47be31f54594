//! Scenario simulation for the DMWDA difficulty engine.
//!
//! Generates synthetic solve-time sequences, replays them through
//! [`dmwda_retarget`], derives post-hoc metrics and renders reports:
//!
//! - [`scenario`]: the hash-rate regimes and their seeded generators.
//! - [`runner`]: engine replay per scenario, in parallel across scenarios.
//! - [`analytics`]: stability, response time, emergency and stealing counts.
//! - [`report`]: JSON and Markdown output.
//! - [`config`]: the TOML-backed run configuration.

pub mod analytics;
pub mod config;
pub mod error;
pub mod report;
pub mod runner;
pub mod scenario;

pub use analytics::{analyze, summarize, AnalysisSettings, OverallMetrics, ScenarioAnalysis};
pub use config::SimConfig;
pub use error::SimError;
pub use report::AnalysisReport;
pub use runner::{run_all, run_scenario, SimulationTrace};
pub use scenario::Scenario;

/// Run every configured scenario, analyse the traces and assemble the report.
pub fn simulate(config: &SimConfig) -> Result<(Vec<SimulationTrace>, AnalysisReport), SimError> {
    config.validate()?;
    let traces = run_all(
        &config.params,
        config.initial_difficulty,
        &config.scenarios,
        config.seed,
    )?;
    let target = config.params.target_secs();
    let analyses = traces
        .iter()
        .map(|t| analyze(t, target, &config.analysis))
        .collect();
    let report = AnalysisReport::new(
        config.params.clone(),
        config.initial_difficulty,
        config.seed,
        analyses,
    );
    Ok((traces, report))
}

//! JSON and Markdown reports over a batch of analysed scenarios.

use std::path::{Path, PathBuf};

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use dmwda_types::RetargetParams;
use dmwda_utils::format_duration;

use crate::analytics::{summarize, OverallMetrics, ScenarioAnalysis};
use crate::SimError;

pub const ALGORITHM_NAME: &str = "DMWDA (Dynamic Multi-Window Difficulty Algorithm)";
pub const JSON_REPORT_FILE: &str = "dmwda_analysis_report.json";
pub const MARKDOWN_REPORT_FILE: &str = "dmwda_analysis_report.md";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    /// RFC 3339, UTC.
    pub generated_at: String,
    pub algorithm: String,
    pub version: String,
    pub initial_difficulty: u64,
    pub seed: u64,
    pub params: RetargetParams,
    pub overall: OverallMetrics,
    pub results: Vec<ScenarioAnalysis>,
}

impl AnalysisReport {
    pub fn new(
        params: RetargetParams,
        initial_difficulty: u64,
        seed: u64,
        results: Vec<ScenarioAnalysis>,
    ) -> Self {
        Self::generated_at(Utc::now(), params, initial_difficulty, seed, results)
    }

    /// Same as [`new`](Self::new) with a fixed timestamp.
    pub fn generated_at(
        at: DateTime<Utc>,
        params: RetargetParams,
        initial_difficulty: u64,
        seed: u64,
        results: Vec<ScenarioAnalysis>,
    ) -> Self {
        Self {
            generated_at: at.to_rfc3339_opts(SecondsFormat::Secs, true),
            algorithm: ALGORITHM_NAME.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            initial_difficulty,
            seed,
            params,
            overall: summarize(&results),
            results,
        }
    }

    pub fn to_json(&self) -> Result<String, SimError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn to_markdown(&self) -> String {
        let o = &self.overall;
        let mut md = format!(
            "# DMWDA Analysis Report\n\n\
             **Generated**: {}\n\
             **Algorithm**: {}\n\
             **Version**: {}\n\
             **Seed**: {}\n\
             **Initial difficulty**: {}\n\n\
             ## Overall Performance Metrics\n\n\
             - **Scenarios**: {}\n\
             - **Average Stability Score**: {:.2}/10\n\
             - **Average Response Time**: {:.2} blocks\n\
             - **Total Emergency Activations**: {}\n\
             - **Total Stealing Suspicions**: {}\n",
            self.generated_at,
            self.algorithm,
            self.version,
            self.seed,
            group_thousands(self.initial_difficulty),
            o.scenarios,
            o.average_stability_score,
            o.average_response_time,
            o.total_emergency_activations,
            o.total_stealing_suspicions,
        );
        if o.halted_scenarios > 0 {
            md.push_str(&format!(
                "- **Halted On Overflow**: {}\n",
                o.halted_scenarios
            ));
        }

        md.push_str("\n## Scenario Analysis\n");
        for r in &self.results {
            md.push_str(&format!(
                "\n### {}\n\n\
                 - **Description**: {}\n\
                 - **Expected Behavior**: {}\n\
                 - **Blocks**: {}\n\
                 - **Average Block Time**: {:.2}s ({})\n\
                 - **Average Difficulty**: {}\n\
                 - **Difficulty Range**: {} - {}\n\
                 - **Emergency Activations**: {}\n\
                 - **Stealing Suspicions**: {}\n\
                 - **Stability Score**: {:.2}/10\n\
                 - **Response Time**: {:.2} blocks\n",
                title_case(r.scenario.name()),
                r.description,
                r.expected_behavior,
                r.blocks,
                r.avg_block_time,
                format_duration(r.avg_block_time),
                group_thousands(r.avg_difficulty.round() as u64),
                group_thousands(r.difficulty_range.0),
                group_thousands(r.difficulty_range.1),
                r.emergency_activations,
                r.stealing_suspicions,
                r.stability_score,
                r.response_time,
            ));
            if let Some(slot) = r.overflow_at {
                md.push_str(&format!(
                    "- **Halted**: difficulty overflowed at block {slot}\n"
                ));
            }
        }

        md.push_str(&format!(
            "\n## Files Generated\n\n\
             - `{JSON_REPORT_FILE}` - Detailed JSON report\n\
             - `{MARKDOWN_REPORT_FILE}` - Human-readable report\n"
        ));
        md
    }

    /// Write both reports into `dir`, creating it if needed.
    pub fn write_reports(&self, dir: &Path) -> Result<Vec<PathBuf>, SimError> {
        std::fs::create_dir_all(dir)?;
        let json_path = dir.join(JSON_REPORT_FILE);
        let md_path = dir.join(MARKDOWN_REPORT_FILE);
        std::fs::write(&json_path, self.to_json()?)?;
        std::fs::write(&md_path, self.to_markdown())?;
        tracing::info!(dir = %dir.display(), "reports written");
        Ok(vec![json_path, md_path])
    }
}

/// `1234567` -> `"1,234,567"`.
fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// `"hash_rate_spike"` -> `"Hash Rate Spike"`.
fn title_case(name: &str) -> String {
    name.split('_')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scenario::Scenario;
    use chrono::TimeZone;

    fn analysis(scenario: Scenario, overflow_at: Option<usize>) -> ScenarioAnalysis {
        ScenarioAnalysis {
            scenario,
            description: scenario.description().to_string(),
            expected_behavior: scenario.expected_behavior().to_string(),
            blocks: 200,
            avg_block_time: 480.0,
            avg_difficulty: 1_234_567.4,
            difficulty_range: (10_000, 2_500_000),
            emergency_activations: 3,
            stealing_suspicions: 7,
            stability_score: 8.5,
            response_time: 2.0,
            overflow_at,
        }
    }

    fn report() -> AnalysisReport {
        let at = Utc.with_ymd_and_hms(2026, 10, 16, 12, 0, 0).unwrap();
        AnalysisReport::generated_at(
            at,
            RetargetParams::production(),
            1_000_000,
            42,
            vec![
                analysis(Scenario::BlockStealing, None),
                analysis(Scenario::HashRateSpike, Some(84)),
            ],
        )
    }

    #[test]
    fn header_fields() {
        let r = report();
        assert_eq!(r.generated_at, "2026-10-16T12:00:00Z");
        assert_eq!(r.algorithm, ALGORITHM_NAME);
        assert_eq!(r.version, env!("CARGO_PKG_VERSION"));
        assert_eq!(r.overall.scenarios, 2);
        assert_eq!(r.overall.total_stealing_suspicions, 14);
        assert_eq!(r.overall.halted_scenarios, 1);
    }

    #[test]
    fn json_parses_back() {
        let r = report();
        let parsed: AnalysisReport = serde_json::from_str(&r.to_json().unwrap()).unwrap();
        assert_eq!(parsed, r);
    }

    #[test]
    fn markdown_has_every_scenario() {
        let md = report().to_markdown();
        assert!(md.starts_with("# DMWDA Analysis Report"));
        assert!(md.contains("### Block Stealing"));
        assert!(md.contains("### Hash Rate Spike"));
        assert!(md.contains("- **Average Difficulty**: 1,234,567"));
        assert!(md.contains("- **Difficulty Range**: 10,000 - 2,500,000"));
        assert!(md.contains("480.00s (8m 0s)"));
        assert!(md.contains("- **Halted**: difficulty overflowed at block 84"));
        assert!(md.contains("- **Halted On Overflow**: 1"));
        assert_eq!(md.matches("- **Halted**:").count(), 1);
    }

    #[test]
    fn group_thousands_formats() {
        assert_eq!(group_thousands(0), "0");
        assert_eq!(group_thousands(999), "999");
        assert_eq!(group_thousands(1_000), "1,000");
        assert_eq!(group_thousands(18_446_744_073_709_551_615), "18,446,744,073,709,551,615");
    }

    #[test]
    fn title_case_words() {
        assert_eq!(title_case("normal_operation"), "Normal Operation");
        assert_eq!(title_case("oscillating"), "Oscillating");
    }
}

//! Machine-readable run report plus console output.
//!
//! Report schema: load-report-v1. Additive changes stay within v1;
//! breaking changes bump to v2.

pub mod console;
pub mod progress;

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::config::LoadConfig;
use crate::engine::RunArtifacts;
use crate::errors::RunError;
use crate::model::{IterationRow, IterationStatus};

/// Current report schema identifier.
pub const SCHEMA_VERSION: &str = "load-report-v1";

/// Top-level JSON report for one load run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoadReport {
    pub schema_version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generated_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_version: Option<String>,
    pub run_id: String,
    /// Endpoints under test; credentials are never echoed.
    pub target: TargetEcho,
    pub iterations: u64,
    pub vus: usize,
    /// Seed driving the scenario draws (configured or generated).
    pub seed: u64,
    pub results: LoadResults,
    /// Per-iteration rows, present only when detail output is requested.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rows: Option<Vec<IterationRow>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TargetEcho {
    pub token_url: String,
    pub graphql_url: String,
}

/// Aggregated check results.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoadResults {
    pub iterations: u64,
    pub passes: u64,
    pub failures: u64,
    /// Iterations that never produced an HTTP status.
    pub errors: u64,
    pub pass_rate: f64,
    pub pass_all: bool,
    /// Selection counts per scenario name, deterministic order.
    pub by_scenario: BTreeMap<String, u64>,
    pub latency_ms: LatencySummary,
}

/// Latency of completed submissions in milliseconds.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LatencySummary {
    pub min: u64,
    pub p50: u64,
    pub p95: u64,
    pub max: u64,
}

/// Folds iteration rows into the aggregate block.
pub fn aggregate(rows: &[IterationRow]) -> LoadResults {
    let mut passes = 0u64;
    let mut failures = 0u64;
    let mut errors = 0u64;
    let mut by_scenario: BTreeMap<String, u64> = BTreeMap::new();
    let mut latencies: Vec<u64> = Vec::with_capacity(rows.len());

    for row in rows {
        match row.status {
            IterationStatus::Pass => passes += 1,
            IterationStatus::Fail => failures += 1,
            IterationStatus::Error => errors += 1,
        }
        *by_scenario.entry(row.scenario.clone()).or_insert(0) += 1;
        // Error rows never completed a submission; their durations
        // (often 0) would drag min and p50 toward zero.
        if row.status != IterationStatus::Error {
            latencies.push(row.duration_ms);
        }
    }
    latencies.sort_unstable();

    let total = rows.len() as u64;
    let pass_rate = if total == 0 {
        0.0
    } else {
        passes as f64 / total as f64
    };
    LoadResults {
        iterations: total,
        passes,
        failures,
        errors,
        pass_rate,
        pass_all: total > 0 && passes == total,
        by_scenario,
        latency_ms: LatencySummary {
            min: latencies.first().copied().unwrap_or(0),
            p50: percentile(&latencies, 50.0),
            p95: percentile(&latencies, 95.0),
            max: latencies.last().copied().unwrap_or(0),
        },
    }
}

/// Nearest-rank percentile over a sorted slice.
fn percentile(sorted: &[u64], p: f64) -> u64 {
    if sorted.is_empty() {
        return 0;
    }
    let rank = ((p / 100.0) * sorted.len() as f64).ceil() as usize;
    sorted[rank.clamp(1, sorted.len()) - 1]
}

/// Assembles the report from a finished run.
pub fn build_report(cfg: &LoadConfig, artifacts: &RunArtifacts, detail: bool) -> LoadReport {
    LoadReport {
        schema_version: SCHEMA_VERSION.to_string(),
        generated_at: Some(artifacts.started_at.clone()),
        tool_version: Some(env!("CARGO_PKG_VERSION").to_string()),
        run_id: artifacts.run_id.clone(),
        target: TargetEcho {
            token_url: cfg.target.token_url.clone(),
            graphql_url: cfg.target.graphql_url.clone(),
        },
        iterations: cfg.settings.iterations,
        vus: cfg.settings.vus,
        seed: artifacts.seed,
        results: aggregate(&artifacts.rows),
        rows: detail.then(|| artifacts.rows.clone()),
    }
}

/// Writes the report as pretty JSON.
pub fn write_report(report: &LoadReport, path: &Path) -> Result<(), RunError> {
    let json = serde_json::to_string_pretty(report).map_err(|e| RunError::Other {
        detail: format!("failed to serialize report: {e}"),
    })?;
    std::fs::write(path, json)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(index: u64, scenario: &str, status: IterationStatus, duration_ms: u64) -> IterationRow {
        IterationRow {
            index,
            scenario: scenario.to_string(),
            status,
            http_status: match status {
                IterationStatus::Pass => Some(200),
                IterationStatus::Fail => Some(500),
                IterationStatus::Error => None,
            },
            duration_ms,
            message: None,
        }
    }

    #[test]
    fn aggregate_counts_statuses_and_scenarios() {
        let rows = vec![
            row(0, "open-account-instant", IterationStatus::Pass, 40),
            row(1, "open-account-instant", IterationStatus::Pass, 60),
            row(2, "closed-account-instant", IterationStatus::Fail, 80),
            row(3, "hold-account-default", IterationStatus::Error, 20),
        ];
        let agg = aggregate(&rows);
        assert_eq!(agg.iterations, 4);
        assert_eq!(agg.passes, 2);
        assert_eq!(agg.failures, 1);
        assert_eq!(agg.errors, 1);
        assert!(!agg.pass_all);
        assert_eq!(agg.pass_rate, 0.5);
        assert_eq!(agg.by_scenario["open-account-instant"], 2);
        assert_eq!(agg.latency_ms.min, 40);
        assert_eq!(agg.latency_ms.max, 80);
    }

    #[test]
    fn error_rows_are_excluded_from_latency() {
        let rows = vec![
            row(0, "open-account-instant", IterationStatus::Pass, 40),
            row(1, "open-account-instant", IterationStatus::Pass, 60),
            row(2, "hold-account-default", IterationStatus::Error, 0),
            row(3, "hold-account-default", IterationStatus::Error, 0),
        ];
        let agg = aggregate(&rows);
        assert_eq!(agg.errors, 2);
        assert_eq!(agg.latency_ms.min, 40);
        assert_eq!(agg.latency_ms.p50, 40);
        assert_eq!(agg.latency_ms.max, 60);
    }

    #[test]
    fn all_error_rows_give_a_zeroed_latency_summary() {
        let rows = vec![row(0, "open-account-instant", IterationStatus::Error, 0)];
        let agg = aggregate(&rows);
        assert_eq!(agg.latency_ms.min, 0);
        assert_eq!(agg.latency_ms.p95, 0);
        assert_eq!(agg.latency_ms.max, 0);
    }

    #[test]
    fn aggregate_empty_rows() {
        let agg = aggregate(&[]);
        assert_eq!(agg.iterations, 0);
        assert!(!agg.pass_all);
        assert_eq!(agg.pass_rate, 0.0);
        assert_eq!(agg.latency_ms.max, 0);
    }

    #[test]
    fn percentile_nearest_rank() {
        let sorted: Vec<u64> = (1..=100).collect();
        assert_eq!(percentile(&sorted, 50.0), 50);
        assert_eq!(percentile(&sorted, 95.0), 95);
        assert_eq!(percentile(&sorted, 100.0), 100);
        assert_eq!(percentile(&[42], 95.0), 42);
        assert_eq!(percentile(&[], 50.0), 0);
    }

    #[test]
    fn report_schema_v1_serialization() {
        let rows = vec![
            row(0, "open-account-instant", IterationStatus::Pass, 40),
            row(1, "closed-account-default", IterationStatus::Fail, 55),
        ];
        let report = LoadReport {
            schema_version: SCHEMA_VERSION.into(),
            generated_at: Some("2026-08-29T12:00:00Z".into()),
            tool_version: Some("0.1.0".into()),
            run_id: "b57cdd9e-0f6e-4a52-9f3b-1f6a5a4f9f11".into(),
            target: TargetEcho {
                token_url: "https://secure-staging.example.test/connect/token".into(),
                graphql_url: "https://api-staging.example.test/graphql".into(),
            },
            iterations: 2,
            vus: 1,
            seed: 42,
            results: aggregate(&rows),
            rows: Some(rows),
        };

        let json = serde_json::to_string_pretty(&report).unwrap();
        let parsed: LoadReport = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed.schema_version, "load-report-v1");
        assert_eq!(parsed.results.passes, 1);
        assert_eq!(parsed.results.failures, 1);
        assert_eq!(parsed.results.pass_rate, 0.5);
        assert_eq!(parsed.rows.as_ref().unwrap().len(), 2);
        assert!(!json.contains("client_secret"));
    }

    #[test]
    fn write_report_produces_readable_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("load-report.json");
        let report = LoadReport {
            schema_version: SCHEMA_VERSION.into(),
            generated_at: None,
            tool_version: None,
            run_id: "test".into(),
            target: TargetEcho {
                token_url: "https://t.example.test/token".into(),
                graphql_url: "https://t.example.test/graphql".into(),
            },
            iterations: 0,
            vus: 1,
            seed: 0,
            results: aggregate(&[]),
            rows: None,
        };
        write_report(&report, &path).unwrap();
        let parsed: LoadReport =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(parsed.run_id, "test");
    }
}

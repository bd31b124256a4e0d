//! JSON summary export

use std::fs::File;
use std::io::Write;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use servebench_core::{BenchmarkSummary, DispatchStats, RunConfig};

use crate::error::ReportResult;

/// Everything recorded about a finished run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    /// When the report was produced
    pub generated_at: DateTime<Utc>,

    /// Backend identifier
    pub backend: String,

    /// Target URL
    pub url: String,

    /// Dispatcher configuration
    pub run: RunConfig,

    /// Launched executions
    pub launched: usize,

    /// Completed executions
    pub completed: usize,

    /// Aggregate figures
    pub summary: BenchmarkSummary,
}

impl RunReport {
    /// Assemble a report stamped with the current time
    pub fn new(
        backend: impl Into<String>,
        url: impl Into<String>,
        run: RunConfig,
        stats: &DispatchStats,
        summary: BenchmarkSummary,
    ) -> Self {
        Self {
            generated_at: Utc::now(),
            backend: backend.into(),
            url: url.into(),
            run,
            launched: stats.launched,
            completed: stats.completed,
            summary,
        }
    }

    /// Pretty-print the report to `writer`
    pub fn write_to<W: Write>(&self, writer: W) -> ReportResult<()> {
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }

    /// Write the report to `path`
    pub fn export(&self, path: &Path) -> ReportResult<()> {
        let mut file = File::create(path)?;
        self.write_to(&mut file)?;
        file.write_all(b"\n")?;
        tracing::info!(path = %path.display(), "Exported summary");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use servebench_core::{DispatchMode, RequestRate};

    fn report() -> RunReport {
        let mut stats = DispatchStats::new();
        stats.launched = 3;
        stats.completed = 3;
        let summary = BenchmarkSummary {
            request_count: 3,
            mean_latency_secs: 0.5,
            ..BenchmarkSummary::default()
        };
        let run = RunConfig::new(DispatchMode::Sequential)
            .with_request_rate(RequestRate::PerSecond(2.0))
            .with_seed(7);
        RunReport::new("ksana", "http://0.0.0.0:8888/generate", run, &stats, summary)
    }

    #[test]
    fn test_json_shape() {
        let mut out = Vec::new();
        report().write_to(&mut out).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();

        assert_eq!(value["backend"], "ksana");
        assert_eq!(value["run"]["mode"], "sequential");
        assert_eq!(value["run"]["request_rate"]["per_second"], 2.0);
        assert_eq!(value["run"]["seed"], 7);
        assert_eq!(value["launched"], 3);
        assert_eq!(value["summary"]["request_count"], 3);
        assert_eq!(value["summary"]["mean_latency_secs"], 0.5);
        assert!(value["generated_at"].is_string());
    }

    #[test]
    fn test_export_reads_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("summary.json");
        let original = report();
        original.export(&path).unwrap();

        let parsed: RunReport =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(parsed.summary, original.summary);
        assert_eq!(parsed.generated_at, original.generated_at);
        assert_eq!(parsed.run.mode, DispatchMode::Sequential);
    }
}

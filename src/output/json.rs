//! JSON output formatting
//!
//! Renders a [`RunSummary`] as one JSON document on stdout, tagged with the
//! host name and run start time so summaries from several machines can be
//! told apart.

use crate::config::RunConfig;
use crate::stats::{RunSummary, WorkerStats};
use crate::worker::WorkerKind;
use crate::Result;
use anyhow::Context;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::PathBuf;

/// Counters with throughput precomputed
#[derive(Debug, Clone, Serialize)]
pub struct JsonStats {
    pub iterations: u64,
    pub files: u64,
    pub aborted_files: u64,
    pub skipped_entries: u64,
    pub bytes: u64,
    pub io_errors: u64,
    pub busy_secs: f64,
    pub mib_per_sec: f64,
    pub reclaims: u64,
    pub reclaimed_files: u64,
    pub reclaim_errors: u64,
}

impl From<&WorkerStats> for JsonStats {
    fn from(stats: &WorkerStats) -> Self {
        Self {
            iterations: stats.iterations,
            files: stats.files,
            aborted_files: stats.aborted_files,
            skipped_entries: stats.skipped_entries,
            bytes: stats.bytes,
            io_errors: stats.io_errors,
            busy_secs: stats.busy.as_secs_f64(),
            mib_per_sec: stats.mib_per_sec(),
            reclaims: stats.reclaims,
            reclaimed_files: stats.reclaimed_files,
            reclaim_errors: stats.reclaim_errors,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct JsonWorker {
    pub kind: WorkerKind,
    pub directory: PathBuf,
    pub elapsed_secs: f64,
    pub stats: JsonStats,
}

#[derive(Debug, Clone, Serialize)]
pub struct JsonRunSummary<'a> {
    pub host: String,
    pub started_at: String,
    pub elapsed_secs: f64,
    pub config: &'a RunConfig,
    pub workers: Vec<JsonWorker>,
    pub write_totals: JsonStats,
    pub read_totals: JsonStats,
}

impl<'a> JsonRunSummary<'a> {
    pub fn new(summary: &RunSummary, config: &'a RunConfig, started_at: DateTime<Utc>) -> Self {
        let host = hostname::get()
            .ok()
            .and_then(|h| h.into_string().ok())
            .unwrap_or_else(|| "unknown".to_string());

        Self {
            host,
            started_at: started_at.to_rfc3339(),
            elapsed_secs: summary.elapsed.as_secs_f64(),
            config,
            workers: summary
                .workers
                .iter()
                .map(|w| JsonWorker {
                    kind: w.kind,
                    directory: w.directory.clone(),
                    elapsed_secs: w.elapsed.as_secs_f64(),
                    stats: JsonStats::from(&w.stats),
                })
                .collect(),
            write_totals: JsonStats::from(&summary.totals(WorkerKind::Write)),
            read_totals: JsonStats::from(&summary.totals(WorkerKind::Read)),
        }
    }
}

/// Serialize the run summary as pretty-printed JSON
pub fn format_summary(summary: &RunSummary, config: &RunConfig, started_at: DateTime<Utc>) -> Result<String> {
    serde_json::to_string_pretty(&JsonRunSummary::new(summary, config, started_at))
        .context("Failed to serialize run summary")
}

pub fn print_summary(summary: &RunSummary, config: &RunConfig, started_at: DateTime<Utc>) -> Result<()> {
    println!("{}", format_summary(summary, config, started_at)?);
    Ok(())
}

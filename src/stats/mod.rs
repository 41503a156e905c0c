//! Statistics collection
//!
//! Each worker owns one [`WorkerStats`] and mutates it without any
//! synchronization; it is handed back to the coordinator inside a
//! [`WorkerSummary`] when the worker's thread finishes.

use crate::util::time::calculate_mib_per_sec;
use crate::worker::{FileReport, WorkerKind};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Per-worker counters
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkerStats {
    /// Outer loop passes completed
    pub iterations: u64,
    /// Files fully written or read
    pub files: u64,
    /// Files whose write loop stopped early on a short or failed write
    pub aborted_files: u64,
    /// Entries skipped by a reader (vanished, unreadable, not a file)
    pub skipped_entries: u64,
    /// Bytes actually transferred
    pub bytes: u64,
    /// Failed read calls (counted, never retried)
    pub io_errors: u64,
    /// Time spent inside file passes
    pub busy: Duration,
    /// Reclaim sweeps performed
    pub reclaims: u64,
    /// Files removed by reclaim sweeps
    pub reclaimed_files: u64,
    /// Per-entry reclaim failures
    pub reclaim_errors: u64,
}

impl WorkerStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Account for one finished file pass
    pub fn record_file(&mut self, report: &FileReport) {
        if report.complete {
            self.files += 1;
        } else {
            self.aborted_files += 1;
        }
        self.bytes += report.bytes;
        self.io_errors += report.errors;
        self.busy += report.elapsed;
    }

    /// Throughput over the time spent in file passes, in MiB/s
    pub fn mib_per_sec(&self) -> f64 {
        calculate_mib_per_sec(self.bytes, self.busy)
    }

    /// Fold another worker's counters into this one
    pub fn merge(&mut self, other: &WorkerStats) {
        self.iterations += other.iterations;
        self.files += other.files;
        self.aborted_files += other.aborted_files;
        self.skipped_entries += other.skipped_entries;
        self.bytes += other.bytes;
        self.io_errors += other.io_errors;
        self.busy += other.busy;
        self.reclaims += other.reclaims;
        self.reclaimed_files += other.reclaimed_files;
        self.reclaim_errors += other.reclaim_errors;
    }
}

/// What a worker hands back when it finishes
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerSummary {
    pub kind: WorkerKind,
    pub directory: PathBuf,
    pub stats: WorkerStats,
    /// Wall time from worker start to finish
    pub elapsed: Duration,
}

/// Outcome of a whole run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    pub workers: Vec<WorkerSummary>,
    pub elapsed: Duration,
}

impl RunSummary {
    /// Combined counters of every worker of `kind`
    pub fn totals(&self, kind: WorkerKind) -> WorkerStats {
        let mut total = WorkerStats::new();
        for worker in self.workers.iter().filter(|w| w.kind == kind) {
            total.merge(&worker.stats);
        }
        total
    }
}

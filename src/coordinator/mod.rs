//! Coordinator module
//!
//! Turns a validated [`RunConfig`] into running workers and collects their
//! results:
//!
//! 1. Prepare every directory, in order (write mode only)
//! 2. For every directory, in order: build a writer (write mode) and a
//!    reader (read mode), and start each on its own named thread
//! 3. Join every writer, then every reader
//! 4. Return the per-worker summaries, or the first fatal worker error
//!
//! A worker that fails (or panics) raises the shared [`StopSignal`] from its
//! own thread, so every other worker winds down at its next iteration
//! boundary and the joins complete.
//!
//! # Join order
//!
//! Writers are joined before readers. Readers that finish early therefore
//! have their summaries collected only after the last writer is done; the
//! per-file reports they print are unaffected.

use crate::config::RunConfig;
use crate::distribution::size::SizeSampler;
use crate::stats::{RunSummary, WorkerSummary};
use crate::target::prepare_directory;
use crate::worker::{ReadWorker, WorkerKind, WriteWorker};
use crate::Result;
use anyhow::Context;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Instant;
use tracing::{error, info};

/// Cooperative cancellation flag shared by a run's workers
///
/// Workers poll it between files, between directory entries and while
/// sleeping after a reclaim sweep. IO calls already in flight are never
/// interrupted.
#[derive(Debug, Clone, Default)]
pub struct StopSignal(Arc<AtomicBool>);

impl StopSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn raise(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    #[inline]
    pub fn is_raised(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Raises the stop signal if the owning thread unwinds
struct RaiseOnPanic(StopSignal);

impl Drop for RaiseOnPanic {
    fn drop(&mut self) {
        if thread::panicking() {
            self.0.raise();
        }
    }
}

struct WorkerHandle {
    kind: WorkerKind,
    directory: PathBuf,
    handle: JoinHandle<Result<WorkerSummary>>,
}

/// Runs one writer and/or reader per target directory
pub struct Coordinator {
    config: RunConfig,
    stop: StopSignal,
}

impl Coordinator {
    pub fn new(config: RunConfig) -> Self {
        Self {
            config,
            stop: StopSignal::new(),
        }
    }

    /// Handle that ends the run early when raised
    pub fn stop_signal(&self) -> StopSignal {
        self.stop.clone()
    }

    /// Start every worker and wait for all of them
    pub fn run(&self) -> Result<RunSummary> {
        let start = Instant::now();

        let mut writers = Vec::new();
        let mut readers = Vec::new();
        if let Err(e) = self.spawn_all(&mut writers, &mut readers) {
            error!(error = %e, "startup failed, stopping workers");
            self.stop.raise();
            let _ = self.join_all(writers, readers);
            return Err(e);
        }

        info!(writers = writers.len(), readers = readers.len(), "all workers started");
        let workers = self.join_all(writers, readers)?;

        Ok(RunSummary {
            workers,
            elapsed: start.elapsed(),
        })
    }

    fn spawn_all(&self, writers: &mut Vec<WorkerHandle>, readers: &mut Vec<WorkerHandle>) -> Result<()> {
        let workload = Arc::new(self.config.workload.clone());
        let mut worker_index = 0u64;

        // All directories are prepared before any worker starts
        if self.config.write {
            for dir in &self.config.directories {
                prepare_directory(dir, workload.clear_before_start)?;
            }
        }

        for (i, dir) in self.config.directories.iter().enumerate() {
            if self.config.write {
                let worker = WriteWorker::new(dir.clone(), workload.clone(), self.sampler(worker_index))?;
                worker_index += 1;
                writers.push(self.spawn(format!("writer-{}", i), WorkerKind::Write, dir.clone(), move |stop| {
                    worker.run(stop)
                })?);
            }

            if self.config.read {
                let worker = ReadWorker::new(dir.clone(), workload.clone(), self.sampler(worker_index))?;
                worker_index += 1;
                readers.push(self.spawn(format!("reader-{}", i), WorkerKind::Read, dir.clone(), move |stop| {
                    worker.run(stop)
                })?);
            }
        }

        Ok(())
    }

    /// Per-worker sampler: seeded deterministically from the run seed if one
    /// was given
    fn sampler(&self, worker_index: u64) -> SizeSampler {
        match self.config.seed {
            Some(seed) => SizeSampler::with_seed(seed.wrapping_add(worker_index)),
            None => SizeSampler::new(),
        }
    }

    fn spawn<F>(&self, name: String, kind: WorkerKind, directory: PathBuf, body: F) -> Result<WorkerHandle>
    where
        F: FnOnce(&StopSignal) -> Result<WorkerSummary> + Send + 'static,
    {
        let stop = self.stop.clone();
        let handle = thread::Builder::new()
            .name(name.clone())
            .spawn(move || {
                let _guard = RaiseOnPanic(stop.clone());
                let result = body(&stop);
                if result.is_err() {
                    stop.raise();
                }
                result
            })
            .with_context(|| format!("Failed to spawn {}", name))?;

        Ok(WorkerHandle {
            kind,
            directory,
            handle,
        })
    }

    /// Join all writers, then all readers
    fn join_all(&self, writers: Vec<WorkerHandle>, readers: Vec<WorkerHandle>) -> Result<Vec<WorkerSummary>> {
        let mut summaries = Vec::with_capacity(writers.len() + readers.len());
        let mut first_error = None;

        for worker in writers.into_iter().chain(readers) {
            let context = format!("{} for {}", worker.kind, worker.directory.display());
            let error = match worker.handle.join() {
                Ok(Ok(summary)) => {
                    summaries.push(summary);
                    continue;
                }
                Ok(Err(e)) => e.context(format!("{} failed", context)),
                Err(_) => {
                    self.stop.raise();
                    anyhow::anyhow!("{} panicked", context)
                }
            };
            error!(error = %format!("{:#}", error), "worker failed");
            first_error.get_or_insert(error);
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(summaries),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{IoMode, Iterations, WorkloadConfig};
    use crate::distribution::SizeRange;
    use crate::target::list_entries;
    use std::fs;
    use std::path::Path;
    use std::time::Duration;
    use tempfile::TempDir;

    fn run_config(dirs: Vec<PathBuf>, write: bool, read: bool, iterations: Iterations) -> RunConfig {
        RunConfig {
            directories: dirs,
            read,
            write,
            workload: WorkloadConfig {
                buffer_size: SizeRange::fixed(4096),
                file_size: SizeRange::new(16 * 1024, 64 * 1024),
                delete_threshold: 0,
                clear_before_start: false,
                flush_each_file: false,
                sleep_after_reclaim: Duration::ZERO,
                io_mode: IoMode::Buffered,
                iterations,
            },
            seed: Some(1),
        }
    }

    fn count_files(dir: &Path) -> usize {
        list_entries(dir).unwrap().len()
    }

    #[test]
    fn test_writers_for_every_directory() {
        let temp_dir = TempDir::new().unwrap();
        let dirs: Vec<PathBuf> = (0..3).map(|i| temp_dir.path().join(format!("d{}", i))).collect();

        let summary = Coordinator::new(run_config(dirs.clone(), true, false, Iterations::Count(2)))
            .run()
            .unwrap();

        assert_eq!(summary.workers.len(), 3);
        assert!(summary.workers.iter().all(|w| w.kind == WorkerKind::Write));
        for dir in &dirs {
            assert_eq!(count_files(dir), 2);
        }
        assert_eq!(summary.totals(WorkerKind::Write).files, 6);
    }

    #[test]
    fn test_writers_joined_before_readers() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path().join("mixed");
        fs::create_dir(&dir).unwrap();
        fs::write(dir.join("seed.dat"), vec![7u8; 8192]).unwrap();

        let summary = Coordinator::new(run_config(vec![dir.clone()], true, true, Iterations::Count(2)))
            .run()
            .unwrap();

        let kinds: Vec<WorkerKind> = summary.workers.iter().map(|w| w.kind).collect();
        assert_eq!(kinds, vec![WorkerKind::Write, WorkerKind::Read]);
        assert_eq!(summary.totals(WorkerKind::Read).iterations, 2);
    }

    #[test]
    fn test_clear_before_start() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path().join("clr");
        fs::create_dir(&dir).unwrap();
        fs::write(dir.join("stale.dat"), b"old").unwrap();

        let mut config = run_config(vec![dir.clone()], true, false, Iterations::Count(1));
        config.workload.clear_before_start = true;
        Coordinator::new(config).run().unwrap();

        assert!(!dir.join("stale.dat").exists());
        assert_eq!(count_files(&dir), 1);
    }

    #[test]
    fn test_repeated_directory_is_cleared_once_before_writing() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path().join("shared");
        fs::create_dir(&dir).unwrap();
        fs::write(dir.join("stale.dat"), b"old").unwrap();

        let mut config = run_config(vec![dir.clone(), dir.clone()], true, false, Iterations::Count(5));
        config.workload.clear_before_start = true;
        let summary = Coordinator::new(config).run().unwrap();

        assert_eq!(summary.totals(WorkerKind::Write).files, 10);
        assert!(!dir.join("stale.dat").exists());
        assert_eq!(count_files(&dir), 10);
    }

    #[test]
    fn test_read_only_leaves_directory_untouched() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("a.dat"), vec![0u8; 16384]).unwrap();

        let summary = Coordinator::new(run_config(
            vec![temp_dir.path().to_path_buf()],
            false,
            true,
            Iterations::Count(1),
        ))
        .run()
        .unwrap();

        assert_eq!(summary.workers.len(), 1);
        assert_eq!(summary.totals(WorkerKind::Read).files, 1);
        assert_eq!(count_files(temp_dir.path()), 1);
    }

    #[test]
    fn test_fatal_worker_error_stops_the_run() {
        let temp_dir = TempDir::new().unwrap();
        let good = temp_dir.path().join("good");
        fs::create_dir(&good).unwrap();
        fs::write(good.join("a.dat"), vec![0u8; 8192]).unwrap();

        // The reader of the missing directory fails at once; the infinite
        // reader of the good one must be stopped so the run can end
        let config = run_config(
            vec![good, temp_dir.path().join("missing")],
            false,
            true,
            Iterations::Infinite,
        );

        let err = Coordinator::new(config).run().unwrap_err();
        assert!(format!("{:#}", err).contains("missing"));
    }

    #[test]
    fn test_stop_signal_ends_infinite_run() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path().join("w");

        let coordinator = Coordinator::new(run_config(vec![dir], true, false, Iterations::Infinite));
        let stop = coordinator.stop_signal();

        let handle = std::thread::spawn(move || coordinator.run());
        std::thread::sleep(Duration::from_millis(50));
        stop.raise();

        let summary = handle.join().unwrap().unwrap();
        assert!(summary.totals(WorkerKind::Write).iterations > 0);
    }

    #[test]
    fn test_setup_failure_creates_no_workers() {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("not-a-dir");
        fs::write(&file, b"x").unwrap();

        let result = Coordinator::new(run_config(vec![file], true, false, Iterations::Count(1))).run();
        assert!(result.is_err());
    }

    #[test]
    fn test_seeded_runs_repeat_sizes() {
        let temp_dir = TempDir::new().unwrap();
        let a = temp_dir.path().join("a");
        let b = temp_dir.path().join("b");

        Coordinator::new(run_config(vec![a.clone()], true, false, Iterations::Count(3))).run().unwrap();
        Coordinator::new(run_config(vec![b.clone()], true, false, Iterations::Count(3))).run().unwrap();

        let sizes = |dir: &Path| {
            let mut sizes: Vec<u64> = list_entries(dir)
                .unwrap()
                .iter()
                .map(|p| fs::metadata(p).unwrap().len())
                .collect();
            sizes.sort();
            sizes
        };
        assert_eq!(sizes(&a), sizes(&b));
    }
}

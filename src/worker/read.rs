//! Read worker
//!
//! Each iteration lists the directory once and reads every regular file in
//! it front to back, `size / buffer_size` calls of a freshly sampled buffer
//! size per file. Entries that disappear or cannot be opened in the meantime
//! are skipped; failed read calls are counted and otherwise ignored.

use super::{chunk_count, FileReport, WorkerKind};
use crate::config::{IoMode, WorkloadConfig};
use crate::coordinator::StopSignal;
use crate::distribution::size::SizeSampler;
use crate::output::text::print_file_report;
use crate::stats::{WorkerStats, WorkerSummary};
use crate::target::list_entries;
use crate::util::buffer::IoBuffer;
use crate::Result;
use std::fs::{self, File};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Read worker bound to one directory
pub struct ReadWorker {
    directory: PathBuf,
    config: Arc<WorkloadConfig>,
    sampler: SizeSampler,
    buffer: IoBuffer,
    stats: WorkerStats,
}

impl ReadWorker {
    pub fn new(directory: PathBuf, config: Arc<WorkloadConfig>, sampler: SizeSampler) -> Result<Self> {
        // Reads always go through the page cache
        let buffer = IoBuffer::for_mode(config.max_buffer_size(), IoMode::Buffered)?;
        Ok(Self {
            directory,
            config,
            sampler,
            buffer,
            stats: WorkerStats::new(),
        })
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Run until the configured iterations are done or `stop` is raised
    ///
    /// Failing to list the directory ends the worker with an error.
    pub fn run(mut self, stop: &StopSignal) -> Result<WorkerSummary> {
        info!(dir = %self.directory.display(), iterations = %self.config.iterations, "starting reader");
        let start = Instant::now();

        while !self.config.iterations.is_done(self.stats.iterations) {
            if stop.is_raised() {
                info!(dir = %self.directory.display(), "reader stopped");
                break;
            }

            self.sweep(stop)?;
            self.stats.iterations += 1;
        }

        info!(dir = %self.directory.display(), files = self.stats.files, "reader finished");
        Ok(WorkerSummary {
            kind: WorkerKind::Read,
            directory: self.directory,
            stats: self.stats,
            elapsed: start.elapsed(),
        })
    }

    /// Read every file currently in the directory once
    fn sweep(&mut self, stop: &StopSignal) -> Result<()> {
        for path in list_entries(&self.directory)? {
            if stop.is_raised() {
                break;
            }

            match self.read_one(&path) {
                Some(report) => {
                    print_file_report(&report);
                    self.stats.record_file(&report);
                }
                None => self.stats.skipped_entries += 1,
            }
        }
        Ok(())
    }

    /// Read `path` sequentially, or `None` if it is gone, not a regular file
    /// or cannot be opened
    pub fn read_one(&mut self, path: &Path) -> Option<FileReport> {
        let buffer_size = self.sampler.sample(self.config.buffer_size);

        let metadata = match fs::metadata(path) {
            Ok(metadata) => metadata,
            Err(e) => {
                debug!(path = %path.display(), error = %e, "skipping entry");
                return None;
            }
        };
        if !metadata.is_file() {
            debug!(path = %path.display(), "skipping non-file entry");
            return None;
        }

        let size = metadata.len();
        let chunks = chunk_count(size, buffer_size);

        let start = Instant::now();
        let mut file = match File::open(path) {
            Ok(file) => file,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "cannot open file for reading");
                return None;
            }
        };

        let len = buffer_size as usize;
        let mut bytes = 0u64;
        let mut errors = 0u64;
        for _ in 0..chunks {
            match file.read(&mut self.buffer.as_mut_slice()[..len]) {
                Ok(n) => bytes += n as u64,
                Err(_) => errors += 1,
            }
        }
        drop(file);

        if errors > 0 {
            warn!(path = %path.display(), errors, "read calls failed");
        }

        Some(FileReport {
            kind: WorkerKind::Read,
            path: path.to_path_buf(),
            size,
            buffer_size,
            chunks,
            bytes,
            elapsed: start.elapsed(),
            errors,
            complete: true,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Iterations;
    use crate::distribution::SizeRange;
    use std::time::Duration;
    use tempfile::TempDir;

    const MIB: u64 = 1024 * 1024;

    fn test_config(buffer_size: SizeRange, iterations: Iterations) -> WorkloadConfig {
        WorkloadConfig {
            buffer_size,
            file_size: SizeRange::fixed(MIB as i64),
            delete_threshold: 0,
            clear_before_start: false,
            flush_each_file: false,
            sleep_after_reclaim: Duration::ZERO,
            io_mode: IoMode::Buffered,
            iterations,
        }
    }

    fn worker(dir: &Path, config: WorkloadConfig) -> ReadWorker {
        ReadWorker::new(dir.to_path_buf(), Arc::new(config), SizeSampler::with_seed(11)).unwrap()
    }

    fn write_file(dir: &Path, name: &str, size: u64) -> PathBuf {
        let path = dir.join(name);
        let file = File::create(&path).unwrap();
        file.set_len(size).unwrap();
        path
    }

    #[test]
    fn test_chunk_count_follows_file_size() {
        let temp_dir = TempDir::new().unwrap();
        let small = write_file(temp_dir.path(), "small", 5 * MIB);
        let large = write_file(temp_dir.path(), "large", 50 * MIB);

        let mut w = worker(temp_dir.path(), test_config(SizeRange::fixed(4096), Iterations::Count(1)));

        let small_report = w.read_one(&small).unwrap();
        assert_eq!(small_report.chunks, 5 * MIB / 4096);
        assert_eq!(small_report.bytes, 5 * MIB);

        let large_report = w.read_one(&large).unwrap();
        assert_eq!(large_report.chunks, 50 * MIB / 4096);
        assert_eq!(large_report.bytes, 50 * MIB);
        assert_eq!(large_report.errors, 0);
    }

    #[test]
    fn test_remainder_is_not_read() {
        let temp_dir = TempDir::new().unwrap();
        let path = write_file(temp_dir.path(), "odd", 10_000);

        let mut w = worker(temp_dir.path(), test_config(SizeRange::fixed(4096), Iterations::Count(1)));
        let report = w.read_one(&path).unwrap();

        assert_eq!(report.size, 10_000);
        assert_eq!(report.chunks, 2);
        assert_eq!(report.bytes, 8192);
    }

    #[test]
    fn test_missing_entry_is_skipped() {
        let temp_dir = TempDir::new().unwrap();
        let mut w = worker(temp_dir.path(), test_config(SizeRange::fixed(4096), Iterations::Count(1)));
        assert!(w.read_one(&temp_dir.path().join("gone")).is_none());
    }

    #[test]
    fn test_run_sweeps_every_iteration() {
        let temp_dir = TempDir::new().unwrap();
        write_file(temp_dir.path(), "a", 64 * 1024);
        write_file(temp_dir.path(), "b", 128 * 1024);
        fs::create_dir(temp_dir.path().join("sub")).unwrap();

        let config = test_config(SizeRange::new(-1, 8192), Iterations::Count(3));
        let summary = worker(temp_dir.path(), config).run(&StopSignal::new()).unwrap();

        assert_eq!(summary.kind, WorkerKind::Read);
        assert_eq!(summary.stats.iterations, 3);
        assert_eq!(summary.stats.files, 6);
        assert_eq!(summary.stats.skipped_entries, 3);
    }

    #[test]
    fn test_empty_directory() {
        let temp_dir = TempDir::new().unwrap();
        let summary = worker(temp_dir.path(), test_config(SizeRange::fixed(4096), Iterations::Count(2)))
            .run(&StopSignal::new())
            .unwrap();
        assert_eq!(summary.stats.iterations, 2);
        assert_eq!(summary.stats.files, 0);
    }

    #[test]
    fn test_missing_directory_is_fatal() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("missing");
        let result = worker(&missing, test_config(SizeRange::fixed(4096), Iterations::Count(1)))
            .run(&StopSignal::new());
        assert!(result.is_err());
    }

    #[test]
    fn test_stop_ends_infinite_reader() {
        let temp_dir = TempDir::new().unwrap();
        write_file(temp_dir.path(), "a", 4096);

        let stop = StopSignal::new();
        let handle = {
            let stop = stop.clone();
            let w = worker(temp_dir.path(), test_config(SizeRange::fixed(4096), Iterations::Infinite));
            std::thread::spawn(move || w.run(&stop))
        };

        std::thread::sleep(Duration::from_millis(50));
        stop.raise();
        let summary = handle.join().unwrap().unwrap();
        assert!(summary.stats.iterations > 0);
    }
}

//! Write worker
//!
//! Each iteration:
//!
//! 1. **Reclaim** if more than `delete_threshold` bytes were written since
//!    the last sweep: empty the directory, reset the counter, hint the
//!    allocator and sleep `sleep_after_reclaim`
//! 2. **Sample** a buffer size and a file size
//! 3. **Create** a uniquely named test file
//! 4. **Write** `file_size / buffer_size` full buffers, one call each; the
//!    remainder of the logical size is never written
//! 5. **Finalize**: optional durable sync, close
//! 6. **Report** elapsed time for steps 2-5 and throughput
//!
//! A short or failed write abandons the current file where it stands and the
//! loop moves on. Failing to create or open a test file ends the worker with
//! an error.

use super::{chunk_count, FileReport, WorkerKind};
use crate::config::WorkloadConfig;
use crate::coordinator::StopSignal;
use crate::distribution::size::SizeSampler;
use crate::output::text::print_file_report;
use crate::stats::{WorkerStats, WorkerSummary};
use crate::target::{create_test_file, open_for_write, reclaim_directory};
use crate::util::buffer::IoBuffer;
use crate::util::memory::release_free_memory;
use crate::util::time::sleep_unless_stopped;
use crate::Result;
use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

/// Write worker bound to one directory
pub struct WriteWorker {
    directory: PathBuf,
    config: Arc<WorkloadConfig>,
    sampler: SizeSampler,
    buffer: IoBuffer,
    /// Bytes written since the last reclaim sweep
    bytes_since_reclaim: u64,
    stats: WorkerStats,
}

impl WriteWorker {
    /// Create a writer for `directory`, allocating its buffer
    ///
    /// The directory is expected to exist already (see
    /// [`prepare_directory`](crate::target::prepare_directory)).
    pub fn new(directory: PathBuf, config: Arc<WorkloadConfig>, sampler: SizeSampler) -> Result<Self> {
        let buffer = IoBuffer::for_mode(config.max_buffer_size(), config.io_mode)?;
        Ok(Self {
            directory,
            config,
            sampler,
            buffer,
            bytes_since_reclaim: 0,
            stats: WorkerStats::new(),
        })
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    pub fn bytes_since_reclaim(&self) -> u64 {
        self.bytes_since_reclaim
    }

    pub fn stats(&self) -> &WorkerStats {
        &self.stats
    }

    /// Run until the configured iterations are done or `stop` is raised
    pub fn run(self, stop: &StopSignal) -> Result<WorkerSummary> {
        let mode = self.config.io_mode;
        self.run_with(stop, |path| open_for_write(path, mode))
    }

    fn run_with<W, F>(mut self, stop: &StopSignal, mut open: F) -> Result<WorkerSummary>
    where
        W: TestFileWriter,
        F: FnMut(&Path) -> Result<W>,
    {
        info!(dir = %self.directory.display(), iterations = %self.config.iterations, "starting writer");
        let start = Instant::now();

        while !self.config.iterations.is_done(self.stats.iterations) {
            if stop.is_raised() {
                info!(dir = %self.directory.display(), "writer stopped");
                break;
            }

            self.reclaim_if_due(stop);
            if stop.is_raised() {
                info!(dir = %self.directory.display(), "writer stopped");
                break;
            }

            let report = self.write_one_with(&mut open)?;
            if report.complete {
                print_file_report(&report);
            }
            self.stats.record_file(&report);
            self.stats.iterations += 1;
        }

        info!(dir = %self.directory.display(), files = self.stats.files, "writer finished");
        Ok(WorkerSummary {
            kind: WorkerKind::Write,
            directory: self.directory,
            stats: self.stats,
            elapsed: start.elapsed(),
        })
    }

    /// Empty the directory once the counter has passed the threshold
    ///
    /// Returns whether a sweep ran.
    fn reclaim_if_due(&mut self, stop: &StopSignal) -> bool {
        let threshold = self.config.delete_threshold;
        if threshold == 0 || self.bytes_since_reclaim <= threshold {
            return false;
        }

        info!(
            dir = %self.directory.display(),
            bytes_written = self.bytes_since_reclaim,
            "deleting all files"
        );
        let outcome = reclaim_directory(&self.directory);
        self.stats.reclaims += 1;
        self.stats.reclaimed_files += outcome.removed;
        self.stats.reclaim_errors += outcome.errors;
        self.bytes_since_reclaim = 0;

        release_free_memory();

        let pause = self.config.sleep_after_reclaim;
        if !pause.is_zero() {
            info!(dir = %self.directory.display(), seconds = pause.as_secs(), "sleeping after delete");
            sleep_unless_stopped(pause, stop);
        }
        true
    }

    /// Create and write one test file
    ///
    /// Errors are fatal (the file could not be created or opened); a failed
    /// write is reported through [`FileReport::complete`] instead.
    pub fn write_one(&mut self) -> Result<FileReport> {
        let mode = self.config.io_mode;
        self.write_one_with(&mut |path: &Path| open_for_write(path, mode))
    }

    fn write_one_with<W, F>(&mut self, open: &mut F) -> Result<FileReport>
    where
        W: TestFileWriter,
        F: FnMut(&Path) -> Result<W>,
    {
        let start = Instant::now();

        let buffer_size = self.sampler.sample(self.config.buffer_size);
        let size = self.sampler.sample(self.config.file_size);
        let chunks = chunk_count(size, buffer_size);

        let path = create_test_file(&self.directory)?;
        let mut file = open(&path)?;

        let (written, complete) = self.write_chunks(&mut file, &path, chunks, buffer_size as usize);

        if complete && self.config.flush_each_file {
            if let Err(e) = file.sync() {
                warn!(path = %path.display(), error = %e, "flush failed");
            }
        }
        drop(file);

        Ok(FileReport {
            kind: WorkerKind::Write,
            path,
            size,
            buffer_size,
            chunks,
            bytes: written,
            elapsed: start.elapsed(),
            errors: 0,
            complete,
        })
    }

    /// Issue `chunks` writes of `len` bytes, stopping at the first short or
    /// failed one
    ///
    /// Returns the bytes written and whether every chunk went through. Every
    /// byte that lands counts toward the reclaim threshold.
    fn write_chunks<W: Write>(&mut self, out: &mut W, path: &Path, chunks: u64, len: usize) -> (u64, bool) {
        let mut written = 0u64;

        for chunk in 0..chunks {
            self.buffer.stamp_chunk(chunk);
            match out.write(&self.buffer.as_slice()[..len]) {
                Ok(n) => {
                    written += n as u64;
                    self.bytes_since_reclaim += n as u64;
                    if n != len {
                        warn!(path = %path.display(), chunk, wrote = n, expected = len, "short write, abandoning file");
                        return (written, false);
                    }
                }
                Err(e) => {
                    warn!(path = %path.display(), chunk, error = %e, "write failed, abandoning file");
                    return (written, false);
                }
            }
        }

        (written, true)
    }
}

/// Destination of a test file's chunks
trait TestFileWriter: Write {
    /// Durable sync of everything written so far
    fn sync(&mut self) -> io::Result<()>;
}

impl TestFileWriter for File {
    fn sync(&mut self) -> io::Result<()> {
        self.sync_all()
    }
}

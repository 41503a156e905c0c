//! Workers
//!
//! A worker is an independent loop bound to one target directory and one
//! mode. Workers share no mutable state: each owns its buffer, its size
//! sampler and its counters, and runs on its own thread until its iteration
//! count is reached or the run's [`StopSignal`](crate::coordinator::StopSignal)
//! is raised.
//!
//! - [`write::WriteWorker`]: creates files of sampled size in sampled chunks,
//!   emptying the directory whenever enough bytes have been written
//! - [`read::ReadWorker`]: sweeps the directory, reading every file through
//!
//! Writers and readers pointed at the same directory do not coordinate. A
//! reader may see a file mid-write, mid-truncate or already gone.

pub mod read;
pub mod write;

pub use read::ReadWorker;
pub use write::WriteWorker;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

/// Worker mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkerKind {
    Write,
    Read,
}

impl fmt::Display for WorkerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorkerKind::Write => write!(f, "writer"),
            WorkerKind::Read => write!(f, "reader"),
        }
    }
}

/// Outcome of writing or reading one file
#[derive(Debug, Clone, PartialEq)]
pub struct FileReport {
    pub kind: WorkerKind,
    pub path: PathBuf,
    /// Logical file size: sampled on the write path, on-disk size when reading
    pub size: u64,
    pub buffer_size: u64,
    /// Planned calls, `size / buffer_size`
    pub chunks: u64,
    /// Bytes actually transferred
    pub bytes: u64,
    pub elapsed: Duration,
    /// Failed read calls
    pub errors: u64,
    /// False when a write loop stopped early
    pub complete: bool,
}

impl FileReport {
    /// Throughput of the logical size over the elapsed time, in MiB/s
    pub fn mib_per_sec(&self) -> f64 {
        crate::util::time::calculate_mib_per_sec(self.size, self.elapsed)
    }
}

/// Number of whole buffers that fit in `size`
///
/// The remainder is never transferred. A zero buffer size (possible when the
/// minimum is negative) plans no calls at all.
#[inline]
pub fn chunk_count(size: u64, buffer_size: u64) -> u64 {
    if buffer_size == 0 {
        0
    } else {
        size / buffer_size
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chunk_count_drops_remainder() {
        assert_eq!(chunk_count(10 * 1024 * 1024, 1024 * 1024), 10);
        assert_eq!(chunk_count(10_000, 4096), 2);
        assert_eq!(chunk_count(4095, 4096), 0);
    }

    #[test]
    fn test_chunk_count_zero_buffer() {
        assert_eq!(chunk_count(1 << 20, 0), 0);
    }

    #[test]
    fn test_report_throughput() {
        let report = FileReport {
            kind: WorkerKind::Read,
            path: PathBuf::from("/tmp/td1"),
            size: 8 * 1024 * 1024,
            buffer_size: 4096,
            chunks: 2048,
            bytes: 8 * 1024 * 1024,
            elapsed: Duration::from_secs(2),
            errors: 0,
            complete: true,
        };
        assert_eq!(report.mib_per_sec(), 4.0);
    }
}

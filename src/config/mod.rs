//! Configuration module
//!
//! Settings arrive in user units (GB thresholds, MB file sizes, byte buffer
//! sizes, seconds) from the command line and an optional TOML file as a
//! [`RawConfig`]. The validator checks them once and converts them into a
//! [`RunConfig`] holding bytes and durations, which is all the workers ever
//! see.

pub mod cli;
pub mod toml;
pub mod validator;
pub mod workload;

pub use workload::{IoMode, Iterations, WorkloadConfig, DIRECT_IO_ALIGNMENT};

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Bytes per megabyte (file size flags)
pub const MB: i64 = 1024 * 1024;

/// Bytes per gigabyte (delete threshold flag)
pub const GB: i64 = 1024 * 1024 * 1024;

/// Unvalidated settings in user units
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawConfig {
    /// Target directories, one writer and/or reader each
    pub directories: Vec<PathBuf>,
    /// Cumulative GB written before a directory is emptied; 0 disables
    pub delete_threshold_gb: i64,
    /// Min file size in MB; negative means "anything below max"
    pub min_file_size_mb: i64,
    /// Max file size in MB
    pub max_file_size_mb: i64,
    /// Min buffer size in bytes; negative means "anything below max"
    pub min_buffer_size: i64,
    /// Max buffer size in bytes
    pub max_buffer_size: i64,
    /// Clear target directories before writing
    pub clear: bool,
    pub read: bool,
    pub write: bool,
    /// Durable sync after each written file
    pub flush: bool,
    /// Seconds to sleep after each reclaim sweep
    pub sleep_secs: i64,
    /// Iterations per worker; negative runs forever
    pub iterations: i64,
    /// Bypass the page cache for writes
    pub direct: bool,
    /// Base seed for the per-worker random generators
    pub seed: Option<u64>,
}

impl Default for RawConfig {
    fn default() -> Self {
        Self {
            directories: Vec::new(),
            delete_threshold_gb: 0,
            min_file_size_mb: 1,
            max_file_size_mb: 1024,
            min_buffer_size: 8 * 1024,
            max_buffer_size: 8 * 1024,
            clear: false,
            read: false,
            write: false,
            flush: false,
            sleep_secs: 0,
            iterations: -1,
            direct: false,
            seed: None,
        }
    }
}

/// Validated run configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    pub directories: Vec<PathBuf>,
    pub read: bool,
    pub write: bool,
    pub workload: WorkloadConfig,
    pub seed: Option<u64>,
}

impl fmt::Display for RunConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let w = &self.workload;
        let modes = match (self.write, self.read) {
            (true, true) => "write+read",
            (true, false) => "write",
            (false, true) => "read",
            (false, false) => "none",
        };
        writeln!(f, "Configuration:")?;
        writeln!(f, "  Mode:            {}", modes)?;
        writeln!(f, "  Directories:     {}", self.directories.len())?;
        for dir in &self.directories {
            writeln!(f, "    {}", dir.display())?;
        }
        writeln!(f, "  Buffer size:     {} bytes", w.buffer_size)?;
        writeln!(f, "  File size:       {} bytes", w.file_size)?;
        if w.delete_threshold > 0 {
            writeln!(f, "  Reclaim after:   {} bytes", w.delete_threshold)?;
        } else {
            writeln!(f, "  Reclaim after:   disabled")?;
        }
        writeln!(f, "  Sleep after:     {}s", w.sleep_after_reclaim.as_secs())?;
        writeln!(f, "  Clear first:     {}", w.clear_before_start)?;
        writeln!(f, "  Flush per file:  {}", w.flush_each_file)?;
        match w.io_mode {
            IoMode::Buffered => writeln!(f, "  IO mode:         buffered")?,
            IoMode::Direct { alignment } => writeln!(f, "  IO mode:         direct (alignment {})", alignment)?,
        }
        writeln!(f, "  Iterations:      {}", w.iterations)?;
        match self.seed {
            Some(seed) => write!(f, "  Seed:            {}", seed),
            None => write!(f, "  Seed:            random"),
        }
    }
}

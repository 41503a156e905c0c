//! Workload definition structures

use crate::distribution::SizeRange;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Alignment, in bytes, required of direct IO buffers and transfer sizes
pub const DIRECT_IO_ALIGNMENT: usize = 4096;

/// How written files are opened
///
/// `Direct` is only ever constructed by the validator, after it has checked
/// that the buffer size is fixed and a multiple of `alignment`. Holding one
/// is proof that the write path can allocate an aligned buffer and bypass
/// the page cache without further checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IoMode {
    Buffered,
    Direct { alignment: usize },
}

impl IoMode {
    pub fn is_direct(&self) -> bool {
        matches!(self, IoMode::Direct { .. })
    }
}

/// Number of outer loop passes per worker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Iterations {
    Count(u64),
    Infinite,
}

impl Iterations {
    /// Interpret the `--iter` flag: negative means run forever
    pub fn from_flag(iter: i64) -> Self {
        if iter < 0 {
            Iterations::Infinite
        } else {
            Iterations::Count(iter as u64)
        }
    }

    /// True once `completed` passes satisfy the limit
    #[inline]
    pub fn is_done(&self, completed: u64) -> bool {
        match self {
            Iterations::Count(n) => completed >= *n,
            Iterations::Infinite => false,
        }
    }
}

impl fmt::Display for Iterations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Iterations::Count(n) => write!(f, "{}", n),
            Iterations::Infinite => write!(f, "infinite"),
        }
    }
}

/// Validated per-worker settings, shared by every directory
///
/// All sizes are in bytes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkloadConfig {
    /// Bytes per write or read call
    pub buffer_size: SizeRange,
    /// Logical size of generated files (write path only)
    pub file_size: SizeRange,
    /// Cumulative bytes written before a reclaim sweep; 0 disables reclaim
    pub delete_threshold: u64,
    /// Empty each write directory before its first iteration
    pub clear_before_start: bool,
    /// Durable sync before closing each written file
    pub flush_each_file: bool,
    /// Pause after each reclaim sweep
    pub sleep_after_reclaim: Duration,
    pub io_mode: IoMode,
    pub iterations: Iterations,
}

impl WorkloadConfig {
    /// Largest buffer size any sample can produce, i.e. the allocation size
    /// of a worker buffer
    pub fn max_buffer_size(&self) -> usize {
        self.buffer_size.max.max(0) as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_iterations_from_flag() {
        assert_eq!(Iterations::from_flag(-1), Iterations::Infinite);
        assert_eq!(Iterations::from_flag(-42), Iterations::Infinite);
        assert_eq!(Iterations::from_flag(0), Iterations::Count(0));
        assert_eq!(Iterations::from_flag(3), Iterations::Count(3));
    }

    #[test]
    fn test_iterations_is_done() {
        let three = Iterations::Count(3);
        assert!(!three.is_done(2));
        assert!(three.is_done(3));
        assert!(!Iterations::Infinite.is_done(u64::MAX));
        assert!(Iterations::Count(0).is_done(0));
    }

    #[test]
    fn test_io_mode_is_direct() {
        assert!(!IoMode::Buffered.is_direct());
        assert!(IoMode::Direct { alignment: DIRECT_IO_ALIGNMENT }.is_direct());
    }
}

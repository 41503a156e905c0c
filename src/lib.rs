//! diskchurn - synthetic disk churn generator
//!
//! diskchurn loads a storage volume the way a long-running data store does:
//! it keeps creating files of random size, written in random-size chunks,
//! reads them back, and periodically wipes directories once enough data has
//! been written, so the volume sees steady capacity churn instead of a
//! single fill.
//!
//! # Architecture
//!
//! - **distribution**: size sampling for buffers and files
//! - **worker**: one write or read loop per target directory
//! - **coordinator**: validation-to-threads orchestration and joins
//! - **target**: directory preparation, test files, reclaim sweeps
//! - **stats / output**: per-worker counters, text and JSON reports

pub mod config;
pub mod coordinator;
pub mod distribution;
pub mod observability;
pub mod output;
pub mod stats;
pub mod target;
pub mod util;
pub mod worker;

pub use config::{RawConfig, RunConfig};
pub use coordinator::{Coordinator, StopSignal};

/// Result type used throughout diskchurn
pub type Result<T> = anyhow::Result<T>;

/// Exit status for usage errors (incomplete or inconsistent settings)
pub const EXIT_USAGE: i32 = 1;

/// Exit status for fatal errors (direct IO misconfiguration, a worker that
/// cannot create or list files)
pub const EXIT_FATAL: i32 = 2;

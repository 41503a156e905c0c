//! Configuration validation
//!
//! Every check runs here, before any directory is touched or any worker is
//! spawned. Unit conversion (GB and MB to bytes, seconds to a duration)
//! happens once, on the way from [`RawConfig`] to [`RunConfig`].

use super::*;
use crate::distribution::SizeRange;
use std::time::Duration;
use thiserror::Error;

/// Reasons a configuration is rejected
///
/// Usage errors mean the command line was incomplete or inconsistent.
/// Fatal errors concern direct IO, whose buffer constraints cannot be
/// relaxed at runtime.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Need --read or --write")]
    MissingMode,

    #[error("Need target dir")]
    MissingDirectories,

    #[error("maxbs must be greater than 0, got {0}")]
    NonPositiveBufferSize(i64),

    #[error("maxfs must be greater than 0 and not smaller than maxbs (maxfs={max_file} bytes, maxbs={max_buffer} bytes)")]
    FileSizeRange { max_file: i64, max_buffer: i64 },

    #[error("{name} min ({min}) exceeds max ({max})")]
    InvertedRange { name: &'static str, min: i64, max: i64 },

    #[error("{name} must not be negative, got {value}")]
    NegativeValue { name: &'static str, value: i64 },

    #[error("{name} is too large: {value}")]
    ValueTooLarge { name: &'static str, value: i64 },

    #[error("block sizes must be the same for direct IO (minbs={min}, maxbs={max})")]
    DirectBufferRange { min: i64, max: i64 },

    #[error("block size {size} must be a multiple of {alignment} for direct IO")]
    DirectBufferAlignment { size: i64, alignment: usize },
}

impl ConfigError {
    /// Direct IO misconfiguration aborts; everything else is a usage error
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            ConfigError::DirectBufferRange { .. } | ConfigError::DirectBufferAlignment { .. }
        )
    }

    /// Process exit status for this error
    pub fn exit_code(&self) -> i32 {
        if self.is_fatal() {
            crate::EXIT_FATAL
        } else {
            crate::EXIT_USAGE
        }
    }
}

/// Validate raw settings and convert them into a [`RunConfig`]
pub fn validate(raw: &RawConfig) -> std::result::Result<RunConfig, ConfigError> {
    if !raw.read && !raw.write {
        return Err(ConfigError::MissingMode);
    }

    if raw.directories.is_empty() {
        return Err(ConfigError::MissingDirectories);
    }

    if raw.max_buffer_size <= 0 {
        return Err(ConfigError::NonPositiveBufferSize(raw.max_buffer_size));
    }

    let min_file = to_bytes("minfs", raw.min_file_size_mb, MB)?;
    let max_file = to_bytes("maxfs", raw.max_file_size_mb, MB)?;

    if max_file <= 0 || max_file < raw.max_buffer_size {
        return Err(ConfigError::FileSizeRange {
            max_file,
            max_buffer: raw.max_buffer_size,
        });
    }

    check_range("buffer size", raw.min_buffer_size, raw.max_buffer_size)?;
    check_range("file size", min_file, max_file)?;

    let io_mode = direct_io_mode(raw)?;

    if raw.delete_threshold_gb < 0 {
        return Err(ConfigError::NegativeValue {
            name: "ds",
            value: raw.delete_threshold_gb,
        });
    }
    let delete_threshold = to_bytes("ds", raw.delete_threshold_gb, GB)? as u64;

    if raw.sleep_secs < 0 {
        return Err(ConfigError::NegativeValue {
            name: "sleep",
            value: raw.sleep_secs,
        });
    }

    Ok(RunConfig {
        directories: raw.directories.clone(),
        read: raw.read,
        write: raw.write,
        workload: WorkloadConfig {
            buffer_size: SizeRange::new(raw.min_buffer_size, raw.max_buffer_size),
            file_size: SizeRange::new(min_file, max_file),
            delete_threshold,
            clear_before_start: raw.clear,
            flush_each_file: raw.flush,
            sleep_after_reclaim: Duration::from_secs(raw.sleep_secs as u64),
            io_mode,
            iterations: Iterations::from_flag(raw.iterations),
        },
        seed: raw.seed,
    })
}

/// Direct IO needs one fixed, alignment-sized transfer unit
fn direct_io_mode(raw: &RawConfig) -> std::result::Result<IoMode, ConfigError> {
    if !raw.direct {
        return Ok(IoMode::Buffered);
    }

    if raw.min_buffer_size != raw.max_buffer_size {
        return Err(ConfigError::DirectBufferRange {
            min: raw.min_buffer_size,
            max: raw.max_buffer_size,
        });
    }

    if raw.max_buffer_size % DIRECT_IO_ALIGNMENT as i64 != 0 {
        return Err(ConfigError::DirectBufferAlignment {
            size: raw.max_buffer_size,
            alignment: DIRECT_IO_ALIGNMENT,
        });
    }

    Ok(IoMode::Direct {
        alignment: DIRECT_IO_ALIGNMENT,
    })
}

/// A negative min is the "below max" marker, any other min must not exceed max
fn check_range(name: &'static str, min: i64, max: i64) -> std::result::Result<(), ConfigError> {
    if min >= 0 && min > max {
        return Err(ConfigError::InvertedRange { name, min, max });
    }
    Ok(())
}

fn to_bytes(name: &'static str, value: i64, unit: i64) -> std::result::Result<i64, ConfigError> {
    value
        .checked_mul(unit)
        .ok_or(ConfigError::ValueTooLarge { name, value })
}

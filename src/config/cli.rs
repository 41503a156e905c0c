//! CLI argument parsing using clap
//!
//! Value flags are `Option`s so that a TOML file given with `--config` can
//! supply anything not set explicitly on the command line. Defaults live in
//! [`RawConfig::default`](super::RawConfig).

use clap::Parser;
use std::path::PathBuf;

/// diskchurn - create, read and reclaim randomly sized files to load a volume
#[derive(Parser, Debug, Default)]
#[command(name = "diskchurn")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Target directories (one worker per directory and mode)
    #[arg(value_name = "DIR")]
    pub directories: Vec<PathBuf>,

    // === Modes ===
    /// Do reads
    #[arg(long)]
    pub read: bool,

    /// Do writes
    #[arg(long)]
    pub write: bool,

    // === Sizes ===
    /// Size in GB written before files in the target directory are deleted [default: 0, disabled]
    #[arg(long = "ds", value_name = "GB", allow_negative_numbers = true)]
    pub delete_threshold_gb: Option<i64>,

    /// Min file size in MB; negative picks anything below --maxfs [default: 1]
    #[arg(long = "minfs", value_name = "MB", allow_negative_numbers = true)]
    pub min_file_size_mb: Option<i64>,

    /// Max file size in MB [default: 1024]
    #[arg(long = "maxfs", value_name = "MB", allow_negative_numbers = true)]
    pub max_file_size_mb: Option<i64>,

    /// Min buffer size in bytes; negative picks anything below --maxbs [default: 8192]
    #[arg(long = "minbs", value_name = "BYTES", allow_negative_numbers = true)]
    pub min_buffer_size: Option<i64>,

    /// Max buffer size in bytes [default: 8192]
    #[arg(long = "maxbs", value_name = "BYTES", allow_negative_numbers = true)]
    pub max_buffer_size: Option<i64>,

    // === Behaviour ===
    /// Clear target directory before writing
    #[arg(long = "clr")]
    pub clear: bool,

    /// Flush after each file has been written
    #[arg(long)]
    pub flush: bool,

    /// Seconds to sleep after a delete, giving the file system time to catch up [default: 0]
    #[arg(long = "sleep", value_name = "SECONDS", allow_negative_numbers = true)]
    pub sleep_secs: Option<i64>,

    /// Number of iterations per worker; -1 runs forever [default: -1]
    #[arg(long = "iter", value_name = "N", allow_negative_numbers = true)]
    pub iterations: Option<i64>,

    /// Direct IO for writes (requires --minbs == --maxbs)
    #[arg(long)]
    pub direct: bool,

    /// Seed for the per-worker random generators (reproducible sizes)
    #[arg(long)]
    pub seed: Option<u64>,

    // === Configuration File ===
    /// TOML configuration file; command line values take precedence
    #[arg(short = 'c', long)]
    pub config: Option<PathBuf>,

    /// Dry run - validate configuration without executing
    #[arg(long)]
    pub dry_run: bool,

    // === Output Options ===
    /// Print the end-of-run summary as JSON
    #[arg(long)]
    pub json: bool,

    /// Report free space of each target directory before and after the run
    #[arg(long)]
    pub show_free_space: bool,

    /// Enable debug logging (overrides RUST_LOG)
    #[arg(long)]
    pub debug: bool,
}

impl Cli {
    /// Parse CLI arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

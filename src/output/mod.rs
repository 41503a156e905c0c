//! Console output
//!
//! Per-file reports and the end-of-run summary go to stdout, independent of
//! the log filter. Diagnostics go through `tracing` to stderr.

pub mod json;
pub mod text;

//! Timing and rate helpers for throughput reports

use std::thread;
use std::time::{Duration, Instant};

use crate::coordinator::StopSignal;

/// Bytes per mebibyte, the unit of every reported throughput
pub const MIB: f64 = 1024.0 * 1024.0;

/// Granularity of interruptible sleeps
const SLEEP_SLICE: Duration = Duration::from_millis(100);

/// Calculate throughput in MiB/s from bytes and duration
///
/// Returns 0.0 for a zero duration.
pub fn calculate_mib_per_sec(bytes: u64, duration: Duration) -> f64 {
    let seconds = duration.as_secs_f64();
    if seconds > 0.0 {
        bytes as f64 / MIB / seconds
    } else {
        0.0
    }
}

/// Format a byte count in human-readable form
///
/// # Examples
///
/// ```
/// use diskchurn::util::time::format_bytes;
///
/// assert_eq!(format_bytes(512), "512 B");
/// assert_eq!(format_bytes(1536), "1.50 KiB");
/// assert_eq!(format_bytes(10 * 1024 * 1024), "10.00 MiB");
/// ```
pub fn format_bytes(bytes: u64) -> String {
    const KIB: f64 = 1024.0;
    const GIB: f64 = MIB * 1024.0;
    const TIB: f64 = GIB * 1024.0;

    let b = bytes as f64;
    if b >= TIB {
        format!("{:.2} TiB", b / TIB)
    } else if b >= GIB {
        format!("{:.2} GiB", b / GIB)
    } else if b >= MIB {
        format!("{:.2} MiB", b / MIB)
    } else if b >= KIB {
        format!("{:.2} KiB", b / KIB)
    } else {
        format!("{} B", bytes)
    }
}

/// Sleep for `duration`, waking early once `stop` is raised
///
/// Returns `true` if the full duration elapsed.
pub fn sleep_unless_stopped(duration: Duration, stop: &StopSignal) -> bool {
    let deadline = Instant::now() + duration;
    loop {
        if stop.is_raised() {
            return false;
        }
        let now = Instant::now();
        if now >= deadline {
            return true;
        }
        thread::sleep((deadline - now).min(SLEEP_SLICE));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_calculate_mib_per_sec() {
        let duration = Duration::from_secs(10);
        let tput = calculate_mib_per_sec(1024 * 1024 * 10, duration);
        assert_eq!(tput, 1.0);
    }

    #[test]
    fn test_calculate_mib_per_sec_zero_duration() {
        assert_eq!(calculate_mib_per_sec(1000, Duration::ZERO), 0.0);
    }

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(0), "0 B");
        assert_eq!(format_bytes(1536 * 1024 * 1024), "1.50 GiB");
        assert_eq!(format_bytes(2 * 1024 * 1024 * 1024 * 1024), "2.00 TiB");
    }

    #[test]
    fn test_sleep_completes() {
        let stop = StopSignal::new();
        let start = Instant::now();
        assert!(sleep_unless_stopped(Duration::from_millis(20), &stop));
        assert!(start.elapsed() >= Duration::from_millis(20));
    }

    #[test]
    fn test_sleep_interrupted() {
        let stop = StopSignal::new();
        stop.raise();
        let start = Instant::now();
        assert!(!sleep_unless_stopped(Duration::from_secs(30), &stop));
        assert!(start.elapsed() < Duration::from_secs(1));
    }
}

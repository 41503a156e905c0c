//! Human-readable text output

use crate::stats::{RunSummary, WorkerStats};
use crate::util::diskspace::available_bytes;
use crate::util::time::format_bytes;
use crate::worker::{FileReport, WorkerKind};
use std::path::PathBuf;

/// One report line per file written or read
///
/// ```text
/// /mnt/a/td3xk2 wrote [size=10485760, buf=1048576, count=10, tput=812.44 MB/s, elapsed=0.012 s]
/// ```
pub fn format_file_report(report: &FileReport) -> String {
    let verb = match report.kind {
        WorkerKind::Write => "wrote",
        WorkerKind::Read => "read",
    };
    format!(
        "{} {} [size={}, buf={}, count={}, tput={:.2} MB/s, elapsed={:.3} s]",
        report.path.display(),
        verb,
        report.size,
        report.buffer_size,
        report.chunks,
        report.mib_per_sec(),
        report.elapsed.as_secs_f64()
    )
}

pub fn print_file_report(report: &FileReport) {
    println!("{}", format_file_report(report));
}

/// Print the end-of-run summary
pub fn print_summary(summary: &RunSummary) {
    println!();
    println!("═══════════════════════════════════════════════════════════");
    println!("                    RUN SUMMARY");
    println!("═══════════════════════════════════════════════════════════");
    println!();
    println!("Elapsed Time: {:.3}s", summary.elapsed.as_secs_f64());
    println!();

    for worker in &summary.workers {
        println!("{} {}:", worker.kind, worker.directory.display());
        print_stats(worker.kind, &worker.stats);
        println!();
    }

    for kind in [WorkerKind::Write, WorkerKind::Read] {
        if summary.workers.iter().filter(|w| w.kind == kind).count() > 1 {
            println!("All {}s:", kind);
            print_stats(kind, &summary.totals(kind));
            println!();
        }
    }
}

fn print_stats(kind: WorkerKind, stats: &WorkerStats) {
    println!("  Iterations: {}", stats.iterations);
    println!(
        "  Files:      {} ({}) - {:.2} MB/s",
        stats.files,
        format_bytes(stats.bytes),
        stats.mib_per_sec()
    );
    match kind {
        WorkerKind::Write => {
            if stats.aborted_files > 0 {
                println!("  Aborted:    {}", stats.aborted_files);
            }
            if stats.reclaims > 0 {
                println!(
                    "  Reclaims:   {} ({} files removed, {} errors)",
                    stats.reclaims, stats.reclaimed_files, stats.reclaim_errors
                );
            }
        }
        WorkerKind::Read => {
            if stats.skipped_entries > 0 {
                println!("  Skipped:    {}", stats.skipped_entries);
            }
            if stats.io_errors > 0 {
                println!("  Errors:     {}", stats.io_errors);
            }
        }
    }
}

/// Print the free space of each directory that can be queried
pub fn print_free_space(label: &str, directories: &[PathBuf]) {
    println!("Free space ({}):", label);
    for dir in directories {
        match available_bytes(dir) {
            Ok(bytes) => println!("  {}: {}", dir.display(), format_bytes(bytes)),
            Err(e) => println!("  {}: unavailable ({})", dir.display(), e),
        }
    }
}

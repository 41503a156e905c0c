//! Directory preparation, listing and reclaim sweeps

use crate::Result;
use anyhow::Context;
use std::fs::{self, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Result of one reclaim sweep
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReclaimOutcome {
    /// Files truncated and unlinked
    pub removed: u64,
    /// Entries that could not be fully reclaimed
    pub errors: u64,
}

/// Make `dir` ready for a writer
///
/// With `clear`, everything already inside `dir` is removed first; failures
/// on individual entries are logged and skipped. The directory (and any
/// missing parents) is then created. Failing to create it is an error.
pub fn prepare_directory(dir: &Path, clear: bool) -> Result<()> {
    if clear {
        clear_directory(dir);
    }

    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create target directory: {}", dir.display()))
}

fn clear_directory(dir: &Path) {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return,
        Err(e) => {
            warn!(dir = %dir.display(), error = %e, "cannot list directory for clearing");
            return;
        }
    };

    for entry in entries.flatten() {
        let path = entry.path();
        let result = match entry.file_type() {
            Ok(t) if t.is_dir() => fs::remove_dir_all(&path),
            _ => fs::remove_file(&path),
        };
        match result {
            Ok(()) => debug!(path = %path.display(), "removed"),
            Err(e) => warn!(path = %path.display(), error = %e, "cannot remove entry"),
        }
    }
}

/// List the entries directly inside `dir`, sorted by name
///
/// `dir` itself is not part of the result. Failing to enumerate the
/// directory is an error; entries that vanish afterwards are the caller's
/// concern.
pub fn list_entries(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = fs::read_dir(dir)
        .with_context(|| format!("Failed to read directory: {}", dir.display()))?;

    let mut paths: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .collect();
    paths.sort();

    Ok(paths)
}

/// Empty `dir` of regular files
///
/// Each file is opened read-write, truncated to zero, synced, closed and
/// unlinked, so the filesystem sees the space released before the name
/// disappears. Subdirectories are left alone. Errors never stop the sweep:
/// they are logged and counted.
pub fn reclaim_directory(dir: &Path) -> ReclaimOutcome {
    let mut outcome = ReclaimOutcome::default();

    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            warn!(dir = %dir.display(), error = %e, "cannot list directory for reclaim");
            outcome.errors += 1;
            return outcome;
        }
    };

    for entry in entries {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!(dir = %dir.display(), error = %e, "cannot read directory entry");
                outcome.errors += 1;
                continue;
            }
        };

        let path = entry.path();
        match entry.file_type() {
            Ok(t) if t.is_dir() => {
                debug!(path = %path.display(), "skipping subdirectory");
                continue;
            }
            Ok(_) => {}
            Err(e) => {
                warn!(path = %path.display(), error = %e, "cannot stat entry");
                outcome.errors += 1;
                continue;
            }
        }

        debug!(path = %path.display(), "truncating");
        if let Err(e) = truncate_and_sync(&path) {
            warn!(path = %path.display(), error = %e, "cannot truncate file");
            outcome.errors += 1;
        }

        match fs::remove_file(&path) {
            Ok(()) => outcome.removed += 1,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => {
                warn!(path = %path.display(), error = %e, "cannot remove file");
                outcome.errors += 1;
            }
        }
    }

    outcome
}

fn truncate_and_sync(path: &Path) -> io::Result<()> {
    let file = OpenOptions::new().read(true).write(true).open(path)?;
    file.set_len(0)?;
    file.sync_all()
}

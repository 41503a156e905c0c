//! Test file creation and open flags
//!
//! # Example
//!
//! ```no_run
//! use diskchurn::config::IoMode;
//! use diskchurn::target::{create_test_file, open_for_write};
//! use std::io::Write;
//! use std::path::Path;
//!
//! let path = create_test_file(Path::new("/mnt/scratch"))?;
//! let mut file = open_for_write(&path, IoMode::Buffered)?;
//! file.write_all(&[0u8; 8192])?;
//! # Ok::<(), anyhow::Error>(())
//! ```

use super::TEST_FILE_PREFIX;
use crate::config::IoMode;
use crate::Result;
use anyhow::Context;
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

/// Random characters appended to [`TEST_FILE_PREFIX`]
const NAME_SUFFIX_LEN: usize = 10;

/// Create a new, empty, uniquely named test file in `dir`
///
/// The name is claimed with an exclusive create, so concurrent workers (or
/// processes) sharing a directory never collide. The file is closed again
/// and must be reopened with [`open_for_write`].
pub fn create_test_file(dir: &Path) -> Result<PathBuf> {
    let temp = tempfile::Builder::new()
        .prefix(TEST_FILE_PREFIX)
        .rand_bytes(NAME_SUFFIX_LEN)
        .tempfile_in(dir)
        .with_context(|| format!("Failed to create test file in {}", dir.display()))?;

    let path = temp
        .into_temp_path()
        .keep()
        .with_context(|| format!("Failed to persist test file in {}", dir.display()))?;

    Ok(path)
}

/// Open `path` for writing, truncating it, with the page cache bypassed in
/// direct mode
pub fn open_for_write(path: &Path, mode: IoMode) -> Result<File> {
    let mut options = OpenOptions::new();
    options.write(true).create(true).truncate(true);
    set_direct_flag(&mut options, mode);

    let file = options
        .open(path)
        .with_context(|| format!("Failed to open file for writing: {}", path.display()))?;

    disable_caching(&file, mode)
        .with_context(|| format!("Failed to disable caching for {}", path.display()))?;

    Ok(file)
}

#[cfg(target_os = "linux")]
fn set_direct_flag(options: &mut OpenOptions, mode: IoMode) {
    use std::os::unix::fs::OpenOptionsExt;
    if mode.is_direct() {
        options.custom_flags(libc::O_DIRECT);
    }
}

#[cfg(not(target_os = "linux"))]
fn set_direct_flag(_options: &mut OpenOptions, _mode: IoMode) {}

/// macOS has no O_DIRECT; F_NOCACHE on the open descriptor is the equivalent
#[cfg(target_os = "macos")]
fn disable_caching(file: &File, mode: IoMode) -> std::io::Result<()> {
    use std::os::unix::io::AsRawFd;
    if mode.is_direct() {
        // SAFETY: fd is owned by `file` and valid for the duration of the call
        let result = unsafe { libc::fcntl(file.as_raw_fd(), libc::F_NOCACHE, 1) };
        if result == -1 {
            return Err(std::io::Error::last_os_error());
        }
    }
    Ok(())
}

#[cfg(not(target_os = "macos"))]
fn disable_caching(_file: &File, _mode: IoMode) -> std::io::Result<()> {
    Ok(())
}

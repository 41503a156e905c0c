//! Target directories
//!
//! Every worker is bound to one directory. This module holds the filesystem
//! operations workers perform on it:
//!
//! - **directory**: preparing, listing and reclaiming a directory
//! - **file**: creating uniquely named test files and opening them for writes
//!
//! Test files are named `td<random suffix>` so they can be told apart from
//! anything else living in a directory when inspecting it by hand.

pub mod directory;
pub mod file;

pub use directory::{list_entries, prepare_directory, reclaim_directory, ReclaimOutcome};
pub use file::{create_test_file, open_for_write};

/// Name prefix of every generated test file
pub const TEST_FILE_PREFIX: &str = "td";

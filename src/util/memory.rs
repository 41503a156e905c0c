//! Allocator hints

/// Ask the allocator to hand freed heap pages back to the OS
///
/// Issued after a reclaim sweep. Only glibc exposes this; elsewhere it is a
/// no-op.
pub fn release_free_memory() {
    #[cfg(all(target_os = "linux", target_env = "gnu"))]
    {
        // SAFETY: malloc_trim has no preconditions
        unsafe {
            libc::malloc_trim(0);
        }
    }
}

// src/utils/memory.rs
//! Allocator cache trimming
//!
//! Posted to the UI/GPU/IO roles (and after script GC on the scripting role)
//! when an instance moves to the background.

use tracing::trace;

/// Return freed heap pages to the OS where the allocator supports it.
pub fn purge_malloc_cache() {
    #[cfg(all(target_os = "linux", target_env = "gnu"))]
    {
        // SAFETY: malloc_trim only walks the allocator's own free lists.
        let released = unsafe { libc::malloc_trim(0) };
        trace!(released = released != 0, "malloc_trim");
    }

    #[cfg(not(all(target_os = "linux", target_env = "gnu")))]
    trace!("malloc cache purge not supported on this target");
}

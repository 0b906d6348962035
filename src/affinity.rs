//! Pinning the calling thread to one logical core.
//!
//! `core_affinity` picks the OS mechanism at build time. On Linux the pin is
//! additionally checked with the `getcpu` syscall, since a successful
//! `sched_setaffinity` only guarantees the *next* scheduling decision.

use core_affinity::CoreId;
use tracing::warn;

use crate::error::AffinityError;

// Widest mask the backends accept: `cpu_set_t` on Linux, a `usize` mask on Windows.
const MAX_BINDABLE_CORES: usize = if cfg!(windows) { 64 } else { 1024 };

/// Number of logical cores visible to this process.
pub fn detect_core_count() -> usize {
    match core_affinity::get_core_ids() {
        Some(ids) if !ids.is_empty() => ids.len(),
        _ => std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1),
    }
}

/// Restricts the calling thread to `core` for the rest of its life, or until
/// it is rebound.
pub fn bind_current(core: usize) -> Result<(), AffinityError> {
    if core >= MAX_BINDABLE_CORES || !core_affinity::set_for_current(CoreId { id: core }) {
        return Err(AffinityError::Rejected { core });
    }
    verify(core)
}

/// Same as [`bind_current`] but only reports the failure. The measurement
/// still runs, wherever the scheduler puts the thread.
pub fn bind_current_or_warn(core: usize) {
    if let Err(err) = bind_current(core) {
        warn!(core, %err, "affinity not applied, measurement may be skewed");
    }
}

#[cfg(target_os = "linux")]
fn verify(core: usize) -> Result<(), AffinityError> {
    match current_cpu() {
        Some(observed) if observed != core => Err(AffinityError::Migrated {
            requested: core,
            observed,
        }),
        _ => Ok(()),
    }
}

#[cfg(not(target_os = "linux"))]
fn verify(_core: usize) -> Result<(), AffinityError> {
    Ok(())
}

/// Core the calling thread is executing on right now.
#[cfg(target_os = "linux")]
pub fn current_cpu() -> Option<usize> {
    let mut cpu: u32 = 0;
    let ptr = &mut cpu as *mut u32;
    let res = unsafe {
        syscalls::syscall!(
            syscalls::Sysno::getcpu,
            ptr,
            core::ptr::null_mut::<u32>(),
            core::ptr::null_mut::<u8>()
        )
    };
    res.ok().map(|_| cpu as usize)
}

#[cfg(not(target_os = "linux"))]
pub fn current_cpu() -> Option<usize> {
    None
}

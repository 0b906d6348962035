use std::hint::spin_loop;
use std::sync::atomic::{AtomicBool, Ordering};

/// A boolean shared between two threads for readiness and ping-pong signaling.
///
/// Waits on a flag are pure busy-spins. Nothing here may park the thread:
/// a scheduler wake-up in the measured loop would swamp the latency being
/// measured.
pub trait SignalFlag: Sync {
    fn raise(&self);
    fn lower(&self);
    fn is_raised(&self) -> bool;

    #[inline(always)]
    fn spin_until_raised(&self) {
        while !self.is_raised() {
            spin_loop();
        }
    }

    #[inline(always)]
    fn spin_until_lowered(&self) {
        while self.is_raised() {
            spin_loop();
        }
    }
}

/// Lock-free flag with release stores and acquire loads.
#[derive(Debug, Default)]
#[repr(align(64))]
pub struct SpinFlag(AtomicBool);

impl SpinFlag {
    pub const fn new() -> Self {
        Self(AtomicBool::new(false))
    }
}

impl SignalFlag for SpinFlag {
    #[inline(always)]
    fn raise(&self) {
        self.0.store(true, Ordering::Release);
    }

    #[inline(always)]
    fn lower(&self) {
        self.0.store(false, Ordering::Release);
    }

    #[inline(always)]
    fn is_raised(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

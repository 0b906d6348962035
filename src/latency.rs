use std::thread;
use std::time::{Duration, Instant};

use tracing::debug;

use crate::affinity::bind_current_or_warn;
use crate::config::Config;
use crate::flag::{SignalFlag, SpinFlag};
use crate::timer::{cycles_per_iteration, serialized_time};

/// Raw timing of one ping-pong run, taken on the main side.
#[derive(Debug, Clone, Copy)]
pub struct HandshakeTiming {
    pub iterations: u64,
    pub elapsed: Duration,
    pub cycles_per_handshake: Option<f64>,
}

impl HandshakeTiming {
    /// Mean wall-clock seconds per handshake cycle.
    pub fn seconds_per_handshake(&self) -> f64 {
        if self.iterations == 0 {
            return 0.0;
        }
        self.elapsed.as_secs_f64() / self.iterations as f64
    }
}

/// Mean round-trip time in seconds between a worker pinned to `cpu1` and the
/// calling thread pinned to `cpu2`.
///
/// The calling thread stays bound to `cpu2` afterwards. A self-pair returns
/// `0.0` without spawning anything.
pub fn measure_latency(cpu1: usize, cpu2: usize, config: &Config) -> f64 {
    if cpu1 == cpu2 {
        return 0.0;
    }

    let ready = SpinFlag::new();
    let signal = SpinFlag::new();
    let timing = ping_pong(
        &ready,
        &signal,
        config.handshake_iterations,
        || bind_current_or_warn(cpu1),
        || bind_current_or_warn(cpu2),
    );

    let latency = timing.seconds_per_handshake();
    debug!(
        cpu1,
        cpu2,
        latency_ns = latency * 1e9,
        cycles = ?timing.cycles_per_handshake,
        "latency probe done"
    );
    latency
}

/// Strictly alternating handshake: the worker raises `signal` and waits for
/// it to drop, the calling thread waits for it to rise and drops it.
///
/// `pin_worker` runs on the spawned thread and `pin_main` on the caller, both
/// before `ready` is raised, so no handshake starts until both sides are
/// placed.
pub fn ping_pong<R, S, W, M>(
    ready: &R,
    signal: &S,
    iterations: u64,
    pin_worker: W,
    pin_main: M,
) -> HandshakeTiming
where
    R: SignalFlag,
    S: SignalFlag,
    W: FnOnce() + Send,
    M: FnOnce(),
{
    thread::scope(|s| {
        s.spawn(move || {
            pin_worker();
            ready.spin_until_raised();
            for _ in 0..iterations {
                signal.raise();
                signal.spin_until_lowered();
            }
        });

        pin_main();
        ready.raise();

        let start = Instant::now();
        let start_tsc = serialized_time();
        for _ in 0..iterations {
            signal.spin_until_raised();
            signal.lower();
        }
        let end_tsc = serialized_time();
        let elapsed = start.elapsed();

        HandshakeTiming {
            iterations,
            elapsed,
            cycles_per_handshake: cycles_per_iteration(start_tsc, end_tsc, iterations),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::HANDSHAKE_ITERATIONS;
    use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

    /// Records every transition and flags any raise of a raised flag or
    /// lower of a lowered one.
    #[derive(Default)]
    struct CountingFlag {
        state: AtomicBool,
        raises: AtomicU64,
        lowers: AtomicU64,
        double_raise: AtomicBool,
        double_lower: AtomicBool,
    }

    impl SignalFlag for CountingFlag {
        fn raise(&self) {
            if self.state.swap(true, Ordering::AcqRel) {
                self.double_raise.store(true, Ordering::Relaxed);
            }
            self.raises.fetch_add(1, Ordering::Relaxed);
        }

        fn lower(&self) {
            if !self.state.swap(false, Ordering::AcqRel) {
                self.double_lower.store(true, Ordering::Relaxed);
            }
            self.lowers.fetch_add(1, Ordering::Relaxed);
        }

        fn is_raised(&self) -> bool {
            self.state.load(Ordering::Acquire)
        }
    }

    fn two_allowed_cores() -> Option<(usize, usize)> {
        let ids = core_affinity::get_core_ids()?;
        match ids.as_slice() {
            [a, b, ..] => Some((a.id, b.id)),
            _ => None,
        }
    }

    #[test]
    fn self_pair_is_zero() {
        let config = Config::default();
        assert_eq!(measure_latency(3, 3, &config), 0.0);
    }

    #[test]
    fn handshake_alternates_exactly_once_per_iteration() {
        let iterations = match std::thread::available_parallelism() {
            Ok(n) if n.get() >= 2 => HANDSHAKE_ITERATIONS,
            _ => 200,
        };
        let ready = SpinFlag::new();
        let signal = CountingFlag::default();

        let timing = ping_pong(&ready, &signal, iterations, || {}, || {});

        assert_eq!(timing.iterations, iterations);
        assert_eq!(signal.raises.load(Ordering::Relaxed), iterations);
        assert_eq!(signal.lowers.load(Ordering::Relaxed), iterations);
        assert!(!signal.double_raise.load(Ordering::Relaxed));
        assert!(!signal.double_lower.load(Ordering::Relaxed));
        assert!(!signal.is_raised());
    }

    #[test]
    fn cross_pair_latency_is_positive() {
        let Some((a, b)) = two_allowed_cores() else {
            return;
        };
        let config = Config::default().with_handshake_iterations(10_000);
        let latency = std::thread::spawn(move || measure_latency(a, b, &config))
            .join()
            .unwrap();
        assert!(latency.is_finite());
        assert!(latency > 0.0);
    }

    #[test]
    fn repeated_runs_stay_comparable() {
        let Some((a, b)) = two_allowed_cores() else {
            return;
        };
        let config = Config::default().with_handshake_iterations(20_000);
        let runs: Vec<f64> = std::thread::spawn(move || {
            (0..3).map(|_| measure_latency(a, b, &config)).collect()
        })
        .join()
        .unwrap();
        let min = runs.iter().cloned().fold(f64::INFINITY, f64::min);
        let max = runs.iter().cloned().fold(0.0, f64::max);
        assert!(min > 0.0);
        assert!(max / min < 100.0, "runs spread too far: {runs:?}");
    }

    #[test]
    fn zero_iterations_report_zero() {
        let timing = HandshakeTiming {
            iterations: 0,
            elapsed: Duration::from_millis(1),
            cycles_per_handshake: None,
        };
        assert_eq!(timing.seconds_per_handshake(), 0.0);
    }
}

use std::hint::black_box;
use std::panic;
use std::thread::{self, ScopedJoinHandle};
use std::time::{Duration, Instant};

use tracing::debug;

use crate::affinity::bind_current_or_warn;
use crate::config::Config;
use crate::flag::{SignalFlag, SpinFlag};

/// Accumulated work of both workers over one sampling window.
#[derive(Debug, Clone, Copy)]
pub struct BandwidthSample {
    pub sums: [u64; 2],
    pub elapsed: Duration,
}

impl BandwidthSample {
    /// Combined throughput in mega accumulator-updates per second. This is a
    /// relative figure for comparing pairs, not an instruction count.
    pub fn mega_ops_per_second(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs <= 0.0 {
            return 0.0;
        }
        (self.sums[0] as f64 + self.sums[1] as f64) / secs / 1e6
    }
}

/// Runs the arithmetic workload on `cpu1` and `cpu2` at the same time for
/// `config.bandwidth_window` and returns the combined throughput.
///
/// The matrix driver never calls this with `cpu1 == cpu2`.
pub fn measure_bandwidth(cpu1: usize, cpu2: usize, config: &Config) -> f64 {
    let sample = sample_pair(cpu1, cpu2, config);
    let bandwidth = sample.mega_ops_per_second();
    debug!(
        cpu1,
        cpu2,
        bandwidth,
        sum1 = sample.sums[0],
        sum2 = sample.sums[1],
        "bandwidth probe done"
    );
    bandwidth
}

pub fn sample_pair(cpu1: usize, cpu2: usize, config: &Config) -> BandwidthSample {
    let ready = SpinFlag::new();
    let stop = SpinFlag::new();
    let block = config.workload_block;

    thread::scope(|s| {
        let (ready, stop) = (&ready, &stop);
        let first = s.spawn(move || arithmetic_workload(cpu1, ready, stop, block));
        let second = s.spawn(move || arithmetic_workload(cpu2, ready, stop, block));

        ready.raise();
        let start = Instant::now();
        // Window control is coarse, so a plain sleep is fine here.
        thread::sleep(config.bandwidth_window);
        let elapsed = start.elapsed();
        stop.raise();

        BandwidthSample {
            sums: [join_worker(first), join_worker(second)],
            elapsed,
        }
    })
}

fn join_worker(handle: ScopedJoinHandle<'_, u64>) -> u64 {
    handle
        .join()
        .unwrap_or_else(|payload| panic::resume_unwind(payload))
}

/// Worker body: pin, wait for `ready`, then run blocks of multiply-add until
/// `stop` is seen. At least one block always runs.
fn arithmetic_workload(core: usize, ready: &SpinFlag, stop: &SpinFlag, block: u64) -> u64 {
    bind_current_or_warn(core);
    ready.spin_until_raised();

    let mut sum: u64 = 0;
    loop {
        sum = micro_loop(sum, block);
        if stop.is_raised() {
            break;
        }
    }
    sum
}

#[inline(always)]
fn micro_loop(mut sum: u64, block: u64) -> u64 {
    for i in 0..block {
        sum = sum.wrapping_add(black_box(i).wrapping_mul(2));
    }
    sum
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::WORKLOAD_BLOCK;

    fn allowed_pair() -> (usize, usize) {
        let ids = core_affinity::get_core_ids().unwrap_or_default();
        match ids.as_slice() {
            [a, b, ..] => (a.id, b.id),
            [a] => (a.id, a.id),
            [] => (0, 0),
        }
    }

    #[test]
    fn micro_loop_sums_doubled_indices() {
        assert_eq!(micro_loop(0, WORKLOAD_BLOCK), 999_000);
        assert_eq!(micro_loop(1, 3), 1 + 0 + 2 + 4);
    }

    #[test]
    fn empty_window_reports_zero() {
        let sample = BandwidthSample {
            sums: [10, 10],
            elapsed: Duration::ZERO,
        };
        assert_eq!(sample.mega_ops_per_second(), 0.0);
    }

    #[test]
    fn throughput_adds_both_workers() {
        let sample = BandwidthSample {
            sums: [1_000_000, 3_000_000],
            elapsed: Duration::from_secs(2),
        };
        assert_eq!(sample.mega_ops_per_second(), 2.0);
    }

    #[test]
    fn pair_bandwidth_is_positive() {
        let (a, b) = allowed_pair();
        let config = Config::default().with_bandwidth_window(Duration::from_millis(20));
        let sample = sample_pair(a, b, &config);
        assert!(sample.sums.iter().all(|&sum| sum > 0));
        assert!(sample.elapsed >= Duration::from_millis(20));

        let bandwidth = sample.mega_ops_per_second();
        assert!(bandwidth.is_finite());
        assert!(bandwidth > 0.0);
    }

    #[test]
    fn small_blocks_still_accumulate() {
        let (a, b) = allowed_pair();
        let config = Config::default()
            .with_bandwidth_window(Duration::from_millis(5))
            .with_workload_block(2);
        let sample = sample_pair(a, b, &config);
        // Each block of two adds 0 + 2.
        assert!(sample.sums.iter().all(|&sum| sum > 0 && sum % 2 == 0));
    }
}

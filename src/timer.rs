#[cfg(target_arch = "x86_64")]
use core::arch::x86_64::*;

/// TSC read fenced on both sides so it cannot drift into the measured code.
#[cfg(target_arch = "x86_64")]
#[inline(always)]
pub fn serialized_time() -> Option<u64> {
    unsafe {
        _mm_lfence();
        _mm_mfence();
        __cpuid(0);
        _mm_lfence();
        let result = _rdtsc();
        _mm_lfence();
        _mm_mfence();
        __cpuid(0);
        _mm_lfence();
        Some(result)
    }
}

#[cfg(not(target_arch = "x86_64"))]
#[inline(always)]
pub fn serialized_time() -> Option<u64> {
    None
}

/// Mean cycles per iteration between two [`serialized_time`] reads.
pub fn cycles_per_iteration(start: Option<u64>, end: Option<u64>, iterations: u64) -> Option<f64> {
    match (start, end) {
        (Some(start), Some(end)) if iterations > 0 && end >= start => {
            Some((end - start) as f64 / iterations as f64)
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cycles_need_both_reads() {
        assert_eq!(cycles_per_iteration(None, Some(10), 1), None);
        assert_eq!(cycles_per_iteration(Some(10), None, 1), None);
        assert_eq!(cycles_per_iteration(Some(10), Some(30), 0), None);
        assert_eq!(cycles_per_iteration(Some(10), Some(30), 4), Some(5.0));
    }

    #[cfg(target_arch = "x86_64")]
    #[test]
    fn tsc_advances() {
        let start = serialized_time().unwrap();
        let end = serialized_time().unwrap();
        assert!(end >= start);
    }
}

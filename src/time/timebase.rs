//! mach_absolute_time Bridge
//!
//! Monotonic nanosecond time source. On macOS this wraps mach_absolute_time,
//! which is the clock CGEvent timestamps are expressed in, so event
//! timestamps and `now` readings are directly comparable. Raw ticks are kept
//! in hot paths and converted to nanoseconds once per event.
//!
//! On other platforms a `std::time::Instant` anchor stands in (ticks are
//! nanoseconds since process start) so the engine and its tests build and
//! run anywhere.

use std::sync::OnceLock;

#[cfg(target_os = "macos")]
static TIMEBASE_INFO: OnceLock<TimebaseInfo> = OnceLock::new();

#[cfg(not(target_os = "macos"))]
static ANCHOR: OnceLock<std::time::Instant> = OnceLock::new();

/// Cached mach_timebase_info conversion factors
#[cfg(target_os = "macos")]
#[derive(Debug, Clone, Copy)]
struct TimebaseInfo {
    numer: u32,
    denom: u32,
}

/// Monotonic timebase
///
/// Guarantees:
/// - time never goes backward
/// - consistent behavior on Apple Silicon and Intel
/// - zero overhead in the hot path (raw ticks, lazy conversion)
#[derive(Debug, Clone, Copy)]
pub struct MachTimebase;

#[cfg(target_os = "macos")]
impl MachTimebase {
    fn info() -> TimebaseInfo {
        *TIMEBASE_INFO.get_or_init(|| {
            let mut info = mach2::mach_time::mach_timebase_info_data_t { numer: 0, denom: 0 };
            // Safety: mach_timebase_info is always safe to call
            unsafe {
                mach2::mach_time::mach_timebase_info(&mut info);
            }
            TimebaseInfo {
                numer: info.numer,
                denom: info.denom,
            }
        })
    }

    /// Initialize the timebase. Call once at startup; later calls are no-ops.
    pub fn init() {
        let _ = Self::info();
    }

    /// Current raw mach_absolute_time ticks.
    #[inline(always)]
    pub fn now_ticks() -> u64 {
        // Safety: mach_absolute_time is always safe to call
        unsafe { mach2::mach_time::mach_absolute_time() }
    }

    /// Convert raw ticks to nanoseconds.
    ///
    /// On Apple Silicon numer/denom is typically 1/1; on Intel it varies.
    #[inline]
    pub fn ticks_to_nanos(ticks: u64) -> u64 {
        let info = Self::info();
        // u128 intermediate prevents overflow on large tick counts
        ((ticks as u128 * info.numer as u128) / info.denom as u128) as u64
    }

    /// Current time in nanoseconds since boot.
    #[inline]
    pub fn now_nanos() -> u64 {
        Self::ticks_to_nanos(Self::now_ticks())
    }
}

#[cfg(not(target_os = "macos"))]
impl MachTimebase {
    fn anchor() -> std::time::Instant {
        *ANCHOR.get_or_init(std::time::Instant::now)
    }

    /// Initialize the timebase. Call once at startup; later calls are no-ops.
    pub fn init() {
        let _ = Self::anchor();
    }

    /// Current ticks; on this platform ticks are nanoseconds since init.
    #[inline]
    pub fn now_ticks() -> u64 {
        Self::anchor().elapsed().as_nanos() as u64
    }

    /// Ticks are already nanoseconds on this platform.
    #[inline]
    pub fn ticks_to_nanos(ticks: u64) -> u64 {
        ticks
    }

    /// Current time in nanoseconds since init.
    #[inline]
    pub fn now_nanos() -> u64 {
        Self::now_ticks()
    }
}

impl MachTimebase {
    /// Elapsed nanoseconds between two tick readings.
    /// Returns 0 if `end < start`.
    #[inline]
    pub fn elapsed_nanos(start_ticks: u64, end_ticks: u64) -> u64 {
        if end_ticks >= start_ticks {
            Self::ticks_to_nanos(end_ticks - start_ticks)
        } else {
            0
        }
    }

    /// Elapsed milliseconds between two tick readings.
    #[inline]
    pub fn elapsed_millis(start_ticks: u64, end_ticks: u64) -> u64 {
        Self::elapsed_nanos(start_ticks, end_ticks) / 1_000_000
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_monotonicity() {
        MachTimebase::init();
        let t1 = MachTimebase::now_ticks();
        for _ in 0..1000 {
            std::hint::black_box(0);
        }
        let t2 = MachTimebase::now_ticks();
        assert!(t2 >= t1, "timestamps must be monotonic");
    }

    #[test]
    fn test_now_nanos_advances() {
        MachTimebase::init();
        let n1 = MachTimebase::now_nanos();
        std::thread::sleep(std::time::Duration::from_millis(1));
        let n2 = MachTimebase::now_nanos();
        assert!(n2 > n1, "time must advance across a sleep");
    }

    #[test]
    fn test_elapsed_calculation() {
        MachTimebase::init();
        let start = MachTimebase::now_ticks();
        std::thread::sleep(std::time::Duration::from_millis(10));
        let end = MachTimebase::now_ticks();

        let elapsed = MachTimebase::elapsed_millis(start, end);
        assert!(elapsed >= 10, "elapsed should be at least 10ms");
        assert!(elapsed < 1000, "elapsed should be well under a second");
    }

    #[test]
    fn test_elapsed_with_wraparound() {
        MachTimebase::init();
        // end < start clamps to zero rather than underflowing
        assert_eq!(MachTimebase::elapsed_nanos(1000, 500), 0);
        assert_eq!(MachTimebase::elapsed_millis(1000, 500), 0);
    }

    #[test]
    fn test_conversion_is_linear() {
        MachTimebase::init();
        let a = MachTimebase::ticks_to_nanos(1_000_000);
        let b = MachTimebase::ticks_to_nanos(2_000_000);
        // Integer division may truncate by at most one nanosecond
        assert!(b >= a * 2 && b <= a * 2 + 1);
    }
}

use std::time::{Duration, Instant};

use tracing::trace;

/// Monotonic clock used to drive an event loop in real time.
pub trait Timer: Clone {
    /// Nanoseconds since the timer was created.
    fn now(&self) -> u64;

    fn now_millis(&self) -> u64 {
        self.now() / 1_000_000
    }

    fn elapsed(&self, since: u64) -> Duration {
        Duration::from_nanos(self.now().saturating_sub(since))
    }

    fn sleep(&self, d: Duration);

    /// Sleeps until `deadline_ms` on this timer's clock; returns immediately
    /// if it has already passed.
    fn sleep_until_millis(&self, deadline_ms: u64) {
        let now_ms = self.now_millis();
        if deadline_ms > now_ms {
            self.sleep(Duration::from_millis(deadline_ms - now_ms));
        }
    }
}

#[derive(Debug, Clone)]
pub struct HighPrecisionTimer {
    start: Instant,
}

impl Timer for HighPrecisionTimer {
    fn now(&self) -> u64 {
        self.start.elapsed().as_nanos() as u64
    }

    fn sleep(&self, d: Duration) {
        trace!(micros = d.as_micros() as u64, "sleeping");
        self.high_precision_sleep(d)
    }
}

impl HighPrecisionTimer {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    pub fn high_precision_sleep(&self, duration: Duration) {
        #[cfg(target_os = "linux")]
        self.linux_sleep(duration);
        #[cfg(not(target_os = "linux"))]
        std::thread::sleep(duration);
    }

    #[cfg(target_os = "linux")]
    fn linux_sleep(&self, duration: Duration) {
        use libc::{clock_nanosleep, timespec, CLOCK_MONOTONIC};

        let req = timespec {
            tv_sec: duration.as_secs() as libc::time_t,
            tv_nsec: duration.subsec_nanos() as libc::c_long,
        };

        // SAFETY: `req` is a valid timespec and a null remainder pointer is allowed.
        unsafe {
            clock_nanosleep(CLOCK_MONOTONIC, 0, &req, std::ptr::null_mut());
        }
    }
}

impl Default for HighPrecisionTimer {
    fn default() -> Self {
        Self::new()
    }
}

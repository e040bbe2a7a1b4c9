//! Loop cancellation and pacing.

use portable_atomic::{AtomicBool, Ordering};

/// Process-wide "running" flag shared by every loop.
///
/// Clearing it is the only way to stop the loops. Each loop checks the flag
/// at the top of an iteration, so shutdown takes up to one period.
#[derive(Debug)]
pub struct RunFlag(AtomicBool);

impl RunFlag {
    /// Create a flag in the running state.
    #[must_use]
    pub const fn new() -> Self {
        Self(AtomicBool::new(true))
    }

    #[inline]
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    /// Ask every loop to exit at its next iteration.
    pub fn stop(&self) {
        if self.0.swap(false, Ordering::AcqRel) {
            debug!("stop requested");
        }
    }
}

impl Default for RunFlag {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "std")]
pub use ticker::Ticker;

#[cfg(feature = "std")]
mod ticker {
    use std::time::{Duration, Instant};

    /// Fixed-period pacing for a blocking loop.
    ///
    /// Sleeps until the next deadline. A loop that overruns by more than one
    /// period skips the missed ticks instead of firing them back to back.
    #[derive(Debug)]
    pub struct Ticker {
        expires_at: Instant,
        period: Duration,
    }

    impl Ticker {
        /// Create a ticker whose first tick is one period from now.
        #[must_use]
        pub fn every(period: Duration) -> Self {
            Self {
                expires_at: Instant::now() + period,
                period,
            }
        }

        #[must_use]
        pub fn period(&self) -> Duration {
            self.period
        }

        /// Restart the ticker from now.
        pub fn reset(&mut self) {
            self.expires_at = Instant::now() + self.period;
        }

        /// Wait for the next tick.
        pub fn next(&mut self) {
            let now = Instant::now();
            match self.expires_at.checked_duration_since(now) {
                Some(remaining) => {
                    std::thread::sleep(remaining);
                    self.expires_at += self.period;
                }
                None => self.expires_at = now + self.period,
            }
        }
    }
}

//! Monotonic time and deadlines for the driver's bounded waits.
//!
//! Every wait in the driver (an `OK` after a write, a reply after a read)
//! computes a [`Deadline`] once, when the wait starts, and then polls until
//! either the awaited frame shows up or the [`Clock`] passes the deadline.
//! Because the check is against wall-clock time rather than a count of loop
//! iterations, the timeout holds no matter how long each poll of the
//! transport takes.
//!
//! Sleeping between polls is delegated to an [`embedded_hal::delay::DelayNs`]
//! implementation, so on bare metal the HAL's timer delay can be used as-is.
//!
//! With the `std` feature, [`StdClock`] and [`StdDelay`] provide both halves
//! on a host.

use core::time::Duration;

#[cfg(feature = "std")]
mod host;
#[cfg(feature = "std")]
pub use host::*;

/// A monotonic time source.
///
/// `now` must never go backwards. The epoch is arbitrary; only differences
/// between two readings are used.
pub trait Clock {
    /// Time elapsed since the clock's epoch.
    fn now(&mut self) -> Duration;
}

impl<C: Clock + ?Sized> Clock for &mut C {
    fn now(&mut self) -> Duration {
        (**self).now()
    }
}

/// A point in time after which a wait gives up.
#[derive(PartialEq, Eq, PartialOrd, Ord, Clone, Copy, Debug)]
pub struct Deadline {
    at: Duration,
}

impl Deadline {
    /// A deadline `budget` from the clock's current reading.
    pub fn after<C: Clock>(clock: &mut C, budget: Duration) -> Self {
        Self {
            at: clock.now().saturating_add(budget),
        }
    }

    /// Whether the clock has reached the deadline.
    pub fn expired<C: Clock>(&self, clock: &mut C) -> bool {
        clock.now() >= self.at
    }
}

/// Converts a poll interval to whole microseconds for [`DelayNs::delay_us`](embedded_hal::delay::DelayNs::delay_us),
/// saturating at `u32::MAX`.
pub(crate) fn interval_us(interval: Duration) -> u32 {
    u32::try_from(interval.as_micros()).unwrap_or(u32::MAX)
}

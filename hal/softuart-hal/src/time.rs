//! Time types with nanosecond resolution
//!
//! Bit periods at high baud rates are well below a microsecond, so edge
//! times are kept in nanoseconds. Chip HALs convert to their own tick rate
//! at the point of scheduling.

use core::ops::{Add, AddAssign, Mul, Sub};

const NANOS_PER_MICRO: u64 = 1_000;
const NANOS_PER_MILLI: u64 = 1_000_000;
const NANOS_PER_SECOND: u64 = 1_000_000_000;

/// Span of time in nanoseconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Duration(u64);

impl Duration {
    /// Zero-length duration
    pub const ZERO: Duration = Duration(0);

    /// Create from nanoseconds
    pub const fn from_nanos(nanos: u64) -> Self {
        Self(nanos)
    }

    /// Create from microseconds
    pub const fn from_micros(micros: u64) -> Self {
        Self(micros * NANOS_PER_MICRO)
    }

    /// Create from milliseconds
    pub const fn from_millis(millis: u64) -> Self {
        Self(millis * NANOS_PER_MILLI)
    }

    /// Period of one cycle at `hz`, truncated to whole nanoseconds
    ///
    /// Returns [`Duration::ZERO`] for a zero frequency.
    pub const fn from_hz(hz: u32) -> Self {
        if hz == 0 {
            return Self::ZERO;
        }
        Self(NANOS_PER_SECOND / hz as u64)
    }

    /// Length in nanoseconds
    pub const fn as_nanos(self) -> u64 {
        self.0
    }

    /// Length in whole microseconds
    pub const fn as_micros(self) -> u64 {
        self.0 / NANOS_PER_MICRO
    }
}

impl Add for Duration {
    type Output = Duration;

    fn add(self, rhs: Duration) -> Duration {
        Duration(self.0 + rhs.0)
    }
}

impl Mul<u32> for Duration {
    type Output = Duration;

    fn mul(self, rhs: u32) -> Duration {
        Duration(self.0 * rhs as u64)
    }
}

/// Absolute point in time, nanoseconds since the platform epoch
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Instant(u64);

impl Instant {
    /// The platform epoch
    pub const ZERO: Instant = Instant(0);

    /// Create from nanoseconds since the epoch
    pub const fn from_nanos(nanos: u64) -> Self {
        Self(nanos)
    }

    /// Create from microseconds since the epoch
    pub const fn from_micros(micros: u64) -> Self {
        Self(micros * NANOS_PER_MICRO)
    }

    /// Nanoseconds since the epoch
    pub const fn as_nanos(self) -> u64 {
        self.0
    }

    /// Whole microseconds since the epoch
    pub const fn as_micros(self) -> u64 {
        self.0 / NANOS_PER_MICRO
    }

    /// Time elapsed since `earlier`, saturating at zero
    pub const fn duration_since(self, earlier: Instant) -> Duration {
        Duration(self.0.saturating_sub(earlier.0))
    }
}

impl Add<Duration> for Instant {
    type Output = Instant;

    fn add(self, rhs: Duration) -> Instant {
        Instant(self.0 + rhs.0)
    }
}

impl AddAssign<Duration> for Instant {
    fn add_assign(&mut self, rhs: Duration) {
        self.0 += rhs.0;
    }
}

impl Sub for Instant {
    type Output = Duration;

    fn sub(self, rhs: Instant) -> Duration {
        self.duration_since(rhs)
    }
}

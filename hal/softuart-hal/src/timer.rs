//! Clock and timed pin output
//!
//! The pin scheduler is the precision timing facility the software UART
//! hands its edges to. It is not implemented by the encoder: the platform
//! holds queued edges and fires them at the right wall-clock moment.

use crate::gpio::{Level, Pin};
use crate::time::Instant;

/// Monotonic system clock
pub trait Clock {
    /// Current time
    fn now(&self) -> Instant;
}

impl<T: Clock + ?Sized> Clock for &T {
    fn now(&self) -> Instant {
        (**self).now()
    }
}

/// Timed pin output
///
/// Implementations must guarantee that `pin` is driven to `level` at or
/// after `at`, and must process the requests for a given pin in the order
/// they were submitted. The level is held until the next request fires.
///
/// Submission never blocks and cannot be retracted. Backends with bounded
/// storage report their room through [`PinScheduler::free_slots`]; a
/// request submitted when there is none is dropped, so callers must size
/// their submissions first.
pub trait PinScheduler {
    /// Queue a level change on `pin` at absolute time `at`
    fn schedule_pin_output(&mut self, at: Instant, pin: Pin, level: Level);

    /// Number of requests `pin` can still take
    fn free_slots(&self, _pin: Pin) -> usize {
        usize::MAX
    }
}

impl<T: PinScheduler + ?Sized> PinScheduler for &mut T {
    fn schedule_pin_output(&mut self, at: Instant, pin: Pin, level: Level) {
        (**self).schedule_pin_output(at, pin, level);
    }

    fn free_slots(&self, pin: Pin) -> usize {
        (**self).free_slots(pin)
    }
}

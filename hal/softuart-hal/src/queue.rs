//! Bounded per-pin edge queues
//!
//! Storage for a [`PinScheduler`] backend that fires edges from a timer.
//! Each pin has its own FIFO, so a long transmission on one pin never
//! holds back due edges on another. Within a pin, edges leave in the
//! order they were submitted.

use heapless::{Deque, FnvIndexMap};

use crate::gpio::{Level, Pin, PinDriver};
use crate::time::Instant;
use crate::timer::PinScheduler;

/// No room for another edge on the pin
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct QueueFull;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PendingEdge {
    at: Instant,
    level: Level,
}

/// Edge queues for up to `PINS` pins, `N` pending edges each
///
/// `PINS` must be a power of two.
pub struct PinQueues<const PINS: usize, const N: usize> {
    pins: FnvIndexMap<Pin, Deque<PendingEdge, N>, PINS>,
}

impl<const PINS: usize, const N: usize> Default for PinQueues<PINS, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const PINS: usize, const N: usize> PinQueues<PINS, N> {
    /// Create empty queues
    pub const fn new() -> Self {
        Self {
            pins: FnvIndexMap::new(),
        }
    }

    /// Queue `level` on `pin` at `at`
    ///
    /// An edge at [`Instant::ZERO`] is due immediately.
    pub fn push(&mut self, at: Instant, pin: Pin, level: Level) -> Result<(), QueueFull> {
        if !self.pins.contains_key(&pin) {
            self.pins.insert(pin, Deque::new()).map_err(|_| QueueFull)?;
        }
        let queue = self.pins.get_mut(&pin).ok_or(QueueFull)?;
        queue
            .push_back(PendingEdge { at, level })
            .map_err(|_| QueueFull)
    }

    /// Number of edges `pin` can still take
    pub fn free_slots(&self, pin: Pin) -> usize {
        match self.pins.get(&pin) {
            Some(queue) => N - queue.len(),
            None if self.pins.len() < PINS => N,
            None => 0,
        }
    }

    /// Earliest due time among the queue heads
    pub fn next_due(&self) -> Option<Instant> {
        self.pins
            .values()
            .filter_map(|queue| queue.front())
            .map(|edge| edge.at)
            .min()
    }

    /// Take the earliest head edge that is due at `now`
    pub fn pop_due(&mut self, now: Instant) -> Option<(Pin, Level)> {
        let (pin, _) = self
            .pins
            .iter()
            .filter_map(|(pin, queue)| queue.front().map(|edge| (*pin, edge.at)))
            .filter(|(_, at)| *at <= now)
            .min_by_key(|(_, at)| *at)?;
        let edge = self.pins.get_mut(&pin)?.pop_front()?;
        Some((pin, edge.level))
    }

    /// Total number of pending edges
    pub fn len(&self) -> usize {
        self.pins.values().map(Deque::len).sum()
    }

    /// Check if no edge is pending
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<const PINS: usize, const N: usize> PinScheduler for PinQueues<PINS, N> {
    fn schedule_pin_output(&mut self, at: Instant, pin: Pin, level: Level) {
        // Callers size their submissions with `free_slots`
        let _ = self.push(at, pin, level);
    }

    fn free_slots(&self, pin: Pin) -> usize {
        PinQueues::free_slots(self, pin)
    }
}

impl<const PINS: usize, const N: usize> PinDriver for PinQueues<PINS, N> {
    fn drive(&mut self, pin: Pin, level: Level) {
        let _ = self.push(Instant::ZERO, pin, level);
    }
}

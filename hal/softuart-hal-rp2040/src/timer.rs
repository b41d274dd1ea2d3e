//! Timed pin output on embassy-time
//!
//! The encoder pushes edges into a shared [`EdgeQueue`] through a
//! [`QueueHandle`]; [`run_pin_timer`] applies them when they come due.
//! Every pin keeps its own FIFO, so the task always sleeps until the
//! earliest head across all pins and one long transmission never delays
//! another pin. The queue is bounded: writers size their output with
//! `free_slots`, and an edge pushed without room is logged and dropped.

use core::cell::RefCell;

use embassy_futures::select::select;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::signal::Signal;
use embassy_time::Timer;
use embedded_hal::digital::{OutputPin, PinState};
use softuart_hal::{Clock, Instant, Level, Pin, PinDriver, PinQueues, PinScheduler};

/// Edge queues shared between the encoder and the timer task
///
/// Holds up to `N` pending edges for each of `PINS` pins. `PINS` must be
/// a power of two.
pub struct EdgeQueue<const PINS: usize, const N: usize> {
    queues: Mutex<CriticalSectionRawMutex, RefCell<PinQueues<PINS, N>>>,
    wake: Signal<CriticalSectionRawMutex, ()>,
}

impl<const PINS: usize, const N: usize> EdgeQueue<PINS, N> {
    pub const fn new() -> Self {
        Self {
            queues: Mutex::new(RefCell::new(PinQueues::new())),
            wake: Signal::new(),
        }
    }

    fn push(&self, at: Instant, pin: Pin, level: Level) {
        let pushed = self.queues.lock(|queues| queues.borrow_mut().push(at, pin, level));
        match pushed {
            Ok(()) => self.wake.signal(()),
            Err(_) => {
                #[cfg(feature = "defmt")]
                defmt::warn!("edge queue full, dropped {:?} on {:?}", level, pin);
            }
        }
    }

    fn free_slots(&self, pin: Pin) -> usize {
        self.queues.lock(|queues| queues.borrow().free_slots(pin))
    }

    fn pop_due(&self, now: Instant) -> Option<(Pin, Level)> {
        self.queues.lock(|queues| queues.borrow_mut().pop_due(now))
    }

    fn next_due(&self) -> Option<Instant> {
        self.queues.lock(|queues| queues.borrow().next_due())
    }
}

impl<const PINS: usize, const N: usize> Default for EdgeQueue<PINS, N> {
    fn default() -> Self {
        Self::new()
    }
}

/// Producer side of an [`EdgeQueue`]
pub struct QueueHandle<'a, const PINS: usize, const N: usize> {
    queue: &'a EdgeQueue<PINS, N>,
}

impl<'a, const PINS: usize, const N: usize> QueueHandle<'a, PINS, N> {
    pub fn new(queue: &'a EdgeQueue<PINS, N>) -> Self {
        Self { queue }
    }
}

impl<const PINS: usize, const N: usize> PinScheduler for QueueHandle<'_, PINS, N> {
    fn schedule_pin_output(&mut self, at: Instant, pin: Pin, level: Level) {
        self.queue.push(at, pin, level);
    }

    fn free_slots(&self, pin: Pin) -> usize {
        self.queue.free_slots(pin)
    }
}

impl<const PINS: usize, const N: usize> PinDriver for QueueHandle<'_, PINS, N> {
    fn drive(&mut self, pin: Pin, level: Level) {
        self.queue.push(Instant::ZERO, pin, level);
    }
}

/// Monotonic clock backed by the embassy time driver
#[derive(Debug, Clone, Copy, Default)]
pub struct EmbassyClock;

impl Clock for EmbassyClock {
    fn now(&self) -> Instant {
        Instant::from_micros(embassy_time::Instant::now().as_micros())
    }
}

fn deadline(at: Instant) -> embassy_time::Instant {
    embassy_time::Instant::from_micros(at.as_micros())
}

/// Apply queued pin changes at their scheduled times
///
/// `outputs` maps GPIO numbers to configured output pins; edges for pins
/// not listed are discarded. Edges already in the past are applied
/// immediately. Never returns.
pub async fn run_pin_timer<O: OutputPin, const PINS: usize, const N: usize>(
    queue: &EdgeQueue<PINS, N>,
    outputs: &mut [(Pin, O)],
) -> ! {
    loop {
        while let Some((pin, level)) = queue.pop_due(EmbassyClock.now()) {
            match outputs.iter_mut().find(|(output_pin, _)| *output_pin == pin) {
                Some((_, output)) => {
                    let _ = output.set_state(PinState::from(level.is_high()));
                }
                None => {
                    #[cfg(feature = "defmt")]
                    defmt::debug!("no output for {:?}", pin);
                }
            }
        }

        // A push may bring an earlier head, so sleep until either
        match queue.next_due() {
            Some(at) => {
                select(Timer::at(deadline(at)), queue.wake.wait()).await;
            }
            None => queue.wake.wait().await,
        }
    }
}

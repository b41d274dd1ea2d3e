//! Software UART encoder
//!
//! Converts one byte at a time into the edges of a serial frame. Instead
//! of one event per bit, runs of equal bits collapse into a single edge:
//! an all-ones byte costs two edges, an alternating one costs one edge
//! per bit.
//!
//! Each edge is placed at the end of its run and carries that run's level.
//! The cursor only ever advances by whole multiples of the bit period,
//! computed once per write, so timing cannot drift across bytes.

use softuart_hal::{Duration, Instant, Level, Pin, PinScheduler};

use crate::config::FrameConfig;

/// Delay between a write call and its first edge, so the scheduler can
/// queue the frame before it is due
pub const LEAD_TIME: Duration = Duration::from_millis(1000);

/// A level change submitted to the pin scheduler
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct EdgeEvent {
    /// Output pin
    pub pin: Pin,
    /// Absolute time of the change
    pub at: Instant,
    /// Level driven from `at` on
    pub level: Level,
}

/// Time cursor of one write call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TransmissionCursor {
    /// Duration of one bit
    pub bit_period: Duration,
    /// Absolute time reached so far (never decreases)
    pub time: Instant,
    /// Output pin
    pub pin: Pin,
}

impl TransmissionCursor {
    /// Cursor for `baud_rate` starting at `start`
    pub fn new(baud_rate: u32, pin: Pin, start: Instant) -> Self {
        Self {
            bit_period: Duration::from_hz(baud_rate),
            time: start,
            pin,
        }
    }

    /// Advance by `bits` bit periods and schedule `level` there
    fn emit<S: PinScheduler>(&mut self, scheduler: &mut S, bits: u32, level: Level) -> EdgeEvent {
        self.time += self.bit_period * bits;
        let edge = EdgeEvent {
            pin: self.pin,
            at: self.time,
            level,
        };
        scheduler.schedule_pin_output(edge.at, edge.pin, edge.level);
        edge
    }
}

/// Levels of one frame, least significant (start bit) first
///
/// Start bit low, `bit_width` data bits LSB first (bits past the eighth
/// are low), then `stop_bits` high bits.
#[derive(Debug, Clone)]
pub struct FrameBits {
    byte: u8,
    bit_width: u8,
    stop_bits: u8,
    index: u32,
}

impl FrameBits {
    /// Bits of `byte` framed with the given width and stop-bit count
    pub fn new(byte: u8, bit_width: u8, stop_bits: u8) -> Self {
        Self {
            byte,
            bit_width,
            stop_bits,
            index: 0,
        }
    }

    fn total(&self) -> u32 {
        1 + self.bit_width as u32 + self.stop_bits as u32
    }

    fn level_at(&self, index: u32) -> Level {
        if index == 0 {
            return Level::Low;
        }
        let data_index = index - 1;
        if data_index < self.bit_width as u32 {
            let bit = data_index < 8 && (self.byte >> data_index) & 1 == 1;
            Level::from(bit)
        } else {
            Level::High
        }
    }
}

impl Iterator for FrameBits {
    type Item = Level;

    fn next(&mut self) -> Option<Level> {
        if self.index >= self.total() {
            return None;
        }
        let level = self.level_at(self.index);
        self.index += 1;
        Some(level)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.total().saturating_sub(self.index) as usize;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for FrameBits {}

/// Encoder state for one software-driven write call
#[derive(Debug, Clone)]
pub struct SoftUartEncoder {
    cursor: TransmissionCursor,
    bit_width: u8,
    stop_bits: u8,
}

impl SoftUartEncoder {
    /// Encoder for `config` on `pin`, with the first frame starting at `start`
    ///
    /// Parity is not emitted; only the start, data and stop bits are.
    pub fn new(config: &FrameConfig, pin: Pin, start: Instant) -> Self {
        Self {
            cursor: TransmissionCursor::new(config.baud_rate, pin, start),
            bit_width: config.bit_width,
            stop_bits: config.stop_bits,
        }
    }

    /// Current cursor
    pub fn cursor(&self) -> &TransmissionCursor {
        &self.cursor
    }

    /// Schedule the edges of one frame carrying `byte`
    ///
    /// Returns the number of edges submitted. The cursor advances by
    /// exactly one frame length.
    pub fn encode<S: PinScheduler>(&mut self, byte: u8, scheduler: &mut S) -> usize {
        let mut edges = 0;
        let mut run: Option<(Level, u32)> = None;

        for level in FrameBits::new(byte, self.bit_width, self.stop_bits) {
            run = match run {
                Some((current, length)) if current == level => Some((current, length + 1)),
                Some((current, length)) => {
                    self.cursor.emit(scheduler, length, current);
                    edges += 1;
                    Some((level, 1))
                }
                None => Some((level, 1)),
            };
        }

        // Trailing run
        if let Some((level, length)) = run {
            self.cursor.emit(scheduler, length, level);
            edges += 1;
        }

        edges
    }

    /// Schedule the final return to idle at the cursor
    pub fn finish<S: PinScheduler>(mut self, scheduler: &mut S) -> EdgeEvent {
        self.cursor.emit(scheduler, 0, Level::High)
    }
}

//! GPIO pin abstractions
//!
//! Pins are addressed by number rather than owned as typed objects, because
//! the transmit pin of a software port is chosen at runtime by configuration.

use serde::{Deserialize, Serialize};

/// GPIO line identity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Pin(pub u8);

impl Pin {
    /// Create a pin from its GPIO number
    pub const fn new(number: u8) -> Self {
        Self(number)
    }

    /// GPIO number of this pin
    pub const fn number(self) -> u8 {
        self.0
    }
}

/// Logic level of a pin
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Level {
    /// Logic 0
    Low,
    /// Logic 1 (UART idle / mark)
    High,
}

impl Level {
    /// Check if this is the high level
    pub const fn is_high(self) -> bool {
        matches!(self, Level::High)
    }
}

impl From<bool> for Level {
    fn from(high: bool) -> Self {
        if high {
            Level::High
        } else {
            Level::Low
        }
    }
}

impl From<Level> for bool {
    fn from(level: Level) -> Self {
        level.is_high()
    }
}

/// Immediate digital output by pin number
///
/// Implementations configure the pin as an output if needed and drive it
/// to `level` right away.
pub trait PinDriver {
    /// Drive the pin to the given level now
    fn drive(&mut self, pin: Pin, level: Level);

    /// Drive the pin high
    fn set_high(&mut self, pin: Pin) {
        self.drive(pin, Level::High);
    }

    /// Drive the pin low
    fn set_low(&mut self, pin: Pin) {
        self.drive(pin, Level::Low);
    }
}

impl<T: PinDriver + ?Sized> PinDriver for &mut T {
    fn drive(&mut self, pin: Pin, level: Level) {
        (**self).drive(pin, level);
    }
}

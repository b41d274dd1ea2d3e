//! Serial port identities and the hardware UART primitive
//!
//! A port either maps onto a real UART peripheral or is driven in
//! software on an arbitrary GPIO pin. Which one is decided by the
//! platform's [`HardwareUart`] implementation.

use serde::{Deserialize, Serialize};

/// Serial port identity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PortId {
    /// USB CDC serial
    Usb,
    /// Numbered USART (`Serial1` is `Serial(1)`)
    Serial(u8),
    /// First end of the loopback pair
    LoopbackA,
    /// Second end of the loopback pair
    LoopbackB,
    /// User-created software port
    Software(u8),
}

/// Parity mode
///
/// The discriminants are the numeric forms accepted by port setup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Parity {
    #[default]
    None = 0,
    Odd = 1,
    Even = 2,
}

impl Parity {
    /// Create from the numeric form (0 = none, 1 = odd, 2 = even)
    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            0 => Some(Parity::None),
            1 => Some(Parity::Odd),
            2 => Some(Parity::Even),
            _ => None,
        }
    }

    /// Numeric form of this parity mode
    pub fn code(self) -> u8 {
        self as u8
    }
}

/// Hardware UART configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct UartConfig {
    /// Baud rate in bits per second
    pub baudrate: u32,
    /// Number of data bits per frame
    pub data_bits: u8,
    /// Parity mode
    pub parity: Parity,
    /// Number of stop bits
    pub stop_bits: u8,
    /// XON/XOFF software flow control
    pub xon_xoff: bool,
}

impl Default for UartConfig {
    fn default() -> Self {
        Self {
            baudrate: 9600,
            data_bits: 8,
            parity: Parity::None,
            stop_bits: 1,
            xon_xoff: false,
        }
    }
}

impl UartConfig {
    /// Check if `other` has the same frame format, ignoring the baud rate
    pub fn same_format(&self, other: &UartConfig) -> bool {
        self.data_bits == other.data_bits
            && self.parity == other.parity
            && self.stop_bits == other.stop_bits
            && self.xon_xoff == other.xon_xoff
    }
}

/// Real UART peripherals of the platform
///
/// Transmission enqueues or blocks per platform semantics; it reports
/// nothing back to the caller.
pub trait HardwareUart {
    /// Check whether `port` is backed by a UART peripheral
    fn has_hardware(&self, port: PortId) -> bool;

    /// Apply a frame configuration to the peripheral behind `port`
    fn configure(&mut self, port: PortId, config: &UartConfig);

    /// Send one byte through the peripheral behind `port`
    fn transmit(&mut self, port: PortId, byte: u8);
}

impl<T: HardwareUart + ?Sized> HardwareUart for &mut T {
    fn has_hardware(&self, port: PortId) -> bool {
        (**self).has_hardware(port)
    }

    fn configure(&mut self, port: PortId, config: &UartConfig) {
        (**self).configure(port, config);
    }

    fn transmit(&mut self, port: PortId, byte: u8) {
        (**self).transmit(port, byte);
    }
}

/// Platform without any UART peripherals
///
/// Every port is driven in software.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoHardware;

impl HardwareUart for NoHardware {
    fn has_hardware(&self, _port: PortId) -> bool {
        false
    }

    fn configure(&mut self, _port: PortId, _config: &UartConfig) {}

    fn transmit(&mut self, _port: PortId, _byte: u8) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parity_codes() {
        assert_eq!(Parity::from_code(0), Some(Parity::None));
        assert_eq!(Parity::from_code(1), Some(Parity::Odd));
        assert_eq!(Parity::from_code(2), Some(Parity::Even));
        assert_eq!(Parity::from_code(3), None);
        assert_eq!(Parity::from_code(-1), None);
        assert_eq!(Parity::Even.code(), 2);
    }

    #[test]
    fn test_same_format_ignores_baud() {
        let base = UartConfig::default();
        let faster = UartConfig {
            baudrate: 115_200,
            ..base
        };
        assert!(base.same_format(&faster));

        let seven_bits = UartConfig { data_bits: 7, ..base };
        let odd = UartConfig {
            parity: Parity::Odd,
            ..base
        };
        let two_stop = UartConfig { stop_bits: 2, ..base };
        let xon = UartConfig {
            xon_xoff: true,
            ..base
        };
        for other in [seven_bits, odd, two_stop, xon] {
            assert!(!base.same_format(&other));
        }
    }

    #[test]
    fn test_no_hardware() {
        let uart = NoHardware;
        assert!(!uart.has_hardware(PortId::Serial(1)));
        assert!(!uart.has_hardware(PortId::Usb));
    }
}

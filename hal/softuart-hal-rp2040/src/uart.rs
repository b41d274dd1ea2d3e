//! Hardware UART backend
//!
//! RP2040 has two UART peripherals (UART0 and UART1). They back the
//! `Serial(1)` and `Serial(2)` ports; every other port is software driven.

use embassy_rp::uart::{Blocking, UartTx};
use softuart_hal::{HardwareUart, PortId, UartConfig};

/// UART peripheral identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum UartId {
    Uart0,
    Uart1,
}

impl UartId {
    /// Peripheral backing a port, if any
    pub fn for_port(port: PortId) -> Option<Self> {
        match port {
            PortId::Serial(1) => Some(UartId::Uart0),
            PortId::Serial(2) => Some(UartId::Uart1),
            _ => None,
        }
    }
}

/// Determine which UART can use a given GPIO pin
///
/// RP2040 has specific pin mappings for each UART.
pub fn gpio_to_uart(gpio: u8) -> Option<UartId> {
    // UART0: GPIO 0/1, 12/13, 16/17, 28/29
    // UART1: GPIO 4/5, 8/9, 20/21, 24/25
    match gpio {
        0 | 1 | 12 | 13 | 16 | 17 | 28 | 29 => Some(UartId::Uart0),
        4 | 5 | 8 | 9 | 20 | 21 | 24 | 25 => Some(UartId::Uart1),
        _ => None,
    }
}

/// Transmitter together with the format it was created with
struct Attached<'d> {
    tx: UartTx<'d, Blocking>,
    format: UartConfig,
}

/// Transmit halves of the UART peripherals that were set up
///
/// embassy-rp fixes the frame format when the transmitter is created, so
/// [`HardwareUart::configure`] only changes the baud rate and warns when
/// the requested format differs from the one given to [`attach`].
///
/// [`attach`]: Rp2040Uarts::attach
#[derive(Default)]
pub struct Rp2040Uarts<'d> {
    uart0: Option<Attached<'d>>,
    uart1: Option<Attached<'d>>,
}

impl<'d> Rp2040Uarts<'d> {
    /// No peripherals; every port falls back to software
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a transmitter to a peripheral slot
    ///
    /// `format` is the configuration the transmitter was created with.
    pub fn attach(&mut self, id: UartId, tx: UartTx<'d, Blocking>, format: UartConfig) {
        let attached = Some(Attached { tx, format });
        match id {
            UartId::Uart0 => self.uart0 = attached,
            UartId::Uart1 => self.uart1 = attached,
        }
    }

    fn slot(&mut self, port: PortId) -> Option<&mut Attached<'d>> {
        match UartId::for_port(port)? {
            UartId::Uart0 => self.uart0.as_mut(),
            UartId::Uart1 => self.uart1.as_mut(),
        }
    }
}

impl HardwareUart for Rp2040Uarts<'_> {
    fn has_hardware(&self, port: PortId) -> bool {
        match UartId::for_port(port) {
            Some(UartId::Uart0) => self.uart0.is_some(),
            Some(UartId::Uart1) => self.uart1.is_some(),
            None => false,
        }
    }

    fn configure(&mut self, port: PortId, config: &UartConfig) {
        let Some(slot) = self.slot(port) else {
            return;
        };
        slot.tx.set_baudrate(config.baudrate);
        slot.format.baudrate = config.baudrate;

        if !slot.format.same_format(config) {
            #[cfg(feature = "defmt")]
            defmt::warn!(
                "{:?}: frame format fixed at {} data, {:?}, {} stop; requested {} data, {:?}, {} stop",
                port,
                slot.format.data_bits,
                slot.format.parity,
                slot.format.stop_bits,
                config.data_bits,
                config.parity,
                config.stop_bits
            );
        }
    }

    fn transmit(&mut self, port: PortId, byte: u8) {
        if let Some(slot) = self.slot(port) {
            let _ = slot.tx.blocking_write(&[byte]);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_port_mapping() {
        assert_eq!(UartId::for_port(PortId::Serial(1)), Some(UartId::Uart0));
        assert_eq!(UartId::for_port(PortId::Serial(2)), Some(UartId::Uart1));
        assert_eq!(UartId::for_port(PortId::Serial(3)), None);
        assert_eq!(UartId::for_port(PortId::Usb), None);
        assert_eq!(UartId::for_port(PortId::Software(1)), None);
    }

    #[test]
    fn test_gpio_mapping() {
        assert_eq!(gpio_to_uart(0), Some(UartId::Uart0));
        assert_eq!(gpio_to_uart(29), Some(UartId::Uart0));
        assert_eq!(gpio_to_uart(8), Some(UartId::Uart1));
        assert_eq!(gpio_to_uart(2), None);
    }
}

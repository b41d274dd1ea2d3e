//! Serial port facade
//!
//! Owns the configuration registry together with the platform primitives
//! and exposes the user-facing port operations. Each write evaluates the
//! byte source first, so a rejected source never produces output, then
//! selects a sink and pushes every byte through it. A write the pin
//! scheduler could not hold is reported as [`Error::Sink`].

use softuart_hal::{Clock, HardwareUart, PinDriver, PinScheduler, PortId};

use crate::config::{FrameConfig, PortRegistry, SerialOptions};
use crate::error::Error;
use crate::sink::{ByteSink, OutputSink};
use crate::source::Value;

/// Line terminator appended by [`SerialPorts::println`]
pub const LINE_ENDING: &[u8] = b"\r\n";

/// Serial ports of one device
pub struct SerialPorts<U, P, C> {
    registry: PortRegistry,
    uart: U,
    pins: P,
    clock: C,
}

impl<U, P, C> SerialPorts<U, P, C>
where
    U: HardwareUart,
    P: PinScheduler + PinDriver,
    C: Clock,
{
    /// Create with no configured ports
    pub fn new(uart: U, pins: P, clock: C) -> Self {
        Self {
            registry: PortRegistry::new(),
            uart,
            pins,
            clock,
        }
    }

    /// Configure a port
    ///
    /// Missing arguments keep the port's current values. Ports backed by a
    /// hardware UART are reprogrammed with the result.
    pub fn setup(
        &mut self,
        port: PortId,
        baud_rate: Option<u32>,
        options: Option<&SerialOptions>,
    ) -> Result<FrameConfig, Error> {
        let config = match self.registry.configure(port, baud_rate, options) {
            Ok(config) => config,
            Err(e) => {
                warn!("{:?}: setup rejected: {:?}", port, e);
                return Err(e.into());
            }
        };

        if self.uart.has_hardware(port) {
            self.uart.configure(port, &config.uart_config());
        }

        info!("{:?}: {} baud, {} data, {} stop", port, config.baud_rate, config.bit_width, config.stop_bits);
        Ok(config)
    }

    /// Write the bytes of `value`
    pub fn write(&mut self, port: PortId, value: &Value<'_>) -> Result<(), Error> {
        let bytes = value.bytes()?;
        self.send(port, bytes)
    }

    /// Write text without a terminator
    pub fn print(&mut self, port: PortId, text: &str) -> Result<(), Error> {
        self.send(port, text.bytes())
    }

    /// Write text followed by CR LF, as one transmission
    pub fn println(&mut self, port: PortId, text: &str) -> Result<(), Error> {
        self.send(port, text.bytes().chain(LINE_ENDING.iter().copied()))
    }

    fn send<I: IntoIterator<Item = u8>>(&mut self, port: PortId, bytes: I) -> Result<(), Error> {
        let sink = OutputSink::select(port, &self.registry, &mut self.uart, &mut self.pins, &self.clock);
        if let Some(mut sink) = sink {
            sink.put_all(bytes);
            sink.finish()?;
        }
        Ok(())
    }

    /// Active frame configuration of a port
    pub fn frame_config(&self, port: PortId) -> FrameConfig {
        self.registry.frame_config(port)
    }

    /// Configuration registry
    pub fn registry(&self) -> &PortRegistry {
        &self.registry
    }

    /// Adopt a previously saved registry
    ///
    /// Hardware UARTs are reprogrammed for every stored port they back.
    pub fn restore(&mut self, registry: PortRegistry) {
        for (port, _) in registry.iter() {
            if self.uart.has_hardware(port) {
                self.uart.configure(port, &registry.frame_config(port).uart_config());
            }
        }
        debug!("restored {} ports", registry.len());
        self.registry = registry;
    }

    /// Hardware UART access
    pub fn uart(&mut self) -> &mut U {
        &mut self.uart
    }

    /// Pin backend access
    pub fn pins(&mut self) -> &mut P {
        &mut self.pins
    }
}

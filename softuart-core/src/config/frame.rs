//! Validated serial frame configuration

use serde::{Deserialize, Serialize};
use softuart_hal::{Parity, Pin, UartConfig};

use super::options::{FlowArg, ParityArg, SerialOptions};

/// Baud rate used until a port is configured
pub const DEFAULT_BAUD_RATE: u32 = 9600;

/// Baud rates must be strictly above this
pub const MIN_BAUD_RATE_EXCLUSIVE: u32 = 100;

/// Highest accepted baud rate
pub const MAX_BAUD_RATE: u32 = 10_000_000;

/// Errors raised while configuring a port
///
/// All of them abort the configuration step; the previous configuration
/// stays in effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Baud rate outside (100, 10_000_000]
    InvalidBaudRate(u32),
    /// Parity designator not recognized
    InvalidParity,
    /// Flow control designator not recognized
    InvalidFlowControl,
    /// No room left in the port registry
    TooManyPorts,
}

/// Flow control mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FlowControl {
    #[default]
    None,
    XonXoff,
}

/// Active frame parameters of a port
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FrameConfig {
    /// Bits per second
    pub baud_rate: u32,
    /// Data bits per frame
    pub bit_width: u8,
    /// Parity mode (validated, not emitted by the software encoder)
    pub parity: Parity,
    /// Stop bits per frame
    pub stop_bits: u8,
    /// Flow control mode
    pub flow_control: FlowControl,
    /// Receive pin
    pub rx: Option<Pin>,
    /// Transmit pin
    pub tx: Option<Pin>,
    /// Clock pin
    pub ck: Option<Pin>,
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            baud_rate: DEFAULT_BAUD_RATE,
            bit_width: 8,
            parity: Parity::None,
            stop_bits: 1,
            flow_control: FlowControl::None,
            rx: None,
            tx: None,
            ck: None,
        }
    }
}

impl FrameConfig {
    /// Build a frame configuration from a baud rate and raw options
    ///
    /// Fields missing from `options` (or all of them, if there are no
    /// options) take their defaults.
    pub fn from_settings(
        baud_rate: u32,
        options: Option<&SerialOptions>,
    ) -> Result<Self, ConfigError> {
        let mut config = Self {
            baud_rate: validate_baud_rate(baud_rate)?,
            ..Self::default()
        };

        if let Some(options) = options {
            config.rx = options.rx;
            config.tx = options.tx;
            config.ck = options.ck;
            if let Some(bytesize) = options.bytesize {
                config.bit_width = bytesize;
            }
            config.parity = parse_parity(options.parity.as_ref())?;
            if let Some(stopbits) = options.stopbits {
                config.stop_bits = stopbits;
            }
            config.flow_control = parse_flow(options.flow.as_ref())?;
        }

        Ok(config)
    }

    /// Total bits on the wire per frame (start + data + stop)
    pub fn frame_bits(&self) -> u32 {
        1 + self.bit_width as u32 + self.stop_bits as u32
    }

    /// Configuration for a hardware UART peripheral
    pub fn uart_config(&self) -> UartConfig {
        UartConfig {
            baudrate: self.baud_rate,
            data_bits: self.bit_width,
            parity: self.parity,
            stop_bits: self.stop_bits,
            xon_xoff: self.flow_control == FlowControl::XonXoff,
        }
    }
}

/// Check a baud rate against the accepted range
pub fn validate_baud_rate(baud_rate: u32) -> Result<u32, ConfigError> {
    if baud_rate <= MIN_BAUD_RATE_EXCLUSIVE || baud_rate > MAX_BAUD_RATE {
        return Err(ConfigError::InvalidBaudRate(baud_rate));
    }
    Ok(baud_rate)
}

/// Normalize a parity designator
///
/// Absent means no parity.
pub fn parse_parity(arg: Option<&ParityArg>) -> Result<Parity, ConfigError> {
    match arg {
        None => Ok(Parity::None),
        Some(ParityArg::Name(name)) => match name.as_str() {
            "none" => Ok(Parity::None),
            "o" | "odd" => Ok(Parity::Odd),
            "e" | "even" => Ok(Parity::Even),
            _ => Err(ConfigError::InvalidParity),
        },
        Some(ParityArg::Code(code)) => Parity::from_code(*code).ok_or(ConfigError::InvalidParity),
    }
}

/// Normalize a flow control designator
///
/// Absent means no flow control.
pub fn parse_flow(arg: Option<&FlowArg>) -> Result<FlowControl, ConfigError> {
    match arg {
        None => Ok(FlowControl::None),
        Some(FlowArg::Name(name)) => match name.as_str() {
            "none" => Ok(FlowControl::None),
            "xon" => Ok(FlowControl::XonXoff),
            _ => Err(ConfigError::InvalidFlowControl),
        },
    }
}

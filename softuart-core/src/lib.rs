//! softuart core
//!
//! Board-agnostic half of the serial transmitter:
//! - Per-port frame configuration and its validation
//! - Flattening of heterogeneous write values into bytes
//! - Sink selection between hardware UARTs and the software encoder
//! - The run-length edge encoder that turns bytes into timed pin changes
//! - Persistence of port settings across restarts
//!
//! Platform access goes through the traits in `softuart-hal`, so all of
//! this runs in host tests against mocks.

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

#[macro_use]
mod fmt;

pub mod config;
pub mod encoder;
pub mod error;
pub mod persist;
pub mod port;
pub mod sink;
pub mod source;

#[cfg(test)]
mod mock;

pub use config::{ConfigError, FrameConfig, PortRegistry, PortSettings, SerialOptions};
pub use encoder::{EdgeEvent, SoftUartEncoder, TransmissionCursor, LEAD_TIME};
pub use error::Error;
pub use persist::PersistError;
pub use port::SerialPorts;
pub use sink::{ByteSink, OutputSink, SinkError};
pub use source::{SourceError, Value, MAX_NESTING};

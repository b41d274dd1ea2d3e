//! Raw port options as supplied by the caller
//!
//! These are stored unvalidated-as-given so they can be replayed after a
//! restart; [`super::FrameConfig`] is the validated form.

use heapless::String;
use serde::{Deserialize, Serialize};
use softuart_hal::Pin;

/// Longest parity / flow designator kept verbatim
pub const MAX_ARG_LEN: usize = 8;

/// Parity designator: symbolic (`"o"`, `"even"`, ...) or numeric (0/1/2)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ParityArg {
    Name(String<MAX_ARG_LEN>),
    Code(i32),
}

impl ParityArg {
    /// Symbolic designator
    pub fn name(name: &str) -> Self {
        ParityArg::Name(truncated(name))
    }
}

/// Flow control designator (`"none"` or `"xon"`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FlowArg {
    Name(String<MAX_ARG_LEN>),
}

impl FlowArg {
    /// Symbolic designator
    pub fn name(name: &str) -> Self {
        FlowArg::Name(truncated(name))
    }
}

/// Options structure for port setup
///
/// `None` fields are absent (or null) in the caller's options.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SerialOptions {
    /// Receive pin
    pub rx: Option<Pin>,
    /// Transmit pin
    pub tx: Option<Pin>,
    /// Clock pin (synchronous mode)
    pub ck: Option<Pin>,
    /// Data bits per frame
    pub bytesize: Option<u8>,
    /// Parity designator
    pub parity: Option<ParityArg>,
    /// Stop bits per frame
    pub stopbits: Option<u8>,
    /// Flow control designator
    pub flow: Option<FlowArg>,
}

impl SerialOptions {
    /// Options with only a transmit pin
    pub fn with_tx(pin: Pin) -> Self {
        Self {
            tx: Some(pin),
            ..Self::default()
        }
    }
}

/// Keep the longest prefix that fits, on a char boundary
///
/// Every accepted designator is at most four bytes, so a truncated name
/// (five bytes or more) can never turn into a valid one.
fn truncated(s: &str) -> String<MAX_ARG_LEN> {
    let mut out = String::new();
    for c in s.chars() {
        if out.push(c).is_err() {
            break;
        }
    }
    out
}

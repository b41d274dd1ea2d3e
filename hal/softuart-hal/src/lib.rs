//! softuart Hardware Abstraction Layer
//!
//! This crate defines the platform primitives the software UART depends on
//! but does not implement. Chip-specific HALs provide the implementations,
//! so the same encoder runs unchanged on the target and in host tests.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  softuart-core (config, sinks, encoder) │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  softuart-hal (this crate - traits)     │
//! └─────────────────────────────────────────┘
//!                     │
//!         ┌───────────┴───────────┐
//!         ▼                       ▼
//! ┌───────────────┐       ┌───────────────┐
//! │ softuart-hal- │       │  host mocks   │
//! │    rp2040     │       │   (tests)     │
//! └───────────────┘       └───────────────┘
//! ```
//!
//! # Traits
//!
//! - [`timer::Clock`], [`timer::PinScheduler`] - Time source and timed pin output
//! - [`gpio::PinDriver`] - Immediate pin output
//! - [`uart::HardwareUart`] - Real UART peripherals
//! - [`flash::FlashStorage`] - Persistent storage
//!
//! [`queue::PinQueues`] is shared edge storage for timer-driven backends.

#![no_std]
#![deny(unsafe_code)]

pub mod flash;
pub mod gpio;
pub mod queue;
pub mod time;
pub mod timer;
pub mod uart;

// Re-export key traits at crate root for convenience
pub use flash::{FlashError, FlashStorage, StorageKey};
pub use gpio::{Level, Pin, PinDriver};
pub use queue::{PinQueues, QueueFull};
pub use time::{Duration, Instant};
pub use timer::{Clock, PinScheduler};
pub use uart::{HardwareUart, NoHardware, Parity, PortId, UartConfig};

//! RP2040 backends for the softuart transmitter
//!
//! Implements the `softuart-hal` traits on embassy-rp:
//!
//! - Per-pin edge queues and a timer task for scheduled pin output
//! - Embassy time driver as the clock
//! - UART0/UART1 as the hardware ports
//! - GPIO naming
//! - Flash storage driver for persisted port settings

#![no_std]

pub mod flash;
pub mod gpio;
pub mod timer;
pub mod uart;

pub use flash::Rp2040FlashStorage;
pub use timer::{run_pin_timer, EdgeQueue, EmbassyClock, QueueHandle};
pub use uart::{gpio_to_uart, Rp2040Uarts, UartId};

//! GPIO naming
//!
//! Port options name pins by GPIO number; board configuration uses the
//! `gpioN` form. Both end up as a [`Pin`].

use softuart_hal::Pin;

/// Number of GPIO pins on RP2040
pub const GPIO_COUNT: u8 = 30;

/// Pin for a raw GPIO number, if it exists on this chip
pub fn gpio(number: u8) -> Option<Pin> {
    (number < GPIO_COUNT).then_some(Pin(number))
}

/// Parse a pin string
///
/// Accepts `"gpio4"` and bare `"4"`. Surrounding whitespace is ignored.
pub fn parse_pin_string(s: &str) -> Option<Pin> {
    let s = s.trim();
    let digits = s.strip_prefix("gpio").unwrap_or(s);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    gpio(digits.parse().ok()?)
}

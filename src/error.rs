//! Unified error type for canpanel.
//!
//! We avoid `alloc` - all error variants carry only fixed-size data.
//! Implements `defmt::Format` (behind the `defmt` feature) for efficient
//! on-target logging.

/// Top-level error type used across the firmware.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    // Hardware
    /// A strobe output or sense input could not be driven/read.
    Pin,

    /// SPI transaction to the display chip failed.
    Display,

    // Addressing
    /// Button number outside `0..NUM_BUTTONS`.
    InvalidButton(u8),

    /// LED number outside `1..=NUM_LEDS`.
    InvalidLed(u8),

    // Node variables
    /// Node-variable index outside the table.
    InvalidNodeVariable(u8),

    /// Value refused by node-variable validation.
    NodeVariableRejected { index: u8, value: u8 },

    // Generic
    /// Fixed-capacity queue has no room for another entry.
    QueueFull,
}

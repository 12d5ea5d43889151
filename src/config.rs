//! Application-wide constants and compile-time configuration.
//!
//! Matrix geometry, scan timing, LED display and queue sizes live here so
//! they can be tuned in one place. Run-time configuration (per-button
//! flags, brightness, start-of-day delay) lives in the node-variable table,
//! see [`crate::nv`].

// Button matrix

/// Number of strobe (column) outputs.
pub const COLUMNS: usize = 8;

/// Number of sense (row) inputs read per strobed column.
pub const ROWS: usize = 8;

/// Maximum number of buttons/switches the matrix supports.
pub const NUM_BUTTONS: usize = COLUMNS * ROWS;

/// Consecutive disagreeing scans before a new level is accepted.
/// 4 scans at 10 ms is ~40 ms of settle time.
pub const DEBOUNCE_THRESHOLD: u8 = 4;

/// Period between matrix scans (ms).
pub const SCAN_PERIOD_MS: u64 = 10;

// Start-up

/// Fixed delay after power-up before scanning starts and the module
/// announces itself (ms). Lets the other modules on the bus power up.
pub const STARTUP_DELAY_MS: u64 = 2000;

/// Unit of the `SOD_DELAY` node variable (ms).
pub const SOD_DELAY_UNIT_MS: u64 = 100;

// LED display

/// Number of individually addressable LEDs (8 digits x 8 segments).
pub const NUM_LEDS: usize = 64;

/// Digits driven by the display chip.
pub const DISPLAY_DIGITS: usize = 8;

/// Highest display intensity level.
pub const MAX_BRIGHTNESS: u8 = 15;

// LED self-test

/// Time each LED stays lit while the walking-segment test runs (ms).
pub const LED_TEST_STEP_MS: u64 = 500;

// Event producer / consumer

/// Action slots per taught event (pairs of LED number + flags).
pub const ACTIONS_PER_EVENT: usize = 10;

/// Capacity of the outbound produced-event queue.
pub const PRODUCED_QUEUE_LEN: usize = 16;

/// Capacity of the inbound consumed-event queue.
pub const CONSUMED_QUEUE_LEN: usize = 4;

// GPIO pin assignments (nRF52840-DK header)
//
// Logical names only; the concrete `embassy_nrf::peripherals::*` are
// selected in `main.rs`.
//
//   Strobe C0..C7   -> P1.01 .. P1.08   (active low, push-pull)
//   Sense  R0..R7   -> P0.03, P0.04, P0.28 .. P0.31, P0.26, P0.27 (pull-up)
//   Display SCK     -> P0.13
//   Display MOSI    -> P0.14
//   Display CS      -> P0.15

//! Library interface for the canpanel firmware.
//!
//! Everything that does not touch a concrete peripheral lives here and is
//! generic over `embedded-hal` traits, so the same code runs in the
//! nRF52840 binary and in host tests.
//!
//! Usage: `cargo test --lib` (unit tests) or `cargo test` (adds
//! `tests/integration.rs`).
//!
//! Note: The embedded binary (`src/main.rs`, feature `embedded`) only adds
//! board wiring, tasks and timers on top of this crate.

#![cfg_attr(not(test), no_std)]

pub mod bus;
pub mod config;
pub mod error;
pub mod events;
pub mod leds;
pub mod matrix;
pub mod nv;
pub mod startup_logic;

pub use error::Error;

// ═══════════════════════════════════════════════════════════════════════════
// Unit Tests
// ═══════════════════════════════════════════════════════════════════════════

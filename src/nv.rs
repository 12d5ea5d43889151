//! Node variables - the module's run-time configuration.
//!
//! A flat byte table: eight global settings followed by one flags byte per
//! button. The table lives in RAM; how a transport reads/writes it and how
//! it is persisted is up to the protocol stack.
//!
//! Layout:
//! ```text
//! 0      VERSION
//! 1      SOD_DELAY        extra start-up delay, 100 ms units
//! 2      HB_DELAY         reserved, heartbeat belongs to the transport
//! 3      PANEL_FLAGS      reserved
//! 4      SEG_OUTPUTS      reserved, every digit drives discrete LEDs
//! 5      BRIGHTNESS       0-15
//! 6      RESPONSE_DELAY   pacing of multi-message responses
//! 7      TEST_MODE
//! 8..72  PB_FLAGS[0..64]  per-button ButtonFlags
//! ```
//!
//! Reserved variables are stored and read back unchecked but change no
//! behaviour, so a configuration tool written for the full layout still
//! works.

use crate::config::{MAX_BRIGHTNESS, NUM_BUTTONS, SOD_DELAY_UNIT_MS};
use crate::error::Error;
use crate::matrix::ButtonId;

pub const NV_VERSION: u8 = 0;
pub const NV_SOD_DELAY: u8 = 1;
pub const NV_HB_DELAY: u8 = 2;
pub const NV_PANEL_FLAGS: u8 = 3;
pub const NV_SEG_OUTPUTS: u8 = 4;
pub const NV_BRIGHTNESS: u8 = 5;
pub const NV_RESPONSE_DELAY: u8 = 6;
pub const NV_TEST_MODE: u8 = 7;
/// First per-button flags byte.
pub const NV_PB_FLAGS: u8 = 8;

/// Number of node variables.
pub const NV_NUM: usize = NV_PB_FLAGS as usize + NUM_BUTTONS;

/// Layout version reported in `NV_VERSION`.
pub const NV_LAYOUT_VERSION: u8 = 1;

/// Per-button configuration byte.
///
/// ```text
/// Bit 0 = SEND_ON     produce an ON event when the logical state goes on
/// Bit 1 = SEND_OFF    produce an OFF event when the logical state goes off
/// Bit 2 = POLARITY    logical state follows the line level (not inverted)
/// Bit 3 = TOGGLE      each debounced edge flips the logical state
/// Bit 4 = ENABLE_SOD  report this button in start-of-day responses
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ButtonFlags(pub u8);

impl ButtonFlags {
    pub const SEND_ON: u8 = 0x01;
    pub const SEND_OFF: u8 = 0x02;
    pub const POLARITY: u8 = 0x04;
    pub const TOGGLE: u8 = 0x08;
    pub const ENABLE_SOD: u8 = 0x10;

    pub const fn send_on(self) -> bool {
        self.0 & Self::SEND_ON != 0
    }

    pub const fn send_off(self) -> bool {
        self.0 & Self::SEND_OFF != 0
    }

    pub const fn polarity(self) -> bool {
        self.0 & Self::POLARITY != 0
    }

    pub const fn toggle(self) -> bool {
        self.0 & Self::TOGGLE != 0
    }

    pub const fn enable_sod(self) -> bool {
        self.0 & Self::ENABLE_SOD != 0
    }
}

/// Source of per-button configuration.
///
/// Looked up afresh on every interpretation, so changes take effect on the
/// next debounced transition.
pub trait FlagsProvider {
    fn flags_for(&self, button: ButtonId) -> ButtonFlags;
}

/// Factory default for one node variable.
pub const fn default_value(index: u8) -> u8 {
    match index {
        NV_VERSION => NV_LAYOUT_VERSION,
        NV_RESPONSE_DELAY => 2,
        _ => 0,
    }
}

/// In-RAM node-variable table.
#[derive(Clone)]
pub struct NodeVariables {
    values: [u8; NV_NUM],
}

impl NodeVariables {
    /// Table holding factory defaults.
    pub const fn new() -> Self {
        let mut values = [0u8; NV_NUM];
        let mut i = 0;
        while i < NV_NUM {
            values[i] = default_value(i as u8);
            i += 1;
        }
        Self { values }
    }

    pub fn get(&self, index: u8) -> Result<u8, Error> {
        self.values
            .get(index as usize)
            .copied()
            .ok_or(Error::InvalidNodeVariable(index))
    }

    /// Validate and store a value. Returns the previous value.
    pub fn set(&mut self, index: u8, value: u8) -> Result<u8, Error> {
        let slot = self
            .values
            .get_mut(index as usize)
            .ok_or(Error::InvalidNodeVariable(index))?;

        let valid = match index {
            NV_VERSION => value == NV_LAYOUT_VERSION,
            NV_BRIGHTNESS => value <= MAX_BRIGHTNESS,
            _ => true,
        };
        if !valid {
            #[cfg(feature = "defmt")]
            defmt::warn!("NV{} rejected value {}", index, value);
            return Err(Error::NodeVariableRejected { index, value });
        }

        let old = core::mem::replace(slot, value);
        #[cfg(feature = "defmt")]
        if old != value {
            defmt::debug!("NV{}: {} -> {}", index, old, value);
        }
        Ok(old)
    }

    /// Restore every variable to its factory default.
    pub fn factory_reset(&mut self) {
        *self = Self::new();
        #[cfg(feature = "defmt")]
        defmt::info!("Node variables reset to factory defaults");
    }

    pub fn set_button_flags(&mut self, button: ButtonId, flags: ButtonFlags) {
        self.values[NV_PB_FLAGS as usize + button.index()] = flags.0;
    }

    /// Display intensity, clamped to the chip's range.
    pub fn brightness(&self) -> u8 {
        self.values[NV_BRIGHTNESS as usize].min(MAX_BRIGHTNESS)
    }

    /// Extra start-up delay configured by `SOD_DELAY` (ms).
    pub fn sod_delay_ms(&self) -> u64 {
        self.values[NV_SOD_DELAY as usize] as u64 * SOD_DELAY_UNIT_MS
    }

    pub fn response_delay(&self) -> u8 {
        self.values[NV_RESPONSE_DELAY as usize]
    }

    /// Non-zero `TEST_MODE` runs the walking-segment LED test.
    pub fn test_mode(&self) -> bool {
        self.values[NV_TEST_MODE as usize] != 0
    }
}

impl Default for NodeVariables {
    fn default() -> Self {
        Self::new()
    }
}

impl FlagsProvider for NodeVariables {
    fn flags_for(&self, button: ButtonId) -> ButtonFlags {
        ButtonFlags(self.values[NV_PB_FLAGS as usize + button.index()])
    }
}

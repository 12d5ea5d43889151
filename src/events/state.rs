//! Logical state store.
//!
//! Holds the post-interpretation on/off value of every button. Only the
//! transition interpreter writes it; the start-of-day responder and the
//! producer's "current state of this happening" query read it.

use super::{EventState, Happening};
use crate::config::NUM_BUTTONS;
use crate::matrix::ButtonId;

pub struct LogicalStateStore {
    states: [bool; NUM_BUTTONS],
}

impl LogicalStateStore {
    /// Every button starts OFF.
    pub const fn new() -> Self {
        Self {
            states: [false; NUM_BUTTONS],
        }
    }

    pub fn get(&self, button: ButtonId) -> bool {
        self.states[button.index()]
    }

    pub fn set(&mut self, button: ButtonId, on: bool) {
        self.states[button.index()] = on;
    }

    /// State by raw button number; `Unknown` past the end of the matrix.
    pub fn event_state(&self, button: u8) -> EventState {
        match self.states.get(button as usize) {
            Some(&on) => EventState::from(on),
            None => EventState::Unknown,
        }
    }

    /// State of a produced happening; `Unknown` for anything that is not a
    /// button happening.
    pub fn happening_state(&self, happening: Happening) -> EventState {
        match happening.button() {
            Some(button) => EventState::from(self.get(button)),
            None => EventState::Unknown,
        }
    }
}

impl Default for LogicalStateStore {
    fn default() -> Self {
        Self::new()
    }
}

//! Per-button debounce logic.
//!
//! Each button has an accepted (debounced) level and a counter of
//! consecutive scans whose raw level disagreed with it. The new level is
//! accepted on the `DEBOUNCE_THRESHOLD`-th consecutive disagreement. Any
//! scan where the raw level agrees again drops the count back to zero, so
//! chatter shorter than the threshold never commits.

use super::ButtonId;
use crate::config::{DEBOUNCE_THRESHOLD, NUM_BUTTONS};

const _: () = assert!(DEBOUNCE_THRESHOLD > 0 && DEBOUNCE_THRESHOLD <= 15);

pub struct Debouncer {
    /// Accepted electrical level per button (`true` = line high).
    accepted: [bool; NUM_BUTTONS],
    /// Consecutive disagreeing scans, `0..=DEBOUNCE_THRESHOLD`.
    counters: [u8; NUM_BUTTONS],
}

impl Debouncer {
    /// All lines high (open contacts on a pulled-up matrix), counters idle.
    pub const fn new() -> Self {
        Self {
            accepted: [true; NUM_BUTTONS],
            counters: [0; NUM_BUTTONS],
        }
    }

    /// Accept `level` without debouncing. Used by the silent start-up pass.
    pub fn seed(&mut self, button: ButtonId, level: bool) {
        self.accepted[button.index()] = level;
        self.counters[button.index()] = 0;
    }

    /// Feed one raw sample. Returns the newly accepted level when this
    /// sample completes a debounced transition.
    pub fn advance(&mut self, button: ButtonId, raw: bool) -> Option<bool> {
        let i = button.index();

        if raw == self.accepted[i] {
            self.counters[i] = 0;
            return None;
        }

        self.counters[i] = (self.counters[i] + 1).min(DEBOUNCE_THRESHOLD);
        if self.counters[i] == DEBOUNCE_THRESHOLD {
            self.counters[i] = 0;
            self.accepted[i] = raw;
            Some(raw)
        } else {
            None
        }
    }

    pub fn accepted(&self, button: ButtonId) -> bool {
        self.accepted[button.index()]
    }

    pub fn counter(&self, button: ButtonId) -> u8 {
        self.counters[button.index()]
    }
}

impl Default for Debouncer {
    fn default() -> Self {
        Self::new()
    }
}

//! Start-of-day (SOD) responder.
//!
//! When another node asks for start-of-day, the panel reports the current
//! logical state of every button whose `ENABLE_SOD` flag is set. The
//! report is spread over many calls - one button per [`SodResponder::step`]
//! - so the bus is not flooded and the main loop never stalls.
//!
//! A `POLARITY` button reports the complement of its stored state. The
//! result then goes through the same `SEND_ON`/`SEND_OFF` gating as a live
//! transition.

use super::interpreter::gated_event_state;
use super::state::LogicalStateStore;
use super::{Happening, ProducedEvent};
use crate::config::NUM_BUTTONS;
use crate::matrix::ButtonId;
use crate::nv::FlagsProvider;

/// Outcome of one responder step.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SodStep {
    /// More buttons remain; carries this step's event, if any.
    Next(Option<ProducedEvent>),
    /// Nothing (left) to report.
    Finished,
}

#[derive(Default)]
pub struct SodResponder {
    /// Next button to report, `None` when idle.
    cursor: Option<usize>,
}

impl SodResponder {
    pub const fn new() -> Self {
        Self { cursor: None }
    }

    /// Begin a response from the first button. Restarts one in progress.
    pub fn start(&mut self) {
        #[cfg(feature = "defmt")]
        if self.cursor.is_some() {
            defmt::debug!("SOD restarted");
        }
        self.cursor = Some(0);
    }

    pub fn is_active(&self) -> bool {
        self.cursor.is_some()
    }

    /// Report the next button.
    pub fn step<F>(&mut self, config: &F, states: &LogicalStateStore) -> SodStep
    where
        F: FlagsProvider + ?Sized,
    {
        let Some(index) = self.cursor else {
            return SodStep::Finished;
        };
        if index >= NUM_BUTTONS {
            self.cursor = None;
            return SodStep::Finished;
        }
        self.cursor = Some(index + 1);

        let button = ButtonId::from_index(index);
        let flags = config.flags_for(button);
        if !flags.enable_sod() {
            return SodStep::Next(None);
        }

        let on = states.get(button) != flags.polarity();
        let event = gated_event_state(flags, on).map(|state| ProducedEvent {
            happening: Happening::for_button(button),
            state,
        });
        SodStep::Next(event)
    }
}

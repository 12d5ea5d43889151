//! Produced/consumed event layer.
//!
//! Button transitions leave the module as *produced events* identified by
//! a happening number; inbound *consumed events* drive LED actions.
//!
//! ## Components
//!
//! - [`state`] - logical on/off state per button
//! - [`interpreter`] - committed transition → logical state → event
//! - [`sod`] - start-of-day state broadcast
//! - [`actions`] - consumed event → LED actions

pub mod actions;
pub mod interpreter;
pub mod sod;
pub mod state;


use heapless::Deque;

use crate::config::NUM_BUTTONS;
use crate::matrix::ButtonId;

/// Outward-facing identifier of a producible event.
///
/// Button `n` produces happening `n + 1`; the module's own start-of-day
/// announcement uses `NUM_BUTTONS + 1`. Happening 0 is never produced.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Happening(u8);

impl Happening {
    /// Announced once after start-up.
    pub const SOD: Happening = Happening(NUM_BUTTONS as u8 + 1);

    pub const fn for_button(button: ButtonId) -> Self {
        Happening(button.index() as u8 + 1)
    }

    pub const fn new(number: u8) -> Self {
        Happening(number)
    }

    pub const fn number(self) -> u8 {
        self.0
    }

    /// The button behind this happening, if it is a button happening.
    pub fn button(self) -> Option<ButtonId> {
        self.0.checked_sub(1).and_then(|b| ButtonId::new(b).ok())
    }
}

/// On/off state of an event or logical point.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EventState {
    On,
    Off,
    /// Queried point does not exist.
    Unknown,
}

impl From<bool> for EventState {
    fn from(on: bool) -> Self {
        if on {
            EventState::On
        } else {
            EventState::Off
        }
    }
}

/// One event handed to the transport.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ProducedEvent {
    pub happening: Happening,
    pub state: EventState,
}

impl ProducedEvent {
    pub const fn on(happening: Happening) -> Self {
        Self {
            happening,
            state: EventState::On,
        }
    }

    pub const fn off(happening: Happening) -> Self {
        Self {
            happening,
            state: EventState::Off,
        }
    }
}

/// Outbound event sink.
///
/// Emission never fails from the caller's point of view; a sink that runs
/// out of room drops the event and logs it.
pub trait EventSink {
    fn emit(&mut self, event: ProducedEvent);
}

/// Fixed-capacity FIFO of produced events.
pub struct EventQueue<const N: usize> {
    events: Deque<ProducedEvent, N>,
    dropped: usize,
}

impl<const N: usize> EventQueue<N> {
    pub const fn new() -> Self {
        Self {
            events: Deque::new(),
            dropped: 0,
        }
    }

    /// Oldest queued event.
    pub fn pop(&mut self) -> Option<ProducedEvent> {
        self.events.pop_front()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Events discarded because the queue was full.
    pub fn dropped(&self) -> usize {
        self.dropped
    }

    pub fn iter(&self) -> impl Iterator<Item = &ProducedEvent> {
        self.events.iter()
    }
}

impl<const N: usize> Default for EventQueue<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> EventSink for EventQueue<N> {
    fn emit(&mut self, event: ProducedEvent) {
        if self.events.push_back(event).is_err() {
            self.dropped += 1;
            #[cfg(feature = "defmt")]
            defmt::warn!("Produced event queue full - dropping {}", event);
        }
    }
}

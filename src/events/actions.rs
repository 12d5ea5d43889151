//! Consumed events → LED actions.
//!
//! Each taught event carries a short list of `(led, flags)` actions. When
//! the event arrives ON or OFF every action is resolved independently:
//!
//! ```text
//! led == 0               no action
//! led == NUM_LEDS + 1    special; flags == SPECIAL_SOD starts a SOD response
//! led  > NUM_LEDS + 1    ignored
//! ```
//!
//! For a real LED the flags decide the polarity (`ENABLE_ON`/`ENABLE_OFF`
//! gate the event, `INVERT_EVENT` swaps it) and, when the polarity is on,
//! whether the LED is lit steadily or blinks (`FLASH`, `INVERT_FLASH`).

use heapless::Vec;

use super::EventState;
use crate::config::{ACTIONS_PER_EVENT, NUM_LEDS};
use crate::error::Error;
use crate::leds::{LedMap, SegmentWriter};

/// LED number that addresses the special actions.
pub const ACTION_SPECIALS: u8 = NUM_LEDS as u8 + 1;

/// Special action: start a start-of-day response.
pub const SPECIAL_SOD: u8 = 1;

/// Flags byte of one action.
///
/// ```text
/// Bit 0 = ENABLE_ON     act on ON events
/// Bit 1 = ENABLE_OFF    act on OFF events
/// Bit 2 = INVERT_EVENT  ON turns the LED off, OFF turns it on
/// Bit 3 = FLASH         blink instead of steady on
/// Bit 4 = INVERT_FLASH  blink in anti-phase
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ActionFlags(pub u8);

impl ActionFlags {
    pub const ENABLE_ON: u8 = 0x01;
    pub const ENABLE_OFF: u8 = 0x02;
    pub const INVERT_EVENT: u8 = 0x04;
    pub const FLASH: u8 = 0x08;
    pub const INVERT_FLASH: u8 = 0x10;

    pub const fn enable_on(self) -> bool {
        self.0 & Self::ENABLE_ON != 0
    }

    pub const fn enable_off(self) -> bool {
        self.0 & Self::ENABLE_OFF != 0
    }

    pub const fn invert_event(self) -> bool {
        self.0 & Self::INVERT_EVENT != 0
    }

    pub const fn flash(self) -> bool {
        self.0 & Self::FLASH != 0
    }

    pub const fn invert_flash(self) -> bool {
        self.0 & Self::INVERT_FLASH != 0
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Action {
    pub led: u8,
    pub flags: ActionFlags,
}

impl Action {
    pub const fn new(led: u8, flags: u8) -> Self {
        Self {
            led,
            flags: ActionFlags(flags),
        }
    }
}

pub type ActionList = Vec<Action, ACTIONS_PER_EVENT>;

/// Build an action list from raw event-variable bytes laid out as
/// `led, flags, led, flags, ...`. A trailing odd byte and anything past
/// `ACTIONS_PER_EVENT` pairs is ignored.
pub fn parse_actions(evs: &[u8]) -> ActionList {
    evs.chunks_exact(2)
        .take(ACTIONS_PER_EVENT)
        .map(|pair| Action::new(pair[0], pair[1]))
        .collect()
}

/// An inbound ON/OFF event together with its taught actions.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ConsumedEvent {
    pub state: EventState,
    pub actions: ActionList,
}

impl ConsumedEvent {
    pub fn new(state: EventState, actions: &[Action]) -> Result<Self, Error> {
        Ok(Self {
            state,
            actions: Vec::from_slice(actions).map_err(|()| Error::QueueFull)?,
        })
    }
}

/// What one action does to its LED.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LedCommand {
    On,
    Off,
    Flash,
    AntiFlash,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Effect {
    Led(u8, LedCommand),
    StartSod,
    Nothing,
}

/// Resolve one action against an ON (`on == true`) or OFF event.
pub fn resolve(action: Action, on: bool) -> Effect {
    let Action { led, flags } = action;

    if led == 0 {
        return Effect::Nothing;
    }
    if led == ACTION_SPECIALS {
        return if flags.0 == SPECIAL_SOD {
            Effect::StartSod
        } else {
            Effect::Nothing
        };
    }
    if led > ACTION_SPECIALS {
        return Effect::Nothing;
    }

    let enabled = if on { flags.enable_on() } else { flags.enable_off() };
    if !enabled {
        return Effect::Nothing;
    }

    let polarity = on != flags.invert_event();
    let command = match (polarity, flags.flash(), flags.invert_flash()) {
        (true, true, false) => LedCommand::Flash,
        (true, true, true) => LedCommand::AntiFlash,
        (true, false, _) => LedCommand::On,
        (false, _, _) => LedCommand::Off,
    };
    Effect::Led(led, command)
}

/// Carry out every action of `event` on the LED map.
///
/// Returns `true` when one of the actions asked for a start-of-day
/// response; starting it is left to the caller.
pub fn apply<W: SegmentWriter>(event: &ConsumedEvent, leds: &mut LedMap<W>) -> Result<bool, Error> {
    let on = match event.state {
        EventState::On => true,
        EventState::Off => false,
        EventState::Unknown => return Ok(false),
    };

    let mut sod_requested = false;
    for &action in event.actions.iter() {
        match resolve(action, on) {
            Effect::Led(led, command) => {
                #[cfg(feature = "defmt")]
                defmt::debug!("LED{} -> {}", led, command);
                match command {
                    LedCommand::On => leds.set_on(led)?,
                    LedCommand::Off => leds.set_off(led)?,
                    LedCommand::Flash => leds.flash(led)?,
                    LedCommand::AntiFlash => leds.anti_flash(led)?,
                }
            }
            Effect::StartSod => sod_requested = true,
            Effect::Nothing => {}
        }
    }
    Ok(sod_requested)
}

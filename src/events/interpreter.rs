//! Transition interpreter.
//!
//! Turns one committed (debounced) line-level change into the button's new
//! logical state, stores it, and produces at most one event.
//!
//! | flags              | new logical state          |
//! |--------------------|----------------------------|
//! | `TOGGLE`           | previous state inverted    |
//! | `POLARITY`         | committed line level       |
//! | neither            | committed line level, inverted |
//!
//! Toggle buttons flip on every debounced edge, press and release alike.

use super::state::LogicalStateStore;
use super::{EventSink, EventState, Happening, ProducedEvent};
use crate::matrix::ButtonId;
use crate::nv::{ButtonFlags, FlagsProvider};

/// Logical state after a committed transition to `level`.
pub fn next_logical_state(flags: ButtonFlags, current: bool, level: bool) -> bool {
    if flags.toggle() {
        !current
    } else if flags.polarity() {
        level
    } else {
        !level
    }
}

/// Which event, if any, announces logical state `on`.
pub fn gated_event_state(flags: ButtonFlags, on: bool) -> Option<EventState> {
    match on {
        true if flags.send_on() => Some(EventState::On),
        false if flags.send_off() => Some(EventState::Off),
        _ => None,
    }
}

/// Handle one committed transition of `button` to line level `level`.
///
/// The state store is updated even when the event is suppressed by the
/// button's send flags. Returns the new logical state.
pub fn on_committed<F, S>(
    button: ButtonId,
    level: bool,
    config: &F,
    store: &mut LogicalStateStore,
    sink: &mut S,
) -> bool
where
    F: FlagsProvider + ?Sized,
    S: EventSink + ?Sized,
{
    let flags = config.flags_for(button);
    let logical = next_logical_state(flags, store.get(button), level);
    store.set(button, logical);

    #[cfg(feature = "defmt")]
    defmt::debug!(
        "PB{}: level={} logical={} flags={=u8:#x}",
        button.index(),
        level,
        logical,
        flags.0
    );

    match gated_event_state(flags, logical) {
        Some(state) => sink.emit(ProducedEvent {
            happening: Happening::for_button(button),
            state,
        }),
        None => {
            #[cfg(feature = "defmt")]
            defmt::trace!("PB{}: event suppressed by flags", button.index());
        }
    }

    logical
}

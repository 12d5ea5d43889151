//! Scan driver.
//!
//! One call to [`ButtonScanner::scan`] is one pass over the matrix: every
//! column is strobed once in order `0..COLUMNS`, every row of that column
//! is fed to the debouncer in order `0..ROWS`, and each completed transition
//! goes straight to the transition interpreter. Events from one pass are
//! therefore emitted in column-major, row-minor order.
//!
//! The pass never waits. Settling is spread across calls by the debounce
//! counters, so the caller just invokes `scan` every `SCAN_PERIOD_MS`.

use super::debounce::Debouncer;
use super::{ButtonId, ColumnSampler};
use crate::config::COLUMNS;
use crate::error::Error;
use crate::events::interpreter;
use crate::events::state::LogicalStateStore;
use crate::events::{EventSink, EventState};
use crate::nv::FlagsProvider;

pub struct ButtonScanner<S> {
    sampler: S,
    debouncer: Debouncer,
    states: LogicalStateStore,
}

impl<S: ColumnSampler> ButtonScanner<S> {
    pub fn new(sampler: S) -> Self {
        Self {
            sampler,
            debouncer: Debouncer::new(),
            states: LogicalStateStore::new(),
        }
    }

    /// Configure the lines and run the silent seeding pass: the current
    /// electrical state becomes the accepted state, no events are produced.
    pub fn init(&mut self) -> Result<(), Error> {
        self.sampler.configure()?;
        for column in 0..COLUMNS {
            let levels = self.sampler.sample_column(column)?;
            for (row, &level) in levels.iter().enumerate() {
                self.debouncer.seed(ButtonId::at(column, row), level);
            }
        }

        #[cfg(feature = "defmt")]
        defmt::info!("Button matrix seeded ({} buttons)", crate::config::NUM_BUTTONS);
        Ok(())
    }

    /// One full scan pass.
    pub fn scan<F, K>(&mut self, config: &F, sink: &mut K) -> Result<(), Error>
    where
        F: FlagsProvider + ?Sized,
        K: EventSink + ?Sized,
    {
        for column in 0..COLUMNS {
            let levels = self.sampler.sample_column(column)?;
            for (row, &raw) in levels.iter().enumerate() {
                let button = ButtonId::at(column, row);
                if let Some(level) = self.debouncer.advance(button, raw) {
                    interpreter::on_committed(button, level, config, &mut self.states, sink);
                }
            }
        }
        Ok(())
    }

    /// Current logical state by button number (`Unknown` when out of range).
    pub fn logical_state(&self, button: u8) -> EventState {
        self.states.event_state(button)
    }

    pub fn states(&self) -> &LogicalStateStore {
        &self.states
    }

    pub fn debouncer(&self) -> &Debouncer {
        &self.debouncer
    }

    pub fn sampler_mut(&mut self) -> &mut S {
        &mut self.sampler
    }
}

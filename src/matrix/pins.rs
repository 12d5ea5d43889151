//! Electrical sampling layer over `embedded-hal` GPIO.
//!
//! Strobes are active-low push-pull outputs, senses are inputs with
//! pull-ups. With no contact closed every row reads high.

use embedded_hal::digital::{InputPin, OutputPin};

use super::{ColumnSampler, RowLevels};
use crate::config::{COLUMNS, ROWS};
use crate::error::Error;

/// Strobe and sense lines of the button matrix.
pub struct PinMatrix<C, R> {
    strobes: [C; COLUMNS],
    senses: [R; ROWS],
}

impl<C: OutputPin, R: InputPin> PinMatrix<C, R> {
    pub fn new(strobes: [C; COLUMNS], senses: [R; ROWS]) -> Self {
        Self { strobes, senses }
    }

    /// Drive every strobe line inactive (high).
    fn release_all(&mut self) -> Result<(), Error> {
        for strobe in self.strobes.iter_mut() {
            strobe.set_high().map_err(|_| Error::Pin)?;
        }
        Ok(())
    }

    fn read_rows(&mut self) -> Result<RowLevels, Error> {
        let mut levels = [true; ROWS];
        for (level, sense) in levels.iter_mut().zip(self.senses.iter_mut()) {
            *level = sense.is_high().map_err(|_| Error::Pin)?;
        }
        Ok(levels)
    }
}

impl<C: OutputPin, R: InputPin> ColumnSampler for PinMatrix<C, R> {
    fn configure(&mut self) -> Result<(), Error> {
        self.release_all()
    }

    fn sample_column(&mut self, column: usize) -> Result<RowLevels, Error> {
        self.strobes[column].set_low().map_err(|_| Error::Pin)?;
        let levels = self.read_rows();
        // Release even when the read failed.
        self.release_all()?;
        levels
    }
}

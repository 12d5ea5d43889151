//! Button matrix subsystem - strobing, sampling and debouncing.
//!
//! The panel wires up to 64 buttons/switches as an 8×8 matrix:
//!
//! - **Strobe outputs** (columns) are driven low one at a time.
//! - **Sense inputs** (rows) are read while a column is strobed; a closed
//!   contact pulls the row low.
//!
//! ## Components
//!
//! - [`pins`] - the electrical sampling layer over `embedded-hal` pins
//! - [`debounce`] - per-button counters and accepted levels
//! - [`scanner`] - the scan driver tying sampling, debounce and the
//!   transition interpreter together

pub mod debounce;
pub mod pins;
pub mod scanner;


use crate::config::{NUM_BUTTONS, ROWS};
use crate::error::Error;

/// Raw row levels read for one strobed column (`true` = line high).
pub type RowLevels = [bool; ROWS];

/// Identity of one button: `0..NUM_BUTTONS`, column-major.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ButtonId(u8);

impl ButtonId {
    /// Checked constructor.
    pub fn new(id: u8) -> Result<Self, Error> {
        if (id as usize) < NUM_BUTTONS {
            Ok(Self(id))
        } else {
            Err(Error::InvalidButton(id))
        }
    }

    /// Button at a matrix intersection. Callers iterate `0..COLUMNS` /
    /// `0..ROWS`, so the result is always in range.
    pub const fn at(column: usize, row: usize) -> Self {
        Self((column * ROWS + row) as u8)
    }

    /// `index` must be below `NUM_BUTTONS`.
    pub(crate) const fn from_index(index: usize) -> Self {
        Self(index as u8)
    }

    pub const fn index(self) -> usize {
        self.0 as usize
    }

    pub const fn column(self) -> usize {
        self.0 as usize / ROWS
    }

    pub const fn row(self) -> usize {
        self.0 as usize % ROWS
    }

    /// Iterate every button in scan order.
    pub fn all() -> impl Iterator<Item = ButtonId> {
        (0..NUM_BUTTONS as u8).map(ButtonId)
    }
}

impl From<ButtonId> for u8 {
    fn from(id: ButtonId) -> u8 {
        id.0
    }
}

/// Electrical sampling layer contract.
///
/// Implementations must leave every strobe line inactive when
/// `sample_column` returns, since the lines are shared with other users of
/// the bus.
pub trait ColumnSampler {
    /// Set strobe lines to outputs (all inactive) and sense lines to inputs.
    fn configure(&mut self) -> Result<(), Error>;

    /// Strobe `column`, read all rows, release the strobe.
    fn sample_column(&mut self, column: usize) -> Result<RowLevels, Error>;
}

//! Shared peripheral bus.
//!
//! The matrix strobe lines and the display chip share physical I/O, so
//! neither may be touched while the other is mid-transaction. Both go
//! through one [`SharedBus`] and every access is a scoped acquisition:
//! lock, strobe+sample (or write a display register), release.
//!
//! On target the bus is instantiated with `CriticalSectionRawMutex`, which
//! masks interrupts for the duration of the closure. Host tests use
//! `NoopRawMutex`.

use core::cell::RefCell;

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::blocking_mutex::Mutex;

use crate::error::Error;
use crate::leds::{Plane, SegmentWriter};
use crate::matrix::{ColumnSampler, RowLevels};

/// Exclusive-access wrapper around the peripherals that share I/O lines.
pub struct SharedBus<M: RawMutex, T> {
    inner: Mutex<M, RefCell<T>>,
}

impl<M: RawMutex, T> SharedBus<M, T> {
    pub const fn new(peripherals: T) -> Self {
        Self {
            inner: Mutex::new(RefCell::new(peripherals)),
        }
    }

    /// Run `f` with exclusive access to the bus.
    ///
    /// Must not be re-entered from inside `f`.
    pub fn lock<R>(&self, f: impl FnOnce(&mut T) -> R) -> R {
        self.inner.lock(|cell| f(&mut cell.borrow_mut()))
    }
}

/// Each column strobe is its own acquisition, so a display write queued
/// from another context can slot in between columns.
impl<M: RawMutex, T: ColumnSampler> ColumnSampler for &SharedBus<M, T> {
    fn configure(&mut self) -> Result<(), Error> {
        self.lock(|p| p.configure())
    }

    fn sample_column(&mut self, column: usize) -> Result<RowLevels, Error> {
        self.lock(|p| p.sample_column(column))
    }
}

impl<M: RawMutex, T: SegmentWriter> SegmentWriter for &SharedBus<M, T> {
    fn write_digit(&mut self, plane: Plane, digit: u8, segments: u8) -> Result<(), Error> {
        self.lock(|p| p.write_digit(plane, digit, segments))
    }

    fn clear(&mut self) -> Result<(), Error> {
        self.lock(|p| p.clear())
    }

    fn set_intensity(&mut self, level: u8) -> Result<(), Error> {
        self.lock(|p| p.set_intensity(level))
    }

    fn set_test_mode(&mut self, enabled: bool) -> Result<(), Error> {
        self.lock(|p| p.set_test_mode(enabled))
    }
}

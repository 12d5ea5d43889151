//! LED map - 64 individually addressable LEDs on the display chip.
//!
//! The chip drives 8 digits of 8 segments each, and keeps two copies of
//! every digit register ("planes"). With blinking enabled it alternates
//! between the planes, so a segment's state is the pair of plane bits:
//!
//! | P0 | P1 | LED          |
//! |----|----|--------------|
//! | 1  | 1  | on           |
//! | 0  | 0  | off          |
//! | 1  | 0  | flashing     |
//! | 0  | 1  | anti-phase   |
//!
//! The chip is write-only, so [`LedMap`] keeps the authoritative copy of
//! both planes in RAM and pushes the affected digit of each plane after
//! every change.

pub mod max6951;

#[cfg(test)]
mod tests;

use crate::config::{DISPLAY_DIGITS, MAX_BRIGHTNESS, NUM_LEDS};
use crate::error::Error;

/// One of the two blink-phase register planes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Plane {
    P0,
    P1,
}

impl Plane {
    const fn index(self) -> usize {
        match self {
            Plane::P0 => 0,
            Plane::P1 => 1,
        }
    }
}

/// Register-level contract of the display chip.
pub trait SegmentWriter {
    /// Write the segment bits of one digit in one plane.
    fn write_digit(&mut self, plane: Plane, digit: u8, segments: u8) -> Result<(), Error>;

    /// Blank every digit in both planes.
    fn clear(&mut self) -> Result<(), Error>;

    /// Display intensity, `0..=MAX_BRIGHTNESS`.
    fn set_intensity(&mut self, level: u8) -> Result<(), Error>;

    /// Chip self-test: all segments lit regardless of the digit registers.
    fn set_test_mode(&mut self, enabled: bool) -> Result<(), Error>;
}

/// Digit and segment bit of a 1-based LED number.
fn locate(led: u8) -> Result<(usize, u8), Error> {
    if led == 0 || led as usize > NUM_LEDS {
        return Err(Error::InvalidLed(led));
    }
    let n = led - 1;
    Ok(((n / 8) as usize, 1 << (n % 8)))
}

pub struct LedMap<W> {
    writer: W,
    planes: [[u8; DISPLAY_DIGITS]; 2],
}

impl<W: SegmentWriter> LedMap<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            planes: [[0; DISPLAY_DIGITS]; 2],
        }
    }

    pub fn set_on(&mut self, led: u8) -> Result<(), Error> {
        self.update(led, true, true)
    }

    pub fn set_off(&mut self, led: u8) -> Result<(), Error> {
        self.update(led, false, false)
    }

    /// Blink in phase with the chip's blink clock.
    pub fn flash(&mut self, led: u8) -> Result<(), Error> {
        self.update(led, true, false)
    }

    /// Blink in anti-phase.
    pub fn anti_flash(&mut self, led: u8) -> Result<(), Error> {
        self.update(led, false, true)
    }

    pub fn clear_all(&mut self) -> Result<(), Error> {
        self.planes = [[0; DISPLAY_DIGITS]; 2];
        self.writer.clear()
    }

    /// Whether `led` is lit in `plane`.
    pub fn is_lit(&self, plane: Plane, led: u8) -> Result<bool, Error> {
        let (digit, bit) = locate(led)?;
        Ok(self.planes[plane.index()][digit] & bit != 0)
    }

    /// Raw segment bits of one digit in one plane.
    pub fn digit(&self, plane: Plane, digit: usize) -> u8 {
        self.planes[plane.index()][digit]
    }

    pub fn set_brightness(&mut self, level: u8) -> Result<(), Error> {
        let level = level.min(MAX_BRIGHTNESS);

        #[cfg(feature = "defmt")]
        defmt::info!("LED brightness {}", level);
        self.writer.set_intensity(level)
    }

    /// Show `segments` on `digit` in both planes, leaving the map alone.
    /// The next change or [`LedMap::refresh_digit`] on that digit puts
    /// the mapped state back.
    pub fn show_raw(&mut self, digit: usize, segments: u8) -> Result<(), Error> {
        self.writer.write_digit(Plane::P0, digit as u8, segments)?;
        self.writer.write_digit(Plane::P1, digit as u8, segments)
    }

    /// Push both planes of `digit` from the map to the chip.
    pub fn refresh_digit(&mut self, digit: usize) -> Result<(), Error> {
        self.writer
            .write_digit(Plane::P0, digit as u8, self.planes[0][digit])?;
        self.writer
            .write_digit(Plane::P1, digit as u8, self.planes[1][digit])
    }

    pub fn writer(&self) -> &W {
        &self.writer
    }

    pub fn writer_mut(&mut self) -> &mut W {
        &mut self.writer
    }

    fn update(&mut self, led: u8, p0: bool, p1: bool) -> Result<(), Error> {
        let (digit, bit) = locate(led)?;
        for (plane, lit) in [(Plane::P0, p0), (Plane::P1, p1)] {
            let bits = &mut self.planes[plane.index()][digit];
            if lit {
                *bits |= bit;
            } else {
                *bits &= !bit;
            }
        }

        #[cfg(feature = "defmt")]
        defmt::trace!("LED{}: p0={} p1={}", led, p0, p1);

        self.refresh_digit(digit)
    }
}

/// Walking-segment display test.
///
/// Each step shows the next single segment (in both planes) on its own,
/// cycling through every LED forever. The test writes the chip directly;
/// the LED map is untouched and the affected digit is restored from it
/// when the test moves on or stops. Runs incrementally so the main loop
/// keeps scanning while the test is shown.
#[derive(Default)]
pub struct LedTestCycle {
    /// Last LED shown, 1-based; 0 before the first step.
    current: u8,
}

impl LedTestCycle {
    pub const fn new() -> Self {
        Self { current: 0 }
    }

    /// Advance to the next LED. Returns the LED now shown.
    pub fn step<W: SegmentWriter>(&mut self, leds: &mut LedMap<W>) -> Result<u8, Error> {
        let next = if self.current as usize >= NUM_LEDS {
            1
        } else {
            self.current + 1
        };
        let (digit, bit) = locate(next)?;
        if self.current != 0 {
            let (previous, _) = locate(self.current)?;
            if previous != digit {
                leds.refresh_digit(previous)?;
            }
        }
        leds.show_raw(digit, bit)?;
        self.current = next;
        Ok(next)
    }

    /// End the test and put the mapped LEDs back on the digit it was
    /// showing.
    pub fn stop<W: SegmentWriter>(&mut self, leds: &mut LedMap<W>) -> Result<(), Error> {
        if self.current != 0 {
            let (digit, _) = locate(self.current)?;
            leds.refresh_digit(digit)?;
            self.current = 0;
        }
        Ok(())
    }

    pub fn current(&self) -> u8 {
        self.current
    }
}

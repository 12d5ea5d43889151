//! MAX6951 LED driver over an `embedded-hal` SPI bus.
//!
//! Every register write is a two-byte frame `[register, value]` latched by
//! the rising edge of chip-select, followed by a NOP frame so a later
//! chip-select glitch (the lines are shared) cannot latch stray data.

use embedded_hal::digital::OutputPin;
use embedded_hal::spi::SpiBus;

use super::{Plane, SegmentWriter};
use crate::config::{DISPLAY_DIGITS, MAX_BRIGHTNESS};
use crate::error::Error;

// Registers
pub const REG_NOP: u8 = 0x00;
pub const REG_DECODE: u8 = 0x01;
pub const REG_INTENSITY: u8 = 0x02;
pub const REG_SCAN_LIMIT: u8 = 0x03;
pub const REG_CONFIG: u8 = 0x04;
pub const REG_TEST: u8 = 0x07;
pub const REG_DIGIT_P0: u8 = 0x20;
pub const REG_DIGIT_P1: u8 = 0x40;
pub const REG_DIGIT_BOTH: u8 = 0x60;

// Configuration register bits
pub const CONFIG_ENABLE: u8 = 0x01;
pub const CONFIG_FAST_BLINK: u8 = 0x04;
pub const CONFIG_BLINK: u8 = 0x08;
pub const CONFIG_CLEAR: u8 = 0x20;

pub struct Max6951<SPI, CS> {
    spi: SPI,
    cs: CS,
}

impl<SPI: SpiBus, CS: OutputPin> Max6951<SPI, CS> {
    pub fn new(spi: SPI, cs: CS) -> Self {
        Self { spi, cs }
    }

    /// Power-on sequence. Leaves outputs enabled, fast blink on, all
    /// segments dark and no digit decoding.
    pub fn init(&mut self, brightness: u8) -> Result<(), Error> {
        self.cs.set_high().map_err(|_| Error::Display)?;
        self.command(REG_TEST, 0)?;
        self.command(REG_CONFIG, CONFIG_CLEAR)?;
        self.command(REG_SCAN_LIMIT, 0xFF)?;
        self.command(REG_INTENSITY, brightness.min(MAX_BRIGHTNESS))?;
        self.clear()?;
        self.command(REG_CONFIG, CONFIG_FAST_BLINK | CONFIG_BLINK | CONFIG_ENABLE)?;

        #[cfg(feature = "defmt")]
        defmt::info!("MAX6951 initialised");
        Ok(())
    }

    fn frame(&mut self, register: u8, value: u8) -> Result<(), Error> {
        self.cs.set_low().map_err(|_| Error::Display)?;
        let written = self
            .spi
            .write(&[register, value])
            .and_then(|()| self.spi.flush());
        // Latch, even after a failed write.
        self.cs.set_high().map_err(|_| Error::Display)?;
        written.map_err(|_| Error::Display)
    }

    fn command(&mut self, register: u8, value: u8) -> Result<(), Error> {
        self.frame(register, value)?;
        self.frame(REG_NOP, 0)
    }

    pub fn release(self) -> (SPI, CS) {
        (self.spi, self.cs)
    }
}

impl<SPI: SpiBus, CS: OutputPin> SegmentWriter for Max6951<SPI, CS> {
    fn write_digit(&mut self, plane: Plane, digit: u8, segments: u8) -> Result<(), Error> {
        let base = match plane {
            Plane::P0 => REG_DIGIT_P0,
            Plane::P1 => REG_DIGIT_P1,
        };
        self.command(base + (digit & 0x07), segments)
    }

    fn clear(&mut self) -> Result<(), Error> {
        self.command(REG_DECODE, 0)?;
        for digit in 0..DISPLAY_DIGITS as u8 {
            self.command(REG_DIGIT_BOTH + digit, 0)?;
        }
        Ok(())
    }

    fn set_intensity(&mut self, level: u8) -> Result<(), Error> {
        self.command(REG_INTENSITY, level & 0x0F)
    }

    fn set_test_mode(&mut self, enabled: bool) -> Result<(), Error> {
        self.command(REG_TEST, enabled as u8)
    }
}

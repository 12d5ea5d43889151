//! Unit tests for the LED map and the MAX6951 register writer.

use std::cell::RefCell;
use std::rc::Rc;

use embedded_hal::digital::{ErrorType as PinErrorType, OutputPin};
use embedded_hal::spi::{ErrorKind, ErrorType as SpiErrorType, SpiBus};

use super::max6951::*;
use super::{LedMap, LedTestCycle, Plane, SegmentWriter};
use crate::error::Error;

/// Records every register-level call.
#[derive(Default)]
struct RecordingWriter {
    digits: Vec<(Plane, u8, u8)>,
    clears: usize,
    intensity: Option<u8>,
    test_mode: Option<bool>,
}

impl SegmentWriter for RecordingWriter {
    fn write_digit(&mut self, plane: Plane, digit: u8, segments: u8) -> Result<(), Error> {
        self.digits.push((plane, digit, segments));
        Ok(())
    }

    fn clear(&mut self) -> Result<(), Error> {
        self.clears += 1;
        Ok(())
    }

    fn set_intensity(&mut self, level: u8) -> Result<(), Error> {
        self.intensity = Some(level);
        Ok(())
    }

    fn set_test_mode(&mut self, enabled: bool) -> Result<(), Error> {
        self.test_mode = Some(enabled);
        Ok(())
    }
}

#[derive(Debug)]
struct BusFault;

impl embedded_hal::spi::Error for BusFault {
    fn kind(&self) -> ErrorKind {
        ErrorKind::Other
    }
}

/// Frames as seen by the chip: bytes clocked between chip-select edges.
type Frames = Rc<RefCell<Vec<Vec<u8>>>>;

struct FakeSpi {
    frames: Frames,
    fail: bool,
}

impl SpiErrorType for FakeSpi {
    type Error = BusFault;
}

impl SpiBus for FakeSpi {
    fn read(&mut self, words: &mut [u8]) -> Result<(), BusFault> {
        words.fill(0);
        Ok(())
    }

    fn write(&mut self, words: &[u8]) -> Result<(), BusFault> {
        if self.fail {
            return Err(BusFault);
        }
        if let Some(frame) = self.frames.borrow_mut().last_mut() {
            frame.extend_from_slice(words);
        }
        Ok(())
    }

    fn transfer(&mut self, read: &mut [u8], write: &[u8]) -> Result<(), BusFault> {
        read.fill(0);
        self.write(write)
    }

    fn transfer_in_place(&mut self, words: &mut [u8]) -> Result<(), BusFault> {
        self.write(words)?;
        words.fill(0);
        Ok(())
    }

    fn flush(&mut self) -> Result<(), BusFault> {
        Ok(())
    }
}

/// Chip-select: each falling edge starts a new frame.
struct FakeCs {
    frames: Frames,
    low: bool,
}

impl PinErrorType for FakeCs {
    type Error = core::convert::Infallible;
}

impl OutputPin for FakeCs {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        if !self.low {
            self.frames.borrow_mut().push(Vec::new());
        }
        self.low = true;
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.low = false;
        Ok(())
    }
}

fn chip(fail: bool) -> (Frames, Max6951<FakeSpi, FakeCs>) {
    let frames = Frames::default();
    let spi = FakeSpi {
        frames: frames.clone(),
        fail,
    };
    let cs = FakeCs {
        frames: frames.clone(),
        low: false,
    };
    (frames, Max6951::new(spi, cs))
}

/// Register writes with the NOP trailers filtered out.
fn commands(frames: &Frames) -> Vec<[u8; 2]> {
    frames
        .borrow()
        .iter()
        .filter(|f| f[0] != REG_NOP)
        .map(|f| [f[0], f[1]])
        .collect()
}

// ═══════════════════════════════════════════════════════════════════════════
// LedMap
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn set_on_lights_both_planes() {
    let mut leds = LedMap::new(RecordingWriter::default());
    leds.set_on(1).unwrap();

    assert!(leds.is_lit(Plane::P0, 1).unwrap());
    assert!(leds.is_lit(Plane::P1, 1).unwrap());
    assert_eq!(
        leds.writer().digits,
        vec![(Plane::P0, 0, 0x01), (Plane::P1, 0, 0x01)]
    );
}

#[test]
fn led_numbering_maps_to_digit_and_segment_bit() {
    let mut leds = LedMap::new(RecordingWriter::default());
    // LED 12 -> digit 1, bit 3
    leds.set_on(12).unwrap();
    assert_eq!(leds.digit(Plane::P0, 1), 0x08);
    // LED 64 -> digit 7, bit 7
    leds.set_on(64).unwrap();
    assert_eq!(leds.digit(Plane::P1, 7), 0x80);
}

#[test]
fn leds_in_same_digit_accumulate() {
    let mut leds = LedMap::new(RecordingWriter::default());
    leds.set_on(1).unwrap();
    leds.set_on(2).unwrap();
    leds.set_on(3).unwrap();
    assert_eq!(leds.digit(Plane::P0, 0), 0x07);

    leds.set_off(2).unwrap();
    assert_eq!(leds.digit(Plane::P0, 0), 0x05);
    assert_eq!(leds.digit(Plane::P1, 0), 0x05);
    assert_eq!(leds.writer().digits.last(), Some(&(Plane::P1, 0, 0x05)));
}

#[test]
fn flash_sets_plane_zero_only() {
    let mut leds = LedMap::new(RecordingWriter::default());
    leds.flash(9).unwrap();
    assert!(leds.is_lit(Plane::P0, 9).unwrap());
    assert!(!leds.is_lit(Plane::P1, 9).unwrap());
}

#[test]
fn anti_flash_sets_plane_one_only() {
    let mut leds = LedMap::new(RecordingWriter::default());
    leds.set_on(9).unwrap();
    leds.anti_flash(9).unwrap();
    assert!(!leds.is_lit(Plane::P0, 9).unwrap());
    assert!(leds.is_lit(Plane::P1, 9).unwrap());
}

#[test]
fn invalid_led_numbers_rejected() {
    let mut leds = LedMap::new(RecordingWriter::default());
    assert_eq!(leds.set_on(0), Err(Error::InvalidLed(0)));
    assert_eq!(leds.flash(65), Err(Error::InvalidLed(65)));
    assert_eq!(leds.is_lit(Plane::P0, 200), Err(Error::InvalidLed(200)));
    assert!(leds.writer().digits.is_empty());
}

#[test]
fn clear_all_resets_map_and_chip() {
    let mut leds = LedMap::new(RecordingWriter::default());
    leds.set_on(5).unwrap();
    leds.flash(40).unwrap();
    leds.clear_all().unwrap();

    assert_eq!(leds.writer().clears, 1);
    for led in 1..=64 {
        assert!(!leds.is_lit(Plane::P0, led).unwrap());
        assert!(!leds.is_lit(Plane::P1, led).unwrap());
    }
}

#[test]
fn brightness_is_clamped() {
    let mut leds = LedMap::new(RecordingWriter::default());
    leds.set_brightness(40).unwrap();
    assert_eq!(leds.writer().intensity, Some(15));
    leds.set_brightness(3).unwrap();
    assert_eq!(leds.writer().intensity, Some(3));
}

#[test]
fn new_map_does_not_touch_chip() {
    let leds = LedMap::new(RecordingWriter::default());
    assert!(leds.writer().digits.is_empty());
    assert_eq!(leds.writer().clears, 0);
    assert_eq!(leds.writer().intensity, None);
    assert_eq!(leds.writer().test_mode, None);
}

#[test]
fn test_cycle_walks_every_led_and_wraps() {
    let mut leds = LedMap::new(RecordingWriter::default());
    let mut test = LedTestCycle::new();

    assert_eq!(test.step(&mut leds).unwrap(), 1);
    assert_eq!(
        leds.writer().digits,
        vec![(Plane::P0, 0, 0x01), (Plane::P1, 0, 0x01)]
    );
    leds.writer_mut().digits.clear();

    // Same digit: no restore, just the next segment.
    assert_eq!(test.step(&mut leds).unwrap(), 2);
    assert_eq!(
        leds.writer().digits,
        vec![(Plane::P0, 0, 0x02), (Plane::P1, 0, 0x02)]
    );

    for _ in 2..8 {
        test.step(&mut leds).unwrap();
    }
    leds.writer_mut().digits.clear();

    // Crossing into digit 1 restores digit 0 from the map first.
    assert_eq!(test.step(&mut leds).unwrap(), 9);
    assert_eq!(
        leds.writer().digits,
        vec![
            (Plane::P0, 0, 0),
            (Plane::P1, 0, 0),
            (Plane::P0, 1, 0x01),
            (Plane::P1, 1, 0x01),
        ]
    );

    for _ in 9..64 {
        test.step(&mut leds).unwrap();
    }
    assert_eq!(test.current(), 64);
    assert_eq!(test.step(&mut leds).unwrap(), 1);

    leds.writer_mut().digits.clear();
    test.stop(&mut leds).unwrap();
    assert_eq!(leds.writer().digits, vec![(Plane::P0, 0, 0), (Plane::P1, 0, 0)]);
    assert_eq!(test.current(), 0);
}

#[test]
fn test_cycle_leaves_led_map_intact() {
    let mut leds = LedMap::new(RecordingWriter::default());
    leds.set_on(2).unwrap();
    leds.flash(3).unwrap();

    let mut test = LedTestCycle::new();
    for _ in 0..3 {
        test.step(&mut leds).unwrap();
    }
    assert!(leds.is_lit(Plane::P0, 2).unwrap());
    assert!(leds.is_lit(Plane::P0, 3).unwrap());

    leds.writer_mut().digits.clear();
    test.stop(&mut leds).unwrap();

    assert!(leds.is_lit(Plane::P0, 2).unwrap());
    assert!(leds.is_lit(Plane::P1, 2).unwrap());
    assert!(leds.is_lit(Plane::P0, 3).unwrap());
    assert!(!leds.is_lit(Plane::P1, 3).unwrap());
    // Chip shows the mapped digit again.
    assert_eq!(
        leds.writer().digits,
        vec![(Plane::P0, 0, 0x06), (Plane::P1, 0, 0x02)]
    );
}

// ═══════════════════════════════════════════════════════════════════════════
// MAX6951
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn every_command_is_followed_by_nop() {
    let (frames, mut chip) = chip(false);
    chip.set_intensity(7).unwrap();
    assert_eq!(
        *frames.borrow(),
        vec![vec![REG_INTENSITY, 7], vec![REG_NOP, 0]]
    );
}

#[test]
fn chip_select_released_after_each_frame() {
    let (_frames, mut chip) = chip(false);
    chip.write_digit(Plane::P0, 0, 0xFF).unwrap();
    let (_spi, cs) = chip.release();
    assert!(!cs.low);
}

#[test]
fn digit_writes_target_plane_registers() {
    let (frames, mut chip) = chip(false);
    chip.write_digit(Plane::P0, 3, 0xA5).unwrap();
    chip.write_digit(Plane::P1, 7, 0x01).unwrap();
    assert_eq!(
        commands(&frames),
        vec![[REG_DIGIT_P0 + 3, 0xA5], [REG_DIGIT_P1 + 7, 0x01]]
    );
}

#[test]
fn init_sequence() {
    let (frames, mut chip) = chip(false);
    chip.init(9).unwrap();
    let cmds = commands(&frames);

    assert_eq!(cmds[0], [REG_TEST, 0]);
    assert_eq!(cmds[1], [REG_CONFIG, CONFIG_CLEAR]);
    assert_eq!(cmds[2], [REG_SCAN_LIMIT, 0xFF]);
    assert_eq!(cmds[3], [REG_INTENSITY, 9]);
    assert_eq!(cmds[4], [REG_DECODE, 0]);
    for digit in 0..8u8 {
        assert_eq!(cmds[5 + digit as usize], [REG_DIGIT_BOTH + digit, 0]);
    }
    assert_eq!(
        cmds.last(),
        Some(&[REG_CONFIG, CONFIG_FAST_BLINK | CONFIG_BLINK | CONFIG_ENABLE])
    );
}

#[test]
fn spi_failure_maps_to_display_error() {
    let (_frames, mut chip) = chip(true);
    assert_eq!(chip.set_test_mode(true), Err(Error::Display));
    let (_spi, cs) = chip.release();
    assert!(!cs.low);
}

#[test]
fn led_map_drives_chip_registers() {
    let (frames, chip) = chip(false);
    let mut leds = LedMap::new(chip);
    leds.flash(10).unwrap();
    assert_eq!(
        commands(&frames),
        vec![[REG_DIGIT_P0 + 1, 0x02], [REG_DIGIT_P1 + 1, 0x00]]
    );
}

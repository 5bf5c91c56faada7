// SPDX-License-Identifier: Apache-2.0

//! Display buffer shared between the sampling and display interrupts, and the digit scan cursor.
//!
//! The buffer is deliberately lock-free: the sampling task stores all four digits once per tick
//! and the display task loads one digit per tick, each through a relaxed single-byte atomic. A
//! load racing a store can show one digit from the previous reading for one scan slot, which is
//! invisible at the refresh rate. Neither side ever waits on the other.

use core::sync::atomic::{AtomicU8, Ordering};

use crate::config::{ADC_MAX, DIGIT_COUNT, FULL_SCALE_MV};

/// Decimal digits of the latest reading, index 0 is the least significant
pub struct DisplayBuffer {
    /// One atomic per digit
    digits: [AtomicU8; DIGIT_COUNT],
}

impl DisplayBuffer {
    /// Buffer showing "1111" until the first reading lands
    pub const fn new() -> Self {
        Self {
            digits: [
                AtomicU8::new(1),
                AtomicU8::new(1),
                AtomicU8::new(1),
                AtomicU8::new(1),
            ],
        }
    }

    /// Store all digits, least significant first
    pub fn store(&self, digits: [u8; DIGIT_COUNT]) {
        for (slot, digit) in self.digits.iter().zip(digits) {
            slot.store(digit, Ordering::Relaxed);
        }
    }

    /// Load the digit at `index`. Out-of-range indices read as 0.
    pub fn load(&self, index: usize) -> u8 {
        self.digits
            .get(index)
            .map_or(0, |slot| slot.load(Ordering::Relaxed))
    }

    /// Copy of every digit
    pub fn snapshot(&self) -> [u8; DIGIT_COUNT] {
        core::array::from_fn(|i| self.load(i))
    }
}

impl Default for DisplayBuffer {
    fn default() -> Self {
        Self::new()
    }
}

/// Scan position of the display multiplexer, always within `0..DIGIT_COUNT`
#[derive(Default, Debug, Copy, Clone, PartialEq, Eq)]
pub struct DigitCursor(u8);

impl DigitCursor {
    /// Cursor at the leftmost digit
    pub const fn new() -> Self {
        Self(0)
    }

    /// Physical digit position currently selected
    pub fn position(&self) -> u8 {
        self.0
    }

    /// Move to the next position, wrapping after the last digit
    pub fn advance(&mut self) {
        self.0 = if self.0 as usize == DIGIT_COUNT - 1 {
            0
        } else {
            self.0 + 1
        };
    }
}

/// Convert a raw ADC reading to millivolts (truncating)
pub fn to_millivolts(raw: u16) -> u16 {
    (raw as u32 * FULL_SCALE_MV / ADC_MAX as u32) as u16
}

/// Split a value into its ones, tens, hundreds and thousands digits. Anything above 9999 keeps
/// only its four lowest digits.
pub fn decompose(value: u16) -> [u8; DIGIT_COUNT] {
    [
        (value % 10) as u8,
        (value % 100 / 10) as u8,
        (value % 1000 / 100) as u8,
        (value % 10000 / 1000) as u8,
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn power_on_shows_ones() {
        assert_eq!(DisplayBuffer::new().snapshot(), [1, 1, 1, 1]);
    }

    #[test]
    fn store_and_load() {
        let buffer = DisplayBuffer::new();
        buffer.store([0, 5, 6, 1]);
        assert_eq!(buffer.load(0), 0);
        assert_eq!(buffer.load(3), 1);
        assert_eq!(buffer.load(4), 0);
        assert_eq!(buffer.snapshot(), [0, 5, 6, 1]);
    }

    #[test]
    fn millivolts_stay_in_range_and_never_decrease() {
        let mut last = 0;
        for raw in 0..=ADC_MAX {
            let mv = to_millivolts(raw);
            assert!(mv as u32 <= FULL_SCALE_MV);
            assert!(mv >= last);
            last = mv;
        }
        assert_eq!(to_millivolts(0), 0);
        assert_eq!(to_millivolts(ADC_MAX), FULL_SCALE_MV as u16);
    }

    #[cfg(not(feature = "resolution_16bit"))]
    #[test]
    fn midscale_reads_1650_millivolts() {
        let mv = to_millivolts(2048);
        assert_eq!(mv, 1650);
        assert_eq!(decompose(mv), [0, 5, 6, 1]);
    }

    #[test]
    fn decompose_round_trips() {
        for value in 0..=9999u16 {
            let d = decompose(value);
            assert!(d.iter().all(|&digit| digit <= 9));
            let rebuilt =
                d[3] as u16 * 1000 + d[2] as u16 * 100 + d[1] as u16 * 10 + d[0] as u16;
            assert_eq!(rebuilt, value);
        }
    }

    #[test]
    fn cursor_cycles_with_period_four() {
        let mut cursor = DigitCursor::new();
        for tick in 0..1000usize {
            assert_eq!(cursor.position() as usize, tick % DIGIT_COUNT);
            cursor.advance();
            assert!((cursor.position() as usize) < DIGIT_COUNT);
        }
    }
}

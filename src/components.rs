// SPDX-License-Identifier: Apache-2.0

//! Analog and display collaborators driven by the interrupt tasks
use embedded_hal::{
    digital::{OutputPin, PinState},
    pwm::SetDutyCycle,
};

use crate::config::{DAC_MAX, DIGIT_COUNT};

/// Source of raw analog samples
pub trait AnalogInput {
    /// Take one reading in `0..=ADC_MAX`. Never fails; a bad conversion repeats an old value.
    fn read_sample(&mut self) -> u16;
}

/// Sink for analog output codes
pub trait AnalogOutput {
    /// Output `code` in `0..=DAC_MAX`
    fn write_sample(&mut self, code: u16);
}

/// Drives one scan slot of a multiplexed numeric display
pub trait DigitRenderer {
    /// Pin error
    type Error;

    /// Light `value` at `position`, leaving every other position dark
    fn render_digit(
        &mut self,
        value: u8,
        position: u8,
        decimal_point: bool,
        blank_if_zero: bool,
    ) -> Result<(), Self::Error>;
}

/// Analog output through a PWM channel whose counter wraps every `DAC_MAX + 1` ticks, smoothed
/// by an external RC filter
pub struct PwmDac<P> {
    /// PWM channel
    channel: P,
}

impl<P: SetDutyCycle> PwmDac<P> {
    /// Wrap a channel. Its slice's top must already be [`DAC_MAX`].
    pub fn new(channel: P) -> Self {
        Self { channel }
    }
}

impl<P: SetDutyCycle> AnalogOutput for PwmDac<P> {
    fn write_sample(&mut self, code: u16) {
        if self.channel.set_duty_cycle(code.min(DAC_MAX)).is_err() {
            warn!("PWM rejected output code {}", code);
        }
    }
}

/// Segment bit patterns for 0..=9, bit 0 is segment a through bit 6 for segment g
const DIGIT_SEGMENTS: [u8; 10] = [
    0b011_1111, // 0
    0b000_0110, // 1
    0b101_1011, // 2
    0b100_1111, // 3
    0b110_0110, // 4
    0b110_1101, // 5
    0b111_1101, // 6
    0b000_0111, // 7
    0b111_1111, // 8
    0b110_1111, // 9
];
/// Decimal point bit
const DECIMAL_POINT: u8 = 0b1000_0000;

/// How the display is wired
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(target_arch = "arm", derive(defmt::Format))]
pub enum DisplayKind {
    /// Segments light when driven high, a digit is selected by pulling its cathode low
    CommonCathode,
    /// Segments light when driven low, a digit is selected by driving its anode high
    CommonAnode,
}

impl DisplayKind {
    /// Segment pin level that lights the segment
    fn segment_on(self) -> PinState {
        match self {
            DisplayKind::CommonCathode => PinState::High,
            DisplayKind::CommonAnode => PinState::Low,
        }
    }

    /// Digit-select pin level that enables the digit
    fn digit_on(self) -> PinState {
        !self.segment_on()
    }
}

/// Directly driven, multiplexed 4-digit seven-segment display
pub struct SevenSegment<P> {
    /// Segments a, b, c, d, e, f, g, dp
    segments: [P; 8],
    /// Digit selects, leftmost first
    digits: [P; DIGIT_COUNT],
    /// Pin polarity
    kind: DisplayKind,
}

impl<P: OutputPin> SevenSegment<P> {
    /// Display on the given pins. Nothing is lit until the first [`DigitRenderer::render_digit`].
    pub fn new(segments: [P; 8], digits: [P; DIGIT_COUNT], kind: DisplayKind) -> Self {
        Self {
            segments,
            digits,
            kind,
        }
    }

    /// Return the pins
    pub fn release(self) -> ([P; 8], [P; DIGIT_COUNT]) {
        (self.segments, self.digits)
    }
}

impl<P: OutputPin> DigitRenderer for SevenSegment<P> {
    type Error = P::Error;

    fn render_digit(
        &mut self,
        value: u8,
        position: u8,
        decimal_point: bool,
        blank_if_zero: bool,
    ) -> Result<(), Self::Error> {
        // Blank every digit first so the new pattern never shows at the old position
        for digit in self.digits.iter_mut() {
            digit.set_state(!self.kind.digit_on())?;
        }

        let mut pattern = if blank_if_zero && value == 0 {
            0
        } else {
            DIGIT_SEGMENTS.get(value as usize).copied().unwrap_or(0)
        };
        if decimal_point {
            pattern |= DECIMAL_POINT;
        }
        let on = self.kind.segment_on();
        for (bit, segment) in self.segments.iter_mut().enumerate() {
            segment.set_state(if pattern & (1 << bit) != 0 { on } else { !on })?;
        }

        if let Some(digit) = self.digits.get_mut(position as usize) {
            digit.set_state(self.kind.digit_on())?;
        }
        Ok(())
    }
}

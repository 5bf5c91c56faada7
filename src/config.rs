// SPDX-License-Identifier: Apache-2.0

//! Compile-time configuration: clocks, rates, ranges and pin assignments.

/// External high-speed crystal on the pico board is 12 MHz
pub const XOSC_FREQ_HZ: u32 = 12_000_000;
/// System clock. Low enough that the sampling counter's period fits in 8 bits.
pub const SYS_CLOCK_FREQ_HZ: u32 = 48_000_000;

/// Rate of the sampling task
pub const SAMPLE_RATE_HZ: u32 = 1_000;
/// Corner frequency of the low-pass filter
pub const CUTOFF_HZ: u32 = 100;
/// Clock divider for the sampling counter: 48 MHz / 192 / 250 = 1 kHz
pub const SAMPLING_PRESCALE: u8 = 192;

/// Rate of the display task. One full 4-digit frame every 4 ticks (1 kHz refresh).
pub const DISPLAY_TICK_HZ: u32 = 4_000;
/// Clock divider for the display counter: 48 MHz / 240 / 50 = 4 kHz
pub const DISPLAY_PRESCALE: u8 = 240;

/// Largest raw ADC reading
#[cfg(not(feature = "resolution_16bit"))]
pub const ADC_MAX: u16 = 4095;
/// Largest raw ADC reading
#[cfg(feature = "resolution_16bit")]
pub const ADC_MAX: u16 = 0xFFFF;
/// Number of 12-bit conversions summed into one reading
#[cfg(not(feature = "resolution_16bit"))]
pub const ADC_OVERSAMPLE: u16 = 1;
/// Number of 12-bit conversions summed into one reading
#[cfg(feature = "resolution_16bit")]
pub const ADC_OVERSAMPLE: u16 = 16;

/// Largest analog output code
pub const DAC_MAX: u16 = 1023;

/// ADC full scale in millivolts
pub const FULL_SCALE_MV: u32 = 3300;

/// Number of multiplexed digits on the display
pub const DIGIT_COUNT: usize = 4;


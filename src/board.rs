// SPDX-License-Identifier: Apache-2.0

//! RP2040 bindings for the collaborator traits.
//!
//! | Function           | Peripheral                         |
//! |--------------------|------------------------------------|
//! | Sampling counter   | PWM slice 0, 8-bit period          |
//! | Display counter    | PWM slice 1                        |
//! | Analog output      | PWM slice 2 channel A, GPIO4       |
//! | Analog input       | ADC0, GPIO26                       |
//! | Segments a..g, dp  | GPIO6..GPIO13                      |
//! | Digit selects      | GPIO18..GPIO21                     |
//!
//! Every PWM slice reports its wrap on the shared `PWM_IRQ_WRAP` line, so both counters unmask
//! the same NVIC interrupt and rely on their own slice flag to tell their wraps apart.

use embedded_hal::pwm::SetDutyCycle;
use embedded_hal_0_2::adc::OneShot;
use rp2040_hal::{
    adc::AdcPin,
    clocks::ClocksManager,
    fugit::{HertzU32, RateExtU32},
    gpio::{bank0::Gpio26, DynPinId, FunctionSioInput, FunctionSioOutput, Pin, PullDown, PullNone},
    pac,
    pll::{common_configs::PLL_USB_48MHZ, setup_pll_blocking, PLLConfig},
    pwm::{Channel, FreeRunning, Pwm2, Slice, SliceId, A},
    xosc::setup_xosc_blocking,
    Adc, Watchdog,
};

use crate::{
    components::AnalogInput,
    config::{ADC_OVERSAMPLE, XOSC_FREQ_HZ},
    timer::{CounterWidth, TimerCounter, Waveform},
};

/// 12 MHz · 120 / 6 / 5 = 48 MHz
const PLL_SYS_48MHZ: PLLConfig = PLLConfig {
    vco_freq: HertzU32::MHz(1440),
    refdiv: 1,
    post_div1: 6,
    post_div2: 5,
};

/// PWM channel used as the analog output
pub type DacChannel = Channel<Slice<Pwm2, FreeRunning>, A>;
/// Any push-pull GPIO driving the display
pub type DisplayPin = Pin<DynPinId, FunctionSioOutput, PullDown>;
/// Analog input pin
pub type AnalogPin = AdcPin<Pin<Gpio26, FunctionSioInput, PullNone>>;

/// Bring the system clock up at [`SYS_CLOCK_FREQ_HZ`](crate::config::SYS_CLOCK_FREQ_HZ) from
/// the crystal, with the USB PLL feeding the ADC at 48 MHz.
///
/// Any failure here leaves the chip without a usable clock and panics.
pub fn init_clocks(
    xosc_dev: pac::XOSC,
    clocks_dev: pac::CLOCKS,
    pll_sys_dev: pac::PLL_SYS,
    pll_usb_dev: pac::PLL_USB,
    resets: &mut pac::RESETS,
    watchdog: &mut Watchdog,
) -> ClocksManager {
    let xosc = setup_xosc_blocking(xosc_dev, XOSC_FREQ_HZ.Hz())
        .unwrap_or_else(|_| defmt::panic!("crystal oscillator failed to start"));
    watchdog.enable_tick_generation((XOSC_FREQ_HZ / 1_000_000) as u8);

    let mut clocks = ClocksManager::new(clocks_dev);
    let pll_sys = setup_pll_blocking(
        pll_sys_dev,
        xosc.operating_frequency(),
        PLL_SYS_48MHZ,
        &mut clocks,
        resets,
    )
    .unwrap_or_else(|_| defmt::panic!("system PLL failed to lock"));
    let pll_usb = setup_pll_blocking(
        pll_usb_dev,
        xosc.operating_frequency(),
        PLL_USB_48MHZ,
        &mut clocks,
        resets,
    )
    .unwrap_or_else(|_| defmt::panic!("USB PLL failed to lock"));

    clocks
        .init_default(&xosc, &pll_sys, &pll_usb)
        .unwrap_or_else(|_| defmt::panic!("unable to switch clocks to the PLLs"));
    clocks
}

/// A PWM slice used purely as a periodic interrupt source.
///
/// The slice counter is always 16 bits wide; an 8-bit counter is a period limited to 8 bits,
/// which [`TimerConfig`](crate::timer::TimerConfig) already guarantees. PWM registers are written
/// directly in the system clock domain, so there is never anything to synchronize.
pub struct PwmCounter<I: SliceId> {
    /// Slice registers
    slice: Slice<I, FreeRunning>,
    /// Decides whether the compare register or the period register sets the wrap
    waveform: Waveform,
}

impl<I: SliceId> PwmCounter<I> {
    /// Take over a slice
    pub fn new(slice: Slice<I, FreeRunning>) -> Self {
        Self {
            slice,
            waveform: Waveform::NormalPwm,
        }
    }
}

impl<I: SliceId> TimerCounter for PwmCounter<I> {
    fn enable_clocks(&mut self) {
        // clk_sys feeds every slice once the PWM block is out of reset; start from known registers
        self.slice.default_config();
    }

    fn sync_busy(&self) -> bool {
        false
    }

    fn set_run(&mut self, run: bool) {
        if run {
            self.slice.enable();
        } else {
            self.slice.disable();
        }
    }

    fn write_control(&mut self, _width: CounterWidth, prescale: u8, waveform: Waveform) {
        self.slice.set_div_int(prescale);
        self.slice.set_div_frac(0);
        self.slice.clr_ph_correct();
        self.waveform = waveform;
    }

    fn write_period(&mut self, period: u16) {
        self.slice.set_top(period);
    }

    fn write_compare(&mut self, compare: u16) {
        if self.waveform == Waveform::MatchFrequency {
            self.slice.set_top(compare);
        }
        self.slice
            .channel_a
            .set_duty_cycle(compare)
            .unwrap_or_else(|never| match never {});
    }

    fn enable_interrupt(&mut self) {
        self.slice.enable_interrupt();
    }

    fn unmask_interrupt_line(&mut self) {
        // SAFETY: the handler only touches state behind critical-section mutexes
        unsafe { pac::NVIC::unmask(pac::Interrupt::PWM_IRQ_WRAP) }
    }

    fn interrupt_pending(&self) -> bool {
        self.slice.has_overflown()
    }

    fn clear_interrupt(&mut self) {
        self.slice.clear_interrupt();
    }
}

/// One-shot ADC conversions on GPIO26.
///
/// With `resolution_16bit`, [`ADC_OVERSAMPLE`] 12-bit conversions are summed per sample.
pub struct OneShotAdc {
    /// ADC block
    adc: Adc,
    /// Input pin
    pin: AnalogPin,
    /// Previous reading, repeated if a conversion fails
    last: u16,
}

impl OneShotAdc {
    /// ADC reading `pin`
    pub fn new(adc: Adc, pin: AnalogPin) -> Self {
        Self { adc, pin, last: 0 }
    }
}

impl AnalogInput for OneShotAdc {
    fn read_sample(&mut self) -> u16 {
        let mut sum: u16 = 0;
        for _ in 0..ADC_OVERSAMPLE {
            match nb::block!(OneShot::<Adc, u16, AnalogPin>::read(&mut self.adc, &mut self.pin)) {
                Ok(reading) => sum = sum.saturating_add(reading),
                Err(_) => return self.last,
            }
        }
        self.last = sum;
        sum
    }
}

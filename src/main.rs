//! Samples an analog voltage, low-pass filters it onto an analog output and shows the reading on
//! a multiplexed 4-digit display.
#![cfg_attr(target_arch = "arm", no_std)]
#![cfg_attr(target_arch = "arm", no_main)]
#![doc(html_playground_url = "https://play.rust-lang.org/")]
#![warn(missing_docs)]

#[cfg(target_arch = "arm")]
mod firmware {
    use defmt::{debug, info, warn};
    #[allow(unused_imports)]
    use defmt_rtt as _;
    use filtered_voltmeter::{
        board::{init_clocks, OneShotAdc, PwmCounter},
        components::{DisplayKind, PwmDac, SevenSegment},
        config::{
            DAC_MAX, DISPLAY_PRESCALE, DISPLAY_TICK_HZ, SAMPLE_RATE_HZ, SAMPLING_PRESCALE,
            SYS_CLOCK_FREQ_HZ,
        },
        interrupt::{service_pwm_wrap, DISPLAY, DISPLAY_BUFFER, SAMPLING},
        tasks::{DisplayTask, SamplingTask},
        timer::{CounterWidth, Timer, TimerConfig, Waveform},
        Error,
    };
    #[allow(unused_imports)]
    use panic_probe as _;
    use rp2040_hal::{
        adc::AdcPin,
        entry,
        gpio::Pins,
        pac::{self, interrupt},
        prelude::*,
        pwm::Slices,
        Adc, Sio, Watchdog,
    };

    /// Second-stage bootloader, from [rp2040-boot2](https://docs.rs/rp2040-boot2)
    #[link_section = ".boot2"]
    #[used]
    pub static BOOT2: [u8; 256] = rp2040_boot2::BOOT_LOADER_W25Q080;

    /// Boot, arm both counters, then sleep between interrupts
    #[entry]
    fn main() -> ! {
        info!("Voltmeter startup");
        let mut pac = pac::Peripherals::take().unwrap();
        let mut watchdog = Watchdog::new(pac.WATCHDOG);
        let sio = Sio::new(pac.SIO);

        let clocks = init_clocks(
            pac.XOSC,
            pac.CLOCKS,
            pac.PLL_SYS,
            pac.PLL_USB,
            &mut pac.RESETS,
            &mut watchdog,
        );
        let sys_hz = clocks.system_clock.freq().to_Hz();
        if sys_hz != SYS_CLOCK_FREQ_HZ {
            warn!(
                "System clock is {=u32} Hz instead of {=u32} Hz",
                sys_hz, SYS_CLOCK_FREQ_HZ
            );
        }
        let pins = Pins::new(
            pac.IO_BANK0,
            pac.PADS_BANK0,
            sio.gpio_bank0,
            &mut pac.RESETS,
        );

        // Analog input
        let adc = Adc::new(pac.ADC, &mut pac.RESETS);
        let adc_pin = AdcPin::new(pins.gpio26.into_floating_input()).unwrap();
        let input = OneShotAdc::new(adc, adc_pin);

        // Analog output: PWM at 48 MHz / 1024 ≈ 47 kHz into an RC filter
        let mut pwm_slices = Slices::new(pac.PWM, &mut pac.RESETS);
        pwm_slices.pwm2.set_top(DAC_MAX);
        pwm_slices.pwm2.enable();
        let mut dac = pwm_slices.pwm2.channel_a;
        dac.output_to(pins.gpio4);
        let output = PwmDac::new(dac);

        // Display
        let renderer = SevenSegment::new(
            [
                pins.gpio6.into_push_pull_output().into_dyn_pin(),
                pins.gpio7.into_push_pull_output().into_dyn_pin(),
                pins.gpio8.into_push_pull_output().into_dyn_pin(),
                pins.gpio9.into_push_pull_output().into_dyn_pin(),
                pins.gpio10.into_push_pull_output().into_dyn_pin(),
                pins.gpio11.into_push_pull_output().into_dyn_pin(),
                pins.gpio12.into_push_pull_output().into_dyn_pin(),
                pins.gpio13.into_push_pull_output().into_dyn_pin(),
            ],
            [
                pins.gpio18.into_push_pull_output().into_dyn_pin(),
                pins.gpio19.into_push_pull_output().into_dyn_pin(),
                pins.gpio20.into_push_pull_output().into_dyn_pin(),
                pins.gpio21.into_push_pull_output().into_dyn_pin(),
            ],
            DisplayKind::CommonCathode,
        );

        // Counters are configured but stay stopped until their task is in place
        let sampling_config = TimerConfig::periodic(
            sys_hz,
            SAMPLING_PRESCALE,
            SAMPLE_RATE_HZ,
            CounterWidth::Bits8,
            Waveform::NormalPwm,
        )
        .unwrap_or_else(|err| defmt::panic!("Sampling counter: {}", err));
        let mut sampling_timer = Timer::new(PwmCounter::new(pwm_slices.pwm0));
        sampling_timer
            .bring_up(&sampling_config)
            .unwrap_or_else(|err| defmt::panic!("Sampling counter: {}", err));
        debug!(
            "Sampling at {=u32} Hz",
            sampling_config.rate_hz(sys_hz)
        );

        let display_config = TimerConfig::periodic(
            sys_hz,
            DISPLAY_PRESCALE,
            DISPLAY_TICK_HZ,
            CounterWidth::Bits16,
            Waveform::MatchFrequency,
        )
        .unwrap_or_else(|err| defmt::panic!("Display counter: {}", err));
        let mut display_timer = Timer::new(PwmCounter::new(pwm_slices.pwm1));
        display_timer
            .bring_up(&display_config)
            .unwrap_or_else(|err| defmt::panic!("Display counter: {}", err));
        debug!(
            "Display scanning at {=u32} Hz",
            display_config.rate_hz(sys_hz)
        );

        // Start each counter inside the same critical section that hands it to the handler, so
        // the first wrap always finds its task
        debug!("critical_section: arm sampling and display tasks");
        critical_section::with(|cs| -> Result<(), Error> {
            sampling_timer.enable()?;
            SAMPLING.replace(
                cs,
                Some((
                    sampling_timer,
                    SamplingTask::new(input, output, &DISPLAY_BUFFER),
                )),
            );
            display_timer.enable()?;
            DISPLAY.replace(
                cs,
                Some((display_timer, DisplayTask::new(renderer, &DISPLAY_BUFFER))),
            );
            Ok(())
        })
        .unwrap_or_else(|err| defmt::panic!("Unable to start counters: {}", err));

        info!("System initialization complete");
        loop {
            // All functionality in interrupts
            cortex_m::asm::wfi();
        }
    }

    /// Wrap of any PWM slice
    #[interrupt]
    fn PWM_IRQ_WRAP() {
        service_pwm_wrap();
    }
}

/// The firmware only runs on the RP2040
#[cfg(not(target_arch = "arm"))]
fn main() {
    println!("Build with `--target thumbv6m-none-eabi` to produce the firmware");
}

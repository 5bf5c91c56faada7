// SPDX-License-Identifier: Apache-2.0

//! Periodic hardware counters and their configuration state machine.
//!
//! A [`Timer`] walks its counter through
//! [`Unconfigured`](TimerState::Unconfigured) → [`Configuring`](TimerState::Configuring) →
//! [`Disabled`](TimerState::Disabled) → [`Enabled`](TimerState::Enabled). Registers that the
//! peripheral synchronizes into its own clock domain are only written while the counter is
//! stopped, and every such write is followed by a wait on the sync-busy status.
//!
//! <div class="warning">With <code>SyncPolicy::Unbounded</code> (the default) a counter whose
//! sync-busy bit never clears hangs the caller forever.</div>

use crate::error::Error;

/// Counter register width
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(target_arch = "arm", derive(defmt::Format))]
pub enum CounterWidth {
    /// 8-bit counter
    Bits8,
    /// 16-bit counter
    Bits16,
}

impl CounterWidth {
    /// Number of bits in the counter
    pub const fn bits(self) -> u8 {
        match self {
            CounterWidth::Bits8 => 8,
            CounterWidth::Bits16 => 16,
        }
    }

    /// Largest value the period register can hold
    pub const fn max(self) -> u32 {
        match self {
            CounterWidth::Bits8 => u8::MAX as u32,
            CounterWidth::Bits16 => u16::MAX as u32,
        }
    }
}

/// Waveform-generation mode
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(target_arch = "arm", derive(defmt::Format))]
pub enum Waveform {
    /// Counter wraps at the period register; compare register sets the duty cycle
    NormalPwm,
    /// Counter wraps at the compare register; the period register is unused
    MatchFrequency,
}

/// Configuration state of a [`Timer`]
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(target_arch = "arm", derive(defmt::Format))]
pub enum TimerState {
    /// Freshly constructed, clocks not yet routed
    Unconfigured,
    /// Clocks routed, registers being written
    Configuring,
    /// Fully configured, counter stopped
    Disabled,
    /// Counter running and raising its interrupt once per period
    Enabled,
}

/// How long to poll the sync-busy bit before giving up
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SyncPolicy {
    /// Poll until the hardware reports completion
    Unbounded,
    /// Give up with [`Error::SyncTimeout`] after this many busy polls
    Bounded(u32),
}

/// Register values for one periodic counter
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(target_arch = "arm", derive(defmt::Format))]
pub struct TimerConfig {
    /// Counter width
    pub width: CounterWidth,
    /// Integer divider applied to the counter clock
    pub prescale: u8,
    /// Waveform-generation mode
    pub waveform: Waveform,
    /// Period register value. The counter wraps every `period + 1` prescaled ticks.
    pub period: u16,
    /// Compare register value
    pub compare: u16,
}

impl TimerConfig {
    /// Derive the registers for a counter that wraps `rate_hz` times a second.
    ///
    /// `clock_hz / prescale` must be an exact multiple of `rate_hz`, and the resulting period has
    /// to fit in `width`. In [`Waveform::MatchFrequency`] the compare register carries the period;
    /// in [`Waveform::NormalPwm`] it is left at 1.
    ///
    /// ```
    /// use filtered_voltmeter::timer::{CounterWidth, TimerConfig, Waveform};
    ///
    /// let cfg = TimerConfig::periodic(48_000_000, 192, 1_000, CounterWidth::Bits8, Waveform::NormalPwm)
    ///     .unwrap();
    /// assert_eq!(cfg.period, 249);
    /// ```
    pub fn periodic(
        clock_hz: u32,
        prescale: u8,
        rate_hz: u32,
        width: CounterWidth,
        waveform: Waveform,
    ) -> Result<Self, Error> {
        if prescale == 0 || rate_hz == 0 {
            return Err(Error::ZeroDivisor);
        }
        let counter_hz = clock_hz / prescale as u32;
        if clock_hz % prescale as u32 != 0 || counter_hz % rate_hz != 0 || counter_hz < rate_hz {
            return Err(Error::InexactRate {
                counter_hz,
                rate_hz,
            });
        }

        let period = counter_hz / rate_hz - 1;
        if period > width.max() {
            return Err(Error::PeriodOutOfRange { period, width });
        }
        let period = period as u16;

        Ok(Self {
            width,
            prescale,
            waveform,
            period,
            compare: match waveform {
                Waveform::NormalPwm => 1,
                Waveform::MatchFrequency => period,
            },
        })
    }

    /// Interrupt rate produced from a counter clock of `clock_hz`
    pub fn rate_hz(&self, clock_hz: u32) -> u32 {
        let top = match self.waveform {
            Waveform::NormalPwm => self.period,
            Waveform::MatchFrequency => self.compare,
        };
        clock_hz / self.prescale.max(1) as u32 / (top as u32 + 1)
    }
}

/// Register-level access to one hardware counter.
///
/// Writes to [`set_run`](Self::set_run), [`write_control`](Self::write_control),
/// [`write_period`](Self::write_period) and [`write_compare`](Self::write_compare) are
/// synchronized by the peripheral: [`sync_busy`](Self::sync_busy) reports `true` until they
/// have landed.
pub trait TimerCounter {
    /// Gate the bus clock and select the generic clock feeding the counter
    fn enable_clocks(&mut self);
    /// The last synchronized write has not landed yet
    fn sync_busy(&self) -> bool;
    /// Start or stop the counter
    fn set_run(&mut self, run: bool);
    /// Counter mode, prescaler and waveform generator
    fn write_control(&mut self, width: CounterWidth, prescale: u8, waveform: Waveform);
    /// Period register
    fn write_period(&mut self, period: u16);
    /// Compare/match register
    fn write_compare(&mut self, compare: u16);
    /// Enable the peripheral's own overflow interrupt
    fn enable_interrupt(&mut self);
    /// Unmask the counter's line in the NVIC
    fn unmask_interrupt_line(&mut self);
    /// Overflow flag is set
    fn interrupt_pending(&self) -> bool;
    /// Clear the overflow flag
    fn clear_interrupt(&mut self);
}

/// A periodic counter together with its configuration state
pub struct Timer<T> {
    /// Register access
    counter: T,
    /// Where the counter is in its bring-up
    state: TimerState,
    /// Bound on sync-busy polling
    sync: SyncPolicy,
}

impl<T: TimerCounter> Timer<T> {
    /// Wrap an unconfigured counter. Sync waits are unbounded.
    pub fn new(counter: T) -> Self {
        Self::with_sync_policy(counter, SyncPolicy::Unbounded)
    }

    /// Wrap an unconfigured counter with an explicit sync wait bound
    pub fn with_sync_policy(counter: T, sync: SyncPolicy) -> Self {
        Self {
            counter,
            state: TimerState::Unconfigured,
            sync,
        }
    }

    /// Current configuration state
    pub fn state(&self) -> TimerState {
        self.state
    }

    /// Direct access to the counter registers
    pub fn counter_mut(&mut self) -> &mut T {
        &mut self.counter
    }

    /// Route clocks to the counter (`Unconfigured → Configuring`)
    pub fn begin_configuration(&mut self) -> Result<(), Error> {
        self.expect_state(TimerState::Unconfigured, TimerState::Configuring)?;
        self.counter.enable_clocks();
        self.state = TimerState::Configuring;
        Ok(())
    }

    /// Write every register with the counter stopped (`Configuring → Disabled`).
    ///
    /// The interrupt is enabled and latched here but cannot fire until [`Self::enable`].
    pub fn configure(&mut self, config: &TimerConfig) -> Result<(), Error> {
        self.expect_state(TimerState::Configuring, TimerState::Disabled)?;

        self.counter.set_run(false);
        self.wait_sync()?;
        self.counter
            .write_control(config.width, config.prescale, config.waveform);
        self.wait_sync()?;
        if config.waveform == Waveform::NormalPwm {
            self.counter.write_period(config.period);
            self.wait_sync()?;
        }
        self.counter.write_compare(config.compare);
        self.wait_sync()?;

        self.counter.unmask_interrupt_line();
        self.counter.enable_interrupt();
        self.counter.clear_interrupt();

        debug!(
            "timer configured: {}-bit, prescale {}, period {}, compare {}",
            config.width.bits(),
            config.prescale,
            config.period,
            config.compare
        );
        self.state = TimerState::Disabled;
        Ok(())
    }

    /// [`Self::begin_configuration`] followed by [`Self::configure`]
    pub fn bring_up(&mut self, config: &TimerConfig) -> Result<(), Error> {
        self.begin_configuration()?;
        self.configure(config)
    }

    /// Start the counter (`Disabled → Enabled`)
    pub fn enable(&mut self) -> Result<(), Error> {
        self.expect_state(TimerState::Disabled, TimerState::Enabled)?;
        self.wait_sync()?;
        self.counter.set_run(true);
        self.state = TimerState::Enabled;
        Ok(())
    }

    /// Stop the counter (`Enabled → Disabled`)
    pub fn disable(&mut self) -> Result<(), Error> {
        self.expect_state(TimerState::Enabled, TimerState::Disabled)?;
        self.counter.set_run(false);
        self.wait_sync()?;
        self.state = TimerState::Disabled;
        Ok(())
    }

    /// The counter has wrapped since the flag was last cleared
    pub fn interrupt_pending(&self) -> bool {
        self.counter.interrupt_pending()
    }

    /// Acknowledge the pending wrap
    pub fn clear_interrupt(&mut self) {
        self.counter.clear_interrupt();
    }

    /// Reject the transition unless the timer is in `from`
    fn expect_state(&self, from: TimerState, to: TimerState) -> Result<(), Error> {
        if self.state == from {
            Ok(())
        } else {
            Err(Error::InvalidTransition {
                from: self.state,
                to,
            })
        }
    }

    /// Poll the sync-busy bit according to the configured policy
    fn wait_sync(&self) -> Result<(), Error> {
        match self.sync {
            SyncPolicy::Unbounded => {
                while self.counter.sync_busy() {
                    core::hint::spin_loop();
                }
                Ok(())
            }
            SyncPolicy::Bounded(limit) => {
                let mut polls: u32 = 0;
                while self.counter.sync_busy() {
                    if polls == limit {
                        return Err(Error::SyncTimeout);
                    }
                    polls += 1;
                }
                Ok(())
            }
        }
    }
}

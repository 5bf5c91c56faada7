// SPDX-License-Identifier: Apache-2.0

//! Boot-time configuration errors.
//!
//! Nothing in the interrupt handlers can fail; every variant here is raised while the counters
//! are being brought up, where the binary treats it as fatal.

use core::fmt;

use crate::timer::{CounterWidth, TimerState};

/// Configuration error
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(target_arch = "arm", derive(defmt::Format))]
pub enum Error {
    /// Derived period does not fit in the counter
    PeriodOutOfRange {
        /// Requested period register value
        period: u32,
        /// Width of the counter it was meant for
        width: CounterWidth,
    },
    /// The clock cannot be divided down to exactly the requested rate
    InexactRate {
        /// Counter input clock after prescaling
        counter_hz: u32,
        /// Requested interrupt rate
        rate_hz: u32,
    },
    /// A prescale or rate of zero was requested
    ZeroDivisor,
    /// The timer state machine does not allow this transition
    InvalidTransition {
        /// State the timer was in
        from: TimerState,
        /// State that was requested
        to: TimerState,
    },
    /// The sync-busy bit stayed set for longer than the bounded wait allowed
    SyncTimeout,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::PeriodOutOfRange { period, width } => write!(
                f,
                "period {} does not fit in a {}-bit counter",
                period,
                width.bits()
            ),
            Error::InexactRate {
                counter_hz,
                rate_hz,
            } => write!(f, "{} Hz does not divide evenly into {} Hz", counter_hz, rate_hz),
            Error::ZeroDivisor => f.write_str("prescale and rate must be non-zero"),
            Error::InvalidTransition { from, to } => {
                write!(f, "timer cannot go from {:?} to {:?}", from, to)
            }
            Error::SyncTimeout => f.write_str("timed out waiting for register synchronization"),
        }
    }
}

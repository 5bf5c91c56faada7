//! Interrupt handler state, plus static [`Mutex`].
//!
//! Both counters raise the one `PWM_IRQ_WRAP` line, so the sampling and display tasks run at the
//! same priority and never preempt each other.

use core::cell::RefCell;
use critical_section::Mutex;
use rp2040_hal::pwm::{Pwm0, Pwm1};

use crate::{
    board::{DacChannel, DisplayPin, OneShotAdc, PwmCounter},
    buffer::DisplayBuffer,
    components::{PwmDac, SevenSegment},
    tasks::{DisplayTask, SamplingTask},
    timer::Timer,
};

/// Sampling counter and the task it drives
pub type SamplingContext = (
    Timer<PwmCounter<Pwm0>>,
    SamplingTask<'static, OneShotAdc, PwmDac<DacChannel>>,
);
/// Display counter and the task it drives
pub type DisplayContext = (
    Timer<PwmCounter<Pwm1>>,
    DisplayTask<'static, SevenSegment<DisplayPin>>,
);

/// Digits shared by both tasks. Lock-free, see [`DisplayBuffer`].
pub static DISPLAY_BUFFER: DisplayBuffer = DisplayBuffer::new();
/// Sampling task, moved in once its counter is running
pub static SAMPLING: Mutex<RefCell<Option<SamplingContext>>> = Mutex::new(RefCell::new(None));
/// Display task, moved in once its counter is running
pub static DISPLAY: Mutex<RefCell<Option<DisplayContext>>> = Mutex::new(RefCell::new(None));

/// Body of the `PWM_IRQ_WRAP` handler.
///
/// Both counters share the line; each task checks its own slice flag.
pub fn service_pwm_wrap() {
    critical_section::with(|cs| {
        if let Some((timer, task)) = SAMPLING.borrow_ref_mut(cs).as_mut() {
            task.on_interrupt(timer);
        }
        if let Some((timer, task)) = DISPLAY.borrow_ref_mut(cs).as_mut() {
            task.on_interrupt(timer);
        }
    });
}

// SPDX-License-Identifier: Apache-2.0

//! Host-side stand-ins for the hardware collaborators.

use std::{cell::Cell, cell::RefCell, rc::Rc, vec::Vec};

use crate::{
    components::{AnalogInput, AnalogOutput, DigitRenderer},
    timer::{CounterWidth, TimerCounter, Waveform},
};

/// Register access recorded by [`MockCounter`]
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Op {
    EnableClocks,
    Run(bool),
    Control(CounterWidth, u8, Waveform),
    Period(u16),
    Compare(u16),
    EnableInterrupt,
    UnmaskLine,
    ClearInterrupt,
    /// A sync wait observed the busy bit clear
    Synced,
}

/// Counter that records every register access.
///
/// Each synchronized write keeps [`TimerCounter::sync_busy`] high for `busy_polls` polls.
#[derive(Default)]
pub struct MockCounter {
    pub ops: Rc<RefCell<Vec<Op>>>,
    pub pending: bool,
    pub stuck: bool,
    busy_polls: u32,
    busy_remaining: Cell<u32>,
}

impl MockCounter {
    pub fn with_busy_polls(busy_polls: u32) -> Self {
        Self {
            busy_polls,
            ..Self::default()
        }
    }

    fn record(&self, op: Op) {
        self.ops.borrow_mut().push(op);
    }

    fn synchronized(&self, op: Op) {
        self.record(op);
        self.busy_remaining.set(self.busy_polls);
    }
}

impl TimerCounter for MockCounter {
    fn enable_clocks(&mut self) {
        self.record(Op::EnableClocks);
    }

    fn sync_busy(&self) -> bool {
        if self.stuck {
            return true;
        }
        match self.busy_remaining.get() {
            0 => {
                self.record(Op::Synced);
                false
            }
            n => {
                self.busy_remaining.set(n - 1);
                true
            }
        }
    }

    fn set_run(&mut self, run: bool) {
        self.synchronized(Op::Run(run));
    }

    fn write_control(&mut self, width: CounterWidth, prescale: u8, waveform: Waveform) {
        self.synchronized(Op::Control(width, prescale, waveform));
    }

    fn write_period(&mut self, period: u16) {
        self.synchronized(Op::Period(period));
    }

    fn write_compare(&mut self, compare: u16) {
        self.synchronized(Op::Compare(compare));
    }

    fn enable_interrupt(&mut self) {
        self.record(Op::EnableInterrupt);
    }

    fn unmask_interrupt_line(&mut self) {
        self.record(Op::UnmaskLine);
    }

    fn interrupt_pending(&self) -> bool {
        self.pending
    }

    fn clear_interrupt(&mut self) {
        self.record(Op::ClearInterrupt);
        self.pending = false;
    }
}

/// ADC that plays back a fixed sequence, repeating the last entry once exhausted
pub struct MockAdc {
    samples: Vec<u16>,
    next: usize,
}

impl MockAdc {
    pub fn new(samples: &[u16]) -> Self {
        Self {
            samples: samples.to_vec(),
            next: 0,
        }
    }
}

impl AnalogInput for MockAdc {
    fn read_sample(&mut self) -> u16 {
        let sample = self.samples[self.next.min(self.samples.len() - 1)];
        self.next += 1;
        sample
    }
}

/// DAC that records every code written
#[derive(Default)]
pub struct MockDac {
    pub writes: Rc<RefCell<Vec<u16>>>,
}

impl AnalogOutput for MockDac {
    fn write_sample(&mut self, code: u16) {
        self.writes.borrow_mut().push(code);
    }
}

/// One `render_digit` call
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Render {
    pub value: u8,
    pub position: u8,
    pub decimal_point: bool,
    pub blank_if_zero: bool,
}

/// Renderer that records every call
#[derive(Default)]
pub struct MockRenderer {
    pub calls: Rc<RefCell<Vec<Render>>>,
}

impl DigitRenderer for MockRenderer {
    type Error = core::convert::Infallible;

    fn render_digit(
        &mut self,
        value: u8,
        position: u8,
        decimal_point: bool,
        blank_if_zero: bool,
    ) -> Result<(), Self::Error> {
        self.calls.borrow_mut().push(Render {
            value,
            position,
            decimal_point,
            blank_if_zero,
        });
        Ok(())
    }
}

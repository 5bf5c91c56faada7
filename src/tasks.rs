// SPDX-License-Identifier: Apache-2.0

//! The two periodic interrupt tasks.
//!
//! Each task owns its private state and collaborators and shares only the [`DisplayBuffer`].
//! Their `on_interrupt` entry points are what the interrupt handler calls; both check their own
//! counter's overflow flag first and do nothing if it is clear, so a handler entered for some
//! other reason leaves the task untouched.

use crate::{
    buffer::{decompose, to_millivolts, DigitCursor, DisplayBuffer},
    components::{AnalogInput, AnalogOutput, DigitRenderer},
    config::{ADC_MAX, DAC_MAX, DIGIT_COUNT},
    filter::{rescale, LowPass},
    timer::{Timer, TimerCounter},
};
#[cfg(feature = "trace_samples")]
use crate::config::SAMPLE_RATE_HZ;

/// Samples the input, filters it onto the output and publishes the reading to the display
pub struct SamplingTask<'b, A, D> {
    /// ADC
    input: A,
    /// DAC
    output: D,
    /// Filter memory
    filter: LowPass,
    /// Shared with [`DisplayTask`]
    display: &'b DisplayBuffer,
    /// Ticks since the last trace
    #[cfg(feature = "trace_samples")]
    ticks: u32,
}

impl<'b, A: AnalogInput, D: AnalogOutput> SamplingTask<'b, A, D> {
    /// Task with the filter at rest
    pub fn new(input: A, output: D, display: &'b DisplayBuffer) -> Self {
        Self {
            input,
            output,
            filter: LowPass::new(),
            display,
            #[cfg(feature = "trace_samples")]
            ticks: 0,
        }
    }

    /// Sampling counter interrupt
    pub fn on_interrupt<T: TimerCounter>(&mut self, timer: &mut Timer<T>) {
        if timer.interrupt_pending() {
            self.sample();
            timer.clear_interrupt();
        }
    }

    /// One sampling period: read, filter, output, publish
    pub fn sample(&mut self) {
        let raw = self.input.read_sample();

        let y = self.filter.update(raw as f32);
        let code = rescale(y, 0.0, ADC_MAX as f32, 0.0, DAC_MAX as f32) as u16;
        self.output.write_sample(code);

        self.display.store(decompose(to_millivolts(raw)));

        #[cfg(feature = "trace_samples")]
        {
            self.ticks += 1;
            if self.ticks == SAMPLE_RATE_HZ {
                self.ticks = 0;
                trace!("raw {} filtered {} output {}", raw, y, code);
            }
        }
    }

    /// Filter memory
    pub fn filter(&self) -> &LowPass {
        &self.filter
    }
}

/// Lights one digit of the display per tick, scanning round-robin
pub struct DisplayTask<'b, R> {
    /// Display driver
    renderer: R,
    /// Position lit on the next tick
    cursor: DigitCursor,
    /// Shared with [`SamplingTask`]
    display: &'b DisplayBuffer,
}

impl<'b, R: DigitRenderer> DisplayTask<'b, R> {
    /// Task starting at the leftmost digit
    pub fn new(renderer: R, display: &'b DisplayBuffer) -> Self {
        Self {
            renderer,
            cursor: DigitCursor::new(),
            display,
        }
    }

    /// Display counter interrupt
    pub fn on_interrupt<T: TimerCounter>(&mut self, timer: &mut Timer<T>) {
        if timer.interrupt_pending() {
            self.refresh();
            timer.clear_interrupt();
        }
    }

    /// Light the digit under the cursor (most significant at position 0) and advance
    pub fn refresh(&mut self) {
        let position = self.cursor.position();
        let value = self.display.load(DIGIT_COUNT - 1 - position as usize);
        if self
            .renderer
            .render_digit(value, position, false, false)
            .is_err()
        {
            warn!("failed to render digit {}", position);
        }
        self.cursor.advance();
    }

    /// Current scan position
    pub fn cursor(&self) -> DigitCursor {
        self.cursor
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{MockAdc, MockCounter, MockDac, MockRenderer, Render};

    fn armed_timer() -> Timer<MockCounter> {
        Timer::new(MockCounter::default())
    }

    fn fire(timer: &mut Timer<MockCounter>) {
        timer.counter_mut().pending = true;
    }

    #[test]
    fn sampling_ignores_cleared_flag() {
        let buffer = DisplayBuffer::new();
        let dac = MockDac::default();
        let writes = dac.writes.clone();
        let mut task = SamplingTask::new(MockAdc::new(&[2048]), dac, &buffer);
        let mut timer = armed_timer();

        task.on_interrupt(&mut timer);
        assert!(writes.borrow().is_empty());
        assert_eq!(*task.filter(), LowPass::new());
        assert_eq!(buffer.snapshot(), [1, 1, 1, 1]);

        fire(&mut timer);
        task.on_interrupt(&mut timer);
        assert_eq!(writes.borrow().len(), 1);
        assert!(!timer.interrupt_pending());
    }

    #[cfg(not(feature = "resolution_16bit"))]
    #[test]
    fn midscale_reading_reaches_display() {
        let buffer = DisplayBuffer::new();
        let mut task = SamplingTask::new(MockAdc::new(&[2048]), MockDac::default(), &buffer);
        task.sample();
        assert_eq!(buffer.snapshot(), [0, 5, 6, 1]);
    }

    #[test]
    fn step_input_ramps_output_toward_full_scale() {
        let buffer = DisplayBuffer::new();
        let dac = MockDac::default();
        let writes = dac.writes.clone();
        let mut task = SamplingTask::new(MockAdc::new(&[0, ADC_MAX]), dac, &buffer);
        let mut timer = armed_timer();

        for _ in 0..30 {
            fire(&mut timer);
            task.on_interrupt(&mut timer);
        }

        let writes = writes.borrow();
        assert_eq!(writes.len(), 30);
        // x_prev is still 0 on the first two ticks
        assert_eq!(writes[0], 0);
        assert_eq!(writes[1], 0);
        assert!(writes[2] > 0);
        assert!(writes.windows(2).all(|w| w[0] <= w[1]));
        assert!(writes[29] >= DAC_MAX - 1 && writes[29] <= DAC_MAX);
        assert_eq!(buffer.snapshot(), [0, 0, 3, 3]);
    }

    #[test]
    fn display_ignores_cleared_flag() {
        let buffer = DisplayBuffer::new();
        let renderer = MockRenderer::default();
        let calls = renderer.calls.clone();
        let mut task = DisplayTask::new(renderer, &buffer);
        let mut timer = armed_timer();

        for _ in 0..5 {
            task.on_interrupt(&mut timer);
        }
        assert!(calls.borrow().is_empty());
        assert_eq!(task.cursor(), DigitCursor::new());
    }

    #[test]
    fn display_scans_most_significant_first() {
        let buffer = DisplayBuffer::new();
        buffer.store([4, 3, 2, 1]);
        let renderer = MockRenderer::default();
        let calls = renderer.calls.clone();
        let mut task = DisplayTask::new(renderer, &buffer);
        let mut timer = armed_timer();

        for _ in 0..8 {
            fire(&mut timer);
            task.on_interrupt(&mut timer);
            assert!(!timer.interrupt_pending());
        }

        let expected: std::vec::Vec<Render> = (0..8u8)
            .map(|tick| Render {
                value: tick % 4 + 1,
                position: tick % 4,
                decimal_point: false,
                blank_if_zero: false,
            })
            .collect();
        assert_eq!(*calls.borrow(), expected);
        assert_eq!(task.cursor().position(), 0);
    }

    #[test]
    fn display_picks_up_new_reading_between_ticks() {
        let buffer = DisplayBuffer::new();
        let renderer = MockRenderer::default();
        let calls = renderer.calls.clone();
        let mut display = DisplayTask::new(renderer, &buffer);
        let mut sampling = SamplingTask::new(MockAdc::new(&[ADC_MAX]), MockDac::default(), &buffer);

        display.refresh();
        sampling.sample();
        display.refresh();

        let calls = calls.borrow();
        assert_eq!(calls[0].value, 1);
        // Hundreds digit of 3300 mV
        assert_eq!(calls[1].value, 3);
    }
}

//! This [RP2040](https://docs.rs/rp2040-hal) firmware samples an analog voltage at 1 kHz,
//! low-pass filters it onto an analog output, and shows the raw reading in millivolts on a
//! multiplexed 4-digit seven-segment display.
//!
//! Everything runs from two periodic counter interrupts:
//!
//! - [`tasks::SamplingTask`] (1 kHz): ADC → [`filter::LowPass`] → PWM DAC, and the reading's
//!   digits into the shared [`buffer::DisplayBuffer`].
//! - [`tasks::DisplayTask`] (4 kHz): lights one digit per tick in round-robin order.
//!
//! The counters are brought up through the [`timer::Timer`] state machine and stay disabled
//! until explicitly enabled once both tasks are in place.
//!
//! ## Crate features
//!
//! - `resolution_16bit`: Sums 16 conversions into each sample, giving readings in `0..=65535`
//!   instead of `0..=4095`.
//! - `trace_samples`: Traces the raw, filtered and output values once per second. See
//!   [`tasks::SamplingTask::sample`].
//!
//! ## Testing
//!
//! Everything except `board` and `interrupt` builds on the host:
//!
//! ```bash
//! cargo test --lib
//! ```
//!
//! The firmware itself is built with `cargo build --release --target thumbv6m-none-eabi`.

// Copyright 2026 The filtered_voltmeter developers
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
// http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

#![cfg_attr(not(test), no_std)]
#![warn(missing_docs)]
#![cfg_attr(docsrs, feature(doc_cfg), feature(doc_auto_cfg), feature(doc_cfg_hide))]

#[macro_use]
mod fmt;

pub mod buffer;
pub mod components;
pub mod config;
pub mod error;
pub mod filter;
pub mod tasks;
pub mod timer;

#[cfg(target_arch = "arm")]
pub mod board;
#[cfg(target_arch = "arm")]
pub mod interrupt;

#[cfg(test)]
mod testing;

pub use error::Error;

// SPDX-License-Identifier: Apache-2.0

//! Logging macros shared by the library modules.
//!
//! On the target every macro expands to its [`defmt`](https://docs.rs/defmt) counterpart. Host
//! builds (unit tests) have no defmt global logger to link against, so the same call sites go
//! through the [`log`] facade instead. Only `{}` placeholders are portable between the two.
#![allow(unused_macros)]

/// Trace-level message
macro_rules! trace {
    ($($arg:tt)*) => {{
        #[cfg(target_arch = "arm")]
        ::defmt::trace!($($arg)*);
        #[cfg(not(target_arch = "arm"))]
        ::log::trace!($($arg)*);
    }};
}

/// Debug-level message
macro_rules! debug {
    ($($arg:tt)*) => {{
        #[cfg(target_arch = "arm")]
        ::defmt::debug!($($arg)*);
        #[cfg(not(target_arch = "arm"))]
        ::log::debug!($($arg)*);
    }};
}

/// Info-level message
macro_rules! info {
    ($($arg:tt)*) => {{
        #[cfg(target_arch = "arm")]
        ::defmt::info!($($arg)*);
        #[cfg(not(target_arch = "arm"))]
        ::log::info!($($arg)*);
    }};
}

/// Warning-level message
macro_rules! warn {
    ($($arg:tt)*) => {{
        #[cfg(target_arch = "arm")]
        ::defmt::warn!($($arg)*);
        #[cfg(not(target_arch = "arm"))]
        ::log::warn!($($arg)*);
    }};
}

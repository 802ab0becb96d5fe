//! Logging shims.
//!
//! Forward to `defmt` with the `defmt-impl` feature and to `tracing` with the `tracing`
//! feature. Only plain `{}` placeholders are used so the same format string is valid for both,
//! and for `format_args!` which keeps the arguments used when logging is off.
#![allow(unused_macros)]

macro_rules! trace {
    ($($arg:tt)*) => {{
        #[cfg(feature = "defmt-impl")]
        ::defmt::trace!($($arg)*);
        #[cfg(feature = "tracing")]
        ::tracing::trace!($($arg)*);
        #[cfg(not(any(feature = "defmt-impl", feature = "tracing")))]
        let _ = ::core::format_args!($($arg)*);
    }};
}

macro_rules! debug {
    ($($arg:tt)*) => {{
        #[cfg(feature = "defmt-impl")]
        ::defmt::debug!($($arg)*);
        #[cfg(feature = "tracing")]
        ::tracing::debug!($($arg)*);
        #[cfg(not(any(feature = "defmt-impl", feature = "tracing")))]
        let _ = ::core::format_args!($($arg)*);
    }};
}

macro_rules! warn {
    ($($arg:tt)*) => {{
        #[cfg(feature = "defmt-impl")]
        ::defmt::warn!($($arg)*);
        #[cfg(feature = "tracing")]
        ::tracing::warn!($($arg)*);
        #[cfg(not(any(feature = "defmt-impl", feature = "tracing")))]
        let _ = ::core::format_args!($($arg)*);
    }};
}

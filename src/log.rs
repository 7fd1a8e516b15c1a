// Logging shims.
//
// With the `tracing` feature these forward to `tracing`; without it they
// compile to nothing (arguments are still type-checked, never evaluated).

macro_rules! debug {
    ($($arg:tt)*) => {{
        #[cfg(feature = "tracing")]
        {
            tracing::debug!($($arg)*);
        }
        #[cfg(not(feature = "tracing"))]
        {
            if false {
                let _ = format_args!($($arg)*);
            }
        }
    }};
}

macro_rules! warn {
    ($($arg:tt)*) => {{
        #[cfg(feature = "tracing")]
        {
            tracing::warn!($($arg)*);
        }
        #[cfg(not(feature = "tracing"))]
        {
            if false {
                let _ = format_args!($($arg)*);
            }
        }
    }};
}

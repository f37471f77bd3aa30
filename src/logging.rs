//! Crate-internal logging macros: `error!`, `warn!`, `info!`, `debug!` and `trace!`.
//!
//! With the `tracing` feature every macro forwards to the `tracing` macro of the same name under
//! the `contract_tracker` target. Without it a call only borrows its field expressions, so call
//! sites compile the same way in both configurations.
//!
//! Call sites use structured fields followed by a literal message, e.g.
//! `warn!(address = %address, "Log broadcaster is not connected")`.

// `$d` carries a literal `$` into the generated macros.
macro_rules! level_macros {
    ($d:tt $($level:ident),+ $(,)?) => {$(
        #[cfg(feature = "tracing")]
        #[allow(unused_macros)]
        macro_rules! $level {
            ($d($d arg:tt)*) => {
                tracing::$level!(target: "contract_tracker", $d($d arg)*)
            };
        }

        #[cfg(not(feature = "tracing"))]
        #[allow(unused_macros)]
        macro_rules! $level {
            ($d($d arg:tt)*) => {
                $crate::__consume_fields!($d($d arg)*)
            };
        }
    )+};
}

level_macros!($ error, warn, info, debug, trace);

#[doc(hidden)]
#[macro_export]
#[cfg(not(feature = "tracing"))]
macro_rules! __consume_fields {
    ($field:ident = % $value:expr, $($rest:tt)*) => {{
        let _ = &$value;
        $crate::__consume_fields!($($rest)*)
    }};
    ($field:ident = ? $value:expr, $($rest:tt)*) => {{
        let _ = &$value;
        $crate::__consume_fields!($($rest)*)
    }};
    ($field:ident = $value:expr, $($rest:tt)*) => {{
        let _ = &$value;
        $crate::__consume_fields!($($rest)*)
    }};
    ($message:literal $(,)?) => {
        ()
    };
}

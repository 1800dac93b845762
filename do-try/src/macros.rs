/// Cross-platform logging macro with explicit level selection.
///
/// On native (non-WASM) builds it forwards to [`tracing`] macros.
/// In WASM builds it forwards to log crate macros.
/// During tests it prints to `stdout`, preserving the log level for context.
macro_rules! cross_log {
    ($level:ident, $($arg:tt)*) => {
        #[cfg(all(not(test), target_arch = "wasm32"))]
        log::$level!(target: "do_try", $($arg)*);
        #[cfg(all(not(test), not(target_arch = "wasm32")))]
        tracing::$level!(target: "do_try", $($arg)*);
        #[cfg(test)]
        println!("[{}] {}", stringify!($level), format_args!($($arg)*));
    };
}

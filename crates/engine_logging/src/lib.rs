#![deny(missing_docs)]
//! Shared logging utilities for the casey workspace.
//!
//! This crate provides the `engine_*` logging macros used across the codebase
//! and a minimal test initializer for the global logger. The macros tag every
//! line with the wizard step that was active on the logging thread, if any.

use std::cell::Cell;

#[doc(hidden)]
pub use log as __log;

thread_local! {
    /// Wizard step (1..=4) the current thread is working on; 0 when unset.
    static STEP_CONTEXT: Cell<u8> = const { Cell::new(0) };
}

/// Records the wizard step for log lines emitted on the current thread.
/// The app event loop calls this after every dispatched message.
pub fn set_step_context(step: u8) {
    STEP_CONTEXT.with(|v| v.set(step));
}

/// Returns the wizard step recorded for the current thread, or 0 if none.
pub fn step_context() -> u8 {
    STEP_CONTEXT.with(|v| v.get())
}

#[doc(hidden)]
#[macro_export]
macro_rules! __engine_log {
    ($level:ident, $($arg:tt)*) => {{
        match $crate::step_context() {
            0 => $crate::__log::$level!($($arg)*),
            step => $crate::__log::$level!("[step {}] {}", step, format_args!($($arg)*)),
        }
    }};
}

/// Logs a trace-level message using the global logging facade.
#[macro_export]
macro_rules! engine_trace {
    ($($arg:tt)*) => {{
        $crate::__engine_log!(trace, $($arg)*);
    }};
}

/// Logs an info-level message using the global logging facade.
#[macro_export]
macro_rules! engine_info {
    ($($arg:tt)*) => {{
        $crate::__engine_log!(info, $($arg)*);
    }};
}

/// Logs a debug-level message using the global logging facade.
#[macro_export]
macro_rules! engine_debug {
    ($($arg:tt)*) => {{
        $crate::__engine_log!(debug, $($arg)*);
    }};
}

/// Logs a warn-level message using the global logging facade.
#[macro_export]
macro_rules! engine_warn {
    ($($arg:tt)*) => {{
        $crate::__engine_log!(warn, $($arg)*);
    }};
}

/// Logs an error-level message using the global logging facade.
#[macro_export]
macro_rules! engine_error {
    ($($arg:tt)*) => {{
        $crate::__engine_log!(error, $($arg)*);
    }};
}

/// Initializes a simple terminal logger for use in unit tests.
///
/// This safely no-ops if another logger has already been initialized.
pub fn initialize_for_tests() {
    use simplelog::{ColorChoice, CombinedLogger, Config, TermLogger, TerminalMode};

    // Use debug level in debug builds, info in release builds.
    let level = if cfg!(debug_assertions) {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    // Ignore the error if a logger was already set by another test.
    let _ = CombinedLogger::init(vec![TermLogger::new(
        level,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )]);
}

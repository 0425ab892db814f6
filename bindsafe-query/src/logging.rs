//! Logging infrastructure for bindsafe.
//!
//! Structured logging controlled by the `BINDSAFE_DEBUG` environment variable.
//!
//! # Environment Variables
//!
//! - `BINDSAFE_DEBUG=true` - Enable debug logging
//! - `BINDSAFE_DEBUG=1` - Enable debug logging
//! - `BINDSAFE_LOG_LEVEL=debug|info|warn|error|trace` - Set specific log level
//! - `BINDSAFE_LOG_FORMAT=json|pretty|compact` - Set output format (default: json)
//!
//! # Usage
//!
//! ```rust,no_run
//! use bindsafe_query::logging;
//!
//! // Initialize logging (call once at startup)
//! logging::init();
//! ```
//!
//! Sanitization emits `trace` events for every rewritten anonymous name and
//! statement building emits one `debug` event per built statement.

use std::env;
use std::sync::Once;

static INIT: Once = Once::new();

/// Check if debug logging is enabled via `BINDSAFE_DEBUG`.
///
/// Returns `true` if `BINDSAFE_DEBUG` is set to "true", "1", or "yes" (case-insensitive).
#[inline]
pub fn is_debug_enabled() -> bool {
    env::var("BINDSAFE_DEBUG")
        .map(|v| matches!(v.to_lowercase().as_str(), "true" | "1" | "yes"))
        .unwrap_or(false)
}

/// Get the configured log level from `BINDSAFE_LOG_LEVEL`.
///
/// Defaults to "debug" if `BINDSAFE_DEBUG` is enabled, otherwise "warn".
pub fn get_log_level() -> &'static str {
    let fallback = if is_debug_enabled() { "debug" } else { "warn" };

    match env::var("BINDSAFE_LOG_LEVEL") {
        Ok(level) => match level.to_lowercase().as_str() {
            "trace" => "trace",
            "debug" => "debug",
            "info" => "info",
            "warn" => "warn",
            "error" => "error",
            _ => fallback,
        },
        Err(_) => fallback,
    }
}

/// Get the configured log format from `BINDSAFE_LOG_FORMAT`.
///
/// Defaults to "json".
pub fn get_log_format() -> &'static str {
    env::var("BINDSAFE_LOG_FORMAT")
        .map(|f| match f.to_lowercase().as_str() {
            "pretty" => "pretty",
            "compact" => "compact",
            _ => "json",
        })
        .unwrap_or("json")
}

/// Initialize the bindsafe logging system.
///
/// Subsequent calls are no-ops. Nothing is installed unless `BINDSAFE_DEBUG`
/// or `BINDSAFE_LOG_LEVEL` is set, and the `tracing-subscriber` feature is on.
pub fn init() {
    INIT.call_once(|| {
        if !is_debug_enabled() && env::var("BINDSAFE_LOG_LEVEL").is_err() {
            return;
        }

        #[cfg(feature = "tracing-subscriber")]
        {
            use tracing_subscriber::{EnvFilter, fmt, prelude::*};

            let level = get_log_level();
            let filter = EnvFilter::try_new(format!(
                "bindsafe={},bindsafe_query={},bindsafe_config={}",
                level, level, level
            ))
            .unwrap_or_else(|_| EnvFilter::new("warn"));

            // A subscriber installed by the host application wins.
            let installed = match get_log_format() {
                "json" => tracing_subscriber::registry()
                    .with(filter)
                    .with(fmt::layer().json())
                    .try_init(),
                "compact" => tracing_subscriber::registry()
                    .with(filter)
                    .with(fmt::layer().compact())
                    .try_init(),
                _ => tracing_subscriber::registry()
                    .with(filter)
                    .with(fmt::layer().pretty())
                    .try_init(),
            };

            if installed.is_ok() {
                tracing::info!(
                    level = level,
                    format = get_log_format(),
                    "bindsafe logging initialized"
                );
            }
        }
    });
}

/// Initialize logging with a specific level.
///
/// # Safety
///
/// This function modifies environment variables, which is unsafe in
/// multi-threaded programs. Call this early in your program before
/// spawning threads.
pub fn init_with_level(level: &str) {
    // SAFETY: This should only be called at program startup before threads are spawned.
    unsafe {
        env::set_var("BINDSAFE_LOG_LEVEL", level);
    }
    init();
}

/// Initialize logging for debugging.
///
/// Equivalent to setting `BINDSAFE_DEBUG=true` and calling `init()`.
///
/// # Safety
///
/// Same caveat as [`init_with_level`].
pub fn init_debug() {
    // SAFETY: This should only be called at program startup before threads are spawned.
    unsafe {
        env::set_var("BINDSAFE_DEBUG", "true");
    }
    init();
}

/// Conditional debug logging, only when `BINDSAFE_DEBUG` is enabled at runtime.
#[macro_export]
macro_rules! bindsafe_debug {
    ($($arg:tt)*) => {
        if $crate::logging::is_debug_enabled() {
            tracing::debug!($($arg)*);
        }
    };
}

/// Conditional trace logging.
#[macro_export]
macro_rules! bindsafe_trace {
    ($($arg:tt)*) => {
        if $crate::logging::is_debug_enabled() {
            tracing::trace!($($arg)*);
        }
    };
}

// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Logging setup shared by the chunkq crates
//!
//! Usage:
//! - CHUNKQ_LOG=off (default) - no logs
//! - CHUNKQ_LOG=error - identity failures and unreadable files
//! - CHUNKQ_LOG=warn - also conflicting constraints
//! - CHUNKQ_LOG=info - also files skipped for ownership
//! - CHUNKQ_LOG=debug - path resolution and scan details

use std::sync::Once;

// Re-export emit so macros can use it
pub use emit;

/// Environment variable read by [`init_diagnostics`]
pub const LOG_ENV: &str = "CHUNKQ_LOG";

static INIT: Once = Once::new();

/// Parsed value of [`LOG_ENV`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogSetting {
    Off,
    At(emit::Level),
    /// Unrecognised value, falls back to info
    Unknown,
}

impl LogSetting {
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "" | "off" => LogSetting::Off,
            "error" => LogSetting::At(emit::Level::Error),
            "warn" => LogSetting::At(emit::Level::Warn),
            "info" => LogSetting::At(emit::Level::Info),
            "debug" => LogSetting::At(emit::Level::Debug),
            _ => LogSetting::Unknown,
        }
    }
}

/// Initialize diagnostics from the CHUNKQ_LOG environment variable
///
/// Safe to call more than once; only the first call has any effect.
pub fn init_diagnostics() {
    let value = std::env::var(LOG_ENV).unwrap_or_default();
    init_with(LogSetting::parse(&value), &value);
}

/// Initialize diagnostics with an explicit minimum level, ignoring CHUNKQ_LOG
pub fn init_at(level: emit::Level) {
    init_with(LogSetting::At(level), "");
}

fn init_with(setting: LogSetting, raw: &str) {
    INIT.call_once(|| {
        let level = match setting {
            LogSetting::Off => return,
            LogSetting::At(level) => level,
            LogSetting::Unknown => emit::Level::Info,
        };

        let rt = emit::setup()
            .emit_to(emit_term::stderr())
            .emit_when(emit::level::min_filter(level))
            .init();

        if setting == LogSetting::Unknown {
            emit::warn!("Unknown {var} value '{value}', using 'info'", var: LOG_ENV, value: raw);
        }

        // The runtime lives for the rest of the process
        std::mem::forget(rt);
    });
}

/// Log normal operations a user may want to see
#[macro_export]
macro_rules! log_info {
    ($($arg:tt)*) => {
        $crate::emit::info!($($arg)*)
    };
}

/// Log detailed diagnostics (resolved paths, scan sizes)
#[macro_export]
macro_rules! log_debug {
    ($($arg:tt)*) => {
        $crate::emit::debug!($($arg)*)
    };
}

/// Log conditions that don't stop the query but should be noted
#[macro_export]
macro_rules! log_warn {
    ($($arg:tt)*) => {
        $crate::emit::warn!($($arg)*)
    };
}

/// Log failures
#[macro_export]
macro_rules! log_error {
    ($($arg:tt)*) => {
        $crate::emit::error!($($arg)*)
    };
}

pub use init_diagnostics as init;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_settings() {
        assert_eq!(LogSetting::parse(""), LogSetting::Off);
        assert_eq!(LogSetting::parse("off"), LogSetting::Off);
        assert_eq!(LogSetting::parse("DEBUG"), LogSetting::At(emit::Level::Debug));
        assert_eq!(LogSetting::parse(" warn "), LogSetting::At(emit::Level::Warn));
        assert_eq!(LogSetting::parse("error"), LogSetting::At(emit::Level::Error));
        assert_eq!(LogSetting::parse("info"), LogSetting::At(emit::Level::Info));
        assert_eq!(LogSetting::parse("verbose"), LogSetting::Unknown);
    }

    #[test]
    fn test_init_is_safe_to_call_multiple_times() {
        init_diagnostics();
        init_diagnostics();
        init_at(emit::Level::Debug);
    }

    #[test]
    fn test_macros_compile() {
        log_info!("Test message");
        log_debug!("Debug message with {value}", value: 42);
        log_warn!("Warning message");
        log_error!("Error message");
    }
}

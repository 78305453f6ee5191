#![deny(missing_docs)]
//! Shared logging utilities for the relay workspace.
//!
//! This crate provides the `relay_*` logging macros used across the codebase,
//! a helper for keeping credentials out of log lines, and a minimal test
//! initializer for the global logger.

/// Logs a trace-level message using the global logging facade.
#[macro_export]
macro_rules! relay_trace {
    ($($arg:tt)*) => {{
        log::trace!($($arg)*);
    }};
}

/// Logs a debug-level message using the global logging facade.
#[macro_export]
macro_rules! relay_debug {
    ($($arg:tt)*) => {{
        log::debug!($($arg)*);
    }};
}

/// Logs an info-level message using the global logging facade.
#[macro_export]
macro_rules! relay_info {
    ($($arg:tt)*) => {{
        log::info!($($arg)*);
    }};
}

/// Logs a warn-level message using the global logging facade.
#[macro_export]
macro_rules! relay_warn {
    ($($arg:tt)*) => {{
        log::warn!($($arg)*);
    }};
}

/// Logs an error-level message using the global logging facade.
#[macro_export]
macro_rules! relay_error {
    ($($arg:tt)*) => {{
        log::error!($($arg)*);
    }};
}

/// Masks a credential for display, keeping only its last four characters.
///
/// Short values are masked entirely so that nothing recognizable leaks.
pub fn redact_secret(secret: &str) -> String {
    let count = secret.chars().count();
    if count <= 8 {
        return "*".repeat(count.max(3));
    }
    let tail: String = secret.chars().skip(count - 4).collect();
    format!("****{tail}")
}

/// Initializes a simple terminal logger for use in unit tests.
///
/// Output goes to stderr so it never interleaves with protocol output on
/// stdout. This safely no-ops if another logger has already been initialized.
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
        TerminalMode::Stderr,
        ColorChoice::Auto,
    )]);
}

#[cfg(test)]
mod tests {
    use super::redact_secret;

    #[test]
    fn long_secret_keeps_only_tail() {
        assert_eq!(redact_secret("sk-abcdefghijklmnop"), "****mnop");
    }

    #[test]
    fn short_secret_is_fully_masked() {
        assert_eq!(redact_secret("abc12"), "*****");
        assert_eq!(redact_secret(""), "***");
    }
}

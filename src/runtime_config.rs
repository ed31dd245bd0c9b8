//! # Runtime Configuration Module
//!
//! Environment-driven knobs for the dispatcher.
//!
//! ## Environment Variables
//!
//! ### `ALBROUTER_CAPTURE_BACKTRACE`
//!
//! When truthy (`1`, `true`, `yes`, `on`), a panic recovered from a handler carries a captured
//! backtrace in its [`Caught`](crate::error::Caught) payload and in the panic log line.
//!
//! Default: `false`. Capturing a backtrace costs a stack walk per panic.
//!
//! ## Usage
//!
//! ```rust
//! use albrouter::dispatcher::Dispatcher;
//! use albrouter::runtime_config::RuntimeConfig;
//!
//! let dispatcher = Dispatcher::builder()
//!     .config(RuntimeConfig::from_env())
//!     .build();
//! # let _ = dispatcher;
//! ```

use std::env;

/// Name of the backtrace switch.
pub const CAPTURE_BACKTRACE_ENV: &str = "ALBROUTER_CAPTURE_BACKTRACE";

/// Runtime configuration loaded from environment variables.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RuntimeConfig {
    /// Attach a backtrace to recovered panics (default: false)
    pub capture_backtrace: bool,
}

impl RuntimeConfig {
    /// Load configuration from environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        let capture_backtrace = env::var(CAPTURE_BACKTRACE_ENV)
            .map(|val| parse_flag(&val))
            .unwrap_or(false);
        RuntimeConfig { capture_backtrace }
    }
}

fn parse_flag(val: &str) -> bool {
    matches!(
        val.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_flag() {
        assert!(parse_flag("1"));
        assert!(parse_flag(" TRUE "));
        assert!(parse_flag("on"));
        assert!(!parse_flag("0"));
        assert!(!parse_flag("off"));
        assert!(!parse_flag(""));
    }
}

//! Environment-based runtime configuration.
//!
//! ## Environment variables
//!
//! ### `SWERVE_STACK_SIZE`
//!
//! Stack size for coroutines serving requests, in decimal (`16384`) or
//! hexadecimal (`0x4000`). Default: `0x4000` (16 KB). Larger stacks support
//! deeper handler call chains; smaller stacks reduce memory per concurrent
//! request.

use std::env;

/// Runtime configuration loaded from environment variables.
///
/// Load at startup with [`RuntimeConfig::from_env`] and install with
/// [`RuntimeConfig::apply`] before starting the server.
#[derive(Debug, Clone, Copy)]
pub struct RuntimeConfig {
    /// Stack size for coroutines in bytes (default: 16 KB / 0x4000)
    pub stack_size: usize,
}

const DEFAULT_STACK_SIZE: usize = 0x4000;

impl RuntimeConfig {
    /// Load configuration from environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        let stack_size = env::var("SWERVE_STACK_SIZE")
            .ok()
            .and_then(|val| parse_size(&val))
            .unwrap_or(DEFAULT_STACK_SIZE);
        RuntimeConfig { stack_size }
    }

    /// Install this configuration into the coroutine runtime.
    pub fn apply(&self) {
        may::config().set_stack_size(self.stack_size);
    }
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        RuntimeConfig {
            stack_size: DEFAULT_STACK_SIZE,
        }
    }
}

fn parse_size(val: &str) -> Option<usize> {
    if let Some(hex) = val.strip_prefix("0x") {
        usize::from_str_radix(hex, 16).ok()
    } else {
        val.parse().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_size_accepts_decimal_and_hex() {
        assert_eq!(parse_size("16384"), Some(16384));
        assert_eq!(parse_size("0x8000"), Some(0x8000));
        assert_eq!(parse_size("banana"), None);
    }
}

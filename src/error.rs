//! Error types for the registration and dispatch layers.
//!
//! Two families exist and never mix:
//!
//! - [`ConfigError`] — raised while descriptors, handlers and policies are
//!   being wired up at startup. These abort startup and are never translated
//!   into HTTP responses.
//! - [`HandlerError`] — raised while serving a request. These propagate
//!   unmodified through the dispatcher to the error responder, which maps
//!   them to a status code via the [`ExceptionPolicy`](crate::policy::ExceptionPolicy).

use std::fmt;

/// Well-known error kind identifiers.
///
/// A kind is a stable, fully-qualified string used as the lookup key in the
/// exception policy. Applications define their own kinds; the constants here
/// cover the conventional ones the default policy pre-registers plus the
/// kinds the dispatcher itself can produce.
pub mod kind {
    /// Malformed or semantically invalid request data (mapped to 400).
    pub const BAD_REQUEST: &str = "request.bad";
    /// Missing or invalid credentials (mapped to 401).
    pub const UNAUTHORIZED: &str = "auth.unauthorized";
    /// Authenticated but not permitted (mapped to 403).
    pub const FORBIDDEN: &str = "auth.forbidden";
    /// Catch-all for converted foreign errors (unmapped, defaults to 500).
    pub const INTERNAL: &str = "error.internal";
    /// The resolved handler does not expose the declared target method.
    pub const TARGET_NOT_CALLABLE: &str = "handler.target_not_callable";
    /// A handler panicked during invocation.
    pub const PANIC: &str = "handler.panic";
}

/// Startup-time configuration error.
///
/// Returned by descriptor construction, registry population, router
/// registration and policy configuration. Any of these terminating startup is
/// intentional: a service with a broken routing table must not serve traffic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// The HTTP method is not one of the supported set
    UnsupportedMethod {
        /// The rejected method string
        method: String,
    },
    /// The URL pattern is empty or not valid router syntax
    InvalidUrlPattern {
        /// The rejected pattern
        pattern: String,
        /// What exactly is wrong with it
        reason: String,
    },
    /// The descriptor names an empty target method
    EmptyTarget {
        /// Pattern of the offending descriptor
        pattern: String,
    },
    /// A handler id was registered twice
    DuplicateHandler {
        /// The already-registered handler id
        handler_id: String,
    },
    /// A handler was registered with an empty descriptor list
    NoRoutes {
        /// The offending handler id
        handler_id: String,
    },
    /// Two routes were registered under the same name
    DuplicateRouteName {
        /// The clashing route name
        name: String,
    },
    /// The handler instance does not expose the declared target method
    TargetNotCallable {
        /// Handler id the descriptor belongs to
        handler_id: String,
        /// URL pattern of the offending descriptor
        url_pattern: String,
        /// The missing target method name
        target: String,
    },
    /// A status code outside the valid HTTP range was registered
    InvalidStatusCode {
        /// The rejected status code
        status: u16,
    },
    /// A handler source failed to produce its declarations
    Source {
        /// Source-supplied failure description
        detail: String,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::UnsupportedMethod { method } => {
                write!(
                    f,
                    "unsupported HTTP method '{}': expected one of GET, POST, PUT, PATCH, \
                     DELETE, OPTIONS, HEAD",
                    method
                )
            }
            ConfigError::InvalidUrlPattern { pattern, reason } => {
                write!(f, "invalid URL pattern '{}': {}", pattern, reason)
            }
            ConfigError::EmptyTarget { pattern } => {
                write!(f, "route '{}' declares an empty target method", pattern)
            }
            ConfigError::DuplicateHandler { handler_id } => {
                write!(f, "handler '{}' is already registered", handler_id)
            }
            ConfigError::NoRoutes { handler_id } => {
                write!(f, "handler '{}' declares no routes", handler_id)
            }
            ConfigError::DuplicateRouteName { name } => {
                write!(f, "route name '{}' is already taken", name)
            }
            ConfigError::TargetNotCallable {
                handler_id,
                url_pattern,
                target,
            } => {
                write!(
                    f,
                    "handler '{}' does not expose target method '{}' declared for '{}'",
                    handler_id, target, url_pattern
                )
            }
            ConfigError::InvalidStatusCode { status } => {
                write!(f, "status code {} is outside the valid range 100..=599", status)
            }
            ConfigError::Source { detail } => {
                write!(f, "handler source failed: {}", detail)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Request-time error value carried from handlers to the error responder.
///
/// Identified by a `kind` string (exact-match key into the exception policy),
/// with a human-readable message, an optional non-zero application code and a
/// backtrace captured at construction for gated debug disclosure.
#[derive(Debug, Clone)]
pub struct HandlerError {
    kind: String,
    message: String,
    code: u64,
    trace: Vec<String>,
}

impl HandlerError {
    /// Create an error with the given kind identifier and message.
    ///
    /// Captures a backtrace eagerly; errors are off the hot path, so the
    /// capture cost is acceptable.
    #[must_use]
    pub fn new(kind: impl Into<String>, message: impl Into<String>) -> Self {
        let trace = std::backtrace::Backtrace::force_capture()
            .to_string()
            .lines()
            .map(str::to_owned)
            .collect();
        Self {
            kind: kind.into(),
            message: message.into(),
            code: 0,
            trace,
        }
    }

    /// Attach a non-zero application error code.
    #[must_use]
    pub fn with_code(mut self, code: u64) -> Self {
        self.code = code;
        self
    }

    /// Fully-qualified kind identifier used for policy lookup.
    #[must_use]
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// Human-readable message. Suppressed for unmapped (500) errors unless
    /// debug disclosure is granted.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Application error code; `0` means none.
    #[must_use]
    pub fn code(&self) -> u64 {
        self.code
    }

    /// Backtrace captured at construction, one frame per line.
    #[must_use]
    pub fn trace(&self) -> &[String] {
        &self.trace
    }
}

impl fmt::Display for HandlerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

impl std::error::Error for HandlerError {}

impl From<anyhow::Error> for HandlerError {
    fn from(err: anyhow::Error) -> Self {
        HandlerError::new(kind::INTERNAL, format!("{err:#}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handler_error_accessors() {
        let err = HandlerError::new(kind::BAD_REQUEST, "missing field").with_code(42);
        assert_eq!(err.kind(), kind::BAD_REQUEST);
        assert_eq!(err.message(), "missing field");
        assert_eq!(err.code(), 42);
        assert!(!err.trace().is_empty());
    }

    #[test]
    fn test_anyhow_conversion_uses_internal_kind() {
        let err: HandlerError = anyhow::anyhow!("db unreachable").into();
        assert_eq!(err.kind(), kind::INTERNAL);
        assert_eq!(err.message(), "db unreachable");
    }

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::DuplicateHandler {
            handler_id: "pets".to_string(),
        };
        assert_eq!(err.to_string(), "handler 'pets' is already registered");
    }
}

//! Exception-to-status registry and the debug disclosure gate.

use crate::dispatcher::HandlerRequest;
use crate::error::{kind, HandlerError};
use std::collections::HashMap;
use tracing::info;

/// Status returned for any error kind with no registered mapping.
pub const DEFAULT_ERROR_STATUS: u16 = 500;

/// Header match required before stack traces may be disclosed.
///
/// The expected value comparison is exact: case-sensitive, no trimming.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DebugGate {
    header_name: String,
    expected_value: String,
}

/// Registry mapping error kinds to HTTP status codes, plus the debug gate.
///
/// Configured during startup, before requests are served, and read-only
/// afterwards. Lookup is exact-kind only — there is no hierarchy walk, so
/// every concrete kind an application wants mapped must be registered
/// explicitly. Anything unregistered answers 500 with its message
/// suppressed, which is the safe default for unknown failures.
#[derive(Debug, Clone)]
pub struct ExceptionPolicy {
    statuses: HashMap<String, u16>,
    gate: Option<DebugGate>,
}

impl Default for ExceptionPolicy {
    /// Policy pre-registering the three conventional application kinds:
    /// [`kind::BAD_REQUEST`] → 400, [`kind::UNAUTHORIZED`] → 401,
    /// [`kind::FORBIDDEN`] → 403.
    fn default() -> Self {
        let mut statuses = HashMap::new();
        statuses.insert(kind::BAD_REQUEST.to_string(), 400);
        statuses.insert(kind::UNAUTHORIZED.to_string(), 401);
        statuses.insert(kind::FORBIDDEN.to_string(), 403);
        Self {
            statuses,
            gate: None,
        }
    }
}

impl ExceptionPolicy {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Map one error kind to a status code. Later calls for the same kind
    /// overwrite earlier ones.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::ConfigError::InvalidStatusCode`] for codes
    /// outside 100..=599.
    pub fn set_status(
        &mut self,
        exception_kind: impl Into<String>,
        status: u16,
    ) -> Result<(), crate::error::ConfigError> {
        if !(100..=599).contains(&status) {
            return Err(crate::error::ConfigError::InvalidStatusCode { status });
        }
        let exception_kind = exception_kind.into();
        info!(kind = %exception_kind, status = status, "Exception status registered");
        self.statuses.insert(exception_kind, status);
        Ok(())
    }

    /// Map several kinds to the same status code.
    ///
    /// # Errors
    ///
    /// Same as [`ExceptionPolicy::set_status`].
    pub fn set_statuses(
        &mut self,
        exception_kinds: &[&str],
        status: u16,
    ) -> Result<(), crate::error::ConfigError> {
        for k in exception_kinds {
            self.set_status(*k, status)?;
        }
        Ok(())
    }

    /// Status for the error's concrete kind; [`DEFAULT_ERROR_STATUS`] when
    /// unregistered.
    #[must_use]
    pub fn status_for(&self, error: &HandlerError) -> u16 {
        self.statuses
            .get(error.kind())
            .copied()
            .unwrap_or(DEFAULT_ERROR_STATUS)
    }

    /// Configure the debug gate. An empty header name clears it, disabling
    /// detail disclosure entirely regardless of request headers.
    pub fn set_debug_gate(&mut self, header_name: &str, expected_value: &str) {
        if header_name.is_empty() {
            self.gate = None;
            info!("Debug gate cleared");
        } else {
            info!(header = %header_name, "Debug gate configured");
            self.gate = Some(DebugGate {
                header_name: header_name.to_string(),
                expected_value: expected_value.to_string(),
            });
        }
    }

    /// Whether this request may see error details: the gate must be set and
    /// the request's first value for the gate header must equal the expected
    /// value exactly (case-sensitive, no trimming). Header name lookup is
    /// case-insensitive per HTTP.
    #[must_use]
    pub fn should_disclose(&self, req: &HandlerRequest) -> bool {
        let Some(gate) = &self.gate else {
            return false;
        };
        req.get_header(&gate.header_name) == Some(gate.expected_value.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConfigError;
    use crate::ids::RequestId;
    use crate::router::ParamVec;
    use http::Method;
    use std::sync::Arc;

    fn request_with_header(name: &str, value: &str) -> HandlerRequest {
        let mut headers = crate::dispatcher::HeaderVec::new();
        headers.push((Arc::from(name), value.to_string()));
        HandlerRequest {
            request_id: RequestId::new(),
            method: Method::GET,
            path: "/".to_string(),
            headers,
            cookies: crate::dispatcher::HeaderVec::new(),
            query_params: ParamVec::new(),
            body: None,
        }
    }

    #[test]
    fn test_default_policy_maps_conventional_kinds() {
        let policy = ExceptionPolicy::new();
        let cases = [
            (kind::BAD_REQUEST, 400),
            (kind::UNAUTHORIZED, 401),
            (kind::FORBIDDEN, 403),
        ];
        for (k, status) in cases {
            let err = HandlerError::new(k, "x");
            assert_eq!(policy.status_for(&err), status, "kind {k}");
        }
    }

    #[test]
    fn test_unmapped_kind_defaults_to_500() {
        let policy = ExceptionPolicy::new();
        let err = HandlerError::new("app.surprise", "x");
        assert_eq!(policy.status_for(&err), 500);
    }

    #[test]
    fn test_later_registration_overwrites() {
        let mut policy = ExceptionPolicy::new();
        policy.set_status("app.conflict", 409).unwrap();
        policy.set_status("app.conflict", 422).unwrap();
        let err = HandlerError::new("app.conflict", "x");
        assert_eq!(policy.status_for(&err), 422);
    }

    #[test]
    fn test_exact_match_only_no_prefix_walk() {
        let mut policy = ExceptionPolicy::new();
        policy.set_status("app.io", 503).unwrap();
        let err = HandlerError::new("app.io.timeout", "x");
        assert_eq!(policy.status_for(&err), 500);
    }

    #[test]
    fn test_status_range_validated() {
        let mut policy = ExceptionPolicy::new();
        assert!(matches!(
            policy.set_status("app.x", 99).unwrap_err(),
            ConfigError::InvalidStatusCode { status: 99 }
        ));
        assert!(matches!(
            policy.set_status("app.x", 600).unwrap_err(),
            ConfigError::InvalidStatusCode { status: 600 }
        ));
    }

    #[test]
    fn test_gate_requires_exact_value() {
        let mut policy = ExceptionPolicy::new();
        policy.set_debug_gate("X-Debug", "secret1");
        assert!(policy.should_disclose(&request_with_header("x-debug", "secret1")));
        assert!(!policy.should_disclose(&request_with_header("x-debug", "secret2")));
        assert!(!policy.should_disclose(&request_with_header("x-debug", "Secret1")));
        assert!(!policy.should_disclose(&request_with_header("x-debug", " secret1")));
        assert!(!policy.should_disclose(&request_with_header("x-other", "secret1")));
    }

    #[test]
    fn test_empty_header_name_clears_gate() {
        let mut policy = ExceptionPolicy::new();
        policy.set_debug_gate("X-Debug", "secret1");
        policy.set_debug_gate("", "ignored");
        assert!(!policy.should_disclose(&request_with_header("x-debug", "secret1")));
    }
}

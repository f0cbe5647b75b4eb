//! Terminal error handlers building the structured JSON error responses.
//!
//! Every error response follows one stable shape:
//!
//! ```json
//! {
//!   "status": "error",
//!   "message": "...",
//!   "code": 123,
//!   "allowedMethods": ["GET", "POST"],
//!   "details": {"exception": "...", "message": "...", "stacktrace": ["..."]}
//! }
//! ```
//!
//! `code`, `allowedMethods` and `details` appear only where applicable.

use crate::dispatcher::{HandlerRequest, HandlerResponse};
use crate::error::HandlerError;
use crate::policy::{ExceptionPolicy, DEFAULT_ERROR_STATUS};
use http::Method;
use serde_json::json;
use std::sync::Arc;
use tracing::{info, warn};

/// Message replacing internal messages of unmapped (500) errors.
pub const GENERIC_ERROR_MESSAGE: &str = "An unexpected error occurred";
/// Fixed 404 body message, independent of path and method.
pub const NOT_FOUND_MESSAGE: &str = "Resource not found";
/// Fixed 405 body message.
pub const METHOD_NOT_ALLOWED_MESSAGE: &str = "Method not allowed";

/// The three terminal response handlers: generic error, not-found and
/// method-not-allowed.
///
/// `display_details` is the server-level half of the disclosure double gate;
/// the per-request half lives in [`ExceptionPolicy::should_disclose`]. Both
/// must hold before any stack trace leaves the process — a misconfigured
/// server-wide flag alone never leaks traces to arbitrary clients.
#[derive(Clone)]
pub struct ErrorResponder {
    policy: Arc<ExceptionPolicy>,
    display_details: bool,
}

impl ErrorResponder {
    #[must_use]
    pub fn new(policy: Arc<ExceptionPolicy>, display_details: bool) -> Self {
        Self {
            policy,
            display_details,
        }
    }

    /// Translate a handler error into its final response.
    ///
    /// Mapped kinds (status ≠ 500) pass their message through verbatim. For
    /// the 500 path the message is replaced with [`GENERIC_ERROR_MESSAGE`]
    /// unless both disclosure gates pass, in which case the original message
    /// survives and a `details` object with kind, message and stack trace is
    /// attached.
    #[must_use]
    pub fn on_error(&self, req: &HandlerRequest, error: &HandlerError) -> HandlerResponse {
        let status = self.policy.status_for(error);
        let mut body = json!({
            "status": "error",
            "message": error.message(),
        });
        if error.code() != 0 {
            body["code"] = json!(error.code());
        }

        if status == DEFAULT_ERROR_STATUS {
            if self.display_details && self.policy.should_disclose(req) {
                warn!(
                    request_id = %req.request_id,
                    error_kind = %error.kind(),
                    "Disclosing error details to debug-gated request"
                );
                body["details"] = json!({
                    "exception": error.kind(),
                    "message": error.message(),
                    "stacktrace": error.trace(),
                });
            } else {
                body["message"] = json!(GENERIC_ERROR_MESSAGE);
            }
        }

        info!(
            request_id = %req.request_id,
            error_kind = %error.kind(),
            status = status,
            "Error translated to response"
        );
        HandlerResponse::json(status, body)
    }

    /// Fixed 404 response; no kind lookup, no request-dependent content.
    #[must_use]
    pub fn on_not_found(&self, req: &HandlerRequest) -> HandlerResponse {
        info!(
            request_id = %req.request_id,
            method = %req.method,
            path = %req.path,
            "No route matched"
        );
        HandlerResponse::json(
            404,
            json!({"status": "error", "message": NOT_FOUND_MESSAGE}),
        )
    }

    /// 405 response listing the methods registered on the request's path.
    ///
    /// Sets the `Allow` header to the comma-joined set; with an empty set
    /// (router context unavailable) the body carries `allowedMethods: []`
    /// and the header is omitted.
    #[must_use]
    pub fn on_method_not_allowed(
        &self,
        req: &HandlerRequest,
        allowed: &[Method],
    ) -> HandlerResponse {
        let methods: Vec<&str> = allowed.iter().map(Method::as_str).collect();
        info!(
            request_id = %req.request_id,
            method = %req.method,
            path = %req.path,
            allowed = ?methods,
            "Method not allowed"
        );
        let mut response = HandlerResponse::json(
            405,
            json!({
                "status": "error",
                "message": METHOD_NOT_ALLOWED_MESSAGE,
                "allowedMethods": methods,
            }),
        );
        if !methods.is_empty() {
            response.set_header("allow", methods.join(", "));
        }
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatcher::HeaderVec;
    use crate::error::kind;
    use crate::ids::RequestId;
    use crate::router::ParamVec;

    fn request(headers: &[(&str, &str)]) -> HandlerRequest {
        let mut hv = HeaderVec::new();
        for (k, v) in headers {
            hv.push((Arc::from(*k), v.to_string()));
        }
        HandlerRequest {
            request_id: RequestId::new(),
            method: Method::PUT,
            path: "/pets".to_string(),
            headers: hv,
            cookies: HeaderVec::new(),
            query_params: ParamVec::new(),
            body: None,
        }
    }

    fn responder(display_details: bool) -> ErrorResponder {
        let mut policy = ExceptionPolicy::new();
        policy.set_debug_gate("X-Debug", "secret1");
        ErrorResponder::new(Arc::new(policy), display_details)
    }

    #[test]
    fn test_mapped_kind_passes_message_through() {
        let r = responder(false);
        let err = HandlerError::new(kind::FORBIDDEN, "you shall not pass").with_code(7);
        let resp = r.on_error(&request(&[]), &err);
        assert_eq!(resp.status, 403);
        assert_eq!(resp.body["message"], "you shall not pass");
        assert_eq!(resp.body["code"], 7);
        assert!(resp.body.get("details").is_none());
    }

    #[test]
    fn test_unmapped_kind_suppresses_message() {
        let r = responder(false);
        let err = HandlerError::new("app.secret_failure", "db password wrong");
        let resp = r.on_error(&request(&[]), &err);
        assert_eq!(resp.status, 500);
        assert_eq!(resp.body["message"], GENERIC_ERROR_MESSAGE);
        assert!(resp.body.get("code").is_none());
        assert!(resp.body.get("details").is_none());
    }

    #[test]
    fn test_details_require_both_gates() {
        let err = HandlerError::new("app.boom", "internal detail");

        // flag off, header right
        let resp = responder(false).on_error(&request(&[("x-debug", "secret1")]), &err);
        assert!(resp.body.get("details").is_none());
        assert_eq!(resp.body["message"], GENERIC_ERROR_MESSAGE);

        // flag on, header wrong
        let resp = responder(true).on_error(&request(&[("x-debug", "secret2")]), &err);
        assert!(resp.body.get("details").is_none());

        // flag on, header absent
        let resp = responder(true).on_error(&request(&[]), &err);
        assert!(resp.body.get("details").is_none());

        // both gates pass
        let resp = responder(true).on_error(&request(&[("x-debug", "secret1")]), &err);
        let details = resp.body.get("details").expect("details present");
        assert_eq!(details["exception"], "app.boom");
        assert_eq!(details["message"], "internal detail");
        assert!(details["stacktrace"].as_array().is_some());
        assert_eq!(resp.body["message"], "internal detail");
    }

    #[test]
    fn test_mapped_kind_never_carries_details() {
        let r = responder(true);
        let err = HandlerError::new(kind::BAD_REQUEST, "bad field");
        let resp = r.on_error(&request(&[("x-debug", "secret1")]), &err);
        assert_eq!(resp.status, 400);
        assert!(resp.body.get("details").is_none());
    }

    #[test]
    fn test_not_found_is_fixed() {
        let r = responder(true);
        let resp = r.on_not_found(&request(&[]));
        assert_eq!(resp.status, 404);
        assert_eq!(
            resp.body,
            serde_json::json!({"status": "error", "message": NOT_FOUND_MESSAGE})
        );
    }

    #[test]
    fn test_method_not_allowed_sets_allow_header() {
        let r = responder(false);
        let resp = r.on_method_not_allowed(&request(&[]), &[Method::GET, Method::POST]);
        assert_eq!(resp.status, 405);
        assert_eq!(resp.get_header("allow"), Some("GET, POST"));
        assert_eq!(
            resp.body["allowedMethods"],
            serde_json::json!(["GET", "POST"])
        );
    }

    #[test]
    fn test_method_not_allowed_fails_closed() {
        let r = responder(false);
        let resp = r.on_method_not_allowed(&request(&[]), &[]);
        assert_eq!(resp.status, 405);
        assert_eq!(resp.get_header("allow"), None);
        assert_eq!(resp.body["allowedMethods"], serde_json::json!([]));
    }
}

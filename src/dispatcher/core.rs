//! Dispatcher core module - hot path for request dispatch.

// Deny heap allocation slips in the hot path
#![deny(clippy::inefficient_to_string)]
#![deny(clippy::format_push_string)]
#![deny(clippy::unnecessary_to_owned)]

use crate::error::{kind, ConfigError, HandlerError};
use crate::ids::RequestId;
use crate::params::ParameterBag;
use crate::registry::{ConstructionContext, HandlerRegistry};
use crate::router::{ParamVec, RouteBinding, RouteMatch, Router};
use http::Method;
use serde::Serialize;
use serde_json::Value;
use smallvec::SmallVec;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn};

/// Maximum inline headers/cookies before heap allocation.
/// Most requests have ≤16 headers.
pub const MAX_INLINE_HEADERS: usize = 16;

/// Stack-allocated header/cookie storage for the hot path.
///
/// Header names use `Arc<str>` because they are often repeated
/// (Content-Type, Authorization, ...) and `Arc::clone()` is O(1); values
/// remain `String` as they are per-request data.
pub type HeaderVec = SmallVec<[(Arc<str>, String); MAX_INLINE_HEADERS]>;

/// Request data handed to a handler's `on_request` entry point.
#[derive(Debug, Clone)]
pub struct HandlerRequest {
    /// Unique request ID for tracing and correlation
    pub request_id: RequestId,
    /// HTTP method (GET, POST, etc.)
    pub method: Method,
    /// Request path as received (query string stripped)
    pub path: String,
    /// HTTP headers (stack-allocated for ≤16 headers)
    pub headers: HeaderVec,
    /// Cookies parsed from the Cookie header
    pub cookies: HeaderVec,
    /// Query string parameters
    pub query_params: ParamVec,
    /// Request body parsed as JSON (if present)
    pub body: Option<Value>,
}

impl HandlerRequest {
    /// Get a header by name (case-insensitive per RFC 7230). Returns the
    /// first occurrence.
    #[inline]
    #[must_use]
    pub fn get_header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Get a cookie by name.
    #[inline]
    #[must_use]
    pub fn get_cookie(&self, name: &str) -> Option<&str> {
        self.cookies
            .iter()
            .find(|(k, _)| k.as_ref() == name)
            .map(|(_, v)| v.as_str())
    }

    /// Get a query parameter by name.
    ///
    /// Uses "last write wins" semantics: for `?limit=10&limit=20` this
    /// returns the last occurrence.
    #[inline]
    #[must_use]
    pub fn get_query_param(&self, name: &str) -> Option<&str> {
        self.query_params
            .iter()
            .rfind(|(k, _)| k.as_ref() == name)
            .map(|(_, v)| v.as_str())
    }
}

/// Response produced by a handler (or the error responder).
#[derive(Debug, Clone, Serialize)]
pub struct HandlerResponse {
    /// HTTP status code (200, 404, 500, etc.)
    pub status: u16,
    /// HTTP response headers (stack-allocated for ≤16 headers)
    #[serde(skip_serializing)]
    pub headers: HeaderVec,
    /// Response body as JSON
    pub body: Value,
}

impl HandlerResponse {
    /// Create a new response with the given status, headers, and body.
    #[must_use]
    pub fn new(status: u16, headers: HeaderVec, body: Value) -> Self {
        Self {
            status,
            headers,
            body,
        }
    }

    /// Create a JSON response with a default content-type header.
    #[must_use]
    pub fn json(status: u16, body: Value) -> Self {
        let mut headers = HeaderVec::new();
        headers.push((Arc::from("content-type"), "application/json".to_string()));
        Self {
            status,
            headers,
            body,
        }
    }

    /// Get a header by name (case-insensitive).
    #[inline]
    #[must_use]
    pub fn get_header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Add or update a header.
    pub fn set_header(&mut self, name: &str, value: String) {
        self.headers.retain(|(k, _)| !k.eq_ignore_ascii_case(name));
        self.headers.push((Arc::from(name), value));
    }
}

/// Dispatcher binding handler declarations to the router and invoking
/// handler instances at request time.
///
/// Holds the registry and the construction context behind `Arc` so the
/// service can be cloned per connection; everything reachable from here is
/// read-only after startup.
#[derive(Clone)]
pub struct Dispatcher {
    registry: Arc<HandlerRegistry>,
    ctx: Arc<ConstructionContext>,
}

impl Dispatcher {
    #[must_use]
    pub fn new(registry: Arc<HandlerRegistry>, ctx: ConstructionContext) -> Self {
        Self {
            registry,
            ctx: Arc::new(ctx),
        }
    }

    /// Register every `(handler_id, descriptor)` pair with the router, in
    /// registry order, preserving declaration order within a handler.
    ///
    /// Constructs each handler instance (once — the same instance serves
    /// requests later) and verifies it exposes every declared target method.
    ///
    /// Runs once at startup, single-threaded, before any request is
    /// accepted.
    ///
    /// # Errors
    ///
    /// [`ConfigError::TargetNotCallable`] when a descriptor targets a method
    /// its handler does not expose; router registration errors pass through.
    pub fn register_all(&self, router: &mut Router) -> Result<(), ConfigError> {
        for (handler_id, descriptor) in self.registry.bindings() {
            let instance = self
                .registry
                .instance(handler_id, &self.ctx)
                .ok_or_else(|| ConfigError::Source {
                    detail: format!("handler '{handler_id}' vanished during registration"),
                })?;
            if !instance.exposes(descriptor.target()) {
                return Err(ConfigError::TargetNotCallable {
                    handler_id: handler_id.to_string(),
                    url_pattern: descriptor.url_pattern().to_string(),
                    target: descriptor.target().to_string(),
                });
            }
            router.register(RouteBinding {
                handler_id: Arc::from(handler_id),
                descriptor: Arc::clone(descriptor),
            })?;
        }
        info!(
            handler_count = self.registry.len(),
            route_count = router.len(),
            "All handler routes registered"
        );
        Ok(())
    }

    /// Invoke the handler behind a route match.
    ///
    /// Merges path parameters with the descriptor's static arguments (static
    /// arguments win on collision), resolves the cached handler instance and
    /// calls its `on_request` entry point. Handler errors propagate
    /// unmodified; panics are caught and surfaced as a
    /// [`kind::PANIC`] error.
    ///
    /// # Errors
    ///
    /// Any [`HandlerError`] raised by the handler, or a
    /// [`kind::TARGET_NOT_CALLABLE`] error if the instance rejects the
    /// declared target at invocation time.
    pub fn dispatch(
        &self,
        req: &HandlerRequest,
        route: &RouteMatch,
    ) -> Result<HandlerResponse, HandlerError> {
        let binding = &route.binding;
        let descriptor = &binding.descriptor;

        debug!(
            request_id = %req.request_id,
            handler_id = %binding.handler_id,
            target = %descriptor.target(),
            "Handler lookup"
        );

        let instance = self
            .registry
            .instance(&binding.handler_id, &self.ctx)
            .ok_or_else(|| {
                HandlerError::new(
                    kind::TARGET_NOT_CALLABLE,
                    format!("no handler registered as '{}'", binding.handler_id),
                )
            })?;
        if !instance.exposes(descriptor.target()) {
            return Err(HandlerError::new(
                kind::TARGET_NOT_CALLABLE,
                format!(
                    "handler '{}' does not expose target method '{}' for '{}'",
                    binding.handler_id,
                    descriptor.target(),
                    descriptor.url_pattern()
                ),
            ));
        }

        let params = ParameterBag::merged(&route.path_params, descriptor.static_args());

        info!(
            request_id = %req.request_id,
            handler_id = %binding.handler_id,
            target = %descriptor.target(),
            method = %req.method,
            path = %req.path,
            param_count = params.len(),
            "Handler invocation start"
        );

        let start = Instant::now();
        let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            instance.on_request(req, &params, descriptor.target())
        }));
        let latency_ms = start.elapsed().as_millis() as u64;

        match outcome {
            Ok(Ok(response)) => {
                info!(
                    request_id = %req.request_id,
                    handler_id = %binding.handler_id,
                    status = response.status,
                    latency_ms = latency_ms,
                    "Handler invocation complete"
                );
                Ok(response)
            }
            Ok(Err(err)) => {
                warn!(
                    request_id = %req.request_id,
                    handler_id = %binding.handler_id,
                    error_kind = %err.kind(),
                    latency_ms = latency_ms,
                    "Handler returned error"
                );
                Err(err)
            }
            Err(panic) => {
                let panic_message = panic_payload_message(panic.as_ref());
                error!(
                    request_id = %req.request_id,
                    handler_id = %binding.handler_id,
                    panic_message = %panic_message,
                    latency_ms = latency_ms,
                    "Handler panicked - CRITICAL"
                );
                Err(HandlerError::new(
                    kind::PANIC,
                    format!("handler '{}' panicked: {panic_message}", binding.handler_id),
                ))
            }
        }
    }
}

fn panic_payload_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "opaque panic payload".to_string()
    }
}

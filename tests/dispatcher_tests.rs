use http::Method;
use serde_json::json;
use std::sync::Arc;
use swerve::dispatcher::{Dispatcher, HandlerRequest, HandlerResponse, HeaderVec};
use swerve::error::kind;
use swerve::ids::RequestId;
use swerve::params::ParameterBag;
use swerve::registry::{ConstructionContext, Handler, HandlerRegistry};
use swerve::router::{ParamVec, RouteOutcome, Router};
use swerve::{ConfigError, HandlerError, RouteDescriptor};

use tracing_util::TestTracing;

/// Echoes the merged parameter bag and the invoked target back as JSON.
/// `boom` raises the error kind named by the `fault` parameter and `blow_up`
/// panics outright.
struct EchoHandler;

impl Handler for EchoHandler {
    fn on_request(
        &self,
        req: &HandlerRequest,
        params: &ParameterBag,
        target: &str,
    ) -> Result<HandlerResponse, HandlerError> {
        match target {
            "boom" => {
                let fault = params.get_str("fault").unwrap_or("error.internal");
                Err(HandlerError::new(fault, "it broke"))
            }
            "blow_up" => panic!("stack overflow imminent"),
            _ => Ok(HandlerResponse::json(
                200,
                json!({
                    "target": target,
                    "path": req.path,
                    "params": params.clone().into_value(),
                }),
            )),
        }
    }

    fn exposes(&self, target: &str) -> bool {
        matches!(target, "show" | "list" | "boom" | "blow_up")
    }
}

fn request(method: Method, path: &str) -> HandlerRequest {
    HandlerRequest {
        request_id: RequestId::new(),
        method,
        path: path.to_string(),
        headers: HeaderVec::new(),
        cookies: HeaderVec::new(),
        query_params: ParamVec::new(),
        body: None,
    }
}

fn echo_registry(descriptors: Vec<RouteDescriptor>) -> HandlerRegistry {
    let mut registry = HandlerRegistry::new();
    registry
        .register("echo", descriptors, Box::new(|_ctx| Arc::new(EchoHandler)))
        .unwrap();
    registry
}

fn wired(descriptors: Vec<RouteDescriptor>) -> (Dispatcher, Router) {
    let dispatcher = Dispatcher::new(
        Arc::new(echo_registry(descriptors)),
        ConstructionContext::default(),
    );
    let mut router = Router::new();
    dispatcher.register_all(&mut router).unwrap();
    (dispatcher, router)
}

fn must_match(router: &Router, method: Method, path: &str) -> swerve::router::RouteMatch {
    match router.route(&method, path) {
        RouteOutcome::Match(m) => m,
        other => panic!("expected a match for {path}, got {other:?}"),
    }
}

#[test]
fn test_register_all_fills_router_in_declaration_order() {
    let _tracing = TestTracing::init();
    let (_, router) = wired(vec![
        RouteDescriptor::new("GET", "/pets/{id}", "show").unwrap(),
        RouteDescriptor::new("GET", "/pets", "list").unwrap(),
    ]);
    assert_eq!(router.len(), 2);
    let m = must_match(&router, Method::GET, "/pets/42");
    assert_eq!(m.binding.descriptor.target(), "show");
    assert_eq!(m.get_path_param("id"), Some("42"));
}

#[test]
fn test_dispatch_merges_path_params_and_static_args() {
    let _tracing = TestTracing::init();
    let (dispatcher, router) = wired(vec![RouteDescriptor::new("GET", "/pets/{id}", "show")
        .unwrap()
        .with_static_arg("source", json!("catalog"))
        .with_static_arg("tags", json!(["cute", "small"]))]);

    let req = request(Method::GET, "/pets/42");
    let m = must_match(&router, Method::GET, "/pets/42");
    let resp = dispatcher.dispatch(&req, &m).unwrap();

    assert_eq!(resp.status, 200);
    assert_eq!(resp.body["target"], "show");
    assert_eq!(resp.body["params"]["id"], "42");
    assert_eq!(resp.body["params"]["source"], "catalog");
    // arrays arrive as index-keyed nested bags
    assert_eq!(resp.body["params"]["tags"], json!({"0": "cute", "1": "small"}));
}

#[test]
fn test_static_args_override_path_params() {
    let _tracing = TestTracing::init();
    let (dispatcher, router) = wired(vec![RouteDescriptor::new("GET", "/pets/{id}", "show")
        .unwrap()
        .with_static_arg("id", json!("pinned"))]);

    let req = request(Method::GET, "/pets/42");
    let m = must_match(&router, Method::GET, "/pets/42");
    let resp = dispatcher.dispatch(&req, &m).unwrap();
    assert_eq!(resp.body["params"]["id"], "pinned");
}

#[test]
fn test_handler_error_passes_through_unmodified() {
    let _tracing = TestTracing::init();
    let (dispatcher, router) = wired(vec![RouteDescriptor::new("GET", "/boom", "boom")
        .unwrap()
        .with_static_arg("fault", json!("auth.forbidden"))]);

    let req = request(Method::GET, "/boom");
    let m = must_match(&router, Method::GET, "/boom");
    let err = dispatcher.dispatch(&req, &m).unwrap_err();
    assert_eq!(err.kind(), "auth.forbidden");
    assert_eq!(err.message(), "it broke");
}

#[test]
fn test_handler_panic_becomes_error() {
    let _tracing = TestTracing::init();
    let (dispatcher, router) =
        wired(vec![RouteDescriptor::new("GET", "/blow-up", "blow_up").unwrap()]);

    let req = request(Method::GET, "/blow-up");
    let m = must_match(&router, Method::GET, "/blow-up");
    let err = dispatcher.dispatch(&req, &m).unwrap_err();
    assert_eq!(err.kind(), kind::PANIC);
    assert!(err.message().contains("stack overflow imminent"));
}

#[test]
fn test_undeclared_target_aborts_registration() {
    let _tracing = TestTracing::init();
    let registry = echo_registry(vec![
        RouteDescriptor::new("GET", "/pets", "list").unwrap(),
        RouteDescriptor::new("GET", "/pets/{id}", "missing_method").unwrap(),
    ]);
    let dispatcher = Dispatcher::new(Arc::new(registry), ConstructionContext::default());
    let mut router = Router::new();
    let err = dispatcher.register_all(&mut router).unwrap_err();
    match err {
        ConfigError::TargetNotCallable {
            handler_id, target, ..
        } => {
            assert_eq!(handler_id, "echo");
            assert_eq!(target, "missing_method");
        }
        other => panic!("expected TargetNotCallable, got {other}"),
    }
}

#[test]
fn test_405_outcome_exposes_allowed_methods() {
    let _tracing = TestTracing::init();
    let (_, router) = wired(vec![
        RouteDescriptor::new("GET", "/pets", "list").unwrap(),
        RouteDescriptor::new("GET", "/pets/{id}", "show").unwrap(),
    ]);
    match router.route(&Method::DELETE, "/pets") {
        RouteOutcome::MethodNotAllowed { allowed } => assert_eq!(allowed, vec![Method::GET]),
        other => panic!("expected 405 outcome, got {other:?}"),
    }
}

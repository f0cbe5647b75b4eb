use super::request::{parse_request, ParsedRequest};
use super::response::{write_handler_response, write_json};
use crate::dispatcher::{Dispatcher, HandlerRequest};
use crate::ids::RequestId;
use crate::responder::ErrorResponder;
use crate::router::{RouteOutcome, Router};
use http::Method;
use may_minihttp::{HttpService, Request, Response};
use serde_json::json;
use std::io;
use std::sync::Arc;

/// The HTTP service wiring router, dispatcher and error responder together.
///
/// Per-request flow: parse → route → dispatch → write, with every failure
/// funneled through exactly one of the responder's three terminal handlers.
/// All shared state is read-only after startup, so clones are cheap and the
/// service is safe under concurrent coroutines.
#[derive(Clone)]
pub struct AppService {
    pub router: Arc<Router>,
    pub dispatcher: Arc<Dispatcher>,
    pub responder: Arc<ErrorResponder>,
}

impl AppService {
    #[must_use]
    pub fn new(
        router: Arc<Router>,
        dispatcher: Arc<Dispatcher>,
        responder: Arc<ErrorResponder>,
    ) -> Self {
        Self {
            router,
            dispatcher,
            responder,
        }
    }
}

impl HttpService for AppService {
    fn call(&mut self, req: Request, res: &mut Response) -> io::Result<()> {
        let ParsedRequest {
            method,
            path,
            headers,
            cookies,
            query_params,
            body,
        } = parse_request(req);

        if method == "GET" && path == "/health" {
            write_json(res, 200, json!({ "status": "ok" }));
            return Ok(());
        }

        let Ok(method) = method.parse::<Method>() else {
            write_json(
                res,
                400,
                json!({"status": "error", "message": "Malformed request"}),
            );
            return Ok(());
        };

        let request_id = RequestId::from_header_or_new(
            headers
                .iter()
                .find(|(k, _)| k.as_ref() == "x-request-id")
                .map(|(_, v)| v.as_str()),
        );
        let handler_req = HandlerRequest {
            request_id,
            method: method.clone(),
            path: path.clone(),
            headers,
            cookies,
            query_params,
            body,
        };

        let response = match self.router.route(&method, &path) {
            RouteOutcome::Match(route_match) => {
                match self.dispatcher.dispatch(&handler_req, &route_match) {
                    Ok(response) => response,
                    Err(err) => self.responder.on_error(&handler_req, &err),
                }
            }
            RouteOutcome::MethodNotAllowed { allowed } => self
                .responder
                .on_method_not_allowed(&handler_req, &allowed),
            RouteOutcome::NotFound => self.responder.on_not_found(&handler_req),
        };

        write_handler_response(res, &response);
        Ok(())
    }
}

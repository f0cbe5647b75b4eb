//! HTTP server glue: request parsing, response writing and the
//! `may_minihttp` service tying router, dispatcher and error responder
//! together.

pub mod http_server;
pub mod request;
pub mod response;
pub mod service;

pub use http_server::{HttpServer, ServerHandle};
pub use request::{parse_request, ParsedRequest};
pub use service::AppService;

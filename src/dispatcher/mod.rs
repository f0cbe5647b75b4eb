//! # Dispatcher Module
//!
//! Translates registered handler bindings into router registrations and
//! drives handler invocation at request time.
//!
//! ## Registration flow
//!
//! [`Dispatcher::register_all`] walks the registry's bindings in
//! registration order and registers one route per `(handler_id, descriptor)`
//! pair. It also constructs each handler instance once and verifies every
//! declared target method is actually exposed, so a typo in a route
//! declaration aborts startup instead of surfacing as a request-time 500.
//!
//! ## Request flow
//!
//! 1. The server matches a request via the [`router`](crate::router)
//! 2. [`Dispatcher::dispatch`] merges router-extracted path parameters with
//!    the descriptor's static arguments into a [`ParameterBag`](crate::params::ParameterBag)
//! 3. The cached handler instance's `on_request` entry point is invoked
//! 4. Errors (and caught panics) propagate unmodified to the
//!    [`ErrorResponder`](crate::responder::ErrorResponder) — the dispatcher
//!    performs no error translation itself

mod core;

pub use core::{
    Dispatcher, HandlerRequest, HandlerResponse, HeaderVec, MAX_INLINE_HEADERS,
};

//! # Router Module
//!
//! Path matching and route resolution. Route bindings are registered in the
//! exact order handlers declared them and matched with compiled regex
//! patterns, so overlapping patterns resolve to the first registration.
//!
//! ## Overview
//!
//! The router is responsible for:
//! - Compiling URL patterns (e.g. `/pets/{id}`) into anchored regexes
//! - Matching incoming requests in registration order
//! - Extracting path parameters from matched routes
//! - Reporting the allowed-method set when a path matches but the method
//!   does not (the 405 signal consumed by the error responder)
//! - Reconstructing URLs for named routes
//!
//! ## Example
//!
//! ```rust,ignore
//! use swerve::router::{RouteOutcome, Router};
//!
//! match router.route(&http::Method::GET, "/pets/123") {
//!     RouteOutcome::Match(m) => println!("handler: {}", m.binding.handler_id),
//!     RouteOutcome::MethodNotAllowed { allowed } => println!("allowed: {allowed:?}"),
//!     RouteOutcome::NotFound => println!("no route"),
//! }
//! ```

mod core;

pub use core::{ParamVec, RouteBinding, RouteMatch, RouteOutcome, Router, MAX_INLINE_PARAMS};

//! # swerve
//!
//! **swerve** is a route-registration and error-translation engine for
//! coroutine-powered HTTP services, built on the `may` runtime and
//! `may_minihttp`.
//!
//! ## Overview
//!
//! Handlers declare their routes as [`RouteDescriptor`]s; the
//! [`HandlerRegistry`](registry::HandlerRegistry) owns those declarations
//! and one lazily constructed instance per handler; the
//! [`Dispatcher`](dispatcher::Dispatcher) turns every declaration into a
//! [`Router`](router::Router) registration and invokes the handler's
//! uniform `on_request` entry point with a merged
//! [`ParameterBag`](params::ParameterBag). Every error raised while serving
//! a request funnels through a single catch point, where the
//! [`ErrorResponder`](responder::ErrorResponder) consults the
//! [`ExceptionPolicy`](policy::ExceptionPolicy) to translate it into a
//! structured JSON response.
//!
//! ## Architecture
//!
//! - **[`descriptor`]** - immutable route declarations with validation
//! - **[`registry`]** - handler bindings, factories and shared instances
//! - **[`router`]** - regex path matching, registration-order resolution,
//!   405 detection and named-route URL reconstruction
//! - **[`dispatcher`]** - route registration and handler invocation
//! - **[`params`]** - the per-request parameter bag
//! - **[`policy`]** - exception kind → status registry and debug gate
//! - **[`responder`]** - the three terminal error handlers
//! - **[`server`]** - `may_minihttp` glue (parsing, writing, service loop)
//! - **[`runtime_config`]** - environment-driven coroutine configuration
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use swerve::{
//!     dispatcher::Dispatcher,
//!     policy::ExceptionPolicy,
//!     registry::{ConstructionContext, HandlerRegistry},
//!     responder::ErrorResponder,
//!     router::Router,
//!     server::{AppService, HttpServer},
//!     RouteDescriptor,
//! };
//!
//! let mut registry = HandlerRegistry::new();
//! registry.register(
//!     "pets",
//!     vec![RouteDescriptor::new("GET", "/pets/{id}", "show")?],
//!     Box::new(|_ctx| Arc::new(PetsHandler::default())),
//! )?;
//!
//! let dispatcher = Dispatcher::new(Arc::new(registry), ConstructionContext::default());
//! let mut router = Router::new();
//! dispatcher.register_all(&mut router)?;
//!
//! let mut policy = ExceptionPolicy::new();
//! policy.set_status("pets.not_found", 404)?;
//! let responder = ErrorResponder::new(Arc::new(policy), false);
//!
//! let service = AppService::new(Arc::new(router), Arc::new(dispatcher), Arc::new(responder));
//! let handle = HttpServer(service).start("0.0.0.0:8080")?;
//! handle.join().ok();
//! ```
//!
//! ## Error translation
//!
//! Request-time errors are [`HandlerError`] values identified by a kind
//! string. Kinds registered with the policy map to their status with the
//! message passed through verbatim; everything else answers 500 with a
//! generic message. Stack traces are disclosed only when the server-level
//! detail flag **and** the per-request debug header gate both pass.
//!
//! ## Runtime considerations
//!
//! swerve uses the `may` coroutine runtime, not tokio. Handlers run inside
//! server coroutines; stack size is configurable via `SWERVE_STACK_SIZE`.

pub mod descriptor;
pub mod dispatcher;
pub mod error;
pub mod ids;
pub mod params;
pub mod policy;
pub mod registry;
pub mod responder;
pub mod router;
pub mod runtime_config;
pub mod server;

pub use descriptor::{RouteDescriptor, SUPPORTED_METHODS};
pub use error::{kind, ConfigError, HandlerError};
pub use params::ParameterBag;

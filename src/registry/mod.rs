//! # Registry Module
//!
//! Maps handler ids to their declared routes and their lazily constructed
//! instances. One instance exists per handler id for the lifetime of the
//! registry and is shared by every route bound to it, across concurrent
//! requests.
//!
//! ## Handler contract
//!
//! A handler exposes one uniform entry point,
//! [`Handler::on_request`](crate::registry::Handler::on_request), which
//! receives the request, the merged parameter bag and the target method name
//! declared by the matched route. [`Handler::exposes`] is the capability
//! check the dispatcher runs at registration time before any traffic is
//! accepted.
//!
//! ## Discovery
//!
//! How handlers are found is not this crate's concern. Anything that can
//! yield [`HandlerDeclaration`]s — a static list, a build-script artifact, a
//! plugin system — implements [`HandlerSource`] and is fed to
//! [`HandlerRegistry::register_source`].

mod core;

pub use core::{
    ConstructionContext, Handler, HandlerDeclaration, HandlerFactory, HandlerRegistry,
    HandlerSource,
};

use crate::descriptor::RouteDescriptor;
use crate::dispatcher::{HandlerRequest, HandlerResponse};
use crate::error::{ConfigError, HandlerError};
use crate::params::ParameterBag;
use once_cell::sync::OnceCell;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};

/// Trait implemented by handler types.
///
/// One instance serves every route declared by its handler id, concurrently,
/// so implementations must be `Send + Sync` and keep per-request state out of
/// `self`.
pub trait Handler: Send + Sync {
    /// Uniform entry point invoked by the dispatcher for every matched
    /// route. `target` is the method name the matched descriptor declared;
    /// handlers with a single route can ignore it.
    fn on_request(
        &self,
        req: &HandlerRequest,
        params: &ParameterBag,
        target: &str,
    ) -> Result<HandlerResponse, HandlerError>;

    /// Whether this handler exposes the named target method. Checked once
    /// per descriptor during route registration; declaring a target the
    /// handler does not expose aborts startup.
    fn exposes(&self, target: &str) -> bool;
}

/// Opaque application context handed to handler factories at construction.
///
/// Built once at startup and treated as immutable; factories pick out what
/// they need (connection strings, feature flags, ...).
#[derive(Debug, Clone, Default)]
pub struct ConstructionContext {
    /// Application-defined settings blob
    pub settings: Value,
}

impl ConstructionContext {
    #[must_use]
    pub fn new(settings: Value) -> Self {
        Self { settings }
    }
}

/// Constructor for a handler instance. Called at most once per handler id.
pub type HandlerFactory = Box<dyn Fn(&ConstructionContext) -> Arc<dyn Handler> + Send + Sync>;

/// Everything needed to register one handler: its id, its declared routes in
/// declaration order, and the factory that builds its instance.
pub struct HandlerDeclaration {
    pub handler_id: String,
    pub descriptors: Vec<RouteDescriptor>,
    pub factory: HandlerFactory,
}

/// Pluggable producer of handler declarations.
///
/// Keeps discovery mechanics (filesystem scanning, codegen output, static
/// tables) out of the core: the registry only consumes the resulting
/// declarations.
pub trait HandlerSource {
    /// Produce the declarations, in the order they should be registered.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the source cannot enumerate its handlers;
    /// this aborts startup.
    fn declarations(&self) -> Result<Vec<HandlerDeclaration>, ConfigError>;
}

struct HandlerEntry {
    descriptors: Vec<Arc<RouteDescriptor>>,
    factory: HandlerFactory,
    instance: OnceCell<Arc<dyn Handler>>,
}

/// Registry of handler bindings and their shared instances.
///
/// Populated single-threaded at startup; after that it is read-only and safe
/// to share behind an `Arc`. Instance construction is deferred to first use
/// and guaranteed to happen exactly once per handler id even under
/// concurrent first access.
#[derive(Default)]
pub struct HandlerRegistry {
    entries: Vec<(String, HandlerEntry)>,
    index: HashMap<String, usize>,
}

impl HandlerRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler with its declared routes.
    ///
    /// Registering an id twice is a hard error, never a silent overwrite: a
    /// duplicate almost always means two components fighting over the same
    /// id, and the loser would be invisible at runtime.
    ///
    /// # Errors
    ///
    /// [`ConfigError::DuplicateHandler`] if the id exists,
    /// [`ConfigError::NoRoutes`] if `descriptors` is empty.
    pub fn register(
        &mut self,
        handler_id: impl Into<String>,
        descriptors: Vec<RouteDescriptor>,
        factory: HandlerFactory,
    ) -> Result<(), ConfigError> {
        let handler_id = handler_id.into();
        if self.index.contains_key(&handler_id) {
            return Err(ConfigError::DuplicateHandler { handler_id });
        }
        if descriptors.is_empty() {
            return Err(ConfigError::NoRoutes { handler_id });
        }

        info!(
            handler_id = %handler_id,
            route_count = descriptors.len(),
            total_handlers = self.entries.len() + 1,
            "Handler registered"
        );

        self.index.insert(handler_id.clone(), self.entries.len());
        self.entries.push((
            handler_id,
            HandlerEntry {
                descriptors: descriptors.into_iter().map(Arc::new).collect(),
                factory,
                instance: OnceCell::new(),
            },
        ));
        Ok(())
    }

    /// Drain a [`HandlerSource`] into the registry, preserving its order.
    ///
    /// # Errors
    ///
    /// Propagates source failures and per-handler registration errors.
    pub fn register_source(&mut self, source: &dyn HandlerSource) -> Result<(), ConfigError> {
        for declaration in source.declarations()? {
            self.register(
                declaration.handler_id,
                declaration.descriptors,
                declaration.factory,
            )?;
        }
        Ok(())
    }

    /// Get the handler instance for `handler_id`, constructing it on first
    /// access. Construction happens exactly once; concurrent first callers
    /// all observe the same `Arc`.
    #[must_use]
    pub fn instance(
        &self,
        handler_id: &str,
        ctx: &ConstructionContext,
    ) -> Option<Arc<dyn Handler>> {
        let (_, entry) = &self.entries[*self.index.get(handler_id)?];
        let instance = entry.instance.get_or_init(|| {
            debug!(handler_id = %handler_id, "Constructing handler instance");
            (entry.factory)(ctx)
        });
        Some(Arc::clone(instance))
    }

    /// Lazy sequence of `(handler_id, descriptor)` pairs in registration
    /// order, declaration order within a handler.
    pub fn bindings(&self) -> impl Iterator<Item = (&str, &Arc<RouteDescriptor>)> {
        self.entries.iter().flat_map(|(id, entry)| {
            entry
                .descriptors
                .iter()
                .map(move |descriptor| (id.as_str(), descriptor))
        })
    }

    #[must_use]
    pub fn contains(&self, handler_id: &str) -> bool {
        self.index.contains_key(handler_id)
    }

    /// Registered handler ids in registration order.
    pub fn handler_ids(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(id, _)| id.as_str())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

//! Router core module - hot path for request routing.

// Deny heap allocation slips in the hot path
#![deny(clippy::inefficient_to_string)]
#![deny(clippy::format_push_string)]
#![deny(clippy::unnecessary_to_owned)]

use crate::descriptor::RouteDescriptor;
use crate::error::ConfigError;
use http::Method;
use regex::Regex;
use smallvec::SmallVec;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Maximum number of path parameters before heap allocation.
/// Most REST APIs have ≤4 path params (e.g. /users/{id}/posts/{post_id}).
pub const MAX_INLINE_PARAMS: usize = 8;

/// Stack-allocated parameter storage for the hot path.
///
/// Param names use `Arc<str>` because they come from the static routing
/// table (known at startup) and `Arc::clone()` is O(1); values remain
/// `String` as they are per-request data from the URL.
pub type ParamVec = SmallVec<[(Arc<str>, String); MAX_INLINE_PARAMS]>;

/// One router registration: the owning handler id plus the descriptor the
/// registration was built from. Shared between the routing table and route
/// matches via `Arc`.
#[derive(Debug, Clone)]
pub struct RouteBinding {
    /// Id of the handler the descriptor belongs to
    pub handler_id: Arc<str>,
    /// The declared route
    pub descriptor: Arc<RouteDescriptor>,
}

/// Result of successfully matching a request path to a route.
#[derive(Debug, Clone)]
pub struct RouteMatch {
    /// The matched registration (Arc to avoid expensive clones)
    pub binding: Arc<RouteBinding>,
    /// Path parameters extracted from the URL (e.g. `{id}` → `{"id": "123"}`)
    pub path_params: ParamVec,
}

impl RouteMatch {
    /// Get a path parameter by name.
    ///
    /// Uses "last write wins" semantics: if duplicate parameter names exist
    /// at different path depths, returns the last occurrence.
    #[inline]
    #[must_use]
    pub fn get_path_param(&self, name: &str) -> Option<&str> {
        self.path_params
            .iter()
            .rfind(|(k, _)| k.as_ref() == name)
            .map(|(_, v)| v.as_str())
    }
}

/// Outcome of routing one request.
#[derive(Debug, Clone)]
pub enum RouteOutcome {
    /// A route matched; dispatch it.
    Match(RouteMatch),
    /// The path exists under other methods; answer 405 with the allowed set.
    MethodNotAllowed {
        /// Methods registered on this path, in registration order, de-duplicated
        allowed: Vec<Method>,
    },
    /// Nothing registered on this path; answer 404.
    NotFound,
}

struct RouteEntry {
    regex: Regex,
    param_names: Vec<Arc<str>>,
    binding: Arc<RouteBinding>,
}

/// Router matching HTTP requests to handler bindings with compiled regexes.
///
/// Entries are kept in registration order and the first full match wins, so
/// ambiguous overlapping patterns resolve to the earliest registration. The
/// table is built once at startup, single-threaded, and is read-only at
/// request time.
#[derive(Default)]
pub struct Router {
    routes: Vec<RouteEntry>,
    names: HashMap<String, usize>,
}

impl Router {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register one binding, compiling its URL pattern.
    ///
    /// Registration order is preserved; if the descriptor carries a name the
    /// registration becomes addressable through [`Router::url_for`].
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidUrlPattern`] if the pattern does not
    /// compile and [`ConfigError::DuplicateRouteName`] on a name clash.
    pub fn register(&mut self, binding: RouteBinding) -> Result<(), ConfigError> {
        let descriptor = &binding.descriptor;
        let (regex, param_names) = path_to_regex(descriptor.url_pattern())?;

        if let Some(name) = descriptor.name() {
            if self.names.contains_key(name) {
                return Err(ConfigError::DuplicateRouteName {
                    name: name.to_string(),
                });
            }
            self.names.insert(name.to_string(), self.routes.len());
        }

        info!(
            handler_id = %binding.handler_id,
            method = %descriptor.method(),
            pattern = %descriptor.url_pattern(),
            target = %descriptor.target(),
            route_name = descriptor.name(),
            position = self.routes.len(),
            "Route registered"
        );

        self.routes.push(RouteEntry {
            regex,
            param_names,
            binding: Arc::new(binding),
        });
        Ok(())
    }

    /// Match an HTTP request against the routing table.
    ///
    /// Entries are scanned in registration order; the first entry whose
    /// pattern and method both match wins. Entries matching only the path
    /// contribute their method to the 405 allowed set.
    #[must_use]
    pub fn route(&self, method: &Method, path: &str) -> RouteOutcome {
        debug!(method = %method, path = %path, "Route match attempt");

        let mut allowed: Vec<Method> = Vec::new();
        for entry in &self.routes {
            let Some(captures) = entry.regex.captures(path) else {
                continue;
            };
            let descriptor = &entry.binding.descriptor;
            if descriptor.method() != method {
                if !allowed.contains(descriptor.method()) {
                    allowed.push(descriptor.method().clone());
                }
                continue;
            }

            let mut path_params = ParamVec::new();
            for (i, name) in entry.param_names.iter().enumerate() {
                if let Some(value) = captures.get(i + 1) {
                    path_params.push((Arc::clone(name), value.as_str().to_string()));
                }
            }

            info!(
                method = %method,
                path = %path,
                handler_id = %entry.binding.handler_id,
                route_pattern = %descriptor.url_pattern(),
                path_params = ?path_params,
                "Route matched"
            );
            return RouteOutcome::Match(RouteMatch {
                binding: Arc::clone(&entry.binding),
                path_params,
            });
        }

        if !allowed.is_empty() {
            warn!(method = %method, path = %path, allowed = ?allowed, "Method not allowed");
            return RouteOutcome::MethodNotAllowed { allowed };
        }

        warn!(method = %method, path = %path, "No route matched");
        RouteOutcome::NotFound
    }

    /// Reconstruct the URL of a named route by substituting `{param}`
    /// segments from the given map. Returns `None` for unknown names or
    /// missing parameters.
    #[must_use]
    pub fn url_for(&self, name: &str, params: &HashMap<String, String>) -> Option<String> {
        let entry = &self.routes[*self.names.get(name)?];
        let pattern = entry.binding.descriptor.url_pattern();
        let mut url = String::with_capacity(pattern.len());
        for segment in pattern.split('/').filter(|s| !s.is_empty()) {
            url.push('/');
            if segment.starts_with('{') && segment.ends_with('}') {
                let param = &segment[1..segment.len() - 1];
                url.push_str(params.get(param)?);
            } else {
                url.push_str(segment);
            }
        }
        if url.is_empty() {
            url.push('/');
        }
        Some(url)
    }

    /// Print all registered routes to stdout. Useful for verifying the
    /// routing table at startup.
    pub fn dump_routes(&self) {
        println!("[routes] count={}", self.routes.len());
        for entry in &self.routes {
            let d = &entry.binding.descriptor;
            println!(
                "[route] {} {} -> {}::{}",
                d.method(),
                d.url_pattern(),
                entry.binding.handler_id,
                d.target()
            );
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

/// Convert a URL pattern to an anchored regex and the ordered parameter
/// names, e.g. `/users/{id}` → `^/users/([^/]+)$` and `["id"]`.
fn path_to_regex(path: &str) -> Result<(Regex, Vec<Arc<str>>), ConfigError> {
    let compile = |pattern: &str| {
        Regex::new(pattern).map_err(|e| ConfigError::InvalidUrlPattern {
            pattern: path.to_string(),
            reason: e.to_string(),
        })
    };

    if path == "/" {
        return Ok((compile(r"^/$")?, Vec::new()));
    }

    let mut pattern = String::with_capacity(path.len() + 8);
    pattern.push('^');
    let mut param_names: Vec<Arc<str>> = Vec::with_capacity(path.matches('{').count());

    for segment in path.split('/') {
        if segment.starts_with('{') && segment.ends_with('}') {
            let param_name = segment.trim_start_matches('{').trim_end_matches('}');
            pattern.push_str("/([^/]+)");
            param_names.push(Arc::from(param_name));
        } else if !segment.is_empty() {
            pattern.push('/');
            pattern.push_str(&regex::escape(segment));
        }
    }

    pattern.push('$');
    Ok((compile(&pattern)?, param_names))
}

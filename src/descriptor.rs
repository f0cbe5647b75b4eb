//! Route descriptors: immutable declarations of one routable endpoint.

use crate::error::ConfigError;
use http::Method;
use serde_json::{Map, Value};

/// HTTP methods a descriptor may declare. Anything else is rejected at
/// construction time.
pub const SUPPORTED_METHODS: [Method; 7] = [
    Method::GET,
    Method::POST,
    Method::PUT,
    Method::PATCH,
    Method::DELETE,
    Method::OPTIONS,
    Method::HEAD,
];

/// Immutable description of one route: method, URL pattern, the handler
/// method it targets, optional static arguments overlaid onto the parameter
/// bag at dispatch time, and an optional name for URL reconstruction.
///
/// Validation happens entirely in [`RouteDescriptor::new`]; a constructed
/// descriptor is always well-formed.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteDescriptor {
    method: Method,
    url_pattern: String,
    target: String,
    static_args: Map<String, Value>,
    name: Option<String>,
}

impl RouteDescriptor {
    /// Build a descriptor, validating method, pattern and target.
    ///
    /// The method string is normalized to uppercase, so `"get"` and `"GET"`
    /// are equivalent. Patterns must start with `/`, must not end with `/`
    /// (except the bare root `/`) and may contain `{param}` segments
    /// (e.g. `/pets/{id}`).
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnsupportedMethod`], [`ConfigError::InvalidUrlPattern`]
    /// or [`ConfigError::EmptyTarget`] when the declaration is malformed.
    pub fn new(method: &str, url_pattern: &str, target: &str) -> Result<Self, ConfigError> {
        let method = parse_method(method)?;
        validate_pattern(url_pattern)?;
        if target.trim().is_empty() {
            return Err(ConfigError::EmptyTarget {
                pattern: url_pattern.to_string(),
            });
        }
        Ok(Self {
            method,
            url_pattern: url_pattern.to_string(),
            target: target.to_string(),
            static_args: Map::new(),
            name: None,
        })
    }

    /// Replace the static argument map.
    #[must_use]
    pub fn with_static_args(mut self, static_args: Map<String, Value>) -> Self {
        self.static_args = static_args;
        self
    }

    /// Add a single static argument.
    #[must_use]
    pub fn with_static_arg(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.static_args.insert(key.into(), value.into());
        self
    }

    /// Name this route for later URL reconstruction via
    /// [`Router::url_for`](crate::router::Router::url_for).
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn method(&self) -> &Method {
        &self.method
    }

    #[must_use]
    pub fn url_pattern(&self) -> &str {
        &self.url_pattern
    }

    /// Name of the handler method this route targets.
    #[must_use]
    pub fn target(&self) -> &str {
        &self.target
    }

    /// Static arguments overlaid onto router-extracted path parameters;
    /// these win on key collision.
    #[must_use]
    pub fn static_args(&self) -> &Map<String, Value> {
        &self.static_args
    }

    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }
}

fn parse_method(method: &str) -> Result<Method, ConfigError> {
    let unsupported = || ConfigError::UnsupportedMethod {
        method: method.to_string(),
    };
    let normalized = method.trim().to_ascii_uppercase();
    let parsed = Method::from_bytes(normalized.as_bytes()).map_err(|_| unsupported())?;
    if !SUPPORTED_METHODS.contains(&parsed) {
        return Err(unsupported());
    }
    Ok(parsed)
}

fn validate_pattern(pattern: &str) -> Result<(), ConfigError> {
    let invalid = |reason: &str| ConfigError::InvalidUrlPattern {
        pattern: pattern.to_string(),
        reason: reason.to_string(),
    };
    if pattern.is_empty() {
        return Err(invalid("pattern is empty"));
    }
    if !pattern.starts_with('/') {
        return Err(invalid("pattern must start with '/'"));
    }
    // `/pets/` would compile to the same matcher as `/pets` and never see a
    // trailing-slash request, so it is rejected up front
    if pattern.len() > 1 && pattern.ends_with('/') {
        return Err(invalid("pattern must not end with '/'"));
    }
    for segment in pattern.split('/') {
        let has_brace = segment.contains('{') || segment.contains('}');
        if !has_brace {
            continue;
        }
        let well_formed = segment.starts_with('{')
            && segment.ends_with('}')
            && segment.len() > 2
            && !segment[1..segment.len() - 1].contains(['{', '}']);
        if !well_formed {
            return Err(invalid("parameter segments must look like '{name}'"));
        }
    }
    Ok(())
}

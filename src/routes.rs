//! View resolution — mapping a path back to a view identifier.
//!
//! The view backend keys its records by a named view rather than a concrete
//! path, so it needs a collaborator that knows the host's URL layout. That
//! collaborator is the [`ViewResolver`] trait; web frameworks can adapt
//! their own routers behind it. [`RouteTable`] is the built-in
//! implementation used by the CLI and the tests: an ordered list of
//! patterns, each either an exact path or a prefix ending in `*`.

use serde::{Deserialize, Serialize};

/// Resolves a (canonicalized) path to a view identifier.
pub trait ViewResolver: Sync {
    /// `None` when no view matches the path. The view backend maps that to
    /// the empty-string view key.
    fn resolve_to_name(&self, path: &str) -> Option<String>;
}

/// One route: a pattern and the view name it resolves to.
///
/// Patterns are exact (`/about/`) or prefix wildcards (`/products/*`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Route {
    pub pattern: String,
    pub name: String,
}

/// Ordered route list; first matching pattern wins.
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    routes: Vec<Route>,
}

impl RouteTable {
    pub fn new(routes: Vec<Route>) -> Self {
        Self { routes }
    }
}

impl ViewResolver for RouteTable {
    fn resolve_to_name(&self, path: &str) -> Option<String> {
        for route in &self.routes {
            let matched = match route.pattern.strip_suffix('*') {
                Some(prefix) => path.starts_with(prefix),
                None => path == route.pattern,
            };
            if matched {
                return Some(route.name.clone());
            }
        }
        None
    }
}

//! Process-wide backend registry.
//!
//! Backends are registered by name once, at startup, and looked up by name
//! whenever an [`Options`](crate::options::Options) list is validated or a
//! metadata group is constructed. The registry pre-populates itself with the
//! four built-in backends on first touch; hosts can [`register`] additional
//! ones before serving begins. Re-registering a name silently overwrites the
//! definition while keeping the name's original iteration position, so a
//! host can swap a built-in for its own variant without disturbing backend
//! order. Mutating the registry concurrently with lookups is unsupported —
//! registration belongs in process initialization.

use crate::backend::{
    MetadataBackend, ModelBackend, ModelInstanceBackend, PathBackend, ViewBackend,
};
use std::sync::{LazyLock, RwLock};
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
#[error("unknown metadata backend {0:?}")]
pub struct UnknownBackend(pub String);

static REGISTRY: LazyLock<RwLock<Vec<&'static dyn MetadataBackend>>> = LazyLock::new(|| {
    RwLock::new(vec![
        &PathBackend,
        &ViewBackend,
        &ModelInstanceBackend,
        &ModelBackend,
    ])
});

/// Register a backend, overwriting any existing backend of the same name in
/// place.
pub fn register(backend: &'static dyn MetadataBackend) {
    let mut registry = REGISTRY.write().unwrap_or_else(|e| e.into_inner());
    match registry.iter().position(|b| b.name() == backend.name()) {
        Some(index) => registry[index] = backend,
        None => registry.push(backend),
    }
}

/// Look up a backend by name.
pub fn lookup(name: &str) -> Result<&'static dyn MetadataBackend, UnknownBackend> {
    let registry = REGISTRY.read().unwrap_or_else(|e| e.into_inner());
    registry
        .iter()
        .find(|b| b.name() == name)
        .copied()
        .ok_or_else(|| UnknownBackend(name.to_string()))
}

/// Registered backend names, in registration order.
pub fn names() -> Vec<&'static str> {
    let registry = REGISTRY.read().unwrap_or_else(|e| e.into_inner());
    registry.iter().map(|b| b.name()).collect()
}

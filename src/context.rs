//! Per-request resolution state.
//!
//! [`ResolutionContext`] is built fresh for every `get_metadata` /
//! `get_linked_metadata` call and threaded mutably through the backend
//! pipeline. It carries the ambient view context (plain string variables
//! available to template substitution), the current content object when the
//! caller has one, and the inter-backend keys: when the modelinstance
//! backend matches a record it writes `content_type` and `model_instance`
//! here, and the model backend — which runs later — reads them. This is
//! deliberate explicit state passing, not a global.
//!
//! [`RequestScope`] is the read-only site/language/subdomain selector for
//! the same call.

use crate::record::MetadataRecord;
use crate::target::ContentObject;
use std::collections::BTreeMap;

/// Mutable state threaded through one resolution call.
#[derive(Default)]
pub struct ResolutionContext<'a> {
    /// Ambient template variables from the rendering layer.
    pub view_context: BTreeMap<String, String>,
    /// The view's current content object, when the caller supplied one.
    pub object: Option<&'a dyn ContentObject>,
    /// Written by the modelinstance backend on match; read by the model
    /// backend.
    pub content_type: Option<String>,
    /// The matched modelinstance record, for the model backend's template
    /// rendering.
    pub model_instance: Option<MetadataRecord>,
}

impl<'a> ResolutionContext<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_var(mut self, name: &str, value: &str) -> Self {
        self.view_context.insert(name.to_string(), value.to_string());
        self
    }

    pub fn with_object(mut self, object: &'a dyn ContentObject) -> Self {
        self.object = Some(object);
        self
    }
}

/// Which site/language/subdomain a lookup is scoped to.
///
/// All fields optional; the engine fills the site from the host default
/// when the caller leaves it unset.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestScope {
    pub site: Option<String>,
    pub language: Option<String>,
    pub subdomain: Option<String>,
}

impl RequestScope {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn site(mut self, site: &str) -> Self {
        self.site = Some(site.to_string());
        self
    }

    pub fn language(mut self, language: &str) -> Self {
        self.language = Some(language.to_string());
        self
    }

    pub fn subdomain(mut self, subdomain: &str) -> Self {
        self.subdomain = Some(subdomain.to_string());
        self
    }
}

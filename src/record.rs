//! Stored metadata records.
//!
//! One [`MetadataRecord`] is one row: the owning backend's key field(s), the
//! optional site/language/subdomain axis fields, and the user-declared
//! metadata values. Records are created and edited out of band (an admin
//! surface, a fixture file) and are read-only from the engine's point of
//! view — the single exception is the modelinstance save path in
//! [`crate::store`], which derives the denormalized path at save time.
//!
//! Records serialize to and from JSON for the store file; absent fields are
//! omitted so fixture files stay sparse.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

fn is_false(value: &bool) -> bool {
    !*value
}

/// A single stored metadata row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MetadataRecord {
    /// Name of the backend this record belongs to (`"path"`, `"view"`,
    /// `"modelinstance"`, `"model"`).
    pub backend: String,

    /// Path key (path backend; denormalized on modelinstance records).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    /// View identifier key (view backend). An empty string is a legal
    /// stored value and matches paths that fail view resolution.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub view: Option<String>,

    /// Content type key (modelinstance and model backends).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,

    /// Object id key (modelinstance backend).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub object_id: Option<u64>,

    /// Site axis. `None` means the record applies to all sites.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub site: Option<String>,

    /// Language axis. `None` means the record applies to all languages.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,

    /// Subdomain axis.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subdomain: Option<String>,

    /// Subdomain override: the record applies to every subdomain. A
    /// subdomain-exact record wins over an all-subdomains record.
    #[serde(default, skip_serializing_if = "is_false")]
    pub all_subdomains: bool,

    /// User-declared metadata field values. A present-but-empty value is
    /// treated as absent during resolution.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub values: BTreeMap<String, String>,
}

impl MetadataRecord {
    fn empty(backend: &str) -> Self {
        Self {
            backend: backend.to_string(),
            path: None,
            view: None,
            content_type: None,
            object_id: None,
            site: None,
            language: None,
            subdomain: None,
            all_subdomains: false,
            values: BTreeMap::new(),
        }
    }

    /// A path-backend record keyed by `path` (canonicalized at insert).
    pub fn for_path(path: &str) -> Self {
        let mut record = Self::empty("path");
        record.path = Some(path.to_string());
        record
    }

    /// A view-backend record keyed by a resolved view identifier.
    pub fn for_view(view: &str) -> Self {
        let mut record = Self::empty("view");
        record.view = Some(view.to_string());
        record
    }

    /// A modelinstance-backend record keyed by content type + object id.
    pub fn for_instance(content_type: &str, object_id: u64) -> Self {
        let mut record = Self::empty("modelinstance");
        record.content_type = Some(content_type.to_string());
        record.object_id = Some(object_id);
        record
    }

    /// A model-backend record keyed by content type alone.
    pub fn for_content_type(content_type: &str) -> Self {
        let mut record = Self::empty("model");
        record.content_type = Some(content_type.to_string());
        record
    }

    pub fn with_site(mut self, site: &str) -> Self {
        self.site = Some(site.to_string());
        self
    }

    pub fn with_language(mut self, language: &str) -> Self {
        self.language = Some(language.to_string());
        self
    }

    pub fn with_subdomain(mut self, subdomain: &str) -> Self {
        self.subdomain = Some(subdomain.to_string());
        self
    }

    pub fn with_all_subdomains(mut self) -> Self {
        self.all_subdomains = true;
        self
    }

    pub fn with_value(mut self, field: &str, value: &str) -> Self {
        self.values.insert(field.to_string(), value.to_string());
        self
    }

    /// Stored value for a user-declared field, if any.
    pub fn value(&self, field: &str) -> Option<&str> {
        self.values.get(field).map(String::as_str)
    }

    /// Value of a schema field by name, for uniqueness-constraint
    /// comparison. Key and axis fields only; user-declared fields are not
    /// part of any constraint.
    pub fn constraint_value(&self, field: &str) -> Option<String> {
        match field {
            "_path" => self.path.clone(),
            "_view" => self.view.clone(),
            "_content_type" => self.content_type.clone(),
            "_object_id" => self.object_id.map(|id| id.to_string()),
            "_site" => self.site.clone(),
            "_language" => self.language.clone(),
            "_subdomain" => self.subdomain.clone(),
            "_all_subdomains" => Some(self.all_subdomains.to_string()),
            _ => None,
        }
    }
}

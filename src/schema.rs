//! Derived record schemas.
//!
//! The shape of a stored metadata row is not fixed: it depends on which
//! backend owns it (key fields) and which axes the configuration enables
//! (site, language, subdomain fields). Rather than injecting fields at
//! runtime, each backend builds a static [`RecordSchema`] once at
//! configuration time — an introspectable field list plus the composite
//! uniqueness tuples derived from the enabled axes. The store enforces the
//! tuples; the CLI `schema` command dumps the whole thing as JSON.

use serde::Serialize;

/// What role a schema field plays in a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldRole {
    /// Backend key field (`_path`, `_view`, `_content_type`, `_object_id`).
    Key,
    Site,
    Language,
    Subdomain,
    AllSubdomains,
    /// User-declared metadata field.
    Metadata,
}

/// One field of a derived record schema.
#[derive(Debug, Clone, Serialize)]
pub struct SchemaField {
    pub name: String,
    pub role: FieldRole,
    pub nullable: bool,
}

impl SchemaField {
    pub fn key(name: &str) -> Self {
        Self {
            name: name.to_string(),
            role: FieldRole::Key,
            nullable: false,
        }
    }

    /// A nullable key field (the modelinstance backend's denormalized
    /// `_path` is empty until its object exposes a URL).
    pub fn key_nullable(name: &str) -> Self {
        Self {
            name: name.to_string(),
            role: FieldRole::Key,
            nullable: true,
        }
    }

    pub fn axis(name: &str, role: FieldRole) -> Self {
        Self {
            name: name.to_string(),
            role,
            nullable: true,
        }
    }

    pub fn metadata(name: &str) -> Self {
        Self {
            name: name.to_string(),
            role: FieldRole::Metadata,
            nullable: true,
        }
    }
}

/// The derived schema for one backend under one configuration.
#[derive(Debug, Clone, Serialize)]
pub struct RecordSchema {
    /// Owning backend name.
    pub backend: String,
    pub fields: Vec<SchemaField>,
    /// Composite uniqueness constraints: each inner list is one tuple of
    /// field names that must be unique together.
    pub unique_together: Vec<Vec<String>>,
}

impl RecordSchema {
    pub fn field(&self, name: &str) -> Option<&SchemaField> {
        self.fields.iter().find(|f| f.name == name)
    }
}

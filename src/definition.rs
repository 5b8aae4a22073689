//! Metadata group definitions.
//!
//! A [`MetadataDef`] declares what a metadata group looks like: its named
//! fields (title, description, …) and optional definition-level attributes.
//! Declaration is programmatic — the hosting application builds a definition
//! in code at startup; there is no config-file syntax for fields.
//!
//! Each field carries two things the resolution engine cares about:
//!
//! - **editable**: whether a stored value on a record can supply the field.
//! - **populate-from**: the fallback source when no stored value is present —
//!   a literal constant, an alias to another field, or a callable invoked
//!   with the matched record and a backend-specific source argument.
//!
//! Field names starting with `_` are reserved for backend key and axis
//! fields and are rejected at build time, as are duplicates.

use crate::record::MetadataRecord;
use crate::target::ContentObject;
use std::collections::BTreeMap;
use thiserror::Error;

/// Schema field names a metadata definition may not redeclare.
pub const RESERVED_FIELD_NAMES: &[&str] = &[
    "_path",
    "_view",
    "_content_type",
    "_object_id",
    "_site",
    "_language",
    "_subdomain",
    "_all_subdomains",
];

#[derive(Error, Debug, PartialEq, Eq)]
pub enum DefinitionError {
    #[error("field name {0:?} is reserved")]
    ReservedName(String),
    #[error("duplicate field {0:?}")]
    DuplicateField(String),
}

/// Backend-specific argument handed to populate-from callables: the path
/// backend passes the record's path, the view backend its view name, and so
/// on. `None` covers definition-attribute functions invoked with no matched
/// record.
pub enum PopulateSource<'a> {
    Path(&'a str),
    ViewName(&'a str),
    ModelInstance(Option<&'a dyn ContentObject>),
    ContentType(&'a str),
    None,
}

/// A populate-from callable: receives the matched record and the
/// backend-specific source, returns a value or nothing.
pub type PopulateFn = fn(&MetadataRecord, &PopulateSource<'_>) -> Option<String>;

/// Fallback source for a field with no stored value.
#[derive(Clone, Debug)]
pub enum PopulateFrom {
    /// No fallback; the field resolves to nothing without a stored value.
    Unset,
    /// A constant, returned as-is (template substitution still applies if
    /// the constant contains a brace token).
    Literal(String),
    /// Resolve another name instead — a field, or a definition attribute.
    Alias(String),
    /// Compute the value from the record and its backend source.
    Call(PopulateFn),
}

/// One declared metadata field.
#[derive(Clone, Debug)]
pub struct FieldDecl {
    name: String,
    editable: bool,
    populate_from: PopulateFrom,
}

impl FieldDecl {
    /// An editable field with no fallback.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            editable: true,
            populate_from: PopulateFrom::Unset,
        }
    }

    /// A non-editable field computed entirely from its callable.
    pub fn computed(name: &str, populate: PopulateFn) -> Self {
        Self {
            name: name.to_string(),
            editable: false,
            populate_from: PopulateFrom::Call(populate),
        }
    }

    pub fn editable(mut self, editable: bool) -> Self {
        self.editable = editable;
        self
    }

    pub fn literal(mut self, value: &str) -> Self {
        self.populate_from = PopulateFrom::Literal(value.to_string());
        self
    }

    pub fn alias(mut self, other: &str) -> Self {
        self.populate_from = PopulateFrom::Alias(other.to_string());
        self
    }

    pub fn populate_with(mut self, populate: PopulateFn) -> Self {
        self.populate_from = PopulateFrom::Call(populate);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_editable(&self) -> bool {
        self.editable
    }

    pub fn populate_from(&self) -> &PopulateFrom {
        &self.populate_from
    }
}

/// A definition-level attribute: a constant, or a function bound to either
/// the definition or a resolving record.
#[derive(Clone, Debug)]
pub enum DefAttr {
    Value(String),
    DefFn(fn(&MetadataDef) -> Option<String>),
    RecordFn(fn(&MetadataRecord) -> Option<String>),
}

/// A named metadata group: declared fields plus definition attributes.
#[derive(Debug)]
pub struct MetadataDef {
    name: String,
    fields: Vec<FieldDecl>,
    attrs: BTreeMap<String, DefAttr>,
}

impl MetadataDef {
    pub fn builder(name: &str) -> MetadataDefBuilder {
        MetadataDefBuilder {
            name: name.to_string(),
            fields: Vec::new(),
            attrs: BTreeMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn fields(&self) -> &[FieldDecl] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&FieldDecl> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn attr(&self, name: &str) -> Option<&DefAttr> {
        self.attrs.get(name)
    }

    pub fn attr_names(&self) -> impl Iterator<Item = &str> {
        self.attrs.keys().map(String::as_str)
    }
}

pub struct MetadataDefBuilder {
    name: String,
    fields: Vec<FieldDecl>,
    attrs: BTreeMap<String, DefAttr>,
}

impl MetadataDefBuilder {
    pub fn field(mut self, field: FieldDecl) -> Self {
        self.fields.push(field);
        self
    }

    pub fn attr(mut self, name: &str, attr: DefAttr) -> Self {
        self.attrs.insert(name.to_string(), attr);
        self
    }

    pub fn build(self) -> Result<MetadataDef, DefinitionError> {
        let mut seen = Vec::with_capacity(self.fields.len());
        for field in &self.fields {
            if field.name.starts_with('_') || RESERVED_FIELD_NAMES.contains(&field.name.as_str())
            {
                return Err(DefinitionError::ReservedName(field.name.clone()));
            }
            if seen.contains(&field.name.as_str()) {
                return Err(DefinitionError::DuplicateField(field.name.clone()));
            }
            seen.push(field.name.as_str());
        }
        Ok(MetadataDef {
            name: self.name,
            fields: self.fields,
            attrs: self.attrs,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_with_fields_and_attrs() {
        let def = MetadataDef::builder("seo")
            .field(FieldDecl::new("title"))
            .field(FieldDecl::new("heading").alias("title"))
            .attr("site_name", DefAttr::Value("Example".into()))
            .build()
            .unwrap();
        assert_eq!(def.name(), "seo");
        assert!(def.field("title").is_some());
        assert!(def.field("missing").is_none());
        assert!(matches!(def.attr("site_name"), Some(DefAttr::Value(v)) if v == "Example"));
    }

    #[test]
    fn rejects_reserved_names() {
        let err = MetadataDef::builder("seo")
            .field(FieldDecl::new("_path"))
            .build()
            .unwrap_err();
        assert_eq!(err, DefinitionError::ReservedName("_path".into()));
    }

    #[test]
    fn rejects_leading_underscore() {
        let err = MetadataDef::builder("seo")
            .field(FieldDecl::new("_private"))
            .build()
            .unwrap_err();
        assert_eq!(err, DefinitionError::ReservedName("_private".into()));
    }

    #[test]
    fn rejects_duplicate_fields() {
        let err = MetadataDef::builder("seo")
            .field(FieldDecl::new("title"))
            .field(FieldDecl::new("title"))
            .build()
            .unwrap_err();
        assert_eq!(err, DefinitionError::DuplicateField("title".into()));
    }
}

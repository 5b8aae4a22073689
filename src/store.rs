//! In-memory record store.
//!
//! Persistence proper (a database, an admin surface) is the hosting
//! application's concern; the engine only needs a candidate set to filter
//! and the uniqueness guarantees the derived schemas promise. This module
//! provides both: a flat record list with composite-uniqueness enforcement
//! driven by [`RecordSchema`] tuples, plus JSON load/save so fixture files
//! and the CLI have something to read.
//!
//! Two write paths with different conflict behavior:
//!
//! - [`insert`](MetadataStore::insert) is the strict, admin-side path: a
//!   duplicate key is an error.
//! - [`save_instance_metadata`](MetadataStore::save_instance_metadata) is
//!   the modelinstance auto-save path: it derives the record's
//!   denormalized `_path` from the linked object, and a duplicate key
//!   *discards* the row and reports [`SaveOutcome::Conflict`] instead of
//!   failing. Concurrent saves of the same key may race; last-write-wins
//!   inconsistency is an accepted trade-off here, not a bug.
//!
//! Paths are canonicalized on the way in, so stored keys always meet
//! canonicalized request paths.

use crate::canonical::canonicalize_path;
use crate::record::MetadataRecord;
use crate::schema::RecordSchema;
use crate::target::ContentObject;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Version of the store file format. Bump to invalidate old fixture files
/// when the record shape changes.
const STORE_VERSION: u32 = 1;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("store file version {found} is not supported (expected {expected})")]
    Version { found: u32, expected: u32 },
    #[error("duplicate {backend} metadata for key ({key})")]
    DuplicateKey { backend: String, key: String },
}

/// Result of the modelinstance save path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    Saved,
    /// The row collided with an existing record's uniqueness tuple and was
    /// discarded. Surfaced rather than swallowed so callers can observe it;
    /// nothing is raised.
    Conflict,
}

/// On-disk shape of a record fixture file.
#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct StoreFile {
    version: u32,
    records: Vec<MetadataRecord>,
}

/// Flat in-memory record set shared by all backends of one metadata group.
#[derive(Debug, Default)]
pub struct MetadataStore {
    records: Vec<MetadataRecord>,
}

impl MetadataStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// All records, in insertion order. Backends filter this down through
    /// `scoped_query`.
    pub fn records(&self) -> &[MetadataRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Strict insert: canonicalizes the record's path key and enforces the
    /// schema's composite uniqueness tuples.
    pub fn insert(
        &mut self,
        mut record: MetadataRecord,
        schema: &RecordSchema,
        append_slash: bool,
    ) -> Result<(), StoreError> {
        if let Some(path) = record.path.take() {
            record.path = Some(canonicalize_path(&path, append_slash));
        }
        if let Some(key) = self.conflicting_key(&record, schema) {
            return Err(StoreError::DuplicateKey {
                backend: record.backend,
                key,
            });
        }
        self.records.push(record);
        Ok(())
    }

    /// The modelinstance auto-save path: derive the denormalized `_path`
    /// from the linked object's URL when it exposes one, then insert —
    /// discarding the row on a uniqueness conflict instead of erroring.
    pub fn save_instance_metadata(
        &mut self,
        mut record: MetadataRecord,
        schema: &RecordSchema,
        append_slash: bool,
        object: Option<&dyn ContentObject>,
    ) -> SaveOutcome {
        if let Some(url) = object.and_then(ContentObject::absolute_url) {
            record.path = Some(url);
        }
        if let Some(path) = record.path.take() {
            record.path = Some(canonicalize_path(&path, append_slash));
        }
        if let Some(key) = self.conflicting_key(&record, schema) {
            log::warn!(
                "discarding conflicting {} metadata for key ({key})",
                record.backend
            );
            return SaveOutcome::Conflict;
        }
        self.records.push(record);
        SaveOutcome::Saved
    }

    /// First uniqueness tuple the record collides on, rendered for display,
    /// or `None` when the record is insertable.
    ///
    /// SQL null semantics: a tuple with a null component never conflicts,
    /// so e.g. two site-null records for the same path coexist when the
    /// sites axis is on.
    fn conflicting_key(&self, record: &MetadataRecord, schema: &RecordSchema) -> Option<String> {
        for tuple in &schema.unique_together {
            let key: Vec<Option<String>> = tuple
                .iter()
                .map(|field| record.constraint_value(field))
                .collect();
            if key.iter().any(Option::is_none) {
                continue;
            }
            let collision = self
                .records
                .iter()
                .filter(|existing| existing.backend == record.backend)
                .any(|existing| {
                    tuple
                        .iter()
                        .zip(&key)
                        .all(|(field, value)| &existing.constraint_value(field) == value)
                });
            if collision {
                let rendered: Vec<String> = tuple
                    .iter()
                    .zip(&key)
                    .map(|(field, value)| {
                        format!("{field}={}", value.as_deref().unwrap_or("null"))
                    })
                    .collect();
                return Some(rendered.join(", "));
            }
        }
        None
    }

    /// Load a record fixture file. Records are taken as-is; uniqueness and
    /// canonicalization are applied when the engine inserts them into a
    /// group.
    pub fn load_records(path: &Path) -> Result<Vec<MetadataRecord>, StoreError> {
        let content = fs::read_to_string(path)?;
        let file: StoreFile = serde_json::from_str(&content)?;
        if file.version != STORE_VERSION {
            return Err(StoreError::Version {
                found: file.version,
                expected: STORE_VERSION,
            });
        }
        Ok(file.records)
    }

    /// Serialize the store to the fixture file format.
    pub fn to_json(&self) -> Result<String, StoreError> {
        let file = StoreFile {
            version: STORE_VERSION,
            records: self.records.clone(),
        };
        Ok(serde_json::to_string_pretty(&file)?)
    }
}

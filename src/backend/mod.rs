//! Metadata backends — matching strategies for associating stored records
//! with targets.
//!
//! A backend answers one question: *which stored record applies to this
//! target?* Four strategies ship built in, each keyed differently:
//!
//! | Backend | Keyed by | Matches |
//! |---|---|---|
//! | [`PathBackend`] | `_path` | exact canonicalized path |
//! | [`ViewBackend`] | `_view` | view identifier resolved from the path |
//! | [`ModelInstanceBackend`] | `_content_type` + `_object_id` | one content object (or its denormalized path) |
//! | [`ModelBackend`] | `_content_type` | every instance of a content type |
//!
//! All four share the [`MetadataBackend`] trait: key fields and base
//! uniqueness tuples are variant-specific, while schema building, axis
//! folding ([`unique_together_fields`](MetadataBackend::unique_together_fields))
//! and scope filtering ([`scoped_query`](MetadataBackend::scoped_query)) are
//! default methods, so cross-cutting axes fold into each backend's own
//! uniqueness constraint without backends knowing about each other.
//!
//! Backends run in the order given by
//! [`Options::backends`](crate::options::Options::backends). The model
//! backend depends on the modelinstance backend having run first — it reads
//! the content type the earlier match wrote into the resolution context —
//! and its [`validate`](MetadataBackend::validate) rejects configurations
//! that break that ordering.

mod model;
mod model_instance;
mod path;
mod view;

pub use model::ModelBackend;
pub use model_instance::ModelInstanceBackend;
pub use path::PathBackend;
pub use view::ViewBackend;

use crate::context::{RequestScope, ResolutionContext};
use crate::definition::{MetadataDef, PopulateSource};
use crate::options::{Options, OptionsError};
use crate::record::MetadataRecord;
use crate::routes::ViewResolver;
use crate::schema::{FieldRole, RecordSchema, SchemaField};
use crate::target::{ContentObject, TargetRef};

/// One matching strategy. Implementations are stateless unit structs; the
/// registry hands them out as `&'static dyn MetadataBackend`.
pub trait MetadataBackend: Sync + std::fmt::Debug {
    /// Registry key, unique per backend.
    fn name(&self) -> &'static str;

    fn verbose_name(&self) -> &'static str;

    /// Uniqueness tuples over the backend's own key fields, before axis
    /// fields are folded in.
    fn base_unique_together(&self) -> &'static [&'static [&'static str]];

    /// The backend's key fields, in schema order.
    fn key_fields(&self) -> Vec<SchemaField>;

    /// Narrow scoped candidates to the record matching `target`.
    ///
    /// Candidates arrive already scope-filtered and tie-break ordered; the
    /// first hit wins. A backend may write context keys for backends that
    /// run after it.
    fn match_record<'s>(
        &self,
        candidates: &[&'s MetadataRecord],
        target: &TargetRef<'_>,
        ctx: &mut ResolutionContext<'_>,
        resolver: &dyn ViewResolver,
    ) -> Option<&'s MetadataRecord>;

    /// The variant-specific argument handed to populate-from callables for
    /// a record of this backend.
    fn populate_source<'a>(
        &self,
        record: &'a MetadataRecord,
        ctx: &ResolutionContext<'a>,
    ) -> PopulateSource<'a>;

    /// The content object template substitution may use when rendering one
    /// of this backend's records. Path and view records render with the
    /// ambient view context only.
    fn render_object<'a>(
        &self,
        _record: &MetadataRecord,
        _ctx: &ResolutionContext<'a>,
    ) -> Option<&'a dyn ContentObject> {
        None
    }

    /// Cross-backend configuration check, run once at options construction.
    fn validate(&self, _options: &Options) -> Result<(), OptionsError> {
        Ok(())
    }

    /// Fold the enabled axis fields into each base uniqueness tuple.
    fn unique_together_fields(&self, options: &Options) -> Vec<Vec<String>> {
        self.base_unique_together()
            .iter()
            .map(|tuple| {
                let mut fields: Vec<String> =
                    tuple.iter().map(|field| field.to_string()).collect();
                if options.use_sites() {
                    fields.push("_site".to_string());
                }
                if options.use_i18n() {
                    fields.push("_language".to_string());
                }
                if options.use_subdomains() {
                    fields.push("_subdomain".to_string());
                }
                fields
            })
            .collect()
    }

    /// Build the static record schema for this backend under `options`:
    /// key fields, enabled axis fields, then the declared metadata fields.
    fn build_schema(&self, def: &MetadataDef, options: &Options) -> RecordSchema {
        let mut fields = self.key_fields();
        if options.use_sites() {
            fields.push(SchemaField::axis("_site", FieldRole::Site));
        }
        if options.use_i18n() {
            fields.push(SchemaField::axis("_language", FieldRole::Language));
        }
        if options.use_subdomains() {
            fields.push(SchemaField::axis("_subdomain", FieldRole::Subdomain));
            fields.push(SchemaField::axis("_all_subdomains", FieldRole::AllSubdomains));
        }
        for field in def.fields() {
            fields.push(SchemaField::metadata(field.name()));
        }
        RecordSchema {
            backend: self.name().to_string(),
            fields,
            unique_together: self.unique_together_fields(options),
        }
    }

    /// Filter this backend's records down to those visible for the
    /// requested scope, ordered so that subdomain-exact records come before
    /// all-subdomain records (specific beats general).
    ///
    /// Visibility rules:
    /// - site (only when the sites axis is on): a null `_site` applies to
    ///   all sites; otherwise `_site` must equal the requested site.
    /// - language: only filtered when a language is requested; a null
    ///   `_language` applies to all languages, otherwise it must match.
    /// - subdomain: only filtered when a subdomain is requested; visible
    ///   when `_subdomain` matches or `_all_subdomains` is set.
    fn scoped_query<'s>(
        &self,
        records: &'s [MetadataRecord],
        scope: &RequestScope,
        options: &Options,
    ) -> Vec<&'s MetadataRecord> {
        let mut visible: Vec<&MetadataRecord> = records
            .iter()
            .filter(|r| r.backend == self.name())
            .filter(|r| site_visible(r, scope, options))
            .filter(|r| language_visible(r, scope))
            .filter(|r| subdomain_visible(r, scope))
            .collect();
        // Stable: among equals, store order is preserved.
        visible.sort_by_key(|r| r.all_subdomains);
        visible
    }
}

fn site_visible(record: &MetadataRecord, scope: &RequestScope, options: &Options) -> bool {
    if !options.use_sites() {
        return true;
    }
    match &record.site {
        None => true,
        Some(site) => scope.site.as_deref() == Some(site.as_str()),
    }
}

fn language_visible(record: &MetadataRecord, scope: &RequestScope) -> bool {
    match (&scope.language, &record.language) {
        (None, _) | (_, None) => true,
        (Some(requested), Some(stored)) => requested == stored,
    }
}

fn subdomain_visible(record: &MetadataRecord, scope: &RequestScope) -> bool {
    match &scope.subdomain {
        None => true,
        Some(requested) => {
            record.all_subdomains || record.subdomain.as_deref() == Some(requested.as_str())
        }
    }
}

//! The value resolution engine.
//!
//! Given the records the backends matched for one lookup, resolution
//! computes each field's final value through a fixed precedence chain.
//! Per record, first non-empty wins:
//!
//! 1. **Stored value** — if the field is editable and the record stores a
//!    non-empty value, that value wins verbatim. An explicitly stored empty
//!    value does *not* short-circuit; it falls through like an absent one.
//! 2. **Populate-from** — the field's declared fallback: a callable
//!    (invoked with the record and its backend-specific source), a literal
//!    constant, or an alias that resolves another name in its place.
//! 3. **Definition attribute** — names that are not declared fields at all
//!    resolve against the definition's attributes (constants or functions);
//!    this step runs without any record.
//! 4. **Template pass** — whatever the chain produced is run through the
//!    value renderer when it contains a brace token. Literals are not
//!    exempt.
//!
//! Across records, fields resolve in active-backend order: an
//! instance-specific record is consulted before the type-wide model record,
//! which is what makes the model backend a fallback default. The
//! definition-attribute step runs once, after every record has been tried.

use crate::backend::MetadataBackend;
use crate::context::ResolutionContext;
use crate::definition::{DefAttr, MetadataDef, PopulateFrom};
use crate::record::MetadataRecord;
use crate::render::ValueRenderer;
use crate::target::ContentObject;
use std::collections::BTreeMap;
use std::fmt;

/// Alias chains longer than this are treated as cycles and abandoned.
const MAX_ALIAS_DEPTH: usize = 8;

/// One record a backend matched for the current lookup, paired with the
/// backend that matched it.
pub struct MatchedRecord {
    pub backend: &'static dyn MetadataBackend,
    pub record: MetadataRecord,
}

/// The outcome of one lookup: every declared field and definition
/// attribute that resolved to a non-empty value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedMetadata {
    group: String,
    values: BTreeMap<String, String>,
}

impl ResolvedMetadata {
    pub fn group(&self) -> &str {
        &self.group
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.values.get(field).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }
}

impl fmt::Display for ResolvedMetadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (name, value) in &self.values {
            writeln!(f, "{name}: {value}")?;
        }
        Ok(())
    }
}

/// Resolve every declared field and definition attribute of `def` against
/// the matched records.
pub fn resolve_fields(
    def: &MetadataDef,
    matched: &[MatchedRecord],
    ctx: &ResolutionContext<'_>,
    renderer: &dyn ValueRenderer,
) -> ResolvedMetadata {
    let mut values = BTreeMap::new();
    let names = def
        .fields()
        .iter()
        .map(|f| f.name().to_string())
        .chain(def.attr_names().map(str::to_string));
    for name in names {
        if let Some(value) = resolve_field(def, &name, matched, ctx, renderer) {
            values.insert(name, value);
        }
    }
    ResolvedMetadata {
        group: def.name().to_string(),
        values,
    }
}

/// Resolve a single name: each matched record in backend order, then the
/// definition attributes. Values that render to something empty are
/// skipped so a later source can still supply the field.
pub fn resolve_field(
    def: &MetadataDef,
    name: &str,
    matched: &[MatchedRecord],
    ctx: &ResolutionContext<'_>,
    renderer: &dyn ValueRenderer,
) -> Option<String> {
    for m in matched {
        if let Some(raw) = resolve_raw(def, name, Some(m), ctx, 0) {
            let rendered = apply_renderer(renderer, raw, m.backend.render_object(&m.record, ctx), ctx);
            if !rendered.trim().is_empty() {
                return Some(rendered);
            }
        }
    }
    if let Some(raw) = resolve_raw(def, name, None, ctx, 0) {
        let rendered = apply_renderer(renderer, raw, ctx.object, ctx);
        if !rendered.trim().is_empty() {
            return Some(rendered);
        }
    }
    None
}

/// Steps 1–3 of the chain for one name against one record (or none),
/// before the template pass.
fn resolve_raw(
    def: &MetadataDef,
    name: &str,
    m: Option<&MatchedRecord>,
    ctx: &ResolutionContext<'_>,
    depth: usize,
) -> Option<String> {
    if depth >= MAX_ALIAS_DEPTH {
        log::warn!("alias chain for metadata field {name:?} exceeds {MAX_ALIAS_DEPTH} hops");
        return None;
    }

    if let Some(decl) = def.field(name) {
        // Declared fields resolve against a record; with none matched
        // there is nothing to read.
        let m = m?;
        if decl.is_editable() {
            if let Some(stored) = m.record.value(name) {
                if !stored.trim().is_empty() {
                    return Some(stored.to_string());
                }
            }
        }
        return match decl.populate_from() {
            PopulateFrom::Call(populate) => {
                populate(&m.record, &m.backend.populate_source(&m.record, ctx))
            }
            PopulateFrom::Literal(value) => Some(value.clone()),
            PopulateFrom::Alias(other) => resolve_raw(def, other, Some(m), ctx, depth + 1),
            PopulateFrom::Unset => None,
        };
    }

    match def.attr(name)? {
        DefAttr::Value(value) => Some(value.clone()),
        DefAttr::DefFn(attr) => attr(def),
        DefAttr::RecordFn(attr) => m.and_then(|m| attr(&m.record)),
    }
}

fn apply_renderer(
    renderer: &dyn ValueRenderer,
    raw: String,
    object: Option<&dyn ContentObject>,
    ctx: &ResolutionContext<'_>,
) -> String {
    if renderer.looks_like_template(&raw) {
        renderer.render(&raw, object, &ctx.view_context)
    } else {
        raw
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{ModelBackend, ModelInstanceBackend, PathBackend};
    use crate::definition::{DefAttr, FieldDecl, MetadataDef, PopulateSource};
    use crate::render::BraceRenderer;

    fn path_match(record: MetadataRecord) -> MatchedRecord {
        MatchedRecord {
            backend: &PathBackend,
            record,
        }
    }

    fn def_with(fields: Vec<FieldDecl>) -> MetadataDef {
        let mut builder = MetadataDef::builder("seo");
        for field in fields {
            builder = builder.field(field);
        }
        builder.build().unwrap()
    }

    fn echo_path(_record: &MetadataRecord, source: &PopulateSource<'_>) -> Option<String> {
        match source {
            PopulateSource::Path(path) => Some(format!("Page at {path}")),
            _ => None,
        }
    }

    #[test]
    fn stored_value_beats_populate_from() {
        let def = def_with(vec![FieldDecl::new("title").populate_with(echo_path)]);
        let matched = vec![path_match(
            MetadataRecord::for_path("/about/").with_value("title", "About us"),
        )];
        let value = resolve_field(&def, "title", &matched, &ResolutionContext::new(), &BraceRenderer);
        assert_eq!(value.as_deref(), Some("About us"));
    }

    #[test]
    fn empty_stored_value_falls_through_to_populate_from() {
        let def = def_with(vec![FieldDecl::new("title").populate_with(echo_path)]);
        let matched = vec![path_match(
            MetadataRecord::for_path("/about/").with_value("title", ""),
        )];
        let value = resolve_field(&def, "title", &matched, &ResolutionContext::new(), &BraceRenderer);
        assert_eq!(value.as_deref(), Some("Page at /about/"));
    }

    #[test]
    fn non_editable_field_ignores_stored_value() {
        let def = def_with(vec![FieldDecl::computed("title", echo_path)]);
        let matched = vec![path_match(
            MetadataRecord::for_path("/about/").with_value("title", "Stored"),
        )];
        let value = resolve_field(&def, "title", &matched, &ResolutionContext::new(), &BraceRenderer);
        assert_eq!(value.as_deref(), Some("Page at /about/"));
    }

    #[test]
    fn literal_populate_from_returned_unchanged() {
        let def = def_with(vec![FieldDecl::new("robots").literal("index,follow")]);
        let matched = vec![path_match(MetadataRecord::for_path("/about/"))];
        let value = resolve_field(&def, "robots", &matched, &ResolutionContext::new(), &BraceRenderer);
        assert_eq!(value.as_deref(), Some("index,follow"));
    }

    #[test]
    fn alias_resolves_exactly_like_its_target() {
        let def = def_with(vec![
            FieldDecl::new("title"),
            FieldDecl::new("og_title").alias("title"),
        ]);
        let matched = vec![path_match(
            MetadataRecord::for_path("/about/").with_value("title", "About us"),
        )];
        let ctx = ResolutionContext::new();
        let direct = resolve_field(&def, "title", &matched, &ctx, &BraceRenderer);
        let aliased = resolve_field(&def, "og_title", &matched, &ctx, &BraceRenderer);
        assert_eq!(direct.as_deref(), Some("About us"));
        assert_eq!(aliased, direct);
    }

    #[test]
    fn alias_cycle_resolves_to_nothing() {
        let def = def_with(vec![
            FieldDecl::new("a").alias("b"),
            FieldDecl::new("b").alias("a"),
        ]);
        let matched = vec![path_match(MetadataRecord::for_path("/x/"))];
        let value = resolve_field(&def, "a", &matched, &ResolutionContext::new(), &BraceRenderer);
        assert_eq!(value, None);
    }

    #[test]
    fn alias_can_point_at_a_definition_attribute() {
        let def = MetadataDef::builder("seo")
            .field(FieldDecl::new("title").alias("site_name"))
            .attr("site_name", DefAttr::Value("Example Shop".into()))
            .build()
            .unwrap();
        let matched = vec![path_match(MetadataRecord::for_path("/x/"))];
        let value = resolve_field(&def, "title", &matched, &ResolutionContext::new(), &BraceRenderer);
        assert_eq!(value.as_deref(), Some("Example Shop"));
    }

    #[test]
    fn definition_attrs_resolve_without_any_record() {
        let def = MetadataDef::builder("seo")
            .attr("generator", DefAttr::Value("sitemeta".into()))
            .attr("group_name", DefAttr::DefFn(|def| Some(def.name().to_string())))
            .build()
            .unwrap();
        let ctx = ResolutionContext::new();
        assert_eq!(
            resolve_field(&def, "generator", &[], &ctx, &BraceRenderer).as_deref(),
            Some("sitemeta")
        );
        assert_eq!(
            resolve_field(&def, "group_name", &[], &ctx, &BraceRenderer).as_deref(),
            Some("seo")
        );
    }

    #[test]
    fn record_bound_attr_uses_first_matched_record() {
        let def = MetadataDef::builder("seo")
            .attr(
                "canonical",
                DefAttr::RecordFn(|record| record.path.clone()),
            )
            .build()
            .unwrap();
        let matched = vec![path_match(MetadataRecord::for_path("/about/"))];
        let ctx = ResolutionContext::new();
        assert_eq!(
            resolve_field(&def, "canonical", &matched, &ctx, &BraceRenderer).as_deref(),
            Some("/about/")
        );
        // Without a record, a record-bound attribute yields nothing.
        assert_eq!(resolve_field(&def, "canonical", &[], &ctx, &BraceRenderer), None);
    }

    #[test]
    fn declared_field_without_record_resolves_to_nothing() {
        let def = def_with(vec![FieldDecl::new("title").literal("Fallback")]);
        let value = resolve_field(&def, "title", &[], &ResolutionContext::new(), &BraceRenderer);
        assert_eq!(value, None);
    }

    #[test]
    fn earlier_backend_record_wins_over_later() {
        let def = def_with(vec![FieldDecl::new("title")]);
        let matched = vec![
            MatchedRecord {
                backend: &ModelInstanceBackend,
                record: MetadataRecord::for_instance("product", 7)
                    .with_value("title", "Instance title"),
            },
            MatchedRecord {
                backend: &ModelBackend,
                record: MetadataRecord::for_content_type("product")
                    .with_value("title", "Type title"),
            },
        ];
        let value = resolve_field(&def, "title", &matched, &ResolutionContext::new(), &BraceRenderer);
        assert_eq!(value.as_deref(), Some("Instance title"));
    }

    #[test]
    fn later_backend_fills_fields_the_earlier_one_lacks() {
        let def = def_with(vec![FieldDecl::new("title"), FieldDecl::new("description")]);
        let matched = vec![
            MatchedRecord {
                backend: &ModelInstanceBackend,
                record: MetadataRecord::for_instance("product", 7)
                    .with_value("title", "Instance title"),
            },
            MatchedRecord {
                backend: &ModelBackend,
                record: MetadataRecord::for_content_type("product")
                    .with_value("description", "Type description"),
            },
        ];
        let ctx = ResolutionContext::new();
        let resolved = resolve_fields(&def, &matched, &ctx, &BraceRenderer);
        assert_eq!(resolved.get("title"), Some("Instance title"));
        assert_eq!(resolved.get("description"), Some("Type description"));
    }

    #[test]
    fn unknown_name_resolves_to_nothing() {
        let def = def_with(vec![FieldDecl::new("title")]);
        let value = resolve_field(&def, "nonsense", &[], &ResolutionContext::new(), &BraceRenderer);
        assert_eq!(value, None);
    }
}

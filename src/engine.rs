//! The engine — entry points for the template-rendering layer.
//!
//! [`Engine`] ties everything together: the host configuration, one or more
//! named [`MetadataGroup`]s, a [`ViewResolver`] and a [`ValueRenderer`].
//! The rendering layer calls exactly two methods:
//!
//! - [`get_metadata`](Engine::get_metadata) when the target is a path;
//! - [`get_linked_metadata`](Engine::get_linked_metadata) when the target
//!   is a content object.
//!
//! Both walk the group's active backends in order over the scope-filtered
//! candidate set, collect every record that matches the target, and hand
//! the matches to the resolution engine. The mutable
//! [`ResolutionContext`] threads state between backends — a modelinstance
//! match feeds the model backend its content type — and carries the view
//! context for template substitution.
//!
//! A lookup that cannot even determine a target is a caller mistake and
//! surfaces as [`EngineError::TargetUnresolvable`]; a lookup that simply
//! finds nothing returns `Ok(None)`.

use crate::backend::MetadataBackend;
use crate::canonical::canonicalize_path;
use crate::config::HostConfig;
use crate::context::{RequestScope, ResolutionContext};
use crate::definition::MetadataDef;
use crate::options::{Options, OptionsError};
use crate::record::MetadataRecord;
use crate::registry;
use crate::render::{BraceRenderer, ValueRenderer};
use crate::resolve::{self, MatchedRecord, ResolvedMetadata};
use crate::routes::{RouteTable, ViewResolver};
use crate::schema::RecordSchema;
use crate::store::{MetadataStore, SaveOutcome, StoreError};
use crate::target::{ContentObject, TargetRef};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    /// No path or object could be determined for a lookup — an integration
    /// mistake, surfaced rather than swallowed.
    #[error("no path or object could be determined for the metadata lookup")]
    TargetUnresolvable,
    #[error("unknown metadata group {0:?}")]
    UnknownGroup(String),
    #[error("backend {backend:?} is not active for metadata group {group:?}")]
    InactiveBackend { backend: String, group: String },
    #[error("language {0:?} is not an enabled language")]
    UnknownLanguage(String),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// One metadata group: a definition plus its options, derived schemas, and
/// record store. The backends and schemas are resolved once here, at
/// construction — after this, lookups never touch the registry.
pub struct MetadataGroup {
    def: MetadataDef,
    options: Options,
    backends: Vec<(&'static dyn MetadataBackend, RecordSchema)>,
    store: MetadataStore,
}

impl MetadataGroup {
    pub fn new(def: MetadataDef, options: Options) -> Result<Self, OptionsError> {
        let mut backends = Vec::new();
        for name in options.backends() {
            let backend = registry::lookup(name)?;
            let schema = backend.build_schema(&def, &options);
            backends.push((backend, schema));
        }
        Ok(Self {
            def,
            options,
            backends,
            store: MetadataStore::new(),
        })
    }

    pub fn name(&self) -> &str {
        self.def.name()
    }

    pub fn def(&self) -> &MetadataDef {
        &self.def
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    /// Derived schemas, in active-backend order.
    pub fn schemas(&self) -> impl Iterator<Item = &RecordSchema> {
        self.backends.iter().map(|(_, schema)| schema)
    }

    pub fn store(&self) -> &MetadataStore {
        &self.store
    }

    fn schema_for(&self, backend_name: &str) -> Option<&RecordSchema> {
        self.backends
            .iter()
            .find(|(backend, _)| backend.name() == backend_name)
            .map(|(_, schema)| schema)
    }
}

/// The resolution engine plus its collaborators.
pub struct Engine {
    host: HostConfig,
    groups: Vec<MetadataGroup>,
    resolver: Box<dyn ViewResolver>,
    renderer: Box<dyn ValueRenderer>,
}

impl Engine {
    /// Build an engine for a host. The config's route table becomes the
    /// view resolver; swap in a framework adapter with
    /// [`with_resolver`](Engine::with_resolver).
    pub fn new(host: HostConfig) -> Self {
        let resolver = Box::new(RouteTable::new(host.routes.clone()));
        Self {
            host,
            groups: Vec::new(),
            resolver,
            renderer: Box::new(BraceRenderer),
        }
    }

    pub fn with_group(mut self, group: MetadataGroup) -> Self {
        self.groups.push(group);
        self
    }

    pub fn with_resolver(mut self, resolver: Box<dyn ViewResolver>) -> Self {
        self.resolver = resolver;
        self
    }

    pub fn with_renderer(mut self, renderer: Box<dyn ValueRenderer>) -> Self {
        self.renderer = renderer;
        self
    }

    pub fn host(&self) -> &HostConfig {
        &self.host
    }

    pub fn groups(&self) -> impl Iterator<Item = &MetadataGroup> {
        self.groups.iter()
    }

    /// Select a group by name; `None` means the first registered group.
    pub fn group(&self, name: Option<&str>) -> Result<&MetadataGroup, EngineError> {
        let found = match name {
            Some(name) => self.groups.iter().find(|g| g.name() == name),
            None => self.groups.first(),
        };
        found.ok_or_else(|| EngineError::UnknownGroup(name.unwrap_or("<default>").to_string()))
    }

    fn group_mut(&mut self, name: Option<&str>) -> Result<&mut MetadataGroup, EngineError> {
        let found = match name {
            Some(name) => self.groups.iter_mut().find(|g| g.name() == name),
            None => self.groups.first_mut(),
        };
        found.ok_or_else(|| EngineError::UnknownGroup(name.unwrap_or("<default>").to_string()))
    }

    /// Strict record insert (fixtures, admin-side tooling). Enforces the
    /// derived uniqueness constraints and the enabled-language list.
    pub fn insert_record(
        &mut self,
        group: Option<&str>,
        record: MetadataRecord,
    ) -> Result<(), EngineError> {
        let append_slash = self.host.append_slash;
        let languages = self.host.languages.clone();
        let group = self.group_mut(group)?;
        check_language(&group.options, &languages, &record)?;
        let schema = group.schema_for(&record.backend).cloned().ok_or_else(|| {
            EngineError::InactiveBackend {
                backend: record.backend.clone(),
                group: group.name().to_string(),
            }
        })?;
        group.store.insert(record, &schema, append_slash)?;
        Ok(())
    }

    /// The modelinstance auto-save path: derives the denormalized path
    /// from the linked object and reports (never raises) key conflicts.
    pub fn save_instance_metadata(
        &mut self,
        group: Option<&str>,
        record: MetadataRecord,
        object: Option<&dyn ContentObject>,
    ) -> Result<SaveOutcome, EngineError> {
        let append_slash = self.host.append_slash;
        let languages = self.host.languages.clone();
        let group = self.group_mut(group)?;
        check_language(&group.options, &languages, &record)?;
        let Some(schema) = group.schema_for("modelinstance").cloned() else {
            return Err(EngineError::InactiveBackend {
                backend: "modelinstance".to_string(),
                group: group.name().to_string(),
            });
        };
        Ok(group
            .store
            .save_instance_metadata(record, &schema, append_slash, object))
    }

    /// Resolve metadata for a path target. `path = None` means the caller
    /// could not determine a target at all, which is an error.
    pub fn get_metadata(
        &self,
        path: Option<&str>,
        group: Option<&str>,
        ctx: &mut ResolutionContext<'_>,
        scope: &RequestScope,
    ) -> Result<Option<ResolvedMetadata>, EngineError> {
        let path = path.ok_or(EngineError::TargetUnresolvable)?;
        let group = self.group(group)?;
        let canonical = canonicalize_path(path, self.host.append_slash);
        let target = TargetRef::from_path(canonical);
        Ok(self.resolve_target(group, &target, ctx, scope))
    }

    /// Resolve metadata linked to a content object. The object's URL (when
    /// it has one) also participates, so path-keyed records can match.
    pub fn get_linked_metadata<'a>(
        &self,
        object: &'a dyn ContentObject,
        group: Option<&str>,
        ctx: &mut ResolutionContext<'a>,
        scope: &RequestScope,
    ) -> Result<Option<ResolvedMetadata>, EngineError> {
        let group = self.group(group)?;
        ctx.object = Some(object);
        let path = object
            .absolute_url()
            .map(|url| canonicalize_path(&url, self.host.append_slash));
        let target = TargetRef::from_object(object, path);
        Ok(self.resolve_target(group, &target, ctx, scope))
    }

    fn resolve_target(
        &self,
        group: &MetadataGroup,
        target: &TargetRef<'_>,
        ctx: &mut ResolutionContext<'_>,
        scope: &RequestScope,
    ) -> Option<ResolvedMetadata> {
        let mut scope = scope.clone();
        if scope.site.is_none() && group.options.use_sites() {
            scope.site = Some(self.host.default_site.clone());
        }

        let mut matched = Vec::new();
        for (backend, _) in &group.backends {
            let candidates = backend.scoped_query(group.store.records(), &scope, &group.options);
            if let Some(record) =
                backend.match_record(&candidates, target, ctx, self.resolver.as_ref())
            {
                log::debug!(
                    "{} backend matched a record for group {:?}",
                    backend.name(),
                    group.name()
                );
                matched.push(MatchedRecord {
                    backend: *backend,
                    record: record.clone(),
                });
            }
        }

        let resolved = resolve::resolve_fields(&group.def, &matched, ctx, self.renderer.as_ref());
        if matched.is_empty() && resolved.is_empty() {
            None
        } else {
            Some(resolved)
        }
    }
}

fn check_language(
    options: &Options,
    languages: &[String],
    record: &MetadataRecord,
) -> Result<(), EngineError> {
    if options.use_i18n() {
        if let Some(language) = &record.language {
            if !languages.contains(language) {
                return Err(EngineError::UnknownLanguage(language.clone()));
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definition::FieldDecl;

    fn seo_def() -> MetadataDef {
        MetadataDef::builder("seo")
            .field(FieldDecl::new("title"))
            .build()
            .unwrap()
    }

    fn engine() -> Engine {
        let options = Options::builder().backends(["path"]).build().unwrap();
        let group = MetadataGroup::new(seo_def(), options).unwrap();
        Engine::new(HostConfig::default()).with_group(group)
    }

    #[test]
    fn missing_path_is_target_unresolvable() {
        let engine = engine();
        let mut ctx = ResolutionContext::new();
        let err = engine
            .get_metadata(None, None, &mut ctx, &RequestScope::new())
            .unwrap_err();
        assert!(matches!(err, EngineError::TargetUnresolvable));
    }

    #[test]
    fn unknown_group_is_an_error() {
        let engine = engine();
        let mut ctx = ResolutionContext::new();
        let err = engine
            .get_metadata(Some("/x/"), Some("bogus"), &mut ctx, &RequestScope::new())
            .unwrap_err();
        assert!(matches!(err, EngineError::UnknownGroup(name) if name == "bogus"));
    }

    #[test]
    fn no_match_returns_none() {
        let engine = engine();
        let mut ctx = ResolutionContext::new();
        let result = engine
            .get_metadata(Some("/missing/"), None, &mut ctx, &RequestScope::new())
            .unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn request_path_is_canonicalized_before_matching() {
        let mut engine = engine();
        engine
            .insert_record(
                None,
                MetadataRecord::for_path("/x/?a=1&b=2").with_value("title", "Sorted"),
            )
            .unwrap();
        let mut ctx = ResolutionContext::new();
        let resolved = engine
            .get_metadata(Some("/x?b=2&a=1"), None, &mut ctx, &RequestScope::new())
            .unwrap()
            .unwrap();
        assert_eq!(resolved.get("title"), Some("Sorted"));
    }

    #[test]
    fn i18n_insert_rejects_unknown_language() {
        let options = Options::builder()
            .use_i18n(true)
            .backends(["path"])
            .build()
            .unwrap();
        let group = MetadataGroup::new(seo_def(), options).unwrap();
        let mut engine = Engine::new(HostConfig::default()).with_group(group);
        let err = engine
            .insert_record(None, MetadataRecord::for_path("/x/").with_language("xx"))
            .unwrap_err();
        assert!(matches!(err, EngineError::UnknownLanguage(lang) if lang == "xx"));
    }
}

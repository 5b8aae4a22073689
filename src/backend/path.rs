//! Path backend: metadata keyed by exact canonicalized path.

use super::MetadataBackend;
use crate::context::ResolutionContext;
use crate::definition::PopulateSource;
use crate::record::MetadataRecord;
use crate::routes::ViewResolver;
use crate::schema::SchemaField;
use crate::target::TargetRef;

/// Matches a record whose `_path` equals the target path. Both sides are
/// canonicalized — records at insert time, the request path at lookup time
/// (see [`crate::canonical`]) — so query-string order and trailing slashes
/// never cause a miss.
#[derive(Debug)]
pub struct PathBackend;

impl MetadataBackend for PathBackend {
    fn name(&self) -> &'static str {
        "path"
    }

    fn verbose_name(&self) -> &'static str {
        "Path"
    }

    fn base_unique_together(&self) -> &'static [&'static [&'static str]] {
        &[&["_path"]]
    }

    fn key_fields(&self) -> Vec<SchemaField> {
        vec![SchemaField::key("_path")]
    }

    fn match_record<'s>(
        &self,
        candidates: &[&'s MetadataRecord],
        target: &TargetRef<'_>,
        _ctx: &mut ResolutionContext<'_>,
        _resolver: &dyn ViewResolver,
    ) -> Option<&'s MetadataRecord> {
        let path = target.path.as_deref()?;
        candidates
            .iter()
            .find(|r| r.path.as_deref() == Some(path))
            .copied()
    }

    fn populate_source<'a>(
        &self,
        record: &'a MetadataRecord,
        _ctx: &ResolutionContext<'a>,
    ) -> PopulateSource<'a> {
        PopulateSource::Path(record.path.as_deref().unwrap_or(""))
    }
}

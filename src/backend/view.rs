//! View backend: metadata keyed by a named view rather than a path.

use super::MetadataBackend;
use crate::context::ResolutionContext;
use crate::definition::PopulateSource;
use crate::record::MetadataRecord;
use crate::routes::ViewResolver;
use crate::schema::SchemaField;
use crate::target::TargetRef;

/// Resolves the target path to a view identifier through the host's
/// [`ViewResolver`] and matches a record whose `_view` equals it. A path
/// that fails resolution yields the empty string, which matches records
/// stored with an empty view — so a host can attach catch-all metadata to
/// unrouted paths.
#[derive(Debug)]
pub struct ViewBackend;

impl MetadataBackend for ViewBackend {
    fn name(&self) -> &'static str {
        "view"
    }

    fn verbose_name(&self) -> &'static str {
        "View"
    }

    fn base_unique_together(&self) -> &'static [&'static [&'static str]] {
        &[&["_view"]]
    }

    fn key_fields(&self) -> Vec<SchemaField> {
        vec![SchemaField::key("_view")]
    }

    fn match_record<'s>(
        &self,
        candidates: &[&'s MetadataRecord],
        target: &TargetRef<'_>,
        _ctx: &mut ResolutionContext<'_>,
        resolver: &dyn ViewResolver,
    ) -> Option<&'s MetadataRecord> {
        let path = target.path.as_deref()?;
        let view_name = resolver.resolve_to_name(path).unwrap_or_default();
        candidates
            .iter()
            .find(|r| r.view.as_deref().unwrap_or("") == view_name)
            .copied()
    }

    fn populate_source<'a>(
        &self,
        record: &'a MetadataRecord,
        _ctx: &ResolutionContext<'a>,
    ) -> PopulateSource<'a> {
        PopulateSource::ViewName(record.view.as_deref().unwrap_or(""))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routes::{Route, RouteTable};

    fn resolver() -> RouteTable {
        RouteTable::new(vec![Route {
            pattern: "/products/*".into(),
            name: "product_detail".into(),
        }])
    }

    #[test]
    fn matches_resolved_view_name() {
        let records = [MetadataRecord::for_view("product_detail")];
        let candidates: Vec<&MetadataRecord> = records.iter().collect();
        let mut ctx = ResolutionContext::new();

        let hit = ViewBackend.match_record(
            &candidates,
            &TargetRef::from_path("/products/7/".into()),
            &mut ctx,
            &resolver(),
        );
        assert_eq!(hit.and_then(|r| r.view.as_deref()), Some("product_detail"));
    }

    #[test]
    fn unresolvable_path_matches_empty_view() {
        let records = [MetadataRecord::for_view("")];
        let candidates: Vec<&MetadataRecord> = records.iter().collect();
        let mut ctx = ResolutionContext::new();

        let hit = ViewBackend.match_record(
            &candidates,
            &TargetRef::from_path("/unrouted/".into()),
            &mut ctx,
            &resolver(),
        );
        assert!(hit.is_some());
    }

    #[test]
    fn unresolvable_path_without_empty_view_record_misses() {
        let records = [MetadataRecord::for_view("product_detail")];
        let candidates: Vec<&MetadataRecord> = records.iter().collect();
        let mut ctx = ResolutionContext::new();

        assert!(ViewBackend
            .match_record(
                &candidates,
                &TargetRef::from_path("/unrouted/".into()),
                &mut ctx,
                &resolver(),
            )
            .is_none());
    }
}

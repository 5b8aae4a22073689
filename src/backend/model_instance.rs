//! Modelinstance backend: metadata attached to one content object.

use super::MetadataBackend;
use crate::context::ResolutionContext;
use crate::definition::PopulateSource;
use crate::record::MetadataRecord;
use crate::routes::ViewResolver;
use crate::schema::SchemaField;
use crate::target::{ContentObject, TargetRef};

/// Matches a record by content type + object id when the target is an
/// object, falling back to the record's denormalized `_path` when only a
/// path is known. The `_path` is derived from the linked object's URL at
/// save time (see [`crate::store::MetadataStore::save_instance_metadata`]),
/// which is what makes the path-side match possible at all.
///
/// On a match, this backend writes `content_type` and `model_instance` into
/// the resolution context for the model backend, which runs after it.
#[derive(Debug)]
pub struct ModelInstanceBackend;

impl ModelInstanceBackend {
    fn linked_object<'a>(
        record: &MetadataRecord,
        ctx: &ResolutionContext<'a>,
    ) -> Option<&'a dyn ContentObject> {
        ctx.object.filter(|o| {
            record.content_type.as_deref() == Some(o.content_type())
                && record.object_id == Some(o.object_id())
        })
    }
}

impl MetadataBackend for ModelInstanceBackend {
    fn name(&self) -> &'static str {
        "modelinstance"
    }

    fn verbose_name(&self) -> &'static str {
        "Model Instance"
    }

    fn base_unique_together(&self) -> &'static [&'static [&'static str]] {
        &[&["_path"], &["_content_type", "_object_id"]]
    }

    fn key_fields(&self) -> Vec<SchemaField> {
        vec![
            SchemaField::key_nullable("_path"),
            SchemaField::key("_content_type"),
            SchemaField::key("_object_id"),
        ]
    }

    fn match_record<'s>(
        &self,
        candidates: &[&'s MetadataRecord],
        target: &TargetRef<'_>,
        ctx: &mut ResolutionContext<'_>,
        _resolver: &dyn ViewResolver,
    ) -> Option<&'s MetadataRecord> {
        let found = match target.object {
            Some(object) => candidates
                .iter()
                .find(|r| {
                    r.content_type.as_deref() == Some(object.content_type())
                        && r.object_id == Some(object.object_id())
                })
                .copied(),
            None => {
                let path = target.path.as_deref()?;
                candidates
                    .iter()
                    .find(|r| r.path.as_deref() == Some(path))
                    .copied()
            }
        }?;
        ctx.content_type = found.content_type.clone();
        ctx.model_instance = Some(found.clone());
        Some(found)
    }

    fn populate_source<'a>(
        &self,
        record: &'a MetadataRecord,
        ctx: &ResolutionContext<'a>,
    ) -> PopulateSource<'a> {
        PopulateSource::ModelInstance(Self::linked_object(record, ctx))
    }

    fn render_object<'a>(
        &self,
        record: &MetadataRecord,
        ctx: &ResolutionContext<'a>,
    ) -> Option<&'a dyn ContentObject> {
        Self::linked_object(record, ctx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routes::RouteTable;

    struct Product {
        id: u64,
    }

    impl ContentObject for Product {
        fn content_type(&self) -> &str {
            "product"
        }
        fn object_id(&self) -> u64 {
            self.id
        }
    }

    #[test]
    fn matches_by_content_type_and_id() {
        let records = [
            MetadataRecord::for_instance("product", 1),
            MetadataRecord::for_instance("product", 7),
        ];
        let candidates: Vec<&MetadataRecord> = records.iter().collect();
        let product = Product { id: 7 };
        let mut ctx = ResolutionContext::new();

        let hit = ModelInstanceBackend.match_record(
            &candidates,
            &TargetRef::from_object(&product, None),
            &mut ctx,
            &RouteTable::default(),
        );
        assert_eq!(hit.and_then(|r| r.object_id), Some(7));
    }

    #[test]
    fn falls_back_to_path_when_object_unknown() {
        let mut record = MetadataRecord::for_instance("product", 7);
        record.path = Some("/products/7/".into());
        let records = [record];
        let candidates: Vec<&MetadataRecord> = records.iter().collect();
        let mut ctx = ResolutionContext::new();

        let hit = ModelInstanceBackend.match_record(
            &candidates,
            &TargetRef::from_path("/products/7/".into()),
            &mut ctx,
            &RouteTable::default(),
        );
        assert_eq!(hit.and_then(|r| r.object_id), Some(7));
    }

    #[test]
    fn match_writes_context_keys_for_model_backend() {
        let records = [MetadataRecord::for_instance("product", 7)];
        let candidates: Vec<&MetadataRecord> = records.iter().collect();
        let product = Product { id: 7 };
        let mut ctx = ResolutionContext::new();

        ModelInstanceBackend.match_record(
            &candidates,
            &TargetRef::from_object(&product, None),
            &mut ctx,
            &RouteTable::default(),
        );
        assert_eq!(ctx.content_type.as_deref(), Some("product"));
        assert!(ctx.model_instance.is_some());
    }

    #[test]
    fn render_object_requires_matching_identity() {
        let record = MetadataRecord::for_instance("product", 7);
        let other = Product { id: 8 };
        let ctx = ResolutionContext::new().with_object(&other);
        assert!(ModelInstanceBackend.render_object(&record, &ctx).is_none());

        let same = Product { id: 7 };
        let ctx = ResolutionContext::new().with_object(&same);
        assert!(ModelInstanceBackend.render_object(&record, &ctx).is_some());
    }
}

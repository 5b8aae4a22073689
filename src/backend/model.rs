//! Model backend: type-wide fallback metadata.

use super::MetadataBackend;
use crate::context::ResolutionContext;
use crate::definition::PopulateSource;
use crate::options::{Options, OptionsError};
use crate::record::MetadataRecord;
use crate::routes::ViewResolver;
use crate::schema::SchemaField;
use crate::target::{ContentObject, TargetRef};

/// Matches a record by content type alone, independent of which instance is
/// being rendered — the fallback default for every object of a type, with
/// instance-specific records (the modelinstance backend) taking precedence
/// by running earlier.
///
/// The content type comes from the resolution context: either written there
/// by a modelinstance match, or derived from the current content object.
/// With neither present the backend cannot match.
#[derive(Debug)]
pub struct ModelBackend;

impl MetadataBackend for ModelBackend {
    fn name(&self) -> &'static str {
        "model"
    }

    fn verbose_name(&self) -> &'static str {
        "Model"
    }

    fn base_unique_together(&self) -> &'static [&'static [&'static str]] {
        &[&["_content_type"]]
    }

    fn key_fields(&self) -> Vec<SchemaField> {
        vec![SchemaField::key("_content_type")]
    }

    fn match_record<'s>(
        &self,
        candidates: &[&'s MetadataRecord],
        target: &TargetRef<'_>,
        ctx: &mut ResolutionContext<'_>,
        _resolver: &dyn ViewResolver,
    ) -> Option<&'s MetadataRecord> {
        let content_type = ctx
            .content_type
            .clone()
            .or_else(|| ctx.object.map(|o| o.content_type().to_string()))
            .or_else(|| target.object.map(|o| o.content_type().to_string()))?;
        candidates
            .iter()
            .find(|r| r.content_type.as_deref() == Some(content_type.as_str()))
            .copied()
    }

    fn populate_source<'a>(
        &self,
        record: &'a MetadataRecord,
        _ctx: &ResolutionContext<'a>,
    ) -> PopulateSource<'a> {
        PopulateSource::ContentType(record.content_type.as_deref().unwrap_or(""))
    }

    fn render_object<'a>(
        &self,
        record: &MetadataRecord,
        ctx: &ResolutionContext<'a>,
    ) -> Option<&'a dyn ContentObject> {
        ctx.object
            .filter(|o| record.content_type.as_deref() == Some(o.content_type()))
    }

    /// The model backend only works when the modelinstance backend runs
    /// first: instance-specific records must win, and the modelinstance
    /// match is what feeds this backend its content type.
    fn validate(&self, options: &Options) -> Result<(), OptionsError> {
        let backends = options.backends();
        let Some(model_pos) = backends.iter().position(|n| n == "model") else {
            return Ok(());
        };
        match backends.iter().position(|n| n == "modelinstance") {
            None => Err(OptionsError::BackendOrdering(
                "metadata backend 'modelinstance' must be installed in order to use the \
                 'model' backend"
                    .to_string(),
            )),
            Some(instance_pos) if instance_pos > model_pos => {
                Err(OptionsError::BackendOrdering(
                    "metadata backend 'modelinstance' must come before the 'model' backend"
                        .to_string(),
                ))
            }
            Some(_) => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routes::RouteTable;

    struct Product;

    impl ContentObject for Product {
        fn content_type(&self) -> &str {
            "product"
        }
        fn object_id(&self) -> u64 {
            1
        }
    }

    #[test]
    fn matches_using_context_content_type() {
        let records = [MetadataRecord::for_content_type("product")];
        let candidates: Vec<&MetadataRecord> = records.iter().collect();
        let mut ctx = ResolutionContext::new();
        ctx.content_type = Some("product".into());
        let target = TargetRef::from_path("/products/7/".into());

        let hit = ModelBackend.match_record(&candidates, &target, &mut ctx, &RouteTable::default());
        assert!(hit.is_some());
    }

    #[test]
    fn matches_using_current_object_when_no_earlier_match() {
        let records = [MetadataRecord::for_content_type("product")];
        let candidates: Vec<&MetadataRecord> = records.iter().collect();
        let product = Product;
        let mut ctx = ResolutionContext::new().with_object(&product);
        let target = TargetRef::from_path("/products/7/".into());

        let hit = ModelBackend.match_record(&candidates, &target, &mut ctx, &RouteTable::default());
        assert!(hit.is_some());
    }

    #[test]
    fn no_content_type_anywhere_means_no_match() {
        let records = [MetadataRecord::for_content_type("product")];
        let candidates: Vec<&MetadataRecord> = records.iter().collect();
        let mut ctx = ResolutionContext::new();
        let target = TargetRef::from_path("/products/7/".into());

        assert!(ModelBackend
            .match_record(&candidates, &target, &mut ctx, &RouteTable::default())
            .is_none());
    }
}

//! Targets — the things metadata is requested for.
//!
//! A target is either a plain path string or a content object (an article, a
//! product, …) from the hosting application. Content objects are abstracted
//! behind the [`ContentObject`] trait so the engine never depends on how the
//! host stores its domain data: it only needs a type name, an id, optionally
//! a URL, and attribute access for template substitution.

/// A domain object that metadata can be attached to.
///
/// Implemented by the hosting application for anything that should be
/// addressable by the modelinstance and model backends.
pub trait ContentObject {
    /// Stable type name, lowercase by convention (e.g. `"product"`).
    ///
    /// This doubles as the object's key in template substitution:
    /// a stored value `"Buy {{ product.name }}"` resolves against an object
    /// whose `content_type()` is `"product"`.
    fn content_type(&self) -> &str;

    /// Identifier unique within the content type.
    fn object_id(&self) -> u64;

    /// The object's canonical URL, if it has one. Used to derive the
    /// denormalized path on instance metadata records at save time.
    fn absolute_url(&self) -> Option<String> {
        None
    }

    /// Look up a named attribute for template substitution.
    fn attribute(&self, _name: &str) -> Option<String> {
        None
    }
}

/// A resolved lookup target: the canonicalized path (when one could be
/// determined) and/or the concrete content object.
///
/// Built by the engine from the caller's input — `get_metadata` supplies a
/// path, `get_linked_metadata` supplies an object (and derives a path from
/// its URL when it has one). Backends read whichever side they match on.
pub struct TargetRef<'a> {
    pub path: Option<String>,
    pub object: Option<&'a dyn ContentObject>,
}

impl<'a> TargetRef<'a> {
    pub fn from_path(path: String) -> Self {
        Self {
            path: Some(path),
            object: None,
        }
    }

    pub fn from_object(object: &'a dyn ContentObject, path: Option<String>) -> Self {
        Self {
            path,
            object: Some(object),
        }
    }
}

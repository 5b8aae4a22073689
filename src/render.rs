//! Template substitution for stored values.
//!
//! Stored metadata values may embed `{{ variable }}` tokens — a title like
//! `"Buy {{ product.name }}"` is stored once on a model record and rendered
//! per instance. Substitution is deliberately bounded: a token is a dotted
//! variable path, looked up against the current content object (under the
//! key its `content_type()` provides) and the ambient view context. No
//! tags, no filters, no code execution.
//!
//! The capability is pluggable through [`ValueRenderer`] so a host embedding
//! a real template engine can swap one in; [`BraceRenderer`] is the default.
//!
//! Failure handling, matching the resolution contract:
//! - no rendering context at all (no object, empty view context) → the
//!   value is returned unrendered;
//! - an unknown variable inside an otherwise renderable value substitutes
//!   the empty string.

use crate::target::ContentObject;
use std::collections::BTreeMap;

/// Renders resolved values that look like templates.
pub trait ValueRenderer: Sync {
    /// Cheap check deciding whether [`render`](ValueRenderer::render) runs
    /// at all; values without tokens skip the render pass entirely.
    fn looks_like_template(&self, value: &str) -> bool;

    fn render(
        &self,
        value: &str,
        object: Option<&dyn ContentObject>,
        view_context: &BTreeMap<String, String>,
    ) -> String;
}

/// The built-in `{{ var.attr }}` substituter.
#[derive(Debug, Clone, Copy, Default)]
pub struct BraceRenderer;

impl ValueRenderer for BraceRenderer {
    fn looks_like_template(&self, value: &str) -> bool {
        value.contains("{{")
    }

    fn render(
        &self,
        value: &str,
        object: Option<&dyn ContentObject>,
        view_context: &BTreeMap<String, String>,
    ) -> String {
        if object.is_none() && view_context.is_empty() {
            // Nothing to render against; hand the value back untouched.
            return value.to_string();
        }

        let mut out = String::with_capacity(value.len());
        let mut rest = value;
        while let Some(start) = rest.find("{{") {
            out.push_str(&rest[..start]);
            let after = &rest[start + 2..];
            match after.find("}}") {
                Some(end) => {
                    let expr = after[..end].trim();
                    out.push_str(&lookup(expr, object, view_context));
                    rest = &after[end + 2..];
                }
                None => {
                    // Unterminated token; keep the tail verbatim.
                    out.push_str(&rest[start..]);
                    rest = "";
                }
            }
        }
        out.push_str(rest);
        out
    }
}

/// Resolve one dotted variable path. Unknown variables become the empty
/// string.
fn lookup(
    expr: &str,
    object: Option<&dyn ContentObject>,
    view_context: &BTreeMap<String, String>,
) -> String {
    let mut segments = expr.split('.');
    let Some(head) = segments.next().filter(|s| !s.is_empty()) else {
        return String::new();
    };

    if let Some(object) = object {
        if head == object.content_type() {
            // Walk the remaining segments as attributes; anything past a
            // leaf string yields nothing.
            let mut current: Option<String> = None;
            for segment in segments {
                current = match current {
                    None => object.attribute(segment),
                    Some(_) => None,
                };
                if current.is_none() {
                    return String::new();
                }
            }
            return current.unwrap_or_default();
        }
    }

    if segments.next().is_none() {
        if let Some(value) = view_context.get(head) {
            return value.clone();
        }
    }
    String::new()
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Product;

    impl ContentObject for Product {
        fn content_type(&self) -> &str {
            "product"
        }
        fn object_id(&self) -> u64 {
            1
        }
        fn attribute(&self, name: &str) -> Option<String> {
            match name {
                "name" => Some("Widget".to_string()),
                _ => None,
            }
        }
    }

    fn ctx(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn substitutes_object_attribute() {
        let rendered = BraceRenderer.render("Buy {{ product.name }}", Some(&Product), &ctx(&[]));
        assert_eq!(rendered, "Buy Widget");
    }

    #[test]
    fn plain_value_skips_render() {
        assert!(!BraceRenderer.looks_like_template("Plain title"));
    }

    #[test]
    fn substitutes_view_context_variable() {
        let rendered = BraceRenderer.render(
            "Results for {{ query }}",
            None,
            &ctx(&[("query", "widgets")]),
        );
        assert_eq!(rendered, "Results for widgets");
    }

    #[test]
    fn unknown_variable_becomes_empty() {
        let rendered = BraceRenderer.render("Hello {{ nobody }}!", None, &ctx(&[("x", "y")]));
        assert_eq!(rendered, "Hello !");
    }

    #[test]
    fn unknown_object_attribute_becomes_empty() {
        let rendered = BraceRenderer.render("{{ product.missing }}", Some(&Product), &ctx(&[]));
        assert_eq!(rendered, "");
    }

    #[test]
    fn missing_context_returns_value_unrendered() {
        let rendered = BraceRenderer.render("Buy {{ product.name }}", None, &ctx(&[]));
        assert_eq!(rendered, "Buy {{ product.name }}");
    }

    #[test]
    fn unterminated_token_kept_verbatim() {
        let rendered = BraceRenderer.render("Oops {{ product.name", Some(&Product), &ctx(&[]));
        assert_eq!(rendered, "Oops {{ product.name");
    }

    #[test]
    fn multiple_tokens_in_one_value() {
        let rendered = BraceRenderer.render(
            "{{ product.name }} — {{ tagline }}",
            Some(&Product),
            &ctx(&[("tagline", "built to last")]),
        );
        assert_eq!(rendered, "Widget — built to last");
    }
}

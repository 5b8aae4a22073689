//! # Sitemeta
//!
//! Structured page metadata for content-driven sites. Titles, descriptions,
//! and social tags are stored against *targets* — URL paths, named views,
//! individual content objects, or whole content types — and resolved at
//! render time, each field through a deterministic precedence chain over
//! stored values, computed defaults, aliases, and template substitution.
//!
//! # Architecture: Match, Then Resolve
//!
//! Every lookup runs the same two-phase pipeline:
//!
//! ```text
//! 1. Match     target  →  backends (in order)  →  matched records
//! 2. Resolve   records →  per-field precedence  →  ResolvedMetadata
//! ```
//!
//! The match phase walks the configured backends in order. Each backend is
//! one matching strategy — exact path, resolved view name, content object
//! identity, content type — and sees only the records the query scope lets
//! through for the requested site/language/subdomain. Backends communicate
//! forward through an explicit resolution context: the modelinstance
//! backend hands the content type it matched to the model backend, which is
//! how instance-specific records override type-wide defaults.
//!
//! The resolve phase never touches storage again: it walks the matched
//! records per field, in backend order, applying the precedence chain
//! documented in [`resolve`].
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`engine`] | Entry points (`get_metadata`, `get_linked_metadata`), groups, wiring |
//! | [`backend`] | The `MetadataBackend` trait and the four built-in strategies |
//! | [`registry`] | Process-wide backend name registry, populated at startup |
//! | [`options`] | Per-group axis flags + active backend list, validated at construction |
//! | [`definition`] | Programmatic field declaration: editable flags, populate-from sources |
//! | [`schema`] | Derived record schemas with composite uniqueness tuples |
//! | [`record`] | Stored metadata rows |
//! | [`store`] | In-memory record store, uniqueness enforcement, JSON fixtures |
//! | [`resolve`] | The per-field value resolution chain |
//! | [`render`] | Bounded `{{ var.attr }}` template substitution |
//! | [`canonical`] | Path canonicalization (trailing slash, sorted query params) |
//! | [`routes`] | `ViewResolver` trait + the built-in route table |
//! | [`context`] | Per-request resolution context and scope |
//! | [`target`] | `ContentObject` trait and target references |
//! | [`config`] | `sitemeta.toml` host configuration |
//!
//! # Design Decisions
//!
//! ## A Closed Backend Set Behind One Trait
//!
//! The four matching strategies are unit structs behind a single trait, not
//! an inheritance tree. What varies per backend is small — key fields, base
//! uniqueness tuples, the match itself — so everything cross-cutting
//! (folding enabled axes into uniqueness constraints, schema building,
//! scope filtering) lives in trait default methods. The registry is a plain
//! name → backend map built at startup; hosts can register their own
//! strategies before serving begins.
//!
//! ## Schemas Are Derived, Not Declared
//!
//! The shape of a stored record depends on configuration: enabling the
//! sites axis adds a `_site` column to every backend's schema *and* to
//! every uniqueness tuple. Rather than hardcoding each combination, each
//! backend derives an introspectable [`schema::RecordSchema`] once at group
//! construction. The store enforces exactly what the schema says — nothing
//! is injected at runtime.
//!
//! ## Resolution Is a Chain, Not a Lookup
//!
//! A field's value can come from the matched record, from a populate-from
//! fallback (callable, literal, or alias), from a definition attribute, and
//! any of those can embed `{{ ... }}` tokens rendered against the current
//! content object. The chain is fixed and documented in [`resolve`]; the
//! one subtlety worth calling out is that an explicitly stored *empty*
//! value falls through to the fallback rather than winning.
//!
//! ## Bounded Template Substitution
//!
//! Stored values are data, so the substitution language is deliberately
//! tiny: dotted variable paths against an explicit, bounded context. No
//! tags, no filters, no code execution. Hosts with a real template engine
//! can plug it in through [`render::ValueRenderer`].

pub mod backend;
pub mod canonical;
pub mod config;
pub mod context;
pub mod definition;
pub mod engine;
pub mod options;
pub mod record;
pub mod registry;
pub mod render;
pub mod resolve;
pub mod routes;
pub mod schema;
pub mod store;
pub mod target;

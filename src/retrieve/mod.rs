//! Entity retrieval: resolving fuzzy text to graph entities and expanding
//! each entity into its structured neighborhood.
//!
//! - [`entity_cache`]: per-category `(label, identifier)` lists built once at startup
//! - [`matcher`]: partial-ratio fuzzy matching against the entity cache
//! - [`details`]: all outgoing property values of one entity
//! - [`expand`]: category-specific relationship expansion

pub mod details;
pub mod entity_cache;
pub mod expand;
pub mod matcher;

pub use details::EntityDetails;
pub use entity_cache::{EntityCache, EntityEntry};
pub use expand::{RelatedEntity, RelationshipBundle, Relationships};
pub use matcher::EntityMatch;

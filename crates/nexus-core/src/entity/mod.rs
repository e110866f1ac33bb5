//! Entity model and cross-source fusion.

pub mod merge;
pub mod types;

pub use merge::EntityEnvelope;
pub use types::{Architecture, EntityStats, EntityType, FusedEntity, RawRecord, Relation, RelationKind};

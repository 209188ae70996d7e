//! Role catalog: relational model, entity store and relationship resolver.

mod error;
mod resolver;
mod schema;
mod seed;
mod store;
mod types;

pub use error::CatalogError;
pub use resolver::CatalogResolver;
pub use schema::{SCHEMA, SCHEMA_VERSION};
pub use seed::{
    bootstrap, CategoryKnowledgeLink, PathwayKnowledgeLink, RoleKnowledgeLink, RolePathwayLink,
    RoleQualityLink, SeedData,
};
pub use store::{default_database_path, CatalogStore};
pub use types::{
    dedup_by_id, group_by_level, Category, Entity, EntityKind, Knowledge, KnowledgeDetail,
    LevelGroup, Pathway, PathwayDetail, PathwayItem, Quality, QualityDetail, Role, RoleDetail,
    RoleKnowledge,
};

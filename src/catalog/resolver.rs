//! Relationship resolver: rebuilds denormalized views from the join tables.

use super::error::CatalogError;
use super::store::CatalogStore;
use super::types::{
    dedup_by_id, group_by_level, KnowledgeDetail, PathwayDetail, QualityDetail, RoleDetail,
};

/// Resolves an entity together with everything related to it.
///
/// The resolver owns a handle to an already bootstrapped store; it never
/// writes.
#[derive(Debug, Clone)]
pub struct CatalogResolver {
    store: CatalogStore,
}

impl CatalogResolver {
    /// Create a resolver over `store`.
    #[must_use]
    pub fn new(store: CatalogStore) -> Self {
        Self { store }
    }

    /// The underlying store, for plain listings.
    #[must_use]
    pub fn store(&self) -> &CatalogStore {
        &self.store
    }

    /// A role with its qualities, knowledge items and pathways.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::NotFound`] if no role has this id.
    pub async fn role_detail(&self, role_id: i64) -> Result<RoleDetail, CatalogError> {
        let role = self.store.get_role_by_id(role_id).await?;

        let qualities = self.store.role_qualities(role.id).await?;
        let knowledge = self.store.role_knowledge(role.id).await?;
        let pathways = self.store.role_pathways(role.id).await?;

        Ok(RoleDetail {
            role,
            qualities: dedup_by_id(qualities, |q| q.id),
            knowledge: dedup_by_id(knowledge, |k| k.knowledge.id),
            pathways: dedup_by_id(pathways, |p| p.id),
        })
    }

    /// A quality with the roles requiring it and the pathways those roles follow.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::NotFound`] if no quality has this name.
    pub async fn quality_detail(&self, name: &str) -> Result<QualityDetail, CatalogError> {
        let quality = self.store.get_quality_by_name(name).await?;

        let roles = self.store.quality_roles(quality.id).await?;
        let pathways = self.store.quality_pathways(quality.id).await?;

        Ok(QualityDetail {
            quality,
            roles: dedup_by_id(roles, |r| r.id),
            pathways: dedup_by_id(pathways, |p| p.id),
        })
    }

    /// A knowledge item with its roles, pathways, categories and related items.
    ///
    /// Pathways come from the direct pathway/knowledge relation.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::NotFound`] if no knowledge item has this name.
    pub async fn knowledge_detail(&self, name: &str) -> Result<KnowledgeDetail, CatalogError> {
        let knowledge = self.store.get_knowledge_by_name(name).await?;

        let roles = self.store.knowledge_roles(knowledge.id).await?;
        let pathways = self.store.knowledge_pathways(knowledge.id).await?;
        let categories = self.store.knowledge_categories(knowledge.id).await?;
        let related = self.store.related_knowledge(knowledge.id).await?;

        Ok(KnowledgeDetail {
            knowledge,
            roles: dedup_by_id(roles, |r| r.id),
            pathways: dedup_by_id(pathways, |p| p.id),
            categories: dedup_by_id(categories, |c| c.id),
            related: dedup_by_id(related, |k| k.id),
        })
    }

    /// A pathway with its knowledge items grouped by level and its roles.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::NotFound`] if no pathway has this name.
    pub async fn pathway_detail(&self, name: &str) -> Result<PathwayDetail, CatalogError> {
        let pathway = self.store.get_pathway_by_name(name).await?;

        let items = self.store.pathway_items(pathway.id).await?;
        let roles = self.store.pathway_roles(pathway.id).await?;

        Ok(PathwayDetail {
            pathway,
            knowledge_by_level: group_by_level(items),
            roles: dedup_by_id(roles, |r| r.id),
        })
    }
}

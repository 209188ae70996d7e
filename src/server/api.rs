//! Response types for the catalog HTTP endpoints.

use serde::{Deserialize, Serialize};

use crate::catalog::{
    Entity, KnowledgeDetail, LevelGroup, PathwayDetail, QualityDetail, RoleDetail,
};

/// An entity as returned by the listing endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityResponse {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
}

impl From<Entity> for EntityResponse {
    fn from(entity: Entity) -> Self {
        Self {
            id: entity.id,
            name: entity.name,
            description: entity.description,
        }
    }
}

/// A link to another entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityRef {
    pub id: i64,
    pub name: String,
}

impl From<Entity> for EntityRef {
    fn from(entity: Entity) -> Self {
        Self {
            id: entity.id,
            name: entity.name,
        }
    }
}

fn refs(entities: Vec<Entity>) -> Vec<EntityRef> {
    entities.into_iter().map(EntityRef::from).collect()
}

fn names(entities: Vec<Entity>) -> Vec<String> {
    entities.into_iter().map(|e| e.name).collect()
}

/// Response for GET /roles/{id}.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoleResponse {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub qualities: Vec<String>,
    pub knowledge: Vec<String>,
    pub pathways: Vec<String>,
}

impl From<RoleDetail> for RoleResponse {
    fn from(detail: RoleDetail) -> Self {
        Self {
            id: detail.role.id,
            name: detail.role.name,
            description: detail.role.description,
            qualities: names(detail.qualities),
            knowledge: detail
                .knowledge
                .into_iter()
                .map(|k| k.knowledge.name)
                .collect(),
            pathways: names(detail.pathways),
        }
    }
}

/// Response for GET /qualities/{name}.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QualityResponse {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub roles: Vec<String>,
    pub pathways: Vec<String>,
}

impl From<QualityDetail> for QualityResponse {
    fn from(detail: QualityDetail) -> Self {
        Self {
            id: detail.quality.id,
            name: detail.quality.name,
            description: detail.quality.description,
            roles: names(detail.roles),
            pathways: names(detail.pathways),
        }
    }
}

/// Response for GET /knowledge/{name}.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnowledgeResponse {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub roles: Vec<EntityRef>,
    pub pathways: Vec<EntityRef>,
    pub categories: Vec<String>,
    /// Items sharing a pathway with this one.
    pub related: Vec<EntityRef>,
}

impl From<KnowledgeDetail> for KnowledgeResponse {
    fn from(detail: KnowledgeDetail) -> Self {
        Self {
            id: detail.knowledge.id,
            name: detail.knowledge.name,
            description: detail.knowledge.description,
            roles: refs(detail.roles),
            pathways: refs(detail.pathways),
            categories: detail.categories.into_iter().map(|c| c.name).collect(),
            related: refs(detail.related),
        }
    }
}

/// One knowledge item of a pathway, flattened out of its level bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathwayKnowledgeResponse {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub level: i64,
    pub key: bool,
    pub optional: bool,
}

/// Response for GET /pathways/{name}.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathwayResponse {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    /// Items in ascending level order, relation order within a level.
    pub knowledge: Vec<PathwayKnowledgeResponse>,
    /// The same items grouped by level.
    pub levels: Vec<LevelGroup>,
    pub roles: Vec<EntityRef>,
}

impl From<PathwayDetail> for PathwayResponse {
    fn from(detail: PathwayDetail) -> Self {
        let knowledge = detail
            .knowledge_by_level
            .iter()
            .flat_map(|group| {
                group.items.iter().map(|item| PathwayKnowledgeResponse {
                    id: item.knowledge.id,
                    name: item.knowledge.name.clone(),
                    description: item.knowledge.description.clone(),
                    level: group.level,
                    key: item.key,
                    optional: item.optional,
                })
            })
            .collect();

        Self {
            id: detail.pathway.id,
            name: detail.pathway.name,
            description: detail.pathway.description,
            knowledge,
            levels: detail.knowledge_by_level,
            roles: refs(detail.roles),
        }
    }
}

/// Response for GET /health.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    /// Number of roles in the catalog.
    pub roles: u64,
}

impl HealthResponse {
    #[must_use]
    pub fn ok(roles: u64) -> Self {
        Self {
            status: "ok".to_string(),
            roles,
        }
    }
}

/// Body of every error response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Machine-readable code: `not_found`, `validation_error` or `storage_error`.
    pub error: String,
    /// Human-readable message.
    pub message: String,
}

impl ErrorResponse {
    #[must_use]
    pub fn new(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
        }
    }
}

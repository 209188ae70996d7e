//! HTTP handlers for the catalog API.

use axum::extract::{Path, State};
use axum::Json;

use super::api::{
    EntityResponse, HealthResponse, KnowledgeResponse, PathwayResponse, QualityResponse,
    RoleResponse,
};
use super::error::ApiError;
use crate::catalog::{CatalogResolver, Category, Entity};

/// Application state shared across all handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Resolver over the bootstrapped store.
    pub resolver: CatalogResolver,
}

impl AppState {
    #[must_use]
    pub fn new(resolver: CatalogResolver) -> Self {
        Self { resolver }
    }
}

fn entity_list(entities: Vec<Entity>) -> Json<Vec<EntityResponse>> {
    Json(entities.into_iter().map(EntityResponse::from).collect())
}

/// GET /health - Liveness plus a role count.
pub async fn get_health(State(state): State<AppState>) -> Result<Json<HealthResponse>, ApiError> {
    let roles = state.resolver.store().count_roles().await?;
    Ok(Json(HealthResponse::ok(roles)))
}

/// GET /roles - All roles.
pub async fn list_roles(
    State(state): State<AppState>,
) -> Result<Json<Vec<EntityResponse>>, ApiError> {
    Ok(entity_list(state.resolver.store().list_roles().await?))
}

/// GET /roles/:id - A role with its qualities, knowledge and pathways.
pub async fn get_role(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<RoleResponse>, ApiError> {
    let role_id: i64 = id
        .parse()
        .map_err(|_| ApiError::BadRequest(format!("Invalid role id: {id}")))?;
    let detail = state.resolver.role_detail(role_id).await?;
    Ok(Json(detail.into()))
}

/// GET /roles/ - An empty id, always rejected.
pub async fn get_role_blank(
    State(state): State<AppState>,
) -> Result<Json<RoleResponse>, ApiError> {
    get_role(State(state), Path(String::new())).await
}

/// GET /qualities - All qualities.
pub async fn list_qualities(
    State(state): State<AppState>,
) -> Result<Json<Vec<EntityResponse>>, ApiError> {
    Ok(entity_list(state.resolver.store().list_qualities().await?))
}

/// GET /qualities/:name - A quality with its roles and their pathways.
pub async fn get_quality(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<QualityResponse>, ApiError> {
    let detail = state.resolver.quality_detail(&name).await?;
    Ok(Json(detail.into()))
}

/// GET /qualities/ - The empty name, which matches no quality.
pub async fn get_quality_blank(
    State(state): State<AppState>,
) -> Result<Json<QualityResponse>, ApiError> {
    get_quality(State(state), Path(String::new())).await
}

/// GET /knowledge - All knowledge items.
pub async fn list_knowledge(
    State(state): State<AppState>,
) -> Result<Json<Vec<EntityResponse>>, ApiError> {
    Ok(entity_list(state.resolver.store().list_knowledge().await?))
}

/// GET /knowledge/:name - A knowledge item with roles, pathways and neighbours.
pub async fn get_knowledge(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<KnowledgeResponse>, ApiError> {
    let detail = state.resolver.knowledge_detail(&name).await?;
    Ok(Json(detail.into()))
}

/// GET /knowledge/ - The empty name, which matches no knowledge item.
pub async fn get_knowledge_blank(
    State(state): State<AppState>,
) -> Result<Json<KnowledgeResponse>, ApiError> {
    get_knowledge(State(state), Path(String::new())).await
}

/// GET /pathways - All pathways.
pub async fn list_pathways(
    State(state): State<AppState>,
) -> Result<Json<Vec<EntityResponse>>, ApiError> {
    Ok(entity_list(state.resolver.store().list_pathways().await?))
}

/// GET /pathways/:name - A pathway with its leveled knowledge and roles.
pub async fn get_pathway(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<PathwayResponse>, ApiError> {
    let detail = state.resolver.pathway_detail(&name).await?;
    Ok(Json(detail.into()))
}

/// GET /pathways/ - The empty name, which matches no pathway.
pub async fn get_pathway_blank(
    State(state): State<AppState>,
) -> Result<Json<PathwayResponse>, ApiError> {
    get_pathway(State(state), Path(String::new())).await
}

/// GET /categories - All knowledge categories.
pub async fn list_categories(
    State(state): State<AppState>,
) -> Result<Json<Vec<Category>>, ApiError> {
    Ok(Json(state.resolver.store().list_categories().await?))
}

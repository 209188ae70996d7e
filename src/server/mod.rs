//! Read-only HTTP surface over the catalog.

mod api;
mod error;
mod handlers;
mod server;

pub use api::{
    EntityRef, EntityResponse, ErrorResponse, HealthResponse, KnowledgeResponse,
    PathwayKnowledgeResponse, PathwayResponse, QualityResponse, RoleResponse,
};
pub use error::{ApiError, ServerError};
pub use handlers::AppState;
pub use server::CatalogServer;

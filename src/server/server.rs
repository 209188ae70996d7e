//! Catalog HTTP server with axum router and graceful shutdown.

use axum::routing::get;
use axum::Router;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use super::error::ServerError;
use super::handlers::{
    get_health, get_knowledge, get_knowledge_blank, get_pathway, get_pathway_blank, get_quality,
    get_quality_blank, get_role, get_role_blank, list_categories, list_knowledge, list_pathways,
    list_qualities, list_roles, AppState,
};
use crate::catalog::CatalogResolver;
use crate::config::ServerConfig;

/// Read-only HTTP server over a bootstrapped catalog.
pub struct CatalogServer {
    /// Server configuration.
    config: ServerConfig,
    /// Application state shared across handlers.
    state: AppState,
    /// Triggers graceful shutdown.
    cancel: CancellationToken,
}

impl CatalogServer {
    /// Create a new server with default configuration.
    #[must_use]
    pub fn new(resolver: CatalogResolver) -> Self {
        Self {
            config: ServerConfig::default(),
            state: AppState::new(resolver),
            cancel: CancellationToken::new(),
        }
    }

    /// Set the server configuration (builder pattern).
    #[must_use]
    pub fn with_config(mut self, config: ServerConfig) -> Self {
        self.config = config;
        self
    }

    /// Use an external cancellation token for shutdown (builder pattern).
    #[must_use]
    pub fn with_cancel(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Token that stops the server when cancelled.
    #[must_use]
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Get the configured address as a string.
    #[must_use]
    pub fn address(&self) -> String {
        self.config.address()
    }

    /// Build the axum router with all routes and middleware.
    pub fn build_router(&self) -> Router {
        let router = Router::new()
            .route("/health", get(get_health))
            .route("/roles", get(list_roles))
            .route("/roles/", get(get_role_blank))
            .route("/roles/:id", get(get_role))
            .route("/qualities", get(list_qualities))
            .route("/qualities/", get(get_quality_blank))
            .route("/qualities/:name", get(get_quality))
            .route("/knowledge", get(list_knowledge))
            .route("/knowledge/", get(get_knowledge_blank))
            .route("/knowledge/:name", get(get_knowledge))
            .route("/pathways", get(list_pathways))
            .route("/pathways/", get(get_pathway_blank))
            .route("/pathways/:name", get(get_pathway))
            .route("/categories", get(list_categories))
            .with_state(self.state.clone())
            .fallback_service(ServeDir::new(&self.config.static_dir))
            .layer(TraceLayer::new_for_http());

        if self.config.cors_permissive {
            router.layer(CorsLayer::permissive())
        } else {
            router
        }
    }

    /// Run the server, binding to the configured address.
    ///
    /// The server will run until the cancellation token is triggered,
    /// at which point it will perform a graceful shutdown.
    ///
    /// # Errors
    ///
    /// Returns an error if the server fails to bind or serve.
    pub async fn run(self) -> Result<(), ServerError> {
        let address = self.address();
        let listener = TcpListener::bind(&address)
            .await
            .map_err(|source| ServerError::Bind { address, source })?;
        self.serve(listener).await
    }

    /// Serve on an already bound listener until cancelled.
    ///
    /// # Errors
    ///
    /// Returns an error if serving fails.
    pub async fn serve(self, listener: TcpListener) -> Result<(), ServerError> {
        let cancel = self.cancel.clone();
        let app = self.build_router();

        match listener.local_addr() {
            Ok(addr) => tracing::info!(address = %addr, "Starting catalog server"),
            Err(_) => tracing::info!("Starting catalog server"),
        }

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                cancel.cancelled().await;
                tracing::info!("Catalog server shutting down gracefully");
            })
            .await
            .map_err(ServerError::Serve)
    }
}

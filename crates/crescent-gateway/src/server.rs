// SPDX-FileCopyrightText: 2026 Crescent Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Gateway HTTP server built on axum.
//!
//! Sets up routes, middleware, and shared state for the gateway.

use std::future::Future;
use std::sync::Arc;

use axum::{
    routing::{delete, get},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crescent_core::{CrescentError, SettingsStore, StorageAdapter};

use crate::handlers;

/// Shared state for axum request handlers.
pub struct GatewayState<S> {
    /// The adapter chosen at startup.
    pub storage: Arc<S>,
    /// Endpoint settings, when the wired backend stores them.
    pub settings: Option<Arc<dyn SettingsStore>>,
    /// Process start time for uptime calculation.
    pub start_time: std::time::Instant,
}

impl<S> Clone for GatewayState<S> {
    fn clone(&self) -> Self {
        Self {
            storage: Arc::clone(&self.storage),
            settings: self.settings.clone(),
            start_time: self.start_time,
        }
    }
}

impl<S: StorageAdapter> GatewayState<S> {
    /// State over a backend without a settings store.
    pub fn new(storage: Arc<S>) -> Self {
        Self {
            storage,
            settings: None,
            start_time: std::time::Instant::now(),
        }
    }

    /// State over a backend that also stores endpoint settings.
    pub fn with_settings(storage: Arc<S>) -> Self
    where
        S: SettingsStore,
    {
        let settings: Arc<dyn SettingsStore> = storage.clone();
        Self {
            settings: Some(settings),
            ..Self::new(storage)
        }
    }
}

/// Gateway server configuration (mirrors `[server]` from crescent-config).
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Host address to bind.
    pub host: String,
    /// Port to bind.
    pub port: u16,
}

/// Build the API router.
///
/// - GET /health
/// - GET, POST, DELETE /api/conversations
/// - GET, PATCH, DELETE /api/conversations/{id}
/// - GET, POST /api/conversations/{id}/messages
/// - DELETE /api/messages/{id}
/// - GET, PUT /api/settings/endpoint
pub fn router<S: StorageAdapter>(state: GatewayState<S>) -> Router {
    let api = Router::new()
        .route(
            "/api/conversations",
            get(handlers::list_conversations::<S>)
                .post(handlers::create_conversation::<S>)
                .delete(handlers::delete_all_conversations::<S>),
        )
        .route(
            "/api/conversations/{id}",
            get(handlers::get_conversation::<S>)
                .patch(handlers::update_conversation::<S>)
                .delete(handlers::delete_conversation::<S>),
        )
        .route(
            "/api/conversations/{id}/messages",
            get(handlers::get_messages::<S>).post(handlers::create_message::<S>),
        )
        .route("/api/messages/{id}", delete(handlers::delete_message::<S>))
        .route(
            "/api/settings/endpoint",
            get(handlers::get_endpoint_settings::<S>).put(handlers::put_endpoint_settings::<S>),
        );

    Router::new()
        .route("/health", get(handlers::get_health::<S>))
        .merge(api)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Serve the API until `shutdown` resolves.
pub async fn start_server<S, F>(
    config: &ServerConfig,
    state: GatewayState<S>,
    shutdown: F,
) -> Result<(), CrescentError>
where
    S: StorageAdapter,
    F: Future<Output = ()> + Send + 'static,
{
    let app = router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| CrescentError::Internal(format!("failed to bind gateway to {addr}: {e}")))?;

    tracing::info!("Gateway server listening on {addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|e| CrescentError::Internal(format!("gateway server error: {e}")))?;

    tracing::info!("Gateway server stopped");
    Ok(())
}

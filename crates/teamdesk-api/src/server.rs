// crates/teamdesk-api/src/server.rs
// ============================================================================
// Module: API Server
// Description: Server bootstrap from configuration and the HTTP serve loop.
// Purpose: Wire store, cache, identity, and workspace behind the router.
// Dependencies: teamdesk-config, teamdesk-core, teamdesk-store-sqlite, teamdesk-cache-redis, axum, tokio
// ============================================================================

//! ## Overview
//! [`ApiServer::from_config`] validates configuration and builds every
//! collaborator eagerly so misconfiguration fails before the socket opens.
//! The networked cache is the exception: it connects in the background once
//! the server starts, and requests use the in-process cache until then.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use teamdesk_config::StoreType;
use teamdesk_config::TeamdeskConfig;
use teamdesk_core::Clock;
use teamdesk_core::InMemoryWorkspaceStore;
use teamdesk_core::ReadThroughCache;
use teamdesk_core::SystemClock;
use teamdesk_core::Workspace;
use teamdesk_core::WorkspaceStore;
use teamdesk_store_sqlite::SqliteWorkspaceStore;
use thiserror::Error;
use tokio::net::TcpListener;

use crate::auth::AppState;
use crate::identity::verifier_from_config;
use crate::routes::router;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Server bootstrap and transport errors.
#[derive(Debug, Error)]
pub enum ApiServerError {
    /// Configuration is invalid.
    #[error("config error: {0}")]
    Config(String),
    /// A collaborator failed to initialize.
    #[error("init error: {0}")]
    Init(String),
    /// The listener or serve loop failed.
    #[error("transport error: {0}")]
    Transport(String),
}

// ============================================================================
// SECTION: Server
// ============================================================================

/// Configured HTTP server.
pub struct ApiServer {
    /// Validated configuration.
    config: TeamdeskConfig,
    /// Shared handler state.
    state: AppState,
}

impl ApiServer {
    /// Builds a server from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ApiServerError`] when validation or initialization fails.
    pub fn from_config(config: TeamdeskConfig) -> Result<Self, ApiServerError> {
        config.validate().map_err(|err| ApiServerError::Config(err.to_string()))?;
        let store = build_store(&config)?;
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        let cache = Arc::new(ReadThroughCache::new(Arc::clone(&clock), config.cache.ttl()));
        let workspace = Workspace::new(store, cache, clock, config.workspace_settings());
        let verifier = verifier_from_config(&config.identity)
            .map_err(|err| ApiServerError::Init(err.to_string()))?;
        if !config.identity.accepts_credentials() {
            tracing::warn!("no identity credentials configured; protected routes reject every request");
        }
        Ok(Self {
            state: AppState::new(Arc::new(workspace), verifier),
            config,
        })
    }

    /// Returns the handler state.
    #[must_use]
    pub const fn state(&self) -> &AppState {
        &self.state
    }

    /// Builds the router for this server.
    #[must_use]
    pub fn router(&self) -> Router {
        router(self.state.clone(), self.config.server.max_body_bytes)
    }

    /// Binds the configured address and serves until Ctrl-C.
    ///
    /// # Errors
    ///
    /// Returns [`ApiServerError::Transport`] when binding or serving fails.
    pub async fn serve(self) -> Result<(), ApiServerError> {
        let addr = self
            .config
            .server
            .bind_addr()
            .map_err(|err| ApiServerError::Config(err.to_string()))?;
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|err| ApiServerError::Transport(format!("http bind failed: {err}")))?;
        self.serve_on(listener, async {
            if let Err(err) = tokio::signal::ctrl_c().await {
                tracing::warn!(error = %err, "shutdown signal unavailable");
                std::future::pending::<()>().await;
            }
        })
        .await
    }

    /// Serves on an already-bound listener until `shutdown` resolves.
    ///
    /// # Errors
    ///
    /// Returns [`ApiServerError::Transport`] when the serve loop fails.
    pub async fn serve_on<F>(self, listener: TcpListener, shutdown: F) -> Result<(), ApiServerError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.start_cache();
        let app = self.router();
        let local = listener
            .local_addr()
            .map_err(|err| ApiServerError::Transport(format!("listener address: {err}")))?;
        tracing::info!(addr = %local, "teamdesk api listening");
        axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
            .with_graceful_shutdown(shutdown)
            .await
            .map_err(|err| ApiServerError::Transport(format!("http server failed: {err}")))
    }

    /// Starts the background connection to the networked cache, if configured.
    fn start_cache(&self) {
        let Some(redis) = self.config.cache.redis_config() else {
            return;
        };
        let cache = self.state.workspace.cache();
        if cache.connect_in_background(move || teamdesk_cache_redis::connect(redis)).is_some() {
            tracing::info!("connecting networked cache in the background");
        }
    }
}

/// Builds the configured store.
fn build_store(config: &TeamdeskConfig) -> Result<Arc<dyn WorkspaceStore>, ApiServerError> {
    match config.store.store_type {
        StoreType::Memory => Ok(Arc::new(InMemoryWorkspaceStore::new())),
        StoreType::Sqlite => {
            let sqlite = config.store.sqlite_config().ok_or_else(|| {
                ApiServerError::Config("sqlite store requires path".to_string())
            })?;
            let store = SqliteWorkspaceStore::new(&sqlite)
                .map_err(|err| ApiServerError::Init(err.to_string()))?;
            Ok(Arc::new(store))
        }
    }
}

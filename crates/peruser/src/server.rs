//! Startup wiring: store, directory, bootstrap, listener.

use std::sync::Arc;

use axum::Router;
use peruser_perms::{BypassDirectory, Directory, Gate, StoreDirectory};
use peruser_store::{MemoryStore, RecordStore, SqliteStore, StoreExt};
use tokio::net::TcpListener;
use tracing::{error, info, warn};

use crate::config::{ServerConfig, StoreConfig};
use crate::error::ServerError;
use crate::routes;
use crate::state::AppState;

/// A configured server, ready to bind.
pub struct Server {
    config: ServerConfig,
    state: AppState,
}

impl Server {
    /// Open the store, seed the bootstrap admin, and pick the directory.
    pub async fn build(config: ServerConfig) -> Result<Self, ServerError> {
        let store: Arc<dyn RecordStore> = match &config.store {
            StoreConfig::Memory => Arc::new(MemoryStore::new()),
            StoreConfig::Sqlite { path } => Arc::new(SqliteStore::open(path)?),
        };

        if let Some(bootstrap) = &config.bootstrap {
            let admin = store.ensure_user(bootstrap.to_new_user()).await?;
            info!(index = %admin.index, "bootstrap admin present");
        }

        let directory: Arc<dyn Directory> = if config.debug_bypass {
            warn!("debug bypass enabled: every request is authorized");
            Arc::new(BypassDirectory)
        } else {
            Arc::new(StoreDirectory::new(store.clone()))
        };

        let mut state = AppState::new(store, Gate::new(directory));
        if let Some(service) = &config.service {
            state = state.with_service(service.clone());
        }

        Ok(Self { config, state })
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn router(&self) -> Router {
        routes::router(self.state.clone())
    }

    /// Bind and serve until Ctrl-C, then drain in-flight requests.
    pub async fn run(self) -> Result<(), ServerError> {
        let addr = self.config.bind_addr();
        let listener = TcpListener::bind(&addr).await?;
        info!(%addr, "API server started");

        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        info!("API server stopped");
        Ok(())
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received, draining connections");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BootstrapAdmin;
    use peruser_core::{ApiKey, UserIndex, KEY_LEN};

    fn bootstrap() -> BootstrapAdmin {
        BootstrapAdmin {
            index: UserIndex::from("root"),
            name: "root".into(),
            key: ApiKey::new("r".repeat(KEY_LEN)),
        }
    }

    #[tokio::test]
    async fn test_build_seeds_bootstrap_admin() {
        let config = ServerConfig {
            bootstrap: Some(bootstrap()),
            ..Default::default()
        };
        let server = Server::build(config).await.unwrap();

        let root = server
            .state()
            .store
            .read_by_index(&UserIndex::from("root"))
            .await
            .unwrap();
        assert!(root.is_admin());
        assert!(server
            .state()
            .gate
            .check(Some(root.key.as_str()), &peruser_perms::Predicate::Admin)
            .await
            .is_allowed());
    }

    #[tokio::test]
    async fn test_bootstrap_keeps_existing_record() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("peruser.db");
        let config = ServerConfig {
            store: StoreConfig::Sqlite { path },
            bootstrap: Some(bootstrap()),
            ..Default::default()
        };

        let first = Server::build(config.clone()).await.unwrap();
        first
            .state()
            .store
            .update_by_index(
                &UserIndex::from("root"),
                peruser_core::UserUpdate {
                    name: Some("renamed".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        drop(first);

        let second = Server::build(config).await.unwrap();
        let root = second
            .state()
            .store
            .read_by_index(&UserIndex::from("root"))
            .await
            .unwrap();
        assert_eq!(root.name, "renamed");
    }

    #[tokio::test]
    async fn test_debug_bypass_selects_bypass_directory() {
        let config = ServerConfig {
            debug_bypass: true,
            ..Default::default()
        };
        let server = Server::build(config).await.unwrap();
        assert!(server
            .state()
            .gate
            .check(None, &peruser_perms::Predicate::Admin)
            .await
            .is_allowed());
    }
}

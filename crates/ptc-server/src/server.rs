use std::path::Path;
use std::sync::Arc;

use ptc_datastore::{Datastore, InMemoryDatastore, LogDatastore};
use ptc_store::Store;
use ptc_types::Configuration;
use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::config::{DatastoreConfig, ServerConfig};
use crate::error::{ServerError, ServerResult};
use crate::handler::AppState;
use crate::router::build_router;

/// PTC conference server.
pub struct PtcServer {
    config: ServerConfig,
    store: Arc<Store>,
}

fn open_datastore(config: &DatastoreConfig) -> ServerResult<Arc<dyn Datastore>> {
    Ok(match config {
        DatastoreConfig::Memory => {
            warn!("using in-memory datastore; data is lost on exit");
            Arc::new(InMemoryDatastore::new())
        }
        DatastoreConfig::Log { path } => {
            info!(path = %path.display(), "opening commit log");
            Arc::new(LogDatastore::open(path)?)
        }
    })
}

/// Read a JSON conference configuration and store it.
async fn store_configuration(store: &Store, path: &Path) -> ServerResult<()> {
    let text = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| ServerError::Config(format!("{}: {e}", path.display())))?;
    let configuration = Configuration::from_json_strict(&text)
        .map_err(|e| ServerError::Config(format!("{}: {e}", path.display())))?;
    let version = store.put_configuration(&configuration).await?;
    info!(path = %path.display(), version, "stored conference configuration");
    Ok(())
}

impl PtcServer {
    /// Open the store and load the conference.
    ///
    /// When `config.configuration` names a file, it is stored first. Fails
    /// if the configuration does not validate, so a server never starts
    /// serving with a missing cookie key.
    pub async fn open(config: ServerConfig, emulator_host: Option<String>) -> ServerResult<Self> {
        match config.emulator_host(emulator_host)? {
            Some(host) => info!(%host, "using datastore emulator"),
            None => std::env::remove_var(crate::config::EMULATOR_HOST_VAR),
        }

        let datastore = open_datastore(&config.datastore)?;
        let store = Arc::new(Store::new(datastore, config.store_options()));
        if let Some(path) = &config.configuration {
            store_configuration(&store, path).await?;
        }
        let (conf, _) = store.get(false).await?;
        conf.configuration()
            .validate()
            .map_err(|e| ServerError::Config(e.to_string()))?;
        info!(
            classes = conf.classes().len(),
            participants = conf.participants().len(),
            "conference loaded"
        );
        Ok(Self { config, store })
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    pub fn store(&self) -> &Arc<Store> {
        &self.store
    }

    /// Build the router (useful for testing).
    pub fn router(&self) -> axum::Router {
        build_router(AppState::new(Arc::clone(&self.store)))
    }

    /// Serve requests until ctrl-c.
    pub async fn serve(self) -> ServerResult<()> {
        let app = self.router();
        let listener = TcpListener::bind(&self.config.bind_addr).await?;
        info!(addr = %self.config.bind_addr, "PTC server listening");
        axum::serve(listener, app)
            .with_graceful_shutdown(async {
                let _ = tokio::signal::ctrl_c().await;
                info!("shutting down");
            })
            .await
            .map_err(|e| ServerError::Internal(e.to_string()))
    }
}

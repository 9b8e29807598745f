use std::{net::SocketAddr, sync::Arc};

use axum::Router;
use configs::{AppConfig, StoreConfig};
use tower_http::cors::CorsLayer;
use tracing::{info, warn};

use service::{runtime, store::{JsonTreeStore, RecordStore}};

use crate::{routes, state::AppState};

fn build_cors() -> CorsLayer {
    CorsLayer::very_permissive()
}

/// Config file if present and valid, else `SERVER_HOST`/`SERVER_PORT`/`STORE_DATA_FILE`.
pub fn load_config() -> AppConfig {
    match AppConfig::load_and_validate() {
        Ok(cfg) => cfg,
        Err(e) => {
            warn!(error = %e, "config file unavailable; falling back to environment");
            AppConfig::from_env()
        }
    }
}

/// Open the record store described by `cfg`.
pub async fn open_store(cfg: &StoreConfig) -> anyhow::Result<Arc<dyn RecordStore>> {
    if cfg.is_in_memory() {
        warn!("running with an in-memory store");
        let store: Arc<dyn RecordStore> = JsonTreeStore::in_memory();
        return Ok(store);
    }
    runtime::ensure_data_dir(&cfg.data_file).await?;
    let store: Arc<dyn RecordStore> = JsonTreeStore::open(&cfg.data_file).await?;
    info!(data_file = %cfg.data_file, "record store opened");
    Ok(store)
}

pub fn build_app(store: Arc<dyn RecordStore>) -> Router {
    routes::build_router(AppState::new(store), build_cors())
}

/// Public entry: open the store, build the app and run the HTTP server
pub async fn run(cfg: AppConfig) -> anyhow::Result<()> {
    let store = open_store(&cfg.store).await?;
    let app = build_app(store);

    let addr: SocketAddr = cfg.bind_addr().parse()?;
    info!(%addr, "starting article directory");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

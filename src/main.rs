use skin_scan::{
    AppState, Config, RecordStore, detect::DetectionClient, kv::JsonFileStore, router,
};
use std::net::SocketAddr;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    let config = Config::from_env();
    if let Some(parent) = config.data_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }

    let kv = JsonFileStore::open(config.data_path.clone()).await;
    let mut store = RecordStore::new(kv);
    store.ensure_seeded()?;
    info!("scan data at {}", config.data_path.display());

    if config.detect_api_key.is_none() {
        warn!("DETECT_API_KEY is not set; detection requests will fail");
    }
    let detector = DetectionClient::from_config(&config);

    let app = router(AppState::new(store, detector));

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    info!("listening on http://{addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!("failed to listen for shutdown signal: {err}");
        std::future::pending::<()>().await;
    }
    info!("shutting down");
}

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use axum::http::{HeaderValue, Method, header};
use common::storage::filesystem::FilesystemObjectStore;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing::{Level, info, warn};

use server::config::{AppConfig, CorsConfig};
use server::state::AppState;

fn cors_layer(cfg: &CorsConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = cfg
        .allow_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .max_age(Duration::from_secs(cfg.max_age))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_max_level(Level::INFO).init();

    let config = AppConfig::load().context("Failed to load configuration")?;

    let db = server::database::init_db(&config.database.url)
        .await
        .context("Failed to initialize database")?;
    server::seed::seed_bootstrap_account(&db, &config.auth).await?;
    server::seed::ensure_indexes(&db).await?;

    let store = FilesystemObjectStore::new(
        config.storage.root_dir.clone(),
        config.storage.bucket.clone(),
        config.storage.public_base_url.clone(),
        config.storage.max_object_size,
    )
    .await
    .context("Failed to open object storage")?;
    info!(
        root = %config.storage.root_dir.display(),
        bucket = %config.storage.bucket,
        "Object storage ready"
    );

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .context("Invalid server address")?;
    let cors = cors_layer(&config.server.cors);

    let state = AppState {
        db,
        config,
        store: Arc::new(store),
    };
    let app = server::build_router(state).layer(cors);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Server running at http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutting down");
        })
        .await?;

    Ok(())
}

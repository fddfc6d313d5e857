use axum::extract::DefaultBodyLimit;
use std::sync::Arc;
use std::time::Duration;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use catalog_server::assets::AssetResolver;
use catalog_server::config::load_config;
use catalog_server::db::{self, AppState};
use catalog_server::repo::{CatalogRepository, InMemoryCatalog, PgCatalog};
use catalog_server::search::{build_index, CatalogIndex};
use catalog_server::storage::{LocalDiskStore, ObjectStore, S3ObjectStore};
use catalog_server::{health, openapi, telemetry};

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        tracing::error!(error = %e, "catalog-server failed to start");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), String> {
    // Load .env if present (ignored in production where env vars are set directly).
    let _ = dotenvy::dotenv();
    telemetry::init_tracing();

    let config = load_config();
    let flags = &config.features;

    let telemetry_active = flags.telemetry && telemetry::init_telemetry()?;
    health::record_start_time();

    let catalog = open_catalog(flags.database).await?;
    let store = open_store(flags.s3, &config.storage).await?;

    let index = CatalogIndex::new().map_err(|e| format!("Failed to create search index: {e}"))?;
    build_index(catalog.as_ref(), &index)
        .await
        .map_err(|e| format!("Failed to build search index: {e}"))?;
    let search = index.dispatcher(
        config.search.result_limit,
        Duration::from_millis(config.search.timeout_ms),
    );

    let state = AppState {
        catalog,
        search,
        index,
        assets: AssetResolver::new(store),
    };

    let mut router = openapi::app_router(state);
    // The local disk serves its own public URLs; S3 objects are fetched from the bucket.
    if !flags.s3 && config.storage.public_url.starts_with('/') {
        router = router.nest_service(
            &config.storage.public_url,
            ServeDir::new(&config.storage.root),
        );
    }
    if telemetry_active {
        router = router.layer(telemetry::OtelTraceLayer);
    }

    // Max upload size (default 10 MB), configurable via MAX_UPLOAD_BYTES.
    let max_body: usize = std::env::var("MAX_UPLOAD_BYTES")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(10 * 1024 * 1024);

    let router = router
        .layer(DefaultBodyLimit::max(max_body))
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid));

    let addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string());
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| format!("Failed to bind {addr}: {e}"))?;
    tracing::info!(%addr, "catalog-server listening");

    axum::serve(listener, router)
        .await
        .map_err(|e| format!("Server error: {e}"))
}

/// Postgres when the `database` flag is on and `DATABASE_URL` is set,
/// the in-memory catalog otherwise.
async fn open_catalog(database: bool) -> Result<Arc<dyn CatalogRepository>, String> {
    let url = std::env::var("DATABASE_URL").ok().filter(|u| !u.is_empty());
    match (database, url) {
        (true, Some(url)) => {
            let pool =
                db::create_pool(&url).map_err(|e| format!("Failed to create pool: {e}"))?;
            db::run_migrations(&pool)
                .await
                .map_err(|e| format!("Failed to run migrations: {e}"))?;
            tracing::info!("Catalog backed by Postgres");
            Ok(Arc::new(PgCatalog::new(pool)))
        }
        (true, None) => {
            tracing::warn!("database flag is on but DATABASE_URL is not set, using in-memory catalog");
            Ok(Arc::new(InMemoryCatalog::new()))
        }
        (false, _) => {
            tracing::info!("Catalog kept in memory");
            Ok(Arc::new(InMemoryCatalog::new()))
        }
    }
}

async fn open_store(
    s3: bool,
    settings: &catalog_types::StorageSettings,
) -> Result<Arc<dyn ObjectStore>, String> {
    if s3 {
        let store = S3ObjectStore::from_env(&settings.bucket)?;
        // Uploads still work against a bucket provisioned out of band.
        if let Err(e) = store.ensure_bucket().await {
            tracing::warn!(bucket = %settings.bucket, error = %e, "Could not prepare S3 bucket");
        }
        tracing::info!(bucket = %settings.bucket, "Assets stored in S3");
        Ok(Arc::new(store))
    } else {
        tracing::info!(root = %settings.root, "Assets stored on local disk");
        Ok(Arc::new(LocalDiskStore::new(
            &settings.root,
            &settings.public_url,
        )))
    }
}

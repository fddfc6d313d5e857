use axum::extract::FromRef;
use sqlx::postgres::PgPoolOptions;
use sqlx::{Pool, Postgres};
use std::sync::Arc;

use crate::assets::AssetResolver;
use crate::repo::CatalogRepository;
use crate::search::{CatalogIndex, SearchDispatcher};

/// Shared application state passed to Axum handlers via `State`.
/// Derives `FromRef` so handlers can extract individual parts directly.
#[derive(Clone, FromRef)]
pub struct AppState {
    pub catalog: Arc<dyn CatalogRepository>,
    pub search: SearchDispatcher,
    pub index: CatalogIndex,
    pub assets: AssetResolver,
}

/// Create a Postgres pool for `database_url`.
/// Uses `connect_lazy` so no connections open until the first query.
pub fn create_pool(database_url: &str) -> Result<Pool<Postgres>, sqlx::Error> {
    let max_connections: u32 = std::env::var("DATABASE_MAX_CONNECTIONS")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(10);

    PgPoolOptions::new()
        .max_connections(max_connections)
        .acquire_timeout(std::time::Duration::from_secs(5))
        .connect_lazy(database_url)
}

/// Run database migrations against the given pool.
pub async fn run_migrations(pool: &Pool<Postgres>) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("../../migrations").run(pool).await
}

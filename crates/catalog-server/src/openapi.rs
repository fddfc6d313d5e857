use axum::{routing::get, Json, Router};
use catalog_types::{
    AppError, AppErrorKind, AssetResponse, ContentType, CreateCatalogEntryRequest, Gender,
    ItemDetails, MovieKind, PersonResponse, PersonType, SearchResultBundle, SearchResultItem,
    SeriesResponse, StudioResponse, TagResponse, UpdateCatalogEntryRequest,
};
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable};

use crate::db::AppState;
use crate::health::{self, HealthResponse};
use crate::rest::{self, asset::AssetDeleteResponse};

/// OpenAPI documentation for the API.
#[derive(OpenApi)]
#[openapi(
    paths(
        rest::search::search,
        rest::tag::create_tag,
        rest::tag::get_tag,
        rest::tag::update_tag,
        rest::studio::create_studio,
        rest::studio::get_studio,
        rest::person::get_person,
        rest::person::update_person,
        rest::series::popular_series,
        rest::asset::upload_asset,
        rest::asset::delete_asset,
        health::health_check,
    ),
    components(schemas(
        AppError,
        AppErrorKind,
        ContentType,
        SearchResultBundle,
        SearchResultItem,
        ItemDetails,
        MovieKind,
        PersonType,
        Gender,
        TagResponse,
        StudioResponse,
        PersonResponse,
        SeriesResponse,
        AssetResponse,
        AssetDeleteResponse,
        CreateCatalogEntryRequest,
        UpdateCatalogEntryRequest,
        HealthResponse,
    )),
    tags(
        (name = "search", description = "Cross-type catalog search"),
        (name = "tags", description = "Tag management"),
        (name = "studios", description = "Studio management"),
        (name = "people", description = "People in the catalog"),
        (name = "series", description = "Series listings"),
        (name = "assets", description = "Image and file storage"),
        (name = "health", description = "Health check endpoint")
    ),
    info(
        title = "Catalog API",
        description = "Movie catalog API: search, tags, studios, people and assets",
        version = "1.0.0"
    )
)]
pub struct ApiDoc;

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

/// Build the application router: the REST API at `/api/*`, `/health`, the
/// OpenAPI document at `/api/openapi.json` and the API docs at `/docs`.
pub fn app_router(state: AppState) -> Router {
    Router::new()
        .merge(rest::api_router())
        .route("/health", get(health::health_check))
        .with_state(state)
        .route("/api/openapi.json", get(openapi_json))
        .merge(Scalar::with_url("/docs", ApiDoc::openapi()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_every_route() {
        let doc = ApiDoc::openapi();
        for path in [
            "/api/search",
            "/api/tags",
            "/api/tags/{slug}",
            "/api/studios",
            "/api/studios/{slug}",
            "/api/people/{slug}",
            "/api/series/popular",
            "/api/assets",
            "/api/assets/{directory}",
            "/health",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {path}");
        }
    }
}

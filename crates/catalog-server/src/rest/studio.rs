use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use catalog_types::{AppError, CreateCatalogEntryRequest, Studio, StudioResponse};
use serde_json::Value;

use super::{check_slug_format, log_index_result, slug_snapshot, validated};
use crate::assets::{AssetResolver, PendingAssets};
use crate::db::AppState;
use crate::dto::StudioStoreDto;
use crate::input::JsonInput;
use crate::slug::SlugScope;

const IMAGE_DIR: &str = "studios";

pub(crate) fn studio_response(studio: Studio, assets: &AssetResolver) -> StudioResponse {
    StudioResponse {
        id: studio.id.to_string(),
        image: assets.public_image(studio.image.as_deref()),
        meta_image: assets.public_image(studio.meta_image.as_deref()),
        name: studio.name,
        slug: studio.slug,
        description: studio.description,
        aliases: studio.aliases,
        meta_title: studio.meta_title,
        meta_description: studio.meta_description,
        created_at: studio.created_at.to_rfc3339(),
        updated_at: studio.updated_at.to_rfc3339(),
    }
}

/// Create a studio. `meta_title` defaults to a title derived from the name.
#[utoipa::path(
    post,
    path = "/api/studios",
    request_body = CreateCatalogEntryRequest,
    responses(
        (status = 201, description = "Studio created", body = StudioResponse),
        (status = 409, description = "Slug already taken", body = AppError),
        (status = 422, description = "Validation failed", body = AppError)
    ),
    tag = "studios"
)]
#[tracing::instrument(skip(state, body))]
pub async fn create_studio(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> Result<(StatusCode, Json<StudioResponse>), AppError> {
    let request: CreateCatalogEntryRequest = validated(&body)?;
    check_slug_format(request.slug.as_deref())?;

    let input = JsonInput::from_value(body);
    let taken = slug_snapshot(state.catalog.as_ref(), SlugScope::Studio, &input, None).await?;
    let mut dto = StudioStoreDto::from_input(&input, &taken);

    let mut pending = PendingAssets::default();
    let outcome = async {
        dto.image = state
            .assets
            .store_image(dto.image.take(), IMAGE_DIR, &mut pending)
            .await?;
        dto.meta_image = state
            .assets
            .store_image(dto.meta_image.take(), IMAGE_DIR, &mut pending)
            .await?;
        state.catalog.create_studio(dto.into_studio()).await
    }
    .await;
    let studio = pending.settle(&state.assets, outcome).await?;
    log_index_result(state.index.studios.upsert(&studio), "studio", &studio.slug);
    tracing::info!(slug = %studio.slug, "Studio created");

    Ok((
        StatusCode::CREATED,
        Json(studio_response(studio, &state.assets)),
    ))
}

#[utoipa::path(
    get,
    path = "/api/studios/{slug}",
    params(("slug" = String, Path, description = "Studio slug")),
    responses(
        (status = 200, description = "Studio found", body = StudioResponse),
        (status = 404, description = "Studio not found", body = AppError)
    ),
    tag = "studios"
)]
pub async fn get_studio(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<StudioResponse>, AppError> {
    let studio = state
        .catalog
        .find_studio(&slug)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Studio {} not found", slug)))?;

    Ok(Json(studio_response(studio, &state.assets)))
}

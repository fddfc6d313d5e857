use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use catalog_types::{
    AppError, CreateCatalogEntryRequest, Tag, TagResponse, UpdateCatalogEntryRequest,
};
use serde_json::Value;

use super::{check_slug_format, log_index_result, slug_snapshot, validated};
use crate::assets::{AssetResolver, PendingAssets};
use crate::db::AppState;
use crate::dto::{TagStoreDto, TagUpdateDto};
use crate::input::JsonInput;
use crate::slug::SlugScope;

/// Storage directory for tag images.
const IMAGE_DIR: &str = "tags";

pub(crate) fn tag_response(tag: Tag, assets: &AssetResolver) -> TagResponse {
    TagResponse {
        id: tag.id.to_string(),
        image: assets.public_image(tag.image.as_deref()),
        meta_image: assets.public_image(tag.meta_image.as_deref()),
        name: tag.name,
        slug: tag.slug,
        description: tag.description,
        is_genre: tag.is_genre,
        aliases: tag.aliases,
        meta_title: tag.meta_title,
        meta_description: tag.meta_description,
        created_at: tag.created_at.to_rfc3339(),
        updated_at: tag.updated_at.to_rfc3339(),
    }
}

async fn find_or_404(state: &AppState, slug: &str) -> Result<Tag, AppError> {
    state
        .catalog
        .find_tag(slug)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Tag {} not found", slug)))
}

// ---------------------------------------------------------------------------
// POST /api/tags
// ---------------------------------------------------------------------------

/// Create a tag. The slug is derived from the name unless supplied.
#[utoipa::path(
    post,
    path = "/api/tags",
    request_body = CreateCatalogEntryRequest,
    responses(
        (status = 201, description = "Tag created", body = TagResponse),
        (status = 409, description = "Slug already taken", body = AppError),
        (status = 422, description = "Validation failed", body = AppError)
    ),
    tag = "tags"
)]
#[tracing::instrument(skip(state, body))]
pub async fn create_tag(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> Result<(StatusCode, Json<TagResponse>), AppError> {
    let request: CreateCatalogEntryRequest = validated(&body)?;
    check_slug_format(request.slug.as_deref())?;

    let input = JsonInput::from_value(body);
    let taken = slug_snapshot(state.catalog.as_ref(), SlugScope::Tag, &input, None).await?;
    let mut dto = TagStoreDto::from_input(&input, &taken);

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
        state.catalog.create_tag(dto.into_tag()).await
    }
    .await;
    let tag = pending.settle(&state.assets, outcome).await?;
    log_index_result(state.index.tags.upsert(&tag), "tag", &tag.slug);
    tracing::info!(slug = %tag.slug, "Tag created");

    Ok((StatusCode::CREATED, Json(tag_response(tag, &state.assets))))
}

// ---------------------------------------------------------------------------
// GET /api/tags/{slug}
// ---------------------------------------------------------------------------

#[utoipa::path(
    get,
    path = "/api/tags/{slug}",
    params(("slug" = String, Path, description = "Tag slug")),
    responses(
        (status = 200, description = "Tag found", body = TagResponse),
        (status = 404, description = "Tag not found", body = AppError)
    ),
    tag = "tags"
)]
pub async fn get_tag(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<TagResponse>, AppError> {
    let tag = find_or_404(&state, &slug).await?;
    Ok(Json(tag_response(tag, &state.assets)))
}

// ---------------------------------------------------------------------------
// PATCH /api/tags/{slug}
// ---------------------------------------------------------------------------

/// Partially update a tag. Fields not sent are left untouched; `null`
/// clears optional fields.
#[utoipa::path(
    patch,
    path = "/api/tags/{slug}",
    params(("slug" = String, Path, description = "Tag slug")),
    request_body = UpdateCatalogEntryRequest,
    responses(
        (status = 200, description = "Tag updated", body = TagResponse),
        (status = 404, description = "Tag not found", body = AppError),
        (status = 422, description = "Validation failed", body = AppError)
    ),
    tag = "tags"
)]
#[tracing::instrument(skip(state, body))]
pub async fn update_tag(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Json(body): Json<Value>,
) -> Result<Json<TagResponse>, AppError> {
    let request: UpdateCatalogEntryRequest = validated(&body)?;
    check_slug_format(request.slug.as_deref())?;

    let mut tag = find_or_404(&state, &slug).await?;
    let input = JsonInput::from_value(body);
    let taken =
        slug_snapshot(state.catalog.as_ref(), SlugScope::Tag, &input, Some(&tag.slug)).await?;
    let mut dto = TagUpdateDto::from_input(&input, &taken);

    if dto.is_empty() {
        return Ok(Json(tag_response(tag, &state.assets)));
    }

    let mut pending = PendingAssets::default();
    let outcome = async {
        dto.image = state
            .assets
            .resolve_image(
                std::mem::take(&mut dto.image),
                IMAGE_DIR,
                tag.image.as_deref(),
                &mut pending,
            )
            .await?;
        dto.meta_image = state
            .assets
            .resolve_image(
                std::mem::take(&mut dto.meta_image),
                IMAGE_DIR,
                tag.meta_image.as_deref(),
                &mut pending,
            )
            .await?;
        dto.apply_to(&mut tag);
        state.catalog.update_tag(tag).await
    }
    .await;
    let tag = pending.settle(&state.assets, outcome).await?;
    log_index_result(state.index.tags.upsert(&tag), "tag", &tag.slug);

    Ok(Json(tag_response(tag, &state.assets)))
}


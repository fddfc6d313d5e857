use axum::{
    extract::{Path, State},
    Json,
};
use catalog_types::{AppError, Person, PersonResponse, UpdateCatalogEntryRequest};
use serde_json::Value;

use super::{check_slug_format, log_index_result, slug_snapshot, validated};
use crate::assets::{AssetResolver, PendingAssets};
use crate::db::AppState;
use crate::dto::PersonUpdateDto;
use crate::input::JsonInput;
use crate::slug::SlugScope;

const IMAGE_DIR: &str = "people";

pub(crate) fn person_response(person: Person, assets: &AssetResolver) -> PersonResponse {
    PersonResponse {
        id: person.id.to_string(),
        image: assets.public_image(person.image.as_deref()),
        name: person.name,
        slug: person.slug,
        biography: person.description,
        person_type: person.person_type,
        gender: person.gender,
        birth_date: person.birthday,
        death_date: None,
        movies_count: None,
        created_at: person.created_at.to_rfc3339(),
        updated_at: person.updated_at.to_rfc3339(),
    }
}

async fn find_or_404(state: &AppState, slug: &str) -> Result<Person, AppError> {
    state
        .catalog
        .find_person(slug)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Person {} not found", slug)))
}

#[utoipa::path(
    get,
    path = "/api/people/{slug}",
    params(("slug" = String, Path, description = "Person slug")),
    responses(
        (status = 200, description = "Person found", body = PersonResponse),
        (status = 404, description = "Person not found", body = AppError)
    ),
    tag = "people"
)]
pub async fn get_person(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<PersonResponse>, AppError> {
    let person = find_or_404(&state, &slug).await?;
    Ok(Json(person_response(person, &state.assets)))
}

/// Partially update a person. `birthday` is `YYYY-MM-DD`; `type` and
/// `gender` take their uppercase names.
#[utoipa::path(
    patch,
    path = "/api/people/{slug}",
    params(("slug" = String, Path, description = "Person slug")),
    request_body = UpdateCatalogEntryRequest,
    responses(
        (status = 200, description = "Person updated", body = PersonResponse),
        (status = 404, description = "Person not found", body = AppError),
        (status = 422, description = "Validation failed", body = AppError)
    ),
    tag = "people"
)]
#[tracing::instrument(skip(state, body))]
pub async fn update_person(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Json(body): Json<Value>,
) -> Result<Json<PersonResponse>, AppError> {
    let request: UpdateCatalogEntryRequest = validated(&body)?;
    check_slug_format(request.slug.as_deref())?;

    let mut person = find_or_404(&state, &slug).await?;
    let input = JsonInput::from_value(body);
    let taken = slug_snapshot(
        state.catalog.as_ref(),
        SlugScope::Person,
        &input,
        Some(&person.slug),
    )
    .await?;
    let mut dto = PersonUpdateDto::from_input(&input, &taken);

    if dto.is_empty() {
        return Ok(Json(person_response(person, &state.assets)));
    }

    let mut pending = PendingAssets::default();
    let outcome = async {
        dto.image = state
            .assets
            .resolve_image(
                std::mem::take(&mut dto.image),
                IMAGE_DIR,
                person.image.as_deref(),
                &mut pending,
            )
            .await?;
        dto.meta_image = state
            .assets
            .resolve_image(
                std::mem::take(&mut dto.meta_image),
                IMAGE_DIR,
                person.meta_image.as_deref(),
                &mut pending,
            )
            .await?;
        dto.apply_to(&mut person);
        state.catalog.update_person(person).await
    }
    .await;
    let person = pending.settle(&state.assets, outcome).await?;
    log_index_result(state.index.people.upsert(&person), "person", &person.slug);

    Ok(Json(person_response(person, &state.assets)))
}

use axum::{
    extract::{Query, State},
    Json,
};
use catalog_types::{AppError, Movie, SeriesResponse};
use serde::Deserialize;

use crate::assets::AssetResolver;
use crate::db::AppState;
use crate::dto::PopularSeriesDto;
use crate::input::JsonInput;

/// Query parameters for the popularity listing (documentation only; the
/// handler reads the raw query so malformed values fall back to defaults).
#[derive(Debug, Clone, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PopularSeriesParams {
    /// 1 to 100, default 20.
    pub limit: Option<i64>,
}

pub(crate) fn series_response(movie: Movie, assets: &AssetResolver) -> SeriesResponse {
    SeriesResponse {
        id: movie.id.to_string(),
        poster: assets.public_image(movie.poster.as_deref()),
        name: movie.name,
        slug: movie.slug,
        kind: movie.kind,
        year: movie.release_year,
        imdb_score: movie.imdb_score,
    }
}

/// Series ranked by IMDb score.
#[utoipa::path(
    get,
    path = "/api/series/popular",
    params(PopularSeriesParams),
    responses(
        (status = 200, description = "Popular series", body = Vec<SeriesResponse>)
    ),
    tag = "series"
)]
pub async fn popular_series(
    State(state): State<AppState>,
    Query(params): Query<Vec<(String, String)>>,
) -> Result<Json<Vec<SeriesResponse>>, AppError> {
    let dto = PopularSeriesDto::from_input(&JsonInput::from(params));
    let series = state.catalog.popular_series(dto.limit).await?;

    Ok(Json(
        series
            .into_iter()
            .map(|m| series_response(m, &state.assets))
            .collect(),
    ))
}

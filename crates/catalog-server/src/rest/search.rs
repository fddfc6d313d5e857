use axum::{
    extract::{Query, State},
    Json,
};
use catalog_types::{SearchParams, SearchResultBundle};

use crate::assets::AssetResolver;
use crate::dto::SearchQuery;
use crate::input::JsonInput;
use crate::search::SearchDispatcher;

/// Search every requested content type at once.
///
/// Keys appear in the order movies, people, studios, tags, selections. A
/// requested type with no matches maps to `[]`; a type whose backend failed
/// or timed out also maps to `[]` and is listed under `failed`. `types` may
/// be comma-separated, repeated, or sent as `types[]`.
#[utoipa::path(
    get,
    path = "/api/search",
    params(SearchParams),
    responses(
        (status = 200, description = "Results grouped by content type", body = SearchResultBundle)
    ),
    tag = "search"
)]
#[tracing::instrument(skip(dispatcher, assets))]
pub async fn search(
    State(dispatcher): State<SearchDispatcher>,
    State(assets): State<AssetResolver>,
    Query(params): Query<Vec<(String, String)>>,
) -> Json<SearchResultBundle> {
    let query = SearchQuery::from_input(&JsonInput::from(params));
    let mut bundle = dispatcher.dispatch(&query).await;

    for item in bundle.results.values_mut().flatten() {
        item.image = assets.public_image(item.image.as_deref());
    }
    Json(bundle)
}

pub mod asset;
pub mod person;
pub mod search;
pub mod series;
pub mod studio;
pub mod tag;

use axum::{
    routing::{get, post},
    Router,
};
use catalog_types::{is_url_safe_slug, AppError};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::{HashMap, HashSet};

use crate::db::AppState;
use crate::dto::filled_string;
use crate::error_convert::ValidateRequest;
use crate::input::{JsonInput, RequestInput};
use crate::repo::CatalogRepository;
use crate::search::SearchError;
use crate::slug::{slug_base, SlugScope};

/// Build the REST API router.
pub fn api_router() -> Router<AppState> {
    Router::new()
        // Search
        .route("/api/search", get(search::search))
        // Tags
        .route("/api/tags", post(tag::create_tag))
        .route("/api/tags/{slug}", get(tag::get_tag).patch(tag::update_tag))
        // Studios
        .route("/api/studios", post(studio::create_studio))
        .route("/api/studios/{slug}", get(studio::get_studio))
        // People
        .route(
            "/api/people/{slug}",
            get(person::get_person).patch(person::update_person),
        )
        // Series
        .route("/api/series/popular", get(series::popular_series))
        // Assets
        .route("/api/assets", axum::routing::delete(asset::delete_asset))
        .route("/api/assets/{directory}", post(asset::upload_asset))
}

/// Deserialize and validate the typed view of a raw JSON body.
pub(crate) fn validated<T>(body: &Value) -> Result<T, AppError>
where
    T: DeserializeOwned + validator::Validate,
{
    let request: T = serde_json::from_value(body.clone()).map_err(|e| {
        AppError::validation(format!("Invalid request body: {e}"), HashMap::new())
    })?;
    request.validate_request()?;
    Ok(request)
}

fn field_error(field: &str, message: &str) -> AppError {
    let mut fields = HashMap::new();
    fields.insert(field.to_string(), message.to_string());
    AppError::validation(message, fields)
}

/// Reject an explicit slug that is not URL-safe.
pub(crate) fn check_slug_format(slug: Option<&str>) -> Result<(), AppError> {
    match slug.filter(|s| !s.trim().is_empty()) {
        Some(slug) if !is_url_safe_slug(slug) => Err(field_error(
            "slug",
            "The slug may only contain lowercase letters, digits and hyphens",
        )),
        _ => Ok(()),
    }
}

/// Slugs already used in `scope` that could collide with this request,
/// minus `current` (the slug of the entity being updated).
///
/// An explicit slug that is already taken is a validation error.
pub(crate) async fn slug_snapshot(
    catalog: &dyn CatalogRepository,
    scope: SlugScope,
    input: &JsonInput,
    current: Option<&str>,
) -> Result<HashSet<String>, AppError> {
    let explicit = filled_string(input, "slug");
    let base = match (&explicit, input.string("name")) {
        (Some(slug), _) => slug.clone(),
        (None, Some(name)) => slug_base(&name, scope),
        // Nothing to derive a slug from
        (None, None) => return Ok(HashSet::new()),
    };

    let mut taken = catalog.taken_slugs(scope, &base).await?;
    if let Some(current) = current {
        taken.remove(current);
    }

    if let Some(slug) = explicit {
        if taken.contains(&slug) {
            return Err(field_error("slug", "This slug is already taken"));
        }
    }
    Ok(taken)
}

/// Index writes never fail a request; the next rebuild repairs them.
pub(crate) fn log_index_result(result: Result<(), SearchError>, kind: &str, slug: &str) {
    if let Err(e) = result {
        tracing::warn!(kind, slug, error = %e, "Failed to update search index");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use catalog_types::{AppErrorKind, CreateCatalogEntryRequest};
    use serde_json::json;

    #[test]
    fn validated_rejects_missing_name() {
        let err = validated::<CreateCatalogEntryRequest>(&json!({"description": "x"})).unwrap_err();
        assert_eq!(err.kind, AppErrorKind::ValidationError);
        assert!(err.field_errors.contains_key("name"));
    }

    #[test]
    fn validated_rejects_wrong_types() {
        let err = validated::<CreateCatalogEntryRequest>(&json!({"name": ["a"]})).unwrap_err();
        assert_eq!(err.kind, AppErrorKind::ValidationError);
    }

    #[test]
    fn slug_format_check() {
        assert!(check_slug_format(Some("film-noir")).is_ok());
        assert!(check_slug_format(None).is_ok());
        assert!(check_slug_format(Some("")).is_ok());
        let err = check_slug_format(Some("Film Noir")).unwrap_err();
        assert!(err.field_errors.contains_key("slug"));
    }
}

//! Integration tests for the REST API.
//!
//! Every test runs against an in-memory catalog, in-RAM search indexes and a
//! temporary storage directory; no external services are needed.

mod common;

use axum::http::StatusCode;
use catalog_types::{
    AppError, AssetResponse, MovieKind, PersonResponse, PersonType, SeriesResponse,
    StudioResponse, TagResponse,
};
use common::{
    delete, get, movie, patch_json, person, post_json, post_multipart, selection, test_app,
    test_app_over, test_app_with, ConflictingUpdates, TestApp,
};
use std::sync::Arc;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};

async fn create_tag(app: &TestApp, body: Value) -> TagResponse {
    let (status, body) = post_json(app, "/api/tags", &body.to_string()).await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    serde_json::from_str(&body).unwrap()
}

/// Storage reference behind a public `/storage/...` URL.
fn reference_of(url: &str) -> &str {
    url.strip_prefix(common::STORAGE_URL)
        .and_then(|rest| rest.strip_prefix('/'))
        .unwrap()
}

// ---------------------------------------------------------------------------
// Health & docs
// ---------------------------------------------------------------------------

#[tokio::test]
async fn health_check_returns_ok() {
    let app = test_app().await;
    let (status, body) = get(&app, "/health").await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("\"status\":\"ok\""));
    assert!(body.contains("\"catalog\":\"memory\""));
    assert!(body.contains("\"db\":\"connected\""));
}

#[tokio::test]
async fn openapi_document_is_served() {
    let app = test_app().await;
    let (status, body) = get(&app, "/api/openapi.json").await;

    assert_eq!(status, StatusCode::OK);
    let doc: Value = serde_json::from_str(&body).unwrap();
    assert!(doc["paths"]["/api/search"].is_object());
    assert!(doc["paths"]["/api/tags/{slug}"]["patch"].is_object());
}

// ---------------------------------------------------------------------------
// Search
// ---------------------------------------------------------------------------

async fn search_app() -> TestApp {
    test_app_with(|catalog| {
        catalog.insert_movie(movie("Inception", MovieKind::Movie, Some(8.8), Some(2010)));
        catalog.insert_person(person(
            "Christopher Nolan",
            "christopher-nolan",
            PersonType::Director,
        ));
        catalog.insert_selection(selection("Nolan Essentials"));
    })
    .await
}

#[tokio::test]
async fn blank_search_returns_empty_bundle() {
    let app = search_app().await;
    let (status, body) = get(&app, "/api/search?q=%20%20").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "{}");
}

#[tokio::test]
async fn search_returns_only_requested_types_in_order() {
    let app = search_app().await;
    let (status, body) = get(&app, "/api/search?q=nolan&types=selections,people").await;
    assert_eq!(status, StatusCode::OK);

    let people_at = body.find("\"people\"").unwrap();
    let selections_at = body.find("\"selections\"").unwrap();
    assert!(people_at < selections_at);

    let bundle: Value = serde_json::from_str(&body).unwrap();
    let keys: Vec<&String> = bundle.as_object().unwrap().keys().collect();
    assert_eq!(keys, vec!["people", "selections"]);

    assert_eq!(bundle["people"][0]["name"], "Christopher Nolan");
    assert_eq!(bundle["people"][0]["type"], "DIRECTOR");
    assert_eq!(
        bundle["selections"][0]["image"],
        "https://cdn.example.com/selection.jpg"
    );
}

#[tokio::test]
async fn search_without_types_covers_every_type() {
    let app = search_app().await;
    let (status, body) = get(&app, "/api/search?q=inception").await;
    assert_eq!(status, StatusCode::OK);

    let bundle: Value = serde_json::from_str(&body).unwrap();
    for key in ["movies", "people", "studios", "tags", "selections"] {
        assert!(bundle[key].is_array(), "missing {key}");
    }
    assert!(bundle.get("failed").is_none());

    let movies = bundle["movies"].as_array().unwrap();
    assert_eq!(movies.len(), 1);
    assert_eq!(movies[0]["kind"], "movie");
    assert_eq!(movies[0]["year"], 2010);
    assert_eq!(bundle["people"], json!([]));
}

#[tokio::test]
async fn created_tags_become_searchable() {
    let app = test_app().await;
    create_tag(&app, json!({ "name": "Film Noir" })).await;

    let (_, body) = get(&app, "/api/search?q=noir&types=tags").await;
    let bundle: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(bundle["tags"][0]["slug"], "film-noir");
}

#[tokio::test]
async fn repeated_types_keys_are_all_honored() {
    let app = search_app().await;
    let (status, body) = get(&app, "/api/search?q=nolan&types=selections&types=movies").await;
    assert_eq!(status, StatusCode::OK);

    let bundle: Value = serde_json::from_str(&body).unwrap();
    let keys: Vec<&String> = bundle.as_object().unwrap().keys().collect();
    assert_eq!(keys, vec!["movies", "selections"]);
}

#[tokio::test]
async fn bracketed_types_keys_are_honored() {
    let app = search_app().await;
    let (status, body) = get(&app, "/api/search?q=nolan&types%5B%5D=people").await;
    assert_eq!(status, StatusCode::OK);

    let bundle: Value = serde_json::from_str(&body).unwrap();
    let keys: Vec<&String> = bundle.as_object().unwrap().keys().collect();
    assert_eq!(keys, vec!["people"]);
    assert_eq!(bundle["people"][0]["slug"], "christopher-nolan");

    let (_, body) =
        get(&app, "/api/search?q=nolan&types%5B%5D=tags&types%5B%5D=people&types%5B%5D=bogus").await;
    let bundle: Value = serde_json::from_str(&body).unwrap();
    let keys: Vec<&String> = bundle.as_object().unwrap().keys().collect();
    assert_eq!(keys, vec!["people", "tags"]);
}

#[tokio::test]
async fn search_images_are_public_urls() {
    let app = test_app().await;
    let tag = create_tag(
        &app,
        json!({ "name": "Western", "image": "data:image/png;base64,aGVsbG8=" }),
    )
    .await;

    let (_, body) = get(&app, "/api/search?q=western&types=tags").await;
    let bundle: Value = serde_json::from_str(&body).unwrap();
    let image = bundle["tags"][0]["image"].as_str().unwrap();
    assert!(image.starts_with("/storage/tags/"), "{image}");
    assert_eq!(Some(image), tag.image.as_deref());
}

// ---------------------------------------------------------------------------
// Tags
// ---------------------------------------------------------------------------

#[tokio::test]
async fn create_tag_normalizes_input() {
    let app = test_app().await;
    let tag = create_tag(
        &app,
        json!({
            "name": "Film Noir",
            "is_genre": "1",
            "aliases": "[\"noir\", \" \"]",
        }),
    )
    .await;

    assert_eq!(tag.slug, "film-noir");
    assert!(tag.is_genre);
    assert_eq!(tag.aliases, vec!["noir"]);
    assert_eq!(tag.description, "");

    let second = create_tag(&app, json!({ "name": "Film Noir" })).await;
    assert_eq!(second.slug, "film-noir-2");
}

#[tokio::test]
async fn malformed_aliases_become_empty() {
    let app = test_app().await;
    let tag = create_tag(&app, json!({ "name": "Horror", "aliases": "{not valid" })).await;
    assert!(tag.aliases.is_empty());
}

#[tokio::test]
async fn create_tag_requires_name() {
    let app = test_app().await;
    let (status, body) = post_json(&app, "/api/tags", r#"{"description":"x"}"#).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    let err: AppError = serde_json::from_str(&body).unwrap();
    assert!(err.field_errors.contains_key("name"));
}

#[tokio::test]
async fn create_tag_rejects_taken_explicit_slug() {
    let app = test_app().await;
    create_tag(&app, json!({ "name": "Drama" })).await;

    let (status, body) =
        post_json(&app, "/api/tags", r#"{"name":"Other","slug":"drama"}"#).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    let err: AppError = serde_json::from_str(&body).unwrap();
    assert_eq!(err.field_errors["slug"], "This slug is already taken");
}

#[tokio::test]
async fn get_tag_by_slug() {
    let app = test_app().await;
    let created = create_tag(&app, json!({ "name": "Western" })).await;

    let (status, body) = get(&app, "/api/tags/western").await;
    assert_eq!(status, StatusCode::OK);
    let fetched: TagResponse = serde_json::from_str(&body).unwrap();
    assert_eq!(fetched.id, created.id);

    let (status, _) = get(&app, "/api/tags/missing").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn patch_tag_leaves_unmentioned_fields() {
    let app = test_app().await;
    create_tag(&app, json!({ "name": "Film Noir", "is_genre": true })).await;

    let (status, body) =
        patch_json(&app, "/api/tags/film-noir", r#"{"description":"Shadows"}"#).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    let tag: TagResponse = serde_json::from_str(&body).unwrap();

    assert_eq!(tag.description, "Shadows");
    assert_eq!(tag.slug, "film-noir");
    assert!(tag.is_genre);
}

#[tokio::test]
async fn patch_tag_name_rederives_slug() {
    let app = test_app().await;
    create_tag(&app, json!({ "name": "Film Noir" })).await;

    let (status, body) = patch_json(&app, "/api/tags/film-noir", r#"{"name":"Neo Noir"}"#).await;
    assert_eq!(status, StatusCode::OK);
    let tag: TagResponse = serde_json::from_str(&body).unwrap();
    assert_eq!(tag.slug, "neo-noir");

    let (status, _) = get(&app, "/api/tags/film-noir").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn patch_tag_rejects_bad_slugs() {
    let app = test_app().await;
    create_tag(&app, json!({ "name": "Drama" })).await;
    create_tag(&app, json!({ "name": "Horror" })).await;

    let (status, _) = patch_json(&app, "/api/tags/horror", r#"{"slug":"drama"}"#).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, _) = patch_json(&app, "/api/tags/horror", r#"{"slug":"Bad Slug"}"#).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, _) = patch_json(&app, "/api/tags/missing", r#"{"name":"X"}"#).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn tag_image_is_stored_and_cleared() {
    let app = test_app().await;
    let tag = create_tag(
        &app,
        json!({ "name": "Western", "image": "data:image/png;base64,aGVsbG8=" }),
    )
    .await;

    let url = tag.image.unwrap();
    assert!(url.starts_with("/storage/tags/"));
    assert!(url.ends_with(".png"));
    let stored = app.stored_path(reference_of(&url));
    assert_eq!(std::fs::read(&stored).unwrap(), b"hello");

    let (status, body) = patch_json(&app, "/api/tags/western", r#"{"image":null}"#).await;
    assert_eq!(status, StatusCode::OK);
    let tag: TagResponse = serde_json::from_str(&body).unwrap();
    assert!(tag.image.is_none());
    assert!(!stored.exists());
}

#[tokio::test]
async fn failed_tag_update_keeps_stored_image() {
    let app = test_app_over(Arc::new(ConflictingUpdates::default())).await;
    let tag = create_tag(
        &app,
        json!({ "name": "Western", "image": "data:image/png;base64,aGVsbG8=" }),
    )
    .await;
    let stored = app.stored_path(reference_of(tag.image.as_deref().unwrap()));

    let (status, _) = patch_json(
        &app,
        "/api/tags/western",
        r#"{"image":"data:image/png;base64,d29ybGQ="}"#,
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(std::fs::read(&stored).unwrap(), b"hello");
    assert_eq!(std::fs::read_dir(app.stored_path("tags")).unwrap().count(), 1);

    let (status, _) = patch_json(&app, "/api/tags/western", r#"{"image":null}"#).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(stored.exists());

    let (_, body) = get(&app, "/api/tags/western").await;
    let current: TagResponse = serde_json::from_str(&body).unwrap();
    assert_eq!(current.image, tag.image);
}

#[tokio::test]
async fn bad_base64_image_is_rejected() {
    let app = test_app().await;
    let (status, _) = post_json(
        &app,
        "/api/tags",
        r#"{"name":"Western","image":"data:image/png;base64,***"}"#,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

// ---------------------------------------------------------------------------
// Studios
// ---------------------------------------------------------------------------

#[tokio::test]
async fn create_studio_derives_meta_title() {
    let app = test_app().await;
    let (status, body) = post_json(&app, "/api/studios", r#"{"name":"A24"}"#).await;
    assert_eq!(status, StatusCode::CREATED);

    let studio: StudioResponse = serde_json::from_str(&body).unwrap();
    assert_eq!(studio.slug, "a24");
    assert_eq!(studio.meta_title.as_deref(), Some("A24 | Catalog"));

    let (status, body) = get(&app, "/api/studios/a24").await;
    assert_eq!(status, StatusCode::OK);
    let fetched: StudioResponse = serde_json::from_str(&body).unwrap();
    assert_eq!(fetched.id, studio.id);
}

#[tokio::test]
async fn explicit_null_meta_title_is_kept() {
    let app = test_app().await;
    let (status, body) =
        post_json(&app, "/api/studios", r#"{"name":"Neon","meta_title":null}"#).await;
    assert_eq!(status, StatusCode::CREATED);

    let studio: StudioResponse = serde_json::from_str(&body).unwrap();
    assert!(studio.meta_title.is_none());
}

#[tokio::test]
async fn unknown_studio_is_not_found() {
    let app = test_app().await;
    let (status, body) = get(&app, "/api/studios/nope").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body.contains("NotFound"));
}

// ---------------------------------------------------------------------------
// People
// ---------------------------------------------------------------------------

async fn people_app() -> TestApp {
    test_app_with(|catalog| {
        catalog.insert_person(person(
            "Крістофер Нолан",
            "kristofer-nolan",
            PersonType::Director,
        ));
    })
    .await
}

#[tokio::test]
async fn get_person_shapes_response() {
    let app = people_app().await;
    let (status, body) = get(&app, "/api/people/kristofer-nolan").await;
    assert_eq!(status, StatusCode::OK);

    let raw: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(raw["type"], "DIRECTOR");
    assert_eq!(raw["birth_date"], "1970-07-30");
    assert!(raw["death_date"].is_null());

    let person: PersonResponse = serde_json::from_str(&body).unwrap();
    assert_eq!(person.biography.as_deref(), Some("Director and screenwriter."));
}

#[tokio::test]
async fn patch_person_updates_only_sent_fields() {
    let app = people_app().await;
    let (status, body) = patch_json(
        &app,
        "/api/people/kristofer-nolan",
        r#"{"birthday":"1970-07-31","gender":"other"}"#,
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");

    let raw: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(raw["birth_date"], "1970-07-31");
    assert_eq!(raw["gender"], "OTHER");
    assert_eq!(raw["slug"], "kristofer-nolan");
    assert_eq!(raw["type"], "DIRECTOR");
}

#[tokio::test]
async fn patch_person_name_rederives_slug() {
    let app = people_app().await;
    let (status, _) = patch_json(
        &app,
        "/api/people/kristofer-nolan",
        r#"{"name":"Christopher Nolan"}"#,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = get(&app, "/api/people/christopher-nolan").await;
    assert_eq!(status, StatusCode::OK);
    let person: PersonResponse = serde_json::from_str(&body).unwrap();
    assert_eq!(person.name, "Christopher Nolan");

    let (_, body) = get(&app, "/api/search?q=christopher&types=people").await;
    assert!(body.contains("christopher-nolan"));
}

#[tokio::test]
async fn patch_unknown_person_is_not_found() {
    let app = people_app().await;
    let (status, _) = patch_json(&app, "/api/people/nobody", r#"{"name":"X"}"#).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// ---------------------------------------------------------------------------
// Series
// ---------------------------------------------------------------------------

async fn series_app() -> TestApp {
    test_app_with(|catalog| {
        catalog.insert_movie(movie("Dark", MovieKind::TvSeries, Some(8.7), Some(2017)));
        catalog.insert_movie(movie("Arcane", MovieKind::AnimatedSeries, Some(9.0), Some(2021)));
        catalog.insert_movie(movie("Unrated", MovieKind::TvSeries, None, None));
        catalog.insert_movie(movie("Heat", MovieKind::Movie, Some(8.3), Some(1995)));
    })
    .await
}

fn names(body: &str) -> Vec<String> {
    let series: Vec<SeriesResponse> = serde_json::from_str(body).unwrap();
    series.into_iter().map(|s| s.name).collect()
}

#[tokio::test]
async fn popular_series_are_ranked() {
    let app = series_app().await;
    let (status, body) = get(&app, "/api/series/popular").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(names(&body), vec!["Arcane", "Dark", "Unrated"]);
}

#[tokio::test]
async fn popular_series_limit_is_clamped() {
    let app = series_app().await;

    let (_, body) = get(&app, "/api/series/popular?limit=1").await;
    assert_eq!(names(&body), vec!["Arcane"]);

    let (_, body) = get(&app, "/api/series/popular?limit=0").await;
    assert_eq!(names(&body).len(), 1);

    let (_, body) = get(&app, "/api/series/popular?limit=abc").await;
    assert_eq!(names(&body).len(), 3);
}

// ---------------------------------------------------------------------------
// Assets
// ---------------------------------------------------------------------------

#[tokio::test]
async fn upload_stores_file_with_fresh_name() {
    let app = test_app().await;
    let (status, body) =
        post_multipart(&app, "/api/assets/posters", "poster.JPG", "image/jpeg", b"jpeg", &[])
            .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");

    let asset: AssetResponse = serde_json::from_str(&body).unwrap();
    assert!(asset.path.starts_with("posters/"));
    assert!(asset.path.ends_with(".jpg"));
    assert_ne!(asset.path, "posters/poster.jpg");
    assert_eq!(asset.url.as_deref(), Some(format!("/storage/{}", asset.path).as_str()));
    assert!(app.stored_path(&asset.path).exists());
}

#[tokio::test]
async fn upload_extension_ignores_content_type_parameters() {
    let app = test_app().await;
    let (status, body) =
        post_multipart(&app, "/api/assets/posters", "poster", "image/png; name=a", b"png", &[])
            .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");

    let asset: AssetResponse = serde_json::from_str(&body).unwrap();
    assert!(asset.path.starts_with("posters/"));
    assert!(asset.path.ends_with(".png"), "{}", asset.path);
    assert!(app.stored_path(&asset.path).exists());
}

#[tokio::test]
async fn upload_replaces_previous_asset() {
    let app = test_app().await;
    let (_, body) =
        post_multipart(&app, "/api/assets/posters", "old.png", "image/png", b"old", &[]).await;
    let old: AssetResponse = serde_json::from_str(&body).unwrap();

    let (status, body) = post_multipart(
        &app,
        "/api/assets/posters",
        "new.png",
        "image/png",
        b"new",
        &[("previous", old.path.as_str())],
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let new: AssetResponse = serde_json::from_str(&body).unwrap();

    assert_ne!(new.path, old.path);
    assert!(!app.stored_path(&old.path).exists());
    assert!(app.stored_path(&new.path).exists());
}

#[tokio::test]
async fn delete_asset_is_idempotent() {
    let app = test_app().await;
    let (_, body) =
        post_multipart(&app, "/api/assets/people", "face.webp", "image/webp", b"x", &[]).await;
    let asset: AssetResponse = serde_json::from_str(&body).unwrap();
    let uri = format!("/api/assets?path={}", asset.path);

    let (status, body) = delete(&app, &uri).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, r#"{"deleted":true}"#);

    let (status, body) = delete(&app, &uri).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, r#"{"deleted":false}"#);
}

#[tokio::test]
async fn asset_paths_are_checked() {
    let app = test_app().await;

    let (status, _) = delete(&app, "/api/assets?path=../secrets").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) =
        post_multipart(&app, "/api/assets/Posters", "a.png", "image/png", b"x", &[]).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

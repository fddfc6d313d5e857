use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use catalog_server::assets::AssetResolver;
use catalog_server::db::AppState;
use catalog_server::repo::{CatalogRepository, InMemoryCatalog};
use catalog_server::slug::SlugScope;
use catalog_server::search::{build_index, CatalogIndex};
use catalog_server::storage::LocalDiskStore;
use async_trait::async_trait;
use catalog_types::{AppError, Gender, Movie, MovieKind, Person, PersonType, Selection, Studio, Tag};
use std::collections::HashSet;
use chrono::{NaiveDate, Utc};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tower::ServiceExt;
use uuid::Uuid;

/// Public URL prefix of the test disk.
#[allow(dead_code)]
pub const STORAGE_URL: &str = "/storage";

/// A router over in-memory collaborators. Keep it alive for the duration of
/// the test; dropping it removes the storage directory.
pub struct TestApp {
    pub router: Router,
    pub storage: TempDir,
}

#[allow(dead_code)]
impl TestApp {
    /// Absolute path of a stored reference.
    pub fn stored_path(&self, reference: &str) -> std::path::PathBuf {
        self.storage.path().join(reference)
    }
}

/// Build the full application router with an empty catalog.
#[allow(dead_code)]
pub async fn test_app() -> TestApp {
    test_app_with(|_| {}).await
}

/// Build the full application router over a catalog prepared by `seed`.
/// The search index is built after seeding.
pub async fn test_app_with(seed: impl FnOnce(&InMemoryCatalog)) -> TestApp {
    let catalog = InMemoryCatalog::new();
    seed(&catalog);
    test_app_over(Arc::new(catalog)).await
}

/// Build the full application router over any catalog repository.
pub async fn test_app_over(catalog: Arc<dyn CatalogRepository>) -> TestApp {
    let storage = tempfile::tempdir().unwrap();

    let index = CatalogIndex::new().unwrap();
    build_index(catalog.as_ref(), &index).await.unwrap();

    let state = AppState {
        catalog,
        search: index.dispatcher(10, Duration::from_secs(2)),
        index,
        assets: AssetResolver::new(Arc::new(LocalDiskStore::new(storage.path(), STORAGE_URL))),
    };

    TestApp {
        router: catalog_server::openapi::app_router(state),
        storage,
    }
}

/// In-memory catalog whose updates always fail with a slug conflict, the
/// way a concurrent rename surfaces from the database.
#[derive(Default)]
pub struct ConflictingUpdates {
    inner: InMemoryCatalog,
}

#[async_trait]
impl CatalogRepository for ConflictingUpdates {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn create_tag(&self, tag: Tag) -> Result<Tag, AppError> {
        self.inner.create_tag(tag).await
    }

    async fn find_tag(&self, slug: &str) -> Result<Option<Tag>, AppError> {
        self.inner.find_tag(slug).await
    }

    async fn update_tag(&self, _tag: Tag) -> Result<Tag, AppError> {
        Err(AppError::conflict("This slug is already taken"))
    }

    async fn create_studio(&self, studio: Studio) -> Result<Studio, AppError> {
        self.inner.create_studio(studio).await
    }

    async fn find_studio(&self, slug: &str) -> Result<Option<Studio>, AppError> {
        self.inner.find_studio(slug).await
    }

    async fn find_person(&self, slug: &str) -> Result<Option<Person>, AppError> {
        self.inner.find_person(slug).await
    }

    async fn update_person(&self, _person: Person) -> Result<Person, AppError> {
        Err(AppError::conflict("This slug is already taken"))
    }

    async fn popular_series(&self, limit: i64) -> Result<Vec<Movie>, AppError> {
        self.inner.popular_series(limit).await
    }

    async fn taken_slugs(&self, scope: SlugScope, base: &str) -> Result<HashSet<String>, AppError> {
        self.inner.taken_slugs(scope, base).await
    }

    async fn all_movies(&self) -> Result<Vec<Movie>, AppError> {
        self.inner.all_movies().await
    }

    async fn all_people(&self) -> Result<Vec<Person>, AppError> {
        self.inner.all_people().await
    }

    async fn all_studios(&self) -> Result<Vec<Studio>, AppError> {
        self.inner.all_studios().await
    }

    async fn all_tags(&self) -> Result<Vec<Tag>, AppError> {
        self.inner.all_tags().await
    }

    async fn all_selections(&self) -> Result<Vec<Selection>, AppError> {
        self.inner.all_selections().await
    }
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

#[allow(dead_code)]
pub fn movie(name: &str, kind: MovieKind, imdb_score: Option<f32>, year: Option<i32>) -> Movie {
    let now = Utc::now();
    Movie {
        id: Uuid::new_v4(),
        name: name.to_string(),
        slug: catalog_server::slug::slugify(name),
        description: String::new(),
        kind,
        release_year: year,
        poster: None,
        imdb_score,
        aliases: vec![],
        created_at: now,
        updated_at: now,
    }
}

#[allow(dead_code)]
pub fn person(name: &str, slug: &str, person_type: PersonType) -> Person {
    let now = Utc::now();
    Person {
        id: Uuid::new_v4(),
        name: name.to_string(),
        slug: slug.to_string(),
        person_type,
        original_name: None,
        gender: Some(Gender::Male),
        image: None,
        description: Some("Director and screenwriter.".to_string()),
        birthday: NaiveDate::from_ymd_opt(1970, 7, 30),
        birthplace: Some("London".to_string()),
        meta_title: None,
        meta_description: None,
        meta_image: None,
        created_at: now,
        updated_at: now,
    }
}

#[allow(dead_code)]
pub fn selection(name: &str) -> Selection {
    let now = Utc::now();
    Selection {
        id: Uuid::new_v4(),
        name: name.to_string(),
        slug: catalog_server::slug::slugify(name),
        description: String::new(),
        meta_image: Some("https://cdn.example.com/selection.jpg".to_string()),
        created_at: now,
        updated_at: now,
    }
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

async fn send(app: &TestApp, request: Request<Body>) -> (StatusCode, String) {
    let response = app.router.clone().oneshot(request).await.unwrap();

    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, String::from_utf8(body.to_vec()).unwrap())
}

#[allow(dead_code)]
/// Helper to make a GET request and return (status, body).
pub async fn get(app: &TestApp, uri: &str) -> (StatusCode, String) {
    send(app, Request::builder().uri(uri).body(Body::empty()).unwrap()).await
}

#[allow(dead_code)]
/// Helper to make a POST request with JSON body.
pub async fn post_json(app: &TestApp, uri: &str, json: &str) -> (StatusCode, String) {
    send(
        app,
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
    )
    .await
}

#[allow(dead_code)]
/// Helper to make a PATCH request with JSON body.
pub async fn patch_json(app: &TestApp, uri: &str, json: &str) -> (StatusCode, String) {
    send(
        app,
        Request::builder()
            .method("PATCH")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
    )
    .await
}

#[allow(dead_code)]
/// Helper to make a DELETE request.
pub async fn delete(app: &TestApp, uri: &str) -> (StatusCode, String) {
    send(
        app,
        Request::builder()
            .method("DELETE")
            .uri(uri)
            .body(Body::empty())
            .unwrap(),
    )
    .await
}

#[allow(dead_code)]
/// Helper to upload one file as multipart field `file`, plus optional text
/// fields.
pub async fn post_multipart(
    app: &TestApp,
    uri: &str,
    file_name: &str,
    content_type: &str,
    bytes: &[u8],
    fields: &[(&str, &str)],
) -> (StatusCode, String) {
    let boundary = "catalog-test-boundary";
    let mut body: Vec<u8> = Vec::new();

    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{boundary}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
    }
    body.extend_from_slice(
        format!(
            "--{boundary}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{file_name}\"\r\nContent-Type: {content_type}\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());

    send(
        app,
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(
                "content-type",
                format!("multipart/form-data; boundary={boundary}"),
            )
            .body(Body::from(body))
            .unwrap(),
    )
    .await
}

use async_trait::async_trait;
use catalog_types::{AppError, Gender, Movie, Person, Selection, Studio, Tag};
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::types::Json;
use sqlx::{FromRow, Pool, Postgres};
use std::collections::HashSet;
use uuid::Uuid;

use super::{in_slug_family, CatalogRepository};
use crate::error_convert::SqlxErrorExt;
use crate::slug::SlugScope;

const TAG_COLUMNS: &str = "id, name, slug, description, is_genre, image, aliases, \
     meta_title, meta_description, meta_image, created_at, updated_at";

const STUDIO_COLUMNS: &str = "id, name, slug, description, image, aliases, \
     meta_title, meta_description, meta_image, created_at, updated_at";

const PERSON_COLUMNS: &str = "id, name, slug, type, original_name, gender, image, description, \
     birthday, birthplace, meta_title, meta_description, meta_image, created_at, updated_at";

const MOVIE_COLUMNS: &str = "id, name, slug, description, kind, release_year, poster, \
     imdb_score, aliases, created_at, updated_at";

/// Postgres-backed catalog.
#[derive(Clone)]
pub struct PgCatalog {
    pool: Pool<Postgres>,
}

impl PgCatalog {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

// ---------------------------------------------------------------------------
// Row types
// ---------------------------------------------------------------------------

#[derive(FromRow)]
struct TagRow {
    id: Uuid,
    name: String,
    slug: String,
    description: String,
    is_genre: bool,
    image: Option<String>,
    aliases: Json<Vec<String>>,
    meta_title: Option<String>,
    meta_description: Option<String>,
    meta_image: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<TagRow> for Tag {
    fn from(r: TagRow) -> Self {
        Tag {
            id: r.id,
            name: r.name,
            slug: r.slug,
            description: r.description,
            is_genre: r.is_genre,
            image: r.image,
            aliases: r.aliases.0,
            meta_title: r.meta_title,
            meta_description: r.meta_description,
            meta_image: r.meta_image,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

#[derive(FromRow)]
struct StudioRow {
    id: Uuid,
    name: String,
    slug: String,
    description: String,
    image: Option<String>,
    aliases: Json<Vec<String>>,
    meta_title: Option<String>,
    meta_description: Option<String>,
    meta_image: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<StudioRow> for Studio {
    fn from(r: StudioRow) -> Self {
        Studio {
            id: r.id,
            name: r.name,
            slug: r.slug,
            description: r.description,
            image: r.image,
            aliases: r.aliases.0,
            meta_title: r.meta_title,
            meta_description: r.meta_description,
            meta_image: r.meta_image,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

#[derive(FromRow)]
struct PersonRow {
    id: Uuid,
    name: String,
    slug: String,
    #[sqlx(rename = "type")]
    person_type: String,
    original_name: Option<String>,
    gender: Option<String>,
    image: Option<String>,
    description: Option<String>,
    birthday: Option<NaiveDate>,
    birthplace: Option<String>,
    meta_title: Option<String>,
    meta_description: Option<String>,
    meta_image: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<PersonRow> for Person {
    type Error = AppError;

    fn try_from(r: PersonRow) -> Result<Self, Self::Error> {
        let gender: Option<Gender> = r
            .gender
            .as_deref()
            .map(str::parse::<Gender>)
            .transpose()
            .map_err(AppError::database)?;
        Ok(Person {
            id: r.id,
            name: r.name,
            slug: r.slug,
            person_type: r.person_type.parse().map_err(AppError::database)?,
            original_name: r.original_name,
            gender,
            image: r.image,
            description: r.description,
            birthday: r.birthday,
            birthplace: r.birthplace,
            meta_title: r.meta_title,
            meta_description: r.meta_description,
            meta_image: r.meta_image,
            created_at: r.created_at,
            updated_at: r.updated_at,
        })
    }
}

#[derive(FromRow)]
struct MovieRow {
    id: Uuid,
    name: String,
    slug: String,
    description: String,
    kind: String,
    release_year: Option<i32>,
    poster: Option<String>,
    imdb_score: Option<f32>,
    aliases: Json<Vec<String>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<MovieRow> for Movie {
    type Error = AppError;

    fn try_from(r: MovieRow) -> Result<Self, Self::Error> {
        Ok(Movie {
            id: r.id,
            name: r.name,
            slug: r.slug,
            description: r.description,
            kind: r.kind.parse().map_err(AppError::database)?,
            release_year: r.release_year,
            poster: r.poster,
            imdb_score: r.imdb_score,
            aliases: r.aliases.0,
            created_at: r.created_at,
            updated_at: r.updated_at,
        })
    }
}

#[derive(FromRow)]
struct SelectionRow {
    id: Uuid,
    name: String,
    slug: String,
    description: String,
    meta_image: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<SelectionRow> for Selection {
    fn from(r: SelectionRow) -> Self {
        Selection {
            id: r.id,
            name: r.name,
            slug: r.slug,
            description: r.description,
            meta_image: r.meta_image,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

/// Escape `%`, `_` and `\` for use inside a LIKE pattern.
fn escape_like(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(ch);
    }
    out
}

#[async_trait]
impl CatalogRepository for PgCatalog {
    fn backend(&self) -> &'static str {
        "postgres"
    }

    async fn ping(&self) -> Result<(), AppError> {
        sqlx::query_scalar::<_, i32>("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map(|_| ())
            .map_err(SqlxErrorExt::into_app_error)
    }

    async fn create_tag(&self, tag: Tag) -> Result<Tag, AppError> {
        let sql = format!(
            "INSERT INTO tags ({TAG_COLUMNS}) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12) \
             RETURNING {TAG_COLUMNS}"
        );
        let row = sqlx::query_as::<_, TagRow>(&sql)
            .bind(tag.id)
            .bind(&tag.name)
            .bind(&tag.slug)
            .bind(&tag.description)
            .bind(tag.is_genre)
            .bind(&tag.image)
            .bind(Json(&tag.aliases))
            .bind(&tag.meta_title)
            .bind(&tag.meta_description)
            .bind(&tag.meta_image)
            .bind(tag.created_at)
            .bind(tag.updated_at)
            .fetch_one(&self.pool)
            .await
            .map_err(SqlxErrorExt::into_app_error)?;

        Ok(row.into())
    }

    async fn find_tag(&self, slug: &str) -> Result<Option<Tag>, AppError> {
        let sql = format!("SELECT {TAG_COLUMNS} FROM tags WHERE slug = $1");
        let row = sqlx::query_as::<_, TagRow>(&sql)
            .bind(slug)
            .fetch_optional(&self.pool)
            .await
            .map_err(SqlxErrorExt::into_app_error)?;

        Ok(row.map(Tag::from))
    }

    async fn update_tag(&self, tag: Tag) -> Result<Tag, AppError> {
        let sql = format!(
            "UPDATE tags SET name = $2, slug = $3, description = $4, is_genre = $5, \
             image = $6, aliases = $7, meta_title = $8, meta_description = $9, \
             meta_image = $10, updated_at = $11 \
             WHERE id = $1 \
             RETURNING {TAG_COLUMNS}"
        );
        let row = sqlx::query_as::<_, TagRow>(&sql)
            .bind(tag.id)
            .bind(&tag.name)
            .bind(&tag.slug)
            .bind(&tag.description)
            .bind(tag.is_genre)
            .bind(&tag.image)
            .bind(Json(&tag.aliases))
            .bind(&tag.meta_title)
            .bind(&tag.meta_description)
            .bind(&tag.meta_image)
            .bind(tag.updated_at)
            .fetch_optional(&self.pool)
            .await
            .map_err(SqlxErrorExt::into_app_error)?
            .ok_or_else(|| AppError::not_found(format!("Tag {} not found", tag.id)))?;

        Ok(row.into())
    }

    async fn create_studio(&self, studio: Studio) -> Result<Studio, AppError> {
        let sql = format!(
            "INSERT INTO studios ({STUDIO_COLUMNS}) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11) \
             RETURNING {STUDIO_COLUMNS}"
        );
        let row = sqlx::query_as::<_, StudioRow>(&sql)
            .bind(studio.id)
            .bind(&studio.name)
            .bind(&studio.slug)
            .bind(&studio.description)
            .bind(&studio.image)
            .bind(Json(&studio.aliases))
            .bind(&studio.meta_title)
            .bind(&studio.meta_description)
            .bind(&studio.meta_image)
            .bind(studio.created_at)
            .bind(studio.updated_at)
            .fetch_one(&self.pool)
            .await
            .map_err(SqlxErrorExt::into_app_error)?;

        Ok(row.into())
    }

    async fn find_studio(&self, slug: &str) -> Result<Option<Studio>, AppError> {
        let sql = format!("SELECT {STUDIO_COLUMNS} FROM studios WHERE slug = $1");
        let row = sqlx::query_as::<_, StudioRow>(&sql)
            .bind(slug)
            .fetch_optional(&self.pool)
            .await
            .map_err(SqlxErrorExt::into_app_error)?;

        Ok(row.map(Studio::from))
    }

    async fn find_person(&self, slug: &str) -> Result<Option<Person>, AppError> {
        let sql = format!("SELECT {PERSON_COLUMNS} FROM people WHERE slug = $1");
        let row = sqlx::query_as::<_, PersonRow>(&sql)
            .bind(slug)
            .fetch_optional(&self.pool)
            .await
            .map_err(SqlxErrorExt::into_app_error)?;

        row.map(Person::try_from).transpose()
    }

    async fn update_person(&self, person: Person) -> Result<Person, AppError> {
        let sql = format!(
            "UPDATE people SET name = $2, slug = $3, type = $4, original_name = $5, \
             gender = $6, image = $7, description = $8, birthday = $9, birthplace = $10, \
             meta_title = $11, meta_description = $12, meta_image = $13, updated_at = $14 \
             WHERE id = $1 \
             RETURNING {PERSON_COLUMNS}"
        );
        let row = sqlx::query_as::<_, PersonRow>(&sql)
            .bind(person.id)
            .bind(&person.name)
            .bind(&person.slug)
            .bind(person.person_type.as_str())
            .bind(&person.original_name)
            .bind(person.gender.map(|g| g.as_str()))
            .bind(&person.image)
            .bind(&person.description)
            .bind(person.birthday)
            .bind(&person.birthplace)
            .bind(&person.meta_title)
            .bind(&person.meta_description)
            .bind(&person.meta_image)
            .bind(person.updated_at)
            .fetch_optional(&self.pool)
            .await
            .map_err(SqlxErrorExt::into_app_error)?
            .ok_or_else(|| AppError::not_found(format!("Person {} not found", person.id)))?;

        row.try_into()
    }

    async fn popular_series(&self, limit: i64) -> Result<Vec<Movie>, AppError> {
        let sql = format!(
            "SELECT {MOVIE_COLUMNS} FROM movies \
             WHERE kind IN ('tv_series', 'animated_series') \
             ORDER BY imdb_score DESC NULLS LAST, name ASC \
             LIMIT $1"
        );
        let rows = sqlx::query_as::<_, MovieRow>(&sql)
            .bind(limit)
            .fetch_all(&self.pool)
            .await
            .map_err(SqlxErrorExt::into_app_error)?;

        rows.into_iter().map(Movie::try_from).collect()
    }

    async fn taken_slugs(&self, scope: SlugScope, base: &str) -> Result<HashSet<String>, AppError> {
        let table = match scope {
            SlugScope::Tag => "tags",
            SlugScope::Studio => "studios",
            SlugScope::Person => "people",
        };
        let sql = format!("SELECT slug FROM {table} WHERE slug = $1 OR slug LIKE $2");
        let slugs: Vec<String> = sqlx::query_scalar(&sql)
            .bind(base)
            .bind(format!("{}-%", escape_like(base)))
            .fetch_all(&self.pool)
            .await
            .map_err(SqlxErrorExt::into_app_error)?;

        Ok(slugs
            .into_iter()
            .filter(|s| in_slug_family(s, base))
            .collect())
    }

    async fn all_movies(&self) -> Result<Vec<Movie>, AppError> {
        let sql = format!("SELECT {MOVIE_COLUMNS} FROM movies");
        let rows = sqlx::query_as::<_, MovieRow>(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(SqlxErrorExt::into_app_error)?;

        rows.into_iter().map(Movie::try_from).collect()
    }

    async fn all_people(&self) -> Result<Vec<Person>, AppError> {
        let sql = format!("SELECT {PERSON_COLUMNS} FROM people");
        let rows = sqlx::query_as::<_, PersonRow>(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(SqlxErrorExt::into_app_error)?;

        rows.into_iter().map(Person::try_from).collect()
    }

    async fn all_studios(&self) -> Result<Vec<Studio>, AppError> {
        let sql = format!("SELECT {STUDIO_COLUMNS} FROM studios");
        let rows = sqlx::query_as::<_, StudioRow>(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(SqlxErrorExt::into_app_error)?;

        Ok(rows.into_iter().map(Studio::from).collect())
    }

    async fn all_tags(&self) -> Result<Vec<Tag>, AppError> {
        let sql = format!("SELECT {TAG_COLUMNS} FROM tags");
        let rows = sqlx::query_as::<_, TagRow>(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(SqlxErrorExt::into_app_error)?;

        Ok(rows.into_iter().map(Tag::from).collect())
    }

    async fn all_selections(&self) -> Result<Vec<Selection>, AppError> {
        let rows = sqlx::query_as::<_, SelectionRow>(
            "SELECT id, name, slug, description, meta_image, created_at, updated_at FROM selections",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(SqlxErrorExt::into_app_error)?;

        Ok(rows.into_iter().map(Selection::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn like_patterns_are_escaped() {
        assert_eq!(escape_like("100%_off"), "100\\%\\_off");
        assert_eq!(escape_like("noir"), "noir");
    }
}

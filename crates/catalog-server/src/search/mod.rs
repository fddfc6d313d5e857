//! Multi-type catalog search.
//!
//! Each content type has its own [`SearchBackend`]; the
//! [`SearchDispatcher`] fans a query out to the requested types and
//! projects every record into a [`SearchResultItem`].

pub mod dispatch;
pub mod index;

pub use dispatch::SearchDispatcher;
pub use index::{build_index, CatalogIndex, Indexable, TypeIndex};

use catalog_types::{
    ContentType, ItemDetails, Movie, Person, SearchResultItem, Selection, Studio, Tag,
};
use std::fmt;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq)]
pub enum SearchError {
    /// The backend reported a failure.
    Backend(String),
    /// The backend did not answer within the configured budget.
    Timeout(ContentType),
    /// No backend is registered for a requested type.
    Unregistered(ContentType),
    /// The tantivy index could not be built, written or read.
    Index(String),
}

impl fmt::Display for SearchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SearchError::Backend(msg) => write!(f, "search backend failed: {msg}"),
            SearchError::Timeout(ty) => write!(f, "search backend for {ty} timed out"),
            SearchError::Unregistered(ty) => write!(f, "no search backend registered for {ty}"),
            SearchError::Index(msg) => write!(f, "search index error: {msg}"),
        }
    }
}

impl std::error::Error for SearchError {}

impl From<tantivy::TantivyError> for SearchError {
    fn from(err: tantivy::TantivyError) -> Self {
        SearchError::Index(err.to_string())
    }
}

/// Ranked text lookup over one kind of record.
///
/// Implementations are blocking; the dispatcher runs them off the async
/// executor.
pub trait SearchBackend: Send + Sync + 'static {
    type Record: Send + 'static;

    /// Up to `limit` records, best match first.
    fn search(&self, text: &str, limit: usize) -> Result<Vec<Self::Record>, SearchError>;
}

impl<B: SearchBackend> SearchBackend for Arc<B> {
    type Record = B::Record;

    fn search(&self, text: &str, limit: usize) -> Result<Vec<Self::Record>, SearchError> {
        (**self).search(text, limit)
    }
}

/// Converts one backend record into its display-safe shape.
pub type Projector<R> = fn(R) -> SearchResultItem;

/// A backend with its projector attached, erased over the record type.
pub(crate) trait ProjectedSearch: Send + Sync {
    fn search_projected(&self, text: &str, limit: usize)
        -> Result<Vec<SearchResultItem>, SearchError>;
}

pub(crate) struct Projected<B: SearchBackend> {
    backend: B,
    project: Projector<B::Record>,
}

impl<B: SearchBackend> Projected<B> {
    pub(crate) fn new(backend: B, project: Projector<B::Record>) -> Self {
        Self { backend, project }
    }
}

impl<B: SearchBackend> ProjectedSearch for Projected<B> {
    fn search_projected(
        &self,
        text: &str,
        limit: usize,
    ) -> Result<Vec<SearchResultItem>, SearchError> {
        let records = self.backend.search(text, limit)?;
        Ok(records.into_iter().map(self.project).collect())
    }
}

// ── Projectors ──────────────────────────────────────────────────────

pub fn project_movie(movie: Movie) -> SearchResultItem {
    SearchResultItem {
        id: movie.id.to_string(),
        name: movie.name,
        slug: movie.slug,
        image: movie.poster,
        details: ItemDetails::Movie {
            kind: movie.kind,
            year: movie.release_year,
        },
    }
}

pub fn project_person(person: Person) -> SearchResultItem {
    SearchResultItem {
        id: person.id.to_string(),
        name: person.name,
        slug: person.slug,
        image: person.image,
        details: ItemDetails::Person {
            person_type: person.person_type,
        },
    }
}

pub fn project_studio(studio: Studio) -> SearchResultItem {
    SearchResultItem {
        id: studio.id.to_string(),
        name: studio.name,
        slug: studio.slug,
        image: studio.image,
        details: ItemDetails::Basic {},
    }
}

pub fn project_tag(tag: Tag) -> SearchResultItem {
    SearchResultItem {
        id: tag.id.to_string(),
        name: tag.name,
        slug: tag.slug,
        image: tag.image,
        details: ItemDetails::Basic {},
    }
}

pub fn project_selection(selection: Selection) -> SearchResultItem {
    SearchResultItem {
        id: selection.id.to_string(),
        name: selection.name,
        slug: selection.slug,
        image: selection.meta_image,
        details: ItemDetails::Basic {},
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use catalog_types::{MovieKind, PersonType};
    use chrono::Utc;
    use uuid::Uuid;

    #[test]
    fn movie_projection_uses_poster_kind_and_year() {
        let now = Utc::now();
        let movie = Movie {
            id: Uuid::nil(),
            name: "Dark".to_string(),
            slug: "dark".to_string(),
            description: String::new(),
            kind: MovieKind::TvSeries,
            release_year: Some(2017),
            poster: Some("movies/dark.jpg".to_string()),
            imdb_score: Some(8.7),
            aliases: vec![],
            created_at: now,
            updated_at: now,
        };
        let item = project_movie(movie);
        assert_eq!(item.image.as_deref(), Some("movies/dark.jpg"));
        assert_eq!(
            item.details,
            ItemDetails::Movie {
                kind: MovieKind::TvSeries,
                year: Some(2017)
            }
        );
    }

    #[test]
    fn selection_projection_uses_meta_image() {
        let now = Utc::now();
        let selection = Selection {
            id: Uuid::nil(),
            name: "Best of 2020".to_string(),
            slug: "best-of-2020".to_string(),
            description: String::new(),
            meta_image: Some("selections/2020.png".to_string()),
            created_at: now,
            updated_at: now,
        };
        let item = project_selection(selection);
        assert_eq!(item.image.as_deref(), Some("selections/2020.png"));
        assert_eq!(item.details, ItemDetails::Basic {});
    }

    #[test]
    fn person_projection_carries_type() {
        let now = Utc::now();
        let person = Person {
            id: Uuid::nil(),
            name: "Hans Zimmer".to_string(),
            slug: "hans-zimmer".to_string(),
            person_type: PersonType::Composer,
            original_name: None,
            gender: None,
            image: None,
            description: None,
            birthday: None,
            birthplace: None,
            meta_title: None,
            meta_description: None,
            meta_image: None,
            created_at: now,
            updated_at: now,
        };
        let json = serde_json::to_value(project_person(person)).unwrap();
        assert_eq!(json["type"], "COMPOSER");
    }

    #[test]
    fn errors_name_the_content_type() {
        assert_eq!(
            SearchError::Timeout(ContentType::Studio).to_string(),
            "search backend for studios timed out"
        );
    }
}

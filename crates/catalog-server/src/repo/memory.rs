use async_trait::async_trait;
use catalog_types::{AppError, Movie, Person, Selection, Studio, Tag};
use parking_lot::RwLock;
use std::cmp::Ordering;
use std::collections::HashSet;

use super::{in_slug_family, CatalogRepository};
use crate::slug::SlugScope;

#[derive(Default)]
struct CatalogData {
    movies: Vec<Movie>,
    people: Vec<Person>,
    studios: Vec<Studio>,
    tags: Vec<Tag>,
    selections: Vec<Selection>,
}

/// Process-local catalog. Slug uniqueness is enforced like the database's
/// unique indexes.
#[derive(Default)]
pub struct InMemoryCatalog {
    data: RwLock<CatalogData>,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_movie(&self, movie: Movie) {
        self.data.write().movies.push(movie);
    }

    pub fn insert_person(&self, person: Person) {
        self.data.write().people.push(person);
    }

    pub fn insert_selection(&self, selection: Selection) {
        self.data.write().selections.push(selection);
    }
}

fn slug_conflict() -> AppError {
    AppError::conflict("This slug is already taken")
}

#[async_trait]
impl CatalogRepository for InMemoryCatalog {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn create_tag(&self, tag: Tag) -> Result<Tag, AppError> {
        let mut data = self.data.write();
        if data.tags.iter().any(|t| t.slug == tag.slug) {
            return Err(slug_conflict());
        }
        data.tags.push(tag.clone());
        Ok(tag)
    }

    async fn find_tag(&self, slug: &str) -> Result<Option<Tag>, AppError> {
        Ok(self.data.read().tags.iter().find(|t| t.slug == slug).cloned())
    }

    async fn update_tag(&self, tag: Tag) -> Result<Tag, AppError> {
        let mut data = self.data.write();
        if data.tags.iter().any(|t| t.slug == tag.slug && t.id != tag.id) {
            return Err(slug_conflict());
        }
        let slot = data
            .tags
            .iter_mut()
            .find(|t| t.id == tag.id)
            .ok_or_else(|| AppError::not_found(format!("Tag {} not found", tag.id)))?;
        *slot = tag.clone();
        Ok(tag)
    }

    async fn create_studio(&self, studio: Studio) -> Result<Studio, AppError> {
        let mut data = self.data.write();
        if data.studios.iter().any(|s| s.slug == studio.slug) {
            return Err(slug_conflict());
        }
        data.studios.push(studio.clone());
        Ok(studio)
    }

    async fn find_studio(&self, slug: &str) -> Result<Option<Studio>, AppError> {
        Ok(self
            .data
            .read()
            .studios
            .iter()
            .find(|s| s.slug == slug)
            .cloned())
    }

    async fn find_person(&self, slug: &str) -> Result<Option<Person>, AppError> {
        Ok(self
            .data
            .read()
            .people
            .iter()
            .find(|p| p.slug == slug)
            .cloned())
    }

    async fn update_person(&self, person: Person) -> Result<Person, AppError> {
        let mut data = self.data.write();
        if data
            .people
            .iter()
            .any(|p| p.slug == person.slug && p.id != person.id)
        {
            return Err(slug_conflict());
        }
        let slot = data
            .people
            .iter_mut()
            .find(|p| p.id == person.id)
            .ok_or_else(|| AppError::not_found(format!("Person {} not found", person.id)))?;
        *slot = person.clone();
        Ok(person)
    }

    async fn popular_series(&self, limit: i64) -> Result<Vec<Movie>, AppError> {
        let mut series: Vec<Movie> = self
            .data
            .read()
            .movies
            .iter()
            .filter(|m| m.kind.is_series())
            .cloned()
            .collect();

        series.sort_by(|a, b| {
            let by_score = match (a.imdb_score, b.imdb_score) {
                (Some(x), Some(y)) => y.partial_cmp(&x).unwrap_or(Ordering::Equal),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            };
            by_score.then_with(|| a.name.cmp(&b.name))
        });
        series.truncate(usize::try_from(limit.max(0)).unwrap_or(0));
        Ok(series)
    }

    async fn taken_slugs(&self, scope: SlugScope, base: &str) -> Result<HashSet<String>, AppError> {
        let data = self.data.read();
        let slugs: Vec<&String> = match scope {
            SlugScope::Tag => data.tags.iter().map(|t| &t.slug).collect(),
            SlugScope::Studio => data.studios.iter().map(|s| &s.slug).collect(),
            SlugScope::Person => data.people.iter().map(|p| &p.slug).collect(),
        };
        Ok(slugs
            .into_iter()
            .filter(|s| in_slug_family(s, base))
            .cloned()
            .collect())
    }

    async fn all_movies(&self) -> Result<Vec<Movie>, AppError> {
        Ok(self.data.read().movies.clone())
    }

    async fn all_people(&self) -> Result<Vec<Person>, AppError> {
        Ok(self.data.read().people.clone())
    }

    async fn all_studios(&self) -> Result<Vec<Studio>, AppError> {
        Ok(self.data.read().studios.clone())
    }

    async fn all_tags(&self) -> Result<Vec<Tag>, AppError> {
        Ok(self.data.read().tags.clone())
    }

    async fn all_selections(&self) -> Result<Vec<Selection>, AppError> {
        Ok(self.data.read().selections.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use catalog_types::{AppErrorKind, MovieKind};
    use chrono::Utc;
    use uuid::Uuid;

    fn tag(slug: &str) -> Tag {
        let now = Utc::now();
        Tag {
            id: Uuid::new_v4(),
            name: slug.to_string(),
            slug: slug.to_string(),
            description: String::new(),
            is_genre: false,
            image: None,
            aliases: vec![],
            meta_title: None,
            meta_description: None,
            meta_image: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn series(name: &str, kind: MovieKind, score: Option<f32>) -> Movie {
        let now = Utc::now();
        Movie {
            id: Uuid::new_v4(),
            name: name.to_string(),
            slug: name.to_lowercase(),
            description: String::new(),
            kind,
            release_year: None,
            poster: None,
            imdb_score: score,
            aliases: vec![],
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn duplicate_slug_conflicts() {
        let repo = InMemoryCatalog::new();
        repo.create_tag(tag("noir")).await.unwrap();
        let err = repo.create_tag(tag("noir")).await.unwrap_err();
        assert_eq!(err.kind, AppErrorKind::Conflict);
    }

    #[tokio::test]
    async fn update_replaces_by_id() {
        let repo = InMemoryCatalog::new();
        let mut t = repo.create_tag(tag("noir")).await.unwrap();
        t.slug = "neo-noir".to_string();
        repo.update_tag(t).await.unwrap();

        assert!(repo.find_tag("noir").await.unwrap().is_none());
        assert!(repo.find_tag("neo-noir").await.unwrap().is_some());

        let err = repo.update_tag(tag("ghost")).await.unwrap_err();
        assert_eq!(err.kind, AppErrorKind::NotFound);
    }

    #[tokio::test]
    async fn taken_slugs_returns_family() {
        let repo = InMemoryCatalog::new();
        for slug in ["noir", "noir-2", "noirish", "drama"] {
            repo.create_tag(tag(slug)).await.unwrap();
        }
        let taken = repo.taken_slugs(SlugScope::Tag, "noir").await.unwrap();
        assert_eq!(taken.len(), 2);
        assert!(taken.contains("noir") && taken.contains("noir-2"));
        assert!(repo
            .taken_slugs(SlugScope::Studio, "noir")
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn popular_series_ranks_by_score() {
        let repo = InMemoryCatalog::new();
        repo.insert_movie(series("Unscored", MovieKind::TvSeries, None));
        repo.insert_movie(series("Good", MovieKind::TvSeries, Some(7.5)));
        repo.insert_movie(series("Great", MovieKind::AnimatedSeries, Some(9.1)));
        repo.insert_movie(series("Film", MovieKind::Movie, Some(9.9)));

        let names: Vec<String> = repo
            .popular_series(10)
            .await
            .unwrap()
            .into_iter()
            .map(|m| m.name)
            .collect();
        assert_eq!(names, vec!["Great", "Good", "Unscored"]);
        assert_eq!(repo.popular_series(1).await.unwrap().len(), 1);
    }
}

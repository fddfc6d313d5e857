//! Catalog persistence.
//!
//! Handlers and the index builder talk to [`CatalogRepository`]; production
//! runs on [`PgCatalog`], tests and database-less deployments on
//! [`InMemoryCatalog`].

pub mod memory;
pub mod postgres;

pub use memory::InMemoryCatalog;
pub use postgres::PgCatalog;

use async_trait::async_trait;
use catalog_types::{AppError, Movie, Person, Selection, Studio, Tag};
use std::collections::HashSet;

use crate::slug::SlugScope;

#[async_trait]
pub trait CatalogRepository: Send + Sync {
    /// Short backend name reported by the health check.
    fn backend(&self) -> &'static str;

    /// Round-trip to the backing store.
    async fn ping(&self) -> Result<(), AppError> {
        Ok(())
    }

    async fn create_tag(&self, tag: Tag) -> Result<Tag, AppError>;
    async fn find_tag(&self, slug: &str) -> Result<Option<Tag>, AppError>;
    /// Persist every field of `tag`, matched by id.
    async fn update_tag(&self, tag: Tag) -> Result<Tag, AppError>;

    async fn create_studio(&self, studio: Studio) -> Result<Studio, AppError>;
    async fn find_studio(&self, slug: &str) -> Result<Option<Studio>, AppError>;

    async fn find_person(&self, slug: &str) -> Result<Option<Person>, AppError>;
    async fn update_person(&self, person: Person) -> Result<Person, AppError>;

    /// Series ranked by IMDb score (unscored last), then name.
    async fn popular_series(&self, limit: i64) -> Result<Vec<Movie>, AppError>;

    /// Slugs in `scope` equal to `base` or of the form `base-*`.
    async fn taken_slugs(&self, scope: SlugScope, base: &str) -> Result<HashSet<String>, AppError>;

    async fn all_movies(&self) -> Result<Vec<Movie>, AppError>;
    async fn all_people(&self) -> Result<Vec<Person>, AppError>;
    async fn all_studios(&self) -> Result<Vec<Studio>, AppError>;
    async fn all_tags(&self) -> Result<Vec<Tag>, AppError>;
    async fn all_selections(&self) -> Result<Vec<Selection>, AppError>;
}

/// Whether `slug` belongs to the family [`CatalogRepository::taken_slugs`]
/// returns for `base`.
pub(crate) fn in_slug_family(slug: &str, base: &str) -> bool {
    slug == base
        || slug
            .strip_prefix(base)
            .is_some_and(|rest| rest.starts_with('-'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slug_family_matches_suffixes_only() {
        assert!(in_slug_family("noir", "noir"));
        assert!(in_slug_family("noir-2", "noir"));
        assert!(!in_slug_family("noirish", "noir"));
        assert!(!in_slug_family("neo-noir", "noir"));
    }
}

use catalog_types::{ContentType, SearchResultBundle, SearchResultItem};
use futures::future::join_all;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use super::{Projected, ProjectedSearch, Projector, SearchBackend, SearchError};
use crate::dto::SearchQuery;

/// Fans a [`SearchQuery`] out to one backend per requested content type.
///
/// Backends run concurrently on the blocking pool, each under its own
/// timeout. A failing or slow backend yields an empty entry and is listed in
/// [`SearchResultBundle::failed`]; the other types are unaffected.
#[derive(Clone)]
pub struct SearchDispatcher {
    backends: BTreeMap<ContentType, Arc<dyn ProjectedSearch>>,
    result_limit: usize,
    timeout: Duration,
}

impl SearchDispatcher {
    pub fn new(result_limit: usize, timeout: Duration) -> Self {
        Self {
            backends: BTreeMap::new(),
            result_limit,
            timeout,
        }
    }

    /// Register (or replace) the backend for `content_type`.
    pub fn with_backend<B: SearchBackend>(
        mut self,
        content_type: ContentType,
        backend: B,
        project: Projector<B::Record>,
    ) -> Self {
        self.backends
            .insert(content_type, Arc::new(Projected::new(backend, project)));
        self
    }

    pub async fn dispatch(&self, query: &SearchQuery) -> SearchResultBundle {
        let mut bundle = SearchResultBundle::default();
        if query.is_blank() {
            return bundle;
        }

        let lookups = query.types.iter().map(|&content_type| async move {
            let outcome = self.search_one(content_type, &query.text).await;
            (content_type, outcome)
        });

        // join_all keeps input order, and `types` iterates in the fixed order.
        for (content_type, outcome) in join_all(lookups).await {
            let items = match outcome {
                Ok(items) => items,
                Err(e) => {
                    tracing::warn!(content_type = %content_type, error = %e, "Search backend failed");
                    bundle.failed.insert(content_type);
                    Vec::new()
                }
            };
            bundle.results.insert(content_type, items);
        }

        bundle
    }

    async fn search_one(
        &self,
        content_type: ContentType,
        text: &str,
    ) -> Result<Vec<SearchResultItem>, SearchError> {
        let backend = self
            .backends
            .get(&content_type)
            .cloned()
            .ok_or(SearchError::Unregistered(content_type))?;

        let text = text.to_string();
        let limit = self.result_limit;
        let task = tokio::task::spawn_blocking(move || backend.search_projected(&text, limit));

        match tokio::time::timeout(self.timeout, task).await {
            Err(_) => Err(SearchError::Timeout(content_type)),
            Ok(Err(join_err)) => Err(SearchError::Backend(join_err.to_string())),
            Ok(Ok(result)) => result.map(|mut items| {
                items.truncate(limit);
                items
            }),
        }
    }
}

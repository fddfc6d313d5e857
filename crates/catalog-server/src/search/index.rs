use catalog_types::{AppError, ContentType, Movie, Person, Selection, Studio, Tag};
use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Duration;
use tantivy::collector::TopDocs;
use tantivy::query::QueryParser;
use tantivy::schema::{Field, Schema, Value, STORED, STRING, TEXT};
use tantivy::{Index, IndexReader, IndexWriter, ReloadPolicy, TantivyDocument, Term};

use super::{
    project_movie, project_person, project_selection, project_studio, project_tag, SearchBackend,
    SearchDispatcher, SearchError,
};
use crate::repo::CatalogRepository;

/// Writer heap budget per index.
const WRITER_MEMORY_BYTES: usize = 20_000_000;

/// A catalog record that can live in a [`TypeIndex`].
pub trait Indexable: Serialize + DeserializeOwned + Send + Sync + 'static {
    fn doc_id(&self) -> String;
    fn title(&self) -> &str;
    /// Alternative names matched alongside the title.
    fn alternates(&self) -> Vec<&str>;
}

impl Indexable for Movie {
    fn doc_id(&self) -> String {
        self.id.to_string()
    }
    fn title(&self) -> &str {
        &self.name
    }
    fn alternates(&self) -> Vec<&str> {
        self.aliases.iter().map(String::as_str).collect()
    }
}

impl Indexable for Person {
    fn doc_id(&self) -> String {
        self.id.to_string()
    }
    fn title(&self) -> &str {
        &self.name
    }
    fn alternates(&self) -> Vec<&str> {
        self.original_name.as_deref().into_iter().collect()
    }
}

impl Indexable for Studio {
    fn doc_id(&self) -> String {
        self.id.to_string()
    }
    fn title(&self) -> &str {
        &self.name
    }
    fn alternates(&self) -> Vec<&str> {
        self.aliases.iter().map(String::as_str).collect()
    }
}

impl Indexable for Tag {
    fn doc_id(&self) -> String {
        self.id.to_string()
    }
    fn title(&self) -> &str {
        &self.name
    }
    fn alternates(&self) -> Vec<&str> {
        self.aliases.iter().map(String::as_str).collect()
    }
}

impl Indexable for Selection {
    fn doc_id(&self) -> String {
        self.id.to_string()
    }
    fn title(&self) -> &str {
        &self.name
    }
    fn alternates(&self) -> Vec<&str> {
        Vec::new()
    }
}

/// Schema field handles for a [`TypeIndex`].
struct IndexFields {
    id: Field,
    name: Field,
    aliases: Field,
    payload: Field,
}

/// In-RAM tantivy index over one record type. The full record is stored as
/// a JSON payload so hits deserialize without a database round trip.
pub struct TypeIndex<T> {
    index: Index,
    reader: IndexReader,
    writer: Mutex<IndexWriter>,
    fields: IndexFields,
    _record: PhantomData<fn() -> T>,
}

impl<T: Indexable> TypeIndex<T> {
    pub fn new() -> Result<Self, SearchError> {
        let mut schema_builder = Schema::builder();
        let id = schema_builder.add_text_field("id", STRING | STORED);
        let name = schema_builder.add_text_field("name", TEXT);
        let aliases = schema_builder.add_text_field("aliases", TEXT);
        let payload = schema_builder.add_text_field("payload", STORED);
        let schema = schema_builder.build();

        let index = Index::create_in_ram(schema);
        let reader: IndexReader = index
            .reader_builder()
            .reload_policy(ReloadPolicy::Manual)
            .try_into()?;
        let writer = index.writer_with_num_threads(1, WRITER_MEMORY_BYTES)?;

        Ok(Self {
            index,
            reader,
            writer: Mutex::new(writer),
            fields: IndexFields {
                id,
                name,
                aliases,
                payload,
            },
            _record: PhantomData,
        })
    }

    fn document(&self, record: &T) -> Result<TantivyDocument, SearchError> {
        let payload =
            serde_json::to_string(record).map_err(|e| SearchError::Index(e.to_string()))?;

        let mut doc = TantivyDocument::default();
        doc.add_text(self.fields.id, record.doc_id());
        doc.add_text(self.fields.name, record.title());
        for alias in record.alternates() {
            doc.add_text(self.fields.aliases, alias);
        }
        doc.add_text(self.fields.payload, payload);
        Ok(doc)
    }

    /// Insert or replace the record with the same id.
    pub fn upsert(&self, record: &T) -> Result<(), SearchError> {
        self.upsert_many(std::slice::from_ref(record))
    }

    pub fn upsert_many(&self, records: &[T]) -> Result<(), SearchError> {
        let mut writer = self.writer.lock();
        for record in records {
            writer.delete_term(Term::from_field_text(self.fields.id, &record.doc_id()));
            writer.add_document(self.document(record)?)?;
        }
        writer.commit()?;
        drop(writer);
        self.reader.reload()?;
        Ok(())
    }

    pub fn remove(&self, id: &str) -> Result<(), SearchError> {
        let mut writer = self.writer.lock();
        writer.delete_term(Term::from_field_text(self.fields.id, id));
        writer.commit()?;
        drop(writer);
        self.reader.reload()?;
        Ok(())
    }

    /// Number of live documents.
    pub fn len(&self) -> u64 {
        self.reader.searcher().num_docs()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T: Indexable> SearchBackend for TypeIndex<T> {
    type Record = T;

    fn search(&self, text: &str, limit: usize) -> Result<Vec<T>, SearchError> {
        if limit == 0 || text.trim().is_empty() {
            return Ok(Vec::new());
        }

        let searcher = self.reader.searcher();
        let parser = QueryParser::for_index(&self.index, vec![self.fields.name, self.fields.aliases]);
        // User text is free-form; unparseable fragments are dropped, not fatal.
        let (query, _errors) = parser.parse_query_lenient(text);

        let top_docs = searcher.search(query.as_ref(), &TopDocs::with_limit(limit))?;

        let mut records = Vec::with_capacity(top_docs.len());
        for (_score, address) in top_docs {
            let doc: TantivyDocument = searcher.doc(address)?;
            let Some(payload) = doc.get_first(self.fields.payload).and_then(|v| v.as_str()) else {
                continue;
            };
            match serde_json::from_str(payload) {
                Ok(record) => records.push(record),
                Err(e) => tracing::warn!("Skipping undecodable search payload: {}", e),
            }
        }
        Ok(records)
    }
}

/// One index per searchable content type.
#[derive(Clone)]
pub struct CatalogIndex {
    pub movies: Arc<TypeIndex<Movie>>,
    pub people: Arc<TypeIndex<Person>>,
    pub studios: Arc<TypeIndex<Studio>>,
    pub tags: Arc<TypeIndex<Tag>>,
    pub selections: Arc<TypeIndex<Selection>>,
}

impl CatalogIndex {
    pub fn new() -> Result<Self, SearchError> {
        Ok(Self {
            movies: Arc::new(TypeIndex::new()?),
            people: Arc::new(TypeIndex::new()?),
            studios: Arc::new(TypeIndex::new()?),
            tags: Arc::new(TypeIndex::new()?),
            selections: Arc::new(TypeIndex::new()?),
        })
    }

    /// Register every index with its projector.
    pub fn dispatcher(&self, result_limit: usize, timeout: Duration) -> SearchDispatcher {
        SearchDispatcher::new(result_limit, timeout)
            .with_backend(ContentType::Movie, self.movies.clone(), project_movie)
            .with_backend(ContentType::Person, self.people.clone(), project_person)
            .with_backend(ContentType::Studio, self.studios.clone(), project_studio)
            .with_backend(ContentType::Tag, self.tags.clone(), project_tag)
            .with_backend(ContentType::Selection, self.selections.clone(), project_selection)
    }
}

/// Load every catalog record from `repo` into `index`.
pub async fn build_index(
    repo: &dyn CatalogRepository,
    index: &CatalogIndex,
) -> Result<(), AppError> {
    let to_app = |e: SearchError| AppError::internal(e.to_string());

    let movies = repo.all_movies().await?;
    index.movies.upsert_many(&movies).map_err(to_app)?;
    let people = repo.all_people().await?;
    index.people.upsert_many(&people).map_err(to_app)?;
    let studios = repo.all_studios().await?;
    index.studios.upsert_many(&studios).map_err(to_app)?;
    let tags = repo.all_tags().await?;
    index.tags.upsert_many(&tags).map_err(to_app)?;
    let selections = repo.all_selections().await?;
    index.selections.upsert_many(&selections).map_err(to_app)?;

    tracing::info!(
        movies = movies.len(),
        people = people.len(),
        studios = studios.len(),
        tags = tags.len(),
        selections = selections.len(),
        "Search index built"
    );
    Ok(())
}

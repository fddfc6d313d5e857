use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::catalog::{MovieKind, PersonType};
use crate::content::ContentType;

/// A display-safe projection of one search hit.
///
/// Every type shares `id`, `name`, `slug`, `image`; `details` flattens the
/// per-type extras next to them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct SearchResultItem {
    pub id: String,
    pub name: String,
    pub slug: String,
    pub image: Option<String>,
    #[serde(flatten)]
    pub details: ItemDetails,
}

/// Type-specific fields of a search hit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(untagged)]
pub enum ItemDetails {
    Movie {
        kind: MovieKind,
        year: Option<i32>,
    },
    Person {
        #[serde(rename = "type")]
        person_type: PersonType,
    },
    Basic {},
}

/// Search results keyed by content type.
///
/// A requested type always has a key, even with no hits. Types that were not
/// requested have no key. A type listed in `failed` had its backend error or
/// time out; its entry is empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchResultBundle {
    #[serde(flatten)]
    pub results: BTreeMap<ContentType, Vec<SearchResultItem>>,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub failed: BTreeSet<ContentType>,
}

impl SearchResultBundle {
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn get(&self, content_type: ContentType) -> Option<&[SearchResultItem]> {
        self.results.get(&content_type).map(Vec::as_slice)
    }

    /// Keys in bundle order.
    pub fn content_types(&self) -> Vec<ContentType> {
        self.results.keys().copied().collect()
    }
}

/// The bundle's keys are dynamic, so its schema is written out by hand:
/// one optional array per content type plus `failed`.
#[cfg(feature = "openapi")]
impl utoipa::PartialSchema for SearchResultBundle {
    fn schema() -> utoipa::openapi::RefOr<utoipa::openapi::schema::Schema> {
        use utoipa::openapi::schema::{ArrayBuilder, ObjectBuilder, Schema, Type};
        use utoipa::openapi::{Ref, RefOr};

        let hits = || {
            RefOr::T(Schema::Array(
                ArrayBuilder::new()
                    .items(Ref::from_schema_name("SearchResultItem"))
                    .build(),
            ))
        };

        let mut object = ObjectBuilder::new().schema_type(Type::Object);
        for content_type in ContentType::ALL {
            object = object.property(content_type.as_str(), hits());
        }

        let failed = ArrayBuilder::new()
            .items(RefOr::T(Schema::Object(
                ObjectBuilder::new().schema_type(Type::String).build(),
            )))
            .build();
        let object = object.property("failed", RefOr::T(Schema::Array(failed)));

        RefOr::T(Schema::Object(object.build()))
    }
}

#[cfg(feature = "openapi")]
impl utoipa::ToSchema for SearchResultBundle {}

/// Query parameters for `GET /api/search`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::IntoParams))]
#[cfg_attr(feature = "openapi", into_params(parameter_in = Query))]
pub struct SearchParams {
    #[serde(default)]
    pub q: String,
    /// Comma-separated content types; all types when omitted.
    #[serde(default)]
    pub types: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn movie_item() -> SearchResultItem {
        SearchResultItem {
            id: "m1".to_string(),
            name: "Inception".to_string(),
            slug: "inception".to_string(),
            image: Some("https://cdn.example/inception.jpg".to_string()),
            details: ItemDetails::Movie {
                kind: MovieKind::Movie,
                year: Some(2010),
            },
        }
    }

    #[test]
    fn movie_item_flattens_kind_and_year() {
        let json = serde_json::to_value(movie_item()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "id": "m1",
                "name": "Inception",
                "slug": "inception",
                "image": "https://cdn.example/inception.jpg",
                "kind": "movie",
                "year": 2010
            })
        );
    }

    #[test]
    fn basic_item_has_only_common_fields() {
        let item = SearchResultItem {
            id: "t1".to_string(),
            name: "Noir".to_string(),
            slug: "noir".to_string(),
            image: None,
            details: ItemDetails::Basic {},
        };
        let json = serde_json::to_value(item).unwrap();
        let keys: Vec<&String> = json.as_object().unwrap().keys().collect();
        assert_eq!(keys.len(), 4);
    }

    #[test]
    fn bundle_serializes_keys_in_dispatch_order() {
        let mut bundle = SearchResultBundle::default();
        bundle.results.insert(ContentType::Tag, Vec::new());
        bundle.results.insert(ContentType::Movie, vec![movie_item()]);

        let json = serde_json::to_string(&bundle).unwrap();
        let movies_at = json.find("\"movies\"").unwrap();
        let tags_at = json.find("\"tags\"").unwrap();
        assert!(movies_at < tags_at);
        assert!(!json.contains("failed"));
    }

    #[test]
    fn bundle_reads_back_failed_types() {
        let json = r#"{"movies":[],"people":[],"failed":["people"]}"#;
        let bundle: SearchResultBundle = serde_json::from_str(json).unwrap();
        assert_eq!(
            bundle.content_types(),
            vec![ContentType::Movie, ContentType::Person]
        );
        assert!(bundle.failed.contains(&ContentType::Person));
    }
}

use catalog_types::Studio;
use chrono::Utc;
use uuid::Uuid;

use super::{filled_string, parse_aliases};
use crate::input::RequestInput;
use crate::slug::{make_meta_title, unique_slug, SlugRegistry, SlugScope};

/// Normalized input for creating a studio.
#[derive(Debug, Clone, PartialEq)]
pub struct StudioStoreDto {
    pub name: String,
    pub description: String,
    pub image: Option<String>,
    pub aliases: Vec<String>,
    pub slug: String,
    pub meta_title: Option<String>,
    pub meta_description: Option<String>,
    pub meta_image: Option<String>,
}

impl StudioStoreDto {
    pub fn from_input(input: &impl RequestInput, slugs: &impl SlugRegistry) -> Self {
        let name = input.input_or("name", "");
        let slug = filled_string(input, "slug")
            .unwrap_or_else(|| unique_slug(&name, SlugScope::Studio, slugs));

        // An explicit null or empty title opts out of the derived default.
        let meta_title = if input.has("meta_title") {
            filled_string(input, "meta_title")
        } else {
            Some(make_meta_title(&name))
        };

        Self {
            description: input.input_or("description", ""),
            image: filled_string(input, "image"),
            aliases: parse_aliases(input.input("aliases")),
            slug,
            meta_title,
            meta_description: filled_string(input, "meta_description"),
            meta_image: filled_string(input, "meta_image"),
            name,
        }
    }

    pub fn into_studio(self) -> Studio {
        let now = Utc::now();
        Studio {
            id: Uuid::new_v4(),
            name: self.name,
            slug: self.slug,
            description: self.description,
            image: self.image,
            aliases: self.aliases,
            meta_title: self.meta_title,
            meta_description: self.meta_description,
            meta_image: self.meta_image,
            created_at: now,
            updated_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::JsonInput;
    use serde_json::json;
    use std::collections::HashSet;

    #[test]
    fn derives_meta_title_when_absent() {
        let input = JsonInput::from_value(json!({ "name": "Warner Bros." }));
        let dto = StudioStoreDto::from_input(&input, &HashSet::new());
        assert_eq!(dto.slug, "warner-bros");
        assert_eq!(dto.meta_title.as_deref(), Some("Warner Bros. | Catalog"));
    }

    #[test]
    fn explicit_meta_title_wins() {
        let input = JsonInput::from_value(json!({ "name": "A24", "meta_title": "A24 films" }));
        let dto = StudioStoreDto::from_input(&input, &HashSet::new());
        assert_eq!(dto.meta_title.as_deref(), Some("A24 films"));

        let input = JsonInput::from_value(json!({ "name": "A24", "meta_title": null }));
        let dto = StudioStoreDto::from_input(&input, &HashSet::new());
        assert_eq!(dto.meta_title, None);
    }

    #[test]
    fn into_studio_carries_fields() {
        let input = JsonInput::from_value(json!({
            "name": "Ghibli",
            "description": "Animation",
            "aliases": ["Studio Ghibli"]
        }));
        let studio = StudioStoreDto::from_input(&input, &HashSet::new()).into_studio();
        assert_eq!(studio.name, "Ghibli");
        assert_eq!(studio.slug, "ghibli");
        assert_eq!(studio.aliases, vec!["Studio Ghibli"]);
        assert_eq!(studio.created_at, studio.updated_at);
    }
}

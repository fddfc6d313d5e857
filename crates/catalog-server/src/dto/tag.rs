use catalog_types::{Tag, Tristate};
use chrono::Utc;
use serde_json::Value;
use uuid::Uuid;

use super::{filled_string, parse_aliases, tristate_nullable_string, tristate_string};
use crate::input::RequestInput;
use crate::slug::{unique_slug, SlugRegistry, SlugScope};

/// Normalized input for creating a tag.
#[derive(Debug, Clone, PartialEq)]
pub struct TagStoreDto {
    pub name: String,
    pub description: String,
    pub is_genre: bool,
    pub image: Option<String>,
    pub aliases: Vec<String>,
    pub slug: String,
    pub meta_title: Option<String>,
    pub meta_description: Option<String>,
    pub meta_image: Option<String>,
}

impl TagStoreDto {
    pub fn from_input(input: &impl RequestInput, slugs: &impl SlugRegistry) -> Self {
        let name = input.input_or("name", "");
        let slug = filled_string(input, "slug")
            .unwrap_or_else(|| unique_slug(&name, SlugScope::Tag, slugs));

        Self {
            description: input.input_or("description", ""),
            is_genre: input.boolean("is_genre", false),
            image: filled_string(input, "image"),
            aliases: parse_aliases(input.input("aliases")),
            slug,
            meta_title: filled_string(input, "meta_title"),
            meta_description: filled_string(input, "meta_description"),
            meta_image: filled_string(input, "meta_image"),
            name,
        }
    }

    pub fn into_tag(self) -> Tag {
        let now = Utc::now();
        Tag {
            id: Uuid::new_v4(),
            name: self.name,
            slug: self.slug,
            description: self.description,
            is_genre: self.is_genre,
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

/// Normalized partial update for a tag. Fields the caller did not send are
/// [`Tristate::Unset`] and leave the stored value untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TagUpdateDto {
    pub name: Tristate<String>,
    pub description: Tristate<String>,
    pub is_genre: Tristate<bool>,
    pub image: Tristate<String>,
    pub aliases: Tristate<Vec<String>>,
    pub slug: Tristate<String>,
    pub meta_title: Tristate<String>,
    pub meta_description: Tristate<String>,
    pub meta_image: Tristate<String>,
}

impl TagUpdateDto {
    /// `slugs` must not contain the slug of the tag being updated.
    pub fn from_input(input: &impl RequestInput, slugs: &impl SlugRegistry) -> Self {
        let name = tristate_string(input, "name");

        let slug = match filled_string(input, "slug") {
            Some(explicit) => Tristate::Value(explicit),
            None => match &name {
                Tristate::Value(n) => Tristate::Value(unique_slug(n, SlugScope::Tag, slugs)),
                _ => Tristate::Unset,
            },
        };

        let is_genre = match input.input("is_genre") {
            None => Tristate::Unset,
            Some(Value::Null) => Tristate::Null,
            Some(_) => Tristate::Value(input.boolean("is_genre", false)),
        };

        let aliases = if input.has("aliases") {
            Tristate::Value(parse_aliases(input.input("aliases")))
        } else {
            Tristate::Unset
        };

        Self {
            name,
            description: tristate_string(input, "description"),
            is_genre,
            image: tristate_nullable_string(input, "image"),
            aliases,
            slug,
            meta_title: tristate_string(input, "meta_title"),
            meta_description: tristate_string(input, "meta_description"),
            meta_image: tristate_nullable_string(input, "meta_image"),
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Merge the mentioned fields into `tag`.
    pub fn apply_to(self, tag: &mut Tag) {
        if let Tristate::Value(name) = self.name {
            tag.name = name;
        }
        if let Tristate::Value(slug) = self.slug {
            tag.slug = slug;
        }
        tag.description = self
            .description
            .merge_required(std::mem::take(&mut tag.description), String::new());
        tag.is_genre = self.is_genre.merge_required(tag.is_genre, false);
        tag.aliases = self
            .aliases
            .merge_required(std::mem::take(&mut tag.aliases), Vec::new());
        tag.image = self.image.merge_optional(tag.image.take());
        tag.meta_title = self.meta_title.merge_optional(tag.meta_title.take());
        tag.meta_description = self
            .meta_description
            .merge_optional(tag.meta_description.take());
        tag.meta_image = self.meta_image.merge_optional(tag.meta_image.take());
        tag.updated_at = Utc::now();
    }
}

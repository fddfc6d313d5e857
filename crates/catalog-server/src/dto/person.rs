use catalog_types::{Gender, Person, PersonType, Tristate};
use chrono::{NaiveDate, Utc};
use std::str::FromStr;

use super::{filled_string, tristate_nullable_string, tristate_string};
use crate::input::RequestInput;
use crate::slug::{unique_slug, SlugRegistry, SlugScope};

/// Normalized partial update for a person.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PersonUpdateDto {
    pub name: Tristate<String>,
    pub person_type: Tristate<PersonType>,
    pub original_name: Tristate<String>,
    pub gender: Tristate<Gender>,
    pub image: Tristate<String>,
    pub description: Tristate<String>,
    pub birthday: Tristate<NaiveDate>,
    pub birthplace: Tristate<String>,
    pub slug: Tristate<String>,
    pub meta_title: Tristate<String>,
    pub meta_description: Tristate<String>,
    pub meta_image: Tristate<String>,
}

/// Parse a present value; text that does not parse counts as not sent.
fn parsed<T: FromStr>(input: &impl RequestInput, name: &str) -> Tristate<T> {
    match tristate_nullable_string(input, name) {
        Tristate::Value(raw) => raw.parse().map_or(Tristate::Unset, Tristate::Value),
        Tristate::Null => Tristate::Null,
        Tristate::Unset => Tristate::Unset,
    }
}

impl PersonUpdateDto {
    /// `slugs` must not contain the slug of the person being updated.
    pub fn from_input(input: &impl RequestInput, slugs: &impl SlugRegistry) -> Self {
        let name = tristate_string(input, "name");

        let slug = match filled_string(input, "slug") {
            Some(explicit) => Tristate::Value(explicit),
            None => match &name {
                Tristate::Value(n) => Tristate::Value(unique_slug(n, SlugScope::Person, slugs)),
                _ => Tristate::Unset,
            },
        };

        Self {
            name,
            person_type: parsed(input, "type"),
            original_name: tristate_nullable_string(input, "original_name"),
            gender: parsed(input, "gender"),
            image: tristate_nullable_string(input, "image"),
            description: tristate_string(input, "description"),
            birthday: parsed(input, "birthday"),
            birthplace: tristate_nullable_string(input, "birthplace"),
            slug,
            meta_title: tristate_nullable_string(input, "meta_title"),
            meta_description: tristate_nullable_string(input, "meta_description"),
            meta_image: tristate_nullable_string(input, "meta_image"),
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn apply_to(self, person: &mut Person) {
        if let Tristate::Value(name) = self.name {
            person.name = name;
        }
        if let Tristate::Value(slug) = self.slug {
            person.slug = slug;
        }
        if let Tristate::Value(person_type) = self.person_type {
            person.person_type = person_type;
        }
        person.original_name = self.original_name.merge_optional(person.original_name.take());
        person.gender = self.gender.merge_optional(person.gender.take());
        person.image = self.image.merge_optional(person.image.take());
        person.description = self.description.merge_optional(person.description.take());
        person.birthday = self.birthday.merge_optional(person.birthday.take());
        person.birthplace = self.birthplace.merge_optional(person.birthplace.take());
        person.meta_title = self.meta_title.merge_optional(person.meta_title.take());
        person.meta_description = self
            .meta_description
            .merge_optional(person.meta_description.take());
        person.meta_image = self.meta_image.merge_optional(person.meta_image.take());
        person.updated_at = Utc::now();
    }
}

//! Request normalizers.
//!
//! Each DTO is built once from a [`RequestInput`] and never mutated. Store
//! DTOs apply defaults; update DTOs keep absent fields as [`Tristate::Unset`].
//! Nothing here validates: malformed values coerce to a default instead.

pub mod person;
pub mod popular;
pub mod search;
pub mod studio;
pub mod tag;

pub use person::PersonUpdateDto;
pub use popular::PopularSeriesDto;
pub use search::SearchQuery;
pub use studio::StudioStoreDto;
pub use tag::{TagStoreDto, TagUpdateDto};

use catalog_types::Tristate;
use serde_json::Value;

use crate::input::{value_as_string, RequestInput};

/// Alias lists arrive either as a JSON array or as a JSON-encoded string.
/// Anything unreadable becomes an empty list.
pub(crate) fn parse_aliases(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => collect_strings(items),
        Some(Value::String(raw)) => match serde_json::from_str::<Value>(raw) {
            Ok(Value::Array(items)) => collect_strings(&items),
            _ => Vec::new(),
        },
        _ => Vec::new(),
    }
}

fn collect_strings(items: &[Value]) -> Vec<String> {
    items
        .iter()
        .filter_map(value_as_string)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Text field on an update request.
pub(crate) fn tristate_string(input: &impl RequestInput, name: &str) -> Tristate<String> {
    match input.input(name) {
        None => Tristate::Unset,
        Some(Value::Null) => Tristate::Null,
        Some(value) => value_as_string(value).map_or(Tristate::Unset, Tristate::Value),
    }
}

/// Text field whose empty string means "clear".
pub(crate) fn tristate_nullable_string(input: &impl RequestInput, name: &str) -> Tristate<String> {
    match tristate_string(input, name) {
        Tristate::Value(s) if s.trim().is_empty() => Tristate::Null,
        other => other,
    }
}

/// Non-empty text value, or `None`.
pub(crate) fn filled_string(input: &impl RequestInput, name: &str) -> Option<String> {
    input.string(name).filter(|s| !s.trim().is_empty())
}

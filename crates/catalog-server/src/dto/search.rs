use catalog_types::ContentType;
use serde_json::Value;
use std::collections::BTreeSet;

use crate::input::RequestInput;

/// A normalized multi-type search request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    pub text: String,
    pub types: BTreeSet<ContentType>,
}

impl SearchQuery {
    pub fn new(text: impl Into<String>, types: impl IntoIterator<Item = ContentType>) -> Self {
        Self {
            text: text.into().trim().to_string(),
            types: types.into_iter().collect(),
        }
    }

    /// Read `q` and `types`. Omitted `types` means every type; unknown
    /// type names are dropped.
    pub fn from_input(input: &impl RequestInput) -> Self {
        let text = input.input_or("q", "");
        let types = match input.input("types") {
            None | Some(Value::Null) => ContentType::ALL.into_iter().collect(),
            Some(Value::Array(items)) => items
                .iter()
                .filter_map(Value::as_str)
                .filter_map(|s| s.parse().ok())
                .collect(),
            Some(Value::String(csv)) => csv.split(',').filter_map(|s| s.parse().ok()).collect(),
            Some(_) => BTreeSet::new(),
        };
        Self::new(text, types)
    }

    /// Blank text never reaches a backend.
    pub fn is_blank(&self) -> bool {
        self.text.is_empty()
    }
}

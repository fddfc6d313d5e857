use serde::{Deserialize, Serialize};

/// A field on a partial-update request.
///
/// `Unset` means the caller never mentioned the field and the stored value
/// must be left alone. `Null` means the caller explicitly sent `null`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "value", rename_all = "snake_case")]
pub enum Tristate<T> {
    #[default]
    Unset,
    Null,
    Value(T),
}

impl<T> Tristate<T> {
    pub fn is_unset(&self) -> bool {
        matches!(self, Tristate::Unset)
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Tristate::Null)
    }

    pub fn value(&self) -> Option<&T> {
        match self {
            Tristate::Value(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_ref(&self) -> Tristate<&T> {
        match self {
            Tristate::Unset => Tristate::Unset,
            Tristate::Null => Tristate::Null,
            Tristate::Value(v) => Tristate::Value(v),
        }
    }

    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> Tristate<U> {
        match self {
            Tristate::Unset => Tristate::Unset,
            Tristate::Null => Tristate::Null,
            Tristate::Value(v) => Tristate::Value(f(v)),
        }
    }

    /// Merge into a nullable stored field. `Unset` keeps `current`.
    pub fn merge_optional(self, current: Option<T>) -> Option<T> {
        match self {
            Tristate::Unset => current,
            Tristate::Null => None,
            Tristate::Value(v) => Some(v),
        }
    }

    /// Merge into a non-nullable stored field; `Null` resets it to `reset`.
    pub fn merge_required(self, current: T, reset: T) -> T {
        match self {
            Tristate::Unset => current,
            Tristate::Null => reset,
            Tristate::Value(v) => v,
        }
    }
}

impl<T> From<Option<T>> for Tristate<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => Tristate::Value(v),
            None => Tristate::Null,
        }
    }
}

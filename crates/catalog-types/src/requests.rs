use serde::{Deserialize, Serialize};

#[cfg(feature = "validation")]
use validator::Validate;

/// Validated view of a create request for a named catalog entry (tag,
/// studio). Other fields are coerced by the server's normalizers.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[cfg_attr(feature = "validation", derive(Validate))]
pub struct CreateCatalogEntryRequest {
    #[serde(default)]
    #[cfg_attr(
        feature = "validation",
        validate(
            required(message = "The name field is required"),
            length(min = 1, max = 255, message = "Name must be between 1 and 255 characters")
        )
    )]
    pub name: Option<String>,
    /// URL slug; derived from the name when omitted.
    #[serde(default)]
    #[cfg_attr(
        feature = "validation",
        validate(length(max = 255, message = "Slug must be at most 255 characters"))
    )]
    pub slug: Option<String>,
    #[serde(default)]
    #[cfg_attr(
        feature = "validation",
        validate(length(max = 1000, message = "Meta description must be at most 1000 characters"))
    )]
    pub meta_description: Option<String>,
}

/// Validated view of a partial update. Every field is optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[cfg_attr(feature = "validation", derive(Validate))]
pub struct UpdateCatalogEntryRequest {
    #[serde(default)]
    #[cfg_attr(
        feature = "validation",
        validate(length(min = 1, max = 255, message = "Name must be between 1 and 255 characters"))
    )]
    pub name: Option<String>,
    #[serde(default)]
    #[cfg_attr(
        feature = "validation",
        validate(length(max = 255, message = "Slug must be at most 255 characters"))
    )]
    pub slug: Option<String>,
    #[serde(default)]
    #[cfg_attr(
        feature = "validation",
        validate(length(max = 1000, message = "Meta description must be at most 1000 characters"))
    )]
    pub meta_description: Option<String>,
}

/// Lowercase ASCII letters, digits and single inner hyphens.
pub fn is_url_safe_slug(slug: &str) -> bool {
    !slug.is_empty()
        && !slug.starts_with('-')
        && !slug.ends_with('-')
        && !slug.contains("--")
        && slug
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
}

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// What kind of title a movie record is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum MovieKind {
    Movie,
    TvSeries,
    AnimatedMovie,
    AnimatedSeries,
}

impl MovieKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MovieKind::Movie => "movie",
            MovieKind::TvSeries => "tv_series",
            MovieKind::AnimatedMovie => "animated_movie",
            MovieKind::AnimatedSeries => "animated_series",
        }
    }

    pub fn is_series(&self) -> bool {
        matches!(self, MovieKind::TvSeries | MovieKind::AnimatedSeries)
    }
}

impl FromStr for MovieKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "movie" => Ok(MovieKind::Movie),
            "tv_series" => Ok(MovieKind::TvSeries),
            "animated_movie" => Ok(MovieKind::AnimatedMovie),
            "animated_series" => Ok(MovieKind::AnimatedSeries),
            other => Err(format!("unknown movie kind: {other}")),
        }
    }
}

/// Role a person plays in the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PersonType {
    Actor,
    Director,
    Producer,
    Writer,
    Composer,
    Cinematographer,
}

impl PersonType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PersonType::Actor => "ACTOR",
            PersonType::Director => "DIRECTOR",
            PersonType::Producer => "PRODUCER",
            PersonType::Writer => "WRITER",
            PersonType::Composer => "COMPOSER",
            PersonType::Cinematographer => "CINEMATOGRAPHER",
        }
    }
}

impl FromStr for PersonType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "ACTOR" => Ok(PersonType::Actor),
            "DIRECTOR" => Ok(PersonType::Director),
            "PRODUCER" => Ok(PersonType::Producer),
            "WRITER" => Ok(PersonType::Writer),
            "COMPOSER" => Ok(PersonType::Composer),
            "CINEMATOGRAPHER" => Ok(PersonType::Cinematographer),
            other => Err(format!("unknown person type: {other}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Gender {
    Male,
    Female,
    Other,
}

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "MALE",
            Gender::Female => "FEMALE",
            Gender::Other => "OTHER",
        }
    }
}

impl FromStr for Gender {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "MALE" => Ok(Gender::Male),
            "FEMALE" => Ok(Gender::Female),
            "OTHER" => Ok(Gender::Other),
            other => Err(format!("unknown gender: {other}")),
        }
    }
}

// ---------------------------------------------------------------------------
// Domain Structs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Movie {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    #[serde(default)]
    pub description: String,
    pub kind: MovieKind,
    pub release_year: Option<i32>,
    /// Stored poster reference or absolute URL.
    pub poster: Option<String>,
    pub imdb_score: Option<f32>,
    #[serde(default)]
    pub aliases: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Person {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    #[serde(rename = "type")]
    pub person_type: PersonType,
    pub original_name: Option<String>,
    pub gender: Option<Gender>,
    pub image: Option<String>,
    pub description: Option<String>,
    pub birthday: Option<NaiveDate>,
    pub birthplace: Option<String>,
    pub meta_title: Option<String>,
    pub meta_description: Option<String>,
    pub meta_image: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Studio {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub description: String,
    pub image: Option<String>,
    #[serde(default)]
    pub aliases: Vec<String>,
    pub meta_title: Option<String>,
    pub meta_description: Option<String>,
    pub meta_image: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Tag {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub description: String,
    pub is_genre: bool,
    pub image: Option<String>,
    #[serde(default)]
    pub aliases: Vec<String>,
    pub meta_title: Option<String>,
    pub meta_description: Option<String>,
    pub meta_image: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A curated collection of titles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Selection {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    #[serde(default)]
    pub description: String,
    pub meta_image: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Response DTOs
// ---------------------------------------------------------------------------

/// API response for a tag. `image` is a public URL.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct TagResponse {
    pub id: String,
    pub name: String,
    pub slug: String,
    pub description: String,
    pub is_genre: bool,
    pub image: Option<String>,
    pub aliases: Vec<String>,
    pub meta_title: Option<String>,
    pub meta_description: Option<String>,
    pub meta_image: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// API response for a studio. `image` is a public URL.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct StudioResponse {
    pub id: String,
    pub name: String,
    pub slug: String,
    pub description: String,
    pub image: Option<String>,
    pub aliases: Vec<String>,
    pub meta_title: Option<String>,
    pub meta_description: Option<String>,
    pub meta_image: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// API response for a person.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct PersonResponse {
    pub id: String,
    pub name: String,
    pub slug: String,
    pub biography: Option<String>,
    pub image: Option<String>,
    #[serde(rename = "type")]
    pub person_type: PersonType,
    pub gender: Option<Gender>,
    pub birth_date: Option<NaiveDate>,
    /// Not tracked by the catalog; always null.
    pub death_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub movies_count: Option<i64>,
    pub created_at: String,
    pub updated_at: String,
}

/// Compact series card for popularity listings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct SeriesResponse {
    pub id: String,
    pub name: String,
    pub slug: String,
    pub kind: MovieKind,
    pub year: Option<i32>,
    pub poster: Option<String>,
    pub imdb_score: Option<f32>,
}

/// Result of storing an uploaded asset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct AssetResponse {
    /// Storage reference to persist on the owning entity.
    pub path: String,
    pub url: Option<String>,
}

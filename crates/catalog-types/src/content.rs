use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The searchable catalog content types.
///
/// Declaration order is the fixed dispatch order, and `Ord` follows it, so a
/// `BTreeMap<ContentType, _>` iterates movies, people, studios, tags, selections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub enum ContentType {
    #[serde(rename = "movies")]
    Movie,
    #[serde(rename = "people")]
    Person,
    #[serde(rename = "studios")]
    Studio,
    #[serde(rename = "tags")]
    Tag,
    #[serde(rename = "selections")]
    Selection,
}

impl ContentType {
    pub const ALL: [ContentType; 5] = [
        ContentType::Movie,
        ContentType::Person,
        ContentType::Studio,
        ContentType::Tag,
        ContentType::Selection,
    ];

    /// Wire key used in query strings and result bundles.
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentType::Movie => "movies",
            ContentType::Person => "people",
            ContentType::Studio => "studios",
            ContentType::Tag => "tags",
            ContentType::Selection => "selections",
        }
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContentType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "movies" | "movie" => Ok(ContentType::Movie),
            "people" | "person" | "persons" => Ok(ContentType::Person),
            "studios" | "studio" => Ok(ContentType::Studio),
            "tags" | "tag" => Ok(ContentType::Tag),
            "selections" | "selection" => Ok(ContentType::Selection),
            other => Err(format!("unknown content type: {other}")),
        }
    }
}

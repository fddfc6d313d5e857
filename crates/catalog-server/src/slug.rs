//! URL slugs and SEO defaults.

use std::collections::HashSet;

/// Suffix appended to every derived meta title.
pub const META_TITLE_SUFFIX: &str = "Catalog";

/// The slug namespace an entity lives in. Uniqueness is per scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SlugScope {
    Tag,
    Studio,
    Person,
}

impl SlugScope {
    /// Table-like name, also the fallback slug for names with no usable characters.
    pub fn as_str(&self) -> &'static str {
        match self {
            SlugScope::Tag => "tag",
            SlugScope::Studio => "studio",
            SlugScope::Person => "person",
        }
    }
}

/// Lookup of slugs already in use within one scope.
pub trait SlugRegistry {
    fn is_taken(&self, slug: &str) -> bool;
}

impl SlugRegistry for HashSet<String> {
    fn is_taken(&self, slug: &str) -> bool {
        self.contains(slug)
    }
}

/// Lowercase, transliterate and hyphen-join `text`.
///
/// Whitespace, `-` and `_` separate words; any other character that does not
/// transliterate to ASCII letters or digits is dropped.
pub fn slugify(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut pending_sep = false;

    for ch in text.chars().flat_map(char::to_lowercase) {
        if ch.is_whitespace() || ch == '-' || ch == '_' {
            pending_sep = true;
            continue;
        }

        let mapped: &str = match ch {
            '@' => "at",
            c if c.is_ascii_alphanumeric() => {
                push_word(&mut out, &mut pending_sep, c.encode_utf8(&mut [0; 4]));
                continue;
            }
            c => transliterate(c).unwrap_or(""),
        };

        if !mapped.is_empty() {
            push_word(&mut out, &mut pending_sep, mapped);
        }
    }

    out
}

fn push_word(out: &mut String, pending_sep: &mut bool, piece: &str) {
    if *pending_sep && !out.is_empty() {
        out.push('-');
    }
    *pending_sep = false;
    out.push_str(piece);
}

/// ASCII rendering of a lowercase Cyrillic or accented Latin letter.
fn transliterate(ch: char) -> Option<&'static str> {
    let s = match ch {
        // Cyrillic (Ukrainian and Russian)
        'а' => "a",
        'б' => "b",
        'в' => "v",
        'г' => "g",
        'ґ' => "g",
        'д' => "d",
        'е' => "e",
        'є' => "ye",
        'ё' => "yo",
        'ж' => "zh",
        'з' => "z",
        'и' => "i",
        'і' => "i",
        'ї' => "yi",
        'й' => "y",
        'к' => "k",
        'л' => "l",
        'м' => "m",
        'н' => "n",
        'о' => "o",
        'п' => "p",
        'р' => "r",
        'с' => "s",
        'т' => "t",
        'у' => "u",
        'ф' => "f",
        'х' => "h",
        'ц' => "c",
        'ч' => "ch",
        'ш' => "sh",
        'щ' => "shch",
        'ъ' | 'ь' => "",
        'ы' => "y",
        'э' => "e",
        'ю' => "yu",
        'я' => "ya",
        // Latin with diacritics
        'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' | 'ā' | 'ă' | 'ą' => "a",
        'æ' => "ae",
        'ç' | 'ć' | 'č' => "c",
        'ď' | 'đ' => "d",
        'è' | 'é' | 'ê' | 'ë' | 'ē' | 'ė' | 'ę' | 'ě' => "e",
        'ğ' => "g",
        'ì' | 'í' | 'î' | 'ï' | 'ī' | 'ı' => "i",
        'ł' => "l",
        'ñ' | 'ń' | 'ň' => "n",
        'ò' | 'ó' | 'ô' | 'õ' | 'ö' | 'ø' | 'ō' | 'ő' => "o",
        'œ' => "oe",
        'ř' => "r",
        'ś' | 'š' | 'ş' => "s",
        'ß' => "ss",
        'ť' | 'ţ' => "t",
        'ù' | 'ú' | 'û' | 'ü' | 'ū' | 'ů' | 'ű' => "u",
        'ý' | 'ÿ' => "y",
        'ź' | 'ż' | 'ž' => "z",
        _ => return None,
    };
    Some(s)
}

/// Slug of `name`, or the scope name when nothing usable remains.
pub fn slug_base(name: &str, scope: SlugScope) -> String {
    let base = slugify(name);
    if base.is_empty() {
        scope.as_str().to_string()
    } else {
        base
    }
}

/// First free slug for `name`: the bare slug, then `-2`, `-3`, ...
pub fn unique_slug(name: &str, scope: SlugScope, registry: &impl SlugRegistry) -> String {
    let base = slug_base(name, scope);

    if !registry.is_taken(&base) {
        return base;
    }

    let mut n = 2u32;
    loop {
        let candidate = format!("{base}-{n}");
        if !registry.is_taken(&candidate) {
            return candidate;
        }
        n += 1;
    }
}

/// Default SEO title derived from an entity name.
pub fn make_meta_title(name: &str) -> String {
    format!("{} | {META_TITLE_SUFFIX}", name.trim())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn taken(slugs: &[&str]) -> HashSet<String> {
        slugs.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn transliterates_ukrainian_name() {
        assert_eq!(slugify("Крістофер Нолан"), "kristofer-nolan");
        assert_eq!(slugify("Їжак у тумані"), "yizhak-u-tumani");
        assert_eq!(slugify("Щука"), "shchuka");
    }

    #[test]
    fn folds_diacritics_and_strips_punctuation() {
        assert_eq!(slugify("Amélie"), "amelie");
        assert_eq!(slugify("O'Brien & Sons!"), "obrien-sons");
        assert_eq!(slugify("  Sci-Fi__Drama  "), "sci-fi-drama");
        assert_eq!(slugify("Straße"), "strasse");
    }

    #[test]
    fn slugify_is_deterministic_and_url_safe() {
        let a = slugify("Крістофер Нолан");
        let b = slugify("Крістофер Нолан");
        assert_eq!(a, b);
        assert!(a
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-'));
        assert!(!a.starts_with('-') && !a.ends_with('-'));
    }

    #[test]
    fn unique_slug_appends_counter() {
        let registry = taken(&["noir", "noir-2"]);
        assert_eq!(unique_slug("Noir", SlugScope::Tag, &registry), "noir-3");
        assert_eq!(unique_slug("Horror", SlugScope::Tag, &registry), "horror");
    }

    #[test]
    fn unique_slug_falls_back_to_scope_name() {
        let registry = taken(&["studio"]);
        assert_eq!(unique_slug("!!!", SlugScope::Person, &registry), "person");
        assert_eq!(unique_slug("", SlugScope::Studio, &registry), "studio-2");
    }

    #[test]
    fn meta_title_uses_name() {
        assert_eq!(make_meta_title(" A24 "), "A24 | Catalog");
    }
}

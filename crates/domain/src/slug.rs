//! Slug derivation — turn a human-readable name into a URL-safe identifier.

use crate::place::MAX_FIELD_LENGTH;

/// Derive a lowercase, hyphen-separated, ASCII-only slug from `name`.
///
/// Non-ASCII characters are transliterated, every run of non-alphanumeric
/// characters becomes a single `-`, and leading/trailing hyphens are removed.
/// The result is capped at [`MAX_FIELD_LENGTH`] characters. It may be empty
/// when `name` holds nothing that transliterates to a letter or digit.
#[must_use]
pub fn slugify(name: &str) -> String {
    let mut slug = ::slug::slugify(name);
    if slug.len() > MAX_FIELD_LENGTH {
        // slugs are pure ASCII, so byte and char lengths agree
        slug.truncate(MAX_FIELD_LENGTH);
        let trimmed = slug.trim_end_matches('-').len();
        slug.truncate(trimmed);
    }
    slug
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_lowercase_and_hyphenate_words() {
        assert_eq!(slugify("Central Park"), "central-park");
    }

    #[test]
    fn should_collapse_punctuation_runs_into_single_hyphen() {
        assert_eq!(slugify("  Hello,  World!! "), "hello-world");
        assert_eq!(slugify("Rock & Roll -- Hall"), "rock-roll-hall");
    }

    #[test]
    fn should_transliterate_accented_letters() {
        assert_eq!(slugify("Café Déjà Vu"), "cafe-deja-vu");
    }

    #[test]
    fn should_keep_digits() {
        assert_eq!(slugify("Pier 39"), "pier-39");
    }

    #[test]
    fn should_return_empty_when_name_has_no_alphanumerics() {
        assert_eq!(slugify("!!! ???"), "");
    }

    #[test]
    fn should_cap_length_without_trailing_hyphen() {
        // "a" * 254 + " b" → 254 letters, a hyphen at position 255, then "b"
        let name = format!("{} b", "a".repeat(MAX_FIELD_LENGTH - 1));
        let slug = slugify(&name);
        assert_eq!(slug.len(), MAX_FIELD_LENGTH - 1);
        assert!(!slug.ends_with('-'));
    }
}

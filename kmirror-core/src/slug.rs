//! Title → repository slug.
//!
//! The pipeline, in order:
//!
//! 1. Turkish letter table (ı İ ğ Ğ ü Ü ş Ş ö Ö ç Ç → ASCII base letter).
//! 2. NFKD decomposition, then drop everything outside ASCII.
//! 3. Lowercase.
//! 4. Delete anything that is not `[a-z0-9_]`, whitespace or `-`.
//! 5. Collapse runs of separators (whitespace, `-`, `_`) into one `-`.
//! 6. Trim `-` at both ends.
//! 7. Empty → [`FALLBACK_SLUG`].
//!
//! Steps 4–6 are fused into a single pass below.

use unicode_normalization::UnicodeNormalization;

use crate::types::{RepositorySlug, FALLBACK_SLUG};

/// Letters that NFKD does not reduce to the right ASCII base.
///
/// `ı` has no decomposition at all and `İ` decomposes to `I` + combining dot,
/// so both need an explicit entry; the rest are kept for a single source of
/// truth.
const TURKISH_LETTERS: &[(char, char)] = &[
    ('ı', 'i'),
    ('İ', 'I'),
    ('ğ', 'g'),
    ('Ğ', 'G'),
    ('ü', 'u'),
    ('Ü', 'U'),
    ('ş', 's'),
    ('Ş', 'S'),
    ('ö', 'o'),
    ('Ö', 'O'),
    ('ç', 'c'),
    ('Ç', 'C'),
];

fn transliterate(c: char) -> char {
    TURKISH_LETTERS
        .iter()
        .find(|(from, _)| *from == c)
        .map(|(_, to)| *to)
        .unwrap_or(c)
}

fn is_separator(c: char) -> bool {
    c.is_whitespace() || c == '-' || c == '_'
}

/// Convert a notebook title into a repository slug.
///
/// Total and deterministic. Titles that differ only in case or accents map
/// to the same slug; no disambiguating suffix is ever added.
pub fn slugify(title: &str) -> RepositorySlug {
    let ascii: String = title
        .chars()
        .map(transliterate)
        .nfkd()
        .filter(char::is_ascii)
        .map(|c| c.to_ascii_lowercase())
        .collect();

    let mut slug = String::with_capacity(ascii.len());
    let mut pending_hyphen = false;
    for c in ascii.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(c);
        } else if is_separator(c) {
            pending_hyphen = true;
        }
        // Punctuation and symbols are deleted without acting as separators.
    }

    if slug.is_empty() {
        slug.push_str(FALLBACK_SLUG);
    }
    RepositorySlug::new_unchecked(slug)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn is_well_formed(slug: &str) -> bool {
        !slug.is_empty()
            && !slug.starts_with('-')
            && !slug.ends_with('-')
            && !slug.contains("--")
            && slug
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
    }

    #[rstest]
    #[case("My Cool Analysis", "my-cool-analysis")]
    #[case("Veri Analizi çalışması", "veri-analizi-calismasi")]
    #[case("İstanbul'da Şehir Ağacı: Çözüm", "istanbulda-sehir-agaci-cozum")]
    #[case("ĞÜŞİÖÇ ğüşıöç", "gusioc-gusioc")]
    #[case("Crème Brûlée", "creme-brulee")]
    #[case("Titanic: EDA, Modeling & Tuning", "titanic-eda-modeling-tuning")]
    #[case("  --leading and trailing--  ", "leading-and-trailing")]
    #[case("tabs\tand\nnewlines", "tabs-and-newlines")]
    #[case("snake_case_title", "snake-case-title")]
    #[case("a - _ - b", "a-b")]
    #[case("don't", "dont")]
    #[case("v2.0 release", "v20-release")]
    #[case("ﬁle", "file")]
    fn slug_examples(#[case] title: &str, #[case] expected: &str) {
        assert_eq!(slugify(title).as_str(), expected);
    }

    #[rstest]
    #[case("")]
    #[case("!!!")]
    #[case("🚀🔥")]
    #[case("   ")]
    #[case("---")]
    #[case("日本語")]
    fn unusable_titles_fall_back(#[case] title: &str) {
        let slug = slugify(title);
        assert_eq!(slug.as_str(), "notebook");
        assert!(slug.is_fallback());
    }

    #[test]
    fn case_and_accent_variants_collide() {
        assert_eq!(slugify("Çalışma Notları"), slugify("calisma notlari"));
        assert_eq!(slugify("CAFÉ"), slugify("cafe"));
    }

    #[test]
    fn deterministic_and_well_formed() {
        let titles = [
            "My Cool Analysis",
            "🚀 Rocket: Launch!",
            "x",
            "__init__",
            "Ünïcödé — everywhere…",
            "123",
        ];
        for title in titles {
            let a = slugify(title);
            let b = slugify(title);
            assert_eq!(a, b, "slugify must be deterministic for {title:?}");
            assert!(is_well_formed(a.as_str()), "malformed slug {a} for {title:?}");
        }
    }
}

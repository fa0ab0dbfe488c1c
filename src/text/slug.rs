use deunicode::deunicode;
use regex::Regex;
use std::sync::OnceLock;

static NON_ALPHANUMERIC: OnceLock<Regex> = OnceLock::new();

/// Reduces text to a lowercase ASCII slug made of `[a-z0-9-]`
///
/// Non-ASCII characters are transliterated first, then every run of
/// characters outside `[a-z0-9]` becomes a single `-`, and leading or
/// trailing dashes are removed. Two texts that differ only in accents,
/// case, punctuation or spacing share a slug.
///
/// # Examples
///
/// ```
/// use sumi_sweep::text::slugify;
///
/// assert_eq!(slugify("Příliš žluťoučký kůň!"), "prilis-zlutoucky-kun");
/// assert_eq!(slugify("  Hello,   World  "), "hello-world");
/// ```
pub fn slugify(text: &str) -> String {
    let separator = NON_ALPHANUMERIC
        .get_or_init(|| Regex::new(r"[^a-z0-9]+").expect("slug separator is a valid regex"));

    let ascii = deunicode(text).to_ascii_lowercase();
    separator
        .replace_all(&ascii, "-")
        .trim_matches('-')
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify_transliterates() {
        assert_eq!(slugify("Čeština je krásná"), "cestina-je-krasna");
    }

    #[test]
    fn test_slugify_collapses_separators() {
        assert_eq!(slugify("a -- b __ c"), "a-b-c");
    }

    #[test]
    fn test_slugify_trims_dashes() {
        assert_eq!(slugify("--edge--"), "edge");
        assert_eq!(slugify("!!!"), "");
    }

    #[test]
    fn test_slugify_equates_variants() {
        assert_eq!(slugify("Hello, World."), slugify("hello world"));
    }
}

use crate::text::slug::slugify;
use regex::Regex;
use std::collections::HashSet;
use std::sync::OnceLock;

/// Minimum number of consecutive word-like tokens that make a prose run
const MIN_WORDS_PER_RUN: usize = 5;

struct Patterns {
    whitespace: Regex,
    tag_delimiters: Regex,
    word_run: Regex,
    separator: Regex,
    number: Regex,
    non_number: Regex,
}

static PATTERNS: OnceLock<Patterns> = OnceLock::new();

fn patterns() -> &'static Patterns {
    PATTERNS.get_or_init(|| {
        let compile = |pattern: &str| Regex::new(pattern).expect("text pattern is a valid regex");
        Patterns {
            whitespace: compile(r"[\t\n\x0B\x0C\r ]+"),
            tag_delimiters: compile(r#"["<>]"#),
            // \w is Unicode-aware, so accented Latin letters count as word characters
            word_run: compile(&format!(r"(?:[\w.,:•?()\-]+\s+){{{},}}", MIN_WORDS_PER_RUN)),
            separator: compile(r"^--\s*.+(?:\s*--)?$"),
            number: compile(r"[0-9]+"),
            non_number: compile(r"[^0-9\s]+"),
        }
    })
}

/// Text runs found in one document
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractedTexts {
    /// Every accepted run, in document order
    pub regular: Vec<String>,

    /// Runs whose slug had not been seen before by this extractor
    pub unique: Vec<String>,
}

/// Extracts paragraph-like prose from HTML and tracks which runs were seen
///
/// The extractor keeps a set of text slugs for its whole lifetime, so a run
/// repeated on several pages (navigation, footers, cookie banners) is
/// reported as unique only on the first page it appears on. Create a new
/// extractor, or call [`TextExtractor::reset`], to start from a clean slate.
#[derive(Debug, Default)]
pub struct TextExtractor {
    seen: HashSet<String>,
}

impl TextExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Extracts prose runs from an HTML document
    ///
    /// # Algorithm
    ///
    /// 1. Collapse whitespace runs to a single space and pad `"`, `<`, `>`
    ///    with spaces so markup never merges into a word run
    /// 2. Find runs of at least five word-like tokens, each followed by
    ///    whitespace
    /// 3. Drop runs shaped like a `-- ... --` separator and runs with more
    ///    numeric tokens than non-numeric ones
    /// 4. Report every survivor as regular, and as unique the first time its
    ///    slug is seen
    ///
    /// # Arguments
    ///
    /// * `html` - The decoded, normalized document body
    ///
    /// # Returns
    ///
    /// The regular and unique runs of this document
    pub fn extract(&mut self, html: &str) -> ExtractedTexts {
        let patterns = patterns();

        let collapsed = patterns.whitespace.replace_all(html, " ");
        let padded = patterns.tag_delimiters.replace_all(&collapsed, " $0 ");

        let mut texts = ExtractedTexts::default();

        for run in patterns.word_run.find_iter(&padded) {
            let text = run.as_str().trim();
            if !is_prose(text) {
                continue;
            }

            texts.regular.push(text.to_string());
            if self.seen.insert(slugify(text)) {
                texts.unique.push(text.to_string());
            }
        }

        texts
    }

    /// Number of distinct slugs recorded so far
    pub fn seen_count(&self) -> usize {
        self.seen.len()
    }

    /// Forgets every recorded slug
    pub fn reset(&mut self) {
        self.seen.clear();
    }
}

fn is_prose(text: &str) -> bool {
    let patterns = patterns();

    if patterns.separator.is_match(text) {
        return false;
    }

    let numbers = patterns.number.find_iter(text).count();
    let words = patterns.non_number.find_iter(text).count();
    numbers <= words
}

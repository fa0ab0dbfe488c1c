//! Response body and header normalization
//!
//! Text bodies are normalized before anything is extracted from them;
//! binary bodies are replaced by a placeholder so reports stay textual.

use crate::crawler::fetcher::FetchResponse;
use indexmap::IndexMap;
use regex::Regex;
use std::sync::OnceLock;
use unicode_normalization::UnicodeNormalization;

static CONTROL_CHARACTERS: OnceLock<Regex> = OnceLock::new();
static TRAILING_BLANKS: OnceLock<Regex> = OnceLock::new();
static NEWLINE_RUNS: OnceLock<Regex> = OnceLock::new();

/// Normalized response headers: one value per name, first occurrence wins
pub type HeaderMap = IndexMap<String, String>;

/// A decoded response body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageBody {
    /// Normalized text, or the placeholder for binary content
    pub content: String,

    /// Size in bytes of the normalized text, or of the binary payload
    pub size: usize,

    /// Whether the media type was textual
    pub is_text: bool,
}

/// Removes C0 control characters (except tab and newline), DEL and C1 controls
pub fn strip_control_characters(input: &str) -> String {
    let pattern = CONTROL_CHARACTERS.get_or_init(|| {
        Regex::new(r"[\x00-\x08\x0B-\x1F\x7F-\x{9F}]+").expect("control pattern is a valid regex")
    });
    pattern.replace_all(input, "").into_owned()
}

/// Normalizes text content
///
/// # Normalization Steps
///
/// 1. Unicode NFC composition
/// 2. `\r\n` and lone `\r` become `\n`
/// 3. Control characters other than tab and newline are removed
/// 4. Trailing spaces and tabs are trimmed from every line
/// 5. Leading and trailing newlines are trimmed
///
/// # Examples
///
/// ```
/// use sumi_sweep::crawler::normalize_text;
///
/// assert_eq!(normalize_text("\r\n  a  \r\nb\t\r\n\r\n"), "  a\nb");
/// ```
pub fn normalize_text(input: &str) -> String {
    let composed: String = input.nfc().collect();
    let unified = composed.replace("\r\n", "\n").replace('\r', "\n");
    let stripped = strip_control_characters(&unified);

    let trailing = TRAILING_BLANKS.get_or_init(|| {
        Regex::new(r"(?m)[\t ]+$").expect("trailing blank pattern is a valid regex")
    });
    let trimmed = trailing.replace_all(&stripped, "");

    trimmed.trim_matches('\n').to_string()
}

/// Formats a normalized document for link and text extraction
///
/// Applies [`normalize_text`], collapses runs of newlines into one, and
/// replaces `&nbsp;` with a space and `&ndash;` with `-`.
pub fn format_html(input: &str) -> String {
    let newlines = NEWLINE_RUNS
        .get_or_init(|| Regex::new(r"\n+").expect("newline pattern is a valid regex"));

    let normalized = normalize_text(input);
    newlines
        .replace_all(&normalized, "\n")
        .replace("&nbsp;", " ")
        .replace("&ndash;", "-")
}

/// Collapses raw header lines into one value per name
///
/// Names compare case-insensitively; the spelling and value of the first
/// occurrence are kept. Control characters are stripped from both sides.
pub fn normalize_headers(raw: &[(String, String)]) -> HeaderMap {
    let mut headers = HeaderMap::new();

    for (name, value) in raw {
        let name = strip_control_characters(name).trim().to_string();
        if name.is_empty() {
            continue;
        }
        if headers.keys().any(|existing| existing.eq_ignore_ascii_case(&name)) {
            continue;
        }
        headers.insert(name, strip_control_characters(value).trim().to_string());
    }

    headers
}

/// Looks up a header case-insensitively
pub fn header_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|(n, _)| n.eq_ignore_ascii_case(name))
        .map(|(_, v)| v.as_str())
}

/// Extracts the lowercase media type of a `Content-Type` value, without parameters
pub fn media_type(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}

/// Returns true for `text/*`, `application/xml` and `+xml` media types
pub fn is_textual_media_type(media_type: &str) -> bool {
    media_type.starts_with("text/") || media_type == "application/xml" || media_type.ends_with("+xml")
}

/// Placeholder stored instead of a binary body
pub fn binary_placeholder(url: &str) -> String {
    format!("<!-- FILE {} -->", url)
}

/// Decodes a response body according to its media type
///
/// Textual bodies are decoded as UTF-8 (invalid sequences replaced) and
/// normalized; their size is the byte length of the normalized text.
/// Anything else becomes [`binary_placeholder`], sized from
/// `Content-Length` when present and the raw body otherwise.
pub fn decode_body(url: &str, response: &FetchResponse, headers: &HeaderMap) -> PageBody {
    let media = header_value(headers, "content-type")
        .map(media_type)
        .unwrap_or_default();

    if is_textual_media_type(&media) {
        let content = normalize_text(&String::from_utf8_lossy(&response.body));
        return PageBody {
            size: content.len(),
            content,
            is_text: true,
        };
    }

    let size = header_value(headers, "content-length")
        .and_then(|v| v.trim().parse::<usize>().ok())
        .unwrap_or(response.body.len());

    PageBody {
        content: binary_placeholder(url),
        size,
        is_text: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(headers: &[(&str, &str)], body: &[u8]) -> FetchResponse {
        FetchResponse {
            status: 200,
            headers: headers
                .iter()
                .map(|(n, v)| (n.to_string(), v.to_string()))
                .collect(),
            body: body.to_vec(),
            elapsed_ms: 0.0,
        }
    }

    #[test]
    fn test_normalize_text_line_endings() {
        assert_eq!(normalize_text("a\r\nb\rc\n"), "a\nb\nc");
    }

    #[test]
    fn test_normalize_text_composes_nfc() {
        let decomposed = "e\u{301}";
        assert_eq!(normalize_text(decomposed), "\u{e9}");
    }

    #[test]
    fn test_normalize_text_strips_controls_but_keeps_tabs() {
        assert_eq!(normalize_text("a\u{0}b\tc\u{7f}d\u{85}e"), "ab\tcde");
    }

    #[test]
    fn test_normalize_text_right_trims_lines() {
        assert_eq!(normalize_text("a \t\n  b  \nc"), "a\n  b\nc");
    }

    #[test]
    fn test_normalize_text_trims_blank_lines() {
        assert_eq!(normalize_text("\n\n  \nbody\n\n"), "body");
    }

    #[test]
    fn test_format_html_collapses_newlines_and_entities() {
        assert_eq!(
            format_html("a\n\n\nb&nbsp;c&ndash;d"),
            "a\nb c-d"
        );
    }

    #[test]
    fn test_normalize_headers_first_wins() {
        let raw = vec![
            ("Content-Type".to_string(), "text/html".to_string()),
            ("content-type".to_string(), "text/plain".to_string()),
            ("X-A".to_string(), " 1 ".to_string()),
        ];
        let headers = normalize_headers(&raw);

        assert_eq!(headers.len(), 2);
        assert_eq!(headers.get("Content-Type").map(String::as_str), Some("text/html"));
        assert_eq!(headers.get("X-A").map(String::as_str), Some("1"));
        assert_eq!(header_value(&headers, "CONTENT-TYPE"), Some("text/html"));
    }

    #[test]
    fn test_media_type_ignores_parameters_and_case() {
        assert_eq!(media_type("Text/HTML; charset=UTF-8"), "text/html");
        assert_eq!(media_type(""), "");
    }

    #[test]
    fn test_textual_media_types() {
        assert!(is_textual_media_type("text/html"));
        assert!(is_textual_media_type("text/plain"));
        assert!(is_textual_media_type("application/xml"));
        assert!(is_textual_media_type("application/rss+xml"));
        assert!(!is_textual_media_type("application/pdf"));
        assert!(!is_textual_media_type("image/png"));
        assert!(!is_textual_media_type(""));
    }

    #[test]
    fn test_decode_text_body() {
        let response = response(&[("Content-Type", "text/html; charset=utf-8")], b"<p>x</p>\r\n\r\n");
        let headers = normalize_headers(&response.headers);
        let body = decode_body("http://a/", &response, &headers);

        assert!(body.is_text);
        assert_eq!(body.content, "<p>x</p>");
        assert_eq!(body.size, 8);
    }

    #[test]
    fn test_decode_binary_body_uses_content_length() {
        let response = response(
            &[("Content-Type", "application/pdf"), ("Content-Length", "12345")],
            b"%PDF",
        );
        let headers = normalize_headers(&response.headers);
        let body = decode_body("http://a/doc.pdf", &response, &headers);

        assert!(!body.is_text);
        assert_eq!(body.content, "<!-- FILE http://a/doc.pdf -->");
        assert_eq!(body.size, 12345);
    }

    #[test]
    fn test_decode_binary_body_without_length() {
        let response = response(&[("Content-Type", "image/png")], &[0x89, 0x50, 0x4e, 0x47]);
        let headers = normalize_headers(&response.headers);
        let body = decode_body("http://a/i.png", &response, &headers);
        assert_eq!(body.size, 4);
    }

    #[test]
    fn test_missing_content_type_is_binary() {
        let response = response(&[], b"<p>x</p>");
        let headers = normalize_headers(&response.headers);
        assert!(!decode_body("http://a/", &response, &headers).is_text);
    }
}

use percent_encoding::percent_encode_byte;

/// URI component a string is being normalized for
///
/// Each component admits a different set of literal characters; anything
/// outside that set is percent-encoded on normalization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Component {
    User,
    Password,
    Host,
    Path,
    Query,
    Fragment,
}

impl Component {
    fn allows(self, byte: u8) -> bool {
        let pchar = is_unreserved(byte) || is_sub_delim(byte) || byte == b':' || byte == b'@';
        match self {
            Self::User | Self::Host => is_unreserved(byte) || is_sub_delim(byte),
            Self::Password => is_unreserved(byte) || is_sub_delim(byte) || byte == b':',
            Self::Path => pchar || byte == b'/',
            Self::Query | Self::Fragment => pchar || byte == b'/' || byte == b'?',
        }
    }
}

fn is_unreserved(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || matches!(byte, b'-' | b'.' | b'_' | b'~')
}

fn is_sub_delim(byte: u8) -> bool {
    matches!(
        byte,
        b'!' | b'$' | b'&' | b'\'' | b'(' | b')' | b'*' | b'+' | b',' | b';' | b'='
    )
}

fn hex_value(byte: u8) -> Option<u8> {
    (byte as char).to_digit(16).map(|d| d as u8)
}

/// Brings a URI component into canonical percent-encoded form
///
/// # Normalization Steps
///
/// 1. Escapes of unreserved characters (`%41`, `%7E`) are decoded
/// 2. Remaining escapes keep their encoding with uppercase hex digits
/// 3. Literal characters the component does not admit (spaces, non-ASCII
///    bytes, a stray `%`) are percent-encoded
///
/// Applying the function twice yields the same string as applying it once.
///
/// # Examples
///
/// ```
/// use sumi_sweep::url::{normalize_component, Component};
///
/// assert_eq!(normalize_component("%7euser/a b", Component::Path), "~user/a%20b");
/// assert_eq!(normalize_component("a%2fb", Component::Path), "a%2Fb");
/// ```
pub fn normalize_component(input: &str, component: Component) -> String {
    let bytes = input.as_bytes();
    let mut out = String::with_capacity(bytes.len());
    let mut i = 0;

    while i < bytes.len() {
        let byte = bytes[i];

        if byte == b'%' && i + 2 < bytes.len() {
            if let (Some(hi), Some(lo)) = (hex_value(bytes[i + 1]), hex_value(bytes[i + 2])) {
                let decoded = hi * 16 + lo;
                if is_unreserved(decoded) {
                    out.push(decoded as char);
                } else {
                    out.push_str(percent_encode_byte(decoded));
                }
                i += 3;
                continue;
            }
        }

        if byte.is_ascii() && component.allows(byte) {
            out.push(byte as char);
        } else {
            out.push_str(percent_encode_byte(byte));
        }
        i += 1;
    }

    out
}

/// Removes `.` and `..` segments from a path (RFC 3986 §5.2.4)
///
/// Empty segments are dropped, so `a//b` collapses to `a/b`. A leading `/`
/// is kept when the input had one. The result ends in `/` when the input
/// did, or when its last segment was `.` or `..`, unless the result is the
/// root path itself. `..` never climbs above the root.
///
/// # Examples
///
/// ```
/// use sumi_sweep::url::remove_dot_segments;
///
/// assert_eq!(remove_dot_segments("/a/b/c/./../../g"), "/a/g");
/// assert_eq!(remove_dot_segments("/b/c/g;x=1/../y"), "/b/c/y");
/// assert_eq!(remove_dot_segments("/../../"), "/");
/// ```
pub fn remove_dot_segments(path: &str) -> String {
    let mut segments: Vec<&str> = Vec::new();

    for segment in path.split('/') {
        match segment {
            "" | "." => continue,
            ".." => {
                segments.pop();
            }
            _ => segments.push(segment),
        }
    }

    let ends_in_directory = path.ends_with('/')
        || matches!(path.rsplit('/').next(), Some(".") | Some(".."));

    let mut result = segments.join("/");
    if path.starts_with('/') {
        result.insert(0, '/');
    }
    if ends_in_directory && result != "/" && !result.is_empty() {
        result.push('/');
    }
    result
}

/// Returns the URL with everything from the first `#` removed
pub fn strip_fragment(url: &str) -> &str {
    match url.find('#') {
        Some(idx) => &url[..idx],
        None => url,
    }
}

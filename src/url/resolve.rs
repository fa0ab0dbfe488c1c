use crate::url::normalize::remove_dot_segments;
use crate::url::parts::UrlParts;
use crate::{ResolutionError, ResolveResult};

/// Resolves a reference against a base URL (RFC 3986 §5.2)
///
/// # Resolution Rules
///
/// 1. A reference with its own scheme is already absolute; only its dot
///    segments are removed (when its path is absolute)
/// 2. Otherwise the base must carry a scheme and a host
/// 3. A scheme-relative reference (`//host/...`) borrows the base scheme
/// 4. A reference with an empty path keeps the base path, and the base query
///    unless it brings its own
/// 5. A relative path is merged onto the base path up to its last `/`
///
/// The fragment always comes from the reference.
///
/// # Arguments
///
/// * `base` - Absolute URL of the document the reference appeared in
/// * `reference` - The href, `Location` value or other reference to resolve
///
/// # Returns
///
/// * `Ok(String)` - The absolute URL in canonical form
/// * `Err(ResolutionError::Unparseable)` - The reference is not a URI reference
/// * `Err(ResolutionError::InvalidBase)` - The base is unparseable or not absolute
///
/// # Examples
///
/// ```
/// use sumi_sweep::url::resolve;
///
/// let base = "http://a/b/c/d;p?q";
/// assert_eq!(resolve(base, "../../../g").unwrap(), "http://a/g");
/// assert_eq!(resolve(base, "g;x=1/../y").unwrap(), "http://a/b/c/y");
/// assert_eq!(resolve(base, "//other.example/p").unwrap(), "http://other.example/p");
/// ```
pub fn resolve(base: &str, reference: &str) -> ResolveResult<String> {
    let reference_parts = UrlParts::parse(reference)?;

    if reference_parts.scheme().is_some() {
        let resolved = if reference_parts.path().starts_with('/') {
            let path = remove_dot_segments(reference_parts.path());
            reference_parts.with_path(&path)
        } else {
            reference_parts
        };
        return Ok(resolved.to_string());
    }

    let base_parts =
        UrlParts::parse(base).map_err(|_| ResolutionError::InvalidBase(base.to_string()))?;
    if !base_parts.is_absolute() {
        return Err(ResolutionError::InvalidBase(base.to_string()));
    }

    let merged = reference_parts.with_scheme(base_parts.scheme());

    if merged.host().is_some() {
        let path = remove_dot_segments(merged.path());
        return Ok(merged.with_path(&path).to_string());
    }

    let merged = merged.with_authority_of(&base_parts);

    if merged.path().is_empty() {
        let query = merged.query().or(base_parts.query()).map(str::to_string);
        let resolved = merged
            .with_path(base_parts.path())
            .with_query(query.as_deref());
        return Ok(resolved.to_string());
    }

    let path = if merged.path().starts_with('/') {
        remove_dot_segments(merged.path())
    } else {
        let base_path = base_parts.path();
        let directory = match base_path.rfind('/') {
            Some(idx) => &base_path[..idx],
            None => "",
        };
        remove_dot_segments(&format!("{}/{}", directory, merged.path()))
    };

    Ok(merged.with_path(&path).to_string())
}

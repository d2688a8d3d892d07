//! API request path resolution.
//!
//! Every page script addresses the server through the same convention:
//! `<prefix>/<block>/api/<operation>/`, where `<prefix>/<block>` is the
//! root of the block the current page lives under. When the page is deeper
//! inside the block (viewing a single item, say), the path is backed up to
//! the block root first.

mod segment;

pub use segment::{block_root, MatchRule};

/// Literal segment separating a block root from its operations.
const API_SEGMENT: &str = "api/";

/// Resolves the API path for `operation` on `block` from the page location
/// `current`, using segment-exact, case-sensitive block matching.
///
/// # Examples
///
/// - `("/course/view/42/materials/section/7/", "materials", "addsection")`
///   → `"/course/view/42/materials/api/addsection/"`
/// - `("/course/view/42/", "news", "more")` → `"/course/view/42/news/api/more/"`
pub fn api_request_path(current: &str, block: &str, operation: &str) -> String {
    api_request_path_with(current, block, operation, MatchRule::Exact)
}

/// Like [`api_request_path`] with an explicit block matching rule.
///
/// `operation` is appended verbatim, so `"addform/essay"` addresses a nested
/// action. Empty `block` or `operation` yield a malformed path rather than a
/// panic; callers must not pass them.
pub fn api_request_path_with(
    current: &str,
    block: &str,
    operation: &str,
    rule: MatchRule,
) -> String {
    let base = block_root(current, block, rule).unwrap_or(current);
    let base = base.trim_end_matches('/');

    let mut path =
        String::with_capacity(base.len() + block.len() + operation.len() + API_SEGMENT.len() + 4);
    if !base.starts_with('/') {
        path.push('/');
    }
    path.push_str(base);
    if !path.ends_with('/') {
        path.push('/');
    }

    if !segment::ends_with_block(&path, block, rule) {
        path.push_str(block);
        path.push('/');
    }

    path.push_str(API_SEGMENT);
    path.push_str(operation);
    path.push('/');
    path
}

/// Strips the trailing `api/<operation>/` from a resolved path, giving the
/// block root directory it was resolved against.
pub fn api_directory<'a>(resolved: &'a str, operation: &str) -> Option<&'a str> {
    let rest = resolved.strip_suffix('/')?.strip_suffix(operation)?;
    rest.strip_suffix(API_SEGMENT)
}

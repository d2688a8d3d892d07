//! Resolver interface for turning a page location and a block operation into
//! a concrete request target.
//!
//! The session only depends on this trait; how the absolute URL is built
//! (base URL, location, match rule) stays behind it.

use anyhow::{bail, Context, Result};
use url::Url;

use crate::api_path::{api_request_path_with, MatchRule};

/// Absolute URL and form body for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedRequest {
    pub url: String,
    /// Form fields, sent url-encoded in order.
    pub fields: Vec<(String, String)>,
}

/// Trait implemented by anything that can produce a request target.
pub trait Resolver {
    fn resolve(&self) -> Result<ResolvedRequest>;
}

/// An operation on a block, addressed from the page at `current_path` on
/// the server at `base_url`.
#[derive(Debug, Clone)]
pub struct BlockRequest<'a> {
    pub base_url: &'a Url,
    pub current_path: &'a str,
    pub block: &'a str,
    pub operation: &'a str,
    pub fields: Vec<(String, String)>,
    pub rule: MatchRule,
}

impl Resolver for BlockRequest<'_> {
    fn resolve(&self) -> Result<ResolvedRequest> {
        let path = api_request_path_with(self.current_path, self.block, self.operation, self.rule);
        let url = join_path(self.base_url, &path)?;
        Ok(ResolvedRequest {
            url: url.into(),
            fields: self.fields.clone(),
        })
    }
}

/// Parses and validates the server base URL (scheme and host only matter;
/// any path on it is replaced by the resolved path).
pub fn parse_base_url(raw: &str) -> Result<Url> {
    let url = Url::parse(raw.trim()).with_context(|| format!("invalid base URL: {raw}"))?;
    match url.scheme() {
        "http" | "https" => {}
        other => bail!("unsupported base URL scheme '{other}' (expected http or https)"),
    }
    if url.cannot_be_a_base() || url.host_str().is_none() {
        bail!("base URL has no host: {raw}");
    }
    Ok(url)
}

/// Places an absolute resolved path on the base URL's origin.
pub fn join_path(base: &Url, path: &str) -> Result<Url> {
    let mut url = base.clone();
    url.set_query(None);
    url.set_fragment(None);
    url.set_path(path);
    Ok(url)
}

//! YAML mapping documents.
//!
//! The expected shape is a top-level sequence of `path`/`url` mappings:
//!
//! ```yaml
//! - path: /some-path
//!   url: https://www.some-url.com/demo
//! ```
//!
//! Loading happens once at startup. Every failure here is reported before a
//! single request is served.

use std::path::Path;

use serde::Deserialize;

use crate::dispatcher::RedirectDispatcher;
use crate::error::LoadError;
use crate::resolver::MapResolver;

/// One entry of a mapping document. Consumed immediately by the map builder.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PathUrlPair {
    pub path: String,
    pub url: String,
}

/// Parse a YAML document into its pairs, in document order.
///
/// A blank document or an explicit `null` yields no pairs.
pub fn parse_pairs(bytes: &[u8]) -> Result<Vec<PathUrlPair>, LoadError> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(Vec::new());
    }
    let pairs: Option<Vec<PathUrlPair>> = serde_yaml::from_slice(bytes)?;
    Ok(pairs.unwrap_or_default())
}

/// Parse a YAML document and build a resolver from it.
pub fn load_yaml(bytes: &[u8]) -> Result<MapResolver, LoadError> {
    let pairs = parse_pairs(bytes)?;
    let entries = pairs.len();
    let resolver = MapResolver::from_pairs(Some(pairs));
    tracing::debug!(entries, paths = resolver.len(), "Parsed YAML mapping");
    Ok(resolver)
}

/// Parse a YAML document and pair the resolver with `fallback`.
pub fn yaml_dispatcher<S>(bytes: &[u8], fallback: S) -> Result<RedirectDispatcher<S>, LoadError> {
    let resolver = load_yaml(bytes)?;
    Ok(RedirectDispatcher::new(resolver, fallback))
}

/// Read a YAML mapping file from disk and parse its pairs.
pub fn read_pairs_file(path: impl AsRef<Path>) -> Result<Vec<PathUrlPair>, LoadError> {
    let path = path.as_ref();
    let bytes = std::fs::read(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_pairs(&bytes)
}

/// Read a YAML mapping file from disk and build a resolver from it.
pub fn load_yaml_file(path: impl AsRef<Path>) -> Result<MapResolver, LoadError> {
    let pairs = read_pairs_file(path)?;
    Ok(MapResolver::from_pairs(Some(pairs)))
}

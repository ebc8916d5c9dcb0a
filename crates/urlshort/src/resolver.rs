//! Path to destination lookup.
//!
//! The mapping is built once at startup and never mutated afterwards, so a
//! [`MapResolver`] can be cloned into every request task and read without
//! locking.

use std::collections::HashMap;
use std::sync::Arc;

use crate::loader::PathUrlPair;

/// Request path to destination URL. Destinations are stored verbatim.
pub type PathMapping = HashMap<String, String>;

/// Collapse a sequence of pairs into a [`PathMapping`].
///
/// `None` is treated as an empty sequence. When a path repeats, the last
/// occurrence in iteration order wins.
pub fn build_mapping<I>(pairs: Option<I>) -> PathMapping
where
    I: IntoIterator<Item = PathUrlPair>,
{
    pairs
        .into_iter()
        .flatten()
        .map(|pair| (pair.path, pair.url))
        .collect()
}

/// Read-only resolver over a [`PathMapping`]. Cheap to clone (Arc).
#[derive(Debug, Clone, Default)]
pub struct MapResolver {
    paths: Arc<PathMapping>,
}

impl MapResolver {
    pub fn new(paths: PathMapping) -> Self {
        Self {
            paths: Arc::new(paths),
        }
    }

    pub fn from_pairs<I>(pairs: Option<I>) -> Self
    where
        I: IntoIterator<Item = PathUrlPair>,
    {
        Self::new(build_mapping(pairs))
    }

    /// Look up `path` by exact string equality.
    ///
    /// No trailing-slash, case or query normalization is applied. An entry
    /// with an empty destination is still returned; callers decide what an
    /// empty destination means.
    pub fn resolve(&self, path: &str) -> Option<&str> {
        self.paths.get(path).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Known paths, in no particular order.
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.paths.keys().map(String::as_str)
    }
}

impl From<PathMapping> for MapResolver {
    fn from(paths: PathMapping) -> Self {
        Self::new(paths)
    }
}

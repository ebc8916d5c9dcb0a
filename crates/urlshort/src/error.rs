//! Errors raised while building a mapping.
//!
//! Only construction can fail. Resolving a path at request time is total:
//! a miss is the fallback branch, not an error.

use std::path::PathBuf;

use thiserror::Error;

/// Failure to turn a mapping document into a resolver.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The bytes are not YAML, or not a sequence of `path`/`url` mappings.
    #[error("malformed mapping document: {0}")]
    MalformedInput(#[from] serde_yaml::Error),

    /// The mapping file could not be read.
    #[error("failed to read mapping file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl LoadError {
    /// Whether the document itself was at fault (as opposed to the filesystem).
    pub fn is_malformed(&self) -> bool {
        matches!(self, LoadError::MalformedInput(_))
    }
}

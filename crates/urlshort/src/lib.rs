//! urlshort: redirect request paths to URLs taken from a literal map or a
//! YAML document, handing everything else to a fallback service.

pub mod config;
pub mod dispatcher;
pub mod error;
pub mod loader;
pub mod resolver;
pub mod server;

pub use dispatcher::{RedirectDispatcher, REDIRECT_STATUS};
pub use error::LoadError;
pub use loader::{load_yaml, load_yaml_file, parse_pairs, yaml_dispatcher, PathUrlPair};
pub use resolver::{build_mapping, MapResolver, PathMapping};

//! Configuration types and loading logic.

use std::collections::BTreeMap;
use std::path::PathBuf;

use figment::providers::{Env, Format, Toml};
use figment::Figment;
use serde::Deserialize;
use urlshort_tracing::TracingConfig;

use crate::error::LoadError;
use crate::loader::{self, PathUrlPair};
use crate::resolver::MapResolver;

/// Top-level service configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RedirectConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub mappings: MappingsConfig,
    #[serde(default)]
    pub tracing: TracingConfig,
}

/// Server listen configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_listen_address")]
    pub listen_address: String,
}

/// Where redirects come from.
///
/// Inline `paths` are applied first, then the entries of `yaml_file` in
/// document order, so the file wins when both name the same path.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MappingsConfig {
    /// Literal path -> URL table.
    #[serde(default)]
    pub paths: BTreeMap<String, String>,

    /// YAML document of `path`/`url` entries.
    #[serde(default)]
    pub yaml_file: Option<PathBuf>,

    #[serde(default)]
    pub on_malformed: MalformedPolicy,
}

/// What to do when the YAML document cannot be loaded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MalformedPolicy {
    /// Refuse to start.
    #[default]
    Abort,
    /// Log the error and serve the inline paths only.
    Empty,
}

fn default_listen_address() -> String {
    "0.0.0.0:8080".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_address: default_listen_address(),
        }
    }
}

impl RedirectConfig {
    /// Load configuration from a TOML file and environment variables.
    ///
    /// Priority (highest to lowest):
    /// 1. Environment variables (URLSHORT_ prefix, __ for nesting)
    /// 2. TOML config file (skipped if it does not exist)
    /// 3. Defaults
    pub fn load(config_path: &str) -> anyhow::Result<Self> {
        let config: RedirectConfig = Self::figment(config_path).extract()?;
        Ok(config)
    }

    pub fn figment(config_path: &str) -> Figment {
        Figment::new()
            .merge(Toml::file(config_path))
            .merge(Env::prefixed("URLSHORT_").split("__"))
    }
}

impl MappingsConfig {
    /// Assemble the resolver from inline paths and the YAML file.
    pub fn build_resolver(&self) -> Result<MapResolver, LoadError> {
        let source = self
            .yaml_file
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "inline".to_string());
        let span = urlshort_tracing::mapping_load_span!(source);
        let _entered = span.enter();

        let inline = self.paths.iter().map(|(path, url)| PathUrlPair {
            path: path.clone(),
            url: url.clone(),
        });
        let from_file = self.load_file_pairs()?;

        let resolver = MapResolver::from_pairs(Some(inline.chain(from_file)));
        span.record("paths", resolver.len());
        Ok(resolver)
    }

    fn load_file_pairs(&self) -> Result<Vec<PathUrlPair>, LoadError> {
        let Some(path) = &self.yaml_file else {
            return Ok(Vec::new());
        };
        match loader::read_pairs_file(path) {
            Ok(pairs) => Ok(pairs),
            Err(e) if self.on_malformed == MalformedPolicy::Empty => {
                tracing::warn!(
                    error = %e,
                    inline_paths = self.paths.len(),
                    "Mapping file rejected, continuing with inline paths only"
                );
                Ok(Vec::new())
            }
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use figment::Jail;

    use super::*;

    #[test]
    fn test_missing_file_uses_defaults() {
        Jail::expect_with(|_jail| {
            let config: RedirectConfig = RedirectConfig::figment("absent.toml").extract()?;

            assert_eq!(config.server.listen_address, "0.0.0.0:8080");
            assert!(config.mappings.paths.is_empty());
            assert!(config.mappings.yaml_file.is_none());
            assert_eq!(config.mappings.on_malformed, MalformedPolicy::Abort);
            assert_eq!(config.tracing.log_level, "info");
            Ok(())
        });
    }

    #[test]
    fn test_toml_file_and_env_override() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "urlshort.toml",
                r#"
                [server]
                listen_address = "127.0.0.1:3000"

                [mappings]
                yaml_file = "paths.yaml"
                on_malformed = "empty"

                [mappings.paths]
                "/google" = "https://www.google.com"
                "/amazon" = ""

                [tracing]
                log_level = "debug"
                "#,
            )?;
            jail.set_env("URLSHORT_SERVER__LISTEN_ADDRESS", "127.0.0.1:9000");

            let config: RedirectConfig = RedirectConfig::figment("urlshort.toml").extract()?;

            assert_eq!(config.server.listen_address, "127.0.0.1:9000");
            assert_eq!(config.mappings.paths.len(), 2);
            assert_eq!(config.mappings.paths["/google"], "https://www.google.com");
            assert_eq!(config.mappings.yaml_file, Some(PathBuf::from("paths.yaml")));
            assert_eq!(config.mappings.on_malformed, MalformedPolicy::Empty);
            assert_eq!(config.tracing.log_level, "debug");
            Ok(())
        });
    }

    #[test]
    fn test_yaml_file_overrides_inline_paths() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "paths.yaml",
                "- path: /docs\n  url: https://from-yaml.example\n- path: /blog\n  url: https://blog.example\n",
            )?;
            let mappings = MappingsConfig {
                paths: BTreeMap::from([
                    ("/docs".to_string(), "https://inline.example".to_string()),
                    ("/home".to_string(), "https://home.example".to_string()),
                ]),
                yaml_file: Some(PathBuf::from("paths.yaml")),
                on_malformed: MalformedPolicy::Abort,
            };

            let resolver = mappings.build_resolver().unwrap();

            assert_eq!(resolver.len(), 3);
            assert_eq!(resolver.resolve("/docs"), Some("https://from-yaml.example"));
            assert_eq!(resolver.resolve("/home"), Some("https://home.example"));
            assert_eq!(resolver.resolve("/blog"), Some("https://blog.example"));
            Ok(())
        });
    }

    #[test]
    fn test_malformed_file_aborts_by_default() {
        Jail::expect_with(|jail| {
            jail.create_file("paths.yaml", "not: [valid, yaml: structure")?;
            let mappings = MappingsConfig {
                yaml_file: Some(PathBuf::from("paths.yaml")),
                ..MappingsConfig::default()
            };

            let err = mappings.build_resolver().unwrap_err();
            assert!(err.is_malformed());
            Ok(())
        });
    }

    #[test]
    fn test_malformed_file_with_empty_policy_keeps_inline() {
        Jail::expect_with(|jail| {
            jail.create_file("paths.yaml", "just a string")?;
            let mappings = MappingsConfig {
                paths: BTreeMap::from([("/a".to_string(), "https://a.example".to_string())]),
                yaml_file: Some(PathBuf::from("paths.yaml")),
                on_malformed: MalformedPolicy::Empty,
            };

            let resolver = mappings.build_resolver().unwrap();

            assert_eq!(resolver.len(), 1);
            assert_eq!(resolver.resolve("/a"), Some("https://a.example"));
            Ok(())
        });
    }

    #[test]
    fn test_inline_only() {
        let mappings = MappingsConfig {
            paths: BTreeMap::from([("/a".to_string(), "https://a.example".to_string())]),
            ..MappingsConfig::default()
        };

        let resolver = mappings.build_resolver().unwrap();
        assert_eq!(resolver.resolve("/a"), Some("https://a.example"));
    }
}

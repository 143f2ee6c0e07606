//! Configuration for the repository tooling
//!
//! Supports loading configuration from:
//! - Default values
//! - Config file (dmr.toml)
//! - Environment variables (DMR_*)
//!
//! ## Example config file (dmr.toml):
//! ```toml
//! [repository]
//! location = "https://devicemodels.azure.com"
//!
//! [resolution]
//! dependencies = "enabled"
//!
//! [index]
//! page_limit = 2048
//!
//! [validation]
//! reserved_words = ["Microsoft", "Azure"]
//! ```

use config_crate::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::index::DEFAULT_PAGE_LIMIT;
use crate::resolver::DependencyResolution;
use crate::validation::DEFAULT_RESERVED_WORDS;

/// Main configuration for the repository tooling
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RepoConfig {
    /// Repository settings
    #[serde(default)]
    pub repository: RepositoryConfig,

    /// Dependency resolution settings
    #[serde(default)]
    pub resolution: ResolutionConfig,

    /// Index builder settings
    #[serde(default)]
    pub index: IndexConfig,

    /// Strict validation settings
    #[serde(default)]
    pub validation: ValidationConfig,
}

/// Repository configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepositoryConfig {
    /// Default repository location used when none is given on the command
    /// line; a local directory path or a remote base URL
    #[serde(default = "default_location")]
    pub location: String,
}

/// Dependency resolution configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResolutionConfig {
    /// How discovered dependencies are handled
    #[serde(default)]
    pub dependencies: DependencyResolution,
}

/// Index builder configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexConfig {
    /// Maximum number of entries per index page
    #[serde(default = "default_page_limit")]
    pub page_limit: usize,
}

/// Strict validation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationConfig {
    /// Substrings that may not appear in model ids
    #[serde(default = "default_reserved_words")]
    pub reserved_words: Vec<String>,
}

// Default value functions
fn default_location() -> String {
    "https://devicemodels.azure.com".to_string()
}

fn default_page_limit() -> usize {
    DEFAULT_PAGE_LIMIT
}

fn default_reserved_words() -> Vec<String> {
    DEFAULT_RESERVED_WORDS.map(String::from).to_vec()
}

impl Default for RepositoryConfig {
    fn default() -> Self {
        Self {
            location: default_location(),
        }
    }
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            page_limit: default_page_limit(),
        }
    }
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            reserved_words: default_reserved_words(),
        }
    }
}

impl RepoConfig {
    /// Load configuration from default locations
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(None)
    }

    /// Load configuration, optionally from a specific file
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut builder = Config::builder();

        builder = builder.add_source(File::with_name("dmr").required(false));

        if let Some(path) = config_path {
            builder = builder.add_source(File::from(path.to_path_buf()).required(true));
        }

        // Environment variables (DMR_*), e.g. DMR_REPOSITORY__LOCATION
        builder = builder.add_source(
            Environment::with_prefix("DMR")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build()?;
        config.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = RepoConfig::default();
        assert_eq!(config.index.page_limit, DEFAULT_PAGE_LIMIT);
        assert_eq!(config.resolution.dependencies, DependencyResolution::Enabled);
        assert_eq!(config.validation.reserved_words, vec!["Microsoft", "Azure"]);
    }

    #[test]
    fn test_deserialize_partial_config() {
        let config: RepoConfig = serde_json::from_str(
            r#"{"resolution": {"dependencies": "from-expanded"}, "index": {"page_limit": 16}}"#,
        )
        .unwrap();
        assert_eq!(
            config.resolution.dependencies,
            DependencyResolution::FromExpanded
        );
        assert_eq!(config.index.page_limit, 16);
        // untouched sections keep their defaults
        assert_eq!(config.validation.reserved_words.len(), 2);
    }
}

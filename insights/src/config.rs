//! Site configuration stored in `.insights/config.toml`.
//!
//! ```toml
//! [insights]
//! prefix = "insights"
//! site = "default"
//! backend = "redis"        # or "memory"
//!
//! [redis]
//! url = "${REDIS_URL}"
//!
//! [cache]
//! namespace = "insights"
//!
//! [access]
//! readable = ["Data Source", "Table", "Insights Dashboard"]
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{access::AccessPolicy, types::DocType};

pub const CONFIG_DIR: &str = ".insights";
pub const CONFIG_FILE: &str = "config.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("environment variable {0} not set")]
    MissingEnv(String),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InsightsConfig {
    #[serde(default)]
    pub insights: InsightsSettings,
    #[serde(default)]
    pub redis: RedisSettings,
    #[serde(default)]
    pub cache: CacheSettings,
    #[serde(default)]
    pub access: AccessSettings,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    #[default]
    Memory,
    Redis,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsightsSettings {
    #[serde(default = "default_prefix")]
    pub prefix: String,
    #[serde(default = "default_site")]
    pub site: String,
    #[serde(default)]
    pub backend: Backend,
}

impl Default for InsightsSettings {
    fn default() -> Self {
        Self {
            prefix: default_prefix(),
            site: default_site(),
            backend: Backend::default(),
        }
    }
}

fn default_prefix() -> String {
    "insights".to_string()
}

fn default_site() -> String {
    "default".to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RedisSettings {
    #[serde(default = "default_redis_url")]
    pub url: String,
}

impl Default for RedisSettings {
    fn default() -> Self {
        Self {
            url: default_redis_url(),
        }
    }
}

fn default_redis_url() -> String {
    "${REDIS_URL}".to_string()
}

impl RedisSettings {
    /// The Redis URL with a whole-value `${VAR}` reference expanded.
    pub fn resolved_url(&self) -> Result<String, ConfigError> {
        expand_env(&self.url)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheSettings {
    #[serde(default = "default_cache_namespace")]
    pub namespace: String,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            namespace: default_cache_namespace(),
        }
    }
}

fn default_cache_namespace() -> String {
    "insights".to_string()
}

/// `readable` unset means every doctype is readable.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AccessSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub readable: Option<Vec<DocType>>,
}

impl AccessSettings {
    pub fn policy(&self) -> AccessPolicy {
        match &self.readable {
            Some(doctypes) => AccessPolicy::readable(doctypes.iter().copied()),
            None => AccessPolicy::allow_all(),
        }
    }
}

fn expand_env(value: &str) -> Result<String, ConfigError> {
    match value.strip_prefix("${").and_then(|rest| rest.strip_suffix('}')) {
        Some(var_name) => std::env::var(var_name).map_err(|_| ConfigError::MissingEnv(var_name.to_string())),
        None => Ok(value.to_string()),
    }
}

impl InsightsConfig {
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Nearest `.insights/config.toml` in `start` or its ancestors.
    pub fn discover(start: &Path) -> Option<PathBuf> {
        start
            .ancestors()
            .map(|dir| dir.join(CONFIG_DIR).join(CONFIG_FILE))
            .find(|candidate| candidate.is_file())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = InsightsConfig::default();
        assert_eq!(config.insights.prefix, "insights");
        assert_eq!(config.insights.site, "default");
        assert_eq!(config.insights.backend, Backend::Memory);
        assert_eq!(config.redis.url, "${REDIS_URL}");
        assert_eq!(config.cache.namespace, "insights");
        assert_eq!(config.access.policy(), AccessPolicy::AllowAll);
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let config = InsightsConfig::from_toml_str(
            r#"
            [insights]
            backend = "redis"

            [access]
            readable = ["Data Source", "Table"]
            "#,
        )
        .unwrap();
        assert_eq!(config.insights.backend, Backend::Redis);
        assert_eq!(config.insights.site, "default");
        assert!(!config.access.policy().can_read(DocType::Query));
        assert!(config.access.policy().can_read(DocType::Table));
    }

    #[test]
    fn test_literal_url_is_not_expanded() {
        let settings = RedisSettings {
            url: "redis://127.0.0.1/".to_string(),
        };
        assert_eq!(settings.resolved_url().unwrap(), "redis://127.0.0.1/");
    }

    #[test]
    fn test_missing_env_var_is_reported() {
        let settings = RedisSettings {
            url: "${INSIGHTS_TEST_UNSET_REDIS_URL}".to_string(),
        };
        assert!(matches!(settings.resolved_url(), Err(ConfigError::MissingEnv(name)) if name == "INSIGHTS_TEST_UNSET_REDIS_URL"));
    }

    #[test]
    fn test_config_serialization() {
        let config = InsightsConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(toml_str.contains("prefix"));
        assert!(toml_str.contains("namespace"));
    }

    #[test]
    fn test_discover_walks_up() {
        let root = tempfile::tempdir().unwrap();
        let config_dir = root.path().join(CONFIG_DIR);
        std::fs::create_dir_all(&config_dir).unwrap();
        std::fs::write(config_dir.join(CONFIG_FILE), "[insights]\nsite = \"acme\"\n").unwrap();
        let nested = root.path().join("a").join("b");
        std::fs::create_dir_all(&nested).unwrap();

        let found = InsightsConfig::discover(&nested).unwrap();
        assert_eq!(InsightsConfig::load(&found).unwrap().insights.site, "acme");
    }
}

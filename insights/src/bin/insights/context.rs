use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use insights::{
    AccessPolicy, ApiError, Backend, ConnectionManager, InsightsApi, InsightsConfig, MemoryCache, MemoryStore,
    RedisCache, RedisStore, keys::KeyContext, rpc,
};
use serde_json::Value;

use crate::output::OutputManager;

/// Loaded site configuration and where it came from.
pub struct SiteContext {
    pub config_path: Option<PathBuf>,
    pub config: InsightsConfig,
}

impl SiteContext {
    /// Load the explicit config file, or the nearest `.insights/config.toml` above the
    /// current directory, or fall back to defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let config_path = match explicit {
            Some(path) => Some(path.to_path_buf()),
            None => {
                let current_dir = std::env::current_dir().context("Failed to get current directory")?;
                InsightsConfig::discover(&current_dir)
            }
        };

        let config = match &config_path {
            Some(path) => InsightsConfig::load(path).with_context(|| format!("Failed to load {}", path.display()))?,
            None => InsightsConfig::default(),
        };

        Ok(Self { config_path, config })
    }

    pub fn access_policy(&self) -> AccessPolicy {
        self.config.access.policy()
    }

    /// Build the API over the configured backend.
    pub async fn connect(&self, seed: Option<&Path>, output: &OutputManager) -> Result<Site> {
        let settings = &self.config.insights;
        match settings.backend {
            Backend::Memory => {
                let store = match seed {
                    Some(path) => {
                        let raw = tokio::fs::read_to_string(path)
                            .await
                            .with_context(|| format!("Failed to read seed file {}", path.display()))?;
                        MemoryStore::from_seed_json(&raw)
                            .with_context(|| format!("Invalid seed file {}", path.display()))?
                    }
                    None => MemoryStore::new(),
                };
                output.verbose(&format!("using in-memory backend with {} documents", store.len().await));
                let api = InsightsApi::new(store, MemoryCache::new()).with_access(self.access_policy());
                Ok(Site::Memory(api))
            }
            Backend::Redis => {
                if seed.is_some() {
                    output.warning("--seed only applies to the memory backend; ignoring it");
                }
                let redis_url = self
                    .config
                    .redis
                    .resolved_url()
                    .context("Redis URL is not configured. Set REDIS_URL or [redis].url")?;

                output.progress("Connecting to Redis");
                let client = insights::redis::Client::open(redis_url.as_str()).context("Failed to create Redis client")?;
                let conn = ConnectionManager::new(client)
                    .await
                    .context("Failed to connect to Redis")?;
                output.clear_line();
                output.verbose(&format!("connected to Redis at {redis_url}"));

                let keys = KeyContext::new(&settings.prefix, &settings.site);
                let cache = RedisCache::new(conn.clone(), keys.cache_hash(&self.config.cache.namespace));
                let store = RedisStore::new(conn, settings.prefix.clone(), settings.site.clone());
                let api = InsightsApi::new(store, cache).with_access(self.access_policy());
                Ok(Site::Redis(api))
            }
        }
    }
}

/// The API bound to one concrete backend.
pub enum Site {
    Memory(InsightsApi<MemoryStore, MemoryCache>),
    Redis(InsightsApi<RedisStore, RedisCache>),
}

impl Site {
    pub fn is_ephemeral(&self) -> bool {
        matches!(self, Site::Memory(_))
    }

    pub async fn call(&self, method: &str, params: Value) -> Result<Value, ApiError> {
        match self {
            Site::Memory(api) => rpc::handle_method(api, method, params).await,
            Site::Redis(api) => rpc::handle_method(api, method, params).await,
        }
    }

    /// Call `method` and decode its result into `T`.
    pub async fn call_typed<T: serde::de::DeserializeOwned>(&self, method: &str, params: Value) -> Result<T> {
        let value = self.call(method, params).await?;
        serde_json::from_value(value).with_context(|| format!("Unexpected result shape from {method}"))
    }
}


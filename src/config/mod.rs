// Configuration module

mod models;

pub use models::*;

use crate::error::{CacheError, Result};
use config::{Config, Environment, File};
use std::path::PathBuf;

impl AppConfig {
    /// Load configuration from multiple sources with precedence:
    /// 1. Environment variables (highest)
    /// 2. Config file
    /// 3. Defaults (lowest)
    pub fn load() -> Result<Self> {
        let config = Config::builder()
            // Start with defaults
            .add_source(Config::try_from(&Self::default())?)
            // Load from config file if it exists
            .add_source(File::with_name(&Self::default_config_path()).required(false))
            // Override with environment variables (prefix: VISIONPOOL_)
            .add_source(Environment::with_prefix("VISIONPOOL").separator("_"))
            .build()
            .map_err(|e| CacheError::Config(e.to_string()))?;

        config
            .try_deserialize()
            .map_err(|e| CacheError::Config(e.to_string()))
    }

    fn default_config_path() -> String {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".visionpool")
            .join("config.toml")
            .to_string_lossy()
            .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert!(config.analysis.enabled);
        assert_eq!(config.analysis.max_hash_bytes, 50 * 1024);
        assert_eq!(config.pool.max_batch_size, 3);
        assert_eq!(config.pool.max_wait_ms, 100);
        assert_eq!(config.frames.ttl_ms, 5000);
        assert_eq!(config.frames.max_entries, 50);
        assert_eq!(config.frames.sample_count, 100);
        assert_eq!(config.logging.level, "info");
    }
}

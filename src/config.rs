//! Engine configuration.
//!
//! Hosts embed the engine with an optional TOML config file; every value
//! has a stock default, so a config file only needs the keys it overrides.
//! Unknown keys are rejected to catch typos early.
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [storage]
//! root = "static"              # Storage root for processed images
//! block_dir = "uploads/blocks" # Subdirectory for block images
//!
//! [images]
//! quality = 85                 # JPEG encoding quality (1-100)
//!
//! [ogp]
//! ttl_hours = 24               # Metadata freshness window
//! timeout_secs = 10            # Outbound fetch timeout
//! max_body_kib = 2048          # Response body read cap
//! cache_capacity = 256         # Max cached URLs
//! # user_agent = "Mozilla/5.0 ..."  # Sent with metadata fetches
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::imaging::{PipelineConfig, Quality};
use crate::ogp::{
    FetchOptions, OgpCache, DEFAULT_CAPACITY, DEFAULT_MAX_BODY_KIB, DEFAULT_TIMEOUT_SECS,
    DEFAULT_TTL_HOURS, DEFAULT_USER_AGENT,
};

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Engine configuration loaded from TOML.
///
/// All fields have sensible defaults; config files are sparse overrides.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Where processed block images are stored.
    pub storage: StorageConfig,
    /// Image encoding settings.
    pub images: ImagesConfig,
    /// OGP fetching and caching settings.
    pub ogp: OgpConfig,
}

impl EngineConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.storage.root.trim().is_empty() {
            return Err(ConfigError::Validation(
                "storage.root must not be empty".into(),
            ));
        }
        if self.storage.block_dir.trim().is_empty() {
            return Err(ConfigError::Validation(
                "storage.block_dir must not be empty".into(),
            ));
        }
        if self.storage.block_dir.split('/').any(|part| part == "..") {
            return Err(ConfigError::Validation(
                "storage.block_dir must not contain `..`".into(),
            ));
        }
        if self.images.quality == 0 || self.images.quality > 100 {
            return Err(ConfigError::Validation(
                "images.quality must be 1-100".into(),
            ));
        }
        if self.ogp.ttl_hours < 1 {
            return Err(ConfigError::Validation(
                "ogp.ttl_hours must be at least 1".into(),
            ));
        }
        if self.ogp.timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "ogp.timeout_secs must be at least 1".into(),
            ));
        }
        if self.ogp.max_body_kib == 0 {
            return Err(ConfigError::Validation(
                "ogp.max_body_kib must be at least 1".into(),
            ));
        }
        if self.ogp.cache_capacity == 0 {
            return Err(ConfigError::Validation(
                "ogp.cache_capacity must be at least 1".into(),
            ));
        }
        Ok(())
    }

    /// Pipeline settings derived from this config.
    pub fn pipeline_config(&self) -> PipelineConfig {
        PipelineConfig {
            storage_root: PathBuf::from(&self.storage.root),
            block_dir: self.storage.block_dir.clone(),
            quality: Quality::new(self.images.quality),
        }
    }

    /// Fetcher settings derived from this config.
    pub fn fetch_options(&self) -> FetchOptions {
        FetchOptions {
            timeout_secs: self.ogp.timeout_secs,
            user_agent: self.ogp.user_agent.clone(),
            max_body_kib: self.ogp.max_body_kib,
        }
    }

    /// A fresh OGP cache sized per this config.
    pub fn ogp_cache(&self) -> OgpCache {
        OgpCache::new(
            chrono::Duration::hours(self.ogp.ttl_hours),
            self.ogp.cache_capacity,
        )
    }
}

/// Storage layout for processed images.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StorageConfig {
    /// Storage root that stored paths resolve against.
    pub root: String,
    /// Subdirectory under the root where block images land.
    pub block_dir: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            root: "static".to_string(),
            block_dir: "uploads/blocks".to_string(),
        }
    }
}

/// Image encoding settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ImagesConfig {
    /// JPEG encoding quality (1 = worst, 100 = best).
    pub quality: u32,
}

impl Default for ImagesConfig {
    fn default() -> Self {
        Self {
            quality: Quality::default().value(),
        }
    }
}

/// OGP fetch and cache settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OgpConfig {
    /// Hours before a cached metadata record is refetched.
    pub ttl_hours: i64,
    /// Outbound fetch timeout in seconds.
    pub timeout_secs: u64,
    /// User-agent header sent with metadata fetches.
    pub user_agent: String,
    /// Cap on the response body read, in KiB.
    pub max_body_kib: u64,
    /// Maximum number of cached URLs.
    pub cache_capacity: usize,
}

impl Default for OgpConfig {
    fn default() -> Self {
        Self {
            ttl_hours: DEFAULT_TTL_HOURS,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            max_body_kib: DEFAULT_MAX_BODY_KIB,
            cache_capacity: DEFAULT_CAPACITY,
        }
    }
}

/// Load config from a TOML file.
///
/// A missing file yields the stock defaults; a file that exists but fails
/// to parse or validate is an error.
pub fn load_config(path: &Path) -> Result<EngineConfig, ConfigError> {
    if !path.exists() {
        return Ok(EngineConfig::default());
    }
    let content = fs::read_to_string(path)?;
    let config: EngineConfig = toml::from_str(&content)?;
    config.validate()?;
    Ok(config)
}

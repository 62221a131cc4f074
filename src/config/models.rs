//! Configuration data structures for the visionpool layer.
//!
//! All knobs are explicit struct fields injected at construction time —
//! components never read the process environment at call time. Environment
//! and file loading happen once, in [`AppConfig::load`](crate::config).

use serde::{Deserialize, Serialize};

/// The root configuration object for the crate.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    /// Image-analysis result cache settings.
    #[serde(default)]
    pub analysis: AnalysisCacheConfig,

    /// Request pool (batching queue) settings.
    #[serde(default)]
    pub pool: PoolConfig,

    /// Perceptual frame cache settings.
    #[serde(default)]
    pub frames: FrameCacheConfig,

    /// Logging and observability settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Settings for the content-addressed analysis cache.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisCacheConfig {
    /// Whether result caching is enabled at all.
    /// Default: `true`
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Maximum number of input bytes fed to the content hash. Larger inputs
    /// are hashed by prefix only, trading exactness for throughput.
    /// Default: `51200` (50 KB)
    #[serde(default = "default_max_hash_bytes")]
    pub max_hash_bytes: usize,
}

/// Settings for the request pool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoolConfig {
    /// A batch is flushed as soon as it reaches this many requests.
    /// Default: `3`
    #[serde(default = "default_max_batch_size")]
    pub max_batch_size: usize,

    /// A batch is flushed once this much time has passed since its first
    /// request, even if it is below `max_batch_size`.
    /// Default: `100`
    #[serde(default = "default_max_wait_ms")]
    pub max_wait_ms: u64,
}

/// Settings for the perceptual frame cache.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrameCacheConfig {
    /// Entries older than this are treated as absent.
    /// Default: `5000`
    #[serde(default = "default_frame_ttl_ms")]
    pub ttl_ms: u64,

    /// Maximum number of live entries; inserting beyond this evicts the
    /// oldest entry by insertion time.
    /// Default: `50`
    #[serde(default = "default_frame_max_entries")]
    pub max_entries: usize,

    /// Number of evenly-strided byte pairs sampled by the fingerprint.
    /// Default: `100`
    #[serde(default = "default_frame_samples")]
    pub sample_count: usize,

    /// Interval used by the optional background sweep task.
    /// Default: `10000`
    #[serde(default = "default_cleanup_interval_ms")]
    pub cleanup_interval_ms: u64,
}

/// Settings for application logging and output format.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Minimum log level (`trace`, `debug`, `info`, `warn`, `error`).
    /// Default: `info`
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format for logs (`pretty`, `json`).
    /// Default: `pretty`
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for AnalysisCacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_hash_bytes: default_max_hash_bytes(),
        }
    }
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_batch_size: default_max_batch_size(),
            max_wait_ms: default_max_wait_ms(),
        }
    }
}

impl Default for FrameCacheConfig {
    fn default() -> Self {
        Self {
            ttl_ms: default_frame_ttl_ms(),
            max_entries: default_frame_max_entries(),
            sample_count: default_frame_samples(),
            cleanup_interval_ms: default_cleanup_interval_ms(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

// Helper functions for serde defaults and shared constants

fn default_true() -> bool {
    true
}

fn default_max_hash_bytes() -> usize {
    50 * 1024
}

fn default_max_batch_size() -> usize {
    3
}

fn default_max_wait_ms() -> u64 {
    100
}

fn default_frame_ttl_ms() -> u64 {
    5000
}

fn default_frame_max_entries() -> usize {
    50
}

fn default_frame_samples() -> usize {
    100
}

fn default_cleanup_interval_ms() -> u64 {
    10_000
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

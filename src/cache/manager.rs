// Analysis cache manager - content hashing, fail-open lookup and upsert

use crate::cache::models::{AnalysisType, CacheEntry, CacheStats};
use crate::cache::store::CacheStore;
use crate::config::AnalysisCacheConfig;
use crate::metrics;
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::io::Read;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

/// Content-addressed cache for AI analysis results.
///
/// Pure optimization layer: no method here ever fails the caller. Backing
/// store errors are logged and degrade to miss-on-read / drop-on-write, so
/// the feature code sees an unavailable cache as a cache that never hits.
pub struct AnalysisCache<S: CacheStore> {
    config: AnalysisCacheConfig,
    store: Arc<S>,
    stats: Arc<RwLock<CacheStats>>,
}

impl<S: CacheStore> AnalysisCache<S> {
    /// Create a new cache in front of the given backing store.
    pub fn new(config: AnalysisCacheConfig, store: S) -> Self {
        Self {
            config,
            store: Arc::new(store),
            stats: Arc::new(RwLock::new(CacheStats::default())),
        }
    }

    /// Whether result caching is on at all.
    pub fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    /// Shared handle to the backing store.
    pub fn store(&self) -> Arc<S> {
        Arc::clone(&self.store)
    }

    /// SHA-256 content key over at most the first `max_hash_bytes` of the
    /// input, as a lowercase hex string. Hashing a prefix keeps large
    /// uploads cheap; byte-identical prefixes of oversized inputs collide
    /// on purpose.
    pub fn hash_input(&self, bytes: &[u8]) -> String {
        let len = bytes.len().min(self.config.max_hash_bytes);
        let mut hasher = Sha256::new();
        hasher.update(&bytes[..len]);
        format!("{:x}", hasher.finalize())
    }

    /// Content key for a streaming input. Any read failure degrades to a
    /// [`fallback_key`](Self::fallback_key) so the caller proceeds uncached
    /// instead of failing.
    pub fn key_from_reader<R: Read>(&self, reader: R) -> String {
        let mut limited = reader.take(self.config.max_hash_bytes as u64);
        let mut hasher = Sha256::new();
        let mut buf = [0u8; 8192];
        loop {
            match limited.read(&mut buf) {
                Ok(0) => break,
                Ok(n) => hasher.update(&buf[..n]),
                Err(e) => {
                    debug!("Hashing input failed ({}), using fallback key", e);
                    return Self::fallback_key();
                }
            }
        }
        format!("{:x}", hasher.finalize())
    }

    /// Unique non-content key used when the input cannot be hashed. Never
    /// matches a stored entry, so it trades deduplication away for that one
    /// request rather than surfacing the failure.
    pub fn fallback_key() -> String {
        format!("fallback-{}", Uuid::new_v4())
    }

    /// Look up a previously computed result.
    ///
    /// Returns `None` when caching is disabled, on a genuine miss, and on
    /// any store error. A hit bumps the entry's hit counter through a
    /// spawned task so the caller's critical path never waits on the
    /// bookkeeping write.
    pub async fn get(&self, key: &str, analysis_type: AnalysisType) -> Option<Value> {
        if !self.config.enabled {
            debug!("Analysis caching disabled");
            return None;
        }

        match self.store.fetch(key, analysis_type).await {
            Ok(Some(entry)) => {
                debug!("Analysis cache hit: {} ({})", &key[..key.len().min(16)], analysis_type);
                self.stats.write().await.hits += 1;
                metrics::record_analysis_cache_hit();

                let store = Arc::clone(&self.store);
                let owned_key = key.to_string();
                tokio::spawn(async move {
                    if let Err(e) = store.record_hit(&owned_key, analysis_type).await {
                        debug!("Hit counter update failed: {}", e);
                    }
                });

                Some(entry.result)
            }
            Ok(None) => {
                debug!("Analysis cache miss: {} ({})", &key[..key.len().min(16)], analysis_type);
                self.stats.write().await.misses += 1;
                metrics::record_analysis_cache_miss();
                None
            }
            Err(e) => {
                // Fail open: an unreachable store is a miss, not an error.
                debug!("Analysis cache lookup failed, treating as miss: {}", e);
                self.stats.write().await.misses += 1;
                metrics::record_analysis_cache_error();
                None
            }
        }
    }

    /// Store a freshly computed result. Overwrites any existing entry for
    /// the same (key, analysis_type). Write failures are logged and
    /// swallowed.
    pub async fn set(
        &self,
        key: &str,
        analysis_type: AnalysisType,
        result: Value,
        model_used: &str,
        processing_time_ms: u64,
        confidence: Option<f64>,
    ) {
        if !self.config.enabled {
            return;
        }

        let entry = CacheEntry::new(
            key.to_string(),
            analysis_type,
            result,
            model_used.to_string(),
            processing_time_ms,
            confidence,
        );

        match self.store.upsert(entry).await {
            Ok(()) => {
                self.stats.write().await.stores += 1;
                metrics::record_analysis_cache_store();
            }
            Err(e) => {
                debug!("Analysis cache write failed, dropping entry: {}", e);
                metrics::record_analysis_cache_error();
            }
        }
    }

    /// Get cache statistics.
    pub async fn get_stats(&self) -> CacheStats {
        self.stats.read().await.clone()
    }
}

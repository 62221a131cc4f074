// Backing-store seam for the analysis cache
//
// Production deployments persist entries through a hosted relational store
// with an upsert keyed on the (key, analysis_type) unique constraint. The
// cache manager only sees this trait; an in-memory implementation ships for
// defaults and tests.

use crate::cache::models::{AnalysisType, CacheEntry};
use crate::error::Result;
use chrono::Utc;
use std::collections::HashMap;
use std::future::Future;
use tokio::sync::RwLock;

/// Persistence interface for [`CacheEntry`] rows.
///
/// All methods may fail; the cache manager treats every failure as a miss
/// (reads) or drops the write silently (writes). Implementations must
/// honor upsert semantics: a write for an existing (key, analysis_type)
/// pair overwrites, it never appends.
pub trait CacheStore: Send + Sync + 'static {
    /// Fetch the entry for (key, analysis_type), if any.
    fn fetch(
        &self,
        key: &str,
        analysis_type: AnalysisType,
    ) -> impl Future<Output = Result<Option<CacheEntry>>> + Send;

    /// Insert or overwrite the entry for (entry.key, entry.analysis_type).
    fn upsert(&self, entry: CacheEntry) -> impl Future<Output = Result<()>> + Send;

    /// Bump the hit counter and last-access time for an existing entry.
    /// Missing rows are not an error; the entry may have been evicted
    /// between the read and this update.
    fn record_hit(
        &self,
        key: &str,
        analysis_type: AnalysisType,
    ) -> impl Future<Output = Result<()>> + Send;
}

/// In-memory [`CacheStore`] backed by a `HashMap`.
#[derive(Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<(String, AnalysisType), CacheEntry>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live entries. Test and diagnostics helper.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

impl CacheStore for MemoryStore {
    async fn fetch(&self, key: &str, analysis_type: AnalysisType) -> Result<Option<CacheEntry>> {
        let entries = self.entries.read().await;
        Ok(entries.get(&(key.to_string(), analysis_type)).cloned())
    }

    async fn upsert(&self, entry: CacheEntry) -> Result<()> {
        let mut entries = self.entries.write().await;
        entries.insert((entry.key.clone(), entry.analysis_type), entry);
        Ok(())
    }

    async fn record_hit(&self, key: &str, analysis_type: AnalysisType) -> Result<()> {
        let mut entries = self.entries.write().await;
        if let Some(entry) = entries.get_mut(&(key.to_string(), analysis_type)) {
            entry.hits += 1;
            entry.last_hit_at = Some(Utc::now());
        }
        Ok(())
    }
}

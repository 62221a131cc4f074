// Perceptual frame cache - short-TTL store keyed by a sampled fingerprint
//
// Skips the remote call for frames perceptually identical to a very recent
// one. The fingerprint is a cheap heuristic, not a content hash: visually
// similar frames are supposed to collide, that is the hit we want.

use crate::config::FrameCacheConfig;
use crate::frame::models::{Frame, FrameCacheStats};
use crate::metrics;
use parking_lot::Mutex;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::debug;

struct StoredResult {
    result: Value,
    inserted_at: Instant,
}

struct Inner {
    entries: HashMap<String, StoredResult>,
    hits: u64,
    misses: u64,
}

enum Lookup {
    Hit(Value),
    Expired,
    Missing,
}

/// Short-TTL result cache keyed by [`fingerprint`](FrameCache::fingerprint).
///
/// Entries older than `ttl_ms` are treated as absent and removed lazily by
/// the lookup that finds them. At `max_entries` capacity, inserting evicts
/// the single oldest entry by insertion time.
pub struct FrameCache {
    config: FrameCacheConfig,
    inner: Mutex<Inner>,
}

impl FrameCache {
    pub fn new(config: FrameCacheConfig) -> Self {
        Self {
            config,
            inner: Mutex::new(Inner {
                entries: HashMap::new(),
                hits: 0,
                misses: 0,
            }),
        }
    }

    /// Sampled fingerprint of a frame: the `width x height` prefix followed
    /// by `sample_count` evenly-strided byte pairs rendered in base-36.
    ///
    /// Deliberately collision-prone; two frames that differ only between
    /// sample points fingerprint identically. Expect false positives on
    /// visually similar frames, which is the desired behavior for a
    /// near-real-time stream.
    pub fn fingerprint(&self, frame: &Frame) -> String {
        let data = &frame.data;
        let mut fp = format!("{}x{}:", frame.width, frame.height);

        if data.len() < 2 || self.config.sample_count == 0 {
            return fp;
        }

        let stride = (data.len() / self.config.sample_count).max(2);
        let mut taken = 0;
        let mut i = 0;
        while i + 1 < data.len() && taken < self.config.sample_count {
            let pair = data[i] as u32 + data[i + 1] as u32;
            push_base36(&mut fp, pair);
            i += stride;
            taken += 1;
        }
        fp
    }

    /// Look up the cached result for a perceptually identical recent frame.
    /// Expired entries count as misses and are deleted on the spot.
    pub fn get(&self, frame: &Frame) -> Option<Value> {
        let key = self.fingerprint(frame);
        let ttl = Duration::from_millis(self.config.ttl_ms);
        let mut inner = self.inner.lock();

        let lookup = match inner.entries.get(&key) {
            Some(stored) if stored.inserted_at.elapsed() <= ttl => {
                Lookup::Hit(stored.result.clone())
            }
            Some(_) => Lookup::Expired,
            None => Lookup::Missing,
        };

        match lookup {
            Lookup::Hit(result) => {
                inner.hits += 1;
                metrics::record_frame_cache_hit();
                Some(result)
            }
            Lookup::Expired => {
                inner.entries.remove(&key);
                inner.misses += 1;
                metrics::record_frame_cache_expired();
                metrics::record_frame_cache_miss();
                None
            }
            Lookup::Missing => {
                inner.misses += 1;
                metrics::record_frame_cache_miss();
                None
            }
        }
    }

    /// Store a frame's analysis result, evicting the oldest entry first if
    /// the cache is full.
    pub fn set(&self, frame: &Frame, result: Value) {
        let key = self.fingerprint(frame);
        let mut inner = self.inner.lock();

        if !inner.entries.contains_key(&key) && inner.entries.len() >= self.config.max_entries {
            let oldest = inner
                .entries
                .iter()
                .min_by_key(|(_, stored)| stored.inserted_at)
                .map(|(k, _)| k.clone());
            if let Some(oldest) = oldest {
                inner.entries.remove(&oldest);
                metrics::record_frame_cache_eviction();
            }
        }

        inner.entries.insert(
            key,
            StoredResult {
                result,
                inserted_at: Instant::now(),
            },
        );
        metrics::update_frame_cache_entries(inner.entries.len());
    }

    /// Sweep all expired entries. Returns the number removed. Meant to be
    /// driven by an external timer; see [`spawn_cleanup`](Self::spawn_cleanup)
    /// for the convenience hook.
    pub fn cleanup(&self) -> usize {
        let ttl = Duration::from_millis(self.config.ttl_ms);
        let mut inner = self.inner.lock();
        let before = inner.entries.len();
        inner.entries.retain(|_, stored| stored.inserted_at.elapsed() <= ttl);
        let removed = before - inner.entries.len();
        if removed > 0 {
            debug!("Swept {} expired frame cache entries", removed);
        }
        metrics::update_frame_cache_entries(inner.entries.len());
        removed
    }

    /// Run [`cleanup`](Self::cleanup) every `cleanup_interval_ms` on the
    /// tokio runtime. Abort the returned handle to stop the sweep.
    pub fn spawn_cleanup(self: &Arc<Self>) -> tokio::task::JoinHandle<()> {
        let cache = Arc::clone(self);
        let period = Duration::from_millis(self.config.cleanup_interval_ms);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            // the first tick completes immediately
            ticker.tick().await;
            loop {
                ticker.tick().await;
                cache.cleanup();
            }
        })
    }

    /// Current size plus lifetime hit/miss counters.
    pub fn get_stats(&self) -> FrameCacheStats {
        let inner = self.inner.lock();
        let total = inner.hits + inner.misses;
        FrameCacheStats {
            size: inner.entries.len(),
            hits: inner.hits,
            misses: inner.misses,
            hit_rate: if total == 0 {
                0.0
            } else {
                inner.hits as f64 / total as f64
            },
        }
    }
}

fn push_base36(out: &mut String, mut value: u32) {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if value == 0 {
        out.push('0');
        return;
    }
    let mut buf = [0u8; 8];
    let mut n = 0;
    while value > 0 {
        buf[n] = DIGITS[(value % 36) as usize];
        value /= 36;
        n += 1;
    }
    for digit in buf[..n].iter().rev() {
        out.push(*digit as char);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> FrameCacheConfig {
        FrameCacheConfig::default()
    }

    fn frame(fill: u8) -> Frame {
        Frame::new(64, 48, vec![fill; 64 * 48 * 4])
    }

    #[test]
    fn test_fingerprint_is_stable() {
        let cache = FrameCache::new(config());
        assert_eq!(cache.fingerprint(&frame(10)), cache.fingerprint(&frame(10)));
        assert_ne!(cache.fingerprint(&frame(10)), cache.fingerprint(&frame(200)));
    }

    #[test]
    fn test_fingerprint_includes_dimensions() {
        let cache = FrameCache::new(config());
        let a = Frame::new(64, 48, vec![5; 1024]);
        let b = Frame::new(48, 64, vec![5; 1024]);
        assert!(cache.fingerprint(&a).starts_with("64x48:"));
        assert_ne!(cache.fingerprint(&a), cache.fingerprint(&b));
    }

    #[test]
    fn test_fingerprint_ignores_between_sample_noise() {
        let cache = FrameCache::new(config());
        let base = frame(10);
        let mut noisy = base.clone();
        // One byte in the middle of a stride gap; the sampler never sees it.
        let stride = (noisy.data.len() / 100).max(2);
        noisy.data[stride / 2 + 3] = 99;
        assert_eq!(cache.fingerprint(&base), cache.fingerprint(&noisy));
    }

    #[test]
    fn test_tiny_frame_fingerprint() {
        let cache = FrameCache::new(config());
        let tiny = Frame::new(1, 1, vec![200]);
        // Too small to sample a pair; dimensions alone identify it.
        assert_eq!(cache.fingerprint(&tiny), "1x1:");
    }

    #[test]
    fn test_base36_rendering() {
        let mut s = String::new();
        push_base36(&mut s, 0);
        push_base36(&mut s, 35);
        push_base36(&mut s, 36);
        push_base36(&mut s, 510);
        assert_eq!(s, "0z10e6");
    }
}

// Perceptual frame cache tests - TTL, eviction, stats

use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use visionpool::config::FrameCacheConfig;
use visionpool::frame::{Frame, FrameCache};

fn config() -> FrameCacheConfig {
    FrameCacheConfig::default()
}

fn frame(fill: u8) -> Frame {
    Frame::new(64, 48, vec![fill; 64 * 48 * 4])
}

#[test]
fn test_frame_config_defaults() {
    let config = config();

    assert_eq!(config.ttl_ms, 5000);
    assert_eq!(config.max_entries, 50);
    assert_eq!(config.sample_count, 100);
    assert_eq!(config.cleanup_interval_ms, 10_000);
}

#[test]
fn test_set_then_get() {
    let cache = FrameCache::new(config());
    let f = frame(42);

    assert!(cache.get(&f).is_none());
    cache.set(&f, json!({"pose": "squat", "confidence": 0.91}));
    assert_eq!(
        cache.get(&f),
        Some(json!({"pose": "squat", "confidence": 0.91}))
    );
}

#[test]
fn test_ttl_expiry_deletes_lazily() {
    let cache = FrameCache::new(FrameCacheConfig {
        ttl_ms: 40,
        ..config()
    });
    let f = frame(7);
    cache.set(&f, json!({"pose": "plank"}));

    std::thread::sleep(Duration::from_millis(80));

    // Expired entry reads as absent and is removed by the lookup itself
    assert!(cache.get(&f).is_none());
    assert_eq!(cache.get_stats().size, 0);
}

#[test]
fn test_capacity_evicts_single_oldest() {
    let cache = FrameCache::new(FrameCacheConfig {
        max_entries: 3,
        ..config()
    });

    for fill in [1u8, 2, 3, 4] {
        cache.set(&frame(fill), json!({ "frame": fill }));
        // Distinct insertion timestamps keep the eviction order deterministic
        std::thread::sleep(Duration::from_millis(2));
    }

    assert_eq!(cache.get_stats().size, 3);
    assert!(cache.get(&frame(1)).is_none());
    assert!(cache.get(&frame(2)).is_some());
    assert!(cache.get(&frame(3)).is_some());
    assert!(cache.get(&frame(4)).is_some());
}

#[test]
fn test_overwrite_does_not_evict() {
    let cache = FrameCache::new(FrameCacheConfig {
        max_entries: 2,
        ..config()
    });

    cache.set(&frame(1), json!(1));
    cache.set(&frame(2), json!(2));
    // Re-setting an existing fingerprint at capacity replaces in place
    cache.set(&frame(2), json!(20));

    assert_eq!(cache.get_stats().size, 2);
    assert_eq!(cache.get(&frame(1)), Some(json!(1)));
    assert_eq!(cache.get(&frame(2)), Some(json!(20)));
}

#[test]
fn test_cleanup_sweeps_only_expired() {
    let cache = FrameCache::new(FrameCacheConfig {
        ttl_ms: 30,
        ..config()
    });

    cache.set(&frame(1), json!(1));
    cache.set(&frame(2), json!(2));
    std::thread::sleep(Duration::from_millis(60));
    cache.set(&frame(3), json!(3));

    assert_eq!(cache.cleanup(), 2);
    assert_eq!(cache.get_stats().size, 1);
    assert_eq!(cache.get(&frame(3)), Some(json!(3)));
}

#[test]
fn test_stats_counters_survive_cleanup() {
    let cache = FrameCache::new(FrameCacheConfig {
        ttl_ms: 30,
        ..config()
    });

    cache.set(&frame(1), json!(1));
    assert!(cache.get(&frame(1)).is_some()); // hit
    assert!(cache.get(&frame(9)).is_none()); // miss

    std::thread::sleep(Duration::from_millis(60));
    cache.cleanup();

    let stats = cache.get_stats();
    assert_eq!(stats.size, 0);
    assert_eq!(stats.hits, 1);
    assert_eq!(stats.misses, 1);
    assert!((stats.hit_rate - 0.5).abs() < f64::EPSILON);
}

#[tokio::test]
async fn test_spawn_cleanup_sweeps_periodically() {
    let cache = Arc::new(FrameCache::new(FrameCacheConfig {
        ttl_ms: 20,
        cleanup_interval_ms: 50,
        ..config()
    }));
    cache.set(&frame(5), json!(5));

    let handle = cache.spawn_cleanup();
    tokio::time::sleep(Duration::from_millis(150)).await;
    handle.abort();

    // Swept by the background task, not by a lookup
    assert_eq!(cache.get_stats().size, 0);
}

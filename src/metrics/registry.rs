// Prometheus metrics registry and collectors

use lazy_static::lazy_static;
use prometheus::{
    register_counter_vec_with_registry, register_gauge_vec_with_registry,
    register_histogram_vec_with_registry, CounterVec, Encoder, GaugeVec, HistogramVec, Opts,
    Registry, TextEncoder,
};

lazy_static! {
    /// Global Prometheus registry
    pub static ref REGISTRY: Registry = Registry::new();

    // ============================================================================
    // ANALYSIS CACHE METRICS
    // ============================================================================

    /// Analysis cache operations
    pub static ref ANALYSIS_CACHE_OPERATIONS: CounterVec = register_counter_vec_with_registry!(
        Opts::new("analysis_cache_operations_total", "Total analysis cache operations"),
        &["operation"], // operation: hit, miss, store, error
        REGISTRY
    ).unwrap();

    // ============================================================================
    // FRAME CACHE METRICS
    // ============================================================================

    /// Frame cache operations
    pub static ref FRAME_CACHE_OPERATIONS: CounterVec = register_counter_vec_with_registry!(
        Opts::new("frame_cache_operations_total", "Total perceptual frame cache operations"),
        &["operation"], // operation: hit, miss, expired, eviction
        REGISTRY
    ).unwrap();

    /// Current frame cache entries
    pub static ref FRAME_CACHE_ENTRIES: GaugeVec = register_gauge_vec_with_registry!(
        Opts::new("frame_cache_entries_current", "Current number of frame cache entries"),
        &["type"], // type: active
        REGISTRY
    ).unwrap();

    // ============================================================================
    // REQUEST POOL METRICS
    // ============================================================================

    /// Pool flushes by trigger
    pub static ref POOL_FLUSHES: CounterVec = register_counter_vec_with_registry!(
        Opts::new("pool_flushes_total", "Total request pool flushes"),
        &["trigger"], // trigger: size, timer, requeue
        REGISTRY
    ).unwrap();

    /// Pool request outcomes
    pub static ref POOL_REQUESTS: CounterVec = register_counter_vec_with_registry!(
        Opts::new("pool_requests_total", "Total pooled request outcomes"),
        &["outcome"], // outcome: resolved, rejected, cleared
        REGISTRY
    ).unwrap();

    /// Flushed batch sizes
    pub static ref POOL_BATCH_SIZE: HistogramVec = register_histogram_vec_with_registry!(
        prometheus::HistogramOpts::new("pool_batch_size", "Requests per flushed batch")
            .buckets(vec![1.0, 2.0, 3.0, 5.0, 8.0, 13.0]),
        &["unit"], // unit: requests
        REGISTRY
    ).unwrap();
}

/// Gather all metrics and return as Prometheus text format
pub fn gather_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer).unwrap();
    String::from_utf8(buffer).unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_registration() {
        // Touch every collector so it shows up in the gathered output
        ANALYSIS_CACHE_OPERATIONS.with_label_values(&["hit"]).inc();
        FRAME_CACHE_OPERATIONS.with_label_values(&["hit"]).inc();
        POOL_FLUSHES.with_label_values(&["size"]).inc();
        POOL_REQUESTS.with_label_values(&["resolved"]).inc();
        POOL_BATCH_SIZE.with_label_values(&["requests"]).observe(3.0);

        let metrics = gather_metrics();
        assert!(metrics.contains("analysis_cache_operations_total"));
        assert!(metrics.contains("frame_cache_operations_total"));
        assert!(metrics.contains("pool_flushes_total"));
        assert!(metrics.contains("pool_requests_total"));
        assert!(metrics.contains("pool_batch_size"));
    }
}

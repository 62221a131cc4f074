// Metrics module for Prometheus observability

mod registry;

pub use registry::{
    gather_metrics, ANALYSIS_CACHE_OPERATIONS, FRAME_CACHE_ENTRIES, FRAME_CACHE_OPERATIONS,
    POOL_BATCH_SIZE, POOL_FLUSHES, POOL_REQUESTS,
};

/// Helper to record analysis cache operations
pub fn record_analysis_cache_hit() {
    ANALYSIS_CACHE_OPERATIONS.with_label_values(&["hit"]).inc();
}

pub fn record_analysis_cache_miss() {
    ANALYSIS_CACHE_OPERATIONS.with_label_values(&["miss"]).inc();
}

pub fn record_analysis_cache_store() {
    ANALYSIS_CACHE_OPERATIONS.with_label_values(&["store"]).inc();
}

pub fn record_analysis_cache_error() {
    ANALYSIS_CACHE_OPERATIONS.with_label_values(&["error"]).inc();
}

/// Helper to record frame cache operations
pub fn record_frame_cache_hit() {
    FRAME_CACHE_OPERATIONS.with_label_values(&["hit"]).inc();
}

pub fn record_frame_cache_miss() {
    FRAME_CACHE_OPERATIONS.with_label_values(&["miss"]).inc();
}

pub fn record_frame_cache_expired() {
    FRAME_CACHE_OPERATIONS.with_label_values(&["expired"]).inc();
}

pub fn record_frame_cache_eviction() {
    FRAME_CACHE_OPERATIONS
        .with_label_values(&["eviction"])
        .inc();
}

pub fn update_frame_cache_entries(count: usize) {
    FRAME_CACHE_ENTRIES
        .with_label_values(&["active"])
        .set(count as f64);
}

/// Helper to record request pool activity
pub fn record_pool_flush(trigger: &str) {
    POOL_FLUSHES.with_label_values(&[trigger]).inc();
}

pub fn record_pool_request(outcome: &str) {
    POOL_REQUESTS.with_label_values(&[outcome]).inc();
}

pub fn observe_pool_batch_size(size: usize) {
    POOL_BATCH_SIZE
        .with_label_values(&["requests"])
        .observe(size as f64);
}

//! Analysis cache entry and statistics models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Category of AI analysis a cached result belongs to.
///
/// The same input bytes can legitimately carry different results per
/// category, so the cache key is the (content hash, analysis type) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisType {
    FoodPhoto,
    MedicalExam,
    BodyComposition,
    Document,
}

impl AnalysisType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnalysisType::FoodPhoto => "food_photo",
            AnalysisType::MedicalExam => "medical_exam",
            AnalysisType::BodyComposition => "body_composition",
            AnalysisType::Document => "document",
        }
    }
}

impl std::fmt::Display for AnalysisType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One stored analysis result.
///
/// `result`, `model_used`, `processing_time_ms` and `confidence` are
/// write-once provenance; `hits` and `last_hit_at` are bumped on every
/// read. `created_at` is set at insertion and never changes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEntry {
    /// Lowercase hex content hash of the input.
    pub key: String,
    pub analysis_type: AnalysisType,
    /// Opaque provider-specific payload.
    pub result: Value,
    pub model_used: String,
    pub processing_time_ms: u64,
    pub confidence: Option<f64>,
    pub hits: u64,
    pub last_hit_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl CacheEntry {
    pub fn new(
        key: String,
        analysis_type: AnalysisType,
        result: Value,
        model_used: String,
        processing_time_ms: u64,
        confidence: Option<f64>,
    ) -> Self {
        Self {
            key,
            analysis_type,
            result,
            model_used,
            processing_time_ms,
            confidence,
            hits: 0,
            last_hit_at: None,
            created_at: Utc::now(),
        }
    }
}

/// Statistics for analysis cache operations.
#[derive(Debug, Default, Clone)]
pub struct CacheStats {
    /// Number of successful cache hits.
    pub hits: u64,
    /// Number of cache misses (including fail-open store errors).
    pub misses: u64,
    /// Number of entries written.
    pub stores: u64,
}

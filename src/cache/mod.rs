// Analysis cache module

pub mod manager;
pub mod models;
pub mod store;

pub use manager::AnalysisCache;
pub use models::{AnalysisType, CacheEntry, CacheStats};
pub use store::{CacheStore, MemoryStore};

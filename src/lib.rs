// visionpool - Caching and request-pooling layer for third-party vision/AI analysis APIs

pub mod cache;
pub mod config;
pub mod error;
pub mod frame;
pub mod metrics;
pub mod pool;
pub mod utils;

pub use cache::{AnalysisCache, AnalysisType, CacheStore, MemoryStore};
pub use error::{CacheError, PoolError, Result};
pub use frame::{Frame, FrameCache};
pub use pool::RequestPool;

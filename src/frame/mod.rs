// Perceptual frame cache module

pub mod cache;
pub mod models;

pub use cache::FrameCache;
pub use models::{Frame, FrameCacheStats};

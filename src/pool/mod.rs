// Request pooling module

pub mod batcher;

pub use batcher::{PendingResult, RequestPool};

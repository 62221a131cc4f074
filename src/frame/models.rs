//! Frame input and frame-cache statistics models.

/// A raw video frame: width, height and a flat buffer of pixel channel
/// bytes. Mirrors the browser `ImageData` shape handed to the pose
/// pipeline.
#[derive(Debug, Clone)]
pub struct Frame {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
}

impl Frame {
    pub fn new(width: u32, height: u32, data: Vec<u8>) -> Self {
        Self {
            width,
            height,
            data,
        }
    }
}

/// Observability snapshot of a [`FrameCache`](crate::frame::FrameCache).
///
/// `hits` and `misses` are monotonic for the lifetime of the instance;
/// `cleanup()` does not reset them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameCacheStats {
    pub size: usize,
    pub hits: u64,
    pub misses: u64,
    pub hit_rate: f64,
}

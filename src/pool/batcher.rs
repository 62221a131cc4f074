// Request pool - batching queue with collapse-to-latest flushing
//
// Coalesces bursts of near-real-time analysis requests (one per camera
// frame) into a single upstream call. A batch flushes when it reaches
// max_batch_size or when max_wait_ms has passed since its first request,
// whichever comes first. A multi-request batch sends only the newest
// payload upstream and resolves every member with that shared result;
// stale frames in the same short window are approximated by the latest
// frame's result.

use crate::config::PoolConfig;
use crate::error::PoolError;
use crate::metrics;
use futures::future::BoxFuture;
use parking_lot::{Mutex, RwLock};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Duration;
use tokio::sync::oneshot;
use tracing::debug;

type Processor<T, R> =
    Arc<dyn Fn(T) -> BoxFuture<'static, Result<R, PoolError>> + Send + Sync>;

struct Waiter<T, R> {
    payload: T,
    tx: oneshot::Sender<Result<R, PoolError>>,
}

struct State<T, R> {
    queue: Vec<Waiter<T, R>>,
    /// True while a batch is being processed; at most one flush in flight.
    flushing: bool,
    /// Bumped whenever an accumulation window ends (flush start or clear),
    /// so the window's pending timer becomes a no-op.
    generation: u64,
}

struct Shared<T, R> {
    config: PoolConfig,
    state: Mutex<State<T, R>>,
    processor: RwLock<Processor<T, R>>,
}

/// Batching queue in front of a remote analysis processor.
///
/// Cheap to clone; clones share the same queue and processor. Requests must
/// be submitted from within a tokio runtime. Every submitted request
/// resolves or rejects exactly once: with the batch result, with the batch
/// processor's error, or with [`PoolError::Cleared`].
pub struct RequestPool<T, R> {
    shared: Arc<Shared<T, R>>,
}

impl<T, R> Clone for RequestPool<T, R> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<T, R> RequestPool<T, R>
where
    T: Send + 'static,
    R: Clone + Default + Send + 'static,
{
    /// Create a pool with no processor installed yet. Until
    /// [`set_processor`](Self::set_processor) is called, batches resolve to
    /// `R::default()` (the no-op result).
    pub fn new(config: PoolConfig) -> Self {
        let default_processor: Processor<T, R> =
            Arc::new(|_payload| Box::pin(async { Ok(R::default()) }));

        Self {
            shared: Arc::new(Shared {
                config,
                state: Mutex::new(State {
                    queue: Vec::new(),
                    flushing: false,
                    generation: 0,
                }),
                processor: RwLock::new(default_processor),
            }),
        }
    }

    /// Install the actual analysis function. May be called after requests
    /// have already been submitted; the next flush picks it up.
    pub fn set_processor<F, Fut>(&self, processor: F)
    where
        F: Fn(T) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<R, PoolError>> + Send + 'static,
    {
        *self.shared.processor.write() = Arc::new(move |payload| Box::pin(processor(payload)));
    }

    /// Enqueue a request. The request joins the current accumulation window
    /// immediately (before the returned future is first polled); awaiting
    /// the future yields the batch outcome.
    pub fn submit(&self, payload: T) -> PendingResult<R> {
        let (tx, rx) = oneshot::channel();
        let mut flush_now = false;
        let mut timer_generation = None;

        {
            let mut state = self.shared.state.lock();
            state.queue.push(Waiter { payload, tx });

            if state.flushing {
                // Mid-flush arrivals wait for the requeue pass that runs as
                // soon as the current flush completes.
            } else if state.queue.len() >= self.shared.config.max_batch_size {
                flush_now = true;
            } else if state.queue.len() == 1 {
                timer_generation = Some(state.generation);
            }
        }

        if flush_now {
            self.spawn_flush("size", None);
        } else if let Some(generation) = timer_generation {
            let shared = Arc::clone(&self.shared);
            let wait = Duration::from_millis(self.shared.config.max_wait_ms);
            tokio::spawn(async move {
                tokio::time::sleep(wait).await;
                Self::flush_loop(shared, "timer", Some(generation)).await;
            });
        }

        PendingResult { rx }
    }

    /// Number of requests queued and not yet dispatched.
    pub fn queued_len(&self) -> usize {
        self.shared.state.lock().queue.len()
    }

    /// Cancel the pending flush timer and reject every queued,
    /// not-yet-dispatched request with [`PoolError::Cleared`]. An in-flight
    /// flush runs to completion and its requests still resolve normally.
    pub fn clear(&self) {
        let drained = {
            let mut state = self.shared.state.lock();
            state.generation = state.generation.wrapping_add(1);
            std::mem::take(&mut state.queue)
        };

        if !drained.is_empty() {
            debug!("Pool cleared, rejecting {} queued requests", drained.len());
        }
        for waiter in drained {
            metrics::record_pool_request("cleared");
            let _ = waiter.tx.send(Err(PoolError::Cleared));
        }
    }

    fn spawn_flush(&self, trigger: &'static str, expected_generation: Option<u64>) {
        let shared = Arc::clone(&self.shared);
        tokio::spawn(async move {
            Self::flush_loop(shared, trigger, expected_generation).await;
        });
    }

    /// Flush batches until the queue drains. Requests that accumulate while
    /// a batch is in flight are picked up by the next loop pass, so they
    /// flush immediately after the current one completes.
    async fn flush_loop(
        shared: Arc<Shared<T, R>>,
        mut trigger: &'static str,
        mut expected_generation: Option<u64>,
    ) {
        loop {
            let batch = {
                let mut state = shared.state.lock();
                if state.flushing || state.queue.is_empty() {
                    return;
                }
                if let Some(generation) = expected_generation {
                    // A stale timer must not cut short a newer window.
                    if state.generation != generation {
                        return;
                    }
                }
                state.flushing = true;
                state.generation = state.generation.wrapping_add(1);
                std::mem::take(&mut state.queue)
            };
            expected_generation = None;

            debug!("Flushing batch of {} (trigger: {})", batch.len(), trigger);
            metrics::record_pool_flush(trigger);
            metrics::observe_pool_batch_size(batch.len());

            // Collapse to latest: only the newest payload goes upstream.
            let mut waiters = Vec::with_capacity(batch.len());
            let mut latest = None;
            for waiter in batch {
                latest = Some(waiter.payload);
                waiters.push(waiter.tx);
            }
            let payload = latest.expect("flushed batch is non-empty");

            let processor = shared.processor.read().clone();
            let outcome = processor(payload).await;

            let label = if outcome.is_ok() { "resolved" } else { "rejected" };
            if let Err(e) = &outcome {
                debug!("Batch processor failed, rejecting {} waiters: {}", waiters.len(), e);
            }
            for tx in waiters {
                metrics::record_pool_request(label);
                let _ = tx.send(outcome.clone());
            }

            let drained = {
                let mut state = shared.state.lock();
                state.flushing = false;
                state.queue.is_empty()
            };
            if drained {
                return;
            }
            trigger = "requeue";
        }
    }
}

/// Caller's handle for a submitted request.
///
/// Resolves with the batch result, the batch error, or
/// [`PoolError::Cleared`] if the pool was cleared or dropped first.
pub struct PendingResult<R> {
    rx: oneshot::Receiver<Result<R, PoolError>>,
}

impl<R> Future for PendingResult<R> {
    type Output = Result<R, PoolError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.rx).poll(cx).map(|received| match received {
            Ok(outcome) => outcome,
            // Sender dropped without resolving: the pool was torn down.
            Err(_) => Err(PoolError::Cleared),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn pool(max_batch_size: usize, max_wait_ms: u64) -> RequestPool<u32, serde_json::Value> {
        RequestPool::new(PoolConfig {
            max_batch_size,
            max_wait_ms,
        })
    }

    #[tokio::test]
    async fn test_default_processor_returns_null() {
        let p = pool(1, 100);
        let result = p.submit(7).await.unwrap();
        assert_eq!(result, serde_json::Value::Null);
    }

    #[tokio::test]
    async fn test_single_request_processed_individually() {
        let p = pool(3, 20);
        p.set_processor(|n: u32| async move { Ok(serde_json::json!(n * 2)) });

        let result = p.submit(21).await.unwrap();
        assert_eq!(result, serde_json::json!(42));
    }

    #[tokio::test]
    async fn test_processor_error_rejects_whole_batch() {
        let p = pool(2, 100);
        p.set_processor(|_n: u32| async move {
            Err::<serde_json::Value, _>(PoolError::Processor("upstream 503".into()))
        });

        let (a, b) = tokio::join!(p.submit(1), p.submit(2));
        assert_eq!(a.unwrap_err(), PoolError::Processor("upstream 503".into()));
        assert_eq!(b.unwrap_err(), PoolError::Processor("upstream 503".into()));
    }

    #[tokio::test]
    async fn test_swapping_processor_affects_next_flush() {
        let p = pool(1, 100);
        assert_eq!(p.submit(1).await.unwrap(), serde_json::Value::Null);

        let calls = Arc::new(AtomicUsize::new(0));
        let counted = Arc::clone(&calls);
        p.set_processor(move |n: u32| {
            counted.fetch_add(1, Ordering::SeqCst);
            async move { Ok(serde_json::json!(n)) }
        });

        assert_eq!(p.submit(5).await.unwrap(), serde_json::json!(5));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}

//! Per-operation request coalescing.
//!
//! A [`BatchLoader`] turns many `get(key)` calls issued during one
//! scheduling tick into a single [`BatchFn::load`] call, then fans the
//! results back out. The pending set is cleared every time a batch is
//! dispatched, so a later wave asking for the same key reads the store
//! again.
//!
//! The call that opens a pending batch owns its dispatch: it waits out the
//! tick in place, takes everything registered meanwhile and runs the load
//! inside its own future. Sibling calls polled by the same task (all
//! branches of a `join!` or `join_all`) therefore register before the batch
//! is taken, whichever worker thread the task runs on.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::hash::Hash;
use std::mem;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use futures::future::{BoxFuture, FutureExt};
use tokio::sync::oneshot;
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, Span};

use crate::error::{LoadError, NotFoundError};

/// Default number of cooperative yields that make up one tick.
pub const DEFAULT_YIELD_COUNT: usize = 1;

/// Bulk lookup a [`BatchLoader`] coalesces calls into.
pub trait BatchFn: Send + Sync + 'static {
    type Key: Clone + Eq + Hash + fmt::Debug + Send + Sync + 'static;
    type Value: Clone + Send + 'static;
    type Error: std::error::Error + Send + Sync + 'static;

    /// Look up every key at once. Keys without a value are left out of the
    /// returned map.
    fn load(
        &self,
        keys: &[Self::Key],
        cancel: &CancellationToken,
    ) -> impl Future<Output = Result<HashMap<Self::Key, Self::Value>, Self::Error>> + Send;
}

/// Scheduling boundary a pending batch waits for before it is dispatched.
pub trait TickScheduler: Send + Sync + 'static {
    /// Completes once the work sharing the current tick has had a chance to
    /// register its keys.
    fn tick(&self) -> BoxFuture<'static, ()>;
}

/// Ends the tick after `yield_count` calls to [`tokio::task::yield_now`].
#[derive(Debug, Clone)]
pub struct TokioTickScheduler {
    pub yield_count: usize,
}

impl Default for TokioTickScheduler {
    fn default() -> Self {
        Self {
            yield_count: DEFAULT_YIELD_COUNT,
        }
    }
}

impl TickScheduler for TokioTickScheduler {
    fn tick(&self) -> BoxFuture<'static, ()> {
        let yields = self.yield_count;
        async move {
            for _ in 0..yields {
                tokio::task::yield_now().await;
            }
        }
        .boxed()
    }
}

/// Construction-time settings for a [`BatchLoader`].
#[derive(Debug, Clone)]
pub struct LoaderConfig {
    /// Type name carried by not-found errors.
    pub expected_type: &'static str,
    /// Dispatch as soon as this many distinct keys are pending.
    pub max_batch_size: Option<usize>,
    /// Parent span for dispatch spans.
    pub span: Span,
}

impl LoaderConfig {
    pub fn new(expected_type: &'static str) -> Self {
        Self {
            expected_type,
            max_batch_size: None,
            span: Span::none(),
        }
    }

    pub fn with_max_batch_size(mut self, max: usize) -> Self {
        self.max_batch_size = Some(max.max(1));
        self
    }

    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }
}

type LoadResult<F> =
    Result<<F as BatchFn>::Value, LoadError<<F as BatchFn>::Key, <F as BatchFn>::Error>>;

/// Keys requested since the last dispatch and the callers waiting on them.
struct Batch<F: BatchFn> {
    keys: Vec<F::Key>,
    waiters: HashMap<F::Key, Vec<oneshot::Sender<LoadResult<F>>>>,
}

impl<F: BatchFn> Batch<F> {
    fn new() -> Self {
        Self {
            keys: Vec::new(),
            waiters: HashMap::new(),
        }
    }
}

struct State<F: BatchFn> {
    pending: Batch<F>,
    /// Some caller owns the dispatch of `pending`.
    tick_scheduled: bool,
}

struct Inner<F: BatchFn> {
    batch_fn: F,
    config: LoaderConfig,
    scheduler: Arc<dyn TickScheduler>,
    cancel: CancellationToken,
    state: Mutex<State<F>>,
}

/// What a `get` does after registering its key.
enum Dispatch<F: BatchFn> {
    /// The cap was reached; resolve this batch now.
    Full(Batch<F>),
    /// This call opened the pending batch and dispatches it after the tick.
    Tick,
    /// Another call owns the dispatch.
    Wait,
}

/// Coalescing loader scoped to one operation.
///
/// Cheap to clone; clones share the pending set. Do not share a loader
/// between operations.
pub struct BatchLoader<F: BatchFn> {
    inner: Arc<Inner<F>>,
}

impl<F: BatchFn> Clone for BatchLoader<F> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<F: BatchFn> BatchLoader<F> {
    /// Loader whose tick is a [`TokioTickScheduler`].
    pub fn new(batch_fn: F, config: LoaderConfig, cancel: CancellationToken) -> Self {
        Self::with_scheduler(
            batch_fn,
            config,
            cancel,
            Arc::new(TokioTickScheduler::default()),
        )
    }

    pub fn with_scheduler(
        batch_fn: F,
        config: LoaderConfig,
        cancel: CancellationToken,
        scheduler: Arc<dyn TickScheduler>,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                batch_fn,
                config,
                scheduler,
                cancel,
                state: Mutex::new(State {
                    pending: Batch::new(),
                    tick_scheduled: false,
                }),
            }),
        }
    }

    /// Load one key, sharing a round-trip with every other key requested in
    /// the same tick.
    ///
    /// Dropping the call that owns a pending batch before it dispatches
    /// resolves everyone waiting on that batch with [`LoadError::Abandoned`].
    pub async fn get(&self, key: F::Key) -> LoadResult<F> {
        let (tx, rx) = oneshot::channel();
        let inner = &*self.inner;

        match inner.register(key, tx) {
            Dispatch::Full(batch) => inner.resolve(batch).await,
            Dispatch::Tick => {
                let guard = TickGuard { inner, armed: true };
                inner.scheduler.tick().await;
                let batch = guard.take();
                inner.resolve(batch).await;
            }
            Dispatch::Wait => {}
        }

        rx.await.unwrap_or(Err(LoadError::Abandoned))
    }

    /// Load several keys concurrently. Results follow the order of `keys`.
    pub async fn get_many(&self, keys: impl IntoIterator<Item = F::Key>) -> Vec<LoadResult<F>> {
        futures::future::join_all(keys.into_iter().map(|key| self.get(key))).await
    }
}

impl<F: BatchFn> Inner<F> {
    fn lock_state(&self) -> MutexGuard<'_, State<F>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn register(&self, key: F::Key, tx: oneshot::Sender<LoadResult<F>>) -> Dispatch<F> {
        let mut guard = self.lock_state();
        let state = &mut *guard;

        match state.pending.waiters.entry(key) {
            Entry::Occupied(mut entry) => entry.get_mut().push(tx),
            Entry::Vacant(entry) => {
                state.pending.keys.push(entry.key().clone());
                entry.insert(vec![tx]);
            }
        }

        let full = self
            .config
            .max_batch_size
            .is_some_and(|max| state.pending.keys.len() >= max);

        if full {
            // The tick owner, if any, dispatches whatever arrives next.
            Dispatch::Full(mem::replace(&mut state.pending, Batch::new()))
        } else if !state.tick_scheduled {
            state.tick_scheduled = true;
            Dispatch::Tick
        } else {
            Dispatch::Wait
        }
    }

    fn take_pending(&self) -> Batch<F> {
        let mut state = self.lock_state();
        state.tick_scheduled = false;
        mem::replace(&mut state.pending, Batch::new())
    }

    async fn resolve(&self, batch: Batch<F>) {
        let Batch { keys, waiters } = batch;
        if keys.is_empty() {
            return;
        }

        let span = if self.config.span.is_disabled() {
            Span::current()
        } else {
            self.config.span.clone()
        };
        let span = tracing::debug_span!(
            parent: &span,
            "batch_dispatch",
            expected_type = self.config.expected_type,
            size = keys.len(),
        );

        match self.batch_fn.load(&keys, &self.cancel).instrument(span).await {
            Ok(mut found) => {
                let mut missing = 0_usize;
                for (key, replies) in waiters {
                    let outcome = match found.remove(&key) {
                        Some(value) => Ok(value),
                        None => {
                            missing += 1;
                            Err(LoadError::NotFound(NotFoundError {
                                key,
                                expected_type: self.config.expected_type,
                            }))
                        }
                    };
                    for reply in replies {
                        // A dropped receiver means the caller stopped waiting.
                        let _ = reply.send(outcome.clone());
                    }
                }
                tracing::debug!(
                    expected_type = self.config.expected_type,
                    keys = keys.len(),
                    missing,
                    "Batch resolved"
                );
            }
            Err(err) => {
                tracing::warn!(
                    expected_type = self.config.expected_type,
                    keys = keys.len(),
                    error = %err,
                    "Batch load failed"
                );
                let err = Arc::new(err);
                for reply in waiters.into_values().flatten() {
                    let _ = reply.send(Err(LoadError::Batch(Arc::clone(&err))));
                }
            }
        }
    }
}

/// Dispatch ownership of the pending batch, held across the tick.
///
/// If the owning call is dropped first, the pending batch is discarded so
/// its waiters see their senders close, and the next `get` opens a new one.
struct TickGuard<'a, F: BatchFn> {
    inner: &'a Inner<F>,
    armed: bool,
}

impl<F: BatchFn> TickGuard<'_, F> {
    fn take(mut self) -> Batch<F> {
        self.armed = false;
        self.inner.take_pending()
    }
}

impl<F: BatchFn> Drop for TickGuard<'_, F> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let abandoned = self.inner.take_pending();
        if !abandoned.keys.is_empty() {
            tracing::warn!(
                expected_type = self.inner.config.expected_type,
                keys = abandoned.keys.len(),
                "Pending batch dropped before dispatch"
            );
        }
    }
}

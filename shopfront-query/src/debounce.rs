//! Debounced execution.
//!
//! A burst of triggers within the delay window collapses into one run of
//! the latest task. Scheduling spawns onto the current Tokio runtime;
//! outside one it fails with `QueryError::PipelineFailed`.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use shopfront_core::{FilterUpdate, QueryError, ShopfrontResult, SortKey, StorageError};
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

use crate::engine::{EngineSnapshot, EngineStats, QueryEngine};
use crate::pipeline::QueryResult;

/// Cancellable single-slot timer.
///
/// At most one task is pending. Scheduling replaces the pending task, and
/// dropping the debouncer cancels it.
#[derive(Debug)]
pub struct Debouncer {
    delay: Duration,
    pending: Option<JoinHandle<()>>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Run `task` once `delay` elapses without another call to `schedule`.
    ///
    /// Fails without touching the pending task when called outside a Tokio
    /// runtime.
    pub fn schedule<F>(&mut self, task: F) -> ShopfrontResult<()>
    where
        F: FnOnce() + Send + 'static,
    {
        let runtime = current_runtime()?;
        self.schedule_on(&runtime, task);
        Ok(())
    }

    /// Like [`Debouncer::schedule`], on an explicit runtime.
    pub fn schedule_on<F>(&mut self, runtime: &Handle, task: F)
    where
        F: FnOnce() + Send + 'static,
    {
        self.cancel();
        let delay = self.delay;
        self.pending = Some(runtime.spawn(async move {
            tokio::time::sleep(delay).await;
            task();
        }));
    }

    /// Drop the pending task. Returns whether one was still waiting.
    pub fn cancel(&mut self) -> bool {
        match self.pending.take() {
            Some(handle) => {
                let waiting = !handle.is_finished();
                handle.abort();
                waiting
            }
            None => false,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }
}

fn current_runtime() -> ShopfrontResult<Handle> {
    Handle::try_current().map_err(|e| {
        QueryError::PipelineFailed {
            stage: "debounce".to_string(),
            reason: e.to_string(),
        }
        .into()
    })
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// A [`QueryEngine`] whose state changes trigger one debounced refresh.
///
/// Setters apply to the query state immediately; the pipeline runs once the
/// configured delay passes with no further change. Dropping the wrapper
/// cancels a pending refresh.
#[derive(Debug)]
pub struct DebouncedEngine {
    engine: Arc<Mutex<QueryEngine>>,
    debouncer: Debouncer,
}

impl DebouncedEngine {
    pub fn new(engine: QueryEngine) -> Self {
        let debouncer = Debouncer::new(engine.config().debounce());
        Self {
            engine: Arc::new(Mutex::new(engine)),
            debouncer,
        }
    }

    /// Shared handle to the wrapped engine.
    pub fn shared(&self) -> Arc<Mutex<QueryEngine>> {
        Arc::clone(&self.engine)
    }

    pub fn set_search_query(&mut self, text: impl Into<String>) -> ShopfrontResult<()> {
        let text = text.into();
        self.update(|engine| {
            engine.set_search_query(text);
            Ok(())
        })
    }

    pub fn set_filters(&mut self, update: FilterUpdate) -> ShopfrontResult<()> {
        self.update(|engine| engine.set_filters(update))
    }

    pub fn set_sort(&mut self, sort: SortKey) -> ShopfrontResult<()> {
        self.update(|engine| {
            engine.set_sort(sort);
            Ok(())
        })
    }

    pub fn go_to_page(&mut self, page: usize) -> ShopfrontResult<()> {
        self.update(|engine| {
            engine.go_to_page(page);
            Ok(())
        })
    }

    pub fn reset_filters(&mut self) -> ShopfrontResult<()> {
        self.update(|engine| {
            engine.reset_filters();
            Ok(())
        })
    }

    /// Cancel the pending refresh and run it now.
    pub fn flush(&mut self) -> ShopfrontResult<Arc<QueryResult>> {
        self.debouncer.cancel();
        self.lock()?.refresh()
    }

    /// Drop the pending refresh without running it.
    pub fn cancel(&mut self) -> bool {
        self.debouncer.cancel()
    }

    pub fn is_pending(&self) -> bool {
        self.debouncer.is_pending()
    }

    /// Engine snapshot. `loading` also covers a refresh still waiting on
    /// the delay.
    pub fn snapshot(&self) -> ShopfrontResult<EngineSnapshot> {
        let mut snapshot = self.lock()?.snapshot();
        snapshot.loading |= self.debouncer.is_pending();
        Ok(snapshot)
    }

    pub fn stats(&self) -> ShopfrontResult<EngineStats> {
        Ok(self.lock()?.stats())
    }

    /// Apply a state change and reschedule the refresh. The runtime is
    /// resolved first so a failure leaves the engine untouched.
    fn update<F>(&mut self, apply: F) -> ShopfrontResult<()>
    where
        F: FnOnce(&mut QueryEngine) -> ShopfrontResult<()>,
    {
        let runtime = current_runtime()?;
        apply(&mut *self.lock()?)?;
        self.schedule_refresh(&runtime);
        Ok(())
    }

    fn schedule_refresh(&mut self, runtime: &Handle) {
        let engine = Arc::clone(&self.engine);
        self.debouncer.schedule_on(runtime, move || {
            let mut engine = match engine.lock() {
                Ok(engine) => engine,
                Err(_) => {
                    tracing::error!("Query engine lock poisoned, skipping debounced refresh");
                    return;
                }
            };
            // Failures are kept on the engine and surface in the snapshot.
            let _ = engine.refresh();
        });
    }

    fn lock(&self) -> ShopfrontResult<MutexGuard<'_, QueryEngine>> {
        self.engine
            .lock()
            .map_err(|_| StorageError::LockPoisoned.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shopfront_core::ShopfrontError;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test(start_paused = true)]
    async fn test_burst_collapses_to_last_task() {
        let runs = Arc::new(AtomicUsize::new(0));
        let last = Arc::new(AtomicUsize::new(0));
        let mut debouncer = Debouncer::new(Duration::from_millis(300));

        for value in 1..=3 {
            let runs = Arc::clone(&runs);
            let last = Arc::clone(&last);
            debouncer.schedule(move || {
                runs.fetch_add(1, Ordering::SeqCst);
                last.store(value, Ordering::SeqCst);
            })
            .unwrap();
            tokio::time::sleep(Duration::from_millis(100)).await;
        }

        tokio::time::sleep(Duration::from_millis(400)).await;
        assert_eq!(runs.load(Ordering::SeqCst), 1);
        assert_eq!(last.load(Ordering::SeqCst), 3);
        assert!(!debouncer.is_pending());
    }

    #[tokio::test(start_paused = true)]
    async fn test_nothing_runs_before_delay() {
        let runs = Arc::new(AtomicUsize::new(0));
        let mut debouncer = Debouncer::new(Duration::from_millis(300));
        let counter = Arc::clone(&runs);
        debouncer.schedule(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        })
        .unwrap();

        tokio::time::sleep(Duration::from_millis(299)).await;
        assert_eq!(runs.load(Ordering::SeqCst), 0);
        assert!(debouncer.is_pending());

        tokio::time::sleep(Duration::from_millis(2)).await;
        assert_eq!(runs.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_and_drop() {
        let runs = Arc::new(AtomicUsize::new(0));

        let mut debouncer = Debouncer::new(Duration::from_millis(50));
        let counter = Arc::clone(&runs);
        debouncer.schedule(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        })
        .unwrap();
        assert!(debouncer.cancel());
        assert!(!debouncer.cancel());

        let counter = Arc::clone(&runs);
        debouncer.schedule(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        })
        .unwrap();
        drop(debouncer);

        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(runs.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_schedule_outside_runtime_fails() {
        let mut debouncer = Debouncer::new(Duration::from_millis(50));
        let result = debouncer.schedule(|| {});
        assert!(matches!(
            result,
            Err(ShopfrontError::Query(QueryError::PipelineFailed { ref stage, .. })) if stage == "debounce"
        ));
        assert!(!debouncer.is_pending());
    }
}
